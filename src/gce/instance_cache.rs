//! Per-call cache of running instances.

use std::collections::{HashMap, HashSet};

use super::connection::{Connection, Instance};
use super::types::InstanceStatus;
use crate::storage::StorageError;

/// Maps instance IDs to the running instances they name.
///
/// A cache lives for a single batch call so that provisioning many volumes
/// for the same instances costs one backend query.
#[derive(Clone, Debug, Default)]
pub(crate) struct InstanceCache {
    instances: HashMap<String, Instance>,
}

impl InstanceCache {
    /// Loads the requested instances from the backend.
    ///
    /// A single ID that is already cached is not queried again. Instances
    /// that are not running are left out of the cache.
    pub(crate) async fn update<C: Connection>(
        &mut self,
        connection: &C,
        ids: &[&str],
    ) -> Result<(), StorageError> {
        if let [id] = ids
            && self.instances.contains_key(*id)
        {
            return Ok(());
        }

        let wanted: HashSet<&str> = ids.iter().copied().collect();
        let running = connection
            .instances(None, InstanceStatus::Running)
            .await
            .map_err(|err| StorageError::backend("querying instance details", err))?;
        for instance in running {
            if wanted.contains(instance.id.as_str()) {
                self.instances.insert(instance.id.clone(), instance);
            }
        }
        Ok(())
    }

    /// Returns the cached instance.
    pub(crate) fn get(&self, id: &str) -> Result<&Instance, StorageError> {
        self.instances
            .get(id)
            .ok_or_else(|| StorageError::NonRunningInstance {
                instance_id: id.to_owned(),
            })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }
}
