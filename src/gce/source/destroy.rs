//! Concurrent volume destruction.

use futures::future::join_all;

use super::GceVolumeSource;
use crate::gce::connection::Connection;
use crate::gce::volume_id::VolumeId;
use crate::storage::{StorageError, VolumeOpResult};

impl<C: Connection> GceVolumeSource<C> {
    /// Deletes every volume concurrently. Each future resolves into the slot
    /// matching its input index, whatever order they finish in.
    pub(super) async fn destroy_all(&self, volume_ids: &[String]) -> Vec<VolumeOpResult> {
        join_all(volume_ids.iter().map(|id| self.destroy_one_volume(id))).await
    }

    async fn destroy_one_volume(&self, volume_id: &str) -> VolumeOpResult {
        let parsed = VolumeId::parse(volume_id)
            .map_err(|err| err.annotate(format!("invalid volume id {volume_id:?}")))?;
        self.connection
            .remove_disk(parsed.zone(), volume_id)
            .await
            .map_err(|err| StorageError::backend(format!("cannot destroy volume {volume_id:?}"), err))
    }
}
