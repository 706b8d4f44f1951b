//! Listing and describing volumes.

use tracing::error;

use super::GceVolumeSource;
use crate::gce::connection::Connection;
use crate::gce::units::{gib_to_mib, size_overflow};
use crate::gce::volume_id::VolumeId;
use crate::storage::{StorageError, VolumeInfo};

impl<C: Connection> GceVolumeSource<C> {
    /// Lists disks in every zone of the region. Zones whose listing fails
    /// are skipped; only a failure to enumerate zones fails the call.
    pub(super) async fn list_all(&self) -> Result<Vec<String>, StorageError> {
        let zones = self
            .connection
            .availability_zones(&self.identity.region)
            .await
            .map_err(|err| StorageError::backend("cannot determine availability zones", err))?;

        let mut volumes = Vec::new();
        for zone in &zones {
            match self.connection.disks(zone.name()).await {
                Ok(disks) => volumes.extend(disks.into_iter().map(|disk| disk.name)),
                Err(err) => {
                    self.logger.in_scope(|| {
                        error!(zone = %zone.name(), error = %err, "cannot get disks for zone");
                    });
                }
            }
        }
        Ok(volumes)
    }

    /// Describes volumes in order. The first failure aborts the whole call
    /// and discards any results gathered so far.
    pub(super) async fn describe_all(
        &self,
        volume_ids: &[String],
    ) -> Result<Vec<VolumeInfo>, StorageError> {
        let mut results = Vec::with_capacity(volume_ids.len());
        for volume_id in volume_ids {
            let info = self
                .describe_one_volume(volume_id)
                .await
                .map_err(|err| err.annotate("cannot describe volumes"))?;
            results.push(info);
        }
        Ok(results)
    }

    async fn describe_one_volume(&self, volume_id: &str) -> Result<VolumeInfo, StorageError> {
        let parsed = VolumeId::parse(volume_id)
            .map_err(|err| err.annotate(format!("cannot describe {volume_id:?}")))?;
        let disk = self
            .connection
            .disk(parsed.zone(), volume_id)
            .await
            .map_err(|err| StorageError::backend(format!("cannot get volume {volume_id:?}"), err))?;
        let size_mib = gib_to_mib(disk.size_gb).ok_or_else(|| {
            StorageError::backend(
                format!("cannot get volume {volume_id:?}"),
                size_overflow(disk.size_gb),
            )
        })?;
        Ok(VolumeInfo {
            volume_id: disk.name,
            size_mib,
            persistent: true,
        })
    }
}
