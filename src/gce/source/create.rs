//! Volume creation with best-effort attachment and compensating cleanup.

use std::collections::BTreeSet;
use std::slice;

use tracing::{debug, error, info, warn};

use super::GceVolumeSource;
use crate::gce::connection::{Connection, Disk, DiskSpec, Instance};
use crate::gce::instance_cache::InstanceCache;
use crate::gce::types::{DiskMode, DiskType};
use crate::gce::units::{gib_to_mib, mib_to_gib, size_overflow};
use crate::gce::volume_id::VolumeId;
use crate::storage::{
    CreateVolumesResult, CreatedVolume, StorageError, Volume, VolumeAttachment,
    VolumeAttachmentInfo, VolumeAttachmentParams, VolumeInfo, VolumeParams, VolumeSource,
};

/// Creation request with its boundary values resolved.
struct PreparedVolume<'a> {
    params: &'a VolumeParams,
    attachment: &'a VolumeAttachmentParams,
    disk_type: DiskType,
}

impl PreparedVolume<'_> {
    fn instance_id(&self) -> &str {
        &self.attachment.instance_id
    }
}

impl<C: Connection> GceVolumeSource<C> {
    pub(super) async fn create_all(&self, params: &[VolumeParams]) -> Vec<CreateVolumesResult> {
        let prepared: Vec<Result<PreparedVolume<'_>, StorageError>> =
            params.iter().map(|item| self.prepare(item)).collect();

        let instance_ids: BTreeSet<&str> = prepared
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .map(PreparedVolume::instance_id)
            .collect();

        let mut instances = InstanceCache::default();
        if instance_ids.len() > 1 {
            let ids: Vec<&str> = instance_ids.into_iter().collect();
            if let Err(err) = instances.update(&self.connection, &ids).await {
                // Each volume retries the lookup for its own instance.
                self.logger
                    .in_scope(|| debug!(error = %err, "querying running instances"));
            }
        }

        let mut results = Vec::with_capacity(prepared.len());
        for item in prepared {
            let result = match item {
                Ok(volume) => self.create_one_volume(&volume, &mut instances).await,
                Err(err) => Err(err),
            };
            if let Err(err) = &result {
                self.logger.in_scope(|| {
                    error!(error = %err, "could not create one volume (or attach it)");
                });
            }
            results.push(result);
        }
        results
    }

    fn prepare<'a>(&self, params: &'a VolumeParams) -> Result<PreparedVolume<'a>, StorageError> {
        self.validate_volume_params(params)?;
        let attachment = params.attachment.as_ref().ok_or_else(|| {
            StorageError::Validation(format!(
                "volume {:?} has no attachment; its zone cannot be determined",
                params.tag
            ))
        })?;
        Ok(PreparedVolume {
            params,
            attachment,
            disk_type: DiskType::from_attributes(&params.attributes),
        })
    }

    async fn create_one_volume(
        &self,
        volume: &PreparedVolume<'_>,
        instances: &mut InstanceCache,
    ) -> CreateVolumesResult {
        let instance_id = volume.instance_id();
        instances.update(&self.connection, &[instance_id]).await?;
        // The zone comes from the instance, so a volume cannot be created
        // without it.
        let instance = instances.get(instance_id)?.clone();

        let volume_id = VolumeId::generate(&instance.zone)
            .map_err(|err| err.annotate("cannot create a new volume name"))?;
        let spec = DiskSpec {
            size_hint_gb: mib_to_gib(volume.params.size_mib),
            name: volume_id.to_string(),
            disk_type: volume.disk_type.clone(),
        };

        let disks = self
            .connection
            .create_disks(&instance.zone, slice::from_ref(&spec))
            .await
            .map_err(|err| StorageError::backend("cannot create disk", err))?;

        match self.complete_created_volume(volume, &instance, disks).await {
            Ok(created) => Ok(created),
            Err(err) => {
                self.remove_after_failure(&instance.zone, &spec.name).await;
                Err(err)
            }
        }
    }

    async fn complete_created_volume(
        &self,
        volume: &PreparedVolume<'_>,
        instance: &Instance,
        disks: Vec<Disk>,
    ) -> CreateVolumesResult {
        let [disk]: [Disk; 1] = disks.try_into().map_err(|created: Vec<Disk>| {
            StorageError::backend(
                "cannot create disk",
                format!("unexpected number of disks created: {}", created.len()),
            )
        })?;
        let size_mib = gib_to_mib(disk.size_gb).ok_or_else(|| {
            StorageError::backend("cannot create disk", size_overflow(disk.size_gb))
        })?;
        self.logger.in_scope(|| {
            info!(volume = %disk.name, zone = %instance.zone, size_gb = disk.size_gb, "created volume");
        });

        let attachment = match self
            .attach_one_volume(&disk.name, DiskMode::ReadWrite, &instance.id)
            .await
        {
            Ok(attached) => Some(VolumeAttachment {
                volume_tag: volume.params.tag.clone(),
                machine_tag: volume.attachment.machine_tag.clone(),
                info: VolumeAttachmentInfo {
                    device_name: attached.device_name,
                    read_only: false,
                },
            }),
            Err(err) => {
                // Left for the caller to retry through attach_volumes.
                self.logger.in_scope(|| {
                    error!(
                        volume = %disk.name,
                        instance = %instance.id,
                        error = %err,
                        "attaching volume failed"
                    );
                });
                None
            }
        };

        Ok(CreatedVolume {
            volume: Volume {
                tag: volume.params.tag.clone(),
                info: VolumeInfo {
                    volume_id: disk.name,
                    size_mib,
                    persistent: true,
                },
            },
            attachment,
        })
    }

    async fn remove_after_failure(&self, zone: &str, name: &str) {
        if let Err(err) = self.connection.remove_disk(zone, name).await {
            self.logger
                .in_scope(|| warn!(volume = %name, error = %err, "error cleaning up volume"));
        }
    }
}
