//! Attaching and detaching existing volumes.

use tracing::error;

use super::GceVolumeSource;
use crate::gce::connection::{AttachedDisk, Connection};
use crate::gce::types::DiskMode;
use crate::gce::volume_id::VolumeId;
use crate::storage::{
    AttachVolumesResult, StorageError, VolumeAttachment, VolumeAttachmentInfo,
    VolumeAttachmentParams, VolumeOpResult,
};

impl<C: Connection> GceVolumeSource<C> {
    pub(super) async fn attach_all(
        &self,
        params: &[VolumeAttachmentParams],
    ) -> Vec<AttachVolumesResult> {
        let mut results = Vec::with_capacity(params.len());
        for attachment in params {
            let mode = DiskMode::for_read_only(attachment.read_only);
            let result = self
                .attach_one_volume(&attachment.volume_id, mode, &attachment.instance_id)
                .await
                .map(|attached| VolumeAttachment {
                    volume_tag: attachment.volume_tag.clone(),
                    machine_tag: attachment.machine_tag.clone(),
                    info: VolumeAttachmentInfo {
                        device_name: attached.device_name,
                        read_only: attachment.read_only,
                    },
                });
            if let Err(err) = &result {
                self.logger.in_scope(|| {
                    error!(
                        volume = %attachment.volume_id,
                        instance = %attachment.instance_id,
                        error = %err,
                        "could not attach volume"
                    );
                });
            }
            results.push(result);
        }
        results
    }

    /// Attaches a disk unless the instance already has it, in which case the
    /// existing attachment is returned.
    pub(super) async fn attach_one_volume(
        &self,
        volume_name: &str,
        mode: DiskMode,
        instance_id: &str,
    ) -> Result<AttachedDisk, StorageError> {
        let parsed =
            VolumeId::parse(volume_name).map_err(|err| err.annotate("invalid volume name"))?;
        let zone = parsed.zone();
        let attached = self
            .connection
            .instance_disks(zone, instance_id)
            .await
            .map_err(|err| {
                StorageError::backend("cannot verify if the disk is already in the instance", err)
            })?;
        if let Some(existing) = attached
            .into_iter()
            .find(|disk| disk.volume_name == volume_name)
        {
            return Ok(existing);
        }

        self.connection
            .attach_disk(zone, volume_name, instance_id, mode)
            .await
            .map_err(|err| StorageError::backend("cannot attach volume", err))
    }

    pub(super) async fn detach_all(&self, params: &[VolumeAttachmentParams]) -> Vec<VolumeOpResult> {
        let mut results = Vec::with_capacity(params.len());
        for attachment in params {
            results.push(self.detach_one_volume(attachment).await);
        }
        results
    }

    async fn detach_one_volume(&self, attachment: &VolumeAttachmentParams) -> VolumeOpResult {
        let volume_name = attachment.volume_id.as_str();
        let parsed = VolumeId::parse(volume_name)
            .map_err(|err| err.annotate(format!("{volume_name:?} is not a valid volume id")))?;
        self.connection
            .detach_disk(parsed.zone(), &attachment.instance_id, volume_name)
            .await
            .map_err(|err| StorageError::backend(format!("cannot detach volume {volume_name:?}"), err))
    }
}
