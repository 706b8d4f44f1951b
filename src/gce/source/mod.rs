//! Volume lifecycle manager for GCE persistent disks.

mod attach;
mod create;
mod destroy;
mod query;

use crate::logging::Logger;
use crate::storage::{
    AttachVolumesResult, CreateVolumesResult, StorageError, StorageFuture, VolumeAttachmentParams,
    VolumeInfo, VolumeOpResult, VolumeParams, VolumeSource,
};

use super::connection::Connection;

/// Identity of the environment a volume source works for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvironIdentity {
    /// Environment name. Not unique; informational only.
    pub name: String,
    /// Unique environment identifier.
    pub uuid: String,
    /// Region whose zones are searched when listing volumes.
    pub region: String,
}

impl EnvironIdentity {
    /// Creates an identity.
    pub fn new(
        name: impl Into<String>,
        uuid: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            region: region.into(),
        }
    }
}

/// Creates, attaches, detaches, lists, describes, and destroys GCE
/// persistent disks.
#[derive(Debug)]
pub struct GceVolumeSource<C> {
    connection: C,
    identity: EnvironIdentity,
    logger: Logger,
}

impl<C: Connection> GceVolumeSource<C> {
    /// Binds a volume source to a connection and environment.
    #[must_use]
    pub const fn new(connection: C, identity: EnvironIdentity, logger: Logger) -> Self {
        Self {
            connection,
            identity,
            logger,
        }
    }

    /// Identity of the environment this source works for.
    #[must_use]
    pub const fn identity(&self) -> &EnvironIdentity {
        &self.identity
    }
}

impl<C: Connection> VolumeSource for GceVolumeSource<C> {
    fn create_volumes<'a>(
        &'a self,
        params: &'a [VolumeParams],
    ) -> StorageFuture<'a, Vec<CreateVolumesResult>> {
        Box::pin(async move { Ok(self.create_all(params).await) })
    }

    fn destroy_volumes<'a>(
        &'a self,
        volume_ids: &'a [String],
    ) -> StorageFuture<'a, Vec<VolumeOpResult>> {
        Box::pin(async move { Ok(self.destroy_all(volume_ids).await) })
    }

    fn attach_volumes<'a>(
        &'a self,
        params: &'a [VolumeAttachmentParams],
    ) -> StorageFuture<'a, Vec<AttachVolumesResult>> {
        Box::pin(async move { Ok(self.attach_all(params).await) })
    }

    fn detach_volumes<'a>(
        &'a self,
        params: &'a [VolumeAttachmentParams],
    ) -> StorageFuture<'a, Vec<VolumeOpResult>> {
        Box::pin(async move { Ok(self.detach_all(params).await) })
    }

    fn list_volumes(&self) -> StorageFuture<'_, Vec<String>> {
        Box::pin(self.list_all())
    }

    fn describe_volumes<'a>(
        &'a self,
        volume_ids: &'a [String],
    ) -> StorageFuture<'a, Vec<VolumeInfo>> {
        Box::pin(self.describe_all(volume_ids))
    }

    fn validate_volume_params(&self, _params: &VolumeParams) -> Result<(), StorageError> {
        Ok(())
    }
}
