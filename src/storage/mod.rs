//! Storage provider contracts implemented by cloud backends.
//!
//! A [`Provider`] advertises what kind of storage a backend offers and hands
//! out a [`VolumeSource`] that performs the actual volume lifecycle. Batch
//! operations report one result per input item, aligned by index, so one
//! item's failure never hides the outcome of another.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::EnvironConfig;

mod error;
mod types;

pub use error::StorageError;
pub use types::{
    AttachVolumesResult, CreateVolumesResult, CreatedVolume, Scope, StorageKind, Volume,
    VolumeAttachment, VolumeAttachmentInfo, VolumeAttachmentParams, VolumeInfo, VolumeOpResult,
    VolumeParams,
};

/// Future returned by storage operations.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Storage pool configuration handed to a provider.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Pool name.
    pub name: String,
    /// Provider type the pool belongs to (for example `gce`).
    pub provider: String,
    /// Provider specific pool attributes.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Capabilities and factories exposed by a storage backend.
pub trait Provider {
    /// Volume source produced by this provider.
    type Source: VolumeSource;
    /// Filesystem source produced by this provider. Backends without
    /// filesystem support use [`Infallible`].
    type Filesystems;

    /// Validates provider specific pool configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] when the configuration is unusable.
    fn validate_config(&self, config: &ProviderConfig) -> Result<(), StorageError>;

    /// Reports whether the provider offers storage of `kind`.
    fn supports(&self, kind: StorageKind) -> bool;

    /// Level at which the provider's storage is managed.
    fn scope(&self) -> Scope;

    /// Whether volumes are provisioned on demand.
    fn dynamic(&self) -> bool;

    /// Returns a filesystem source bound to the environment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotSupported`] when the provider offers no
    /// filesystem storage.
    fn filesystem_source(
        &self,
        environ: &EnvironConfig,
        config: &ProviderConfig,
    ) -> Result<Self::Filesystems, StorageError>;

    /// Returns a volume source bound to the environment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the environment identity is missing or
    /// the backend connection cannot be established.
    fn volume_source(
        &self,
        environ: &EnvironConfig,
        config: &ProviderConfig,
    ) -> Result<Self::Source, StorageError>;
}

/// Marker used by providers that offer no filesystem storage.
pub type NoFilesystems = Infallible;

/// Volume lifecycle operations exposed to the orchestrator.
///
/// Every batch method returns one entry per input, in input order. The outer
/// `Result` is reserved for failures that make the whole batch meaningless.
pub trait VolumeSource: Send + Sync {
    /// Creates volumes, attaching each to its requested instance when
    /// possible.
    fn create_volumes<'a>(
        &'a self,
        params: &'a [VolumeParams],
    ) -> StorageFuture<'a, Vec<CreateVolumesResult>>;

    /// Destroys the volumes with the given identifiers.
    fn destroy_volumes<'a>(
        &'a self,
        volume_ids: &'a [String],
    ) -> StorageFuture<'a, Vec<VolumeOpResult>>;

    /// Attaches existing volumes to instances.
    fn attach_volumes<'a>(
        &'a self,
        params: &'a [VolumeAttachmentParams],
    ) -> StorageFuture<'a, Vec<AttachVolumesResult>>;

    /// Detaches volumes from instances.
    fn detach_volumes<'a>(
        &'a self,
        params: &'a [VolumeAttachmentParams],
    ) -> StorageFuture<'a, Vec<VolumeOpResult>>;

    /// Lists the identifiers of every volume visible to the source.
    fn list_volumes(&self) -> StorageFuture<'_, Vec<String>>;

    /// Describes the volumes with the given identifiers.
    fn describe_volumes<'a>(
        &'a self,
        volume_ids: &'a [String],
    ) -> StorageFuture<'a, Vec<VolumeInfo>>;

    /// Validates parameters ahead of creation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] when the parameters are unusable.
    fn validate_volume_params(&self, params: &VolumeParams) -> Result<(), StorageError>;
}
