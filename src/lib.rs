//! Block storage for Google Compute Engine environments.
//!
//! The crate defines storage provider contracts (a [`Provider`] hands out a
//! [`VolumeSource`]) and implements them for GCE persistent disks. Volumes
//! are created in the zone of the instance they are meant for, attached in
//! the same pass, and identified by `<zone>--<suffix>` names so later calls
//! can find them again without any other state.

pub mod config;
pub mod gce;
pub mod logging;
pub mod storage;
pub mod test_support;

pub use config::{ConfigError, EnvironConfig};
pub use gce::{
    ComputeClient, ComputeConnector, ComputeError, Connection, Connector, DISK_TYPE_ATTRIBUTE,
    EnvironIdentity, GceStorageProvider, GceVolumeSource, PROVIDER_TYPE, VolumeId,
};
pub use logging::{LOG_FILTER_ENV, Logger, stderr_dispatch};
pub use storage::{
    AttachVolumesResult, CreateVolumesResult, CreatedVolume, Provider, ProviderConfig, Scope,
    StorageError, StorageKind, Volume, VolumeAttachment, VolumeAttachmentInfo,
    VolumeAttachmentParams, VolumeInfo, VolumeOpResult, VolumeParams, VolumeSource,
};
