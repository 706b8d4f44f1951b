//! Cloud connection contract consumed by the GCE volume source.

use std::future::Future;
use std::pin::Pin;

use super::types::{DiskMode, DiskType, InstanceStatus};
use crate::config::EnvironConfig;
use crate::storage::StorageError;

/// Future returned by connection operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Request to create one persistent disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiskSpec {
    /// Requested size in gibibytes.
    pub size_hint_gb: u64,
    /// Disk name; doubles as the volume identifier.
    pub name: String,
    /// Persistent disk type.
    pub disk_type: DiskType,
}

/// A persistent disk as reported by the backend.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Disk {
    /// Backend assigned numeric identifier.
    pub id: String,
    /// Disk name.
    pub name: String,
    /// Zone holding the disk.
    pub zone: String,
    /// Size in gibibytes.
    pub size_gb: u64,
    /// Backend status (for example `READY`).
    pub status: String,
}

/// A disk attached to an instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttachedDisk {
    /// Name of the attached disk.
    pub volume_name: String,
    /// Device name exposed to the guest.
    pub device_name: String,
    /// Access mode of the attachment.
    pub mode: DiskMode,
}

/// A compute instance as reported by the backend.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    /// Instance identifier.
    pub id: String,
    /// Zone holding the instance.
    pub zone: String,
    /// Lifecycle status.
    pub status: InstanceStatus,
}

/// An availability zone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AvailabilityZone {
    name: String,
}

impl AvailabilityZone {
    /// Creates a zone record.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Zone name (for example `us-east1-b`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Authenticated connection to the compute backend.
pub trait Connection: Send + Sync {
    /// Connection specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates disks in `zone`, returning the created disks.
    fn create_disks<'a>(
        &'a self,
        zone: &'a str,
        specs: &'a [DiskSpec],
    ) -> BackendFuture<'a, Vec<Disk>, Self::Error>;

    /// Deletes the named disk.
    fn remove_disk<'a>(
        &'a self,
        zone: &'a str,
        name: &'a str,
    ) -> BackendFuture<'a, (), Self::Error>;

    /// Attaches the named disk to an instance.
    fn attach_disk<'a>(
        &'a self,
        zone: &'a str,
        volume_name: &'a str,
        instance_id: &'a str,
        mode: DiskMode,
    ) -> BackendFuture<'a, AttachedDisk, Self::Error>;

    /// Detaches the named disk from an instance.
    fn detach_disk<'a>(
        &'a self,
        zone: &'a str,
        instance_id: &'a str,
        volume_name: &'a str,
    ) -> BackendFuture<'a, (), Self::Error>;

    /// Fetches one disk.
    fn disk<'a>(&'a self, zone: &'a str, name: &'a str) -> BackendFuture<'a, Disk, Self::Error>;

    /// Lists the disks in a zone.
    fn disks<'a>(&'a self, zone: &'a str) -> BackendFuture<'a, Vec<Disk>, Self::Error>;

    /// Lists instances with the given status, in `zone` or in every zone
    /// when `zone` is `None`.
    fn instances<'a>(
        &'a self,
        zone: Option<&'a str>,
        status: InstanceStatus,
    ) -> BackendFuture<'a, Vec<Instance>, Self::Error>;

    /// Lists the disks attached to an instance.
    fn instance_disks<'a>(
        &'a self,
        zone: &'a str,
        instance_id: &'a str,
    ) -> BackendFuture<'a, Vec<AttachedDisk>, Self::Error>;

    /// Lists the availability zones of `region` (every zone when empty).
    fn availability_zones<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<AvailabilityZone>, Self::Error>;
}

/// Establishes connections for a provider.
pub trait Connector: Send + Sync {
    /// Connection produced by this connector.
    type Connection: Connection;

    /// Opens an authenticated connection for the environment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the configuration is unusable or the
    /// client cannot be built.
    fn connect(&self, environ: &EnvironConfig) -> Result<Self::Connection, StorageError>;
}
