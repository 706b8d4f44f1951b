//! Value types shared by the GCE connection and volume source.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute key selecting the persistent disk type.
pub const DISK_TYPE_ATTRIBUTE: &str = "type";

/// Disk type used when a volume does not request one.
pub const DEFAULT_DISK_TYPE: &str = "pd-standard";

/// GCE persistent disk type (for example `pd-standard` or `pd-ssd`).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiskType(String);

impl DiskType {
    /// Wraps a disk type name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Resolves the disk type from volume attributes.
    ///
    /// A missing `type` attribute, or one that is not a string, falls back to
    /// [`DEFAULT_DISK_TYPE`].
    #[must_use]
    pub fn from_attributes(attributes: &Map<String, Value>) -> Self {
        attributes
            .get(DISK_TYPE_ATTRIBUTE)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(Self::default, Self::new)
    }

    /// Returns the disk type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for DiskType {
    fn default() -> Self {
        Self::new(DEFAULT_DISK_TYPE)
    }
}

impl fmt::Display for DiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access mode of an attached disk.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiskMode {
    /// Read-write access (the GCE default).
    #[default]
    ReadWrite,
    /// Read-only access.
    ReadOnly,
}

impl DiskMode {
    /// Selects the mode for an attachment request.
    #[must_use]
    pub const fn for_read_only(read_only: bool) -> Self {
        if read_only {
            Self::ReadOnly
        } else {
            Self::ReadWrite
        }
    }

    /// Returns the API spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadWrite => "READ_WRITE",
            Self::ReadOnly => "READ_ONLY",
        }
    }
}

/// Lifecycle status of a compute instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    /// Resources are being allocated.
    Provisioning,
    /// Resources are acquired; the instance is preparing to run.
    Staging,
    /// The instance is running.
    Running,
    /// The instance is being stopped.
    Stopping,
    /// The instance is stopped.
    Stopped,
    /// The instance is being suspended.
    Suspending,
    /// The instance is suspended.
    Suspended,
    /// The instance is being repaired.
    Repairing,
    /// The instance has been shut down.
    Terminated,
    /// A status this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    /// Returns the API spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provisioning => "PROVISIONING",
            Self::Staging => "STAGING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::Suspending => "SUSPENDING",
            Self::Suspended => "SUSPENDED",
            Self::Repairing => "REPAIRING",
            Self::Terminated => "TERMINATED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
