//! Request and result types exchanged with storage providers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::StorageError;

/// Kind of storage a provider can offer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Raw block devices.
    Block,
    /// Mountable filesystems.
    Filesystem,
}

/// Level at which a provider's storage is managed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Scope {
    /// Managed centrally for the whole environment.
    Environ,
    /// Managed by the agent running on each machine.
    Machine,
}

/// Parameters required to attach a volume to an instance.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VolumeAttachmentParams {
    /// Tag of the volume being attached.
    pub volume_tag: String,
    /// Tag of the machine the volume is attached to.
    pub machine_tag: String,
    /// Provider identifier of the target instance.
    pub instance_id: String,
    /// Provider identifier of the volume. Empty until the volume exists.
    #[serde(default)]
    pub volume_id: String,
    /// Whether the volume should be attached read-only.
    #[serde(default)]
    pub read_only: bool,
}

/// Parameters required to create a volume.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VolumeParams {
    /// Tag identifying the volume to the orchestrator.
    pub tag: String,
    /// Requested size in mebibytes.
    pub size_mib: u64,
    /// Free-form provider attributes (for example the disk type).
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Attachment to perform once the volume exists.
    #[serde(default)]
    pub attachment: Option<VolumeAttachmentParams>,
}

impl VolumeParams {
    /// Creates parameters for a volume of `size_mib` mebibytes.
    #[must_use]
    pub fn new(tag: impl Into<String>, size_mib: u64) -> Self {
        Self {
            tag: tag.into().trim().to_owned(),
            size_mib,
            attributes: Map::new(),
            attachment: None,
        }
    }

    /// Sets a single provider attribute.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Requests that the new volume is attached to `instance_id`.
    #[must_use]
    pub fn attach_to(
        mut self,
        machine_tag: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Self {
        self.attachment = Some(VolumeAttachmentParams {
            volume_tag: self.tag.clone(),
            machine_tag: machine_tag.into(),
            instance_id: instance_id.into().trim().to_owned(),
            volume_id: String::new(),
            read_only: false,
        });
        self
    }
}

/// Provider facts about a volume.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    /// Provider volume identifier.
    pub volume_id: String,
    /// Size in mebibytes.
    pub size_mib: u64,
    /// Whether the volume outlives the instances it is attached to.
    pub persistent: bool,
}

/// A volume created by a provider.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Tag identifying the volume to the orchestrator.
    pub tag: String,
    /// Provider facts about the volume.
    pub info: VolumeInfo,
}

/// Provider facts about an attachment.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VolumeAttachmentInfo {
    /// Device name assigned by the provider.
    pub device_name: String,
    /// Whether the attachment is read-only.
    pub read_only: bool,
}

/// Association between a volume and a machine.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VolumeAttachment {
    /// Tag of the attached volume.
    pub volume_tag: String,
    /// Tag of the machine holding the attachment.
    pub machine_tag: String,
    /// Provider facts about the attachment.
    pub info: VolumeAttachmentInfo,
}

/// Successful outcome of creating one volume.
///
/// `attachment` is `None` when the volume was created but attaching it
/// failed; callers retry the attachment through `attach_volumes`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreatedVolume {
    /// The new volume.
    pub volume: Volume,
    /// The attachment made at creation time, if any.
    pub attachment: Option<VolumeAttachment>,
}

/// Per-item result of `create_volumes`.
pub type CreateVolumesResult = Result<CreatedVolume, StorageError>;

/// Per-item result of `attach_volumes`.
pub type AttachVolumesResult = Result<VolumeAttachment, StorageError>;

/// Per-item result of `destroy_volumes` and `detach_volumes`.
pub type VolumeOpResult = Result<(), StorageError>;
