//! Command-line interface definitions for the `gce-storage` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `gce-storage` binary.
#[derive(Debug, Parser)]
#[command(
    name = "gce-storage",
    about = "Create, attach, and destroy GCE persistent disks for an environment",
    version
)]
pub(crate) struct Cli {
    /// Operation to perform. Nothing happens when omitted.
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

/// Volume operations exposed by the binary.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the volumes in every zone of the configured region.
    #[command(name = "list")]
    List,
    /// Describe volumes by ID. Any failure aborts the whole call.
    #[command(name = "describe")]
    Describe(VolumeIdsCommand),
    /// Create a volume in the zone of an instance and attach it there.
    #[command(name = "create")]
    Create(CreateCommand),
    /// Destroy volumes by ID.
    #[command(name = "destroy")]
    Destroy(VolumeIdsCommand),
    /// Attach an existing volume to an instance.
    #[command(name = "attach")]
    Attach(AttachCommand),
    /// Detach a volume from an instance.
    #[command(name = "detach")]
    Detach(DetachCommand),
}

/// Arguments naming one or more volumes.
#[derive(Debug, Args)]
pub(crate) struct VolumeIdsCommand {
    /// Volume IDs in `<zone>--<suffix>` form.
    #[arg(required = true, value_name = "VOLUME_ID")]
    pub(crate) volume_ids: Vec<String>,
}

/// Arguments for `gce-storage create`.
#[derive(Debug, Args)]
pub(crate) struct CreateCommand {
    /// Requested size in mebibytes; rounded up to whole gibibytes.
    #[arg(long, value_name = "MIB")]
    pub(crate) size_mib: u64,
    /// Running instance that decides the zone and receives the volume.
    #[arg(long, value_name = "INSTANCE")]
    pub(crate) instance: String,
    /// Tag recorded against the new volume.
    #[arg(long, value_name = "TAG")]
    pub(crate) tag: String,
    /// Machine tag recorded against the attachment. Defaults to the instance.
    #[arg(long, value_name = "TAG")]
    pub(crate) machine: Option<String>,
    /// Persistent disk type, for example `pd-ssd`.
    #[arg(long, value_name = "TYPE")]
    pub(crate) disk_type: Option<String>,
}

/// Arguments for `gce-storage attach`.
#[derive(Debug, Args)]
pub(crate) struct AttachCommand {
    /// Volume to attach.
    #[arg(long, value_name = "VOLUME_ID")]
    pub(crate) volume_id: String,
    /// Instance receiving the volume.
    #[arg(long, value_name = "INSTANCE")]
    pub(crate) instance: String,
    /// Attach the volume read-only.
    #[arg(long)]
    pub(crate) read_only: bool,
}

/// Arguments for `gce-storage detach`.
#[derive(Debug, Args)]
pub(crate) struct DetachCommand {
    /// Volume to detach.
    #[arg(long, value_name = "VOLUME_ID")]
    pub(crate) volume_id: String,
    /// Instance holding the volume.
    #[arg(long, value_name = "INSTANCE")]
    pub(crate) instance: String,
}
