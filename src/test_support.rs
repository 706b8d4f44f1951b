//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tracing::{Dispatch, Level};

use crate::config::EnvironConfig;
use crate::gce::{
    AttachedDisk, AvailabilityZone, BackendFuture, Connection, Connector, Disk, DiskMode,
    DiskSpec, Instance, InstanceStatus,
};
use crate::logging::Logger;
use crate::storage::StorageError;

/// Connection operations that can be scripted to fail.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum FailurePoint {
    /// `create_disks`.
    CreateDisks,
    /// `remove_disk`.
    RemoveDisk,
    /// `attach_disk`.
    AttachDisk,
    /// `detach_disk`.
    DetachDisk,
    /// `disk`.
    Disk,
    /// `disks` for the named zone only.
    Disks(String),
    /// `instances`.
    Instances,
    /// `instance_disks`.
    InstanceDisks,
    /// `availability_zones`.
    AvailabilityZones,
}

/// A call recorded by [`FakeConnection`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConnectionCall {
    /// `create_disks`.
    CreateDisks {
        /// Zone passed by the caller.
        zone: String,
        /// Disk specs passed by the caller.
        specs: Vec<DiskSpec>,
    },
    /// `remove_disk`.
    RemoveDisk {
        /// Zone passed by the caller.
        zone: String,
        /// Disk name passed by the caller.
        name: String,
    },
    /// `attach_disk`.
    AttachDisk {
        /// Zone passed by the caller.
        zone: String,
        /// Disk name passed by the caller.
        volume_name: String,
        /// Instance passed by the caller.
        instance_id: String,
        /// Requested mode.
        mode: DiskMode,
    },
    /// `detach_disk`.
    DetachDisk {
        /// Zone passed by the caller.
        zone: String,
        /// Instance passed by the caller.
        instance_id: String,
        /// Disk name passed by the caller.
        volume_name: String,
    },
    /// `disk`.
    Disk {
        /// Zone passed by the caller.
        zone: String,
        /// Disk name passed by the caller.
        name: String,
    },
    /// `disks`.
    Disks {
        /// Zone passed by the caller.
        zone: String,
    },
    /// `instances`.
    Instances {
        /// Zone filter passed by the caller.
        zone: Option<String>,
        /// Status filter passed by the caller.
        status: InstanceStatus,
    },
    /// `instance_disks`.
    InstanceDisks {
        /// Zone passed by the caller.
        zone: String,
        /// Instance passed by the caller.
        instance_id: String,
    },
    /// `availability_zones`.
    AvailabilityZones {
        /// Region passed by the caller.
        region: String,
    },
}

/// Errors raised by [`FakeConnection`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FakeConnectionError {
    /// Raised by an operation scripted to fail.
    #[error("injected {0:?} failure")]
    Injected(FailurePoint),
    /// Raised when a disk does not exist.
    #[error("disk {name} not found in zone {zone}")]
    DiskNotFound {
        /// Zone searched.
        zone: String,
        /// Disk name.
        name: String,
    },
    /// Raised when an instance does not exist.
    #[error("instance {0} not found")]
    InstanceNotFound(String),
    /// Raised when attaching a disk twice.
    #[error("disk {volume_name} already attached to instance {instance_id}")]
    AlreadyAttached {
        /// Disk name.
        volume_name: String,
        /// Instance identifier.
        instance_id: String,
    },
    /// Raised when detaching a disk that is not attached.
    #[error("disk {volume_name} is not attached to instance {instance_id}")]
    NotAttached {
        /// Disk name.
        volume_name: String,
        /// Instance identifier.
        instance_id: String,
    },
}

#[derive(Debug, Default)]
struct State {
    zones: Vec<AvailabilityZone>,
    disks: BTreeMap<String, BTreeMap<String, Disk>>,
    instances: Vec<Instance>,
    attachments: HashMap<String, Vec<AttachedDisk>>,
    failures: HashSet<FailurePoint>,
    removal_delays: HashMap<String, Duration>,
    extra_disk_on_create: bool,
    next_disk_id: u64,
    next_device: u64,
    calls: Vec<ConnectionCall>,
}

impl State {
    fn check(&self, point: FailurePoint) -> Result<(), FakeConnectionError> {
        if self.failures.contains(&point) {
            return Err(FakeConnectionError::Injected(point));
        }
        Ok(())
    }

    fn instance_exists(&self, instance_id: &str) -> Result<(), FakeConnectionError> {
        if self
            .instances
            .iter()
            .any(|instance| instance.id == instance_id)
        {
            Ok(())
        } else {
            Err(FakeConnectionError::InstanceNotFound(instance_id.to_owned()))
        }
    }
}

/// In-memory compute backend that records every call.
///
/// Clones share state, so a test can keep a handle while the volume source
/// owns another.
#[derive(Clone, Debug, Default)]
pub struct FakeConnection {
    state: Arc<Mutex<State>>,
}

impl FakeConnection {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an availability zone reported as `UP`.
    pub fn add_zone(&self, name: &str) {
        self.lock().zones.push(AvailabilityZone::new(name));
    }

    /// Adds an instance.
    pub fn add_instance(&self, id: &str, zone: &str, status: InstanceStatus) {
        self.lock().instances.push(Instance {
            id: id.to_owned(),
            zone: zone.to_owned(),
            status,
        });
    }

    /// Adds an existing disk.
    pub fn add_disk(&self, zone: &str, name: &str, size_gb: u64) {
        let mut state = self.lock();
        state.next_disk_id += 1;
        let disk = Disk {
            id: state.next_disk_id.to_string(),
            name: name.to_owned(),
            zone: zone.to_owned(),
            size_gb,
            status: String::from("READY"),
        };
        state
            .disks
            .entry(zone.to_owned())
            .or_default()
            .insert(name.to_owned(), disk);
    }

    /// Records an existing attachment.
    pub fn add_attachment(&self, instance_id: &str, volume_name: &str, device_name: &str) {
        self.lock()
            .attachments
            .entry(instance_id.to_owned())
            .or_default()
            .push(AttachedDisk {
                volume_name: volume_name.to_owned(),
                device_name: device_name.to_owned(),
                mode: DiskMode::ReadWrite,
            });
    }

    /// Makes every later call to the given operation fail.
    pub fn fail(&self, point: FailurePoint) {
        self.lock().failures.insert(point);
    }

    /// Delays the completion of `remove_disk` for the named disk.
    pub fn delay_removal(&self, name: &str, delay: Duration) {
        self.lock().removal_delays.insert(name.to_owned(), delay);
    }

    /// Makes `create_disks` report one more disk than requested.
    pub fn report_extra_disk_on_create(&self) {
        self.lock().extra_disk_on_create = true;
    }

    /// Returns every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ConnectionCall> {
        self.lock().calls.clone()
    }

    /// Counts recorded calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&ConnectionCall) -> bool) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    /// Names of the disks currently in `zone`.
    #[must_use]
    pub fn disk_names(&self, zone: &str) -> Vec<String> {
        self.lock()
            .disks
            .get(zone)
            .map(|disks| disks.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Disks currently attached to `instance_id`.
    #[must_use]
    pub fn attachments(&self, instance_id: &str) -> Vec<AttachedDisk> {
        self.lock()
            .attachments
            .get(instance_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Connection for FakeConnection {
    type Error = FakeConnectionError;

    fn create_disks<'a>(
        &'a self,
        zone: &'a str,
        specs: &'a [DiskSpec],
    ) -> BackendFuture<'a, Vec<Disk>, Self::Error> {
        let result = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::CreateDisks {
                zone: zone.to_owned(),
                specs: specs.to_vec(),
            });
            state.check(FailurePoint::CreateDisks).map(|()| {
                let mut created = Vec::with_capacity(specs.len());
                for spec in specs {
                    state.next_disk_id += 1;
                    let disk = Disk {
                        id: state.next_disk_id.to_string(),
                        name: spec.name.clone(),
                        zone: zone.to_owned(),
                        size_gb: spec.size_hint_gb,
                        status: String::from("READY"),
                    };
                    state
                        .disks
                        .entry(zone.to_owned())
                        .or_default()
                        .insert(spec.name.clone(), disk.clone());
                    created.push(disk);
                }
                if state.extra_disk_on_create
                    && let Some(first) = created.first().cloned()
                {
                    created.push(Disk {
                        name: format!("{}-extra", first.name),
                        ..first
                    });
                }
                created
            })
        };
        Box::pin(async move { result })
    }

    fn remove_disk<'a>(
        &'a self,
        zone: &'a str,
        name: &'a str,
    ) -> BackendFuture<'a, (), Self::Error> {
        let (checked, delay) = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::RemoveDisk {
                zone: zone.to_owned(),
                name: name.to_owned(),
            });
            (
                state.check(FailurePoint::RemoveDisk),
                state.removal_delays.get(name).copied(),
            )
        };
        Box::pin(async move {
            if let Some(duration) = delay {
                tokio::time::sleep(duration).await;
            }
            checked?;
            let mut state = self.lock();
            state
                .disks
                .get_mut(zone)
                .and_then(|disks| disks.remove(name))
                .map(|_| ())
                .ok_or_else(|| FakeConnectionError::DiskNotFound {
                    zone: zone.to_owned(),
                    name: name.to_owned(),
                })
        })
    }

    fn attach_disk<'a>(
        &'a self,
        zone: &'a str,
        volume_name: &'a str,
        instance_id: &'a str,
        mode: DiskMode,
    ) -> BackendFuture<'a, AttachedDisk, Self::Error> {
        let result = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::AttachDisk {
                zone: zone.to_owned(),
                volume_name: volume_name.to_owned(),
                instance_id: instance_id.to_owned(),
                mode,
            });
            Self::attach_locked(&mut state, zone, volume_name, instance_id, mode)
        };
        Box::pin(async move { result })
    }

    fn detach_disk<'a>(
        &'a self,
        zone: &'a str,
        instance_id: &'a str,
        volume_name: &'a str,
    ) -> BackendFuture<'a, (), Self::Error> {
        let result = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::DetachDisk {
                zone: zone.to_owned(),
                instance_id: instance_id.to_owned(),
                volume_name: volume_name.to_owned(),
            });
            state.check(FailurePoint::DetachDisk).and_then(|()| {
                let attached = state.attachments.entry(instance_id.to_owned()).or_default();
                let before = attached.len();
                attached.retain(|disk| disk.volume_name != volume_name);
                if attached.len() == before {
                    return Err(FakeConnectionError::NotAttached {
                        volume_name: volume_name.to_owned(),
                        instance_id: instance_id.to_owned(),
                    });
                }
                Ok(())
            })
        };
        Box::pin(async move { result })
    }

    fn disk<'a>(&'a self, zone: &'a str, name: &'a str) -> BackendFuture<'a, Disk, Self::Error> {
        let result = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::Disk {
                zone: zone.to_owned(),
                name: name.to_owned(),
            });
            state.check(FailurePoint::Disk).and_then(|()| {
                state
                    .disks
                    .get(zone)
                    .and_then(|disks| disks.get(name))
                    .cloned()
                    .ok_or_else(|| FakeConnectionError::DiskNotFound {
                        zone: zone.to_owned(),
                        name: name.to_owned(),
                    })
            })
        };
        Box::pin(async move { result })
    }

    fn disks<'a>(&'a self, zone: &'a str) -> BackendFuture<'a, Vec<Disk>, Self::Error> {
        let result = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::Disks {
                zone: zone.to_owned(),
            });
            state
                .check(FailurePoint::Disks(zone.to_owned()))
                .map(|()| {
                    state
                        .disks
                        .get(zone)
                        .map(|disks| disks.values().cloned().collect())
                        .unwrap_or_default()
                })
        };
        Box::pin(async move { result })
    }

    fn instances<'a>(
        &'a self,
        zone: Option<&'a str>,
        status: InstanceStatus,
    ) -> BackendFuture<'a, Vec<Instance>, Self::Error> {
        let result = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::Instances {
                zone: zone.map(str::to_owned),
                status,
            });
            state.check(FailurePoint::Instances).map(|()| {
                state
                    .instances
                    .iter()
                    .filter(|instance| instance.status == status)
                    .filter(|instance| zone.is_none_or(|name| instance.zone == name))
                    .cloned()
                    .collect()
            })
        };
        Box::pin(async move { result })
    }

    fn instance_disks<'a>(
        &'a self,
        zone: &'a str,
        instance_id: &'a str,
    ) -> BackendFuture<'a, Vec<AttachedDisk>, Self::Error> {
        let result = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::InstanceDisks {
                zone: zone.to_owned(),
                instance_id: instance_id.to_owned(),
            });
            state
                .check(FailurePoint::InstanceDisks)
                .and_then(|()| state.instance_exists(instance_id))
                .map(|()| {
                    state
                        .attachments
                        .get(instance_id)
                        .cloned()
                        .unwrap_or_default()
                })
        };
        Box::pin(async move { result })
    }

    fn availability_zones<'a>(
        &'a self,
        region: &'a str,
    ) -> BackendFuture<'a, Vec<AvailabilityZone>, Self::Error> {
        let result = {
            let mut state = self.lock();
            state.calls.push(ConnectionCall::AvailabilityZones {
                region: region.to_owned(),
            });
            state.check(FailurePoint::AvailabilityZones).map(|()| {
                state
                    .zones
                    .iter()
                    .filter(|zone| region.is_empty() || zone.name().starts_with(region))
                    .cloned()
                    .collect()
            })
        };
        Box::pin(async move { result })
    }
}

impl FakeConnection {
    fn attach_locked(
        state: &mut State,
        zone: &str,
        volume_name: &str,
        instance_id: &str,
        mode: DiskMode,
    ) -> Result<AttachedDisk, FakeConnectionError> {
        state.check(FailurePoint::AttachDisk)?;
        state.instance_exists(instance_id)?;
        let disk_exists = state
            .disks
            .get(zone)
            .is_some_and(|disks| disks.contains_key(volume_name));
        if !disk_exists {
            return Err(FakeConnectionError::DiskNotFound {
                zone: zone.to_owned(),
                name: volume_name.to_owned(),
            });
        }
        let attached = state.attachments.entry(instance_id.to_owned()).or_default();
        if attached.iter().any(|disk| disk.volume_name == volume_name) {
            return Err(FakeConnectionError::AlreadyAttached {
                volume_name: volume_name.to_owned(),
                instance_id: instance_id.to_owned(),
            });
        }
        state.next_device += 1;
        let disk = AttachedDisk {
            volume_name: volume_name.to_owned(),
            device_name: format!("persistent-disk-{}", state.next_device),
            mode,
        };
        state
            .attachments
            .entry(instance_id.to_owned())
            .or_default()
            .push(disk.clone());
        Ok(disk)
    }
}

/// Connector handing out clones of a [`FakeConnection`].
#[derive(Clone, Debug, Default)]
pub struct FakeConnector {
    connection: FakeConnection,
    failure: Option<StorageError>,
}

impl FakeConnector {
    /// Creates a connector for `connection`.
    #[must_use]
    pub const fn new(connection: FakeConnection) -> Self {
        Self {
            connection,
            failure: None,
        }
    }

    /// Makes `connect` fail with `error`.
    #[must_use]
    pub fn failing(mut self, error: StorageError) -> Self {
        self.failure = Some(error);
        self
    }
}

impl Connector for FakeConnector {
    type Connection = FakeConnection;

    fn connect(&self, _environ: &EnvironConfig) -> Result<FakeConnection, StorageError> {
        self.failure
            .clone()
            .map_or_else(|| Ok(self.connection.clone()), Err)
    }
}

/// Collects log output written through a [`Logger`].
#[derive(Clone, Debug, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Creates an empty capture buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a logger writing plain-text events at `DEBUG` and above into
    /// this buffer.
    #[must_use]
    pub fn logger(&self) -> Logger {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(Level::DEBUG)
            .finish();
        Logger::new(Dispatch::new(subscriber))
    }

    /// Returns everything logged so far.
    #[must_use]
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Builds an environment configuration suitable for tests.
#[must_use]
pub fn environ_config() -> EnvironConfig {
    EnvironConfig {
        name: String::from("test-env"),
        uuid: Some(String::from("6a3c0b8e-5a47-4d1f-9f62-3f1c0b9d2e11")),
        project_id: String::from("test-project"),
        region: String::from("us-east1"),
        access_token: String::from("token"),
        api_endpoint: String::from("https://compute.example.invalid/compute/v1"),
        http_timeout_secs: 5,
        operation_poll_interval_ms: 1,
        operation_timeout_secs: 1,
    }
}
