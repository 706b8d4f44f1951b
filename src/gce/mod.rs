//! Google Compute Engine implementation of the storage provider contracts.

mod connection;
mod http;
mod instance_cache;
mod source;
mod types;
mod units;
mod volume_id;

use crate::config::EnvironConfig;
use crate::logging::Logger;
use crate::storage::{
    NoFilesystems, Provider, ProviderConfig, Scope, StorageError, StorageKind,
};

pub use connection::{
    AttachedDisk, AvailabilityZone, BackendFuture, Connection, Connector, Disk, DiskSpec,
    Instance,
};
pub use http::{ComputeClient, ComputeConnector, ComputeError};
pub use source::{EnvironIdentity, GceVolumeSource};
pub use types::{DEFAULT_DISK_TYPE, DISK_TYPE_ATTRIBUTE, DiskMode, DiskType, InstanceStatus};
pub use units::{gib_to_mib, mib_to_gib};
pub use volume_id::{VOLUME_ID_SEPARATOR, VolumeId};

/// Provider type under which the GCE storage provider is registered.
pub const PROVIDER_TYPE: &str = "gce";

/// Storage provider offering dynamically provisioned GCE persistent disks.
#[derive(Clone, Debug)]
pub struct GceStorageProvider<K = ComputeConnector> {
    connector: K,
    logger: Logger,
}

impl GceStorageProvider {
    /// Creates a provider that talks to the Compute API over HTTP and logs
    /// through the caller's current dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_connector(ComputeConnector, Logger::current())
    }
}

impl Default for GceStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> GceStorageProvider<K> {
    /// Creates a provider with a custom connector and logger.
    #[must_use]
    pub const fn with_connector(connector: K, logger: Logger) -> Self {
        Self { connector, logger }
    }
}

impl<K: Connector> Provider for GceStorageProvider<K> {
    type Source = GceVolumeSource<K::Connection>;
    type Filesystems = NoFilesystems;

    fn validate_config(&self, _config: &ProviderConfig) -> Result<(), StorageError> {
        Ok(())
    }

    fn supports(&self, kind: StorageKind) -> bool {
        kind == StorageKind::Block
    }

    fn scope(&self) -> Scope {
        Scope::Environ
    }

    fn dynamic(&self) -> bool {
        true
    }

    fn filesystem_source(
        &self,
        _environ: &EnvironConfig,
        _config: &ProviderConfig,
    ) -> Result<Self::Filesystems, StorageError> {
        Err(StorageError::NotSupported(String::from("filesystems")))
    }

    fn volume_source(
        &self,
        environ: &EnvironConfig,
        _config: &ProviderConfig,
    ) -> Result<Self::Source, StorageError> {
        let uuid = environ
            .environ_uuid()
            .ok_or_else(|| StorageError::NotFound(String::from("environment UUID")))?;
        let connection = self.connector.connect(environ)?;
        Ok(GceVolumeSource::new(
            connection,
            EnvironIdentity::new(&environ.name, uuid, &environ.region),
            self.logger.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::VolumeSource;
    use crate::test_support::{FakeConnection, FakeConnector, environ_config};

    fn provider() -> GceStorageProvider<FakeConnector> {
        GceStorageProvider::with_connector(
            FakeConnector::new(FakeConnection::new()),
            Logger::disabled(),
        )
    }

    #[test]
    fn advertises_dynamic_environ_scoped_block_storage() {
        let provider = provider();
        assert!(provider.supports(StorageKind::Block));
        assert!(!provider.supports(StorageKind::Filesystem));
        assert_eq!(provider.scope(), Scope::Environ);
        assert!(provider.dynamic());
        assert!(provider.validate_config(&ProviderConfig::default()).is_ok());
    }

    #[test]
    fn filesystem_source_is_not_supported() {
        let err = provider()
            .filesystem_source(&environ_config(), &ProviderConfig::default())
            .expect_err("filesystems unsupported");
        assert!(err.is_not_supported());
        assert_eq!(err.to_string(), "filesystems not supported");
    }

    #[test]
    fn volume_source_binds_environment_identity() {
        let source = provider()
            .volume_source(&environ_config(), &ProviderConfig::default())
            .unwrap_or_else(|err| panic!("volume source: {err}"));
        let identity = source.identity();
        assert_eq!(identity.name, "test-env");
        assert_eq!(identity.uuid, "6a3c0b8e-5a47-4d1f-9f62-3f1c0b9d2e11");
        assert_eq!(identity.region, "us-east1");
        assert!(source.validate_volume_params(&crate::storage::VolumeParams::default()).is_ok());
    }

    #[test]
    fn volume_source_requires_environment_uuid() {
        for uuid in [None, Some(String::from("  "))] {
            let environ = EnvironConfig {
                uuid,
                ..environ_config()
            };
            let err = provider()
                .volume_source(&environ, &ProviderConfig::default())
                .expect_err("uuid required");
            assert!(err.is_not_found());
            assert_eq!(err.to_string(), "environment UUID not found");
        }
    }

    #[test]
    fn volume_source_surfaces_connection_failures() {
        let provider = GceStorageProvider::with_connector(
            FakeConnector::new(FakeConnection::new())
                .failing(StorageError::Config(String::from("bad token"))),
            Logger::disabled(),
        );
        let err = provider
            .volume_source(&environ_config(), &ProviderConfig::default())
            .expect_err("connect fails");
        assert_eq!(err, StorageError::Config(String::from("bad token")));
    }
}
