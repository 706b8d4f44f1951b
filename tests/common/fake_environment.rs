//! Shared fake cloud used by the integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared helpers under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/fake_environment.rs"]
//! mod fake_environment;
//! ```

use gce_storage::gce::InstanceStatus;
use gce_storage::test_support::{FakeConnection, FakeConnector, environ_config};
use gce_storage::{
    EnvironConfig, GceStorageProvider, GceVolumeSource, Logger, Provider, ProviderConfig,
};

/// Region searched by the fake environment.
pub const REGION: &str = "us-east1";

/// Zones of [`REGION`] known to the fake cloud.
pub const ZONES: [&str; 3] = ["us-east1-b", "us-east1-c", "us-east1-d"];

/// A fake cloud with one running instance per zone (`i-b`, `i-c`, `i-d`)
/// and one stopped instance (`i-stopped`).
pub fn fake_cloud() -> FakeConnection {
    let connection = FakeConnection::new();
    for zone in ZONES {
        connection.add_zone(zone);
        let suffix = zone.rsplit('-').next().unwrap_or(zone);
        connection.add_instance(&format!("i-{suffix}"), zone, InstanceStatus::Running);
    }
    connection.add_instance("i-stopped", "us-east1-b", InstanceStatus::Stopped);
    connection
}

/// Environment configuration pointing at [`REGION`].
pub fn environ() -> EnvironConfig {
    EnvironConfig {
        region: String::from(REGION),
        ..environ_config()
    }
}

/// Builds a volume source over `connection` through the provider façade.
pub fn volume_source(
    connection: &FakeConnection,
    logger: Logger,
) -> GceVolumeSource<FakeConnection> {
    GceStorageProvider::with_connector(FakeConnector::new(connection.clone()), logger)
        .volume_source(&environ(), &ProviderConfig::default())
        .unwrap_or_else(|err| panic!("volume source: {err}"))
}
