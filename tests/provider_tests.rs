//! Provider façade behaviour through the public API.

#[path = "common/fake_environment.rs"]
mod fake_environment;

use gce_storage::test_support::{FakeConnection, FakeConnector};
use gce_storage::{
    GceStorageProvider, Logger, Provider, ProviderConfig, Scope, StorageError, StorageKind,
};
use rstest::rstest;

use fake_environment::{REGION, environ, fake_cloud};

fn provider(connection: &FakeConnection) -> GceStorageProvider<FakeConnector> {
    GceStorageProvider::with_connector(FakeConnector::new(connection.clone()), Logger::disabled())
}

#[rstest]
#[case::block(StorageKind::Block, true)]
#[case::filesystem(StorageKind::Filesystem, false)]
fn supports_block_storage_only(#[case] kind: StorageKind, #[case] expected: bool) {
    assert_eq!(provider(&fake_cloud()).supports(kind), expected);
}

#[test]
fn provider_is_dynamic_and_environ_scoped() {
    let provider = provider(&fake_cloud());
    assert!(provider.dynamic());
    assert_eq!(provider.scope(), Scope::Environ);
    assert_eq!(provider.validate_config(&ProviderConfig::default()), Ok(()));
}

#[test]
fn filesystem_sources_are_not_supported() {
    let err = provider(&fake_cloud())
        .filesystem_source(&environ(), &ProviderConfig::default())
        .expect_err("filesystems are unsupported");
    assert!(err.is_not_supported());
}

#[test]
fn volume_source_is_bound_to_the_environment() {
    let source = provider(&fake_cloud())
        .volume_source(&environ(), &ProviderConfig::default())
        .unwrap_or_else(|err| panic!("volume source: {err}"));
    let identity = source.identity();
    assert_eq!(identity.name, "test-env");
    assert_eq!(identity.uuid, "6a3c0b8e-5a47-4d1f-9f62-3f1c0b9d2e11");
    assert_eq!(identity.region, REGION);
}

#[test]
fn volume_source_requires_environment_uuid() {
    let cfg = gce_storage::EnvironConfig {
        uuid: None,
        ..environ()
    };
    let err = provider(&fake_cloud())
        .volume_source(&cfg, &ProviderConfig::default())
        .expect_err("uuid is required");
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[test]
fn connector_failures_surface_unchanged() {
    let provider = GceStorageProvider::with_connector(
        FakeConnector::new(fake_cloud()).failing(StorageError::backend("connect", "refused")),
        Logger::disabled(),
    );
    let err = provider
        .volume_source(&environ(), &ProviderConfig::default())
        .expect_err("connection fails");
    assert_eq!(err.to_string(), "connect: refused");
}
