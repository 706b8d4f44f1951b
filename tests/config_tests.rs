//! Unit tests for environment configuration.

use std::time::Duration;

use gce_storage::test_support::environ_config;
use gce_storage::{ConfigError, EnvironConfig};
use rstest::*;

#[fixture]
fn valid_config() -> EnvironConfig {
    environ_config()
}

#[rstest]
fn complete_configuration_validates(valid_config: EnvironConfig) {
    assert_eq!(valid_config.validate(), Ok(()));
}

/// Verifies that validation produces actionable errors mentioning both the
/// environment variable and configuration file for each required field.
#[rstest]
#[case::project(|cfg: &mut EnvironConfig| cfg.project_id.clear(), "GCE_PROJECT_ID", "project_id")]
#[case::region(|cfg: &mut EnvironConfig| cfg.region = String::from("  "), "GCE_REGION", "region")]
#[case::token(|cfg: &mut EnvironConfig| cfg.access_token.clear(), "GCE_ACCESS_TOKEN", "access_token")]
#[case::endpoint(|cfg: &mut EnvironConfig| cfg.api_endpoint.clear(), "GCE_API_ENDPOINT", "api_endpoint")]
fn validation_errors_are_actionable(
    valid_config: EnvironConfig,
    #[case] mutate: fn(&mut EnvironConfig),
    #[case] env_var: &str,
    #[case] toml_key: &str,
) {
    let mut cfg = valid_config;
    mutate(&mut cfg);

    let error = cfg.validate().expect_err("validation should fail");
    let ConfigError::MissingField(ref message) = error else {
        panic!("expected MissingField error, got {error:?}");
    };
    assert!(
        message.contains(env_var),
        "error should mention env var {env_var}: {message}"
    );
    assert!(
        message.contains("gce-storage.toml"),
        "error should mention config file: {message}"
    );
    assert!(
        message.contains(toml_key),
        "error should mention TOML key {toml_key}: {message}"
    );
}

#[rstest]
#[case::present(Some(" env-uuid "), Some("env-uuid"))]
#[case::blank(Some("   "), None)]
#[case::absent(None, None)]
fn environ_uuid_ignores_blank_values(
    valid_config: EnvironConfig,
    #[case] uuid: Option<&str>,
    #[case] expected: Option<&str>,
) {
    let cfg = EnvironConfig {
        uuid: uuid.map(str::to_owned),
        ..valid_config
    };
    assert_eq!(cfg.environ_uuid(), expected);
}

#[rstest]
fn durations_follow_configured_units(valid_config: EnvironConfig) {
    let cfg = EnvironConfig {
        http_timeout_secs: 12,
        operation_poll_interval_ms: 250,
        operation_timeout_secs: 90,
        ..valid_config
    };
    assert_eq!(cfg.http_timeout(), Duration::from_secs(12));
    assert_eq!(cfg.operation_poll_interval(), Duration::from_millis(250));
    assert_eq!(cfg.operation_timeout(), Duration::from_secs(90));
}
