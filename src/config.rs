//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Environment configuration for the GCE storage provider, derived from
/// environment variables, configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "GCE",
    discovery(
        app_name = "gce-storage",
        env_var = "GCE_STORAGE_CONFIG_PATH",
        config_file_name = "gce-storage.toml",
        dotfile_name = ".gce-storage.toml",
        project_file_name = "gce-storage.toml"
    )
)]
pub struct EnvironConfig {
    /// Human readable environment name. Not unique; informational only.
    #[ortho_config(default = "default".to_owned())]
    pub name: String,
    /// Unique environment identifier. Volume sources cannot be built
    /// without it.
    pub uuid: Option<String>,
    /// Google Cloud project that owns the disks and instances.
    pub project_id: String,
    /// Region whose availability zones are searched when listing volumes.
    pub region: String,
    /// OAuth bearer token presented to the Compute API.
    pub access_token: String,
    /// Base URL of the Compute Engine v1 API.
    #[ortho_config(default = "https://compute.googleapis.com/compute/v1".to_owned())]
    pub api_endpoint: String,
    /// Per-request HTTP timeout in seconds.
    #[ortho_config(default = 30)]
    pub http_timeout_secs: u64,
    /// Interval between zone operation polls in milliseconds.
    #[ortho_config(default = 1000)]
    pub operation_poll_interval_ms: u64,
    /// Maximum time to wait for a zone operation in seconds.
    #[ortho_config(default = 300)]
    pub operation_timeout_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl EnvironConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to gce-storage.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("gce-storage")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the environment UUID when one is configured and non-blank.
    #[must_use]
    pub fn environ_uuid(&self) -> Option<&str> {
        self.uuid
            .as_deref()
            .map(str::trim)
            .filter(|uuid| !uuid.is_empty())
    }

    /// HTTP timeout applied to each Compute API request.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Interval between zone operation polls.
    #[must_use]
    pub const fn operation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.operation_poll_interval_ms)
    }

    /// Maximum time to wait for a zone operation to finish.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Performs semantic validation on the fields needed to reach the
    /// Compute API. Error messages name the environment variable and the
    /// configuration key that supply each value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.project_id,
            &FieldMetadata::new("Google Cloud project ID", "GCE_PROJECT_ID", "project_id"),
        )?;
        Self::require_field(
            &self.region,
            &FieldMetadata::new("Compute region", "GCE_REGION", "region"),
        )?;
        Self::require_field(
            &self.access_token,
            &FieldMetadata::new("Compute API access token", "GCE_ACCESS_TOKEN", "access_token"),
        )?;
        Self::require_field(
            &self.api_endpoint,
            &FieldMetadata::new("Compute API endpoint", "GCE_API_ENDPOINT", "api_endpoint"),
        )?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
