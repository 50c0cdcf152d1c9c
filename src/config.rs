//! Global configuration parsing and validation.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::queue::QueueOptions;
use crate::{AppError, Result};

/// Environment variable that overrides the configured scoring endpoint.
pub const ENDPOINT_ENV: &str = "SCORE_QUEUE_ENDPOINT";

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".score-queue")
}

fn default_storage_key() -> String {
    "pending_scores".into()
}

fn default_flush_interval_seconds() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Absolute URL of the scoring endpoint (`POST`).
    pub endpoint: String,
    /// Directory holding the persisted queue snapshot.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Fixed key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Seconds between background flush passes.
    #[serde(default = "default_flush_interval_seconds")]
    pub flush_interval_seconds: u64,
    /// Whether enqueueing a score immediately triggers a flush.
    #[serde(default = "default_true")]
    pub flush_on_add: bool,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string, apply environment overrides
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Interval between background flush passes.
    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_seconds)
    }

    /// Queue options derived from this configuration.
    #[must_use]
    pub fn queue_options(&self) -> QueueOptions {
        QueueOptions {
            storage_key: self.storage_key.clone(),
            flush_on_add: self.flush_on_add,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                info!(endpoint, "scoring endpoint overridden from environment");
                self.endpoint = endpoint.trim().to_owned();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint)
            .map_err(|err| AppError::Config(format!("endpoint invalid: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "endpoint must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.storage_key.trim().is_empty() {
            return Err(AppError::Config("storage_key must not be empty".into()));
        }

        if self.flush_interval_seconds == 0 {
            return Err(AppError::Config(
                "flush_interval_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
