//! Layered runtime configuration.
//!
//! Values resolve from built-in defaults, then an optional
//! `ticketflow.toml` in the working directory, then environment variables
//! prefixed with `TICKETFLOW` using `__` between path segments, for example
//! `TICKETFLOW__DATABASE__URL` or `TICKETFLOW__SWEEPER__INTERVAL_SECONDS`.

use crate::task::services::{TesterVisibility, WorkflowPolicy};
use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Base name of the optional configuration file.
pub const CONFIG_FILE: &str = "ticketflow";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TICKETFLOW";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Database connection settings.
    pub database: DatabaseSettings,
    /// Expiry sweeper settings.
    #[serde(default)]
    pub sweeper: SweeperSettings,
    /// Per-request persistence bounds.
    #[serde(default)]
    pub persistence: PersistenceSettings,
    /// Listing scope rules.
    #[serde(default)]
    pub scope: ScopeSettings,
    /// Logging settings.
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Database connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Connection URL.
    pub url: SecretString,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Expiry sweeper settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SweeperSettings {
    /// Whether the sweeper runs at all.
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Seconds between sweeps.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
}

impl Default for SweeperSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: default_interval_seconds(),
        }
    }
}

impl SweeperSettings {
    /// Returns the cadence between sweeps, never shorter than one second.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }
}

/// Per-request persistence bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PersistenceSettings {
    /// Seconds a single database call may take.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl PersistenceSettings {
    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Listing scope rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ScopeSettings {
    /// How far a responsible tester's listing reaches.
    #[serde(default)]
    pub responsible_tester_visibility: TesterVisibility,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelemetrySettings {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON lines instead of compact text.
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

impl Settings {
    /// Loads settings from the file and environment layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a layer cannot be read or the merged
    /// values do not deserialize, for example when no database URL is set.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).separator("__")),
        )
    }

    /// Deserializes settings from caller-supplied layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the layers cannot be merged or
    /// deserialized.
    pub fn from_builder(
        builder: config::ConfigBuilder<DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Returns the workflow rules the settings describe.
    #[must_use]
    pub const fn workflow_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            tester_visibility: self.scope.responsible_tester_visibility,
        }
    }
}

const fn enabled() -> bool {
    true
}

const fn default_pool_size() -> u32 {
    8
}

const fn default_interval_seconds() -> u64 {
    30
}

const fn default_request_timeout_seconds() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}
