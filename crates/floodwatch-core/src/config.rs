//! Application configuration with layered loading.
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `FLOODWATCH_CONFIG` env var
//! 3. **Environment variables**: `FLOODWATCH__*` env vars override specific
//!    fields, with `__` as the nesting separator
//!    (e.g. `FLOODWATCH__THRESHOLDS__WINDOW_MINUTES=30`)
//!
//! Configuration is validated at load time. Invalid configurations (zero
//! windows, inverted warn/critical pairs) return errors rather than failing
//! silently.
//!
//! # Example
//!
//! ```toml
//! [thresholds]
//! floods_per_session_warn = 3
//! floods_per_session_critical = 5
//! window_minutes = 60
//!
//! [retention]
//! max_events = 10000
//! max_alerts = 1000
//!
//! [dispatch]
//! callback_timeout_seconds = 5
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

use crate::thresholds::Thresholds;

/// Bounds on how much history the monitor keeps in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Maximum retained events. Oldest are evicted first. Defaults to `10000`.
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Maximum retained alerts. Acknowledged alerts are evicted before active
    /// ones. Defaults to `1000`.
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,
}

fn default_max_events() -> usize {
    10_000
}

fn default_max_alerts() -> usize {
    1000
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { max_events: default_max_events(), max_alerts: default_max_alerts() }
    }
}

/// Subscriber callback dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Seconds a single callback may run before the worker abandons it.
    /// Defaults to `5`.
    #[serde(default = "default_callback_timeout_seconds")]
    pub callback_timeout_seconds: u64,
}

fn default_callback_timeout_seconds() -> u64 {
    5
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { callback_timeout_seconds: default_callback_timeout_seconds() }
    }
}

/// Logging output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (`trace`, `debug`, `info`, `warn`, `error`).
    /// Defaults to `info`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format, either `"json"` or `"pretty"`. Defaults to `pretty`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Alerting thresholds and the sliding window length.
    #[serde(default)]
    pub thresholds: Thresholds,

    /// In-memory retention caps for events and alerts.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Subscriber callback dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Log level and format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `FLOODWATCH__` prefix override any
    /// configuration value, with `__` as the nesting separator
    /// (e.g. `FLOODWATCH__RETENTION__MAX_EVENTS=50000`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// deserialized. A missing file is not an error; defaults apply.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("thresholds.floods_per_session_warn", 3)?
            .set_default("thresholds.floods_per_session_critical", 5)?
            .set_default("thresholds.floods_per_task_warn", 5)?
            .set_default("thresholds.floods_per_task_critical", 10)?
            .set_default("thresholds.wait_seconds_warn", 300)?
            .set_default("thresholds.wait_seconds_critical", 600)?
            .set_default("thresholds.window_minutes", 60)?
            .set_default("retention.max_events", 10_000)?
            .set_default("retention.max_alerts", 1000)?
            .set_default("dispatch.callback_timeout_seconds", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("FLOODWATCH").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/floodwatch.toml` with fallback to
    /// defaults. The path can be overridden with the `FLOODWATCH_CONFIG`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("FLOODWATCH_CONFIG")
            .unwrap_or_else(|_| "config/floodwatch.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the callback timeout as a [`Duration`].
    #[must_use]
    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch.callback_timeout_seconds)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - Window, retention caps, and callback timeout are greater than zero
    /// - Each warn threshold does not exceed its critical counterpart
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.thresholds.window_minutes == 0 {
            return Err("Sliding window must be greater than 0 minutes".to_string());
        }

        if self.thresholds.floods_per_session_warn > self.thresholds.floods_per_session_critical {
            return Err(format!(
                "Session warn threshold {} exceeds critical threshold {}",
                self.thresholds.floods_per_session_warn,
                self.thresholds.floods_per_session_critical
            ));
        }

        if self.thresholds.floods_per_task_warn > self.thresholds.floods_per_task_critical {
            return Err(format!(
                "Task warn threshold {} exceeds critical threshold {}",
                self.thresholds.floods_per_task_warn, self.thresholds.floods_per_task_critical
            ));
        }

        if self.thresholds.wait_seconds_warn > self.thresholds.wait_seconds_critical {
            return Err(format!(
                "Wait warn threshold {} exceeds critical threshold {}",
                self.thresholds.wait_seconds_warn, self.thresholds.wait_seconds_critical
            ));
        }

        if self.retention.max_events == 0 {
            return Err("Event retention cap must be greater than 0".to_string());
        }

        if self.retention.max_alerts == 0 {
            return Err("Alert retention cap must be greater than 0".to_string());
        }

        if self.dispatch.callback_timeout_seconds == 0 {
            return Err("Callback timeout must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
