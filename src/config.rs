//! Application configuration loaded from TOML.
//!
//! Default location: `<config_dir>/spotbook/config.toml`
//! (`~/.config/spotbook/config.toml` on Linux). The `SPOTBOOK_CONFIG`
//! environment variable points at another file. Every section is optional
//! and falls back to its defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::BookingPolicy;
use crate::infrastructure::DatabaseConfig;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "SPOTBOOK_CONFIG";

/// Ceiling for the duration limits (ten years).
const MAX_CONFIGURABLE_HOURS: f64 = 87_600.0;
/// Ceiling for the cancellation window (one year).
const MAX_CANCELLATION_WINDOW_MINUTES: i64 = 525_600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub min_duration_hours: f64,
    pub max_duration_hours: f64,
    pub cancellation_window_minutes: i64,
    pub max_special_instructions: usize,
    /// Upper bound on a single spot or vehicle lookup
    pub lookup_timeout_ms: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            min_duration_hours: 0.5,
            max_duration_hours: 168.0,
            cancellation_window_minutes: 60,
            max_special_instructions: 500,
            lookup_timeout_ms: 2000,
        }
    }
}

/// `$SPOTBOOK_CONFIG` if set, otherwise `<config_dir>/spotbook/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spotbook")
        .join("config.toml")
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.booking;
        for (name, hours) in [
            ("min_duration_hours", b.min_duration_hours),
            ("max_duration_hours", b.max_duration_hours),
        ] {
            if !hours.is_finite() || hours <= 0.0 || hours > MAX_CONFIGURABLE_HOURS {
                return Err(ConfigError::Invalid(format!(
                    "booking.{name} must be a finite number of hours in (0, {MAX_CONFIGURABLE_HOURS}]"
                )));
            }
        }
        if b.max_duration_hours < b.min_duration_hours {
            return Err(ConfigError::Invalid(
                "booking.max_duration_hours must not be below min_duration_hours".into(),
            ));
        }
        if !(0..=MAX_CANCELLATION_WINDOW_MINUTES).contains(&b.cancellation_window_minutes) {
            return Err(ConfigError::Invalid(format!(
                "booking.cancellation_window_minutes must be within 0..={MAX_CANCELLATION_WINDOW_MINUTES}"
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }
        match self.logging.format.to_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "logging.format must be text or json, got {other}"
            ))),
        }
    }

    pub fn policy(&self) -> BookingPolicy {
        BookingPolicy::from_limits(
            self.booking.min_duration_hours,
            self.booking.max_duration_hours,
            self.booking.cancellation_window_minutes,
            self.booking.max_special_instructions,
        )
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.booking.lookup_timeout_ms)
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.api_port)
    }
}
