//! Runtime configuration for the registry core.
//!
//! # Responsibility
//! - Parse JSON configuration into typed settings with defaults.
//! - Reject settings the store and views cannot honour.
//!
//! # Invariants
//! - Unknown keys are rejected.
//! - A validated config never carries a zero-capacity drop-oldest policy,
//!   a zero expiring window or an unknown log level.

use crate::logging::{default_log_level, parse_level};
use crate::repo::notify::DeliveryPolicy;
use crate::view::reminder::DEFAULT_REMINDER_HORIZON_DAYS;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default threshold for the "expiring" document status.
pub const DEFAULT_EXPIRING_WINDOW_DAYS: u32 = 30;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Default delivery policy for new subscribers.
    pub delivery: DeliveryPolicy,
    pub reminder_horizon_days: u32,
    pub expiring_window_days: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            delivery: DeliveryPolicy::Unbounded,
            reminder_horizon_days: DEFAULT_REMINDER_HORIZON_DAYS,
            expiring_window_days: DEFAULT_EXPIRING_WINDOW_DAYS,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a JSON document; missing keys take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let DeliveryPolicy::DropOldest { capacity: 0 } = self.delivery {
            return Err(ConfigError::Invalid(
                "delivery.capacity must be at least 1".to_string(),
            ));
        }
        if self.expiring_window_days == 0 {
            return Err(ConfigError::Invalid(
                "expiring_window_days must be at least 1".to_string(),
            ));
        }
        parse_level(&self.log_level).map_err(ConfigError::Invalid)?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
