//! Optional TOML configuration file.
//!
//! ```toml
//! [device]
//! binary = "/usr/bin/hdhomerun_config"
//! timeout_ms = 5000
//!
//! [session]
//! release_on_exit = true
//! channel_update = "validate-first"
//! device_errors = "report"
//! adopt_device_target = false
//!
//! [logging]
//! log_dir = "logs"
//! retention_days = 7
//! level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::session::{ChannelUpdate, DeviceErrors, SessionPolicy};

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "hdhrctl.toml";
pub const DEFAULT_BINARY: &str = "hdhomerun_config";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct DeviceSection {
    pub binary: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SessionSection {
    pub release_on_exit: Option<bool>,
    pub channel_update: Option<ChannelUpdate>,
    pub device_errors: Option<DeviceErrors>,
    pub adopt_device_target: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingSection {
    pub log_dir: Option<PathBuf>,
    pub retention_days: Option<u64>,
    pub level: Option<String>,
}

impl ConfigFile {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Explicit path first, then [`DEFAULT_CONFIG_FILE`] if it exists.
    pub fn locate(explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            default_path.exists().then_some(default_path)
        })
    }

    pub fn binary(&self) -> PathBuf {
        self.device
            .binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.device.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn policy(&self) -> SessionPolicy {
        SessionPolicy {
            channel_update: self.session.channel_update.unwrap_or_default(),
            device_errors: self.session.device_errors.unwrap_or_default(),
        }
    }

    pub fn release_on_exit(&self) -> bool {
        self.session.release_on_exit.unwrap_or(true)
    }

    pub fn adopt_device_target(&self) -> bool {
        self.session.adopt_device_target.unwrap_or(false)
    }

    pub fn retention_days(&self) -> u64 {
        self.logging.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS)
    }
}
