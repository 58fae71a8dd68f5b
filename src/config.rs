//! Scan configuration.
//!
//! Values come from three layers: built-in defaults, an optional TOML file
//! (`<config_dir>/portlive/config.toml` unless `--config` names another),
//! and command line flags, which win.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::state::PORT_COUNT;

/// Default number of simultaneously active probes
pub const DEFAULT_CONCURRENCY: usize = 5000;
/// Default consecutive failures before a port is abandoned
pub const DEFAULT_RETRY_BUDGET: u32 = 1;
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);
/// More probes than ports can never be active at once
pub const MAX_CONCURRENCY: usize = PORT_COUNT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("concurrency must be at most {MAX_CONCURRENCY}, got {0}")]
    ConcurrencyTooHigh(usize),
    #[error("retry budget must be at least 1")]
    ZeroRetryBudget,
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of probes alive at once
    pub concurrency: usize,
    /// Consecutive failed attempts before a probe gives up on its port
    pub retry_budget: u32,
    /// Delay between two attempts on the same port (milliseconds)
    #[serde(with = "duration_ms")]
    pub probe_interval: Duration,
    /// Scheduler tick / screen refresh period (milliseconds)
    #[serde(with = "duration_ms")]
    pub refresh_interval: Duration,
    /// Per-attempt connect bound (milliseconds); zero leaves it to the OS
    #[serde(with = "duration_ms")]
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry_budget: DEFAULT_RETRY_BUDGET,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Config {
    /// Connect bound to apply, `None` when disabled
    pub fn connect_timeout(&self) -> Option<Duration> {
        (!self.connect_timeout.is_zero()).then_some(self.connect_timeout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::ConcurrencyTooHigh(self.concurrency));
        }
        if self.retry_budget == 0 {
            return Err(ConfigError::ZeroRetryBudget);
        }
        if self.probe_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("probe interval"));
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("refresh interval"));
        }
        Ok(())
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("portlive").join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location if it exists.
    ///
    /// An explicitly named file must exist; a missing default file yields
    /// the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Serde helper for durations stored as whole milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
