//! Runtime configuration for the alerter.

use std::env;
use std::time::Duration;

use database::sqlite_url_from_path;
use risk_core::{validate_threshold, DEFAULT_PROBABILITY_THRESHOLD};
use thiserror::Error;

use crate::policy::AlertPolicy;
use crate::scanner::ScanConfig;

/// Default time between sweep starts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default bound on a single store query.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on a single send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of regions processed at once.
pub const DEFAULT_MAX_CONCURRENT_REGIONS: usize = 4;

/// Default region database location.
pub const DEFAULT_REGION_DB_PATH: &str = "./data/regions.db";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be used.
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Configuration for the sweep loop and its stores.
#[derive(Debug, Clone, PartialEq)]
pub struct AlerterConfig {
    /// Time between sweep starts.
    pub poll_interval: Duration,
    /// Minimum probability for a risk point to alert.
    pub probability_threshold: f64,
    /// SQLite path or URL holding users and regions.
    pub region_db_path: String,
    /// SQLite path or URL holding risk points.
    pub risk_db_path: String,
    /// Bound on each store query.
    pub store_timeout: Duration,
    /// Bound on each send.
    pub send_timeout: Duration,
    /// Regions processed at once within a sweep (1 = sequential).
    pub max_concurrent_regions: usize,
    /// Re-alert suppression window; `None` alerts every sweep.
    pub alert_cooldown: Option<Duration>,
}

impl Default for AlerterConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            probability_threshold: DEFAULT_PROBABILITY_THRESHOLD,
            region_db_path: DEFAULT_REGION_DB_PATH.to_string(),
            risk_db_path: DEFAULT_REGION_DB_PATH.to_string(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            max_concurrent_regions: DEFAULT_MAX_CONCURRENT_REGIONS,
            alert_cooldown: None,
        }
    }
}

impl AlerterConfig {
    /// Load configuration from environment variables.
    ///
    /// All optional:
    /// - `POLL_INTERVAL_SECS` - Default: 60
    /// - `PROBABILITY_THRESHOLD` - in `[0, 1]`. Default: 0.21
    /// - `REGION_DB_PATH` - Default: ./data/regions.db
    /// - `RISK_DB_PATH` - Default: same as `REGION_DB_PATH`
    /// - `STORE_TIMEOUT_SECS` - Default: 30
    /// - `SEND_TIMEOUT_SECS` - Default: 30
    /// - `MAX_CONCURRENT_REGIONS` - Default: 4
    /// - `ALERT_COOLDOWN_SECS` - Default: unset (alert every sweep)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let poll_interval = match lookup("POLL_INTERVAL_SECS") {
            Some(value) => positive_secs("POLL_INTERVAL_SECS", &value)?,
            None => defaults.poll_interval,
        };

        let probability_threshold = match lookup("PROBABILITY_THRESHOLD") {
            Some(value) => {
                let parsed = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| ConfigError::invalid("PROBABILITY_THRESHOLD", e.to_string()))?;
                validate_threshold(parsed)
                    .map_err(|e| ConfigError::invalid("PROBABILITY_THRESHOLD", e))?
            }
            None => defaults.probability_threshold,
        };

        let region_db_path = lookup("REGION_DB_PATH").unwrap_or(defaults.region_db_path);
        let risk_db_path = lookup("RISK_DB_PATH").unwrap_or_else(|| region_db_path.clone());

        let store_timeout = match lookup("STORE_TIMEOUT_SECS") {
            Some(value) => positive_secs("STORE_TIMEOUT_SECS", &value)?,
            None => defaults.store_timeout,
        };

        let send_timeout = match lookup("SEND_TIMEOUT_SECS") {
            Some(value) => positive_secs("SEND_TIMEOUT_SECS", &value)?,
            None => defaults.send_timeout,
        };

        let max_concurrent_regions = match lookup("MAX_CONCURRENT_REGIONS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                Ok(_) => return Err(ConfigError::invalid("MAX_CONCURRENT_REGIONS", "must be at least 1")),
                Err(e) => return Err(ConfigError::invalid("MAX_CONCURRENT_REGIONS", e.to_string())),
            },
            None => defaults.max_concurrent_regions,
        };

        let alert_cooldown = match lookup("ALERT_COOLDOWN_SECS") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(positive_secs("ALERT_COOLDOWN_SECS", &value)?),
            None => None,
        };

        Ok(Self {
            poll_interval,
            probability_threshold,
            region_db_path,
            risk_db_path,
            store_timeout,
            send_timeout,
            max_concurrent_regions,
            alert_cooldown,
        })
    }

    /// SQLite URL for the region database.
    pub fn region_db_url(&self) -> String {
        sqlite_url_from_path(&self.region_db_path)
    }

    /// SQLite URL for the risk point database.
    pub fn risk_db_url(&self) -> String {
        sqlite_url_from_path(&self.risk_db_path)
    }

    /// The alert policy implied by `alert_cooldown`.
    pub fn policy(&self) -> AlertPolicy {
        match self.alert_cooldown {
            Some(window) => AlertPolicy::Cooldown { window },
            None => AlertPolicy::EveryCycle,
        }
    }

    /// Per-sweep settings for the [`Scanner`](crate::Scanner).
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            probability_threshold: self.probability_threshold,
            store_timeout: self.store_timeout,
            send_timeout: self.send_timeout,
            max_concurrent_regions: self.max_concurrent_regions,
            policy: self.policy(),
        }
    }
}

fn positive_secs(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(var, "must be greater than zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::invalid(var, e.to_string())),
    }
}
