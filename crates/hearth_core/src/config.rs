//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold the knobs shared by services, reminder workers and the scheduler.
//! - Resolve overrides from `HEARTH_*` environment variables or JSON.
//!
//! # Invariants
//! - `utc_offset_minutes` stays within +/- 18 hours.
//! - `water_default_target` is at least one glass.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "HEARTH_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "HEARTH_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HEARTH_LOG_DIR";
pub const ENV_UTC_OFFSET_MINUTES: &str = "HEARTH_UTC_OFFSET_MINUTES";

const DB_FILE_NAME: &str = "hearth.sqlite3";
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Configuration error raised while resolving overrides.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config document: {err}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Runtime configuration for Hearth core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    /// Local offset used for calendar-day arithmetic.
    pub utc_offset_minutes: i32,
    /// Glasses per day for newly created water records.
    pub water_default_target: u32,
    /// Reminder interval in minutes for newly created water records.
    pub water_default_interval_minutes: u32,
    /// Days-before-due lead time for newly created tasks.
    pub task_default_lead_days: u32,
    /// Delay before re-running a job that reported `Retry`.
    pub job_retry_delay_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DB_FILE_NAME),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            utc_offset_minutes: 0,
            water_default_target: 8,
            water_default_interval_minutes: 60,
            task_default_lead_days: 1,
            job_retry_delay_secs: 60,
        }
    }
}

impl CoreConfig {
    /// Parses a JSON document; missing keys fall back to defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from defaults plus process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides resolved by `lookup` (environment-shaped keys).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            self.log_level = level;
        }
        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = non_blank(lookup(ENV_UTC_OFFSET_MINUTES)) {
            self.utc_offset_minutes =
                raw.parse::<i32>().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_UTC_OFFSET_MINUTES,
                    value: raw.clone(),
                })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Local time zone used for calendar-day truncation.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn job_retry_delay(&self) -> Duration {
        Duration::from_secs(self.job_retry_delay_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::InvalidValue {
                key: "utc_offset_minutes",
                value: self.utc_offset_minutes.to_string(),
            });
        }
        if self.water_default_target == 0 {
            return Err(ConfigError::InvalidValue {
                key: "water_default_target",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
