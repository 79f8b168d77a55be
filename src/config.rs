//! Configuration management for the interview scheduler.
//!
//! Configuration can be set via environment variables:
//! - `INTERVIEW_STORE` - Optional. Session store backend: `memory`, `file` (or `json`), `sqlite` (or `db`). Defaults to `file`.
//! - `INTERVIEW_DATA_DIR` - Optional. Directory for stored sessions. Defaults to `./.interview-scheduler`.
//! - `INTERVIEW_RESPONSE_TIMEOUT_SECS` - Optional. Seconds to wait for any single answer. Unset means wait forever.
//! - `INTERVIEW_DEFAULT_DURATION` - Optional. Interview length in minutes when a setup omits it. Defaults to `60`.
//! - `INTERVIEW_DEFAULT_TYPE` - Optional. Interview type when a setup omits it. Defaults to `technical`.
//! - `INTERVIEW_OPERATOR` - Optional. Name used to partition stored sessions. Defaults to `recruiter`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::setup::SetupDefaults;
use crate::store::{StoreType, UnknownStoreType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Session store backend
    pub store_type: StoreType,

    /// Directory for the file and sqlite stores
    pub data_dir: PathBuf,

    /// Deadline for a single answer; `None` blocks until one arrives
    pub response_timeout: Option<Duration>,

    pub default_duration_minutes: u32,

    pub default_interview_type: String,

    /// Store partition, one per operator
    pub operator: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_type: StoreType::File,
            data_dir: PathBuf::from("./.interview-scheduler"),
            response_timeout: None,
            default_duration_minutes: 60,
            default_interview_type: "technical".to_string(),
            operator: "recruiter".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for unparseable numbers or a zero duration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let store_type = match lookup("INTERVIEW_STORE") {
            Some(v) if !v.trim().is_empty() => v.parse().map_err(|e: UnknownStoreType| {
                ConfigError::InvalidValue("INTERVIEW_STORE".to_string(), e.to_string())
            })?,
            _ => defaults.store_type,
        };

        let data_dir = lookup("INTERVIEW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let response_timeout = match lookup("INTERVIEW_RESPONSE_TIMEOUT_SECS") {
            Some(v) if !v.trim().is_empty() => {
                let secs: u64 = v.trim().parse().map_err(|e| {
                    ConfigError::InvalidValue(
                        "INTERVIEW_RESPONSE_TIMEOUT_SECS".to_string(),
                        format!("{}", e),
                    )
                })?;
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        let default_duration_minutes = match lookup("INTERVIEW_DEFAULT_DURATION") {
            Some(v) => v.trim().parse().map_err(|e| {
                ConfigError::InvalidValue("INTERVIEW_DEFAULT_DURATION".to_string(), format!("{}", e))
            })?,
            None => defaults.default_duration_minutes,
        };
        if default_duration_minutes == 0 {
            return Err(ConfigError::InvalidValue(
                "INTERVIEW_DEFAULT_DURATION".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let default_interview_type = lookup("INTERVIEW_DEFAULT_TYPE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.default_interview_type);

        let operator = lookup("INTERVIEW_OPERATOR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.operator);

        Ok(Self {
            store_type,
            data_dir,
            response_timeout,
            default_duration_minutes,
            default_interview_type,
            operator,
        })
    }

    /// Defaults applied to setups that leave type or duration out.
    pub fn setup_defaults(&self) -> SetupDefaults {
        SetupDefaults {
            duration_minutes: self.default_duration_minutes,
            interview_type: self.default_interview_type.clone(),
        }
    }
}
