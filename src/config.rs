use crate::error::{AppError, Result};
use crate::integration::{DEFAULT_NAMESPACE, DEFAULT_SOURCE_TYPE};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const NAMESPACE_ENV: &str = "CAMELK_NAMESPACE";
pub const MAX_ATTEMPTS_ENV: &str = "CAMELK_MAX_ATTEMPTS";
pub const DELAY_BETWEEN_ATTEMPTS_ENV: &str = "CAMELK_DELAY_BETWEEN_ATTEMPTS";
pub const AUTO_REMOVE_RESOURCES_ENV: &str = "CAMELK_AUTO_REMOVE_RESOURCES";
pub const SOURCE_TYPE_ENV: &str = "CAMELK_SOURCE_TYPE";
pub const LOG_LEVEL_ENV: &str = "CAMELK_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "CAMELK_LOG_FORMAT";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 150;
pub const DEFAULT_DELAY_BETWEEN_ATTEMPTS_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub namespace: String,
    pub max_attempts: u32,
    pub delay_between_attempts: Duration,
    pub auto_remove_resources: bool,
    pub source_type: String,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_between_attempts: Duration::from_millis(DEFAULT_DELAY_BETWEEN_ATTEMPTS_MS),
            auto_remove_resources: true,
            source_type: DEFAULT_SOURCE_TYPE.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first
    pub fn from_env() -> Result<Settings> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let namespace = lookup(NAMESPACE_ENV).unwrap_or(defaults.namespace);
        let max_attempts = match lookup(MAX_ATTEMPTS_ENV) {
            Some(value) => parse_number(MAX_ATTEMPTS_ENV, &value)?,
            None => defaults.max_attempts,
        };
        let delay_between_attempts = match lookup(DELAY_BETWEEN_ATTEMPTS_ENV) {
            Some(value) => Duration::from_millis(parse_number(DELAY_BETWEEN_ATTEMPTS_ENV, &value)?),
            None => defaults.delay_between_attempts,
        };
        let auto_remove_resources = match lookup(AUTO_REMOVE_RESOURCES_ENV) {
            Some(value) => parse_flag(AUTO_REMOVE_RESOURCES_ENV, &value)?,
            None => defaults.auto_remove_resources,
        };
        let source_type = lookup(SOURCE_TYPE_ENV).unwrap_or(defaults.source_type);
        let logging = LoggingConfig {
            level: lookup(LOG_LEVEL_ENV).unwrap_or(defaults.logging.level),
            format: lookup(LOG_FORMAT_ENV).unwrap_or(defaults.logging.format),
        };

        Ok(Settings {
            namespace,
            max_attempts,
            delay_between_attempts,
            auto_remove_resources,
            source_type,
            logging,
        })
    }
}

pub(crate) fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        AppError::ConfigurationError(format!("{} must be a number, got '{}'", key, value))
    })
}

pub(crate) fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::ConfigurationError(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}
