//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (with optional `.env` file)
//! - Configuration validation
//! - Default value handling
//!
//! # Example
//!
//! ```
//! use content_guard::config::Config;
//!
//! // Defaults match the documented guard policy (use Config::from_env() in production)
//! let config = Config::default();
//! assert_eq!(config.rate_limit_window_ms, 60_000);
//! assert_eq!(config.rate_limit_max_requests, 10);
//! assert_eq!(config.audit_log_capacity, 100);
//! ```

mod validation;

pub use validation::{
    validate_config, MAX_AUDIT_LOG_CAPACITY, MAX_RATE_LIMIT_REQUESTS, MAX_RATE_LIMIT_WINDOW_MS,
    MIN_RATE_LIMIT_WINDOW_MS,
};

use crate::error::ConfigError;

/// Default database path.
pub const DEFAULT_DATABASE_PATH: &str = "./data/content-guard.db";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default rate-limit window in milliseconds.
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60_000;

/// Default number of accepted commands per window and identity.
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 10;

/// Default number of audit entries retained.
pub const DEFAULT_AUDIT_LOG_CAPACITY: usize = 100;

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
/// Content caps and command length bounds are fixed policy, not configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database path for the audit log blob store.
    pub database_path: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Fixed rate-limit window in milliseconds.
    pub rate_limit_window_ms: u64,
    /// Accepted commands per window and identity.
    pub rate_limit_max_requests: u32,
    /// Number of audit entries retained (oldest dropped first).
    pub audit_log_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            rate_limit_window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            audit_log_capacity: DEFAULT_AUDIT_LOG_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `DATABASE_PATH`: Path to `SQLite` database (default: `./data/content-guard.db`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `RATE_LIMIT_WINDOW_MS`: Rate-limit window (default: `60000`)
    /// - `RATE_LIMIT_MAX_REQUESTS`: Accepted commands per window (default: `10`)
    /// - `AUDIT_LOG_CAPACITY`: Audit entries retained (default: `100`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable does not parse or any
    /// value fails validation (see [`validate_config`]).
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let rate_limit_window_ms =
            parse_env_u64("RATE_LIMIT_WINDOW_MS", DEFAULT_RATE_LIMIT_WINDOW_MS)?;
        let rate_limit_max_requests =
            parse_env_u32("RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS)?;
        let audit_log_capacity = parse_env_usize("AUDIT_LOG_CAPACITY", DEFAULT_AUDIT_LOG_CAPACITY)?;

        let config = Self {
            database_path,
            log_level,
            rate_limit_window_ms,
            rate_limit_max_requests,
            audit_log_capacity,
        };

        validate_config(&config)?;
        Ok(config)
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as usize, using a default if not set.
fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}
