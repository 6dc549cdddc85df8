//! Configuration validation.
//!
//! Keeps rate-limit and audit settings inside ranges the guard can honor.

use super::Config;
use crate::error::ConfigError;

/// Minimum rate-limit window in milliseconds (1 second).
pub const MIN_RATE_LIMIT_WINDOW_MS: u64 = 1000;

/// Maximum rate-limit window in milliseconds (1 hour).
pub const MAX_RATE_LIMIT_WINDOW_MS: u64 = 3_600_000;

/// Maximum accepted commands per window.
pub const MAX_RATE_LIMIT_REQUESTS: u32 = 1000;

/// Maximum audit log capacity.
pub const MAX_AUDIT_LOG_CAPACITY: usize = 10_000;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `RATE_LIMIT_WINDOW_MS` must be between 1000 and 3600000
/// - `RATE_LIMIT_MAX_REQUESTS` must be between 1 and 1000
/// - `AUDIT_LOG_CAPACITY` must be between 1 and 10000
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.rate_limit_window_ms < MIN_RATE_LIMIT_WINDOW_MS
        || config.rate_limit_window_ms > MAX_RATE_LIMIT_WINDOW_MS
    {
        return Err(ConfigError::InvalidValue {
            var: "RATE_LIMIT_WINDOW_MS".into(),
            reason: format!(
                "must be between {MIN_RATE_LIMIT_WINDOW_MS} and {MAX_RATE_LIMIT_WINDOW_MS} ms"
            ),
        });
    }

    if config.rate_limit_max_requests == 0
        || config.rate_limit_max_requests > MAX_RATE_LIMIT_REQUESTS
    {
        return Err(ConfigError::InvalidValue {
            var: "RATE_LIMIT_MAX_REQUESTS".into(),
            reason: format!("must be between 1 and {MAX_RATE_LIMIT_REQUESTS}"),
        });
    }

    if config.audit_log_capacity == 0 || config.audit_log_capacity > MAX_AUDIT_LOG_CAPACITY {
        return Err(ConfigError::InvalidValue {
            var: "AUDIT_LOG_CAPACITY".into(),
            reason: format!("must be between 1 and {MAX_AUDIT_LOG_CAPACITY}"),
        });
    }

    Ok(())
}
