//! Per-identity fixed-window rate limiting.
//!
//! Each identity gets `max_requests` accepted commands per window. The window
//! starts at the identity's first request and resets on the first request
//! after it has fully elapsed, so up to twice the limit can pass around a
//! window boundary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::config::{DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_MS};
use crate::traits::{RealTimeProvider, TimeProvider};

/// Rate limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Accepted requests per window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
        }
    }
}

impl RateLimitConfig {
    fn window(self) -> Duration {
        Duration::milliseconds(i64::try_from(self.window_ms).unwrap_or(i64::MAX))
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request is accepted.
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds from `now` until the window resets, rounded up, at least 1.
    #[must_use]
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0);
        let seconds = u64::try_from(millis).unwrap_or(0).div_ceil(1000);
        seconds.max(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitState {
    count: u32,
    window_start: DateTime<Utc>,
}

/// In-memory fixed-window rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn TimeProvider>,
    states: Mutex<HashMap<String, RateLimitState>>,
}

impl RateLimiter {
    /// Create a limiter reading time from `clock`.
    #[must_use]
    pub fn new(config: RateLimitConfig, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            config,
            clock,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Create a limiter with default settings and the system clock.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default(), Arc::new(RealTimeProvider))
    }

    /// Current settings.
    #[must_use]
    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count a request from `identity` and decide whether it is accepted.
    pub fn check(&self, identity: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let window = self.config.window();
        let max = self.config.max_requests;

        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);

        let state = match states.get_mut(identity) {
            None => {
                states.insert(
                    identity.to_string(),
                    RateLimitState {
                        count: 1,
                        window_start: now,
                    },
                );
                return RateLimitDecision {
                    allowed: true,
                    remaining: max.saturating_sub(1),
                    reset_at: now + window,
                };
            }
            Some(state) => state,
        };

        if now - state.window_start > window {
            state.count = 1;
            state.window_start = now;
            return RateLimitDecision {
                allowed: true,
                remaining: max.saturating_sub(1),
                reset_at: now + window,
            };
        }

        let reset_at = state.window_start + window;
        if state.count < max {
            state.count += 1;
            RateLimitDecision {
                allowed: true,
                remaining: max - state.count,
                reset_at,
            }
        } else {
            tracing::debug!(identity, count = state.count, "Rate limit window exhausted");
            RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at,
            }
        }
    }

    /// Forget the window for `identity`.
    pub fn reset(&self, identity: &str) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(identity);
    }

    /// Number of identities with a window on record.
    #[must_use]
    pub fn tracked_identities(&self) -> usize {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
