//! One-stop guard bundling both validators.
//!
//! [`Guard`] wires a [`CommandValidator`] and a [`ResponseValidator`] to a
//! single audit trail, rate limiter and metrics collector, configured from
//! [`Config`].

use std::sync::Arc;

use crate::audit::{AuditLogEntry, AuditTrail};
use crate::command::{CommandValidator, RateLimitConfig, RateLimiter, ValidationVerdict};
use crate::config::Config;
use crate::content::SiteContent;
use crate::metrics::{GuardMetrics, MetricsSummary};
use crate::response::{ResponseValidator, ResponseVerdict};
use crate::traits::{BlobStore, RealTimeProvider, TimeProvider};

/// Both validators over shared state.
pub struct Guard {
    command: CommandValidator,
    response: ResponseValidator,
    audit: AuditTrail,
    rate_limiter: Arc<RateLimiter>,
    metrics: Arc<GuardMetrics>,
}

impl Guard {
    /// Build a guard from `config`, persisting the audit log in `store`.
    #[must_use]
    pub fn new(config: &Config, store: Arc<dyn BlobStore>, clock: Arc<dyn TimeProvider>) -> Self {
        let audit = AuditTrail::new(store, config.audit_log_capacity);
        let rate_limiter = Arc::new(RateLimiter::new(
            RateLimitConfig {
                window_ms: config.rate_limit_window_ms,
                max_requests: config.rate_limit_max_requests,
            },
            Arc::clone(&clock),
        ));
        let metrics = Arc::new(GuardMetrics::new());

        let command = CommandValidator::new(
            Arc::clone(&rate_limiter),
            audit.clone(),
            Arc::clone(&clock),
        )
        .with_metrics(Arc::clone(&metrics));
        let response =
            ResponseValidator::new(audit.clone(), clock).with_metrics(Arc::clone(&metrics));

        Self {
            command,
            response,
            audit,
            rate_limiter,
            metrics,
        }
    }

    /// Build a guard with default configuration and the system clock.
    #[must_use]
    pub fn with_defaults(store: Arc<dyn BlobStore>) -> Self {
        Self::new(&Config::default(), store, Arc::new(RealTimeProvider))
    }

    /// Validate a user prompt.
    pub async fn validate_command(&self, prompt: &str, user_id: Option<&str>) -> ValidationVerdict {
        self.command.validate(prompt, user_id).await
    }

    /// Validate a model reply against the live snapshot.
    pub async fn validate_response(
        &self,
        raw: &str,
        current: &SiteContent,
        user_id: Option<&str>,
    ) -> ResponseVerdict {
        self.response.validate(raw, current, user_id).await
    }

    /// Audit entries, newest first.
    pub async fn audit_log(&self) -> Vec<AuditLogEntry> {
        self.audit.read().await
    }

    /// Decision statistics since startup.
    #[must_use]
    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    /// The command-side validator.
    #[must_use]
    pub const fn command_validator(&self) -> &CommandValidator {
        &self.command
    }

    /// The response-side validator.
    #[must_use]
    pub const fn response_validator(&self) -> &ResponseValidator {
        &self.response
    }

    /// The shared audit trail.
    #[must_use]
    pub const fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// The shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("audit", &self.audit)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}
