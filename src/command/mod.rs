//! Command (prompt) validation.
//!
//! [`CommandValidator`] screens user-authored prompts before they reach the
//! model. Checks run in a fixed order and stop at the first failure:
//!
//! 1. Length bounds on the trimmed prompt
//! 2. Per-identity rate limit (only when an identity is given)
//! 3. Threat pattern classification
//! 4. Neutralization of dangerous URL schemes
//! 5. Residual angle-bracket rejection
//!
//! Every decision is appended to the [`AuditTrail`] and, when attached,
//! recorded in [`GuardMetrics`].

pub mod patterns;
pub mod rate_limit;

pub use patterns::{PatternClassifier, PatternMatch, ThreatCategory};
pub use rate_limit::{RateLimitConfig, RateLimitDecision, RateLimiter};

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::audit::{AuditAction, AuditLogEntry, AuditTrail};
use crate::error::CommandError;
use crate::metrics::{GuardEvent, GuardMetrics};
use crate::traits::TimeProvider;

/// Minimum trimmed prompt length in characters.
pub const MIN_COMMAND_LEN: usize = 3;

/// Maximum trimmed prompt length in characters.
pub const MAX_COMMAND_LEN: usize = 1000;

#[allow(clippy::expect_used)]
static HIGH_RISK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b|_)(?:system|file|files|filesystem|path|etc|database|db|sql|delete|drop|table|union|select|secret|secrets|password|passwd|credential|credentials|token|env|key|keys)(?:\b|_)",
    )
    .expect("valid high-risk pattern")
});

#[allow(clippy::expect_used)]
static MEDIUM_RISK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\b|_)(?:network|import|export|fetch|https?|url|download|upload|api)(?:\b|_)")
        .expect("valid medium-risk pattern")
});

#[allow(clippy::expect_used)]
static DANGEROUS_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(javascript|data|vbscript)\s*:").expect("valid scheme pattern")
});

/// Coarse, audit-only sensitivity of a command.
///
/// Keywords also match inside `SNAKE_CASE` identifiers, so `JWT_SECRET`
/// counts as a secret term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Nothing sensitive mentioned.
    Low,
    /// Mentions network or import/export terms.
    Medium,
    /// Mentions system, path, database, SQL or secret terms.
    High,
}

impl RiskTier {
    /// Assess `text` by keyword bucket. High wins over medium.
    #[must_use]
    pub fn assess(text: &str) -> Self {
        if HIGH_RISK.is_match(text) {
            Self::High
        } else if MEDIUM_RISK.is_match(text) {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrite `javascript:`, `data:` and `vbscript:` into `[blocked-<scheme>]`.
#[must_use]
pub fn neutralize(text: &str) -> String {
    DANGEROUS_SCHEME
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("[blocked-{}]", caps[1].to_lowercase())
        })
        .into_owned()
}

/// Result of validating a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    /// Whether the command may be forwarded to the model.
    pub is_valid: bool,
    /// User-facing rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Neutralized prompt, present only when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitized_prompt: Option<String>,
}

impl ValidationVerdict {
    /// An accepted command.
    #[must_use]
    pub const fn valid(sanitized_prompt: String) -> Self {
        Self {
            is_valid: true,
            error: None,
            sanitized_prompt: Some(sanitized_prompt),
        }
    }

    /// A rejected command.
    #[must_use]
    pub fn invalid(error: &CommandError) -> Self {
        Self {
            is_valid: false,
            error: Some(error.to_string()),
            sanitized_prompt: None,
        }
    }
}

impl From<Result<String, CommandError>> for ValidationVerdict {
    fn from(result: Result<String, CommandError>) -> Self {
        match result {
            Ok(prompt) => Self::valid(prompt),
            Err(e) => Self::invalid(&e),
        }
    }
}

struct Rejection {
    error: CommandError,
    code: String,
    audit_reason: String,
}

impl Rejection {
    fn plain(error: CommandError, code: &str) -> Self {
        Self {
            error,
            code: code.to_string(),
            audit_reason: code.to_string(),
        }
    }
}

/// Screens prompts before they reach the model.
pub struct CommandValidator {
    classifier: PatternClassifier,
    rate_limiter: Arc<RateLimiter>,
    audit: AuditTrail,
    clock: Arc<dyn TimeProvider>,
    metrics: Option<Arc<GuardMetrics>>,
}

impl CommandValidator {
    /// Create a validator.
    #[must_use]
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        audit: AuditTrail,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            classifier: PatternClassifier::new(),
            rate_limiter,
            audit,
            clock,
            metrics: None,
        }
    }

    /// Record every decision in `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<GuardMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate `prompt` and return a serializable verdict.
    pub async fn validate(&self, prompt: &str, user_id: Option<&str>) -> ValidationVerdict {
        self.evaluate(prompt, user_id).await.into()
    }

    /// Validate `prompt`, returning the neutralized text or the typed rejection.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommandError`] hit by the checks above.
    pub async fn evaluate(
        &self,
        prompt: &str,
        user_id: Option<&str>,
    ) -> Result<String, CommandError> {
        let started = Instant::now();
        let trimmed = prompt.trim();
        let risk = RiskTier::assess(trimmed);
        let outcome = self.screen(trimmed, user_id);
        let timestamp = self.clock.now().timestamp_millis();
        let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match outcome {
            Ok(sanitized) => {
                tracing::info!(user_id, %risk, "Command validated");
                self.audit
                    .append(
                        AuditLogEntry::new(timestamp, AuditAction::CommandValidated, prompt)
                            .with_user(user_id)
                            .with_reason(format!("risk={risk}")),
                    )
                    .await;
                self.record(GuardEvent::new(AuditAction::CommandValidated, latency_us));
                Ok(sanitized)
            }
            Err(rejection) => {
                tracing::warn!(
                    user_id,
                    reason = %rejection.code,
                    %risk,
                    "Command blocked"
                );
                self.audit
                    .append(
                        AuditLogEntry::new(timestamp, AuditAction::CommandBlocked, prompt)
                            .with_user(user_id)
                            .with_reason(rejection.audit_reason),
                    )
                    .await;
                self.record(
                    GuardEvent::new(AuditAction::CommandBlocked, latency_us)
                        .with_reason(rejection.code),
                );
                Err(rejection.error)
            }
        }
    }

    fn screen(&self, trimmed: &str, user_id: Option<&str>) -> Result<String, Rejection> {
        let len = trimmed.chars().count();
        if len == 0 {
            return Err(Rejection::plain(CommandError::Empty, "empty"));
        }
        if len < MIN_COMMAND_LEN {
            return Err(Rejection::plain(
                CommandError::TooShort {
                    min: MIN_COMMAND_LEN,
                },
                "too_short",
            ));
        }
        if len > MAX_COMMAND_LEN {
            return Err(Rejection::plain(
                CommandError::TooLong {
                    max: MAX_COMMAND_LEN,
                },
                "too_long",
            ));
        }

        if let Some(identity) = user_id {
            let decision = self.rate_limiter.check(identity);
            if !decision.allowed {
                let retry_after_seconds = decision.retry_after_seconds(self.clock.now());
                return Err(Rejection::plain(
                    CommandError::RateLimited {
                        retry_after_seconds,
                    },
                    "rate_limited",
                ));
            }
        }

        if let Some(category) = self.classifier.classify(trimmed).category {
            let risk = RiskTier::assess(trimmed);
            return Err(Rejection {
                error: CommandError::DisallowedPattern,
                code: format!("pattern:{category}"),
                audit_reason: format!("pattern:{category} risk={risk}"),
            });
        }

        let neutralized = neutralize(trimmed);

        // Catches tags the pattern list does not name.
        if neutralized.contains(['<', '>']) {
            return Err(Rejection::plain(CommandError::UnsafeMarkup, "unsafe_markup"));
        }

        Ok(neutralized)
    }

    fn record(&self, event: GuardEvent) {
        if let Some(metrics) = &self.metrics {
            metrics.record(event);
        }
    }
}

impl fmt::Debug for CommandValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandValidator")
            .field("rate_limiter", &self.rate_limiter)
            .field("audit", &self.audit)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
