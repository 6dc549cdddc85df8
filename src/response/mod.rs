//! Response (model reply) validation.
//!
//! [`ResponseValidator`] turns a raw model reply into a snapshot that is safe
//! to publish, in three stages:
//!
//! 1. [`extract_json`]: locate and parse the JSON object
//! 2. [`validate_and_sanitize`]: structural checks and field cleaning
//! 3. [`check_bounds`]: change-magnitude policy against the live snapshot
//!
//! A rejected reply always yields the current snapshot unchanged.

pub mod bounds;
pub mod extract;
pub mod sanitize;
pub mod schema;

pub use bounds::{check_bounds, MAX_NEWS_ADDITIONS, MAX_PROGRAM_ADDITIONS};
pub use extract::{extract_json, MAX_JSON_SIZE};
pub use sanitize::{sanitize_date, sanitize_image_url, sanitize_string};
pub use schema::{validate_and_sanitize, SanitizedRecords};

use std::sync::Arc;
use std::time::Instant;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::audit::{AuditAction, AuditLogEntry, AuditTrail};
use crate::content::SiteContent;
use crate::error::{ChangeBoundViolation, ResponseError};
use crate::metrics::{GuardEvent, GuardMetrics};
use crate::traits::TimeProvider;

/// Result of validating a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseVerdict {
    /// Whether the reply may be published.
    pub is_valid: bool,
    /// User-facing rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Snapshot to publish: the bounded proposal, or the current snapshot on rejection.
    pub sanitized_content: SiteContent,
}

impl ResponseVerdict {
    /// An accepted reply.
    #[must_use]
    pub const fn valid(sanitized_content: SiteContent) -> Self {
        Self {
            is_valid: true,
            error: None,
            sanitized_content,
        }
    }

    /// A rejected reply; the current snapshot is kept.
    #[must_use]
    pub fn invalid(error: &ResponseError, current: SiteContent) -> Self {
        Self {
            is_valid: false,
            error: Some(error.to_string()),
            sanitized_content: current,
        }
    }
}

/// Short machine-readable code for audit reasons and metrics.
const fn reason_code(error: &ResponseError) -> &'static str {
    match error {
        ResponseError::TooLarge { .. } => "too_large",
        ResponseError::NoJson => "no_json",
        ResponseError::JsonParseFailed { .. } => "json_parse_failed",
        ResponseError::MissingContentKeys => "missing_content_keys",
        ResponseError::NotAnArray { .. } => "not_an_array",
        ResponseError::TooManyRecords { .. } => "too_many_records",
        ResponseError::InvalidRecord { .. } => "invalid_record",
        ResponseError::ChangeBound(ChangeBoundViolation::NoRecordsProduced) => {
            "no_records_produced"
        }
        ResponseError::ChangeBound(ChangeBoundViolation::TooManyAdditions { .. }) => {
            "too_many_additions"
        }
        ResponseError::ChangeBound(ChangeBoundViolation::CategoryWiped { .. }) => {
            "category_wiped"
        }
    }
}

/// Validates model replies before they overwrite live content.
pub struct ResponseValidator {
    audit: AuditTrail,
    clock: Arc<dyn TimeProvider>,
    metrics: Option<Arc<GuardMetrics>>,
}

impl ResponseValidator {
    /// Create a validator.
    #[must_use]
    pub fn new(audit: AuditTrail, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
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

    /// Validate `raw` against `current` and return a serializable verdict.
    pub async fn validate(
        &self,
        raw: &str,
        current: &SiteContent,
        user_id: Option<&str>,
    ) -> ResponseVerdict {
        match self.evaluate(raw, current, user_id).await {
            Ok(content) => ResponseVerdict::valid(content),
            Err(e) => ResponseVerdict::invalid(&e, current.clone()),
        }
    }

    /// Validate `raw`, returning the snapshot to publish or the typed rejection.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResponseError`] raised by extraction, schema
    /// validation, or the change bounds.
    pub async fn evaluate(
        &self,
        raw: &str,
        current: &SiteContent,
        user_id: Option<&str>,
    ) -> Result<SiteContent, ResponseError> {
        let started = Instant::now();
        let now = self.clock.now();
        let outcome = Self::run_pipeline(raw, current, now.date_naive());
        let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        let timestamp = now.timestamp_millis();

        match outcome {
            Ok((content, dropped)) => {
                tracing::info!(
                    user_id,
                    programs = content.featured_programs.len(),
                    news = content.latest_news.len(),
                    dropped,
                    "Response validated"
                );
                self.audit
                    .append(
                        AuditLogEntry::new(timestamp, AuditAction::ResponseValidated, raw)
                            .with_user(user_id)
                            .with_reason(format!(
                                "programs={} news={} dropped={}",
                                content.featured_programs.len(),
                                content.latest_news.len(),
                                dropped
                            )),
                    )
                    .await;
                self.record(GuardEvent::new(AuditAction::ResponseValidated, latency_us));
                Ok(content)
            }
            Err(e) => {
                let code = reason_code(&e);
                tracing::warn!(user_id, reason = code, error = %e, "Response blocked");
                self.audit
                    .append(
                        AuditLogEntry::new(timestamp, AuditAction::ResponseBlocked, raw)
                            .with_user(user_id)
                            .with_reason(code),
                    )
                    .await;
                self.record(
                    GuardEvent::new(AuditAction::ResponseBlocked, latency_us).with_reason(code),
                );
                Err(e)
            }
        }
    }

    fn run_pipeline(
        raw: &str,
        current: &SiteContent,
        today: chrono::NaiveDate,
    ) -> Result<(SiteContent, usize), ResponseError> {
        let parsed = extract_json(raw)?;
        let records = validate_and_sanitize(&parsed, today)?;
        let dropped = records.dropped();
        let content = check_bounds(
            current,
            SiteContent::new(records.programs, records.news),
            records.raw_record_count,
        )?;
        Ok((content, dropped))
    }

    fn record(&self, event: GuardEvent) {
        if let Some(metrics) = &self.metrics {
            metrics.record(event);
        }
    }
}

impl std::fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidator")
            .field("audit", &self.audit)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
