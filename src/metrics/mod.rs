//! Metrics collection.
//!
//! This module provides:
//! - Decision counts per audit action
//! - Validation latency measurements
//! - Block rates and a breakdown of why requests were blocked
//!
//! # Example
//!
//! ```
//! use content_guard::audit::AuditAction;
//! use content_guard::metrics::{GuardEvent, GuardMetrics};
//!
//! let metrics = GuardMetrics::new();
//! metrics.record(GuardEvent::new(AuditAction::CommandValidated, 120));
//! metrics.record(GuardEvent::new(AuditAction::CommandBlocked, 80).with_reason("pattern:shell"));
//! metrics.record(GuardEvent::new(AuditAction::ResponseValidated, 900));
//!
//! let summary = metrics.summary();
//! assert_eq!(summary.total_decisions, 3);
//! // 1 out of 3 blocked
//! assert!((summary.block_rate - 0.333).abs() < 0.01);
//! assert_eq!(summary.blocked_by_reason.get("pattern:shell"), Some(&1));
//! ```

// Allow intentional numeric casts for metrics calculations
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::audit::AuditAction;

/// Maximum number of events kept in the circular buffer.
const MAX_EVENTS: usize = 10_000;

/// A single guard decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardEvent {
    /// Decision taken.
    pub action: AuditAction,
    /// Short machine-readable block reason (e.g. `too_long`, `pattern:shell`).
    pub reason: Option<String>,
    /// Time spent validating, in microseconds.
    pub latency_us: u64,
    /// Timestamp of the event (Unix epoch seconds).
    pub timestamp: u64,
}

impl GuardEvent {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(action: AuditAction, latency_us: u64) -> Self {
        Self {
            action,
            reason: None,
            latency_us,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Attach a block reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Summary statistics for one action.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct ActionSummary {
    /// Number of decisions.
    pub count: u64,
    /// Average latency in microseconds.
    pub avg_latency_us: f64,
    /// Maximum latency in microseconds.
    pub max_latency_us: u64,
}

/// Overall metrics summary.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MetricsSummary {
    /// Decisions recorded across both sides.
    pub total_decisions: u64,
    /// Share of decisions that blocked (0.0-1.0).
    pub block_rate: f64,
    /// Per-action summaries keyed by the action's wire name.
    pub by_action: HashMap<String, ActionSummary>,
    /// Blocked decisions per reason.
    pub blocked_by_reason: HashMap<String, u64>,
}

/// Thread-safe collector of guard decisions.
#[derive(Debug, Default)]
pub struct GuardMetrics {
    events: RwLock<Vec<GuardEvent>>,
}

impl GuardMetrics {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision.
    ///
    /// Keeps at most `MAX_EVENTS` events, dropping the oldest.
    pub fn record(&self, event: GuardEvent) {
        match self.events.write() {
            Ok(mut events) => {
                if events.len() >= MAX_EVENTS {
                    events.remove(0);
                }
                events.push(event);
            }
            Err(poison_error) => {
                tracing::error!(
                    action = ?event.action,
                    error = %poison_error,
                    "Failed to record guard event: RwLock poisoned"
                );
            }
        }
    }

    /// Get summary statistics.
    #[must_use]
    pub fn summary(&self) -> MetricsSummary {
        let events = match self.events.read() {
            Ok(e) => e.clone(),
            Err(poison_error) => {
                tracing::warn!(
                    error = %poison_error,
                    "Reading events from poisoned lock, using recovered data"
                );
                poison_error.into_inner().clone()
            }
        };

        let mut by_action: HashMap<String, Vec<&GuardEvent>> = HashMap::new();
        let mut blocked_by_reason: HashMap<String, u64> = HashMap::new();
        for event in &events {
            by_action
                .entry(event.action.as_str().to_string())
                .or_default()
                .push(event);
            if event.action.is_blocked() {
                let reason = event.reason.clone().unwrap_or_else(|| "unknown".into());
                *blocked_by_reason.entry(reason).or_default() += 1;
            }
        }

        let by_action = by_action
            .into_iter()
            .map(|(action, action_events)| {
                let count = action_events.len() as u64;
                let total: u64 = action_events.iter().map(|e| e.latency_us).sum();
                let max_latency_us = action_events
                    .iter()
                    .map(|e| e.latency_us)
                    .max()
                    .unwrap_or(0);
                let avg_latency_us = if count > 0 {
                    total as f64 / count as f64
                } else {
                    0.0
                };
                (
                    action,
                    ActionSummary {
                        count,
                        avg_latency_us,
                        max_latency_us,
                    },
                )
            })
            .collect();

        let total_decisions = events.len() as u64;
        let blocked = events.iter().filter(|e| e.action.is_blocked()).count() as u64;
        let block_rate = if total_decisions > 0 {
            blocked as f64 / total_decisions as f64
        } else {
            0.0
        };

        MetricsSummary {
            total_decisions,
            block_rate,
            by_action,
            blocked_by_reason,
        }
    }

    /// Number of recorded decisions for `action`.
    #[must_use]
    pub fn count(&self, action: AuditAction) -> u64 {
        self.events
            .read()
            .map(|events| events.iter().filter(|e| e.action == action).count() as u64)
            .unwrap_or(0)
    }

    /// Get total number of recorded decisions.
    #[must_use]
    pub fn total_decisions(&self) -> u64 {
        self.events
            .read()
            .map(|events| events.len() as u64)
            .unwrap_or(0)
    }

    /// Clear all metrics (useful for testing).
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }
}
