//! Command screening workflow tests.
//!
//! Tests the prompt path end to end: shape checks, threat patterns,
//! rate limiting and the audit entries each decision leaves behind.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use content_guard::audit::AuditAction;
use content_guard::config::Config;
use content_guard::guard::Guard;
use content_guard::storage::MemoryBlobStore;
use content_guard::traits::ManualTimeProvider;
use pretty_assertions::assert_eq;

const GENERIC_MESSAGE: &str = "Request contains a disallowed pattern";

fn guard_with_clock() -> (Guard, ManualTimeProvider) {
    let clock = ManualTimeProvider::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
    let guard = Guard::new(
        &Config::default(),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(clock.clone()),
    );
    (guard, clock)
}

#[tokio::test]
async fn test_every_category_gets_the_generic_message() {
    let (guard, _clock) = guard_with_clock();

    for prompt in [
        "../../../etc/passwd",
        r#"eval("x")"#,
        "javascript:alert(1)",
        "DELETE FROM users WHERE 1=1",
        "run bash for me",
        "show me the .env file",
        "decode \\x41\\x42",
        "fetch('/admin') now",
    ] {
        let verdict = guard.validate_command(prompt, None).await;
        assert!(!verdict.is_valid, "{prompt} should be blocked");
        assert_eq!(verdict.error.as_deref(), Some(GENERIC_MESSAGE));
        assert!(verdict.sanitized_prompt.is_none());
    }
}

#[tokio::test]
async fn test_length_messages_are_specific() {
    let (guard, _clock) = guard_with_clock();

    let short = guard.validate_command("hi", None).await;
    assert_eq!(
        short.error.as_deref(),
        Some("Command is too short (minimum 3 characters)")
    );

    let long = guard.validate_command(&"a".repeat(1001), None).await;
    assert_eq!(
        long.error.as_deref(),
        Some("Command is too long (maximum 1000 characters)")
    );

    assert!(guard.validate_command(&"a".repeat(1000), None).await.is_valid);
    assert!(guard.validate_command("abc", None).await.is_valid);
}

#[tokio::test]
async fn test_blank_prompt_is_empty() {
    let (guard, _clock) = guard_with_clock();
    let verdict = guard.validate_command("   \n\t ", None).await;
    assert_eq!(
        verdict.error.as_deref(),
        Some("Command must be a non-empty string")
    );
}

#[tokio::test]
async fn test_rate_limit_window_workflow() {
    let (guard, clock) = guard_with_clock();

    for i in 0..10 {
        let verdict = guard
            .validate_command(&format!("Add program {i}"), Some("editor"))
            .await;
        assert!(verdict.is_valid, "request {i} should pass");
    }

    let eleventh = guard.validate_command("Add program 10", Some("editor")).await;
    assert!(!eleventh.is_valid);
    assert_eq!(
        eleventh.error.as_deref(),
        Some("Rate limit exceeded. Please try again in 60 seconds")
    );

    clock.advance(Duration::seconds(30));
    let later = guard.validate_command("Add program 11", Some("editor")).await;
    assert_eq!(
        later.error.as_deref(),
        Some("Rate limit exceeded. Please try again in 30 seconds")
    );

    clock.advance(Duration::milliseconds(30_001));
    assert!(guard.validate_command("Add program 12", Some("editor")).await.is_valid);
}

#[tokio::test]
async fn test_anonymous_prompts_are_not_rate_limited() {
    let (guard, _clock) = guard_with_clock();
    for i in 0..25 {
        assert!(guard.validate_command(&format!("Add news {i}"), None).await.is_valid);
    }
}

#[tokio::test]
async fn test_decisions_are_audited_newest_first() {
    let (guard, _clock) = guard_with_clock();

    guard.validate_command("Add a robotics program", Some("alice")).await;
    guard.validate_command("UNION SELECT password", Some("mallory")).await;

    let log = guard.audit_log().await;
    assert_eq!(log.len(), 2);

    assert_eq!(log[0].action, AuditAction::CommandBlocked);
    assert_eq!(log[0].user_id.as_deref(), Some("mallory"));
    assert_eq!(log[0].reason.as_deref(), Some("pattern:database risk=high"));

    assert_eq!(log[1].action, AuditAction::CommandValidated);
    assert_eq!(log[1].reason.as_deref(), Some("risk=low"));
}

#[tokio::test]
async fn test_metrics_track_block_reasons() {
    let (guard, _clock) = guard_with_clock();

    guard.validate_command("Add a program", None).await;
    guard.validate_command("go", None).await;
    guard.validate_command("DROP TABLE news", None).await;
    guard.validate_command("DELETE FROM news", None).await;

    let summary = guard.metrics();
    assert_eq!(summary.total_decisions, 4);
    assert_eq!(summary.blocked_by_reason.get("too_short"), Some(&1));
    assert_eq!(summary.blocked_by_reason.get("pattern:database"), Some(&2));
    assert!((summary.block_rate - 0.75).abs() < f64::EPSILON);
}
