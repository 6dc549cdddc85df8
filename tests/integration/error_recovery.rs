//! Error recovery and edge case tests.
//!
//! Tests how the guard handles malformed replies and damaged persistence.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use content_guard::audit::{AuditAction, AUDIT_LOG_KEY};
use content_guard::content::{FeaturedProgram, SiteContent};
use content_guard::error::{ErrorKind, ResponseError};
use content_guard::guard::Guard;
use content_guard::storage::{MemoryBlobStore, SqliteStorage};
use content_guard::traits::BlobStore;

fn current() -> SiteContent {
    SiteContent::new(
        vec![FeaturedProgram::new(
            "Existing",
            "",
            "https://cdn.example.com/existing.png",
        )],
        vec![],
    )
}

#[tokio::test]
async fn test_malformed_replies_keep_current_content() {
    let guard = Guard::with_defaults(Arc::new(MemoryBlobStore::new()));
    let current = current();

    let cases = [
        ("I could not do that, sorry.", "No JSON object found in response"),
        (
            r#"{"title": "no content keys"}"#,
            "Response must contain featuredPrograms or latestNews",
        ),
        (
            r#"{"featuredPrograms": "not a list"}"#,
            "featuredPrograms must be an array",
        ),
    ];

    for (reply, message) in cases {
        let verdict = guard.validate_response(reply, &current, None).await;
        assert!(!verdict.is_valid, "{reply}");
        assert_eq!(verdict.error.as_deref(), Some(message));
        assert_eq!(verdict.sanitized_content, current);
    }

    let broken = guard
        .validate_response(r#"{"featuredPrograms": [,]}"#, &current, None)
        .await;
    assert!(broken
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("Invalid JSON in response")));
}

#[tokio::test]
async fn test_oversized_reply_is_rejected_before_parsing() {
    let guard = Guard::with_defaults(Arc::new(MemoryBlobStore::new()));
    let padding = "x".repeat(100_001);
    let reply = format!(r#"{{"featuredPrograms": [], "note": "{padding}"}}"#);

    let error = guard
        .response_validator()
        .evaluate(&reply, &current(), None)
        .await
        .unwrap_err();

    assert!(matches!(error, ResponseError::TooLarge { .. }));
    assert_eq!(error.kind(), ErrorKind::InputShape);
}

#[tokio::test]
async fn test_too_many_records_is_input_shape() {
    let guard = Guard::with_defaults(Arc::new(MemoryBlobStore::new()));
    let items: Vec<String> = (0..21).map(|i| format!(r#"{{"title": "P{i}"}}"#)).collect();
    let reply = format!(r#"{{"featuredPrograms": [{}]}}"#, items.join(","));

    let error = guard
        .response_validator()
        .evaluate(&reply, &SiteContent::default(), None)
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "Too many featuredPrograms: 21 (max: 20)");
    assert_eq!(error.kind(), ErrorKind::InputShape);
}

#[tokio::test]
async fn test_change_bound_is_policy_violation() {
    let guard = Guard::with_defaults(Arc::new(MemoryBlobStore::new()));
    let items: Vec<String> = (0..11).map(|i| format!(r#"{{"title": "P{i}"}}"#)).collect();
    let reply = format!(r#"{{"featuredPrograms": [{}]}}"#, items.join(","));

    let error = guard
        .response_validator()
        .evaluate(&reply, &SiteContent::default(), None)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::PolicyViolation);
}

#[tokio::test]
async fn test_corrupt_audit_blob_starts_over() {
    let storage = Arc::new(SqliteStorage::new_in_memory().await.unwrap());
    storage.set_blob(AUDIT_LOG_KEY, "{not json").await.unwrap();

    let guard = Guard::with_defaults(Arc::clone(&storage) as Arc<dyn BlobStore>);
    assert!(guard.audit_log().await.is_empty());

    guard.validate_command("Add a program", None).await;
    let log = guard.audit_log().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::CommandValidated);
}

#[tokio::test]
async fn test_cleared_audit_log_is_empty() {
    let guard = Guard::with_defaults(Arc::new(MemoryBlobStore::new()));
    guard.validate_command("Add a program", None).await;
    guard.audit().clear().await;
    assert!(guard.audit_log().await.is_empty());
}
