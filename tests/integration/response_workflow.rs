//! Reply validation workflow tests.
//!
//! Tests the reply path end to end: extraction from chatty model output,
//! field sanitization with defaults, change bounds and category fallback.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use content_guard::audit::AuditAction;
use content_guard::config::Config;
use content_guard::content::{FeaturedProgram, NewsItem, SiteContent};
use content_guard::guard::Guard;
use content_guard::storage::MemoryBlobStore;
use content_guard::traits::ManualTimeProvider;
use pretty_assertions::assert_eq;
use serde_json::json;

fn guard() -> Guard {
    let clock = ManualTimeProvider::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
    Guard::new(
        &Config::default(),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(clock),
    )
}

fn programs(n: usize) -> Vec<FeaturedProgram> {
    (0..n)
        .map(|i| {
            FeaturedProgram::new(
                format!("Program {i}"),
                "An existing program",
                format!("https://cdn.example.com/p/{i}.png"),
            )
        })
        .collect()
}

fn news(n: usize) -> Vec<NewsItem> {
    (0..n)
        .map(|i| {
            NewsItem::new(
                format!("News {i}"),
                "2024-05-01",
                "Events",
                format!("https://cdn.example.com/n/{i}.png"),
            )
        })
        .collect()
}

fn reply_with(programs: &[FeaturedProgram], news: &[NewsItem]) -> String {
    json!({ "featuredPrograms": programs, "latestNews": news }).to_string()
}

#[tokio::test]
async fn test_first_program_on_empty_site() {
    let guard = guard();
    let reply = r#"{"featuredPrograms": [{"title": "Coding Club", "description": "Weekly", "imageUrl": "https://cdn.example.com/club.png"}], "latestNews": []}"#;

    let verdict = guard
        .validate_response(reply, &SiteContent::default(), Some("editor"))
        .await;

    assert!(verdict.is_valid);
    assert_eq!(verdict.error, None);
    assert_eq!(verdict.sanitized_content.featured_programs.len(), 1);
    assert!(verdict.sanitized_content.latest_news.is_empty());

    let program = &verdict.sanitized_content.featured_programs[0];
    assert_eq!(program.title, "Coding Club");
    assert_eq!(program.image_url, "https://cdn.example.com/club.png");
}

#[tokio::test]
async fn test_chatty_reply_is_sanitized_with_defaults() {
    let guard = guard();
    let reply = r#"Sure! Here is the update:
{"featuredPrograms": [
    {"title": "<b>Robotics</b> Camp", "imageUrl": "javascript:alert(1)"},
    {"title": "<script></script>"}
 ],
 "latestNews": [
    {"title": "Open day", "date": "March 1, 2024"},
    {"title": "Results", "date": "not a date", "category": "Awards", "imageUrl": "ftp://x"}
 ]}
Let me know if you need anything else."#;

    let verdict = guard
        .validate_response(reply, &SiteContent::default(), None)
        .await;
    assert!(verdict.is_valid, "{:?}", verdict.error);

    let content = verdict.sanitized_content;
    assert_eq!(
        content.featured_programs,
        vec![FeaturedProgram::new(
            "Robotics Camp",
            "",
            "https://placehold.co/600x400?text=Program"
        )]
    );
    assert_eq!(
        content.latest_news,
        vec![
            NewsItem::new(
                "Open day",
                "2024-03-01",
                "General",
                "https://placehold.co/600x400?text=News"
            ),
            NewsItem::new(
                "Results",
                "2024-06-01",
                "Awards",
                "https://placehold.co/600x400?text=News"
            ),
        ]
    );

    let log = guard.audit_log().await;
    assert_eq!(log[0].action, AuditAction::ResponseValidated);
    assert_eq!(log[0].reason.as_deref(), Some("programs=1 news=2 dropped=1"));
}

#[tokio::test]
async fn test_sanitizing_clean_content_is_idempotent() {
    let guard = guard();
    let reply = r#"{"featuredPrograms": [{"title": " <i>Art</i> Studio ", "description": "Paint & <u>draw</u>", "imageUrl": "https://cdn.example.com/'art'.png"}],
                    "latestNews": [{"title": "Gala", "date": "2024-04-30T18:00:00Z", "category": "<em>Events</em>"}]}"#;

    let first = guard
        .validate_response(reply, &SiteContent::default(), None)
        .await;
    assert!(first.is_valid);

    let clean = first.sanitized_content;
    let again = guard
        .validate_response(
            &reply_with(&clean.featured_programs, &clean.latest_news),
            &clean,
            None,
        )
        .await;

    assert!(again.is_valid);
    assert_eq!(again.sanitized_content, clean);
}

#[tokio::test]
async fn test_program_addition_bound() {
    let guard = guard();
    let current = SiteContent::new(programs(5), news(0));

    let accepted = guard
        .validate_response(&reply_with(&programs(15), &[]), &current, None)
        .await;
    assert!(accepted.is_valid);
    assert_eq!(accepted.sanitized_content.featured_programs.len(), 15);

    let rejected = guard
        .validate_response(&reply_with(&programs(16), &[]), &current, None)
        .await;
    assert!(!rejected.is_valid);
    assert_eq!(
        rejected.error.as_deref(),
        Some("Too many featuredPrograms added in one response: 16 proposed, at most 15 allowed")
    );
    assert_eq!(rejected.sanitized_content, current);
}

#[tokio::test]
async fn test_news_addition_bound() {
    let guard = guard();
    let current = SiteContent::new(programs(1), news(2));

    let accepted = guard
        .validate_response(&reply_with(&[], &news(22)), &current, None)
        .await;
    assert!(accepted.is_valid);

    let rejected = guard
        .validate_response(&reply_with(&[], &news(23)), &current, None)
        .await;
    assert!(!rejected.is_valid);
    assert_eq!(rejected.sanitized_content, current);
}

#[tokio::test]
async fn test_empty_programs_fall_back_to_current() {
    let guard = guard();
    let current = SiteContent::new(programs(3), news(1));

    let verdict = guard
        .validate_response(&reply_with(&[], &news(4)), &current, None)
        .await;

    assert!(verdict.is_valid);
    assert_eq!(verdict.sanitized_content.featured_programs, programs(3));
    assert_eq!(verdict.sanitized_content.latest_news, news(4));
}

#[tokio::test]
async fn test_fenced_empty_reply_keeps_current() {
    let guard = guard();
    let current = SiteContent::new(programs(2), news(2));
    let reply = "Here you go:\n```json\n{\"featuredPrograms\":[],\"latestNews\":[]}\n```";

    let verdict = guard.validate_response(reply, &current, Some("editor")).await;

    assert!(!verdict.is_valid);
    assert_eq!(
        verdict.error.as_deref(),
        Some("Response produced no content records; keeping current content")
    );
    assert_eq!(verdict.sanitized_content, current);

    let log = guard.audit_log().await;
    assert_eq!(log[0].action, AuditAction::ResponseBlocked);
    assert_eq!(log[0].reason.as_deref(), Some("no_records_produced"));
}

#[tokio::test]
async fn test_untitled_records_depend_on_current_content() {
    let guard = guard();
    let reply = r#"{"featuredPrograms":[{"description":"no title"}],"latestNews":[]}"#;

    let on_empty = guard
        .validate_response(reply, &SiteContent::default(), None)
        .await;
    assert!(on_empty.is_valid);
    assert!(on_empty.sanitized_content.is_empty());

    let current = SiteContent::new(vec![], news(1));
    let on_live = guard.validate_response(reply, &current, None).await;
    assert!(!on_live.is_valid);
    assert_eq!(
        on_live.error.as_deref(),
        Some("Response would remove all latestNews; clearing a category in one step is not allowed")
    );
    assert_eq!(on_live.sanitized_content, current);
}
