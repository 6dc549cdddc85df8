//! Test utilities and fixtures.
//!
//! This module provides shared testing infrastructure:
//! - Clocks frozen at a known instant
//! - Blob stores that fail on demand
//! - Site content factories
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};

use crate::content::{FeaturedProgram, NewsItem, SiteContent};
use crate::error::StorageError;
use crate::traits::{ManualTimeProvider, MockBlobStore};

/// 2024-06-01 09:00:00 UTC.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

/// A manual clock starting at [`fixed_time`].
#[must_use]
pub fn manual_clock() -> ManualTimeProvider {
    ManualTimeProvider::new(fixed_time())
}

/// A blob store whose reads and writes always fail.
#[must_use]
pub fn failing_store() -> MockBlobStore {
    let mut store = MockBlobStore::new();
    store.expect_get_blob().returning(|_| {
        Err(StorageError::ConnectionFailed {
            message: "store offline".into(),
        })
    });
    store.expect_set_blob().returning(|_, _| {
        Err(StorageError::ConnectionFailed {
            message: "store offline".into(),
        })
    });
    store
}

/// Program number `i` with a valid image.
#[must_use]
pub fn program(i: usize) -> FeaturedProgram {
    FeaturedProgram::new(
        format!("Program {i}"),
        format!("Description {i}"),
        format!("https://cdn.example.com/programs/{i}.png"),
    )
}

/// News item number `i` with a valid date and image.
#[must_use]
pub fn news_item(i: usize) -> NewsItem {
    NewsItem::new(
        format!("News {i}"),
        "2024-05-01",
        "Events",
        format!("https://cdn.example.com/news/{i}.png"),
    )
}

/// A snapshot with `programs` programs and `news` news items.
#[must_use]
pub fn site_content(programs: usize, news: usize) -> SiteContent {
    SiteContent::new(
        (0..programs).map(program).collect(),
        (0..news).map(news_item).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{BlobStore, TimeProvider};

    #[test]
    fn test_site_content_factory() {
        let content = site_content(3, 2);
        assert_eq!(content.featured_programs.len(), 3);
        assert_eq!(content.latest_news[1].title, "News 1");
    }

    #[test]
    fn test_manual_clock_starts_at_fixed_time() {
        assert_eq!(manual_clock().now(), fixed_time());
    }

    #[tokio::test]
    async fn test_failing_store_fails() {
        let store = failing_store();
        assert!(store.get_blob("k").await.is_err());
        assert!(store.set_blob("k", "v").await.is_err());
    }
}
