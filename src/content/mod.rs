//! Live site content model.
//!
//! [`SiteContent`] is the snapshot the model is allowed to rewrite. Wire names
//! are camelCase to match the JSON the model is asked to produce.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum featured programs in a snapshot.
pub const MAX_PROGRAMS: usize = 20;

/// Maximum news items in a snapshot.
pub const MAX_NEWS: usize = 50;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum program description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Maximum news category length in characters.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Maximum image URL length in characters.
pub const MAX_IMAGE_URL_LEN: usize = 500;

/// JSON key holding featured programs.
pub const PROGRAMS_KEY: &str = "featuredPrograms";

/// JSON key holding news items.
pub const NEWS_KEY: &str = "latestNews";

/// A featured program card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedProgram {
    /// Program title (1-200 chars).
    pub title: String,
    /// Program description (0-1000 chars).
    pub description: String,
    /// Card image, http(s) only (max 500 chars).
    pub image_url: String,
}

impl FeaturedProgram {
    /// Create a new program record.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image_url: image_url.into(),
        }
    }
}

/// A news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Headline (1-200 chars).
    pub title: String,
    /// Publication date, `YYYY-MM-DD`.
    pub date: String,
    /// Category label (1-100 chars).
    pub category: String,
    /// Thumbnail, http(s) only (max 500 chars).
    pub image_url: String,
}

impl NewsItem {
    /// Create a new news record.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            category: category.into(),
            image_url: image_url.into(),
        }
    }
}

/// A full snapshot of the editable site content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    /// Featured programs (max 20).
    #[serde(default)]
    pub featured_programs: Vec<FeaturedProgram>,
    /// Latest news (max 50).
    #[serde(default)]
    pub latest_news: Vec<NewsItem>,
}

impl SiteContent {
    /// Create a snapshot from both categories.
    #[must_use]
    pub const fn new(featured_programs: Vec<FeaturedProgram>, latest_news: Vec<NewsItem>) -> Self {
        Self {
            featured_programs,
            latest_news,
        }
    }

    /// True when both categories are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.featured_programs.is_empty() && self.latest_news.is_empty()
    }
}
