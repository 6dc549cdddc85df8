//! Structural validation of the parsed model reply.
//!
//! Records are sanitized field by field with safe defaults, then every
//! surviving record is checked again against the full contract before the
//! batch is accepted.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::sanitize::{
    is_canonical_date, sanitize_date, sanitize_image_url, sanitize_string, DATE_FORMAT,
};
use crate::content::{
    FeaturedProgram, NewsItem, MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN, MAX_IMAGE_URL_LEN,
    MAX_NEWS, MAX_PROGRAMS, MAX_TITLE_LEN, NEWS_KEY, PROGRAMS_KEY,
};
use crate::error::ResponseError;

/// Image used when a program has no usable image URL.
pub const PROGRAM_PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=Program";

/// Image used when a news item has no usable image URL.
pub const NEWS_PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=News";

/// Category used when a news item has none.
pub const DEFAULT_NEWS_CATEGORY: &str = "General";

/// Sanitized records from one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedRecords {
    /// Programs that survived sanitization.
    pub programs: Vec<FeaturedProgram>,
    /// News items that survived sanitization.
    pub news: Vec<NewsItem>,
    /// Records supplied across both arrays, before any were dropped.
    pub raw_record_count: usize,
}

impl SanitizedRecords {
    /// Records dropped for lacking a usable title or not being objects.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.raw_record_count - self.programs.len() - self.news.len()
    }
}

/// Validate the parsed reply and sanitize its records.
///
/// `today` fills in missing or unparseable news dates.
///
/// # Errors
///
/// - [`ResponseError::MissingContentKeys`] if neither content key is present
/// - [`ResponseError::NotAnArray`] if a present key is not an array
/// - [`ResponseError::TooManyRecords`] if an array exceeds its cap
/// - [`ResponseError::InvalidRecord`] if a sanitized record fails the re-check
pub fn validate_and_sanitize(
    parsed: &Map<String, Value>,
    today: NaiveDate,
) -> Result<SanitizedRecords, ResponseError> {
    let programs_raw = parsed.get(PROGRAMS_KEY);
    let news_raw = parsed.get(NEWS_KEY);
    if programs_raw.is_none() && news_raw.is_none() {
        return Err(ResponseError::MissingContentKeys);
    }

    let programs_raw = records(programs_raw, PROGRAMS_KEY, MAX_PROGRAMS)?;
    let news_raw = records(news_raw, NEWS_KEY, MAX_NEWS)?;

    let today = today.format(DATE_FORMAT).to_string();
    let programs: Vec<FeaturedProgram> = programs_raw.iter().filter_map(sanitize_program).collect();
    let news: Vec<NewsItem> = news_raw
        .iter()
        .filter_map(|record| sanitize_news(record, &today))
        .collect();

    for (index, program) in programs.iter().enumerate() {
        check_program(program).map_err(|reason| ResponseError::InvalidRecord {
            field: PROGRAMS_KEY.into(),
            index,
            reason,
        })?;
    }
    for (index, item) in news.iter().enumerate() {
        check_news(item).map_err(|reason| ResponseError::InvalidRecord {
            field: NEWS_KEY.into(),
            index,
            reason,
        })?;
    }

    let sanitized = SanitizedRecords {
        programs,
        news,
        raw_record_count: programs_raw.len() + news_raw.len(),
    };
    if sanitized.dropped() > 0 {
        tracing::debug!(dropped = sanitized.dropped(), "Dropped records without a usable title");
    }
    Ok(sanitized)
}

fn records<'a>(
    value: Option<&'a Value>,
    field: &str,
    max: usize,
) -> Result<&'a [Value], ResponseError> {
    let Some(value) = value else {
        return Ok(&[]);
    };
    let array = value.as_array().ok_or_else(|| ResponseError::NotAnArray {
        field: field.into(),
    })?;
    if array.len() > max {
        return Err(ResponseError::TooManyRecords {
            field: field.into(),
            count: array.len(),
            max,
        });
    }
    Ok(array)
}

fn sanitize_program(record: &Value) -> Option<FeaturedProgram> {
    let record = record.as_object()?;
    let title = record
        .get("title")
        .and_then(|v| sanitize_string(v, MAX_TITLE_LEN))?;
    let description = record
        .get("description")
        .and_then(|v| sanitize_string(v, MAX_DESCRIPTION_LEN))
        .unwrap_or_default();
    let image_url = record
        .get("imageUrl")
        .and_then(sanitize_image_url)
        .unwrap_or_else(|| PROGRAM_PLACEHOLDER_IMAGE.into());
    Some(FeaturedProgram {
        title,
        description,
        image_url,
    })
}

fn sanitize_news(record: &Value, today: &str) -> Option<NewsItem> {
    let record = record.as_object()?;
    let title = record
        .get("title")
        .and_then(|v| sanitize_string(v, MAX_TITLE_LEN))?;
    let date = record
        .get("date")
        .and_then(sanitize_date)
        .unwrap_or_else(|| today.to_string());
    let category = record
        .get("category")
        .and_then(|v| sanitize_string(v, MAX_CATEGORY_LEN))
        .unwrap_or_else(|| DEFAULT_NEWS_CATEGORY.into());
    let image_url = record
        .get("imageUrl")
        .and_then(sanitize_image_url)
        .unwrap_or_else(|| NEWS_PLACEHOLDER_IMAGE.into());
    Some(NewsItem {
        title,
        date,
        category,
        image_url,
    })
}

fn check_title(title: &str) -> Result<(), String> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err("title is empty".into());
    }
    if len > MAX_TITLE_LEN {
        return Err(format!("title exceeds {MAX_TITLE_LEN} characters"));
    }
    Ok(())
}

fn check_image_url(url: &str) -> Result<(), String> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err("imageUrl must be http or https".into());
    }
    if url.chars().count() > MAX_IMAGE_URL_LEN {
        return Err(format!("imageUrl exceeds {MAX_IMAGE_URL_LEN} characters"));
    }
    Ok(())
}

/// Check a program against the full structural contract.
///
/// # Errors
///
/// Returns the first failed constraint as text.
pub fn check_program(program: &FeaturedProgram) -> Result<(), String> {
    check_title(&program.title)?;
    if program.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "description exceeds {MAX_DESCRIPTION_LEN} characters"
        ));
    }
    check_image_url(&program.image_url)
}

/// Check a news item against the full structural contract.
///
/// # Errors
///
/// Returns the first failed constraint as text.
pub fn check_news(item: &NewsItem) -> Result<(), String> {
    check_title(&item.title)?;
    if !is_canonical_date(&item.date) {
        return Err("date must be YYYY-MM-DD".into());
    }
    let category_len = item.category.trim().chars().count();
    if category_len == 0 || category_len > MAX_CATEGORY_LEN {
        return Err(format!(
            "category must be 1-{MAX_CATEGORY_LEN} characters"
        ));
    }
    check_image_url(&item.image_url)
}
