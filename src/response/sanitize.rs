//! Per-field cleaning of model-produced values.
//!
//! Every function returns `None` when the value cannot be made safe, leaving
//! the fallback decision to the caller. All three are idempotent: feeding a
//! sanitized value back in returns it unchanged.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use crate::content::MAX_IMAGE_URL_LEN;

/// Canonical news date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[allow(clippy::expect_used)]
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

#[allow(clippy::expect_used)]
static SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:javascript|data|vbscript)\s*:").expect("valid scheme pattern")
});

#[allow(clippy::expect_used)]
static HTTP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("valid url prefix pattern"));

#[allow(clippy::expect_used)]
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Apply `strip` until the text stops changing.
///
/// Removing one match can splice a new one together (`<<b>b>`), so a single
/// pass is not enough for idempotence. Each pass shortens the text, so this
/// terminates.
fn strip_until_stable(text: &str, strip: impl Fn(&str) -> String) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_markup(text: &str) -> String {
    strip_until_stable(text, |t| {
        let without_tags = TAG.replace_all(t, "");
        SCHEME.replace_all(&without_tags, "").into_owned()
    })
}

/// Clean a free-text field.
///
/// Strips tags and dangerous scheme prefixes, then trims. Returns `None` for
/// non-strings, empty results, and results longer than `max_len` characters.
#[must_use]
pub fn sanitize_string(value: &Value, max_len: usize) -> Option<String> {
    let text = value.as_str()?;
    let cleaned = strip_markup(text);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.chars().count() > max_len {
        return None;
    }
    Some(cleaned.to_string())
}

/// Clean an image URL.
///
/// Requires an `http://` or `https://` prefix both before and after quotes
/// and tags are removed, and at most 500 characters.
#[must_use]
pub fn sanitize_image_url(value: &Value) -> Option<String> {
    let raw = value.as_str()?.trim();
    if !HTTP_PREFIX.is_match(raw) {
        return None;
    }

    let cleaned = strip_until_stable(raw, |t| {
        TAG.replace_all(t, "").replace(['"', '\'', '`'], "")
    });
    let cleaned = cleaned.trim();

    if !HTTP_PREFIX.is_match(cleaned) || cleaned.chars().count() > MAX_IMAGE_URL_LEN {
        return None;
    }
    Some(cleaned.to_string())
}

/// Normalize a date to `YYYY-MM-DD`.
///
/// Canonical dates are kept as-is when they name a real calendar day. Other
/// common shapes (RFC 3339, RFC 2822, `2024/03/01`, `03/01/2024`,
/// `March 1, 2024`, `1 March 2024`) are parsed and reformatted.
#[must_use]
pub fn sanitize_date(value: &Value) -> Option<String> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    if ISO_DATE.is_match(raw) {
        return NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .map(|_| raw.to_string());
    }

    parse_date(raw).map(|date| date.format(DATE_FORMAT).to_string())
}

/// True when `text` is a canonical `YYYY-MM-DD` calendar date.
#[must_use]
pub fn is_canonical_date(text: &str) -> bool {
    ISO_DATE.is_match(text) && NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        })
}
