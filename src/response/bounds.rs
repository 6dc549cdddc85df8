//! Change-magnitude policy between the live snapshot and a proposal.

use crate::content::{SiteContent, NEWS_KEY, PROGRAMS_KEY};
use crate::error::ChangeBoundViolation;

/// Most programs one response may add.
pub const MAX_PROGRAM_ADDITIONS: usize = 10;

/// Most news items one response may add.
pub const MAX_NEWS_ADDITIONS: usize = 20;

/// Bound `proposed` against `current` and return the snapshot to publish.
///
/// `supplied` is how many records the reply carried before sanitization.
/// An empty proposed category keeps the current one, so a reply that only
/// touches news leaves programs alone. A category that is non-empty today
/// can never come out empty.
///
/// # Errors
///
/// - [`ChangeBoundViolation::NoRecordsProduced`] if the reply supplied no records at all
/// - [`ChangeBoundViolation::CategoryWiped`] if records were supplied but none survived
///   sanitization while `current` has content
/// - [`ChangeBoundViolation::TooManyAdditions`] if a category grows past its allowance
pub fn check_bounds(
    current: &SiteContent,
    proposed: SiteContent,
    supplied: usize,
) -> Result<SiteContent, ChangeBoundViolation> {
    if proposed.is_empty() {
        if supplied == 0 {
            return Err(ChangeBoundViolation::NoRecordsProduced);
        }
        check_not_wiped(current, &proposed)?;
        return Ok(proposed);
    }

    check_additions(
        PROGRAMS_KEY,
        current.featured_programs.len(),
        proposed.featured_programs.len(),
        MAX_PROGRAM_ADDITIONS,
    )?;
    check_additions(
        NEWS_KEY,
        current.latest_news.len(),
        proposed.latest_news.len(),
        MAX_NEWS_ADDITIONS,
    )?;

    let merged = SiteContent {
        featured_programs: if proposed.featured_programs.is_empty() {
            current.featured_programs.clone()
        } else {
            proposed.featured_programs
        },
        latest_news: if proposed.latest_news.is_empty() {
            current.latest_news.clone()
        } else {
            proposed.latest_news
        },
    };

    check_not_wiped(current, &merged)?;
    Ok(merged)
}

fn check_not_wiped(current: &SiteContent, next: &SiteContent) -> Result<(), ChangeBoundViolation> {
    if !current.featured_programs.is_empty() && next.featured_programs.is_empty() {
        return Err(ChangeBoundViolation::CategoryWiped {
            field: PROGRAMS_KEY.into(),
        });
    }
    if !current.latest_news.is_empty() && next.latest_news.is_empty() {
        return Err(ChangeBoundViolation::CategoryWiped {
            field: NEWS_KEY.into(),
        });
    }
    Ok(())
}

fn check_additions(
    field: &str,
    current: usize,
    proposed: usize,
    allowance: usize,
) -> Result<(), ChangeBoundViolation> {
    let limit = current.saturating_add(allowance);
    if proposed > limit {
        return Err(ChangeBoundViolation::TooManyAdditions {
            field: field.into(),
            proposed,
            limit,
        });
    }
    Ok(())
}
