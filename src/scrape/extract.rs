//! Extractors for the two scraped page shapes
//!
//! Each extractor is a pure function over a raw page body. They are coupled
//! to fixed upstream layouts on purpose:
//! - the ranking page: a `table#top20` with 20 rows of 7 cells
//! - the topic page: a "Here are N public repositories matching this topic"
//!   sentence
//! - the topic listing: `<article>` items, each with a `<relative-time>` and
//!   `a.topic-tag` labels, newest first

use crate::{Result, ScrapeError};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Rows in the ranking table
pub const RANKING_ROWS: usize = 20;

/// Cells per ranking row
pub const RANKING_STRIDE: usize = 7;

/// Column holding the language name
pub const RANKING_NAME_OFFSET: usize = 4;

/// Listing items older than this are not counted
pub const STALENESS_WINDOW_DAYS: i64 = 30;

static RANKING_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table#top20").expect("Table selector is hardcoded and valid"));

static TABLE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Cell selector is hardcoded and valid"));

static ARTICLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("Article selector is hardcoded and valid"));

static RELATIVE_TIME: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("relative-time").expect("Relative time selector is hardcoded and valid")
});

static TOPIC_TAG: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.topic-tag").expect("Tag selector is hardcoded and valid"));

static COUNT_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Here\s+are\s+(\S+)\s+public\s+repositories\s+matching\s+this\s+topic")
        .expect("Anchor regex is hardcoded and valid")
});

static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*").expect("Digit regex is hardcoded and valid"));

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})")
        .expect("Timestamp regex is hardcoded and valid")
});

/// Extracts the ranked language names from the ranking page
///
/// Reads the first `RANKING_ROWS * RANKING_STRIDE` cells of `table#top20`
/// and returns the text of every `RANKING_STRIDE`th cell starting at
/// `RANKING_NAME_OFFSET`, in document order.
///
/// # Errors
///
/// * `ScrapeError::Parse("table")` - no `table#top20` in the page
/// * `ScrapeError::Parse("cells")` - the table has fewer than 140 cells
///
/// # Example
///
/// ```
/// use lang_pulse::scrape::extract_ranking;
///
/// let err = extract_ranking(b"<html><body></body></html>").unwrap_err();
/// assert_eq!(err.to_string(), "Could not parse table");
/// ```
pub fn extract_ranking(body: &[u8]) -> Result<Vec<String>> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let table = document
        .select(&RANKING_TABLE)
        .next()
        .ok_or(ScrapeError::Parse("table"))?;

    let total = RANKING_ROWS * RANKING_STRIDE;
    let cells: Vec<ElementRef> = table.select(&TABLE_CELL).take(total).collect();
    if cells.len() < total {
        tracing::error!("Ranking table has {} cells, expected {}", cells.len(), total);
        return Err(ScrapeError::Parse("cells"));
    }

    let names = cells
        .iter()
        .skip(RANKING_NAME_OFFSET)
        .step_by(RANKING_STRIDE)
        .map(|cell| element_text(cell))
        .inspect(|name| tracing::trace!("Adding language {}", name))
        .collect();

    Ok(names)
}

/// Extracts the public repository count from a topic page
///
/// # Errors
///
/// * `ScrapeError::Parse("anchor")` - the count sentence is absent
/// * `ScrapeError::Parse("number")` - the sentence carries no digits
/// * `ScrapeError::NumericOverflow` - the count does not fit a `u32`
///
/// # Example
///
/// ```
/// use lang_pulse::scrape::extract_count;
///
/// let page = b"<h2>Here are 2,300 public repositories matching this topic...</h2>";
/// assert_eq!(extract_count(page).unwrap(), 2300);
/// ```
pub fn extract_count(body: &[u8]) -> Result<u32> {
    let text = String::from_utf8_lossy(body);

    let captures = COUNT_ANCHOR
        .captures(&text)
        .ok_or(ScrapeError::Parse("anchor"))?;
    let quantity = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

    let digits = DIGIT_RUN
        .find(quantity)
        .ok_or(ScrapeError::Parse("number"))?
        .as_str()
        .replace(',', "");

    Ok(digits.parse::<u32>()?)
}

/// Timestamp threshold for the topic listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff {
    threshold: DateTime<Utc>,
}

impl Cutoff {
    /// Items updated before `now - STALENESS_WINDOW_DAYS` are stale
    pub fn from_now(now: DateTime<Utc>) -> Self {
        Self {
            threshold: now - Duration::days(STALENESS_WINDOW_DAYS),
        }
    }

    pub fn threshold(&self) -> DateTime<Utc> {
        self.threshold
    }

    pub fn is_stale(&self, updated: DateTime<Utc>) -> bool {
        updated < self.threshold
    }
}

/// Extracts the tags of recently updated items from a topic listing page
///
/// Items are read in document order, which upstream is newest first:
/// - an item without a parseable timestamp is skipped
/// - the first stale item ends processing of this page
///
/// Tags are returned in document order and may repeat.
pub fn extract_listing(body: &[u8], cutoff: &Cutoff) -> Vec<String> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let mut tags = Vec::new();
    for article in document.select(&ARTICLE) {
        let Some(updated) = article_timestamp(&article) else {
            tracing::warn!("Error reading time, skipping article");
            continue;
        };

        if cutoff.is_stale(updated) {
            tracing::trace!(
                "Stop page processing, {} is older than {} days",
                updated,
                STALENESS_WINDOW_DAYS
            );
            break;
        }

        tags.extend(
            article
                .select(&TOPIC_TAG)
                .map(|tag| element_text(&tag))
                .filter(|tag| !tag.is_empty()),
        );
    }

    tags
}

/// Reads the item timestamp from its `<relative-time>` element
///
/// The `datetime` attribute is preferred; the element text is the fallback.
fn article_timestamp(article: &ElementRef) -> Option<DateTime<Utc>> {
    let time = article.select(&RELATIVE_TIME).next()?;

    let raw = time
        .value()
        .attr("datetime")
        .map(str::to_string)
        .unwrap_or_else(|| time.text().collect::<String>());

    let stamp = TIMESTAMP.find(&raw)?;
    DateTime::parse_from_rfc3339(stamp.as_str())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Concatenated, trimmed text content of an element
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
