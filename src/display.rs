//! Display defaults for image records.
//!
//! Normalized records are faithful copies of upstream data, so almost any
//! field can be missing. This module resolves what a card actually shows,
//! field by field, using the first non-empty source:
//!
//! | Field | Sources, in order | Default |
//! |-------|-------------------|---------|
//! | title | `title` | `Untitled Image` |
//! | description | `description` → `description_508` | `No description available` |
//! | date | `date_created` (formatted) | `Date unknown` |
//! | center | `center` | `Unknown Center` |
//! | photographer | `photographer` | `Unknown` |
//! | location | `location` | `Unknown Location` |
//! | keywords | first N `keywords` | `No keywords available` |
//! | thumbnail | first link with `render = "image"` → record `href` | |
//!
//! Both renderers ([`crate::output`] and [`crate::generate`]) go through
//! [`Card`] so the terminal and HTML feeds agree.

use crate::state::{FeedView, SelectionState};
use crate::types::{ImageRecord, SearchResult};
use chrono::{DateTime, NaiveDate};

pub const UNTITLED: &str = "Untitled Image";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_KEYWORDS: &str = "No keywords available";
pub const DATE_UNKNOWN: &str = "Date unknown";
pub const INVALID_DATE: &str = "Invalid date";

/// Suggested searches offered next to the keyword input.
pub const POPULAR_KEYWORDS: &[&str] = &[
    "apollo",
    "space shuttle",
    "international space station",
    "mars",
    "saturn",
    "galaxy",
    "nebula",
    "earth",
    "moon",
    "solar system",
    "astronaut",
    "rocket",
    "satellite",
    "telescope",
    "rover",
    "mission",
];

/// How many characters and keywords a collapsed card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview {
    pub description_chars: usize,
    pub keywords: usize,
}

impl Default for Preview {
    fn default() -> Self {
        Self {
            description_chars: 150,
            keywords: 5,
        }
    }
}

/// Display-ready fields of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub date: String,
    pub center: String,
    pub photographer: String,
    pub location: String,
    pub keywords: String,
    pub thumbnail_url: String,
    pub source_url: String,
    pub expanded: bool,
}

impl Card {
    pub fn from_record(record: &ImageRecord, preview: &Preview, expanded: bool) -> Self {
        let meta = record.primary().cloned().unwrap_or_default();
        let description = first_non_empty(&[
            meta.description.as_deref(),
            meta.description_508.as_deref(),
        ])
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        Self {
            id: record.source_id.clone(),
            title: first_non_empty(&[meta.title.as_deref()]).unwrap_or_else(|| UNTITLED.into()),
            short_description: truncate_text(&description, preview.description_chars),
            description,
            date: meta
                .date_created
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| DATE_UNKNOWN.into()),
            center: first_non_empty(&[meta.center.as_deref()])
                .unwrap_or_else(|| "Unknown Center".into()),
            photographer: first_non_empty(&[meta.photographer.as_deref()])
                .unwrap_or_else(|| "Unknown".into()),
            location: first_non_empty(&[meta.location.as_deref()])
                .unwrap_or_else(|| "Unknown Location".into()),
            keywords: format_keywords(&meta.keywords, preview.keywords),
            thumbnail_url: thumbnail_url(record).to_string(),
            source_url: record.source_id.clone(),
            expanded,
        }
    }
}

/// Cards for every record of a result, marking the expanded one.
pub fn cards(result: &SearchResult, selection: &SelectionState, preview: &Preview) -> Vec<Card> {
    result
        .items
        .iter()
        .map(|record| {
            let expanded = selection.expanded_record_id() == Some(record.source_id.as_str());
            Card::from_record(record, preview, expanded)
        })
        .collect()
}

/// First non-None, non-blank value, trimmed.
pub fn first_non_empty(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Image to show for a record: its image render link, else its `href`.
pub fn thumbnail_url(record: &ImageRecord) -> &str {
    record
        .render_links
        .iter()
        .find(|link| link.is_image())
        .map(|link| link.href.as_str())
        .unwrap_or(&record.source_id)
}

/// Truncate to `max` characters (not bytes), appending `...` when cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
    }
}

/// Comma-separated first `limit` keywords.
pub fn format_keywords(keywords: &[String], limit: usize) -> String {
    let shown: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .take(limit)
        .collect();
    if shown.is_empty() {
        NO_KEYWORDS.to_string()
    } else {
        shown.join(", ")
    }
}

/// Long-form date, e.g. `Sunday, July 20, 1969`.
///
/// Accepts RFC 3339 timestamps (as upstream sends them) or bare
/// `YYYY-MM-DD` dates. The calendar date is taken as written, without
/// shifting time zones.
pub fn format_date(value: &str) -> String {
    let value = value.trim();
    let date = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        });
    match date {
        Some(date) => format_long_date(date),
        None => INVALID_DATE.to_string(),
    }
}

pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Subtitle under the page title.
pub fn headline(selection: &SelectionState) -> String {
    match selection.active_keywords() {
        Some(keywords) => format!("Searching for: {keywords}"),
        None => format!(
            "Explore NASA's historical images from {}",
            selection.selected_date().format("%Y")
        ),
    }
}

/// `1 Image Found` / `42 Images Found`.
pub fn hits_label(total_hits: u64) -> String {
    let plural = if total_hits == 1 { "" } else { "s" };
    format!("{total_hits} Image{plural} Found")
}

/// Line under the hit count.
pub fn results_caption(selection: &SelectionState) -> String {
    match selection.active_keywords() {
        Some(keywords) => format!("Results for: {keywords}"),
        None => format!(
            "Scroll through the timeline to explore space history from {}",
            format_long_date(selection.selected_date())
        ),
    }
}

/// `Showing 100 of 2345 images` when upstream has more than one page.
pub fn partial_notice(result: &SearchResult) -> Option<String> {
    result.is_partial().then(|| {
        format!(
            "Showing {} of {} images. More images may be available",
            result.items.len(),
            result.total_hits
        )
    })
}

/// Message for the "no images found" view.
///
/// Date browsing suggests another date; keyword search suggests other terms.
pub fn empty_message(selection: &SelectionState) -> String {
    match selection.active_keywords() {
        Some(keywords) => format!(
            "No NASA images were found for \"{keywords}\". Try different keywords or browse by date."
        ),
        None => format!(
            "No NASA images were found for {}. Try selecting a different date or use the search feature.",
            format_long_date(selection.selected_date())
        ),
    }
}

/// Message for the failed view. The underlying error is shown as detail.
pub fn failure_message(view: &FeedView) -> &'static str {
    if view.selection.is_searching() {
        "Failed to fetch NASA images for this search. Please try again."
    } else {
        "Failed to fetch NASA images for this date. Please try again."
    }
}
