//! CLI output formatting for the feed.
//!
//! # Output Format
//!
//! ## Loaded feed
//!
//! ```text
//! This Day in Space
//! Explore NASA's historical images from 1969
//!
//! 2 Images Found
//! Scroll through the timeline to explore space history from Sunday, July 20, 1969
//!
//! 001 Aldrin on the Moon
//!     Date: Sunday, July 20, 1969
//!     Buzz Aldrin stands beside the seismometer...
//!     Id: https://images-assets.nasa.gov/image/as11-40-5874/collection.json
//! 002 Earthrise [expanded]
//!     Date: Sunday, July 20, 1969
//!     Center: JSC
//!     Photographer: Bill Anders
//!     Location: Lunar orbit
//!     Keywords: Apollo 8, Earth, Moon
//!     Description: The Earth rising above the lunar horizon...
//!     Thumbnail: https://images-assets.nasa.gov/image/as08-14-2383/as08-14-2383~thumb.jpg
//!     Id: https://images-assets.nasa.gov/image/as08-14-2383/collection.json
//! ```
//!
//! Collapsed cards show the date and the truncated description; the
//! expanded card (`--expand <ID>`) lists every field.
//!
//! ## Empty and failed feeds
//!
//! ```text
//! No Images Found
//!     No NASA images were found for Sunday, July 20, 1969. Try selecting ...
//! ```
//!
//! ```text
//! Failed to fetch NASA images for this date. Please try again.
//!     Upstream request failed: HTTP 503 from https://images-api.nasa.gov/search?year_start=1969&...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::display::{self, Card, POPULAR_KEYWORDS, Preview};
use crate::state::{FeedStatus, FeedView};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
///
/// Upstream descriptions frequently embed links and line breaks.
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Collapse runs of whitespace so descriptions stay on one line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Card lines: header, then indented fields.
fn card_lines(index: usize, card: &Card) -> Vec<String> {
    let pad = indent(1);
    let mut lines = Vec::new();
    if card.expanded {
        lines.push(format!("{} {} [expanded]", format_index(index), card.title));
        lines.push(format!("{pad}Date: {}", card.date));
        lines.push(format!("{pad}Center: {}", card.center));
        lines.push(format!("{pad}Photographer: {}", card.photographer));
        lines.push(format!("{pad}Location: {}", card.location));
        lines.push(format!("{pad}Keywords: {}", card.keywords));
        lines.push(format!(
            "{pad}Description: {}",
            single_line(&strip_html_tags(&card.description))
        ));
        lines.push(format!("{pad}Thumbnail: {}", card.thumbnail_url));
    } else {
        lines.push(format!("{} {}", format_index(index), card.title));
        lines.push(format!("{pad}Date: {}", card.date));
        lines.push(format!(
            "{pad}{}",
            single_line(&strip_html_tags(&card.short_description))
        ));
    }
    lines.push(format!("{pad}Id: {}", card.id));
    lines
}

/// Format the whole feed view for the terminal.
pub fn format_feed(view: &FeedView, title: &str, preview: &Preview) -> Vec<String> {
    let mut lines = vec![title.to_string(), display::headline(&view.selection)];
    lines.push(String::new());

    match &view.status {
        FeedStatus::Loading => {
            lines.push("Loading NASA images...".to_string());
        }
        FeedStatus::Failed(detail) => {
            lines.push(display::failure_message(view).to_string());
            lines.push(format!("{}{}", indent(1), detail));
        }
        FeedStatus::Loaded(result) if result.is_empty() => {
            lines.push("No Images Found".to_string());
            lines.push(format!(
                "{}{}",
                indent(1),
                display::empty_message(&view.selection)
            ));
        }
        FeedStatus::Loaded(result) => {
            lines.push(display::hits_label(result.total_hits));
            lines.push(display::results_caption(&view.selection));
            lines.push(String::new());
            for (i, card) in display::cards(result, &view.selection, preview)
                .iter()
                .enumerate()
            {
                lines.extend(card_lines(i + 1, card));
            }
            if let Some(notice) = display::partial_notice(result) {
                lines.push(String::new());
                lines.push(notice);
            }
        }
    }
    lines
}

pub fn print_feed(view: &FeedView, title: &str, preview: &Preview) {
    for line in format_feed(view, title, preview) {
        println!("{}", line);
    }
}

/// Popular searches, one per line.
pub fn format_keyword_suggestions() -> Vec<String> {
    let mut lines = vec!["Popular searches".to_string()];
    lines.extend(
        POPULAR_KEYWORDS
            .iter()
            .enumerate()
            .map(|(i, keyword)| format!("{}{} {}", indent(1), format_index(i + 1), keyword)),
    );
    lines
}

pub fn print_keyword_suggestions() {
    for line in format_keyword_suggestions() {
        println!("{}", line);
    }
}
