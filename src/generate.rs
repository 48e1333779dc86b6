//! HTML feed generation.
//!
//! Renders a [`FeedView`] snapshot to a single self-contained HTML page:
//! header with the active headline, one of the four feed states, and the
//! popular keyword suggestions.
//!
//! ## Feed States
//!
//! - **Loading**: placeholder shown before any outcome was applied
//! - **Loaded**: hit count, caption, and the card timeline
//! - **Empty**: loaded with zero items; wording depends on date vs keyword mode
//! - **Failed**: error message with the underlying detail and a retry hint
//!
//! ## Cards
//!
//! Each record renders as a `<details>` element. The collapsed summary shows
//! the thumbnail, title, date, and truncated description; opening it reveals
//! the full description, center, photographer, location, and keywords. The
//! card matching the selection's expanded record id renders open.
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time; color custom properties
//! are generated from `config.toml` and prepended.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Upstream text is escaped automatically.

use crate::config::{self, ViewerConfig};
use crate::display::{self, Card, POPULAR_KEYWORDS};
use crate::state::{FeedStatus, FeedView};
use crate::types::SearchResult;
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Render the view and write it to `path`, creating parent directories.
pub fn write_feed(
    path: &Path,
    view: &FeedView,
    config: &ViewerConfig,
) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let page = render_feed(view, config);
    fs::write(path, page.into_string())?;
    tracing::info!(path = %path.display(), generation = view.generation, "wrote feed");
    Ok(())
}

/// Full feed page for a view snapshot.
pub fn render_feed(view: &FeedView, config: &ViewerConfig) -> Markup {
    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    let content = html! {
        (site_header(&config.feed.title, &display::headline(&view.selection)))
        main.feed {
            @match &view.status {
                FeedStatus::Loading => {
                    p.feed-loading { "Loading NASA images..." }
                }
                FeedStatus::Failed(detail) => {
                    (render_failed(view, detail))
                }
                FeedStatus::Loaded(result) => {
                    @if result.is_empty() {
                        (render_empty(view))
                    } @else {
                        (render_results(view, result, config))
                    }
                }
            }
        }
        (render_suggestions(view.selection.active_keywords()))
    };

    let body_class = view.selection.is_searching().then_some("keyword-mode");
    base_document(&config.feed.title, &css, body_class, content)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn site_header(title: &str, headline: &str) -> Markup {
    html! {
        header.site-header {
            h1.site-title { (title) }
            p.headline { (headline) }
        }
    }
}

fn render_results(view: &FeedView, result: &SearchResult, config: &ViewerConfig) -> Markup {
    let cards = display::cards(result, &view.selection, &config.preview());
    html! {
        header.feed-summary {
            h2.hits { (display::hits_label(result.total_hits)) }
            p.caption { (display::results_caption(&view.selection)) }
        }
        ol.timeline {
            @for card in &cards {
                li.timeline-item { (render_card(card)) }
            }
        }
        @if let Some(notice) = display::partial_notice(result) {
            p.partial-notice { (notice) }
        }
    }
}

/// One record as a collapsible card.
fn render_card(card: &Card) -> Markup {
    html! {
        details.card open[card.expanded] data-id=(card.id) {
            summary.card-summary {
                img.card-thumb src=(card.thumbnail_url) alt=(card.title) loading="lazy";
                div.card-heading {
                    h3.card-title { (card.title) }
                    time.card-date { (card.date) }
                    p.card-excerpt { (card.short_description) }
                }
            }
            div.card-body {
                p.card-description { (card.description) }
                dl.card-facts {
                    dt { "Center" }
                    dd { (card.center) }
                    dt { "Photographer" }
                    dd { (card.photographer) }
                    dt { "Location" }
                    dd { (card.location) }
                    dt { "Keywords" }
                    dd { (card.keywords) }
                }
                a.card-source href=(card.source_url) target="_blank" rel="noopener" {
                    "View on NASA Image Library"
                }
            }
        }
    }
}

fn render_empty(view: &FeedView) -> Markup {
    html! {
        section.feed-empty {
            h2 { "No Images Found" }
            p { (display::empty_message(&view.selection)) }
        }
    }
}

fn render_failed(view: &FeedView, detail: &str) -> Markup {
    html! {
        section.feed-error role="alert" {
            h2 { "Something went wrong" }
            p { (display::failure_message(view)) }
            p.error-detail { (detail) }
            p.retry-hint { "Run the same command again to retry." }
        }
    }
}

/// Popular keyword chips; the active search is marked.
fn render_suggestions(active: Option<&str>) -> Markup {
    html! {
        aside.suggestions {
            h2 { "Popular searches" }
            ul.keyword-chips {
                @for keyword in POPULAR_KEYWORDS {
                    @let is_current = active.is_some_and(|a| a.eq_ignore_ascii_case(keyword));
                    li class=[is_current.then_some("current")] { (keyword) }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
