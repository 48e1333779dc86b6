//! Query chain construction.
//!
//! Turns the current [`SelectionState`] into an ordered list of upstream
//! queries, most specific first. The [`SearchExecutor`](crate::search::SearchExecutor)
//! walks the chain until a query returns items.
//!
//! ## Date browsing
//!
//! For `selected_date = 1969-07-20`:
//!
//! ```text
//! 1. year_start=1969 year_end=1969 keywords=07-20   (same day, that year)
//! 2. year_start=1969 year_end=1969                  (anything from that year)
//! ```
//!
//! The `MM-DD` keyword matches records whose text mentions the day, which is
//! how the archive tends to caption dated events. When nothing matches, the
//! year-only query keeps the feed from going blank.
//!
//! This narrow chain is the only one built; there is no ±5 year window. The
//! same date always issues the same queries.
//!
//! ## Keyword search
//!
//! Explicit keywords produce a single query with no year bias.

use crate::state::SelectionState;
use crate::types::SearchQuerySpec;
use chrono::Datelike;

/// Ordered, non-empty list of queries to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryChain {
    specs: Vec<SearchQuerySpec>,
}

impl QueryChain {
    pub fn specs(&self) -> &[SearchQuerySpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Always false: a chain holds at least one spec.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The most specific query in the chain.
    pub fn primary(&self) -> &SearchQuerySpec {
        &self.specs[0]
    }
}

/// Build the query chain for the given selection.
///
/// Pure: the same state and media type always produce the same chain.
pub fn build_query_chain(state: &SelectionState, media_type: &str) -> QueryChain {
    if let Some(keywords) = state.active_keywords() {
        return QueryChain {
            specs: vec![SearchQuerySpec::keywords(keywords, media_type)],
        };
    }

    let date = state.selected_date();
    let year = date.year();
    let day_token = format!("{:02}-{:02}", date.month(), date.day());

    QueryChain {
        specs: vec![
            SearchQuerySpec::year(year, Some(day_token), media_type),
            SearchQuerySpec::year(year, None, media_type),
        ],
    }
}
