//! # Space Timeline
//!
//! Browse NASA's image archive as a timeline of "this day in space history".
//! A selected date (or a keyword search) becomes an ordered chain of queries
//! against the NASA Image and Video Library; the first query that returns
//! anything fills the feed, rendered to the terminal or an HTML page.
//!
//! # Architecture: Selection → Chain → Feed
//!
//! ```text
//! 1. Select    date / random / keywords  →  SelectionState   (state)
//! 2. Resolve   SelectionState            →  QueryChain       (query)
//! 3. Execute   QueryChain                →  SearchResult     (search, transport)
//! 4. Render    FeedView                  →  stdout / HTML    (output, generate)
//! ```
//!
//! Every selection change bumps a generation counter and hands out a
//! [`state::QueryTicket`]. Outcomes are applied only if their ticket is still
//! current, so a slow answer to an old query can never overwrite a newer one.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Records, query specs, and results shared by all layers |
//! | [`normalize`] | Upstream payload parsing; drops items without an `href` |
//! | [`transport`] | `Transport` trait, reqwest client, and the `Retrying` decorator |
//! | [`search`] | Executes a query chain with fallback and a short-lived response memo |
//! | [`query`] | Builds the query chain for a selection |
//! | [`state`] | Selection, date bounds, and the generation-tagged `Timeline` |
//! | [`display`] | Field defaults and text formatting shared by both renderers |
//! | [`output`] | Terminal feed formatting |
//! | [`generate`] | HTML feed rendering using Maud |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//!
//! # Design Decisions
//!
//! ## One Narrow Chain
//!
//! A date resolves to exactly two queries: the day's `MM-DD` within its year,
//! then the whole year. Fallback happens only when upstream returns zero
//! items. Errors never fall back; they fail the whole chain so a network
//! outage is not mistaken for an empty day.
//!
//! ## Retry as a Decorator
//!
//! Retries live in [`transport::Retrying`], which wraps any
//! [`transport::Transport`]. The executor never knows whether it is talking to
//! the real client, a retrying one, or a test script.

pub mod config;
pub mod display;
pub mod generate;
pub mod normalize;
pub mod output;
pub mod query;
pub mod search;
pub mod state;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
