//! Selection state and generation-tagged query resolution.
//!
//! [`SelectionState`] is what the user has picked: a date, optionally a
//! keyword search on top of it, and which card is expanded. [`Timeline`]
//! owns one selection behind a mutex together with the feed it currently
//! shows.
//!
//! ## Generations
//!
//! Every mutation bumps a counter and hands back a [`QueryTicket`] carrying
//! that generation and the freshly built chain. The caller executes the
//! chain outside the lock and reports back with [`Timeline::apply`]. An
//! outcome whose ticket is no longer current is dropped, so a slow answer for
//! an old date can never overwrite the feed for the new one:
//!
//! ```text
//! set_date(1969-07-20)  -> ticket g1        ┐
//! set_date(1986-01-28)  -> ticket g2        │ g1 still in flight
//! apply(g2, ..)         -> Outcome::Applied │
//! apply(g1, ..)         -> Outcome::Stale   ┘ discarded
//! ```
//!
//! In-flight requests are not cancelled; their results are just ignored.
//!
//! ## Date bounds
//!
//! Dates are kept within `[1958-01-01, today]`. Input surfaces reject values
//! outside that range; the state clamps anything that slips through.

use crate::query::{QueryChain, build_query_chain};
use crate::search::{SearchError, SearchExecutor};
use crate::transport::Transport;
use crate::types::{DEFAULT_MEDIA_TYPE, SearchResult};
use chrono::{Datelike, Local, NaiveDate};
use rand::Rng;
use std::sync::{Mutex, MutexGuard};

/// First year covered by the archive.
pub const EARLIEST_YEAR: i32 = 1958;

/// Inclusive range of selectable dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DateBounds {
    /// `[1958-01-01, latest]`.
    pub fn until(latest: NaiveDate) -> Self {
        let earliest = NaiveDate::from_ymd_opt(EARLIEST_YEAR, 1, 1).unwrap_or(NaiveDate::MIN);
        Self {
            earliest,
            latest: latest.max(earliest),
        }
    }

    /// Bounds ending at today's local date.
    pub fn today() -> Self {
        Self::until(Local::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.earliest..=self.latest).contains(&date)
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.earliest, self.latest)
    }
}

/// Pick a random date inside `bounds`.
///
/// Year is uniform over the bounded years; day is capped at 28 so every month
/// is valid. The result is clamped, so the current year never yields a date
/// in the future.
pub fn random_date<R: Rng>(rng: &mut R, bounds: &DateBounds) -> NaiveDate {
    let year = rng.gen_range(bounds.earliest.year()..=bounds.latest.year());
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(bounds.latest);
    bounds.clamp(date)
}

/// What the user currently has selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    selected_date: NaiveDate,
    active_keywords: Option<String>,
    expanded_record_id: Option<String>,
}

impl SelectionState {
    pub fn new(date: NaiveDate, bounds: &DateBounds) -> Self {
        Self {
            selected_date: bounds.clamp(date),
            active_keywords: None,
            expanded_record_id: None,
        }
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn active_keywords(&self) -> Option<&str> {
        self.active_keywords.as_deref()
    }

    pub fn expanded_record_id(&self) -> Option<&str> {
        self.expanded_record_id.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.active_keywords.is_some()
    }

    /// Switch to date browsing on `date`. Clears any keyword search.
    pub fn set_date(&mut self, date: NaiveDate, bounds: &DateBounds) {
        self.selected_date = bounds.clamp(date);
        self.active_keywords = None;
        self.expanded_record_id = None;
    }

    /// Start a keyword search. Blank input is ignored and returns false.
    ///
    /// The selected date is kept so clearing the search resumes browsing
    /// where the user left off.
    pub fn set_keywords(&mut self, keywords: &str) -> bool {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return false;
        }
        self.active_keywords = Some(keywords.to_string());
        self.expanded_record_id = None;
        true
    }

    pub fn clear_keywords(&mut self) {
        self.active_keywords = None;
        self.expanded_record_id = None;
    }

    /// Expand `id`, or collapse it if it is already the expanded card.
    pub fn toggle_expanded(&mut self, id: &str) {
        if self.expanded_record_id.as_deref() == Some(id) {
            self.expanded_record_id = None;
        } else {
            self.expanded_record_id = Some(id.to_string());
        }
    }
}

/// Handle for one query resolution, tagged with the generation that spawned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub generation: u64,
    pub chain: QueryChain,
}

/// What the feed is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    Loaded(SearchResult),
    /// Upstream failure; the user can retry.
    Failed(String),
}

/// Snapshot of the selection together with its feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    pub selection: SelectionState,
    pub generation: u64,
    pub status: FeedStatus,
}

impl FeedView {
    /// Loaded with zero items: the "no images found" view.
    pub fn is_empty(&self) -> bool {
        matches!(&self.status, FeedStatus::Loaded(result) if result.is_empty())
    }
}

/// Whether an outcome reached the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A newer mutation superseded the ticket; outcome discarded.
    Stale,
}

struct Inner {
    selection: SelectionState,
    generation: u64,
    status: FeedStatus,
}

/// Owns the selection and its feed; the single writer for both.
pub struct Timeline {
    bounds: DateBounds,
    media_type: String,
    inner: Mutex<Inner>,
}

impl Timeline {
    /// Session starting on the latest selectable date (today).
    pub fn new(bounds: DateBounds) -> Self {
        Self::starting_on(bounds.latest, bounds)
    }

    pub fn starting_on(date: NaiveDate, bounds: DateBounds) -> Self {
        Self {
            bounds,
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            inner: Mutex::new(Inner {
                selection: SelectionState::new(date, &bounds),
                generation: 0,
                status: FeedStatus::Loading,
            }),
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn bounds(&self) -> DateBounds {
        self.bounds
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded data stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bump the generation and build the ticket for the current selection.
    fn issue(&self, inner: &mut Inner) -> QueryTicket {
        inner.generation += 1;
        inner.status = FeedStatus::Loading;
        QueryTicket {
            generation: inner.generation,
            chain: build_query_chain(&inner.selection, &self.media_type),
        }
    }

    /// Ticket for the initial load.
    pub fn start(&self) -> QueryTicket {
        let mut inner = self.lock();
        self.issue(&mut inner)
    }

    pub fn set_date(&self, date: NaiveDate) -> QueryTicket {
        let mut inner = self.lock();
        inner.selection.set_date(date, &self.bounds);
        self.issue(&mut inner)
    }

    pub fn set_random_date<R: Rng>(&self, rng: &mut R) -> QueryTicket {
        let date = random_date(rng, &self.bounds);
        self.set_date(date)
    }

    /// `None` when the keywords are blank; nothing changes in that case.
    pub fn set_keywords(&self, keywords: &str) -> Option<QueryTicket> {
        let mut inner = self.lock();
        if !inner.selection.set_keywords(keywords) {
            return None;
        }
        Some(self.issue(&mut inner))
    }

    pub fn clear_keywords(&self) -> QueryTicket {
        let mut inner = self.lock();
        inner.selection.clear_keywords();
        self.issue(&mut inner)
    }

    /// Re-run the current selection under a new generation.
    ///
    /// For callers that keep a `Timeline` alive across failures. The CLI
    /// builds a fresh one per invocation, so there a retry is a second run.
    pub fn retry(&self) -> QueryTicket {
        let mut inner = self.lock();
        self.issue(&mut inner)
    }

    /// Expand or collapse a card. Does not touch the query.
    pub fn toggle_expanded(&self, id: &str) {
        self.lock().selection.toggle_expanded(id);
    }

    /// Install an outcome if its ticket is still current.
    pub fn apply(
        &self,
        ticket: &QueryTicket,
        result: Result<SearchResult, SearchError>,
    ) -> Outcome {
        let mut inner = self.lock();
        if ticket.generation != inner.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = inner.generation,
                "discarding stale result"
            );
            return Outcome::Stale;
        }
        inner.status = match result {
            Ok(result) => FeedStatus::Loaded(result),
            Err(err) => {
                tracing::warn!("search failed: {err}");
                FeedStatus::Failed(err.to_string())
            }
        };
        Outcome::Applied
    }

    /// Execute the ticket's chain (without holding the lock) and apply it.
    pub fn refresh<T: Transport>(
        &self,
        executor: &SearchExecutor<T>,
        ticket: &QueryTicket,
    ) -> Outcome {
        let result = executor.execute_chain(&ticket.chain);
        self.apply(ticket, result)
    }

    pub fn view(&self) -> FeedView {
        let inner = self.lock();
        FeedView {
            selection: inner.selection.clone(),
            generation: inner.generation,
            status: inner.status.clone(),
        }
    }

    pub fn selection(&self) -> SelectionState {
        self.lock().selection.clone()
    }
}
