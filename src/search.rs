//! Query chain execution against the image search endpoint.
//!
//! ## Fallback rule
//!
//! Specs are tried in chain order. The executor moves to the next spec only
//! when the current one came back with **zero** items; any non-empty answer,
//! however sparse, ends the chain. If every spec is empty the last (empty)
//! result is returned as a normal outcome.
//!
//! Items are counted after normalization. A page whose every record was
//! dropped as malformed has nothing to show, so it falls back like an empty
//! page; its `total_hits` is not carried over.
//!
//! A failed request is different: transport errors (after the transport's own
//! retries) and unparseable payloads abort the whole chain.
//!
//! ## Memoization
//!
//! With [`SearchExecutor::with_cache`] identical request URLs are answered
//! from memory for a short staleness window. Only successful responses are
//! remembered. The cache is in-process and per-executor; nothing is persisted.

use crate::normalize::{normalize_items, parse_response};
use crate::query::QueryChain;
use crate::transport::{Transport, TransportError};
use crate::types::{SearchQuerySpec, SearchResult};
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Public endpoint of the NASA Image and Video Library.
///
/// Override at build time with `SPACE_TIMELINE_API_BASE`, or at run time with
/// `api.base_url` in `config.toml`.
pub const DEFAULT_API_BASE: &str = match option_env!("SPACE_TIMELINE_API_BASE") {
    Some(base) => base,
    None => "https://images-api.nasa.gov",
};

/// Upstream failure: the request could not be completed or understood.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Upstream request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("Malformed upstream payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Refusing to issue a query with neither years nor keywords")]
    EmptyQuery,
}

struct CachedResult {
    stored_at: Instant,
    result: SearchResult,
}

struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedResult>>,
}

impl ResultCache {
    fn get(&self, key: &str) -> Option<SearchResult> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.result.clone())
    }

    fn put(&self, key: String, result: &SearchResult) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
            entries.insert(
                key,
                CachedResult {
                    stored_at: Instant::now(),
                    result: result.clone(),
                },
            );
        }
    }
}

/// Runs query specs and chains against one upstream base URL.
pub struct SearchExecutor<T> {
    transport: T,
    endpoint: Url,
    cache: Option<ResultCache>,
}

impl<T: Transport> SearchExecutor<T> {
    /// Executor for `<base>/search`.
    pub fn new(transport: T, base: Url) -> Self {
        Self {
            transport,
            endpoint: search_endpoint(base),
            cache: None,
        }
    }

    /// Remember successful responses for `ttl`. A zero ttl disables the cache.
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = (!ttl.is_zero()).then(|| ResultCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        });
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL for one spec.
    pub fn search_url(&self, spec: &SearchQuerySpec) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(spec.query_pairs());
        url
    }

    /// Issue a single spec.
    pub fn execute_spec(&self, spec: &SearchQuerySpec) -> Result<SearchResult, SearchError> {
        if spec.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let url = self.search_url(spec);
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(url.as_str())) {
            tracing::debug!(%url, "answered from cache");
            return Ok(hit);
        }

        let body = self.transport.get(&url)?;
        let collection = parse_response(&body)?;
        let result = SearchResult {
            total_hits: collection.metadata.total_hits,
            items: normalize_items(collection.items),
        };

        if let Some(cache) = &self.cache {
            cache.put(url.to_string(), &result);
        }
        Ok(result)
    }

    /// Walk the chain until a spec returns items.
    pub fn execute_chain(&self, chain: &QueryChain) -> Result<SearchResult, SearchError> {
        let mut last = SearchResult::default();
        for (step, spec) in chain.specs().iter().enumerate() {
            last = self.execute_spec(spec)?;
            if !last.items.is_empty() {
                tracing::debug!(step, items = last.items.len(), "chain resolved");
                return Ok(last);
            }
            if step + 1 < chain.len() {
                tracing::info!(step, "no results, falling back to a broader query");
            }
        }
        Ok(last)
    }
}

/// Append the `search` path segment to a base URL.
fn search_endpoint(mut base: Url) -> Url {
    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop_if_empty().push("search");
    }
    base.set_query(None);
    base
}
