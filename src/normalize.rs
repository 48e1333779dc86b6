//! Upstream payload parsing and record normalization.
//!
//! The search endpoint answers with:
//!
//! ```text
//! { "collection": { "items": [ { "href", "data": [..], "links": [..] } ],
//!                   "metadata": { "total_hits": N } } }
//! ```
//!
//! Only the envelope is decoded strictly. Items stay as raw JSON until
//! [`normalize`] looks at them one by one, so an oddly shaped record never
//! takes the rest of the page down with it.
//!
//! Normalization is lossless: `data` and `links` are copied as sent, absent
//! arrays become empty, and nothing else is rewritten. A metadata block or
//! link that does not decode is skipped with a warning; the record keeps the
//! entries that do. Display defaults ("Untitled Image" and friends) belong to
//! [`crate::display`].
//!
//! The only hard requirement is a string `href`. A record without one cannot
//! be identified or linked, so [`normalize`] rejects it with
//! [`MalformedRecord`] and [`normalize_items`] drops it from the feed.

use crate::types::ImageRecord;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Record missing its required `href` identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record has no string href")]
pub struct MalformedRecord;

/// Top-level response body.
#[derive(Debug, Deserialize)]
pub struct RawResponse {
    pub collection: RawCollection,
}

#[derive(Debug, Deserialize)]
pub struct RawCollection {
    /// Undecoded items; see [`normalize`].
    pub items: Vec<Value>,
    #[serde(default)]
    pub metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub total_hits: u64,
}

/// Parse a response body into its raw collection.
pub fn parse_response(body: &str) -> Result<RawCollection, serde_json::Error> {
    let response: RawResponse = serde_json::from_str(body)?;
    Ok(response.collection)
}

/// Map one raw item into an [`ImageRecord`].
pub fn normalize(raw: &Value) -> Result<ImageRecord, MalformedRecord> {
    let source_id = raw
        .get("href")
        .and_then(Value::as_str)
        .ok_or(MalformedRecord)?
        .to_string();
    Ok(ImageRecord {
        fields: decode_each(raw.get("data"), "metadata block", &source_id),
        render_links: decode_each(raw.get("links"), "render link", &source_id),
        source_id,
    })
}

/// Decode every element of an optional array, skipping the ones that fail.
fn decode_each<T: DeserializeOwned>(value: Option<&Value>, what: &str, record: &str) -> Vec<T> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match T::deserialize(entry) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::warn!(record, "skipping {what}: {err}");
                None
            }
        })
        .collect()
}

/// Normalize a page of items, dropping (and logging) malformed ones.
pub fn normalize_items(items: Vec<Value>) -> Vec<ImageRecord> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match normalize(raw) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(index, "dropping upstream record: {err}");
                None
            }
        })
        .collect()
}
