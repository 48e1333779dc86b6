//! Shared types passed between the query, search, and rendering layers.
//!
//! [`ImageRecord`] and its parts mirror the upstream item shape field for
//! field, so a normalized record can be serialized back out (`--json`)
//! without losing anything the API sent.

use serde::{Deserialize, Deserializer, Serialize};

/// Media type requested when the caller does not ask for another one.
pub const DEFAULT_MEDIA_TYPE: &str = "image";

/// One metadata block attached to an upstream record.
///
/// Every field is optional. Only the first block of a record is displayed;
/// defaults for missing fields are applied by [`crate::display`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nasa_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Accessibility description, used when `description` is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_508: Option<String>,
    /// ISO 8601 timestamp as sent upstream, e.g. `1969-07-20T00:00:00Z`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    /// Some records send a single delimited string instead of a list.
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_creator: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub album: Vec<String>,
}

/// Accept `["a", "b"]`, `"a; b"`, `"a, b"`, or `null`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(list)) => list,
        Some(OneOrMany::One(joined)) => joined
            .split([';', ','])
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// Alternate asset link for a record (thumbnails, previews).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderLink {
    pub href: String,
    #[serde(default)]
    pub rel: String,
    /// `"image"` for links that can be shown directly as a thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<String>,
}

impl RenderLink {
    pub fn is_image(&self) -> bool {
        self.render.as_deref() == Some("image")
    }
}

/// A normalized search result record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Upstream `href`: the record's canonical asset-manifest link.
    pub source_id: String,
    pub fields: Vec<Metadata>,
    pub render_links: Vec<RenderLink>,
}

impl ImageRecord {
    /// The metadata block used for display, if upstream sent one.
    pub fn primary(&self) -> Option<&Metadata> {
        self.fields.first()
    }
}

/// One candidate query sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuerySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_start: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_end: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub media_type: String,
}

impl SearchQuerySpec {
    /// Keyword-only spec with no year bias.
    pub fn keywords(keywords: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            year_start: None,
            year_end: None,
            keywords: Some(keywords.into()),
            media_type: media_type.into(),
        }
    }

    /// Spec bounded to a single year, optionally narrowed by keywords.
    pub fn year(year: i32, keywords: Option<String>, media_type: impl Into<String>) -> Self {
        Self {
            year_start: Some(year),
            year_end: Some(year),
            keywords,
            media_type: media_type.into(),
        }
    }

    /// True when the spec carries neither a year bound nor keywords.
    ///
    /// Such a spec would ask upstream for "everything" and is never issued.
    pub fn is_empty(&self) -> bool {
        self.year_start.is_none()
            && self.year_end.is_none()
            && self.keywords.as_deref().is_none_or(|k| k.trim().is_empty())
    }

    /// Query parameters in wire order, omitting unset values.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(start) = self.year_start {
            pairs.push(("year_start", start.to_string()));
        }
        if let Some(end) = self.year_end {
            pairs.push(("year_end", end.to_string()));
        }
        if let Some(keywords) = &self.keywords {
            pairs.push(("keywords", keywords.clone()));
        }
        pairs.push(("media_type", self.media_type.clone()));
        pairs
    }
}

/// Consolidated outcome of one query chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<ImageRecord>,
    pub total_hits: u64,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Upstream reports more hits than the single page we fetched.
    pub fn is_partial(&self) -> bool {
        self.total_hits > self.items.len() as u64
    }
}
