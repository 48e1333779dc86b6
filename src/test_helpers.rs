//! Shared test utilities for the space-timeline test suite.
//!
//! Provides a scripted [`Transport`] that replays canned responses and
//! records every requested URL, plus builders for upstream payloads.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mock = ScriptedTransport::new(vec![
//!     Ok(empty_collection()),
//!     Ok(collection(&[item("https://x/1", "Eagle")], 1)),
//! ]);
//! let executor = SearchExecutor::new(&mock, base_url());
//! let result = executor.execute_chain(&chain).unwrap();
//! assert_eq!(mock.request_count(), 2);
//! assert_eq!(request_param(&mock, 1, "keywords"), None);
//! ```

use reqwest::Url;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::transport::{Transport, TransportError};

// =========================================================================
// Scripted transport
// =========================================================================

/// Mock transport that replays responses in order and records requests.
/// Uses Mutex (not RefCell) so it is Sync like the real client.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<String, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Transport that answers every request with the same body.
    pub fn repeating(body: String, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(body.clone())).collect())
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(url.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Network {
                    url: url.to_string(),
                    message: "script exhausted".to_string(),
                })
            })
    }
}

/// Value of one query parameter on the `n`th recorded request.
pub fn request_param(mock: &ScriptedTransport, n: usize, key: &str) -> Option<String> {
    let requests = mock.requests();
    let url = requests.get(n).unwrap_or_else(|| {
        panic!("request #{n} not found. {} requests recorded", requests.len())
    });
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

// =========================================================================
// Payload builders
// =========================================================================

pub fn base_url() -> Url {
    Url::parse("https://images-api.nasa.gov").unwrap()
}

pub fn server_error(status: u16) -> Result<String, TransportError> {
    Err(TransportError::Status {
        status,
        url: "https://images-api.nasa.gov/search".to_string(),
    })
}

/// A minimal upstream item with a title and an image preview link.
pub fn item(href: &str, title: &str) -> Value {
    json!({
        "href": href,
        "data": [{ "title": title, "date_created": "1969-07-20T00:00:00Z" }],
        "links": [{ "href": format!("{href}/thumb.jpg"), "rel": "preview", "render": "image" }]
    })
}

/// Serialized upstream response body.
pub fn collection(items: &[Value], total_hits: u64) -> String {
    json!({
        "collection": {
            "items": items,
            "metadata": { "total_hits": total_hits }
        }
    })
    .to_string()
}

pub fn empty_collection() -> String {
    collection(&[], 0)
}
