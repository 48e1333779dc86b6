//! HTTP transport: one GET, and a retry decorator around it.
//!
//! [`Transport`] is the seam between the search logic and the network. The
//! production implementation is [`HttpTransport`] (blocking reqwest); tests
//! use a scripted mock from `test_helpers`.
//!
//! Retries live here and only here. [`Retrying`] wraps any transport and
//! re-issues a request after a fixed backoff when the failure looks
//! transient (network error, 5xx, 429). It knows nothing about query chains:
//! chain fallback reacts to *zero results*, which is a successful response.

use reqwest::Url;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },
}

impl TransportError {
    /// Failures worth retrying: network trouble, server errors, throttling.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Network { .. } => true,
            TransportError::Status { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

/// A single blocking GET returning the response body.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<String, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        (**self).get(url)
    }
}

/// Blocking reqwest transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("space-timeline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        let network = |e: reqwest::Error| TransportError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        tracing::debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.text().map_err(network)
    }
}

/// Fixed retry budget with fixed backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }
}

/// Decorator that retries transient failures of the wrapped transport.
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for Retrying<T> {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        let mut attempt = 1;
        loop {
            match self.inner.get(url) {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() && attempt < self.policy.attempts() => {
                    tracing::warn!(
                        attempt,
                        max = self.policy.attempts(),
                        "transient upstream failure, retrying: {err}"
                    );
                    if !self.policy.backoff.is_zero() {
                        thread::sleep(self.policy.backoff);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
