//! Transport adapter contract.
//!
//! The engine never talks to HTTP directly: it hands a method, a path relative to the
//! API base URL, and an optional JSON body to a [`Transport`], and receives the status,
//! the raw body, and any transport-level failure in one [`RawResponse`].

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Outcome of one request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Status code, absent when no response arrived.
    pub status: Option<StatusCode>,
    /// Raw response body (possibly empty).
    pub body: String,
    /// Transport-level failure, if any.
    pub failure: Option<String>,
}

impl RawResponse {
    /// A completed exchange.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: body.into(),
            failure: None,
        }
    }

    /// An exchange that never produced a response.
    #[must_use]
    pub fn failed(failure: impl Into<String>) -> Self {
        Self {
            status: None,
            body: String::new(),
            failure: Some(failure.into()),
        }
    }

    /// Record a failure that happened after the status arrived.
    #[must_use]
    pub fn with_failure(mut self, failure: impl Into<String>) -> Self {
        self.failure = Some(failure.into());
        self
    }
}

/// Issues requests against the Octopus API.
///
/// Implementations own timeouts, TLS, authentication headers and base-path composition.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request. `path` is relative to the API base URL unless it starts with `/`.
    async fn issue(&self, method: Method, path: &str, body: Option<Value>) -> RawResponse;
}
