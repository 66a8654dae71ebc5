//! Generic CRUD engine.
//!
//! Every call is one exchange through the [`Transport`], followed by [`classify`].
//! The engine holds no per-call state and can be shared across tasks.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::resource::{ErrorEnvelope, PagedCollection};
use crate::transport::{RawResponse, Transport};

/// Classify a response against the status the operation expects.
///
/// First match wins: a non-empty error list, a transport failure, 404, a status
/// mismatch. On success the raw body is returned for decoding.
///
/// # Errors
///
/// Returns [`Error::ApiError`], [`Error::TransportError`], [`Error::ItemNotFound`] or
/// [`Error::UnexpectedStatus`], in that order of precedence.
pub fn classify<'r>(response: &'r RawResponse, path: &str, expected: StatusCode) -> Result<&'r str> {
    if let Some(envelope) = ErrorEnvelope::from_body(&response.body) {
        return Err(Error::ApiError {
            message: envelope.error_message.unwrap_or_default(),
            errors: envelope.errors.unwrap_or_default(),
            full_exception: envelope.full_exception.unwrap_or_default(),
        });
    }

    let status = match (&response.failure, response.status) {
        (Some(failure), _) => return Err(Error::TransportError(failure.clone())),
        (None, None) => {
            return Err(Error::TransportError(format!(
                "no response received from `{path}`"
            )))
        }
        (None, Some(status)) => status,
    };

    if status == StatusCode::NOT_FOUND {
        return Err(Error::ItemNotFound(path.to_string()));
    }

    if status != expected {
        return Err(Error::UnexpectedStatus {
            actual: status.as_u16(),
            expected: expected.as_u16(),
            path: path.to_string(),
        });
    }

    Ok(&response.body)
}

/// Decode a classified body. An empty body decodes as JSON `null`.
///
/// # Errors
///
/// Returns [`Error::TransportError`] when the body does not fit the target shape.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}

/// Performs get/add/post/update/delete against the API.
#[derive(Clone)]
pub struct Engine {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine over a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// GET a resource, expecting 200.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.exchange(Method::GET, path, None, StatusCode::OK).await?;
        decode_body(&body)
    }

    /// GET one page of a collection, expecting 200.
    pub async fn get_page(&self, path: &str) -> Result<PagedCollection<Value>> {
        self.get(path).await
    }

    /// POST a new resource, expecting 201.
    pub async fn add(&self, path: &str, body: Value) -> Result<Value> {
        let body = self
            .exchange(Method::POST, path, Some(body), StatusCode::CREATED)
            .await?;
        decode_body(&body)
    }

    /// POST a side-effecting action, expecting 200.
    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let body = self
            .exchange(Method::POST, path, Some(body), StatusCode::OK)
            .await?;
        decode_body(&body)
    }

    /// PUT an existing resource, expecting 200.
    pub async fn update(&self, path: &str, body: Value) -> Result<Value> {
        let body = self
            .exchange(Method::PUT, path, Some(body), StatusCode::OK)
            .await?;
        decode_body(&body)
    }

    /// DELETE a resource, expecting 200. The body is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.exchange(Method::DELETE, path, None, StatusCode::OK)
            .await
            .map(drop)
    }

    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Result<String> {
        debug!(method = %method, path = %path, "Issuing Octopus request");
        let response = self.transport.issue(method, path, body).await;
        classify(&response, path, expected).map(str::to_owned)
    }
}
