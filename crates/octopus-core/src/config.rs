//! Configuration structures for Octopus clients.
//!
//! This module provides the connection configuration for an Octopus Deploy server:
//! server URL, API key, optional space, TLS and timeout settings, with validation.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Configuration for an Octopus client instance.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct OctopusClientConfig {
    /// Octopus server root URL (e.g. `https://octopus.example.com`)
    #[validate(url)]
    pub url: String,

    /// API key sent in the `X-Octopus-ApiKey` header
    #[serde(default, skip_serializing)]
    #[validate(length(min = 1))]
    pub api_key: String,

    /// Optional space; requests are scoped to `<root>/api/<space>/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to custom CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    crate::client::DEFAULT_TIMEOUT
}

impl OctopusClientConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Arguments
    ///
    /// * `url` - The Octopus server root URL (e.g. "https://octopus.example.com")
    /// * `api_key` - An API key (`API-...`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a blank URL or API key, and
    /// [`Error::ConfigError`] if validation fails.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, Error> {
        let url = url.into();
        let api_key = api_key.into();

        if url.trim().is_empty() {
            return Err(Error::invalid_parameter("NewClient", "url"));
        }
        if api_key.trim().is_empty() {
            return Err(Error::invalid_parameter("NewClient", "apiKey"));
        }

        let config = Self {
            url,
            api_key,
            space: None,
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            request_timeout_secs: default_request_timeout_secs(),
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Scope requests to a space.
    #[must_use]
    pub fn with_space(mut self, space: impl Into<String>) -> Self {
        let space = space.into();
        self.space = (!space.trim().is_empty()).then_some(space);
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: std::path::PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Compose the API base URL: `<root>/api/` or `<root>/api/<space>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn api_base_url(&self) -> Result<Url, Error> {
        let root = self.url.trim().trim_end_matches('/');
        let base = match self.space.as_deref().map(str::trim) {
            Some(space) if !space.is_empty() => format!("{root}/api/{space}/"),
            _ => format!("{root}/api/"),
        };
        Url::parse(&base).map_err(|e| Error::ConfigError(format!("Invalid Octopus URL: {e}")))
    }
}

impl fmt::Debug for OctopusClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OctopusClientConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("space", &self.space)
            .field("tls_verify", &self.tls_verify)
            .field("tls_ca_cert", &self.tls_ca_cert)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
