//! HTTP client configuration and the reqwest-backed transport.
//!
//! This module provides HTTP client tuning and the [`HttpTransport`] used to reach an
//! Octopus Deploy server. Requests are single exchanges: no retries, no caching.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, ClientBuilder, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::OctopusClientConfig;
use crate::transport::{RawResponse, Transport};
use crate::types::API_KEY_HEADER;
use crate::{Error, Result};

const USER_AGENT: &str = concat!("octopus-core/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds, used when neither the client configuration
/// nor [`ClientConfig::with_timeout`] sets one.
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// HTTP client configuration.
///
/// Configures HTTP client behavior including timeouts and connection pooling.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout. When set, it takes precedence over
    /// [`OctopusClientConfig::timeout`].
    pub timeout: Option<Duration>,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set request timeout, overriding the client configuration.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    config: OctopusClientConfig,
    http_config: ClientConfig,
}

impl HttpTransportBuilder {
    /// Create a new builder from an [`OctopusClientConfig`].
    #[must_use]
    pub fn new(config: OctopusClientConfig) -> Self {
        Self {
            config,
            http_config: ClientConfig::new(),
        }
    }

    /// Override the HTTP client configuration used when building the transport.
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Finalise the builder and create the [`HttpTransport`].
    pub fn build(self) -> Result<HttpTransport> {
        let base_url = self.config.api_base_url()?;

        let http_config = self.http_config;
        let timeout = http_config
            .timeout
            .unwrap_or_else(|| self.config.timeout());

        let mut api_key = HeaderValue::from_str(self.config.api_key.trim())
            .map_err(|err| Error::ConfigError(format!("Invalid API key header value: {err}")))?;
        api_key.set_sensitive(true);

        let api_key_header = HeaderName::from_bytes(API_KEY_HEADER.as_bytes())
            .map_err(|err| Error::ConfigError(format!("Invalid API key header name: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(api_key_header, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(http_config.connect_timeout)
            .pool_idle_timeout(http_config.pool_idle_timeout)
            .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
            .gzip(http_config.enable_compression);

        if !self.config.tls_verify {
            warn!("TLS verification disabled for Octopus transport");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &self.config.tls_ca_cert {
            debug!("loading Octopus CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read Octopus CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes).map_err(|err| {
                Error::ConfigError(format!("Invalid Octopus CA certificate: {err}"))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build Octopus HTTP client: {err}"))
        })?;

        info!(
            base_url = %base_url,
            timeout_secs = timeout.as_secs_f64(),
            "Octopus transport ready"
        );

        Ok(HttpTransport {
            http,
            base_url,
            timeout,
        })
    }
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Construct a transport directly from the configuration.
    pub fn from_config(config: &OctopusClientConfig) -> Result<Self> {
        HttpTransportBuilder::new(config.clone()).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: OctopusClientConfig) -> HttpTransportBuilder {
        HttpTransportBuilder::new(config)
    }

    /// Return the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request timeout the transport was built with.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid Octopus path `{path}`: {err}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn issue(&self, method: Method, path: &str, body: Option<Value>) -> RawResponse {
        let url = match self.build_url(path) {
            Ok(url) => url,
            Err(err) => return RawResponse::failed(err.to_string()),
        };

        debug!(method = %method, url = %url, "Sending Octopus request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(payload) = &body {
            request = request.json(payload);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(text) => RawResponse::new(status, text),
                    Err(err) => {
                        warn!(method = %method, path = %path, %status, "Failed to read Octopus response body: {err}");
                        RawResponse::new(status, String::new()).with_failure(err.to_string())
                    }
                }
            }
            Err(err) => {
                warn!(method = %method, path = %path, "Octopus request failed: {err}");
                RawResponse::failed(Error::from(err).to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_KEY: &str = "API-TESTKEY";

    fn transport(server: &MockServer, space: Option<&str>) -> HttpTransport {
        let mut config = OctopusClientConfig::new(server.uri(), API_KEY).unwrap();
        if let Some(space) = space {
            config = config.with_space(space);
        }
        HttpTransport::from_config(&config).unwrap()
    }

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new();
        assert_eq!(config.timeout, None);
        assert_eq!(config.connect_timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT));
        assert_eq!(config.pool_max_idle_per_host, DEFAULT_POOL_MAX_IDLE_PER_HOST);
        assert!(config.enable_compression);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_secs(60))
            .with_connect_timeout(Duration::from_secs(5))
            .with_pool_idle_timeout(Duration::from_secs(120))
            .with_pool_max_idle(20)
            .with_compression(false);

        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(120));
        assert_eq!(config.pool_max_idle_per_host, 20);
        assert!(!config.enable_compression);
    }

    #[tokio::test]
    async fn sends_api_key_and_composes_space_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/accounts/Accounts-1"))
            .and(header(API_KEY_HEADER, API_KEY))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"Id\":\"Accounts-1\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(&server, Some("Spaces-1"));
        let response = transport
            .issue(Method::GET, "accounts/Accounts-1", None)
            .await;

        assert_eq!(response.status, Some(StatusCode::OK));
        assert_eq!(response.body, "{\"Id\":\"Accounts-1\"}");
        assert!(response.failure.is_none());
    }

    #[tokio::test]
    async fn absolute_paths_resolve_against_server_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(&server, None);
        let response = transport
            .issue(Method::GET, "/api/Spaces-1/accounts?skip=30&take=30", None)
            .await;
        assert_eq!(response.status, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/environments/Environments-1"))
            .and(body_json(serde_json::json!({ "Name": "Production" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(&server, None);
        let response = transport
            .issue(
                Method::PUT,
                "environments/Environments-1",
                Some(serde_json::json!({ "Name": "Production" })),
            )
            .await;
        assert_eq!(response.status, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn connection_failure_is_reported_without_status() {
        let config = OctopusClientConfig::new("http://127.0.0.1:9", API_KEY)
            .unwrap()
            .with_timeout(2);
        let transport = HttpTransport::from_config(&config).unwrap();

        let response = transport.issue(Method::GET, "accounts", None).await;
        assert!(response.status.is_none());
        assert!(response.failure.is_some());
    }

    #[test]
    fn test_timeout_precedence() {
        let config = OctopusClientConfig::new("https://octopus.example.com", API_KEY)
            .unwrap()
            .with_timeout(45);

        let configured = HttpTransport::from_config(&config).unwrap();
        assert_eq!(configured.timeout(), Duration::from_secs(45));

        let overridden = HttpTransport::builder(config)
            .with_http_config(ClientConfig::new().with_timeout(Duration::from_secs(5)))
            .build()
            .unwrap();
        assert_eq!(overridden.timeout(), Duration::from_secs(5));

        let defaulted = HttpTransport::from_config(
            &OctopusClientConfig::new("https://octopus.example.com", API_KEY).unwrap(),
        )
        .unwrap();
        assert_eq!(defaulted.timeout(), Duration::from_secs(DEFAULT_TIMEOUT));
    }

    #[tokio::test]
    async fn http_config_timeout_applies_to_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/accounts"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = OctopusClientConfig::new(server.uri(), API_KEY)
            .unwrap()
            .with_timeout(60);
        let transport = HttpTransport::builder(config)
            .with_http_config(ClientConfig::new().with_timeout(Duration::from_millis(200)))
            .build()
            .unwrap();

        let response = transport.issue(Method::GET, "accounts", None).await;
        assert!(response.status.is_none());
        assert!(response.failure.is_some());
    }

    #[test]
    fn test_base_url() {
        let config = OctopusClientConfig::new("https://octopus.example.com", API_KEY)
            .unwrap()
            .with_space("Spaces-3");
        let transport = HttpTransport::builder(config)
            .with_http_config(ClientConfig::new().with_compression(false))
            .build()
            .unwrap();
        assert_eq!(
            transport.base_url().as_str(),
            "https://octopus.example.com/api/Spaces-3/"
        );
    }
}
