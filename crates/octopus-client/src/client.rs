//! Aggregate client wiring every resource service to one engine.

use crate::Result;
use octopus_accounts::AccountService;
use octopus_certificates::CertificateService;
use octopus_core::{ClientConfig, Engine, HttpTransport, OctopusClientConfig, Transport};
use octopus_environments::EnvironmentService;
use octopus_machines::MachineService;
use std::sync::Arc;
use tracing::debug;

/// Builder for [`OctopusClient`].
#[derive(Clone)]
pub struct OctopusClientBuilder {
    config: OctopusClientConfig,
    http_config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl std::fmt::Debug for OctopusClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctopusClientBuilder")
            .field("config", &self.config)
            .field("http_config", &self.http_config)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl OctopusClientBuilder {
    /// Create a builder from a validated configuration.
    #[must_use]
    pub fn new(config: OctopusClientConfig) -> Self {
        Self {
            config,
            http_config: ClientConfig::new(),
            transport: None,
        }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Use `transport` instead of building an [`HttpTransport`].
    ///
    /// The HTTP configuration and TLS settings are ignored in that case.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`octopus_core::Error::ConfigError`] when the HTTP transport cannot be
    /// built.
    pub fn build(self) -> Result<OctopusClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::builder(self.config.clone())
                    .with_http_config(self.http_config)
                    .build()?,
            ),
        };
        let engine = Engine::new(transport);

        debug!(space = self.config.space.as_deref().unwrap_or("default"), "Octopus client ready");

        Ok(OctopusClient {
            accounts: AccountService::new(engine.clone())?,
            certificates: CertificateService::new(engine.clone())?,
            environments: EnvironmentService::new(engine.clone())?,
            machines: MachineService::new(engine.clone())?,
            engine,
            config: self.config,
        })
    }
}

/// Entry point to every Octopus resource service.
#[derive(Debug, Clone)]
pub struct OctopusClient {
    config: OctopusClientConfig,
    engine: Engine,
    accounts: AccountService,
    certificates: CertificateService,
    environments: EnvironmentService,
    machines: MachineService,
}

impl OctopusClient {
    /// Connect to `url` with `api_key` in the default space.
    ///
    /// # Errors
    ///
    /// [`octopus_core::Error::InvalidParameter`] for a blank URL or API key, otherwise
    /// any configuration error.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(OctopusClientConfig::new(url, api_key)?)
    }

    /// Build a client with default HTTP settings.
    pub fn from_config(config: OctopusClientConfig) -> Result<Self> {
        OctopusClientBuilder::new(config).build()
    }

    /// Start a builder.
    #[must_use]
    pub fn builder(config: OctopusClientConfig) -> OctopusClientBuilder {
        OctopusClientBuilder::new(config)
    }

    /// Configuration the client was built from.
    #[must_use]
    pub const fn config(&self) -> &OctopusClientConfig {
        &self.config
    }

    /// Shared engine, for resources without a dedicated service.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Accounts.
    #[must_use]
    pub const fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    /// Certificates.
    #[must_use]
    pub const fn certificates(&self) -> &CertificateService {
        &self.certificates
    }

    /// Environments.
    #[must_use]
    pub const fn environments(&self) -> &EnvironmentService {
        &self.environments
    }

    /// Deployment targets.
    #[must_use]
    pub const fn machines(&self) -> &MachineService {
        &self.machines
    }
}
