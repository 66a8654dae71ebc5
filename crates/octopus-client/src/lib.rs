//! Aggregate client for the Octopus Deploy REST API.
//!
//! [`OctopusClient`] builds one transport from an
//! [`OctopusClientConfig`](octopus_core::OctopusClientConfig) and hands the same
//! engine to every resource service.
//!
//! ```no_run
//! # async fn run() -> octopus_core::Result<()> {
//! use octopus_client::OctopusClient;
//! use octopus_core::OctopusClientConfig;
//!
//! let config = OctopusClientConfig::new("https://octopus.example.com", "API-XXXXXXXX")?
//!     .with_space("Spaces-1");
//! let client = OctopusClient::from_config(config)?;
//! for environment in client.environments().get_all().await? {
//!     println!("{}", environment.name);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;

pub use client::{OctopusClient, OctopusClientBuilder};

pub use octopus_accounts as accounts;
pub use octopus_certificates as certificates;
pub use octopus_core as core;
pub use octopus_environments as environments;
pub use octopus_machines as machines;

/// Convenient result alias that reuses the shared Octopus error type.
pub type Result<T> = octopus_core::Result<T>;
