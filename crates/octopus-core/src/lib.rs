//! # octopus-core
//!
//! Core types and utilities for working with the Octopus Deploy REST API.
//!
//! This crate provides the resource-access engine shared by every resource crate:
//! error handling, configuration, the HTTP transport, path resolution, pagination,
//! response classification and the polymorphic entity registry.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and result alias
//! - [`config`] - Connection configuration for Octopus clients
//! - [`client`] - HTTP client tuning and the reqwest transport
//! - [`transport`] - Transport adapter contract
//! - [`uri`] - URI template path resolution
//! - [`engine`] - CRUD operations and response classification
//! - [`pagination`] - Paged collection walker
//! - [`registry`] - Discriminated entity families
//! - [`resource`] - Shared wire envelopes
//! - [`sensitive`] - Write-only secret fields
//! - [`service`] - Generic resource service
//! - [`types`] - Shared Octopus domain enums
//! - [`validation`] - Field validators for resource models

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod pagination;
pub mod registry;
pub mod resource;
pub mod sensitive;
pub mod service;
pub mod transport;
pub mod types;
pub mod uri;
pub mod validation;

// Re-export commonly used types
pub use client::{ClientConfig, HttpTransport, HttpTransportBuilder};
pub use config::OctopusClientConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use pagination::{PageState, PageWalker};
pub use registry::{decode_nested, Family, Registry};
pub use resource::{ErrorEnvelope, PagedCollection, Resource};
pub use sensitive::SensitiveValue;
pub use service::{Entity, ResourceService};
pub use transport::{RawResponse, Transport};
pub use types::{ResourceKind, TenantedDeploymentMode};
pub use uri::{Lookup, UriTemplate};
