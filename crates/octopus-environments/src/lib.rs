//! Environment support for the Octopus Deploy REST API.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::EnvironmentService;
pub use models::Environment;

/// Convenient result alias that reuses the shared Octopus error type.
pub type Result<T> = octopus_core::Result<T>;
