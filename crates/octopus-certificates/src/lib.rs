//! Certificate support for the Octopus Deploy REST API.
//!
//! Certificates are plain resources whose data and password are write-only
//! [`SensitiveValue`](octopus_core::SensitiveValue)s. Replacing a certificate goes
//! through the `replace` action rather than an update.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::CertificateService;
pub use models::{Certificate, CertificateReplace};

/// Convenient result alias that reuses the shared Octopus error type.
pub type Result<T> = octopus_core::Result<T>;
