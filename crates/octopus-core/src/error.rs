//! Error types for Octopus Deploy operations.
//!
//! This module provides the closed error taxonomy shared by every resource service:
//! pre-flight failures (invalid parameters, validation), transport failures, and the
//! deterministic classification of server responses.

use thiserror::Error;

/// Main error type for Octopus Deploy operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required request input was missing or blank
    #[error("Invalid parameter `{parameter}` for {operation}")]
    InvalidParameter {
        /// Operation that rejected the input (e.g. `GetByID`)
        operation: String,
        /// Name of the offending parameter
        parameter: String,
    },

    /// Entity failed its client-side required-field checks
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Network or serialization failure
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The server answered 404 for the given path
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// The server reported a non-empty error list
    #[error("Octopus Deploy API error: {message} {errors:?} {full_exception}")]
    ApiError {
        /// `ErrorMessage` from the error envelope
        message: String,
        /// `Errors` from the error envelope, in server order
        errors: Vec<String>,
        /// `FullException` from the error envelope
        full_exception: String,
    },

    /// The status code did not match the one expected by the operation
    #[error("Unexpected status {actual} (expected {expected}) from `{path}`")]
    UnexpectedStatus {
        /// Status code received
        actual: u16,
        /// Status code the operation expects
        expected: u16,
        /// Request path
        path: String,
    },

    /// A discriminator value is not registered for its family
    #[error("Unknown {family} variant `{value}`")]
    UnknownVariant {
        /// Variant family name (e.g. `Account`)
        family: String,
        /// Discriminator value found on the wire
        value: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Octopus Deploy operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an [`Error::InvalidParameter`].
    #[must_use]
    pub fn invalid_parameter(operation: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::InvalidParameter {
            operation: operation.into(),
            parameter: parameter.into(),
        }
    }

    /// Build an [`Error::UnknownVariant`].
    #[must_use]
    pub fn unknown_variant(family: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            family: family.into(),
            value: value.into(),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::TransportError(_) => "TRANSPORT_ERROR",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::ApiError { .. } => "API_ERROR",
            Self::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            Self::UnknownVariant { .. } => "UNKNOWN_VARIANT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true if the error was raised before any request was issued.
    #[must_use]
    pub const fn is_pre_flight(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. } | Self::ValidationError(_))
    }

    /// Returns true if this error means the requested item does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound(_))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::TransportError(format!("serialization failure: {err}"))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
