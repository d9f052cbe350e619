//! Error types for service client operations.
//!
//! Errors fall into four groups: build errors raised before any request is
//! sent, transport errors, unexpected response statuses, and decode errors.
//! None of them is retried or swallowed inside this workspace.

use thiserror::Error;

/// Main error type for service client operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required option was left at its zero value
    #[error("Missing input for argument [{0}]")]
    MissingInput(String),

    /// An option holds a value that cannot be put on the wire
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Service could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Operation timed out
    #[error("Timeout waiting for service: {0}")]
    Timeout(String),

    /// HTTP request failed below the status-code level
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The caller cancelled the operation
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Response status is not one the operation accepts
    #[error("{service}: expected HTTP response code {expected:?} when accessing [{method} {url}], but got {status} instead: {body}")]
    UnexpectedStatus {
        /// Service name
        service: String,
        /// Request method
        method: String,
        /// Request URL
        url: String,
        /// Status code actually received
        status: u16,
        /// Status codes the operation accepts
        expected: Vec<u16>,
        /// Response body, verbatim
        body: String,
    },

    /// Response body does not match the expected shape
    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint or path
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid UUID format
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),
}

/// Specialized result type for service client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "MISSING_INPUT",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Cancelled(_) => "CANCELLED",
            Self::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidUuid(_) => "INVALID_UUID",
        }
    }

    /// Returns the HTTP status carried by an unexpected-status error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the server answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    /// Returns true if the error was raised before any request was sent.
    #[must_use]
    pub const fn is_build_error(&self) -> bool {
        matches!(self, Self::MissingInput(_) | Self::InvalidInput(_))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::DecodeError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Self::InvalidUuid(err.to_string())
    }
}
