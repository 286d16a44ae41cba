//! # Error Handling Module
//!
//! Crate-wide error type for the content gateway, built on `thiserror`.
//!
//! Each layer has its own narrower error (`CacheError`, `RemoteError`,
//! `MirrorError`, `ResolveError`, `SeedError`); they all convert into
//! [`ContentError`] at the service boundary, which in turn knows how to render
//! itself as an HTTP response.
//!
//! ## Propagation Rules
//! - Cache failures never reach this type; the cache wrapper swallows them.
//! - Remote failures are recovered by the resolver through the mirror.
//! - Mirror failures after a remote failure surface as [`ContentError::Unavailable`].
//! - "Nothing exists at this reference" is not an error at all: services
//!   return `Ok(None)` and handlers turn that into a 404.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::resolver::ResolveError;

/// Main result type used throughout the service
pub type ContentResult<T> = Result<T, ContentError>;

/// Error categories surfaced to callers of the content services
#[derive(Debug, Error, Clone)]
pub enum ContentError {
    /// Configuration-related errors (invalid config, missing files, etc.)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A request parameter could not be parsed or is out of range
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// Nothing exists at the requested reference
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Neither the remote provider nor the local mirror could answer
    #[error("Content temporarily unavailable: {operation} - {reason}")]
    Unavailable { operation: String, reason: String },

    /// Internal server errors for unexpected failures
    #[error("Internal server error: {message}")]
    Internal { message: String },

    /// I/O errors (file operations, sockets)
    #[error("I/O error: {message}")]
    Io { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// YAML parsing errors for configuration files
    #[error("YAML error: {message}")]
    Yaml { message: String },
}

impl ContentError {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid input error for a named request parameter
    pub fn invalid_input<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error for a resource description
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an internal error with a custom message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Json { .. } => StatusCode::BAD_REQUEST,
            Self::Configuration { .. }
            | Self::Internal { .. }
            | Self::Io { .. }
            | Self::Yaml { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a string representation of the error type for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::InvalidInput { .. } => "invalid_input",
            Self::NotFound { .. } => "not_found",
            Self::Unavailable { .. } => "temporarily_unavailable",
            Self::Internal { .. } => "internal_error",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::Yaml { .. } => "yaml_error",
        }
    }

    /// Whether a client may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Io { .. })
    }
}

impl From<ResolveError> for ContentError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unavailable {
                operation,
                remote,
                mirror,
            } => Self::Unavailable {
                operation: operation.name().to_string(),
                reason: format!("remote: {}; mirror: {}", remote, mirror),
            },
        }
    }
}

impl From<std::io::Error> for ContentError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ContentError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: err.to_string(),
        }
    }
}

/// Render errors as `{ "error": { code, message, type, retryable } }`
impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
                "type": self.error_type(),
                "retryable": self.is_retryable(),
            }
        });

        (status, Json(error_response)).into_response()
    }
}
