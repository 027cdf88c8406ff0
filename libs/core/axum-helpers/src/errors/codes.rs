//! Type-safe error codes for logs and API responses.
//!
//! Each error code includes:
//! - String representation for client consumption (e.g., "INVALID_REQUEST")
//! - Integer code for logging and monitoring (e.g., 1001)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::InvalidRequest;
//! assert_eq!(code.as_str(), "INVALID_REQUEST");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request body is missing, malformed or fails validation
    InvalidRequest,

    /// Request body is not valid JSON
    InvalidJson,

    /// Requested resource was not found
    NotFound,

    /// HTTP method is not supported by the route
    MethodNotAllowed,

    // Server errors
    /// Required configuration is missing or invalid
    ConfigError,

    // Upstream errors (6000s)
    /// Embedding service call failed
    EmbeddingFailure,

    /// Vector index query failed
    VectorIndexFailure,

    /// Chat-completion call failed before streaming began
    CompletionFailure,

    /// Response stream was aborted after headers were sent
    StreamInterrupted,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::EmbeddingFailure => "EMBEDDING_FAILURE",
            Self::VectorIndexFailure => "VECTOR_INDEX_FAILURE",
            Self::CompletionFailure => "COMPLETION_FAILURE",
            Self::StreamInterrupted => "STREAM_INTERRUPTED",
        }
    }

    /// Integer code for structured logs and metrics.
    ///
    /// - 1000-1999: Client and generic server errors
    /// - 6000-6999: Upstream service errors
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidRequest => 1001,
            Self::InvalidJson => 1002,
            Self::NotFound => 1004,
            Self::MethodNotAllowed => 1006,
            Self::ConfigError => 1012,

            Self::EmbeddingFailure => 6001,
            Self::VectorIndexFailure => 6002,
            Self::CompletionFailure => 6003,
            Self::StreamInterrupted => 6004,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Request validation failed",
            Self::InvalidJson => "Invalid JSON format",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::ConfigError => "Service is misconfigured",
            Self::EmbeddingFailure => "Embedding service request failed",
            Self::VectorIndexFailure => "Vector index request failed",
            Self::CompletionFailure => "Chat completion request failed",
            Self::StreamInterrupted => "Response stream was interrupted",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
