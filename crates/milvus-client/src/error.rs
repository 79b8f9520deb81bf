//! Unified error handling for milvus-client
//!
//! Every client operation resolves to `Ok` or one [`MilvusError`]. Errors are
//! values; nothing in the wait loop panics or unwinds.
//!
//! # Example
//!
//! ```rust
//! use milvus_client::{MilvusError, StatusCode};
//! use milvus_client::transport::TransportError;
//! use std::time::Duration;
//!
//! let err = MilvusError::Timeout(Duration::from_secs(30));
//! assert!(err.is_timeout());
//! assert!(err.is_retryable());
//!
//! // A channel that cannot be reached reads as "not connected"
//! let err: MilvusError = TransportError::Unavailable("refused".to_string()).into();
//! assert_eq!(err.code(), StatusCode::NotConnected);
//! ```

use crate::config::ConfigError;
use crate::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Flat status code for callers that only need the category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    NotConnected,
    ServerFailed,
    Timeout,
    InvalidArgument,
    ConfigError,
}

/// Core error type for client operations
#[derive(Error, Debug)]
pub enum MilvusError {
    /// No transport, the client was never connected or was disconnected
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// The server reported an error on a trigger call, a poll, or as a hard failure
    #[error("Server failed: {0}")]
    ServerFailed(String),

    /// Wait budget exhausted; the operation may still finish server-side
    #[error("Timed out after {0:?} waiting for completion")]
    Timeout(Duration),

    /// A request could not be exchanged with the server
    #[error("Communication failure: {0}")]
    Communication(#[from] TransportError),

    /// Rejected before any request was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, MilvusError>;

impl MilvusError {
    pub fn code(&self) -> StatusCode {
        match self {
            MilvusError::NotConnected(_) => StatusCode::NotConnected,
            MilvusError::ServerFailed(_) => StatusCode::ServerFailed,
            MilvusError::Timeout(_) => StatusCode::Timeout,
            MilvusError::Communication(TransportError::Unavailable(_)) => StatusCode::NotConnected,
            MilvusError::Communication(TransportError::Rpc(_)) => StatusCode::ServerFailed,
            MilvusError::InvalidArgument(_) => StatusCode::InvalidArgument,
            MilvusError::Config(_) => StatusCode::ConfigError,
        }
    }

    /// Returns true if no usable connection was available
    #[must_use]
    pub fn is_not_connected(&self) -> bool {
        self.code() == StatusCode::NotConnected
    }

    /// Returns true if the server reported the failure
    #[must_use]
    pub fn is_server_failed(&self) -> bool {
        self.code() == StatusCode::ServerFailed
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, MilvusError::Timeout(_))
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            MilvusError::Timeout(_) => true, // Server may still be working on it
            MilvusError::Communication(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_codes() {
        let err: MilvusError = TransportError::Unavailable("refused".to_string()).into();
        assert!(err.is_not_connected());
        assert!(err.is_retryable());

        let err: MilvusError = TransportError::Rpc("deadline exceeded".to_string()).into();
        assert!(err.is_server_failed());
        assert!(!err.is_not_connected());
    }

    #[test]
    fn test_server_failed_is_terminal() {
        let err = MilvusError::ServerFailed("OutOfMemory".to_string());
        assert_eq!(err.code(), StatusCode::ServerFailed);
        assert!(!err.is_retryable());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_timeout() {
        let err = MilvusError::Timeout(Duration::from_secs(10));
        assert_eq!(err.code(), StatusCode::Timeout);
        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Timed out"));
    }

    #[test]
    fn test_invalid_argument() {
        let err = MilvusError::InvalidArgument("collection name is empty".to_string());
        assert_eq!(err.code(), StatusCode::InvalidArgument);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_config_error() {
        let err: MilvusError = ConfigError::ProfileNotFound {
            name: "staging".to_string(),
        }
        .into();
        assert_eq!(err.code(), StatusCode::ConfigError);
        assert!(err.to_string().contains("staging"));
    }
}
