//! Unified error type for Ferment
//!
//! One error enum covers the store boundary, publishing, the blob bridge and
//! configuration. Lookup misses and unready access are not errors; they are
//! represented as absent slots and empty views respectively.

use serde::{Deserialize, Serialize};

/// Unified error type for all Ferment operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FermentError {
    /// Invalid input or configuration value
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// The log client failed to append a message
    #[error("Publish failed: {message}")]
    Publish {
        /// Error message reported by the log client
        message: String,
    },

    /// Profile store construction or access failed
    #[error("Store error: {message}")]
    Store {
        /// Error message describing the store failure
        message: String,
    },

    /// Cross-process bridge failure (send failed, remote error, bridge closed)
    #[error("Bridge error: {message}")]
    Bridge {
        /// Error message describing the bridge failure
        message: String,
    },

    /// An operation did not complete within its deadline
    #[error("Timed out: {message}")]
    Timeout {
        /// Error message describing what timed out
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl FermentError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a publish error
    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a bridge error
    pub fn bridge(message: impl Into<String>) -> Self {
        Self::Bridge {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from the log client.
    pub fn is_publish(&self) -> bool {
        matches!(self, Self::Publish { .. })
    }

    /// Whether this error is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for FermentError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid(format!("JSON: {err}"))
    }
}

/// Result alias used across the Ferment crates
pub type Result<T> = std::result::Result<T, FermentError>;
