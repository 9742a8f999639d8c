//! Error types for azflow.
//!
//! Every failure that reaches a stream is wrapped in a [`SharedError`] so the
//! same error value can be copied to every branch of a tee.

use std::sync::Arc;
use thiserror::Error;

/// Result type alias using [`AzflowError`].
pub type Result<T, E = AzflowError> = std::result::Result<T, E>;

/// An error shared between stream branches.
pub type SharedError = Arc<AzflowError>;

/// The main error type for collection runs.
#[derive(Debug, Error)]
pub enum AzflowError {
    /// The HTTP transport failed (connect, timeout, body read).
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a non-success status.
    #[error("API error ({status}): {code} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code reported by the API (or the status text).
        code: String,
        /// Human readable message.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A URL or cursor could not be parsed.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// A bearer token could not be obtained.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Fetching dependents of one parent failed.
    #[error("{stage}: failed listing dependents of '{parent_id}': {source}")]
    Dependent {
        /// Name of the dependent-fetch stage.
        stage: String,
        /// Id of the parent whose dependents could not be listed.
        parent_id: String,
        /// The underlying failure.
        #[source]
        source: SharedError,
    },

    /// The collection run was cancelled.
    #[error("Collection cancelled: {0}")]
    Cancelled(String),

    /// The stage wiring was violated. Fatal to the whole run.
    #[error("Structural error: {0}")]
    Structural(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The sink rejected an item.
    #[error("Sink error: {0}")]
    Sink(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AzflowError {
    /// Wraps the error for sending on a stream.
    #[must_use]
    pub fn shared(self) -> SharedError {
        Arc::new(self)
    }

    /// Returns true for failures the HTTP layer may retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            #[cfg(feature = "http")]
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns the parent id for parent-scoped failures.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Dependent { parent_id, .. } => Some(parent_id),
            _ => None,
        }
    }
}
