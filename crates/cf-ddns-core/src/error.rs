//! Error types for the IP updater
//!
//! Every variant is fatal to a run. The split between `Config` and the
//! rest only exists so the binary can report setup mistakes with a
//! different exit code from network and API failures.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the IP updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure (connect, timeout, body read)
    #[error("Network error ({service}): {message}")]
    Network {
        /// Remote service name
        service: String,
        /// Error message
        message: String,
    },

    /// Non-success response from a remote API
    #[error("API error ({service}{}): {message}", status_suffix(.status))]
    Api {
        /// Remote service name
        service: String,
        /// HTTP status, if the failure came with one
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A successful response whose body could not be interpreted
    #[error("Invalid response ({service}): {message}")]
    InvalidResponse {
        /// Remote service name
        service: String,
        /// Error message
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(", status {s}")).unwrap_or_default()
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an API error
    pub fn api(service: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Api {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    /// True for configuration errors
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// True for transport failures
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// HTTP status attached to an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}
