//! Error types for cla-gate-forge

use thiserror::Error;

/// Errors from forge API calls
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Transport failure (connect, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Forge answered with a non-success status code
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// Response body did not have the expected shape
    #[error("Failed to decode forge response: {0}")]
    Decode(String),

    /// Webhook payload could not be parsed
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Client could not be constructed
    #[error("Forge client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ForgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ForgeError::Decode(err.to_string())
        } else {
            ForgeError::Http(err.to_string())
        }
    }
}

/// Errors from the CLA authority
///
/// These never fail a pull request evaluation on their own: the evaluator
/// downgrades them to an unknown CLA status.
#[derive(Error, Debug)]
pub enum ClaError {
    /// Transport failure
    #[error("CLA service unreachable: {0}")]
    Http(String),

    /// Service answered with a non-success status code
    #[error("CLA service returned HTTP {0}")]
    Status(u16),

    /// Client could not be constructed
    #[error("CLA client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClaError {
    fn from(err: reqwest::Error) -> Self {
        ClaError::Http(err.to_string())
    }
}
