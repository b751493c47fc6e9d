//! Weather-session error types.

use thiserror::Error;

/// Errors from fetching either remote resource.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint was reachable but the response signalled failure:
    /// a non-success status, an empty body, or the deployment's in-band
    /// error marker.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    /// The response arrived after a newer request for the same resource
    /// had been issued; the result was discarded.
    #[error("Superseded by a newer request")]
    Superseded,
}

impl FetchError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => "Network error. Check your connection.",
            Self::Upstream(_) => "The weather source reported an error. Please try again.",
            Self::Shape(_) => "Received an unexpected response. Please try again.",
            Self::Superseded => "Refreshed in the meantime.",
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Upstream(_))
    }
}

/// The external METAR parser rejected the report text.
#[derive(Debug, Error)]
#[error("METAR decode failed: {0}")]
pub struct DecodeError(pub String);
