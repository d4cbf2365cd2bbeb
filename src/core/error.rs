//! Caller-visible failures of the rate lookup and warming paths

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    /// Missing or malformed request fields. Raised before any I/O.
    #[error("{0}")]
    Validation(String),
    /// Transport failure, timeout or non-success status from the quote source.
    #[error("Quote fetch failed: {0}")]
    UpstreamUnavailable(String),
    /// The quote source answered, but the payload is unusable.
    #[error("Invalid rate response: {0}")]
    InvalidUpstreamResponse(String),
    #[error("Rate store error: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl RateError {
    /// Stable tag distinguishing the error kinds for callers.
    pub fn kind(&self) -> &'static str {
        match self {
            RateError::Validation(_) => "validation",
            RateError::UpstreamUnavailable(_) => "upstream_unavailable",
            RateError::InvalidUpstreamResponse(_) => "invalid_upstream_response",
            RateError::Store(_) => "store",
        }
    }
}
