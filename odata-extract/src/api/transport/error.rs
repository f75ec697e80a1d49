//! Transport failure taxonomy

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures surfaced by the transport layer
///
/// Retryable gateway responses never appear here directly: they are absorbed
/// by the retry policy and only escalate as [`TransportError::RetriesExhausted`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be configured
    #[error("failed to set up the HTTP client: {0}")]
    ClientSetup(#[source] BoxError),

    /// Any I/O level failure while talking to the service (DNS, reset, timeout)
    #[error("failed to call the service at {url}: {source}")]
    Call {
        url: String,
        #[source]
        source: BoxError,
    },

    /// Every attempt of a retried call ended with a server error
    #[error("data recovery failed for {url} after {attempts} attempts (last status {last_status})")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_status: u16,
    },
}

impl TransportError {
    /// Whether this failure came out of an exhausted retry sequence
    ///
    /// Callers treat it as fatal for the page being fetched.
    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, TransportError::RetriesExhausted { .. })
    }
}
