//! Error handling for the application

use thiserror::Error;

use crate::shared::types::MetricCategory;

/// Endpoint-level failures. Produced by the fetcher, consumed by the
/// per-chain candidate loop as "try the next candidate".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    /// TLS validation failure, the only kind retried without verification
    #[error("Certificate verification failed: {0}")]
    Certificate(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl FetchError {
    pub fn is_certificate(&self) -> bool {
        matches!(self, FetchError::Certificate(_))
    }
}

/// Chain-level pipeline outcomes. Recorded on the snapshot, never raised
/// past the aggregator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("No usable data for {category} on {chain}: all candidates exhausted")]
    EmptyResult {
        chain: String,
        category: MetricCategory,
    },

    #[error("Chain not configured: {0}")]
    UnknownChain(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP client error: {0}")]
    HttpClientError(String),
}
