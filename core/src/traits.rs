//! Core traits for search clients, samplers and recorders
//!
//! These traits are defined in core to avoid circular dependencies.
//! Implementations live in their respective crates (vendors/, samplers/,
//! storage/).

use crate::metrics::RequestRecord;
use crate::request::SearchRequest;
use crate::response::SearchResponse;
use async_trait::async_trait;
use rand::RngCore;

// ============================================================================
// Search Client Trait
// ============================================================================

/// Transport that issues one search request and returns the raw response
///
/// Implementations must not retry; one call is one attempt.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Client identifier (e.g., "elasticsearch")
    fn name(&self) -> &str;

    /// POST `body` as JSON to `url`
    ///
    /// Returns the status code for every response that arrives. The body is
    /// only read for 200 responses.
    async fn search(&self, url: &str, body: Vec<u8>) -> Result<SearchResponse, VendorError>;
}

/// Transport-level errors
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// Connection, timeout or protocol failure before a status was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response arrived but its body could not be read
    #[error("failed to read response body (status {status}): {source}")]
    Body {
        /// HTTP status code of the response
        status: u16,
        /// Underlying read error
        source: reqwest::Error,
    },

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl VendorError {
    /// Status code, if a response was received before the failure
    pub fn status_code(&self) -> Option<u16> {
        match self {
            VendorError::Body { status, .. } => Some(*status),
            VendorError::Http(e) => e.status().map(|s| s.as_u16()),
            VendorError::InvalidRequest(_) => None,
        }
    }
}

// ============================================================================
// Sampler Trait
// ============================================================================

/// Sampler builds the next request body
///
/// Randomness is supplied by the caller so each worker can own its
/// generator.
pub trait Sampler: Send + Sync {
    /// Sampler name for identification
    fn name(&self) -> &str;

    /// Build a single request
    fn sample(&self, rng: &mut dyn RngCore) -> Result<SearchRequest, SamplerError>;
}

/// Sampler-specific errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// The condition body could not be serialized
    #[error("failed to serialize condition: {source}")]
    Serialize {
        /// Identifier of the condition that failed
        condition_id: Option<i64>,
        /// Underlying serialization error
        source: serde_json::Error,
    },

    /// There is nothing to sample from
    #[error("no conditions to sample from")]
    Empty,
}

impl SamplerError {
    /// Identifier of the condition involved, if known
    pub fn condition_id(&self) -> Option<i64> {
        match self {
            SamplerError::Serialize { condition_id, .. } => *condition_id,
            SamplerError::Empty => None,
        }
    }
}

// ============================================================================
// Recorder Trait
// ============================================================================

/// Sink for request records
///
/// Must be safe to call from any number of workers at once; each call
/// writes exactly one complete row.
pub trait Recorder: Send + Sync {
    /// Append one record and make it durable
    fn record(&self, record: &RequestRecord) -> Result<(), RecordError>;

    /// Number of records written so far
    fn records_written(&self) -> u64;
}

/// Recorder errors
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Writing or flushing the log failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A previous writer panicked while holding the log
    #[error("result log lock poisoned")]
    Poisoned,
}
