//! Error types for the re-ranking engine
//!
//! An empty query is deliberately *not* an error: it produces the sentinel
//! reply (see [`SearchReply::empty_query`](crate::results::SearchReply::empty_query)).
//! Missing candidate attributes are read as empty strings, and invalid
//! options are clamped, so the surface that can actually fail is small:
//! the index oracle and serialization.

use thiserror::Error;

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during a search call
#[derive(Debug, Error)]
pub enum SearchError {
    /// The index oracle failed (network, backend, or query rejection).
    /// A failure in any single strategy is fatal for the whole call.
    #[error("Index error: {0}")]
    Index(String),

    /// The index oracle returned a response the engine cannot interpret
    /// (non-array hits, unsupported shape)
    #[error("Invalid index response: {0}")]
    InvalidResponse(String),

    /// Serialization error (options canonicalization, reply encoding)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SearchError {
    /// Returns the error type string (for JSON responses)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Index(_) => "INDEX_ERROR",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns whether the error is transient and the caller may retry.
    ///
    /// The engine itself never retries; this is advisory for the HTTP/CLI
    /// surface.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Index(_))
    }
}
