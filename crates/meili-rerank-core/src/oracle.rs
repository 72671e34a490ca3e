//! The index oracle trait.
//!
//! The engine treats the full-text index as an opaque search service: it
//! asks for candidates with a query variant, an attribute restriction,
//! and an untouched filter expression, and gets flat records back. The
//! production implementation wraps a Meilisearch client; tests use literal
//! candidate lists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::candidate::Candidate;
use crate::error::EngineResult;

/// Parameters for one oracle call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleQuery {
    /// Maximum candidates to return for this strategy.
    pub limit: usize,
    /// Attribute restriction for the match (one field per strategy).
    pub searchable_attributes: Vec<String>,
    /// Opaque filter expression, forwarded verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
}

/// An index that can be searched for candidates.
///
/// Implementations must surface backend failures and non-conforming
/// responses as [`SearchError::Index`](crate::error::SearchError::Index) /
/// [`SearchError::InvalidResponse`](crate::error::SearchError::InvalidResponse);
/// the engine treats any error as fatal for the whole call and does not
/// retry.
pub trait SearchIndex: Send + Sync {
    /// Run one search and return the raw candidate records.
    fn search(&self, query: &str, params: &OracleQuery) -> EngineResult<Vec<Candidate>>;
}
