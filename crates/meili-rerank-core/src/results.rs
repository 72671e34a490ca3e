//! Scored hits and the search reply.
//!
//! Wire compatibility matters here: consumers already read the
//! underscore-prefixed enrichment keys (`_score`, `_match_type`, …)
//! alongside the candidate's own attributes, so the candidate is
//! flattened into the hit object and every engine-added field keeps its
//! prefix.

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::field_eval::PenaltyIndices;
use crate::fusion::{ScoringMethod, ScoringWeights};
use crate::phonetic::PhoneticScore;
use crate::query::QueryForms;
use crate::scoring::MatchType;
use crate::strategy::Strategy;

/// A candidate enriched with the engine's scoring verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHit {
    /// The raw index record, flattened into the hit object.
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Final score in `[0, 10]`; 10.0 only for `exact_full` hits.
    #[serde(rename = "_score")]
    pub score: f64,
    /// Match classification.
    #[serde(rename = "_match_type")]
    pub match_type: MatchType,
    /// Rank priority of the classification (0 is best).
    #[serde(rename = "_match_priority")]
    pub match_priority: u8,
    /// Which combination regime produced the score.
    #[serde(rename = "_scoring_method")]
    pub scoring_method: ScoringMethod,
    /// Blend weights, present for weighted hits only.
    #[serde(
        rename = "_scoring_weights",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scoring_weights: Option<ScoringWeights>,
    /// Phonetic sub-score details when phonetics were computed.
    #[serde(
        rename = "_phonetic_details",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub phonetic_details: Option<PhoneticScore>,
    /// Whether the exact cap lowered this hit to 9.99.
    #[serde(rename = "_capped", default, skip_serializing_if = "is_false")]
    pub capped: bool,
    /// The winning field's penalty view, used for rank tie-breaking.
    #[serde(rename = "_penalty_indices")]
    pub penalty_indices: PenaltyIndices,
    /// Strategy that first discovered this hit.
    #[serde(rename = "_discovery_strategy")]
    pub discovery_strategy: Strategy,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
const fn is_false(value: &bool) -> bool {
    !*value
}

/// The reply for one search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReply {
    /// Ranked, truncated hits.
    pub hits: Vec<ScoredHit>,
    /// Number of hits in the reply.
    pub total: usize,
    /// Whether the exact-only policy fired.
    pub has_exact_results: bool,
    /// Number of hits at the exact threshold.
    pub exact_count: usize,
    /// Deduplicated candidate count before ranking and truncation.
    pub total_before_filter: usize,
    /// Wall-clock time spent producing this reply.
    pub query_time_ms: u64,
    /// The preprocessing breakdown (absent on the empty-query sentinel).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocessing: Option<QueryForms>,
    /// Whether this reply was served from the result cache.
    pub from_cache: bool,
    /// Sentinel error message, only for the empty-query reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchReply {
    /// The empty-query sentinel: not an error, no index calls were made.
    #[must_use]
    pub fn empty_query() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            has_exact_results: false,
            exact_count: 0,
            total_before_filter: 0,
            query_time_ms: 0,
            preprocessing: None,
            from_cache: false,
            error: Some("Empty query".to_owned()),
        }
    }
}
