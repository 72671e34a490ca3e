//! Per-field aggregates over one alignment.
//!
//! The aligner says *which* tokens matched; this module turns that into
//! the numbers the scorers consume: summed and averaged distances,
//! coverage, token-count ratio, and the character mass of candidate
//! tokens the query never touched (the "extras").

use serde::{Deserialize, Serialize};

use crate::align::{self, WordMatch};
use crate::synonyms::SynonymTable;

/// The penalty-relevant slice of a field evaluation, carried on scored
/// hits for rank tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyIndices {
    /// Query tokens that found no candidate.
    pub missing: usize,
    /// Mean distance over found tokens (0 when none matched).
    pub average_distance: f64,
    /// `min(q, r) / max(q, r)` over token counts.
    pub length_ratio: f64,
    /// Extra character mass relative to the query text length.
    pub extra_length_ratio: f64,
}

/// Full evaluation of one candidate field against one query form.
#[derive(Debug, Clone, Serialize)]
pub struct FieldEvaluation {
    /// Aligned pairs in query order.
    pub found: Vec<WordMatch>,
    /// Query tokens without an assignment.
    pub not_found: Vec<String>,
    /// Sum of match distances.
    pub total_distance: usize,
    /// `total_distance / found_count`, 0 when nothing matched.
    pub average_distance: f64,
    /// Number of aligned query tokens.
    pub found_count: usize,
    /// Number of query tokens.
    pub query_count: usize,
    /// Number of candidate tokens.
    pub result_count: usize,
    /// Token-count similarity, 1.0 when either side is empty.
    pub length_ratio: f64,
    /// `found_count / query_count`, 1.0 when the query is empty.
    pub coverage_ratio: f64,
    /// Summed character length of unconsumed candidate tokens.
    pub extra_length: usize,
    /// `extra_length / |query_text|`, 0 when the query text is empty.
    pub extra_length_ratio: f64,
}

impl FieldEvaluation {
    /// Align and aggregate one field.
    ///
    /// `query_text` is the reference text whose character count scales the
    /// extra-length penalty; short queries intentionally inflate it.
    #[must_use]
    pub fn evaluate(
        query_tokens: &[String],
        candidate_tokens: &[String],
        query_text: &str,
        synonyms: &SynonymTable,
        max_distance: usize,
    ) -> Self {
        let alignment = align::align(query_tokens, candidate_tokens, synonyms, max_distance);

        let found_count = alignment.matches.len();
        let query_count = query_tokens.len();
        let result_count = candidate_tokens.len();

        let total_distance: usize = alignment.matches.iter().map(|m| m.distance).sum();
        let average_distance = if found_count == 0 {
            0.0
        } else {
            ratio(total_distance, found_count)
        };

        let length_ratio = if query_count == 0 || result_count == 0 {
            1.0
        } else {
            ratio(query_count.min(result_count), query_count.max(result_count))
        };

        let coverage_ratio = if query_count == 0 {
            1.0
        } else {
            ratio(found_count, query_count)
        };

        let extra_length: usize = candidate_tokens
            .iter()
            .zip(&alignment.used_positions)
            .filter(|&(_, &used)| !used)
            .map(|(token, _)| token.chars().count())
            .sum();

        let query_text_length = query_text.chars().count();
        let extra_length_ratio = if query_text_length == 0 {
            0.0
        } else {
            ratio(extra_length, query_text_length)
        };

        Self {
            found: alignment.matches,
            not_found: alignment.not_found,
            total_distance,
            average_distance,
            found_count,
            query_count,
            result_count,
            length_ratio,
            coverage_ratio,
            extra_length,
            extra_length_ratio,
        }
    }

    /// Query tokens that went unmatched.
    #[must_use]
    pub const fn missing(&self) -> usize {
        self.query_count - self.found_count
    }

    /// The penalty view used by the ranker.
    #[must_use]
    pub const fn penalties(&self) -> PenaltyIndices {
        PenaltyIndices {
            missing: self.missing(),
            average_distance: self.average_distance,
            length_ratio: self.length_ratio,
            extra_length_ratio: self.extra_length_ratio,
        }
    }
}

#[allow(clippy::cast_precision_loss)] // token counts and char lengths are tiny
fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}
