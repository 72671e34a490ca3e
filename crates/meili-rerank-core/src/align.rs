//! Greedy one-to-one alignment of query tokens to candidate tokens.
//!
//! Each query token scans the still-unused candidate positions and keeps
//! the closest one: exact equality and synonym equivalence count as
//! distance 0 and stop the scan immediately; otherwise bounded Levenshtein
//! decides, with ties going to the earlier position. A consumed position
//! is never reused within the same field evaluation.
//!
//! The greedy order is part of the scoring contract — an optimal
//! assignment would shift observable scores.

use serde::{Deserialize, Serialize};

use crate::distance::{bounded_levenshtein, dynamic_max};
use crate::synonyms::SynonymTable;

/// How a query token matched its candidate token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Lowercased equality.
    Exact,
    /// Same synonym equivalence class.
    Synonym,
    /// Bounded edit distance.
    Levenshtein,
}

/// One aligned (query token, candidate token) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMatch {
    /// The query token.
    pub query_word: String,
    /// The candidate token it was assigned to.
    pub matched_word: String,
    /// Edit distance between the two (0 for exact/synonym).
    pub distance: usize,
    /// Match rule that produced the assignment.
    #[serde(rename = "type")]
    pub kind: MatchKind,
    /// Index into the candidate's token sequence.
    pub position: usize,
}

/// Output of aligning one query against one candidate field.
#[derive(Debug, Clone, Default)]
pub struct Alignment {
    /// Assigned pairs, in query-token order.
    pub matches: Vec<WordMatch>,
    /// Query tokens that found no candidate within the ceiling.
    pub not_found: Vec<String>,
    /// Consumption flags, one per candidate position.
    pub used_positions: Vec<bool>,
}

/// Align `query_tokens` against `candidate_tokens`.
///
/// `max_distance` is the per-request ceiling `L`; each token's effective
/// bound is `min(L, dynamic_max(token))`. A saturated distance that still
/// lands `<= L` counts as found — the per-word bound limits the work, the
/// request ceiling decides acceptance.
///
/// Both token sequences must already be lowercased.
#[must_use]
pub fn align(
    query_tokens: &[String],
    candidate_tokens: &[String],
    synonyms: &SynonymTable,
    max_distance: usize,
) -> Alignment {
    let mut used = vec![false; candidate_tokens.len()];
    let mut matches = Vec::new();
    let mut not_found = Vec::new();

    for query_word in query_tokens {
        let bound = max_distance.min(dynamic_max(query_word));
        let mut best: Option<(usize, MatchKind, usize)> = None;

        for (position, candidate_word) in candidate_tokens.iter().enumerate() {
            if used[position] {
                continue;
            }
            if query_word == candidate_word {
                best = Some((0, MatchKind::Exact, position));
                break;
            }
            if synonyms.same_class(query_word, candidate_word) {
                best = Some((0, MatchKind::Synonym, position));
                break;
            }
            let distance = bounded_levenshtein(query_word, candidate_word, bound);
            if best.is_none_or(|(best_distance, _, _)| distance < best_distance) {
                best = Some((distance, MatchKind::Levenshtein, position));
            }
        }

        match best {
            Some((distance, kind, position)) if distance <= max_distance => {
                used[position] = true;
                matches.push(WordMatch {
                    query_word: query_word.clone(),
                    matched_word: candidate_tokens[position].clone(),
                    distance,
                    kind,
                    position,
                });
            }
            _ => not_found.push(query_word.clone()),
        }
    }

    Alignment {
        matches,
        not_found,
        used_positions: used,
    }
}
