//! Deterministic ranking of scored hits.
//!
//! Floats sort badly: two scores that differ only in the last ulp are the
//! same score for ranking purposes, so every float key in the chain is
//! compared through its documented threshold before falling to the next
//! key. The final key is the input position — determinism never relies on
//! the host sort's stability.
//!
//! The exact-only policy runs after sorting: if any hit sits at the exact
//! threshold (only the upstream `exact_full` path can, post-cap),
//! everything else is suppressed from the reply.

use std::cmp::Ordering;

use tracing::debug;

use crate::fusion::EXACT_THRESHOLD;
use crate::results::ScoredHit;

/// Epsilon for score equality.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Threshold for extra-length-ratio comparisons.
pub const EXTRA_RATIO_THRESHOLD: f64 = 0.01;

/// Threshold for length-ratio comparisons.
pub const LENGTH_RATIO_THRESHOLD: f64 = 0.001;

/// Ranked hits plus the exact-policy verdict.
#[derive(Debug, Clone)]
pub struct RankOutcome {
    /// Sorted (and possibly exact-filtered) hits, truncated to the limit.
    pub hits: Vec<ScoredHit>,
    /// Whether the exact-only policy fired.
    pub has_exact_results: bool,
    /// Number of hits at the exact threshold.
    pub exact_count: usize,
}

/// Sort, apply the exact-only policy, and truncate.
#[must_use]
pub fn rank(hits: Vec<ScoredHit>, limit: usize) -> RankOutcome {
    let mut decorated: Vec<(usize, ScoredHit)> = hits.into_iter().enumerate().collect();
    decorated.sort_by(|(a_position, a), (b_position, b)| {
        compare_hits(a, b).then_with(|| a_position.cmp(b_position))
    });

    let mut sorted: Vec<ScoredHit> = decorated.into_iter().map(|(_, hit)| hit).collect();

    let exact_count = sorted
        .iter()
        .filter(|hit| hit.score >= EXACT_THRESHOLD - SCORE_EPSILON)
        .count();
    let has_exact_results = exact_count > 0;

    if has_exact_results {
        debug!(exact_count, "exact-only policy suppressing non-exact hits");
        sorted.retain(|hit| hit.score >= EXACT_THRESHOLD - SCORE_EPSILON);
    }

    sorted.truncate(limit);

    RankOutcome {
        hits: sorted,
        has_exact_results,
        exact_count,
    }
}

/// The composite comparison chain (input position excluded — the caller
/// appends it for absolute determinism).
///
/// 1. Score descending (ε = 1e-9)
/// 2. Extra-length ratio ascending (threshold 0.01)
/// 3. Length ratio descending (threshold 0.001)
/// 4. Average distance ascending
/// 5. `id` ascending, then `id_etab` ascending
#[must_use]
pub fn compare_hits(a: &ScoredHit, b: &ScoredHit) -> Ordering {
    let score_diff = b.score - a.score;
    if score_diff.abs() > SCORE_EPSILON {
        return if score_diff > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    let extra_diff = a.penalty_indices.extra_length_ratio - b.penalty_indices.extra_length_ratio;
    if extra_diff.abs() > EXTRA_RATIO_THRESHOLD {
        return if extra_diff > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    let length_diff = b.penalty_indices.length_ratio - a.penalty_indices.length_ratio;
    if length_diff.abs() > LENGTH_RATIO_THRESHOLD {
        return if length_diff > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    let distance_order = a
        .penalty_indices
        .average_distance
        .partial_cmp(&b.penalty_indices.average_distance)
        .unwrap_or(Ordering::Equal);
    if distance_order != Ordering::Equal {
        return distance_order;
    }

    a.candidate
        .id_string()
        .cmp(&b.candidate.id_string())
        .then_with(|| a.candidate.id_etab_string().cmp(&b.candidate.id_etab_string()))
}
