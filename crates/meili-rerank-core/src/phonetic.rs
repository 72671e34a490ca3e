//! Phonetic scoring over French Soundex codes.
//!
//! Both sides are treated as opaque whitespace-separated code tokens.
//! Matching is greedy with rule priority per query code: equality first,
//! then mutual-prefix (only between codes of useful length), then — in the
//! tolerant regime — a single edit of slack for long codes. The tolerant
//! pass only runs when the strict score is poor, and only replaces it when
//! it strictly improves coverage.
//!
//! Phonetic scores are deliberately capped below the textual scale: a
//! perfect phonetic match tops out at 7.5, so sound-alike evidence can
//! rescue a hit but never outranks clean textual evidence.

use serde::{Deserialize, Serialize};

use crate::distance::bounded_levenshtein;
use crate::scoring::MatchType;

/// Ceiling for a complete phonetic match.
pub const PHONETIC_FULL_CAP: f64 = 7.5;

/// Ceiling when at least two thirds of the codes match.
pub const PHONETIC_STRONG_CAP: f64 = 7.0;

/// Ceiling for weaker phonetic coverage.
pub const PHONETIC_WEAK_CAP: f64 = 6.0;

/// Coverage fraction that counts as "strong".
pub const PHONETIC_STRONG_RATIO: f64 = 0.66;

/// Scale factor from coverage ratio to score.
const PHONETIC_SCALE: f64 = 8.0;

/// Minimum code length for the mutual-prefix rule.
const PREFIX_MIN_LEN: usize = 4;

/// Minimum code length for the tolerant single-edit rule.
const TOLERANT_MIN_LEN: usize = 6;

/// Outcome of phonetic scoring, attached to hits as `_phonetic_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneticScore {
    /// Capped phonetic score.
    pub score: f64,
    /// `phonetic_strict` or `phonetic_tolerant`.
    pub match_type: MatchType,
    /// Matched query codes.
    pub found: usize,
    /// Total query codes considered.
    pub total: usize,
    /// `found / total`.
    pub ratio: f64,
}

/// Score the phonetic overlap between a query and a candidate.
///
/// Returns `None` when either side has no usable codes — the combiner then
/// never enters the weighted or fallback regimes.
#[must_use]
pub fn score_phonetic(query_soundex: &str, candidate_soundex: &str) -> Option<PhoneticScore> {
    let query_codes = code_tokens(query_soundex);
    let candidate_codes = code_tokens(candidate_soundex);
    if query_codes.is_empty() || candidate_codes.is_empty() {
        return None;
    }

    let strict_found = match_codes(&query_codes, &candidate_codes, false);
    let strict_ratio = coverage(strict_found, query_codes.len());
    let strict_score = capped_score(strict_ratio);

    if strict_score < PHONETIC_WEAK_CAP {
        let tolerant_found = match_codes(&query_codes, &candidate_codes, true);
        let tolerant_ratio = coverage(tolerant_found, query_codes.len());
        if tolerant_ratio > strict_ratio {
            return Some(PhoneticScore {
                score: capped_score(tolerant_ratio),
                match_type: MatchType::PhoneticTolerant,
                found: tolerant_found,
                total: query_codes.len(),
                ratio: tolerant_ratio,
            });
        }
    }

    Some(PhoneticScore {
        score: strict_score,
        match_type: MatchType::PhoneticStrict,
        found: strict_found,
        total: query_codes.len(),
        ratio: strict_ratio,
    })
}

/// Whitespace tokens longer than one character.
fn code_tokens(soundex: &str) -> Vec<&str> {
    soundex
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .collect()
}

/// Greedily assign query codes to unused candidate codes.
fn match_codes(query_codes: &[&str], candidate_codes: &[&str], tolerant: bool) -> usize {
    let mut used = vec![false; candidate_codes.len()];
    let mut found = 0;

    for &query_code in query_codes {
        let chosen = pick_candidate(query_code, candidate_codes, &used, tolerant);
        if let Some(position) = chosen {
            used[position] = true;
            found += 1;
        }
    }

    found
}

/// First rule that fires wins; within a rule, the earliest unused
/// candidate wins.
fn pick_candidate(
    query_code: &str,
    candidate_codes: &[&str],
    used: &[bool],
    tolerant: bool,
) -> Option<usize> {
    let unused = || {
        candidate_codes
            .iter()
            .enumerate()
            .filter(|&(position, _)| !used[position])
    };

    // Rule 1: equality short-circuits everything
    if let Some((position, _)) = unused().find(|&(_, &code)| code == query_code) {
        return Some(position);
    }

    // Rule 2: mutual prefix between sufficiently long codes
    let prefix_hit = unused().find(|&(_, &code)| {
        query_code.len().min(code.len()) >= PREFIX_MIN_LEN
            && (code.starts_with(query_code) || query_code.starts_with(code))
    });
    if let Some((position, _)) = prefix_hit {
        return Some(position);
    }

    // Rule 3: one edit of slack, long codes only, tolerant regime only
    if tolerant {
        let fuzzy_hit = unused().find(|&(_, &code)| {
            query_code.len().min(code.len()) >= TOLERANT_MIN_LEN
                && bounded_levenshtein(query_code, code, 1) <= 1
        });
        if let Some((position, _)) = fuzzy_hit {
            return Some(position);
        }
    }

    None
}

#[allow(clippy::cast_precision_loss)] // code counts are tiny
fn coverage(found: usize, total: usize) -> f64 {
    found as f64 / total as f64
}

/// `8 × ratio`, capped by coverage regime.
fn capped_score(ratio: f64) -> f64 {
    let score = PHONETIC_SCALE * ratio;
    if ratio >= 1.0 {
        score.min(PHONETIC_FULL_CAP)
    } else if ratio >= PHONETIC_STRONG_RATIO {
        score.min(PHONETIC_STRONG_CAP)
    } else {
        score.min(PHONETIC_WEAK_CAP)
    }
}
