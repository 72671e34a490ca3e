//! Final combination of textual and phonetic sub-scores.
//!
//! Three regimes, decided by the textual total `t`:
//! - `t ≥ 8.5` — the text speaks for itself; phonetics ignored.
//! - `t ∈ [6.0, 8.5)` with phonetic evidence — weighted blend, with the
//!   text weight growing alongside `t` (`w_t = 0.7 + t/40`).
//! - otherwise — phonetics may take over entirely when strictly better.
//!
//! The exact cap runs last: 10.0 is reserved for the upstream
//! `exact_full` path, so every other hit touching it is lowered to 9.99
//! and flagged `_capped`.

use serde::{Deserialize, Serialize};

use crate::phonetic::PhoneticScore;
use crate::scoring::{MainScore, MatchType};

/// Above this textual total the phonetic score is ignored.
pub const TEXT_ONLY_THRESHOLD: f64 = 8.5;

/// Minimum textual total for the weighted blend.
pub const WEIGHTED_MIN_TEXT: f64 = 6.0;

/// The reserved perfect score.
pub const EXACT_THRESHOLD: f64 = 10.0;

/// Where capped hits land.
pub const EXACT_CAP: f64 = 9.99;

/// How the final score was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Textual score only.
    TextOnly,
    /// Convex blend of textual and phonetic scores.
    Weighted,
    /// Phonetic score replaced a weak textual one.
    PhoneticFallback,
}

/// The blend weights stored on weighted hits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight of the textual score.
    pub text: f64,
    /// Weight of the phonetic score.
    pub phonetic: f64,
}

/// Combined score, pre-cap.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedScore {
    /// The blended (or passed-through) score.
    pub score: f64,
    /// The tag carried into the reply.
    pub match_type: MatchType,
    /// Which regime produced the score.
    pub method: ScoringMethod,
    /// Present only for the weighted regime.
    pub weights: Option<ScoringWeights>,
}

/// Combine the main textual record with the optional phonetic record.
#[must_use]
pub fn combine(main: &MainScore, phonetic: Option<&PhoneticScore>) -> CombinedScore {
    let text_score = main.total_score;
    let phonetic_score = phonetic.map_or(0.0, |p| p.score);

    if text_score >= TEXT_ONLY_THRESHOLD {
        return text_only(main);
    }

    if text_score >= WEIGHTED_MIN_TEXT && phonetic_score > 0.0 {
        let text_weight = 0.7 + text_score / 40.0;
        let phonetic_weight = 1.0 - text_weight;
        return CombinedScore {
            score: text_score * text_weight + phonetic_score * phonetic_weight,
            match_type: MatchType::Hybrid,
            method: ScoringMethod::Weighted,
            weights: Some(ScoringWeights {
                text: text_weight,
                phonetic: phonetic_weight,
            }),
        };
    }

    if phonetic_score > text_score {
        // phonetic_score > 0 here, so the record exists
        let phonetic = phonetic.expect("positive phonetic score implies a record");
        return CombinedScore {
            score: phonetic.score,
            match_type: phonetic.match_type,
            method: ScoringMethod::PhoneticFallback,
            weights: None,
        };
    }

    text_only(main)
}

fn text_only(main: &MainScore) -> CombinedScore {
    CombinedScore {
        score: main.total_score,
        match_type: main.match_type,
        method: ScoringMethod::TextOnly,
        weights: None,
    }
}

/// Clamp into `[0, 10]` and apply the exact cap.
///
/// Returns the final score and whether the cap fired. Hits tagged
/// `exact_full` keep the full 10.0.
#[must_use]
pub fn apply_exact_cap(score: f64, match_type: MatchType) -> (f64, bool) {
    let clamped = score.clamp(0.0, EXACT_THRESHOLD);
    if match_type != MatchType::ExactFull && clamped >= EXACT_THRESHOLD {
        (EXACT_CAP, true)
    } else {
        (clamped, false)
    }
}
