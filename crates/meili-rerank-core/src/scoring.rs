//! Main textual scoring: field scores, strategy arbitration, name bonus.
//!
//! Three fields are evaluated per candidate: `name_search` against the
//! cleaned query, `name_no_space` against the no-space query, and `name`
//! against the original query (bonus only). The two scoring strategies
//! compete; the winner's adjusted score becomes the base, the name bonus
//! is added on top, and the sum is classified into a match type.
//!
//! Arbitration prefers the no-space interpretation only when it is
//! strictly better — on an exact tie the with-spaces reading wins, so a
//! one-word query matching a one-word candidate reports
//! `exact_with_extras` rather than `no_space_match`.

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::field_eval::FieldEvaluation;
use crate::query::QueryForms;
use crate::synonyms::SynonymTable;

// =============================================================================
// SCORING CONSTANTS
// =============================================================================

/// Starting score before distance and penalties are subtracted.
pub const RAW_BASE_SCORE: f64 = 10.0;

/// Penalty per missing query token.
pub const MISSING_TOKEN_PENALTY: f64 = 0.6;

/// Penalty per unit of average edit distance.
pub const AVG_DISTANCE_PENALTY: f64 = 0.5;

/// Penalty weight for token-count mismatch (`1 - length_ratio`).
pub const LENGTH_RATIO_PENALTY: f64 = 1.0;

/// Penalty weight for extra candidate mass (applied to `ratio × 10`).
pub const EXTRA_LENGTH_PENALTY: f64 = 0.15;

/// A no-space field score below this is zeroed outright: the concatenated
/// interpretation is only trusted when it is nearly perfect.
pub const NO_SPACE_FLOOR: f64 = 7.0;

/// Ceiling on `base + bonus` before the final combiner runs.
pub const TOTAL_SCORE_CEILING: f64 = 12.0;

/// A fuzzy full match at or above this total is "near perfect".
pub const NEAR_PERFECT_THRESHOLD: f64 = 8.0;

/// Maximum name bonus.
pub const NAME_BONUS_MAX: f64 = 2.0;

/// Below this word-count ratio the name bonus is withheld entirely.
pub const NAME_BONUS_MIN_WORD_RATIO: f64 = 0.4;

/// Above this extra-length ratio the name bonus is withheld entirely.
pub const NAME_BONUS_MAX_EXTRA_RATIO: f64 = 1.0;

/// Classification of a scored hit. Lower priority ranks better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Reserved for the upstream exact-match path; never produced by the
    /// scorer, but recognized so tagged hits pass the exact cap.
    ExactFull,
    /// Perfect no-space alignment.
    NoSpaceMatch,
    /// Perfect alignment on `name_search` (candidate may carry extras).
    ExactWithExtras,
    /// Fuzzy but complete, with a high total score.
    NearPerfect,
    /// Phonetic agreement under the strict rules.
    PhoneticStrict,
    /// Exact alignment but some query tokens went unmatched.
    ExactWithMissing,
    /// Every query token matched, some at a distance.
    FuzzyFull,
    /// Weighted blend of textual and phonetic evidence.
    Hybrid,
    /// Phonetic agreement that needed the tolerant rules.
    PhoneticTolerant,
    /// Fuzzy and incomplete.
    FuzzyPartial,
    /// Nothing usable matched.
    Partial,
}

impl MatchType {
    /// Rank priority (0 is best). Shared scale across textual, phonetic,
    /// and hybrid tags.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::ExactFull => 0,
            Self::NoSpaceMatch | Self::ExactWithExtras => 1,
            Self::NearPerfect => 2,
            Self::PhoneticStrict => 3,
            Self::ExactWithMissing => 4,
            Self::FuzzyFull => 5,
            Self::Hybrid => 6,
            Self::PhoneticTolerant => 7,
            Self::FuzzyPartial => 8,
            Self::Partial => 9,
        }
    }

    /// The wire tag (snake_case, identical to the serde rendering).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactFull => "exact_full",
            Self::NoSpaceMatch => "no_space_match",
            Self::ExactWithExtras => "exact_with_extras",
            Self::NearPerfect => "near_perfect",
            Self::PhoneticStrict => "phonetic_strict",
            Self::ExactWithMissing => "exact_with_missing",
            Self::FuzzyFull => "fuzzy_full",
            Self::Hybrid => "hybrid",
            Self::PhoneticTolerant => "phonetic_tolerant",
            Self::FuzzyPartial => "fuzzy_partial",
            Self::Partial => "partial",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which field strategy produced the base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinningStrategy {
    /// The cleaned, tokenized `name_search` field.
    NameSearch,
    /// The concatenated `name_no_space` field.
    NoSpace,
    /// Neither strategy produced a usable score.
    None,
}

/// Output of the main textual scorer for one candidate.
#[derive(Debug, Clone)]
pub struct MainScore {
    /// Evaluation of `name_search` against the cleaned query.
    pub name_search: FieldEvaluation,
    /// Evaluation of `name_no_space` against the no-space query.
    pub no_space: FieldEvaluation,
    /// Evaluation of `name` against the original query (bonus input).
    pub name: FieldEvaluation,
    /// Adjusted score of the name_search strategy.
    pub name_search_score: f64,
    /// Adjusted score of the no_space strategy (post-floor).
    pub no_space_score: f64,
    /// The strategy that won arbitration.
    pub winning_strategy: WinningStrategy,
    /// The winner's adjusted score (0 when no strategy is valid).
    pub base_score: f64,
    /// Attenuated display-name bonus in `[0, 2]`.
    pub name_bonus: f64,
    /// `min(12, base + bonus)`.
    pub total_score: f64,
    /// Classification of the winning evaluation.
    pub match_type: MatchType,
}

impl MainScore {
    /// The evaluation the classification and penalty view are read from.
    ///
    /// When no strategy is valid this is the name_search evaluation, kept
    /// for structure; downstream only trusts it when `found_count > 0`.
    #[must_use]
    pub const fn winning_eval(&self) -> &FieldEvaluation {
        match self.winning_strategy {
            WinningStrategy::NoSpace => &self.no_space,
            WinningStrategy::NameSearch | WinningStrategy::None => &self.name_search,
        }
    }
}

/// Score one candidate's name fields against the preprocessed query.
#[must_use]
pub fn score_candidate(
    forms: &QueryForms,
    candidate: &Candidate,
    synonyms: &SynonymTable,
    max_distance: usize,
) -> MainScore {
    let name_search = FieldEvaluation::evaluate(
        &forms.words_cleaned,
        &Candidate::tokens_of(&candidate.name_search),
        &forms.cleaned,
        synonyms,
        max_distance,
    );
    let no_space = FieldEvaluation::evaluate(
        &forms.words_no_space,
        &Candidate::tokens_of(&candidate.name_no_space),
        &forms.no_space,
        synonyms,
        max_distance,
    );
    let name = FieldEvaluation::evaluate(
        &forms.words_original,
        &Candidate::tokens_of(&candidate.name),
        &forms.original,
        synonyms,
        max_distance,
    );

    let name_search_score = adjusted_field_score(&name_search, false);
    let no_space_score = adjusted_field_score(&no_space, true);

    let name_search_valid = name_search_score > 0.0 && name_search.found_count > 0;
    let no_space_valid = no_space_score > 0.0 && no_space.found_count > 0;

    // Strict comparison: on an exact tie the with-spaces reading wins
    let (winning_strategy, base_score) =
        if no_space_valid && (!name_search_valid || no_space_score > name_search_score) {
            (WinningStrategy::NoSpace, no_space_score)
        } else if name_search_valid {
            (WinningStrategy::NameSearch, name_search_score)
        } else {
            (WinningStrategy::None, 0.0)
        };

    let name_bonus = compute_name_bonus(&name, forms.words_original.len());
    let total_score = (base_score + name_bonus).min(TOTAL_SCORE_CEILING);

    let winning_eval = match winning_strategy {
        WinningStrategy::NoSpace => &no_space,
        WinningStrategy::NameSearch | WinningStrategy::None => &name_search,
    };
    let match_type = classify(winning_strategy, winning_eval, total_score);

    MainScore {
        name_search,
        no_space,
        name,
        name_search_score,
        no_space_score,
        winning_strategy,
        base_score,
        name_bonus,
        total_score,
        match_type,
    }
}

/// Distance-and-penalty adjusted score for one field evaluation.
#[allow(clippy::cast_precision_loss)] // distances are single-digit sums
fn adjusted_field_score(eval: &FieldEvaluation, is_no_space: bool) -> f64 {
    if eval.found_count == 0 {
        return 0.0;
    }

    let raw = (RAW_BASE_SCORE - eval.total_distance as f64).clamp(0.0, RAW_BASE_SCORE);
    let penalty = MISSING_TOKEN_PENALTY * eval.missing() as f64
        + AVG_DISTANCE_PENALTY * eval.average_distance.max(0.0)
        + LENGTH_RATIO_PENALTY * (1.0 - eval.length_ratio.clamp(0.0, 1.0))
        + EXTRA_LENGTH_PENALTY * eval.extra_length_ratio * 10.0;
    let adjusted = (raw - penalty).max(0.0);

    if is_no_space && adjusted < NO_SPACE_FLOOR {
        0.0
    } else {
        adjusted
    }
}

/// Per-match bonus weight by edit distance.
const fn bonus_weight(distance: usize) -> f64 {
    match distance {
        0 => 1.0,
        1 => 0.7,
        2 => 0.4,
        _ => 0.2,
    }
}

/// Display-name bonus: rewards candidates whose visible `name` closely
/// mirrors what the user typed, attenuated as the word counts diverge.
#[allow(clippy::cast_precision_loss)]
fn compute_name_bonus(eval: &FieldEvaluation, query_word_count: usize) -> f64 {
    let q = query_word_count;
    let r = eval.result_count;
    let word_count_ratio = if r == 0 {
        0.0
    } else {
        q.min(r) as f64 / q.max(r) as f64
    };
    let extra_ratio = eval.extra_length_ratio;

    if word_count_ratio < NAME_BONUS_MIN_WORD_RATIO || extra_ratio > NAME_BONUS_MAX_EXTRA_RATIO {
        return 0.0;
    }

    let weighted: f64 = eval.found.iter().map(|m| bonus_weight(m.distance)).sum();
    let base = weighted / q.max(1) as f64 * 2.0;
    let deductions = 0.3 * eval.missing() as f64
        + 0.35 * eval.average_distance.max(0.0)
        + 2.0 * extra_ratio * 0.6;
    let bonus = (base - deductions).clamp(0.0, NAME_BONUS_MAX);

    let attenuation = ((word_count_ratio - NAME_BONUS_MIN_WORD_RATIO)
        / (1.0 - NAME_BONUS_MIN_WORD_RATIO))
        .clamp(0.0, 1.0);
    bonus * attenuation
}

/// Match-type table over the winning evaluation.
fn classify(winner: WinningStrategy, eval: &FieldEvaluation, total_score: f64) -> MatchType {
    if eval.found_count == 0 {
        return MatchType::Partial;
    }
    let exact = eval.total_distance == 0;
    let complete = eval.missing() == 0;

    match (exact, complete) {
        (true, true) => match winner {
            WinningStrategy::NoSpace => MatchType::NoSpaceMatch,
            WinningStrategy::NameSearch | WinningStrategy::None => MatchType::ExactWithExtras,
        },
        (true, false) => MatchType::ExactWithMissing,
        (false, true) if total_score >= NEAR_PERFECT_THRESHOLD => MatchType::NearPerfect,
        (false, true) => MatchType::FuzzyFull,
        (false, false) => MatchType::FuzzyPartial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FrenchNormalizer;
    use crate::query::preprocess;
    use serde_json::json;

    fn candidate(name: &str, name_search: &str, name_no_space: &str) -> Candidate {
        serde_json::from_value(json!({
            "id": 1,
            "name": name,
            "name_search": name_search,
            "name_no_space": name_no_space,
        }))
        .unwrap()
    }

    fn score(query: &str, c: &Candidate) -> MainScore {
        let forms = preprocess(query, &FrenchNormalizer);
        score_candidate(&forms, c, &SynonymTable::new(), 4)
    }

    // ── arbitration ─────────────────────────────────────────────────────

    #[test]
    fn exact_tie_goes_to_name_search() {
        let c = candidate("Paris", "paris", "paris");
        let m = score("paris", &c);
        assert_eq!(m.winning_strategy, WinningStrategy::NameSearch);
        assert_eq!(m.match_type, MatchType::ExactWithExtras);
        assert!((m.base_score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn no_space_wins_when_strictly_better() {
        let c = candidate("Saint Jean", "saint jean", "saintjean");
        let m = score("saintjean", &c);
        assert_eq!(m.winning_strategy, WinningStrategy::NoSpace);
        assert_eq!(m.match_type, MatchType::NoSpaceMatch);
        assert!((m.base_score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn no_strategy_valid_means_none() {
        let c = candidate("Marseille", "marseille", "marseille");
        let m = score("zzzzzzzzzzzzzzzz", &c);
        assert_eq!(m.winning_strategy, WinningStrategy::None);
        assert!(m.base_score.abs() < f64::EPSILON);
        assert_eq!(m.match_type, MatchType::Partial);
    }

    // ── adjusted field score ────────────────────────────────────────────

    #[test]
    fn no_space_floor_keeps_exactly_seven() {
        // Distance 2, no other penalties: 8 − 0.5·2 = 7.0 exactly
        let c = candidate("Saintjeanxx", "x", "saintjeanxx");
        let m = score("saintjean", &c);
        assert!((m.no_space_score - 7.0).abs() < 1e-9);
        assert_eq!(m.winning_strategy, WinningStrategy::NoSpace);
    }

    #[test]
    fn no_space_floor_zeroes_below_seven() {
        // Distance 3: 7 − 1.5 = 5.5 < 7.0 → zeroed
        let c = candidate("Saintjeanxxx", "x", "saintjeanxxx");
        let m = score("saintjean", &c);
        assert!(m.no_space_score.abs() < f64::EPSILON);
        assert_ne!(m.winning_strategy, WinningStrategy::NoSpace);
    }

    #[test]
    fn typo_costs_raw_and_average_penalty() {
        let c = candidate("Paris", "paris", "paris");
        let m = score("pariss", &c);
        // raw 9, average-distance penalty 0.5
        assert!((m.name_search_score - 8.5).abs() < 1e-9);
        assert_eq!(m.match_type, MatchType::NearPerfect);
    }

    #[test]
    fn extras_penalize_name_search() {
        let c = candidate("Saint Jean", "saint jean", "saintjean");
        let m = score("saintjean", &c);
        // raw 6 − (avg 2.0 + length 0.5 + extras 0.15·(4/9)·10)
        assert!((m.name_search_score - (6.0 - 2.0 - 0.5 - 0.15 * (4.0 / 9.0) * 10.0)).abs() < 1e-9);
    }

    // ── name bonus ──────────────────────────────────────────────────────

    #[test]
    fn perfect_name_earns_full_bonus() {
        let c = candidate("Paris", "paris", "paris");
        let m = score("paris", &c);
        assert!((m.name_bonus - 2.0).abs() < 1e-9);
        assert!((m.total_score - 12.0).abs() < 1e-9);
    }

    #[test]
    fn bonus_withheld_on_word_count_mismatch() {
        // 1 query word vs 4 name words → ratio 1/4 < 0.4
        let c = candidate("Saint Jean de Luz", "saint jean de luz", "saintjeandeluz");
        let m = score("saint", &c);
        assert!(m.name_bonus.abs() < f64::EPSILON);
    }

    #[test]
    fn bonus_shrinks_with_distance() {
        let c = candidate("Paris", "paris", "paris");
        let m = score("pariss", &c);
        // weight 0.7 → base 1.4, minus 0.35 average-distance deduction
        assert!((m.name_bonus - 1.05).abs() < 1e-9);
        assert!((m.total_score - 9.55).abs() < 1e-9);
    }

    #[test]
    fn total_score_capped_at_twelve() {
        let c = candidate("Paris", "paris", "paris");
        let m = score("paris", &c);
        assert!(m.total_score <= TOTAL_SCORE_CEILING + f64::EPSILON);
    }

    // ── classification ──────────────────────────────────────────────────

    #[test]
    fn missing_tokens_with_exact_matches() {
        let c = candidate("Saint", "saint", "saint");
        let m = score("saint zzzzzzzzzz", &c);
        assert_eq!(m.match_type, MatchType::ExactWithMissing);
    }

    #[test]
    fn fuzzy_and_incomplete_is_fuzzy_partial() {
        let c = candidate("Sainte Marie", "sainte marie", "saintemarie");
        let m = score("saintt zzzzzzzzzz", &c);
        assert_eq!(m.match_type, MatchType::FuzzyPartial);
    }

    #[test]
    fn fuzzy_full_below_near_perfect_threshold() {
        // Distance 4 on the only token: total well under 8.0
        let c = candidate("Bordeaux", "bordeaux", "bordeaux");
        let m = score("bordot", &c);
        assert_eq!(m.match_type, MatchType::FuzzyFull);
        assert!(m.total_score < NEAR_PERFECT_THRESHOLD);
    }

    // ── match type metadata ─────────────────────────────────────────────

    #[test]
    fn priorities_follow_the_table() {
        assert_eq!(MatchType::ExactFull.priority(), 0);
        assert_eq!(MatchType::NoSpaceMatch.priority(), 1);
        assert_eq!(MatchType::ExactWithExtras.priority(), 1);
        assert_eq!(MatchType::NearPerfect.priority(), 2);
        assert_eq!(MatchType::PhoneticStrict.priority(), 3);
        assert_eq!(MatchType::ExactWithMissing.priority(), 4);
        assert_eq!(MatchType::FuzzyFull.priority(), 5);
        assert_eq!(MatchType::Hybrid.priority(), 6);
        assert_eq!(MatchType::PhoneticTolerant.priority(), 7);
        assert_eq!(MatchType::FuzzyPartial.priority(), 8);
        assert_eq!(MatchType::Partial.priority(), 9);
    }

    #[test]
    fn match_type_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&MatchType::NoSpaceMatch).unwrap(),
            "\"no_space_match\""
        );
        assert_eq!(
            serde_json::to_string(&MatchType::ExactFull).unwrap(),
            "\"exact_full\""
        );
        assert_eq!(MatchType::Hybrid.to_string(), "hybrid");
    }
}
