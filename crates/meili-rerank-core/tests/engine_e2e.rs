//! End-to-end scenarios for the re-ranking engine.
//!
//! Drives the full pipeline against stub oracles serving literal
//! candidate lists: exact matches, typos, no-space queries, phonetic
//! rescue, hybrid blending, the exact-only policy, and the cache/dedup
//! behaviors that depend on the whole call path.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use meili_rerank_core::engine::RerankEngine;
use meili_rerank_core::error::EngineResult;
use meili_rerank_core::oracle::{OracleQuery, SearchIndex};
use meili_rerank_core::query::SearchOptions;
use meili_rerank_core::scoring::MatchType;
use meili_rerank_core::strategy::Strategy;
use meili_rerank_core::{Candidate, ScoringMethod};
use serde_json::{Value, json};

// ═══════════════════════════════════════════════════════════════════════
// Mock infrastructure
// ═══════════════════════════════════════════════════════════════════════

/// Serves canned hits, optionally restricted per searchable attribute,
/// and records every call.
struct StubIndex {
    /// `(attribute, candidate)` pairs; an empty attribute serves all.
    hits: Vec<(&'static str, Value)>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl StubIndex {
    fn serving_all(hits: Vec<Value>) -> Self {
        Self {
            hits: hits.into_iter().map(|h| ("", h)).collect(),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    fn per_attribute(hits: Vec<(&'static str, Value)>) -> Self {
        Self {
            hits,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl SearchIndex for StubIndex {
    fn search(&self, query: &str, params: &OracleQuery) -> EngineResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.queries.lock().unwrap().push(query.to_owned());
        Ok(self
            .hits
            .iter()
            .filter(|(attribute, _)| {
                attribute.is_empty()
                    || params.searchable_attributes.contains(&(*attribute).to_owned())
            })
            .map(|(_, value)| serde_json::from_value(value.clone()).unwrap())
            .collect())
    }
}

fn paris() -> Value {
    json!({
        "id": 1,
        "name": "Paris",
        "name_search": "paris",
        "name_no_space": "paris",
        "name_soundex": "P620"
    })
}

fn saint_jean() -> Value {
    json!({
        "id": 7,
        "name": "Saint Jean",
        "name_search": "saint jean",
        "name_no_space": "saintjean",
        "name_soundex": "S535 J500"
    })
}

fn bordeaux() -> Value {
    json!({
        "id": 3,
        "name": "Bordeaux",
        "name_search": "bordeaux",
        "name_no_space": "bordeaux",
        "name_soundex": "B630"
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Core scenarios
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn exact_single_token_match_caps_at_nine_ninety_nine() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![paris()]);

    let reply = engine
        .search(&index, "paris", &SearchOptions::default())
        .unwrap();

    assert_eq!(reply.total, 1);
    let hit = &reply.hits[0];
    assert_eq!(hit.match_type, MatchType::ExactWithExtras);
    assert_eq!(hit.match_priority, 1);
    // Perfect field score plus the full name bonus exceeds 10, so the cap fires
    assert!((hit.score - 9.99).abs() < 1e-9);
    assert!(hit.capped);
    assert!(!reply.has_exact_results);
    assert_eq!(reply.preprocessing.as_ref().unwrap().cleaned, "paris");
}

#[test]
fn one_letter_typo_scores_between_zero_and_cap() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![paris()]);

    let reply = engine
        .search(&index, "pariss", &SearchOptions::default())
        .unwrap();

    let hit = &reply.hits[0];
    assert_eq!(hit.match_type, MatchType::NearPerfect);
    assert!(hit.score > 0.0 && hit.score < 9.99);
    assert!((hit.score - 9.55).abs() < 1e-9);
    assert!(!hit.capped);
}

#[test]
fn concatenated_query_wins_through_no_space_strategy() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![saint_jean()]);

    let reply = engine
        .search(&index, "saintjean", &SearchOptions::default())
        .unwrap();

    let hit = &reply.hits[0];
    assert_eq!(hit.match_type, MatchType::NoSpaceMatch);
    assert_eq!(hit.match_priority, 1);
    // Perfect no-space alignment: capped from 10.0
    assert!((hit.score - 9.99).abs() < 1e-9);
    assert!(hit.capped);
    // The winning field had no extras and no distance
    assert!(hit.penalty_indices.extra_length_ratio.abs() < f64::EPSILON);
    assert!(hit.penalty_indices.average_distance.abs() < f64::EPSILON);
}

#[test]
fn phonetic_rescue_of_weak_text_match() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![bordeaux()]);

    let reply = engine
        .search(&index, "bordôt", &SearchOptions::default())
        .unwrap();

    let hit = &reply.hits[0];
    assert_eq!(hit.scoring_method, ScoringMethod::PhoneticFallback);
    assert_eq!(hit.match_type, MatchType::PhoneticStrict);
    assert!((hit.score - 7.5).abs() < 1e-9);

    let details = hit.phonetic_details.as_ref().unwrap();
    assert!((details.ratio - 1.0).abs() < 1e-9);
}

#[test]
fn hybrid_blend_stays_in_the_convex_hull() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![bordeaux()]);

    let reply = engine
        .search(&index, "bordeu", &SearchOptions::default())
        .unwrap();

    let hit = &reply.hits[0];
    assert_eq!(hit.scoring_method, ScoringMethod::Weighted);
    assert_eq!(hit.match_type, MatchType::Hybrid);

    let weights = hit.scoring_weights.unwrap();
    assert!((weights.text + weights.phonetic - 1.0).abs() < 1e-9);
    assert!(weights.text > weights.phonetic, "text dominates the blend");

    // Blend must land between the textual and phonetic sub-scores
    let phonetic_score = hit.phonetic_details.as_ref().unwrap().score;
    assert!(hit.score > 6.0 && hit.score < phonetic_score + 1e-9);
}

#[test]
fn exact_only_policy_suppresses_fuzzy_hits() {
    let engine = RerankEngine::new();
    let mut tagged = paris();
    tagged["_match_type"] = json!("exact_full");
    let other = json!({
        "id": 2,
        "name": "Parisot",
        "name_search": "parisot",
        "name_no_space": "parisot",
        "name_soundex": "P623"
    });
    let index = StubIndex::serving_all(vec![tagged, other]);

    let reply = engine
        .search(&index, "paris", &SearchOptions::default())
        .unwrap();

    assert!(reply.has_exact_results);
    assert_eq!(reply.exact_count, 1);
    assert_eq!(reply.total, 1);
    assert_eq!(reply.total_before_filter, 2);
    let hit = &reply.hits[0];
    assert_eq!(hit.match_type, MatchType::ExactFull);
    assert!(hit.score >= 10.0 - 1e-9);
}

// ═══════════════════════════════════════════════════════════════════════
// Boundary behaviors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn empty_query_sentinel_without_index_traffic() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![paris()]);

    let reply = engine
        .search(&index, "  \t ", &SearchOptions::default())
        .unwrap();

    assert!(reply.hits.is_empty());
    assert_eq!(reply.total, 0);
    assert_eq!(reply.query_time_ms, 0);
    assert!(!reply.from_cache);
    assert!(!reply.has_exact_results);
    assert_eq!(reply.error.as_deref(), Some("Empty query"));
    assert_eq!(index.call_count(), 0);
}

#[test]
fn zero_max_distance_disables_fuzzy_matching() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![paris()]);
    let options = SearchOptions::default().with_max_distance(0);

    // Exact query still matches perfectly
    let exact = engine.search(&index, "paris", &options).unwrap();
    assert_eq!(exact.hits[0].match_type, MatchType::ExactWithExtras);

    // A typo finds nothing textually; only the phonetic path survives
    let typo = engine.search(&index, "pariss", &options).unwrap();
    let hit = &typo.hits[0];
    assert_eq!(hit.scoring_method, ScoringMethod::PhoneticFallback);
    assert_eq!(hit.match_type, MatchType::PhoneticStrict);
}

#[test]
fn negative_max_distance_is_clamped_not_rejected() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![paris()]);
    let options = SearchOptions::default().with_max_distance(-5);

    let reply = engine.search(&index, "paris", &options).unwrap();
    assert_eq!(reply.hits[0].match_type, MatchType::ExactWithExtras);
}

#[test]
fn missing_soundex_never_blends_or_falls_back() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![json!({
        "id": 3,
        "name": "Bordeaux",
        "name_search": "bordeaux",
        "name_no_space": "bordeaux",
        "name_soundex": ""
    })]);

    let reply = engine
        .search(&index, "bordôt", &SearchOptions::default())
        .unwrap();

    let hit = &reply.hits[0];
    assert_eq!(hit.scoring_method, ScoringMethod::TextOnly);
    assert!(hit.phonetic_details.is_none());
    assert!(hit.scoring_weights.is_none());
}

#[test]
fn no_space_score_at_exactly_seven_is_kept() {
    let engine = RerankEngine::new();
    // Two extra characters on the concatenated form: distance 2,
    // adjusted score exactly 7.0 — on the floor, not below it
    let index = StubIndex::serving_all(vec![json!({
        "id": 4,
        "name": "Saintjeanxx",
        "name_search": "x",
        "name_no_space": "saintjeanxx",
        "name_soundex": ""
    })]);

    let reply = engine
        .search(&index, "saintjean", &SearchOptions::default())
        .unwrap();

    let hit = &reply.hits[0];
    // Base 7.0 from the no-space field plus a 0.1 name bonus
    assert!((hit.score - 7.1).abs() < 1e-9);
    assert_eq!(hit.match_type, MatchType::FuzzyFull);
    // The penalty view proves the no-space evaluation won (distance 2)
    assert!((hit.penalty_indices.average_distance - 2.0).abs() < f64::EPSILON);
}

#[test]
fn no_space_score_below_seven_is_zeroed() {
    let engine = RerankEngine::new();
    // Distance 3 on the concatenated form: 5.5 < 7.0, so the no-space
    // strategy is discarded entirely
    let index = StubIndex::serving_all(vec![json!({
        "id": 5,
        "name": "Saintjeanxxx",
        "name_search": "x",
        "name_no_space": "saintjeanxxx",
        "name_soundex": ""
    })]);

    let reply = engine
        .search(&index, "saintjean", &SearchOptions::default())
        .unwrap();

    let hit = &reply.hits[0];
    assert!(hit.score < 7.0);
    assert_ne!(hit.match_type, MatchType::NoSpaceMatch);
}

// ═══════════════════════════════════════════════════════════════════════
// Discovery, dedup, cache
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn duplicate_hits_keep_the_first_strategy() {
    let engine = RerankEngine::new();
    let index = StubIndex::per_attribute(vec![
        ("name_no_space", saint_jean()),
        ("name", saint_jean()),
        ("name_soundex", saint_jean()),
    ]);

    let reply = engine
        .search(&index, "saintjean", &SearchOptions::default())
        .unwrap();

    assert_eq!(reply.total, 1);
    assert_eq!(reply.total_before_filter, 1);
    // name_search produced nothing, so no_space is the first discoverer
    assert_eq!(reply.hits[0].discovery_strategy, Strategy::NoSpace);
}

#[test]
fn limit_truncates_after_ranking() {
    let engine = RerankEngine::new();
    let hits: Vec<Value> = (0..6)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("Paris {i}"),
                "name_search": format!("paris {i}"),
                "name_no_space": format!("paris{i}"),
                "name_soundex": "P620"
            })
        })
        .collect();
    let index = StubIndex::serving_all(hits);

    let reply = engine
        .search(&index, "paris", &SearchOptions::default().with_limit(2))
        .unwrap();

    assert_eq!(reply.hits.len(), 2);
    assert_eq!(reply.total, 2);
    assert_eq!(reply.total_before_filter, 6);
    // Equal scores and penalties: id ascending decides
    assert_eq!(reply.hits[0].candidate.id_string(), "0");
    assert_eq!(reply.hits[1].candidate.id_string(), "1");
}

#[test]
fn cached_reply_is_verbatim_with_from_cache_flag() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![paris(), bordeaux()]);
    let options = SearchOptions::default();

    let first = engine.search(&index, "paris", &options).unwrap();
    let calls = index.call_count();

    let second = engine.search(&index, "paris", &options).unwrap();
    assert_eq!(index.call_count(), calls, "cache hit must not touch the index");
    assert!(second.from_cache);
    assert!(!first.from_cache);
    assert_eq!(second.total, first.total);
    assert_eq!(second.hits.len(), first.hits.len());
    for (a, b) in first.hits.iter().zip(&second.hits) {
        assert_eq!(a.candidate.id_string(), b.candidate.id_string());
        assert!((a.score - b.score).abs() < 1e-12);
    }
}

#[test]
fn deterministic_replies_across_repeated_calls() {
    let engine = RerankEngine::new();
    let index = StubIndex::serving_all(vec![bordeaux(), paris(), saint_jean()]);
    let options = SearchOptions::default();

    let baseline = engine.search(&index, "saint jean", &options).unwrap();
    let baseline_ids: Vec<String> = baseline
        .hits
        .iter()
        .map(|h| h.candidate.id_string())
        .collect();

    for _ in 0..5 {
        engine.clear_cache();
        let reply = engine.search(&index, "saint jean", &options).unwrap();
        let ids: Vec<String> = reply.hits.iter().map(|h| h.candidate.id_string()).collect();
        assert_eq!(ids, baseline_ids);
    }
}

#[test]
fn synonym_alignment_is_symmetric_end_to_end() {
    let engine = RerankEngine::new();
    let mut map = indexmap::IndexMap::new();
    map.insert("a".to_owned(), vec!["b".to_owned(), "c".to_owned()]);
    engine.set_synonyms(&map);

    for query in ["a", "b", "c"] {
        for name in ["a", "b", "c"] {
            engine.clear_cache();
            let index = StubIndex::serving_all(vec![json!({
                "id": 1,
                "name": name,
                "name_search": name,
                "name_no_space": name,
                "name_soundex": ""
            })]);
            let reply = engine
                .search(&index, query, &SearchOptions::default())
                .unwrap();
            let hit = &reply.hits[0];
            assert!(
                hit.penalty_indices.average_distance.abs() < f64::EPSILON,
                "{query} vs {name} should align at distance 0"
            );
            assert_eq!(hit.match_type, MatchType::ExactWithExtras);
        }
    }
}
