//! Hybrid fuzzy re-ranking engine for Meilisearch candidate sets
//!
//! This crate re-scores candidates returned by an external full-text
//! index. The index is an opaque oracle behind the [`SearchIndex`] trait;
//! everything else — multi-strategy discovery, greedy token alignment,
//! penalty-based field scoring, French-phonetic overlap, hybrid score
//! blending, deterministic ranking, and a TTL result cache — lives here.
//!
//! The pipeline for one call:
//!
//! ```text
//! raw query → preprocess → StrategyRunner (→ index × N) → dedup
//!           → per hit: field evaluations + main score + phonetic score
//!           → final combination + exact cap → rank → cache → reply
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use meili_rerank_core::{RerankEngine, SearchOptions};
//!
//! let engine = RerankEngine::new();
//! let reply = engine.search(&index, "saint jean", &SearchOptions::default())?;
//! for hit in &reply.hits {
//!     println!("{} {:.2} {}", hit.candidate.name, hit.score, hit.match_type);
//! }
//! ```

#![forbid(unsafe_code)]

pub mod align;
pub mod cache;
pub mod candidate;
pub mod distance;
pub mod engine;
pub mod error;
pub mod field_eval;
pub mod fusion;
pub mod normalize;
pub mod oracle;
pub mod phonetic;
pub mod query;
pub mod rank;
pub mod results;
pub mod scoring;
pub mod strategy;
pub mod synonyms;

// Re-export key types
pub use align::{Alignment, MatchKind, WordMatch, align};
pub use cache::{
    CacheConfig, CacheStats, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECONDS, ResultCache,
};
pub use candidate::Candidate;
pub use distance::{bounded_levenshtein, dynamic_max};
pub use engine::RerankEngine;
pub use error::{EngineResult, SearchError};
pub use field_eval::{FieldEvaluation, PenaltyIndices};
pub use fusion::{
    CombinedScore, EXACT_CAP, EXACT_THRESHOLD, ScoringMethod, ScoringWeights, apply_exact_cap,
    combine,
};
pub use normalize::{FrenchNormalizer, Normalizer};
pub use oracle::{OracleQuery, SearchIndex};
pub use phonetic::{PhoneticScore, score_phonetic};
pub use query::{QueryForms, SearchOptions, preprocess};
pub use rank::{RankOutcome, compare_hits, rank};
pub use results::{ScoredHit, SearchReply};
pub use scoring::{MainScore, MatchType, WinningStrategy, score_candidate};
pub use strategy::{DiscoveredCandidate, Strategy, discover_candidates, fetch_limit};
pub use synonyms::SynonymTable;
