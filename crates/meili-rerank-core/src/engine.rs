//! The re-ranking engine: orchestration and admin surface.
//!
//! One search call is a straight pipeline: preprocess → cache probe →
//! multi-strategy discovery → per-hit scoring (three field evaluations,
//! phonetic overlap, final combination, exact cap) → deterministic
//! ranking → cache store. All scoring is pure over the hit and the query;
//! the only shared mutable state is the synonym table and the result
//! cache, both engine-owned and lock-guarded. The per-request edit
//! distance ceiling travels down the call stack, so concurrent calls with
//! different ceilings cannot observe each other.
//!
//! Failures from the index abort the whole call and never reach the
//! cache.

use std::sync::RwLock;
use std::time::Instant;

use indexmap::IndexMap;
use tracing::debug;

use crate::cache::{CacheConfig, CacheStats, ResultCache};
use crate::error::EngineResult;
use crate::fusion::{apply_exact_cap, combine};
use crate::normalize::{FrenchNormalizer, Normalizer};
use crate::oracle::SearchIndex;
use crate::phonetic::score_phonetic;
use crate::query::{QueryForms, SearchOptions, preprocess};
use crate::rank::rank;
use crate::results::{ScoredHit, SearchReply};
use crate::scoring::{MatchType, score_candidate};
use crate::strategy::{DiscoveredCandidate, discover_candidates};
use crate::synonyms::SynonymTable;

/// Hybrid fuzzy re-ranking engine over an opaque index oracle.
pub struct RerankEngine {
    normalizer: Box<dyn Normalizer>,
    synonyms: RwLock<SynonymTable>,
    cache: ResultCache,
}

impl Default for RerankEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RerankEngine {
    /// Engine with the French normalizer, no synonyms, default cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cache_config(CacheConfig::default())
    }

    /// Engine with a custom cache configuration.
    #[must_use]
    pub fn with_cache_config(cache_config: CacheConfig) -> Self {
        Self {
            normalizer: Box::new(FrenchNormalizer),
            synonyms: RwLock::new(SynonymTable::new()),
            cache: ResultCache::new(cache_config),
        }
    }

    /// Swap the normalizer (e.g. for a different language profile).
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Box<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Run one search against the given index.
    pub fn search(
        &self,
        index: &dyn SearchIndex,
        raw_query: &str,
        options: &SearchOptions,
    ) -> EngineResult<SearchReply> {
        let started = Instant::now();

        let forms = preprocess(raw_query, self.normalizer.as_ref());
        if forms.is_empty() {
            debug!("empty query, returning sentinel reply");
            return Ok(SearchReply::empty_query());
        }

        let cache_key = ResultCache::key(raw_query, options)?;
        if let Some(reply) = self.cache.get(&cache_key) {
            debug!(query = %forms.cleaned, "serving reply from cache");
            return Ok(reply);
        }

        let discovered = discover_candidates(index, &forms, options)?;
        let total_before_filter = discovered.len();
        debug!(
            query = %forms.cleaned,
            candidates = total_before_filter,
            "discovery complete"
        );

        let max_distance = options.effective_max_distance();
        let synonyms = self
            .synonyms
            .read()
            .map(|table| table.clone())
            .unwrap_or_default();

        let scored: Vec<ScoredHit> = discovered
            .into_iter()
            .map(|hit| score_hit(hit, &forms, &synonyms, max_distance))
            .collect();

        let outcome = rank(scored, options.limit);

        let reply = SearchReply {
            total: outcome.hits.len(),
            hits: outcome.hits,
            has_exact_results: outcome.has_exact_results,
            exact_count: outcome.exact_count,
            total_before_filter,
            query_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            preprocessing: Some(forms),
            from_cache: false,
            error: None,
        };

        self.cache.put(cache_key, reply.clone());
        Ok(reply)
    }

    // ── Admin API ───────────────────────────────────────────────────────

    /// Replace the synonym table wholesale.
    pub fn set_synonyms(&self, map: &IndexMap<String, Vec<String>>) {
        if let Ok(mut table) = self.synonyms.write() {
            *table = SynonymTable::from_map(map);
        }
    }

    /// Export the current synonym classes.
    #[must_use]
    pub fn get_synonyms(&self) -> IndexMap<String, Vec<String>> {
        self.synonyms
            .read()
            .map(|table| table.to_map())
            .unwrap_or_default()
    }

    /// Drop every cached reply.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Cache occupancy and traffic counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Score one discovered candidate into a reply-ready hit.
fn score_hit(
    discovered: DiscoveredCandidate,
    forms: &QueryForms,
    synonyms: &SynonymTable,
    max_distance: usize,
) -> ScoredHit {
    let mut candidate = discovered.candidate;

    let main = score_candidate(forms, &candidate, synonyms, max_distance);
    let phonetic = score_phonetic(&forms.soundex, &candidate.name_soundex);
    let mut combined = combine(&main, phonetic.as_ref());

    // The upstream exact-match path pre-tags hits; the tag is the only
    // thing allowed through the exact cap.
    if take_upstream_exact_tag(&mut candidate) {
        combined.match_type = MatchType::ExactFull;
    }

    let (score, capped) = apply_exact_cap(combined.score, combined.match_type);

    ScoredHit {
        score,
        match_type: combined.match_type,
        match_priority: combined.match_type.priority(),
        scoring_method: combined.method,
        scoring_weights: combined.weights,
        phonetic_details: phonetic,
        capped,
        penalty_indices: main.winning_eval().penalties(),
        discovery_strategy: discovered.discovery_strategy,
        candidate,
    }
}

/// Pop a pre-set `_match_type` attribute off the candidate (it would
/// collide with the engine's own key on serialization) and report whether
/// it carried the reserved `exact_full` tag.
fn take_upstream_exact_tag(candidate: &mut crate::candidate::Candidate) -> bool {
    candidate
        .extra
        .shift_remove("_match_type")
        .and_then(|value| value.as_str().map(str::to_owned))
        .is_some_and(|tag| tag == "exact_full")
}
