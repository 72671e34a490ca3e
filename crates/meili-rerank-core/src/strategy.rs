//! Multi-strategy candidate discovery and deduplication.
//!
//! The index is asked up to four times, each time with a different
//! transformation of the query restricted to the matching attribute.
//! Strategies run in a fixed order; when the same record surfaces through
//! several of them, the first strategy keeps it — the discovery tag is a
//! ranking-relevant signal and must not depend on map iteration order.
//!
//! Hits without any identifier cannot be deduplicated and are dropped.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidate::Candidate;
use crate::error::EngineResult;
use crate::oracle::{OracleQuery, SearchIndex};
use crate::query::{QueryForms, SearchOptions};

/// Minimum per-strategy fetch size.
pub const FETCH_MIN: usize = 20;

/// Maximum per-strategy fetch size.
pub const FETCH_MAX: usize = 200;

/// Over-fetch factor applied to the request limit.
pub const FETCH_MULTIPLIER: usize = 3;

/// One of the four ways the engine asks the index for candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Cleaned query against the cleaned name field.
    NameSearch,
    /// Concatenated query against the concatenated name field.
    NoSpace,
    /// Original query against the display name.
    Standard,
    /// Phonetic codes against the phonetic name field.
    Phonetic,
}

impl Strategy {
    /// The fixed discovery (and dedup-precedence) order.
    pub const DISCOVERY_ORDER: [Self; 4] =
        [Self::NameSearch, Self::NoSpace, Self::Standard, Self::Phonetic];

    /// The single searchable attribute this strategy restricts to.
    #[must_use]
    pub const fn searchable_attribute(self) -> &'static str {
        match self {
            Self::NameSearch => "name_search",
            Self::NoSpace => "name_no_space",
            Self::Standard => "name",
            Self::Phonetic => "name_soundex",
        }
    }

    /// The query variant this strategy sends to the index.
    ///
    /// The name_search strategy falls back to the original form when
    /// cleaning stripped the query to nothing.
    #[must_use]
    pub fn query_variant<'forms>(self, forms: &'forms QueryForms) -> &'forms str {
        match self {
            Self::NameSearch => {
                if forms.cleaned.is_empty() {
                    &forms.original
                } else {
                    &forms.cleaned
                }
            }
            Self::NoSpace => &forms.no_space,
            Self::Standard => &forms.original,
            Self::Phonetic => &forms.soundex,
        }
    }

    /// The wire tag (snake_case, identical to the serde rendering).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameSearch => "name_search",
            Self::NoSpace => "no_space",
            Self::Standard => "standard",
            Self::Phonetic => "phonetic",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate together with the strategy that first produced it.
#[derive(Debug, Clone)]
pub struct DiscoveredCandidate {
    /// The raw index record.
    pub candidate: Candidate,
    /// Highest-priority strategy that returned it.
    pub discovery_strategy: Strategy,
}

/// Per-strategy oracle limit: over-fetch so the re-ranker sees a wider
/// pool than the final truncation.
#[must_use]
pub const fn fetch_limit(request_limit: usize) -> usize {
    let scaled = request_limit.saturating_mul(FETCH_MULTIPLIER);
    if scaled < FETCH_MIN {
        FETCH_MIN
    } else if scaled > FETCH_MAX {
        FETCH_MAX
    } else {
        scaled
    }
}

/// Run every applicable strategy and deduplicate the merged hits.
///
/// Any oracle error aborts the whole call — partial success is not
/// defined for discovery.
pub fn discover_candidates(
    index: &dyn SearchIndex,
    forms: &QueryForms,
    options: &SearchOptions,
) -> EngineResult<Vec<DiscoveredCandidate>> {
    let limit = fetch_limit(options.limit);
    let mut tagged: Vec<DiscoveredCandidate> = Vec::new();

    for strategy in Strategy::DISCOVERY_ORDER {
        let variant = strategy.query_variant(forms);
        if variant.is_empty() {
            debug!(strategy = %strategy, "skipping strategy with empty query variant");
            continue;
        }

        let params = OracleQuery {
            limit,
            searchable_attributes: vec![strategy.searchable_attribute().to_owned()],
            filter: options.filters.clone(),
        };
        let hits = index.search(variant, &params)?;
        debug!(strategy = %strategy, hits = hits.len(), "strategy returned candidates");

        tagged.extend(hits.into_iter().map(|candidate| DiscoveredCandidate {
            candidate,
            discovery_strategy: strategy,
        }));
    }

    Ok(deduplicate(tagged))
}

/// First occurrence wins; the input is already in strategy-precedence
/// order. Identifier-less hits are dropped.
fn deduplicate(tagged: Vec<DiscoveredCandidate>) -> Vec<DiscoveredCandidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for hit in tagged {
        let Some(key) = hit.candidate.dedup_key() else {
            debug!("dropping candidate without id or id_etab");
            continue;
        };
        if seen.insert(key) {
            unique.push(hit);
        }
    }

    unique
}
