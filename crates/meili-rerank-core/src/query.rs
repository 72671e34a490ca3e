//! Query preprocessing and per-request options.
//!
//! [`preprocess`] turns raw user input into the four query forms every
//! downstream stage consumes. An all-whitespace query produces the empty
//! [`QueryForms`]; callers detect `is_empty()` and short-circuit to the
//! sentinel reply without touching the index.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::Normalizer;

/// The normalized forms of one user query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryForms {
    /// Lowercased, whitespace-collapsed input (accents preserved).
    pub original: String,
    /// Accent-folded, punctuation-stripped matching form.
    pub cleaned: String,
    /// The cleaned form with spaces removed.
    pub no_space: String,
    /// Space-separated phonetic codes (possibly empty).
    pub soundex: String,
    /// Tokens of `original`.
    pub words_original: Vec<String>,
    /// Tokens of `cleaned`.
    pub words_cleaned: Vec<String>,
    /// Single-element sequence holding `no_space` (empty when the query is).
    pub words_no_space: Vec<String>,
    /// Character count of `original`.
    pub original_length: usize,
    /// Character count of `cleaned`.
    pub cleaned_length: usize,
    /// Character count of `no_space`.
    pub no_space_length: usize,
}

impl QueryForms {
    /// The empty-query sentinel condition.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.original_length == 0
    }
}

/// Build [`QueryForms`] from raw user input.
#[must_use]
pub fn preprocess(raw: &str, normalizer: &dyn Normalizer) -> QueryForms {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return QueryForms::default();
    }

    let original = normalizer.normalize_query(trimmed);
    let cleaned = normalizer.clean_user_query(trimmed);
    let no_space: String = cleaned.chars().filter(|c| !c.is_whitespace()).collect();
    let soundex = normalizer.soundex_fr(trimmed);

    let words_original = tokenize(&original);
    let words_cleaned = tokenize(&cleaned);
    let words_no_space = if no_space.is_empty() {
        Vec::new()
    } else {
        vec![no_space.clone()]
    };

    QueryForms {
        original_length: original.chars().count(),
        cleaned_length: cleaned.chars().count(),
        no_space_length: no_space.chars().count(),
        original,
        cleaned,
        no_space,
        soundex,
        words_original,
        words_cleaned,
        words_no_space,
    }
}

/// Split on whitespace runs, discarding empty tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}

/// Per-request search options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of hits in the reply (final truncation).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Per-request Levenshtein ceiling. Negative values are clamped to 0,
    /// never rejected.
    #[serde(default = "default_max_distance")]
    pub max_distance: i64,
    /// Opaque filter expression, forwarded to the index unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
}

const fn default_limit() -> usize {
    10
}

const fn default_max_distance() -> i64 {
    4
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            max_distance: default_max_distance(),
            filters: None,
        }
    }
}

impl SearchOptions {
    /// Set the reply truncation limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the per-request Levenshtein ceiling.
    #[must_use]
    pub const fn with_max_distance(mut self, max_distance: i64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Set the opaque index filter.
    #[must_use]
    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    /// The clamped edit-distance ceiling actually used for alignment.
    #[must_use]
    pub fn effective_max_distance(&self) -> usize {
        usize::try_from(self.max_distance.max(0)).unwrap_or_default()
    }
}
