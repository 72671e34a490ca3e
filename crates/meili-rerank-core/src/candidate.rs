//! Candidate model: the raw hits returned by the index oracle.
//!
//! The index returns heterogeneous flat records. The fields the engine
//! scores are declared; everything else rides along in a flattened
//! passthrough map and is returned to the caller untouched. A missing
//! attribute is equivalent to an empty string — never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw hit from the index oracle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Primary identifier (string or number in the index).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Establishment identifier, used when `id` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_etab: Option<Value>,
    /// Display name (scored for the name bonus).
    #[serde(default)]
    pub name: String,
    /// Cleaned, tokenized name (primary scoring field).
    #[serde(default)]
    pub name_search: String,
    /// Name with spaces removed (no-space strategy field).
    #[serde(default)]
    pub name_no_space: String,
    /// Space-separated phonetic codes for the name.
    #[serde(default)]
    pub name_soundex: String,
    /// Any further attributes the index stored; passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Candidate {
    /// Dedup and tie-break key: `id` if present, else `id_etab`.
    ///
    /// Returns `None` when the hit carries neither — such hits are dropped
    /// during deduplication.
    #[must_use]
    pub fn dedup_key(&self) -> Option<String> {
        self.id
            .as_ref()
            .or(self.id_etab.as_ref())
            .map(render_id)
    }

    /// String rendering of `id` for ranking tie-breaks (empty if absent).
    #[must_use]
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(render_id).unwrap_or_default()
    }

    /// String rendering of `id_etab` for ranking tie-breaks (empty if absent).
    #[must_use]
    pub fn id_etab_string(&self) -> String {
        self.id_etab.as_ref().map(render_id).unwrap_or_default()
    }

    /// Lowercased whitespace tokens of one of the scored name fields.
    #[must_use]
    pub fn tokens_of(field: &str) -> Vec<String> {
        field
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Meilisearch ids arrive as strings or numbers; both render to the same
/// key space.
fn render_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
