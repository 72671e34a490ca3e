//! Bidirectional synonym equivalence classes.
//!
//! Registration is expressed as `base → {synonyms}`, but matching is
//! symmetric: every member of `{base} ∪ {synonyms}` is equivalent to every
//! other. Internally the table keeps a `token → class id` map next to the
//! member sets, so the aligner's equivalence check is O(1) instead of a
//! scan over every class.
//!
//! Members are lowercased and deduplicated on registration. Classes that
//! come to share a token are merged into one. Iteration order is the
//! registration order (the determinism guarantee forbids hash order).

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

/// Runtime-replaceable synonym table.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    class_of: HashMap<String, usize>,
    classes: Vec<IndexSet<String>>,
}

impl SynonymTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an ordered `base → synonyms` map.
    #[must_use]
    pub fn from_map(map: &IndexMap<String, Vec<String>>) -> Self {
        let mut table = Self::new();
        for (base, synonyms) in map {
            table.register(base, synonyms.iter().map(String::as_str));
        }
        table
    }

    /// Register one equivalence class: `base` plus its synonyms.
    ///
    /// Members are lowercased and deduplicated. If any member already
    /// belongs to a class, the classes are merged.
    pub fn register<'a>(&mut self, base: &str, synonyms: impl IntoIterator<Item = &'a str>) {
        let mut members: IndexSet<String> = IndexSet::new();
        members.insert(base.trim().to_lowercase());
        for synonym in synonyms {
            members.insert(synonym.trim().to_lowercase());
        }
        members.retain(|m| !m.is_empty());
        if members.is_empty() {
            return;
        }

        // Merge into the earliest existing class touched by any member
        let target = members
            .iter()
            .filter_map(|m| self.class_of.get(m).copied())
            .min();

        let class_id = match target {
            Some(id) => id,
            None => {
                self.classes.push(IndexSet::new());
                self.classes.len() - 1
            }
        };

        // Absorb other classes these members already belong to
        let absorbed: Vec<usize> = members
            .iter()
            .filter_map(|m| self.class_of.get(m).copied())
            .filter(|&id| id != class_id)
            .collect();
        for old_id in absorbed {
            let moved = std::mem::take(&mut self.classes[old_id]);
            for token in moved {
                self.class_of.insert(token.clone(), class_id);
                self.classes[class_id].insert(token);
            }
        }

        for member in members {
            self.class_of.insert(member.clone(), class_id);
            self.classes[class_id].insert(member);
        }
    }

    /// Whether two tokens belong to the same equivalence class.
    ///
    /// Tokens are lowercased before lookup; unknown tokens never match.
    #[must_use]
    pub fn same_class(&self, a: &str, b: &str) -> bool {
        let Some(&class_a) = self.class_of.get(&a.to_lowercase()) else {
            return false;
        };
        self.class_of.get(&b.to_lowercase()) == Some(&class_a)
    }

    /// Export as an ordered `base → synonyms` map (first member of each
    /// class is the base).
    #[must_use]
    pub fn to_map(&self) -> IndexMap<String, Vec<String>> {
        self.classes
            .iter()
            .filter(|class| !class.is_empty())
            .map(|class| {
                let mut members = class.iter().cloned();
                let base = members.next().unwrap_or_default();
                (base, members.collect())
            })
            .collect()
    }

    /// Number of (non-empty) equivalence classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.iter().filter(|c| !c.is_empty()).count()
    }

    /// Whether the table holds no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
