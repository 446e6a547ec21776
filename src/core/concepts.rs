// File: src/core/concepts.rs
use crate::core::types::{ConceptId, Term};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Corpus-wide disease surface form -> concept id.
///
/// Grows monotonically during the extraction pass. A later write for the
/// same surface form replaces the earlier one, so the final assignment
/// depends on corpus scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMap {
    concepts: HashMap<Term, ConceptId>,
}

impl ConceptMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, term: Term, concept: ConceptId) {
        self.concepts.insert(term, concept);
    }

    pub fn get(&self, term: &str) -> Option<&ConceptId> {
        self.concepts.get(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.concepts.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// True when both terms are mapped and resolve to the same concept.
    pub fn same_concept(&self, a: &str, b: &str) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Replays another map's writes on top of this one. Absorbing per-record
    /// maps in record order reproduces the sequential scan.
    pub fn absorb(&mut self, other: ConceptMap) {
        self.concepts.extend(other.concepts);
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ConceptMap {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut map = ConceptMap::new();
        for (term, concept) in pairs {
            map.record(term.to_string(), concept.to_string());
        }
        map
    }
}
