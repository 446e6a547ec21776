// File: src/core/augmenter.rs
use crate::core::freq_map::FrequencyMap;
use crate::core::types::{Term, Token};
use std::collections::HashSet;

/// Adds forced-vocabulary tokens the recognizer missed.
///
/// A tallied term is added only when it is entirely absent from `existing`;
/// counts for terms the recognizer already found are left alone.
pub fn add_missed_diseases(tokens: &[Token], mut existing: FrequencyMap, forced: &HashSet<Term>) -> FrequencyMap {
    let mut tallied = FrequencyMap::new();
    for token in tokens {
        let upper = token.text.to_uppercase();
        if forced.contains(&upper) {
            tallied.increment(&upper);
        }
    }

    for (term, count) in tallied.iter() {
        if !existing.contains_key(term) {
            existing.insert(term.clone(), count);
        }
    }
    existing
}
