// File: src/core/freq_map.rs
use crate::core::types::Term;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered association from surface form to occurrence count.
///
/// Iteration follows first-insertion order. That order feeds the tie-breaks
/// in top-k selection, so every transformation keeps it unless it sorts
/// explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(Term, u32)>", into = "Vec<(Term, u32)>")]
pub struct FrequencyMap {
    order: Vec<Term>,
    counts: HashMap<Term, u32>,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<u32> {
        self.counts.get(term).copied()
    }

    pub fn contains_key(&self, term: &str) -> bool {
        self.counts.contains_key(term)
    }

    /// Adds one occurrence, appending the term if it is new.
    pub fn increment(&mut self, term: &str) {
        self.add(term, 1);
    }

    pub fn add(&mut self, term: &str, count: u32) {
        match self.counts.get_mut(term) {
            Some(existing) => *existing += count,
            None => {
                self.order.push(term.to_string());
                self.counts.insert(term.to_string(), count);
            }
        }
    }

    /// Sets the count, keeping the original position of an existing term.
    pub fn insert(&mut self, term: Term, count: u32) {
        if self.counts.insert(term.clone(), count).is_none() {
            self.order.push(term);
        }
    }

    pub fn remove(&mut self, term: &str) -> Option<u32> {
        let count = self.counts.remove(term)?;
        self.order.retain(|t| t != term);
        Some(count)
    }

    /// Renames `from` to `to` in place. When `to` already exists the counts
    /// are summed at the position of whichever came first.
    pub fn rename(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        let Some(count) = self.counts.remove(from) else {
            return;
        };
        match self.counts.get_mut(to) {
            Some(existing) => {
                *existing += count;
                let from_pos = self.order.iter().position(|t| t == from);
                let to_pos = self.order.iter().position(|t| t == to);
                if let (Some(f), Some(t)) = (from_pos, to_pos) {
                    if f < t {
                        self.order[f] = to.to_string();
                        self.order.remove(t);
                    } else {
                        self.order.remove(f);
                    }
                }
            }
            None => {
                self.counts.insert(to.to_string(), count);
                if let Some(slot) = self.order.iter_mut().find(|t| t.as_str() == from) {
                    *slot = to.to_string();
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, u32)> + '_ {
        self.order.iter().map(move |t| (t, self.counts[t]))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Term> + '_ {
        self.order.iter()
    }
}

impl FromIterator<(Term, u32)> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = (Term, u32)>>(iter: I) -> Self {
        let mut map = FrequencyMap::new();
        for (term, count) in iter {
            map.insert(term, count);
        }
        map
    }
}

impl From<Vec<(Term, u32)>> for FrequencyMap {
    fn from(pairs: Vec<(Term, u32)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<FrequencyMap> for Vec<(Term, u32)> {
    fn from(map: FrequencyMap) -> Self {
        let FrequencyMap { order, mut counts } = map;
        order
            .into_iter()
            .map(|t| {
                let c = counts.remove(&t).unwrap_or_default();
                (t, c)
            })
            .collect()
    }
}

impl<const N: usize> From<[(&str, u32); N]> for FrequencyMap {
    fn from(pairs: [(&str, u32); N]) -> Self {
        pairs.into_iter().map(|(t, c)| (t.to_string(), c)).collect()
    }
}
