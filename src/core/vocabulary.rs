// File: src/core/vocabulary.rs
use crate::core::freq_map::FrequencyMap;
use crate::core::types::Term;
use std::collections::BTreeSet;

/// Every disease surface form discovered in the first pass plus the manual
/// seeds. Built once after extraction has finished for the whole corpus.
///
/// Kept sorted so lookups iterate in a reproducible order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterVocabulary {
    terms: BTreeSet<Term>,
}

impl MasterVocabulary {
    pub fn build<'a, M, S>(maps: M, seeds: S) -> Self
    where
        M: IntoIterator<Item = &'a FrequencyMap>,
        S: IntoIterator<Item = &'a Term>,
    {
        let mut terms = BTreeSet::new();
        for map in maps {
            terms.extend(map.keys().cloned());
        }
        terms.extend(seeds.into_iter().map(|s| s.to_uppercase()));
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term> + '_ {
        self.terms.iter()
    }

    /// Terms containing a space.
    pub fn phrases(&self) -> impl Iterator<Item = &Term> + '_ {
        self.terms.iter().filter(|t| is_phrase(t))
    }

    pub fn words(&self) -> impl Iterator<Item = &Term> + '_ {
        self.terms.iter().filter(|t| !is_phrase(t))
    }
}

pub(crate) fn is_phrase(term: &str) -> bool {
    term.contains(' ')
}
