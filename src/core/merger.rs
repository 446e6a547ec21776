// File: src/core/merger.rs
use crate::core::concepts::ConceptMap;
use crate::core::freq_map::FrequencyMap;
use crate::core::types::{ConceptId, Term};
use std::collections::HashMap;

/// Collapses synonyms that resolve to the same concept.
///
/// Counts are summed per concept and keyed by the first term (in map order)
/// mapped to it. Unmapped terms stay their own group. Maps with at most one
/// entry are returned unchanged.
pub fn merge_synonyms(map: &FrequencyMap, concepts: &ConceptMap) -> FrequencyMap {
    if map.len() <= 1 {
        return map.clone();
    }

    let mut merged = FrequencyMap::new();
    let mut representatives: HashMap<&ConceptId, &Term> = HashMap::new();

    for (term, count) in map.iter() {
        match concepts.get(term) {
            Some(concept) => {
                let rep = *representatives.entry(concept).or_insert(term);
                merged.add(rep, count);
            }
            None => merged.add(term, count),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concepts() -> ConceptMap {
        ConceptMap::from([
            ("TUMOR", "C0027651"),
            ("NEOPLASM", "C0027651"),
            ("TUMOUR", "C0027651"),
            ("ASTHMA", "C0004096"),
        ])
    }

    #[test]
    fn synonyms_collapse_onto_earliest_variant() {
        let map = FrequencyMap::from([("ASTHMA", 1), ("NEOPLASM", 2), ("GOUT", 1), ("TUMOR", 3)]);
        let merged = merge_synonyms(&map, &concepts());
        assert_eq!(merged, FrequencyMap::from([("ASTHMA", 1), ("NEOPLASM", 5), ("GOUT", 1)]));
    }

    #[test]
    fn merging_is_idempotent() {
        let map = FrequencyMap::from([("TUMOUR", 1), ("TUMOR", 1), ("ASTHMA", 2)]);
        let once = merge_synonyms(&map, &concepts());
        assert_eq!(merge_synonyms(&once, &concepts()), once);
    }

    #[test]
    fn singleton_is_untouched() {
        let map = FrequencyMap::from([("TUMOR", 4)]);
        assert_eq!(merge_synonyms(&map, &concepts()), map);
    }
}
