// File: src/core/extractor.rs
use crate::core::concepts::ConceptMap;
use crate::core::freq_map::FrequencyMap;
use crate::core::types::{Entity, EntityLabel, Term};
use std::collections::HashSet;

/// Counts entities of `target` label per uppercased surface form, skipping
/// anything in `exclude`.
///
/// Disease mentions that carry at least one candidate concept also write
/// their top candidate into `concepts`, overwriting any earlier mapping.
pub fn extract_frequencies(
    entities: &[Entity],
    exclude: &HashSet<Term>,
    target: &EntityLabel,
    concepts: &mut ConceptMap,
) -> FrequencyMap {
    let mut counts = FrequencyMap::new();

    for entity in entities.iter().filter(|e| &e.label == target) {
        let term = entity.normalized();
        if exclude.contains(&term) {
            continue;
        }
        counts.increment(&term);

        if *target == EntityLabel::Disease {
            if let Some(concept) = entity.top_concept() {
                concepts.record(term, concept.clone());
            }
        }
    }

    counts
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_entity() -> impl Strategy<Value = Entity> {
        (
            prop_oneof![Just("asthma"), Just("Asthma"), Just("pain"), Just("Gout"), Just("COPD")],
            prop_oneof![Just(EntityLabel::Disease), Just(EntityLabel::Chemical)],
            proptest::option::of(prop_oneof![Just("C1"), Just("C2")]),
        )
            .prop_map(|(text, label, concept)| {
                let entity = Entity::new(text, label);
                match concept {
                    Some(c) => entity.with_concepts(&[c]),
                    None => entity,
                }
            })
    }

    fn arb_exclude() -> impl Strategy<Value = HashSet<Term>> {
        proptest::collection::hash_set(
            prop_oneof![Just("ASTHMA".to_string()), Just("PAIN".to_string()), Just("GOUT".to_string())],
            0..3,
        )
    }

    proptest! {
        #[test]
        fn excluded_terms_never_reach_output(
            entities in proptest::collection::vec(arb_entity(), 0..12),
            exclude in arb_exclude(),
        ) {
            let mut concepts = ConceptMap::new();
            let map = extract_frequencies(&entities, &exclude, &EntityLabel::Disease, &mut concepts);

            for (term, _) in map.iter() {
                prop_assert!(!exclude.contains(term));
            }
            for term in &exclude {
                prop_assert!(!concepts.contains(term));
            }

            let kept = entities
                .iter()
                .filter(|e| e.label == EntityLabel::Disease && !exclude.contains(&e.normalized()))
                .count();
            prop_assert_eq!(map.iter().map(|(_, c)| c as usize).sum::<usize>(), kept);
        }
    }
}
