// File: src/core/predictor.rs
use crate::core::concepts::ConceptMap;
use crate::core::freq_map::FrequencyMap;
use crate::core::types::{Confidence, Prediction, Term, MAX_PREDICTIONS};
use std::cmp::Reverse;
use tracing::debug;

/// The most frequent terms of one field and their confidence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopK {
    pub terms: Vec<Term>,
    pub confidence: Option<Confidence>,
}

/// Picks the highest-count term plus any directly following terms that tie
/// with it, up to three. A tie that would need a fourth slot is cut, never
/// expanded. The picked terms come back in map order.
pub fn top_k(map: &FrequencyMap) -> TopK {
    let mut ranked: Vec<(&Term, u32)> = map.iter().collect();
    ranked.sort_by_key(|&(_, count)| Reverse(count));

    let Some(&(_, best)) = ranked.first() else {
        return TopK::default();
    };
    let picked: Vec<&Term> = ranked
        .iter()
        .take_while(|&&(_, count)| count == best)
        .take(MAX_PREDICTIONS)
        .map(|&(term, _)| term)
        .collect();

    let terms: Vec<Term> = map.keys().filter(|t| picked.contains(t)).cloned().collect();
    let confidence = Confidence::for_selected(terms.len());
    TopK { terms, confidence }
}

/// Combines the title and description top-k into the record prediction.
///
/// When both fields have entries, the prediction is the title's picks that
/// also appear among the description's picks, by identity or shared
/// concept, with full confidence. Without any agreement the title's own
/// result stands.
pub fn predict(title: &FrequencyMap, description: &FrequencyMap, concepts: &ConceptMap) -> Prediction {
    let (terms, confidence) = match (title.is_empty(), description.is_empty()) {
        (true, true) => (Vec::new(), None),
        (false, true) => split(top_k(title)),
        (true, false) => split(top_k(description)),
        (false, false) => {
            let title_top = top_k(title);
            let description_top = top_k(description);

            let agreed: Vec<Term> = title_top
                .terms
                .iter()
                .filter(|t| {
                    description_top
                        .terms
                        .iter()
                        .any(|d| *t == d || concepts.same_concept(t, d))
                })
                .cloned()
                .collect();

            if agreed.is_empty() {
                debug!(title = ?title_top.terms, description = ?description_top.terms, "fields disagree, using title");
                split(title_top)
            } else {
                (agreed, Some(Confidence::CERTAIN))
            }
        }
    };
    Prediction::new(terms, confidence)
}

fn split(top: TopK) -> (Vec<Term>, Option<Confidence>) {
    (top.terms, top.confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(p: &Prediction) -> Vec<Option<&str>> {
        p.diseases.iter().map(|d| d.as_deref()).collect()
    }

    #[test]
    fn single_winner_is_certain() {
        let p = predict(&FrequencyMap::from([("DIABETES", 3)]), &FrequencyMap::new(), &ConceptMap::new());
        assert_eq!(names(&p), vec![Some("DIABETES"), None, None]);
        assert_eq!(p.confidence, Some(Confidence(100)));
    }

    #[test]
    fn tie_keeps_map_order() {
        let top = top_k(&FrequencyMap::from([("ASTHMA", 1), ("COPD", 2), ("CANCER", 2)]));
        assert_eq!(top.terms, vec!["COPD", "CANCER"]);
        assert_eq!(top.confidence, Some(Confidence(90)));
    }

    #[test]
    fn tie_follows_original_order_not_rank() {
        let top = top_k(&FrequencyMap::from([("GOUT", 1), ("LUPUS", 4), ("ASTHMA", 4), ("COPD", 4)]));
        assert_eq!(top.terms, vec!["LUPUS", "ASTHMA", "COPD"]);
        assert_eq!(top.confidence, Some(Confidence(80)));
    }

    #[test]
    fn tie_beyond_three_is_cut() {
        let top = top_k(&FrequencyMap::from([("A", 2), ("B", 2), ("C", 2), ("D", 2)]));
        assert_eq!(top.terms, vec!["A", "B", "C"]);
    }

    #[test]
    fn empty_map_has_no_confidence() {
        assert_eq!(top_k(&FrequencyMap::new()), TopK::default());
        let p = predict(&FrequencyMap::new(), &FrequencyMap::new(), &ConceptMap::new());
        assert!(p.is_empty());
        assert_eq!(p.confidence, None);
    }

    #[test]
    fn description_only_uses_description() {
        let p = predict(&FrequencyMap::new(), &FrequencyMap::from([("COPD", 2), ("CANCER", 2)]), &ConceptMap::new());
        assert_eq!(names(&p), vec![Some("COPD"), Some("CANCER"), None]);
        assert_eq!(p.confidence, Some(Confidence(90)));
    }

    #[test]
    fn agreement_by_concept_is_certain() {
        let concepts = ConceptMap::from([("TUMOR", "C1"), ("NEOPLASM", "C1")]);
        let title = FrequencyMap::from([("TUMOR", 1), ("ASTHMA", 1)]);
        let desc = FrequencyMap::from([("NEOPLASM", 4)]);
        let p = predict(&title, &desc, &concepts);
        assert_eq!(names(&p), vec![Some("TUMOR"), None, None]);
        assert_eq!(p.confidence, Some(Confidence(100)));
    }

    #[test]
    fn title_term_matching_twice_appears_once() {
        let concepts = ConceptMap::from([("TUMOR", "C1"), ("NEOPLASM", "C1")]);
        let title = FrequencyMap::from([("TUMOR", 2), ("ASTHMA", 2)]);
        let desc = FrequencyMap::from([("NEOPLASM", 4), ("TUMOR", 4), ("ASTHMA", 4)]);
        let p = predict(&title, &desc, &concepts);
        assert_eq!(names(&p), vec![Some("TUMOR"), Some("ASTHMA"), None]);
        assert_eq!(p.confidence, Some(Confidence(100)));
    }

    #[test]
    fn disagreement_falls_back_to_title() {
        let title = FrequencyMap::from([("ASTHMA", 1), ("GOUT", 1)]);
        let desc = FrequencyMap::from([("LUPUS", 3)]);
        let p = predict(&title, &desc, &ConceptMap::new());
        assert_eq!(names(&p), vec![Some("ASTHMA"), Some("GOUT"), None]);
        assert_eq!(p.confidence, Some(Confidence(90)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    const POOL: [&str; 6] = ["TUMOR", "NEOPLASM", "ASTHMA", "GOUT", "COPD", "LUPUS"];

    fn arb_map() -> impl Strategy<Value = FrequencyMap> {
        proptest::collection::vec((0..POOL.len(), 1u32..4), 0..8)
            .prop_map(|pairs| pairs.into_iter().map(|(i, c)| (POOL[i].to_string(), c)).collect::<FrequencyMap>())
    }

    fn arb_concepts() -> impl Strategy<Value = ConceptMap> {
        proptest::collection::vec(proptest::option::of(0u8..3), POOL.len()).prop_map(|ids| {
            let mut concepts = ConceptMap::new();
            for (term, id) in POOL.iter().zip(ids) {
                if let Some(id) = id {
                    concepts.record(term.to_string(), format!("C{}", id));
                }
            }
            concepts
        })
    }

    /// Concept id when mapped, the term itself otherwise.
    fn identities<'a>(terms: impl Iterator<Item = &'a Term>, concepts: &ConceptMap) -> BTreeSet<String> {
        terms.map(|t| concepts.get(t).cloned().unwrap_or_else(|| t.clone())).collect()
    }

    proptest! {
        #[test]
        fn top_k_picks_tied_maxima_in_map_order(map in arb_map()) {
            let top = top_k(&map);
            prop_assert!(top.terms.len() <= MAX_PREDICTIONS);
            prop_assert_eq!(top.confidence, Confidence::for_selected(top.terms.len()));
            prop_assert_eq!(top.terms.is_empty(), map.is_empty());

            let best = map.iter().map(|(_, c)| c).max();
            for term in &top.terms {
                prop_assert_eq!(map.get(term), best);
            }

            let positions: Vec<usize> = top
                .terms
                .iter()
                .filter_map(|t| map.keys().position(|k| k == t))
                .collect();
            prop_assert_eq!(positions.len(), top.terms.len());
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn consensus_is_symmetric_on_concept_identity(
            title in arb_map(),
            description in arb_map(),
            concepts in arb_concepts(),
        ) {
            let title_ids = identities(top_k(&title).terms.iter(), &concepts);
            let description_ids = identities(top_k(&description).terms.iter(), &concepts);
            let shared: BTreeSet<String> = title_ids.intersection(&description_ids).cloned().collect();
            prop_assume!(!shared.is_empty());

            let forward = predict(&title, &description, &concepts);
            let backward = predict(&description, &title, &concepts);
            prop_assert_eq!(forward.confidence, Some(Confidence::CERTAIN));
            prop_assert_eq!(backward.confidence, Some(Confidence::CERTAIN));
            prop_assert_eq!(identities(forward.terms(), &concepts), shared.clone());
            prop_assert_eq!(identities(backward.terms(), &concepts), shared);
        }
    }
}
