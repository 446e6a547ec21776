// File: src/core/resolver.rs
//! Second-pass lookup of the master vocabulary in raw text, for fields the
//! recognizer found nothing in.

use crate::core::freq_map::FrequencyMap;
use crate::core::types::{Term, Token};
use crate::core::vocabulary::{is_phrase, MasterVocabulary};

/// Literal token text that never counts as a single-word match.
const MILLIMETRE: &str = "mm";

struct Hit {
    term: Term,
    count: i64,
    offset: usize,
}

/// Scans `text` (and its `tokens`) for every vocabulary term and returns the
/// corrected counts, ordered by first occurrence in the text.
///
/// Phrases are counted by case-insensitive substring search. Single words are
/// counted on non-stop tokens. Overlaps are then corrected so a mention is
/// claimed by the longest phrase that contains it: phrase-in-phrase first,
/// then word-in-phrase. Terms left with a count of zero or less are dropped.
pub fn manual_lookup(tokens: &[Token], text: &str, vocabulary: &MasterVocabulary) -> FrequencyMap {
    let upper = text.to_uppercase();
    let mut hits: Vec<Hit> = Vec::new();

    let phrase_counts = vocabulary.phrases().map(|term| (term, upper.matches(term.as_str()).count()));
    let word_counts = vocabulary.words().map(|term| {
        let count = tokens
            .iter()
            .filter(|tok| !tok.is_stop && tok.text != MILLIMETRE && tok.text.to_uppercase() == *term)
            .count();
        (term, count)
    });

    for (term, count) in phrase_counts.chain(word_counts) {
        if count > 0 {
            hits.push(Hit {
                term: term.clone(),
                count: count as i64,
                offset: upper.find(term.as_str()).unwrap_or(usize::MAX),
            });
        }
    }

    // stable: phrases stay ahead of words that start at the same offset
    hits.sort_by_key(|h| h.offset);

    correct_nested_phrases(&mut hits);
    hits.retain(|h| h.count > 0);

    correct_phrase_words(&mut hits);
    hits.retain(|h| h.count > 0);

    hits.into_iter().map(|h| (h.term, h.count as u32)).collect()
}

/// A phrase inside a longer phrase loses the longer phrase's count.
fn correct_nested_phrases(hits: &mut [Hit]) {
    for i in 0..hits.len() {
        if !is_phrase(&hits[i].term) {
            continue;
        }
        for j in 0..hits.len() {
            if i != j && is_phrase(&hits[j].term) && hits[i].term.contains(hits[j].term.as_str()) {
                let claimed = hits[i].count;
                hits[j].count -= claimed;
            }
        }
    }
}

/// A single word that is one of a phrase's words loses the phrase's count.
fn correct_phrase_words(hits: &mut [Hit]) {
    for i in 0..hits.len() {
        if !is_phrase(&hits[i].term) {
            continue;
        }
        let phrase = hits[i].term.clone();
        let claimed = hits[i].count;
        for hit in hits.iter_mut() {
            if phrase.split(' ').any(|w| w == hit.term) {
                hit.count -= claimed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::tokenize;
    use std::collections::HashSet;

    fn vocab(terms: &[&str]) -> MasterVocabulary {
        let seeds: Vec<Term> = terms.iter().map(|t| t.to_string()).collect();
        MasterVocabulary::build(std::iter::empty::<&FrequencyMap>(), &seeds)
    }

    fn lookup(text: &str, terms: &[&str]) -> FrequencyMap {
        let stop: HashSet<String> = ["of", "the", "and", "in", "with"].iter().map(|s| s.to_string()).collect();
        manual_lookup(&tokenize(text, &stop), text, &vocab(terms))
    }

    #[test]
    fn word_inside_phrase_is_not_double_counted() {
        let text = "Breast cancer screening. Breast cancer risk. Breast cancer care.";
        let map = lookup(text, &["BREAST CANCER", "CANCER"]);
        assert_eq!(map, FrequencyMap::from([("BREAST CANCER", 3)]));
    }

    #[test]
    fn standalone_word_survives_correction() {
        let text = "Cancer outcomes in breast cancer and lung cancer.";
        let map = lookup(text, &["BREAST CANCER", "LUNG CANCER", "CANCER"]);
        // 3 CANCER tokens minus one per phrase
        assert_eq!(map, FrequencyMap::from([("CANCER", 1), ("BREAST CANCER", 1), ("LUNG CANCER", 1)]));
    }

    #[test]
    fn nested_phrase_loses_outer_count() {
        let text = "Triple negative breast cancer cohort";
        let map = lookup(text, &["TRIPLE NEGATIVE BREAST CANCER", "BREAST CANCER"]);
        assert_eq!(map, FrequencyMap::from([("TRIPLE NEGATIVE BREAST CANCER", 1)]));
    }

    #[test]
    fn ordered_by_first_occurrence() {
        let text = "Asthma follows influenza; influenza precedes asthma and gout.";
        let map = lookup(text, &["GOUT", "INFLUENZA", "ASTHMA"]);
        assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec!["ASTHMA", "INFLUENZA", "GOUT"]);
        assert_eq!(map.get("ASTHMA"), Some(2));
    }

    #[test]
    fn skips_stop_words_and_millimetre_tokens() {
        let text = "Tumours of 5 mm and the MM cohort";
        let map = lookup(text, &["MM", "THE"]);
        assert_eq!(map, FrequencyMap::from([("MM", 1)]));
    }

    #[test]
    fn no_hits_is_empty() {
        assert!(lookup("Nothing relevant here", &["GOUT", "LUNG CANCER"]).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::recognizer::{default_stop_words, tokenize};
    use proptest::prelude::*;

    const WORDS: [&str; 7] = ["breast", "cancer", "lung", "gout", "asthma", "of", "the"];
    const TERMS: [&str; 6] = ["BREAST CANCER", "LUNG CANCER", "CANCER", "GOUT", "ASTHMA", "BREAST"];

    fn arb_text() -> impl Strategy<Value = String> {
        proptest::collection::vec(0..WORDS.len(), 0..16)
            .prop_map(|idx| idx.into_iter().map(|i| WORDS[i]).collect::<Vec<_>>().join(" "))
    }

    fn arb_vocab() -> impl Strategy<Value = MasterVocabulary> {
        proptest::collection::vec(any::<bool>(), TERMS.len()).prop_map(|keep| {
            let seeds: Vec<Term> = TERMS
                .iter()
                .zip(keep)
                .filter(|(_, k)| *k)
                .map(|(t, _)| t.to_string())
                .collect();
            MasterVocabulary::build(std::iter::empty::<&FrequencyMap>(), &seeds)
        })
    }

    proptest! {
        #[test]
        fn lookup_counts_are_positive_and_in_offset_order(text in arb_text(), vocab in arb_vocab()) {
            let tokens = tokenize(&text, &default_stop_words());
            let map = manual_lookup(&tokens, &text, &vocab);
            let upper = text.to_uppercase();

            let mut last = 0;
            for (term, count) in map.iter() {
                prop_assert!(count > 0);
                prop_assert!(vocab.iter().any(|t| t == term));
                let offset = upper.find(term.as_str());
                prop_assert!(offset.is_some());
                let offset = offset.unwrap_or_default();
                prop_assert!(offset >= last);
                last = offset;
            }
        }
    }
}
