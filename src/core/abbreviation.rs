// File: src/core/abbreviation.rs
use crate::core::freq_map::FrequencyMap;
use crate::core::types::{AbbreviationPair, Term};
use tracing::debug;

/// Folds abbreviation counts into their long forms, per field.
///
/// A field is only touched when it has more than one entry, and a pair only
/// applies when both forms are keys of that field's map. Abbreviations
/// collapsed in the description are additionally renamed to their long form
/// wherever they remain as title keys.
pub fn collapse_abbreviations(
    mut title: FrequencyMap,
    mut description: FrequencyMap,
    title_pairs: &[AbbreviationPair],
    description_pairs: &[AbbreviationPair],
) -> (FrequencyMap, FrequencyMap) {
    let description_collapsed = collapse_field(&mut description, description_pairs);
    collapse_field(&mut title, title_pairs);

    if !title.is_empty() {
        for (short, long) in &description_collapsed {
            title.rename(short, long);
        }
    }

    (title, description)
}

/// Returns the (abbreviation, long form) pairs that were collapsed.
fn collapse_field(map: &mut FrequencyMap, pairs: &[AbbreviationPair]) -> Vec<(Term, Term)> {
    let mut collapsed = Vec::new();
    if map.len() <= 1 {
        return collapsed;
    }

    for pair in pairs {
        let short = pair.short_form.to_uppercase();
        let long = pair.long_form.to_uppercase();
        if short == long || !map.contains_key(&long) {
            continue;
        }
        if let Some(count) = map.remove(&short) {
            debug!(abbreviation = %short, long_form = %long, count, "collapsed abbreviation");
            map.add(&long, count);
            collapsed.push((short, long));
        }
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aml() -> Vec<AbbreviationPair> {
        vec![AbbreviationPair::new("AML", "acute myeloid leukemia")]
    }

    #[test]
    fn abbreviation_count_moves_into_long_form() {
        let desc = FrequencyMap::from([("AML", 2), ("ACUTE MYELOID LEUKEMIA", 1)]);
        let (_, desc) = collapse_abbreviations(FrequencyMap::new(), desc, &[], &aml());
        assert_eq!(desc, FrequencyMap::from([("ACUTE MYELOID LEUKEMIA", 3)]));
    }

    #[test]
    fn needs_both_forms_present() {
        let desc = FrequencyMap::from([("AML", 2), ("ANEMIA", 1)]);
        let (_, out) = collapse_abbreviations(FrequencyMap::new(), desc.clone(), &[], &aml());
        assert_eq!(out, desc);
    }

    #[test]
    fn singleton_fields_are_left_alone() {
        let title = FrequencyMap::from([("AML", 1)]);
        let (out, _) = collapse_abbreviations(title.clone(), FrequencyMap::new(), &aml(), &[]);
        assert_eq!(out, title);
    }

    #[test]
    fn description_collapse_renames_title_keys() {
        let title = FrequencyMap::from([("AML", 1)]);
        let desc = FrequencyMap::from([("ACUTE MYELOID LEUKEMIA", 1), ("AML", 4)]);
        let (title, desc) = collapse_abbreviations(title, desc, &[], &aml());
        assert_eq!(title, FrequencyMap::from([("ACUTE MYELOID LEUKEMIA", 1)]));
        assert_eq!(desc, FrequencyMap::from([("ACUTE MYELOID LEUKEMIA", 5)]));
    }

    #[test]
    fn title_remap_sums_into_existing_long_form() {
        let title = FrequencyMap::from([("AML", 1), ("GOUT", 1), ("ACUTE MYELOID LEUKEMIA", 2)]);
        let desc = FrequencyMap::from([("AML", 1), ("ACUTE MYELOID LEUKEMIA", 1)]);
        let (title, _) = collapse_abbreviations(title, desc, &[], &aml());
        assert_eq!(title, FrequencyMap::from([("ACUTE MYELOID LEUKEMIA", 3), ("GOUT", 1)]));
    }

    #[test]
    fn title_collapse_does_not_rewrite_description() {
        let title = FrequencyMap::from([("AML", 1), ("ACUTE MYELOID LEUKEMIA", 1)]);
        let desc = FrequencyMap::from([("AML", 2)]);
        let (title, desc) = collapse_abbreviations(title, desc, &aml(), &[]);
        assert_eq!(title, FrequencyMap::from([("ACUTE MYELOID LEUKEMIA", 2)]));
        assert_eq!(desc, FrequencyMap::from([("AML", 2)]));
    }
}
