// File: src/core/engine.rs
use crate::config::PipelineConfig;
use crate::core::abbreviation::collapse_abbreviations;
use crate::core::augmenter::add_missed_diseases;
use crate::core::concepts::ConceptMap;
use crate::core::extractor::extract_frequencies;
use crate::core::freq_map::FrequencyMap;
use crate::core::merger::merge_synonyms;
use crate::core::predictor::predict;
use crate::core::resolver::manual_lookup;
use crate::core::types::{AbbreviationPair, Annotation, EntityLabel, Field, Prediction};
use crate::core::vocabulary::MasterVocabulary;
use crate::error::PipelineError;
use crate::persistence::PipelineSnapshot;
use crate::recognizer::Recognizer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// One input row: a short title and an optional longer description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record {
    pub fn text(&self, field: Field) -> Option<&str> {
        let text = match field {
            Field::Title => Some(self.title.as_str()),
            Field::Description => self.description.as_deref(),
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

/// Everything computed for one field of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAnalysis {
    pub diseases: FrequencyMap,
    pub chemicals: FrequencyMap,
    /// Diseases after synonym merge and abbreviation collapse.
    pub merged: FrequencyMap,
    pub abbreviations: Vec<AbbreviationPair>,
    /// Set when the diseases came from the vocabulary lookup pass.
    pub from_lookup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAnalysis {
    pub record: Record,
    pub title: FieldAnalysis,
    pub description: FieldAnalysis,
    pub prediction: Prediction,
}

impl RecordAnalysis {
    fn new(record: Record) -> Self {
        Self {
            record,
            title: FieldAnalysis::default(),
            description: FieldAnalysis::default(),
            prediction: Prediction::default(),
        }
    }

    pub fn field(&self, field: Field) -> &FieldAnalysis {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut FieldAnalysis {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
        }
    }
}

/// Passes completed so far, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    New,
    Extracted,
    ConceptsBackfilled,
    Resolved,
    Merged,
    Collapsed,
    Predicted,
}

const FIELDS: [Field; 2] = [Field::Title, Field::Description];

/// Drives a corpus through every pass. The concept map is owned here and
/// threaded through extraction explicitly.
pub struct CorpusPipeline<'r, R: Recognizer> {
    config: PipelineConfig,
    recognizer: &'r R,
    concepts: ConceptMap,
    analyses: Vec<RecordAnalysis>,
    vocabulary: Option<MasterVocabulary>,
    stage: Stage,
}

impl<'r, R: Recognizer> CorpusPipeline<'r, R> {
    pub fn new(config: PipelineConfig, recognizer: &'r R) -> Self {
        Self {
            config,
            recognizer,
            concepts: ConceptMap::new(),
            analyses: Vec::new(),
            vocabulary: None,
            stage: Stage::New,
        }
    }

    pub fn from_snapshot(config: PipelineConfig, recognizer: &'r R, snapshot: PipelineSnapshot) -> Self {
        Self {
            config,
            recognizer,
            concepts: snapshot.concepts,
            analyses: snapshot.analyses,
            vocabulary: None,
            stage: snapshot.stage,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn concepts(&self) -> &ConceptMap {
        &self.concepts
    }

    pub fn analyses(&self) -> &[RecordAnalysis] {
        &self.analyses
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            stage: self.stage,
            concepts: self.concepts.clone(),
            analyses: self.analyses.clone(),
        }
    }

    pub fn into_analyses(self) -> Vec<RecordAnalysis> {
        self.analyses
    }

    /// Extracts `records` and runs every later pass.
    pub fn run(&mut self, records: Vec<Record>) -> crate::Result<()> {
        self.extract(records)?;
        self.run_remaining()
    }

    /// Runs whatever passes have not happened yet.
    pub fn run_remaining(&mut self) -> crate::Result<()> {
        if self.stage < Stage::ConceptsBackfilled {
            self.backfill_concepts()?;
        }
        if self.stage < Stage::Resolved {
            self.resolve_missing()?;
        }
        if self.stage < Stage::Merged {
            self.merge_synonyms();
        }
        if self.stage < Stage::Collapsed {
            self.collapse_abbreviations();
        }
        if self.stage < Stage::Predicted {
            self.predict();
        }
        Ok(())
    }

    /// First pass: recognizer counts per field, forced-vocabulary recovery,
    /// and concept map population.
    pub fn extract(&mut self, records: Vec<Record>) -> crate::Result<()> {
        let config = &self.config;
        let recognizer = self.recognizer;

        if config.parallel_extraction {
            let results = records
                .into_par_iter()
                .map(|record| -> crate::Result<(RecordAnalysis, ConceptMap)> {
                    let mut local = ConceptMap::new();
                    let analysis = extract_record(record, config, recognizer, &mut local)?;
                    Ok((analysis, local))
                })
                .collect::<crate::Result<Vec<_>>>()?;
            // record order keeps last-write-wins identical to the sequential scan
            for (analysis, local) in results {
                self.concepts.absorb(local);
                self.analyses.push(analysis);
            }
        } else {
            for record in records {
                let analysis = extract_record(record, config, recognizer, &mut self.concepts)?;
                self.analyses.push(analysis);
            }
        }

        self.vocabulary = None;
        self.stage = Stage::Extracted;
        info!(records = self.analyses.len(), concepts = self.concepts.len(), "extraction pass complete");
        Ok(())
    }

    /// Builds the master vocabulary from the first-pass disease maps and the
    /// configured seeds. Only valid before the lookup pass rewrites the maps.
    fn vocabulary(&mut self) -> &MasterVocabulary {
        let analyses = &self.analyses;
        let seeds = &self.config.seed_diseases;
        self.vocabulary.get_or_insert_with(|| {
            let maps = analyses.iter().flat_map(|a| [&a.title.diseases, &a.description.diseases]);
            let vocabulary = MasterVocabulary::build(maps, seeds);
            info!(terms = vocabulary.len(), "built master vocabulary");
            vocabulary
        })
    }

    /// Annotates every unmapped vocabulary term on its own, as-is and
    /// capitalized, and records any disease concept found.
    ///
    /// Fails once the lookup pass has run, since the vocabulary is built from
    /// the first-pass maps that lookup overwrites.
    pub fn backfill_concepts(&mut self) -> crate::Result<()> {
        if self.stage >= Stage::Resolved {
            return Err(PipelineError::Config(format!(
                "concept backfill must run before the lookup pass (stage is {:?})",
                self.stage
            )));
        }
        if self.config.force_concept_mapping {
            let terms: Vec<String> = self.vocabulary().iter().cloned().collect();
            let before = self.concepts.len();
            for term in terms {
                if self.concepts.contains(&term) {
                    continue;
                }
                for variant in [term.clone(), capitalize(&term)] {
                    let annotation = self.recognizer.annotate(&variant)?;
                    for entity in &annotation.entities {
                        let upper = entity.normalized();
                        if entity.label != EntityLabel::Disease || self.config.excluded_diseases.contains(&upper) {
                            continue;
                        }
                        if let Some(concept) = entity.top_concept() {
                            self.concepts.record(upper, concept.clone());
                        }
                    }
                }
            }
            info!(added = self.concepts.len() - before, "backfilled concept map");
        }
        self.stage = Stage::ConceptsBackfilled;
        Ok(())
    }

    /// Second pass: vocabulary lookup for every field the recognizer found
    /// no disease in. Backfills the concept map first if that has not
    /// happened yet.
    pub fn resolve_missing(&mut self) -> crate::Result<()> {
        if self.stage < Stage::ConceptsBackfilled {
            self.backfill_concepts()?;
        }
        self.vocabulary();
        let Some(vocabulary) = self.vocabulary.take() else {
            return Ok(());
        };

        let mut resolved = 0;
        for analysis in &mut self.analyses {
            for field in FIELDS {
                if !analysis.field(field).diseases.is_empty() {
                    continue;
                }
                let Some(text) = analysis.record.text(field) else {
                    continue;
                };
                let annotation = self.recognizer.annotate(text)?;
                let found = manual_lookup(&annotation.tokens, text, &vocabulary);
                if !found.is_empty() {
                    debug!(record = %analysis.record.id, %field, found = %found, "resolved by lookup");
                    resolved += 1;
                    let target = analysis.field_mut(field);
                    target.diseases = found;
                    target.from_lookup = true;
                }
            }
        }

        self.stage = Stage::Resolved;
        info!(fields = resolved, "lookup pass complete");
        Ok(())
    }

    pub fn merge_synonyms(&mut self) {
        for analysis in &mut self.analyses {
            for field in FIELDS {
                let target = analysis.field_mut(field);
                target.merged = merge_synonyms(&target.diseases, &self.concepts);
            }
        }
        self.stage = Stage::Merged;
    }

    pub fn collapse_abbreviations(&mut self) {
        for analysis in &mut self.analyses {
            let (title, description) = collapse_abbreviations(
                std::mem::take(&mut analysis.title.merged),
                std::mem::take(&mut analysis.description.merged),
                &analysis.title.abbreviations,
                &analysis.description.abbreviations,
            );
            analysis.title.merged = title;
            analysis.description.merged = description;
        }
        self.stage = Stage::Collapsed;
    }

    pub fn predict(&mut self) {
        let mut predicted = 0;
        for analysis in &mut self.analyses {
            analysis.prediction = predict(&analysis.title.merged, &analysis.description.merged, &self.concepts);
            if !analysis.prediction.is_empty() {
                predicted += 1;
            }
        }
        self.stage = Stage::Predicted;
        info!(records = self.analyses.len(), predicted, "prediction pass complete");
    }
}

fn extract_record<R: Recognizer>(
    record: Record,
    config: &PipelineConfig,
    recognizer: &R,
    concepts: &mut ConceptMap,
) -> crate::Result<RecordAnalysis> {
    let mut analysis = RecordAnalysis::new(record);
    for field in FIELDS {
        let Some(text) = analysis.record.text(field) else {
            continue;
        };
        let annotation = recognizer.annotate(text)?;
        *analysis.field_mut(field) = extract_field(&annotation, config, concepts);
    }
    Ok(analysis)
}

fn extract_field(annotation: &Annotation, config: &PipelineConfig, concepts: &mut ConceptMap) -> FieldAnalysis {
    let diseases =
        extract_frequencies(&annotation.entities, &config.excluded_diseases, &EntityLabel::Disease, concepts);
    let chemicals = extract_frequencies(&annotation.entities, &HashSet::new(), &EntityLabel::Chemical, concepts);
    let diseases = add_missed_diseases(&annotation.tokens, diseases, &config.forced_diseases);
    FieldAnalysis {
        diseases,
        chemicals,
        merged: FrequencyMap::new(),
        abbreviations: annotation.abbreviations.clone(),
        from_lookup: false,
    }
}

/// "BREAST CANCER" -> "Breast cancer".
fn capitalize(term: &str) -> String {
    let mut chars = term.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
