// File: src/table.rs
//! JSON-lines input records and the output table. Frequency columns are
//! stored as dictionary literals so a later run can parse them back.

use crate::core::concepts::ConceptMap;
use crate::core::engine::{Record, RecordAnalysis};
use crate::core::freq_map::FrequencyMap;
use crate::core::predictor::predict;
use crate::core::types::{Prediction, Term};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub title_disease_freq: String,
    pub description_disease_freq: String,
    pub title_chemical_freq: String,
    pub description_chemical_freq: String,
    pub title_disease_freq_merged: String,
    pub description_disease_freq_merged: String,
    pub predicted_disease_1: Option<Term>,
    pub predicted_disease_2: Option<Term>,
    pub predicted_disease_3: Option<Term>,
    pub prediction_confidence: Option<u8>,
}

impl From<&RecordAnalysis> for TableRow {
    fn from(analysis: &RecordAnalysis) -> Self {
        let [first, second, third] = analysis.prediction.diseases.clone();
        Self {
            id: analysis.record.id.clone(),
            title: analysis.record.title.clone(),
            description: analysis.record.description.clone(),
            title_disease_freq: analysis.title.diseases.to_string(),
            description_disease_freq: analysis.description.diseases.to_string(),
            title_chemical_freq: analysis.title.chemicals.to_string(),
            description_chemical_freq: analysis.description.chemicals.to_string(),
            title_disease_freq_merged: analysis.title.merged.to_string(),
            description_disease_freq_merged: analysis.description.merged.to_string(),
            predicted_disease_1: first,
            predicted_disease_2: second,
            predicted_disease_3: third,
            prediction_confidence: analysis.prediction.confidence.map(|c| c.0),
        }
    }
}

impl TableRow {
    /// Parses the two merged columns back into maps.
    pub fn merged_maps(&self) -> Result<(FrequencyMap, FrequencyMap)> {
        Ok((
            self.title_disease_freq_merged.parse()?,
            self.description_disease_freq_merged.parse()?,
        ))
    }
}

pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let records: Vec<Record> = read_json_lines(path)?;
    info!(path = %path.display(), records = records.len(), "read input records");
    Ok(records)
}

pub fn read_table(path: &Path) -> Result<Vec<TableRow>> {
    read_json_lines(path)
}

pub fn write_table(rows: &[TableRow], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote output table");
    Ok(())
}

/// Re-runs prediction from each row's persisted merged columns. A row with
/// a malformed literal has its prediction slots cleared and is reported
/// back; the other rows are still re-predicted.
pub fn repredict(rows: &mut [TableRow], concepts: &ConceptMap) -> Vec<(String, PipelineError)> {
    let mut failures = Vec::new();
    for row in rows.iter_mut() {
        let prediction = match row.merged_maps() {
            Ok((title, description)) => predict(&title, &description, concepts),
            Err(e) => {
                error!(record = %row.id, error = %e, "cannot parse merged frequencies");
                failures.push((row.id.clone(), e));
                Prediction::default()
            }
        };
        let [first, second, third] = prediction.diseases;
        row.predicted_disease_1 = first;
        row.predicted_disease_2 = second;
        row.predicted_disease_3 = third;
        row.prediction_confidence = prediction.confidence.map(|c| c.0);
    }
    failures
}

/// Turns the failures reported by [`repredict`] into one error naming the
/// affected rows.
pub fn check_repredicted(failures: &[(String, PipelineError)]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    Err(PipelineError::UnparsedRows(failures.iter().map(|(id, _)| id.clone()).collect()))
}

fn read_json_lines<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        items.push(serde_json::from_str(&line)?);
    }
    Ok(items)
}
