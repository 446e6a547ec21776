// File: src/persistence.rs
use crate::core::concepts::ConceptMap;
use crate::core::engine::{RecordAnalysis, Stage};
use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Pipeline state between passes: the concept map, every record's maps and
/// the last completed pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PipelineSnapshot {
    pub stage: Stage,
    pub concepts: ConceptMap,
    pub analyses: Vec<RecordAnalysis>,
}

/// Writes the snapshot to a temp file next to `path`, then renames it into
/// place so a crash never leaves a half-written snapshot.
pub fn save_snapshot(snapshot: &PipelineSnapshot, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, snapshot)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| e.error)?;
    info!(path = %path.display(), stage = ?snapshot.stage, records = snapshot.analyses.len(), "saved snapshot");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<PipelineSnapshot> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let snapshot: PipelineSnapshot = bincode::deserialize_from(reader)?;
    info!(path = %path.display(), stage = ?snapshot.stage, records = snapshot.analyses.len(), "loaded snapshot");
    Ok(snapshot)
}
