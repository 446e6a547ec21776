// File: src/config.rs
use crate::core::types::Term;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Curated term lists and switches for one corpus run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Surface forms never counted as diseases.
    pub excluded_diseases: HashSet<Term>,
    /// Known diseases the recognizer tends to miss, matched per token.
    pub forced_diseases: HashSet<Term>,
    /// Manual additions to the second-pass vocabulary.
    pub seed_diseases: HashSet<Term>,
    /// Run extraction per record in parallel with local concept maps.
    pub parallel_extraction: bool,
    /// Annotate unmapped vocabulary terms on their own to backfill concepts.
    pub force_concept_mapping: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            excluded_diseases: HashSet::new(),
            forced_diseases: HashSet::new(),
            seed_diseases: HashSet::new(),
            parallel_extraction: false,
            force_concept_mapping: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: PipelineConfig = serde_json::from_reader(reader)?;
        info!(path = %path.display(), "loaded pipeline configuration");
        Ok(config.normalized())
    }

    /// Uppercases every term list; surface forms are compared uppercased.
    pub fn normalized(mut self) -> Self {
        for (name, set) in [
            ("excluded_diseases", &mut self.excluded_diseases),
            ("forced_diseases", &mut self.forced_diseases),
            ("seed_diseases", &mut self.seed_diseases),
        ] {
            let lowered = set.iter().filter(|t| t.to_uppercase() != **t).count();
            if lowered > 0 {
                warn!(list = name, terms = lowered, "uppercasing configured terms");
            }
            let upper: HashSet<Term> = set.drain().map(|t| t.to_uppercase()).collect();
            *set = upper;
        }
        self
    }
}
