// File: src/recognizer/precomputed.rs
use super::{default_stop_words, tokenize, Recognizer};
use crate::core::types::Annotation;
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Annotations produced ahead of time by an external engine, keyed by the
/// exact text they were computed for. Unknown text annotates as empty.
#[derive(Debug)]
pub struct PrecomputedRecognizer {
    annotations: HashMap<String, Annotation>,
    stop_words: HashSet<String>,
}

impl Default for PrecomputedRecognizer {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl PrecomputedRecognizer {
    pub fn new(annotations: HashMap<String, Annotation>) -> Self {
        Self { annotations, stop_words: default_stop_words() }
    }

    /// Loads a JSON object mapping text to annotation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let annotations: HashMap<String, Annotation> = serde_json::from_reader(reader)?;
        info!(path = %path.display(), texts = annotations.len(), "loaded precomputed annotations");
        Ok(Self::new(annotations))
    }

    pub fn insert(&mut self, text: &str, annotation: Annotation) {
        self.annotations.insert(text.to_string(), annotation);
    }
}

impl Recognizer for PrecomputedRecognizer {
    fn annotate(&self, text: &str) -> Result<Annotation> {
        let mut annotation = self.annotations.get(text).cloned().unwrap_or_default();
        // external annotations may omit tokens
        if annotation.tokens.is_empty() {
            annotation.tokens = tokenize(text, &self.stop_words);
        }
        Ok(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Entity, EntityLabel};

    #[test]
    fn unknown_text_is_empty_but_tokenized() {
        let recognizer = PrecomputedRecognizer::default();
        let annotation = recognizer.annotate("asthma in children").unwrap();
        assert!(annotation.entities.is_empty());
        assert_eq!(annotation.tokens.len(), 3);
    }

    #[test]
    fn parses_external_json() {
        let json = r#"{
            "COPD care": {
                "entities": [{"text": "COPD", "label": "Disease", "concepts": ["C0024117"]}],
                "abbreviations": []
            }
        }"#;
        let annotations: HashMap<String, Annotation> = serde_json::from_str(json).unwrap();
        let recognizer = PrecomputedRecognizer::new(annotations);
        let annotation = recognizer.annotate("COPD care").unwrap();
        assert_eq!(
            annotation.entities,
            vec![Entity::new("COPD", EntityLabel::Disease).with_concepts(&["C0024117"])]
        );
        assert_eq!(annotation.tokens[0].text, "COPD");
    }
}
