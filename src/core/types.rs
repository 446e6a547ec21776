// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// An uppercased surface form, e.g. "BREAST CANCER".
pub type Term = String;

/// An opaque knowledge-base concept identifier (CUI).
pub type ConceptId = String;

/// Most diseases a single record can be predicted with.
pub const MAX_PREDICTIONS: usize = 3;

/// The two free-text fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Title,
    Description,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Title => f.write_str("title"),
            Field::Description => f.write_str("description"),
        }
    }
}

/// Entity label as reported by the recognizer, compared uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityLabel {
    Disease,
    Chemical,
    Other(String),
}

impl From<String> for EntityLabel {
    fn from(label: String) -> Self {
        EntityLabel::from(label.as_str())
    }
}

impl From<&str> for EntityLabel {
    fn from(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "DISEASE" => EntityLabel::Disease,
            "CHEMICAL" => EntityLabel::Chemical,
            other => EntityLabel::Other(other.to_string()),
        }
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        match label {
            EntityLabel::Disease => "DISEASE".to_string(),
            EntityLabel::Chemical => "CHEMICAL".to_string(),
            EntityLabel::Other(other) => other,
        }
    }
}

/// One recognized span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    /// Ranked candidate concepts, best first. Empty when nothing linked.
    #[serde(default)]
    pub concepts: Vec<ConceptId>,
}

impl Entity {
    pub fn new(text: &str, label: EntityLabel) -> Self {
        Self { text: text.to_string(), label, concepts: Vec::new() }
    }

    pub fn with_concepts(mut self, concepts: &[&str]) -> Self {
        self.concepts = concepts.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn normalized(&self) -> Term {
        self.text.to_uppercase()
    }

    pub fn top_concept(&self) -> Option<&ConceptId> {
        self.concepts.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Byte offset of the token in the annotated text.
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub is_stop: bool,
}

/// An abbreviation and the long form it was introduced with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationPair {
    pub short_form: String,
    pub long_form: String,
}

impl AbbreviationPair {
    pub fn new(short_form: &str, long_form: &str) -> Self {
        Self { short_form: short_form.to_string(), long_form: long_form.to_string() }
    }
}

/// Everything the recognizer reports for one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub abbreviations: Vec<AbbreviationPair>,
}

/// Discrete confidence attached to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Confidence(pub u8);

impl Confidence {
    pub const CERTAIN: Confidence = Confidence(100);

    /// 1 -> 100, 2 -> 90, 3 -> 80, anything else has no confidence.
    pub fn for_selected(count: usize) -> Option<Confidence> {
        match count {
            1 => Some(Confidence(100)),
            2 => Some(Confidence(90)),
            3 => Some(Confidence(80)),
            _ => None,
        }
    }
}

/// Final per-record output: three nullable disease slots and a confidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub diseases: [Option<Term>; MAX_PREDICTIONS],
    pub confidence: Option<Confidence>,
}

impl Prediction {
    pub fn new(terms: Vec<Term>, confidence: Option<Confidence>) -> Self {
        let mut diseases: [Option<Term>; MAX_PREDICTIONS] = Default::default();
        for (slot, term) in diseases.iter_mut().zip(terms) {
            *slot = Some(term);
        }
        Self { diseases, confidence }
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.diseases.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.iter().all(Option::is_none)
    }
}
