// File: src/recognizer/lexicon.rs
use super::{default_stop_words, is_word, tokenize, Recognizer};
use crate::core::trie::TermTrie;
use crate::core::types::{AbbreviationPair, Annotation, ConceptId, Entity, EntityLabel, Token};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Longest abbreviation considered inside parentheses.
const MAX_ABBREVIATION_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub term: String,
    pub label: EntityLabel,
    #[serde(default)]
    pub concepts: Vec<ConceptId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    pub entries: Vec<LexiconEntry>,
    /// Replaces the built-in English stop words when present.
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
}

impl LexiconConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Dictionary recognizer: case-insensitive longest match of lexicon terms
/// over word tokens, plus `long form (ABBR)` abbreviation detection.
pub struct LexiconRecognizer {
    entries: Vec<LexiconEntry>,
    trie: TermTrie,
    stop_words: HashSet<String>,
}

impl LexiconRecognizer {
    pub fn new(config: LexiconConfig) -> Result<Self> {
        let stop_words = match config.stop_words {
            Some(words) => words.iter().map(|w| w.to_lowercase()).collect(),
            None => default_stop_words(),
        };

        let mut trie = TermTrie::new();
        for (id, entry) in config.entries.iter().enumerate() {
            let words: Vec<String> = tokenize(&entry.term, &HashSet::new())
                .into_iter()
                .filter(is_word)
                .map(|t| t.text)
                .collect();
            if words.is_empty() {
                return Err(PipelineError::Config(format!("lexicon entry {:?} has no words", entry.term)));
            }
            trie.insert(&words, id);
        }
        info!(entries = config.entries.len(), nodes = trie.node_count(), "built lexicon trie");

        Ok(Self { entries: config.entries, trie, stop_words })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(LexiconConfig::from_file(path)?)
    }

    fn match_entities(&self, text: &str, words: &[&Token]) -> Vec<Entity> {
        let texts: Vec<&str> = words.iter().map(|t| t.text.as_str()).collect();
        let mut entities = Vec::new();
        let mut i = 0;
        while i < words.len() {
            match self.trie.longest_match(&texts[i..]) {
                Some((len, id)) => {
                    let entry = &self.entries[id];
                    let last = words[i + len - 1];
                    entities.push(Entity {
                        text: text[words[i].offset..last.offset + last.text.len()].to_string(),
                        label: entry.label.clone(),
                        concepts: entry.concepts.clone(),
                    });
                    i += len;
                }
                None => i += 1,
            }
        }
        entities
    }
}

impl Recognizer for LexiconRecognizer {
    fn annotate(&self, text: &str) -> Result<Annotation> {
        let tokens = tokenize(text, &self.stop_words);
        let words: Vec<&Token> = tokens.iter().filter(|t| is_word(t)).collect();
        let entities = self.match_entities(text, &words);
        let abbreviations = find_abbreviations(text, &tokens);
        Ok(Annotation { entities, tokens, abbreviations })
    }
}

/// Finds `long form words (ABBR)` where the initials of the words right
/// before the parenthesis spell the abbreviation's letters.
pub fn find_abbreviations(text: &str, tokens: &[Token]) -> Vec<AbbreviationPair> {
    let mut pairs = Vec::new();
    for i in 1..tokens.len().saturating_sub(1) {
        let (open, short, close) = (&tokens[i - 1], &tokens[i], &tokens[i + 1]);
        if open.text != "(" || close.text != ")" || !is_word(short) {
            continue;
        }
        if short.text.chars().count() > MAX_ABBREVIATION_LEN || !short.text.chars().any(char::is_uppercase) {
            continue;
        }
        let letters: Vec<char> = short
            .text
            .chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(char::to_uppercase)
            .collect();
        if letters.len() < 2 {
            continue;
        }

        let preceding: Vec<&Token> = tokens[..i - 1].iter().rev().take_while(|t| is_word(t)).collect();
        if preceding.len() < letters.len() {
            continue;
        }
        let long_words: Vec<&Token> = preceding[..letters.len()].iter().rev().copied().collect();
        let initials: Vec<char> = long_words
            .iter()
            .filter_map(|t| t.text.chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        if initials != letters {
            continue;
        }

        let first = long_words[0];
        let last = long_words[long_words.len() - 1];
        pairs.push(AbbreviationPair {
            short_form: short.text.clone(),
            long_form: text[first.offset..last.offset + last.text.len()].to_string(),
        });
    }
    pairs
}
