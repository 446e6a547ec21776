// File: src/recognizer/mod.rs
//! Integration layer for the entity recognizer.
//!
//! The pipeline only needs spans with labels and ranked concepts, tokens
//! with stop-word flags, and abbreviation pairs for a text. Anything that
//! can produce an [`Annotation`] can drive it.

mod lexicon;
mod precomputed;

pub use lexicon::{LexiconConfig, LexiconEntry, LexiconRecognizer};
pub use precomputed::PrecomputedRecognizer;

use crate::core::types::{Annotation, Token};
use crate::error::Result;
use std::collections::HashSet;

pub trait Recognizer: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Annotation>;
}

pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been", "being",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "during", "each", "for", "from",
    "had", "has", "have", "he", "her", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its",
    "may", "more", "most", "no", "nor", "not", "of", "on", "or", "other", "our", "over", "own", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "under", "until", "up", "very", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your",
];

pub fn default_stop_words() -> HashSet<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

/// Splits text into word and punctuation tokens with byte offsets.
///
/// Words are alphanumeric runs that may contain inner `-` or `'`, so
/// "non-small" and "Crohn's" stay whole. Stop-word flags compare lowercased.
pub fn tokenize(text: &str, stop_words: &HashSet<String>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        let mut end = start + c.len_utf8();
        if c.is_alphanumeric() {
            while let Some(&(pos, next)) = chars.peek() {
                let joins = (next == '-' || next == '\'')
                    && text[pos + next.len_utf8()..].chars().next().is_some_and(char::is_alphanumeric);
                if next.is_alphanumeric() || joins {
                    end = pos + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
        }
        let word = &text[start..end];
        tokens.push(Token {
            text: word.to_string(),
            offset: start,
            is_stop: stop_words.contains(&word.to_lowercase()),
        });
    }
    tokens
}

pub(crate) fn is_word(token: &Token) -> bool {
    token.text.chars().next().is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_words_and_punctuation() {
        let tokens = tokenize("Non-small cell (NSCLC), Crohn's 5mm.", &default_stop_words());
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Non-small", "cell", "(", "NSCLC", ")", ",", "Crohn's", "5mm", "."]);
        assert_eq!(tokens[3].offset, 16);
    }

    #[test]
    fn flags_stop_words_case_insensitively() {
        let tokens = tokenize("The risk OF asthma", &default_stop_words());
        let stops: Vec<bool> = tokens.iter().map(|t| t.is_stop).collect();
        assert_eq!(stops, vec![true, false, true, false]);
    }

    #[test]
    fn trailing_hyphen_is_punctuation() {
        let tokens = tokenize("pre- and post-op", &HashSet::new());
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["pre", "-", "and", "post-op"]);
    }
}
