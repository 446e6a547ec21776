// src/core/mod.rs

pub mod abbreviation;
pub mod augmenter;
pub mod concepts;
pub mod engine;
pub mod extractor;
pub mod freq_map;
pub mod literal;
pub mod merger;
pub mod predictor;
pub mod resolver;
pub mod trie;
pub mod types;
pub mod vocabulary;
