// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod persistence;
pub mod recognizer;
pub mod table;

pub use crate::config::PipelineConfig;
pub use crate::core::concepts::ConceptMap;
pub use crate::core::engine::{CorpusPipeline, Record, RecordAnalysis, Stage};
pub use crate::core::freq_map::FrequencyMap;
pub use crate::core::types::{Confidence, Prediction};
pub use crate::error::{PipelineError, Result};
