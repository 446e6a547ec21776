// File: src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// A persisted frequency literal that does not parse.
    #[error("malformed frequency literal at byte {position}: {reason}")]
    MalformedLiteral { position: usize, reason: String },

    #[error("recognizer failed on {text:?}: {reason}")]
    Recognizer { text: String, reason: String },

    /// Rows whose merged columns could not be parsed during re-prediction.
    #[error("{} row(s) could not be re-predicted: {}", .0.len(), .0.join(", "))]
    UnparsedRows(Vec<String>),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
