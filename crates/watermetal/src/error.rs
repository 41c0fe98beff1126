//! Error types for the WaterMetal library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for WaterMetal operations.
#[derive(Debug, Error)]
pub enum WaterMetalError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cell could not be interpreted (e.g. non-numeric concentration).
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading an xlsx workbook.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value violates a domain constraint (negative concentration,
    /// non-positive background, duplicate sample id, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A metal has no reference entry.
    #[error("No reference values for metal '{metal}'")]
    MissingReference { metal: String },

    /// Not enough usable data for a computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// LLM provider failure.
    #[error("LLM error: {0}")]
    Llm(String),
}

/// Result type alias for WaterMetal operations.
pub type Result<T> = std::result::Result<T, WaterMetalError>;
