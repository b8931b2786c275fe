// crates/retail-core/src/error.rs

use std::path::PathBuf;

use retail_parser::ParserError;
use thiserror::Error;

use crate::cleaning::CleanError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse sales CSV: {0}")]
    Parser(#[from] ParserError),

    #[error("Cleaning failed: {0}")]
    Clean(#[from] CleanError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
