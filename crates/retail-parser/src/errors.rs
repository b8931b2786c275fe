use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("input did not contain a header row")]
    EmptyInput,

    #[error("header column '{name}' appears more than once")]
    DuplicateHeader { name: String },

    #[error("data row {line_index} has {found} fields, expected at most {expected}")]
    RaggedRow {
        line_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("failed to build raw dataframe: {0}")]
    Polars(#[from] PolarsError),
}

impl From<csv::Error> for ParserError {
    fn from(source: csv::Error) -> Self {
        ParserError::Csv { source }
    }
}
