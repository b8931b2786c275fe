use polars::prelude::DataFrame;

/// A sales file as it came off disk: every column is a nullable string series,
/// headers are untouched and rows keep their file order.
#[derive(Debug, Clone)]
pub struct RawSalesTable {
    /// blake3 hex digest of the source bytes.
    pub file_hash: String,
    pub df: DataFrame,
}

impl RawSalesTable {
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn headers(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }
}
