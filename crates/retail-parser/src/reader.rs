use std::collections::HashSet;

use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::RawSalesTable;

/// Field values treated as missing, in addition to the empty string.
pub const NA_VALUES: &[&str] = &[
    "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn parse_sales_csv(content: &[u8]) -> Result<RawSalesTable, ParserError> {
    let file_hash = blake3::hash(content).to_hex().to_string();
    let body = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(ParserError::EmptyInput),
    };
    let headers: Vec<String> = header.iter().map(str::to_string).collect();

    let mut seen = HashSet::with_capacity(headers.len());
    for name in &headers {
        if !seen.insert(name.as_str()) {
            return Err(ParserError::DuplicateHeader { name: name.clone() });
        }
    }

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (offset, record) in records.enumerate() {
        let record = record?;
        // 1-based file line, counting the header.
        let line_index = offset + 2;

        if record.len() > headers.len() {
            return Err(ParserError::RaggedRow {
                line_index,
                expected: headers.len(),
                found: record.len(),
            });
        }

        for (idx, values) in columns.iter_mut().enumerate() {
            values.push(record.get(idx).and_then(clean_field));
        }
    }

    let series: Vec<Column> = headers
        .iter()
        .zip(columns.iter())
        .map(|(name, values)| {
            let utf8: Vec<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();
            Series::new(name.as_str().into(), utf8).into()
        })
        .collect();

    let df = DataFrame::new(series)?;

    Ok(RawSalesTable { file_hash, df })
}

fn clean_field(value: &str) -> Option<String> {
    if value.is_empty() || NA_VALUES.contains(&value) {
        None
    } else {
        Some(value.to_string())
    }
}
