use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::calendar;
use crate::schema::{
    normalize_column_name, CALCULATED_REVENUE, CATEGORY, DATE, DAY_OF_WEEK, MONTH, MONTH_NAME,
    PRODUCT, QUANTITY, REQUIRED_COLUMNS, REVENUE, REVENUE_MISMATCH_FLAG, STORE, UNIT_PRICE, YEAR,
};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("column '{name}' appears more than once after header normalization")]
    DuplicateColumn { name: String },
}

#[derive(Debug, Error)]
pub enum CleanError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Row accounting for one cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub retained_rows: usize,
    pub dropped_rows: usize,
    pub revenue_mismatches: usize,
}

impl CleaningReport {
    pub fn log(&self) {
        info!(
            input_rows = self.input_rows,
            retained_rows = self.retained_rows,
            dropped_rows = self.dropped_rows,
            revenue_mismatches = self.revenue_mismatches,
            "Cleaned sales table"
        );
    }
}

/// Normalizes headers, drops incomplete rows and appends the time and revenue-check columns.
///
/// Row order is preserved. Columns outside the required set pass through untouched.
pub fn clean_and_enrich(raw: &DataFrame) -> Result<DataFrame, CleanError> {
    let (df, report) = clean_with_report(raw)?;
    report.log();
    Ok(df)
}

pub fn clean_with_report(raw: &DataFrame) -> Result<(DataFrame, CleaningReport), CleanError> {
    let mut df = raw.clone();
    normalize_headers(&mut df)?;
    ensure_required_columns(&df)?;

    let len = df.height();

    let dates = coerce_dates(&df)?;
    let stores = coerce_strings(&df, STORE)?;
    let categories = coerce_strings(&df, CATEGORY)?;
    let products = coerce_strings(&df, PRODUCT)?;
    let quantities = coerce_quantities(&df)?;
    let unit_prices = coerce_decimals(&df, UNIT_PRICE)?;
    let revenues = coerce_decimals(&df, REVENUE)?;

    let keep: Vec<bool> = (0..len)
        .map(|idx| {
            dates[idx].is_some()
                && stores[idx].is_some()
                && categories[idx].is_some()
                && products[idx].is_some()
                && quantities[idx].is_some()
                && unit_prices[idx].is_some()
                && revenues[idx].is_some()
        })
        .collect();

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let mut output = df.filter(&mask)?;

    let retained = keep.iter().filter(|k| **k).count();
    debug!(
        dropped = len - retained,
        "Dropped rows with missing or unparseable required fields"
    );

    let dates: Vec<NaiveDate> = retain(dates, &keep);
    let quantities: Vec<i64> = retain(quantities, &keep);
    let unit_prices: Vec<f64> = retain(unit_prices, &keep);
    let revenues: Vec<f64> = retain(revenues, &keep);
    let stores: Vec<String> = retain(stores, &keep);
    let categories: Vec<String> = retain(categories, &keep);
    let products: Vec<String> = retain(products, &keep);

    let mut years = Vec::with_capacity(retained);
    let mut months = Vec::with_capacity(retained);
    let mut month_names = Vec::with_capacity(retained);
    let mut weekdays = Vec::with_capacity(retained);
    let mut epoch_days = Vec::with_capacity(retained);
    for date in &dates {
        years.push(date.year());
        months.push(date.month() as i32);
        month_names.push(calendar::month_abbreviation(*date));
        weekdays.push(calendar::weekday_name(*date));
        epoch_days.push(calendar::to_epoch_days(*date));
    }

    let calculated: Vec<f64> = quantities
        .iter()
        .zip(unit_prices.iter())
        .map(|(quantity, price)| *quantity as f64 * price)
        .collect();
    let mismatch: Vec<bool> = revenues
        .iter()
        .zip(calculated.iter())
        .map(|(reported, calculated)| revenue_mismatch(*reported, *calculated))
        .collect();
    let revenue_mismatches = mismatch.iter().filter(|m| **m).count();

    let date_series = Series::new(DATE.into(), epoch_days).cast(&DataType::Date)?;

    // Required columns are replaced in place; derived ones are appended, or replaced
    // when the input was already cleaned.
    let columns: [Series; 13] = [
        date_series,
        Series::new(STORE.into(), stores),
        Series::new(CATEGORY.into(), categories),
        Series::new(PRODUCT.into(), products),
        Series::new(QUANTITY.into(), quantities),
        Series::new(UNIT_PRICE.into(), unit_prices),
        Series::new(REVENUE.into(), revenues),
        Series::new(YEAR.into(), years),
        Series::new(MONTH.into(), months),
        Series::new(MONTH_NAME.into(), month_names),
        Series::new(DAY_OF_WEEK.into(), weekdays),
        Series::new(CALCULATED_REVENUE.into(), calculated),
        Series::new(REVENUE_MISMATCH_FLAG.into(), mismatch),
    ];
    for series in columns {
        output.with_column(series)?;
    }

    let report = CleaningReport {
        input_rows: len,
        retained_rows: retained,
        dropped_rows: len - retained,
        revenue_mismatches,
    };

    Ok((output, report))
}

/// True when reported and recomputed revenue disagree at cent precision.
///
/// Both sides are rounded half-to-even after scaling by 100, so `0.125` rounds to `0.12`.
pub fn revenue_mismatch(reported: f64, calculated: f64) -> bool {
    round_to_cents(reported) != round_to_cents(calculated)
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn normalize_headers(df: &mut DataFrame) -> Result<(), CleanError> {
    let normalized: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| normalize_column_name(name.as_str()))
        .collect();

    let mut seen = HashSet::with_capacity(normalized.len());
    for name in &normalized {
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::DuplicateColumn { name: name.clone() }.into());
        }
    }

    df.set_column_names(normalized.iter().map(String::as_str))?;
    Ok(())
}

fn ensure_required_columns(df: &DataFrame) -> Result<(), SchemaError> {
    let present: HashSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !present.contains(**name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MissingColumns { columns: missing })
    }
}

fn string_values(df: &DataFrame, name: &str) -> Result<Column, PolarsError> {
    df.column(name)?.cast(&DataType::String)
}

fn coerce_dates(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>, PolarsError> {
    let column = string_values(df, DATE)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.and_then(calendar::parse_date))
        .collect())
}

fn coerce_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, PolarsError> {
    let column = string_values(df, name)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn coerce_quantities(df: &DataFrame) -> Result<Vec<Option<i64>>, PolarsError> {
    let column = string_values(df, QUANTITY)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.and_then(parse_quantity))
        .collect())
}

fn coerce_decimals(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, PolarsError> {
    let column = string_values(df, name)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.and_then(parse_decimal))
        .collect())
}

fn parse_quantity(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    // "2.0" is how float-typed quantity columns come back as strings.
    let parsed = trimmed.parse::<f64>().ok()?;
    if parsed.is_finite() && parsed.fract() == 0.0 && parsed.abs() < i64::MAX as f64 {
        Some(parsed as i64)
    } else {
        None
    }
}

fn parse_decimal(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

fn retain<T>(values: Vec<Option<T>>, keep: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(keep.iter())
        .filter_map(|(value, keep)| if *keep { value } else { None })
        .collect()
}
