use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use serde::Serialize;

use crate::schema::{CATEGORY, MONTH, MONTH_NAME, REVENUE, REVENUE_MISMATCH_FLAG, STORE, YEAR};

/// Headline figures for a cleaned sales table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSummary {
    pub overall_revenue: f64,
    pub total_transactions: usize,
    pub avg_order_value: f64,
    pub revenue_mismatches: usize,
}

/// Every aggregate computed from one cleaned table.
#[derive(Debug, Clone)]
pub struct KpiReport {
    pub summary: KpiSummary,
    pub revenue_by_store: DataFrame,
    pub revenue_by_category: DataFrame,
    pub monthly_revenue: DataFrame,
    pub store_category_matrix: StoreCategoryMatrix,
}

pub fn overall_revenue(df: &DataFrame) -> Result<f64, PolarsError> {
    Ok(df.column(REVENUE)?.f64()?.sum().unwrap_or(0.0))
}

pub fn total_transactions(df: &DataFrame) -> usize {
    df.height()
}

/// Mean revenue per transaction; 0.0 for an empty table.
pub fn avg_order_value(df: &DataFrame) -> Result<f64, PolarsError> {
    let count = total_transactions(df);
    if count == 0 {
        return Ok(0.0);
    }
    Ok(overall_revenue(df)? / count as f64)
}

pub fn revenue_by_store(df: &DataFrame) -> Result<DataFrame, PolarsError> {
    revenue_ranking(df, STORE)
}

pub fn revenue_by_category(df: &DataFrame) -> Result<DataFrame, PolarsError> {
    revenue_ranking(df, CATEGORY)
}

/// Revenue per (year, month), oldest first. `month_name` rides along for display.
pub fn monthly_revenue(df: &DataFrame) -> Result<DataFrame, PolarsError> {
    df.clone()
        .lazy()
        .group_by_stable([col(YEAR), col(MONTH), col(MONTH_NAME)])
        .agg([col(REVENUE).sum()])
        .sort([YEAR, MONTH], SortMultipleOptions::default())
        .collect()
}

pub fn revenue_mismatches(df: &DataFrame) -> Result<usize, PolarsError> {
    Ok(df.column(REVENUE_MISMATCH_FLAG)?.bool()?.sum().unwrap_or(0) as usize)
}

pub fn summarize(df: &DataFrame) -> Result<KpiSummary, PolarsError> {
    Ok(KpiSummary {
        overall_revenue: overall_revenue(df)?,
        total_transactions: total_transactions(df),
        avg_order_value: avg_order_value(df)?,
        revenue_mismatches: revenue_mismatches(df)?,
    })
}

pub fn build_report(df: &DataFrame) -> Result<KpiReport, PolarsError> {
    Ok(KpiReport {
        summary: summarize(df)?,
        revenue_by_store: revenue_by_store(df)?,
        revenue_by_category: revenue_by_category(df)?,
        monthly_revenue: monthly_revenue(df)?,
        store_category_matrix: store_category_matrix(df)?,
    })
}

// Groups keep first-seen order and the sort is stable, so equal totals stay in that order.
fn revenue_ranking(df: &DataFrame, key: &str) -> Result<DataFrame, PolarsError> {
    df.clone()
        .lazy()
        .group_by_stable([col(key)])
        .agg([col(REVENUE).sum()])
        .sort(
            [REVENUE],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()
}

/// Store × category revenue cross-tab. Rows and columns are sorted by label and
/// combinations without sales hold 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCategoryMatrix {
    stores: Vec<String>,
    categories: Vec<String>,
    /// Row-major, `stores.len() * categories.len()` cells.
    cells: Vec<f64>,
}

impl StoreCategoryMatrix {
    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn get(&self, store: &str, category: &str) -> Option<f64> {
        let row = self.stores.iter().position(|s| s == store)?;
        let column = self.categories.iter().position(|c| c == category)?;
        Some(self.cells[row * self.categories.len() + column])
    }

    pub fn row(&self, store: &str) -> Option<&[f64]> {
        let row = self.stores.iter().position(|s| s == store)?;
        let width = self.categories.len();
        Some(&self.cells[row * width..(row + 1) * width])
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Fails with a duplicate-column error when a category is itself named `store`;
    /// `outputs::write_matrix_csv` has no such restriction.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        let width = self.categories.len();
        let mut columns: Vec<Column> = Vec::with_capacity(width + 1);
        columns.push(Series::new(STORE.into(), self.stores.clone()).into());

        for (idx, category) in self.categories.iter().enumerate() {
            let values: Vec<f64> = self
                .cells
                .iter()
                .skip(idx)
                .step_by(width)
                .copied()
                .collect();
            columns.push(Series::new(category.as_str().into(), values).into());
        }

        DataFrame::new(columns)
    }
}

pub fn store_category_matrix(df: &DataFrame) -> Result<StoreCategoryMatrix, PolarsError> {
    let stores = df.column(STORE)?.str()?;
    let categories = df.column(CATEGORY)?.str()?;
    let revenues = df.column(REVENUE)?.f64()?;

    let mut store_labels: BTreeSet<&str> = BTreeSet::new();
    let mut category_labels: BTreeSet<&str> = BTreeSet::new();
    let mut totals: BTreeMap<(&str, &str), f64> = BTreeMap::new();

    for idx in 0..df.height() {
        let (Some(store), Some(category), Some(revenue)) =
            (stores.get(idx), categories.get(idx), revenues.get(idx))
        else {
            continue;
        };

        store_labels.insert(store);
        category_labels.insert(category);
        *totals.entry((store, category)).or_insert(0.0) += revenue;
    }

    let mut cells = Vec::with_capacity(store_labels.len() * category_labels.len());
    for store in &store_labels {
        for category in &category_labels {
            cells.push(totals.get(&(*store, *category)).copied().unwrap_or(0.0));
        }
    }

    Ok(StoreCategoryMatrix {
        stores: store_labels.into_iter().map(str::to_string).collect(),
        categories: category_labels.into_iter().map(str::to_string).collect(),
        cells,
    })
}
