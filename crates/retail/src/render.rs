use comfy_table::{presets::UTF8_FULL, CellAlignment, Table};
use polars::prelude::*;
use retail_core::kpi::{KpiSummary, StoreCategoryMatrix};

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}

fn align_right_from(table: &mut Table, first: usize) {
    let width = table.column_count();
    for idx in first..width {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn summary_table(summary: &KpiSummary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["KPI", "Value"]);
    table.add_row(vec!["Overall revenue".to_string(), money(summary.overall_revenue)]);
    table.add_row(vec![
        "Transactions".to_string(),
        summary.total_transactions.to_string(),
    ]);
    table.add_row(vec![
        "Average order value".to_string(),
        money(summary.avg_order_value),
    ]);
    table.add_row(vec![
        "Revenue mismatches".to_string(),
        summary.revenue_mismatches.to_string(),
    ]);
    align_right_from(&mut table, 1);
    table
}

/// Two-column `[key, revenue]` table as produced by the revenue rankings.
pub fn ranking_table(df: &DataFrame, key: &str) -> PolarsResult<Table> {
    let labels = df.column(key)?.str()?;
    let revenue = df.column("revenue")?.f64()?;

    let mut table = new_table();
    table.set_header(vec![key.to_string(), "revenue".to_string()]);
    for (label, value) in labels.into_iter().zip(revenue.into_iter()) {
        table.add_row(vec![
            label.unwrap_or_default().to_string(),
            value.map(money).unwrap_or_default(),
        ]);
    }
    align_right_from(&mut table, 1);
    Ok(table)
}

pub fn monthly_table(df: &DataFrame) -> PolarsResult<Table> {
    let years = df.column("year")?.i32()?;
    let labels = df.column("month_name")?.str()?;
    let revenue = df.column("revenue")?.f64()?;

    let mut table = new_table();
    table.set_header(vec!["month", "revenue"]);
    for idx in 0..df.height() {
        let (Some(year), Some(label), Some(value)) =
            (years.get(idx), labels.get(idx), revenue.get(idx))
        else {
            continue;
        };
        table.add_row(vec![format!("{label} {year}"), money(value)]);
    }
    align_right_from(&mut table, 1);
    Ok(table)
}

pub fn matrix_table(matrix: &StoreCategoryMatrix) -> Table {
    let mut table = new_table();
    let mut header = vec!["store".to_string()];
    header.extend(matrix.categories().iter().cloned());
    table.set_header(header);

    for store in matrix.stores() {
        let mut row = vec![store.clone()];
        if let Some(cells) = matrix.row(store) {
            row.extend(cells.iter().copied().map(money));
        }
        table.add_row(row);
    }
    align_right_from(&mut table, 1);
    table
}
