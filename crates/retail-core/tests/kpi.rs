use std::path::PathBuf;

use polars::prelude::*;
use retail_core::cleaning::clean_and_enrich;
use retail_core::kpi::{
    avg_order_value, build_report, monthly_revenue, overall_revenue, revenue_by_category,
    revenue_by_store, store_category_matrix, summarize, total_transactions,
};
use retail_parser::parse_sales_csv;

const EPS: f64 = 1e-9;

fn sample_clean() -> DataFrame {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../retail-parser/tests/data/retail_sales_sample.csv");
    let raw = parse_sales_csv(&std::fs::read(path).expect("read fixture")).expect("parse fixture");
    clean_and_enrich(&raw.df).expect("clean fixture")
}

fn clean_rows(rows: &[(&str, &str, &str, f64)]) -> DataFrame {
    let dates: Vec<&str> = rows.iter().map(|r| r.0).collect();
    let stores: Vec<&str> = rows.iter().map(|r| r.1).collect();
    let categories: Vec<&str> = rows.iter().map(|r| r.2).collect();
    let revenue: Vec<f64> = rows.iter().map(|r| r.3).collect();
    let raw = df!(
        "date" => dates,
        "store" => stores,
        "category" => categories,
        "product" => vec!["item"; rows.len()],
        "quantity" => vec![1i64; rows.len()],
        "unit_price" => revenue.clone(),
        "revenue" => revenue,
    )
    .expect("raw frame");
    clean_and_enrich(&raw).expect("clean rows")
}

fn empty_clean() -> DataFrame {
    let raw = df!(
        "date" => &["2023-01-01"],
        "store" => &[None::<&str>],
        "category" => &["C"],
        "product" => &["P"],
        "quantity" => &[1i64],
        "unit_price" => &[1.0f64],
        "revenue" => &[1.0f64],
    )
    .expect("raw frame");
    clean_and_enrich(&raw).expect("clean rows")
}

#[test]
fn headline_figures_for_sample() -> PolarsResult<()> {
    let df = sample_clean();

    assert!((overall_revenue(&df)? - 2243.46).abs() < EPS);
    assert_eq!(total_transactions(&df), 7);
    assert!((avg_order_value(&df)? - 2243.46 / 7.0).abs() < EPS);

    let summary = summarize(&df)?;
    assert_eq!(summary.revenue_mismatches, 1);
    assert_eq!(summary.total_transactions, 7);
    Ok(())
}

#[test]
fn empty_table_yields_zero_kpis() -> PolarsResult<()> {
    let df = empty_clean();
    assert_eq!(df.height(), 0);

    assert_eq!(overall_revenue(&df)?, 0.0);
    assert_eq!(total_transactions(&df), 0);
    assert_eq!(avg_order_value(&df)?, 0.0);
    assert_eq!(revenue_by_store(&df)?.height(), 0);
    assert_eq!(monthly_revenue(&df)?.height(), 0);

    let matrix = store_category_matrix(&df)?;
    assert!(matrix.stores().is_empty());
    assert_eq!(matrix.total(), 0.0);
    Ok(())
}

#[test]
fn revenue_by_store_is_sorted_descending() -> PolarsResult<()> {
    let by_store = revenue_by_store(&sample_clean())?;

    let names: Vec<&str> = by_store.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["store", "revenue"]);

    let stores: Vec<&str> = by_store.column("store")?.str()?.into_iter().flatten().collect();
    assert_eq!(stores, vec!["StoreA", "StoreB", "StoreC"]);

    let revenue = by_store.column("revenue")?.f64()?;
    assert!((revenue.get(0).unwrap() - 2008.96).abs() < EPS);
    assert!((revenue.get(1).unwrap() - 149.5).abs() < EPS);
    assert!((revenue.get(2).unwrap() - 85.0).abs() < EPS);
    Ok(())
}

#[test]
fn revenue_by_category_is_sorted_descending() -> PolarsResult<()> {
    let by_category = revenue_by_category(&sample_clean())?;
    let categories: Vec<&str> = by_category
        .column("category")?
        .str()?
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(categories, vec!["Electronics", "Apparel", "Grocery"]);
    Ok(())
}

#[test]
fn store_totals_conserve_overall_revenue() -> PolarsResult<()> {
    let df = sample_clean();
    let by_store = revenue_by_store(&df)?;
    let by_category = revenue_by_category(&df)?;
    let total = overall_revenue(&df)?;

    let store_sum = by_store.column("revenue")?.f64()?.sum().unwrap_or(0.0);
    let category_sum = by_category.column("revenue")?.f64()?.sum().unwrap_or(0.0);
    assert!((store_sum - total).abs() < EPS);
    assert!((category_sum - total).abs() < EPS);
    Ok(())
}

#[test]
fn ties_keep_first_seen_order() -> PolarsResult<()> {
    let df = clean_rows(&[
        ("2023-01-01", "Zeta", "C", 50.0),
        ("2023-01-01", "Alpha", "C", 80.0),
        ("2023-01-02", "Mid", "C", 50.0),
        ("2023-01-03", "Alpha", "C", -30.0),
    ]);
    let by_store = revenue_by_store(&df)?;
    let stores: Vec<&str> = by_store.column("store")?.str()?.into_iter().flatten().collect();
    assert_eq!(stores, vec!["Zeta", "Alpha", "Mid"]);
    Ok(())
}

#[test]
fn monthly_revenue_is_chronological() -> PolarsResult<()> {
    let monthly = monthly_revenue(&sample_clean())?;

    let names: Vec<&str> = monthly.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["year", "month", "month_name", "revenue"]);

    let months: Vec<i32> = monthly.column("month")?.i32()?.into_iter().flatten().collect();
    assert_eq!(months, vec![1, 2, 3, 5]);
    let labels: Vec<&str> = monthly.column("month_name")?.str()?.into_iter().flatten().collect();
    assert_eq!(labels, vec!["Jan", "Feb", "Mar", "May"]);

    let revenue = monthly.column("revenue")?.f64()?;
    assert!((revenue.get(0).unwrap() - 1014.98).abs() < EPS);
    assert!((revenue.get(3).unwrap() - 1074.98).abs() < EPS);
    Ok(())
}

#[test]
fn monthly_revenue_orders_by_year_before_month() -> PolarsResult<()> {
    let df = clean_rows(&[
        ("2024-01-05", "A", "C", 1.0),
        ("2023-12-05", "A", "C", 2.0),
        ("2023-02-05", "A", "C", 3.0),
    ]);
    let monthly = monthly_revenue(&df)?;
    let years: Vec<i32> = monthly.column("year")?.i32()?.into_iter().flatten().collect();
    let months: Vec<i32> = monthly.column("month")?.i32()?.into_iter().flatten().collect();
    assert_eq!(years, vec![2023, 2023, 2024]);
    assert_eq!(months, vec![2, 12, 1]);
    Ok(())
}

#[test]
fn matrix_fills_missing_combinations_with_zero() -> PolarsResult<()> {
    let df = sample_clean();
    let matrix = store_category_matrix(&df)?;

    assert_eq!(matrix.stores(), ["StoreA", "StoreB", "StoreC"]);
    assert_eq!(matrix.categories(), ["Apparel", "Electronics", "Grocery"]);
    assert_eq!(matrix.get("StoreA", "Apparel"), Some(0.0));
    assert_eq!(matrix.get("StoreC", "Grocery"), Some(0.0));
    assert!((matrix.get("StoreA", "Electronics").unwrap() - 1999.96).abs() < EPS);
    assert!((matrix.get("StoreB", "Apparel").unwrap() - 75.0).abs() < EPS);
    assert_eq!(matrix.get("StoreZ", "Apparel"), None);

    assert!((matrix.total() - overall_revenue(&df)?).abs() < EPS);
    Ok(())
}

#[test]
fn matrix_dataframe_has_one_column_per_category() -> PolarsResult<()> {
    let matrix = store_category_matrix(&sample_clean())?;
    let table = matrix.to_dataframe()?;

    let names: Vec<&str> = table.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["store", "Apparel", "Electronics", "Grocery"]);
    assert_eq!(table.height(), 3);

    let apparel = table.column("Apparel")?.f64()?;
    assert_eq!(apparel.get(0), Some(0.0));
    assert_eq!(apparel.get(2), Some(85.0));
    assert_eq!(matrix.row("StoreC"), Some(&[85.0, 0.0, 0.0][..]));
    Ok(())
}

#[test]
fn aggregation_leaves_input_untouched() -> PolarsResult<()> {
    let df = sample_clean();
    let before = df.clone();
    let report = build_report(&df)?;

    assert!(df.equals_missing(&before));
    assert_eq!(report.revenue_by_store.height(), 3);
    assert_eq!(report.monthly_revenue.height(), 4);
    Ok(())
}
