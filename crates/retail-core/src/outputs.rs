use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::kpi::{KpiReport, StoreCategoryMatrix};

pub const SUMMARY_FILE: &str = "kpi_summary.json";
pub const REVENUE_BY_STORE_FILE: &str = "revenue_by_store.csv";
pub const REVENUE_BY_CATEGORY_FILE: &str = "revenue_by_category.csv";
pub const MONTHLY_REVENUE_FILE: &str = "monthly_revenue.csv";
pub const STORE_CATEGORY_MATRIX_FILE: &str = "store_category_matrix.csv";

/// Files written for one KPI report.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub summary: PathBuf,
    pub revenue_by_store: PathBuf,
    pub revenue_by_category: PathBuf,
    pub monthly_revenue: PathBuf,
    pub store_category_matrix: PathBuf,
}

/// Writes `df` as a headed CSV, creating parent directories as needed.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path).map_err(|err| PipelineError::io(path, err))?;
    let mut clone = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut clone)?;
    Ok(())
}

pub fn write_cleaned(df: &DataFrame, path: &Path) -> Result<()> {
    write_csv(df, path)?;
    info!(path = %path.display(), rows = df.height(), "Saved cleaned data");
    Ok(())
}

pub fn write_report(report: &KpiReport, dir: &Path) -> Result<ReportPaths> {
    fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;

    let paths = ReportPaths {
        summary: dir.join(SUMMARY_FILE),
        revenue_by_store: dir.join(REVENUE_BY_STORE_FILE),
        revenue_by_category: dir.join(REVENUE_BY_CATEGORY_FILE),
        monthly_revenue: dir.join(MONTHLY_REVENUE_FILE),
        store_category_matrix: dir.join(STORE_CATEGORY_MATRIX_FILE),
    };

    let summary_bytes = serde_json::to_vec_pretty(&report.summary)?;
    fs::write(&paths.summary, summary_bytes).map_err(|err| PipelineError::io(&paths.summary, err))?;

    write_csv(&report.revenue_by_store, &paths.revenue_by_store)?;
    write_csv(&report.revenue_by_category, &paths.revenue_by_category)?;
    write_csv(&report.monthly_revenue, &paths.monthly_revenue)?;
    write_matrix_csv(&report.store_category_matrix, &paths.store_category_matrix)?;

    info!(dir = %dir.display(), "Saved KPI report");
    Ok(paths)
}

/// Writes the matrix with a leading `store` label column. Written record by record
/// because a category may itself be called `store`.
pub fn write_matrix_csv(matrix: &StoreCategoryMatrix, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|err| PipelineError::io(path, err))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = Vec::with_capacity(matrix.categories().len() + 1);
    header.push("store");
    header.extend(matrix.categories().iter().map(String::as_str));
    writer.write_record(&header)?;

    for store in matrix.stores() {
        let mut record = vec![store.clone()];
        if let Some(cells) = matrix.row(store) {
            record.extend(cells.iter().map(f64::to_string));
        }
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|err| PipelineError::io(path, err))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| PipelineError::io(parent, err))
        }
        _ => Ok(()),
    }
}
