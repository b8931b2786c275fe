use std::fs;
use std::path::Path;

use polars::prelude::DataFrame;
use retail_parser::{parse_sales_csv, RawSalesTable};
use serde::Serialize;
use tracing::info;

use crate::cleaning::{clean_with_report, CleaningReport};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::kpi::{build_report, KpiReport};
use crate::outputs::{self, ReportPaths};

/// Outcome of the `clean` stage.
#[derive(Debug, Clone, Serialize)]
pub struct CleanSummary {
    pub source_hash: String,
    pub report: CleaningReport,
}

#[derive(Debug)]
pub struct CleanedSales {
    pub df: DataFrame,
    pub summary: CleanSummary,
}

#[derive(Debug)]
pub struct ReportRun {
    pub kpis: KpiReport,
    pub clean: CleanSummary,
    pub paths: ReportPaths,
}

pub fn load_raw(path: &Path) -> Result<RawSalesTable> {
    let content = fs::read(path).map_err(|err| PipelineError::io(path, err))?;
    let raw = parse_sales_csv(&content)?;
    info!(
        path = %path.display(),
        rows = raw.height(),
        file_hash = %raw.file_hash,
        "Loaded raw sales file"
    );
    Ok(raw)
}

/// Load → clean, without touching the output locations.
pub fn clean_file(path: &Path) -> Result<CleanedSales> {
    let raw = load_raw(path)?;
    let (df, report) = clean_with_report(&raw.df)?;
    report.log();
    Ok(CleanedSales {
        df,
        summary: CleanSummary {
            source_hash: raw.file_hash,
            report,
        },
    })
}

/// Cleans the configured raw file and saves it to the processed location.
pub fn run_clean(config: &PipelineConfig) -> Result<CleanedSales> {
    let cleaned = clean_file(&config.raw_path)?;
    outputs::write_cleaned(&cleaned.df, &config.processed_path)?;
    Ok(cleaned)
}

/// Cleans the configured raw file, computes every KPI and saves them to the report directory.
pub fn run_report(config: &PipelineConfig) -> Result<ReportRun> {
    let cleaned = clean_file(&config.raw_path)?;
    let kpis = build_report(&cleaned.df)?;
    let paths = outputs::write_report(&kpis, &config.report_dir)?;
    Ok(ReportRun {
        kpis,
        clean: cleaned.summary,
        paths,
    })
}
