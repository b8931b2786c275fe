use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use retail_core::config::PipelineConfig;
use retail_core::pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(author, version, about = "Retail sales cleaning and KPI reporting", long_about = None)]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the raw sales file and save it to the processed location
    Clean,
    /// Clean the raw sales file, then compute and save the KPI report
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
struct PathArgs {
    /// TOML file providing raw_path, processed_path and report_dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Raw sales CSV (env: RETAIL_RAW_PATH)
    #[arg(long, global = true)]
    raw: Option<PathBuf>,
    /// Cleaned CSV destination (env: RETAIL_PROCESSED_PATH)
    #[arg(long, global = true)]
    processed: Option<PathBuf>,
    /// KPI report directory (env: RETAIL_REPORT_DIR)
    #[arg(long, global = true)]
    report_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct ReportArgs {
    /// Skip printing the KPI tables to stdout
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.paths)?;

    match cli.command {
        Command::Clean => handle_clean(&config),
        Command::Report(args) => handle_report(&config, args),
    }
}

fn resolve_config(args: &PathArgs) -> Result<PipelineConfig> {
    dotenvy::dotenv().ok();
    resolve_config_with(args, |key| env::var_os(key))
}

/// Layers the path sources: flag, then `lookup` (the environment), then the TOML file, then defaults.
fn resolve_config_with<F>(args: &PathArgs, lookup: F) -> Result<PipelineConfig>
where
    F: Fn(&str) -> Option<OsString>,
{
    let env_path = |key: &str| {
        lookup(key)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    };

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(path) = args.raw.clone().or_else(|| env_path("RETAIL_RAW_PATH")) {
        config.raw_path = path;
    }
    if let Some(path) = args
        .processed
        .clone()
        .or_else(|| env_path("RETAIL_PROCESSED_PATH"))
    {
        config.processed_path = path;
    }
    if let Some(path) = args
        .report_dir
        .clone()
        .or_else(|| env_path("RETAIL_REPORT_DIR"))
    {
        config.report_dir = path;
    }

    Ok(config)
}

fn handle_clean(config: &PipelineConfig) -> Result<()> {
    let cleaned = pipeline::run_clean(config).with_context(|| {
        format!(
            "failed to clean {} into {}",
            config.raw_path.display(),
            config.processed_path.display()
        )
    })?;

    let report = cleaned.summary.report;
    println!(
        "Saved cleaned data to {} ({} of {} rows kept, {} revenue mismatches)",
        config.processed_path.display(),
        report.retained_rows,
        report.input_rows,
        report.revenue_mismatches
    );
    Ok(())
}

fn handle_report(config: &PipelineConfig, args: ReportArgs) -> Result<()> {
    let run = pipeline::run_report(config).with_context(|| {
        format!(
            "failed to build KPI report from {}",
            config.raw_path.display()
        )
    })?;

    info!(
        source_hash = %run.clean.source_hash,
        dropped_rows = run.clean.report.dropped_rows,
        "KPI report complete"
    );

    if !args.quiet {
        println!("{}", render::summary_table(&run.kpis.summary));
        println!("{}", render::ranking_table(&run.kpis.revenue_by_store, "store")?);
        println!(
            "{}",
            render::ranking_table(&run.kpis.revenue_by_category, "category")?
        );
        println!("{}", render::monthly_table(&run.kpis.monthly_revenue)?);
        println!("{}", render::matrix_table(&run.kpis.store_category_matrix));
    }
    println!("Saved KPI report to {}", config.report_dir.display());
    Ok(())
}
