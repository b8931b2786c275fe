use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_RAW_PATH: &str = "data/raw/retail_sales_2023_india.csv";
pub const DEFAULT_PROCESSED_PATH: &str = "data/processed/retail_sales_2023_india_clean.csv";
pub const DEFAULT_REPORT_DIR: &str = "data/processed/kpi";

/// Where the pipeline reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub raw_path: PathBuf,
    pub processed_path: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from(DEFAULT_RAW_PATH),
            processed_path: PathBuf::from(DEFAULT_PROCESSED_PATH),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|err| PipelineError::Config(format!("invalid pipeline config: {err}")))
    }

    /// Loads a TOML config. Relative paths inside it resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| PipelineError::io(path, err))?;
        let config = Self::from_toml_str(&contents)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    pub fn relative_to(self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        Self {
            raw_path: resolve(self.raw_path),
            processed_path: resolve(self.processed_path),
            report_dir: resolve(self.report_dir),
        }
    }
}
