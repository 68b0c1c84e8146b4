use crate::pipeline::OutlierReport;
use crate::profiler::SummaryTable;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a column takes part in outlier detection and summary statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    NonNumeric,
}

/// Record of one column whose missing cells were filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnImputation {
    pub column: String,
    pub kind: ColumnKind,
    /// The fill value, rendered as text.
    pub fill_value: String,
    pub cells_filled: usize,
}

/// A rendered output offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, mime: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime,
            bytes,
        }
    }
}

/// Everything one pipeline run produces.
///
/// All tables are owned; a new run builds a new result.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Input table with every missing cell filled.
    pub imputed: DataFrame,
    /// Outlier flags over `imputed`.
    pub outliers: OutlierReport,
    /// `imputed` minus the removed outlier rows.
    pub cleaned: DataFrame,
    /// Descriptive statistics of `cleaned`.
    pub summary: SummaryTable,
    /// Columns that had missing cells and what filled them.
    pub imputations: Vec<ColumnImputation>,
    /// Informational, non-fatal messages for the user.
    pub notices: Vec<String>,
    /// Rendered outputs (cleaned CSV, PDF report, histogram).
    pub artifacts: Vec<Artifact>,
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Rows of the imputed table that were flagged as outliers.
    pub fn outlier_rows(&self) -> PolarsResult<DataFrame> {
        self.outliers.flagged_rows(&self.imputed)
    }

    /// Find a rendered artifact by file name.
    pub fn artifact(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }
}
