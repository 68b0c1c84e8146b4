use super::csv_export::to_csv_bytes;
use super::histogram::{Histogram, render_svg};
use super::pdf::PdfReport;
use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::pipeline::ColumnZStats;
use crate::profiler::SummaryTable;
use crate::types::{Artifact, ColumnImputation, PipelineResult};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CLEANED_CSV_FILE: &str = "cleaned_data.csv";
pub const CLEANED_CSV_MIME: &str = "text/csv";
pub const PDF_REPORT_FILE: &str = "autostat_ai_report.pdf";
pub const PDF_REPORT_MIME: &str = "application/pdf";
pub const HISTOGRAM_FILE: &str = "histogram.svg";
pub const HISTOGRAM_MIME: &str = "image/svg+xml";
pub const RUN_REPORT_FILE: &str = "autostat_report.json";

// ============================================================================
// Run Report
// ============================================================================

/// Machine-readable record of one pipeline run.
///
/// Printed by the CLI with `--json` and written as `autostat_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Name of the input file, when known
    pub input_file: Option<String>,
    /// Rows and columns after imputation
    pub imputed_shape: (usize, usize),
    /// Rows and columns of the cleaned table
    pub cleaned_shape: (usize, usize),
    /// Columns whose missing cells were filled
    pub imputations: Vec<ColumnImputation>,
    pub zscore_threshold: f64,
    pub numeric_columns: Vec<String>,
    pub outlier_count: usize,
    /// Row positions in the imputed table that were flagged
    pub outlier_rows: Vec<usize>,
    pub outlier_columns: Vec<ColumnZStats>,
    pub summary: SummaryTable,
    pub notices: Vec<String>,
    /// File names of the rendered artifacts
    pub artifacts: Vec<String>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn from_result(result: &PipelineResult, input_file: Option<&str>) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.map(str::to_string),
            imputed_shape: result.imputed.shape(),
            cleaned_shape: result.cleaned.shape(),
            imputations: result.imputations.clone(),
            zscore_threshold: result.outliers.threshold,
            numeric_columns: result.outliers.numeric_columns.clone(),
            outlier_count: result.outliers.outlier_count(),
            outlier_rows: result
                .outliers
                .flags
                .iter()
                .enumerate()
                .filter_map(|(row, flagged)| flagged.then_some(row))
                .collect(),
            outlier_columns: result.outliers.column_stats.clone(),
            summary: result.summary.clone(),
            notices: result.notices.clone(),
            artifacts: result
                .artifacts
                .iter()
                .map(|a| a.file_name.clone())
                .collect(),
            duration_ms: result.duration_ms,
        }
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Renders the downloadable outputs of a run and writes them to disk.
pub struct ReportGenerator {
    output_dir: PathBuf,
    generate_pdf: bool,
    generate_histogram: bool,
    histogram_bins: usize,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl ReportGenerator {
    /// Create a ReportGenerator writing into `output_dir` with every output enabled.
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Self::default()
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            generate_pdf: config.generate_pdf,
            generate_histogram: config.generate_histogram,
            histogram_bins: config.histogram_bins,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render the cleaned CSV, the PDF report and the histogram chart.
    ///
    /// The chart is skipped when the cleaned table has no numeric value.
    pub fn render_artifacts(
        &self,
        cleaned: &DataFrame,
        summary: &SummaryTable,
    ) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();

        let csv = to_csv_bytes(cleaned).context("Serializing cleaned table")?;
        artifacts.push(Artifact::new(CLEANED_CSV_FILE, CLEANED_CSV_MIME, csv));

        if self.generate_pdf {
            let pdf = PdfReport::from_summary(summary).render()?;
            debug!(bytes = pdf.len(), "Rendered PDF report");
            artifacts.push(Artifact::new(PDF_REPORT_FILE, PDF_REPORT_MIME, pdf));
        }

        if self.generate_histogram {
            let histograms =
                Histogram::for_table(cleaned, self.histogram_bins).context("Binning histogram")?;
            if histograms.is_empty() {
                debug!("No numeric values, histogram skipped");
            } else {
                let svg = render_svg(&histograms)?;
                artifacts.push(Artifact::new(HISTOGRAM_FILE, HISTOGRAM_MIME, svg.into_bytes()));
            }
        }

        Ok(artifacts)
    }

    /// Write every artifact into the output directory.
    pub fn write_artifacts(&self, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut paths = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let path = self.output_dir.join(&artifact.file_name);
            let mut file = File::create(&path)?;
            file.write_all(&artifact.bytes)?;
            info!("Saved: {}", path.display());
            paths.push(path);
        }

        Ok(paths)
    }

    /// Write the JSON run report into the output directory.
    pub fn write_run_report(&self, report: &RunReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(RUN_REPORT_FILE);
        let mut file = File::create(&path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Run report saved: {}", path.display());
        Ok(path)
    }
}
