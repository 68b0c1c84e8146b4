//! Survey Data Cleaning Library
//!
//! Automated cleaning of survey tables built with Rust and Polars.
//!
//! # Overview
//!
//! One pipeline run takes a CSV or spreadsheet table through these stages:
//!
//! - **Loading**: CSV with fallback strategies, spreadsheets through calamine
//! - **Imputation**: every missing cell gets the most frequent value of its column
//! - **Outlier Removal**: rows with any numeric |z-score| above a threshold are dropped
//! - **Summary**: count, mean, std, min, quartiles and max of the numeric columns
//! - **Reports**: cleaned CSV, a PDF summary report and an SVG histogram
//! - **Progress Reporting**: stage updates through a callback or trait object
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use autostat::{Pipeline, PipelineConfig, TableLoader};
//! use std::path::Path;
//!
//! let df = TableLoader::load_path(Path::new("survey.csv"))?;
//!
//! let config = PipelineConfig::builder()
//!     .zscore_threshold(3.0)
//!     .output_dir("outputs")
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! println!("Outliers removed: {}", result.outliers.outlier_count());
//! println!("{}", result.summary.render_text(Some(80)));
//! ```
//!
//! # Outputs
//!
//! | File | MIME |
//! |------|------|
//! | `cleaned_data.csv` | `text/csv` |
//! | `autostat_ai_report.pdf` | `application/pdf` |
//! | `histogram.svg` | `image/svg+xml` |
//! | `autostat_report.json` | run report, written with the other files |

pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, ImputationStrategy, OutlierMethod, PipelineConfig,
    PipelineConfigBuilder,
};
pub use error::{AutoStatError, Result as AutoStatResult, ResultExt};
pub use imputers::{ImputationOutcome, MostFrequentImputer};
pub use loader::{DEFAULT_PREVIEW_ROWS, FileFormat, TableLoader, preview};
pub use pipeline::{
    ClosureProgressReporter, OutlierFlagger, OutlierFlags, OutlierReport, Pipeline,
    PipelineBuilder, PipelineStage, ProgressReporter, ProgressUpdate,
};
pub use profiler::{ColumnStatistics, Statistic, SummaryTable};
pub use reporting::{Histogram, PdfReport, ReportGenerator, RunReport};
pub use types::{Artifact, ColumnImputation, ColumnKind, PipelineResult};
