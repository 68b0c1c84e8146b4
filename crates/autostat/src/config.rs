//! Configuration types for the cleaning pipeline.
//!
//! The strategies are fixed today (mode imputation, z-score outliers) but are
//! still modelled as enums so new variants slot in without changing callers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default absolute z-score above which a value marks its row as an outlier.
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// Default number of histogram bins per numeric column.
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Strategy for imputing missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    /// Use the most frequent observed value of the column (mode).
    /// Ties go to the value seen first in row order.
    #[default]
    MostFrequent,
}

/// Method used to flag outlier rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Flag a row when any numeric column has |z| above the threshold.
    #[default]
    ZScore,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use autostat::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .zscore_threshold(2.5)
///     .remove_outliers(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// How missing cells are filled.
    /// Default: MostFrequent
    pub imputation_strategy: ImputationStrategy,

    /// How outlier rows are detected.
    /// Default: ZScore
    pub outlier_method: OutlierMethod,

    /// Absolute z-score above which a row is flagged (strictly greater).
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// Whether flagged rows are dropped from the cleaned table.
    /// When false the flags are still reported but every row is kept.
    /// Default: true
    pub remove_outliers: bool,

    /// Whether to render the PDF summary report.
    /// Default: true
    pub generate_pdf: bool,

    /// Whether to render the histogram chart of numeric columns.
    /// Default: true
    pub generate_histogram: bool,

    /// Number of equal-width bins per histogram panel.
    /// Default: 10
    pub histogram_bins: usize,

    /// Output directory for the cleaned CSV and rendered reports.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Whether to write artifacts to `output_dir`.
    /// When false, artifacts are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            imputation_strategy: ImputationStrategy::default(),
            outlier_method: OutlierMethod::default(),
            zscore_threshold: DEFAULT_ZSCORE_THRESHOLD,
            remove_outliers: true,
            generate_pdf: true,
            generate_histogram: true,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            output_dir: PathBuf::from("outputs"),
            save_to_disk: true,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Called by the builder and the JSON loader.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.zscore_threshold.is_finite() || self.zscore_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(
                self.zscore_threshold,
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        Ok(())
    }
}

/// Why a configuration was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid z-score threshold: {0} (must be a finite number above 0)")]
    InvalidThreshold(f64),

    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),
}

/// Fluent construction of a validated [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    imputation_strategy: Option<ImputationStrategy>,
    outlier_method: Option<OutlierMethod>,
    zscore_threshold: Option<f64>,
    remove_outliers: Option<bool>,
    generate_pdf: Option<bool>,
    generate_histogram: Option<bool>,
    histogram_bins: Option<usize>,
    output_dir: Option<PathBuf>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the imputation strategy.
    pub fn imputation_strategy(mut self, strategy: ImputationStrategy) -> Self {
        self.imputation_strategy = Some(strategy);
        self
    }

    /// Set the outlier detection method.
    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier_method = Some(method);
        self
    }

    /// Set the z-score threshold.
    ///
    /// # Arguments
    /// * `threshold` - finite value above 0.0 (e.g., 3.0)
    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Drop flagged rows (true) or only report them (false).
    pub fn remove_outliers(mut self, remove: bool) -> Self {
        self.remove_outliers = Some(remove);
        self
    }

    /// Enable or disable the PDF report.
    pub fn generate_pdf(mut self, generate: bool) -> Self {
        self.generate_pdf = Some(generate);
        self
    }

    /// Enable or disable the histogram chart.
    pub fn generate_histogram(mut self, generate: bool) -> Self {
        self.generate_histogram = Some(generate);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the output directory for artifacts.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enable or disable writing artifacts to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Fill unset options with their defaults and validate.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            imputation_strategy: self.imputation_strategy.unwrap_or_default(),
            outlier_method: self.outlier_method.unwrap_or_default(),
            zscore_threshold: self.zscore_threshold.unwrap_or(DEFAULT_ZSCORE_THRESHOLD),
            remove_outliers: self.remove_outliers.unwrap_or(true),
            generate_pdf: self.generate_pdf.unwrap_or(true),
            generate_histogram: self.generate_histogram.unwrap_or(true),
            histogram_bins: self.histogram_bins.unwrap_or(DEFAULT_HISTOGRAM_BINS),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("outputs")),
            save_to_disk: self.save_to_disk.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
