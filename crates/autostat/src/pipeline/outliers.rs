//! Outlier detection module.
//!
//! Rows are flagged with a z-score test over the numeric columns: a row is an
//! outlier when any of its numeric values lies more than `threshold`
//! population standard deviations from its column mean.

use crate::error::{Result, ResultExt};
use crate::profiler::statistics::{is_constant, mean, std_dev};
use crate::utils::{numeric_column_names, numeric_values, present_numeric_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One boolean per row of the table the flags were computed on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutlierFlags(Vec<bool>);

impl OutlierFlags {
    /// Number of flagged rows.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|f| **f).count()
    }

    /// Number of rows covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// Whether row `index` is flagged.
    pub fn is_flagged(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// Boolean mask selecting the flagged rows.
    pub fn mask(&self) -> BooleanChunked {
        BooleanChunked::from_slice("outlier".into(), &self.0)
    }

    /// Boolean mask selecting the rows to keep.
    pub fn keep_mask(&self) -> BooleanChunked {
        let keep: Vec<bool> = self.0.iter().map(|f| !f).collect();
        BooleanChunked::from_slice("keep".into(), &keep)
    }
}

/// Mean and deviation used to score one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnZStats {
    pub column: String,
    pub mean: Option<f64>,
    /// Population standard deviation.
    pub std: Option<f64>,
    /// Rows whose value in this column exceeded the threshold.
    pub flagged: usize,
    /// Zero-variance columns never flag a row.
    pub skipped_constant: bool,
}

/// Flags computed over one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub threshold: f64,
    /// Numeric columns that took part in the test.
    pub numeric_columns: Vec<String>,
    pub flags: OutlierFlags,
    pub column_stats: Vec<ColumnZStats>,
}

impl OutlierReport {
    pub fn has_numeric_columns(&self) -> bool {
        !self.numeric_columns.is_empty()
    }

    /// Number of flagged rows.
    pub fn outlier_count(&self) -> usize {
        self.flags.count()
    }

    /// The flagged rows of `df`, which must be the table the flags were
    /// computed on.
    pub fn flagged_rows(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        df.filter(&self.flags.mask())
    }
}

/// Result of running the flagger.
#[derive(Debug, Clone)]
pub struct OutlierOutcome {
    pub report: OutlierReport,
    /// Input minus the flagged rows.
    pub cleaned: DataFrame,
}

/// Z-score outlier flagger.
#[derive(Debug, Clone, Copy)]
pub struct OutlierFlagger {
    threshold: f64,
}

impl OutlierFlagger {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compute the flags of every row of `df`.
    ///
    /// A table without numeric columns gets no flags set.
    pub fn flag(&self, df: &DataFrame) -> Result<OutlierReport> {
        let numeric_columns = numeric_column_names(df);
        let mut flags = vec![false; df.height()];
        let mut column_stats = Vec::with_capacity(numeric_columns.len());

        for name in &numeric_columns {
            let series = df
                .column(name)
                .context(format!("Reading column '{}'", name))?
                .as_materialized_series();
            column_stats.push(self.flag_column(series, &mut flags)?);
        }

        let report = OutlierReport {
            threshold: self.threshold,
            numeric_columns,
            flags: OutlierFlags(flags),
            column_stats,
        };

        info!(
            rows = df.height(),
            outliers = report.outlier_count(),
            threshold = self.threshold,
            "Outlier detection complete"
        );

        Ok(report)
    }

    /// Flag the rows of `df` and drop them from the cleaned table.
    pub fn run(&self, df: &DataFrame) -> Result<OutlierOutcome> {
        let report = self.flag(df)?;
        let cleaned = df
            .filter(&report.flags.keep_mask())
            .context("Removing outlier rows")?;

        Ok(OutlierOutcome { report, cleaned })
    }

    fn flag_column(&self, series: &Series, flags: &mut [bool]) -> Result<ColumnZStats> {
        let column = series.name().to_string();
        let present = present_numeric_values(series)?;
        let mean = mean(&present);
        let std = std_dev(&present, 0);

        let (Some(mu), Some(sigma)) = (mean, std) else {
            return Ok(ColumnZStats {
                column,
                mean,
                std,
                flagged: 0,
                skipped_constant: false,
            });
        };

        if is_constant(&present) || sigma == 0.0 || !sigma.is_finite() {
            debug!(column = %column, "Zero-variance column, no rows flagged");
            return Ok(ColumnZStats {
                column,
                mean,
                std,
                flagged: 0,
                skipped_constant: true,
            });
        }

        let mut flagged = 0;
        for (row, value) in numeric_values(series)?.into_iter().enumerate() {
            let Some(value) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            if ((value - mu) / sigma).abs() > self.threshold {
                flagged += 1;
                flags[row] = true;
            }
        }

        debug!(column = %column, mean = mu, std = sigma, flagged, "Scored column");
        Ok(ColumnZStats {
            column,
            mean,
            std,
            flagged,
            skipped_constant: false,
        })
    }
}
