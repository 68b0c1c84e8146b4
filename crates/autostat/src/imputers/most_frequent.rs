//! Most-frequent-value imputation.
//!
//! Missing cells of every column are replaced with the column's mode. Ties
//! go to the value seen first in row order.

use crate::error::{AutoStatError, Result, ResultExt};
use crate::types::{ColumnImputation, ColumnKind};
use crate::utils::{
    column_kind, fill_float_nulls, fill_integer_nulls_with_mode, fill_string_nulls, first_mode,
    float_key, format_number, present_numeric_values, string_values,
};
use polars::prelude::*;
use tracing::{debug, info};

/// Result of imputing a table.
#[derive(Debug, Clone)]
pub struct ImputationOutcome {
    /// The table with every missing cell filled.
    pub imputed: DataFrame,
    /// One record per column that had missing cells.
    pub imputations: Vec<ColumnImputation>,
}

/// Fills missing cells with the most frequent value of their column.
///
/// Numeric columns keep their dtype, and integer modes are counted on the
/// integers themselves rather than on a float view. Other columns are filled on their text
/// rendering and come out as String columns. Columns without missing cells
/// are left untouched, so imputing an already imputed table is a no-op.
pub struct MostFrequentImputer;

impl MostFrequentImputer {
    /// Impute every column of `df`.
    ///
    /// Fails with [`AutoStatError::NoValidValues`] when a column of a
    /// non-empty table has no observed value at all.
    pub fn impute(df: &DataFrame) -> Result<ImputationOutcome> {
        let mut imputed = df.clone();
        let mut imputations = Vec::new();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        for name in &names {
            let series = df
                .column(name)
                .map_err(|_| AutoStatError::ColumnNotFound(name.clone()))?
                .as_materialized_series()
                .clone();

            let missing = series.null_count();
            if missing == 0 {
                continue;
            }

            let kind = column_kind(series.dtype());
            let (filled, fill_value) = match kind {
                ColumnKind::Numeric if series.dtype().is_integer() => {
                    Self::impute_integer(&series)?
                }
                ColumnKind::Numeric => Self::impute_float(&series)?,
                ColumnKind::NonNumeric => Self::impute_text(&series)?,
            };

            imputed
                .replace(name, filled)
                .context(format!("Replacing imputed column '{}'", name))?;

            debug!(column = %name, fill_value = %fill_value, cells = missing, "Imputed column");
            imputations.push(ColumnImputation {
                column: name.clone(),
                kind,
                fill_value,
                cells_filled: missing,
            });
        }

        if imputed.width() != df.width() || imputed.height() != df.height() {
            return Err(AutoStatError::ImputationFailed {
                column: String::from("*"),
                reason: format!(
                    "shape changed from {:?} to {:?}",
                    df.shape(),
                    imputed.shape()
                ),
            });
        }

        info!(
            columns = imputations.len(),
            cells = imputations.iter().map(|i| i.cells_filled).sum::<usize>(),
            "Imputation complete"
        );

        Ok(ImputationOutcome {
            imputed,
            imputations,
        })
    }

    fn impute_integer(series: &Series) -> Result<(Series, String)> {
        let name = series.name().to_string();

        let filled = fill_integer_nulls_with_mode(series).map_err(|e| {
            AutoStatError::ImputationFailed {
                column: name.clone(),
                reason: e.to_string(),
            }
        })?;

        filled.ok_or(AutoStatError::NoValidValues(name))
    }

    fn impute_float(series: &Series) -> Result<(Series, String)> {
        let name = series.name().to_string();
        let values = present_numeric_values(series)?;

        let mode = first_mode(values, float_key)
            .ok_or_else(|| AutoStatError::NoValidValues(name.clone()))?;

        let filled = fill_float_nulls(series, mode).map_err(|e| {
            AutoStatError::ImputationFailed {
                column: name,
                reason: e.to_string(),
            }
        })?;

        Ok((filled, format_number(mode)))
    }

    fn impute_text(series: &Series) -> Result<(Series, String)> {
        let name = series.name().to_string();
        let values = string_values(series)?.into_iter().flatten();

        let mode = first_mode(values, |v| v.clone())
            .ok_or_else(|| AutoStatError::NoValidValues(name.clone()))?;

        let filled = fill_string_nulls(series, &mode).map_err(|e| {
            AutoStatError::ImputationFailed {
                column: name,
                reason: e.to_string(),
            }
        })?;

        Ok((filled, mode))
    }
}
