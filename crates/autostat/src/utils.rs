//! Shared utilities for the cleaning pipeline.
//!
//! Column classification, typed views of a Series, and null filling used by
//! the imputer, the outlier flagger and the summary stage.

use crate::types::ColumnKind;
use polars::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Classify a column by its dtype.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else {
        ColumnKind::NonNumeric
    }
}

/// Names of the numeric columns of a table, in column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| column_kind(col.dtype()) == ColumnKind::Numeric)
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Series Views
// =============================================================================

/// Values of a numeric Series as `f64`, nulls preserved.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Non-null values of a numeric Series as `f64`. NaN counts as missing.
pub fn present_numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_values(series)?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Values of any Series rendered as text, nulls preserved.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Mode
// =============================================================================

/// Most frequent item of `values`, comparing items through `key`.
///
/// Ties go to the item that appears first.
pub fn first_mode<T, K, F>(values: impl IntoIterator<Item = T>, key: F) -> Option<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    // count and position in `distinct` for every key
    let mut tally: HashMap<K, (usize, usize)> = HashMap::new();
    let mut distinct: Vec<T> = Vec::new();

    for value in values {
        let k = key(&value);
        match tally.get_mut(&k) {
            Some((count, _)) => *count += 1,
            None => {
                tally.insert(k, (1, distinct.len()));
                distinct.push(value);
            }
        }
    }

    let (_, position) = tally
        .into_values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))?;
    distinct.into_iter().nth(position)
}

/// Bit pattern used to compare floats for equality when counting modes.
#[inline]
pub fn float_key(value: &f64) -> u64 {
    // -0.0 and 0.0 are the same observation
    if *value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a float Series with a specific value.
///
/// The result keeps the dtype of the input. Integer columns go through
/// [`fill_integer_nulls_with_mode`] so large values are not rounded.
pub fn fill_float_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let widened = series.cast(&DataType::Float64)?;
    widened
        .f64()?
        .fill_null_with_values(fill_value)?
        .into_series()
        .cast(series.dtype())
}

/// Fill the nulls of an integer Series with its most frequent value,
/// counted on the native integers.
///
/// Returns the filled Series (same dtype) and the mode as text, or `None`
/// when the column has no observed value.
pub fn fill_integer_nulls_with_mode(series: &Series) -> PolarsResult<Option<(Series, String)>> {
    let filled = if series.dtype() == &DataType::UInt64 {
        fill_with_mode(series.u64()?)?
    } else {
        // every other integer dtype widens to i64 without loss
        let widened = series.cast(&DataType::Int64)?;
        fill_with_mode(widened.i64()?)?
    };

    match filled {
        Some((filled, mode)) => Ok(Some((filled.cast(series.dtype())?, mode))),
        None => Ok(None),
    }
}

fn fill_with_mode<T>(ca: &ChunkedArray<T>) -> PolarsResult<Option<(Series, String)>>
where
    T: PolarsIntegerType,
    T::Native: Hash + Eq + std::fmt::Display,
    ChunkedArray<T>: IntoSeries,
{
    let Some(mode) = first_mode(ca.into_iter().flatten(), |v| *v) else {
        return Ok(None);
    };
    let filled = ca.fill_null_with_values(mode)?;
    Ok(Some((filled.into_series(), mode.to_string())))
}

/// Fill null values in a Series with a text value. The result is a String Series.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = string_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Render an `f64` the way it appears in a CSV cell: integers without a
/// fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_column_names() {
        let df = df![
            "age" => [25i64, 30, 28],
            "city" => ["A", "B", "A"],
            "score" => [1.5, 2.5, 3.5],
        ]
        .unwrap();

        assert_eq!(numeric_column_names(&df), vec!["age", "score"]);
    }

    #[test]
    fn test_first_mode_prefers_higher_count() {
        let values = ["b", "a", "a", "c"];
        assert_eq!(first_mode(values, |v| *v), Some("a"));
    }

    #[test]
    fn test_first_mode_tie_goes_to_first_seen() {
        let values = [30.0, 25.0, 28.0, 25.0, 30.0];
        assert_eq!(first_mode(values, float_key), Some(30.0));

        let values = [25.0, 30.0, 28.0, 1000.0];
        assert_eq!(first_mode(values, float_key), Some(25.0));
    }

    #[test]
    fn test_first_mode_empty() {
        let values: Vec<&str> = vec![];
        assert_eq!(first_mode(values, |v| *v), None);
    }

    #[test]
    fn test_float_key_treats_signed_zero_equal() {
        assert_eq!(float_key(&0.0), float_key(&-0.0));
        assert_ne!(float_key(&1.0), float_key(&-1.0));
    }

    #[test]
    fn test_fill_float_nulls_keeps_dtype() {
        let series = Series::new("score".into(), &[Some(1.5f32), None, Some(2.5)]);
        let filled = fill_float_nulls(&series, 1.5).unwrap();

        assert_eq!(filled.dtype(), &DataType::Float32);
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 1.5);
    }

    #[test]
    fn test_fill_integer_nulls_keeps_large_values() {
        let big = 1i64 << 53;
        let series = Series::new(
            "id".into(),
            &[Some(big + 1), Some(big + 3), None, Some(big + 1)],
        );

        let (filled, mode) = fill_integer_nulls_with_mode(&series).unwrap().unwrap();

        assert_eq!(mode, (big + 1).to_string());
        assert_eq!(filled.dtype(), &DataType::Int64);
        let values: Vec<Option<i64>> = filled.i64().unwrap().into_iter().collect();
        assert_eq!(
            values,
            vec![Some(big + 1), Some(big + 3), Some(big + 1), Some(big + 1)]
        );
    }

    #[test]
    fn test_fill_integer_nulls_narrow_and_unsigned() {
        let narrow = Series::new("wave".into(), &[Some(2i32), None, Some(2), Some(7)]);
        let (filled, _) = fill_integer_nulls_with_mode(&narrow).unwrap().unwrap();
        assert_eq!(filled.dtype(), &DataType::Int32);
        assert_eq!(filled.get(1).unwrap().try_extract::<i32>().unwrap(), 2);

        let unsigned = Series::new("count".into(), &[Some(u64::MAX), None, Some(1u64)]);
        let (filled, mode) = fill_integer_nulls_with_mode(&unsigned).unwrap().unwrap();
        assert_eq!(mode, u64::MAX.to_string());
        assert_eq!(filled.u64().unwrap().get(1), Some(u64::MAX));
    }

    #[test]
    fn test_fill_integer_nulls_all_missing() {
        let series = Series::new("id".into(), &[None::<i64>, None]);
        assert!(fill_integer_nulls_with_mode(&series).unwrap().is_none());
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("city".into(), &[Some("A"), None, Some("B")]);
        let filled = fill_string_nulls(&series, "A").unwrap();

        let values = string_values(&filled).unwrap();
        assert_eq!(
            values,
            vec![
                Some("A".to_string()),
                Some("A".to_string()),
                Some("B".to_string())
            ]
        );
    }

    #[test]
    fn test_present_numeric_values_skips_nulls() {
        let series = Series::new("x".into(), &[Some(1.0), None, Some(f64::NAN), Some(4.0)]);
        assert_eq!(present_numeric_values(&series).unwrap(), vec![1.0, 4.0]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(25.0), "25");
        assert_eq!(format_number(2.5), "2.5");
    }
}
