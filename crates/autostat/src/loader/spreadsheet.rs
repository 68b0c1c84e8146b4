//! Spreadsheet reading with calamine.
//!
//! The first worksheet is read; its first row is the header. Column types are
//! inferred from the cells: integers, then floats, then booleans, with text as
//! the fallback for anything mixed. Text cells holding one of the CSV
//! missing-value markers count as missing.

use super::csv::MISSING_MARKERS;
use crate::error::{AutoStatError, Result};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

/// Read the first worksheet of a workbook held in memory.
pub fn read_spreadsheet_bytes(file_name: &str, bytes: Vec<u8>) -> Result<DataFrame> {
    let parse_error = |reason: String| AutoStatError::SpreadsheetParse {
        file: file_name.to_string(),
        reason,
    };

    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| parse_error(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_error("workbook has no worksheets".to_string()))?
        .map_err(|e| parse_error(e.to_string()))?;

    let rows: Vec<&[Data]> = range.rows().collect();
    let Some((header_row, data_rows)) = rows.split_first() else {
        debug!(file = file_name, "Worksheet is empty");
        return Ok(DataFrame::empty());
    };

    let headers = header_names(header_row);
    let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
    for (index, name) in headers.iter().enumerate() {
        let cells: Vec<Option<&Data>> = data_rows
            .iter()
            .map(|row| row.get(index).filter(|cell| !is_missing(cell)))
            .collect();
        let cell_type = infer_cell_type(&cells);
        columns.push(column_to_series(name, &cells, cell_type).into());
    }

    debug!(
        file = file_name,
        rows = data_rows.len(),
        columns = columns.len(),
        "Read worksheet"
    );
    DataFrame::new(columns).map_err(|e| parse_error(e.to_string()))
}

/// Header names with blanks replaced and duplicates made unique.
///
/// A duplicate gets the first free `.N` suffix, so a later header that
/// already reads `name.1` never collides with a generated one.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();

    row.iter()
        .enumerate()
        .map(|(index, cell)| {
            let raw = cell.to_string().trim().to_string();
            let base = if raw.is_empty() {
                format!("column_{}", index + 1)
            } else {
                raw
            };

            let mut name = base.clone();
            while used.contains(&name) {
                let suffix = next_suffix.entry(base.clone()).or_insert(1);
                name = format!("{}.{}", base, suffix);
                *suffix += 1;
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

fn is_missing(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::Float(f) => f.is_nan(),
        Data::String(s) => {
            let s = s.trim();
            s.is_empty() || MISSING_MARKERS.contains(&s)
        }
        _ => false,
    }
}

fn infer_cell_type(cells: &[Option<&Data>]) -> CellType {
    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;

    for cell in cells.iter().flatten() {
        match cell {
            Data::Int(_) => has_int = true,
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => has_int = true,
            Data::Float(_) => has_float = true,
            Data::Bool(_) => has_bool = true,
            _ => return CellType::Utf8,
        }
    }

    match (has_int || has_float, has_bool) {
        (true, true) => CellType::Utf8,
        (true, false) if has_float => CellType::Float64,
        (true, false) => CellType::Int64,
        (false, true) => CellType::Boolean,
        (false, false) => CellType::Utf8,
    }
}

fn column_to_series(name: &str, cells: &[Option<&Data>], cell_type: CellType) -> Series {
    let name: PlSmallStr = name.into();
    match cell_type {
        CellType::Int64 => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Some(Data::Int(i)) => Some(*i),
                    Some(Data::Float(f)) => Some(*f as i64),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        CellType::Float64 => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Some(Data::Int(i)) => Some(*i as f64),
                    Some(Data::Float(f)) => Some(*f),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        CellType::Boolean => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Some(Data::Bool(b)) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        CellType::Utf8 => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| cell.map(|c| c.to_string()))
                .collect();
            Series::new(name, values)
        }
    }
}
