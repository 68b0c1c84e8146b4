//! Input loading.
//!
//! A file whose name ends in `.csv` is parsed as CSV; anything else is handed
//! to the spreadsheet reader, which rejects bytes that are not a workbook.

mod csv;
mod spreadsheet;

pub use csv::MISSING_MARKERS;

use crate::error::{AutoStatError, Result};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Number of rows shown in the data preview by default.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Input format, decided from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// `.csv` (any case) is CSV, everything else is treated as a spreadsheet.
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.to_ascii_lowercase().ends_with(".csv") {
            FileFormat::Csv
        } else {
            FileFormat::Spreadsheet
        }
    }
}

/// Loads an input file into a table.
pub struct TableLoader;

impl TableLoader {
    /// Read and parse a file from disk.
    pub fn load_path(path: &Path) -> Result<DataFrame> {
        let bytes = std::fs::read(path).map_err(|source| AutoStatError::InputRead {
            path: path.display().to_string(),
            source,
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        Self::load_bytes(file_name, bytes)
    }

    /// Parse an uploaded file held in memory.
    pub fn load_bytes(file_name: &str, bytes: Vec<u8>) -> Result<DataFrame> {
        let format = FileFormat::from_file_name(file_name);
        let df = match format {
            FileFormat::Csv => csv::read_csv_bytes(file_name, &bytes)?,
            FileFormat::Spreadsheet => spreadsheet::read_spreadsheet_bytes(file_name, bytes)?,
        };

        info!(
            file = file_name,
            format = ?format,
            rows = df.height(),
            columns = df.width(),
            "Loaded input table"
        );
        Ok(df)
    }
}

/// The first `n` rows of a table.
pub fn preview(df: &DataFrame, n: usize) -> DataFrame {
    df.head(Some(n))
}
