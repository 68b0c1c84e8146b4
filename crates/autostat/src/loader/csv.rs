//! CSV reading with fallback strategies.

use crate::error::{AutoStatError, Result};
use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Cell texts read as missing, in addition to empty fields.
pub const MISSING_MARKERS: [&str; 9] = [
    "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

fn missing_markers() -> NullValues {
    NullValues::AllColumns(MISSING_MARKERS.iter().map(|m| (*m).into()).collect())
}

fn read_with(bytes: Vec<u8>, parse_options: CsvParseOptions) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(parse_options.with_null_values(Some(missing_markers())))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

/// Parse CSV bytes, retrying with looser settings when the first attempt fails.
pub fn read_csv_bytes(file_name: &str, bytes: &[u8]) -> Result<DataFrame> {
    // Strategy 1: standard loading with quote handling
    match read_with(
        bytes.to_vec(),
        CsvParseOptions::default().with_quote_char(Some(b'"')),
    ) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard CSV loading failed: {}", e),
    }

    // Strategy 2: without quote handling
    match read_with(bytes.to_vec(), CsvParseOptions::default().with_quote_char(None)) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("CSV loading without quotes failed: {}", e),
    }

    // Strategy 3: pre-cleaned content
    let cleaned = clean_csv_content(&String::from_utf8_lossy(bytes));
    read_with(cleaned.into_bytes(), CsvParseOptions::default()).map_err(|source| {
        AutoStatError::CsvParse {
            file: file_name.to_string(),
            source,
        }
    })
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
