//! Cleaned table export.

use polars::prelude::*;

/// Serialize a table as CSV: header row, comma separated, no index column.
pub fn to_csv_bytes(df: &DataFrame) -> PolarsResult<Vec<u8>> {
    let mut df = df.clone();
    let mut buf: Vec<u8> = Vec::new();

    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)?;

    Ok(buf)
}
