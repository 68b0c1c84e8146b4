//! Report rendering.
//!
//! Turns the cleaned table and its summary into downloadable artifacts:
//! - the cleaned table as CSV
//! - a PDF with the summary statistics
//! - an SVG histogram of the numeric columns

pub mod csv_export;
mod generator;
pub mod histogram;
pub mod pdf;

pub use generator::{
    CLEANED_CSV_FILE, CLEANED_CSV_MIME, HISTOGRAM_FILE, HISTOGRAM_MIME, PDF_REPORT_FILE,
    PDF_REPORT_MIME, RUN_REPORT_FILE, ReportGenerator, RunReport,
};
pub use histogram::Histogram;
pub use pdf::PdfReport;
