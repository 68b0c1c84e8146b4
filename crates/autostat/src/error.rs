//! Error types for the cleaning pipeline.
//!
//! Every stage returns [`AutoStatError`]. Errors carry a stable code and
//! serialize as `{ code, message }` so an embedding UI can render them.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Errors raised while loading, cleaning or reporting on a table.
#[derive(Error, Debug)]
pub enum AutoStatError {
    #[error("Column '{0}' does not exist in the table")]
    ColumnNotFound(String),

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Every cell of the column is missing, so it has no mode.
    #[error("Column '{0}' has no observed values to impute from")]
    NoValidValues(String),

    #[error("Could not fill missing cells of '{column}': {reason}")]
    ImputationFailed { column: String, reason: String },

    /// The bytes are not a workbook calamine can open.
    #[error("Failed to read spreadsheet '{file}': {reason}")]
    SpreadsheetParse { file: String, reason: String },

    /// The CSV reader rejected the input under every parse strategy.
    #[error("Failed to parse CSV '{file}': {source}")]
    CsvParse {
        file: String,
        #[source]
        source: polars::error::PolarsError,
    },

    /// The input file could not be read from disk.
    #[error("Failed to read input '{path}': {source}")]
    InputRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// PDF or chart rendering failed.
    #[error("Report rendering failed: {0}")]
    ReportGenerationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error annotated with the step that produced it.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AutoStatError>,
    },
}

impl AutoStatError {
    /// Wrap the error with a description of the failing step.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AutoStatError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code. Context wrappers report the inner code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::ImputationFailed { .. } => "IMPUTATION_FAILED",
            Self::SpreadsheetParse { .. } => "SPREADSHEET_PARSE_ERROR",
            Self::CsvParse { .. } => "CSV_PARSE_ERROR",
            Self::InputRead { .. } => "INPUT_READ_ERROR",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error comes from reading the input file rather than from
    /// the cleaning stages. Only the loader raises these variants; a Polars
    /// or I/O failure inside a later stage is not an input error.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::SpreadsheetParse { .. } | Self::CsvParse { .. } | Self::InputRead { .. } => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AutoStatError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AutoStatError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AutoStatError>;

/// `.context(..)` for pipeline and Polars results.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AutoStatError::Polars(e).with_context(context))
    }
}
