//! Pipeline module.
//!
//! This module provides the cleaning pipeline and its stages.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::{ColumnZStats, OutlierFlagger, OutlierFlags, OutlierOutcome, OutlierReport};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
