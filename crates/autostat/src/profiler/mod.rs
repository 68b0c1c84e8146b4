//! Data profiling module.
//!
//! This module computes the descriptive statistics reported for a cleaned
//! table:
//! - count, mean and sample standard deviation
//! - min, quartiles and max
//!
//! The numeric helpers in `statistics` are shared with the outlier flagger.

pub(crate) mod statistics;
mod summary;

pub use summary::{ColumnStatistics, Statistic, SummaryTable};
