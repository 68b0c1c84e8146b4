//! Imputation module for handling missing values.
//!
//! Every column with missing cells is filled with its most frequent observed
//! value.

mod most_frequent;

pub use most_frequent::{ImputationOutcome, MostFrequentImputer};
