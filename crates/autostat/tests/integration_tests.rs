//! Integration tests for the survey cleaning pipeline.
//!
//! These tests run the loader, the pipeline and the report writers end to end
//! on the CSV and workbook fixtures.

use autostat::reporting::{CLEANED_CSV_FILE, HISTOGRAM_FILE, PDF_REPORT_FILE, RUN_REPORT_FILE};
use autostat::{
    AutoStatError, MostFrequentImputer, Pipeline, PipelineConfig, PipelineResult, PipelineStage,
    RunReport, Statistic, TableLoader,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> DataFrame {
    TableLoader::load_path(&fixtures_path().join(filename)).expect("Failed to load fixture")
}

fn in_memory(threshold: f64) -> PipelineConfig {
    PipelineConfig::builder()
        .zscore_threshold(threshold)
        .save_to_disk(false)
        .build()
        .unwrap()
}

fn run(df: DataFrame, config: PipelineConfig) -> PipelineResult {
    Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(df)
        .unwrap()
}

fn i64_values(df: &DataFrame, column: &str) -> Vec<Option<i64>> {
    df.column(column).unwrap().i64().unwrap().into_iter().collect()
}

fn str_values(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

// ============================================================================
// Survey Scenario
// ============================================================================

#[test]
fn test_scenario_imputation() {
    let result = run(load_fixture("survey_scenario.csv"), in_memory(3.0));

    assert_eq!(
        i64_values(&result.imputed, "age"),
        vec![Some(25), Some(30), Some(25), Some(28), Some(1000)]
    );
    assert_eq!(
        str_values(&result.imputed, "city"),
        ["A", "B", "A", "A", "A"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_scenario_default_threshold_keeps_all_rows() {
    // with five rows no |z| can exceed 2
    let result = run(load_fixture("survey_scenario.csv"), in_memory(3.0));

    assert_eq!(result.outliers.outlier_count(), 0);
    assert_eq!(result.cleaned.height(), 5);
}

#[test]
fn test_scenario_lower_threshold_removes_extreme_row() {
    let result = run(load_fixture("survey_scenario.csv"), in_memory(1.5));

    assert_eq!(result.outliers.outlier_count(), 1);
    assert_eq!(result.cleaned.height(), 4);
    assert_eq!(
        i64_values(&result.cleaned, "age"),
        vec![Some(25), Some(30), Some(25), Some(28)]
    );
    assert_eq!(result.summary.value(Statistic::Count, "age"), Some(4.0));
    assert_eq!(result.summary.value(Statistic::Mean, "age"), Some(27.0));
    assert_eq!(result.summary.value(Statistic::Max, "age"), Some(30.0));

    let outliers = result.outlier_rows().unwrap();
    assert_eq!(i64_values(&outliers, "age"), vec![Some(1000)]);
}

#[test]
fn test_larger_survey_flags_at_default_threshold() {
    let result = run(load_fixture("survey_large.csv"), in_memory(3.0));

    assert_eq!(result.outliers.outlier_count(), 1);
    assert_eq!(result.cleaned.height(), 19);
    assert_eq!(result.summary.value(Statistic::Count, "age"), Some(19.0));
    assert_eq!(result.summary.value(Statistic::Max, "age"), Some(40.0));

    let outliers = result.outlier_rows().unwrap();
    assert_eq!(i64_values(&outliers, "respondent"), vec![Some(20)]);
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_imputation_is_idempotent() {
    let df = load_fixture("survey_large.csv");

    let once = MostFrequentImputer::impute(&df).unwrap().imputed;
    let twice = MostFrequentImputer::impute(&once).unwrap().imputed;

    assert!(twice.equals_missing(&once));
}

#[test]
fn test_imputed_shape_matches_input() {
    let df = load_fixture("survey_large.csv");
    let result = run(df.clone(), in_memory(3.0));

    assert_eq!(result.imputed.shape(), df.shape());
    assert_eq!(result.imputed.get_column_names(), df.get_column_names());
    for column in result.imputed.get_columns() {
        assert_eq!(column.null_count(), 0, "column {} has nulls", column.name());
    }
}

#[test]
fn test_flag_count_invariant() {
    for (fixture, threshold) in [
        ("survey_scenario.csv", 1.5),
        ("survey_scenario.csv", 3.0),
        ("survey_large.csv", 3.0),
        ("survey_large.csv", 1.0),
        ("constant_column.csv", 1.0),
    ] {
        let result = run(load_fixture(fixture), in_memory(threshold));

        assert_eq!(
            result.cleaned.height() + result.outliers.outlier_count(),
            result.imputed.height(),
            "{} at {}",
            fixture,
            threshold
        );
    }
}

#[test]
fn test_no_numeric_columns() {
    let result = run(load_fixture("text_only.csv"), in_memory(3.0));

    assert!(!result.outliers.has_numeric_columns());
    assert_eq!(result.outliers.outlier_count(), 0);
    assert!(result.cleaned.equals_missing(&result.imputed));
    assert!(result.summary.is_count_only());
    assert_eq!(result.summary.value(Statistic::Count, "city"), Some(4.0));
    assert_eq!(result.notices.len(), 1);
}

#[test]
fn test_constant_column_never_flags() {
    let result = run(load_fixture("constant_column.csv"), in_memory(1.0));

    let wave = &result.outliers.column_stats[0];
    assert_eq!(wave.column, "wave");
    assert!(wave.skipped_constant);
    assert_eq!(wave.flagged, 0);
}

#[test]
fn test_fully_missing_column_fails() {
    let err = Pipeline::builder()
        .config(in_memory(3.0))
        .build()
        .unwrap()
        .process(load_fixture("fully_missing.csv"))
        .unwrap_err();

    assert!(matches!(err, AutoStatError::NoValidValues(ref c) if c == "comment"));
}

#[test]
fn test_empty_table_passes_through() {
    let result = run(load_fixture("empty.csv"), in_memory(3.0));

    assert_eq!(result.imputed.height(), 0);
    assert_eq!(result.cleaned.height(), 0);
    assert!(result.outliers.flags.is_empty());
    assert!(result.artifact(CLEANED_CSV_FILE).is_some());
}

// ============================================================================
// Loader and Artifacts
// ============================================================================

#[test]
fn test_cleaned_csv_round_trip() {
    let result = run(load_fixture("survey_large.csv"), in_memory(3.0));
    let csv = result.artifact(CLEANED_CSV_FILE).unwrap();

    let reparsed = TableLoader::load_bytes(CLEANED_CSV_FILE, csv.bytes.clone()).unwrap();

    assert!(reparsed.equals_missing(&result.cleaned));
}

#[test]
fn test_workbook_fixture_loads_typed_columns() {
    let df = load_fixture("survey.xlsx");

    assert_eq!(df.shape(), (5, 5));
    let dtypes: Vec<(String, DataType, usize)> = df
        .get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.dtype().clone(), c.null_count()))
        .collect();
    assert_eq!(
        dtypes,
        vec![
            ("respondent".to_string(), DataType::Int64, 0),
            ("age".to_string(), DataType::Int64, 1),
            ("score".to_string(), DataType::Float64, 1),
            ("city".to_string(), DataType::String, 1),
            ("subscribed".to_string(), DataType::Boolean, 1),
        ]
    );
}

#[test]
fn test_workbook_fixture_through_pipeline() {
    let result = run(load_fixture("survey.xlsx"), in_memory(1.9));

    assert_eq!(
        i64_values(&result.imputed, "age"),
        vec![Some(25), Some(30), Some(25), Some(28), Some(1000)]
    );
    assert_eq!(str_values(&result.imputed, "city")[3].as_deref(), Some("A"));

    assert_eq!(result.outliers.outlier_count(), 1);
    assert_eq!(result.cleaned.height(), 4);
    assert_eq!(
        i64_values(&result.cleaned, "age"),
        vec![Some(25), Some(30), Some(25), Some(28)]
    );
    assert_eq!(result.summary.value(Statistic::Count, "age"), Some(4.0));
}

#[test]
fn test_non_workbook_spreadsheet_is_rejected() {
    let bytes = std::fs::read(fixtures_path().join("survey_scenario.csv")).unwrap();

    let err = TableLoader::load_bytes("survey.xlsx", bytes).unwrap_err();

    assert!(matches!(err, AutoStatError::SpreadsheetParse { .. }));
    assert!(err.is_input_error());
}

#[test]
fn test_artifacts_and_mime_types() {
    let result = run(load_fixture("survey_large.csv"), in_memory(3.0));

    let mimes: Vec<(&str, &str)> = result
        .artifacts
        .iter()
        .map(|a| (a.file_name.as_str(), a.mime))
        .collect();
    assert_eq!(
        mimes,
        vec![
            (CLEANED_CSV_FILE, "text/csv"),
            (PDF_REPORT_FILE, "application/pdf"),
            (HISTOGRAM_FILE, "image/svg+xml"),
        ]
    );
    assert!(
        result
            .artifact(PDF_REPORT_FILE)
            .unwrap()
            .bytes
            .starts_with(b"%PDF")
    );
}

#[test]
fn test_outputs_written_to_disk() {
    let dir = std::env::temp_dir().join(format!("autostat_it_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let config = PipelineConfig::builder()
        .output_dir(&dir)
        .build()
        .unwrap();
    Pipeline::builder()
        .config(config)
        .input_name("survey_large.csv")
        .build()
        .unwrap()
        .process(load_fixture("survey_large.csv"))
        .unwrap();

    for file in [CLEANED_CSV_FILE, PDF_REPORT_FILE, HISTOGRAM_FILE, RUN_REPORT_FILE] {
        assert!(dir.join(file).exists(), "{} missing", file);
    }

    let json = std::fs::read_to_string(dir.join(RUN_REPORT_FILE)).unwrap();
    let report: RunReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report.input_file.as_deref(), Some("survey_large.csv"));
    assert_eq!(report.outlier_count, 1);
    assert_eq!(report.outlier_rows, vec![19]);
    assert_eq!(report.cleaned_shape, (19, 4));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_progress_reaches_complete() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();

    Pipeline::builder()
        .config(in_memory(3.0))
        .on_progress(move |update| {
            stages_clone.lock().unwrap().push((update.stage, update.progress));
        })
        .build()
        .unwrap()
        .process(load_fixture("survey_scenario.csv"))
        .unwrap();

    let stages = stages.lock().unwrap();
    assert_eq!(stages.last().map(|s| s.0), Some(PipelineStage::Complete));
    // progress never goes backwards (up to f32 rounding at stage boundaries)
    assert!(stages.windows(2).all(|pair| pair[0].1 <= pair[1].1 + 1e-6));
}
