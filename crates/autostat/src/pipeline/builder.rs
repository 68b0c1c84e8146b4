//! Main cleaning pipeline module.
//!
//! [`Pipeline`] runs imputation, outlier removal, the summary and report
//! rendering over one table. Construct it through [`PipelineBuilder`].

use crate::config::{ImputationStrategy, OutlierMethod, PipelineConfig};
use crate::error::{AutoStatError, Result};
use crate::imputers::MostFrequentImputer;
use crate::pipeline::outliers::{OutlierFlagger, OutlierOutcome};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::SummaryTable;
use crate::reporting::{ReportGenerator, RunReport};
use crate::types::PipelineResult;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The main cleaning pipeline.
///
/// A configured cleaning run, reusable across tables.
///
/// # Example
///
/// ```rust,ignore
/// use autostat::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().zscore_threshold(2.5).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("{}", result.summary.render_text(Some(80)));
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    reporter: ReportGenerator,
    input_name: Option<String>,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Start configuring a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run a table through the pipeline.
    ///
    /// Returns a `PipelineResult` holding the imputed and cleaned tables,
    /// the outlier flags, the summary and the rendered artifacts.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Cleaning complete"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!(code = e.error_code(), "Cleaning run failed: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let mut notices: Vec<String> = Vec::new();

        info!(rows = df.height(), columns = df.width(), "Starting cleaning pipeline");
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Initializing,
            0.0,
            "Starting cleaning pipeline...",
        ));

        if df.height() == 0 {
            warn!("Input table has no rows");
            notices.push("The input table has no data rows.".to_string());
        }

        // Step 1: fill missing cells
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Imputation,
            0.0,
            "Imputing missing values...",
        ));
        let outcome = match self.config.imputation_strategy {
            ImputationStrategy::MostFrequent => MostFrequentImputer::impute(&df)?,
        };
        let imputed = outcome.imputed;
        let imputations = outcome.imputations;
        for (index, imputation) in imputations.iter().enumerate() {
            self.report_progress(ProgressUpdate::with_sub_stage(
                PipelineStage::Imputation,
                format!("Column: {}", imputation.column),
                (index + 1) as f32 / imputations.len() as f32,
                format!(
                    "Filled {} cells of '{}' with {}",
                    imputation.cells_filled, imputation.column, imputation.fill_value
                ),
            ));
        }
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Imputation,
            1.0,
            format!("Filled missing values in {} columns", imputations.len()),
        ));

        // Step 2: flag outliers
        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierDetection,
            0.0,
            "Detecting outliers...",
        ));
        let OutlierOutcome { report, cleaned } = match self.config.outlier_method {
            OutlierMethod::ZScore => {
                OutlierFlagger::new(self.config.zscore_threshold).run(&imputed)?
            }
        };
        for (index, stats) in report.column_stats.iter().enumerate() {
            self.report_progress(ProgressUpdate::with_sub_stage(
                PipelineStage::OutlierDetection,
                format!("Column: {}", stats.column),
                (index + 1) as f32 / report.column_stats.len() as f32,
                format!("Flagged {} values in '{}'", stats.flagged, stats.column),
            ));
        }
        let cleaned = if self.config.remove_outliers {
            cleaned
        } else {
            imputed.clone()
        };

        if !report.has_numeric_columns() {
            info!("No numeric columns found, outlier detection skipped");
            notices.push(
                "No numeric columns found. Outlier detection and summary statistics are limited."
                    .to_string(),
            );
        }
        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierDetection,
            1.0,
            format!("Flagged {} outlier rows", report.outlier_count()),
        ));

        // Step 3: summary statistics
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Summary,
            0.0,
            "Computing summary statistics...",
        ));
        let summary = SummaryTable::describe(&cleaned)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Summary,
            1.0,
            "Summary statistics complete",
        ));

        // Step 4: render artifacts
        self.report_progress(ProgressUpdate::new(
            PipelineStage::ReportGeneration,
            0.0,
            "Rendering reports...",
        ));
        let artifacts = self.reporter.render_artifacts(&cleaned, &summary)?;

        let result = PipelineResult {
            imputed,
            outliers: report,
            cleaned,
            summary,
            imputations,
            notices,
            artifacts,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        if self.config.save_to_disk {
            self.reporter.write_artifacts(&result.artifacts)?;
            let run_report = RunReport::from_result(&result, self.input_name.as_deref());
            self.reporter.write_run_report(&run_report)?;
        }

        self.report_progress(ProgressUpdate::new(
            PipelineStage::ReportGeneration,
            1.0,
            format!("Rendered {} artifacts", result.artifacts.len()),
        ));

        info!(
            rows_before = result.imputed.height(),
            rows_after = result.cleaned.height(),
            duration_ms = result.duration_ms,
            "Cleaning pipeline complete"
        );

        Ok(result)
    }
}

/// Collects configuration and progress hooks for a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    input_name: Option<String>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Use `config` instead of [`PipelineConfig::default`].
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Send stage updates to a shared reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Send stage updates to a closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Name of the input file, recorded in the JSON run report.
    pub fn input_name(mut self, name: impl Into<String>) -> Self {
        self.input_name = Some(name.into());
        self
    }

    /// Validate the configuration and assemble the pipeline.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(AutoStatError::InvalidConfig)?;

        let reporter = ReportGenerator::from_config(&config);

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            reporter,
            input_name: self.input_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::{CLEANED_CSV_FILE, HISTOGRAM_FILE, PDF_REPORT_FILE};
    use std::sync::Mutex;

    fn in_memory_config() -> PipelineConfig {
        PipelineConfig::builder().save_to_disk(false).build().unwrap()
    }

    fn survey() -> DataFrame {
        df![
            "age" => [Some(25i64), Some(30), None, Some(28), Some(1000)],
            "city" => [Some("A"), Some("B"), Some("A"), None, Some("A")],
        ]
        .unwrap()
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = in_memory_config();
        config.zscore_threshold = -1.0;

        let result = Pipeline::builder().config(config).build();
        assert!(matches!(result, Err(AutoStatError::InvalidConfig(_))));
    }

    #[test]
    fn test_process_survey_at_lower_threshold() {
        let mut config = in_memory_config();
        config.zscore_threshold = 1.5;

        let result = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .process(survey())
            .unwrap();

        assert_eq!(result.imputed.shape(), (5, 2));
        assert_eq!(result.outliers.outlier_count(), 1);
        assert_eq!(result.cleaned.height(), 4);
        assert_eq!(
            result.summary.value(crate::profiler::Statistic::Count, "age"),
            Some(4.0)
        );
        assert_eq!(result.outlier_rows().unwrap().height(), 1);
    }

    #[test]
    fn test_keep_outliers_reports_but_keeps_rows() {
        let mut config = in_memory_config();
        config.zscore_threshold = 1.5;
        config.remove_outliers = false;

        let result = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .process(survey())
            .unwrap();

        assert_eq!(result.outliers.outlier_count(), 1);
        assert_eq!(result.cleaned.height(), 5);
    }

    #[test]
    fn test_process_renders_artifacts() {
        let result = Pipeline::builder()
            .config(in_memory_config())
            .build()
            .unwrap()
            .process(survey())
            .unwrap();

        assert!(result.artifact(CLEANED_CSV_FILE).is_some());
        let pdf = result.artifact(PDF_REPORT_FILE).unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(pdf.mime, "application/pdf");
        assert!(result.artifact(HISTOGRAM_FILE).is_some());
    }

    #[test]
    fn test_disabled_outputs_are_skipped() {
        let config = PipelineConfig::builder()
            .save_to_disk(false)
            .generate_pdf(false)
            .generate_histogram(false)
            .build()
            .unwrap();

        let result = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .process(survey())
            .unwrap();

        assert_eq!(result.artifacts.len(), 1);
        assert_eq!(result.artifacts[0].file_name, CLEANED_CSV_FILE);
    }

    #[test]
    fn test_no_numeric_columns_adds_notice() {
        let df = df!["city" => [Some("A"), None, Some("B")]].unwrap();

        let result = Pipeline::builder()
            .config(in_memory_config())
            .build()
            .unwrap()
            .process(df)
            .unwrap();

        assert_eq!(result.notices.len(), 1);
        assert!(result.summary.is_count_only());
        assert!(result.cleaned.equals_missing(&result.imputed));
        assert!(result.artifact(HISTOGRAM_FILE).is_none());
    }

    #[test]
    fn test_progress_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        Pipeline::builder()
            .config(in_memory_config())
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap()
            .process(survey())
            .unwrap();

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&PipelineStage::Initializing));
        assert_eq!(stages.last(), Some(&PipelineStage::Complete));
        assert!(stages.contains(&PipelineStage::OutlierDetection));
    }

    #[test]
    fn test_progress_names_each_column() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = updates.clone();

        Pipeline::builder()
            .config(in_memory_config())
            .on_progress(move |update| {
                if let Some(sub_stage) = update.sub_stage {
                    updates_clone.lock().unwrap().push((update.stage, sub_stage));
                }
            })
            .build()
            .unwrap()
            .process(survey())
            .unwrap();

        let updates = updates.lock().unwrap();
        assert_eq!(
            *updates,
            vec![
                (PipelineStage::Imputation, "Column: age".to_string()),
                (PipelineStage::Imputation, "Column: city".to_string()),
                (PipelineStage::OutlierDetection, "Column: age".to_string()),
            ]
        );
    }

    #[test]
    fn test_configured_methods_drive_the_run() {
        let config = PipelineConfig::builder()
            .imputation_strategy(ImputationStrategy::MostFrequent)
            .outlier_method(OutlierMethod::ZScore)
            .zscore_threshold(1.5)
            .save_to_disk(false)
            .build()
            .unwrap();

        let result = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .process(survey())
            .unwrap();

        assert_eq!(result.imputations.len(), 2);
        assert_eq!(result.outliers.outlier_count(), 1);
    }

    #[test]
    fn test_failure_reports_failed_stage() {
        let df = df!["comment" => [None::<&str>, None]].unwrap();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let result = Pipeline::builder()
            .config(in_memory_config())
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap()
            .process(df);

        assert!(matches!(result, Err(AutoStatError::NoValidValues(_))));
        assert_eq!(stages.lock().unwrap().last(), Some(&PipelineStage::Failed));
    }
}
