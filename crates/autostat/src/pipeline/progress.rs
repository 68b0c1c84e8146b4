//! Progress reporting for the cleaning pipeline.
//!
//! Each stage emits a [`ProgressUpdate`] when it starts and when it finishes,
//! followed by one terminal update (`Complete` or `Failed`) per run.
//!
//! ```rust,ignore
//! let pipeline = Pipeline::builder()
//!     .on_progress(|update| eprintln!("{:>3.0}% {}", update.progress * 100.0, update.message))
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of one cleaning run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Initializing,
    /// Filling missing cells with column modes
    Imputation,
    /// Scoring numeric columns and dropping flagged rows
    OutlierDetection,
    /// Computing the describe() table
    Summary,
    /// Rendering the CSV, PDF and histogram
    ReportGeneration,
    Complete,
    Failed,
}

impl PipelineStage {
    /// The stages that do work, in the order they run.
    pub const WORKING: [PipelineStage; 5] = [
        PipelineStage::Initializing,
        PipelineStage::Imputation,
        PipelineStage::OutlierDetection,
        PipelineStage::Summary,
        PipelineStage::ReportGeneration,
    ];

    /// Label used in log lines and progress bars.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Imputation => "Imputing Values",
            Self::OutlierDetection => "Detecting Outliers",
            Self::Summary => "Summarizing",
            Self::ReportGeneration => "Generating Reports",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run spent in this stage. Terminal stages weigh 0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.05,
            Self::Imputation | Self::OutlierDetection => 0.30,
            Self::Summary => 0.15,
            Self::ReportGeneration => 0.20,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Overall progress when this stage begins.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing | Self::Failed => 0.0,
            Self::Imputation => 0.05,
            Self::OutlierDetection => 0.35,
            Self::Summary => 0.65,
            Self::ReportGeneration => 0.80,
            Self::Complete => 1.0,
        }
    }

    /// `Complete` and `Failed` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// One progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Finer position inside the stage, e.g. the column being scored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Position in the whole run, 0.0 to 1.0
    pub progress: f32,

    /// Position inside `stage`, 0.0 to 1.0
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    /// An update `stage_progress` of the way through `stage`.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let stage_progress = stage_progress.clamp(0.0, 1.0);
        let overall = stage.base_progress() + stage.weight() * stage_progress;
        Self {
            stage,
            sub_stage: None,
            progress: overall.min(1.0),
            stage_progress,
            message: message.into(),
        }
    }

    /// Like [`ProgressUpdate::new`], naming a sub-stage.
    pub fn with_sub_stage(
        stage: PipelineStage,
        sub_stage: impl Into<String>,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        let mut update = Self::new(stage, stage_progress, message);
        update.sub_stage = Some(sub_stage.into());
        update
    }

    /// Terminal update for a successful run.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, 1.0, message)
    }

    /// Terminal update for a run that stopped with an error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Failed, 0.0, message)
    }
}

/// Receiver of progress events.
///
/// Reporters are shared with the pipeline through an `Arc`, so they must be
/// `Send + Sync`.
pub trait ProgressReporter: Send + Sync {
    /// Called synchronously from the pipeline; keep it cheap.
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update)
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
static_assertions::assert_impl_all!(PipelineStage: Send, Sync, Copy);
