//! CLI entry point for the survey cleaning pipeline.

use anyhow::{Result, anyhow};
use autostat::reporting::RUN_REPORT_FILE;
use autostat::{Pipeline, PipelineConfig, PipelineResult, RunReport, TableLoader, preview};
use clap::Parser;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Automated survey data cleaning",
    long_about = "Fills missing values with the most frequent value of each column, removes \
                  outlier rows with a z-score test and reports summary statistics.\n\n\
                  EXAMPLES:\n  \
                  # Basic usage\n  \
                  autostat -i survey.csv\n\n  \
                  # Lower threshold, keep flagged rows, list them\n  \
                  autostat -i survey.xlsx --threshold 2.5 --keep-outliers --show-outliers\n\n  \
                  # Machine-readable output\n  \
                  autostat -i survey.csv --json | jq .outlier_count"
)]
struct Args {
    /// Path to the CSV or spreadsheet file to clean
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned CSV and reports
    #[arg(short, long, default_value = "outputs")]
    output: String,

    /// Absolute z-score above which a row is an outlier
    #[arg(long)]
    threshold: Option<f64>,

    /// Report outliers but keep them in the cleaned table
    #[arg(long)]
    keep_outliers: bool,

    /// Print the rows flagged as outliers
    #[arg(long)]
    show_outliers: bool,

    /// Number of rows shown in the data preview
    #[arg(long, default_value_t = autostat::DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Skip the PDF report
    #[arg(long)]
    no_pdf: bool,

    /// Skip the histogram chart
    #[arg(long)]
    no_histogram: bool,

    /// JSON configuration file; command line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the run report as JSON instead of the text summary (no logs)
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Install the tracing subscriber. Nothing is installed in `--json` mode so
/// stdout carries the report alone.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Merge the config file (if any) with command line flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    config.output_dir = PathBuf::from(&args.output);
    if let Some(threshold) = args.threshold {
        config.zscore_threshold = threshold;
    }
    if args.keep_outliers {
        config.remove_outliers = false;
    }
    if args.no_pdf {
        config.generate_pdf = false;
    }
    if args.no_histogram {
        config.generate_histogram = false;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;

    info!("Reading survey table: {}", args.input);
    let data = TableLoader::load_path(input)?;

    if !args.json {
        print_preview(&data, args.preview_rows);
    }

    let mut builder = Pipeline::builder().config(config).input_name(args.input.as_str());
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let result = match pipeline.process(data) {
        Ok(result) => result,
        Err(e) => {
            error!("Cleaning failed: {}", e);
            return Err(anyhow!("Cleaning failed: {}", e));
        }
    };

    if args.json {
        let report = RunReport::from_result(&result, Some(args.input.as_str()));
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&result, pipeline.config(), &args)
}

/// Print the first rows of the loaded table.
fn print_preview(df: &DataFrame, rows: usize) {
    println!();
    println!("Data preview ({} rows x {} columns):", df.height(), df.width());
    println!("{}", preview(df, rows));
}

/// Print status lines, the outlier count and the summary table.
fn print_human_readable_summary(
    result: &PipelineResult,
    config: &PipelineConfig,
    args: &Args,
) -> Result<()> {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));

    println!("Missing values filled with the most frequent value of each column.");
    for imputation in &result.imputations {
        println!(
            "  - {}: {} cell(s) filled with '{}'",
            imputation.column, imputation.cells_filled, imputation.fill_value
        );
    }

    for notice in &result.notices {
        println!("Note: {}", notice);
    }

    let outlier_count = result.outliers.outlier_count();
    if config.remove_outliers {
        println!("Outliers removed: {}", outlier_count);
    } else {
        println!("Outliers flagged (kept): {}", outlier_count);
    }

    if args.show_outliers && outlier_count > 0 {
        println!();
        println!("Outlier rows:");
        println!("{}", result.outlier_rows()?);
    }

    println!();
    println!("Summary Statistics:");
    println!("{}", result.summary.render_text(Some(80)));

    println!();
    if config.save_to_disk {
        println!("Saved to {}:", config.output_dir.display());
        for artifact in &result.artifacts {
            println!("  - {} ({})", artifact.file_name, artifact.mime);
        }
        println!("  - {}", RUN_REPORT_FILE);
    }
    println!("{}", "=".repeat(80));

    Ok(())
}
