//! Check command - score every image in a directory.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use blur_qa_adapters::FsImageSource;
use blur_qa_core::{run_batch, Analyzer, BatchSummary, ImageSource};
use clap::Args;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::scoring::ScoringArgs;
use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{ensure_json_path, write_charts, ProgressReporter, ReportOutput};

/// Shared arguments for batch scoring.
#[derive(Args, Clone, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Directory of images to score
    #[arg(short, long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Path of the JSON report (must end in .json)
    #[arg(short, long, value_name = "FILE")]
    pub save_path: Option<PathBuf>,

    /// Thresholds and preprocessing.
    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// Only scan the top level of the input directory
    #[arg(long)]
    pub no_recursive: bool,

    /// Write blurry / contrast pie charts into this directory
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Write a rendered blur map per image into this directory
    #[arg(long, value_name = "DIR")]
    pub blur_maps_dir: Option<PathBuf>,

    /// Draw a progress bar even when stderr is not a terminal
    #[arg(long)]
    pub progress: bool,

    /// Print nothing but the final ratios
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 1 when any image is blurry or low contrast
    #[arg(long)]
    pub fail_on_issues: bool,
}

impl CheckArgs {
    /// Fills every option the command line left unset from `config`.
    ///
    /// Built-in defaults sit below the config file and are applied by the
    /// accessors. A boolean flag that was passed is never turned off by the
    /// config.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.no_recursive {
            args.no_recursive = !config.general.recursive.unwrap_or(true);
        }

        args.scoring = args.scoring.with_config(config);

        if args.charts_dir.is_none() {
            args.charts_dir.clone_from(&config.output.charts_dir);
        }
        if args.blur_maps_dir.is_none() {
            args.blur_maps_dir.clone_from(&config.output.blur_maps_dir);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Whether to walk subdirectories.
    const fn recursive(&self) -> bool {
        !self.no_recursive
    }
}

/// Outcome of a `check` run.
pub struct CheckResult {
    /// Counts and ratios written to the report.
    #[allow(dead_code)]
    pub summary: BatchSummary,
    /// Images flagged blurry or low contrast.
    #[allow(dead_code)]
    pub flagged: usize,
    /// Process exit status.
    pub exit_code: ExitCode,
}

/// Scores the input directory, writes the report and optional artifacts,
/// and prints the two ratios.
///
/// `args` should already be merged with the config file via
/// [`CheckArgs::with_config`].
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    let input_dir = args
        .input_dir
        .as_ref()
        .ok_or_else(|| anyhow!("No input directory specified (use -i/--input-dir)"))?;
    let save_path = args
        .save_path
        .as_ref()
        .ok_or_else(|| anyhow!("No report path specified (use -s/--save-path)"))?;

    // Reject a bad report path before doing any work.
    ensure_json_path(save_path)?;
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", input_dir.display());
    }

    let analyzer = Analyzer::new(args.scoring.analyzer_config()?);
    debug!("Analyzer config: {:?}", analyzer.config());

    let source = FsImageSource::new(vec![input_dir.clone()], args.recursive());
    let total = source.count_hint();
    info!(
        "Scoring {} images in {}",
        total.unwrap_or_default(),
        input_dir.display()
    );

    let progress = if args.quiet {
        ProgressReporter::silent()
    } else if args.progress || std::io::stderr().is_terminal() {
        ProgressReporter::bar(total)
    } else {
        ProgressReporter::lines()
    };

    let mut output = ReportOutput::create(save_path)?;
    if let Some(dir) = &args.blur_maps_dir {
        output = output.with_blur_maps(dir.clone(), input_dir)?;
    }

    let report = run_batch(&source, &analyzer, &output, &progress)?;
    let summary = report.summary();

    info!("Writing results to {}", save_path.display());
    output.write_report(
        &iso_timestamp(),
        &input_dir.to_string_lossy(),
        args.scoring.threshold(),
        &summary,
    )?;

    if let Some(dir) = &args.charts_dir {
        write_charts(dir, &summary)?;
    }

    println!("blurry_ratio: {}", summary.blurry_ratio);
    println!("low_contrast_ratio: {}", summary.low_contrast_ratio);

    let flagged = report.results().filter(|r| r.has_issues()).count();
    let exit_code = match (args.fail_on_issues, flagged) {
        (true, 1..) => ExitCode::IssuesFound,
        _ => ExitCode::Success,
    };

    Ok(CheckResult {
        summary,
        flagged,
        exit_code,
    })
}

/// Current UTC time as RFC 3339.
fn iso_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|e| {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        })
}
