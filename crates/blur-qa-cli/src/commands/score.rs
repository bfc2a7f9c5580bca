//! Score command - analyse one image and print its record.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use blur_qa_core::{pretty_blur_map, Analyzer, ImageInfo};
use clap::Args;
use tracing::info;

use super::scoring::ScoringArgs;
use super::ExitCode;
use crate::config::AppConfig;
use crate::output::write_pretty_json;

/// Arguments for scoring a single image.
#[derive(Args, Clone, Debug)]
pub struct ScoreArgs {
    /// Image file to score
    pub image: PathBuf,

    /// Thresholds and preprocessing.
    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// Save the rendered blur map to this PNG
    #[arg(long, value_name = "FILE")]
    pub blur_map: Option<PathBuf>,
}

impl ScoreArgs {
    /// Apply configuration file values, respecting CLI precedence.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.scoring = args.scoring.with_config(config);
        args
    }
}

/// Run the score command.
pub fn run(args: &ScoreArgs) -> Result<ExitCode> {
    let analyzer = Analyzer::new(args.scoring.analyzer_config()?);

    let image = image::open(&args.image)
        .with_context(|| format!("Failed to open image: {}", args.image.display()))?;
    let info = ImageInfo::new(args.image.to_string_lossy(), image);
    let analysis = analyzer
        .analyze(&info)
        .with_context(|| format!("Failed to score {}", args.image.display()))?;

    if let Some(path) = &args.blur_map {
        pretty_blur_map(&analysis.blur_map)
            .save(path)
            .with_context(|| format!("Failed to write blur map: {}", path.display()))?;
        info!("Wrote blur map {}", path.display());
    }

    let mut stdout = std::io::stdout().lock();
    write_pretty_json(&mut stdout, &analysis.result)?;
    stdout.flush()?;

    Ok(ExitCode::Success)
}
