//! CLI command definitions and handlers.

pub mod check;
pub mod score;
pub mod scoring;

use clap::{Parser, Subcommand};

/// Blur QA - flag blurry and low-contrast images in a directory
#[derive(Parser)]
#[command(name = "blur-qa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (input, report path, thresholds, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Score every image in a directory and write a JSON report
    Check(check::CheckArgs),
    /// Score a single image and print its record
    Score(score::ScoreArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Run completed.
    Success = 0,
    /// Run completed, some images were flagged and `--fail-on-issues` is set.
    IssuesFound = 1,
    /// Run failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
