//! Blur QA CLI - flag blurry and low-contrast images.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::check::CheckArgs;
use commands::score::ScoreArgs;
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

/// Log level for a `-v` count.
const fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::new(log_level(verbose)))
        .init();
}

/// Prints `err` with its context chain and maps it to [`ExitCode::Error`].
fn report_error(err: &anyhow::Error) -> ExitCode {
    eprintln!("error: {err:#}");
    ExitCode::Error
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load();

    let outcome = match cli.command {
        Some(Commands::Score(args)) => commands::score::run(&ScoreArgs::with_config(args, &config)),
        Some(Commands::Check(args)) => {
            commands::check::run(&CheckArgs::with_config(args, &config)).map(|r| r.exit_code)
        }
        // Bare invocation behaves like `check`.
        None if cli.check.input_dir.is_none() => Err(anyhow::anyhow!(
            "No input directory specified. Use --help for usage information."
        )),
        None => commands::check::run(&CheckArgs::with_config(cli.check, &config))
            .map(|r| r.exit_code),
    };

    outcome.unwrap_or_else(|e| report_error(&e)).into()
}
