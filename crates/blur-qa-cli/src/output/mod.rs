//! Output adapters for CLI.

mod chart;
mod progress;
mod report;

pub use chart::write_charts;
pub use progress::ProgressReporter;
pub use report::{ensure_json_path, write_pretty_json, ReportOutput};
