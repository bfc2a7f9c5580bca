//! Core domain types for blur and contrast analysis.

mod analyzer;
mod result;

pub use analyzer::{Analysis, Analyzer, AnalyzerConfig};
pub use result::{AnalysisResult, BatchReport, BatchSummary, ImageInfo, ImageOutcome};
