//! Blur QA Core - image sharpness and contrast scoring.
//!
//! The scoring functions ([`estimate_blur`], [`check_contrast`],
//! [`fix_image_size`]) are pure and work on decoded [`image::DynamicImage`]s.
//! The [`domain`] and [`ports`] modules wrap them into a batch pipeline that
//! adapters feed with images and drain into reports.

pub mod batch;
pub mod domain;
pub mod error;
pub mod modules;
pub mod ports;

pub use batch::run_batch;
pub use domain::{
    Analysis, AnalysisResult, Analyzer, AnalyzerConfig, BatchReport, BatchSummary, ImageInfo,
    ImageOutcome,
};
pub use error::{QaError, Result};
pub use modules::{
    check_contrast, estimate_blur, fix_image_size, pretty_blur_map, BlurConfig, BlurEstimate,
    BlurMap, ContrastConfig, ContrastEstimate, ContrastMethod, ResizeConfig,
};
pub use ports::{ImageSource, LoadError, NoProgress, ProgressEvent, ProgressSink, ResultOutput};
