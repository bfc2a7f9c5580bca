//! Fixtures for blur-qa tests.
//!
//! In-memory implementations of the core ports plus generators for images
//! whose blur and contrast scores are predictable.
//!
//! ```
//! use blur_qa_core::{run_batch, Analyzer, NoProgress};
//! use blur_qa_test_support::{MockImageSource, MockResultOutput, SyntheticImageBuilder};
//!
//! let source = MockImageSource::new(vec![
//!     SyntheticImageBuilder::checkerboard(64, 64),
//!     SyntheticImageBuilder::uniform_gray(64, 64, 128),
//! ]);
//! let output = MockResultOutput::new();
//!
//! let report = run_batch(&source, &Analyzer::default(), &output, &NoProgress).unwrap();
//! assert_eq!(report.summary().blurry, 1);
//! ```

mod builders;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use mocks::{MockImageSource, MockProgressSink, MockResultOutput};
