//! Ports between the scoring core and the outside world.
//!
//! Adapters implement these to feed images in, take analyses out, and
//! display progress.

mod image_source;
mod progress;
mod result_output;

pub use image_source::{ImageSource, LoadError};
pub use progress::{NoProgress, ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
