//! Where images come from.

use thiserror::Error;

use crate::domain::ImageInfo;

/// An image that could not be read, with the path it was read from.
#[derive(Debug, Error)]
#[error("{path}: {error:#}")]
pub struct LoadError {
    /// Path (or other identifier) of the image.
    pub path: String,
    /// Why it could not be read.
    pub error: anyhow::Error,
}

impl LoadError {
    /// Wraps `error` as the failure to read `path`.
    pub fn new(path: impl Into<String>, error: anyhow::Error) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }
}

/// Supplies decoded images to a batch.
///
/// Implementations decide the order; the batch driver preserves it in the
/// report. A decode failure is yielded as an `Err` item so the driver can
/// record it and move on to the next image.
pub trait ImageSource: Send + Sync {
    /// Iterates over the images, decoding each one lazily.
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, LoadError>> + Send + '_>;

    /// Number of items `images` will yield, when cheap to know up front.
    fn count_hint(&self) -> Option<usize>;
}
