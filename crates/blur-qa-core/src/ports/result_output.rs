//! Where analyses go.

use crate::domain::Analysis;

/// Consumes each successful [`Analysis`] as the batch produces it.
pub trait ResultOutput: Send + Sync {
    /// Takes the record and blur map of one image.
    ///
    /// # Errors
    ///
    /// An error here aborts the batch.
    fn write(&self, analysis: &Analysis) -> anyhow::Result<()>;

    /// Called once after the last image.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered data cannot be written out.
    fn flush(&self) -> anyhow::Result<()>;
}
