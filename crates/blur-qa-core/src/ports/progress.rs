//! Batch progress notifications.

use crate::domain::{AnalysisResult, BatchSummary};

/// What the batch driver is doing right now.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// About to score an image.
    Started {
        /// Image path.
        path: String,
        /// Position in the batch (0-based).
        index: usize,
        /// Batch size, if the source knows it.
        total: Option<usize>,
    },
    /// An image was scored.
    Scored {
        /// The report record for the image.
        result: AnalysisResult,
    },
    /// An image could not be loaded or scored.
    Skipped {
        /// Image path, or its position when the path is unknown.
        path: String,
        /// Error message.
        reason: String,
    },
    /// The batch is done.
    Finished {
        /// Counts and ratios over the whole batch.
        summary: BatchSummary,
    },
}

/// Receives [`ProgressEvent`]s from the batch driver.
pub trait ProgressSink: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}
