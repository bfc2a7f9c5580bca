//! Batch driver.
//!
//! Pulls images from an [`ImageSource`], scores each one and hands the
//! results to a [`ResultOutput`]. A failure on one image (decode error or
//! [`QaError`](crate::QaError)) is recorded as [`ImageOutcome::Skipped`] and
//! the batch carries on; only output errors abort the run.

use anyhow::Result;
use tracing::{info, warn};

use crate::domain::{Analyzer, BatchReport, ImageOutcome};
use crate::ports::{ImageSource, LoadError, ProgressEvent, ProgressSink, ResultOutput};

/// Scores every image yielded by `source`.
///
/// # Errors
///
/// Returns an error only if `output` fails to write or flush.
pub fn run_batch(
    source: &dyn ImageSource,
    analyzer: &Analyzer,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
) -> Result<BatchReport> {
    let total = source.count_hint();
    let mut report = BatchReport::default();

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(img) => img,
            Err(LoadError { path, error }) => {
                let reason = format!("{error:#}");
                warn!("Skipping {path}: {reason}");
                progress.on_event(ProgressEvent::Skipped {
                    path: path.clone(),
                    reason: reason.clone(),
                });
                report.outcomes.push(ImageOutcome::Skipped { path, reason });
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: image.path.clone(),
            index,
            total,
        });

        match analyzer.analyze(&image) {
            Ok(analysis) => {
                output.write(&analysis)?;
                progress.on_event(ProgressEvent::Scored {
                    result: analysis.result.clone(),
                });
                report.outcomes.push(ImageOutcome::Analyzed(analysis.result));
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Skipping {}: {reason}", image.path);
                progress.on_event(ProgressEvent::Skipped {
                    path: image.path.clone(),
                    reason: reason.clone(),
                });
                report.outcomes.push(ImageOutcome::Skipped {
                    path: image.path,
                    reason,
                });
            }
        }
    }

    output.flush()?;
    let summary = report.summary();
    progress.on_event(ProgressEvent::Finished { summary });
    info!(
        "Batch finished: {} scored, {} skipped, blurry_ratio: {}, low_contrast_ratio: {}",
        summary.total, summary.skipped, summary.blurry_ratio, summary.low_contrast_ratio
    );

    Ok(report)
}
