//! Analysis result types.

use serde::{Deserialize, Serialize};

/// Scores for a single image, as written to the JSON report.
///
/// Fields are declared in alphabetical order so serialized keys come out
/// sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// `clearness_score < blur threshold`.
    pub blurry: bool,
    /// Laplacian variance (higher is sharper).
    pub clearness_score: f64,
    /// Percentile span as a fraction of the full sample range.
    pub contrast_score: f64,
    /// Path of the analyzed image.
    pub input_path: String,
    /// `contrast_score < fraction threshold`.
    pub low_contrast: bool,
}

impl AnalysisResult {
    /// True when the image failed either check.
    #[must_use]
    pub const fn has_issues(&self) -> bool {
        self.blurry || self.low_contrast
    }
}

/// Basic image information extracted during loading.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path to the image file.
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: image::DynamicImage,
}

impl ImageInfo {
    /// Wraps a decoded image, reading its dimensions.
    #[must_use]
    pub fn new(path: impl Into<String>, image: image::DynamicImage) -> Self {
        Self {
            path: path.into(),
            width: image.width(),
            height: image.height(),
            image,
        }
    }
}

/// What happened to one image in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    /// Both checks ran.
    Analyzed(AnalysisResult),
    /// The image could not be loaded or scored.
    Skipped {
        /// Path (or position) of the image.
        path: String,
        /// Error message.
        reason: String,
    },
}

/// Outcomes of a batch run, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// One entry per image the source yielded.
    pub outcomes: Vec<ImageOutcome>,
}

impl BatchReport {
    /// Iterates over successfully analyzed images.
    pub fn results(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ImageOutcome::Analyzed(result) => Some(result),
            ImageOutcome::Skipped { .. } => None,
        })
    }

    /// Number of skipped images.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ImageOutcome::Skipped { .. }))
            .count()
    }

    /// Aggregates counts and ratios over analyzed images.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> BatchSummary {
        let mut total = 0usize;
        let mut blurry = 0usize;
        let mut low_contrast = 0usize;
        for result in self.results() {
            total += 1;
            blurry += usize::from(result.blurry);
            low_contrast += usize::from(result.low_contrast);
        }

        // Empty batches report zero ratios rather than NaN.
        let ratio = |count: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };

        BatchSummary {
            blurry,
            blurry_ratio: ratio(blurry),
            low_contrast,
            low_contrast_ratio: ratio(low_contrast),
            skipped: self.skipped(),
            total,
        }
    }
}

/// Batch-level counts, serialized alongside the per-image results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Images classified as blurry.
    pub blurry: usize,
    /// `blurry / total`.
    pub blurry_ratio: f64,
    /// Images classified as low contrast.
    pub low_contrast: usize,
    /// `low_contrast / total`.
    pub low_contrast_ratio: f64,
    /// Images that could not be processed.
    pub skipped: usize,
    /// Images analyzed successfully.
    pub total: usize,
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn result(path: &str, blurry: bool, low_contrast: bool) -> AnalysisResult {
        AnalysisResult {
            blurry,
            clearness_score: if blurry { 1.0 } else { 500.0 },
            contrast_score: if low_contrast { 0.05 } else { 0.6 },
            input_path: path.to_string(),
            low_contrast,
        }
    }

    #[test]
    fn test_summary_ratios() {
        let report = BatchReport {
            outcomes: vec![
                ImageOutcome::Analyzed(result("a.jpg", true, false)),
                ImageOutcome::Analyzed(result("b.jpg", true, true)),
                ImageOutcome::Analyzed(result("c.jpg", false, false)),
                ImageOutcome::Analyzed(result("d.jpg", false, false)),
                ImageOutcome::Skipped {
                    path: "e.jpg".to_string(),
                    reason: "corrupt".to_string(),
                },
            ],
        };

        let summary = report.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.blurry, 2);
        assert_eq!(summary.low_contrast, 1);
        assert_eq!(summary.blurry_ratio, 0.5);
        assert_eq!(summary.low_contrast_ratio, 0.25);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchReport::default().summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.blurry_ratio, 0.0);
        assert_eq!(summary.low_contrast_ratio, 0.0);
    }

    #[test]
    fn test_has_issues() {
        assert!(!result("a", false, false).has_issues());
        assert!(result("a", true, false).has_issues());
        assert!(result("a", false, true).has_issues());
    }

    #[test]
    fn test_image_info_new() {
        let info = ImageInfo::new("img.png", image::DynamicImage::new_rgb8(7, 5));
        assert_eq!((info.width, info.height), (7, 5));
        assert_eq!(info.path, "img.png");
    }
}
