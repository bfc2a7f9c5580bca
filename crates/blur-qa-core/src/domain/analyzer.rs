//! Per-image pipeline: optional resize, then blur and contrast scoring.

use tracing::info;

use super::{AnalysisResult, ImageInfo};
use crate::error::Result;
use crate::modules::{
    check_contrast, estimate_blur, fix_image_size, BlurConfig, BlurMap, ContrastConfig,
    ResizeConfig,
};

/// Settings for every stage of the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzerConfig {
    /// Resize to a pixel budget before scoring; `None` keeps the original size.
    pub resize: Option<ResizeConfig>,
    /// Blur classification settings.
    pub blur: BlurConfig,
    /// Contrast classification settings.
    pub contrast: ContrastConfig,
}

/// Scores plus the intermediate blur map for one image.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Report record.
    pub result: AnalysisResult,
    /// Laplacian response of the (possibly resized) image.
    pub blur_map: BlurMap,
}

/// Runs the blur and contrast checks on images.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Creates an analyzer with the given configuration.
    #[must_use]
    pub const fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Returns the analyzer configuration.
    #[must_use]
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes one image.
    ///
    /// # Errors
    ///
    /// Propagates [`QaError`](crate::QaError) from any stage.
    pub fn analyze(&self, image: &ImageInfo) -> Result<Analysis> {
        let resized;
        let pixels = match &self.config.resize {
            Some(resize) => {
                resized = fix_image_size(&image.image, resize.expected_pixels)?;
                &resized
            }
            None => &image.image,
        };

        let blur = estimate_blur(pixels, self.config.blur.threshold)?;
        let contrast = check_contrast(pixels, &self.config.contrast)?;

        info!(
            "input_path: {}, clearness_score: {}, blurry: {}, contrast_score: {}, low_contrast: {}",
            image.path, blur.score, blur.is_blurry, contrast.ratio, contrast.is_low_contrast
        );

        Ok(Analysis {
            result: AnalysisResult {
                blurry: blur.is_blurry,
                clearness_score: blur.score,
                contrast_score: contrast.ratio,
                input_path: image.path.clone(),
                low_contrast: contrast.is_low_contrast,
            },
            blur_map: blur.blur_map,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::QaError;
    use image::{DynamicImage, GrayImage, Luma};

    fn stripes(width: u32, height: u32) -> ImageInfo {
        let img = GrayImage::from_fn(width, height, |x, _| {
            if (x / 2) % 2 == 0 {
                Luma([250u8])
            } else {
                Luma([5u8])
            }
        });
        ImageInfo::new("stripes.png", DynamicImage::ImageLuma8(img))
    }

    #[test]
    fn test_default_pipeline() {
        let analysis = Analyzer::default()
            .analyze(&stripes(64, 32))
            .expect("analysis");

        assert_eq!(analysis.result.input_path, "stripes.png");
        assert!(!analysis.result.blurry);
        assert!(!analysis.result.low_contrast);
        assert_eq!(analysis.blur_map.dimensions(), (64, 32));
    }

    #[test]
    fn test_resize_changes_blur_map_shape() {
        let analyzer = Analyzer::new(AnalyzerConfig {
            resize: Some(ResizeConfig {
                expected_pixels: 512,
            }),
            ..Default::default()
        });
        let analysis = analyzer.analyze(&stripes(64, 32)).expect("analysis");

        assert_eq!(analysis.blur_map.dimensions(), (32, 16));
    }

    #[test]
    fn test_uniform_image_flags_both() {
        let img = GrayImage::from_pixel(20, 20, Luma([128u8]));
        let info = ImageInfo::new("flat.png", DynamicImage::ImageLuma8(img));
        let analysis = Analyzer::default().analyze(&info).expect("analysis");

        assert!(analysis.result.blurry);
        assert!(analysis.result.low_contrast);
        assert_eq!(analysis.result.clearness_score, 0.0);
    }

    #[test]
    fn test_stage_error_propagates() {
        let info = ImageInfo::new("empty.png", DynamicImage::new_luma8(0, 3));
        let err = Analyzer::default().analyze(&info).expect_err("must fail");
        assert!(matches!(err, QaError::InvalidInput { .. }));
    }
}
