//! Size normalization.
//!
//! Laplacian variance grows with resolution, so images are optionally scaled
//! to a common pixel budget before scoring.

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use super::grayscale::ensure_non_empty;
use crate::error::{QaError, Result};

/// Default pixel budget for [`fix_image_size`].
pub const DEFAULT_EXPECTED_PIXELS: u64 = 2_000_000;

/// Configuration for size normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeConfig {
    /// Target `width * height`.
    pub expected_pixels: u64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            expected_pixels: DEFAULT_EXPECTED_PIXELS,
        }
    }
}

/// Computes the output dimensions for a uniform rescale to roughly
/// `expected_pixels`, keeping the aspect ratio.
///
/// # Errors
///
/// Returns [`QaError::InvalidInput`] for a zero-area input and
/// [`QaError::InvalidParameter`] when `expected_pixels` is zero.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn scaled_dimensions(width: u32, height: u32, expected_pixels: u64) -> Result<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(QaError::invalid_input(format!(
            "zero area ({width}x{height})"
        )));
    }
    if expected_pixels == 0 {
        return Err(QaError::invalid_parameter("expected_pixels", 0));
    }

    let area = f64::from(width) * f64::from(height);
    let ratio = (expected_pixels as f64 / area).sqrt();
    let scale = |side: u32| {
        (f64::from(side) * ratio)
            .round()
            .clamp(1.0, f64::from(u32::MAX)) as u32
    };

    Ok((scale(width), scale(height)))
}

/// Rescales an image so its area approximates `expected_pixels`.
///
/// Uses bilinear resampling and keeps the pixel format. The input is left
/// untouched.
///
/// # Errors
///
/// See [`scaled_dimensions`].
pub fn fix_image_size(image: &DynamicImage, expected_pixels: u64) -> Result<DynamicImage> {
    ensure_non_empty(image)?;
    let (width, height) = scaled_dimensions(image.width(), image.height(), expected_pixels)?;

    debug!(
        from_width = image.width(),
        from_height = image.height(),
        width,
        height,
        "resizing image"
    );

    Ok(image.resize_exact(width, height, FilterType::Triangle))
}
