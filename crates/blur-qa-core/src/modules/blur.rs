//! Blur estimation.
//!
//! Sharpness is measured as the variance of the image's discrete Laplacian.
//! Focused images carry strong edges and produce widely spread Laplacian
//! responses; blurred images collapse toward a flat response. A *low*
//! score therefore means *blurry*.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::{box_filter, median_filter};
use tracing::debug;

use super::grayscale::{to_gray, GrayF32, LumaWeights};
use crate::error::{QaError, Result};

/// Per-pixel Laplacian response, same shape as the input image.
pub type BlurMap = GrayF32;

/// Default threshold below which an image is classified as blurry.
pub const DEFAULT_BLUR_THRESHOLD: f64 = 100.0;

/// Classic 3x3 discrete Laplacian.
const LAPLACIAN_3X3: [f64; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

/// Neighbourhood radius of the display smoothing (5x5 windows).
const PRETTY_RADIUS: u32 = 2;

/// Configuration for blur detection.
#[derive(Debug, Clone, PartialEq)]
pub struct BlurConfig {
    /// Variance threshold. Scores strictly below it are flagged as blurry.
    pub threshold: f64,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BLUR_THRESHOLD,
        }
    }
}

/// Output of [`estimate_blur`].
#[derive(Debug, Clone)]
pub struct BlurEstimate {
    /// Laplacian response of the grayscale image.
    pub blur_map: BlurMap,
    /// Population variance of `blur_map`.
    pub score: f64,
    /// `score < threshold`.
    pub is_blurry: bool,
}

/// Estimates how blurry an image is.
///
/// Colour input is reduced with Rec. 601 luma weights first. The score is
/// not normalized for image size; resize with
/// [`fix_image_size`](super::fix_image_size) beforehand when comparing
/// images of different resolutions.
///
/// # Errors
///
/// Returns [`QaError::InvalidInput`] for empty images, unsupported
/// channel layouts or non-finite float samples, and
/// [`QaError::InvalidParameter`] for a NaN threshold.
pub fn estimate_blur(image: &DynamicImage, threshold: f64) -> Result<BlurEstimate> {
    if threshold.is_nan() {
        return Err(QaError::invalid_parameter("threshold", threshold));
    }

    let gray = to_gray(image, LumaWeights::Rec601)?;
    let blur_map = laplacian(&gray);
    let score = variance(blur_map.as_raw());
    let is_blurry = score < threshold;

    debug!(
        width = gray.width(),
        height = gray.height(),
        score,
        is_blurry,
        "estimated blur"
    );

    Ok(BlurEstimate {
        blur_map,
        score,
        is_blurry,
    })
}

/// Applies the 3x3 Laplacian with reflect-101 borders.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn laplacian(gray: &GrayF32) -> BlurMap {
    let (width, height) = gray.dimensions();

    BlurMap::from_fn(width, height, |x, y| {
        let mut acc = 0.0f64;
        for (k, weight) in LAPLACIAN_3X3.iter().enumerate() {
            let dx = (k % 3) as i64 - 1;
            let dy = (k / 3) as i64 - 1;
            let sx = reflect_101(i64::from(x) + dx, width);
            let sy = reflect_101(i64::from(y) + dy, height);
            acc += weight * f64::from(gray.get_pixel(sx, sy)[0]);
        }
        Luma([acc as f32])
    })
}

/// Mirrors an out-of-range index back inside `0..len` without repeating the
/// edge sample (`-1 -> 1`, `len -> len - 2`). Only valid for offsets of one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn reflect_101(index: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len == 1 {
        return 0;
    }
    let mirrored = if index < 0 {
        -index
    } else if index >= len {
        2 * (len - 1) - index
    } else {
        index
    };
    mirrored as u32
}

/// Population variance (mean of squared deviations).
#[allow(clippy::cast_precision_loss)]
fn variance(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    values
        .iter()
        .map(|&v| {
            let diff = f64::from(v) - mean;
            diff * diff
        })
        .sum::<f64>()
        / n
}

/// Renders a blur map for viewing.
///
/// Takes the log magnitude of each response, stretches it to 8 bits and
/// smooths it with a 5x5 box blur followed by a 5x5 median filter. The
/// result is for display only and plays no part in scoring.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
pub fn pretty_blur_map(blur_map: &BlurMap) -> GrayImage {
    let (width, height) = blur_map.dimensions();
    let magnitude: Vec<f32> = blur_map.pixels().map(|p| p[0].abs().ln_1p()).collect();
    let peak = magnitude.iter().copied().fold(0.0f32, f32::max);
    let scale = if peak > 0.0 { 255.0 / peak } else { 0.0 };

    let stretched = GrayImage::from_fn(width, height, |x, y| {
        let value = magnitude[(y as usize) * (width as usize) + x as usize] * scale;
        Luma([value.round().clamp(0.0, 255.0) as u8])
    });

    let smoothed = box_filter(&stretched, PRETTY_RADIUS, PRETTY_RADIUS);
    median_filter(&smoothed, PRETTY_RADIUS, PRETTY_RADIUS)
}
