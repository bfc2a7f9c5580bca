//! Grayscale reduction and sample range lookup.
//!
//! Both estimators work on a single `f32` luminance plane expressed in the
//! image's native units (0-255 for 8-bit data, 0-65535 for 16-bit, 0-1 for
//! float), so scores stay comparable with the representation's full range.

use image::{DynamicImage, ImageBuffer, Luma, Pixel};

use crate::error::{QaError, Result};

/// Single-channel floating point image.
pub type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Luma coefficients used when collapsing RGB to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LumaWeights {
    /// ITU-R BT.601: `0.299 R + 0.587 G + 0.114 B`.
    Rec601,
    /// ITU-R BT.709: `0.2125 R + 0.7154 G + 0.0721 B`.
    Rec709,
}

impl LumaWeights {
    /// Returns the `[r, g, b]` coefficients.
    #[must_use]
    pub const fn coefficients(self) -> [f64; 3] {
        match self {
            Self::Rec601 => [0.299, 0.587, 0.114],
            Self::Rec709 => [0.2125, 0.7154, 0.0721],
        }
    }
}

/// Theoretical value range of an image's sample representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRange {
    /// Lowest representable intensity.
    pub min: f64,
    /// Highest representable intensity.
    pub max: f64,
}

impl SampleRange {
    /// 8-bit unsigned samples.
    pub const U8: Self = Self {
        min: 0.0,
        max: 255.0,
    };
    /// 16-bit unsigned samples.
    pub const U16: Self = Self {
        min: 0.0,
        max: 65535.0,
    };
    /// Floating point samples, assumed normalized.
    pub const F32: Self = Self { min: 0.0, max: 1.0 };

    /// Looks up the range for the image's pixel representation.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::InvalidInput`] for pixel formats this crate does
    /// not know about.
    pub fn of(image: &DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => Ok(Self::U8),
            DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_) => Ok(Self::U16),
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => Ok(Self::F32),
            other => Err(QaError::invalid_input(format!(
                "unsupported pixel format {:?}",
                other.color()
            ))),
        }
    }

    /// Width of the range (`max - min`).
    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }
}

/// Checks that the image has a non-zero area.
///
/// # Errors
///
/// Returns [`QaError::InvalidInput`] when either dimension is zero.
pub fn ensure_non_empty(image: &DynamicImage) -> Result<()> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(QaError::invalid_input(format!(
            "zero area ({width}x{height})"
        )));
    }
    Ok(())
}

/// Reduces an image to a single luminance plane.
///
/// Single-channel images are copied as is. Three and four channel images
/// are weighted with `weights`; alpha is ignored.
///
/// # Errors
///
/// Returns [`QaError::InvalidInput`] for empty images, for channel counts
/// other than 1, 3 or 4, and for float images holding NaN or infinite
/// samples.
pub fn to_gray(image: &DynamicImage, weights: LumaWeights) -> Result<GrayF32> {
    ensure_non_empty(image)?;

    match image {
        DynamicImage::ImageLuma8(buffer) => Ok(first_channel(buffer)),
        DynamicImage::ImageLuma16(buffer) => Ok(first_channel(buffer)),
        DynamicImage::ImageRgb8(buffer) => Ok(weighted_luma(buffer, weights)),
        DynamicImage::ImageRgba8(buffer) => Ok(weighted_luma(buffer, weights)),
        DynamicImage::ImageRgb16(buffer) => Ok(weighted_luma(buffer, weights)),
        DynamicImage::ImageRgba16(buffer) => Ok(weighted_luma(buffer, weights)),
        DynamicImage::ImageRgb32F(buffer) => require_finite(weighted_luma(buffer, weights)),
        DynamicImage::ImageRgba32F(buffer) => require_finite(weighted_luma(buffer, weights)),
        other => Err(QaError::invalid_input(format!(
            "unsupported channel count {} (expected 1, 3 or 4)",
            other.color().channel_count()
        ))),
    }
}

/// Fails on the first NaN or infinite luminance value.
fn require_finite(gray: GrayF32) -> Result<GrayF32> {
    match gray.enumerate_pixels().find(|(_, _, p)| !p[0].is_finite()) {
        Some((x, y, p)) => Err(QaError::invalid_input(format!(
            "non-finite sample {} at ({x}, {y})",
            p[0]
        ))),
        None => Ok(gray),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn first_channel<P>(buffer: &ImageBuffer<P, Vec<P::Subpixel>>) -> GrayF32
where
    P: Pixel,
    P::Subpixel: Into<f64>,
{
    let (width, height) = buffer.dimensions();
    GrayF32::from_fn(width, height, |x, y| {
        let value: f64 = buffer.get_pixel(x, y).channels()[0].into();
        Luma([value as f32])
    })
}

#[allow(clippy::cast_possible_truncation)]
fn weighted_luma<P>(buffer: &ImageBuffer<P, Vec<P::Subpixel>>, weights: LumaWeights) -> GrayF32
where
    P: Pixel,
    P::Subpixel: Into<f64>,
{
    let [wr, wg, wb] = weights.coefficients();
    let (width, height) = buffer.dimensions();
    GrayF32::from_fn(width, height, |x, y| {
        let channels = buffer.get_pixel(x, y).channels();
        let r: f64 = channels[0].into();
        let g: f64 = channels[1].into();
        let b: f64 = channels[2].into();
        Luma([(wr * r + wg * g + wb * b) as f32])
    })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, LumaA, Rgb, RgbImage, Rgba, Rgba32FImage};

    #[test]
    fn test_coefficients_sum_to_one() {
        for weights in [LumaWeights::Rec601, LumaWeights::Rec709] {
            let sum: f64 = weights.coefficients().iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{weights:?} sums to {sum}");
        }
    }

    #[test]
    fn test_sample_range_per_representation() {
        let luma8 = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        let rgb16 = DynamicImage::new_rgb16(2, 2);
        let rgba32f = DynamicImage::new_rgba32f(2, 2);

        assert_eq!(SampleRange::of(&luma8).expect("u8"), SampleRange::U8);
        assert_eq!(SampleRange::of(&rgb16).expect("u16"), SampleRange::U16);
        assert_eq!(SampleRange::of(&rgba32f).expect("f32"), SampleRange::F32);
        assert!((SampleRange::U16.span() - 65535.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gray_input_is_copied() {
        let img = GrayImage::from_fn(4, 3, |x, y| image::Luma([(x * 10 + y) as u8]));
        let gray = to_gray(&DynamicImage::ImageLuma8(img), LumaWeights::Rec601).expect("gray");

        assert_eq!(gray.dimensions(), (4, 3));
        assert!((gray.get_pixel(3, 2)[0] - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rgb_uses_weights() {
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let dynamic = DynamicImage::ImageRgb8(img);

        let rec601 = to_gray(&dynamic, LumaWeights::Rec601).expect("rec601");
        let rec709 = to_gray(&dynamic, LumaWeights::Rec709).expect("rec709");

        assert!((rec601.get_pixel(0, 0)[0] - 76.245).abs() < 1e-3);
        assert!((rec709.get_pixel(0, 0)[0] - 54.1875).abs() < 1e-3);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let img = Rgba32FImage::from_pixel(2, 2, Rgba([0.5, 0.5, 0.5, 0.0]));
        let gray = to_gray(&DynamicImage::ImageRgba32F(img), LumaWeights::Rec709).expect("gray");

        assert!((gray.get_pixel(1, 1)[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_two_channels_rejected() {
        let img = GrayAlphaImage::from_pixel(3, 3, LumaA([10, 255]));
        let err = to_gray(&DynamicImage::ImageLumaA8(img), LumaWeights::Rec601)
            .expect_err("two channels must fail");

        assert!(matches!(err, QaError::InvalidInput { .. }));
        assert!(err.to_string().contains("channel count 2"));
    }

    #[test]
    fn test_zero_area_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 5));
        let err = to_gray(&img, LumaWeights::Rec709).expect_err("empty must fail");

        assert!(matches!(err, QaError::InvalidInput { .. }));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let mut img = Rgba32FImage::from_pixel(8, 8, Rgba([0.5, 0.5, 0.5, 1.0]));
        img.put_pixel(3, 5, Rgba([f32::NAN, 0.5, 0.5, 1.0]));
        let err = to_gray(&DynamicImage::ImageRgba32F(img), LumaWeights::Rec709)
            .expect_err("NaN must fail");

        assert!(matches!(err, QaError::InvalidInput { .. }));
        assert!(err.to_string().contains("(3, 5)"), "{err}");

        let img = Rgba32FImage::from_pixel(2, 2, Rgba([f32::INFINITY, 0.0, 0.0, 1.0]));
        assert!(to_gray(&DynamicImage::ImageRgba32F(img), LumaWeights::Rec601).is_err());
    }
}
