//! Synthetic image builders for testing.

use blur_qa_core::ImageInfo;
use image::{
    DynamicImage, GrayAlphaImage, GrayImage, Luma, LumaA, Rgb, Rgb32FImage, RgbImage,
};

/// Factory for images whose blur and contrast scores are known in advance.
///
/// Every image carries a `synthetic://<kind>` path so reports stay readable.
pub struct SyntheticImageBuilder;

fn named(kind: &str, image: DynamicImage) -> ImageInfo {
    ImageInfo::new(format!("synthetic://{kind}"), image)
}

fn gray(kind: &str, image: GrayImage) -> ImageInfo {
    named(kind, DynamicImage::ImageLuma8(image))
}

const fn on_off(on: bool) -> u8 {
    if on {
        u8::MAX
    } else {
        0
    }
}

/// `low + (high - low) * x / (width - 1)`, in integer steps.
#[allow(clippy::cast_possible_truncation)]
fn ramp_value(x: u32, width: u32, low: u8, high: u8) -> u8 {
    let span = u32::from(high.saturating_sub(low));
    (u32::from(low) + span * x / width.saturating_sub(1).max(1)) as u8
}

impl SyntheticImageBuilder {
    /// Black and white squares of 8px; sharp and full contrast.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> ImageInfo {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Black and white squares of `cell_size` px. Smaller cells give more
    /// edges and a higher clearness score.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> ImageInfo {
        gray(
            "checkerboard",
            GrayImage::from_fn(width, height, |x, y| {
                Luma([on_off((x / cell_size + y / cell_size) % 2 == 0)])
            }),
        )
    }

    /// Checkerboard in two off-white / near-black RGB colours.
    #[must_use]
    pub fn rgb_checkerboard(width: u32, height: u32, cell_size: u32) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell_size + y / cell_size) % 2 == 0 {
                Rgb([255, 240, 220])
            } else {
                Rgb([10, 0, 30])
            }
        });
        named("rgb_checkerboard", DynamicImage::ImageRgb8(img))
    }

    /// Alternating black and white columns of `bar_width` px.
    #[must_use]
    pub fn vertical_bars(width: u32, height: u32, bar_width: u32) -> ImageInfo {
        gray(
            "vertical_bars",
            GrayImage::from_fn(width, height, |x, _| Luma([on_off((x / bar_width) % 2 == 0)])),
        )
    }

    /// Flat image; both scores are exactly zero.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> ImageInfo {
        gray(
            "uniform_gray",
            GrayImage::from_pixel(width, height, Luma([value])),
        )
    }

    /// Left-to-right ramp over 0..=255: blurry, full contrast.
    #[must_use]
    pub fn horizontal_gradient(width: u32, height: u32) -> ImageInfo {
        gray(
            "horizontal_gradient",
            GrayImage::from_fn(width, height, |x, _| Luma([ramp_value(x, width, 0, u8::MAX)])),
        )
    }

    /// [`checkerboard`](Self::checkerboard) smoothed by a Gaussian of `sigma`.
    #[must_use]
    pub fn blurred_checkerboard(width: u32, height: u32, sigma: f32) -> ImageInfo {
        let sharp = Self::checkerboard(width, height).image.to_luma8();
        gray(
            "blurred_checkerboard",
            image::imageops::blur(&sharp, sigma),
        )
    }

    /// Left-to-right ramp from `low` to `high`.
    #[must_use]
    pub fn ramp(width: u32, height: u32, low: u8, high: u8) -> ImageInfo {
        gray(
            "ramp",
            GrayImage::from_fn(width, height, |x, _| Luma([ramp_value(x, width, low, high)])),
        )
    }

    /// One-row float image (neutral RGB) holding `values`.
    ///
    /// # Panics
    ///
    /// Panics if `values` has more than `u32::MAX` entries.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn float_row(values: &[f32]) -> ImageInfo {
        let width = u32::try_from(values.len()).expect("row too long");
        let img = Rgb32FImage::from_fn(width, 1, |x, _| {
            let v = values[x as usize];
            Rgb([v, v, v])
        });
        named("float_row", DynamicImage::ImageRgb32F(img))
    }

    /// Evenly spaced values from `start` to `stop` inclusive.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn linspace(start: f32, stop: f32, n: usize) -> Vec<f32> {
        match n {
            0 => vec![],
            1 => vec![start],
            _ => (0..n)
                .map(|i| start + (stop - start) * i as f32 / (n - 1) as f32)
                .collect(),
        }
    }

    /// 1x1 gray image.
    #[must_use]
    pub fn single_pixel(value: u8) -> ImageInfo {
        gray("1x1", GrayImage::from_pixel(1, 1, Luma([value])))
    }

    /// Flat RGB image.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> ImageInfo {
        named(
            "rgb_uniform",
            DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([r, g, b]))),
        )
    }

    /// Gray + alpha image, a layout the scorers reject.
    #[must_use]
    pub fn gray_alpha(width: u32, height: u32) -> ImageInfo {
        named(
            "gray_alpha",
            DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(
                width,
                height,
                LumaA([128, 255]),
            )),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_dimensions() {
        let img = SyntheticImageBuilder::checkerboard(100, 80);
        assert_eq!(img.width, 100);
        assert_eq!(img.height, 80);
        assert_eq!(img.path, "synthetic://checkerboard");
    }

    #[test]
    fn test_checkerboard_pattern() {
        let img = SyntheticImageBuilder::checkerboard_with_cell_size(16, 16, 8);
        let luma = img.image.to_luma8();

        assert_eq!(luma.get_pixel(0, 0).0[0], 255);
        assert_eq!(luma.get_pixel(8, 0).0[0], 0);
    }

    #[test]
    fn test_uniform_gray() {
        let img = SyntheticImageBuilder::uniform_gray(50, 50, 100);
        assert!(img.image.to_luma8().pixels().all(|p| p.0[0] == 100));
    }

    #[test]
    fn test_gradient_range() {
        let luma = SyntheticImageBuilder::horizontal_gradient(256, 10)
            .image
            .to_luma8();

        assert_eq!(luma.get_pixel(0, 0).0[0], 0);
        assert_eq!(luma.get_pixel(255, 0).0[0], 255);
    }

    #[test]
    fn test_ramp_bounds() {
        let luma = SyntheticImageBuilder::ramp(100, 2, 120, 130).image.to_luma8();

        assert_eq!(luma.get_pixel(0, 1).0[0], 120);
        assert_eq!(luma.get_pixel(99, 1).0[0], 130);
    }

    #[test]
    fn test_linspace() {
        let values = SyntheticImageBuilder::linspace(0.0, 1.0, 5);
        assert_eq!(values.len(), 5);
        assert!((values[2] - 0.5).abs() < f32::EPSILON);
        assert!(SyntheticImageBuilder::linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_float_row() {
        let img = SyntheticImageBuilder::float_row(&[0.0, 0.25, 1.0]);
        assert_eq!((img.width, img.height), (3, 1));
        assert!(matches!(img.image, DynamicImage::ImageRgb32F(_)));
    }

    #[test]
    fn test_gray_alpha_has_two_channels() {
        let img = SyntheticImageBuilder::gray_alpha(4, 4);
        assert_eq!(img.image.color().channel_count(), 2);
    }
}
