//! Pie charts summarising a batch.
//!
//! Two-slice pies rendered straight into an RGB buffer: the first slice
//! starts at 140 degrees and runs counter-clockwise, the background is white.
//! Each non-empty slice is labelled outside the disc and carries its share
//! as a percentage inside.

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use ab_glyph::{FontRef, PxScale};
use anyhow::{anyhow, Context, Result};
use blur_qa_core::BatchSummary;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{info, warn};

static FONT_BYTES: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");

/// Side length of the square chart in pixels.
pub const CHART_SIZE: u32 = 480;

const START_ANGLE_DEG: f64 = 140.0;
const DISC_RADIUS: f64 = 0.7;
const LABEL_RADIUS: f64 = 0.82;
const PERCENT_RADIUS: f64 = 0.42;
const TEXT_PX: f32 = 20.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT: Rgb<u8> = Rgb([0, 0, 0]);

const YELLOWGREEN: Rgb<u8> = Rgb([154, 205, 50]);
const GOLD: Rgb<u8> = Rgb([255, 215, 0]);
const LIGHTCORAL: Rgb<u8> = Rgb([240, 128, 128]);
const LIGHTSKYBLUE: Rgb<u8> = Rgb([135, 206, 250]);

/// File name of the blurry / non-blurry chart.
pub const BLURINESS_CHART: &str = "bluriness_pie.png";
/// File name of the low / ok contrast chart.
pub const CONTRAST_CHART: &str = "contrast_pie.png";

/// One chart: the share of the first slice plus both slice labels.
struct PieSpec {
    file_name: &'static str,
    fraction: f64,
    colors: [Rgb<u8>; 2],
    labels: [&'static str; 2],
}

/// Renders a two-slice pie where `fraction` of the disc gets `first`.
#[must_use]
pub fn render_pie(fraction: f64, first: Rgb<u8>, second: Rgb<u8>, size: u32) -> RgbImage {
    let fraction = fraction.clamp(0.0, 1.0);
    let center = f64::from(size) / 2.0;
    let radius = center * DISC_RADIUS;
    let start = START_ANGLE_DEG.to_radians();

    RgbImage::from_fn(size, size, |x, y| {
        let dx = f64::from(x) + 0.5 - center;
        // Image rows grow downwards; flip so angles run counter-clockwise.
        let dy = center - (f64::from(y) + 0.5);
        if dx.hypot(dy) > radius {
            return BACKGROUND;
        }
        let offset = (dy.atan2(dx) - start).rem_euclid(TAU);
        if offset < fraction * TAU {
            first
        } else {
            second
        }
    })
}

/// `matplotlib`-style `"%1.1f%%"` text for a share in `[0, 1]`.
fn percent_label(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

/// Draws `text` centred on the point at `angle` and `radius` (as a fraction
/// of half the image side) from the middle of `img`, shifted inwards where
/// it would cross the image border.
#[allow(clippy::cast_possible_truncation)]
fn draw_centered(img: &mut RgbImage, font: &FontRef<'_>, text: &str, angle: f64, radius: f64) {
    const MARGIN: f64 = 4.0;
    let center = f64::from(img.width()) / 2.0;
    let x = center + center * radius * angle.cos();
    let y = center - center * radius * angle.sin();
    let scale = PxScale::from(TEXT_PX);
    let (w, h) = text_size(scale, font, text);

    let fit = |pos: f64, extent: u32, side: u32| {
        let max = (f64::from(side) - f64::from(extent) - MARGIN).max(MARGIN);
        (pos - f64::from(extent) / 2.0).clamp(MARGIN, max).round() as i32
    };
    let left = fit(x, w, img.width());
    let top = fit(y, h, img.height());
    draw_text_mut(img, TEXT, left, top, scale, font, text);
}

/// Writes slice names outside the disc and percentages inside it.
fn annotate_pie(img: &mut RgbImage, font: &FontRef<'_>, fraction: f64, labels: [&str; 2]) {
    let fraction = fraction.clamp(0.0, 1.0);
    let start = START_ANGLE_DEG.to_radians();
    let slices = [
        (fraction, start + fraction * TAU / 2.0, labels[0]),
        (
            1.0 - fraction,
            start + fraction * TAU + (1.0 - fraction) * TAU / 2.0,
            labels[1],
        ),
    ];

    for (share, mid, label) in slices {
        if share <= 0.0 {
            continue;
        }
        draw_centered(img, font, label, mid, LABEL_RADIUS);
        draw_centered(img, font, &percent_label(share), mid, PERCENT_RADIUS);
    }
}

/// Writes both batch charts into `dir`, returning their paths.
///
/// Nothing is written for a batch without analysed images.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a PNG cannot be
/// written.
pub fn write_charts(dir: &Path, summary: &BatchSummary) -> Result<Vec<PathBuf>> {
    if summary.total == 0 {
        warn!("No analysed images, skipping charts");
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create charts directory: {}", dir.display()))?;
    let font = FontRef::try_from_slice(FONT_BYTES).map_err(|e| anyhow!("Font load failed: {e}"))?;

    let charts = [
        PieSpec {
            file_name: BLURINESS_CHART,
            fraction: summary.blurry_ratio,
            colors: [YELLOWGREEN, GOLD],
            labels: ["Blurry", "Non blurry"],
        },
        PieSpec {
            file_name: CONTRAST_CHART,
            fraction: summary.low_contrast_ratio,
            colors: [LIGHTCORAL, LIGHTSKYBLUE],
            labels: ["Low contrast", "OK contrast"],
        },
    ];

    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let path = dir.join(chart.file_name);
        let [first, second] = chart.colors;
        let mut img = render_pie(chart.fraction, first, second, CHART_SIZE);
        annotate_pie(&mut img, &font, chart.fraction, chart.labels);
        img.save(&path)
            .with_context(|| format!("Failed to write chart: {}", path.display()))?;
        info!("Wrote chart {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;

    fn count(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_full_and_empty_fraction() {
        let all = render_pie(1.0, GOLD, LIGHTCORAL, 64);
        assert!(count(&all, GOLD) > 0);
        assert_eq!(count(&all, LIGHTCORAL), 0);

        let none = render_pie(0.0, GOLD, LIGHTCORAL, 64);
        assert_eq!(count(&none, GOLD), 0);
        assert!(count(&none, LIGHTCORAL) > 0);
    }

    #[test]
    fn test_slice_area_tracks_fraction() {
        let img = render_pie(0.25, YELLOWGREEN, LIGHTSKYBLUE, 200);
        let first = count(&img, YELLOWGREEN) as f64;
        let second = count(&img, LIGHTSKYBLUE) as f64;

        let share = first / (first + second);
        assert!((share - 0.25).abs() < 0.01, "share was {share}");
    }

    #[test]
    fn test_corners_are_background() {
        let img = render_pie(0.5, GOLD, LIGHTCORAL, 50);
        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*img.get_pixel(49, 49), BACKGROUND);
    }

    #[test]
    fn test_first_slice_starts_at_start_angle() {
        // Just counter-clockwise of 140 degrees belongs to the first slice,
        // just clockwise of it to the second.
        let size = 200;
        let img = render_pie(0.1, GOLD, LIGHTCORAL, size);
        let color_at = |deg: f64| {
            let r = 60.0;
            let c = f64::from(size) / 2.0;
            let x = (c + r * deg.to_radians().cos()) as u32;
            let y = (c - r * deg.to_radians().sin()) as u32;
            *img.get_pixel(x, y)
        };

        assert_eq!(color_at(150.0), GOLD);
        assert_eq!(color_at(130.0), LIGHTCORAL);
    }

    #[test]
    fn test_write_charts() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let summary = BatchSummary {
            blurry: 1,
            blurry_ratio: 0.5,
            low_contrast: 0,
            low_contrast_ratio: 0.0,
            skipped: 0,
            total: 2,
        };

        let written = write_charts(&dir.path().join("charts"), &summary).expect("charts");

        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
        let chart = image::open(&written[0]).expect("decode chart");
        assert_eq!(chart.width(), CHART_SIZE);
    }

    #[test]
    fn test_write_charts_skips_empty_batch() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let summary = BatchSummary {
            blurry: 0,
            blurry_ratio: 0.0,
            low_contrast: 0,
            low_contrast_ratio: 0.0,
            skipped: 3,
            total: 0,
        };

        assert!(write_charts(dir.path(), &summary)
            .expect("charts")
            .is_empty());
    }

    #[test]
    fn test_percent_label() {
        assert_eq!(percent_label(0.5), "50.0%");
        assert_eq!(percent_label(1.0 / 3.0), "33.3%");
        assert_eq!(percent_label(1.0), "100.0%");
    }

    #[test]
    fn test_annotation_draws_text_on_both_slices() {
        let font = FontRef::try_from_slice(FONT_BYTES).expect("embedded font");
        let plain = render_pie(0.5, GOLD, LIGHTCORAL, CHART_SIZE);
        let mut labelled = plain.clone();
        annotate_pie(&mut labelled, &font, 0.5, ["Blurry", "Non blurry"]);

        // Text pixels replace part of each slice and some background.
        assert!(count(&labelled, GOLD) < count(&plain, GOLD));
        assert!(count(&labelled, LIGHTCORAL) < count(&plain, LIGHTCORAL));
        assert!(count(&labelled, BACKGROUND) < count(&plain, BACKGROUND));
    }

    #[test]
    fn test_empty_slice_is_not_labelled() {
        let font = FontRef::try_from_slice(FONT_BYTES).expect("embedded font");
        let plain = render_pie(1.0, GOLD, LIGHTCORAL, CHART_SIZE);
        let mut labelled = plain.clone();
        annotate_pie(&mut labelled, &font, 1.0, ["Blurry", "Non blurry"]);

        assert_eq!(count(&labelled, LIGHTCORAL), 0);
        assert!(count(&labelled, GOLD) < count(&plain, GOLD));
    }
}
