//! Low contrast detection.
//!
//! Contrast is the percentile-trimmed intensity span divided by the full
//! range of the image's sample representation. Trimming the extremes keeps
//! a handful of stray pixels from masking an otherwise flat image.

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::grayscale::{to_gray, LumaWeights, SampleRange};
use crate::error::{QaError, Result};

/// Default fraction of the full range below which an image is low contrast.
pub const DEFAULT_FRACTION_THRESHOLD: f64 = 0.20;
/// Default lower percentile.
pub const DEFAULT_LOWER_PERCENTILE: f64 = 1.0;
/// Default upper percentile.
pub const DEFAULT_UPPER_PERCENTILE: f64 = 99.0;

/// Contrast determination method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastMethod {
    /// Linear percentile span over the representation range.
    #[default]
    Linear,
}

impl ContrastMethod {
    /// Name used in configuration and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for ContrastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContrastMethod {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Self::Linear),
            other => Err(QaError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

/// Configuration for contrast checking.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastConfig {
    /// Ratios strictly below this fraction are flagged as low contrast.
    pub fraction_threshold: f64,
    /// Percentile (0-100) used as the bottom of the measured span.
    pub lower_percentile: f64,
    /// Percentile (0-100) used as the top of the measured span.
    pub upper_percentile: f64,
    /// How the span is measured.
    pub method: ContrastMethod,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            fraction_threshold: DEFAULT_FRACTION_THRESHOLD,
            lower_percentile: DEFAULT_LOWER_PERCENTILE,
            upper_percentile: DEFAULT_UPPER_PERCENTILE,
            method: ContrastMethod::Linear,
        }
    }
}

impl ContrastConfig {
    /// Checks that percentiles are ordered and inside 0-100.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.fraction_threshold.is_nan() {
            return Err(QaError::invalid_parameter(
                "fraction_threshold",
                self.fraction_threshold,
            ));
        }
        if !(0.0..=100.0).contains(&self.lower_percentile) {
            return Err(QaError::invalid_parameter(
                "lower_percentile",
                self.lower_percentile,
            ));
        }
        if !(0.0..=100.0).contains(&self.upper_percentile) {
            return Err(QaError::invalid_parameter(
                "upper_percentile",
                self.upper_percentile,
            ));
        }
        if self.lower_percentile > self.upper_percentile {
            return Err(QaError::invalid_parameter(
                "lower_percentile",
                format!(
                    "{} (greater than upper_percentile {})",
                    self.lower_percentile, self.upper_percentile
                ),
            ));
        }
        Ok(())
    }
}

/// Output of [`check_contrast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastEstimate {
    /// Trimmed span as a fraction of the representation range.
    pub ratio: f64,
    /// `ratio < fraction_threshold`.
    pub is_low_contrast: bool,
}

/// Determines whether an image is low contrast.
///
/// Three and four channel input is reduced with Rec. 709 luma weights.
/// The span is normalized by the representation range (0-255, 0-65535 or
/// 0-1), not by the image's own extremes.
///
/// # Errors
///
/// Returns [`QaError::InvalidParameter`] for bad percentiles,
/// [`QaError::InvalidInput`] for empty images, unsupported layouts or
/// non-finite float samples.
pub fn check_contrast(image: &DynamicImage, config: &ContrastConfig) -> Result<ContrastEstimate> {
    config.validate()?;
    let range = SampleRange::of(image)?;
    let gray = to_gray(image, LumaWeights::Rec709)?;

    let ratio = match config.method {
        ContrastMethod::Linear => {
            let mut values = gray.into_raw();
            values.sort_unstable_by(f32::total_cmp);
            let lower = percentile_sorted(&values, config.lower_percentile);
            let upper = percentile_sorted(&values, config.upper_percentile);
            (upper - lower) / range.span()
        }
    };
    let is_low_contrast = ratio < config.fraction_threshold;

    debug!(ratio, is_low_contrast, "checked contrast");

    Ok(ContrastEstimate {
        ratio,
        is_low_contrast,
    })
}

/// Percentile of ascending `sorted` values, interpolating linearly between
/// the two closest ranks (`rank = p / 100 * (n - 1)`).
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile_sorted(sorted: &[f32], percentile: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return 0.0;
    };
    if sorted.len() == 1 {
        return f64::from(last);
    }

    let rank = (percentile / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    let low = f64::from(sorted[below]);
    let high = f64::from(sorted[above]);
    low + (high - low) * (rank - below as f64)
}
