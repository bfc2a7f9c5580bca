//! Scoring arguments shared by `check` and `score`.

use anyhow::Result;
use blur_qa_core::modules::DEFAULT_EXPECTED_PIXELS;
use blur_qa_core::{AnalyzerConfig, BlurConfig, ContrastConfig, ContrastMethod, ResizeConfig};
use clap::Args;

use crate::config::AppConfig;

/// Hardcoded default values.
pub mod defaults {
    /// Laplacian variance threshold of the batch tool.
    pub const BLUR_THRESHOLD: f64 = 5.0;
    pub const CONTRAST_THRESHOLD: f64 = blur_qa_core::modules::DEFAULT_FRACTION_THRESHOLD;
    pub const LOWER_PERCENTILE: f64 = blur_qa_core::modules::DEFAULT_LOWER_PERCENTILE;
    pub const UPPER_PERCENTILE: f64 = blur_qa_core::modules::DEFAULT_UPPER_PERCENTILE;
    pub const METHOD: &str = "linear";
}

/// Parse a non-negative blur threshold.
fn parse_blur_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be a finite number >= 0"))
    }
}

/// Parse a fraction (0.0-1.0).
fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse a percentile (0-100).
fn parse_percentile(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..=100"))
    }
}

/// Parse a positive pixel count.
fn parse_pixels(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("expected pixel count must be > 0".to_string()),
        Ok(v) => Ok(v),
        Err(_) => Err(format!("'{s}' is not a valid pixel count")),
    }
}

/// Thresholds and preprocessing options.
#[derive(Args, Clone, Debug, Default)]
pub struct ScoringArgs {
    /// Blur threshold: Laplacian variance below this is blurry [default: 5.0]
    #[arg(short, long, value_parser = parse_blur_threshold)]
    pub threshold: Option<f64>,

    /// Resize images to a fixed pixel budget before scoring
    #[arg(short, long)]
    pub fix_size: bool,

    /// Pixel budget for --fix-size [default: 2000000]
    #[arg(long, value_parser = parse_pixels, value_name = "PIXELS")]
    pub expected_pixels: Option<u64>,

    /// Contrast ratio below this is low contrast (0.0-1.0) [default: 0.2]
    #[arg(long, value_parser = parse_fraction)]
    pub contrast_threshold: Option<f64>,

    /// Lower percentile of the contrast span (0-100) [default: 1]
    #[arg(long, value_parser = parse_percentile)]
    pub lower_percentile: Option<f64>,

    /// Upper percentile of the contrast span (0-100) [default: 99]
    #[arg(long, value_parser = parse_percentile)]
    pub upper_percentile: Option<f64>,

    /// Contrast method [default: linear]
    #[arg(long)]
    pub method: Option<String>,
}

impl ScoringArgs {
    /// Fill unset options from the config file. CLI values win.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.threshold = self.threshold.or(config.blur.threshold);
        if !self.fix_size {
            self.fix_size = config.blur.fix_size.unwrap_or(false);
        }
        self.expected_pixels = self.expected_pixels.or(config.blur.expected_pixels);
        self.contrast_threshold = self
            .contrast_threshold
            .or(config.contrast.fraction_threshold);
        self.lower_percentile = self.lower_percentile.or(config.contrast.lower_percentile);
        self.upper_percentile = self.upper_percentile.or(config.contrast.upper_percentile);
        if self.method.is_none() {
            self.method.clone_from(&config.contrast.method);
        }
        self
    }

    /// Get blur threshold with fallback to hardcoded default.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold.unwrap_or(defaults::BLUR_THRESHOLD)
    }

    /// Builds the analyzer settings.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown contrast method or inconsistent
    /// percentiles.
    pub fn analyzer_config(&self) -> Result<AnalyzerConfig> {
        let method: ContrastMethod = self.method.as_deref().unwrap_or(defaults::METHOD).parse()?;
        let contrast = ContrastConfig {
            fraction_threshold: self
                .contrast_threshold
                .unwrap_or(defaults::CONTRAST_THRESHOLD),
            lower_percentile: self.lower_percentile.unwrap_or(defaults::LOWER_PERCENTILE),
            upper_percentile: self.upper_percentile.unwrap_or(defaults::UPPER_PERCENTILE),
            method,
        };
        contrast.validate()?;

        let resize = self.fix_size.then(|| ResizeConfig {
            expected_pixels: self.expected_pixels.unwrap_or(DEFAULT_EXPECTED_PIXELS),
        });

        Ok(AnalyzerConfig {
            resize,
            blur: BlurConfig {
                threshold: self.threshold(),
            },
            contrast,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parsers() {
        assert_eq!(parse_blur_threshold("5"), Ok(5.0));
        assert!(parse_blur_threshold("-1").is_err());
        assert!(parse_blur_threshold("nan").is_err());
        assert!(parse_fraction("1.5").is_err());
        assert_eq!(parse_percentile("99"), Ok(99.0));
        assert!(parse_percentile("101").is_err());
        assert!(parse_pixels("0").is_err());
        assert_eq!(parse_pixels("1000"), Ok(1000));
    }

    #[test]
    fn test_defaults() {
        let config = ScoringArgs::default().analyzer_config().unwrap();

        assert_eq!(config.blur.threshold, 5.0);
        assert!(config.resize.is_none());
        assert_eq!(config.contrast, ContrastConfig::default());
    }

    #[test]
    fn test_fix_size_uses_budget() {
        let args = ScoringArgs {
            fix_size: true,
            ..Default::default()
        };
        let config = args.analyzer_config().unwrap();
        assert_eq!(
            config.resize.map(|r| r.expected_pixels),
            Some(DEFAULT_EXPECTED_PIXELS)
        );
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let args = ScoringArgs {
            method: Some("log".to_string()),
            ..Default::default()
        };
        let err = args.analyzer_config().unwrap_err();
        assert!(err.to_string().contains("unsupported contrast method 'log'"));
    }

    #[test]
    fn test_inverted_percentiles_are_rejected() {
        let args = ScoringArgs {
            lower_percentile: Some(90.0),
            upper_percentile: Some(10.0),
            ..Default::default()
        };
        assert!(args.analyzer_config().is_err());
    }

    #[test]
    fn test_cli_wins_over_config() {
        let config: AppConfig = toml::from_str(
            r"
[blur]
threshold = 40.0
fix_size = true
expected_pixels = 1000

[contrast]
fraction_threshold = 0.4
",
        )
        .unwrap();
        let args = ScoringArgs {
            threshold: Some(7.0),
            ..Default::default()
        }
        .with_config(&config);

        assert_eq!(args.threshold(), 7.0);
        assert!(args.fix_size);
        assert_eq!(args.expected_pixels, Some(1000));
        assert_eq!(args.contrast_threshold, Some(0.4));
    }
}
