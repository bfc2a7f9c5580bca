//! Configuration file support for blur-qa.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/blur-qa/config.toml` (lowest priority)
//! - Project-local: `.blur-qa.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// File name searched for in the working directory and its parents.
pub const PROJECT_CONFIG_NAME: &str = ".blur-qa.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Blur detection settings.
    pub blur: BlurConfig,
    /// Contrast check settings.
    pub contrast: ContrastConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories (default true).
    pub recursive: Option<bool>,
}

/// Blur detection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Laplacian variance below which an image is blurry.
    pub threshold: Option<f64>,
    /// Resize images to `expected_pixels` before scoring.
    pub fix_size: Option<bool>,
    /// Pixel budget used when `fix_size` is on.
    pub expected_pixels: Option<u64>,
}

/// Contrast check configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ContrastConfig {
    /// Ratio below which an image is low contrast (0.0-1.0).
    pub fraction_threshold: Option<f64>,
    /// Lower percentile (0-100).
    pub lower_percentile: Option<f64>,
    /// Upper percentile (0-100).
    pub upper_percentile: Option<f64>,
    /// Contrast method; only "linear" is supported.
    pub method: Option<String>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for the pie charts.
    pub charts_dir: Option<PathBuf>,
    /// Directory for rendered blur maps.
    pub blur_maps_dir: Option<PathBuf>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Reads the XDG file, then lays the nearest `.blur-qa.toml` over it.
    ///
    /// Missing files are skipped; unreadable or malformed files are logged
    /// and skipped. Out-of-range values produce a warning on stderr but the
    /// config is still returned, so the CLI parsers get the final say.
    pub fn load() -> Self {
        let layers = [xdg_config_path(), find_project_config()];
        let config = layers
            .into_iter()
            .flatten()
            .filter_map(|path| read_layer(&path))
            .fold(Self::default(), |mut acc, layer| {
                acc.merge(layer);
                acc
            });

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }
        config
    }

    /// Checks every value that has a fixed valid range.
    fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.blur.threshold.filter(|t| t.is_nan() || *t < 0.0) {
            return Err(format!("blur.threshold must be >= 0, got {t}"));
        }
        if self.blur.expected_pixels == Some(0) {
            return Err("blur.expected_pixels must be > 0".to_string());
        }
        if let Some(t) = self
            .contrast
            .fraction_threshold
            .filter(|t| !(0.0..=1.0).contains(t))
        {
            return Err(format!(
                "contrast.fraction_threshold must be 0.0-1.0, got {t}"
            ));
        }

        let ContrastConfig {
            lower_percentile,
            upper_percentile,
            method,
            ..
        } = &self.contrast;
        for (name, value) in [
            ("contrast.lower_percentile", lower_percentile),
            ("contrast.upper_percentile", upper_percentile),
        ] {
            if let Some(p) = value.filter(|p| !(0.0..=100.0).contains(p)) {
                return Err(format!("{name} must be 0-100, got {p}"));
            }
        }
        if let (Some(lower), Some(upper)) = (lower_percentile, upper_percentile) {
            if lower > upper {
                return Err(format!(
                    "contrast.lower_percentile ({lower}) exceeds upper_percentile ({upper})"
                ));
            }
        }
        match method.as_deref() {
            None | Some("linear") => Ok(()),
            Some(m) => Err(format!("contrast.method must be 'linear', got '{m}'")),
        }
    }

    /// Lays `other` over `self`; set values in `other` win.
    fn merge(&mut self, other: Self) {
        overlay(&mut self.general.recursive, other.general.recursive);

        overlay(&mut self.blur.threshold, other.blur.threshold);
        overlay(&mut self.blur.fix_size, other.blur.fix_size);
        overlay(&mut self.blur.expected_pixels, other.blur.expected_pixels);

        let contrast = other.contrast;
        overlay(
            &mut self.contrast.fraction_threshold,
            contrast.fraction_threshold,
        );
        overlay(&mut self.contrast.lower_percentile, contrast.lower_percentile);
        overlay(&mut self.contrast.upper_percentile, contrast.upper_percentile);
        overlay(&mut self.contrast.method, contrast.method);

        overlay(&mut self.output.charts_dir, other.output.charts_dir);
        overlay(&mut self.output.blur_maps_dir, other.output.blur_maps_dir);
        overlay(&mut self.output.progress, other.output.progress);
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// `$XDG_CONFIG_HOME/blur-qa/config.toml`, if it exists.
fn xdg_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("blur-qa").join("config.toml");
    if path.is_file() {
        Some(path)
    } else {
        debug!("No XDG config at {}", path.display());
        None
    }
}

fn find_project_config() -> Option<PathBuf> {
    find_config_in_parents(&std::env::current_dir().ok()?)
}

/// Nearest `.blur-qa.toml` at or above `start`.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_NAME))
        .find(|candidate| candidate.is_file())
}

fn read_layer(path: &Path) -> Option<AppConfig> {
    info!("Loading config: {}", path.display());
    let parsed = std::fs::read_to_string(path)
        .context("read failed")
        .and_then(|text| toml::from_str::<AppConfig>(&text).context("parse failed"));

    match parsed {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Ignoring config file {}: {e:#}", path.display());
            None
        }
    }
}
