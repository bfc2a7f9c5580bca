//! Scoring modules.
//!
//! Each module is a set of pure functions over a decoded image plus the
//! configuration struct holding its documented defaults.

mod blur;
mod contrast;
mod grayscale;
mod resize;

pub use blur::{
    estimate_blur, laplacian, pretty_blur_map, BlurConfig, BlurEstimate, BlurMap,
    DEFAULT_BLUR_THRESHOLD,
};
pub use contrast::{
    check_contrast, percentile_sorted, ContrastConfig, ContrastEstimate, ContrastMethod,
    DEFAULT_FRACTION_THRESHOLD, DEFAULT_LOWER_PERCENTILE, DEFAULT_UPPER_PERCENTILE,
};
pub use grayscale::{ensure_non_empty, to_gray, GrayF32, LumaWeights, SampleRange};
pub use resize::{fix_image_size, scaled_dimensions, ResizeConfig, DEFAULT_EXPECTED_PIXELS};
