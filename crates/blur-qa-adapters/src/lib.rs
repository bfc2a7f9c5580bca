//! Blur QA Adapters - external adapters for blur-qa.
//!
//! This crate provides the filesystem image source that walks input
//! directories and decodes `.jpg`, `.jpeg` and `.png` files.

pub mod fs;

pub use fs::{is_supported_image, FsImageSource, SUPPORTED_EXTENSIONS};
