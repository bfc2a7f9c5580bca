//! Integration tests for directory walking and image decoding.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_truncation)]

use blur_qa_adapters::FsImageSource;
use blur_qa_core::ImageSource;
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_png(path: &Path, width: u32, height: u32) {
    let img = GrayImage::from_fn(width, height, |x, y| Luma([((x + y) % 2 * 255) as u8]));
    img.save(path).expect("save png");
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 100, 50]));
    img.save(path).expect("save jpeg");
}

/// Builds:
///
/// ```text
/// root/
///   b.png
///   a.JPG
///   notes.txt
///   nested/
///     c.jpeg
/// ```
fn fixture_tree() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    write_png(&dir.path().join("b.png"), 8, 6);
    write_jpeg(&dir.path().join("a.JPG"), 16, 8);
    fs::write(dir.path().join("notes.txt"), "not an image").expect("write txt");
    fs::create_dir(dir.path().join("nested")).expect("mkdir");
    write_jpeg(&dir.path().join("nested").join("c.jpeg"), 4, 4);
    dir
}

#[test]
fn test_recursive_walk_is_sorted_and_filtered() {
    let dir = fixture_tree();
    let source = FsImageSource::new(vec![dir.path().to_path_buf()], true);

    let names: Vec<_> = source
        .files()
        .iter()
        .map(|p| {
            p.strip_prefix(dir.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();

    assert_eq!(names, vec!["a.JPG", "b.png", "nested/c.jpeg"]);
    assert_eq!(source.count_hint(), Some(3));
}

#[test]
fn test_non_recursive_walk_skips_subdirectories() {
    let dir = fixture_tree();
    let source = FsImageSource::new(vec![dir.path().to_path_buf()], false);

    assert_eq!(source.count_hint(), Some(2));
}

#[test]
fn test_images_are_decoded_with_dimensions() {
    let dir = fixture_tree();
    let source = FsImageSource::new(vec![dir.path().to_path_buf()], true);

    let images: Vec<_> = source
        .images()
        .collect::<Result<Vec<_>, _>>()
        .expect("all fixtures decode");

    assert_eq!(images.len(), 3);
    assert!(images[0].path.ends_with("a.JPG"));
    assert_eq!((images[0].width, images[0].height), (16, 8));
    assert!(images[1].path.ends_with("b.png"));
    assert_eq!((images[1].width, images[1].height), (8, 6));
    assert_eq!(images[1].image.color().channel_count(), 1);
}

#[test]
fn test_single_file_path() {
    let dir = fixture_tree();
    let file = dir.path().join("b.png");
    let source = FsImageSource::new(vec![file], false);

    let info = source.images().next().unwrap().expect("should load PNG");
    assert_eq!((info.width, info.height), (8, 6));
}

#[test]
fn test_corrupt_file_yields_error_with_path() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("broken.png"), b"definitely not a png").expect("write");
    let source = FsImageSource::new(vec![dir.path().to_path_buf()], false);

    let err = source.images().next().unwrap().expect_err("decode must fail");
    assert!(err.path.ends_with("broken.png"), "{}", err.path);
    assert!(err.to_string().contains("broken.png"));
}

#[test]
fn test_missing_path_yields_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let source = FsImageSource::new(vec![dir.path().join("does-not-exist")], true);

    assert_eq!(source.images().count(), 0);
}
