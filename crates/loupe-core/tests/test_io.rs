#[allow(dead_code)]
mod common;

use loupe_core::buffer::{PixelFormat, Rgba};
use loupe_core::io::{load_image, save_block_png};
use loupe_core::resample::{CpuResampler, Kernel, Resampler, SourceImage};
use loupe_core::transform::RenderView;

#[test]
fn test_load_keeps_gray_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gray.png");
    let img = image::GrayImage::from_fn(5, 3, |x, y| image::Luma([(x * 10 + y) as u8]));
    img.save(&path).unwrap();

    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded.format(), PixelFormat::Gray8);
    assert_eq!(loaded.width(), 5);
    assert_eq!(loaded.height(), 3);
    assert_eq!(loaded.rgba_at(4, 2), Some(Rgba([42, 42, 42, 255])));
}

#[test]
fn test_load_keeps_rgb_and_rgba_layouts() {
    let dir = tempfile::tempdir().unwrap();
    let rgb_path = dir.path().join("rgb.png");
    image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])).save(&rgb_path).unwrap();
    let rgba_path = dir.path().join("rgba.png");
    image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4])).save(&rgba_path).unwrap();

    let rgb = load_image(&rgb_path).unwrap();
    assert_eq!(rgb.format(), PixelFormat::Rgb8);
    let rgba = load_image(&rgba_path).unwrap();
    assert_eq!(rgba.format(), PixelFormat::Rgba8);
    assert_eq!(rgba.rgba_at(1, 1), Some(Rgba([1, 2, 3, 4])));
}

#[test]
fn test_load_converts_sixteen_bit_to_rgba8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.png");
    let img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_pixel(3, 3, image::Luma([65535]));
    img.save(&path).unwrap();

    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded.format(), PixelFormat::Rgba8);
    assert_eq!(loaded.rgba_at(0, 0), Some(Rgba([255, 255, 255, 255])));
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_image(&dir.path().join("nope.png")).is_err());
}

#[test]
fn test_save_rendered_block() {
    let source = SourceImage::new(common::solid_rgb(8, 8, [5, 6, 7]), 0.05);
    let view = RenderView {
        scale: 2.0,
        origin: Default::default(),
        viewport: source.size(),
        content: source.size(),
    };
    let block = CpuResampler::new(Rgba([0, 0, 0, 255]), 0.25).sample_viewport(&source, &view, Kernel::Nearest);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    save_block_png(&block, &path).unwrap();

    let back = load_image(&path).unwrap();
    assert_eq!(back.format(), PixelFormat::Rgba8);
    assert_eq!(back.size(), block.size());
    assert_eq!(back.rgba_at(3, 3), Some(Rgba([5, 6, 7, 255])));
}
