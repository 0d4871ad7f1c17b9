use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use crate::buffer::{ImageBuffer, PixelBlock, PixelFormat};
use crate::error::{LoupeError, Result};

/// Decode an image file into an 8-bit buffer.
///
/// Gray, gray+alpha and RGB sources keep their channel layout; anything else
/// (16-bit, float) is converted to RGBA 8-bit.
pub fn load_image(path: &Path) -> Result<ImageBuffer> {
    let img = image::open(path)?;
    let (w, h) = (img.width(), img.height());
    let buffer = match img {
        DynamicImage::ImageLuma8(gray) => {
            ImageBuffer::from_raw(w, h, PixelFormat::Gray8, gray.into_raw())?
        }
        DynamicImage::ImageLumaA8(gray) => {
            ImageBuffer::from_raw(w, h, PixelFormat::GrayAlpha8, gray.into_raw())?
        }
        DynamicImage::ImageRgb8(rgb) => {
            ImageBuffer::from_raw(w, h, PixelFormat::Rgb8, rgb.into_raw())?
        }
        other => ImageBuffer::from_raw(w, h, PixelFormat::Rgba8, other.to_rgba8().into_raw())?,
    };
    debug!(path = %path.display(), size = %buffer.size(), format = %buffer.format(), "image decoded");
    Ok(buffer)
}

/// Save a rendered viewport as an 8-bit RGBA PNG.
pub fn save_block_png(block: &PixelBlock, path: &Path) -> Result<()> {
    let img = RgbaImage::from_raw(block.width(), block.height(), block.to_rgba_bytes()).ok_or(
        LoupeError::InvalidDimensions {
            width: block.width(),
            height: block.height(),
        },
    )?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
