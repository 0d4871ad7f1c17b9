use loupe_core::buffer::{ImageBuffer, PixelFormat};
use loupe_core::config::ZoomConfig;
use loupe_core::geometry::Size;
use loupe_core::transform::{ScaleBounds, TransformState};

/// Default bounds, 0.05 to 40.
pub fn default_bounds() -> ScaleBounds {
    ScaleBounds::for_content(&ZoomConfig::default(), Size::new(1, 1))
}

/// Freshly loaded state: scale 1.0, centered.
pub fn state(content: (u32, u32), viewport: (u32, u32)) -> TransformState {
    TransformState::new(
        Size::new(content.0, content.1),
        Size::new(viewport.0, viewport.1),
        default_bounds(),
    )
    .unwrap()
}

/// Solid RGB image.
pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> ImageBuffer {
    ImageBuffer::from_fn(width, height, PixelFormat::Rgb8, |_, _| rgb.to_vec()).unwrap()
}

/// Gray image whose value encodes the column: `x * 255 / (width - 1)`.
pub fn horizontal_ramp(width: u32, height: u32) -> ImageBuffer {
    let denom = width.saturating_sub(1).max(1);
    ImageBuffer::from_fn(width, height, PixelFormat::Gray8, |x, _| {
        vec![(x * 255 / denom) as u8]
    })
    .unwrap()
}

/// Black and white checkerboard with `cell`-pixel squares.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> ImageBuffer {
    ImageBuffer::from_fn(width, height, PixelFormat::Gray8, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            vec![255]
        } else {
            vec![0]
        }
    })
    .unwrap()
}

/// Image where every pixel has a distinct color.
pub fn coordinate_rgb(width: u32, height: u32) -> ImageBuffer {
    ImageBuffer::from_fn(width, height, PixelFormat::Rgb8, |x, y| {
        vec![(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]
    })
    .unwrap()
}

/// RGBA checkerboard of one-pixel cells: transparent red beside opaque blue.
pub fn alpha_checkerboard(width: u32, height: u32) -> ImageBuffer {
    ImageBuffer::from_fn(width, height, PixelFormat::Rgba8, |x, y| {
        if (x + y) % 2 == 0 {
            vec![255, 0, 0, 0]
        } else {
            vec![0, 0, 255, 255]
        }
    })
    .unwrap()
}
