use ndarray::{Array3, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{LoupeError, Result};
use crate::geometry::Size;

/// Channel layout of a decoded image. All formats are 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Gray8,
    GrayAlpha8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::GrayAlpha8 => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::GrayAlpha8 | Self::Rgba8)
    }

    /// Expand one pixel's channel values (in this format) to RGBA.
    pub(crate) fn to_rgba(self, px: &[f32]) -> [f32; 4] {
        match self {
            Self::Gray8 => [px[0], px[0], px[0], 255.0],
            Self::GrayAlpha8 => [px[0], px[0], px[0], px[1]],
            Self::Rgb8 => [px[0], px[1], px[2], 255.0],
            Self::Rgba8 => [px[0], px[1], px[2], px[3]],
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gray8 => write!(f, "Gray 8-bit"),
            Self::GrayAlpha8 => write!(f, "Gray+Alpha 8-bit"),
            Self::Rgb8 => write!(f, "RGB 8-bit"),
            Self::Rgba8 => write!(f, "RGBA 8-bit"),
        }
    }
}

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub fn r(self) -> u8 {
        self.0[0]
    }

    pub fn g(self) -> u8 {
        self.0[1]
    }

    pub fn b(self) -> u8 {
        self.0[2]
    }

    pub fn a(self) -> u8 {
        self.0[3]
    }

    /// `#RRGGBB`, alpha dropped.
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r(), self.g(), self.b())
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hex())
    }
}

/// An immutable decoded image, as delivered by the asset loader.
///
/// Pixel data is row-major, shape = (height, width, channels).
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    data: Array3<u8>,
    format: PixelFormat,
}

impl ImageBuffer {
    /// Wrap raw interleaved pixel bytes.
    ///
    /// Zero-sized images are rejected here so they never reach the resampler.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, bytes: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LoupeError::InvalidDimensions { width, height });
        }
        let channels = format.channels();
        let expected = width as usize * height as usize * channels;
        if bytes.len() != expected {
            return Err(LoupeError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        let data = Array3::from_shape_vec((height as usize, width as usize, channels), bytes)
            .map_err(|e| LoupeError::InvalidInput(e.to_string()))?;
        Ok(Self { data, format })
    }

    /// Build an image from a per-pixel function returning channel values.
    pub fn from_fn(
        width: u32,
        height: u32,
        format: PixelFormat,
        f: impl Fn(u32, u32) -> Vec<u8>,
    ) -> Result<Self> {
        let channels = format.channels();
        let mut bytes = Vec::with_capacity(width as usize * height as usize * channels);
        for y in 0..height {
            for x in 0..width {
                let px = f(x, y);
                if px.len() != channels {
                    return Err(LoupeError::BufferSize {
                        expected: channels,
                        actual: px.len(),
                    });
                }
                bytes.extend_from_slice(&px);
            }
        }
        Self::from_raw(width, height, format, bytes)
    }

    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &Array3<u8> {
        &self.data
    }

    /// Channel values of one pixel, or `None` outside the image.
    pub fn channels_at(&self, x: u32, y: u32) -> Option<ArrayView1<'_, u8>> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.data.slice(ndarray::s![y as usize, x as usize, ..]))
    }

    /// The pixel at `(x, y)` expanded to RGBA, or `None` outside the image.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<Rgba> {
        let px = self.channels_at(x, y)?;
        let values: Vec<f32> = px.iter().map(|&v| v as f32).collect();
        let rgba = self.format.to_rgba(&values);
        Some(Rgba(rgba.map(|v| v as u8)))
    }
}

/// A presentable block of opaque RGBA8 pixels, shape = (height, width, 4).
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBlock {
    data: Array3<u8>,
}

impl PixelBlock {
    /// A block filled entirely with `background`.
    pub fn filled(size: Size, background: Rgba) -> Self {
        let mut data = Array3::<u8>::zeros((size.height as usize, size.width as usize, 4));
        for mut px in data.lanes_mut(ndarray::Axis(2)) {
            for (c, v) in px.iter_mut().enumerate() {
                *v = background.0[c];
            }
        }
        Self { data }
    }

    pub(crate) fn from_array(data: Array3<u8>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let (y, x) = (y as usize, x as usize);
        Some(Rgba([
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
            self.data[[y, x, 3]],
        ]))
    }

    /// Row-major RGBA bytes, ready for upload to a surface.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }

    pub fn data(&self) -> &Array3<u8> {
        &self.data
    }
}
