//! Viewport resampling.
//!
//! A [`Resampler`] turns a loaded image plus a [`RenderView`] into a
//! [`PixelBlock`] exactly the size of the viewport. Kernels are picked by a
//! two-tier policy: cheap ones while the view is moving, better ones for the
//! settled frame.

mod cpu;
mod kernel;
mod pyramid;

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBlock;
use crate::transform::RenderView;

pub use cpu::CpuResampler;
pub use kernel::Kernel;
pub use pyramid::{MipChain, SourceImage};

/// Which tier of the quality policy a frame is rendered at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quality {
    /// Rendered on every change while input is arriving.
    Interactive,
    /// Rendered once after input has been quiet for the settle window.
    Settled,
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interactive => write!(f, "Interactive"),
            Self::Settled => write!(f, "Settled"),
        }
    }
}

/// Kernel per (quality tier, magnification direction).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelPolicy {
    pub interactive_up: Kernel,
    pub interactive_down: Kernel,
    pub settled_up: Kernel,
    pub settled_down: Kernel,
}

impl Default for KernelPolicy {
    fn default() -> Self {
        Self {
            interactive_up: Kernel::Nearest,
            interactive_down: Kernel::Bilinear,
            settled_up: Kernel::Bicubic,
            settled_down: Kernel::Lanczos3,
        }
    }
}

impl KernelPolicy {
    /// Scales of 1.0 and above count as magnification.
    pub fn select(&self, quality: Quality, scale: f64) -> Kernel {
        let upscaling = scale >= 1.0;
        match (quality, upscaling) {
            (Quality::Interactive, true) => self.interactive_up,
            (Quality::Interactive, false) => self.interactive_down,
            (Quality::Settled, true) => self.settled_up,
            (Quality::Settled, false) => self.settled_down,
        }
    }
}

/// Swappable resampling backend.
pub trait Resampler: Send + Sync {
    fn name(&self) -> &str;

    /// Render `view` of `source` with `kernel`.
    ///
    /// The block is always `view.viewport` sized; pixels not covered by the
    /// content are filled with the background.
    fn sample_viewport(&self, source: &SourceImage, view: &RenderView, kernel: Kernel) -> PixelBlock;
}
