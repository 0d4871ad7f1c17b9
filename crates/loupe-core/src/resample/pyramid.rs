//! Power-of-two level-of-detail pyramid.
//!
//! Level 0 is the loaded image itself; level `k` is `2^k` times smaller on
//! each axis (rounded up). Deep zoom-outs read from a coarse level so the
//! per-frame cost does not grow with the full resolution.

use ndarray::{Array3, ArrayView3, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::buffer::ImageBuffer;
use crate::consts::{MAX_PYRAMID_LEVELS, PARALLEL_PIXEL_THRESHOLD};
use crate::geometry::Size;

/// Downsampled copies of an image, coarsest last.
#[derive(Clone, Debug, Default)]
pub struct MipChain {
    levels: Vec<Array3<u8>>,
}

impl MipChain {
    /// Build enough levels to serve scales down to `scale_min`.
    ///
    /// With `has_alpha`, the last channel is alpha and colour is averaged
    /// weighted by it.
    pub fn build(base: &Array3<u8>, has_alpha: bool, scale_min: f64) -> Self {
        let wanted = if scale_min > 0.0 && scale_min < 1.0 {
            ((1.0 / scale_min).log2().floor() as usize).min(MAX_PYRAMID_LEVELS)
        } else {
            0
        };

        let mut levels: Vec<Array3<u8>> = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            let prev = levels.last().map_or_else(|| base.view(), |l| l.view());
            let (h, w, _) = prev.dim();
            if h <= 1 && w <= 1 {
                break;
            }
            let next = downsample_2x(&prev, has_alpha);
            levels.push(next);
        }
        Self { levels }
    }

    /// Number of downsampled levels (excluding the base image).
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Level `k >= 1`, or `None` if it was not built.
    pub fn level(&self, k: usize) -> Option<&Array3<u8>> {
        k.checked_sub(1).and_then(|i| self.levels.get(i))
    }
}

/// Average each 2x2 block. Odd trailing rows/columns average what exists.
///
/// Alpha images average premultiplied colour and store it straight again, so a
/// transparent pixel's colour never leaks into its neighbours.
fn downsample_2x(data: &ArrayView3<'_, u8>, has_alpha: bool) -> Array3<u8> {
    let (h, w, c) = data.dim();
    let alpha = has_alpha.then_some(c - 1);
    let new_h = h.div_ceil(2);
    let new_w = w.div_ceil(2);
    let mut result = Array3::<u8>::zeros((new_h, new_w, c));

    let fill_row = |r: usize, mut row: ndarray::ArrayViewMut2<'_, u8>| {
        let r0 = r * 2;
        let r1 = (r0 + 1).min(h - 1);
        for col in 0..new_w {
            let c0 = col * 2;
            let c1 = (c0 + 1).min(w - 1);
            let block = [(r0, c0), (r0, c1), (r1, c0), (r1, c1)];
            let weight = |y: usize, x: usize| alpha.map_or(1, |a| data[[y, x, a]] as u32);
            let total: u32 = block.iter().map(|&(y, x)| weight(y, x)).sum();
            for ch in 0..c {
                let value = if alpha.is_some_and(|a| a != ch) {
                    let sum: u32 = block
                        .iter()
                        .map(|&(y, x)| data[[y, x, ch]] as u32 * weight(y, x))
                        .sum();
                    if total == 0 {
                        0
                    } else {
                        (sum + total / 2) / total
                    }
                } else {
                    let sum: u32 = block.iter().map(|&(y, x)| data[[y, x, ch]] as u32).sum();
                    (sum + 2) / 4
                };
                row[[col, ch]] = value as u8;
            }
        }
    };

    if new_h * new_w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(r, row)| fill_row(r, row));
    } else {
        for (r, row) in result.axis_iter_mut(Axis(0)).enumerate() {
            fill_row(r, row);
        }
    }

    result
}

/// A loaded image together with its pyramid; shared read-only with the worker.
#[derive(Clone, Debug)]
pub struct SourceImage {
    buffer: ImageBuffer,
    mips: MipChain,
}

impl SourceImage {
    pub fn new(buffer: ImageBuffer, scale_min: f64) -> Self {
        let mips = MipChain::build(buffer.data(), buffer.format().has_alpha(), scale_min);
        debug!(
            size = %buffer.size(),
            levels = mips.depth(),
            "built level-of-detail pyramid"
        );
        Self { buffer, mips }
    }

    pub fn buffer(&self) -> &ImageBuffer {
        &self.buffer
    }

    pub fn size(&self) -> Size {
        self.buffer.size()
    }

    pub fn mips(&self) -> &MipChain {
        &self.mips
    }

    /// Pixel data of level `k`, falling back to the deepest level that exists.
    pub(crate) fn level_data(&self, k: usize) -> (usize, ArrayView3<'_, u8>) {
        let k = k.min(self.mips.depth());
        match self.mips.level(k) {
            Some(level) => (k, level.view()),
            None => (0, self.buffer.data().view()),
        }
    }
}
