use ndarray::{Array3, ArrayViewMut2, Axis};
use rayon::prelude::*;

use crate::buffer::{PixelBlock, PixelFormat, Rgba};
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::transform::RenderView;

use super::kernel::{axis_taps, Kernel, Taps};
use super::{Resampler, SourceImage};

/// Separable two-pass resampler on the CPU, parallel over rows via Rayon.
#[derive(Clone, Debug)]
pub struct CpuResampler {
    background: Rgba,
    lod_threshold: f64,
}

impl CpuResampler {
    pub fn new(background: Rgba, lod_threshold: f64) -> Self {
        Self {
            background,
            lod_threshold,
        }
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Pyramid level to read from for a given scale.
    pub fn lod_level(&self, scale: f64) -> usize {
        if scale >= self.lod_threshold || scale <= 0.0 {
            return 0;
        }
        (1.0 / scale).log2().floor().max(0.0) as usize
    }
}

impl Resampler for CpuResampler {
    fn name(&self) -> &str {
        "CPU/Rayon"
    }

    fn sample_viewport(&self, source: &SourceImage, view: &RenderView, kernel: Kernel) -> PixelBlock {
        let out_w = view.viewport.width as usize;
        let out_h = view.viewport.height as usize;
        if out_w == 0 || out_h == 0 {
            return PixelBlock::filled(view.viewport, self.background);
        }

        let (level, data) = source.level_data(self.lod_level(view.scale));
        let factor = (1u64 << level) as f64;
        let rel_scale = view.scale * factor;

        let content = view.content;
        let x_taps = plan_axis(kernel, view.origin.x, view.scale, content.width, factor, rel_scale, data.dim().1, out_w);
        let y_taps = plan_axis(kernel, view.origin.y, view.scale, content.height, factor, rel_scale, data.dim().0, out_h);

        let Some((row_lo, row_hi)) = row_span(&y_taps) else {
            return PixelBlock::filled(view.viewport, self.background);
        };

        let channels = data.dim().2;
        let format = source.buffer().format();
        let alpha = format.has_alpha().then_some(channels - 1);
        let parallel = out_w * out_h >= PARALLEL_PIXEL_THRESHOLD;

        // Pass 1: horizontal, only over the source rows that the vertical pass reads.
        // Colour is premultiplied so fully transparent pixels contribute nothing.
        let mut horizontal = Array3::<f32>::zeros((row_hi - row_lo + 1, out_w, channels));
        for_each_row(&mut horizontal, parallel, |r, mut row| {
            let src_row = row_lo + r;
            for (col, taps) in x_taps.iter().enumerate() {
                let Some(taps) = taps else { continue };
                for ch in 0..channels {
                    row[[col, ch]] = match alpha {
                        Some(a) if ch != a => convolve(taps, |i| {
                            premultiply(data[[src_row, i, ch]], data[[src_row, i, a]])
                        }),
                        _ => convolve(taps, |i| data[[src_row, i, ch]] as f32),
                    };
                }
            }
        });

        // Pass 2: vertical, then expand to RGBA and composite over the background.
        let background = self.background.0.map(|v| v as f32);
        let mut out = Array3::<u8>::zeros((out_h, out_w, 4));
        for_each_row(&mut out, parallel, |y, mut row| {
            let y_tap = y_taps[y].as_ref();
            let mut px = [0.0f32; 4];
            for (x, x_tap) in x_taps.iter().enumerate() {
                let rgba = match (y_tap, x_tap) {
                    (Some(taps), Some(_)) => {
                        for (ch, v) in px.iter_mut().take(channels).enumerate() {
                            *v = convolve(taps, |i| horizontal[[i - row_lo, x, ch]]);
                        }
                        composite(format, &px[..channels], &background)
                    }
                    _ => background,
                };
                for (c, v) in rgba.iter().enumerate() {
                    row[[x, c]] = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

        PixelBlock::from_array(out)
    }
}

/// Taps for every output coordinate on one axis; `None` where the output pixel
/// center falls outside the content.
#[allow(clippy::too_many_arguments)]
fn plan_axis(
    kernel: Kernel,
    origin: f64,
    scale: f64,
    content_len: u32,
    factor: f64,
    rel_scale: f64,
    level_len: usize,
    out_len: usize,
) -> Vec<Option<Taps>> {
    let content_len = content_len as f64;
    (0..out_len)
        .map(|i| {
            let c = origin + (i as f64 + 0.5) / scale;
            if c < 0.0 || c >= content_len {
                None
            } else {
                Some(axis_taps(kernel, c / factor, rel_scale, level_len))
            }
        })
        .collect()
}

fn row_span(taps: &[Option<Taps>]) -> Option<(usize, usize)> {
    taps.iter()
        .flatten()
        .flat_map(|t| t.indices.iter().copied())
        .fold(None, |span, i| match span {
            None => Some((i, i)),
            Some((lo, hi)) => Some((lo.min(i), hi.max(i))),
        })
}

fn convolve(taps: &Taps, sample: impl Fn(usize) -> f32) -> f32 {
    taps.indices
        .iter()
        .zip(&taps.weights)
        .map(|(&i, &w)| sample(i) * w)
        .sum()
}

fn premultiply(value: u8, alpha: u8) -> f32 {
    value as f32 * alpha as f32 / 255.0
}

/// Premultiplied "over" onto the background. Opaque formats carry alpha 255,
/// so their colour passes through unchanged.
fn composite(format: PixelFormat, px: &[f32], background: &[f32; 4]) -> [f32; 4] {
    let [r, g, b, a] = format.to_rgba(px);
    let alpha = (a / 255.0).clamp(0.0, 1.0);
    let inv = 1.0 - alpha;
    [
        r + background[0] * inv,
        g + background[1] * inv,
        b + background[2] * inv,
        255.0 * alpha + background[3] * inv,
    ]
}

fn for_each_row<T, F>(out: &mut Array3<T>, parallel: bool, f: F)
where
    T: Send + Sync,
    F: Fn(usize, ArrayViewMut2<'_, T>) + Send + Sync,
{
    if parallel {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    } else {
        for (r, row) in out.axis_iter_mut(Axis(0)).enumerate() {
            f(r, row);
        }
    }
}

