use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Interpolation kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kernel {
    Nearest,
    Bilinear,
    /// Catmull-Rom cubic (a = -0.5).
    Bicubic,
    Lanczos3,
}

impl Kernel {
    /// Half-width of the kernel at unit scale, in source pixels.
    pub fn radius(self) -> f64 {
        match self {
            Self::Nearest => 0.5,
            Self::Bilinear => 1.0,
            Self::Bicubic => 2.0,
            Self::Lanczos3 => 3.0,
        }
    }

    pub fn weight(self, x: f64) -> f64 {
        let x = x.abs();
        match self {
            Self::Nearest => {
                if x < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Bilinear => (1.0 - x).max(0.0),
            Self::Bicubic => catmull_rom(x),
            Self::Lanczos3 => {
                if x < 3.0 {
                    sinc(x) * sinc(x / 3.0)
                } else {
                    0.0
                }
            }
        }
    }
}

impl std::fmt::Display for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "Nearest"),
            Self::Bilinear => write!(f, "Bilinear"),
            Self::Bicubic => write!(f, "Bicubic"),
            Self::Lanczos3 => write!(f, "Lanczos3"),
        }
    }
}

fn catmull_rom(x: f64) -> f64 {
    const A: f64 = -0.5;
    if x < 1.0 {
        ((A + 2.0) * x - (A + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((A * x - 5.0 * A) * x + 8.0 * A) * x - 4.0 * A
    } else {
        0.0
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Source indices and normalized weights contributing to one output coordinate.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Taps {
    pub indices: Vec<usize>,
    pub weights: Vec<f32>,
}

/// Compute taps for sample position `u` (in source pixel units, pixel centers at
/// `i + 0.5`) on an axis of `len` source pixels.
///
/// `rel_scale` is output pixels per source pixel; below 1 the kernel is widened
/// so that every source pixel contributes. Indices past the edges are clamped.
pub(crate) fn axis_taps(kernel: Kernel, u: f64, rel_scale: f64, len: usize) -> Taps {
    let last = len.saturating_sub(1);
    if kernel == Kernel::Nearest {
        let idx = (u.floor().max(0.0) as usize).min(last);
        return Taps {
            indices: vec![idx],
            weights: vec![1.0],
        };
    }

    let center = u - 0.5;
    let stretch = if rel_scale < 1.0 { 1.0 / rel_scale } else { 1.0 };
    let support = kernel.radius() * stretch;
    let left = (center - support).ceil() as i64;
    let right = (center + support).floor() as i64;

    let mut indices = Vec::with_capacity((right - left + 1).max(1) as usize);
    let mut weights = Vec::with_capacity(indices.capacity());
    let mut sum = 0.0f64;
    for j in left..=right {
        let w = kernel.weight((j as f64 - center) / stretch);
        if w == 0.0 {
            continue;
        }
        indices.push(j.clamp(0, last as i64) as usize);
        weights.push(w);
        sum += w;
    }

    if indices.is_empty() || sum.abs() < 1e-12 {
        let idx = (center.round().max(0.0) as usize).min(last);
        return Taps {
            indices: vec![idx],
            weights: vec![1.0],
        };
    }

    Taps {
        indices,
        weights: weights.into_iter().map(|w| (w / sum) as f32).collect(),
    }
}
