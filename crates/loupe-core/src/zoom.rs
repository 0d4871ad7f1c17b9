//! Cursor-anchored zoom.
//!
//! Steps are multiplicative (`scale * step_factor^n`) so repeated wheel notches
//! feel equally fast at any scale, and zooming in then out by the same number of
//! steps around the same anchor lands back on the starting state.

use tracing::debug;

use crate::config::validate_step_factor;
use crate::error::Result;
use crate::geometry::Vec2;
use crate::transform::{clamp_scale, TransformState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    pub fn sign(self) -> f64 {
        match self {
            Self::In => 1.0,
            Self::Out => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ZoomSolver {
    step_factor: f64,
}

impl ZoomSolver {
    pub fn new(step_factor: f64) -> Result<Self> {
        validate_step_factor(step_factor)?;
        Ok(Self { step_factor })
    }

    pub fn step_factor(&self) -> f64 {
        self.step_factor
    }

    /// One discrete step in `direction`, keeping the content under `anchor` fixed.
    pub fn zoom_at(&self, state: &TransformState, anchor: Vec2, direction: ZoomDirection) -> TransformState {
        self.zoom_by(state, anchor, direction.sign())
    }

    /// Zoom by a (possibly fractional) number of steps; positive zooms in.
    ///
    /// An anchor outside the viewport is replaced by the viewport center.
    pub fn zoom_by(&self, state: &TransformState, anchor: Vec2, steps: f64) -> TransformState {
        if steps == 0.0 || !steps.is_finite() {
            return *state;
        }
        let anchor = if state.viewport().contains(anchor) {
            anchor
        } else {
            state.viewport().center()
        };

        let scale = state.scale();
        let bounds = state.bounds();
        let target = scale * self.step_factor.powf(steps);

        // Hysteresis: already pinned at the bound we would cross, nothing to do.
        if (target < bounds.min && bounds.is_at_min(scale))
            || (target > bounds.max && bounds.is_at_max(scale))
        {
            debug!(scale, target, "zoom ignored at scale bound");
            return *state;
        }

        let new_scale = clamp_scale(target, bounds);
        let pinned = state.screen_to_content(anchor);
        let new_origin = pinned - anchor / new_scale;
        let next = state.with_scale_and_origin(new_scale, new_origin);
        debug!(
            from = scale,
            to = next.scale(),
            anchor_x = anchor.x,
            anchor_y = anchor.y,
            "zoom"
        );
        next
    }

    /// Scale 1.0 with the content centered, whatever the prior state.
    pub fn reset(&self, state: &TransformState) -> TransformState {
        state.centered(1.0)
    }

    /// Largest scale at which the whole image fits the viewport, centered.
    pub fn fit(&self, state: &TransformState) -> TransformState {
        let viewport = state.viewport().to_vec2();
        let content = state.content().to_vec2();
        let scale = (viewport.x / content.x).min(viewport.y / content.y);
        state.centered(scale)
    }
}
