//! Transform state: the scale and origin that map content space onto the viewport.
//!
//! A screen point `s` corresponds to the content point `origin + s / scale`.
//! Every state handed out by this module satisfies two invariants:
//!
//! - `scale` lies within the state's [`ScaleBounds`].
//! - On each axis, the origin either centers the content (when the scaled
//!   content fits in the viewport) or keeps the content covering the whole
//!   viewport (when it overflows).
//!
//! Both are enforced by [`clamp_scale`] and [`clamp_origin`], and every
//! mutation goes through them.

use crate::config::ZoomConfig;
use crate::consts::SCALE_EPSILON;
use crate::error::{LoupeError, Result};
use crate::geometry::{Size, Vec2};

/// Inclusive range of permitted scale factors for one loaded image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl ScaleBounds {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min >= max {
            return Err(LoupeError::Configuration(format!(
                "invalid scale bounds [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// Bounds for a specific image, applying the optional rendered-extent cap.
    ///
    /// The cap never pushes the upper bound below 1.0 so that reset stays reachable.
    pub fn for_content(config: &ZoomConfig, content: Size) -> Self {
        let mut max = config.scale_max;
        if let Some([cap_w, cap_h]) = config.max_rendered_extent {
            let by_w = cap_w as f64 / content.width.max(1) as f64;
            let by_h = cap_h as f64 / content.height.max(1) as f64;
            max = max.min(by_w.min(by_h).max(1.0));
        }
        Self {
            min: config.scale_min,
            max: max.max(config.scale_min),
        }
    }

    pub fn is_at_min(&self, scale: f64) -> bool {
        (scale - self.min).abs() <= SCALE_EPSILON * self.min
    }

    pub fn is_at_max(&self, scale: f64) -> bool {
        (scale - self.max).abs() <= SCALE_EPSILON * self.max
    }
}

/// Clamp a scale factor into `bounds`.
pub fn clamp_scale(scale: f64, bounds: ScaleBounds) -> f64 {
    scale.clamp(bounds.min, bounds.max)
}

/// Enforce the per-axis origin invariant for the given scale.
pub fn clamp_origin(origin: Vec2, scale: f64, content: Size, viewport: Size) -> Vec2 {
    Vec2::new(
        clamp_axis(origin.x, scale, content.width, viewport.width),
        clamp_axis(origin.y, scale, content.height, viewport.height),
    )
}

fn clamp_axis(origin: f64, scale: f64, content: u32, viewport: u32) -> f64 {
    let content = content as f64;
    let visible = viewport as f64 / scale;
    if content * scale <= viewport as f64 {
        (content - visible) / 2.0
    } else {
        origin.clamp(0.0, content - visible)
    }
}

/// Current scale and origin for one loaded image in one viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformState {
    scale: f64,
    origin: Vec2,
    viewport: Size,
    content: Size,
    bounds: ScaleBounds,
}

impl TransformState {
    /// Default state for a freshly loaded image: scale 1.0 (clamped), content centered.
    pub fn new(content: Size, viewport: Size, bounds: ScaleBounds) -> Result<Self> {
        if content.is_empty() {
            return Err(LoupeError::InvalidDimensions {
                width: content.width,
                height: content.height,
            });
        }
        if viewport.is_empty() {
            return Err(LoupeError::InvalidInput(format!(
                "viewport {viewport} has a zero dimension"
            )));
        }
        let scale = clamp_scale(1.0, bounds);
        Ok(Self {
            scale,
            origin: centered_origin(scale, content, viewport),
            viewport,
            content,
            bounds,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn content(&self) -> Size {
        self.content
    }

    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// The only way to change scale and origin: both pass through the clamps.
    pub(crate) fn with_scale_and_origin(&self, scale: f64, origin: Vec2) -> Self {
        let scale = clamp_scale(scale, self.bounds);
        Self {
            scale,
            origin: clamp_origin(origin, scale, self.content, self.viewport),
            ..*self
        }
    }

    /// Same scale, content centered on both axes.
    pub(crate) fn centered(&self, scale: f64) -> Self {
        let scale = clamp_scale(scale, self.bounds);
        self.with_scale_and_origin(scale, centered_origin(scale, self.content, self.viewport))
    }

    /// Re-clamp against a new viewport, keeping the content point at the viewport
    /// center fixed where the new size allows it.
    pub fn with_viewport(&self, viewport: Size) -> Result<Self> {
        if viewport.is_empty() {
            return Err(LoupeError::InvalidInput(format!(
                "viewport {viewport} has a zero dimension"
            )));
        }
        let center = self.screen_to_content(self.viewport.center());
        let resized = Self { viewport, ..*self };
        let origin = center - viewport.center() / self.scale;
        Ok(resized.with_scale_and_origin(self.scale, origin))
    }

    pub fn screen_to_content(&self, screen: Vec2) -> Vec2 {
        self.origin + screen / self.scale
    }

    pub fn content_to_screen(&self, content: Vec2) -> Vec2 {
        (content - self.origin) * self.scale
    }

    /// Whether the scaled content fits inside the viewport, per axis.
    pub fn fits(&self) -> (bool, bool) {
        let scaled = self.content.to_vec2() * self.scale;
        (
            scaled.x <= self.viewport.width as f64,
            scaled.y <= self.viewport.height as f64,
        )
    }

    /// On-screen bounding box of the content as `(top_left, bottom_right)`.
    pub fn content_screen_rect(&self) -> (Vec2, Vec2) {
        (
            self.content_to_screen(Vec2::ZERO),
            self.content_to_screen(self.content.to_vec2()),
        )
    }

    /// Immutable snapshot handed to the resampler.
    pub fn view(&self) -> RenderView {
        RenderView {
            scale: self.scale,
            origin: self.origin,
            viewport: self.viewport,
            content: self.content,
        }
    }
}

fn centered_origin(scale: f64, content: Size, viewport: Size) -> Vec2 {
    (content.to_vec2() - viewport.to_vec2() / scale) / 2.0
}

/// What the resampler draws: a scale/origin pair plus the two sizes.
///
/// Unlike [`TransformState`] this is not clamped, so a cosmetic overshoot can be
/// layered on top of a valid state without touching it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderView {
    pub scale: f64,
    pub origin: Vec2,
    pub viewport: Size,
    pub content: Size,
}

impl RenderView {
    /// Shift the drawn content by `offset` screen pixels.
    pub fn offset_screen(self, offset: Vec2) -> Self {
        Self {
            origin: self.origin - offset / self.scale,
            ..self
        }
    }

    pub fn screen_to_content(&self, screen: Vec2) -> Vec2 {
        self.origin + screen / self.scale
    }
}
