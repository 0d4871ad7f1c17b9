use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buffer::Rgba;
use crate::consts::{
    DEFAULT_BACKGROUND, DEFAULT_FRICTION, DEFAULT_KEY_PAN_STEP, DEFAULT_LOD_THRESHOLD,
    DEFAULT_RELEASE_IDLE_TICKS, DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN, DEFAULT_SETTLE_WINDOW_MS,
    DEFAULT_STOP_EPSILON, DEFAULT_VELOCITY_SAMPLES, DEFAULT_ZOOM_STEP,
};
use crate::error::{LoupeError, Result};
use crate::resample::KernelPolicy;

/// Full engine configuration. Every section falls back to its defaults when omitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub pan: PanConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub scale_min: f64,
    pub scale_max: f64,
    /// Multiplicative ratio of one discrete zoom step.
    pub step_factor: f64,
    /// Wheel delta that counts as one discrete step.
    pub wheel_notch: f64,
    /// Optional `[width, height]` cap on the scaled image size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rendered_extent: Option<[u32; 2]>,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            scale_min: DEFAULT_SCALE_MIN,
            scale_max: DEFAULT_SCALE_MAX,
            step_factor: DEFAULT_ZOOM_STEP,
            wheel_notch: 1.0,
            max_rendered_extent: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanConfig {
    /// Screen pixels per arrow-key press.
    pub key_step: f64,
    /// Velocity multiplier applied once per tick.
    pub friction: f64,
    /// Speed (px/tick) below which momentum stops.
    pub stop_epsilon: f64,
    /// Drag deltas averaged into the release velocity.
    pub velocity_samples: usize,
    pub release_idle_ticks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounce_back: Option<BounceConfig>,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            key_step: DEFAULT_KEY_PAN_STEP,
            friction: DEFAULT_FRICTION,
            stop_epsilon: DEFAULT_STOP_EPSILON,
            velocity_samples: DEFAULT_VELOCITY_SAMPLES,
            release_idle_ticks: DEFAULT_RELEASE_IDLE_TICKS,
            bounce_back: None,
        }
    }
}

/// Cosmetic overshoot drawn when momentum runs into an edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceConfig {
    /// Largest displacement, in screen pixels.
    pub max_overshoot: f64,
    /// Ticks taken to ease back to the clamped position.
    pub settle_ticks: u32,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            max_overshoot: 24.0,
            settle_ticks: 12,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub settle_window_ms: u64,
    /// Scale below which a pre-downsampled pyramid level is used.
    pub lod_threshold: f64,
    pub background: Rgba,
    /// Run the settled pass on the worker thread instead of inline.
    pub background_quality_pass: bool,
    pub kernels: KernelPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            settle_window_ms: DEFAULT_SETTLE_WINDOW_MS,
            lod_threshold: DEFAULT_LOD_THRESHOLD,
            background: Rgba(DEFAULT_BACKGROUND),
            background_quality_pass: true,
            kernels: KernelPolicy::default(),
        }
    }
}

impl RenderConfig {
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| LoupeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LoupeError::ConfigParse(e.to_string()))
    }

    /// Reject configurations the solvers cannot honour.
    pub fn validate(&self) -> Result<()> {
        let z = &self.zoom;
        if !(z.scale_min.is_finite() && z.scale_max.is_finite()) {
            return Err(config_error("scale bounds must be finite"));
        }
        if z.scale_min <= 0.0 || z.scale_min > 1.0 || z.scale_max < 1.0 {
            return Err(config_error(format!(
                "scale bounds [{}, {}] must satisfy 0 < min <= 1 <= max",
                z.scale_min, z.scale_max
            )));
        }
        if z.scale_min >= z.scale_max {
            return Err(config_error("scale_min must be below scale_max"));
        }
        validate_step_factor(z.step_factor)?;
        if !z.wheel_notch.is_finite() || z.wheel_notch <= 0.0 {
            return Err(config_error("wheel_notch must be positive"));
        }
        if let Some([w, h]) = z.max_rendered_extent {
            if w == 0 || h == 0 {
                return Err(config_error("max_rendered_extent must be non-zero"));
            }
        }

        let p = &self.pan;
        if !p.key_step.is_finite() || p.key_step <= 0.0 {
            return Err(config_error("key_step must be positive"));
        }
        if !(p.friction > 0.0 && p.friction < 1.0) {
            return Err(config_error(format!("friction {} must be in (0, 1)", p.friction)));
        }
        if !p.stop_epsilon.is_finite() || p.stop_epsilon <= 0.0 {
            return Err(config_error("stop_epsilon must be positive"));
        }
        if p.velocity_samples == 0 {
            return Err(config_error("velocity_samples must be at least 1"));
        }
        if let Some(ref b) = p.bounce_back {
            if !b.max_overshoot.is_finite() || b.max_overshoot < 0.0 || b.settle_ticks == 0 {
                return Err(config_error("bounce_back needs max_overshoot >= 0 and settle_ticks > 0"));
            }
        }

        let r = &self.render;
        if !(r.lod_threshold > 0.0 && r.lod_threshold <= 1.0) {
            return Err(config_error(format!(
                "lod_threshold {} must be in (0, 1]",
                r.lod_threshold
            )));
        }
        Ok(())
    }
}

/// A zoom step must be a finite positive ratio other than 1.
pub fn validate_step_factor(step_factor: f64) -> Result<()> {
    if !step_factor.is_finite() || step_factor <= 0.0 || step_factor == 1.0 {
        return Err(config_error(format!(
            "zoom step factor {step_factor} must be finite, positive and != 1"
        )));
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> LoupeError {
    LoupeError::Configuration(msg.into())
}
