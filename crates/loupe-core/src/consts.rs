/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default lower bound for the display scale.
pub const DEFAULT_SCALE_MIN: f64 = 0.05;

/// Default upper bound for the display scale.
pub const DEFAULT_SCALE_MAX: f64 = 40.0;

/// Default multiplicative ratio between two discrete zoom steps.
pub const DEFAULT_ZOOM_STEP: f64 = 1.1;

/// Screen pixels moved by one arrow-key pan.
pub const DEFAULT_KEY_PAN_STEP: f64 = 20.0;

/// Per-tick velocity multiplier while momentum decays.
pub const DEFAULT_FRICTION: f64 = 0.9;

/// Momentum stops once its speed (px/tick) drops below this.
pub const DEFAULT_STOP_EPSILON: f64 = 0.5;

/// Number of recent drag deltas averaged into the release velocity.
pub const DEFAULT_VELOCITY_SAMPLES: usize = 5;

/// A release this many ticks after the last drag move carries no momentum.
pub const DEFAULT_RELEASE_IDLE_TICKS: u64 = 3;

/// Delay after the last input before the settled (quality) frame is drawn.
pub const DEFAULT_SETTLE_WINDOW_MS: u64 = 120;

/// Below this scale the resampler reads from a pre-downsampled pyramid level.
pub const DEFAULT_LOD_THRESHOLD: f64 = 0.25;

/// Viewport background, RGBA.
pub const DEFAULT_BACKGROUND: [u8; 4] = [30, 30, 30, 255];

/// Hard cap on pyramid depth. 2^-8 is far below any sane scale_min.
pub const MAX_PYRAMID_LEVELS: usize = 8;

/// Tolerance for comparing a scale against its bounds.
pub const SCALE_EPSILON: f64 = 1e-9;
