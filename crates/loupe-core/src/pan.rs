//! Boundary-aware panning, release momentum and the cosmetic bounce-back.
//!
//! Deltas are in screen pixels and follow the pointer: a positive `x` delta
//! moves the content to the right, which moves the origin left.

use std::collections::VecDeque;
use std::f64::consts::PI;

use tracing::debug;

use crate::config::BounceConfig;
use crate::geometry::Vec2;
use crate::transform::TransformState;

/// Relative tolerance used to decide whether a pan was cut short by the clamp.
const BLOCK_TOLERANCE: f64 = 1e-9;

/// Result of a single pan step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanOutcome {
    pub state: TransformState,
    /// The requested move was (partly) absorbed by the clamp on this axis.
    pub blocked_x: bool,
    pub blocked_y: bool,
}

/// Move the view by `delta` screen pixels.
///
/// Axes on which the scaled content fits the viewport stay centered, so a pan
/// along them is a no-op.
pub fn pan_by(state: &TransformState, delta: Vec2) -> PanOutcome {
    let target = state.origin() - delta / state.scale();
    let next = state.with_scale_and_origin(state.scale(), target);
    let origin = next.origin();
    PanOutcome {
        state: next,
        blocked_x: delta.x != 0.0 && is_blocked(origin.x, target.x),
        blocked_y: delta.y != 0.0 && is_blocked(origin.y, target.y),
    }
}

fn is_blocked(actual: f64, target: f64) -> bool {
    (actual - target).abs() > BLOCK_TOLERANCE * target.abs().max(1.0)
}

/// Arrow-key pan direction. The view moves in this direction over the content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

impl PanDirection {
    /// Screen delta that moves the view `step` pixels in this direction.
    pub fn delta(self, step: f64) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, step),
            Self::Down => Vec2::new(0.0, -step),
            Self::Left => Vec2::new(step, 0.0),
            Self::Right => Vec2::new(-step, 0.0),
        }
    }
}

/// Sliding window over the most recent drag deltas.
#[derive(Clone, Debug)]
pub struct VelocityTracker {
    samples: VecDeque<(u64, Vec2)>,
    capacity: usize,
}

impl VelocityTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a drag delta observed during tick `tick`.
    ///
    /// Older ticks are evicted whole, so a partly dropped tick never skews the
    /// per-tick rate.
    pub fn push(&mut self, tick: u64, delta: Vec2) {
        self.samples.push_back((tick, delta));
        if self.samples.len() <= self.capacity {
            return;
        }
        if let Some((evicted, _)) = self.samples.pop_front() {
            while self
                .samples
                .front()
                .is_some_and(|&(t, _)| t == evicted && t != tick)
            {
                self.samples.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Displacement over the ticks the samples span, in px/tick. Several moves
    /// within one tick add up. Zero when the pointer sat still for more than
    /// `idle_ticks` ticks before release.
    pub fn release_velocity(&self, now_tick: u64, idle_ticks: u64) -> Vec2 {
        let (Some(&(first_tick, _)), Some(&(last_tick, _))) =
            (self.samples.front(), self.samples.back())
        else {
            return Vec2::ZERO;
        };
        if now_tick.saturating_sub(last_tick) > idle_ticks {
            return Vec2::ZERO;
        }
        let sum = self
            .samples
            .iter()
            .fold(Vec2::ZERO, |acc, &(_, d)| acc + d);
        let span = last_tick.saturating_sub(first_tick) + 1;
        sum / span as f64
    }
}

/// Result of advancing momentum by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentumStep {
    pub state: TransformState,
    /// Velocity that was cancelled by hitting an edge this tick (zero if none).
    pub impact: Vec2,
    pub active: bool,
}

/// Decaying release velocity, applied once per animation tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Momentum {
    velocity: Vec2,
    friction: f64,
    epsilon: f64,
}

impl Momentum {
    /// `None` when the release velocity is already below `epsilon`.
    pub fn start(velocity: Vec2, friction: f64, epsilon: f64) -> Option<Self> {
        if !velocity.is_finite() || velocity.length() < epsilon {
            return None;
        }
        debug!(vx = velocity.x, vy = velocity.y, "momentum started");
        Some(Self {
            velocity,
            friction,
            epsilon,
        })
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_active(&self) -> bool {
        self.velocity.length() >= self.epsilon
    }

    /// Pan by the current velocity, stop any axis that hit an edge, then decay.
    ///
    /// An edge stop is inelastic: the velocity on that axis becomes zero.
    pub fn step(&mut self, state: &TransformState) -> MomentumStep {
        let outcome = pan_by(state, self.velocity);
        let mut impact = Vec2::ZERO;
        if outcome.blocked_x {
            impact.x = self.velocity.x;
            self.velocity.x = 0.0;
        }
        if outcome.blocked_y {
            impact.y = self.velocity.y;
            self.velocity.y = 0.0;
        }
        self.velocity = self.velocity * self.friction;
        let active = self.is_active();
        if !active {
            self.velocity = Vec2::ZERO;
            debug!("momentum stopped");
        }
        MomentumStep {
            state: outcome.state,
            impact,
            active,
        }
    }
}

/// Out-and-back displacement drawn on top of a clamped origin after an edge hit.
///
/// Purely cosmetic: the transform state itself never leaves its bounds. Each
/// axis runs its own animation, so a later hit on the other axis leaves a
/// running bounce alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overshoot {
    peak: Vec2,
    tick_x: u32,
    tick_y: u32,
    settle_ticks: u32,
}

impl Overshoot {
    pub fn from_impact(impact: Vec2, config: &BounceConfig) -> Option<Self> {
        let settle_ticks = config.settle_ticks.max(1);
        let mut overshoot = Self {
            peak: Vec2::ZERO,
            tick_x: settle_ticks,
            tick_y: settle_ticks,
            settle_ticks,
        };
        overshoot.absorb(impact, config);
        (!overshoot.is_settled()).then_some(overshoot)
    }

    /// Start a bounce on every axis `impact` hits; other axes keep running.
    pub fn absorb(&mut self, impact: Vec2, config: &BounceConfig) {
        let max = config.max_overshoot;
        let peak = Vec2::new(impact.x.clamp(-max, max), impact.y.clamp(-max, max));
        if peak.x != 0.0 {
            self.peak.x = peak.x;
            self.tick_x = 0;
        }
        if peak.y != 0.0 {
            self.peak.y = peak.y;
            self.tick_y = 0;
        }
    }

    /// Current displacement in screen pixels.
    pub fn offset(&self) -> Vec2 {
        let phase = |tick: u32| (PI * tick as f64 / self.settle_ticks as f64).sin();
        Vec2::new(self.peak.x * phase(self.tick_x), self.peak.y * phase(self.tick_y))
    }

    /// Advance one tick; returns `false` once settled back at zero.
    pub fn advance(&mut self) -> bool {
        self.tick_x = (self.tick_x + 1).min(self.settle_ticks);
        self.tick_y = (self.tick_y + 1).min(self.settle_ticks);
        !self.is_settled()
    }

    pub fn is_settled(&self) -> bool {
        self.tick_x >= self.settle_ticks && self.tick_y >= self.settle_ticks
    }
}
