//! The shell-facing viewport engine.
//!
//! All input handlers run on the caller's (control) thread and mutate the
//! transform only through the zoom and pan solvers. Rendering happens from
//! [`ViewportEngine::tick`], which the shell calls once per display refresh.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::buffer::{ImageBuffer, PixelBlock, Rgba};
use crate::config::EngineConfig;
use crate::error::{LoupeError, Result};
use crate::geometry::{Size, Vec2};
use crate::pan::{pan_by, Momentum, Overshoot, PanDirection, VelocityTracker};
use crate::resample::{CpuResampler, Kernel, Quality, Resampler, SourceImage};
use crate::scheduler::{FrameRequest, QualityWorker, RenderJob, RenderScheduler};
use crate::transform::{RenderView, ScaleBounds, TransformState};
use crate::zoom::{ZoomDirection, ZoomSolver};

/// Diagnostic view of the engine, for an overlay panel.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugSnapshot {
    /// Last cursor position in screen space, if the cursor is over the viewport.
    pub cursor: Option<Vec2>,
    /// Content-space coordinate under the cursor.
    pub cursor_content_coord: Option<Vec2>,
    pub scale: f64,
    pub origin: Option<Vec2>,
    pub viewport: Size,
    pub content: Option<Size>,
    /// Source pixel under the cursor; `None` off the image.
    pub pixel_color_under_cursor: Option<Rgba>,
    pub generation: u64,
}

/// Metadata of the frame currently presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    pub generation: u64,
    pub quality: Quality,
    /// `None` for background-only frames.
    pub kernel: Option<Kernel>,
}

struct Loaded {
    source: Arc<SourceImage>,
    state: TransformState,
}

pub struct ViewportEngine {
    config: EngineConfig,
    zoom: ZoomSolver,
    resampler: Arc<dyn Resampler>,
    worker: Option<QualityWorker>,
    scheduler: RenderScheduler,
    viewport: Size,
    loaded: Option<Loaded>,
    drag_last: Option<Vec2>,
    tracker: VelocityTracker,
    momentum: Option<Momentum>,
    overshoot: Option<Overshoot>,
    cursor: Option<Vec2>,
    ticks: u64,
    frame: PixelBlock,
    frame_info: Option<FrameInfo>,
}

impl ViewportEngine {
    /// Create an engine with the CPU resampler.
    ///
    /// An invalid configuration is fatal here and never surfaces later.
    pub fn new(config: EngineConfig, viewport: Size) -> Result<Self> {
        let resampler = Arc::new(CpuResampler::new(
            config.render.background,
            config.render.lod_threshold,
        ));
        Self::with_resampler(config, viewport, resampler)
    }

    pub fn with_resampler(
        config: EngineConfig,
        viewport: Size,
        resampler: Arc<dyn Resampler>,
    ) -> Result<Self> {
        config.validate()?;
        check_viewport(viewport)?;
        let zoom = ZoomSolver::new(config.zoom.step_factor)?;

        let worker = if config.render.background_quality_pass {
            match QualityWorker::spawn(Arc::clone(&resampler)) {
                Ok(worker) => Some(worker),
                Err(e) => {
                    warn!("quality worker unavailable, settling inline: {e}");
                    None
                }
            }
        } else {
            None
        };

        let mut scheduler = RenderScheduler::new(config.render.settle_window());
        scheduler.invalidate();

        Ok(Self {
            zoom,
            resampler,
            worker,
            scheduler,
            viewport,
            loaded: None,
            drag_last: None,
            tracker: VelocityTracker::new(config.pan.velocity_samples),
            momentum: None,
            overshoot: None,
            cursor: None,
            ticks: 0,
            frame: PixelBlock::filled(viewport, config.render.background),
            frame_info: None,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resampler_name(&self) -> &str {
        self.resampler.name()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Current transform, or `None` in the no-content state.
    pub fn transform(&self) -> Option<&TransformState> {
        self.loaded.as_ref().map(|l| &l.state)
    }

    pub fn has_content(&self) -> bool {
        self.loaded.is_some()
    }

    /// Replace the displayed image. The transform starts over at scale 1.0, centered.
    pub fn load(&mut self, buffer: ImageBuffer) -> Result<()> {
        let content = buffer.size();
        let bounds = ScaleBounds::for_content(&self.config.zoom, content);
        let state = TransformState::new(content, self.viewport, bounds)?;
        let source = SourceImage::new(buffer, bounds.min);
        info!(
            size = %content,
            format = %source.buffer().format(),
            max_scale = bounds.max,
            "image loaded"
        );
        self.loaded = Some(Loaded {
            source: Arc::new(source),
            state,
        });
        self.reset_input();
        self.scheduler.invalidate();
        Ok(())
    }

    /// Drop the image (e.g. after a failed load). Only the background is drawn
    /// and zoom/pan calls become no-ops.
    pub fn clear(&mut self) {
        if self.loaded.take().is_some() {
            info!("image cleared");
        }
        self.reset_input();
        self.scheduler.invalidate();
    }

    pub fn on_wheel(&mut self, delta: f64, cursor: Vec2) -> Result<()> {
        check_finite("wheel delta", delta)?;
        check_point("cursor", cursor)?;
        self.cursor = self.viewport.contains(cursor).then_some(cursor);
        self.stop_momentum();
        let steps = delta / self.config.zoom.wheel_notch;
        let zoom = self.zoom;
        self.update_state(|state| zoom.zoom_by(state, cursor, steps));
        Ok(())
    }

    pub fn on_drag_start(&mut self, pos: Vec2) -> Result<()> {
        check_point("drag position", pos)?;
        self.stop_momentum();
        self.tracker.clear();
        self.drag_last = Some(pos);
        Ok(())
    }

    pub fn on_drag_move(&mut self, pos: Vec2) -> Result<()> {
        check_point("drag position", pos)?;
        self.cursor = self.viewport.contains(pos).then_some(pos);
        let Some(last) = self.drag_last else {
            return Ok(());
        };
        let delta = pos - last;
        self.drag_last = Some(pos);
        if delta == Vec2::ZERO {
            return Ok(());
        }
        self.tracker.push(self.ticks, delta);
        self.update_state(|state| pan_by(state, delta).state);
        Ok(())
    }

    /// Finish a drag; a recent enough fling hands over to momentum.
    pub fn on_drag_end(&mut self, pos: Vec2) -> Result<()> {
        self.on_drag_move(pos)?;
        if self.drag_last.take().is_none() {
            return Ok(());
        }
        let pan = &self.config.pan;
        let velocity = self.tracker.release_velocity(self.ticks, pan.release_idle_ticks);
        self.tracker.clear();
        if self.loaded.is_some() {
            self.momentum = Momentum::start(velocity, pan.friction, pan.stop_epsilon);
        }
        Ok(())
    }

    pub fn on_key_pan(&mut self, direction: PanDirection) {
        self.stop_momentum();
        let delta = direction.delta(self.config.pan.key_step);
        self.update_state(|state| pan_by(state, delta).state);
    }

    pub fn on_zoom_in(&mut self) {
        self.zoom_step(ZoomDirection::In);
    }

    pub fn on_zoom_out(&mut self) {
        self.zoom_step(ZoomDirection::Out);
    }

    pub fn on_reset_zoom(&mut self) {
        self.stop_momentum();
        let zoom = self.zoom;
        self.update_state(|state| zoom.reset(state));
    }

    pub fn on_fit(&mut self) {
        self.stop_momentum();
        let zoom = self.zoom;
        self.update_state(|state| zoom.fit(state));
    }

    /// Resize the surface. The origin is re-clamped, and re-centered on axes
    /// where the content now fits.
    pub fn on_resize(&mut self, viewport: Size) -> Result<()> {
        check_viewport(viewport)?;
        if viewport == self.viewport {
            return Ok(());
        }
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.state = loaded.state.with_viewport(viewport)?;
        }
        debug!(%viewport, "viewport resized");
        self.viewport = viewport;
        if self.cursor.is_some_and(|c| !viewport.contains(c)) {
            self.cursor = None;
        }
        self.scheduler.invalidate();
        Ok(())
    }

    pub fn on_cursor_move(&mut self, pos: Vec2) -> Result<()> {
        check_point("cursor", pos)?;
        self.cursor = self.viewport.contains(pos).then_some(pos);
        Ok(())
    }

    pub fn on_cursor_leave(&mut self) {
        self.cursor = None;
    }

    /// Advance animations and render whatever the scheduler asks for.
    pub fn tick(&mut self, now: Instant) {
        self.ticks += 1;
        self.advance_momentum();
        self.advance_overshoot();
        self.collect_background_results(now);

        let Some(request) = self.scheduler.poll(now) else {
            return;
        };

        let Some(loaded) = self.loaded.as_ref() else {
            self.frame = PixelBlock::filled(self.viewport, self.config.render.background);
            if self.scheduler.complete(request, now) {
                self.frame_info = Some(FrameInfo {
                    generation: request.generation,
                    quality: request.quality,
                    kernel: None,
                });
            }
            return;
        };

        let view = self.render_view(&loaded.state);
        let kernel = self.config.render.kernels.select(request.quality, view.scale);

        if request.quality == Quality::Settled {
            if let Some(worker) = self.worker.as_ref() {
                let job = RenderJob {
                    request,
                    source: Arc::clone(&loaded.source),
                    view,
                    kernel,
                };
                if worker.submit(job) {
                    return;
                }
                warn!("quality worker stopped, settling inline");
                self.worker = None;
            }
        }

        let block = self.resampler.sample_viewport(&loaded.source, &view, kernel);
        self.present(request, kernel, block, now);
    }

    /// Block until the in-flight settled frame arrives (or `timeout` passes).
    ///
    /// Meant for headless shells that want the final frame; returns whether one
    /// was presented.
    pub fn wait_for_settled(&mut self, timeout: Duration) -> bool {
        let Some(worker) = self.worker.as_ref() else {
            return false;
        };
        let deadline = Instant::now() + timeout;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            let Some(outcome) = worker.recv_timeout(remaining) else {
                return false;
            };
            let now = Instant::now();
            if self.scheduler.complete(outcome.request, now) {
                self.frame = outcome.block;
                self.frame_info = Some(FrameInfo {
                    generation: outcome.request.generation,
                    quality: outcome.request.quality,
                    kernel: Some(outcome.kernel),
                });
                return true;
            }
        }
        false
    }

    pub fn current_frame(&self) -> &PixelBlock {
        &self.frame
    }

    pub fn frame_info(&self) -> Option<FrameInfo> {
        self.frame_info
    }

    /// Momentum or bounce-back still moving.
    pub fn is_animating(&self) -> bool {
        self.momentum.is_some() || self.overshoot.is_some()
    }

    /// Whether further ticks could change the presented frame.
    pub fn needs_tick(&self) -> bool {
        self.is_animating() || !self.scheduler.is_quiet()
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let state = self.loaded.as_ref().map(|l| &l.state);
        let cursor_content_coord = self
            .cursor
            .zip(state)
            .map(|(cursor, state)| state.screen_to_content(cursor));
        let pixel_color_under_cursor = cursor_content_coord
            .zip(self.loaded.as_ref())
            .and_then(|(c, loaded)| {
                if c.x < 0.0 || c.y < 0.0 {
                    return None;
                }
                loaded.source.buffer().rgba_at(c.x as u32, c.y as u32)
            });

        DebugSnapshot {
            cursor: self.cursor,
            cursor_content_coord,
            scale: state.map_or(1.0, |s| s.scale()),
            origin: state.map(|s| s.origin()),
            viewport: self.viewport,
            content: state.map(|s| s.content()),
            pixel_color_under_cursor,
            generation: self.scheduler.generation(),
        }
    }

    fn zoom_step(&mut self, direction: ZoomDirection) {
        self.stop_momentum();
        // Keyboard zoom follows the cursor while it is over the viewport.
        let anchor = self.cursor.unwrap_or_else(|| self.viewport.center());
        let zoom = self.zoom;
        self.update_state(|state| zoom.zoom_at(state, anchor, direction));
    }

    /// Apply a solver to the current state; only real changes schedule a frame.
    fn update_state(&mut self, solve: impl FnOnce(&TransformState) -> TransformState) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        let next = solve(&loaded.state);
        if next != loaded.state {
            loaded.state = next;
            self.scheduler.invalidate();
        }
    }

    fn advance_momentum(&mut self) {
        let Some(mut momentum) = self.momentum.take() else {
            return;
        };
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        let step = momentum.step(&loaded.state);
        if step.state != loaded.state {
            loaded.state = step.state;
            self.scheduler.invalidate();
        }
        if step.impact != Vec2::ZERO {
            if let Some(ref bounce) = self.config.pan.bounce_back {
                match self.overshoot.as_mut() {
                    Some(running) => running.absorb(step.impact, bounce),
                    None => self.overshoot = Overshoot::from_impact(step.impact, bounce),
                }
            }
        }
        if step.active {
            self.momentum = Some(momentum);
        }
    }

    fn advance_overshoot(&mut self) {
        let Some(mut overshoot) = self.overshoot.take() else {
            return;
        };
        let moving = overshoot.advance();
        self.scheduler.invalidate();
        if moving {
            self.overshoot = Some(overshoot);
        }
    }

    fn collect_background_results(&mut self, now: Instant) {
        let Some(worker) = self.worker.as_ref() else {
            return;
        };
        while let Some(outcome) = worker.try_recv() {
            if self.scheduler.complete(outcome.request, now) {
                self.frame = outcome.block;
                self.frame_info = Some(FrameInfo {
                    generation: outcome.request.generation,
                    quality: outcome.request.quality,
                    kernel: Some(outcome.kernel),
                });
            }
        }
    }

    fn present(&mut self, request: FrameRequest, kernel: Kernel, block: PixelBlock, now: Instant) {
        if self.scheduler.complete(request, now) {
            self.frame = block;
            self.frame_info = Some(FrameInfo {
                generation: request.generation,
                quality: request.quality,
                kernel: Some(kernel),
            });
        }
    }

    fn render_view(&self, state: &TransformState) -> RenderView {
        let view = state.view();
        match self.overshoot {
            Some(ref o) => view.offset_screen(o.offset()),
            None => view,
        }
    }

    fn stop_momentum(&mut self) {
        if self.momentum.take().is_some() {
            debug!("momentum cancelled by input");
        }
        self.overshoot = None;
    }

    fn reset_input(&mut self) {
        self.drag_last = None;
        self.tracker.clear();
        self.momentum = None;
        self.overshoot = None;
    }
}

fn check_viewport(viewport: Size) -> Result<()> {
    if viewport.is_empty() {
        return Err(LoupeError::InvalidInput(format!(
            "viewport {viewport} has a zero dimension"
        )));
    }
    Ok(())
}

fn check_finite(what: &str, v: f64) -> Result<()> {
    if !v.is_finite() {
        return Err(LoupeError::InvalidInput(format!("{what} is not finite: {v}")));
    }
    Ok(())
}

fn check_point(what: &str, p: Vec2) -> Result<()> {
    if !p.is_finite() {
        return Err(LoupeError::InvalidInput(format!(
            "{what} is not finite: ({}, {})",
            p.x, p.y
        )));
    }
    Ok(())
}
