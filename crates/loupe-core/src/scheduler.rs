//! Frame pacing: coalesce transform changes into at most one render per tick,
//! follow up with a settled-quality render once input goes quiet, and drop
//! renders that were superseded while in flight.
//!
//! Cancellation is cooperative. Each change bumps a generation counter, every
//! render carries the generation it was computed for, and a result whose
//! generation is no longer current is discarded on arrival.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::buffer::PixelBlock;
use crate::error::Result;
use crate::resample::{Kernel, Quality, Resampler, SourceImage};
use crate::transform::RenderView;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    PendingFrame(Quality),
    Rendering { generation: u64, quality: Quality },
}

/// A frame the caller should render now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequest {
    pub generation: u64,
    pub quality: Quality,
}

#[derive(Debug)]
pub struct RenderScheduler {
    state: SchedulerState,
    generation: u64,
    settle_window: Duration,
    /// When the settled pass becomes due; armed by a completed interactive frame.
    settle_deadline: Option<Instant>,
}

impl RenderScheduler {
    pub fn new(settle_window: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            generation: 0,
            settle_window,
            settle_deadline: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Nothing pending, rendering or waiting to settle.
    pub fn is_quiet(&self) -> bool {
        self.state == SchedulerState::Idle && self.settle_deadline.is_none()
    }

    /// Record a transform change or resize. Changes before the next tick coalesce.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.settle_deadline = None;
        self.state = SchedulerState::PendingFrame(Quality::Interactive);
        trace!(generation = self.generation, "frame invalidated");
    }

    /// Display tick. Returns the frame to start rendering, if any.
    pub fn poll(&mut self, now: Instant) -> Option<FrameRequest> {
        if self.state == SchedulerState::Idle {
            if let Some(deadline) = self.settle_deadline {
                if now >= deadline {
                    self.settle_deadline = None;
                    self.state = SchedulerState::PendingFrame(Quality::Settled);
                }
            }
        }

        match self.state {
            SchedulerState::PendingFrame(quality) => {
                self.state = SchedulerState::Rendering {
                    generation: self.generation,
                    quality,
                };
                trace!(generation = self.generation, %quality, "frame started");
                Some(FrameRequest {
                    generation: self.generation,
                    quality,
                })
            }
            SchedulerState::Idle | SchedulerState::Rendering { .. } => None,
        }
    }

    /// A render finished. Returns `true` if it is current and should be presented.
    pub fn complete(&mut self, request: FrameRequest, now: Instant) -> bool {
        if request.generation != self.generation {
            trace!(
                stale = request.generation,
                current = self.generation,
                "discarding stale frame"
            );
            return false;
        }
        let expected = SchedulerState::Rendering {
            generation: request.generation,
            quality: request.quality,
        };
        if self.state != expected {
            return false;
        }
        self.state = SchedulerState::Idle;
        if request.quality == Quality::Interactive {
            self.settle_deadline = Some(now + self.settle_window);
        }
        true
    }
}

/// Work item for the background quality worker. Owns an immutable snapshot.
pub struct RenderJob {
    pub request: FrameRequest,
    pub source: Arc<SourceImage>,
    pub view: RenderView,
    pub kernel: Kernel,
}

pub struct RenderOutcome {
    pub request: FrameRequest,
    pub kernel: Kernel,
    pub block: PixelBlock,
}

/// Background thread that runs settled-quality renders.
pub struct QualityWorker {
    cmd_tx: Option<mpsc::Sender<RenderJob>>,
    result_rx: mpsc::Receiver<RenderOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl QualityWorker {
    pub fn spawn(resampler: Arc<dyn Resampler>) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RenderJob>();
        let (result_tx, result_rx) = mpsc::channel::<RenderOutcome>();

        let handle = std::thread::Builder::new()
            .name("loupe-resample".into())
            .spawn(move || {
                worker_loop(cmd_rx, result_tx, resampler);
            })?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a job. Returns `false` if the worker has gone away.
    pub fn submit(&self, job: RenderJob) -> bool {
        self.cmd_tx
            .as_ref()
            .is_some_and(|tx| tx.send(job).is_ok())
    }

    /// Next finished render, without blocking.
    pub fn try_recv(&self) -> Option<RenderOutcome> {
        self.result_rx.try_recv().ok()
    }

    /// Block up to `timeout` for the next finished render.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RenderOutcome> {
        self.result_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for QualityWorker {
    fn drop(&mut self) {
        // Closing the channel ends the loop.
        self.cmd_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    cmd_rx: mpsc::Receiver<RenderJob>,
    tx: mpsc::Sender<RenderOutcome>,
    resampler: Arc<dyn Resampler>,
) {
    while let Ok(mut job) = cmd_rx.recv() {
        // Only the newest queued job can still be current.
        while let Ok(newer) = cmd_rx.try_recv() {
            trace!(skipped = job.request.generation, "skipping superseded job");
            job = newer;
        }

        let started = Instant::now();
        let block = resampler.sample_viewport(&job.source, &job.view, job.kernel);
        debug!(
            generation = job.request.generation,
            kernel = %job.kernel,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "settled frame rendered"
        );

        let outcome = RenderOutcome {
            request: job.request,
            kernel: job.kernel,
            block,
        };
        if tx.send(outcome).is_err() {
            break;
        }
    }
}
