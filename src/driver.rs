//! Frame driver
//!
//! An `Orb` owns one current state and chases the target derived from its
//! config, one tick per frame. Hosts feed it frame deltas and a surface; the
//! orb never schedules anything itself, so stopping is simply not asking for
//! another frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::ShadingBackend;
use crate::config::{ConfigPatch, OrbConfig};
use crate::display::PixelBuffer;
use crate::error::{OrbError, Result};
use crate::preset::Preset;
use crate::state::{Interpolator, OrbState, StepPolicy};

/// Whether the driver wants another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stopped,
}

/// Cloneable cancellation flag. Tripping it stops the orb at its next tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct Orb {
    config: OrbConfig,
    target: OrbState,
    current: OrbState,
    interpolator: Interpolator,
    backend: Option<Box<dyn ShadingBackend>>,
    elapsed: f32,
    stop: StopHandle,
}

impl Orb {
    /// Create an orb resting at the target for `config`
    pub fn new(config: OrbConfig, backend: Box<dyn ShadingBackend>) -> Self {
        let target = config.target_state();
        log::debug!("orb created at preset {} on {}", config.preset, backend.name());
        Self {
            config,
            target,
            current: target,
            interpolator: Interpolator::default(),
            backend: Some(backend),
            elapsed: 0.0,
            stop: StopHandle::default(),
        }
    }

    pub fn with_step_policy(mut self, policy: StepPolicy) -> Self {
        self.interpolator = Interpolator::new(policy);
        self
    }

    pub fn config(&self) -> &OrbConfig {
        &self.config
    }

    pub fn target(&self) -> &OrbState {
        &self.target
    }

    pub fn current(&self) -> &OrbState {
        &self.current
    }

    /// Animation clock in seconds
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_stopped(&self) -> bool {
        self.backend.is_none()
    }

    /// Replace the configuration. Only the target moves; the current state
    /// keeps transitioning from wherever it is.
    pub fn set_config(&mut self, config: OrbConfig) {
        if config.preset != self.config.preset {
            log::info!("preset {} -> {}", self.config.preset, config.preset);
        }
        self.target = config.target_state();
        self.config = config;
    }

    /// Apply a sparse update; returns true if the config changed
    pub fn apply_patch(&mut self, patch: &ConfigPatch) -> bool {
        let mut config = self.config.clone();
        if !config.apply(patch) {
            return false;
        }
        self.set_config(config);
        true
    }

    pub fn set_preset(&mut self, preset: Preset) {
        self.apply_patch(&ConfigPatch::preset(preset));
    }

    /// Advance the animation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        if self.stop.is_stopped() {
            self.teardown();
        }
        if self.is_stopped() {
            return TickOutcome::Stopped;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        self.interpolator
            .step(&mut self.current, &self.target, self.config.transition_speed, dt);
        TickOutcome::Continue
    }

    /// Shade the current state into `buffer`, which must match the
    /// configured render size
    pub fn render(&mut self, buffer: &mut PixelBuffer) -> Result<()> {
        let (expected_width, expected_height) = self.config.render_size();
        let backend = self.backend.as_mut().ok_or(OrbError::Stopped)?;

        if (buffer.width(), buffer.height()) != (expected_width, expected_height) {
            return Err(OrbError::SurfaceSize {
                expected_width,
                expected_height,
                actual_width: buffer.width(),
                actual_height: buffer.height(),
            });
        }

        let result = backend.render(&self.current, self.elapsed, self.config.reflections, buffer);
        if let Err(OrbError::Backend(reason)) = &result {
            log::error!("shading backend failed, stopping orb: {}", reason);
            self.teardown();
        }
        result
    }

    /// Tick then render
    pub fn frame(&mut self, dt: f32, buffer: &mut PixelBuffer) -> Result<TickOutcome> {
        if self.tick(dt) == TickOutcome::Stopped {
            return Ok(TickOutcome::Stopped);
        }
        self.render(buffer)?;
        Ok(TickOutcome::Continue)
    }

    /// Stop now and release the backend
    pub fn stop(&mut self) {
        self.stop.stop();
        self.teardown();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn teardown(&mut self) {
        if let Some(backend) = self.backend.take() {
            log::info!("orb stopped, releasing {} backend", backend.name());
        }
    }
}

// ============================================================================
// Host loop
// ============================================================================

/// A presentation surface that drives an orb frame by frame
pub trait FrameHost {
    /// Wait for the next frame. Returns seconds since the previous frame, or
    /// `None` to end the loop. Hosts may reconfigure the orb here.
    fn begin_frame(&mut self, orb: &mut Orb) -> Option<f32>;

    /// Surface the orb renders into
    fn surface(&mut self) -> &mut PixelBuffer;

    /// Show the rendered surface
    fn end_frame(&mut self) -> Result<()>;
}

/// Run frames until the host ends the loop or the orb is stopped.
/// Returns the number of frames presented.
/// The orb is stopped on every exit, including errors.
pub fn run(orb: &mut Orb, host: &mut impl FrameHost) -> Result<u64> {
    let result = run_frames(orb, host);
    if let Err(e) = &result {
        log::warn!("frame loop failed: {}", e);
        orb.stop();
    }
    result
}

fn run_frames(orb: &mut Orb, host: &mut impl FrameHost) -> Result<u64> {
    let mut frames = 0;
    loop {
        let Some(dt) = host.begin_frame(orb) else {
            orb.stop();
            break;
        };
        if orb.frame(dt, host.surface())? == TickOutcome::Stopped {
            break;
        }
        host.end_frame()?;
        frames += 1;
    }
    log::debug!("frame loop ended after {} frames", frames);
    Ok(frames)
}
