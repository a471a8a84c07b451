//! Target and current orb state, and the per-tick interpolator
//!
//! The target is a pure function of configuration. The current state is what
//! the shader sees; it chases the target a little every tick. Size, color and
//! intensity fields are smoothed because snapping them pops visibly. Speed
//! and drift fields snap, since a ramping frequency reads as a glitch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::{resolve_color_scheme, ColorScheme, ColorSchemeOverride};
use crate::config::DEFAULT_TRANSITION_SPEED;
use crate::preset::{resolve_parameters, AnimationOverrides, AnimationParameters, Preset};

/// Smoothing fraction per tick at 1.0x transition speed
pub const BASE_STEP: f32 = 0.015;

/// Tick rate the per-tick step was tuned for
pub const REFERENCE_TICK_HZ: f32 = 60.0;

/// Full visual state: palette plus animation scalars.
/// Used both as the target and as the live, interpolated state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbState {
    pub colors: ColorScheme,
    pub animation: AnimationParameters,
}

impl OrbState {
    /// Largest distance between `self` and `other` over the smoothed fields
    pub fn max_smoothed_delta(&self, other: &Self) -> f32 {
        let a = &self.animation;
        let b = &other.animation;
        self.colors
            .base
            .max_delta(&other.colors.base)
            .max(self.colors.mid.max_delta(&other.colors.mid))
            .max(self.colors.highlight.max_delta(&other.colors.highlight))
            .max((a.highlight_size - b.highlight_size).abs())
            .max((a.highlight_pulse - b.highlight_pulse).abs())
            .max((a.cloud_intensity - b.cloud_intensity).abs())
            .max((a.pulse_amount - b.pulse_amount).abs())
    }
}

/// Resolve the desired state from configuration inputs
pub fn resolve_target_state(
    preset: Preset,
    animation_overrides: &AnimationOverrides,
    color: Option<&str>,
    preset_colors: &HashMap<Preset, String>,
    explicit_scheme: Option<&ColorSchemeOverride>,
) -> OrbState {
    OrbState {
        colors: resolve_color_scheme(preset, color, preset_colors, explicit_scheme),
        animation: resolve_parameters(preset, animation_overrides),
    }
}

/// Blend `current` toward `target` by fraction `t`, snapping speed fields
fn blend(current: &OrbState, target: &OrbState, t: f32) -> OrbState {
    let c = &current.animation;
    let g = &target.animation;
    let lerp = |from: f32, to: f32| from + (to - from) * t;

    OrbState {
        colors: ColorScheme {
            base: current.colors.base.lerp(target.colors.base, t),
            mid: current.colors.mid.lerp(target.colors.mid, t),
            highlight: current.colors.highlight.lerp(target.colors.highlight, t),
        },
        animation: AnimationParameters {
            highlight_size: lerp(c.highlight_size, g.highlight_size),
            highlight_pulse: lerp(c.highlight_pulse, g.highlight_pulse),
            cloud_intensity: lerp(c.cloud_intensity, g.cloud_intensity),
            pulse_amount: lerp(c.pulse_amount, g.pulse_amount),
            pulse_speed: g.pulse_speed,
            cloud_speed: g.cloud_speed,
            highlight_drift: g.highlight_drift,
        },
    }
}

/// Reference step fraction for a transition speed multiplier.
/// A non-finite multiplier runs at the default speed.
#[inline]
pub fn step_fraction(transition_speed: f32) -> f32 {
    let speed = if transition_speed.is_finite() {
        transition_speed
    } else {
        DEFAULT_TRANSITION_SPEED
    };
    (BASE_STEP * speed).clamp(0.0, 1.0)
}

/// Advance `current` one reference tick toward `target`
pub fn advance(current: &OrbState, target: &OrbState, transition_speed: f32) -> OrbState {
    blend(current, target, step_fraction(transition_speed))
}

/// How the interpolation step relates to wall-clock time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepPolicy {
    /// One fixed step per tick; animation speed follows the host frame rate
    #[default]
    PerTick,
    /// Step scaled by measured elapsed time against `REFERENCE_TICK_HZ`.
    /// A frame of 1/60 s matches one `PerTick` step exactly.
    Elapsed,
}

/// Owns the stepping policy for one orb's current state
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolator {
    policy: StepPolicy,
}

impl Interpolator {
    pub fn new(policy: StepPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }

    /// Step fraction for one tick lasting `dt` seconds
    pub fn fraction(&self, transition_speed: f32, dt: f32) -> f32 {
        let per_tick = step_fraction(transition_speed);
        match self.policy {
            StepPolicy::PerTick => per_tick,
            StepPolicy::Elapsed => {
                let ticks = (dt * REFERENCE_TICK_HZ).max(0.0);
                (1.0 - (1.0 - per_tick).powf(ticks)).clamp(0.0, 1.0)
            },
        }
    }

    /// Move `current` toward `target` for one tick of `dt` seconds
    pub fn step(&self, current: &mut OrbState, target: &OrbState, transition_speed: f32, dt: f32) {
        *current = blend(current, target, self.fraction(transition_speed, dt));
    }
}
