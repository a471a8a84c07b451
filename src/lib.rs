//! Animated agent-state orb
//!
//! Resolves a declarative preset configuration into a target visual state,
//! eases a current state toward it every frame, and shades a glassy cloud-
//! filled sphere from that state one pixel at a time.

pub mod backend;
pub mod color;
pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod math3d;
pub mod noise;
pub mod preset;
pub mod reflection;
pub mod remote;
pub mod shading;
pub mod state;
pub mod util;

pub use backend::{create_backend, BackendKind, CpuBackend, ShadingBackend};
pub use color::{ColorScheme, ColorSchemeOverride, Rgb};
pub use config::{ConfigPatch, OrbConfig};
pub use display::PixelBuffer;
pub use driver::{run, FrameHost, Orb, StopHandle, TickOutcome};
pub use error::{OrbError, Result};
pub use math3d::Vec2;
pub use preset::{AnimationOverrides, AnimationParameters, Preset};
pub use reflection::ReflectionSetting;
pub use shading::{shade, Rgba};
pub use state::{advance, resolve_target_state, Interpolator, OrbState, StepPolicy};
