//! Glass reflection setting
//!
//! Configuration accepts either a bare boolean or an `{enabled, intensity}`
//! object. Both shapes are normalized into `ReflectionSetting` when the value
//! is constructed, so the shader only ever sees the tagged form.

use serde::{Deserialize, Serialize};

/// Intensity used when reflections are enabled without an explicit value
pub const DEFAULT_REFLECTION_INTENSITY: f32 = 0.6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReflectionInput", into = "ReflectionInput")]
pub enum ReflectionSetting {
    #[default]
    Disabled,
    /// Intensity in [0, 1]
    Enabled { intensity: f32 },
}

impl ReflectionSetting {
    /// Enabled at `intensity`, clamped into [0, 1]
    pub fn enabled(intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            DEFAULT_REFLECTION_INTENSITY
        };
        Self::Enabled { intensity }
    }

    /// Effective overlay intensity; 0 when disabled
    pub fn intensity(&self) -> f32 {
        match self {
            Self::Disabled => 0.0,
            Self::Enabled { intensity } => *intensity,
        }
    }

    /// True when the shader should evaluate the reflection overlay at all
    pub fn is_visible(&self) -> bool {
        self.intensity() > 0.0
    }

    /// Flip between disabled and enabled at the default intensity
    pub fn toggled(self) -> Self {
        match self {
            Self::Disabled => Self::enabled(DEFAULT_REFLECTION_INTENSITY),
            Self::Enabled { .. } => Self::Disabled,
        }
    }
}

impl From<bool> for ReflectionSetting {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::enabled(DEFAULT_REFLECTION_INTENSITY)
        } else {
            Self::Disabled
        }
    }
}

/// Wire shapes accepted for the reflection setting
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum ReflectionInput {
    Flag(bool),
    Detailed {
        enabled: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intensity: Option<f32>,
    },
}

impl From<ReflectionInput> for ReflectionSetting {
    fn from(input: ReflectionInput) -> Self {
        match input {
            ReflectionInput::Flag(enabled) => enabled.into(),
            ReflectionInput::Detailed { enabled: false, .. } => Self::Disabled,
            ReflectionInput::Detailed {
                enabled: true,
                intensity,
            } => Self::enabled(intensity.unwrap_or(DEFAULT_REFLECTION_INTENSITY)),
        }
    }
}

impl From<ReflectionSetting> for ReflectionInput {
    fn from(setting: ReflectionSetting) -> Self {
        match setting {
            ReflectionSetting::Disabled => ReflectionInput::Flag(false),
            ReflectionSetting::Enabled { intensity } => ReflectionInput::Detailed {
                enabled: true,
                intensity: Some(intensity),
            },
        }
    }
}
