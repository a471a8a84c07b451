//! Behavioral presets and their animation parameters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrbError;

/// Named agent state the orb can display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Idle,
    Listening,
    Thinking,
    Speaking,
    Asleep,
}

/// The seven animation scalars the shader consumes.
///
/// Ranges are documented, not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationParameters {
    /// Global pulse frequency, radians per second (0-6)
    pub pulse_speed: f32,
    /// Global pulse depth as a brightness fraction (0-0.2)
    pub pulse_amount: f32,
    /// Cloud texture scroll rate (0-2)
    pub cloud_speed: f32,
    /// Weight of the cloud texture in the final color (0-1)
    pub cloud_intensity: f32,
    /// Highlight wander; 0 pins it, 1 is full orbit, above 1 orbits faster (0-2)
    pub highlight_drift: f32,
    /// Specular lobe width multiplier (0.3-2)
    pub highlight_size: f32,
    /// Depth of the highlight size oscillation (0-1)
    pub highlight_pulse: f32,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Idle,
        Preset::Listening,
        Preset::Thinking,
        Preset::Speaking,
        Preset::Asleep,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Idle => "idle",
            Preset::Listening => "listening",
            Preset::Thinking => "thinking",
            Preset::Speaking => "speaking",
            Preset::Asleep => "asleep",
        }
    }

    /// Canonical animation parameters for this preset
    pub const fn parameters(self) -> AnimationParameters {
        match self {
            // Calm resting state
            Preset::Idle => AnimationParameters {
                pulse_speed: 1.0,
                pulse_amount: 0.03,
                cloud_speed: 0.3,
                cloud_intensity: 0.5,
                highlight_drift: 0.3,
                highlight_size: 1.0,
                highlight_pulse: 0.1,
            },
            // Centered highlight that breathes instead of wandering
            Preset::Listening => AnimationParameters {
                pulse_speed: 2.5,
                pulse_amount: 0.05,
                cloud_speed: 0.5,
                cloud_intensity: 0.6,
                highlight_drift: 0.0,
                highlight_size: 1.2,
                highlight_pulse: 0.35,
            },
            Preset::Thinking => AnimationParameters {
                pulse_speed: 2.5,
                pulse_amount: 0.06,
                cloud_speed: 0.8,
                cloud_intensity: 0.7,
                highlight_drift: 0.6,
                highlight_size: 1.0,
                highlight_pulse: 0.2,
            },
            Preset::Speaking => AnimationParameters {
                pulse_speed: 4.0,
                pulse_amount: 0.08,
                cloud_speed: 1.2,
                cloud_intensity: 0.8,
                highlight_drift: 1.4,
                highlight_size: 1.4,
                highlight_pulse: 0.4,
            },
            Preset::Asleep => AnimationParameters {
                pulse_speed: 0.4,
                pulse_amount: 0.02,
                cloud_speed: 0.05,
                cloud_intensity: 0.3,
                highlight_drift: 0.05,
                highlight_size: 0.7,
                highlight_pulse: 0.05,
            },
        }
    }

    /// Next preset in `ALL` order, wrapping around
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = OrbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| OrbError::UnknownPreset(s.to_string()))
    }
}

impl Default for AnimationParameters {
    fn default() -> Self {
        Preset::Idle.parameters()
    }
}

/// Partial animation record; set fields replace the preset defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationOverrides {
    pub pulse_speed: Option<f32>,
    pub pulse_amount: Option<f32>,
    pub cloud_speed: Option<f32>,
    pub cloud_intensity: Option<f32>,
    pub highlight_drift: Option<f32>,
    pub highlight_size: Option<f32>,
    pub highlight_pulse: Option<f32>,
}

impl AnimationOverrides {
    /// Merge onto `base`, field by field
    pub fn apply(&self, base: AnimationParameters) -> AnimationParameters {
        AnimationParameters {
            pulse_speed: self.pulse_speed.unwrap_or(base.pulse_speed),
            pulse_amount: self.pulse_amount.unwrap_or(base.pulse_amount),
            cloud_speed: self.cloud_speed.unwrap_or(base.cloud_speed),
            cloud_intensity: self.cloud_intensity.unwrap_or(base.cloud_intensity),
            highlight_drift: self.highlight_drift.unwrap_or(base.highlight_drift),
            highlight_size: self.highlight_size.unwrap_or(base.highlight_size),
            highlight_pulse: self.highlight_pulse.unwrap_or(base.highlight_pulse),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Take every field `newer` sets, keep the rest
    pub fn merge(&mut self, newer: &Self) {
        self.pulse_speed = newer.pulse_speed.or(self.pulse_speed);
        self.pulse_amount = newer.pulse_amount.or(self.pulse_amount);
        self.cloud_speed = newer.cloud_speed.or(self.cloud_speed);
        self.cloud_intensity = newer.cloud_intensity.or(self.cloud_intensity);
        self.highlight_drift = newer.highlight_drift.or(self.highlight_drift);
        self.highlight_size = newer.highlight_size.or(self.highlight_size);
        self.highlight_pulse = newer.highlight_pulse.or(self.highlight_pulse);
    }
}

/// Preset parameters with `overrides` merged on top
pub fn resolve_parameters(preset: Preset, overrides: &AnimationOverrides) -> AnimationParameters {
    overrides.apply(preset.parameters())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(p: Preset) -> AnimationParameters {
        p.parameters()
    }

    #[test]
    fn test_pulse_speed_ordering() {
        use Preset::*;
        assert!(params(Asleep).pulse_speed < params(Idle).pulse_speed);
        assert!(params(Idle).pulse_speed < params(Listening).pulse_speed);
        assert_eq!(params(Listening).pulse_speed, params(Thinking).pulse_speed);
        assert!(params(Thinking).pulse_speed < params(Speaking).pulse_speed);
    }

    #[test]
    fn test_highlight_drift_ordering() {
        use Preset::*;
        let zero_drift: Vec<_> = Preset::ALL
            .into_iter()
            .filter(|p| params(*p).highlight_drift == 0.0)
            .collect();
        assert_eq!(zero_drift, vec![Listening]);

        assert!(params(Asleep).highlight_drift < params(Idle).highlight_drift);
        assert!(params(Idle).highlight_drift < params(Thinking).highlight_drift);
        assert!(params(Thinking).highlight_drift < params(Speaking).highlight_drift);
    }

    #[test]
    fn test_motion_axes_ordering() {
        use Preset::*;
        let order = [Asleep, Idle, Listening, Thinking, Speaking];
        for pair in order.windows(2) {
            let (lo, hi) = (params(pair[0]), params(pair[1]));
            assert!(lo.pulse_amount < hi.pulse_amount, "{} vs {}", pair[0], pair[1]);
            assert!(lo.cloud_speed < hi.cloud_speed, "{} vs {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_overrides_merge_field_by_field() {
        let overrides = AnimationOverrides {
            pulse_speed: Some(9.0),
            highlight_size: Some(0.5),
            ..Default::default()
        };
        let merged = resolve_parameters(Preset::Thinking, &overrides);
        let base = Preset::Thinking.parameters();
        assert_eq!(merged.pulse_speed, 9.0);
        assert_eq!(merged.highlight_size, 0.5);
        assert_eq!(merged.cloud_speed, base.cloud_speed);
        assert_eq!(merged.highlight_drift, base.highlight_drift);

        assert!(AnimationOverrides::default().is_empty());
        assert_eq!(
            resolve_parameters(Preset::Asleep, &AnimationOverrides::default()),
            Preset::Asleep.parameters()
        );
    }

    #[test]
    fn test_overrides_merge_keeps_unset_fields() {
        let mut current = AnimationOverrides {
            pulse_speed: Some(1.5),
            cloud_speed: Some(0.2),
            ..Default::default()
        };
        current.merge(&AnimationOverrides {
            cloud_speed: Some(0.9),
            ..Default::default()
        });
        assert_eq!(current.pulse_speed, Some(1.5));
        assert_eq!(current.cloud_speed, Some(0.9));
        assert_eq!(current.highlight_size, None);
    }

    #[test]
    fn test_parse_and_display() {
        for preset in Preset::ALL {
            assert_eq!(preset.to_string().parse::<Preset>().unwrap(), preset);
        }
        assert_eq!(" Speaking ".parse::<Preset>().unwrap(), Preset::Speaking);
        assert!(matches!("dancing".parse::<Preset>(), Err(OrbError::UnknownPreset(_))));
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut p = Preset::Idle;
        for _ in 0..Preset::ALL.len() {
            p = p.next();
        }
        assert_eq!(p, Preset::Idle);
        assert_eq!(Preset::Asleep.next(), Preset::Idle);
    }

    #[test]
    fn test_serde_lowercase_names() {
        assert_eq!(serde_json::to_string(&Preset::Listening).unwrap(), "\"listening\"");
        let p: Preset = serde_json::from_str("\"asleep\"").unwrap();
        assert_eq!(p, Preset::Asleep);
    }
}
