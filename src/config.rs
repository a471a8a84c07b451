//! Declarative orb configuration
//!
//! `OrbConfig` is what a host sets; the target state is derived from it on
//! demand. Files are plain pretty-printed JSON.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::color::ColorSchemeOverride;
use crate::display::DEFAULT_SIZE;
use crate::error::Result;
use crate::preset::{AnimationOverrides, Preset};
use crate::reflection::ReflectionSetting;
use crate::state::{resolve_target_state, OrbState};

pub const DEFAULT_PIXEL_RATIO: f32 = 2.0;
pub const DEFAULT_TRANSITION_SPEED: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub preset: Preset,
    /// Square logical size in points, used for any side not set explicitly
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Render pixels per logical point
    pub pixel_ratio: f32,
    /// Global hex color, e.g. "#2563eb"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Per-preset hex colors
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub preset_colors: HashMap<Preset, String>,
    /// Explicit palette; beats every hex setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorSchemeOverride>,
    #[serde(skip_serializing_if = "AnimationOverrides::is_empty")]
    pub animation: AnimationOverrides,
    pub transition_speed: f32,
    pub reflections: ReflectionSetting,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            size: DEFAULT_SIZE,
            width: None,
            height: None,
            pixel_ratio: DEFAULT_PIXEL_RATIO,
            color: None,
            preset_colors: HashMap::new(),
            color_scheme: None,
            animation: AnimationOverrides::default(),
            transition_speed: DEFAULT_TRANSITION_SPEED,
            reflections: ReflectionSetting::default(),
        }
    }
}

impl OrbConfig {
    pub fn with_preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Window size in logical points
    pub fn logical_size(&self) -> (u32, u32) {
        (self.width.unwrap_or(self.size), self.height.unwrap_or(self.size))
    }

    /// Effective pixel ratio; non-positive or non-finite values mean 1
    pub fn effective_pixel_ratio(&self) -> f32 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }

    /// Surface size in pixels: logical size times pixel ratio, at least 1x1
    pub fn render_size(&self) -> (u32, u32) {
        let ratio = self.effective_pixel_ratio();
        let (w, h) = self.logical_size();
        let scale = |v: u32| ((v as f32 * ratio).round() as u32).max(1);
        (scale(w), scale(h))
    }

    /// Desired state for the current settings
    pub fn target_state(&self) -> OrbState {
        resolve_target_state(
            self.preset,
            &self.animation,
            self.color.as_deref(),
            &self.preset_colors,
            self.color_scheme.as_ref(),
        )
    }

    /// Apply a sparse update; returns true if anything changed
    pub fn apply(&mut self, patch: &ConfigPatch) -> bool {
        let before = self.clone();

        if let Some(preset) = patch.preset {
            self.preset = preset;
        }
        if let Some(color) = &patch.color {
            // Empty string clears the global color
            self.color = Some(color.trim().to_string()).filter(|c| !c.is_empty());
        }
        for (preset, color) in &patch.preset_colors {
            let color = color.trim();
            if color.is_empty() {
                self.preset_colors.remove(preset);
            } else {
                self.preset_colors.insert(*preset, color.to_string());
            }
        }
        if let Some(scheme) = patch.color_scheme {
            self.color_scheme = scheme;
        }
        if let Some(animation) = &patch.animation {
            self.animation.merge(animation);
        }
        if let Some(speed) = patch.transition_speed {
            self.transition_speed = speed;
        }
        if let Some(reflections) = patch.reflections {
            self.reflections = reflections;
        }

        *self != before
    }
}

// ============================================================================
// ConfigPatch
// ============================================================================

/// Sparse configuration update. Unset fields leave the config untouched.
///
/// Size and pixel ratio are not patchable; they belong to the surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigPatch {
    pub preset: Option<Preset>,
    /// Empty string clears the global color
    pub color: Option<String>,
    /// Empty string removes that preset's color
    pub preset_colors: HashMap<Preset, String>,
    /// `Some(None)` (JSON `null`) clears the explicit palette
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub color_scheme: Option<Option<ColorSchemeOverride>>,
    pub animation: Option<AnimationOverrides>,
    pub transition_speed: Option<f32>,
    pub reflections: Option<ReflectionSetting>,
}

/// Maps a present field to `Some`, keeping an explicit `null` as `Some(None)`
fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ConfigPatch {
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset: Some(preset),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorScheme, Rgb};

    #[test]
    fn test_defaults() {
        let config = OrbConfig::default();
        assert_eq!(config.preset, Preset::Idle);
        assert_eq!(config.logical_size(), (300, 300));
        assert_eq!(config.render_size(), (600, 600));
        assert_eq!(config.transition_speed, 1.0);
        assert_eq!(config.reflections, ReflectionSetting::Disabled);
    }

    #[test]
    fn test_sizes() {
        let config = OrbConfig {
            size: 200,
            width: Some(320),
            pixel_ratio: 1.5,
            ..OrbConfig::default()
        };
        assert_eq!(config.logical_size(), (320, 200));
        assert_eq!(config.render_size(), (480, 300));

        let broken = OrbConfig {
            size: 0,
            pixel_ratio: f32::NAN,
            ..OrbConfig::default()
        };
        assert_eq!(broken.render_size(), (1, 1));
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: OrbConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, OrbConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let json = r##"{
            "preset": "speaking",
            "color": "#2563eb",
            "preset_colors": { "thinking": "#aa00ff" },
            "color_scheme": { "base": [0.1, 0.2, 0.3] },
            "animation": { "pulse_speed": 3.0 },
            "transition_speed": 2.0,
            "reflections": { "enabled": true, "intensity": 0.4 }
        }"##;
        let config: OrbConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.preset, Preset::Speaking);
        assert_eq!(config.preset_colors[&Preset::Thinking], "#aa00ff");
        assert_eq!(config.animation.pulse_speed, Some(3.0));
        assert_eq!(config.reflections, ReflectionSetting::enabled(0.4));

        let target = config.target_state();
        assert_eq!(target.colors.base, Rgb::new(0.1, 0.2, 0.3));
        // Unset explicit colors fall back to the blue scheme
        assert_eq!(target.colors.mid, ColorScheme::BLUE.mid);
        assert_eq!(target.animation.pulse_speed, 3.0);
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        assert!(serde_json::from_str::<OrbConfig>(r#"{"preset": "dancing"}"#).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orb.json");

        let mut config = OrbConfig::with_preset(Preset::Thinking);
        config.color = Some("#10b981".to_string());
        config.preset_colors.insert(Preset::Asleep, "#334155".to_string());
        config.reflections = true.into();
        config.save(&path).unwrap();

        assert_eq!(OrbConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(OrbConfig::load(&missing), Err(crate::OrbError::Io(_))));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(OrbConfig::load(&bad), Err(crate::OrbError::Json(_))));
    }

    #[test]
    fn test_apply_patch() {
        let mut config = OrbConfig::default();
        config.color = Some("#ff0000".to_string());
        config.animation.pulse_speed = Some(2.0);

        let patch: ConfigPatch = serde_json::from_str(
            r#"{"preset": "listening", "animation": {"cloud_speed": 0.1}, "reflections": true}"#,
        )
        .unwrap();
        assert!(config.apply(&patch));
        assert_eq!(config.preset, Preset::Listening);
        assert_eq!(config.animation.pulse_speed, Some(2.0));
        assert_eq!(config.animation.cloud_speed, Some(0.1));
        assert!(config.reflections.is_visible());
        assert_eq!(config.color.as_deref(), Some("#ff0000"));

        // Re-applying is a no-op
        assert!(!config.apply(&patch));

        assert!(config.apply(&ConfigPatch {
            color: Some(String::new()),
            ..ConfigPatch::default()
        }));
        assert_eq!(config.color, None);
    }

    #[test]
    fn test_patch_clears_palettes() {
        let mut config = OrbConfig::default();
        let set: ConfigPatch = serde_json::from_str(
            r##"{"preset_colors": {"thinking": "#aa00ff"}, "color_scheme": {"base": [0.1, 0.2, 0.3]}}"##,
        )
        .unwrap();
        assert!(config.apply(&set));
        assert_eq!(config.preset_colors[&Preset::Thinking], "#aa00ff");
        assert!(config.color_scheme.is_some());

        // An absent color_scheme leaves the palette alone
        let keep: ConfigPatch = serde_json::from_str(r#"{"preset": "thinking"}"#).unwrap();
        assert_eq!(keep.color_scheme, None);
        config.apply(&keep);
        assert!(config.color_scheme.is_some());

        let clear: ConfigPatch = serde_json::from_str(
            r#"{"preset_colors": {"thinking": ""}, "color_scheme": null}"#,
        )
        .unwrap();
        assert_eq!(clear.color_scheme, Some(None));
        assert!(config.apply(&clear));
        assert!(config.preset_colors.is_empty());
        assert_eq!(config.color_scheme, None);
        assert_eq!(config.target_state(), OrbConfig::with_preset(Preset::Thinking).target_state());
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        assert!(serde_json::from_str::<ConfigPatch>(r#"{"size": 100}"#).is_err());
        assert!(ConfigPatch::default().is_empty());
        assert!(!ConfigPatch::preset(Preset::Asleep).is_empty());
    }
}
