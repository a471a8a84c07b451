//! Color resolution
//!
//! Parses hex colors, derives three-tone palettes from a single base color,
//! and resolves the active `ColorScheme` from the layered overrides an orb
//! can be configured with.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::math3d::Vec3;
use crate::preset::Preset;

/// Returned by `hex_to_rgb` for anything that is not six hex digits
pub const FALLBACK_RGB: Rgb = Rgb::new(0.15, 0.35, 0.75);

/// Saturation below which derived palettes go monochrome
const MONOCHROME_SATURATION: f32 = 0.1;

/// Scale applied to every color of the `asleep` preset
const ASLEEP_DIM: f32 = 0.5;

/// Linear RGB color, channels in [0, 1]. Serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Every channel clamped into [0, 1]
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(self.r.clamp(0.0, 1.0), self.g.clamp(0.0, 1.0), self.b.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    #[inline]
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Move toward `target` by fraction `t`
    #[inline]
    pub fn lerp(self, target: Self, t: f32) -> Self {
        Self::new(
            self.r + (target.r - self.r) * t,
            self.g + (target.g - self.g) * t,
            self.b + (target.b - self.b) * t,
        )
    }

    /// Perceptual luminance (Rec. 601 weights)
    #[inline]
    pub fn luminance(&self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    /// (max - min) / max, or 0 for black
    pub fn saturation(&self) -> f32 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        if max > 0.0 {
            (max - min) / max
        } else {
            0.0
        }
    }

    /// Largest absolute per-channel difference
    pub fn max_delta(&self, other: &Self) -> f32 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }

    /// Format as `#rrggbb`, rounding each channel to the nearest byte
    pub fn to_hex(&self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for [f32; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Three-tone palette used by the shader
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Dark body color, dominant near the silhouette
    pub base: Rgb,
    /// Body color facing the viewer
    pub mid: Rgb,
    /// Specular, cloud and rim color
    pub highlight: Rgb,
}

impl ColorScheme {
    /// Global default palette
    pub const BLUE: Self = Self {
        base: Rgb::new(0.15, 0.35, 0.75),
        mid: Rgb::new(0.30, 0.55, 0.95),
        highlight: Rgb::new(0.70, 0.85, 1.00),
    };

    /// Default palette of the `listening` preset
    pub const RED: Self = Self {
        base: Rgb::new(0.60, 0.08, 0.15),
        mid: Rgb::new(0.85, 0.15, 0.25),
        highlight: Rgb::new(1.00, 0.50, 0.60),
    };

    pub fn scale(self, factor: f32) -> Self {
        Self {
            base: self.base.scale(factor),
            mid: self.mid.scale(factor),
            highlight: self.highlight.scale(factor),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::BLUE
    }
}

/// Explicit palette override. Missing colors come from `ColorScheme::BLUE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSchemeOverride {
    pub base: Option<Rgb>,
    pub mid: Option<Rgb>,
    pub highlight: Option<Rgb>,
}

impl ColorSchemeOverride {
    /// Channels are clamped into [0, 1]; a color with a non-finite channel
    /// is treated as missing.
    pub fn resolve(&self) -> ColorScheme {
        let blue = ColorScheme::BLUE;
        let pick = |color: Option<Rgb>, fallback: Rgb| {
            color.filter(Rgb::is_finite).map_or(fallback, Rgb::clamped)
        };
        ColorScheme {
            base: pick(self.base, blue.base),
            mid: pick(self.mid, blue.mid),
            highlight: pick(self.highlight, blue.highlight),
        }
    }
}

impl From<ColorScheme> for ColorSchemeOverride {
    fn from(scheme: ColorScheme) -> Self {
        Self {
            base: Some(scheme.base),
            mid: Some(scheme.mid),
            highlight: Some(scheme.highlight),
        }
    }
}

/// Parse a `#rrggbb` or `rrggbb` color (case-insensitive).
/// Malformed input yields `FALLBACK_RGB` instead of an error.
pub fn hex_to_rgb(hex: &str) -> Rgb {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        debug!("Malformed color '{}', using fallback", hex);
        return FALLBACK_RGB;
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_or(0.0, |v| f32::from(v) / 255.0)
    };
    Rgb::new(channel(0), channel(2), channel(4))
}

/// Derive a three-tone palette from one color.
///
/// Near-gray inputs produce a neutral monochrome palette; derived tints of an
/// unsaturated color turn muddy.
pub fn generate_color_scheme(color: Rgb) -> ColorScheme {
    if color.saturation() < MONOCHROME_SATURATION {
        let luminance = color.luminance();
        return ColorScheme {
            base: Rgb::gray(0.4 * luminance),
            mid: Rgb::gray(0.8 * luminance),
            highlight: Rgb::gray(0.95),
        };
    }

    ColorScheme {
        base: color.scale(0.5),
        mid: Rgb::new(
            (color.r * 1.2).min(1.0),
            (color.g * 1.2).min(1.0),
            (color.b * 1.2).min(1.0),
        ),
        highlight: Rgb::new(
            (color.r * 0.5 + 0.5).min(1.0),
            (color.g * 0.5 + 0.5).min(1.0),
            (color.b * 0.5 + 0.5).min(1.0),
        ),
    }
}

/// Resolve the palette for `preset`. Highest precedence first:
///
/// 1. `explicit` scheme (missing colors from blue)
/// 2. `preset_colors[preset]` hex, expanded
/// 3. the red scheme, when `preset` is `Listening`
/// 4. `global_color` hex, expanded
/// 5. the blue scheme
///
/// `Asleep` without an explicit scheme is dimmed to half brightness.
pub fn resolve_color_scheme(
    preset: Preset,
    global_color: Option<&str>,
    preset_colors: &HashMap<Preset, String>,
    explicit: Option<&ColorSchemeOverride>,
) -> ColorScheme {
    if let Some(explicit) = explicit {
        return explicit.resolve();
    }

    let scheme = if let Some(hex) = preset_colors.get(&preset) {
        generate_color_scheme(hex_to_rgb(hex))
    } else if preset == Preset::Listening {
        ColorScheme::RED
    } else if let Some(hex) = global_color {
        generate_color_scheme(hex_to_rgb(hex))
    } else {
        ColorScheme::BLUE
    };

    if preset == Preset::Asleep {
        scheme.scale(ASLEEP_DIM)
    } else {
        scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgb(actual: Rgb, expected: Rgb, eps: f32) {
        assert!(
            actual.max_delta(&expected) < eps,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_hex_to_rgb_parses() {
        assert_rgb(hex_to_rgb("#2563eb"), Rgb::new(0.145, 0.388, 0.922), 0.001);
        assert_rgb(hex_to_rgb("2563EB"), Rgb::new(0.145, 0.388, 0.922), 0.001);
        assert_eq!(hex_to_rgb("#000000"), Rgb::gray(0.0));
        assert_eq!(hex_to_rgb("#ffffff"), Rgb::gray(1.0));
    }

    #[test]
    fn test_hex_to_rgb_fallback() {
        for bad in ["notacolor", "#fff", "", "#", "#12345g", "#1234567", "+12345", "#ééé"] {
            assert_eq!(hex_to_rgb(bad), FALLBACK_RGB, "input {:?}", bad);
        }
    }

    #[test]
    fn test_hex_round_trip_within_rounding() {
        for hex in ["#2563eb", "#000000", "#ffffff", "#7f0a33", "#c0ffee"] {
            assert_eq!(hex_to_rgb(hex).to_hex(), hex);
        }
    }

    #[test]
    fn test_generate_monochrome_for_gray() {
        let scheme = generate_color_scheme(Rgb::gray(0.5));
        assert_rgb(scheme.base, Rgb::gray(0.2), 1e-6);
        assert_rgb(scheme.mid, Rgb::gray(0.4), 1e-6);
        assert_rgb(scheme.highlight, Rgb::gray(0.95), 1e-6);
    }

    #[test]
    fn test_generate_monochrome_for_black() {
        let scheme = generate_color_scheme(Rgb::gray(0.0));
        assert_eq!(scheme.base, Rgb::gray(0.0));
        assert_eq!(scheme.highlight, Rgb::gray(0.95));
    }

    #[test]
    fn test_generate_chromatic() {
        let input = Rgb::new(0.8, 0.1, 0.1);
        let scheme = generate_color_scheme(input);
        assert_rgb(scheme.base, input.scale(0.5), 1e-6);
        assert_rgb(scheme.mid, Rgb::new(0.96, 0.12, 0.12), 1e-6);
        assert_rgb(scheme.highlight, Rgb::new(0.9, 0.55, 0.55), 1e-6);
    }

    #[test]
    fn test_generate_clamps_bright_channels() {
        let scheme = generate_color_scheme(Rgb::new(1.0, 0.2, 0.9));
        assert!(scheme.mid.r <= 1.0 && scheme.mid.b <= 1.0);
        assert!(scheme.highlight.r <= 1.0);
    }

    #[test]
    fn test_resolve_defaults() {
        let none = HashMap::new();
        assert_eq!(resolve_color_scheme(Preset::Idle, None, &none, None), ColorScheme::BLUE);
        assert_eq!(
            resolve_color_scheme(Preset::Listening, None, &none, None),
            ColorScheme::RED
        );
    }

    #[test]
    fn test_resolve_listening_beats_global_color() {
        let none = HashMap::new();
        let scheme = resolve_color_scheme(Preset::Listening, Some("#22aa44"), &none, None);
        assert_eq!(scheme, ColorScheme::RED);

        let scheme = resolve_color_scheme(Preset::Thinking, Some("#22aa44"), &none, None);
        assert_eq!(scheme, generate_color_scheme(hex_to_rgb("#22aa44")));
    }

    #[test]
    fn test_resolve_preset_color_beats_listening_default() {
        let mut overrides = HashMap::new();
        overrides.insert(Preset::Listening, "#00ff00".to_string());
        let scheme = resolve_color_scheme(Preset::Listening, Some("#0000ff"), &overrides, None);
        assert_eq!(scheme, generate_color_scheme(Rgb::new(0.0, 1.0, 0.0)));

        // Overrides for other presets do not leak
        let scheme = resolve_color_scheme(Preset::Idle, None, &overrides, None);
        assert_eq!(scheme, ColorScheme::BLUE);
    }

    #[test]
    fn test_resolve_explicit_wins_and_fills_from_blue() {
        let mut overrides = HashMap::new();
        overrides.insert(Preset::Speaking, "#ff0000".to_string());
        let explicit = ColorSchemeOverride {
            mid: Some(Rgb::new(0.1, 0.2, 0.3)),
            ..Default::default()
        };
        let scheme =
            resolve_color_scheme(Preset::Speaking, Some("#00ff00"), &overrides, Some(&explicit));
        assert_eq!(scheme.base, ColorScheme::BLUE.base);
        assert_eq!(scheme.mid, Rgb::new(0.1, 0.2, 0.3));
        assert_eq!(scheme.highlight, ColorScheme::BLUE.highlight);
    }

    #[test]
    fn test_resolve_asleep_is_dimmed() {
        let none = HashMap::new();
        let awake = resolve_color_scheme(Preset::Idle, Some("#2563eb"), &none, None);
        let asleep = resolve_color_scheme(Preset::Asleep, Some("#2563eb"), &none, None);
        assert_eq!(asleep, awake.scale(0.5));
    }

    #[test]
    fn test_resolve_asleep_explicit_is_not_dimmed() {
        let none = HashMap::new();
        let explicit = ColorSchemeOverride::from(ColorScheme::RED);
        let scheme = resolve_color_scheme(Preset::Asleep, None, &none, Some(&explicit));
        assert_eq!(scheme, ColorScheme::RED);
    }

    #[test]
    fn test_rgb_serializes_as_array() {
        let json = serde_json::to_string(&Rgb::new(0.5, 0.25, 1.0)).unwrap();
        assert_eq!(json, "[0.5,0.25,1.0]");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(0.5, 0.25, 1.0));
    }
}
