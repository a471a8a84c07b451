//! Orb shading function
//!
//! `shade` is a pure per-pixel function: normalized coordinate, current
//! state and time in, premultiplied RGBA out. It reconstructs a sphere normal
//! from the 2D coordinate, scrolls a three-layer fBm cloud texture over it,
//! lights it with a wandering multi-lobe highlight, optionally overlays glass
//! reflections, and tone-maps the additive result.

pub mod reflections;
pub mod sdf;

use crate::math3d::{mix, mix3, smoothstep, Vec2, Vec3};
use crate::noise::{fractal_noise3, remap01, DEFAULT_OCTAVES};
use crate::reflection::ReflectionSetting;
use crate::state::OrbState;

/// Sphere silhouette radius in normalized coordinates
pub const SPHERE_RADIUS: f32 = 0.72;
/// Half-width of the antialiased silhouette band
pub const EDGE_SOFTNESS: f32 = 0.008;

/// Masks at or below this are treated as fully outside
const MASK_EPSILON: f32 = 1e-4;

/// Resting light position; drift blends away from it
const BASE_LIGHT: Vec2 = Vec2::new(0.0, 0.0);

/// Specular lobes as (exponent, weight), soft to sharp
const SPECULAR_LOBES: [(f32, f32); 4] = [(4.0, 0.08), (12.0, 0.18), (40.0, 0.35), (150.0, 0.6)];

/// Reinhard-style tone map parameters
const TONE_KNEE: f32 = 0.45;
const TONE_GAIN: f32 = 1.35;

/// Premultiplied-alpha color
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Quantize to 8-bit premultiplied RGBA
    pub fn to_bytes(&self) -> [u8; 4] {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        [byte(self.r), byte(self.g), byte(self.b), byte(self.a)]
    }
}

/// Map the center of pixel (x, y) to normalized coordinates.
///
/// The shorter side spans [-1, 1] so the orb stays round on non-square
/// surfaces; y points up.
pub fn pixel_to_uv(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    let half = width.min(height).max(1) as f32 * 0.5;
    Vec2::new(
        (x as f32 + 0.5 - width as f32 * 0.5) / half,
        (height as f32 * 0.5 - (y as f32 + 0.5)) / half,
    )
}

/// Antialiased silhouette coverage at distance `dist` from the center
#[inline]
pub fn sphere_mask(dist: f32) -> f32 {
    1.0 - smoothstep(SPHERE_RADIUS - EDGE_SOFTNESS, SPHERE_RADIUS + EDGE_SOFTNESS, dist)
}

// ============================================================================
// Pipeline stages
// ============================================================================

/// Animated cloud density in [0, 1] for a surface normal
fn cloud_density(normal: Vec3, time: f32, cloud_speed: f32) -> f32 {
    let azimuth = normal.x.atan2(normal.z);
    let polar = normal.y.clamp(-1.0, 1.0).acos();
    let ct = time * cloud_speed;

    let broad = fractal_noise3(
        Vec3::new(azimuth * 1.8 + ct * 0.3, polar * 1.8, ct * 0.2),
        DEFAULT_OCTAVES,
    );
    let swell = fractal_noise3(
        Vec3::new(azimuth * 1.2 - ct * 0.2, polar * 1.2 + ct * 0.15, ct * 0.1 + 10.0),
        DEFAULT_OCTAVES,
    );
    let wisps = fractal_noise3(
        Vec3::new(azimuth * 2.5 + ct * 0.5, polar * 2.5 - ct * 0.25, ct * 0.3 + 20.0),
        DEFAULT_OCTAVES,
    );

    let blended = remap01(broad) * 0.5 + remap01(swell) * 0.35 + remap01(wisps) * 0.15;
    smoothstep(0.25, 0.75, blended)
}

/// Light position in sphere space.
///
/// Drift up to 1 blends from the resting position to a lissajous orbit;
/// beyond 1 the orbit only speeds up.
fn light_position(time: f32, drift: f32) -> Vec2 {
    let tau = time * drift.max(1.0) * 0.5;
    let orbit = BASE_LIGHT
        + Vec2::new(
            0.35 * (tau * 0.7).sin() + 0.12 * (tau * 1.9).sin(),
            0.28 * (tau * 0.55).cos(),
        );
    let blend = drift.clamp(0.0, 1.0);
    BASE_LIGHT + (orbit - BASE_LIGHT) * blend
}

/// Effective highlight size after the dual-sine pulse
fn highlight_scale(time: f32, size: f32, pulse: f32) -> f32 {
    let wobble = 0.6 * (time * 2.1).sin() + 0.4 * (time * 3.7).sin();
    (size * (1.0 + pulse * wobble * 0.5)).max(0.05)
}

fn specular(n_dot_h: f32, size: f32) -> f32 {
    SPECULAR_LOBES
        .iter()
        .map(|(exponent, weight)| weight * n_dot_h.powf(exponent / size))
        .sum()
}

/// Compress unbounded additive light into [0, 1].
///
/// `c / (c + k)` written as `1 - k / (c + k)` so every rounded step is
/// monotonic in `c`.
#[inline]
pub fn tone_map(c: f32) -> f32 {
    let c = c.max(0.0);
    (TONE_GAIN * (1.0 - TONE_KNEE / (c + TONE_KNEE))).clamp(0.0, 1.0)
}

// ============================================================================
// Shading
// ============================================================================

/// Shade one pixel of the orb.
///
/// `uv` is in [-1, 1]² with y up, `time` in seconds. Output is premultiplied:
/// alpha is the silhouette coverage and color is already scaled by it.
pub fn shade(uv: Vec2, state: &OrbState, time: f32, reflection: ReflectionSetting) -> Rgba {
    let dist = uv.length();
    let mask = sphere_mask(dist);
    if mask <= MASK_EPSILON {
        return Rgba::TRANSPARENT;
    }

    let anim = &state.animation;
    let base = state.colors.base.to_vec3();
    let mid = state.colors.mid.to_vec3();
    let highlight = state.colors.highlight.to_vec3();

    // Orthographic sphere reconstruction
    let p = uv * (1.0 / SPHERE_RADIUS);
    let r2 = p.dot(&p);
    let z = (1.0 - r2).max(0.0).sqrt();
    let normal = Vec3::new(p.x, p.y, z).normalize();

    let clouds = cloud_density(normal, time, anim.cloud_speed);

    let light = light_position(time, anim.highlight_drift);
    let light_dir = Vec3::new(light.x, light.y, 1.0).normalize();
    let view = Vec3::new(0.0, 0.0, 1.0);
    let half_vec = (light_dir + view).normalize();
    let size = highlight_scale(time, anim.highlight_size, anim.highlight_pulse);

    let diffuse = normal.dot(&light_dir).max(0.0).powf(0.85);
    let n_dot_h = normal.dot(&half_vec).max(0.0);
    let glint = specular(n_dot_h, size);
    let fresnel = (1.0 - normal.dot(&view).max(0.0)).powi(4);
    let pulse = 1.0 + (time * anim.pulse_speed).sin() * anim.pulse_amount;

    // Body: depth gradient, then clouds
    let depth = z.powf(0.6);
    let body = mix3(base, mid, depth);
    let clouded = mix3(body, highlight, clouds * 0.55);
    let mut color = mix3(body, clouded, anim.cloud_intensity);
    color *= 0.35 + 0.65 * diffuse;

    // Additive light terms
    let subsurface = mid * (0.18 * (1.0 - diffuse) * clouds);
    let bloom = highlight * (0.12 * n_dot_h.powi(3));
    let rim = mix3(mid, highlight, 0.5) * (0.45 * fresnel);
    let inner_glow = mid * (0.12 * (1.0 - r2.min(1.0)) * clouds);
    color += subsurface + highlight * glint + bloom + rim + inner_glow;

    color *= pulse;
    // Ambient occlusion toward the silhouette, then a soft floor shadow
    color *= mix(0.6, 1.0, smoothstep(0.0, 0.4, z));
    color *= mix(0.72, 1.0, smoothstep(-1.0, 0.35, p.y));

    if reflection.is_visible() {
        color = reflections::apply(color, p, fresnel, reflection.intensity());
    }

    let mapped = color.map(tone_map);
    Rgba {
        r: mapped.x * mask,
        g: mapped.y * mask,
        b: mapped.z * mask,
        a: mask,
    }
}
