//! Glass reflection overlay
//!
//! A fixed constellation of soft ring arcs and rounded bars laid over the
//! sphere, reading as a curved glass shell catching window light and
//! fluorescent tubes. Shapes live in sphere space, where the silhouette is
//! the unit circle.

use super::sdf::{sd_ring_arc, sd_rounded_rect, sdf_mask};
use crate::math3d::{Vec2, Vec3};

/// Antialiasing half-width for shape edges, in sphere space
const SHAPE_AA: f32 = 0.015;

enum Shape {
    Arc {
        radius: f32,
        thickness: f32,
        start: f32,
        end: f32,
    },
    Bar {
        center: Vec2,
        half_extent: Vec2,
        corner: f32,
        rotation: f32,
    },
}

impl Shape {
    fn distance(&self, p: Vec2) -> f32 {
        match *self {
            Shape::Arc {
                radius,
                thickness,
                start,
                end,
            } => sd_ring_arc(p, radius, thickness, start, end),
            Shape::Bar {
                center,
                half_extent,
                corner,
                rotation,
            } => sd_rounded_rect(p, center, half_extent, corner, rotation),
        }
    }
}

/// (shape, weight)
static CONSTELLATION: [(Shape, f32); 5] = [
    // Window light wrapping the upper-left rim
    (
        Shape::Arc {
            radius: 0.86,
            thickness: 0.05,
            start: 1.9,
            end: 2.7,
        },
        0.9,
    ),
    // Faint bounce along the lower-right rim
    (
        Shape::Arc {
            radius: 0.9,
            thickness: 0.03,
            start: -0.9,
            end: -0.35,
        },
        0.45,
    ),
    // Pair of overhead tubes
    (
        Shape::Bar {
            center: Vec2::new(-0.42, 0.5),
            half_extent: Vec2::new(0.2, 0.04),
            corner: 0.04,
            rotation: 0.65,
        },
        0.8,
    ),
    (
        Shape::Bar {
            center: Vec2::new(-0.2, 0.66),
            half_extent: Vec2::new(0.12, 0.03),
            corner: 0.03,
            rotation: 0.35,
        },
        0.6,
    ),
    (
        Shape::Bar {
            center: Vec2::new(0.52, -0.5),
            half_extent: Vec2::new(0.08, 0.025),
            corner: 0.025,
            rotation: -0.75,
        },
        0.35,
    ),
];

/// Combined constellation coverage at `p`, in [0, 1]
pub fn coverage(p: Vec2) -> f32 {
    CONSTELLATION
        .iter()
        .map(|(shape, weight)| weight * sdf_mask(shape.distance(p), SHAPE_AA))
        .sum::<f32>()
        .min(1.0)
}

/// Overlay reflections on `color`.
///
/// Shapes brighten toward the silhouette through `fresnel`. The result is
/// never darker than `color` in any channel.
pub fn apply(color: Vec3, p: Vec2, fresnel: f32, intensity: f32) -> Vec3 {
    let strength = coverage(p) * (0.55 + 0.9 * fresnel) * intensity;
    if strength <= 0.0 {
        return color;
    }

    let lit = color + Vec3::splat(0.6 * strength);
    // Blend toward white without pulling already-hot channels back down
    let white = lit.max(Vec3::ONE);
    lit + (white - lit) * (0.35 * strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_on_and_off_shapes() {
        // Center of the first tube
        assert!(coverage(Vec2::new(-0.42, 0.5)) > 0.7);
        // Sphere center is clear glass
        assert_eq!(coverage(Vec2::new(0.0, 0.0)), 0.0);
        assert!(coverage(Vec2::new(0.1, -0.1)) < 1e-6);
    }

    #[test]
    fn test_coverage_is_bounded() {
        for i in -20..=20 {
            for j in -20..=20 {
                let c = coverage(Vec2::new(i as f32 * 0.05, j as f32 * 0.05));
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_apply_never_darkens() {
        let p = Vec2::new(-0.42, 0.5);
        for base in [Vec3::ZERO, Vec3::new(0.2, 0.5, 0.9), Vec3::new(1.8, 0.3, 2.5)] {
            let out = apply(base, p, 0.8, 1.0);
            assert!(out.x >= base.x && out.y >= base.y && out.z >= base.z);
        }
    }

    #[test]
    fn test_apply_zero_intensity_is_identity() {
        let base = Vec3::new(0.3, 0.4, 0.5);
        assert_eq!(apply(base, Vec2::new(-0.42, 0.5), 0.5, 0.0), base);
    }
}
