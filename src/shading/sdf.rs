//! Signed distance primitives for the reflection overlay
//!
//! Distances are negative inside a shape and positive outside, in the same
//! units as the input point.

use std::f32::consts::TAU;

use crate::math3d::{smoothstep, Vec2};

/// Distance to an arc of a ring centered on the origin, with rounded caps.
///
/// The arc runs counter-clockwise from `start` to `end` (radians, measured
/// from +x); `thickness` is the full stroke width.
pub fn sd_ring_arc(p: Vec2, radius: f32, thickness: f32, start: f32, end: f32) -> f32 {
    let half = thickness * 0.5;
    let span = (end - start).rem_euclid(TAU);
    let angle = p.y.atan2(p.x);

    if (angle - start).rem_euclid(TAU) <= span {
        return (p.length() - radius).abs() - half;
    }

    let cap = |a: f32| {
        let (sin, cos) = a.sin_cos();
        (p - Vec2::new(cos * radius, sin * radius)).length()
    };
    cap(start).min(cap(end)) - half
}

/// Distance to a rounded rectangle at `center` rotated by `rotation` radians.
/// `half_extent` includes the corner rounding.
pub fn sd_rounded_rect(
    p: Vec2,
    center: Vec2,
    half_extent: Vec2,
    corner_radius: f32,
    rotation: f32,
) -> f32 {
    let local = (p - center).rotate(-rotation);
    let q = local.abs() - half_extent + Vec2::new(corner_radius, corner_radius);
    q.max_scalar(0.0).length() + q.x.max(q.y).min(0.0) - corner_radius
}

/// Antialiased coverage for a signed distance: 1 inside, 0 outside,
/// blended across `[-aa, aa]`.
#[inline]
pub fn sdf_mask(distance: f32, aa: f32) -> f32 {
    1.0 - smoothstep(-aa, aa, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_ring_arc_inside_span() {
        // Quarter arc from +x to +y, radius 1, width 0.1
        let mid = Vec2::new(1.0, 0.0).rotate(FRAC_PI_2 * 0.5);
        assert!((sd_ring_arc(mid, 1.0, 0.1, 0.0, FRAC_PI_2) + 0.05).abs() < 1e-5);
        assert!((sd_ring_arc(mid * 1.2, 1.0, 0.1, 0.0, FRAC_PI_2) - 0.15).abs() < 1e-5);
        assert!(sd_ring_arc(mid * 0.5, 1.0, 0.1, 0.0, FRAC_PI_2) > 0.4);
    }

    #[test]
    fn test_ring_arc_outside_span_uses_caps() {
        // Point on the ring but opposite the arc: distance to nearest cap
        let d = sd_ring_arc(Vec2::new(-1.0, 0.0), 1.0, 0.1, 0.0, FRAC_PI_2);
        let to_cap = (Vec2::new(-1.0, 0.0) - Vec2::new(0.0, 1.0)).length() - 0.05;
        assert!((d - to_cap).abs() < 1e-5);
    }

    #[test]
    fn test_ring_arc_wraps_through_pi() {
        // Arc from 150 degrees to -150 degrees crosses the -x axis
        let start = 150f32.to_radians();
        let end = (-150f32).to_radians();
        let d = sd_ring_arc(Vec2::new(-0.8, 0.0), 0.8, 0.04, start, end);
        assert!(d < 0.0);
        let d = sd_ring_arc(Vec2::new(0.8, 0.0), 0.8, 0.04, start, end);
        assert!(d > 0.5);
    }

    #[test]
    fn test_rounded_rect_distances() {
        let center = Vec2::new(0.2, -0.1);
        let half = Vec2::new(0.3, 0.1);
        assert!((sd_rounded_rect(center, center, half, 0.02, 0.0) + 0.1).abs() < 1e-5);
        // Straight out of the long side
        let d = sd_rounded_rect(center + Vec2::new(0.0, 0.3), center, half, 0.02, 0.0);
        assert!((d - 0.2).abs() < 1e-5);
        // Rotation by 90 degrees swaps the axes
        let d = sd_rounded_rect(center + Vec2::new(0.0, 0.25), center, half, 0.02, FRAC_PI_2);
        assert!(d < 0.0);
    }

    #[test]
    fn test_sdf_mask() {
        assert_eq!(sdf_mask(-1.0, 0.01), 1.0);
        assert_eq!(sdf_mask(1.0, 0.01), 0.0);
        assert!((sdf_mask(0.0, 0.01) - 0.5).abs() < 1e-6);
    }
}
