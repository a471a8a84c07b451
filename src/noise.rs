//! Noise Generation
//!
//! 3D simplex gradient noise and a fractional Brownian motion (fBm) wrapper.
//! The lattice hash is the mod-289 polynomial permutation commonly used by
//! GPU simplex implementations, so the CPU shader matches their frequency
//! content and look.

use crate::math3d::Vec3;

/// Octave count used when callers have no reason to pick another
pub const DEFAULT_OCTAVES: u32 = 6;

/// Simplex skew factor for 3D (1/3)
const F3: f32 = 1.0 / 3.0;
/// Simplex unskew factor for 3D (1/6)
const G3: f32 = 1.0 / 6.0;

/// Gradient ring constants: 7x7 points mapped onto an octahedron
const NS_X: f32 = 2.0 / 7.0;
const NS_Y: f32 = 0.5 / 7.0 - 1.0;
const NS_Z: f32 = 1.0 / 7.0;

#[inline]
fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

/// Polynomial permutation: (34x² + x) mod 289
#[inline]
fn permute(x: f32) -> f32 {
    mod289((x * 34.0 + 1.0) * x)
}

/// First-order Taylor approximation of 1/sqrt(r) around r = 0.7
#[inline]
fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_9 - 0.853_734_7 * r
}

/// GLSL `step(edge, x)`
#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

/// Map a permuted lattice hash to a gradient on the octahedron surface.
fn ring_gradient(hash: f32) -> Vec3 {
    let j = hash - 49.0 * (hash * NS_Z * NS_Z).floor();
    let gx = (j * NS_Z).floor();
    let gy = (j - 7.0 * gx).floor();

    let x = gx * NS_X + NS_Y;
    let y = gy * NS_X + NS_Y;
    let h = 1.0 - x.abs() - y.abs();

    // Fold points below the octahedron equator back onto the upper half
    let sh = -step(h, 0.0);
    let g = Vec3::new(
        x + (x.floor() * 2.0 + 1.0) * sh,
        y + (y.floor() * 2.0 + 1.0) * sh,
        h,
    );
    g * taylor_inv_sqrt(g.dot(&g))
}

/// 3D simplex gradient noise.
/// Returns a value in approximately [-1.0, 1.0]; continuous with a continuous
/// first derivative, and a pure function of `v`.
pub fn gradient_noise3(v: Vec3) -> f32 {
    // Skew into simplex space and find the containing cell
    let skew = (v.x + v.y + v.z) * F3;
    let cell = (v + Vec3::splat(skew)).floor();
    let unskew = (cell.x + cell.y + cell.z) * G3;
    let x0 = v - cell + Vec3::splat(unskew);

    // Rank the offsets to pick which simplex of the cube we are in
    let g = Vec3::new(step(x0.y, x0.x), step(x0.z, x0.y), step(x0.x, x0.z));
    let l = Vec3::ONE - g;
    let l_zxy = Vec3::new(l.z, l.x, l.y);
    let i1 = g.min(l_zxy);
    let i2 = g.max(l_zxy);

    let corners = [
        (Vec3::ZERO, x0),
        (i1, x0 - i1 + Vec3::splat(G3)),
        (i2, x0 - i2 + Vec3::splat(2.0 * G3)),
        (Vec3::ONE, x0 - Vec3::splat(1.0 - 3.0 * G3)),
    ];

    let cell = cell.map(mod289);
    let mut total = 0.0;
    for (offset, d) in corners {
        let hash = permute(
            permute(permute(cell.z + offset.z) + cell.y + offset.y) + cell.x + offset.x,
        );
        let falloff = (0.6 - d.dot(&d)).max(0.0);
        let falloff2 = falloff * falloff;
        total += falloff2 * falloff2 * ring_gradient(hash).dot(&d);
    }

    42.0 * total
}

/// Fractional Brownian motion: `octaves` layers of simplex noise.
/// Each octave doubles in frequency and halves in amplitude, starting at
/// amplitude 0.5 and frequency 1.0.
///
/// Returns a value in approximately [-1.0, 1.0].
pub fn fractal_noise3(p: Vec3, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..octaves {
        value += amplitude * gradient_noise3(p * frequency);
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}

/// Remap a noise sample from [-1, 1] to [0, 1]
#[inline]
pub fn remap01(n: f32) -> f32 {
    n * 0.5 + 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> impl Iterator<Item = Vec3> {
        (0..12).flat_map(|i| {
            (0..12).map(move |j| {
                Vec3::new(i as f32 * 0.37 - 2.0, j as f32 * 0.41 - 2.5, (i * j) as f32 * 0.05)
            })
        })
    }

    #[test]
    fn test_gradient_noise_deterministic() {
        let p = Vec3::new(1.3, -4.2, 7.7);
        assert_eq!(gradient_noise3(p), gradient_noise3(p));
        assert_eq!(fractal_noise3(p, 6), fractal_noise3(p, 6));
    }

    #[test]
    fn test_gradient_noise_range() {
        for p in sample_grid() {
            let n = gradient_noise3(p);
            assert!(n.is_finite());
            assert!(n.abs() <= 1.1, "noise out of range at {:?}: {}", p, n);
        }
    }

    #[test]
    fn test_gradient_noise_not_flat() {
        let peak = sample_grid()
            .map(|p| gradient_noise3(p).abs())
            .fold(0.0f32, f32::max);
        assert!(peak > 0.1, "noise should vary, peak was {}", peak);
    }

    #[test]
    fn test_gradient_noise_continuity() {
        for i in 0..200 {
            let x = i as f32 * 0.05 - 5.0;
            let p = Vec3::new(x, 0.3 * x, -0.7 * x);
            let a = gradient_noise3(p);
            let b = gradient_noise3(p + Vec3::splat(0.001));
            assert!((a - b).abs() < 0.05, "noise discontinuity at x={}", x);
        }
    }

    #[test]
    fn test_fractal_single_octave_is_half_amplitude() {
        let p = Vec3::new(0.42, 1.7, -0.9);
        assert!((fractal_noise3(p, 1) - 0.5 * gradient_noise3(p)).abs() < 1e-6);
        assert_eq!(fractal_noise3(p, 0), 0.0);
    }

    #[test]
    fn test_fractal_range() {
        for p in sample_grid() {
            let n = fractal_noise3(p, DEFAULT_OCTAVES);
            assert!(n.abs() <= 1.1);
            let r = remap01(n);
            assert!((-0.05..=1.05).contains(&r));
        }
    }
}
