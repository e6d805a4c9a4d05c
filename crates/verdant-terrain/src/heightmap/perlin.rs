//! Classic 2D Perlin gradient noise over the fixed lattice table.

use serde::{Deserialize, Serialize};

use super::lattice::{PERMUTATION, gradient_dot, seed_offsets};

/// Perlin-noise heightmap: `amplitude * noise((x + offset_x) / scale, (z + offset_z) / scale)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerlinHeightmap {
    /// Peak height contribution.
    pub amplitude: f32,
    /// Horizontal stretch of the noise field.
    pub scale: f32,
    #[serde(skip)]
    offset_x: f32,
    #[serde(skip)]
    offset_z: f32,
}

impl Default for PerlinHeightmap {
    fn default() -> Self {
        Self {
            amplitude: 100.0,
            scale: 10.0,
            offset_x: 0.0,
            offset_z: 0.0,
        }
    }
}

impl PerlinHeightmap {
    /// Perlin noise of `amplitude`, one lattice cell per `scale` world units.
    pub fn new(amplitude: f32, scale: f32) -> Self {
        Self {
            amplitude,
            scale,
            ..Default::default()
        }
    }

    /// Shift the sample origin by a seed-derived offset.
    pub fn set_seed(&mut self, seed: i32) {
        (self.offset_x, self.offset_z) = seed_offsets(seed);
    }

    /// Noise at `(x, z)` scaled by `amplitude`.
    pub fn get_height(&self, x: f32, z: f32) -> f32 {
        let nx = (x + self.offset_x) / self.scale;
        let nz = (z + self.offset_z) / self.scale;
        self.amplitude * perlin_2d(nx, nz)
    }
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

/// Raw noise in roughly `[-1, 1]`; exactly zero on integer lattice points.
pub(crate) fn perlin_2d(x: f32, z: f32) -> f32 {
    let x0 = x.floor();
    let z0 = z.floor();
    let dx = x - x0;
    let dz = z - z0;
    let xi = (x0 as i32 & 255) as usize;
    let zi = (z0 as i32 & 255) as usize;

    let p = &PERMUTATION;
    let a = p[xi] as usize + zi;
    let b = p[xi + 1] as usize + zi;

    let n00 = gradient_dot(p[a], dx, dz);
    let n01 = gradient_dot(p[a + 1], dx, dz - 1.0);
    let n10 = gradient_dot(p[b], dx - 1.0, dz);
    let n11 = gradient_dot(p[b + 1], dx - 1.0, dz - 1.0);

    let u = fade(dx);
    let v = fade(dz);
    lerp(v, lerp(u, n00, n10), lerp(u, n01, n11))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_on_lattice_points() {
        for (x, z) in [(0.0, 0.0), (3.0, -7.0), (-128.0, 255.0)] {
            assert_eq!(perlin_2d(x, z), 0.0, "Noise must vanish at lattice ({x}, {z})");
        }
    }

    #[test]
    fn test_output_bounded() {
        let noise = PerlinHeightmap::new(1.0, 1.0);
        for i in 0..400 {
            let x = i as f32 * 0.173 - 30.0;
            let z = i as f32 * 0.291 - 50.0;
            let h = noise.get_height(x, z);
            assert!(h.abs() <= 1.0 + 1e-5, "Perlin sample {h} outside [-1, 1] at ({x}, {z})");
        }
    }

    #[test]
    fn test_same_seed_same_heights() {
        let mut a = PerlinHeightmap::default();
        let mut b = PerlinHeightmap::default();
        a.set_seed(42);
        b.set_seed(42);
        assert_eq!(a.get_height(3.3, 7.7), b.get_height(3.3, 7.7));
    }

    #[test]
    fn test_different_seeds_different_heights() {
        let mut a = PerlinHeightmap::default();
        let mut b = PerlinHeightmap::default();
        a.set_seed(0);
        b.set_seed(1);
        assert_ne!(
            a.get_height(3.3, 7.7),
            b.get_height(3.3, 7.7),
            "Seeds 0 and 1 should shift the noise field"
        );
    }

    #[test]
    fn test_continuous() {
        let noise = PerlinHeightmap::new(10.0, 10.0);
        let step = 0.01;
        for i in 0..2000 {
            let x = i as f32 * step;
            let delta = (noise.get_height(x + step, 4.5) - noise.get_height(x, 4.5)).abs();
            assert!(delta < 0.1, "Jump of {delta} at x={x}");
        }
    }
}
