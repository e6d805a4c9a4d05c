//! 2D simplex noise over the fixed lattice table.

use serde::{Deserialize, Serialize};

use super::lattice::{PERMUTATION, gradient_dot, seed_offsets};

/// Skew factor `(sqrt(3) - 1) / 2`.
const F2: f32 = 0.366_025_42;
/// Unskew factor `(3 - sqrt(3)) / 6`.
const G2: f32 = 0.211_324_87;

/// Simplex-noise heightmap with the same parameters and seeding as the Perlin one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexHeightmap {
    pub amplitude: f32,
    pub scale: f32,
    #[serde(skip)]
    offset_x: f32,
    #[serde(skip)]
    offset_z: f32,
}

impl Default for SimplexHeightmap {
    fn default() -> Self {
        Self {
            amplitude: 10.0,
            scale: 10.0,
            offset_x: 0.0,
            offset_z: 0.0,
        }
    }
}

impl SimplexHeightmap {
    /// Simplex noise of `amplitude`, stretched over `scale` world units.
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

    pub fn get_height(&self, x: f32, z: f32) -> f32 {
        let nx = (x + self.offset_x) / self.scale;
        let nz = (z + self.offset_z) / self.scale;
        self.amplitude * simplex_2d(nx, nz)
    }
}

#[inline]
fn corner(hash: u8, x: f32, z: f32) -> f32 {
    let t = 0.5 - x * x - z * z;
    if t < 0.0 {
        0.0
    } else {
        let t2 = t * t;
        t2 * t2 * gradient_dot(hash, x, z)
    }
}

/// Raw simplex noise in roughly `[-1, 1]`.
pub(crate) fn simplex_2d(x: f32, z: f32) -> f32 {
    let s = (x + z) * F2;
    let i = (x + s).floor();
    let j = (z + s).floor();
    let t = (i + j) * G2;
    let x0 = x - (i - t);
    let z0 = z - (j - t);

    // Which of the two triangles of the skewed cell we are in.
    let (i1, j1) = if x0 > z0 { (1, 0) } else { (0, 1) };

    let x1 = x0 - i1 as f32 + G2;
    let z1 = z0 - j1 as f32 + G2;
    let x2 = x0 - 1.0 + 2.0 * G2;
    let z2 = z0 - 1.0 + 2.0 * G2;

    let ii = (i as i32 & 255) as usize;
    let jj = (j as i32 & 255) as usize;
    let p = &PERMUTATION;
    let h0 = p[ii + p[jj] as usize];
    let h1 = p[ii + i1 + p[jj + j1] as usize];
    let h2 = p[ii + 1 + p[jj + 1] as usize];

    70.0 * (corner(h0, x0, z0) + corner(h1, x1, z1) + corner(h2, x2, z2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_bounded() {
        for i in 0..500 {
            let x = i as f32 * 0.137 - 20.0;
            let z = i as f32 * 0.419 - 80.0;
            let n = simplex_2d(x, z);
            assert!(n.abs() <= 1.0, "Simplex sample {n} outside [-1, 1] at ({x}, {z})");
        }
    }

    #[test]
    fn test_same_seed_same_heights() {
        let mut a = SimplexHeightmap::default();
        let mut b = SimplexHeightmap::default();
        a.set_seed(7);
        b.set_seed(7);
        assert_eq!(a.get_height(1.0, 1.0), b.get_height(1.0, 1.0));
    }

    #[test]
    fn test_different_seeds_different_heights() {
        let mut a = SimplexHeightmap::default();
        let mut b = SimplexHeightmap::default();
        a.set_seed(1);
        b.set_seed(2);
        assert_ne!(
            a.get_height(1.3, 1.7),
            b.get_height(1.3, 1.7),
            "Seeds 1 and 2 should produce different heights"
        );
    }

    #[test]
    fn test_amplitude_scales_output() {
        let unit = SimplexHeightmap::new(1.0, 10.0);
        let tall = SimplexHeightmap::new(5.0, 10.0);
        let (x, z) = (12.3, -4.5);
        assert!((tall.get_height(x, z) - 5.0 * unit.get_height(x, z)).abs() < 1e-4);
    }
}
