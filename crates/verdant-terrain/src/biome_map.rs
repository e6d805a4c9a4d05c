//! Per-chunk Voronoi biome map.
//!
//! Every chunk-sized cell of the world owns `biomes_per_chunk` seeds whose
//! positions and biomes depend only on `(world_seed, cell_x, cell_z)`. A chunk's
//! map gathers the seeds of its own cell and the eight around it, which is enough
//! for every point inside the chunk to see the seeds that matter most. Neighbouring
//! chunks regenerate identical seeds for the cells they share, so biome regions line
//! up across chunk borders.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::seed::rng_from_hash;

/// Hashing context for biome seed cells.
const CONTEXT: &str = "biome_map";

/// A Voronoi site, in chunk-local coordinates (origin at the chunk centre).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoronoiSeed {
    pub x: f32,
    pub z: f32,
    pub biome_index: usize,
}

/// Errors from building or sampling a [`BiomeMap`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BiomeMapError {
    #[error("sample ({x}, {z}) lies outside the chunk (half extent {half_extent})")]
    OutOfBounds { x: f32, z: f32, half_extent: f32 },
    #[error("biome weight {weight} at index {index} is negative or not finite")]
    InvalidWeight { index: usize, weight: f32 },
    #[error("no biome has a positive weight")]
    NoPositiveWeight,
    #[error("biomes per chunk must be at least 1")]
    NoSeeds,
    #[error("chunk size {0} must be positive and finite")]
    InvalidChunkSize(f32),
}

/// Draws biome indices in proportion to their weights.
///
/// Uses prefix sums and a binary search for the first sum strictly above the draw,
/// so zero-weight biomes can never be selected.
#[derive(Clone, Debug)]
pub struct WeightedPicker {
    prefix: Vec<f64>,
    last_positive: usize,
}

impl WeightedPicker {
    /// Builds the prefix sums, rejecting negative, non-finite or all-zero weights.
    pub fn new(weights: &[f32]) -> Result<Self, BiomeMapError> {
        let mut prefix = Vec::with_capacity(weights.len());
        let mut total = 0.0f64;
        let mut last_positive = None;
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(BiomeMapError::InvalidWeight { index, weight });
            }
            if weight > 0.0 {
                last_positive = Some(index);
            }
            total += f64::from(weight);
            prefix.push(total);
        }
        let last_positive = last_positive.ok_or(BiomeMapError::NoPositiveWeight)?;
        Ok(Self {
            prefix,
            last_positive,
        })
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    /// Draws one biome index.
    pub fn pick(&self, rng: &mut impl Rng) -> usize {
        let draw = rng.random::<f64>() * self.total();
        let index = self.prefix.partition_point(|&sum| sum <= draw);
        // Rounding can push the draw onto the total itself.
        if index >= self.prefix.len() {
            self.last_positive
        } else {
            index
        }
    }
}

/// Seeds around one chunk plus the parameters needed to blend them.
#[derive(Clone, Debug)]
pub struct BiomeMap {
    chunk_size: f32,
    biome_count: usize,
    seeds: Vec<VoronoiSeed>,
}

impl BiomeMap {
    /// Build the map for chunk `(chunk_x, chunk_z)`.
    ///
    /// `weights` holds one spawn weight per biome, in biome-index order.
    pub fn new(
        world_seed: i32,
        chunk_x: i32,
        chunk_z: i32,
        chunk_size: f32,
        weights: &[f32],
        biomes_per_chunk: usize,
    ) -> Result<Self, BiomeMapError> {
        if !chunk_size.is_finite() || chunk_size <= 0.0 {
            return Err(BiomeMapError::InvalidChunkSize(chunk_size));
        }
        if biomes_per_chunk == 0 {
            return Err(BiomeMapError::NoSeeds);
        }
        let picker = WeightedPicker::new(weights)?;

        let mut seeds = Vec::with_capacity(9 * biomes_per_chunk);
        for dz in -1..=1 {
            for dx in -1..=1 {
                let mut rng = cell_rng(world_seed, chunk_x + dx, chunk_z + dz);
                for _ in 0..biomes_per_chunk {
                    let u: f32 = rng.random();
                    let v: f32 = rng.random();
                    seeds.push(VoronoiSeed {
                        x: (dx as f32 + u - 0.5) * chunk_size,
                        z: (dz as f32 + v - 0.5) * chunk_size,
                        biome_index: picker.pick(&mut rng),
                    });
                }
            }
        }

        Ok(Self {
            chunk_size,
            biome_count: weights.len(),
            seeds,
        })
    }

    /// All seeds: the centre cell and its eight neighbours, row by row from `-z`.
    pub fn seeds(&self) -> &[VoronoiSeed] {
        &self.seeds
    }

    /// Number of biomes, i.e. the length of every weight vector.
    pub fn biome_count(&self) -> usize {
        self.biome_count
    }

    /// Edge length of the chunk this map was built for.
    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    fn check_bounds(&self, x: f32, z: f32) -> Result<(), BiomeMapError> {
        let half_extent = self.chunk_size * 0.5;
        // Written so that NaN also fails.
        if x.abs() <= half_extent && z.abs() <= half_extent {
            Ok(())
        } else {
            Err(BiomeMapError::OutOfBounds { x, z, half_extent })
        }
    }

    /// Blended biome weights at chunk-local `(x, z)`, normalized to sum to one.
    pub fn sample(&self, x: f32, z: f32) -> Result<Vec<f32>, BiomeMapError> {
        let mut weights = vec![0.0; self.biome_count];
        self.sample_into(x, z, &mut weights)?;
        Ok(weights)
    }

    /// [`sample`](Self::sample) into a caller-provided buffer of length
    /// [`biome_count`](Self::biome_count).
    ///
    /// Each seed contributes `1 / (1 + d^6)` to its biome, with `d` the distance from
    /// `(x, z)` to the seed in chunk-local units. Biomes without seeds stay at exactly
    /// zero. If every contribution underflows, the nearest seed takes the full weight.
    pub fn sample_into(&self, x: f32, z: f32, weights: &mut [f32]) -> Result<(), BiomeMapError> {
        self.check_bounds(x, z)?;
        debug_assert_eq!(weights.len(), self.biome_count);
        weights.fill(0.0);

        let mut total = 0.0;
        for seed in &self.seeds {
            let contribution = falloff(seed.x - x, seed.z - z);
            weights[seed.biome_index] += contribution;
            total += contribution;
        }
        if total > 0.0 {
            for w in weights.iter_mut() {
                *w /= total;
            }
        } else {
            weights[self.nearest(x, z)] = 1.0;
        }
        Ok(())
    }

    /// Biome index of the closest seed to chunk-local `(x, z)`.
    pub fn sample_nearest(&self, x: f32, z: f32) -> Result<usize, BiomeMapError> {
        self.check_bounds(x, z)?;
        Ok(self.nearest(x, z))
    }

    fn nearest(&self, x: f32, z: f32) -> usize {
        let mut best = (f32::INFINITY, 0);
        for seed in &self.seeds {
            let d2 = (x - seed.x).powi(2) + (z - seed.z).powi(2);
            if d2 < best.0 {
                best = (d2, seed.biome_index);
            }
        }
        best.1
    }
}

/// Blend kernel `1 / (1 + (d²)³)` for a seed at offset `(dx, dz)`.
fn falloff(dx: f32, dz: f32) -> f32 {
    let d2 = dx * dx + dz * dz;
    1.0 / (1.0 + d2 * d2 * d2)
}

fn cell_rng(world_seed: i32, cell_x: i32, cell_z: i32) -> ChaCha8Rng {
    rng_from_hash(crate::multi_hash!(world_seed, cell_x, cell_z, CONTEXT))
}

/// Index of the first maximal weight.
pub fn dominant_index(weights: &[f32]) -> usize {
    let mut best = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w > weights[best] {
            best = i;
        }
    }
    best
}
