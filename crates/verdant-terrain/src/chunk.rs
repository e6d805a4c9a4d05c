//! Chunk mesh generation and the cross-chunk stitching pass.

use std::fmt;

use glam::Vec3;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use verdant_mesh::{SharedEdge, TerrainMesh, pair_mut, stitch_shared_edge};

use crate::biome_map::{BiomeMap, dominant_index};
use crate::error::TerrainError;
use crate::heightmap::{HeightmapId, HeightmapLibrary};

/// Integer chunk coordinates. Chunk `(x, z)` is centred on `(x * size, 0, z * size)`.
///
/// Ordering is by `x`, then `z`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing world position `(x, z)`.
    pub fn containing(x: f32, z: f32, chunk_size: f32) -> Self {
        Self {
            x: (x / chunk_size).round() as i32,
            z: (z / chunk_size).round() as i32,
        }
    }

    /// All coordinates of the `(2 * radius + 1)^2` grid centred on the origin, in order.
    pub fn grid(radius: u32) -> Vec<Self> {
        let r = radius as i32;
        (-r..=r)
            .flat_map(|x| (-r..=r).map(move |z| Self { x, z }))
            .collect()
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Everything a chunk needs from a validated terrain configuration.
#[derive(Clone, Debug)]
pub struct ChunkContext {
    pub world_seed: i32,
    pub chunk_size: f32,
    pub resolution: usize,
    pub biomes_per_chunk: usize,
    /// Spawn weight per biome index.
    pub weights: Vec<f32>,
    /// Heightmap per biome index.
    pub heightmaps: Vec<HeightmapId>,
    /// Library with per-heightmap seeds already applied.
    pub library: HeightmapLibrary,
}

/// One generated chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub mesh: TerrainMesh,
    chunk_size: f32,
}

impl Chunk {
    /// World-space centre of the chunk; mesh positions are relative to it.
    pub fn origin(&self) -> Vec3 {
        Vec3::new(
            self.coord.x as f32 * self.chunk_size,
            0.0,
            self.coord.z as f32 * self.chunk_size,
        )
    }

    /// Edge length in world units.
    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// World-space position of vertex `index`.
    pub fn world_position(&self, index: usize) -> Vec3 {
        Vec3::from(self.mesh.positions[index]) + self.origin()
    }

    /// Dominant biome index stored for vertex `index`.
    pub fn dominant_biome(&self, index: usize) -> usize {
        self.mesh.biome_index(index)
    }

    /// Index of the grid vertex closest to world `(x, z)`, clamped to the chunk.
    pub fn nearest_vertex(&self, x: f32, z: f32) -> usize {
        let origin = self.origin();
        let last = self.mesh.resolution() - 1;
        let to_grid = |world: f32, centre: f32| {
            let u = (world - centre) / self.chunk_size + 0.5;
            ((u * last as f32).round().max(0.0) as usize).min(last)
        };
        self.mesh
            .vertex_index(to_grid(x, origin.x), to_grid(z, origin.z))
    }
}

/// Builds the mesh of one chunk.
///
/// Heights blend every biome with non-zero weight; the stored biome index is the
/// first maximal weight. Normals are computed from the unstitched heights and are
/// refreshed by [`stitch_chunks`].
pub fn generate_chunk(ctx: &ChunkContext, coord: ChunkCoord) -> Result<Chunk, TerrainError> {
    if ctx.resolution < 2 {
        return Err(TerrainError::InvalidResolution(ctx.resolution));
    }
    let map = BiomeMap::new(
        ctx.world_seed,
        coord.x,
        coord.z,
        ctx.chunk_size,
        &ctx.weights,
        ctx.biomes_per_chunk,
    )?;

    let res = ctx.resolution;
    let size = ctx.chunk_size;
    let half = size * 0.5;
    let step = (res - 1) as f32;
    let origin_x = coord.x as f32 * size;
    let origin_z = coord.z as f32 * size;

    let mut mesh = TerrainMesh::with_resolution(res);
    let mut weights = vec![0.0; ctx.weights.len()];
    let mut lookup_failed = false;

    for j in 0..res {
        let v = j as f32 / step;
        let local_z = v * size - half;
        for i in 0..res {
            let u = i as f32 / step;
            let local_x = u * size - half;
            map.sample_into(local_x, local_z, &mut weights)?;

            let (world_x, world_z) = (origin_x + local_x, origin_z + local_z);
            let mut height = 0.0;
            for (biome, &weight) in weights.iter().enumerate() {
                if weight == 0.0 {
                    continue;
                }
                match ctx.library.get_height(ctx.heightmaps[biome], world_x, world_z) {
                    Ok(h) => height += weight * h,
                    Err(err) => {
                        if !lookup_failed {
                            log::error!("Chunk {coord}: height lookup for biome index {biome} failed: {err}");
                            lookup_failed = true;
                        }
                    }
                }
            }
            mesh.push_vertex([local_x, height, local_z], [u, v], dominant_index(&weights));
        }
    }

    mesh.triangulate_grid();
    mesh.recompute_normals();
    log::trace!("Generated chunk {coord}: {} vertices", mesh.vertex_count());

    Ok(Chunk {
        coord,
        mesh,
        chunk_size: size,
    })
}

/// Averages border heights of every pair of adjacent chunks, then recomputes normals.
///
/// All east-west pairs are stitched before any north-south pair, so a vertex shared
/// by four chunks ends up with the same height in all of them.
pub fn stitch_chunks(chunks: &mut [Chunk]) -> Result<usize, TerrainError> {
    let index: HashMap<ChunkCoord, usize> = chunks
        .iter()
        .enumerate()
        .map(|(i, c)| (c.coord, i))
        .collect();

    let mut stitched = 0;
    for (edge, dx, dz) in [(SharedEdge::East, 1, 0), (SharedEdge::North, 0, 1)] {
        for a in 0..chunks.len() {
            let coord = chunks[a].coord;
            let Some(&b) = index.get(&ChunkCoord::new(coord.x + dx, coord.z + dz)) else {
                continue;
            };
            let (first, second) = pair_mut(chunks, a, b)?;
            stitched += stitch_shared_edge(&mut first.mesh, &mut second.mesh, edge)?;
        }
    }

    for chunk in chunks.iter_mut() {
        chunk.mesh.recompute_normals();
    }
    Ok(stitched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightmap::Heightmap;

    fn context(resolution: usize, heightmaps: &[Heightmap], weights: &[f32]) -> ChunkContext {
        let mut library = HeightmapLibrary::new();
        let ids = heightmaps
            .iter()
            .enumerate()
            .map(|(i, hm)| library.add(format!("hm{i}"), hm.clone()))
            .collect();
        ChunkContext {
            world_seed: 17,
            chunk_size: 10.0,
            resolution,
            biomes_per_chunk: 3,
            weights: weights.to_vec(),
            heightmaps: ids,
            library,
        }
    }

    #[test]
    fn test_vertex_layout() {
        let ctx = context(5, &[Heightmap::flat(2.0)], &[1.0]);
        let chunk = generate_chunk(&ctx, ChunkCoord::new(1, -1)).unwrap();
        let mesh = &chunk.mesh;
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.triangle_count(), 32);
        assert_eq!(mesh.positions[0], [-5.0, 2.0, -5.0]);
        assert_eq!(mesh.positions[mesh.vertex_index(4, 0)], [5.0, 2.0, -5.0]);
        assert_eq!(mesh.positions[mesh.vertex_index(0, 4)], [-5.0, 2.0, 5.0]);
        assert_eq!(mesh.uvs[mesh.vertex_index(2, 4)], [0.5, 1.0]);
        assert_eq!(chunk.origin(), Vec3::new(10.0, 0.0, -10.0));
        assert_eq!(chunk.world_position(0), Vec3::new(5.0, 2.0, -15.0));
    }

    #[test]
    fn test_single_biome_height_is_exact() {
        let ctx = context(4, &[Heightmap::sinusoidal(3.0, 7.0)], &[1.0]);
        let chunk = generate_chunk(&ctx, ChunkCoord::new(0, 0)).unwrap();
        for (index, p) in chunk.mesh.positions.iter().enumerate() {
            let expected = ctx.library.get_height(ctx.heightmaps[0], p[0], p[2]).unwrap();
            assert!((p[1] - expected).abs() < 1e-5, "Vertex {index}: {} vs {expected}", p[1]);
            assert_eq!(chunk.dominant_biome(index), 0);
        }
    }

    #[test]
    fn test_zero_weight_biome_never_dominant() {
        let ctx = context(
            10,
            &[Heightmap::flat(0.0), Heightmap::flat(10.0), Heightmap::flat(1000.0)],
            &[100.0, 100.0, 0.0],
        );
        let chunk = generate_chunk(&ctx, ChunkCoord::new(0, 0)).unwrap();
        for index in 0..chunk.mesh.vertex_count() {
            assert_ne!(chunk.dominant_biome(index), 2);
            let h = chunk.mesh.positions[index][1];
            assert!((0.0..=10.0 + 1e-3).contains(&h), "Zero-weight heightmap leaked: {h}");
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let ctx = context(8, &[Heightmap::perlin(20.0, 10.0), Heightmap::simplex(5.0, 3.0)], &[1.0, 2.0]);
        let a = generate_chunk(&ctx, ChunkCoord::new(2, 3)).unwrap();
        let b = generate_chunk(&ctx, ChunkCoord::new(2, 3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_failed_lookup_degrades_to_zero() {
        let ctx = context(3, &[Heightmap::Image(Default::default())], &[1.0]);
        let chunk = generate_chunk(&ctx, ChunkCoord::new(0, 0)).unwrap();
        assert!(chunk.mesh.positions.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn test_nearest_vertex() {
        let ctx = context(11, &[Heightmap::flat(0.0)], &[1.0]);
        let chunk = generate_chunk(&ctx, ChunkCoord::new(1, 0)).unwrap();
        // Chunk (1, 0) spans x in [5, 15], z in [-5, 5] with 1-unit spacing.
        assert_eq!(chunk.nearest_vertex(10.0, 0.0), chunk.mesh.vertex_index(5, 5));
        assert_eq!(chunk.nearest_vertex(5.2, -4.9), chunk.mesh.vertex_index(0, 0));
        assert_eq!(chunk.nearest_vertex(100.0, 100.0), chunk.mesh.vertex_index(10, 10));
    }

    #[test]
    fn test_containing_chunk() {
        assert_eq!(ChunkCoord::containing(0.0, 0.0, 10.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::containing(14.9, -5.1, 10.0), ChunkCoord::new(1, -1));
    }

    #[test]
    fn test_grid_coordinates() {
        assert_eq!(ChunkCoord::grid(0), vec![ChunkCoord::new(0, 0)]);
        let grid = ChunkCoord::grid(1);
        assert_eq!(grid.len(), 9);
        let mut sorted = grid.clone();
        sorted.sort();
        assert_eq!(grid, sorted, "Grid is produced in coordinate order");
    }

    #[test]
    fn test_stitching_makes_borders_agree() {
        let ctx = context(6, &[Heightmap::perlin(30.0, 4.0), Heightmap::sinusoidal(8.0, 2.0)], &[1.0, 1.0]);
        let mut chunks: Vec<Chunk> = ChunkCoord::grid(1)
            .into_iter()
            .map(|c| generate_chunk(&ctx, c).unwrap())
            .collect();
        let stitched = stitch_chunks(&mut chunks).unwrap();
        // 6 east-west and 6 north-south shared edges of 6 vertices each.
        assert_eq!(stitched, 12 * 6);

        let find = |x, z| chunks.iter().find(|c| c.coord == ChunkCoord::new(x, z)).unwrap();
        let last = 5;
        for (x, z) in [(-1, -1), (0, 0), (-1, 1)] {
            let (a, b) = (find(x, z), find(x + 1, z));
            for k in 0..=last {
                assert_eq!(a.mesh.height(last, k), b.mesh.height(0, k));
            }
        }
        for (x, z) in [(-1, -1), (0, 0), (1, -1)] {
            let (a, b) = (find(x, z), find(x, z + 1));
            for k in 0..=last {
                assert_eq!(a.mesh.height(k, last), b.mesh.height(k, 0));
            }
        }
        // Centre vertex shared by chunks (0,0), (1,0), (0,1), (1,1).
        let h = find(0, 0).mesh.height(last, last);
        assert_eq!(find(1, 0).mesh.height(0, last), h);
        assert_eq!(find(0, 1).mesh.height(last, 0), h);
        assert_eq!(find(1, 1).mesh.height(0, 0), h);
    }
}
