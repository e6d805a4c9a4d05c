//! Terrain chunk mesh: a regular vertex grid with per-vertex biome data and triangle indices.

use glam::Vec3;

/// Mesh output for a single terrain chunk.
///
/// Vertices are laid out row-major on a `resolution x resolution` grid: the vertex
/// at column `i` (along +X) and row `j` (along +Z) lives at index `j * resolution + i`.
/// All attribute buffers are parallel to `positions`.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMesh {
    /// Vertices per side of the grid.
    resolution: usize,
    /// Positions in chunk-local coordinates (origin at the chunk centre).
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, recomputed from the triangle topology.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates in `[0, 1]` across the chunk.
    pub uvs: Vec<[f32; 2]>,
    /// Secondary UV channel: `x` carries the dominant biome index, `y` is unused.
    pub biome_uvs: Vec<[f32; 2]>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Creates an empty mesh for a grid with `resolution` vertices per side.
    pub fn with_resolution(resolution: usize) -> Self {
        let count = resolution * resolution;
        Self {
            resolution,
            positions: Vec::with_capacity(count),
            normals: Vec::with_capacity(count),
            uvs: Vec::with_capacity(count),
            biome_uvs: Vec::with_capacity(count),
            indices: Vec::new(),
        }
    }

    /// Vertices per side of the grid.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Appends a vertex. Vertices must be pushed in row-major order.
    pub fn push_vertex(&mut self, position: [f32; 3], uv: [f32; 2], biome_index: usize) {
        self.positions.push(position);
        self.uvs.push(uv);
        self.biome_uvs.push([biome_index as f32, 0.0]);
        self.normals.push([0.0, 1.0, 0.0]);
    }

    /// Buffer index of the grid vertex at column `i`, row `j`.
    #[inline]
    pub fn vertex_index(&self, i: usize, j: usize) -> usize {
        j * self.resolution + i
    }

    /// Height (`y`) of the grid vertex at column `i`, row `j`.
    pub fn height(&self, i: usize, j: usize) -> f32 {
        self.positions[self.vertex_index(i, j)][1]
    }

    /// Overwrites the height of the grid vertex at column `i`, row `j`.
    pub fn set_height(&mut self, i: usize, j: usize, height: f32) {
        let idx = self.vertex_index(i, j);
        self.positions[idx][1] = height;
    }

    /// Dominant biome index stored in the secondary UV channel of a vertex.
    pub fn biome_index(&self, vertex: usize) -> usize {
        self.biome_uvs[vertex][0] as usize
    }

    /// Emits two triangles per grid cell.
    ///
    /// Winding is counter-clockwise when viewed from +Y, so the recomputed
    /// normals of a flat grid point straight up.
    pub fn triangulate_grid(&mut self) {
        self.indices.clear();
        if self.resolution < 2 {
            return;
        }
        let cells = self.resolution - 1;
        self.indices.reserve(cells * cells * 6);
        for j in 0..cells {
            for i in 0..cells {
                let a = self.vertex_index(i, j) as u32;
                let b = self.vertex_index(i + 1, j) as u32;
                let c = self.vertex_index(i, j + 1) as u32;
                let d = self.vertex_index(i + 1, j + 1) as u32;
                self.indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
    }

    /// Recomputes vertex normals as the area-weighted sum of adjacent face normals.
    pub fn recompute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let a = Vec3::from(self.positions[ia]);
            let b = Vec3::from(self.positions[ib]);
            let c = Vec3::from(self.positions[ic]);
            // Unnormalized cross product: length is twice the triangle area.
            let face = (b - a).cross(c - a);
            accum[ia] += face;
            accum[ib] += face;
            accum[ic] += face;
        }
        self.normals = accum
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(resolution: usize) -> TerrainMesh {
        let mut mesh = TerrainMesh::with_resolution(resolution);
        for j in 0..resolution {
            for i in 0..resolution {
                mesh.push_vertex([i as f32, 0.0, j as f32], [0.0, 0.0], 0);
            }
        }
        mesh.triangulate_grid();
        mesh
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = TerrainMesh::with_resolution(4);
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_grid_triangle_count() {
        let mesh = flat_grid(5);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.triangle_count(), 4 * 4 * 2);
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = flat_grid(6);
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_flat_grid_normals_point_up() {
        let mut mesh = flat_grid(4);
        mesh.recompute_normals();
        for n in &mesh.normals {
            assert!(
                (Vec3::from(*n) - Vec3::Y).length() < 1e-6,
                "Flat grid normal should be +Y, got {n:?}"
            );
        }
    }

    #[test]
    fn test_sloped_grid_normals_tilt_away_from_slope() {
        let mut mesh = TerrainMesh::with_resolution(3);
        for j in 0..3 {
            for i in 0..3 {
                // Height rises along +X.
                mesh.push_vertex([i as f32, i as f32, j as f32], [0.0, 0.0], 0);
            }
        }
        mesh.triangulate_grid();
        mesh.recompute_normals();
        let n = Vec3::from(mesh.normals[mesh.vertex_index(1, 1)]);
        assert!(n.x < 0.0, "Normal should lean toward -X on a +X slope: {n:?}");
        assert!(n.y > 0.0);
    }

    #[test]
    fn test_height_accessors() {
        let mut mesh = flat_grid(3);
        mesh.set_height(2, 1, 7.5);
        assert_eq!(mesh.height(2, 1), 7.5);
        assert_eq!(mesh.positions[mesh.vertex_index(2, 1)][1], 7.5);
    }

    #[test]
    fn test_biome_index_round_trips_through_uv2() {
        let mut mesh = TerrainMesh::with_resolution(2);
        mesh.push_vertex([0.0; 3], [0.0, 0.0], 3);
        assert_eq!(mesh.biome_index(0), 3);
        assert_eq!(mesh.biome_uvs[0], [3.0, 0.0]);
    }

    #[test]
    fn test_resolution_below_two_has_no_triangles() {
        let mut mesh = TerrainMesh::with_resolution(1);
        mesh.push_vertex([0.0; 3], [0.0, 0.0], 0);
        mesh.triangulate_grid();
        assert_eq!(mesh.triangle_count(), 0);
    }
}
