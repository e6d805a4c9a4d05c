//! Interleaved vertex view of a [`TerrainMesh`] for upload to a renderer.

use crate::chunk_mesh::TerrainMesh;

/// A single interleaved terrain vertex (40 bytes).
///
/// Layout:
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..24]` normal `[f32; 3]`
///   - `[24..32]` uv `[f32; 2]`
///   - `[32..40]` biome uv `[f32; 2]` (`x` = dominant biome index)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    /// Chunk-local position.
    pub position: [f32; 3],
    /// Vertex normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
    /// Secondary UV carrying the dominant biome index.
    pub biome_uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 40]);

/// Interleaves the parallel attribute buffers of a mesh.
pub fn interleave(mesh: &TerrainMesh) -> Vec<TerrainVertex> {
    (0..mesh.vertex_count())
        .map(|i| TerrainVertex {
            position: mesh.positions[i],
            normal: mesh.normals[i],
            uv: mesh.uvs[i],
            biome_uv: mesh.biome_uvs[i],
        })
        .collect()
}

/// Returns interleaved vertices as a byte slice.
pub fn vertex_bytes(vertices: &[TerrainVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Returns the index buffer as a byte slice.
pub fn index_bytes(mesh: &TerrainMesh) -> &[u8] {
    bytemuck::cast_slice(&mesh.indices)
}
