//! Terrain mesh buffers: grid triangulation, normal recomputation, edge stitching, and OBJ export.

pub mod chunk_mesh;
pub mod obj;
pub mod stitching;
pub mod vertex;

pub use chunk_mesh::TerrainMesh;
pub use obj::{ExportError, export_obj, to_obj_string, write_obj};
pub use stitching::{SharedEdge, StitchError, pair_mut, stitch_shared_edge};
pub use vertex::{TerrainVertex, index_bytes, interleave, vertex_bytes};
