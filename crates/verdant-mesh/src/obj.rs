//! Plain-text Wavefront-style export of terrain meshes.
//!
//! Emits `v`, `vn`, `vt`, one `vt2` line per secondary UV, and `f a/a/a b/b/b c/c/c`
//! faces (1-based, position/uv/normal share the same index).

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::chunk_mesh::TerrainMesh;

/// Errors that can occur while exporting a mesh.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The target path does not end in `.obj`.
    #[error("invalid file format: {0} must end with .obj")]
    InvalidExtension(PathBuf),

    /// Creating or writing the file failed.
    #[error("failed to export mesh: {0}")]
    Io(#[from] io::Error),
}

/// Writes a mesh in OBJ text form to any writer.
pub fn write_obj<W: Write>(mesh: &TerrainMesh, out: &mut W) -> io::Result<()> {
    for [x, y, z] in &mesh.positions {
        writeln!(out, "v {x} {y} {z}")?;
    }
    for [x, y, z] in &mesh.normals {
        writeln!(out, "vn {x} {y} {z}")?;
    }
    for [u, v] in &mesh.uvs {
        writeln!(out, "vt {u} {v}")?;
    }
    for [u, v] in &mesh.biome_uvs {
        writeln!(out, "vt2 {u} {v}")?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
        writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    Ok(())
}

/// Renders a mesh to an OBJ string.
pub fn to_obj_string(mesh: &TerrainMesh) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec<u8> cannot fail.
    let _ = write_obj(mesh, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Exports a mesh to `path`, which must carry an `.obj` extension.
pub fn export_obj(mesh: &TerrainMesh, path: &Path) -> Result<(), ExportError> {
    let is_obj = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("obj"));
    if !is_obj {
        log::error!(
            "Invalid file format for {}: path must end with .obj",
            path.display()
        );
        return Err(ExportError::InvalidExtension(path.to_path_buf()));
    }

    let file = std::fs::File::create(path).inspect_err(|e| {
        log::error!("Failed to export mesh to {}: {e}", path.display());
    })?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, &mut writer)?;
    writer.flush()?;
    log::debug!(
        "Exported {} vertices / {} triangles to {}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        path.display()
    );
    Ok(())
}
