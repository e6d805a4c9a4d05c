//! Edge stitching: hides seams between adjacent chunks by averaging the heights
//! of coincident border vertices.
//!
//! Each chunk samples world-continuous height functions independently, so shared
//! border vertices agree only up to floating-point evaluation order. Stitching runs
//! as a separate pass once every participating chunk has been generated, taking
//! mutable access to one pair of meshes at a time.

use crate::chunk_mesh::TerrainMesh;

/// Which border of chunk `a` touches chunk `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SharedEdge {
    /// `b` is the +X neighbour of `a`: `a`'s last column meets `b`'s first column.
    East,
    /// `b` is the +Z neighbour of `a`: `a`'s last row meets `b`'s first row.
    North,
}

/// Errors raised by the stitching pass.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StitchError {
    /// The two meshes do not share a vertex layout along the edge.
    #[error("cannot stitch meshes of resolution {a} and {b}")]
    ResolutionMismatch {
        /// Resolution of the first mesh.
        a: usize,
        /// Resolution of the second mesh.
        b: usize,
    },
    /// Both indices name the same mesh.
    #[error("cannot stitch mesh {0} to itself")]
    SameMesh(usize),
}

/// Averages the heights of coincident vertices along the shared edge and writes
/// the result into both meshes.
///
/// Returns the number of vertex pairs averaged.
pub fn stitch_shared_edge(
    a: &mut TerrainMesh,
    b: &mut TerrainMesh,
    edge: SharedEdge,
) -> Result<usize, StitchError> {
    let res = a.resolution();
    if res != b.resolution() {
        return Err(StitchError::ResolutionMismatch {
            a: res,
            b: b.resolution(),
        });
    }
    if res == 0 {
        return Ok(0);
    }
    let last = res - 1;

    for k in 0..res {
        let ((ai, aj), (bi, bj)) = match edge {
            SharedEdge::East => ((last, k), (0, k)),
            SharedEdge::North => ((k, last), (k, 0)),
        };
        let avg = (a.height(ai, aj) + b.height(bi, bj)) * 0.5;
        a.set_height(ai, aj, avg);
        b.set_height(bi, bj, avg);
    }

    Ok(res)
}

/// Borrows two distinct elements of a slice mutably.
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Result<(&mut T, &mut T), StitchError> {
    if a == b {
        return Err(StitchError::SameMesh(a));
    }
    if a < b {
        let (lo, hi) = items.split_at_mut(b);
        Ok((&mut lo[a], &mut hi[0]))
    } else {
        let (lo, hi) = items.split_at_mut(a);
        Ok((&mut hi[0], &mut lo[b]))
    }
}
