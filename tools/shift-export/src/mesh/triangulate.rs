//! Polygon triangulation
//!
//! Polygons are fanned from their first corner: `(0, i, i + 1)` for every
//! consecutive edge. This is exact for convex planar polygons. Concave
//! polygons come out with overlapping triangles; that is a known limitation
//! and callers that need it must split such faces before export.

use crate::error::{AssemblyError, AssemblyResult};

/// Fan-triangulate a polygon, returning polygon-local corner indices
///
/// An `n`-gon yields `n - 2` triangles. Fewer than three points is an error.
pub fn triangulate<P>(polygon: &[P]) -> AssemblyResult<Vec<[u32; 3]>> {
    let n = polygon.len();
    if n < 3 {
        return Err(AssemblyError::DegeneratePolygon(n));
    }
    Ok((1..n as u32 - 1).map(|i| [0, i, i + 1]).collect())
}
