//! Barycentric height interpolation over a triangulated heightmap cell.

use crate::config::DEGENERATE_ELEVATION;
use crate::heightmap::Heightmap;

/// 2D cross product: the signed parallelogram area spanned by two planar
/// vectors.
#[inline]
fn cross2d(ux: f32, uz: f32, vx: f32, vz: f32) -> f32 {
    ux * vz - uz * vx
}

/// Interpolated elevation at chunk-local offset `(cx, cz)`, in world units
/// relative to the chunk corner.
///
/// The containing unit cell is split along its diagonal:
///
/// ```text
///     (x0,z0)------(x0+1,z0)        x
///        |  \   dx > dz  |
///        |    \          |
///        |      \        |
///        |  dx <= dz \   |
///     (x0,z0+1)----(x0+1,z0+1)
///        z
/// ```
///
/// `dx > dz` selects the triangle through `(x0+1, z0)`; everything else,
/// including points exactly on the diagonal, selects the triangle through
/// `(x0, z0+1)`. Weights are sub-triangle area ratios computed from 2D cross
/// products and sum to 1 by construction.
///
/// Out-of-range cells and non-finite arithmetic collapse to
/// [`DEGENERATE_ELEVATION`]; callers are expected to have resolved chunk
/// membership before sampling.
pub fn height_at(map: &Heightmap, grid_scale: f32, cx: f32, cz: f32) -> f32 {
    let x = cx / grid_scale;
    let z = cz / grid_scale;

    let x0 = x.floor();
    let z0 = z.floor();
    let dx = x - x0;
    let dz = z - z0;

    // Edge corner of the containing triangle; the origin and the far
    // (diagonal) corner are shared by both triangles.
    let (ex, ez) = if dx > dz { (1_i64, 0_i64) } else { (0_i64, 1_i64) };

    // Half a cross product is a sub-triangle area and the whole cell triangle
    // has area 1/2, so the cross products are the barycentric weights
    // directly. The weight of each corner comes from the triangle spanned by
    // the other two.
    let w_far = cross2d(ex as f32, ez as f32, dx, dz).abs();
    let w_edge = cross2d(1.0, 1.0, dx, dz).abs();
    let w_origin = 1.0 - w_far - w_edge;

    let x0 = x0 as i64;
    let z0 = z0 as i64;
    let (Some(y_origin), Some(y_far), Some(y_edge)) = (
        map.try_get(x0, z0),
        map.try_get(x0 + 1, z0 + 1),
        map.try_get(x0 + ex, z0 + ez),
    ) else {
        return DEGENERATE_ELEVATION;
    };

    let height = y_origin * w_origin + y_far * w_far + y_edge * w_edge;
    if height.is_finite() {
        height
    } else {
        DEGENERATE_ELEVATION
    }
}
