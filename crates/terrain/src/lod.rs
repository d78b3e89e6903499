//! Desired-LOD pattern around the viewer.

use serde::{Deserialize, Serialize};

/// One mirrored pattern entry: lattice offset from the center chunk and the
/// level desired there. A negative `lod` means "no chunk should exist here".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodTarget {
    pub di: i32,
    pub dj: i32,
    pub lod: i32,
}

/// Quadrant of desired LOD levels around the viewer's chunk.
///
/// `rows[dj][di]` is the level desired `di` chunks along +x and `dj` chunks
/// along +z of the center; the quadrant is mirrored across both axes, so a
/// 3x3 pattern governs a 5x5 chunk neighborhood. Level 0 is full resolution
/// and each increment halves it; negative entries force a cleared cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodPattern {
    pub rows: Vec<Vec<i32>>,
}

impl Default for LodPattern {
    /// Full detail in a two-chunk core, one coarser ring beyond.
    fn default() -> Self {
        Self {
            rows: vec![vec![0, 0, 1], vec![0, 0, 1], vec![1, 1, 1]],
        }
    }
}

impl LodPattern {
    /// Enumerate the mirrored targets explicitly: every non-zero axis offset
    /// appears in both signs, and the center row/column is emitted only once.
    pub fn targets(&self) -> Vec<LodTarget> {
        let mut targets = Vec::new();
        for (dj, row) in self.rows.iter().enumerate() {
            for (di, &lod) in row.iter().enumerate() {
                let di = di as i32;
                let dj = dj as i32;
                targets.push(LodTarget { di, dj, lod });
                if di != 0 {
                    targets.push(LodTarget { di: -di, dj, lod });
                }
                if dj != 0 {
                    targets.push(LodTarget { di, dj: -dj, lod });
                }
                if di != 0 && dj != 0 {
                    targets.push(LodTarget { di: -di, dj: -dj, lod });
                }
            }
        }
        targets
    }
}
