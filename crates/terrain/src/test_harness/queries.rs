//! Read-only accessors over the harness world.

use crate::chunk::Chunk;
use crate::streaming::{GridIndex, Terrain, TerrainStats};

use super::{ChunkEventLog, TestTerrain};

impl TestTerrain {
    pub fn terrain(&self) -> &Terrain {
        self.app.world().resource::<Terrain>()
    }

    pub fn stats(&self) -> TerrainStats {
        *self.app.world().resource::<TerrainStats>()
    }

    pub fn events(&self) -> &ChunkEventLog {
        self.app.world().resource::<ChunkEventLog>()
    }

    /// Interpolated world height under `(x, z)` against resident chunks.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.terrain().get_height(x, z)
    }

    pub fn resident_count(&self) -> usize {
        self.terrain().resident_count()
    }

    pub fn chunk_at(&self, i: i32, j: i32) -> Option<&Chunk> {
        self.terrain().chunk_at(GridIndex { i, j })
    }

    /// Number of pattern targets with a non-negative desired LOD — the
    /// resident count a settled stationary sweep converges to.
    pub fn buildable_targets(&self) -> usize {
        self.terrain()
            .targets()
            .iter()
            .filter(|target| target.lod >= 0)
            .count()
    }
}
