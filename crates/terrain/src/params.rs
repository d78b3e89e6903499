//! Data-driven terrain parameters.
//!
//! Every chunk build shares this parameter set. It is consumed when the
//! [`Terrain`](crate::streaming::Terrain) resource initializes; heightmaps
//! are immutable once generated, so later edits to the resource do not
//! reshape chunks that are already resident.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, GRID_SCALE, NOISE_FREQUENCY, NOISE_LACUNARITY,
    NOISE_OCTAVES, NOISE_PERSISTENCE, NOISE_SEED,
};
use crate::lod::LodPattern;

/// The in-process configuration for terrain streaming.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Cells per chunk along x at LOD 0.
    pub chunk_width: usize,
    /// Cells per chunk along z at LOD 0.
    pub chunk_depth: usize,
    /// Height amplitude in cell units; the world height range is
    /// `chunk_height * grid_scale` at every LOD.
    pub chunk_height: f32,
    /// World units per cell at LOD 0.
    pub grid_scale: f32,
    /// Base noise frequency at LOD 0, in cycles per cell.
    pub noise_frequency: f32,
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Basis noise seed; same seed, same terrain.
    pub seed: i32,
    /// Desired-LOD quadrant around the viewer, mirrored across both axes.
    pub lod_pattern: LodPattern,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            chunk_width: CHUNK_WIDTH,
            chunk_depth: CHUNK_DEPTH,
            chunk_height: CHUNK_HEIGHT,
            grid_scale: GRID_SCALE,
            noise_frequency: NOISE_FREQUENCY,
            octaves: NOISE_OCTAVES,
            lacunarity: NOISE_LACUNARITY,
            persistence: NOISE_PERSISTENCE,
            seed: NOISE_SEED,
            lod_pattern: LodPattern::default(),
        }
    }
}

impl TerrainParams {
    /// World-space chunk footprint along x; identical at every LOD, since
    /// each level doubles cell size while halving cell count.
    pub fn chunk_world_width(&self) -> f32 {
        self.chunk_width as f32 * self.grid_scale
    }

    /// World-space chunk footprint along z.
    pub fn chunk_world_depth(&self) -> f32 {
        self.chunk_depth as f32 * self.grid_scale
    }
}
