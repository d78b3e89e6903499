//! One terrain tile: LOD-derived dimensions, world placement, and height
//! queries against an immutable heightmap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::heightmap::Heightmap;
use crate::noise::FbmSampler;
use crate::params::TerrainParams;
use crate::sampler;

static NEXT_CHUNK_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque chunk identity, unique per built instance. It outlives the chunk's
/// residency so the rendering collaborator can match removals to geometry it
/// created earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(u64);

impl ChunkId {
    fn next() -> Self {
        Self(NEXT_CHUNK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A single terrain tile, fully formed at construction: the heightmap is
/// generated in [`Chunk::generate`] and nothing is mutated afterwards.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: ChunkId,
    pub lod: u32,
    /// Cell count along x at this LOD (`chunk_width >> lod`).
    pub width: usize,
    /// Cell count along z at this LOD.
    pub depth: usize,
    /// World units per cell at this LOD (`grid_scale * 2^lod`).
    pub grid_scale: f32,
    /// Base noise frequency at this LOD (`noise_frequency * 2^lod`).
    pub frequency: f32,
    /// World-space center of the chunk footprint along x.
    pub offset_x: f32,
    /// World-space center of the chunk footprint along z.
    pub offset_z: f32,
    pub heightmap: Arc<Heightmap>,
}

impl Chunk {
    /// Build the chunk for lattice cell `(i, j)` at `lod`.
    ///
    /// Each LOD increment halves the cell count and doubles cell size and
    /// noise frequency, so every level covers the same world footprint with
    /// the same height range.
    pub fn generate(i: i32, j: i32, lod: u32, params: &TerrainParams) -> Self {
        let scale = (1_u32 << lod) as f32;
        let width = params.chunk_width >> lod;
        let depth = params.chunk_depth >> lod;
        let grid_scale = params.grid_scale * scale;
        let frequency = params.noise_frequency * scale;
        // (chunk_height / scale) cells of (grid_scale * scale) world units
        // each: the amplitude is LOD-invariant.
        let amplitude = params.chunk_height / scale * grid_scale;
        let offset_x = i as f32 * width as f32 * grid_scale;
        let offset_z = j as f32 * depth as f32 * grid_scale;

        let sampler = FbmSampler::new(
            params.seed,
            params.octaves,
            params.lacunarity,
            params.persistence,
        );
        let heightmap = Heightmap::generate(
            width,
            depth,
            &sampler,
            frequency,
            amplitude,
            offset_x / grid_scale,
            offset_z / grid_scale,
        );

        Self {
            id: ChunkId::next(),
            lod,
            width,
            depth,
            grid_scale,
            frequency,
            offset_x,
            offset_z,
            heightmap: Arc::new(heightmap),
        }
    }

    /// Interpolated elevation at world `(x, z)`.
    ///
    /// The footprint spans `offset ± half extent`; coordinates convert to
    /// chunk-local offsets before delegating to the barycentric sampler, and
    /// positions outside the footprint collapse to its sentinel.
    pub fn get_height(&self, world_x: f32, world_z: f32) -> f32 {
        let cx = world_x - self.offset_x + self.width as f32 * self.grid_scale * 0.5;
        let cz = world_z - self.offset_z + self.depth as f32 * self.grid_scale * 0.5;
        sampler::height_at(&self.heightmap, self.grid_scale, cx, cz)
    }
}
