//! Chunk residency: the LOD sweep, asynchronous builds, and world height
//! queries.
//!
//! [`Terrain`] owns the resident chunk map and the pending-build latches.
//! Each tick [`stream_chunks`] reconciles the desired-LOD field around the
//! viewer with what is resident and schedules at most one build;
//! [`apply_finished_builds`] installs completed chunks and emits the
//! add/remove events the rendering collaborator consumes.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};

use crate::chunk::{Chunk, ChunkId};
use crate::config::UNLOADED_ELEVATION;
use crate::heightmap::Heightmap;
use crate::lod::LodTarget;
use crate::params::TerrainParams;

/// Lattice coordinates of a chunk in the unbounded grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub i: i32,
    pub j: i32,
}

/// Viewer world position, written by the input collaborator each tick. Only
/// `x` and `z` drive the sweep.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ViewerPosition(pub Vec3);

/// Streaming counters, for logs and tests.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct TerrainStats {
    pub builds_scheduled: u64,
    pub builds_completed: u64,
    pub builds_failed: u64,
    pub evictions: u64,
}

/// Sent once per newly resident chunk, carrying everything the rendering
/// collaborator needs to build geometry for it.
#[derive(Event, Debug, Clone)]
pub struct ChunkAdded {
    pub index: GridIndex,
    pub id: ChunkId,
    pub lod: u32,
    pub width: usize,
    pub depth: usize,
    pub grid_scale: f32,
    pub offset_x: f32,
    pub offset_z: f32,
    pub heightmap: Arc<Heightmap>,
}

impl ChunkAdded {
    fn describing(index: GridIndex, chunk: &Chunk) -> Self {
        Self {
            index,
            id: chunk.id,
            lod: chunk.lod,
            width: chunk.width,
            depth: chunk.depth,
            grid_scale: chunk.grid_scale,
            offset_x: chunk.offset_x,
            offset_z: chunk.offset_z,
            heightmap: Arc::clone(&chunk.heightmap),
        }
    }
}

/// Sent once when a chunk is evicted or superseded, so the rendering
/// collaborator can release its geometry.
#[derive(Event, Debug, Clone, Copy)]
pub struct ChunkRemoved {
    pub id: ChunkId,
}

/// An in-flight chunk build. The task resolves to `None` when the build
/// panicked instead of producing a chunk.
#[derive(Component)]
pub struct ChunkBuildTask {
    pub index: GridIndex,
    pub lod: u32,
    task: Task<Option<Chunk>>,
}

/// Chunk residency and the desired-LOD field.
///
/// Per [`GridIndex`] the lifecycle is Absent -> Pending -> Resident: at most
/// one build may be in flight per index, and `resident` and `pending` overlap
/// only while an old chunk awaits replacement at a different LOD.
#[derive(Resource)]
pub struct Terrain {
    pub params: TerrainParams,
    targets: Vec<LodTarget>,
    resident: HashMap<GridIndex, Chunk>,
    pending: HashSet<GridIndex>,
    /// Global single-build gate, set while any build is in flight. Chunk
    /// construction is the expensive step of the pipeline; one build at a
    /// time spreads the cost over many ticks instead of stalling one.
    build_gate: bool,
}

impl FromWorld for Terrain {
    fn from_world(world: &mut World) -> Self {
        let params = world
            .get_resource::<TerrainParams>()
            .cloned()
            .unwrap_or_default();
        Self::new(params)
    }
}

impl Terrain {
    pub fn new(params: TerrainParams) -> Self {
        let targets = params.lod_pattern.targets();
        Self {
            params,
            targets,
            resident: HashMap::new(),
            pending: HashSet::new(),
            build_gate: false,
        }
    }

    /// The lattice cell containing world `(x, z)`. Chunk `(0, 0)` is
    /// centered on the world origin, so cell boundaries sit at half-chunk
    /// offsets.
    pub fn grid_index_for(&self, x: f32, z: f32) -> GridIndex {
        let wx = self.params.chunk_world_width();
        let wz = self.params.chunk_world_depth();
        GridIndex {
            i: ((x + wx * 0.5) / wx).floor() as i32,
            j: ((z + wz * 0.5) / wz).floor() as i32,
        }
    }

    /// World `(x, z)` relative to the corner of chunk `index`, in world
    /// units: the pair a chunk's own sampler expects.
    pub fn chunk_local_offset(&self, x: f32, z: f32, index: GridIndex) -> (f32, f32) {
        let wx = self.params.chunk_world_width();
        let wz = self.params.chunk_world_depth();
        (
            x - wx * (index.i as f32 - 0.5),
            z - wz * (index.j as f32 - 0.5),
        )
    }

    /// Interpolated elevation at world `(x, z)`, or [`UNLOADED_ELEVATION`]
    /// when no chunk is resident there.
    pub fn get_height(&self, x: f32, z: f32) -> f32 {
        let index = self.grid_index_for(x, z);
        match self.resident.get(&index) {
            Some(chunk) => chunk.get_height(x, z),
            None => UNLOADED_ELEVATION,
        }
    }

    pub fn chunk_at(&self, index: GridIndex) -> Option<&Chunk> {
        self.resident.get(&index)
    }

    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    pub fn is_pending(&self, index: GridIndex) -> bool {
        self.pending.contains(&index)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// True when no build is in flight anywhere.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && !self.build_gate
    }

    /// The mirrored pattern entries a sweep applies around the center.
    pub fn targets(&self) -> &[LodTarget] {
        &self.targets
    }
}

/// Per-tick LOD sweep.
///
/// Walks the mirrored pattern around the viewer's chunk and reconciles every
/// target cell: evicts where the desired level is negative, keeps matching
/// residents, and schedules at most one asynchronous build per call. Runs
/// after [`apply_finished_builds`] so a completed build frees the gate for
/// the same tick's sweep.
pub fn stream_chunks(
    mut commands: Commands,
    viewer: Res<ViewerPosition>,
    mut terrain: ResMut<Terrain>,
    mut stats: ResMut<TerrainStats>,
    mut removed: EventWriter<ChunkRemoved>,
) {
    #[cfg(feature = "trace")]
    let _span = bevy::log::info_span!("stream_chunks").entered();

    let center = terrain.grid_index_for(viewer.0.x, viewer.0.z);
    let targets: Vec<LodTarget> = terrain.targets.clone();

    for target in targets {
        let index = GridIndex {
            i: center.i + target.di,
            j: center.j + target.dj,
        };

        if target.lod < 0 {
            // Cleared cell: only residency is affected. An in-flight build
            // still installs and is evicted by a later sweep.
            if let Some(old) = terrain.resident.remove(&index) {
                stats.evictions += 1;
                removed.send(ChunkRemoved { id: old.id });
                debug!("evicted chunk {:?} at {:?}", old.id, index);
            }
            continue;
        }

        let lod = target.lod as u32;
        if terrain.params.chunk_width >> lod == 0 || terrain.params.chunk_depth >> lod == 0 {
            warn!("lod {} leaves chunk {:?} without cells; skipping", lod, index);
            continue;
        }
        if terrain
            .resident
            .get(&index)
            .is_some_and(|chunk| chunk.lod == lod)
        {
            continue;
        }
        if terrain.pending.contains(&index) {
            continue;
        }
        if terrain.build_gate {
            continue;
        }

        terrain.pending.insert(index);
        terrain.build_gate = true;
        stats.builds_scheduled += 1;
        debug!("scheduling chunk build at {:?} lod {}", index, lod);

        let params = terrain.params.clone();
        let task = AsyncComputeTaskPool::get().spawn(async move {
            // A poisoned build must not wedge the pending latch: the poll
            // system sees `None` and releases the cell.
            panic::catch_unwind(AssertUnwindSafe(|| {
                Chunk::generate(index.i, index.j, lod, &params)
            }))
            .ok()
        });
        commands.spawn(ChunkBuildTask { index, lod, task });
    }
}

/// Drain completed chunk builds and swap them into residency.
///
/// The pending latch and the build gate clear on every completion path,
/// including panicked builds. Installation is atomic with respect to height
/// queries: a chunk crosses the thread boundary only as a finished value.
pub fn apply_finished_builds(
    mut commands: Commands,
    mut terrain: ResMut<Terrain>,
    mut stats: ResMut<TerrainStats>,
    mut tasks: Query<(Entity, &mut ChunkBuildTask)>,
    mut added: EventWriter<ChunkAdded>,
    mut removed: EventWriter<ChunkRemoved>,
) {
    for (entity, mut build) in &mut tasks {
        let Some(result) = block_on(futures_lite::future::poll_once(&mut build.task)) else {
            continue;
        };

        terrain.pending.remove(&build.index);
        terrain.build_gate = false;
        commands.entity(entity).despawn();

        match result {
            Some(chunk) => {
                if let Some(old) = terrain.resident.remove(&build.index) {
                    removed.send(ChunkRemoved { id: old.id });
                }
                added.send(ChunkAdded::describing(build.index, &chunk));
                debug!(
                    "installed chunk {:?} at {:?} lod {}",
                    chunk.id, build.index, chunk.lod
                );
                terrain.resident.insert(build.index, chunk);
                stats.builds_completed += 1;
            }
            None => {
                warn!(
                    "chunk build at {:?} lod {} panicked; cell released",
                    build.index, build.lod
                );
                stats.builds_failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEGENERATE_ELEVATION;

    fn terrain() -> Terrain {
        Terrain::new(TerrainParams::default())
    }

    #[test]
    fn grid_index_round_trips_footprint_centers() {
        let terrain = terrain();
        let wx = terrain.params.chunk_world_width();
        let wz = terrain.params.chunk_world_depth();
        for i in -3..=3 {
            for j in -3..=3 {
                let index = terrain.grid_index_for(i as f32 * wx, j as f32 * wz);
                assert_eq!(index, GridIndex { i, j });
            }
        }
    }

    #[test]
    fn origin_sits_mid_chunk() {
        // One full chunk width east of the origin lands exactly on the
        // boundary and belongs to chunk (1, 0).
        let terrain = terrain();
        assert_eq!(terrain.grid_index_for(0.0, 0.0), GridIndex { i: 0, j: 0 });
        assert_eq!(
            terrain.grid_index_for(6_400.0, 0.0),
            GridIndex { i: 1, j: 0 }
        );
        assert_eq!(
            terrain.grid_index_for(-6_400.1, 0.0),
            GridIndex { i: -1, j: 0 }
        );
    }

    #[test]
    fn chunk_local_offsets_stay_inside_the_footprint() {
        let terrain = terrain();
        let wx = terrain.params.chunk_world_width();
        let wz = terrain.params.chunk_world_depth();
        for step in 0..40 {
            let x = step as f32 * 1_777.7 - 30_000.0;
            let z = step as f32 * -913.3 + 10_000.0;
            let index = terrain.grid_index_for(x, z);
            let (cx, cz) = terrain.chunk_local_offset(x, z, index);
            assert!((0.0..wx).contains(&cx), "cx {cx} for world {x}");
            assert!((0.0..wz).contains(&cz), "cz {cz} for world {z}");
        }
    }

    #[test]
    fn local_offset_agrees_with_chunk_conversion() {
        let mut terrain = Terrain::new(TerrainParams {
            chunk_width: 8,
            chunk_depth: 8,
            grid_scale: 10.0,
            ..TerrainParams::default()
        });
        let index = GridIndex { i: 1, j: -2 };
        let chunk = Chunk::generate(index.i, index.j, 0, &terrain.params);
        terrain.resident.insert(index, chunk);

        let (x, z) = (97.5, -183.25);
        assert_eq!(terrain.grid_index_for(x, z), index);
        let (cx, cz) = terrain.chunk_local_offset(x, z, index);
        let via_terrain = terrain.get_height(x, z);
        let via_sampler = crate::sampler::height_at(
            &terrain.chunk_at(index).unwrap().heightmap,
            10.0,
            cx,
            cz,
        );
        assert_eq!(via_terrain, via_sampler);
        assert_ne!(via_terrain, DEGENERATE_ELEVATION);
    }

    #[test]
    fn unresolved_terrain_reports_the_unloaded_sentinel() {
        let terrain = terrain();
        assert_eq!(terrain.get_height(0.0, 0.0), UNLOADED_ELEVATION);
        assert_eq!(terrain.get_height(1.0e7, -1.0e7), UNLOADED_ELEVATION);
    }
}
