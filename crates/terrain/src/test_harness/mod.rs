//! # TestTerrain — headless integration harness for the terrain core
//!
//! Wraps `bevy::app::App` + `TerrainPlugin` so streaming behavior can be
//! driven tick by tick without a window or renderer.

mod queries;

use std::time::Duration;

use bevy::prelude::*;

use crate::params::TerrainParams;
use crate::streaming::{ChunkAdded, ChunkRemoved, ViewerPosition};
use crate::TerrainPlugin;

/// Captured copies of every chunk event sent since startup.
#[derive(Resource, Default)]
pub struct ChunkEventLog {
    pub added: Vec<ChunkAdded>,
    pub removed: Vec<ChunkRemoved>,
}

fn record_chunk_events(
    mut log: ResMut<ChunkEventLog>,
    mut added: EventReader<ChunkAdded>,
    mut removed: EventReader<ChunkRemoved>,
) {
    log.added.extend(added.read().cloned());
    log.removed.extend(removed.read().copied());
}

/// A headless bevy App wrapping `TerrainPlugin` for integration testing.
///
/// Construct with [`TestTerrain::new`] or [`TestTerrain::with_params`],
/// position the viewer, then `tick`/`settle` and assert on the resulting
/// terrain state and event log.
pub struct TestTerrain {
    pub app: App,
}

impl TestTerrain {
    /// Stock parameters: 64-cell chunks and the default 3x3 LOD quadrant.
    pub fn new() -> Self {
        Self::with_params(TerrainParams::default())
    }

    /// Custom parameters; the `Terrain` resource is built from them.
    pub fn with_params(params: TerrainParams) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(params);
        app.add_plugins(TerrainPlugin);
        app.init_resource::<ChunkEventLog>();
        app.add_systems(
            Update,
            record_chunk_events.after(crate::streaming::stream_chunks),
        );
        Self { app }
    }

    /// Start with the viewer at world `(x, z)`.
    pub fn viewer_at(mut self, x: f32, z: f32) -> Self {
        self.set_viewer(x, z);
        self
    }

    /// Move the viewer to world `(x, z)`.
    pub fn set_viewer(&mut self, x: f32, z: f32) {
        self.app.world_mut().resource_mut::<ViewerPosition>().0 = Vec3::new(x, 0.0, z);
    }

    /// Advance the simulation by `n` ticks.
    pub fn tick(&mut self, n: usize) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Tick until a full sweep schedules nothing and no build is in flight;
    /// returns the number of ticks taken. Panics after `max_ticks`.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        for ticks in 1..=max_ticks {
            let scheduled_before = self.stats().builds_scheduled;
            self.app.update();
            if self.stats().builds_scheduled == scheduled_before && self.terrain().is_idle() {
                return ticks;
            }
            // Builds run on pool threads; give them a moment between polls.
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("terrain did not settle within {max_ticks} ticks");
    }
}
