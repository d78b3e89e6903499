use bevy::prelude::*;

pub mod chunk;
pub mod config;
pub mod heightmap;
pub mod lod;
pub mod noise;
pub mod params;
pub mod sampler;
pub mod streaming;

#[cfg(test)]
pub mod test_harness;

pub use chunk::{Chunk, ChunkId};
pub use heightmap::Heightmap;
pub use lod::LodPattern;
pub use params::TerrainParams;
pub use streaming::{
    ChunkAdded, ChunkRemoved, GridIndex, Terrain, TerrainStats, ViewerPosition,
};

/// Registers the terrain core: the parameter and state resources, the chunk
/// add/remove event surface, and the two streaming systems.
///
/// The viewer collaborator writes [`ViewerPosition`]; the rendering
/// collaborator reads [`ChunkAdded`] / [`ChunkRemoved`]. Custom
/// [`TerrainParams`] take effect when inserted before this plugin.
pub struct TerrainPlugin;

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TerrainParams>()
            .init_resource::<ViewerPosition>()
            .init_resource::<TerrainStats>()
            .init_resource::<Terrain>()
            .add_event::<ChunkAdded>()
            .add_event::<ChunkRemoved>()
            .add_systems(
                Update,
                (streaming::apply_finished_builds, streaming::stream_chunks).chain(),
            );
    }
}
