// Default streaming parameters. These reproduce the classic flyover
// configuration; runtime overrides go through `TerrainParams`.
pub const CHUNK_WIDTH: usize = 64;
pub const CHUNK_DEPTH: usize = 64;
pub const CHUNK_HEIGHT: f32 = 64.0;
pub const GRID_SCALE: f32 = 200.0;
pub const NOISE_FREQUENCY: f32 = 0.005;
pub const NOISE_OCTAVES: u32 = 5;
pub const NOISE_LACUNARITY: f32 = 1.8715;
pub const NOISE_PERSISTENCE: f32 = 1.0 / NOISE_LACUNARITY;
pub const NOISE_SEED: i32 = 1337;

/// Elevation returned when interpolation degenerates (out-of-range corner or
/// non-finite arithmetic): far below any valid terrain.
pub const DEGENERATE_ELEVATION: f32 = -2000.0;

/// Elevation returned for world positions with no resident chunk. Distinct
/// from [`DEGENERATE_ELEVATION`] so callers can tell "no data here yet" from
/// "interpolation underflow".
pub const UNLOADED_ELEVATION: f32 = -2001.0;
