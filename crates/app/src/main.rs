use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use terrain::{Terrain, TerrainParams, TerrainPlugin, TerrainStats, ViewerPosition};

fn main() {
    let mut app = App::new();

    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(16))),
    );
    app.add_plugins(LogPlugin::default());

    if let Some(params) = params_from_env() {
        app.insert_resource(params);
    }

    app.add_plugins(TerrainPlugin)
        .insert_resource(FlightPlan::default())
        .insert_resource(TickLimit::from_env())
        .add_systems(Update, (fly_viewer, report_terrain, enforce_tick_limit));

    app.run();
}

/// `OVERLAND_PARAMS=<path>` loads a JSON `TerrainParams` override; anything
/// unreadable falls back to the stock parameters.
fn params_from_env() -> Option<TerrainParams> {
    let path = std::env::var("OVERLAND_PARAMS").ok()?;
    match std::fs::read_to_string(&path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(params) => {
                info!("loaded terrain parameters from {}", path);
                Some(params)
            }
            Err(err) => {
                warn!("ignoring {}: {}", path, err);
                None
            }
        },
        Err(err) => {
            warn!("cannot read {}: {}", path, err);
            None
        }
    }
}

/// Scripted stand-in for the viewer collaborator: a wide orbit, so the sweep
/// keeps crossing chunk boundaries in both axes.
#[derive(Resource)]
struct FlightPlan {
    speed: f32,
    orbit_radius: f32,
    altitude: f32,
    elapsed: f32,
}

impl Default for FlightPlan {
    fn default() -> Self {
        Self {
            speed: 2_000.0,
            orbit_radius: 20_000.0,
            altitude: 150.0,
            elapsed: 0.0,
        }
    }
}

fn fly_viewer(time: Res<Time>, mut plan: ResMut<FlightPlan>, mut viewer: ResMut<ViewerPosition>) {
    plan.elapsed += time.delta_secs();
    let angle = plan.elapsed * plan.speed / plan.orbit_radius;
    viewer.0 = Vec3::new(
        plan.orbit_radius * angle.cos(),
        plan.altitude,
        plan.orbit_radius * angle.sin(),
    );
}

fn report_terrain(
    viewer: Res<ViewerPosition>,
    terrain: Res<Terrain>,
    stats: Res<TerrainStats>,
    mut frames: Local<u32>,
) {
    *frames += 1;
    if *frames % 60 != 0 {
        return;
    }
    let position = viewer.0;
    info!(
        "viewer ({:.0}, {:.0}) height {:.1} | resident {} pending {} | built {} failed {} evicted {}",
        position.x,
        position.z,
        terrain.get_height(position.x, position.z),
        terrain.resident_count(),
        terrain.pending_count(),
        stats.builds_completed,
        stats.builds_failed,
        stats.evictions,
    );
}

/// Exit after `OVERLAND_TICKS` updates; runs until interrupted when unset.
#[derive(Resource)]
struct TickLimit {
    limit: Option<u64>,
    ticks: u64,
}

impl TickLimit {
    fn from_env() -> Self {
        let limit = std::env::var("OVERLAND_TICKS")
            .ok()
            .and_then(|value| value.parse().ok());
        Self { limit, ticks: 0 }
    }
}

fn enforce_tick_limit(mut counter: ResMut<TickLimit>, mut exit: EventWriter<AppExit>) {
    counter.ticks += 1;
    if counter.limit.is_some_and(|limit| counter.ticks >= limit) {
        info!("tick limit reached after {} updates", counter.ticks);
        exit.send(AppExit::Success);
    }
}
