pub mod ai;
pub mod app_state;
pub mod collision;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod maze;
pub mod plugins;
pub mod resources;
pub mod tracing_bridge;

use bevy::prelude::*;

use plugins::chase::ChasePlugin;
use plugins::telemetry::TelemetryPlugin;

/// The chase loop plus its telemetry. Requires `StatesPlugin` (part of
/// `DefaultPlugins`, added by hand next to `MinimalPlugins`).
pub struct SoulChasePlugin;

impl Plugin for SoulChasePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ChasePlugin);
        app.add_plugins(TelemetryPlugin);
    }
}
