//! Frame-level telemetry: wraps the chase loop with Micromegas instrumentation.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, imetric, span_scope};

use crate::ai::steering::{Pursuer, PursuitState};
use crate::resources::ChaseStats;

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Last, frame_telemetry);
    }
}

fn frame_telemetry(time: Res<Time>, stats: Option<Res<ChaseStats>>, pursuers: Query<&Pursuer>) {
    span_scope!("frame");
    let dt_ms = time.delta_secs_f64() * 1000.0;
    fmetric!("frame_time_ms", "ms", dt_ms);

    let stranded = pursuers
        .iter()
        .filter(|p| p.state() == PursuitState::NoPath)
        .count();
    imetric!("pursuers_without_path", "count", stranded as u64);

    if let Some(stats) = stats {
        imetric!("path_recomputes", "count", stats.repaths);
        imetric!("contacts", "count", stats.contacts);
    }
}
