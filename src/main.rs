use std::process::ExitCode;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::tasks::{ComputeTaskPool, TaskPoolBuilder};
use micromegas_telemetry_sink::TelemetryGuardBuilder;
use micromegas_telemetry_sink::tracing_interop::TracingCaptureLayer;
use micromegas_tracing::dispatch::{
    flush_thread_buffer, init_thread_stream, unregister_thread_stream,
};
use micromegas_tracing::levels::LevelFilter;
use micromegas_tracing::prelude::{error, info, warn};
use soulchase::app_state::ChaseState;
use soulchase::config::ChaseConfig;
use soulchase::maze::MazeLayout;
use soulchase::plugins::chase::spawn_chase;
use soulchase::resources::ChaseStats;
use soulchase::tracing_bridge::SpanBridgeLayer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;

const DEFAULT_MAZE: &str = "assets/maps/crypt.txt";
const TICK: Duration = Duration::from_millis(16);
/// One minute of game time at `TICK`.
const MAX_TICKS: u64 = 3_750;

/// Usage: `soulchase [maze.txt] [config.json]`
///
/// Runs the chase headless against a stationary target until the target is
/// downed (exit 0) or the tick cap is hit (exit 1).
fn main() -> ExitCode {
    // 1. Initialize telemetry (creates LocalEventSink for stdout)
    //    Spans require MICROMEGAS_ENABLE_CPU_TRACING=true; logs and metrics
    //    always work.
    let _telemetry_guard = TelemetryGuardBuilder::default()
        .with_install_tracing_capture(false)
        .build()
        .expect("failed to initialize telemetry");

    info!("soulchase starting");

    // 2. Bevy schedule spans -> Micromegas scopes. Must be installed before
    //    the app starts emitting spans.
    let log_layer = TracingCaptureLayer {
        max_level: LevelFilter::Info,
    };
    let subscriber = Registry::default()
        .with(SpanBridgeLayer::schedules())
        .with(log_layer);
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let mut args = std::env::args().skip(1);
    let maze_path = args.next().unwrap_or_else(|| DEFAULT_MAZE.to_string());
    let config = match args.next() {
        Some(path) => match ChaseConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("bad config {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => ChaseConfig::default(),
    };
    let layout = match MazeLayout::load(&maze_path, config.tile_edge) {
        Ok(layout) => layout,
        Err(e) => {
            error!("bad maze {maze_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    // 3. Pre-init ComputeTaskPool with Micromegas thread callbacks, before
    //    App::new() so TaskPoolPlugin skips its own init.
    ComputeTaskPool::get_or_init(|| {
        TaskPoolBuilder::new()
            .on_thread_spawn(|| {
                init_thread_stream();
            })
            .on_thread_destroy(|| {
                flush_thread_buffer();
                unregister_thread_stream();
            })
            .build()
    });

    // 4. Run the chase
    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(TICK)))
        .add_plugins(StatesPlugin)
        .add_plugins(soulchase::SoulChasePlugin)
        .add_systems(OnEnter(ChaseState::Caught), finish_on_catch)
        .add_systems(Update, enforce_tick_cap);
    spawn_chase(app.world_mut(), &layout, &config);

    match app.run() {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(_) => ExitCode::FAILURE,
    }
}

fn finish_on_catch(stats: Res<ChaseStats>, mut exit: MessageWriter<AppExit>) {
    info!(
        "target caught after {} ticks ({} path recomputes, {} contacts)",
        stats.ticks, stats.repaths, stats.contacts
    );
    exit.write(AppExit::Success);
}

fn enforce_tick_cap(stats: Res<ChaseStats>, mut exit: MessageWriter<AppExit>) {
    if stats.ticks >= MAX_TICKS {
        warn!("target not caught after {} ticks", stats.ticks);
        exit.write(AppExit::error());
    }
}
