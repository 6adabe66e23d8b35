//! The per-tick chase loop: steer every pursuer toward the target, then test
//! each pursuer against the target for contact. Contacts are triggered as
//! events; the hit policy observes them.

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_fn, span_scope, warn};

use crate::ai::steering::Pursuer;
use crate::app_state::ChaseState;
use crate::collision::{HitOutcome, HitTracker};
use crate::components::{Body, SpawnTile, Target};
use crate::config::ChaseConfig;
use crate::events::{PursuerContact, TargetHit};
use crate::maze::{MazeGrid, MazeLayout};
use crate::resources::ChaseStats;

pub struct ChasePlugin;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChaseSet {
    Steering,
    Contact,
}

impl Plugin for ChasePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<ChaseState>();
        app.init_resource::<ChaseConfig>();
        app.init_resource::<ChaseStats>();

        app.configure_sets(
            Update,
            (ChaseSet::Steering, ChaseSet::Contact)
                .chain()
                .run_if(in_state(ChaseState::Chasing)),
        );
        app.add_systems(
            Update,
            (
                steer_pursuers.in_set(ChaseSet::Steering),
                detect_contacts.in_set(ChaseSet::Contact),
            ),
        );
        app.add_observer(on_pursuer_contact);
        app.add_systems(OnEnter(ChaseState::Chasing), respawn_chase);
    }
}

/// Insert the grid and config, then spawn the target and one pursuer per
/// spawn tile. Returns the target entity.
pub fn spawn_chase(world: &mut World, layout: &MazeLayout, config: &ChaseConfig) -> Entity {
    let edge = layout.grid.tile_edge();
    world.insert_resource(layout.grid.clone());
    world.insert_resource(config.clone());

    let target = world
        .spawn((
            Target,
            Body::centered_in(
                layout.target_spawn,
                config.target_size,
                config.target_speed,
                edge,
            ),
            HitTracker::new(config.immunity_window()),
            SpawnTile(layout.target_spawn),
        ))
        .id();

    for &tile in &layout.pursuer_spawns {
        world.spawn((
            Pursuer::new(config.steering_tuning(), config.wander.build()),
            Body::centered_in(tile, config.pursuer_size, config.pursuer_speed, edge),
            SpawnTile(tile),
        ));
    }
    if layout.pursuer_spawns.is_empty() {
        warn!("maze has no pursuer spawns");
    }
    info!(
        "chase spawned: {} pursuer(s), target at {:?}",
        layout.pursuer_spawns.len(),
        layout.target_spawn
    );
    target
}

#[span_fn]
fn steer_pursuers(
    time: Res<Time>,
    grid: Option<Res<MazeGrid>>,
    mut stats: ResMut<ChaseStats>,
    target: Query<&Body, (With<Target>, Without<Pursuer>)>,
    mut pursuers: Query<(&mut Pursuer, &mut Body), Without<Target>>,
) {
    let Some(grid) = grid else { return };
    let Ok(target) = target.single() else {
        return;
    };

    stats.ticks += 1;
    for (mut pursuer, mut body) in &mut pursuers {
        let report = pursuer.tick(&mut body, time.delta(), target, &grid);
        if report.repath.is_some() {
            stats.repaths += 1;
        }
    }
}

#[span_fn]
fn detect_contacts(
    config: Res<ChaseConfig>,
    mut stats: ResMut<ChaseStats>,
    targets: Query<(Entity, &Body), With<Target>>,
    pursuers: Query<(Entity, &Body), With<Pursuer>>,
    mut commands: Commands,
) {
    let rule = config.contact_rule();
    for (target, target_body) in &targets {
        for (pursuer, pursuer_body) in &pursuers {
            if rule.detect(pursuer_body, target_body) {
                stats.contacts += 1;
                commands.trigger(PursuerContact { pursuer, target });
            }
        }
    }
}

/// Hit policy: escalate a contact through the target's `HitTracker`.
#[span_fn]
fn on_pursuer_contact(
    contact: On<PursuerContact>,
    time: Res<Time>,
    mut trackers: Query<&mut HitTracker>,
    mut stats: ResMut<ChaseStats>,
    mut next_state: ResMut<NextState<ChaseState>>,
    mut commands: Commands,
) {
    let Ok(mut tracker) = trackers.get_mut(contact.target) else {
        return;
    };
    let outcome = tracker.register_contact(time.elapsed());
    match outcome {
        HitOutcome::Ignored => return,
        HitOutcome::Wounded => {
            stats.wounds += 1;
            info!("target wounded by {:?}", contact.pursuer);
        }
        HitOutcome::Downed => {
            stats.downs += 1;
            info!("target downed by {:?}", contact.pursuer);
            next_state.set(ChaseState::Caught);
        }
    }
    commands.trigger(TargetHit {
        target: contact.target,
        outcome,
    });
}

/// Put every body back on its spawn tile and clear pursuit and hit state.
#[allow(clippy::type_complexity)]
#[span_fn]
fn respawn_chase(
    grid: Option<Res<MazeGrid>>,
    mut bodies: Query<(
        &mut Body,
        &SpawnTile,
        Option<&mut Pursuer>,
        Option<&mut HitTracker>,
    )>,
) {
    let Some(grid) = grid else { return };
    for (mut body, spawn, pursuer, tracker) in &mut bodies {
        body.position = grid.tile_center_origin(spawn.0, body.size);
        if let Some(mut pursuer) = pursuer {
            pursuer.reset();
        }
        if let Some(mut tracker) = tracker {
            tracker.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::collision::Vitality;
    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;

    #[derive(Resource, Default)]
    struct Hits(Vec<HitOutcome>);

    fn setup_app(maze: &str, config: ChaseConfig) -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.add_plugins(ChasePlugin);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
        app.init_resource::<Hits>();
        app.add_observer(|hit: On<TargetHit>, mut hits: ResMut<Hits>| {
            hits.0.push(hit.outcome);
        });
        let layout = MazeLayout::parse(maze, config.tile_edge).unwrap();
        let target = spawn_chase(app.world_mut(), &layout, &config);
        (app, target)
    }

    fn state(app: &App) -> ChaseState {
        *app.world().resource::<State<ChaseState>>().get()
    }

    #[test]
    fn pursuer_catches_stationary_target() {
        let config = ChaseConfig {
            immunity_window_ms: 100,
            ..default()
        };
        let (mut app, target) = setup_app("#######\n#G   P#\n#######", config);

        for _ in 0..300 {
            app.update();
            if state(&app) == ChaseState::Caught {
                break;
            }
        }
        assert_eq!(state(&app), ChaseState::Caught);

        let stats = app.world().resource::<ChaseStats>();
        assert_eq!(stats.wounds, 1);
        assert_eq!(stats.downs, 1);
        assert!(stats.repaths >= 1);
        assert!(app.world().get::<HitTracker>(target).unwrap().is_down());
        assert_eq!(
            app.world().resource::<Hits>().0,
            vec![HitOutcome::Wounded, HitOutcome::Downed]
        );
    }

    #[test]
    fn contacts_during_immunity_do_not_down() {
        let (mut app, target) = setup_app("#####\n#GP #\n#####", ChaseConfig::default());

        for _ in 0..90 {
            app.update();
        }
        let stats = app.world().resource::<ChaseStats>();
        assert!(stats.contacts > 1);
        assert_eq!(stats.wounds, 1);
        assert_eq!(stats.downs, 0);
        assert_eq!(state(&app), ChaseState::Chasing);
        assert!(matches!(
            app.world().get::<HitTracker>(target).unwrap().vitality(),
            Vitality::Wounded { .. }
        ));
    }

    #[test]
    fn systems_stop_once_caught() {
        let config = ChaseConfig {
            immunity_window_ms: 0,
            ..default()
        };
        let (mut app, _) = setup_app("#####\n#GP #\n#####", config);
        for _ in 0..120 {
            app.update();
            if state(&app) == ChaseState::Caught {
                break;
            }
        }
        assert_eq!(state(&app), ChaseState::Caught);

        let ticks = app.world().resource::<ChaseStats>().ticks;
        for _ in 0..10 {
            app.update();
        }
        assert_eq!(app.world().resource::<ChaseStats>().ticks, ticks);
    }

    #[test]
    fn resuming_the_chase_respawns_everyone() {
        let config = ChaseConfig {
            immunity_window_ms: 0,
            ..default()
        };
        let (mut app, target) = setup_app("######\n#G  P#\n######", config.clone());
        for _ in 0..200 {
            app.update();
            if state(&app) == ChaseState::Caught {
                break;
            }
        }
        assert_eq!(state(&app), ChaseState::Caught);

        app.world_mut()
            .resource_mut::<NextState<ChaseState>>()
            .set(ChaseState::Chasing);
        app.update();

        let spawn = crate::geometry::TilePos::new(1, 1);
        let expected = Body::centered_in(spawn, config.pursuer_size, config.pursuer_speed, 32.0);
        let mut query = app.world_mut().query::<(&Body, &Pursuer)>();
        let (body, pursuer) = query.single(app.world()).unwrap();
        assert!(body.position.distance(expected.position) <= 150.0 * 0.016 + 1e-3);
        assert!(pursuer.path().is_some());
        assert_eq!(
            app.world().get::<HitTracker>(target).unwrap().vitality(),
            Vitality::Unhurt
        );
    }

    #[test]
    fn missing_grid_is_a_no_op() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.add_plugins(ChasePlugin);
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(app.world().resource::<ChaseStats>().ticks, 0);
        assert_eq!(state(&app), ChaseState::Chasing);
    }
}
