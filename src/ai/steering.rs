//! Pursuer steering: decides when to re-plan, walks the current path node by
//! node, and turns "next tile" into a bounded, wall-checked pixel step.
//!
//! Re-planning happens when no plan exists yet, the target's tile differs
//! from the goal of the last plan (reported as `Exhausted` if the path had
//! already been walked to its end), or the repath interval has elapsed. A
//! pursuer parked on the target's tile holds position between intervals. The interval is measured with a `Timer` fed
//! the tick's elapsed time, so the whole thing stays deterministic under a
//! manual clock.
//!
//! Every committed position is checked against the grid first. A pursuer
//! that starts clear of walls therefore never overlaps one.

use std::time::Duration;

use bevy::prelude::*;
use micromegas_tracing::prelude::{debug, span_scope};

use crate::ai::planner::{Path, compute_path};
use crate::ai::wander::WanderStrategy;
use crate::components::Body;
use crate::geometry::TilePos;
use crate::maze::{Connectivity, MazeGrid};

/// Arrival radius as a multiple of the per-tick travel distance.
const ARRIVAL_STEPS: f32 = 1.5;

/// A smoothed step must gain at least this fraction of a raw step toward the
/// node, otherwise the raw heading is used.
const MIN_SMOOTHED_PROGRESS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringTuning {
    /// Fraction of the gap between current and desired velocity closed per
    /// 60 Hz frame. 1.0 disables smoothing.
    pub response: f32,
    pub repath_interval: Duration,
    pub connectivity: Connectivity,
}

impl Default for SteeringTuning {
    fn default() -> Self {
        Self {
            response: 0.2,
            repath_interval: Duration::from_millis(400),
            connectivity: Connectivity::Four,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PursuitState {
    #[default]
    NoPath,
    Following,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepathReason {
    /// Nothing planned yet.
    Missing,
    /// The path was walked to its end and the target has since left its tile.
    Exhausted,
    GoalMoved,
    Interval,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringReport {
    pub state: PursuitState,
    pub repath: Option<RepathReason>,
    pub displacement: Vec2,
}

#[derive(Component, Debug)]
pub struct Pursuer {
    tuning: SteeringTuning,
    state: PursuitState,
    velocity: Vec2,
    path: Option<Path>,
    cursor: usize,
    /// Goal tile of the last planning attempt, successful or not.
    goal: Option<TilePos>,
    repath_timer: Timer,
    wander: Box<dyn WanderStrategy>,
    wander_goal: Option<TilePos>,
}

impl Pursuer {
    pub fn new(tuning: SteeringTuning, wander: Box<dyn WanderStrategy>) -> Self {
        Self {
            tuning,
            state: PursuitState::NoPath,
            velocity: Vec2::ZERO,
            path: None,
            cursor: 0,
            goal: None,
            repath_timer: Timer::new(tuning.repath_interval, TimerMode::Repeating),
            wander,
            wander_goal: None,
        }
    }

    pub fn state(&self) -> PursuitState {
        self.state
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Current path, for debug overlays.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next_node(&self) -> Option<TilePos> {
        self.path.as_ref().and_then(|path| path.get(self.cursor))
    }

    pub fn goal(&self) -> Option<TilePos> {
        self.goal
    }

    /// Forget the current plan, e.g. after a respawn.
    pub fn reset(&mut self) {
        self.state = PursuitState::NoPath;
        self.velocity = Vec2::ZERO;
        self.path = None;
        self.cursor = 0;
        self.goal = None;
        self.repath_timer.reset();
        self.wander_goal = None;
    }

    /// Advance one tick. `body` is this pursuer's footprint and is the only
    /// thing mutated; `target` is read.
    pub fn tick(
        &mut self,
        body: &mut Body,
        dt: Duration,
        target: &Body,
        grid: &MazeGrid,
    ) -> SteeringReport {
        span_scope!("pursuer_tick");
        self.repath_timer.tick(dt);

        let goal = target.tile(grid.tile_edge());
        let repath = self.repath_reason(goal);
        if let Some(reason) = repath {
            self.repath(body, goal, grid, reason);
        }

        let before = body.position;
        let step = body.speed * dt.as_secs_f32();
        if step > 0.0 {
            match self.state {
                PursuitState::Following => self.follow(body, step, dt, grid),
                PursuitState::NoPath => self.wander(body, step, dt, grid),
            }
        }

        SteeringReport {
            state: self.state,
            repath,
            displacement: body.position - before,
        }
    }

    fn repath_reason(&self, goal: TilePos) -> Option<RepathReason> {
        let Some(last_goal) = self.goal else {
            return Some(RepathReason::Missing);
        };
        // A walked-out path ends on `last_goal`, so while the target stays
        // on that tile the pursuer holds and only the interval re-plans.
        let exhausted = self
            .path
            .as_ref()
            .is_some_and(|path| self.cursor >= path.len());
        if last_goal != goal {
            Some(if exhausted {
                RepathReason::Exhausted
            } else {
                RepathReason::GoalMoved
            })
        } else if self.repath_timer.just_finished() {
            Some(RepathReason::Interval)
        } else {
            None
        }
    }

    fn repath(&mut self, body: &Body, goal: TilePos, grid: &MazeGrid, reason: RepathReason) {
        let start = body.tile(grid.tile_edge());
        self.goal = Some(goal);
        self.repath_timer.reset();
        match compute_path(grid, start, goal, self.tuning.connectivity) {
            Some(path) => {
                debug!(
                    "repath {:?}: {:?} -> {:?}, {} hops",
                    reason,
                    start,
                    goal,
                    path.hops()
                );
                self.cursor = path.first_steerable_index();
                self.path = Some(path);
                self.state = PursuitState::Following;
                self.wander_goal = None;
            }
            None => {
                if self.state == PursuitState::Following {
                    debug!("repath {:?}: no route {:?} -> {:?}", reason, start, goal);
                }
                self.path = None;
                self.cursor = 0;
                self.state = PursuitState::NoPath;
            }
        }
    }

    fn follow(&mut self, body: &mut Body, step: f32, dt: Duration, grid: &MazeGrid) {
        let arrival = ARRIVAL_STEPS * step;
        while let Some(node) = self.next_node() {
            let aim = grid.tile_center_origin(node, body.size);
            if body.position.distance(aim) > arrival {
                self.steer_toward(body, aim, step, dt, grid);
                return;
            }
            self.cursor += 1;
        }
        // Parked on the goal tile.
        self.velocity = Vec2::ZERO;
    }

    fn wander(&mut self, body: &mut Body, step: f32, dt: Duration, grid: &MazeGrid) {
        if self.wander_goal.is_none() {
            let from = body.tile(grid.tile_edge());
            self.wander_goal = self
                .wander
                .next_destination(grid, from)
                .filter(|dest| grid.is_floor(*dest));
        }
        let Some(dest) = self.wander_goal else {
            self.velocity = Vec2::ZERO;
            return;
        };
        let aim = grid.tile_center_origin(dest, body.size);
        if body.position.distance(aim) <= ARRIVAL_STEPS * step {
            self.wander_goal = None;
            self.velocity = Vec2::ZERO;
        } else {
            self.steer_toward(body, aim, step, dt, grid);
        }
    }

    fn steer_toward(
        &mut self,
        body: &mut Body,
        aim: Vec2,
        step: f32,
        dt: Duration,
        grid: &MazeGrid,
    ) {
        let to_aim = aim - body.position;
        let distance = to_aim.length();
        let heading = to_aim / distance;
        let raw = heading * step.min(distance);

        let secs = dt.as_secs_f32();
        let desired = heading * body.speed;
        let blend = 1.0 - (1.0 - self.tuning.response).powf(secs * 60.0);
        let smoothed = (self.velocity + (desired - self.velocity) * blend) * secs;
        let proposal = if smoothed.dot(heading) >= MIN_SMOOTHED_PROGRESS * raw.length() {
            smoothed
        } else {
            raw
        };

        let moved = commit_move(body, proposal, raw, grid);
        self.velocity = moved / secs;
    }
}

/// Apply the first of these that keeps `body` clear of walls: the proposal,
/// the raw step, the raw step along its larger axis, then its smaller axis.
/// Returns the displacement actually applied.
fn commit_move(body: &mut Body, proposal: Vec2, raw: Vec2, grid: &MazeGrid) -> Vec2 {
    let (major, minor) = if raw.x.abs() >= raw.y.abs() {
        (Vec2::new(raw.x, 0.0), Vec2::new(0.0, raw.y))
    } else {
        (Vec2::new(0.0, raw.y), Vec2::new(raw.x, 0.0))
    };
    for candidate in [proposal, raw, major, minor] {
        if candidate == Vec2::ZERO {
            continue;
        }
        let next = body.position + candidate;
        if !grid.is_wall_at_pixel_region(next.x, next.y, body.size, body.size) {
            body.position = next;
            return candidate;
        }
    }
    Vec2::ZERO
}
