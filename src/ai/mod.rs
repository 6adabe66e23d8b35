//! Pursuer AI. Planning, steering, and the no-route fallback each live in
//! their own module; systems only talk to `Pursuer`.

pub mod planner;
pub mod steering;
pub mod wander;

pub use planner::{Path, compute_path};
pub use steering::{Pursuer, PursuitState, RepathReason, SteeringReport, SteeringTuning};
pub use wander::{FixedSequence, Idle, RandomWalk, WanderKind, WanderStrategy};
