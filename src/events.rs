//! Chase events triggered by the contact system and observed by the hit
//! policy and any presentation layer.

use bevy::prelude::*;

use crate::collision::HitOutcome;

/// A pursuer's footprint overlaps the target's by at least the contact
/// threshold this tick.
#[derive(Event, Debug, Clone, Copy)]
pub struct PursuerContact {
    pub pursuer: Entity,
    pub target: Entity,
}

/// A contact that counted: the target was wounded or downed.
#[derive(Event, Debug, Clone, Copy)]
pub struct TargetHit {
    pub target: Entity,
    pub outcome: HitOutcome,
}
