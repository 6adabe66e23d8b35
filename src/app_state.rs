use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, States)]
pub enum ChaseState {
    #[default]
    Chasing,
    /// The target has been downed. Chase systems stop until the state is set
    /// back to `Chasing`, which respawns everyone.
    Caught,
}
