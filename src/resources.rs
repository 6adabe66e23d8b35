use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Chase stats
// ---------------------------------------------------------------------------

/// Running counters, read by telemetry and tests.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct ChaseStats {
    pub ticks: u64,
    pub repaths: u64,
    /// Pursuer-target pairs found in contact, summed over ticks.
    pub contacts: u64,
    pub wounds: u32,
    pub downs: u32,
}
