pub mod chase;
pub mod telemetry;
