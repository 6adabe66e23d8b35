//! Tunable chase parameters, loaded from an optional JSON file.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides.

use std::path::Path as FsPath;
use std::time::Duration;

use bevy::prelude::*;
use micromegas_tracing::prelude::info;
use serde::{Deserialize, Serialize};

use crate::ai::steering::SteeringTuning;
use crate::ai::wander::WanderKind;
use crate::collision::ContactRule;
use crate::error::ConfigError;
use crate::maze::Connectivity;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseConfig {
    pub tile_edge: f32,
    pub pursuer_size: f32,
    /// Pixels per second.
    pub pursuer_speed: f32,
    pub target_size: f32,
    pub target_speed: f32,
    pub steer_response: f32,
    pub repath_interval_ms: u64,
    pub connectivity: Connectivity,
    pub contact_min_overlap: f32,
    pub contact_reference_size: f32,
    pub immunity_window_ms: u64,
    pub wander: WanderKind,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            tile_edge: 32.0,
            pursuer_size: 20.0,
            pursuer_speed: 150.0,
            target_size: 28.0,
            target_speed: 240.0,
            steer_response: 0.2,
            repath_interval_ms: 400,
            connectivity: Connectivity::Four,
            contact_min_overlap: 30.0,
            contact_reference_size: 60.0,
            immunity_window_ms: 5_000,
            wander: WanderKind::Idle,
        }
    }
}

impl ChaseConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ChaseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        info!("config loaded: {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tile_edge", self.tile_edge),
            ("pursuer_size", self.pursuer_size),
            ("pursuer_speed", self.pursuer_speed),
            ("target_size", self.target_size),
            ("contact_min_overlap", self.contact_min_overlap),
            ("contact_reference_size", self.contact_reference_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.target_speed.is_finite() && self.target_speed >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "target_speed must not be negative, got {}",
                self.target_speed
            )));
        }
        if !(self.steer_response > 0.0 && self.steer_response <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "steer_response must be in (0, 1], got {}",
                self.steer_response
            )));
        }
        // A pursuer as wide as a corridor could never turn into it.
        if self.pursuer_size >= self.tile_edge {
            return Err(ConfigError::Invalid(format!(
                "pursuer_size {} must be smaller than tile_edge {}",
                self.pursuer_size, self.tile_edge
            )));
        }
        if self.target_size > self.tile_edge {
            return Err(ConfigError::Invalid(format!(
                "target_size {} must not exceed tile_edge {}",
                self.target_size, self.tile_edge
            )));
        }
        if self.repath_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "repath_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn repath_interval(&self) -> Duration {
        Duration::from_millis(self.repath_interval_ms)
    }

    pub fn immunity_window(&self) -> Duration {
        Duration::from_millis(self.immunity_window_ms)
    }

    pub fn steering_tuning(&self) -> SteeringTuning {
        SteeringTuning {
            response: self.steer_response,
            repath_interval: self.repath_interval(),
            connectivity: self.connectivity,
        }
    }

    pub fn contact_rule(&self) -> ContactRule {
        ContactRule {
            min_overlap: self.contact_min_overlap,
            reference_size: self.contact_reference_size,
        }
    }
}
