use bevy::prelude::*;

use crate::geometry::{self, Rect, TilePos};

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// A moving square footprint. `position` is the top-left corner in pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub size: f32,
    /// Pixels per second.
    pub speed: f32,
}

impl Body {
    pub fn new(position: Vec2, size: f32, speed: f32) -> Self {
        Self {
            position,
            size,
            speed,
        }
    }

    /// A body centered in `tile`.
    pub fn centered_in(tile: TilePos, size: f32, speed: f32, tile_edge: f32) -> Self {
        Self::new(
            geometry::tile_center_origin(tile, size, tile_edge),
            size,
            speed,
        )
    }

    pub fn bounds(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Tile under the body's center.
    pub fn tile(&self, tile_edge: f32) -> TilePos {
        geometry::tile_under(self.position, self.size, tile_edge)
    }
}

// ---------------------------------------------------------------------------
// Entity markers
// ---------------------------------------------------------------------------

/// The chased entity. Its `Body` is driven by the player-input collaborator;
/// the chase systems only read it.
#[derive(Component, Debug)]
pub struct Target;

/// Spawn tile, kept for respawning after a reset.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpawnTile(pub TilePos);
