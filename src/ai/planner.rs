//! Breadth-first route planning over the maze grid.
//!
//! Routes are shortest in hop count. When several shortest routes exist, the
//! one returned is whichever the neighbor expansion order (up, down, left,
//! right, then diagonals) reaches first; callers must not depend on which.

use std::sync::Arc;

use micromegas_tracing::prelude::*;
use pathfinding::prelude::bfs;

use crate::geometry::TilePos;
use crate::maze::{Connectivity, MazeGrid};

/// An immutable route from a start tile to a goal tile, both inclusive.
///
/// Cloning is cheap and never exposes a partially built route: a pursuer
/// replaces its path wholesale on every recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    tiles: Arc<[TilePos]>,
}

impl Path {
    pub fn tiles(&self) -> &[TilePos] {
        &self.tiles
    }

    pub fn get(&self, index: usize) -> Option<TilePos> {
        self.tiles.get(index).copied()
    }

    /// Number of tiles, start included. Never zero.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of steps between start and goal.
    pub fn hops(&self) -> usize {
        self.tiles.len().saturating_sub(1)
    }

    pub fn start(&self) -> TilePos {
        self.tiles[0]
    }

    pub fn goal(&self) -> TilePos {
        self.tiles[self.tiles.len() - 1]
    }

    /// First index worth steering toward: the tile after the start, or the
    /// start itself for a zero-hop route.
    pub fn first_steerable_index(&self) -> usize {
        self.hops().min(1)
    }
}

/// Shortest route from `start` to `goal`, or None if either end is a wall
/// (or out of bounds) or the goal is unreachable.
#[span_fn]
pub fn compute_path(
    grid: &MazeGrid,
    start: TilePos,
    goal: TilePos,
    connectivity: Connectivity,
) -> Option<Path> {
    if grid.is_wall(start) || grid.is_wall(goal) {
        return None;
    }
    bfs(
        &start,
        |tile| grid.floor_neighbors(*tile, connectivity),
        |tile| *tile == goal,
    )
    .map(|tiles| Path {
        tiles: tiles.into(),
    })
}
