//! What a pursuer does while it has no route: pick an adjacent floor tile to
//! drift toward, or stay put.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::geometry::TilePos;
use crate::maze::{Connectivity, MazeGrid};

/// Fallback movement for the NO_PATH state. Destinations must be floor tiles
/// adjacent to `from`; returning None keeps the pursuer idle.
pub trait WanderStrategy: Send + Sync + std::fmt::Debug {
    fn next_destination(&mut self, grid: &MazeGrid, from: TilePos) -> Option<TilePos>;
}

/// Never moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct Idle;

impl WanderStrategy for Idle {
    fn next_destination(&mut self, _grid: &MazeGrid, _from: TilePos) -> Option<TilePos> {
        None
    }
}

/// Uniformly random adjacent floor tile.
#[derive(Debug)]
pub struct RandomWalk {
    rng: StdRng,
}

impl RandomWalk {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self::new()
    }
}

impl WanderStrategy for RandomWalk {
    fn next_destination(&mut self, grid: &MazeGrid, from: TilePos) -> Option<TilePos> {
        grid.floor_neighbors(from, Connectivity::Four)
            .choose(&mut self.rng)
            .copied()
    }
}

/// Cycles through a fixed list of `(d_row, d_col)` steps, skipping any that
/// would land on a wall.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    steps: Vec<(i32, i32)>,
    next: usize,
}

impl FixedSequence {
    pub fn new(steps: Vec<(i32, i32)>) -> Self {
        Self { steps, next: 0 }
    }
}

impl WanderStrategy for FixedSequence {
    fn next_destination(&mut self, grid: &MazeGrid, from: TilePos) -> Option<TilePos> {
        for _ in 0..self.steps.len() {
            let (d_row, d_col) = self.steps[self.next];
            self.next = (self.next + 1) % self.steps.len();
            let candidate = from.offset(d_row, d_col);
            if from.manhattan(candidate) == 1 && grid.is_floor(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Serializable choice of strategy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WanderKind {
    #[default]
    Idle,
    RandomWalk {
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl WanderKind {
    pub fn build(&self) -> Box<dyn WanderStrategy> {
        match self {
            WanderKind::Idle => Box::new(Idle),
            WanderKind::RandomWalk { seed: Some(seed) } => Box::new(RandomWalk::seeded(*seed)),
            WanderKind::RandomWalk { seed: None } => Box::new(RandomWalk::new()),
        }
    }
}
