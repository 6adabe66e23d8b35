//! Construction-time failures. Nothing that runs per tick returns an error:
//! unreachable goals and out-of-bounds queries are ordinary results.

use thiserror::Error;

/// A maze asset that cannot be turned into a grid.
#[derive(Debug, Error)]
pub enum MazeError {
    #[error("maze has no rows")]
    Empty,

    #[error("maze has zero width")]
    ZeroWidth,

    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown tile character '{ch}' at row {row}, col {col}")]
    UnknownTile { ch: char, row: usize, col: usize },

    #[error("no target spawn ('P') found in maze")]
    MissingTargetSpawn,

    #[error("multiple target spawns: another 'P' at row {row}, col {col}")]
    DuplicateTargetSpawn { row: usize, col: usize },

    #[error("tile edge must be a positive pixel length, got {0}")]
    InvalidTileEdge(f32),

    #[error("failed to read maze file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A chase configuration that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
