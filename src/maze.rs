//! Static maze grid and the ASCII level loader.
//!
//! The grid is built once per level and is read-only afterwards. Every
//! query is total: anything outside the grid reads as a wall.

use std::path::Path as FsPath;

use bevy::prelude::*;
use micromegas_tracing::prelude::info;
use serde::{Deserialize, Serialize};

use crate::error::MazeError;
use crate::geometry::{self, Rect, TilePos};

// ---------------------------------------------------------------------------
// Cell kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Floor,
}

/// Which neighbors count as adjacent when planning a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    #[default]
    Four,
    Eight,
}

const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Immutable wall/floor lookup over a row/column grid.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MazeGrid {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
    tile_edge: f32,
}

impl MazeGrid {
    /// Build a grid from rows of cells. Rows must all have the same length.
    pub fn from_cells(rows: Vec<Vec<CellKind>>, tile_edge: f32) -> Result<Self, MazeError> {
        if !(tile_edge.is_finite() && tile_edge > 0.0) {
            return Err(MazeError::InvalidTileEdge(tile_edge));
        }
        let Some(first) = rows.first() else {
            return Err(MazeError::Empty);
        };
        let cols = first.len();
        if cols == 0 {
            return Err(MazeError::ZeroWidth);
        }
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != cols)
        {
            return Err(MazeError::RaggedRow {
                row,
                found,
                expected: cols,
            });
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
            tile_edge,
        })
    }

    /// `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn tile_edge(&self) -> f32 {
        self.tile_edge
    }

    /// Cell kind at a tile, or None if out of bounds.
    pub fn cell(&self, tile: TilePos) -> Option<CellKind> {
        if tile.row < 0 || tile.col < 0 {
            return None;
        }
        let (row, col) = (tile.row as usize, tile.col as usize);
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    pub fn is_wall_at_tile(&self, row: i32, col: i32) -> bool {
        self.is_wall(TilePos::new(row, col))
    }

    /// Out-of-bounds tiles are walls.
    pub fn is_wall(&self, tile: TilePos) -> bool {
        self.cell(tile) != Some(CellKind::Floor)
    }

    pub fn is_floor(&self, tile: TilePos) -> bool {
        !self.is_wall(tile)
    }

    /// True if any tile overlapped by `[x, x + width) × [y, y + height)` is a
    /// wall. Every tile the box spans is checked, not just its corners.
    pub fn is_wall_at_pixel_region(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        let (first_col, last_col) = geometry::covered_tiles(x, width, self.tile_edge);
        let (first_row, last_row) = geometry::covered_tiles(y, height, self.tile_edge);
        (first_row..=last_row)
            .any(|row| (first_col..=last_col).any(|col| self.is_wall_at_tile(row, col)))
    }

    pub fn is_region_blocked(&self, region: Rect) -> bool {
        self.is_wall_at_pixel_region(region.x, region.y, region.width, region.height)
    }

    /// Floor neighbors of a tile in expansion order: up, down, left, right,
    /// then (for eight-way) the diagonals. A diagonal step is only offered
    /// when both orthogonal cells beside it are floor, so routes never cut a
    /// wall corner.
    pub fn floor_neighbors(&self, tile: TilePos, connectivity: Connectivity) -> Vec<TilePos> {
        let mut out: Vec<TilePos> = ORTHOGONAL
            .iter()
            .map(|&(dr, dc)| tile.offset(dr, dc))
            .filter(|n| self.is_floor(*n))
            .collect();

        if connectivity == Connectivity::Eight {
            out.extend(
                DIAGONAL
                    .iter()
                    .filter(|&&(dr, dc)| {
                        self.is_floor(tile.offset(dr, 0)) && self.is_floor(tile.offset(0, dc))
                    })
                    .map(|&(dr, dc)| tile.offset(dr, dc))
                    .filter(|n| self.is_floor(*n)),
            );
        }
        out
    }

    /// All floor tiles in row-major order.
    pub fn floor_tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            (*cell == CellKind::Floor).then(|| {
                TilePos::new((i / self.cols) as i32, (i % self.cols) as i32)
            })
        })
    }

    /// Tile under a square body whose top-left corner is at `origin`.
    pub fn tile_under(&self, origin: Vec2, size: f32) -> TilePos {
        geometry::tile_under(origin, size, self.tile_edge)
    }

    /// Top-left position that centers a square body of `size` in `tile`.
    pub fn tile_center_origin(&self, tile: TilePos, size: f32) -> Vec2 {
        geometry::tile_center_origin(tile, size, self.tile_edge)
    }
}

// ---------------------------------------------------------------------------
// Level loader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Wall,
    Floor,
    TargetSpawn,
    PursuerSpawn,
}

impl Glyph {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '#' | 'X' => Some(Glyph::Wall),
            ' ' | '.' => Some(Glyph::Floor),
            'P' => Some(Glyph::TargetSpawn),
            'G' => Some(Glyph::PursuerSpawn),
            _ => None,
        }
    }

    fn cell(self) -> CellKind {
        match self {
            Glyph::Wall => CellKind::Wall,
            _ => CellKind::Floor,
        }
    }
}

/// A parsed level: the logical grid plus its spawn markers.
#[derive(Debug, Clone)]
pub struct MazeLayout {
    pub grid: MazeGrid,
    pub target_spawn: TilePos,
    pub pursuer_spawns: Vec<TilePos>,
}

impl MazeLayout {
    /// Parse an ASCII maze: `#`/`X` wall, space/`.` floor, `P` target spawn,
    /// `G` pursuer spawn. Trailing blank lines are ignored.
    pub fn parse(text: &str, tile_edge: f32) -> Result<Self, MazeError> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let mut rows = Vec::with_capacity(lines.len());
        let mut target_spawn = None;
        let mut pursuer_spawns = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let mut cells = Vec::with_capacity(line.len());
            for (col, ch) in line.chars().enumerate() {
                let glyph = Glyph::from_char(ch).ok_or(MazeError::UnknownTile { ch, row, col })?;
                let pos = TilePos::new(row as i32, col as i32);
                match glyph {
                    Glyph::TargetSpawn => {
                        if target_spawn.is_some() {
                            return Err(MazeError::DuplicateTargetSpawn { row, col });
                        }
                        target_spawn = Some(pos);
                    }
                    Glyph::PursuerSpawn => pursuer_spawns.push(pos),
                    _ => {}
                }
                cells.push(glyph.cell());
            }
            rows.push(cells);
        }

        let grid = MazeGrid::from_cells(rows, tile_edge)?;
        let target_spawn = target_spawn.ok_or(MazeError::MissingTargetSpawn)?;

        Ok(Self {
            grid,
            target_spawn,
            pursuer_spawns,
        })
    }

    /// Read and parse a maze file.
    pub fn load(path: impl AsRef<FsPath>, tile_edge: f32) -> Result<Self, MazeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MazeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let layout = Self::parse(&text, tile_edge)?;
        let (rows, cols) = layout.grid.dimensions();
        info!("maze loaded: {} ({}x{})", path.display(), cols, rows);
        Ok(layout)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MAZE: &str = "\
#####
#P  #
# # #
#G  #
#####";

    fn layout() -> MazeLayout {
        MazeLayout::parse(TEST_MAZE, 32.0).unwrap()
    }

    #[test]
    fn parse_small_maze() {
        let maze = layout();
        assert_eq!(maze.grid.dimensions(), (5, 5));
        assert_eq!(maze.target_spawn, TilePos::new(1, 1));
        assert_eq!(maze.pursuer_spawns, vec![TilePos::new(3, 1)]);
        // Spawn markers are floor
        assert!(maze.grid.is_floor(TilePos::new(1, 1)));
        assert!(maze.grid.is_floor(TilePos::new(3, 1)));
    }

    #[test]
    fn out_of_bounds_is_wall() {
        let grid = layout().grid;
        assert!(grid.is_wall_at_tile(-1, 2));
        assert!(grid.is_wall_at_tile(2, -1));
        assert!(grid.is_wall_at_tile(5, 2));
        assert!(grid.is_wall_at_tile(2, 5));
        assert!(grid.is_wall_at_tile(i32::MAX, i32::MIN));
    }

    #[test]
    fn pixel_region_checks_intermediate_tiles() {
        // Column 2 of row 2 is the only interior wall
        let grid = layout().grid;
        // A box from the middle of (1,1) to the middle of (3,1): corners are all floor
        assert!(!grid.is_wall_at_pixel_region(40.0, 40.0, 10.0, 70.0));
        // A tall box in column 2 whose corners sit in floor rows 1 and 3 but
        // whose middle crosses the wall at (2,2)
        assert!(grid.is_wall_at_pixel_region(70.0, 40.0, 10.0, 70.0));
        // A wide box in row 2 spanning columns 1..=3 crosses the same wall
        assert!(grid.is_wall_at_pixel_region(40.0, 70.0, 70.0, 10.0));
    }

    #[test]
    fn pixel_region_edge_is_exclusive() {
        let grid = layout().grid;
        // Exactly tile (1,1): its right edge touches column 2 but does not enter it
        assert!(!grid.is_wall_at_pixel_region(32.0, 32.0, 32.0, 32.0));
        // Exactly tile (2,1) touches the wall at (2,2) only at its right edge
        assert!(!grid.is_wall_at_pixel_region(32.0, 64.0, 32.0, 32.0));
        // Nudged right by a pixel, it overlaps the wall
        assert!(grid.is_wall_at_pixel_region(33.0, 64.0, 32.0, 32.0));
    }

    #[test]
    fn queries_are_idempotent() {
        let grid = layout().grid;
        let before = grid.clone();
        for _ in 0..3 {
            assert!(grid.is_wall_at_tile(2, 2));
            assert!(grid.is_wall_at_pixel_region(70.0, 40.0, 10.0, 70.0));
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn four_way_neighbors_in_expansion_order() {
        let grid = layout().grid;
        assert_eq!(
            grid.floor_neighbors(TilePos::new(1, 2), Connectivity::Four),
            vec![TilePos::new(1, 1), TilePos::new(1, 3)]
        );
        assert_eq!(
            grid.floor_neighbors(TilePos::new(2, 1), Connectivity::Four),
            vec![TilePos::new(1, 1), TilePos::new(3, 1)]
        );
    }

    #[test]
    fn diagonal_neighbors_never_cut_corners() {
        let grid = MazeLayout::parse("#####\n#P  #\n#   #\n#  ##\n#####", 32.0)
            .unwrap()
            .grid;
        let from_center = grid.floor_neighbors(TilePos::new(2, 2), Connectivity::Eight);
        assert!(from_center.contains(&TilePos::new(1, 1)));
        assert!(from_center.contains(&TilePos::new(1, 3)));
        assert!(from_center.contains(&TilePos::new(3, 1)));
        // (3,3) is a wall, so the diagonal to it is never offered
        assert!(!from_center.contains(&TilePos::new(3, 3)));

        // From (3,2): the diagonal to (2,3) passes the wall corner at (3,3)
        let from_bottom = grid.floor_neighbors(TilePos::new(3, 2), Connectivity::Eight);
        assert!(!from_bottom.contains(&TilePos::new(2, 3)));
        assert!(from_bottom.contains(&TilePos::new(2, 1)));
    }

    #[test]
    fn floor_tiles_enumerates_row_major() {
        let grid = layout().grid;
        let tiles: Vec<_> = grid.floor_tiles().collect();
        assert_eq!(tiles.len(), 8);
        assert_eq!(tiles[0], TilePos::new(1, 1));
        assert!(tiles.iter().all(|t| grid.is_floor(*t)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = MazeLayout::parse("#####\n#P #\n#####", 32.0);
        assert!(matches!(
            result,
            Err(MazeError::RaggedRow {
                row: 1,
                found: 4,
                expected: 5
            })
        ));
    }

    #[test]
    fn from_cells_validates_shape() {
        assert!(matches!(
            MazeGrid::from_cells(vec![], 32.0),
            Err(MazeError::Empty)
        ));
        assert!(matches!(
            MazeGrid::from_cells(vec![vec![]], 32.0),
            Err(MazeError::ZeroWidth)
        ));
        assert!(matches!(
            MazeGrid::from_cells(vec![vec![CellKind::Floor]], 0.0),
            Err(MazeError::InvalidTileEdge(_))
        ));
        assert!(matches!(
            MazeGrid::from_cells(vec![vec![CellKind::Floor]], f32::NAN),
            Err(MazeError::InvalidTileEdge(_))
        ));
    }

    #[test]
    fn malformed_maze_no_target() {
        let result = MazeLayout::parse("####\n#G #\n####", 32.0);
        assert!(matches!(result, Err(MazeError::MissingTargetSpawn)));
    }

    #[test]
    fn malformed_maze_bad_char() {
        let result = MazeLayout::parse("####\n#P?#\n####", 32.0);
        let err = result.unwrap_err();
        assert!(matches!(err, MazeError::UnknownTile { ch: '?', row: 1, col: 2 }));
        assert!(err.to_string().contains("unknown tile character"));
    }

    #[test]
    fn malformed_maze_duplicate_target() {
        let result = MazeLayout::parse("####\n#PP#\n####", 32.0);
        assert!(matches!(
            result,
            Err(MazeError::DuplicateTargetSpawn { row: 1, col: 2 })
        ));
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let maze = MazeLayout::parse("###\n#P#\n###\n\n", 32.0).unwrap();
        assert_eq!(maze.grid.dimensions(), (3, 3));
    }

    #[test]
    fn x_is_an_alternate_wall_glyph() {
        let maze = MazeLayout::parse("XXX\nXPX\nXXX", 20.0).unwrap();
        assert!(maze.grid.is_wall_at_tile(0, 0));
        assert!(!maze.grid.is_wall_at_tile(1, 1));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = MazeLayout::load("assets/maps/does_not_exist.txt", 32.0);
        assert!(matches!(result, Err(MazeError::Io { .. })));
    }

    #[test]
    fn parse_all_map_files() {
        for name in &["crypt", "graveyard"] {
            let path = format!("assets/maps/{}.txt", name);
            let maze = MazeLayout::load(&path, 32.0)
                .unwrap_or_else(|e| panic!("Failed to load {}: {}", path, e));
            assert!(
                !maze.pursuer_spawns.is_empty(),
                "{} has no pursuer spawns",
                name
            );
        }
    }
}
