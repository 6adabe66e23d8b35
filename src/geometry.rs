//! Tile coordinates, pixel rectangles, and conversions between the two.
//!
//! Pixel space has its origin at the top-left of tile (0, 0); x grows with
//! the column index and y grows with the row index.

use bevy::math::Vec2;

/// Integer tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TilePos {
    pub row: i32,
    pub col: i32,
}

impl TilePos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Manhattan distance in tiles.
    pub fn manhattan(self, other: TilePos) -> u32 {
        (self.row - other.row).unsigned_abs() + (self.col - other.col).unsigned_abs()
    }

    /// Chebyshev distance in tiles (diagonal steps count as one).
    pub fn chebyshev(self, other: TilePos) -> u32 {
        (self.row - other.row)
            .unsigned_abs()
            .max((self.col - other.col).unsigned_abs())
    }
}

/// Axis-aligned box covering `[x, x + width) × [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square box with its top-left corner at `origin`.
    pub fn square(origin: Vec2, size: f32) -> Self {
        Self::new(origin.x, origin.y, size, size)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Overlapping region, if it has positive area. Boxes that only share an
    /// edge do not intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Tile under a square body: `floor((origin + size / 2) / tile_edge)` per axis.
pub fn tile_under(origin: Vec2, size: f32, tile_edge: f32) -> TilePos {
    let center = origin + Vec2::splat(size / 2.0);
    TilePos {
        row: (center.y / tile_edge).floor() as i32,
        col: (center.x / tile_edge).floor() as i32,
    }
}

/// Top-left pixel position that centers a square body of `size` in `tile`.
pub fn tile_center_origin(tile: TilePos, size: f32, tile_edge: f32) -> Vec2 {
    let inset = (tile_edge - size) / 2.0;
    Vec2::new(
        tile.col as f32 * tile_edge + inset,
        tile.row as f32 * tile_edge + inset,
    )
}

/// Inclusive range of tile indices touched by the half-open pixel interval
/// `[start, start + len)`.
pub fn covered_tiles(start: f32, len: f32, tile_edge: f32) -> (i32, i32) {
    let first = (start / tile_edge).floor() as i32;
    let last = ((start + len) / tile_edge).ceil() as i32 - 1;
    (first, last.max(first))
}
