//! Coordinate types for the tile grid and the broad-phase area grid.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Integer coordinate of a tile in the map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column, growing to the right
    pub x: i32,
    /// Row, growing upwards
    pub y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the area-grid bucket containing this tile.
    ///
    /// Uses floor division so negative tiles land in negative areas;
    /// callers clamp to the grid.
    #[must_use]
    pub fn to_area(self, area_width: i32, area_height: i32) -> AreaCoord {
        AreaCoord::new(
            self.x.div_euclid(area_width.max(1)),
            self.y.div_euclid(area_height.max(1)),
        )
    }

    /// Returns the tile one step away in the given direction.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<IVec2> for TileCoord {
    fn from(v: IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<TileCoord> for IVec2 {
    fn from(c: TileCoord) -> Self {
        IVec2::new(c.x, c.y)
    }
}

/// Coordinate of a bucket in the spatial area grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AreaCoord {
    /// Bucket column
    pub x: i32,
    /// Bucket row
    pub y: i32,
}

impl AreaCoord {
    /// Creates a new area coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Clamps the coordinate into a grid of `columns` x `rows` buckets.
    #[must_use]
    pub fn clamped(self, columns: i32, rows: i32) -> Self {
        Self::new(
            self.x.clamp(0, (columns - 1).max(0)),
            self.y.clamp(0, (rows - 1).max(0)),
        )
    }
}
