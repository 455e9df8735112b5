//! The level's tile grid.
//!
//! Tiles are laid out row-major with row 0 at the bottom. Tile `(x, y)` is
//! centred at `origin + (x, y) * TILE_SIZE`.

use glam::Vec2;
use ledge_common::{LevelError, TileCoord};
use serde::{Deserialize, Serialize};

use crate::slopes::{TileCollisionType, TILE_SIZE};

const TILE: f32 = TILE_SIZE as f32;

/// What lies beyond the edges of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// Out-of-bounds tiles are full blocks
    #[default]
    Solid,
    /// Out-of-bounds tiles are empty
    Open,
}

/// Fixed-size grid of tile collision types.
#[derive(Debug, Clone)]
pub struct TileMap {
    width: i32,
    height: i32,
    origin: Vec2,
    border: BorderPolicy,
    tiles: Vec<TileCollisionType>,
}

impl TileMap {
    /// Creates a map filled with empty tiles.
    pub fn new(width: i32, height: i32, origin: Vec2) -> Result<Self, LevelError> {
        if width <= 0 || height <= 0 {
            return Err(LevelError::Empty);
        }
        Ok(Self {
            width,
            height,
            origin,
            border: BorderPolicy::default(),
            tiles: vec![TileCollisionType::EMPTY; (width * height) as usize],
        })
    }

    /// Creates a map from row-major tiles, bottom row first.
    pub fn from_tiles(
        width: i32,
        height: i32,
        origin: Vec2,
        tiles: Vec<TileCollisionType>,
    ) -> Result<Self, LevelError> {
        let mut map = Self::new(width, height, origin)?;
        if tiles.len() != map.tiles.len() {
            return Err(LevelError::DimensionMismatch {
                expected: map.tiles.len(),
                actual: tiles.len(),
            });
        }
        map.tiles = tiles;
        Ok(map)
    }

    /// Sets the border policy.
    #[must_use]
    pub fn with_border(mut self, border: BorderPolicy) -> Self {
        self.border = border;
        self
    }

    /// Map width in tiles.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Map height in tiles.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// World position of the centre of tile (0, 0).
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Border policy in effect.
    #[must_use]
    pub const fn border(&self) -> BorderPolicy {
        self.border
    }

    /// Whether the tile lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Overwrites a tile. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, x: i32, y: i32, collision: TileCollisionType) {
        if self.in_bounds(x, y) {
            let index = (y * self.width + x) as usize;
            self.tiles[index] = collision;
        }
    }

    /// Collision type at a tile, applying the border policy outside the grid.
    #[must_use]
    pub fn collision_type(&self, x: i32, y: i32) -> TileCollisionType {
        if !self.in_bounds(x, y) {
            return match self.border {
                BorderPolicy::Solid => TileCollisionType::FULL,
                BorderPolicy::Open => TileCollisionType::EMPTY,
            };
        }
        self.tiles[(y * self.width + x) as usize]
    }

    /// Whether a tile is a solid full block.
    #[must_use]
    pub fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.collision_type(x, y) == TileCollisionType::FULL
    }

    /// Whether every tile touched by the box from `min` to `max` is empty.
    ///
    /// Edges lying exactly on a tile boundary do not touch the neighbour.
    #[must_use]
    pub fn is_region_empty(&self, min: Vec2, max: Vec2) -> bool {
        let (x0, x1) = (self.tile_x_at(min.x + 0.5), self.tile_x_at(max.x - 0.5));
        let (y0, y1) = (self.tile_y_at(min.y + 0.5), self.tile_y_at(max.y - 0.5));
        (y0..=y1).all(|y| (x0..=x1).all(|x| self.collision_type(x, y).is_empty()))
    }

    /// Column containing world x.
    #[must_use]
    pub fn tile_x_at(&self, x: f32) -> i32 {
        ((x - self.origin.x + TILE / 2.0) / TILE).floor() as i32
    }

    /// Row containing world y.
    #[must_use]
    pub fn tile_y_at(&self, y: f32) -> i32 {
        ((y - self.origin.y + TILE / 2.0) / TILE).floor() as i32
    }

    /// Tile containing a world point.
    #[must_use]
    pub fn tile_at_point(&self, point: Vec2) -> TileCoord {
        TileCoord::new(self.tile_x_at(point.x), self.tile_y_at(point.y))
    }

    /// World position of a tile's centre.
    #[must_use]
    pub fn tile_position(&self, x: i32, y: i32) -> Vec2 {
        self.origin + Vec2::new(x as f32, y as f32) * TILE
    }

    /// World y of the top edge of tiles in row `y`.
    #[must_use]
    pub fn tile_top(&self, y: i32) -> f32 {
        self.origin.y + y as f32 * TILE + TILE / 2.0
    }

    /// World-space bounds of the whole grid as (min, max).
    #[must_use]
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::splat(TILE / 2.0);
        (
            self.origin - half,
            self.tile_position(self.width - 1, self.height - 1) + half,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_tile() {
        let map = TileMap::new(4, 4, Vec2::ZERO).expect("map");
        assert_eq!(map.tile_at_point(Vec2::new(0.0, 0.0)), TileCoord::new(0, 0));
        assert_eq!(map.tile_at_point(Vec2::new(7.9, 8.0)), TileCoord::new(0, 1));
        assert_eq!(map.tile_at_point(Vec2::new(-8.5, 23.0)), TileCoord::new(-1, 1));
        assert_eq!(map.tile_position(2, 1), Vec2::new(32.0, 16.0));
        assert_eq!(map.tile_top(0), 8.0);
    }

    #[test]
    fn test_border_policy() {
        let solid = TileMap::new(2, 2, Vec2::ZERO).expect("map");
        assert_eq!(solid.collision_type(-1, 0), TileCollisionType::FULL);
        assert!(solid.is_obstacle(0, 2));

        let open = solid.with_border(BorderPolicy::Open);
        assert_eq!(open.collision_type(5, 5), TileCollisionType::EMPTY);
        assert!(!open.is_obstacle(-1, -1));
    }

    #[test]
    fn test_from_tiles_checks_length() {
        let err = TileMap::from_tiles(2, 2, Vec2::ZERO, vec![TileCollisionType::FULL; 3]);
        assert_eq!(
            err.err(),
            Some(LevelError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert!(TileMap::new(0, 3, Vec2::ZERO).is_err());
    }

    #[test]
    fn test_region_empty() {
        let mut map = TileMap::new(6, 6, Vec2::ZERO).expect("map");
        map.set_tile(1, 0, TileCollisionType::FULL);
        map.set_tile(3, 1, TileCollisionType::ONE_WAY_FULL);

        // Resting on tile (1, 0) and flush against tile (3, 1).
        assert!(map.is_region_empty(Vec2::new(8.0, 8.0), Vec2::new(40.0, 40.0)));
        assert!(!map.is_region_empty(Vec2::new(8.0, 8.0), Vec2::new(41.0, 40.0)));
        assert!(!map.is_region_empty(Vec2::new(8.0, 7.0), Vec2::new(20.0, 40.0)));
        // Outside the map the solid border counts.
        assert!(!map.is_region_empty(Vec2::new(-12.0, 40.0), Vec2::new(4.0, 60.0)));
        assert!(map.with_border(BorderPolicy::Open).is_region_empty(Vec2::new(-40.0, 40.0), Vec2::new(-20.0, 60.0)));
    }

    #[test]
    fn test_set_tile_and_bounds() {
        let mut map = TileMap::new(3, 2, Vec2::new(8.0, 8.0)).expect("map");
        map.set_tile(2, 1, TileCollisionType::ONE_WAY_FULL);
        map.set_tile(9, 9, TileCollisionType::FULL);
        assert_eq!(map.collision_type(2, 1), TileCollisionType::ONE_WAY_FULL);
        assert!(!map.is_obstacle(2, 1));
        assert_eq!(map.bounds(), (Vec2::ZERO, Vec2::new(48.0, 32.0)));
    }
}
