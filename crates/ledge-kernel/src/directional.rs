//! Directional tile collision.
//!
//! Four predicates, one per side, check the row or column of pixels a body
//! is about to enter. They combine [`get_offset`] answers over every tile
//! touched by that strip and decide between "blocked" and "climb by a
//! small vertical nudge". When called as a committed move (`mv == true`)
//! they may shift the tentative position in place, so a nudge is visible to
//! every later query in the same tick.

use glam::Vec2;
use ledge_common::TileCoord;

use crate::position_state::PositionState;
use crate::slopes::TileCollisionType;
use crate::tile_map::TileMap;
use crate::tile_query::get_offset;

/// Tentative placement of a body while it is stepped through the grid.
///
/// Edges are whole pixels: the body covers `[bottom_left, top_right)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveContext {
    /// Body position
    pub position: Vec2,
    /// Bottom-left corner of the box
    pub bottom_left: Vec2,
    /// Top-right corner of the box
    pub top_right: Vec2,
}

impl MoveContext {
    /// Builds the context for a body at `position` whose box is centred at
    /// `position + aabb_offset`.
    #[must_use]
    pub fn new(position: Vec2, aabb_offset: Vec2, half_size: Vec2) -> Self {
        let center = position + aabb_offset;
        Self {
            position,
            bottom_left: (center - half_size).round(),
            top_right: (center + half_size).round(),
        }
    }

    /// Moves position and edges together.
    pub fn shift(&mut self, dx: f32, dy: f32) {
        let delta = Vec2::new(dx, dy);
        self.position += delta;
        self.bottom_left += delta;
        self.top_right += delta;
    }

    /// Copy moved by `(dx, dy)`.
    #[must_use]
    pub fn shifted(mut self, dx: f32, dy: f32) -> Self {
        self.shift(dx, dy);
        self
    }
}

/// Best floor found under a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundHit {
    /// Vertical move that puts the body's bottom on the surface
    pub shift: i32,
    /// Supporting tile
    pub tile: TileCoord,
    /// Whether the supporting tile is one-way
    pub one_way: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    const fn step(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Tile collision for one body against one map.
#[derive(Debug, Clone, Copy)]
pub struct TileCollider<'a> {
    map: &'a TileMap,
    slope_wall_height: i32,
    ignores_one_way: bool,
}

impl<'a> TileCollider<'a> {
    /// Creates a collider. Slopes needing a nudge of `slope_wall_height`
    /// pixels or more act as walls.
    #[must_use]
    pub const fn new(map: &'a TileMap, slope_wall_height: i32, ignores_one_way: bool) -> Self {
        Self {
            map,
            slope_wall_height,
            ignores_one_way,
        }
    }

    /// The map being queried.
    #[must_use]
    pub const fn map(&self) -> &'a TileMap {
        self.map
    }

    /// Checks the pixel column right of the body.
    pub fn collides_right(&self, ctx: &mut MoveContext, state: &mut PositionState, mv: bool) -> bool {
        self.collides_side(ctx, state, mv, Side::Right)
    }

    /// Checks the pixel column left of the body.
    pub fn collides_left(&self, ctx: &mut MoveContext, state: &mut PositionState, mv: bool) -> bool {
        self.collides_side(ctx, state, mv, Side::Left)
    }

    /// Checks the pixel row under the body, or the rows within the slope
    /// wall height while the body sticks to slopes.
    pub fn collides_bottom(&self, ctx: &mut MoveContext, state: &mut PositionState, mv: bool) -> bool {
        let depth = if state.tmp_sticks_to_slope {
            self.slope_wall_height.max(1)
        } else {
            1
        };
        let Some(hit) = self.ground_contact(ctx, state, depth) else {
            return false;
        };

        if mv && hit.shift != 0 {
            ctx.shift(0.0, hit.shift as f32);
        }
        state.pushes_bottom_tile = true;
        state.bottom_tile = Some(hit.tile);
        state.on_one_way_platform = hit.one_way;
        true
    }

    /// Checks the pixel row above the body. One-way tiles never block.
    pub fn collides_top(&self, ctx: &mut MoveContext, state: &mut PositionState, mv: bool) -> bool {
        let map = self.map;
        let left = ctx.bottom_left.x;
        let right = ctx.top_right.x;
        let bottom = ctx.top_right.y;
        let row = map.tile_y_at(bottom + 0.5);

        let mut best: Option<(i32, TileCoord)> = None;
        for tile_x in map.tile_x_at(left + 0.5)..=map.tile_x_at(right - 0.5) {
            let collision = map.collision_type(tile_x, row);
            if collision.is_empty() || collision.is_one_way() {
                continue;
            }
            let offset = get_offset(map.tile_position(tile_x, row), left, right, bottom, bottom + 1.0, collision);
            if !offset.overlaps() {
                continue;
            }
            if best.map_or(true, |(contact, _)| offset.colliding_top < contact) {
                best = Some((offset.colliding_top, TileCoord::new(tile_x, row)));
            }
        }

        let Some((contact, tile)) = best else {
            return false;
        };
        let shift = contact + 1;
        if mv && shift < 0 {
            ctx.shift(0.0, shift as f32);
        }
        state.pushes_top_tile = true;
        state.top_tile = Some(tile);
        true
    }

    /// Highest floor within `depth` pixels under the body.
    ///
    /// One-way tiles only count when their surface is not above the body's
    /// bottom edge.
    #[must_use]
    pub fn ground_contact(&self, ctx: &MoveContext, state: &PositionState, depth: i32) -> Option<GroundHit> {
        let map = self.map;
        let depth = depth.max(1);
        let left = ctx.bottom_left.x;
        let right = ctx.top_right.x;
        let top = ctx.bottom_left.y;
        let bottom = top - depth as f32;

        let mut best: Option<GroundHit> = None;
        let mut best_support = 0;
        for tile_y in (map.tile_y_at(bottom + 0.5)..=map.tile_y_at(top - 0.5)).rev() {
            for tile_x in map.tile_x_at(left + 0.5)..=map.tile_x_at(right - 0.5) {
                let collision = map.collision_type(tile_x, tile_y);
                if collision.is_empty() {
                    continue;
                }
                let one_way = collision.is_one_way();
                if one_way && self.skips_one_way(state) {
                    continue;
                }

                let offset = get_offset(map.tile_position(tile_x, tile_y), left, right, bottom, top, collision);
                let support = offset.colliding_bottom;
                if support <= best_support || (one_way && support > depth) {
                    continue;
                }
                best_support = support;
                best = Some(GroundHit {
                    shift: support - depth,
                    tile: TileCoord::new(tile_x, tile_y),
                    one_way,
                });
            }
        }
        best
    }

    fn skips_one_way(&self, state: &PositionState) -> bool {
        self.ignores_one_way || state.tmp_ignores_one_way
    }

    fn collides_side(&self, ctx: &mut MoveContext, state: &mut PositionState, mv: bool, side: Side) -> bool {
        let map = self.map;
        let (column, tile_x) = match side {
            Side::Right => (ctx.top_right.x, map.tile_x_at(ctx.top_right.x + 0.5)),
            Side::Left => (ctx.bottom_left.x - 1.0, map.tile_x_at(ctx.bottom_left.x - 0.5)),
        };
        let bottom = ctx.bottom_left.y;
        let top = ctx.top_right.y;
        let lowest_row = map.tile_y_at(bottom + 0.5);

        let mut nudge: i32 = 0;
        let mut nudge_tile = None;
        for tile_y in lowest_row..=map.tile_y_at(top - 0.5) {
            let collision = map.collision_type(tile_x, tile_y);
            if collision.is_empty() {
                continue;
            }
            let tile = TileCoord::new(tile_x, tile_y);
            let one_way = collision.is_one_way();
            if one_way && (!mv || tile_y != lowest_row || self.skips_one_way(state)) {
                continue;
            }
            if collision == TileCollisionType::FULL {
                return block(state, side, tile);
            }

            let offset = get_offset(map.tile_position(tile_x, tile_y), column, column + 1.0, bottom, top, collision);
            let candidate = offset.vertical_escape();
            if candidate == 0 {
                continue;
            }
            if one_way {
                // One-way tiles can be stepped onto but never act as walls.
                if candidate < 0 || candidate >= self.slope_wall_height {
                    continue;
                }
            } else if candidate.abs() >= self.slope_wall_height
                || (candidate < 0 && state.pushes_bottom_tile)
                || (candidate > 0 && state.pushes_top_tile)
            {
                return block(state, side, tile);
            }

            if candidate.abs() > nudge.abs() {
                nudge = candidate;
                nudge_tile = Some(tile);
            }
        }

        if nudge != 0 {
            let mut probe = ctx.shifted(side.step(), (nudge - nudge.signum()) as f32);
            let mut scratch = PositionState::default();
            let obstructed = if nudge > 0 {
                self.collides_top(&mut probe, &mut scratch, false)
            } else {
                self.collides_bottom(&mut probe, &mut scratch, false)
            };
            if obstructed {
                if let Some(tile) = nudge_tile {
                    return block(state, side, tile);
                }
            }

            if mv {
                ctx.shift(0.0, nudge as f32);
                if nudge > 0 {
                    state.pushes_bottom_tile = true;
                    state.bottom_tile = nudge_tile;
                } else {
                    state.pushes_top_tile = true;
                    state.top_tile = nudge_tile;
                }
            }
            return false;
        }

        if mv && self.slope_wall_height > 0 && (state.pushes_bottom_tile || state.tmp_sticks_to_slope) {
            let probe = ctx.shifted(side.step(), 0.0);
            if let Some(hit) = self.ground_contact(&probe, state, self.slope_wall_height) {
                if hit.shift < 0 {
                    ctx.shift(0.0, hit.shift as f32);
                    state.pushes_bottom_tile = true;
                    state.bottom_tile = Some(hit.tile);
                    state.on_one_way_platform = hit.one_way;
                }
            }
        }
        false
    }
}

fn block(state: &mut PositionState, side: Side, tile: TileCoord) -> bool {
    match side {
        Side::Right => {
            state.pushes_right_tile = true;
            state.right_tile = Some(tile);
        },
        Side::Left => {
            state.pushes_left_tile = true;
            state.left_tile = Some(tile);
        },
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slopes::{Orientation, SlopeShape};
    use crate::tile_map::BorderPolicy;

    /// 10x6 open map with a solid floor on row 0 (top edge at y = 8).
    fn floor_map() -> TileMap {
        let mut map = TileMap::new(10, 6, Vec2::ZERO)
            .expect("map")
            .with_border(BorderPolicy::Open);
        for x in 0..10 {
            map.set_tile(x, 0, TileCollisionType::FULL);
        }
        map
    }

    /// 12x16 box standing on the floor with its right edge at x = 40.
    fn body_on_floor() -> MoveContext {
        MoveContext::new(Vec2::new(34.0, 16.0), Vec2::ZERO, Vec2::new(6.0, 8.0))
    }

    #[test]
    fn test_context_edges() {
        let ctx = body_on_floor();
        assert_eq!(ctx.bottom_left, Vec2::new(28.0, 8.0));
        assert_eq!(ctx.top_right, Vec2::new(40.0, 24.0));
        let moved = ctx.shifted(2.0, -1.0);
        assert_eq!(moved.position, Vec2::new(36.0, 15.0));
        assert_eq!(moved.top_right, Vec2::new(42.0, 23.0));
    }

    #[test]
    fn test_full_tile_is_wall() {
        let mut map = floor_map();
        map.set_tile(3, 1, TileCollisionType::FULL);
        let collider = TileCollider::new(&map, 4, false);
        let mut ctx = body_on_floor();
        let mut state = PositionState::default();

        assert!(collider.collides_right(&mut ctx, &mut state, true));
        assert!(state.pushes_right_tile);
        assert_eq!(state.right_tile, Some(TileCoord::new(3, 1)));
        assert_eq!(ctx, body_on_floor());
    }

    #[test]
    fn test_low_slope_nudges_up() {
        let mut map = floor_map();
        map.set_tile(3, 1, TileCollisionType::slope(SlopeShape::Slope45, Orientation::Identity));
        let collider = TileCollider::new(&map, 4, false);
        let mut ctx = body_on_floor();
        let mut state = PositionState::default();

        assert!(!collider.collides_right(&mut ctx, &mut state, true));
        assert_eq!(ctx.bottom_left.y, 9.0);
        assert!(state.pushes_bottom_tile);
        assert!(!state.pushes_right_tile);
    }

    #[test]
    fn test_nudge_then_left_query_is_clear() {
        let mut map = floor_map();
        map.set_tile(3, 1, TileCollisionType::slope(SlopeShape::Slope45, Orientation::Identity));
        let collider = TileCollider::new(&map, 4, false);
        let mut ctx = body_on_floor();
        let mut state = PositionState::default();

        assert!(!collider.collides_right(&mut ctx, &mut state, true));
        ctx.shift(1.0, 0.0);
        assert!(!collider.collides_left(&mut ctx, &mut state, false));
        assert!(!state.pushes_left_tile);
    }

    #[test]
    fn test_tall_step_is_wall() {
        let mut map = floor_map();
        map.set_tile(3, 1, TileCollisionType::slope(SlopeShape::HalfBlock, Orientation::Identity));
        let collider = TileCollider::new(&map, 4, false);
        let mut ctx = body_on_floor();
        let mut state = PositionState::default();

        assert!(collider.collides_right(&mut ctx, &mut state, true));
        assert_eq!(state.right_tile, Some(TileCoord::new(3, 1)));
    }

    #[test]
    fn test_nudge_blocked_by_ceiling() {
        let mut map = floor_map();
        map.set_tile(3, 1, TileCollisionType::slope(SlopeShape::Slope45, Orientation::Identity));
        map.set_tile(2, 2, TileCollisionType::FULL);
        map.set_tile(3, 2, TileCollisionType::FULL);
        let collider = TileCollider::new(&map, 4, false);
        let mut ctx = body_on_floor();
        let mut state = PositionState::default();

        assert!(collider.collides_right(&mut ctx, &mut state, true));
        assert_eq!(ctx.bottom_left.y, 8.0);
    }

    #[test]
    fn test_one_way_ignored_outside_moves() {
        let mut map = floor_map();
        map.set_tile(3, 1, TileCollisionType::ONE_WAY_FULL);
        let collider = TileCollider::new(&map, 4, false);
        let mut ctx = body_on_floor();
        let mut state = PositionState::default();

        assert!(!collider.collides_right(&mut ctx, &mut state, false));
        // The whole block is above the body's bottom: never a wall.
        assert!(!collider.collides_right(&mut ctx, &mut state, true));
        assert_eq!(ctx, body_on_floor());
    }

    #[test]
    fn test_bottom_resting_and_embedded() {
        let map = floor_map();
        let collider = TileCollider::new(&map, 4, false);
        let mut state = PositionState::default();

        let mut resting = body_on_floor();
        assert!(collider.collides_bottom(&mut resting, &mut state, true));
        assert_eq!(resting.bottom_left.y, 8.0);
        assert_eq!(state.bottom_tile, Some(TileCoord::new(2, 0)));

        let mut embedded = body_on_floor().shifted(0.0, -2.0);
        assert!(collider.collides_bottom(&mut embedded, &mut state, true));
        assert_eq!(embedded.bottom_left.y, 8.0);

        let mut airborne = body_on_floor().shifted(0.0, 3.0);
        let mut fresh = PositionState::default();
        assert!(!collider.collides_bottom(&mut airborne, &mut fresh, true));
        assert!(!fresh.pushes_bottom_tile);
    }

    #[test]
    fn test_sticking_reaches_lower_floor() {
        let map = floor_map();
        let collider = TileCollider::new(&map, 4, false);
        let mut ctx = body_on_floor().shifted(0.0, 3.0);
        let mut state = PositionState {
            tmp_sticks_to_slope: true,
            ..PositionState::default()
        };

        assert!(collider.collides_bottom(&mut ctx, &mut state, true));
        assert_eq!(ctx.bottom_left.y, 8.0);
    }

    #[test]
    fn test_ceiling_contact() {
        let mut map = floor_map();
        map.set_tile(2, 3, TileCollisionType::FULL);
        map.set_tile(3, 3, TileCollisionType::ONE_WAY_FULL);
        let collider = TileCollider::new(&map, 4, false);
        let mut state = PositionState::default();

        let mut touching = body_on_floor().shifted(0.0, 16.0);
        assert!(collider.collides_top(&mut touching, &mut state, true));
        assert_eq!(state.top_tile, Some(TileCoord::new(2, 3)));

        let mut below = body_on_floor().shifted(0.0, 15.0);
        let mut fresh = PositionState::default();
        assert!(!collider.collides_top(&mut below, &mut fresh, true));
    }

    #[test]
    fn test_walking_down_slope_sticks() {
        let mut map = floor_map();
        map.set_tile(3, 1, TileCollisionType::slope(SlopeShape::Slope45, Orientation::FlipX));
        let collider = TileCollider::new(&map, 4, false);
        // Standing on the slope's highest column, box over columns 40..52.
        let mut ctx = MoveContext::new(Vec2::new(46.0, 32.0), Vec2::ZERO, Vec2::new(6.0, 8.0));
        let mut state = PositionState {
            pushes_bottom_tile: true,
            ..PositionState::default()
        };

        assert!(!collider.collides_right(&mut ctx, &mut state, true));
        assert_eq!(ctx.bottom_left.y, 23.0);
        assert!(state.pushes_bottom_tile);
    }
}
