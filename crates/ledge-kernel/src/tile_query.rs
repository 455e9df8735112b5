//! Queries against a single tile.
//!
//! Maps a continuous rectangle into the tile's local pixel grid, applies
//! the orientation encoded in the tile type, reads the canonical table and
//! maps the answer back into world axes.

use glam::Vec2;

use crate::slopes::{Orientation, SlopeOffset, SlopeTables, TileCollisionType, TILE_SIZE};

const HALF_TILE: f32 = TILE_SIZE as f32 / 2.0;
const LAST_CELL: i32 = TILE_SIZE - 1;

/// Inclusive cell range of a rectangle in tile-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocalRect {
    u0: i32,
    u1: i32,
    v0: i32,
    v1: i32,
}

/// Offsets of the rectangle `[left, right) x [bottom, top)` against the tile
/// centred at `tile_center`.
///
/// The rectangle is expected to touch the tile; parts outside it are
/// clamped to the nearest edge cells, and the vertical extent that hangs
/// below or above the tile is added back onto the up/down escapes.
#[must_use]
pub fn get_offset(
    tile_center: Vec2,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    collision: TileCollisionType,
) -> SlopeOffset {
    let tile_left = tile_center.x - HALF_TILE;
    let tile_bottom = tile_center.y - HALF_TILE;
    let tile_top = tile_center.y + HALF_TILE;

    let (u0, u1) = local_range(left - tile_left, right - tile_left);
    let (v0, v1) = local_range(bottom - tile_bottom, top - tile_bottom);
    let mut offset = local_offset(collision, LocalRect { u0, u1, v0, v1 });

    let below = ((tile_bottom - bottom).ceil() as i32).max(0);
    let above = ((top - tile_top).ceil() as i32).max(0);

    if below > 0 && offset.free_up > 0 {
        offset.free_up += below;
        offset.colliding_bottom = offset.free_up;
    }
    if above > 0 && offset.free_down < 0 {
        offset.free_down -= above;
        offset.colliding_top = offset.free_down;
    }
    if collision.is_full() {
        // Full tiles report no free motion, so the extension lands on the
        // colliding distances directly.
        offset.colliding_bottom += below;
        offset.colliding_top -= above;
    }

    offset
}

/// Height of the solid run starting at the bottom of local column `x`.
#[must_use]
pub fn slope_height_from_bottom(x: i32, collision: TileCollisionType) -> i32 {
    let column = x.clamp(0, LAST_CELL);
    local_offset(
        collision,
        LocalRect {
            u0: column,
            u1: column,
            v0: 0,
            v1: 0,
        },
    )
    .colliding_bottom
    .max(0)
}

/// Whether local pixel `(u, v)` of a tile is solid.
#[must_use]
pub fn is_occupied(collision: TileCollisionType, u: i32, v: i32) -> bool {
    if collision.is_empty() {
        return false;
    }
    if collision.is_full() {
        return true;
    }
    let Some(shape) = collision.shape() else {
        return false;
    };
    let rect = to_canonical(
        collision.orientation(),
        LocalRect {
            u0: u.clamp(0, LAST_CELL),
            u1: u.clamp(0, LAST_CELL),
            v0: v.clamp(0, LAST_CELL),
            v1: v.clamp(0, LAST_CELL),
        },
    );
    i32::from(shape.heights()[rect.u0 as usize]) > rect.v0
}

fn local_range(lo: f32, hi: f32) -> (i32, i32) {
    let start = (lo.floor() as i32).clamp(0, LAST_CELL);
    let end = ((hi.ceil() as i32) - 1).clamp(0, LAST_CELL);
    (start, end.max(start))
}

fn local_offset(collision: TileCollisionType, rect: LocalRect) -> SlopeOffset {
    if collision.is_empty() {
        return SlopeOffset {
            colliding_left: -(rect.u0 + 1),
            colliding_right: TILE_SIZE - rect.u1,
            colliding_bottom: -(rect.v0 + 1),
            colliding_top: TILE_SIZE - rect.v1,
            ..SlopeOffset::default()
        };
    }
    if collision.is_full() {
        return SlopeOffset {
            colliding_left: TILE_SIZE - rect.u0,
            colliding_right: -(rect.u1 + 1),
            colliding_bottom: TILE_SIZE - rect.v0,
            colliding_top: -(rect.v1 + 1),
            ..SlopeOffset::default()
        };
    }
    let Some(shape) = collision.shape() else {
        return SlopeOffset::default();
    };

    let orientation = collision.orientation();
    let c = to_canonical(orientation, rect);
    let canonical = SlopeTables::get().canonical(
        shape,
        c.u0 as usize,
        c.v0 as usize,
        (c.u1 - c.u0) as usize,
        (c.v1 - c.v0) as usize,
    );
    from_canonical(orientation, &canonical)
}

/// Flips, then transposes. `u`/`v` of the result are canonical x/y.
fn to_canonical(orientation: Orientation, rect: LocalRect) -> LocalRect {
    let (mut u0, mut u1, mut v0, mut v1) = (rect.u0, rect.u1, rect.v0, rect.v1);
    if orientation.flips_x() {
        (u0, u1) = (LAST_CELL - u1, LAST_CELL - u0);
    }
    if orientation.flips_y() {
        (v0, v1) = (LAST_CELL - v1, LAST_CELL - v0);
    }
    if orientation.rotates() {
        LocalRect { u0: v0, u1: v1, v0: u0, v1: u1 }
    } else {
        LocalRect { u0, u1, v0, v1 }
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn escape(offset: &SlopeOffset, axis: Axis, positive: bool) -> i32 {
    match (axis, positive) {
        (Axis::X, true) => offset.free_right,
        (Axis::X, false) => offset.free_left,
        (Axis::Y, true) => offset.free_up,
        (Axis::Y, false) => offset.free_down,
    }
}

fn contact(offset: &SlopeOffset, axis: Axis, positive_side: bool) -> i32 {
    match (axis, positive_side) {
        (Axis::X, true) => offset.colliding_right,
        (Axis::X, false) => offset.colliding_left,
        (Axis::Y, true) => offset.colliding_top,
        (Axis::Y, false) => offset.colliding_bottom,
    }
}

/// Maps a canonical answer back onto tile-local axes.
///
/// Local +x runs along canonical `axis_u` with sign `su`; displacements
/// scale by the sign and each local side picks up the canonical side it
/// lands on.
fn from_canonical(orientation: Orientation, c: &SlopeOffset) -> SlopeOffset {
    let (axis_u, axis_v) = if orientation.rotates() {
        (Axis::Y, Axis::X)
    } else {
        (Axis::X, Axis::Y)
    };
    let su = if orientation.flips_x() { -1 } else { 1 };
    let sv = if orientation.flips_y() { -1 } else { 1 };

    SlopeOffset {
        free_left: su * escape(c, axis_u, su < 0),
        free_right: su * escape(c, axis_u, su > 0),
        free_down: sv * escape(c, axis_v, sv < 0),
        free_up: sv * escape(c, axis_v, sv > 0),
        colliding_left: su * contact(c, axis_u, su < 0),
        colliding_right: su * contact(c, axis_u, su > 0),
        colliding_bottom: sv * contact(c, axis_v, sv < 0),
        colliding_top: sv * contact(c, axis_v, sv > 0),
    }
}
