//! Pixel-stepping motion integrator.
//!
//! A tick's displacement is added to a sub-pixel remainder; the rounded
//! whole-pixel part is walked one pixel at a time so no tile can be skipped,
//! and the rounding error stays in the remainder for the next tick.

use glam::Vec2;

use crate::directional::{MoveContext, TileCollider};
use crate::position_state::PositionState;

/// Moves `ctx` by `displacement` through the collider's map.
///
/// A blocked axis has its speed and remainder zeroed. After moving, the
/// sides that were not hit are re-checked so the contact flags describe the
/// final placement.
pub fn move_through_tiles(
    collider: &TileCollider<'_>,
    ctx: &mut MoveContext,
    state: &mut PositionState,
    speed: &mut Vec2,
    remainder: &mut Vec2,
    displacement: Vec2,
) {
    *remainder += displacement;
    let step = remainder.round();
    *remainder -= step;

    let mut steps_x = step.x as i32;
    let mut steps_y = step.y as i32;

    if speed.y <= 0.0 {
        collider.collides_bottom(ctx, state, false);
    }

    if steps_x != 0 && steps_y != 0 {
        let ratio = if speed.x != 0.0 {
            (speed.y / speed.x).abs()
        } else {
            (step.y / step.x).abs()
        };
        let mut error = 0.0;

        while steps_x != 0 || steps_y != 0 {
            if steps_x != 0 && (steps_y == 0 || error < 1.0) {
                if step_horizontal(collider, ctx, state, steps_x.signum()) {
                    steps_x -= steps_x.signum();
                } else {
                    steps_x = 0;
                    speed.x = 0.0;
                    remainder.x = 0.0;
                }
                error += ratio;
            } else {
                if step_vertical(collider, ctx, state, steps_y.signum()) {
                    steps_y -= steps_y.signum();
                } else {
                    steps_y = 0;
                    speed.y = 0.0;
                    remainder.y = 0.0;
                }
                error -= 1.0;
            }
        }
    } else {
        while steps_x != 0 {
            if step_horizontal(collider, ctx, state, steps_x.signum()) {
                steps_x -= steps_x.signum();
            } else {
                speed.x = 0.0;
                remainder.x = 0.0;
                break;
            }
        }
        while steps_y != 0 {
            if step_vertical(collider, ctx, state, steps_y.signum()) {
                steps_y -= steps_y.signum();
            } else {
                speed.y = 0.0;
                remainder.y = 0.0;
                break;
            }
        }
    }

    if !state.pushes_left_tile {
        collider.collides_left(ctx, state, false);
    }
    if !state.pushes_right_tile {
        collider.collides_right(ctx, state, false);
    }
    if !state.pushes_bottom_tile && speed.y <= 0.0 {
        collider.collides_bottom(ctx, state, true);
    }
    if !state.pushes_top_tile && speed.y >= 0.0 {
        collider.collides_top(ctx, state, false);
    }
}

/// Returns false when the step is blocked.
fn step_horizontal(collider: &TileCollider<'_>, ctx: &mut MoveContext, state: &mut PositionState, dir: i32) -> bool {
    let blocked = if dir > 0 {
        collider.collides_right(ctx, state, true)
    } else {
        collider.collides_left(ctx, state, true)
    };
    if !blocked {
        ctx.shift(dir as f32, 0.0);
    }
    !blocked
}

/// Returns false when the step is blocked.
fn step_vertical(collider: &TileCollider<'_>, ctx: &mut MoveContext, state: &mut PositionState, dir: i32) -> bool {
    let blocked = if dir > 0 {
        collider.collides_top(ctx, state, true)
    } else {
        collider.collides_bottom(ctx, state, true)
    };
    if !blocked {
        ctx.shift(0.0, dir as f32);
    }
    !blocked
}
