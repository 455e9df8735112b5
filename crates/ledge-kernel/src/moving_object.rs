//! Moving bodies.

use glam::Vec2;
use ledge_common::EntityId;

use crate::aabb::Aabb;
use crate::collision::CollisionData;
use crate::directional::{MoveContext, TileCollider};
use crate::motion;
use crate::position_state::PositionState;
use crate::tile_map::TileMap;

/// A rigid axis-aligned body simulated against the tile map and other bodies.
///
/// Area-grid membership is tracked by [`crate::area_grid::AreaGrid`], keyed by
/// the body's id, rather than stored here.
#[derive(Debug, Clone)]
pub struct MovingObject {
    /// Current position
    pub position: Vec2,
    /// Position at the start of the current tick
    pub old_position: Vec2,
    /// Velocity in pixels per second
    pub speed: Vec2,
    /// Velocity at the start of the current tick
    pub old_speed: Vec2,
    remainder: Vec2,
    /// Bounding box, centred at `position + aabb_offset`
    pub aabb: Aabb,
    /// Offset from position to box centre
    pub aabb_offset: Vec2,
    /// Contact flags
    pub state: PositionState,
    /// Moves authoritatively; never displaced by other bodies
    pub is_kinematic: bool,
    /// Passes through one-way tiles
    pub ignores_one_way: bool,
    /// Tallest slope step climbed without being treated as a wall
    pub slope_wall_height: i32,
    /// Keeps ground contact when walking down slopes and steps
    pub sticks_to_slope: bool,
    /// Overlaps found this tick
    pub collisions: Vec<CollisionData>,
    /// Body this one is riding
    pub mount: Option<EntityId>,
    /// Where the search for a free spot starts when the body is crushed
    pub recovery_point: Vec2,
    one_way_row: Option<i32>,
    crushed: bool,
}

impl MovingObject {
    /// Creates a dynamic body whose box is centred on `position`.
    #[must_use]
    pub fn new(position: Vec2, half_size: Vec2) -> Self {
        Self {
            position,
            old_position: position,
            speed: Vec2::ZERO,
            old_speed: Vec2::ZERO,
            remainder: Vec2::ZERO,
            aabb: Aabb::new(position, half_size),
            aabb_offset: Vec2::ZERO,
            state: PositionState::default(),
            is_kinematic: false,
            ignores_one_way: false,
            slope_wall_height: 0,
            sticks_to_slope: false,
            collisions: Vec::new(),
            mount: None,
            recovery_point: position,
            one_way_row: None,
            crushed: false,
        }
    }

    /// Places the box centre at `position + offset`.
    #[must_use]
    pub fn with_aabb_offset(mut self, offset: Vec2) -> Self {
        self.aabb_offset = offset;
        self.sync_aabb();
        self
    }

    /// Sets the slope wall height.
    #[must_use]
    pub fn with_slope_wall_height(mut self, height: i32) -> Self {
        self.slope_wall_height = height.max(0);
        self
    }

    /// Makes the body kinematic.
    #[must_use]
    pub fn kinematic(mut self) -> Self {
        self.is_kinematic = true;
        self
    }

    /// Makes the body pass through one-way tiles.
    #[must_use]
    pub fn ignoring_one_way(mut self) -> Self {
        self.ignores_one_way = true;
        self
    }

    /// Makes the body stick to the ground across small downward steps.
    #[must_use]
    pub fn sticking_to_slopes(mut self) -> Self {
        self.sticks_to_slope = true;
        self
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_speed(mut self, speed: Vec2) -> Self {
        self.speed = speed;
        self
    }

    /// Moves the box to follow the position.
    pub fn sync_aabb(&mut self) {
        self.aabb.center = self.position + self.aabb_offset;
    }

    /// Places the body without any collision, clearing motion history.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.old_position = position;
        self.remainder = Vec2::ZERO;
        self.sync_aabb();
    }

    /// Displacement over the current tick.
    #[must_use]
    pub fn frame_displacement(&self) -> Vec2 {
        self.position - self.old_position
    }

    /// Position blended between the last two committed ticks.
    #[must_use]
    pub fn render_position(&self, alpha: f32) -> Vec2 {
        self.old_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }

    /// Sub-pixel displacement carried to the next tick.
    #[must_use]
    pub const fn remainder(&self) -> Vec2 {
        self.remainder
    }

    /// Whether this tick's collisions include `other`.
    #[must_use]
    pub fn has_collision_data_for(&self, other: EntityId) -> bool {
        self.collisions.iter().any(|data| data.other == other)
    }

    /// Starts dropping through the one-way platform under the body.
    ///
    /// One-way tiles are ignored until the body's bottom edge leaves the
    /// platform's tile row.
    pub fn drop_through_one_way(&mut self, map: &TileMap) {
        let bottom = self.aabb.min().y.round();
        self.one_way_row = Some(map.tile_y_at(bottom - 0.5));
        self.state.tmp_ignores_one_way = true;
    }

    /// Returns and clears the crushed flag.
    pub fn take_crushed(&mut self) -> bool {
        std::mem::take(&mut self.crushed)
    }

    /// Moves the body through the tile map for one tick.
    ///
    /// `mount_delta` is the displacement of the mount this tick; it is only
    /// applied while the mount is still in contact.
    pub fn update_physics(&mut self, map: &TileMap, dt: f32, mount_delta: Vec2) {
        self.old_position = self.position;
        self.old_speed = self.speed;
        self.state.begin_frame();
        self.release_one_way_drop(map);

        let mut displacement = self.speed * dt;
        if let Some(parent) = self.mount {
            if self.has_collision_data_for(parent) {
                displacement += mount_delta;
            } else {
                self.mount = None;
            }
        }
        self.collisions.clear();

        if self.sticks_to_slope && self.state.pushed_bottom_tile && self.speed.y <= 0.0 {
            self.state.tmp_sticks_to_slope = true;
        }

        let collider = TileCollider::new(map, self.slope_wall_height, self.ignores_one_way);
        let mut ctx = MoveContext::new(self.position, self.aabb_offset, self.aabb.half_size());
        motion::move_through_tiles(
            &collider,
            &mut ctx,
            &mut self.state,
            &mut self.speed,
            &mut self.remainder,
            displacement,
        );
        self.position = ctx.position;
        self.sync_aabb();
    }

    /// Publishes the tick's resolved flags.
    pub fn commit(&mut self) {
        self.state.resolve();
        self.state.tmp_sticks_to_slope = false;
        self.sync_aabb();
    }

    /// Stops the body and flags it; the simulation then moves it to a free
    /// spot near its recovery point.
    pub(crate) fn mark_crushed(&mut self) {
        self.crushed = true;
        self.speed = Vec2::ZERO;
        self.remainder = Vec2::ZERO;
        self.mount = None;
    }

    fn release_one_way_drop(&mut self, map: &TileMap) {
        let Some(row) = self.one_way_row else {
            return;
        };
        let bottom = self.aabb.min().y.round();
        if map.tile_y_at(bottom + 0.5) != row && map.tile_y_at(bottom - 0.5) != row {
            self.one_way_row = None;
            self.state.tmp_ignores_one_way = false;
        }
    }
}
