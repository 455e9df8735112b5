//! Body-versus-body collision.
//!
//! Detection walks every area bucket and records each overlapping pair once,
//! on both bodies. Resolution then runs per body: dynamic bodies are pushed
//! out along one axis, split by how fast each side was moving, and take no
//! push from a side that is already pinned against a tile.

use glam::Vec2;
use ledge_common::EntityId;

use crate::area_grid::AreaGrid;
use crate::moving_object::MovingObject;
use crate::simulation::PhysicsBody;

const TOUCH_EPSILON: f32 = 1e-4;

/// One overlap seen from one of the two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// The other body
    pub other: EntityId,
    /// Vector that separates this body from the other when added to it
    pub overlap: Vec2,
    /// This body's velocity
    pub speed: Vec2,
    /// The other body's velocity
    pub other_speed: Vec2,
    /// This body's box centre
    pub center: Vec2,
    /// This body's box centre at the start of the tick
    pub old_center: Vec2,
    /// The other body's box centre
    pub other_center: Vec2,
    /// The other body's box centre at the start of the tick
    pub other_old_center: Vec2,
    /// This body's half size
    pub half_size: Vec2,
    /// The other body's half size
    pub other_half_size: Vec2,
    /// Whether the other body is kinematic
    pub other_is_kinematic: bool,
}

impl CollisionData {
    fn between(other_id: EntityId, overlap: Vec2, this: &MovingObject, other: &MovingObject) -> Self {
        Self {
            other: other_id,
            overlap,
            speed: this.speed,
            other_speed: other.speed,
            center: this.aabb.center,
            old_center: this.old_position + this.aabb_offset,
            other_center: other.aabb.center,
            other_old_center: other.old_position + other.aabb_offset,
            half_size: this.aabb.half_size(),
            other_half_size: other.aabb.half_size(),
            other_is_kinematic: other.is_kinematic,
        }
    }

    fn overlapped_last_tick(&self) -> (bool, bool) {
        let reach = self.half_size + self.other_half_size;
        let distance = (self.old_center - self.other_old_center).abs();
        (distance.x < reach.x, distance.y < reach.y)
    }

    /// Share of the overlap this body takes on each axis.
    fn push_ratio(&self) -> Vec2 {
        if self.other_is_kinematic {
            return Vec2::ONE;
        }
        let own = (self.center - self.old_center).abs();
        let sum = own + (self.other_center - self.other_old_center).abs();
        let ratio = |own: f32, sum: f32| if sum == 0.0 { 0.5 } else { own / sum };
        Vec2::new(ratio(own.x, sum.x), ratio(own.y, sum.y))
    }
}

/// Records every overlapping pair that shares an area.
///
/// Pairs found in several areas are recorded once. Both bodies receive a
/// record, with mirrored overlap vectors.
pub fn check_collisions<B: PhysicsBody>(grid: &AreaGrid, slots: &mut [Option<B>]) {
    for bucket in grid.buckets() {
        for (i, &first) in bucket.iter().enumerate() {
            for &second in &bucket[i + 1..] {
                let Some((a, b)) = pair_mut(slots, first.index(), second.index()) else {
                    continue;
                };
                let (a, b) = (a.body_mut(), b.body_mut());
                if a.has_collision_data_for(second) {
                    continue;
                }
                let Some(overlap) = a.aabb.overlaps_signed(&b.aabb) else {
                    continue;
                };
                let forward = CollisionData::between(second, overlap, a, b);
                let backward = CollisionData::between(first, -overlap, b, a);
                a.collisions.push(forward);
                b.collisions.push(backward);
            }
        }
    }
}

fn pair_mut<T>(slots: &mut [Option<T>], a: usize, b: usize) -> Option<(&mut T, &mut T)> {
    if a == b || a >= slots.len() || b >= slots.len() {
        return None;
    }
    if a < b {
        let (head, tail) = slots.split_at_mut(b);
        Some((head[a].as_mut()?, tail[0].as_mut()?))
    } else {
        let (head, tail) = slots.split_at_mut(a);
        Some((tail[0].as_mut()?, head[b].as_mut()?))
    }
}

impl MovingObject {
    /// Pushes the body out of the bodies recorded this tick.
    ///
    /// Kinematic bodies never move here. A dynamic body squeezed by a
    /// kinematic one against a tile is crushed: it is stopped and left for
    /// the simulation to relocate. The return value says whether that
    /// happened.
    pub fn resolve_collisions(&mut self) -> bool {
        if self.is_kinematic {
            return false;
        }

        let mut correction = Vec2::ZERO;
        for index in 0..self.collisions.len() {
            let data = self.collisions[index];
            let overlap = data.overlap - correction;

            if overlap.x.abs() < TOUCH_EPSILON {
                self.touch_horizontally(&data);
                continue;
            }
            if overlap.y.abs() < TOUCH_EPSILON {
                self.touch_vertically(&data);
                continue;
            }

            let offset = overlap * data.push_ratio();
            let along_x = match data.overlapped_last_tick() {
                (false, true) => true,
                (true, false) => false,
                _ => overlap.x.abs() <= overlap.y.abs(),
            };

            let pinned = if along_x {
                (offset.x < 0.0 && self.state.pushes_left_tile) || (offset.x > 0.0 && self.state.pushes_right_tile)
            } else {
                (offset.y < 0.0 && self.state.pushes_bottom_tile) || (offset.y > 0.0 && self.state.pushes_top_tile)
            };
            if pinned {
                if data.other_is_kinematic {
                    self.mark_crushed();
                    self.collisions.clear();
                    return true;
                }
                continue;
            }

            if along_x {
                correction.x += offset.x;
                if overlap.x < 0.0 {
                    self.state.pushes_right_object = true;
                    self.speed.x = self.speed.x.min(0.0);
                } else {
                    self.state.pushes_left_object = true;
                    self.speed.x = self.speed.x.max(0.0);
                }
            } else {
                correction.y += offset.y;
                if overlap.y < 0.0 {
                    self.state.pushes_top_object = true;
                    self.speed.y = self.speed.y.min(0.0);
                } else {
                    self.try_auto_mount(data.other);
                    self.state.pushes_bottom_object = true;
                    self.speed.y = self.speed.y.max(0.0);
                }
            }
        }

        self.position += correction;
        self.sync_aabb();
        false
    }

    fn touch_horizontally(&mut self, data: &CollisionData) {
        if data.other_center.x > self.aabb.center.x {
            self.state.pushes_right_object = true;
            self.speed.x = self.speed.x.min(0.0);
        } else {
            self.state.pushes_left_object = true;
            self.speed.x = self.speed.x.max(0.0);
        }
    }

    fn touch_vertically(&mut self, data: &CollisionData) {
        if data.other_center.y > self.aabb.center.y {
            self.state.pushes_top_object = true;
            self.speed.y = self.speed.y.min(0.0);
        } else {
            self.try_auto_mount(data.other);
            self.state.pushes_bottom_object = true;
            self.speed.y = self.speed.y.max(0.0);
        }
    }

    fn try_auto_mount(&mut self, other: EntityId) {
        if self.mount.is_none() {
            self.mount = Some(other);
        }
    }
}
