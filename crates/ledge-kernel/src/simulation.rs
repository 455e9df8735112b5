//! Fixed-tick simulation of many bodies over one map.
//!
//! A tick runs in a strict order: every body integrates against the tiles
//! and is re-bucketed (kinematic bodies first, so riders see their mount's
//! displacement for the same tick), then overlaps are detected across all
//! areas, then each body resolves its overlaps and commits its flags.
//! Bodies crushed during resolution are moved to a free spot before the
//! commit.

use glam::Vec2;
use ledge_common::{EntityId, LevelError};
use tracing::{debug, info, warn};

use crate::area_grid::AreaGrid;
use crate::collision;
use crate::config::SimulationConfig;
use crate::moving_object::MovingObject;
use crate::slopes::TILE_SIZE;
use crate::tile_map::TileMap;

/// How many tiles away from its recovery point a crushed body may be placed.
const RECOVERY_SEARCH_RADIUS: i32 = 8;

/// Anything that carries a [`MovingObject`].
pub trait PhysicsBody {
    /// The body's physics state.
    fn body(&self) -> &MovingObject;
    /// The body's physics state, mutably.
    fn body_mut(&mut self) -> &mut MovingObject;
}

impl PhysicsBody for MovingObject {
    fn body(&self) -> &MovingObject {
        self
    }

    fn body_mut(&mut self) -> &mut MovingObject {
        self
    }
}

/// What an update callback knows about the current step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// The body being updated
    pub id: EntityId,
    /// The level
    pub map: &'a TileMap,
    /// Tick length in seconds
    pub dt: f32,
    /// The mount's displacement this tick, or zero
    pub mount_delta: Vec2,
}

/// Bodies, the map they move through and the area grid over it.
#[derive(Debug)]
pub struct Simulation<B> {
    map: TileMap,
    grid: AreaGrid,
    slots: Vec<Option<B>>,
    ticks: u64,
}

impl<B: PhysicsBody> Simulation<B> {
    /// Creates an empty simulation over `map`.
    pub fn new(map: TileMap, config: &SimulationConfig) -> Result<Self, LevelError> {
        let map = map.with_border(config.border);
        let grid = AreaGrid::for_map(&map, config.area_width, config.area_height)?;
        info!(
            width = map.width(),
            height = map.height(),
            areas_x = grid.columns(),
            areas_y = grid.rows(),
            "Simulation created"
        );
        Ok(Self {
            map,
            grid,
            slots: Vec::new(),
            ticks: 0,
        })
    }

    /// Adds a body and returns its id.
    pub fn spawn(&mut self, body: B) -> EntityId {
        let id = EntityId::from_raw(self.slots.len() as u32);
        self.grid.update_areas(id, &body.body().aabb, &self.map);
        debug!(%id, x = body.body().position.x, y = body.body().position.y, "spawned body");
        self.slots.push(Some(body));
        id
    }

    /// Removes a body. Its id is not reused.
    pub fn despawn(&mut self, id: EntityId) -> Option<B> {
        let body = self.slots.get_mut(id.index())?.take()?;
        self.grid.remove(id);
        debug!(%id, "despawned body");
        Some(body)
    }

    /// A body by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&B> {
        self.slots.get(id.index())?.as_ref()
    }

    /// A body by id, mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut B> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Live bodies in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &B)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((EntityId::from_raw(index as u32), slot.as_ref()?)))
    }

    /// Live bodies in id order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut B)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| Some((EntityId::from_raw(index as u32), slot.as_mut()?)))
    }

    /// Number of live bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no body is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The level.
    #[must_use]
    pub const fn map(&self) -> &TileMap {
        &self.map
    }

    /// The broad-phase grid.
    #[must_use]
    pub const fn grid(&self) -> &AreaGrid {
        &self.grid
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Runs one tick with plain physics for every body.
    pub fn tick_bodies(&mut self, dt: f32) {
        self.tick(dt, |body, step| {
            body.body_mut().update_physics(step.map, step.dt, step.mount_delta);
        });
    }

    /// Runs one tick. `update` is called once per body and is expected to
    /// call [`MovingObject::update_physics`].
    pub fn tick<F>(&mut self, dt: f32, mut update: F)
    where
        F: FnMut(&mut B, &StepContext<'_>),
    {
        for index in self.update_order() {
            let id = EntityId::from_raw(index as u32);
            let mount_delta = self.mount_delta(index);
            let Some(body) = self.slots[index].as_mut() else {
                continue;
            };
            let step = StepContext {
                id,
                map: &self.map,
                dt,
                mount_delta,
            };
            update(body, &step);
            self.grid.update_areas(id, &body.body().aabb, &self.map);
        }

        collision::check_collisions(&self.grid, &mut self.slots);

        let mut crushed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(body) = slot.as_mut() else {
                continue;
            };
            if body.body_mut().resolve_collisions() {
                crushed.push(index);
            }
        }
        for index in crushed {
            self.recover(index);
        }

        for body in self.slots.iter_mut().flatten() {
            body.body_mut().commit();
        }
        self.ticks += 1;
    }

    /// Moves a crushed body to the free spot closest to its recovery point.
    fn recover(&mut self, index: usize) {
        let Some(target) = self.slots[index].as_ref().map(|body| self.recovery_spot(body.body())) else {
            return;
        };
        let Some(body) = self.slots[index].as_mut() else {
            return;
        };
        let id = EntityId::from_raw(index as u32);
        let body = body.body_mut();
        body.teleport(target);
        self.grid.update_areas(id, &body.aabb, &self.map);
        warn!(%id, x = target.x, y = target.y, "body crushed, moved to recovery point");
    }

    /// Searches square rings of tile-sized steps around the recovery point,
    /// nearest ring first, for a placement clear of tiles and of kinematic
    /// bodies. Falls back to the recovery point itself.
    fn recovery_spot(&self, body: &MovingObject) -> Vec2 {
        let step = TILE_SIZE as f32;
        for radius in 0..=RECOVERY_SEARCH_RADIUS {
            let mut best: Option<(i32, Vec2)> = None;
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs().max(dy.abs()) != radius {
                        continue;
                    }
                    let distance = dx * dx + dy * dy;
                    if best.is_some_and(|(closest, _)| closest <= distance) {
                        continue;
                    }
                    let point = body.recovery_point + Vec2::new(dx as f32, dy as f32) * step;
                    if self.is_free_for(body, point) {
                        best = Some((distance, point));
                    }
                }
            }
            if let Some((_, point)) = best {
                return point;
            }
        }
        body.recovery_point
    }

    /// Whether `body` placed at `position` would touch no tile and no
    /// kinematic body, including the distance a kinematic body covers in
    /// one tick.
    fn is_free_for(&self, body: &MovingObject, position: Vec2) -> bool {
        let center = position + body.aabb_offset;
        let half = body.aabb.half_size();
        if !self.map.is_region_empty(center - half, center + half) {
            return false;
        }
        self.iter().all(|(_, other)| {
            let other = other.body();
            if !other.is_kinematic {
                return true;
            }
            let reach = half + other.aabb.half_size() + other.frame_displacement().abs() + Vec2::ONE;
            let distance = (center - other.aabb.center).abs();
            distance.x >= reach.x || distance.y >= reach.y
        })
    }

    fn update_order(&self) -> Vec<usize> {
        let live = || {
            self.slots
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| Some((index, slot.as_ref()?.body().is_kinematic)))
        };
        live()
            .filter(|&(_, kinematic)| kinematic)
            .chain(live().filter(|&(_, kinematic)| !kinematic))
            .map(|(index, _)| index)
            .collect()
    }

    fn mount_delta(&self, index: usize) -> Vec2 {
        self.slots[index]
            .as_ref()
            .and_then(|body| body.body().mount)
            .and_then(|mount| self.get(mount))
            .map_or(Vec2::ZERO, |mount| mount.body().frame_displacement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slopes::TileCollisionType;
    use crate::tile_map::BorderPolicy;

    const DT: f32 = 1.0 / 60.0;

    fn open_sim() -> Simulation<MovingObject> {
        let map = TileMap::new(40, 20, Vec2::ZERO).expect("map");
        let config = SimulationConfig {
            border: BorderPolicy::Open,
            ..SimulationConfig::default()
        };
        Simulation::new(map, &config).expect("simulation")
    }

    #[test]
    fn test_spawn_despawn() {
        let mut sim = open_sim();
        let a = sim.spawn(MovingObject::new(Vec2::new(50.0, 50.0), Vec2::splat(4.0)));
        let b = sim.spawn(MovingObject::new(Vec2::new(90.0, 50.0), Vec2::splat(4.0)));
        assert_eq!((a.raw(), b.raw()), (0, 1));
        assert_eq!(sim.len(), 2);
        assert_eq!(sim.grid().areas_of(a).count(), 1);

        assert!(sim.despawn(a).is_some());
        assert!(sim.despawn(a).is_none());
        assert_eq!(sim.grid().areas_of(a).count(), 0);
        let c = sim.spawn(MovingObject::new(Vec2::new(50.0, 50.0), Vec2::splat(4.0)));
        assert_eq!(c.raw(), 2);
        assert_eq!(sim.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn test_rejects_zero_area_size() {
        let map = TileMap::new(4, 4, Vec2::ZERO).expect("map");
        let config = SimulationConfig {
            area_width: 0,
            ..SimulationConfig::default()
        };
        assert!(Simulation::<MovingObject>::new(map, &config).is_err());
    }

    #[test]
    fn test_approaching_bodies_separate_evenly() {
        let mut sim = open_sim();
        let a = sim.spawn(MovingObject::new(Vec2::new(100.0, 100.0), Vec2::splat(6.0)).with_speed(Vec2::new(120.0, 0.0)));
        let b = sim.spawn(MovingObject::new(Vec2::new(114.0, 100.0), Vec2::splat(6.0)).with_speed(Vec2::new(-120.0, 0.0)));

        for _ in 0..5 {
            sim.tick_bodies(DT);
        }

        let a = sim.get(a).expect("a");
        let b = sim.get(b).expect("b");
        assert_eq!(b.position.x - a.position.x, 12.0);
        assert_eq!(a.position.x, 101.0);
        assert!(a.state.pushes_right_object);
        assert!(b.state.pushes_left_object);
        assert_eq!(a.speed.x, 0.0);
    }

    #[test]
    fn test_rider_follows_platform() {
        let mut sim = open_sim();
        let platform = sim.spawn(
            MovingObject::new(Vec2::new(100.0, 100.0), Vec2::new(32.0, 8.0))
                .kinematic()
                .with_speed(Vec2::new(120.0, 0.0)),
        );
        // Spawned after the platform but updated after it anyway.
        let rider = sim.spawn(MovingObject::new(Vec2::new(100.0, 118.0), Vec2::new(6.0, 10.0)));

        sim.tick_bodies(DT);
        assert_eq!(sim.get(rider).expect("rider").body().mount, Some(platform));

        for _ in 0..10 {
            sim.tick_bodies(DT);
            let rider = sim.get(rider).expect("rider");
            assert_eq!(rider.frame_displacement(), Vec2::new(2.0, 0.0));
            assert!(rider.state.pushes_bottom_object);
        }
    }

    #[test]
    fn test_crushed_body_moves_clear_of_crusher() {
        let mut map = TileMap::new(12, 10, Vec2::ZERO).expect("map");
        for x in 0..12 {
            map.set_tile(x, 0, TileCollisionType::FULL);
        }
        let mut sim = Simulation::new(map, &SimulationConfig::default()).expect("simulation");
        let body = sim.spawn(MovingObject::new(Vec2::new(48.0, 16.0), Vec2::new(4.0, 8.0)));
        let press = sim.spawn(
            MovingObject::new(Vec2::new(48.0, 40.0), Vec2::new(16.0, 8.0))
                .kinematic()
                .with_speed(Vec2::new(0.0, -120.0)),
        );

        let mut crushed_at = None;
        for tick in 0..10 {
            sim.tick_bodies(DT);
            if sim.get_mut(body).expect("body").take_crushed() {
                crushed_at = Some(tick);
                break;
            }
        }
        assert_eq!(crushed_at, Some(4));
        // Everything closer to the recovery point is floor or under the press.
        let placed = sim.get(body).expect("body").position;
        assert_eq!(placed, Vec2::new(16.0, 16.0));
        assert_eq!(sim.grid().areas_of(body).count(), 1);

        for _ in 0..30 {
            sim.tick_bodies(DT);
            let crushed = sim.get_mut(body).expect("body").take_crushed();
            assert!(!crushed, "crushed again after recovery");
            let press_body = sim.get(press).expect("press");
            assert!(!sim.get(body).expect("body").aabb.overlaps(&press_body.aabb));
        }
        assert_eq!(sim.get(body).expect("body").position, placed);
    }

    #[test]
    fn test_kinematic_updates_first() {
        let mut sim = open_sim();
        let dynamic = sim.spawn(MovingObject::new(Vec2::new(40.0, 40.0), Vec2::splat(4.0)));
        let kinematic = sim.spawn(MovingObject::new(Vec2::new(200.0, 40.0), Vec2::splat(4.0)).kinematic());
        let mut seen = Vec::new();
        sim.tick(DT, |_, step| seen.push(step.id));
        assert_eq!(seen, vec![kinematic, dynamic]);
        assert_eq!(sim.tick_count(), 1);
    }
}
