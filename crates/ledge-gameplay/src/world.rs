//! The playable world: a simulation of game objects plus input and events.

use glam::Vec2;
use ledge_common::{EntityId, LedgeResult};
use ledge_kernel::{PhysicsBody, Simulation, SimulationConfig};
use tracing::info;

use crate::config::{CharacterConfig, PlatformConfig};
use crate::events::{EventQueue, GameEvent};
use crate::input::{InputState, KeyInput};
use crate::level::{LevelDesc, SpawnKind};
use crate::object::GameObject;

/// Everything needed to run a level.
#[derive(Debug)]
pub struct World {
    simulation: Simulation<GameObject>,
    input: InputState,
    events: EventQueue,
    player: Option<EntityId>,
}

impl World {
    /// Builds the map and spawns every object listed by the level.
    pub fn from_level(
        level: &LevelDesc,
        simulation: &SimulationConfig,
        character: &CharacterConfig,
        platform: &PlatformConfig,
    ) -> LedgeResult<Self> {
        let map = level.to_tile_map()?;
        let mut sim = Simulation::new(map, simulation)?;

        let mut player = None;
        for spawn in &level.spawns {
            let object = match spawn.kind {
                SpawnKind::Player => GameObject::player(spawn.position, character),
                SpawnKind::Npc(patrol) => GameObject::npc(spawn.position, patrol, character),
                SpawnKind::MovingPlatform => GameObject::platform(spawn.position, platform),
            };
            let id = sim.spawn(object);
            if spawn.kind == SpawnKind::Player && player.is_none() {
                player = Some(id);
            }
        }

        info!("World '{}' ready with {} objects", level.name, sim.len());
        Ok(Self {
            simulation: sim,
            input: InputState::default(),
            events: EventQueue::new(),
            player,
        })
    }

    /// Runs one tick with `keys` held by the player.
    pub fn tick(&mut self, dt: f32, keys: KeyInput) {
        self.input.set(keys);
        let input = self.input;
        let events = &mut self.events;
        self.simulation.tick(dt, |object, step| object.update(input, step, events));

        for (id, object) in self.simulation.iter_mut() {
            if object.body.take_crushed() {
                self.events.publish(GameEvent::Crushed {
                    id,
                    recovery_point: object.body.position,
                });
            }
        }
    }

    /// Takes the events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Id of the first player spawned.
    #[must_use]
    pub const fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    /// The player object.
    #[must_use]
    pub fn player(&self) -> Option<&GameObject> {
        self.simulation.get(self.player?)
    }

    /// A game object by id.
    #[must_use]
    pub fn object(&self, id: EntityId) -> Option<&GameObject> {
        self.simulation.get(id)
    }

    /// Position to draw an object at, `alpha` of the way from last tick to
    /// this one.
    #[must_use]
    pub fn render_position(&self, id: EntityId, alpha: f32) -> Option<Vec2> {
        Some(self.simulation.get(id)?.body().render_position(alpha))
    }

    /// The underlying simulation.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation<GameObject> {
        &self.simulation
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.simulation.tick_count()
    }
}
