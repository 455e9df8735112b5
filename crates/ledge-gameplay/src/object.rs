//! Game objects: a physics body plus the controller that drives it.

use glam::Vec2;
use ledge_kernel::{MovingObject, PhysicsBody, StepContext};

use crate::character::Character;
use crate::config::{CharacterConfig, PlatformConfig};
use crate::events::EventQueue;
use crate::input::InputState;
use crate::npc::Patrol;
use crate::platform::MovingPlatform;

/// What drives a [`GameObject`].
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// Character following the player's input
    Player(Character),
    /// Character following a patrol brain
    Npc {
        /// Controller
        character: Character,
        /// Brain
        patrol: Patrol,
        /// Keys the brain produced, with history
        input: InputState,
    },
    /// Kinematic platform
    Platform(MovingPlatform),
}

/// A body and its controller.
#[derive(Debug, Clone)]
pub struct GameObject {
    /// Physics state
    pub body: MovingObject,
    /// Controller
    pub kind: ObjectKind,
}

impl GameObject {
    /// Player character with its feet at `feet`.
    #[must_use]
    pub fn player(feet: Vec2, config: &CharacterConfig) -> Self {
        let character = Character::new(config.clone());
        Self {
            body: character.spawn_body(feet),
            kind: ObjectKind::Player(character),
        }
    }

    /// Patrolling character with its feet at `feet`.
    #[must_use]
    pub fn npc(feet: Vec2, patrol: Patrol, config: &CharacterConfig) -> Self {
        let character = Character::new(config.clone());
        Self {
            body: character.spawn_body(feet),
            kind: ObjectKind::Npc {
                character,
                patrol,
                input: InputState::default(),
            },
        }
    }

    /// Moving platform centred on `center`.
    #[must_use]
    pub fn platform(center: Vec2, config: &PlatformConfig) -> Self {
        let platform = MovingPlatform::new(config);
        Self {
            body: platform.spawn_body(center, config),
            kind: ObjectKind::Platform(platform),
        }
    }

    /// The character controller, if any.
    #[must_use]
    pub fn character(&self) -> Option<&Character> {
        match &self.kind {
            ObjectKind::Player(character) | ObjectKind::Npc { character, .. } => Some(character),
            ObjectKind::Platform(_) => None,
        }
    }

    /// Whether this object follows the player's input.
    #[must_use]
    pub fn is_player(&self) -> bool {
        matches!(self.kind, ObjectKind::Player(_))
    }

    /// Runs the controller for one tick. `input` is only read by players.
    pub fn update(&mut self, input: InputState, step: &StepContext<'_>, events: &mut EventQueue) {
        match &mut self.kind {
            ObjectKind::Player(character) => character.update(&mut self.body, input, step, events),
            ObjectKind::Npc {
                character,
                patrol,
                input,
            } => {
                input.set(patrol.think(&self.body.state));
                character.update(&mut self.body, *input, step, events);
            },
            ObjectKind::Platform(platform) => platform.update(&mut self.body, step),
        }
    }
}

impl PhysicsBody for GameObject {
    fn body(&self) -> &MovingObject {
        &self.body
    }

    fn body_mut(&mut self) -> &mut MovingObject {
        &mut self.body
    }
}
