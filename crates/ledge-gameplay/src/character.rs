//! Character controller.
//!
//! A four-state machine (stand, walk, jump, hang from a ledge) that turns
//! input and last tick's contact flags into a velocity, then runs the
//! body's physics step. The controller never touches collision math itself.

use glam::Vec2;
use ledge_common::{EntityId, TileCoord};
use ledge_kernel::{MovingObject, StepContext, TILE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::CharacterConfig;
use crate::events::{EventQueue, GameEvent, SoundCue};
use crate::input::{InputState, KeyInput};

const TILE: f32 = TILE_SIZE as f32;

/// Character states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharacterState {
    /// On the ground, not moving
    #[default]
    Stand,
    /// On the ground, moving
    Walk,
    /// Airborne, rising or falling
    Jump,
    /// Hanging from a ledge
    GrabLedge,
}

impl CharacterState {
    /// Whether the state keeps the character on the ground.
    #[must_use]
    pub fn is_grounded(self) -> bool {
        matches!(self, Self::Stand | Self::Walk)
    }
}

/// Direction the character is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left
    Left,
    /// Facing right (default)
    #[default]
    Right,
}

/// State machine driving one character body.
#[derive(Debug, Clone)]
pub struct Character {
    config: CharacterConfig,
    state: CharacterState,
    facing: Facing,
    ledge_tile: Option<TileCoord>,
    cannot_go_left_frames: u32,
    cannot_go_right_frames: u32,
    frames_from_jump_start: u32,
    walk_sfx_timer: f32,
}

impl Character {
    /// Creates a standing character.
    #[must_use]
    pub fn new(config: CharacterConfig) -> Self {
        let walk_sfx_timer = config.walk_sfx_time;
        Self {
            config,
            state: CharacterState::Stand,
            facing: Facing::Right,
            ledge_tile: None,
            cannot_go_left_frames: 0,
            cannot_go_right_frames: 0,
            frames_from_jump_start: 0,
            walk_sfx_timer,
        }
    }

    /// Builds the body for this character with its feet at `feet`.
    #[must_use]
    pub fn spawn_body(&self, feet: Vec2) -> MovingObject {
        MovingObject::new(feet, self.config.half_size)
            .with_aabb_offset(self.config.aabb_offset())
            .with_slope_wall_height(self.config.slope_wall_height)
            .sticking_to_slopes()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CharacterState {
        self.state
    }

    /// Facing direction.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Tile whose top the character is hanging from.
    #[must_use]
    pub const fn ledge_tile(&self) -> Option<TileCoord> {
        self.ledge_tile
    }

    /// Tuning.
    #[must_use]
    pub const fn config(&self) -> &CharacterConfig {
        &self.config
    }

    /// Runs one tick: state machine, then the body's physics step.
    pub fn update(&mut self, body: &mut MovingObject, mut input: InputState, step: &StepContext<'_>, events: &mut EventQueue) {
        self.observe_contacts(body, step.id, events);

        if self.cannot_go_left_frames > 0 {
            self.cannot_go_left_frames -= 1;
            input.suppress(KeyInput::GO_LEFT);
        }
        if self.cannot_go_right_frames > 0 {
            self.cannot_go_right_frames -= 1;
            input.suppress(KeyInput::GO_RIGHT);
        }

        let before = self.state;
        match self.state {
            CharacterState::Stand => self.stand(body, &input, step, events),
            CharacterState::Walk => self.walk(body, &input, step, events),
            CharacterState::Jump => self.jump(body, &input, step, events),
            CharacterState::GrabLedge => self.hang(body, &input, step, events),
        }
        if before != self.state {
            trace!(id = %step.id, from = ?before, to = ?self.state, "character state");
        }

        body.update_physics(step.map, step.dt, step.mount_delta);
    }

    /// Reacts to the contacts committed last tick.
    fn observe_contacts(&mut self, body: &MovingObject, id: EntityId, events: &mut EventQueue) {
        let contacts = &body.state;
        if contacts.just_left_ground() {
            self.frames_from_jump_start = 0;
        }
        let bumped = contacts.just_landed()
            || (contacts.pushes_top && !contacts.pushed_top)
            || (contacts.pushes_left && !contacts.pushed_left)
            || (contacts.pushes_right && !contacts.pushed_right);
        if bumped {
            events.sound(id, SoundCue::HitWall);
        }
    }

    fn stand(&mut self, body: &mut MovingObject, input: &InputState, step: &StepContext<'_>, events: &mut EventQueue) {
        body.speed = Vec2::ZERO;
        let contacts = body.state;

        if !contacts.pushes_bottom {
            self.state = CharacterState::Jump;
        } else if input.horizontal() != 0 {
            self.state = CharacterState::Walk;
        } else if input.held(KeyInput::JUMP) {
            body.speed.y = self.config.jump_speed;
            events.sound(step.id, SoundCue::Jump);
            self.state = CharacterState::Jump;
        } else if input.held(KeyInput::GO_DOWN) && contacts.on_one_way_platform {
            body.drop_through_one_way(step.map);
        }
    }

    fn walk(&mut self, body: &mut MovingObject, input: &InputState, step: &StepContext<'_>, events: &mut EventQueue) {
        let contacts = body.state;

        if input.horizontal() == 0 {
            self.state = CharacterState::Stand;
            body.speed = Vec2::ZERO;
        } else {
            self.steer(body, input);
            if body.speed.x != 0.0 {
                self.walk_sfx_timer -= step.dt;
                if self.walk_sfx_timer <= 0.0 {
                    self.walk_sfx_timer = self.config.walk_sfx_time;
                    events.sound(step.id, SoundCue::Footstep);
                }
            }
        }

        if input.held(KeyInput::JUMP) {
            body.speed.y = self.config.jump_speed;
            events.sound(step.id, SoundCue::Jump);
            self.state = CharacterState::Jump;
        } else if !contacts.pushes_bottom {
            self.state = CharacterState::Jump;
        } else if input.held(KeyInput::GO_DOWN) && contacts.on_one_way_platform {
            body.drop_through_one_way(step.map);
        }
    }

    fn jump(&mut self, body: &mut MovingObject, input: &InputState, step: &StepContext<'_>, events: &mut EventQueue) {
        let config = &self.config;
        let contacts = body.state;

        // Late jump shortly after walking off an edge.
        self.frames_from_jump_start = self.frames_from_jump_start.saturating_add(1);
        if self.frames_from_jump_start <= config.jump_frames_threshold {
            if contacts.pushes_top || body.speed.y > 0.0 {
                self.frames_from_jump_start = config.jump_frames_threshold + 1;
            } else if input.held(KeyInput::JUMP) {
                body.speed.y = config.jump_speed;
                events.sound(step.id, SoundCue::Jump);
            }
        }

        self.walk_sfx_timer = config.walk_sfx_time;
        body.speed.y = (body.speed.y + config.gravity * step.dt).max(config.max_fall_speed);
        if !input.held(KeyInput::JUMP) && body.speed.y > 0.0 {
            body.speed.y = body.speed.y.min(config.min_jump_speed);
        }

        if input.horizontal() == 0 {
            body.speed.x = 0.0;
        } else {
            self.steer(body, input);
        }

        if contacts.pushes_bottom {
            if input.horizontal() == 0 {
                self.state = CharacterState::Stand;
                body.speed = Vec2::ZERO;
            } else {
                self.state = CharacterState::Walk;
                body.speed.y = 0.0;
            }
        } else if body.speed.y <= 0.0
            && !contacts.pushes_top
            && ((contacts.pushes_right && input.held(KeyInput::GO_RIGHT))
                || (contacts.pushes_left && input.held(KeyInput::GO_LEFT)))
        {
            self.try_grab_ledge(body, input, step, events);
        }
    }

    fn hang(&mut self, body: &mut MovingObject, input: &InputState, step: &StepContext<'_>, events: &mut EventQueue) {
        let Some(ledge) = self.ledge_tile else {
            self.state = CharacterState::Jump;
            return;
        };
        body.speed = Vec2::ZERO;
        let ledge_on_left = step.map.tile_position(ledge.x, ledge.y).x < body.position.x;

        let let_go = input.held(KeyInput::GO_DOWN)
            || (input.held(KeyInput::GO_LEFT) && !ledge_on_left)
            || (input.held(KeyInput::GO_RIGHT) && ledge_on_left);
        if let_go {
            if ledge_on_left {
                self.cannot_go_left_frames = self.config.ledge_release_frames;
            } else {
                self.cannot_go_right_frames = self.config.ledge_release_frames;
            }
            self.ledge_tile = None;
            self.state = CharacterState::Jump;
        } else if input.held(KeyInput::JUMP) {
            body.speed.y = self.config.jump_speed;
            events.sound(step.id, SoundCue::Jump);
            self.ledge_tile = None;
            self.state = CharacterState::Jump;
        }
    }

    /// Sets horizontal speed from input, stopping against walls.
    fn steer(&mut self, body: &mut MovingObject, input: &InputState) {
        let contacts = body.state;
        let scale = body.aabb.scale.x.abs();
        if input.horizontal() > 0 {
            body.speed.x = if contacts.pushes_right { 0.0 } else { self.config.walk_speed };
            body.aabb.scale.x = scale;
            self.facing = Facing::Right;
        } else {
            body.speed.x = if contacts.pushes_left { 0.0 } else { -self.config.walk_speed };
            body.aabb.scale.x = -scale;
            self.facing = Facing::Left;
        }
    }

    /// Looks for a free tile above an obstacle in the wall column the
    /// character is pressing against, within the grab window below its head.
    fn try_grab_ledge(&mut self, body: &mut MovingObject, input: &InputState, step: &StepContext<'_>, events: &mut EventQueue) {
        let map = step.map;
        let config = &self.config;
        let contacts = body.state;
        let half = body.aabb.half_size();

        let corner = if contacts.pushes_right && input.held(KeyInput::GO_RIGHT) {
            half
        } else {
            Vec2::new(-half.x - 1.0, half.y)
        };
        let tile_x = map.tile_x_at(body.aabb.center.x + corner.x);
        let head = body.aabb.center.y + corner.y;

        // While sliding along the wall, cover everything passed last tick.
        let sliding = (contacts.pushed_left && contacts.pushes_left) || (contacts.pushed_right && contacts.pushes_right);
        let window_top = if sliding {
            body.old_position.y + body.aabb_offset.y + corner.y
        } else {
            head
        };
        let top_y = map.tile_y_at(window_top - config.grab_ledge_start_y);
        let bottom_y = map.tile_y_at(head - config.grab_ledge_end_y);

        for y in (bottom_y..=top_y).rev() {
            if map.is_obstacle(tile_x, y) || !map.is_obstacle(tile_x, y - 1) {
                continue;
            }
            let mut ledge_corner = map.tile_position(tile_x, y - 1);
            ledge_corner.x -= corner.x.signum() * TILE / 2.0;
            ledge_corner.y += TILE / 2.0;

            let in_window = head - ledge_corner.y <= config.grab_ledge_end_y
                && ledge_corner.y - head >= config.grab_ledge_start_y;
            if y > bottom_y || in_window {
                self.ledge_tile = Some(TileCoord::new(tile_x, y - 1));
                body.position.y = ledge_corner.y - corner.y - body.aabb_offset.y - config.grab_ledge_start_y
                    + config.grab_ledge_tile_offset_y;
                body.speed = Vec2::ZERO;
                body.sync_aabb();
                events.publish(GameEvent::LedgeGrabbed { id: step.id });
                self.state = CharacterState::GrabLedge;
                return;
            }
        }
    }
}
