//! Computer-controlled characters.

use ledge_kernel::PositionState;
use serde::{Deserialize, Serialize};

use crate::input::KeyInput;

/// Walks in one direction until blocked, then turns around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patrol {
    moving_right: bool,
    /// Hold jump while walking
    #[serde(default)]
    pub jumps: bool,
}

impl Default for Patrol {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Patrol {
    /// Creates a patrol heading right or left.
    #[must_use]
    pub const fn new(moving_right: bool) -> Self {
        Self { moving_right, jumps: false }
    }

    /// Whether the patrol is heading right.
    #[must_use]
    pub const fn moving_right(&self) -> bool {
        self.moving_right
    }

    /// Picks this tick's keys from the body's committed contacts.
    pub fn think(&mut self, contacts: &PositionState) -> KeyInput {
        if self.moving_right && contacts.pushes_right {
            self.moving_right = false;
        } else if !self.moving_right && contacts.pushes_left {
            self.moving_right = true;
        }

        let mut keys = if self.moving_right { KeyInput::GO_RIGHT } else { KeyInput::GO_LEFT };
        if self.jumps {
            keys |= KeyInput::JUMP;
        }
        keys
    }
}
