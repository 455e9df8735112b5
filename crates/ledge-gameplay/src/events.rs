//! Events raised by gameplay for outer layers (audio, UI, logs).
//!
//! Events are fire-and-forget: nothing read back from them feeds into the
//! simulation.

use glam::Vec2;
use ledge_common::EntityId;
use serde::{Deserialize, Serialize};

/// Sound a character asks to be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Take-off
    Jump,
    /// Landing, or bumping into a wall or ceiling
    HitWall,
    /// Walking step
    Footstep,
}

impl SoundCue {
    /// Default playback volume (0.0-1.0).
    #[must_use]
    pub const fn volume(self) -> f32 {
        match self {
            Self::Jump => 1.0,
            Self::HitWall => 0.5,
            Self::Footstep => 0.4,
        }
    }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A sound should be played for an entity
    Sound {
        /// Emitting entity
        source: EntityId,
        /// What to play
        cue: SoundCue,
    },
    /// A body was squeezed against a tile and moved to a free spot near its
    /// recovery point
    Crushed {
        /// The crushed body
        id: EntityId,
        /// Where it was moved
        recovery_point: Vec2,
    },
    /// A character caught a ledge
    LedgeGrabbed {
        /// The character
        id: EntityId,
    },
}

/// Ordered queue of events for the current tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn publish(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Appends a sound cue for `source`.
    pub fn sound(&mut self, source: EntityId, cue: SoundCue) {
        self.publish(GameEvent::Sound { source, cue });
    }

    /// Takes every queued event.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of queued events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = EventQueue::new();
        let id = EntityId::from_raw(3);
        queue.sound(id, SoundCue::Jump);
        queue.publish(GameEvent::Crushed {
            id,
            recovery_point: Vec2::ZERO,
        });
        assert_eq!(queue.pending_count(), 2);

        let events = queue.drain();
        assert_eq!(events[0], GameEvent::Sound { source: id, cue: SoundCue::Jump });
        assert_eq!(queue.pending_count(), 0);
    }
}
