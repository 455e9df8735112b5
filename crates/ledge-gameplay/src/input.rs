//! Input handling for characters.
//!
//! Inputs are a small set of logical keys. [`InputState`] keeps this tick's
//! keys next to the previous tick's so edges (pressed, released) can be read
//! without the caller tracking history.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Logical keys a character reacts to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct KeyInput: u8 {
        /// Move left
        const GO_LEFT = 1 << 0;
        /// Move right
        const GO_RIGHT = 1 << 1;
        /// Drop through one-way platforms, let go of ledges
        const GO_DOWN = 1 << 2;
        /// Jump
        const JUMP = 1 << 3;
    }
}

/// Current and previous key sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    current: KeyInput,
    previous: KeyInput,
}

impl InputState {
    /// Creates a state with `keys` held and nothing held before.
    #[must_use]
    pub const fn new(keys: KeyInput) -> Self {
        Self {
            current: keys,
            previous: KeyInput::empty(),
        }
    }

    /// Starts a new tick with `keys` held.
    pub fn set(&mut self, keys: KeyInput) {
        self.previous = self.current;
        self.current = keys;
    }

    /// Keys held this tick.
    #[must_use]
    pub const fn current(&self) -> KeyInput {
        self.current
    }

    /// Whether `key` is held.
    #[must_use]
    pub const fn held(&self, key: KeyInput) -> bool {
        self.current.contains(key)
    }

    /// Whether `key` went down this tick.
    #[must_use]
    pub const fn pressed(&self, key: KeyInput) -> bool {
        self.current.contains(key) && !self.previous.contains(key)
    }

    /// Whether `key` went up this tick.
    #[must_use]
    pub const fn released(&self, key: KeyInput) -> bool {
        !self.current.contains(key) && self.previous.contains(key)
    }

    /// Drops `key` from this tick's keys.
    pub fn suppress(&mut self, key: KeyInput) {
        self.current.remove(key);
    }

    /// -1 for left, 1 for right, 0 for neither or both.
    #[must_use]
    pub fn horizontal(&self) -> i32 {
        i32::from(self.held(KeyInput::GO_RIGHT)) - i32::from(self.held(KeyInput::GO_LEFT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let mut input = InputState::default();
        input.set(KeyInput::JUMP | KeyInput::GO_LEFT);
        assert!(input.pressed(KeyInput::JUMP));
        assert!(input.held(KeyInput::GO_LEFT));

        input.set(KeyInput::GO_LEFT);
        assert!(input.released(KeyInput::JUMP));
        assert!(!input.pressed(KeyInput::GO_LEFT));
        assert_eq!(input.horizontal(), -1);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut input = InputState::new(KeyInput::GO_LEFT | KeyInput::GO_RIGHT);
        assert_eq!(input.horizontal(), 0);
        input.suppress(KeyInput::GO_LEFT);
        assert_eq!(input.horizontal(), 1);
    }

    #[test]
    fn test_keys_roundtrip_through_ron() {
        let keys = KeyInput::GO_RIGHT | KeyInput::JUMP;
        let text = ron::to_string(&keys).expect("serialize");
        let back: KeyInput = ron::from_str(&text).expect("deserialize");
        assert_eq!(back, keys);
    }
}
