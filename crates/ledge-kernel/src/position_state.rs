//! Per-body contact flags.

use ledge_common::TileCoord;

/// Contact flags for one body, double-buffered across ticks.
///
/// `pushes_*` describe the current tick, `pushed_*` the previous one. A
/// tick starts with [`PositionState::begin_frame`], which copies before it
/// clears, so "just landed" is `pushes_bottom && !pushed_bottom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionState {
    /// Resolved: a tile or another body on the left
    pub pushes_left: bool,
    /// Resolved: a tile or another body on the right
    pub pushes_right: bool,
    /// Resolved: a tile or another body underneath
    pub pushes_bottom: bool,
    /// Resolved: a tile or another body above
    pub pushes_top: bool,

    /// Previous tick's `pushes_left`
    pub pushed_left: bool,
    /// Previous tick's `pushes_right`
    pub pushed_right: bool,
    /// Previous tick's `pushes_bottom`
    pub pushed_bottom: bool,
    /// Previous tick's `pushes_top`
    pub pushed_top: bool,

    /// Tile wall on the left
    pub pushes_left_tile: bool,
    /// Tile wall on the right
    pub pushes_right_tile: bool,
    /// Tile floor underneath
    pub pushes_bottom_tile: bool,
    /// Tile ceiling above
    pub pushes_top_tile: bool,

    /// Previous tick's `pushes_left_tile`
    pub pushed_left_tile: bool,
    /// Previous tick's `pushes_right_tile`
    pub pushed_right_tile: bool,
    /// Previous tick's `pushes_bottom_tile`
    pub pushed_bottom_tile: bool,
    /// Previous tick's `pushes_top_tile`
    pub pushed_top_tile: bool,

    /// Another body on the left
    pub pushes_left_object: bool,
    /// Another body on the right
    pub pushes_right_object: bool,
    /// Another body underneath
    pub pushes_bottom_object: bool,
    /// Another body above
    pub pushes_top_object: bool,

    /// Previous tick's `pushes_left_object`
    pub pushed_left_object: bool,
    /// Previous tick's `pushes_right_object`
    pub pushed_right_object: bool,
    /// Previous tick's `pushes_bottom_object`
    pub pushed_bottom_object: bool,
    /// Previous tick's `pushes_top_object`
    pub pushed_top_object: bool,

    /// Tile that blocked the left side
    pub left_tile: Option<TileCoord>,
    /// Tile that blocked the right side
    pub right_tile: Option<TileCoord>,
    /// Tile that supports the body
    pub bottom_tile: Option<TileCoord>,
    /// Tile that blocked the top side
    pub top_tile: Option<TileCoord>,

    /// The supporting tile is one-way
    pub on_one_way_platform: bool,

    /// Skip one-way tiles until the body leaves the platform row
    pub tmp_ignores_one_way: bool,
    /// Keep ground contact across downward steps this tick
    pub tmp_sticks_to_slope: bool,
}

impl PositionState {
    /// Rolls the current flags into the previous-tick slots and clears them.
    ///
    /// Transient overrides survive; their owners clear them.
    pub fn begin_frame(&mut self) {
        self.pushed_left = self.pushes_left;
        self.pushed_right = self.pushes_right;
        self.pushed_bottom = self.pushes_bottom;
        self.pushed_top = self.pushes_top;

        self.pushed_left_tile = self.pushes_left_tile;
        self.pushed_right_tile = self.pushes_right_tile;
        self.pushed_bottom_tile = self.pushes_bottom_tile;
        self.pushed_top_tile = self.pushes_top_tile;

        self.pushed_left_object = self.pushes_left_object;
        self.pushed_right_object = self.pushes_right_object;
        self.pushed_bottom_object = self.pushes_bottom_object;
        self.pushed_top_object = self.pushes_top_object;

        self.pushes_left = false;
        self.pushes_right = false;
        self.pushes_bottom = false;
        self.pushes_top = false;

        self.pushes_left_tile = false;
        self.pushes_right_tile = false;
        self.pushes_bottom_tile = false;
        self.pushes_top_tile = false;

        self.pushes_left_object = false;
        self.pushes_right_object = false;
        self.pushes_bottom_object = false;
        self.pushes_top_object = false;

        self.left_tile = None;
        self.right_tile = None;
        self.bottom_tile = None;
        self.top_tile = None;
        self.on_one_way_platform = false;
    }

    /// Combines tile and object contacts into the resolved flags.
    pub fn resolve(&mut self) {
        self.pushes_left = self.pushes_left_tile || self.pushes_left_object;
        self.pushes_right = self.pushes_right_tile || self.pushes_right_object;
        self.pushes_bottom = self.pushes_bottom_tile || self.pushes_bottom_object;
        self.pushes_top = self.pushes_top_tile || self.pushes_top_object;
    }

    /// Whether the body touched down this tick.
    #[must_use]
    pub const fn just_landed(&self) -> bool {
        self.pushes_bottom && !self.pushed_bottom
    }

    /// Whether the body left the ground this tick.
    #[must_use]
    pub const fn just_left_ground(&self) -> bool {
        self.pushed_bottom && !self.pushes_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_frame_copies_before_clearing() {
        let mut state = PositionState {
            pushes_bottom_tile: true,
            pushes_right_object: true,
            bottom_tile: Some(TileCoord::new(1, 2)),
            tmp_ignores_one_way: true,
            ..PositionState::default()
        };
        state.resolve();
        state.begin_frame();

        assert!(state.pushed_bottom_tile && state.pushed_bottom);
        assert!(state.pushed_right_object && state.pushed_right);
        assert!(!state.pushes_bottom_tile && !state.pushes_bottom);
        assert_eq!(state.bottom_tile, None);
        assert!(state.tmp_ignores_one_way);
    }

    #[test]
    fn test_landing_edge() {
        let mut state = PositionState::default();
        state.begin_frame();
        state.pushes_bottom_object = true;
        state.resolve();
        assert!(state.just_landed());

        state.begin_frame();
        state.resolve();
        assert!(state.just_left_ground());
    }
}
