//! Tuning for characters and moving platforms.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Character movement tuning. Speeds are pixels per second, y up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Vertical acceleration while airborne
    pub gravity: f32,
    /// Lowest vertical speed while falling
    pub max_fall_speed: f32,
    /// Horizontal walking speed
    pub walk_speed: f32,
    /// Initial jump speed
    pub jump_speed: f32,
    /// Upward speed cap once jump is released
    pub min_jump_speed: f32,
    /// Half extents of the collision box
    pub half_size: Vec2,
    /// Tallest slope step climbed without stopping
    pub slope_wall_height: i32,
    /// Ticks after leaving the ground during which jump still works
    pub jump_frames_threshold: u32,
    /// Ledge grab window start, below the head
    pub grab_ledge_start_y: f32,
    /// Ledge grab window end, below the head
    pub grab_ledge_end_y: f32,
    /// Head offset from the ledge top while hanging
    pub grab_ledge_tile_offset_y: f32,
    /// Ticks during which the character cannot move back towards a ledge
    /// it let go of
    pub ledge_release_frames: u32,
    /// Seconds between footstep cues
    pub walk_sfx_time: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            gravity: -1000.0,
            max_fall_speed: -500.0,
            walk_speed: 160.0,
            jump_speed: 410.0,
            min_jump_speed: 200.0,
            half_size: Vec2::new(6.0, 20.0),
            slope_wall_height: 4,
            jump_frames_threshold: 4,
            grab_ledge_start_y: 0.0,
            grab_ledge_end_y: 2.0,
            grab_ledge_tile_offset_y: -4.0,
            ledge_release_frames: 3,
            walk_sfx_time: 0.5,
        }
    }
}

impl CharacterConfig {
    /// Offset from the character's feet to its box centre.
    #[must_use]
    pub fn aabb_offset(&self) -> Vec2 {
        Vec2::new(0.0, self.half_size.y)
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.gravity = self.gravity.min(0.0);
        self.max_fall_speed = self.max_fall_speed.min(0.0);
        self.walk_speed = self.walk_speed.clamp(0.0, 2000.0);
        self.jump_speed = self.jump_speed.clamp(0.0, 4000.0);
        self.min_jump_speed = self.min_jump_speed.clamp(0.0, self.jump_speed);
        self.half_size = self.half_size.clamp(Vec2::splat(1.0), Vec2::splat(256.0));
        self.slope_wall_height = self.slope_wall_height.clamp(0, 16);
        self.jump_frames_threshold = self.jump_frames_threshold.min(60);
        self.walk_sfx_time = self.walk_sfx_time.max(0.05);
    }
}

/// Moving platform tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Half extents of the platform
    pub half_size: Vec2,
    /// Travel speed along each leg of the loop
    pub speed: f32,
    /// Slope wall height; zero turns every slope into a wall
    pub slope_wall_height: i32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            half_size: Vec2::new(32.0, 8.0),
            speed: 100.0,
            slope_wall_height: 0,
        }
    }
}

impl PlatformConfig {
    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.half_size = self.half_size.clamp(Vec2::splat(1.0), Vec2::splat(512.0));
        self.speed = self.speed.clamp(0.0, 2000.0);
        self.slope_wall_height = self.slope_wall_height.clamp(0, 16);
    }
}
