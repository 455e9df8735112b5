//! Moving platforms.
//!
//! A platform is a kinematic body that ignores one-way tiles and follows a
//! rectangular loop: it turns whenever it runs into the map, so placing it
//! in a walled pocket is enough to set its path.

use glam::Vec2;
use ledge_kernel::{MovingObject, StepContext};

use crate::config::PlatformConfig;

/// Loop-following platform controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingPlatform {
    speed: f32,
}

impl MovingPlatform {
    /// Creates a controller moving at `config.speed`.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self { speed: config.speed }
    }

    /// Builds the platform body centred on `center`, initially moving right.
    #[must_use]
    pub fn spawn_body(&self, center: Vec2, config: &PlatformConfig) -> MovingObject {
        MovingObject::new(center, config.half_size)
            .kinematic()
            .ignoring_one_way()
            .with_slope_wall_height(config.slope_wall_height)
            .with_speed(Vec2::new(self.speed, 0.0))
    }

    /// Travel speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Turns at tile walls, then runs the physics step.
    pub fn update(&mut self, body: &mut MovingObject, step: &StepContext<'_>) {
        let contacts = body.state;
        if contacts.pushes_right_tile && !contacts.pushes_bottom_tile {
            body.speed.y = -self.speed;
        } else if contacts.pushes_bottom_tile && !contacts.pushes_left_tile {
            body.speed.x = -self.speed;
        } else if contacts.pushes_left_tile && !contacts.pushes_top_tile {
            body.speed.y = self.speed;
        } else if contacts.pushes_top_tile && !contacts.pushes_right_tile {
            body.speed.x = self.speed;
        }

        body.update_physics(step.map, step.dt, step.mount_delta);
    }
}
