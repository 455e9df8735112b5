//! # Ledge Kernel
//!
//! Collision core for a 2D tile platformer.
//!
//! This crate provides:
//! - Precomputed slope offset tables for 16 slope shapes in 8 orientations
//! - Tile offset queries against any tile type
//! - Directional tile collision with slope climbing and one-way platforms
//! - A remainder-accumulating pixel-stepping motion integrator
//! - A broad-phase area grid with incremental membership
//! - Body-versus-body overlap detection and response (mounting, crushing)
//!
//! ## Tick order
//!
//! [`Simulation::tick`] integrates every body against the tiles (kinematic
//! bodies first), re-buckets it, detects overlaps per area, and finally
//! lets each body resolve its overlaps and commit its contact flags.
//!
//! ## Coordinates
//!
//! World units are pixels with y growing upwards. Tiles are 16 pixels;
//! tile `(x, y)` is centred at `origin + (x, y) * 16`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod aabb;
pub mod area_grid;
pub mod collision;
pub mod config;
pub mod directional;
pub mod motion;
pub mod moving_object;
pub mod position_state;
pub mod simulation;
pub mod slopes;
pub mod tile_map;
pub mod tile_query;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aabb::*;
    pub use crate::area_grid::*;
    pub use crate::collision::*;
    pub use crate::config::*;
    pub use crate::directional::*;
    pub use crate::motion::*;
    pub use crate::moving_object::*;
    pub use crate::position_state::*;
    pub use crate::simulation::*;
    pub use crate::slopes::*;
    pub use crate::tile_map::*;
    pub use crate::tile_query::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_body_rests_on_slope() {
        let mut map = TileMap::new(6, 4, Vec2::ZERO)
            .expect("map")
            .with_border(BorderPolicy::Open);
        map.set_tile(2, 0, TileCollisionType::slope(SlopeShape::Slope45, Orientation::Identity));

        // Slope45 column 8 (world x = 32) has height 9.
        let height = slope_height_from_bottom(8, map.collision_type(2, 0));
        assert_eq!(height, 9);

        let mut body = MovingObject::new(Vec2::new(32.5, 40.0), Vec2::new(0.5, 4.0)).with_speed(Vec2::new(0.0, -120.0));
        for _ in 0..30 {
            body.update_physics(&map, 1.0 / 60.0, Vec2::ZERO);
            body.commit();
        }
        assert_eq!(body.aabb.min().y, -8.0 + height as f32);
        assert!(body.state.pushes_bottom);
    }
}
