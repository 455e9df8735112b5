//! # Ledge Gameplay
//!
//! Gameplay layer on top of the physics kernel.
//!
//! This crate provides:
//! - Player-style character controller (stand, walk, jump, ledge hang)
//! - Loop-following moving platforms
//! - Patrolling NPCs
//! - Input handling with pressed/released edges
//! - Sound cue and crush events
//! - RON level descriptions and a seeded cave generator
//! - A `World` wiring all of the above into a kernel `Simulation`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod character;
pub mod config;
pub mod events;
pub mod input;
pub mod level;
pub mod npc;
pub mod object;
pub mod platform;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::character::*;
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::level::*;
    pub use crate::npc::*;
    pub use crate::object::*;
    pub use crate::platform::*;
    pub use crate::world::*;
}

pub use prelude::*;
