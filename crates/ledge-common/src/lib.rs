//! # Ledge Common
//!
//! Common types shared by the Ledge platformer crates.
//!
//! This crate provides:
//! - ID types (`EntityId`)
//! - Tile and area-grid coordinate types
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;
