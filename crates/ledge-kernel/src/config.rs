//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::tile_map::BorderPolicy;

/// Broad-phase and map-edge settings for a [`crate::simulation::Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Area width in tiles
    pub area_width: i32,
    /// Area height in tiles
    pub area_height: i32,
    /// What lies beyond the map edges
    pub border: BorderPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            area_width: 16,
            area_height: 16,
            border: BorderPolicy::Solid,
        }
    }
}

impl SimulationConfig {
    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.area_width = self.area_width.clamp(1, 256);
        self.area_height = self.area_height.clamp(1, 256);
    }
}
