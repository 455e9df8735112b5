//! Axis-aligned bounding boxes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Bounding box tracked by a moving body.
///
/// The centre follows the owner's position plus an offset; the reported
/// half size is the unscaled half size times the absolute scale, so a
/// mirrored sprite (negative x scale) keeps its extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Centre in world space
    pub center: Vec2,
    half_size: Vec2,
    /// Scale of the owning entity
    pub scale: Vec2,
}

impl Aabb {
    /// Creates a box with unit scale.
    #[must_use]
    pub const fn new(center: Vec2, half_size: Vec2) -> Self {
        Self {
            center,
            half_size,
            scale: Vec2::ONE,
        }
    }

    /// Half size after scaling.
    #[must_use]
    pub fn half_size(&self) -> Vec2 {
        self.half_size * self.scale.abs()
    }

    /// Half size before scaling.
    #[must_use]
    pub const fn unscaled_half_size(&self) -> Vec2 {
        self.half_size
    }

    /// Replaces the unscaled half size.
    pub fn set_half_size(&mut self, half_size: Vec2) {
        self.half_size = half_size.abs();
    }

    /// Bottom-left corner.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_size()
    }

    /// Top-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_size()
    }

    /// Whether the boxes overlap; touching edges count.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let reach = self.half_size() + other.half_size();
        let distance = (self.center - other.center).abs();
        distance.x <= reach.x && distance.y <= reach.y
    }

    /// Signed penetration on each axis, or `None` when apart.
    ///
    /// The sign points from `other` towards `self`, so adding the result to
    /// `self.center` separates the boxes. A zero component means
    /// the boxes only touch on that axis.
    #[must_use]
    pub fn overlaps_signed(&self, other: &Self) -> Option<Vec2> {
        if !self.overlaps(other) {
            return None;
        }
        let reach = self.half_size() + other.half_size();
        let delta = self.center - other.center;
        let sign = |d: f32| if d >= 0.0 { 1.0 } else { -1.0 };
        Some(Vec2::new(
            sign(delta.x) * (reach.x - delta.x.abs()),
            sign(delta.y) * (reach.y - delta.y.abs()),
        ))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::splat(8.0))
    }
}
