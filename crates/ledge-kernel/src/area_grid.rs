//! Broad-phase area grid.
//!
//! The map is cut into fixed-size areas of tiles. Each body is registered in
//! the areas under the four corners of its box, so one, two or four areas.
//! Membership is updated incrementally: only areas a body entered or left
//! are touched, and removal swaps with the bucket's last entry.

use ahash::AHashMap;
use ledge_common::{AreaCoord, EntityId, LevelError};
use tracing::trace;

use crate::aabb::Aabb;
use crate::tile_map::TileMap;

/// Slot a body occupies in one area's bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    /// The area
    pub area: AreaCoord,
    /// Index inside the area's bucket
    pub index: usize,
}

/// Buckets of bodies keyed by area.
#[derive(Debug, Clone)]
pub struct AreaGrid {
    area_width: i32,
    area_height: i32,
    columns: i32,
    rows: i32,
    buckets: Vec<Vec<EntityId>>,
    memberships: AHashMap<EntityId, Vec<Membership>>,
}

impl AreaGrid {
    /// Creates a grid of `columns` x `rows` areas, each `area_width` x
    /// `area_height` tiles.
    pub fn new(columns: i32, rows: i32, area_width: i32, area_height: i32) -> Result<Self, LevelError> {
        if area_width <= 0 || area_height <= 0 {
            return Err(LevelError::InvalidAreaSize {
                width: area_width,
                height: area_height,
            });
        }
        let columns = columns.max(1);
        let rows = rows.max(1);
        Ok(Self {
            area_width,
            area_height,
            columns,
            rows,
            buckets: vec![Vec::new(); (columns * rows) as usize],
            memberships: AHashMap::new(),
        })
    }

    /// Creates a grid covering `map`.
    pub fn for_map(map: &TileMap, area_width: i32, area_height: i32) -> Result<Self, LevelError> {
        if area_width <= 0 || area_height <= 0 {
            return Err(LevelError::InvalidAreaSize {
                width: area_width,
                height: area_height,
            });
        }
        let columns = (map.width() + area_width - 1) / area_width;
        let rows = (map.height() + area_height - 1) / area_height;
        Self::new(columns, rows, area_width, area_height)
    }

    /// Number of area columns.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Number of area rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Every bucket, row-major from the bottom-left area.
    #[must_use]
    pub fn buckets(&self) -> &[Vec<EntityId>] {
        &self.buckets
    }

    /// Bodies registered in one area.
    #[must_use]
    pub fn bucket(&self, area: AreaCoord) -> &[EntityId] {
        match self.slot(area) {
            Some(slot) => &self.buckets[slot],
            None => &[],
        }
    }

    /// Areas a body is registered in.
    pub fn areas_of(&self, id: EntityId) -> impl Iterator<Item = AreaCoord> + '_ {
        self.memberships
            .get(&id)
            .into_iter()
            .flat_map(|list| list.iter().map(|m| m.area))
    }

    /// Areas under the corners of a box, clamped to the grid and deduplicated.
    #[must_use]
    pub fn areas_for(&self, aabb: &Aabb, map: &TileMap) -> Vec<AreaCoord> {
        let min = aabb.min();
        let max = aabb.max();
        let corners = [
            glam::Vec2::new(min.x, max.y),
            max,
            min,
            glam::Vec2::new(max.x, min.y),
        ];

        let mut areas = Vec::with_capacity(4);
        for corner in corners {
            let area = map
                .tile_at_point(corner)
                .to_area(self.area_width, self.area_height)
                .clamped(self.columns, self.rows);
            if !areas.contains(&area) {
                areas.push(area);
            }
        }
        areas
    }

    /// Moves a body's registration to the areas its box now covers.
    pub fn update_areas(&mut self, id: EntityId, aabb: &Aabb, map: &TileMap) {
        let current = self.areas_for(aabb, map);
        let stale: Vec<AreaCoord> = self.areas_of(id).filter(|area| !current.contains(area)).collect();
        for area in stale {
            self.remove_from(id, area);
        }
        for area in current {
            if !self.areas_of(id).any(|registered| registered == area) {
                self.add_to(id, area);
            }
        }
    }

    /// Drops a body from every area.
    pub fn remove(&mut self, id: EntityId) {
        let areas: Vec<AreaCoord> = self.areas_of(id).collect();
        for area in areas {
            self.remove_from(id, area);
        }
        self.memberships.remove(&id);
    }

    fn slot(&self, area: AreaCoord) -> Option<usize> {
        if area.x < 0 || area.y < 0 || area.x >= self.columns || area.y >= self.rows {
            return None;
        }
        Some((area.y * self.columns + area.x) as usize)
    }

    fn add_to(&mut self, id: EntityId, area: AreaCoord) {
        let Some(slot) = self.slot(area) else {
            return;
        };
        let bucket = &mut self.buckets[slot];
        let index = bucket.len();
        bucket.push(id);
        self.memberships
            .entry(id)
            .or_default()
            .push(Membership { area, index });
        trace!(%id, x = area.x, y = area.y, "entered area");
    }

    fn remove_from(&mut self, id: EntityId, area: AreaCoord) {
        let Some(slot) = self.slot(area) else {
            return;
        };
        let Some(index) = self
            .memberships
            .get(&id)
            .and_then(|list| list.iter().find(|m| m.area == area))
            .map(|m| m.index)
        else {
            return;
        };

        let bucket = &mut self.buckets[slot];
        bucket.swap_remove(index);
        if let Some(&moved) = bucket.get(index) {
            if let Some(membership) = self
                .memberships
                .get_mut(&moved)
                .and_then(|list| list.iter_mut().find(|m| m.area == area))
            {
                membership.index = index;
            }
        }
        if let Some(list) = self.memberships.get_mut(&id) {
            list.retain(|m| m.area != area);
        }
        trace!(%id, x = area.x, y = area.y, "left area");
    }

    /// Checks that every recorded index points back at its body.
    #[cfg(test)]
    fn assert_consistent(&self) {
        for (id, list) in &self.memberships {
            for membership in list {
                let slot = self.slot(membership.area).expect("recorded area in grid");
                assert_eq!(self.buckets[slot].get(membership.index), Some(id));
            }
        }
        let registered: usize = self.memberships.values().map(Vec::len).sum();
        let stored: usize = self.buckets.iter().map(Vec::len).sum();
        assert_eq!(registered, stored);
    }
}
