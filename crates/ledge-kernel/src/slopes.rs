//! Slope tile geometry.
//!
//! Every partial tile is described by a column height profile. From that
//! profile the kernel derives a per-pixel occupancy mask and precomputes a
//! [`SlopeOffset`] for every sub-rectangle of the tile. Only the canonical
//! orientation of each shape is stored; flipped and rotated variants are
//! remapped at lookup time (see [`crate::tile_query`]).
//!
//! The tables are immutable and built once per process through
//! [`SlopeTables::get`].

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use ledge_common::LevelError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Edge length of a tile in pixels.
pub const TILE_SIZE: i32 = 16;

/// Number of distinct slope shapes.
pub const SHAPE_COUNT: usize = 16;

/// Number of orientation variants per shape.
pub const ORIENTATION_COUNT: u16 = 8;

const CELLS: usize = TILE_SIZE as usize;
const SLOPES_START: u16 = 3;
const ONE_WAY_SLOPES_START: u16 = SLOPES_START + SHAPE_COUNT as u16 * ORIENTATION_COUNT;
const TYPE_COUNT: u16 = ONE_WAY_SLOPES_START + SHAPE_COUNT as u16 * ORIENTATION_COUNT;

/// Canonical slope shapes, each defined by the filled height of its 16 columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SlopeShape {
    /// One pixel up per pixel across
    Slope45,
    /// Lower half of a two-tile 22 degree ramp
    Slope22P1,
    /// Upper half of a two-tile 22 degree ramp
    Slope22P2,
    /// First third of a three-tile 15 degree ramp
    Slope15P1,
    /// Middle third of a three-tile 15 degree ramp
    Slope15P2,
    /// Last third of a three-tile 15 degree ramp
    Slope15P3,
    /// Low peaked roof
    SlopeMid1,
    /// Tall peaked roof
    SlopeMid2,
    /// Lower half block
    HalfBlock,
    /// Lower quarter block
    QuarterBlock,
    /// Lower three-quarter block
    ThreeQuarterBlock,
    /// Half-height step rising to full height
    Step,
    /// Four quarter-height stairs
    Stairs,
    /// Rounded hump
    Bump,
    /// Narrow full-height post in the middle
    Pillar,
    /// V-shaped dip in a full block
    Notch,
}

const HEIGHTS_45: [u8; CELLS] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
const HEIGHTS_22_P1: [u8; CELLS] = [1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8];
const HEIGHTS_22_P2: [u8; CELLS] = [9, 9, 10, 10, 11, 11, 12, 12, 13, 13, 14, 14, 15, 15, 16, 16];
const HEIGHTS_15_P1: [u8; CELLS] = [0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5];
const HEIGHTS_15_P2: [u8; CELLS] = [6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 10, 11];
const HEIGHTS_15_P3: [u8; CELLS] = [11, 11, 12, 12, 12, 13, 13, 13, 14, 14, 14, 15, 15, 15, 16, 16];
const HEIGHTS_MID_1: [u8; CELLS] = [1, 2, 3, 4, 5, 6, 7, 8, 8, 7, 6, 5, 4, 3, 2, 1];
const HEIGHTS_MID_2: [u8; CELLS] = [2, 4, 6, 8, 10, 12, 14, 16, 16, 14, 12, 10, 8, 6, 4, 2];
const HEIGHTS_HALF: [u8; CELLS] = [8; CELLS];
const HEIGHTS_QUARTER: [u8; CELLS] = [4; CELLS];
const HEIGHTS_THREE_QUARTER: [u8; CELLS] = [12; CELLS];
const HEIGHTS_STEP: [u8; CELLS] = [8, 8, 8, 8, 8, 8, 8, 8, 16, 16, 16, 16, 16, 16, 16, 16];
const HEIGHTS_STAIRS: [u8; CELLS] = [4, 4, 4, 4, 8, 8, 8, 8, 12, 12, 12, 12, 16, 16, 16, 16];
const HEIGHTS_BUMP: [u8; CELLS] = [3, 6, 8, 10, 12, 13, 14, 15, 15, 14, 13, 12, 10, 8, 6, 3];
const HEIGHTS_PILLAR: [u8; CELLS] = [0, 0, 0, 0, 16, 16, 16, 16, 16, 16, 16, 16, 0, 0, 0, 0];
const HEIGHTS_NOTCH: [u8; CELLS] = [16, 16, 16, 16, 14, 11, 8, 6, 6, 8, 11, 14, 16, 16, 16, 16];

impl SlopeShape {
    /// All shapes in id order.
    pub const ALL: [Self; SHAPE_COUNT] = [
        Self::Slope45,
        Self::Slope22P1,
        Self::Slope22P2,
        Self::Slope15P1,
        Self::Slope15P2,
        Self::Slope15P3,
        Self::SlopeMid1,
        Self::SlopeMid2,
        Self::HalfBlock,
        Self::QuarterBlock,
        Self::ThreeQuarterBlock,
        Self::Step,
        Self::Stairs,
        Self::Bump,
        Self::Pillar,
        Self::Notch,
    ];

    /// Index of the shape in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Filled height of each column, counted from the tile bottom.
    #[must_use]
    pub const fn heights(self) -> &'static [u8; CELLS] {
        match self {
            Self::Slope45 => &HEIGHTS_45,
            Self::Slope22P1 => &HEIGHTS_22_P1,
            Self::Slope22P2 => &HEIGHTS_22_P2,
            Self::Slope15P1 => &HEIGHTS_15_P1,
            Self::Slope15P2 => &HEIGHTS_15_P2,
            Self::Slope15P3 => &HEIGHTS_15_P3,
            Self::SlopeMid1 => &HEIGHTS_MID_1,
            Self::SlopeMid2 => &HEIGHTS_MID_2,
            Self::HalfBlock => &HEIGHTS_HALF,
            Self::QuarterBlock => &HEIGHTS_QUARTER,
            Self::ThreeQuarterBlock => &HEIGHTS_THREE_QUARTER,
            Self::Step => &HEIGHTS_STEP,
            Self::Stairs => &HEIGHTS_STAIRS,
            Self::Bump => &HEIGHTS_BUMP,
            Self::Pillar => &HEIGHTS_PILLAR,
            Self::Notch => &HEIGHTS_NOTCH,
        }
    }

    /// Name used in level legends.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slope45 => "slope45",
            Self::Slope22P1 => "slope22_p1",
            Self::Slope22P2 => "slope22_p2",
            Self::Slope15P1 => "slope15_p1",
            Self::Slope15P2 => "slope15_p2",
            Self::Slope15P3 => "slope15_p3",
            Self::SlopeMid1 => "slope_mid1",
            Self::SlopeMid2 => "slope_mid2",
            Self::HalfBlock => "half_block",
            Self::QuarterBlock => "quarter_block",
            Self::ThreeQuarterBlock => "three_quarter_block",
            Self::Step => "step",
            Self::Stairs => "stairs",
            Self::Bump => "bump",
            Self::Pillar => "pillar",
            Self::Notch => "notch",
        }
    }

    /// Looks up a shape by its legend name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|shape| shape.name() == name)
    }
}

/// One of the eight flip/rotation variants of a shape.
///
/// The discriminant doubles as a bit set: bit 0 flips x, bit 1 flips y and
/// bit 2 transposes the tile. Flips are applied before the transpose when
/// mapping tile-local cells onto the canonical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Canonical shape
    #[default]
    Identity = 0,
    /// Mirrored horizontally
    FlipX = 1,
    /// Mirrored vertically
    FlipY = 2,
    /// Mirrored on both axes
    FlipXY = 3,
    /// Rotated a quarter turn
    Rotate90 = 4,
    /// Rotated, then mirrored horizontally
    Rotate90FlipX = 5,
    /// Rotated, then mirrored vertically
    Rotate90FlipY = 6,
    /// Rotated, then mirrored on both axes
    Rotate90FlipXY = 7,
}

impl Orientation {
    /// All orientations in index order.
    pub const ALL: [Self; 8] = [
        Self::Identity,
        Self::FlipX,
        Self::FlipY,
        Self::FlipXY,
        Self::Rotate90,
        Self::Rotate90FlipX,
        Self::Rotate90FlipY,
        Self::Rotate90FlipXY,
    ];

    /// Decodes an orientation index; only the low three bits are used.
    #[must_use]
    pub const fn from_index(index: u16) -> Self {
        Self::ALL[(index % ORIENTATION_COUNT) as usize]
    }

    /// Whether tile-local x is mirrored.
    #[must_use]
    pub const fn flips_x(self) -> bool {
        self as u8 & 1 != 0
    }

    /// Whether tile-local y is mirrored.
    #[must_use]
    pub const fn flips_y(self) -> bool {
        self as u8 & 2 != 0
    }

    /// Whether tile-local axes are swapped.
    #[must_use]
    pub const fn rotates(self) -> bool {
        self as u8 & 4 != 0
    }

    /// Suffix used in level legends.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Identity => "id",
            Self::FlipX => "fx",
            Self::FlipY => "fy",
            Self::FlipXY => "fxy",
            Self::Rotate90 => "r90",
            Self::Rotate90FlipX => "r90fx",
            Self::Rotate90FlipY => "r90fy",
            Self::Rotate90FlipXY => "r90fxy",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.suffix() == suffix)
    }
}

/// Collision type of a single map tile.
///
/// A compact id: 0 is empty, 1 full, 2 a one-way full block, followed by
/// the solid slope range and a parallel one-way slope range. Within each
/// range the orientation is `(id - range_start) % 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct TileCollisionType(u16);

impl TileCollisionType {
    /// No collision.
    pub const EMPTY: Self = Self(0);
    /// Solid block.
    pub const FULL: Self = Self(1);
    /// Block that can only be stood on from above.
    pub const ONE_WAY_FULL: Self = Self(2);
    /// Number of valid ids.
    pub const COUNT: u16 = TYPE_COUNT;

    /// Creates a type from its raw id.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Option<Self> {
        if raw < TYPE_COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Raw id.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Solid slope of the given shape and orientation.
    #[must_use]
    pub const fn slope(shape: SlopeShape, orientation: Orientation) -> Self {
        Self(SLOPES_START + shape as u16 * ORIENTATION_COUNT + orientation as u16)
    }

    /// One-way slope of the given shape and orientation.
    #[must_use]
    pub const fn one_way_slope(shape: SlopeShape, orientation: Orientation) -> Self {
        Self(ONE_WAY_SLOPES_START + shape as u16 * ORIENTATION_COUNT + orientation as u16)
    }

    /// True for [`Self::EMPTY`].
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }

    /// True for full blocks, solid or one-way.
    #[must_use]
    pub const fn is_full(self) -> bool {
        self.0 == Self::FULL.0 || self.0 == Self::ONE_WAY_FULL.0
    }

    /// True for one-way blocks and one-way slopes.
    #[must_use]
    pub const fn is_one_way(self) -> bool {
        self.0 == Self::ONE_WAY_FULL.0 || (self.0 >= ONE_WAY_SLOPES_START && self.0 < TYPE_COUNT)
    }

    /// True for any slope, solid or one-way.
    #[must_use]
    pub const fn is_slope(self) -> bool {
        self.0 >= SLOPES_START && self.0 < TYPE_COUNT
    }

    /// Shape of a slope tile.
    #[must_use]
    pub fn shape(self) -> Option<SlopeShape> {
        if !self.is_slope() {
            return None;
        }
        let index = ((self.0 - SLOPES_START) / ORIENTATION_COUNT) as usize % SHAPE_COUNT;
        Some(SlopeShape::ALL[index])
    }

    /// Orientation of a slope tile; identity for everything else.
    #[must_use]
    pub const fn orientation(self) -> Orientation {
        if self.is_slope() {
            Orientation::from_index(self.0 - SLOPES_START)
        } else {
            Orientation::Identity
        }
    }
}

impl TryFrom<u16> for TileCollisionType {
    type Error = LevelError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or_else(|| LevelError::InvalidTileType(raw.to_string()))
    }
}

impl From<TileCollisionType> for u16 {
    fn from(ty: TileCollisionType) -> Self {
        ty.0
    }
}

impl fmt::Display for TileCollisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EMPTY => f.write_str("empty"),
            Self::FULL => f.write_str("full"),
            Self::ONE_WAY_FULL => f.write_str("one_way_full"),
            ty => {
                let Some(shape) = ty.shape() else {
                    return write!(f, "#{}", ty.0);
                };
                if ty.is_one_way() {
                    f.write_str("one_way:")?;
                }
                write!(f, "{}:{}", shape.name(), ty.orientation().suffix())
            },
        }
    }
}

impl FromStr for TileCollisionType {
    type Err = LevelError;

    /// Parses `empty`, `full`, `one_way_full`, `<shape>[:<orientation>]`
    /// or `one_way:<shape>[:<orientation>]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LevelError::InvalidTileType(s.to_string());
        match s.trim() {
            "empty" => return Ok(Self::EMPTY),
            "full" => return Ok(Self::FULL),
            "one_way_full" => return Ok(Self::ONE_WAY_FULL),
            _ => {},
        }

        let (one_way, rest) = match s.trim().strip_prefix("one_way:") {
            Some(rest) => (true, rest),
            None => (false, s.trim()),
        };
        let (shape_name, orientation) = match rest.split_once(':') {
            Some((shape, suffix)) => (shape, Orientation::from_suffix(suffix).ok_or_else(invalid)?),
            None => (rest, Orientation::Identity),
        };
        let shape = SlopeShape::from_name(shape_name).ok_or_else(invalid)?;

        Ok(if one_way {
            Self::one_way_slope(shape, orientation)
        } else {
            Self::slope(shape, orientation)
        })
    }
}

/// Signed free and colliding distances of a query rectangle inside a tile.
///
/// `free_*` is the displacement that moves an overlapping rectangle out of
/// the occupied cells along that direction (zero when the rectangle is
/// already clear). `colliding_*` describes contact on one side: positive
/// values on the bottom/left side (negative on the top/right side) are the
/// escape displacement of an overlapping rectangle, the opposite sign is
/// the gap to the nearest occupied cell, saturating at the tile boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlopeOffset {
    /// Escape displacement to the left (<= 0)
    pub free_left: i32,
    /// Escape displacement to the right (>= 0)
    pub free_right: i32,
    /// Escape displacement downwards (<= 0)
    pub free_down: i32,
    /// Escape displacement upwards (>= 0)
    pub free_up: i32,
    /// Contact on the left side
    pub colliding_left: i32,
    /// Contact on the right side
    pub colliding_right: i32,
    /// Contact below
    pub colliding_bottom: i32,
    /// Contact above
    pub colliding_top: i32,
}

impl SlopeOffset {
    /// Whether the queried rectangle overlaps occupied cells.
    #[must_use]
    pub const fn overlaps(&self) -> bool {
        self.colliding_bottom > 0
    }

    /// Smallest vertical displacement that clears an overlap, or zero.
    ///
    /// Ties favour moving up.
    #[must_use]
    pub fn vertical_escape(&self) -> i32 {
        if !self.overlaps() {
            return 0;
        }
        let up = self.colliding_bottom;
        let down = self.colliding_top;
        if down < 0 && -down < up {
            down
        } else {
            up
        }
    }
}

/// Table storage; every value fits in a signed byte.
#[derive(Debug, Clone, Copy, Default)]
struct CompactOffset([i8; 8]);

impl From<SlopeOffset> for CompactOffset {
    fn from(o: SlopeOffset) -> Self {
        Self([
            o.free_left as i8,
            o.free_right as i8,
            o.free_down as i8,
            o.free_up as i8,
            o.colliding_left as i8,
            o.colliding_right as i8,
            o.colliding_bottom as i8,
            o.colliding_top as i8,
        ])
    }
}

impl From<CompactOffset> for SlopeOffset {
    fn from(c: CompactOffset) -> Self {
        let [fl, fr, fd, fu, cl, cr, cb, ct] = c.0.map(i32::from);
        Self {
            free_left: fl,
            free_right: fr,
            free_down: fd,
            free_up: fu,
            colliding_left: cl,
            colliding_right: cr,
            colliding_bottom: cb,
            colliding_top: ct,
        }
    }
}

/// Precomputed offsets for every shape and every sub-rectangle.
pub struct SlopeTables {
    offsets: Vec<CompactOffset>,
}

impl fmt::Debug for SlopeTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlopeTables")
            .field("entries", &self.offsets.len())
            .finish()
    }
}

impl SlopeTables {
    /// Process-wide tables, built on first use.
    pub fn get() -> &'static Self {
        static TABLES: OnceLock<SlopeTables> = OnceLock::new();
        TABLES.get_or_init(Self::build)
    }

    /// Builds the tables for every shape.
    #[must_use]
    pub fn build() -> Self {
        let mut offsets = Vec::with_capacity(SHAPE_COUNT * CELLS.pow(4));

        for shape in SlopeShape::ALL {
            let columns = column_masks(shape.heights());

            let mut column_union = [[0u32; CELLS]; CELLS];
            for x0 in 0..CELLS {
                let mut acc = 0;
                for x1 in x0..CELLS {
                    acc |= columns[x1];
                    column_union[x0][x1] = acc;
                }
            }

            let mut row_hits = [[0u32; CELLS]; CELLS];
            for y0 in 0..CELLS {
                for y1 in y0..CELLS {
                    let rows = span(y0 as i32, y1 as i32);
                    row_hits[y0][y1] = columns
                        .iter()
                        .enumerate()
                        .filter(|(_, mask)| **mask & rows != 0)
                        .fold(0, |acc, (x, _)| acc | 1 << x);
                }
            }

            for x in 0..CELLS {
                for y in 0..CELLS {
                    for w in 0..CELLS {
                        for h in 0..CELLS {
                            let x1 = (x + w).min(CELLS - 1);
                            let y1 = (y + h).min(CELLS - 1);
                            let offset = sweep(
                                column_union[x][x1],
                                row_hits[y][y1],
                                [x as i32, y as i32, x1 as i32, y1 as i32],
                            );
                            offsets.push(CompactOffset::from(offset));
                        }
                    }
                }
            }
        }

        debug!(entries = offsets.len(), "Built slope offset tables");
        Self { offsets }
    }

    /// Offset of the canonical shape for the rectangle starting at `(x, y)`
    /// and spanning `w + 1` by `h + 1` cells, cut at the tile edge.
    #[must_use]
    pub fn canonical(&self, shape: SlopeShape, x: usize, y: usize, w: usize, h: usize) -> SlopeOffset {
        let index = (((shape.index() * CELLS + x.min(CELLS - 1)) * CELLS + y.min(CELLS - 1)) * CELLS
            + w.min(CELLS - 1))
            * CELLS
            + h.min(CELLS - 1);
        self.offsets
            .get(index)
            .copied()
            .map(SlopeOffset::from)
            .unwrap_or_default()
    }
}

/// Bit `y` of entry `x` is set when cell `(x, y)` is occupied.
fn column_masks(heights: &[u8; CELLS]) -> [u32; CELLS] {
    heights.map(|h| (1u32 << u32::from(h).min(TILE_SIZE as u32)) - 1)
}

/// Bits `lo..=hi`, clipped to the tile.
fn span(lo: i32, hi: i32) -> u32 {
    let lo = lo.max(0);
    let hi = hi.min(TILE_SIZE - 1);
    if lo > hi {
        return 0;
    }
    let upper = (1u32 << (hi + 1)) - 1;
    let lower = (1u32 << lo) - 1;
    upper & !lower
}

/// Sweeps the rectangle `[x0, x1] x [y0, y1]` in all four directions.
///
/// `rows` is the union of occupied rows over the rectangle's columns and
/// `columns` the set of columns occupied somewhere in its rows.
fn sweep(rows: u32, columns: u32, [x0, y0, x1, y1]: [i32; 4]) -> SlopeOffset {
    let hit_v = |dy: i32| rows & span(y0 + dy, y1 + dy) != 0;
    let hit_h = |dx: i32| columns & span(x0 + dx, x1 + dx) != 0;

    if hit_v(0) {
        let up = (1..=TILE_SIZE - y0).find(|&d| !hit_v(d)).unwrap_or(TILE_SIZE - y0);
        let down = (1..=y1 + 1).find(|&d| !hit_v(-d)).unwrap_or(y1 + 1);
        let right = (1..=TILE_SIZE - x0).find(|&d| !hit_h(d)).unwrap_or(TILE_SIZE - x0);
        let left = (1..=x1 + 1).find(|&d| !hit_h(-d)).unwrap_or(x1 + 1);
        SlopeOffset {
            free_left: -left,
            free_right: right,
            free_down: -down,
            free_up: up,
            colliding_left: right,
            colliding_right: -left,
            colliding_bottom: up,
            colliding_top: -down,
        }
    } else {
        let below = (1..=y0).find(|&d| hit_v(-d)).map_or(y0 + 1, |d| d - 1);
        let above = (1..TILE_SIZE - y1).find(|&d| hit_v(d)).map_or(TILE_SIZE - y1, |d| d - 1);
        let left = (1..=x0).find(|&d| hit_h(-d)).map_or(x0 + 1, |d| d - 1);
        let right = (1..TILE_SIZE - x1).find(|&d| hit_h(d)).map_or(TILE_SIZE - x1, |d| d - 1);
        SlopeOffset {
            colliding_left: -left,
            colliding_right: right,
            colliding_bottom: -below,
            colliding_top: above,
            ..SlopeOffset::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ranges() {
        let slope = TileCollisionType::slope(SlopeShape::Slope45, Orientation::Identity);
        assert_eq!(slope.raw(), 3);
        assert!(slope.is_slope() && !slope.is_one_way());

        let last = TileCollisionType::one_way_slope(SlopeShape::Notch, Orientation::Rotate90FlipXY);
        assert_eq!(last.raw(), TileCollisionType::COUNT - 1);
        assert!(last.is_one_way());
        assert_eq!(last.shape(), Some(SlopeShape::Notch));
        assert_eq!(last.orientation(), Orientation::Rotate90FlipXY);
        assert!(TileCollisionType::from_raw(TileCollisionType::COUNT).is_none());
    }

    #[test]
    fn test_orientation_bits() {
        assert!(Orientation::FlipXY.flips_x() && Orientation::FlipXY.flips_y());
        assert!(!Orientation::FlipXY.rotates());
        assert!(Orientation::Rotate90FlipY.rotates() && Orientation::Rotate90FlipY.flips_y());
        assert_eq!(Orientation::from_index(13), Orientation::Rotate90FlipX);
    }

    #[test]
    fn test_textual_form_roundtrip() {
        for raw in 0..TileCollisionType::COUNT {
            let ty = TileCollisionType::from_raw(raw).expect("valid id");
            let parsed: TileCollisionType = ty.to_string().parse().expect("parses");
            assert_eq!(parsed, ty);
        }
        assert_eq!(
            "slope_mid1".parse::<TileCollisionType>().expect("parses"),
            TileCollisionType::slope(SlopeShape::SlopeMid1, Orientation::Identity)
        );
        assert!("slope99".parse::<TileCollisionType>().is_err());
        assert!("slope45:r45".parse::<TileCollisionType>().is_err());
    }

    #[test]
    fn test_span_clips_to_tile() {
        assert_eq!(span(0, 0), 1);
        assert_eq!(span(-3, 1), 0b11);
        assert_eq!(span(14, 20), 0b11 << 14);
        assert_eq!(span(5, 4), 0);
    }

    #[test]
    fn test_slope45_single_pixel() {
        let tables = SlopeTables::get();

        // Bottom-left pixel is filled: one pixel up frees it.
        let inside = tables.canonical(SlopeShape::Slope45, 0, 0, 0, 0);
        assert_eq!(inside.free_up, 1);
        assert_eq!(inside.colliding_bottom, 1);
        assert_eq!(inside.free_down, -1);
        assert!(inside.overlaps());

        // Three pixels above the surface at column 4 (height 5).
        let above = tables.canonical(SlopeShape::Slope45, 4, 8, 0, 0);
        assert_eq!(above.free_up, 0);
        assert_eq!(above.colliding_bottom, -3);
        assert!(!above.overlaps());
    }

    #[test]
    fn test_escape_saturates_at_tile_edge() {
        let tables = SlopeTables::get();
        // A half block fully covered: leaving upward needs 8 pixels,
        // leaving sideways needs the whole tile width.
        let offset = tables.canonical(SlopeShape::HalfBlock, 0, 0, 15, 3);
        assert_eq!(offset.free_up, 8);
        assert_eq!(offset.free_right, 16);
        assert_eq!(offset.free_left, -16);
    }

    #[test]
    fn test_clear_rect_gap_to_surface() {
        let tables = SlopeTables::get();
        let offset = tables.canonical(SlopeShape::QuarterBlock, 2, 10, 3, 2);
        assert_eq!(offset.colliding_bottom, -6);
        assert_eq!(offset.colliding_top, 16 - 12);
        // Nothing sideways within these rows.
        assert_eq!(offset.colliding_left, -3);
        assert_eq!(offset.colliding_right, 16 - 5);
    }

    #[test]
    fn test_vertical_escape_prefers_smaller() {
        let offset = SlopeOffset {
            colliding_bottom: 5,
            colliding_top: -2,
            ..SlopeOffset::default()
        };
        assert_eq!(offset.vertical_escape(), -2);
        assert_eq!(SlopeOffset::default().vertical_escape(), 0);
    }
}
