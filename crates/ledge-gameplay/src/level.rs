//! Level descriptions.
//!
//! Levels are RON documents holding ASCII tile rows (top row first), a
//! legend from symbols to tile type names, a world origin and a spawn list.
//! `.`, `#` and `=` are always available for empty, full and one-way full
//! tiles unless the legend overrides them.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use ledge_common::{LedgeError, LedgeResult, LevelError};
use ledge_kernel::{TileCollisionType, TileMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::npc::Patrol;

/// What a spawn point creates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnKind {
    /// The player character; position is its feet
    Player,
    /// A patrolling character; position is its feet
    Npc(Patrol),
    /// A moving platform; position is its centre
    MovingPlatform,
}

/// A spawn point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnDesc {
    /// What to spawn
    pub kind: SpawnKind,
    /// Where
    pub position: Vec2,
}

/// A level as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    /// Display name
    pub name: String,
    /// World position of the centre of the bottom-left tile
    #[serde(default)]
    pub origin: Vec2,
    /// Extra or overriding symbols, mapped to tile type names
    #[serde(default)]
    pub legend: BTreeMap<char, String>,
    /// Tile rows, top row first
    pub rows: Vec<String>,
    /// Spawn points
    #[serde(default)]
    pub spawns: Vec<SpawnDesc>,
}

impl LevelDesc {
    /// Parses a level from RON text.
    pub fn from_ron_str(text: &str) -> LedgeResult<Self> {
        ron::from_str(text).map_err(|e| LedgeError::Parse(e.to_string()))
    }

    /// Reads a level file.
    pub fn load(path: &Path) -> LedgeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let level = Self::from_ron_str(&text)?;
        info!("Loaded level '{}' from {:?}", level.name, path);
        Ok(level)
    }

    /// Serializes the level as pretty RON.
    pub fn to_ron_string(&self) -> LedgeResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| LedgeError::Parse(e.to_string()))
    }

    /// Writes the level to a file.
    pub fn save(&self, path: &Path) -> LedgeResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron_string()?)?;
        info!("Saved level '{}' to {:?}", self.name, path);
        Ok(())
    }

    /// Builds the tile map, checking every row and symbol.
    pub fn to_tile_map(&self) -> Result<TileMap, LevelError> {
        let width = self.rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(LevelError::Empty);
        }
        let height = self.rows.len();

        let mut tiles = vec![TileCollisionType::EMPTY; width * height];
        for (row, text) in self.rows.iter().enumerate() {
            let actual = text.chars().count();
            if actual != width {
                return Err(LevelError::RaggedRow {
                    row,
                    expected: width,
                    actual,
                });
            }
            let y = height - 1 - row;
            for (column, symbol) in text.chars().enumerate() {
                tiles[y * width + column] = self.tile_for(symbol, column, row)?;
            }
        }

        let map = TileMap::from_tiles(width as i32, height as i32, self.origin, tiles)?;
        self.check_spawns(&map)?;
        debug!(name = %self.name, width, height, spawns = self.spawns.len(), "level built");
        Ok(map)
    }

    fn tile_for(&self, symbol: char, column: usize, row: usize) -> Result<TileCollisionType, LevelError> {
        if let Some(name) = self.legend.get(&symbol) {
            return name.parse();
        }
        match symbol {
            '.' => Ok(TileCollisionType::EMPTY),
            '#' => Ok(TileCollisionType::FULL),
            '=' => Ok(TileCollisionType::ONE_WAY_FULL),
            _ => Err(LevelError::UnknownSymbol { symbol, column, row }),
        }
    }

    fn check_spawns(&self, map: &TileMap) -> Result<(), LevelError> {
        let (min, max) = map.bounds();
        for (index, spawn) in self.spawns.iter().enumerate() {
            let p = spawn.position;
            if p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y {
                return Err(LevelError::SpawnOutOfBounds { index, x: p.x, y: p.y });
            }
        }
        Ok(())
    }

    /// Generates a random cave level.
    ///
    /// The level is walled in with a two-row floor; slope ramps sit on the
    /// floor, one-way ledges and solid blocks float above it. The player
    /// spawns on the floor near the left wall, a patrolling NPC near the
    /// right wall, and a moving platform in the upper half. The same seed
    /// always yields the same level.
    #[must_use]
    pub fn generate(seed: u64, width: usize, height: usize) -> Self {
        let width = width.max(16);
        let height = height.max(10);
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut grid = vec![vec!['.'; width]; height];

        // Grid rows here are bottom-up; they are flipped when stored.
        for (y, row) in grid.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                if y < 2 || y == height - 1 || x == 0 || x == width - 1 {
                    *cell = '#';
                }
            }
        }

        // Ramps: up-slope, block, down-slope, kept clear of the spawns.
        let mut x = 6;
        while x + 8 < width {
            if rng.bool() {
                grid[2][x] = '/';
                grid[2][x + 1] = '#';
                grid[2][x + 2] = '\\';
                x += 3;
            }
            x += rng.usize(3..7);
        }

        // Floating ledges and blocks.
        let ledges = (width * height) / 60;
        for _ in 0..ledges {
            let y = rng.usize(5..height - 3);
            let length = rng.usize(2..6);
            let start = rng.usize(2..width - length - 2);
            let solid = rng.u8(0..4) == 0;
            for cell in &mut grid[y][start..start + length] {
                *cell = if solid { '#' } else { '=' };
            }
            if !solid && rng.bool() {
                grid[y][start + length] = '%';
            }
        }

        let legend = BTreeMap::from([
            ('/', "slope45".to_string()),
            ('\\', "slope45:fx".to_string()),
            ('%', "one_way:slope45:fx".to_string()),
        ]);

        let floor = 16.0 + 8.0;
        let spawns = vec![
            SpawnDesc {
                kind: SpawnKind::Player,
                position: Vec2::new(2.0 * 16.0, floor),
            },
            SpawnDesc {
                kind: SpawnKind::Npc(Patrol::new(false)),
                position: Vec2::new((width - 3) as f32 * 16.0, floor),
            },
            SpawnDesc {
                kind: SpawnKind::MovingPlatform,
                position: Vec2::new((width / 2) as f32 * 16.0, (height - 3) as f32 * 16.0),
            },
        ];

        Self {
            name: format!("cave-{seed}"),
            origin: Vec2::ZERO,
            legend,
            rows: grid.into_iter().rev().map(String::from_iter).collect(),
            spawns,
        }
    }
}
