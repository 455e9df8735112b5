//! Error types for Ledge.

use thiserror::Error;

/// Top-level error type for Ledge operations.
#[derive(Debug, Error)]
pub enum LedgeError {
    /// Level construction errors
    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Parsing errors (level or config files)
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building a level. These abort level load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    /// The level has no tiles
    #[error("level has no tiles")]
    Empty,

    /// A row differs in width from the first row
    #[error("row {row} is {actual} tiles wide, expected {expected}")]
    RaggedRow {
        /// Row index, counted from the top of the level text
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of this row
        actual: usize,
    },

    /// Tile data length does not match the declared dimensions
    #[error("expected {expected} tiles, got {actual}")]
    DimensionMismatch {
        /// width * height
        expected: usize,
        /// Number of tiles supplied
        actual: usize,
    },

    /// A character in the level text has no legend entry
    #[error("unknown tile symbol '{symbol}' at column {column}, row {row}")]
    UnknownSymbol {
        /// The offending character
        symbol: char,
        /// Column index
        column: usize,
        /// Row index, counted from the top of the level text
        row: usize,
    },

    /// A tile type name could not be parsed
    #[error("invalid tile type: {0}")]
    InvalidTileType(String),

    /// The area grid was given a zero-sized bucket
    #[error("invalid area size {width}x{height}")]
    InvalidAreaSize {
        /// Bucket width in tiles
        width: i32,
        /// Bucket height in tiles
        height: i32,
    },

    /// A spawn point lies outside the map
    #[error("spawn {index} at ({x}, {y}) is outside the map")]
    SpawnOutOfBounds {
        /// Index in the spawn list
        index: usize,
        /// World x
        x: f32,
        /// World y
        y: f32,
    },
}

/// Result type alias for Ledge operations.
pub type LedgeResult<T> = Result<T, LedgeError>;
