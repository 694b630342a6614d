//! Error types for the engine and settings

use crate::board::Pos;
use std::path::PathBuf;

/// Caller-contract violations and seeding failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("position {pos} is outside the {rows}x{cols} board")]
    OutOfBounds { pos: Pos, rows: usize, cols: usize },

    #[error("no match-free board after {attempts} seeding attempts")]
    SeedingExhausted { attempts: u32 },

    #[error("no legal move after {reseeds} fresh boards")]
    NoMoves { reseeds: u32 },

    #[error("board must be at least 3x3, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("palette must hold 3 to 9 colours, got {0}")]
    InvalidPalette(u8),

    #[error("board data holds the wrong number of tiles: expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },

    #[error("empty tile at {pos} carries a special")]
    InvariantViolation { pos: Pos },
}

/// Errors from loading or saving the settings file
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
