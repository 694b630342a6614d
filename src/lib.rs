//! CRUSHRS - a deterministic match-3 engine
//!
//! A move goes through the same pipeline every time: validate the swap,
//! find matches, turn match shapes into specials, let specials cascade,
//! clear, drop and refill, then repeat until the board is quiet.

pub mod board;
pub mod cascade;
pub mod error;
pub mod game;
pub mod gravity;
pub mod matcher;
pub mod score;
pub mod settings;
pub mod source;
pub mod special;
pub mod tile;

pub use board::{Board, ClearSet, Pos};
pub use error::{EngineError, SettingsError};
pub use game::{Game, PassReport, TurnResult, find_hint, has_moves, is_legal_swap, resolve_move};
pub use source::{SeededSource, SequenceSource, TileSource};
pub use tile::{SpecialKind, Tile, TileKind};
