//! Board representation and the per-pass clear mask

use crate::error::EngineError;
use crate::matcher;
use crate::source::TileSource;
use crate::tile::{SpecialKind, Tile, TileKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Reference board dimensions
pub const DEFAULT_ROWS: usize = 8;
pub const DEFAULT_COLS: usize = 8;

/// A grid coordinate, row 0 is the top row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True if the two positions share an edge
    pub fn is_adjacent(&self, other: Pos) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardData")]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Row-major storage
    cells: Vec<Tile>,
}

/// Unchecked serialized form of a board
#[derive(Deserialize)]
struct BoardData {
    rows: usize,
    cols: usize,
    cells: Vec<Tile>,
}

impl TryFrom<BoardData> for Board {
    type Error = EngineError;

    fn try_from(data: BoardData) -> Result<Self, Self::Error> {
        let expected = data.rows * data.cols;
        if data.cells.len() != expected {
            return Err(EngineError::CellCount {
                expected,
                found: data.cells.len(),
            });
        }
        let board = Self {
            rows: data.rows,
            cols: data.cols,
            cells: data.cells,
        };
        board.check_invariants()?;
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl Board {
    /// Create a board filled with empty tiles
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Tile::EMPTY; rows * cols],
        }
    }

    /// Build a board from colour rows, 0 meaning empty.
    /// Rows shorter than the first one are padded with empty tiles.
    pub fn from_colors(rows: &[&[u8]]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut board = Self::new(rows.len(), cols);
        for (row, colors) in rows.iter().enumerate() {
            for (col, &color) in colors.iter().take(cols).enumerate() {
                if color > 0 {
                    board[Pos::new(row, col)] = Tile::colored(color);
                }
            }
        }
        board
    }

    /// Fill a board from the source, regenerating every tile until the
    /// configuration holds no match. Gives up after `max_attempts` fills.
    pub fn seeded<S: TileSource + ?Sized>(
        rows: usize,
        cols: usize,
        palette: u8,
        source: &mut S,
        max_attempts: u32,
    ) -> Result<Self, EngineError> {
        if rows < 3 || cols < 3 {
            return Err(EngineError::InvalidDimensions { rows, cols });
        }
        let mut board = Self::new(rows, cols);
        for attempt in 1..=max_attempts {
            for tile in board.cells.iter_mut() {
                *tile = Tile {
                    kind: source.next_kind(palette),
                    special: SpecialKind::None,
                };
            }
            if !matcher::has_matches(&board) {
                tracing::debug!(attempt, rows, cols, "seeded match-free board");
                return Ok(board);
            }
        }
        Err(EngineError::SeedingExhausted {
            attempts: max_attempts,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Fail with `OutOfBounds` if the position is off the board
    pub fn check_bounds(&self, pos: Pos) -> Result<(), EngineError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds {
                pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Get the tile at a position, None if out of bounds
    pub fn get(&self, pos: Pos) -> Option<Tile> {
        self.contains(pos).then(|| self.cells[self.offset(pos)])
    }

    /// Set a tile, returns false if out of bounds
    pub fn set(&mut self, pos: Pos, tile: Tile) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let idx = self.offset(pos);
        self.cells[idx] = tile;
        true
    }

    /// Exchange two tiles (both positions must be on the board)
    pub fn swap(&mut self, a: Pos, b: Pos) {
        let (ia, ib) = (self.offset(a), self.offset(b));
        self.cells.swap(ia, ib);
    }

    /// Iterate over every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Pos::new(i / cols, i % cols))
    }

    /// Count tiles of the given colour
    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.cells.iter().filter(|t| t.kind == kind).count()
    }

    /// True if no cell is empty
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|t| !t.is_empty())
    }

    /// Report the first malformed tile (empty with a special)
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        match self.positions().find(|&p| !self[p].is_well_formed()) {
            Some(pos) => Err(EngineError::InvariantViolation { pos }),
            None => Ok(()),
        }
    }

    fn offset(&self, pos: Pos) -> usize {
        pos.row * self.cols + pos.col
    }
}

impl Index<Pos> for Board {
    type Output = Tile;

    fn index(&self, pos: Pos) -> &Tile {
        &self.cells[self.offset(pos)]
    }
}

impl IndexMut<Pos> for Board {
    fn index_mut(&mut self, pos: Pos) -> &mut Tile {
        let idx = self.offset(pos);
        &mut self.cells[idx]
    }
}

/// Plain dump: one digit per colour, followed by the special marker
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let tile = self[Pos::new(row, col)];
                match tile.kind {
                    TileKind::Empty => write!(f, ". ")?,
                    TileKind::Colored(c) => {
                        write!(f, "{}{}", c, tile.special.marker().unwrap_or(' '))?
                    }
                }
                if col + 1 < self.cols {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Cells scheduled for clearing during one resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearSet {
    rows: usize,
    cols: usize,
    marks: Vec<bool>,
}

impl ClearSet {
    /// An empty mask matching the board's dimensions
    pub fn for_board(board: &Board) -> Self {
        Self::new(board.rows, board.cols)
    }

    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            marks: vec![false; rows * cols],
        }
    }

    /// A mask with every cell marked
    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            marks: vec![true; rows * cols],
        }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.marks[pos.row * self.cols + pos.col]
    }

    /// Mark a cell, returns true if it was not marked before
    pub fn insert(&mut self, pos: Pos) -> bool {
        let slot = &mut self.marks[pos.row * self.cols + pos.col];
        !std::mem::replace(slot, true)
    }

    pub fn remove(&mut self, pos: Pos) -> bool {
        let slot = &mut self.marks[pos.row * self.cols + pos.col];
        std::mem::replace(slot, false)
    }

    pub fn len(&self) -> usize {
        self.marks.iter().filter(|&&m| m).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.marks.iter().any(|&m| m)
    }

    /// Marked positions in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| Pos::new(i / self.cols, i % self.cols))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}
