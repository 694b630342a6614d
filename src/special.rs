//! Special tile creation
//!
//! Runs are re-derived from the pass's clear set rather than from a fresh
//! board scan, so only cells still scheduled for clearing can receive a
//! special. Each match group yields at most one special:
//!
//! | shape                               | special             |
//! |-------------------------------------|---------------------|
//! | horizontal and vertical runs cross  | one `ColorBomb`     |
//! | run of 5 or more                    | `ColorBomb`         |
//! | horizontal run of 4                 | `StripedVertical`   |
//! | vertical run of 4                   | `StripedHorizontal` |
//! | run of 3                            | none                |

use crate::board::{Board, ClearSet, Pos};
use crate::matcher::MIN_RUN;
use crate::tile::{SpecialKind, TileKind};
use tracing::trace;

/// Axis of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A maximal run of same-coloured cells inside a clear set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRun {
    pub start: Pos,
    pub length: usize,
    pub orientation: Orientation,
    pub kind: TileKind,
}

impl MatchRun {
    /// Cells of the run, from its start
    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.length).map(move |i| match self.orientation {
            Orientation::Horizontal => Pos::new(self.start.row, self.start.col + i),
            Orientation::Vertical => Pos::new(self.start.row + i, self.start.col),
        })
    }

    pub fn contains(&self, pos: Pos) -> bool {
        match self.orientation {
            Orientation::Horizontal => {
                pos.row == self.start.row
                    && pos.col >= self.start.col
                    && pos.col < self.start.col + self.length
            }
            Orientation::Vertical => {
                pos.col == self.start.col
                    && pos.row >= self.start.row
                    && pos.row < self.start.row + self.length
            }
        }
    }

    /// The cell shared with a run on the other axis, if any
    pub fn crossing(&self, other: &MatchRun) -> Option<Pos> {
        if self.orientation == other.orientation || self.kind != other.kind {
            return None;
        }
        let (h, v) = match self.orientation {
            Orientation::Horizontal => (self, other),
            Orientation::Vertical => (other, self),
        };
        let cell = Pos::new(h.start.row, v.start.col);
        (h.contains(cell) && v.contains(cell)).then_some(cell)
    }

    /// Special earned by a run that does not cross another one
    fn reward(&self) -> Option<SpecialKind> {
        match (self.length, self.orientation) {
            (n, _) if n >= 5 => Some(SpecialKind::ColorBomb),
            (4, Orientation::Horizontal) => Some(SpecialKind::StripedVertical),
            (4, Orientation::Vertical) => Some(SpecialKind::StripedHorizontal),
            _ => None,
        }
    }
}

/// Maximal runs of at least `MIN_RUN` marked, same-coloured cells along one axis
pub fn runs_in(board: &Board, clear: &ClearSet, orientation: Orientation) -> Vec<MatchRun> {
    let (lines, span) = match orientation {
        Orientation::Horizontal => (board.rows(), board.cols()),
        Orientation::Vertical => (board.cols(), board.rows()),
    };
    let at = |line: usize, i: usize| match orientation {
        Orientation::Horizontal => Pos::new(line, i),
        Orientation::Vertical => Pos::new(i, line),
    };

    let mut runs = Vec::new();
    for line in 0..lines {
        let mut i = 0;
        while i < span {
            let start = at(line, i);
            let kind = board[start].kind;
            if !clear.contains(start) || kind.is_empty() {
                i += 1;
                continue;
            }
            let mut length = 1;
            while i + length < span {
                let next = at(line, i + length);
                if !clear.contains(next) || board[next].kind != kind {
                    break;
                }
                length += 1;
            }
            if length >= MIN_RUN {
                runs.push(MatchRun {
                    start,
                    length,
                    orientation,
                    kind,
                });
            }
            i += length;
        }
    }
    runs
}

/// Turn the runs of this pass into specials.
///
/// Runs that cross each other form one match group. A group with a crossing
/// yields a single `ColorBomb` on one of its crossing cells and nothing else;
/// a lone run earns a special by its length. `origin` holds the swapped cells
/// of the player's move (empty for cascade passes); a special goes to an
/// origin cell when the group contains one, otherwise to the first candidate
/// cell. Returns the specials created, in placement order.
pub fn create_specials(
    board: &mut Board,
    clear: &mut ClearSet,
    origin: &[Pos],
) -> Vec<(Pos, SpecialKind)> {
    let mut runs = runs_in(board, clear, Orientation::Horizontal);
    runs.extend(runs_in(board, clear, Orientation::Vertical));

    let mut group: Vec<usize> = (0..runs.len()).collect();
    let mut crossings = Vec::new();
    for (i, h) in runs.iter().enumerate() {
        for (j, v) in runs.iter().enumerate().skip(i + 1) {
            if let Some(cell) = h.crossing(v) {
                crossings.push((i, cell));
                let (ri, rj) = (root(&mut group, i), root(&mut group, j));
                group[ri.max(rj)] = ri.min(rj);
            }
        }
    }

    let mut created = Vec::new();
    for leader in 0..runs.len() {
        if root(&mut group, leader) != leader {
            continue;
        }
        // T, L, + and longer chains of crossing runs
        let cells: Vec<Pos> = crossings
            .iter()
            .filter(|&&(i, _)| root(&mut group, i) == leader)
            .map(|&(_, cell)| cell)
            .collect();
        let (target, special) = if let Some(&first) = cells.first() {
            let target = origin.iter().copied().find(|o| cells.contains(o)).unwrap_or(first);
            (target, SpecialKind::ColorBomb)
        } else {
            let run = &runs[leader];
            let Some(special) = run.reward() else {
                continue;
            };
            let target = origin
                .iter()
                .copied()
                .find(|&o| run.contains(o))
                .unwrap_or(run.start);
            (target, special)
        };
        place(board, clear, target, special, origin, &mut created);
    }

    created
}

/// Representative of a run's match group
fn root(group: &mut [usize], mut i: usize) -> usize {
    while group[i] != i {
        group[i] = group[group[i]];
        i = group[i];
    }
    i
}

/// Put a special on a cell and keep that cell off the clear list.
/// A cell already holding a special keeps it unless it is the origin.
fn place(
    board: &mut Board,
    clear: &mut ClearSet,
    target: Pos,
    special: SpecialKind,
    origin: &[Pos],
    created: &mut Vec<(Pos, SpecialKind)>,
) {
    let existing = board[target].special;
    if !existing.is_none() && !origin.contains(&target) {
        trace!(%target, ?existing, ?special, "kept existing special");
        return;
    }
    trace!(%target, ?special, "created special");
    board[target].special = special;
    clear.remove(target);
    created.push((target, special));
}
