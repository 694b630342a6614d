//! Special activation: growing a clear set to its fixed point

use crate::board::{Board, ClearSet, Pos};
use crate::tile::{SpecialKind, TileKind};
use tracing::trace;

/// Expand the clear set with the effects of every special it contains,
/// including specials swept in by other specials, until a full scan adds
/// nothing. Only the clear set changes; board specials are left as they are.
pub fn activate(board: &Board, clear: &mut ClearSet) {
    let mut expanded = ClearSet::for_board(board);
    activate_with(board, clear, &mut expanded);
}

/// Same as [`activate`], skipping cells already flagged in `expanded`.
/// Returns the number of scans performed.
pub fn activate_with(board: &Board, clear: &mut ClearSet, expanded: &mut ClearSet) -> usize {
    let mut scans = 0;
    loop {
        scans += 1;
        let mut added = 0;
        for pos in board.positions() {
            if !clear.contains(pos) || expanded.contains(pos) {
                continue;
            }
            let special = board[pos].special;
            if special.is_none() {
                continue;
            }
            expanded.insert(pos);
            let before = added;
            for target in blast(board, pos, special) {
                if clear.insert(target) {
                    added += 1;
                }
            }
            trace!(%pos, ?special, added = added - before, "activated special");
        }
        if added == 0 {
            return scans;
        }
    }
}

/// Cells hit by a special going off at `pos`
fn blast(board: &Board, pos: Pos, special: SpecialKind) -> Vec<Pos> {
    match special {
        SpecialKind::None => Vec::new(),
        SpecialKind::StripedHorizontal => (0..board.cols()).map(|c| Pos::new(pos.row, c)).collect(),
        SpecialKind::StripedVertical => (0..board.rows()).map(|r| Pos::new(r, pos.col)).collect(),
        // A bomb caught in a match or another blast clears its 3x3 block
        SpecialKind::ColorBomb => {
            let rows = pos.row.saturating_sub(1)..=(pos.row + 1).min(board.rows() - 1);
            rows.flat_map(|r| {
                let cols = pos.col.saturating_sub(1)..=(pos.col + 1).min(board.cols() - 1);
                cols.map(move |c| Pos::new(r, c))
            })
            .collect()
        }
    }
}

/// Outcome of a color bomb swapped directly with another tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BombTrigger {
    /// Cells swept by the bomb
    pub clear: ClearSet,
    /// Triggering bombs, to seed [`activate_with`] so they do not also blast
    pub expanded: ClearSet,
    /// Bomb used up by the sweep without being one of the swept cells.
    /// It leaves the board but does not count as cleared.
    pub spent: Option<Pos>,
}

/// Clear set for a color bomb swapped directly with `other`.
///
/// Two bombs wipe the board. A bomb against a candy sweeps exactly the tiles
/// of that candy's colour; the bomb itself is only part of the sweep when it
/// shares that colour, otherwise it is reported as spent.
pub fn bomb_trigger(board: &Board, a: Pos, b: Pos) -> BombTrigger {
    let mut clear = ClearSet::for_board(board);
    let mut expanded = ClearSet::for_board(board);

    let (ta, tb) = (board[a], board[b]);
    if ta.is_color_bomb() && tb.is_color_bomb() {
        expanded.insert(a);
        expanded.insert(b);
        return BombTrigger {
            clear: ClearSet::full(board.rows(), board.cols()),
            expanded,
            spent: None,
        };
    }

    let (bomb, target) = if ta.is_color_bomb() { (a, tb.kind) } else { (b, ta.kind) };
    expanded.insert(bomb);
    if let TileKind::Colored(_) = target {
        for pos in board.positions() {
            if board[pos].kind == target {
                clear.insert(pos);
            }
        }
    }
    let spent = (!clear.contains(bomb)).then_some(bomb);
    BombTrigger {
        clear,
        expanded,
        spent,
    }
}
