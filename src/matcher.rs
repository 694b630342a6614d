//! Match detection: runs of three or more identical candies

use crate::board::{Board, ClearSet, Pos};

/// Minimum run length that counts as a match
pub const MIN_RUN: usize = 3;

/// Mark every cell lying in a horizontal or vertical run of at least
/// `MIN_RUN` identical non-empty tiles. Pure, the board is not touched.
pub fn find_matches(board: &Board) -> ClearSet {
    let mut matches = ClearSet::for_board(board);

    for row in 0..board.rows() {
        mark_runs(board, &mut matches, (0..board.cols()).map(|col| Pos::new(row, col)));
    }
    for col in 0..board.cols() {
        mark_runs(board, &mut matches, (0..board.rows()).map(|row| Pos::new(row, col)));
    }

    matches
}

/// True if the board holds at least one match
pub fn has_matches(board: &Board) -> bool {
    !find_matches(board).is_empty()
}

/// Scan one line of cells and mark its runs
fn mark_runs(board: &Board, matches: &mut ClearSet, line: impl Iterator<Item = Pos>) {
    let mut run: Vec<Pos> = Vec::with_capacity(board.rows().max(board.cols()));

    for pos in line {
        let kind = board[pos].kind;
        let continues = run.last().is_some_and(|&last| board[last].kind == kind);
        if !continues {
            flush(board, matches, &run);
            run.clear();
        }
        // Empty cells break runs and never start one
        if !kind.is_empty() {
            run.push(pos);
        }
    }
    flush(board, matches, &run);
}

fn flush(board: &Board, matches: &mut ClearSet, run: &[Pos]) {
    if run.len() >= MIN_RUN && !board[run[0]].is_empty() {
        for &pos in run {
            matches.insert(pos);
        }
    }
}
