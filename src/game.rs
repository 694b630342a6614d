//! Move validation and turn resolution

use crate::board::{Board, Pos};
use crate::cascade::{BombTrigger, activate, activate_with, bomb_trigger};
use crate::error::EngineError;
use crate::gravity::settle;
use crate::matcher::find_matches;
use crate::settings::Settings;
use crate::source::{SeededSource, TileSource};
use crate::special::create_specials;
use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Upper bound on cascade passes for one move. Only a degenerate tile
/// source (one that keeps refilling matches) can reach it.
const PASS_LIMIT: usize = 256;

/// Outcome of one player move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    pub accepted: bool,
    /// Tiles cleared over all passes
    pub total_cleared: usize,
    pub score_delta: u64,
    /// Number of passes that cleared something
    pub passes: usize,
    pub final_board: Board,
}

impl TurnResult {
    fn rejected(board: &Board) -> Self {
        Self {
            accepted: false,
            total_cleared: 0,
            score_delta: 0,
            passes: 0,
            final_board: board.clone(),
        }
    }
}

/// Snapshot handed to the pass observer once a pass has cleared and settled
#[derive(Debug, Clone, Copy)]
pub struct PassReport<'a> {
    /// 1-based pass number
    pub pass: usize,
    pub cleared: usize,
    pub board: &'a Board,
}

/// True if swapping `a` and `b` is a legal move: the cells are adjacent and
/// either one is a color bomb or one of the swapped cells ends up in a match.
/// Matches elsewhere on the board do not make a swap legal. The board is not
/// modified.
pub fn is_legal_swap(board: &Board, a: Pos, b: Pos) -> bool {
    if !board.contains(a) || !board.contains(b) || !a.is_adjacent(b) {
        return false;
    }
    if board[a].is_color_bomb() || board[b].is_color_bomb() {
        return true;
    }
    let mut trial = board.clone();
    trial.swap(a, b);
    let matches = find_matches(&trial);
    matches.contains(a) || matches.contains(b)
}

/// First legal swap in row-major order, trying the right then the lower
/// neighbour of each cell
pub fn find_hint(board: &Board) -> Option<(Pos, Pos)> {
    board.positions().find_map(|pos| {
        [Pos::new(pos.row, pos.col + 1), Pos::new(pos.row + 1, pos.col)]
            .into_iter()
            .find(|&other| is_legal_swap(board, pos, other))
            .map(|other| (pos, other))
    })
}

/// True if at least one legal swap exists
pub fn has_moves(board: &Board) -> bool {
    find_hint(board).is_some()
}

/// Validate and resolve a swap in place.
///
/// Rejected swaps leave the board untouched. Accepted swaps run
/// match → special creation → activation → clear → gravity passes until a
/// pass clears nothing; `on_pass` sees the board after every clearing pass.
pub fn resolve_move<S, F>(
    board: &mut Board,
    source: &mut S,
    palette: u8,
    a: Pos,
    b: Pos,
    mut on_pass: F,
) -> Result<TurnResult, EngineError>
where
    S: TileSource + ?Sized,
    F: FnMut(&PassReport<'_>),
{
    board.check_bounds(a)?;
    board.check_bounds(b)?;

    if !is_legal_swap(board, a, b) {
        info!(%a, %b, "rejected swap");
        return Ok(TurnResult::rejected(board));
    }

    let bomb_swap = board[a].is_color_bomb() || board[b].is_color_bomb();
    board.swap(a, b);

    // Same origin whichever way round the swap was requested
    let origin = if a <= b { [a, b] } else { [b, a] };
    let mut total_cleared = 0;
    let mut passes = 0;

    while passes < PASS_LIMIT {
        let first = passes == 0;
        let (clear, spent) = if first && bomb_swap {
            let BombTrigger {
                mut clear,
                mut expanded,
                spent,
            } = bomb_trigger(board, a, b);
            activate_with(board, &mut clear, &mut expanded);
            (clear, spent)
        } else {
            let mut clear = find_matches(board);
            let hint: &[Pos] = if first { &origin } else { &[] };
            let created = create_specials(board, &mut clear, hint);
            if !created.is_empty() {
                debug!(pass = passes + 1, ?created, "specials created");
            }
            activate(board, &mut clear);
            (clear, None)
        };

        let mut cleared = 0;
        for pos in clear.iter() {
            if !board[pos].is_empty() {
                board[pos] = Tile::EMPTY;
                cleared += 1;
            }
        }
        // A bomb that swept another colour is used up but not scored
        let consumed = match spent {
            Some(pos) if !board[pos].is_empty() => {
                board[pos] = Tile::EMPTY;
                true
            }
            _ => false,
        };
        if cleared == 0 && !consumed {
            break;
        }

        passes += 1;
        total_cleared += cleared;
        settle(board, source, palette);
        debug_assert!(board.check_invariants().is_ok());
        debug!(pass = passes, cleared, "pass resolved");
        on_pass(&PassReport {
            pass: passes,
            cleared,
            board: &*board,
        });
    }

    if passes == PASS_LIMIT {
        warn!(passes, "cascade stopped at pass limit");
    }

    info!(%a, %b, total_cleared, passes, "accepted swap");
    Ok(TurnResult {
        accepted: true,
        total_cleared,
        score_delta: total_cleared as u64,
        passes,
        final_board: board.clone(),
    })
}

/// A board together with the source that refills it
#[derive(Debug, Clone)]
pub struct Game<S: TileSource = SeededSource> {
    board: Board,
    source: S,
    palette: u8,
}

impl Game<SeededSource> {
    /// Create a game from settings, seeding from the configured seed or
    /// from entropy
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        settings.validate()?;
        let source = match settings.session.seed {
            Some(seed) => SeededSource::new(seed),
            None => SeededSource::from_entropy(),
        };
        info!(seed = source.seed(), "new game");
        Self::seeded(
            settings.board.rows,
            settings.board.cols,
            settings.board.palette,
            source,
            settings.engine.seed_attempts,
        )
    }
}

impl<S: TileSource> Game<S> {
    /// Wrap an existing board
    pub fn new(board: Board, source: S, palette: u8) -> Self {
        Self {
            board,
            source,
            palette,
        }
    }

    /// Generate a fresh match-free board from the source
    pub fn seeded(
        rows: usize,
        cols: usize,
        palette: u8,
        mut source: S,
        max_attempts: u32,
    ) -> Result<Self, EngineError> {
        let board = Board::seeded(rows, cols, palette, &mut source, max_attempts)?;
        Ok(Self::new(board, source, palette))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn palette(&self) -> u8 {
        self.palette
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Try a swap, resolving it fully if legal
    pub fn attempt_move(&mut self, a: Pos, b: Pos) -> Result<TurnResult, EngineError> {
        self.attempt_move_with(a, b, |_| {})
    }

    /// Like [`Game::attempt_move`], reporting each cascade pass
    pub fn attempt_move_with<F>(&mut self, a: Pos, b: Pos, on_pass: F) -> Result<TurnResult, EngineError>
    where
        F: FnMut(&PassReport<'_>),
    {
        resolve_move(&mut self.board, &mut self.source, self.palette, a, b, on_pass)
    }

    pub fn hint(&self) -> Option<(Pos, Pos)> {
        find_hint(&self.board)
    }

    /// Hint for the current board, swapping in fresh boards while the
    /// current one has no legal move. Fails with `NoMoves` after
    /// `max_reseeds` fresh boards without one.
    pub fn next_hint(&mut self, max_reseeds: u32, seed_attempts: u32) -> Result<(Pos, Pos), EngineError> {
        for reseeds in 0..=max_reseeds {
            if let Some(hint) = self.hint() {
                return Ok(hint);
            }
            if reseeds < max_reseeds {
                warn!(reseeds, "no moves left, reseeding board");
                self.reseed(seed_attempts)?;
            }
        }
        Err(EngineError::NoMoves { reseeds: max_reseeds })
    }

    /// Replace the board with a new match-free one, keeping the dimensions
    pub fn reseed(&mut self, max_attempts: u32) -> Result<(), EngineError> {
        self.board = Board::seeded(
            self.board.rows(),
            self.board.cols(),
            self.palette,
            &mut self.source,
            max_attempts,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::has_matches;
    use crate::source::SequenceSource;
    use crate::tile::SpecialKind;
    use proptest::prelude::*;

    /// 6x6 board without matches: colours cycle with (row + 2*col) over 1,3,4,5
    fn quiet_board() -> Board {
        let palette = [1u8, 3, 4, 5];
        let mut board = Board::new(6, 6);
        for pos in board.positions() {
            board[pos] = Tile::colored(palette[(pos.row + 2 * pos.col) % 4]);
        }
        board
    }

    #[test]
    fn test_quiet_board_is_quiet() {
        assert!(!has_matches(&quiet_board()));
    }

    #[test]
    fn test_out_of_bounds_fails_fast() {
        let mut board = quiet_board();
        let before = board.clone();
        let mut source = SequenceSource::new(vec![2]);
        let err = resolve_move(&mut board, &mut source, 5, Pos::new(5, 5), Pos::new(5, 6), |_| {})
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfBounds { .. }));
        assert_eq!(board, before);
    }

    #[test]
    fn test_non_adjacent_rejected() {
        let mut board = quiet_board();
        board[Pos::new(0, 0)].special = SpecialKind::ColorBomb;
        let before = board.clone();
        let mut source = SequenceSource::new(vec![2]);
        let result =
            resolve_move(&mut board, &mut source, 5, Pos::new(0, 0), Pos::new(1, 1), |_| {}).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.score_delta, 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_swap_without_match_rejected() {
        let mut board = quiet_board();
        let before = board.clone();
        let mut source = SequenceSource::new(vec![2]);
        let result =
            resolve_move(&mut board, &mut source, 5, Pos::new(2, 2), Pos::new(2, 3), |_| {}).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.final_board, before);
        assert_eq!(board, before);
        assert_eq!(source.drawn(), 0);
    }

    #[test]
    fn test_simple_match_clears_three() {
        // Row 0 reads 2 2 x 2 with the last 2 one row down
        let mut board = quiet_board();
        board[Pos::new(0, 0)] = Tile::colored(2);
        board[Pos::new(0, 1)] = Tile::colored(2);
        board[Pos::new(1, 2)] = Tile::colored(2);
        assert!(!has_matches(&board));

        // Refill colours chosen so the new top row stays quiet
        let mut source = SequenceSource::new(vec![3, 1, 5]);
        let mut reports = Vec::new();
        let result = resolve_move(&mut board, &mut source, 5, Pos::new(1, 2), Pos::new(0, 2), |r| {
            reports.push((r.pass, r.cleared));
        })
        .unwrap();
        assert!(result.accepted);
        assert_eq!(reports[0], (1, 3));
        assert_eq!(result.total_cleared, reports.iter().map(|r| r.1).sum::<usize>());
        assert_eq!(result.score_delta, result.total_cleared as u64);
        assert!(board.is_full());
        assert!(!has_matches(&board));
        assert_eq!(result.final_board, board);
    }

    #[test]
    fn test_find_hint() {
        let board = quiet_board();
        assert_eq!(find_hint(&board), None);
        assert!(!has_moves(&board));

        let mut board = quiet_board();
        board[Pos::new(4, 0)] = Tile::colored(2);
        board[Pos::new(4, 1)] = Tile::colored(2);
        board[Pos::new(5, 2)] = Tile::colored(2);
        let (a, b) = find_hint(&board).unwrap();
        assert!(is_legal_swap(&board, a, b));
        assert_eq!((a, b), (Pos::new(4, 2), Pos::new(5, 2)));
    }

    #[test]
    fn test_bomb_always_legal() {
        let mut board = quiet_board();
        board[Pos::new(3, 3)].special = SpecialKind::ColorBomb;
        assert!(is_legal_swap(&board, Pos::new(3, 3), Pos::new(3, 4)));
        assert!(is_legal_swap(&board, Pos::new(2, 3), Pos::new(3, 3)));
        assert!(has_moves(&board));
    }

    #[test]
    fn test_cascade_special_lands_on_run_start() {
        let mut board = quiet_board();
        board[Pos::new(0, 0)] = Tile::colored(2);
        board[Pos::new(0, 1)] = Tile::colored(2);
        board[Pos::new(1, 2)] = Tile::colored(2);

        // First refill lines up 4 4 4 next to the 4 at (0, 3); the second
        // one keeps the top row quiet
        let mut source = SequenceSource::new(vec![4, 4, 4, 3, 5, 3]);
        let mut reports = Vec::new();
        let result = resolve_move(&mut board, &mut source, 5, Pos::new(1, 2), Pos::new(0, 2), |r| {
            reports.push((r.pass, r.cleared));
        })
        .unwrap();

        assert!(result.accepted);
        assert_eq!(reports, vec![(1, 3), (2, 3)]);
        assert_eq!(result.total_cleared, 6);
        assert_eq!(board[Pos::new(0, 0)], Tile::special(4, SpecialKind::StripedVertical));
        assert_eq!(source.drawn(), 6);
        assert!(!has_matches(&board));
    }

    #[test]
    fn test_next_hint_without_reseed() {
        let mut board = quiet_board();
        board[Pos::new(4, 0)] = Tile::colored(2);
        board[Pos::new(4, 1)] = Tile::colored(2);
        board[Pos::new(5, 2)] = Tile::colored(2);
        let mut game = Game::new(board.clone(), SequenceSource::new(vec![1]), 5);
        assert_eq!(game.next_hint(3, 10), Ok((Pos::new(4, 2), Pos::new(5, 2))));
        assert_eq!(game.board(), &board);
    }

    #[test]
    fn test_next_hint_gives_up() {
        // Nine distinct colours on a 3x3 board never allow a move
        let source = SequenceSource::new((1..=9).collect());
        let mut game = Game::seeded(3, 3, 9, source, 10).unwrap();
        assert_eq!(game.hint(), None);
        assert_eq!(game.next_hint(4, 10), Err(EngineError::NoMoves { reseeds: 4 }));
        assert_eq!(game.source().drawn(), 9 * 5);
    }

    #[test]
    fn test_game_seeded_and_reseed() {
        let mut game = Game::seeded(8, 8, 5, SeededSource::new(11), 1000).unwrap();
        assert!(!has_matches(game.board()));
        let before = game.board().clone();
        game.reseed(1000).unwrap();
        assert_ne!(game.board(), &before);
        assert!(!has_matches(game.board()));
    }

    #[test]
    fn test_game_deterministic_per_seed() {
        let play = || {
            let mut game = Game::seeded(8, 8, 5, SeededSource::new(2024), 1000).unwrap();
            let mut results = Vec::new();
            for _ in 0..5 {
                let Some((a, b)) = game.hint() else { break };
                results.push(game.attempt_move(a, b).unwrap());
            }
            results
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_accepted_moves_leave_stable_board() {
        let mut game = Game::seeded(8, 8, 5, SeededSource::new(5), 1000).unwrap();
        for _ in 0..20 {
            let Some((a, b)) = game.hint() else {
                game.reseed(1000).unwrap();
                continue;
            };
            let result = game.attempt_move(a, b).unwrap();
            assert!(result.accepted);
            assert!(result.total_cleared >= 3);
            assert!(game.board().is_full());
            assert!(!has_matches(game.board()));
            assert!(game.board().check_invariants().is_ok());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_move_symmetry(
            seed in any::<u64>(),
            row in 0usize..8,
            col in 0usize..8,
            vertical in any::<bool>(),
            bomb in any::<bool>(),
        ) {
            let mut source = SeededSource::new(seed);
            let mut board = Board::seeded(8, 8, 5, &mut source, 1000).unwrap();
            let a = Pos::new(row, col);
            let b = if vertical {
                Pos::new((row + 1) % 8, col)
            } else {
                Pos::new(row, (col + 1) % 8)
            };
            if bomb {
                board[a].special = SpecialKind::ColorBomb;
            }

            let mut board_ab = board.clone();
            let mut source_ab = source.clone();
            let ab = resolve_move(&mut board_ab, &mut source_ab, 5, a, b, |_| {}).unwrap();

            let mut board_ba = board.clone();
            let mut source_ba = source.clone();
            let ba = resolve_move(&mut board_ba, &mut source_ba, 5, b, a, |_| {}).unwrap();

            prop_assert_eq!(ab, ba);
        }
    }
}
