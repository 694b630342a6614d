//! Gravity and refill

use crate::board::{Board, Pos};
use crate::source::TileSource;
use crate::tile::{SpecialKind, Tile};

/// Drop surviving tiles to the bottom of each column, keeping their order,
/// then fill the vacated cells at the top with fresh plain candies.
/// Columns are processed left to right and filled top row first.
/// Returns the number of tiles generated.
pub fn settle<S: TileSource + ?Sized>(board: &mut Board, source: &mut S, palette: u8) -> usize {
    let mut spawned = 0;
    for col in 0..board.cols() {
        let filled = compact_column(board, col);
        for row in 0..board.rows() - filled {
            board[Pos::new(row, col)] = Tile {
                kind: source.next_kind(palette),
                special: SpecialKind::None,
            };
            spawned += 1;
        }
    }
    spawned
}

/// Stable bottom-anchored compaction of one column.
/// Returns the number of non-empty tiles, the top cells above them are left empty.
fn compact_column(board: &mut Board, col: usize) -> usize {
    let rows = board.rows();
    let mut write_row = rows;

    for read_row in (0..rows).rev() {
        let tile = board[Pos::new(read_row, col)];
        if tile.is_empty() {
            continue;
        }
        write_row -= 1;
        if write_row != read_row {
            board[Pos::new(write_row, col)] = tile;
            board[Pos::new(read_row, col)] = Tile::EMPTY;
        }
    }

    rows - write_row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SeededSource, SequenceSource};
    use crate::tile::TileKind;
    use proptest::prelude::*;

    #[test]
    fn test_full_board_untouched() {
        let mut board = Board::from_colors(&[&[1, 2], &[3, 4]]);
        let before = board.clone();
        let mut source = SequenceSource::new(vec![5]);
        assert_eq!(settle(&mut board, &mut source, 5), 0);
        assert_eq!(board, before);
        assert_eq!(source.drawn(), 0);
    }

    #[test]
    fn test_tiles_fall_and_refill() {
        let mut board = Board::from_colors(&[
            &[1, 2],
            &[0, 3],
            &[4, 0],
            &[0, 5],
        ]);
        board[Pos::new(0, 0)].special = SpecialKind::StripedVertical;
        let mut source = SequenceSource::new(vec![3, 2, 1, 5]);
        assert_eq!(settle(&mut board, &mut source, 5), 3);

        let column = |b: &Board, c: usize| (0..4).map(|r| b[Pos::new(r, c)]).collect::<Vec<_>>();
        assert_eq!(
            column(&board, 0),
            vec![
                Tile::colored(3),
                Tile::colored(2),
                Tile::special(1, SpecialKind::StripedVertical),
                Tile::colored(4),
            ]
        );
        assert_eq!(
            column(&board, 1),
            vec![Tile::colored(1), Tile::colored(2), Tile::colored(3), Tile::colored(5)]
        );
    }

    #[test]
    fn test_columns_independent() {
        let mut board = Board::from_colors(&[&[1, 2, 3], &[0, 4, 5], &[1, 2, 3]]);
        let mut source = SequenceSource::new(vec![4]);
        settle(&mut board, &mut source, 5);
        assert_eq!(board, Board::from_colors(&[&[4, 2, 3], &[1, 4, 5], &[1, 2, 3]]));
    }

    #[test]
    fn test_empty_column_refilled() {
        let mut board = Board::new(3, 1);
        let mut source = SequenceSource::new(vec![1, 2, 3]);
        settle(&mut board, &mut source, 5);
        let kinds: Vec<_> = (0..3).map(|r| board[Pos::new(r, 0)].kind).collect();
        assert_eq!(
            kinds,
            vec![TileKind::Colored(1), TileKind::Colored(2), TileKind::Colored(3)]
        );
    }

    proptest! {
        #[test]
        fn test_settle_conserves_columns(
            colors in proptest::collection::vec(0u8..=5, 48),
            seed in any::<u64>(),
        ) {
            let lines: Vec<&[u8]> = colors.chunks(6).collect();
            let mut board = Board::from_colors(&lines);
            let before = board.clone();
            let mut source = SeededSource::new(seed);
            settle(&mut board, &mut source, 5);

            prop_assert!(board.is_full());
            for col in 0..board.cols() {
                let survivors: Vec<Tile> = (0..8)
                    .map(|r| before[Pos::new(r, col)])
                    .filter(|t| !t.is_empty())
                    .collect();
                let bottom: Vec<Tile> = (8 - survivors.len()..8)
                    .map(|r| board[Pos::new(r, col)])
                    .collect();
                prop_assert_eq!(survivors, bottom);
            }
        }
    }
}
