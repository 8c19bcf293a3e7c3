//! Draw detection logic for connect-four.

use crate::board::Board;
use tracing::instrument;

/// Checks if the top row is fully occupied.
///
/// Under the gravity invariant this means every cell is occupied. A full board
/// with no winner is a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

#[cfg(test)]
mod tests {
    use super::super::{Outcome, detect_outcome};
    use super::*;
    use crate::types::{COLS, Column, Player, ROWS};

    /// Fills the board column by column, alternating tokens up each column,
    /// so that no four of a kind line up in any direction.
    fn drawn_board() -> Board {
        let mut board = Board::new();
        for col in 0..COLS {
            let column = Column::from_index(col).unwrap();
            // Columns 0,1 | 4,5 start with A; columns 2,3 | 6 start with B.
            let first = if (col / 2) % 2 == 0 { Player::A } else { Player::B };
            for row in 0..ROWS {
                let player = if row % 2 == 0 { first } else { first.opponent() };
                board.place(column, player).unwrap();
            }
        }
        board
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.place(Column::from_number(4).unwrap(), Player::A).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_full_board_without_winner_is_draw() {
        let board = drawn_board();
        assert!(is_full(&board));
        assert_eq!(board.token_count(), ROWS * COLS);
        assert_eq!(detect_outcome(&board), Some(Outcome::Draw));
    }
}
