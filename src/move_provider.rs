//! Decision logic for automated players.

use strictly_connect4::rules::check_winner;
use strictly_connect4::{Board, Column, Player};
use tracing::{debug, instrument};

/// Chooses columns for automated players.
///
/// The server treats the result as opaque; it only checks that the column is
/// open before appending the move.
pub trait MoveProvider: Send + Sync + std::fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Picks a column for `player`, or `None` if the board is full.
    fn choose(&self, board: &Board, player: Player) -> Option<Column>;
}

/// Column preference from the centre outwards, 0-based.
const CENTRE_FIRST: [usize; 7] = [3, 2, 4, 1, 5, 0, 6];

/// Takes an immediate win, else blocks the opponent's, else plays nearest the centre.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleProvider;

impl SimpleProvider {
    fn winning_column(board: &Board, player: Player) -> Option<Column> {
        board.open_columns().into_iter().find(|&column| {
            board
                .drop_token(column, player)
                .map(|next| check_winner(&next) == Some(player))
                .unwrap_or(false)
        })
    }
}

impl MoveProvider for SimpleProvider {
    fn name(&self) -> &str {
        "simple"
    }

    #[instrument(skip(self, board))]
    fn choose(&self, board: &Board, player: Player) -> Option<Column> {
        if let Some(column) = Self::winning_column(board, player) {
            debug!(column = column.number(), "Taking winning column");
            return Some(column);
        }
        if let Some(column) = Self::winning_column(board, player.opponent()) {
            debug!(column = column.number(), "Blocking opponent");
            return Some(column);
        }
        CENTRE_FIRST
            .iter()
            .filter_map(|&index| Column::from_index(index))
            .find(|&column| board.is_column_open(column))
    }
}

/// Plays the lowest-numbered open column.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOpenProvider;

impl MoveProvider for FirstOpenProvider {
    fn name(&self) -> &str {
        "first-open"
    }

    fn choose(&self, board: &Board, _player: Player) -> Option<Column> {
        board.open_columns().into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(number: u8) -> Column {
        Column::from_number(number).unwrap()
    }

    #[test]
    fn test_empty_board_plays_centre() {
        assert_eq!(SimpleProvider.choose(&Board::new(), Player::A), Some(col(4)));
    }

    #[test]
    fn test_takes_win_before_block() {
        let mut board = Board::new();
        for _ in 0..3 {
            board.place(col(1), Player::A).unwrap();
            board.place(col(7), Player::B).unwrap();
        }
        assert_eq!(SimpleProvider.choose(&board, Player::B), Some(col(7)));
        assert_eq!(SimpleProvider.choose(&board, Player::A), Some(col(1)));
    }

    #[test]
    fn test_blocks_opponent() {
        let mut board = Board::new();
        for number in [2, 3, 4] {
            board.place(col(number), Player::A).unwrap();
        }
        board.place(col(4), Player::B).unwrap();
        // A threatens both ends of the bottom row; the lower column is blocked first.
        assert_eq!(SimpleProvider.choose(&board, Player::B), Some(col(1)));
    }

    #[test]
    fn test_skips_full_centre() {
        let mut board = Board::new();
        for i in 0..6 {
            let player = if i % 2 == 0 { Player::A } else { Player::B };
            board.place(col(4), player).unwrap();
        }
        assert_eq!(SimpleProvider.choose(&board, Player::A), Some(col(3)));
    }

    #[test]
    fn test_first_open() {
        let mut board = Board::new();
        for _ in 0..6 {
            board.place(col(1), Player::A).unwrap();
        }
        assert_eq!(FirstOpenProvider.choose(&board, Player::B), Some(col(2)));
    }
}
