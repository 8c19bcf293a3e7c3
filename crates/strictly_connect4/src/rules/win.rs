//! Win detection logic for connect-four.

use crate::board::Board;
use crate::types::{COLS, Player, ROWS};
use tracing::instrument;

/// Length of a winning run.
pub const RUN: usize = 4;

/// Scan directions as (row step, column step), in scan order.
///
/// Horizontal, vertical, diagonal down-right, diagonal up-right.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// Checks if there is a winner on the board.
///
/// Scans every cell in row-major order and, for each, the four directions in
/// [`DIRECTIONS`] order. The first run of four same-coloured tokens wins.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Player> {
    for row in 0..ROWS {
        for col in 0..COLS {
            let Some(player) = board.get(row, col).and_then(|cell| cell.player()) else {
                continue;
            };
            for (dr, dc) in DIRECTIONS {
                if run_fits(row, col, dr, dc) && run_matches(board, player, row, col, dr, dc) {
                    return Some(player);
                }
            }
        }
    }
    None
}

/// Whether a run of [`RUN`] cells starting at (row, col) stays on the grid.
fn run_fits(row: usize, col: usize, dr: isize, dc: isize) -> bool {
    let span = (RUN - 1) as isize;
    let end_row = row as isize + dr * span;
    let end_col = col as isize + dc * span;
    (0..ROWS as isize).contains(&end_row) && (0..COLS as isize).contains(&end_col)
}

fn run_matches(
    board: &Board,
    player: Player,
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
) -> bool {
    (1..RUN as isize).all(|step| {
        let r = (row as isize + dr * step) as usize;
        let c = (col as isize + dc * step) as usize;
        board.get(r, c).and_then(|cell| cell.player()) == Some(player)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn drop_all(board: &mut Board, moves: &[(Player, u8)]) {
        for &(player, number) in moves {
            board.place(Column::from_number(number).unwrap(), player).unwrap();
        }
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(check_winner(&Board::new()), None);
    }

    #[test]
    fn test_horizontal_bottom_row() {
        let mut board = Board::new();
        drop_all(
            &mut board,
            &[(Player::A, 1), (Player::A, 2), (Player::A, 3), (Player::A, 4)],
        );
        assert_eq!(check_winner(&board), Some(Player::A));
    }

    #[test]
    fn test_horizontal_right_edge() {
        let mut board = Board::new();
        drop_all(
            &mut board,
            &[(Player::B, 4), (Player::B, 5), (Player::B, 6), (Player::B, 7)],
        );
        assert_eq!(check_winner(&board), Some(Player::B));
    }

    #[test]
    fn test_vertical_rows_two_to_five() {
        // Column 1 holds A at rows 5..=2 (0 = top).
        let mut board = Board::new();
        drop_all(&mut board, &[(Player::A, 1); 4]);
        assert_eq!(board.get(2, 0).and_then(|c| c.player()), Some(Player::A));
        assert_eq!(check_winner(&board), Some(Player::A));
    }

    #[test]
    fn test_diagonal_rising_left_to_right() {
        // Bottom-left to upper-right: (5,0) (4,1) (3,2) (2,3).
        let mut board = Board::new();
        drop_all(
            &mut board,
            &[
                (Player::A, 1),
                (Player::B, 2),
                (Player::A, 2),
                (Player::B, 3),
                (Player::B, 3),
                (Player::A, 3),
                (Player::B, 4),
                (Player::B, 4),
                (Player::B, 4),
                (Player::A, 4),
            ],
        );
        assert_eq!(check_winner(&board), Some(Player::A));
    }

    #[test]
    fn test_diagonal_falling_left_to_right() {
        // Top-left to bottom-right: (2,0) (3,1) (4,2) (5,3).
        let mut board = Board::new();
        drop_all(
            &mut board,
            &[
                (Player::A, 1),
                (Player::A, 1),
                (Player::A, 1),
                (Player::B, 1),
                (Player::A, 2),
                (Player::A, 2),
                (Player::B, 2),
                (Player::A, 3),
                (Player::B, 3),
                (Player::B, 4),
            ],
        );
        assert_eq!(check_winner(&board), Some(Player::B));
    }

    #[test]
    fn test_three_in_a_row_is_not_a_win() {
        let mut board = Board::new();
        drop_all(
            &mut board,
            &[(Player::A, 1), (Player::A, 2), (Player::A, 3), (Player::B, 4)],
        );
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_run_does_not_wrap_rows() {
        // A at columns 5-7 of the bottom row and column 1 of the row above.
        let mut board = Board::new();
        drop_all(
            &mut board,
            &[
                (Player::A, 5),
                (Player::A, 6),
                (Player::A, 7),
                (Player::B, 1),
                (Player::A, 1),
            ],
        );
        assert_eq!(check_winner(&board), None);
    }
}
