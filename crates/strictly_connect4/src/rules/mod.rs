//! Outcome rules for connect-four.
//!
//! Pure functions over a [`Board`]. They never look at move order, so the same
//! checks serve the server (authoritative status) and the client (sanity check
//! of a reported status).

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use crate::board::Board;
use crate::types::{GameStatus, Player};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Decided result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// A player connected four.
    Winner(Player),
    /// The board is full and nobody connected four.
    Draw,
}

impl Outcome {
    /// The status a server reports for this outcome.
    pub fn status(self) -> GameStatus {
        match self {
            Outcome::Winner(player) => GameStatus::won_by(player),
            Outcome::Draw => GameStatus::Draw,
        }
    }
}

/// Detects the outcome of `board`, or `None` while the game is undecided.
///
/// A win takes precedence over a full board.
#[instrument(skip(board))]
pub fn detect_outcome(board: &Board) -> Option<Outcome> {
    if let Some(winner) = check_winner(board) {
        return Some(Outcome::Winner(winner));
    }
    if is_full(board) {
        return Some(Outcome::Draw);
    }
    None
}

/// Status derived from the board alone.
pub fn derived_status(board: &Board) -> GameStatus {
    detect_outcome(board)
        .map(Outcome::status)
        .unwrap_or(GameStatus::InProgress)
}
