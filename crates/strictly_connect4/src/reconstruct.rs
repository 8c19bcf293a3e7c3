//! Rebuilding a displayable view from the authoritative move log.
//!
//! A view is never patched in place: every reconstruction starts from an
//! empty board and replays the whole log, so repeated or overlapping
//! reconstructions always agree with the log they were given.

use crate::action::Move;
use crate::board::Board;
use crate::error::BoardError;
use crate::rules::{Outcome, derived_status, detect_outcome};
use crate::snapshot::GameSnapshot;
use crate::types::{Column, GameStatus, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Result of replaying a slice of moves onto a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    /// Board after the replay.
    pub board: Board,
    /// Author of the last move in the slice, placed or not.
    pub last_mover: Option<Player>,
    /// Number of moves that landed.
    pub applied: usize,
    /// Positions (within the slice) of moves dropped because their column was full.
    pub skipped: Vec<usize>,
}

/// Replays `moves` in order onto `board`.
///
/// A move into a full column is a data-integrity problem in the log. It is
/// logged and skipped, and the replay continues.
#[instrument(skip(board, moves), fields(moves = moves.len()))]
pub fn replay(board: Board, moves: &[Move]) -> Replay {
    let mut board = board;
    let mut applied = 0;
    let mut skipped = Vec::new();

    for (position, mv) in moves.iter().enumerate() {
        match board.place(mv.column, mv.player) {
            Ok(_) => applied += 1,
            Err(BoardError::ColumnFull(column)) => {
                warn!(
                    position,
                    column = column.number(),
                    player = ?mv.player,
                    "Data integrity warning: move log targets a full column, skipping"
                );
                skipped.push(position);
            }
        }
    }

    Replay {
        board,
        last_mover: moves.last().map(|mv| mv.player),
        applied,
        skipped,
    }
}

/// Derived, disposable view of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructedView {
    /// Board rebuilt from the log.
    pub board: Board,
    /// Player whose turn it is.
    pub current_player: Player,
    /// Status copied from the snapshot.
    pub status: GameStatus,
    /// Number of moves in the log this view was built from.
    pub move_count: usize,
    /// Log positions skipped during replay.
    pub skipped: Vec<usize>,
}

impl ReconstructedView {
    /// View of a game with no moves.
    pub fn empty(first_mover: Player) -> Self {
        Self {
            board: Board::new(),
            current_player: first_mover,
            status: GameStatus::InProgress,
            move_count: 0,
            skipped: Vec::new(),
        }
    }

    /// Whether the authoritative status says the game is over.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Outcome computed from the board alone.
    pub fn detected_outcome(&self) -> Option<Outcome> {
        detect_outcome(&self.board)
    }

    /// Whether the reported status agrees with the board.
    pub fn is_consistent(&self) -> bool {
        derived_status(&self.board) == self.status
    }

    /// A new view with `player`'s token dropped into `column`.
    ///
    /// Used for optimistic display before the server confirms a move. The
    /// status is left as reported; the server decides when a game ends.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ColumnFull`] if the column is closed.
    #[instrument(skip(self), fields(move_count = self.move_count))]
    pub fn with_move(&self, column: Column, player: Player) -> Result<Self, BoardError> {
        let board = self.board.drop_token(column, player)?;
        Ok(Self {
            board,
            current_player: player.opponent(),
            status: self.status,
            move_count: self.move_count + 1,
            skipped: self.skipped.clone(),
        })
    }
}

/// Rebuilds the view of `snapshot` from an empty board.
///
/// The snapshot's first mover is to move when the log is empty. Otherwise the
/// opponent of the last log entry's author is to move. The status is copied
/// from the snapshot, not recomputed.
#[instrument(skip(snapshot), fields(game_id = %snapshot.game_id, moves = snapshot.moves.len()))]
pub fn reconstruct(snapshot: &GameSnapshot) -> ReconstructedView {
    let replayed = replay(Board::new(), &snapshot.moves);
    let current_player = replayed
        .last_mover
        .map(Player::opponent)
        .unwrap_or(snapshot.first_mover);

    let view = ReconstructedView {
        board: replayed.board,
        current_player,
        status: snapshot.status,
        move_count: snapshot.moves.len(),
        skipped: replayed.skipped,
    };

    if !view.is_consistent() {
        warn!(
            reported = ?view.status,
            detected = ?view.detected_outcome(),
            "Reported status disagrees with reconstructed board"
        );
    }
    debug!(current_player = ?view.current_player, status = ?view.status, "View reconstructed");
    view
}
