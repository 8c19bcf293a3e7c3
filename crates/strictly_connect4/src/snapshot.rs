//! Authoritative game snapshots as exchanged with the server.

use crate::action::Move;
use crate::types::{GameMode, GameStatus, Player};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Unique identifier for a game session.
pub type GameId = String;

/// Display labels for the two sides.
///
/// The only place where a [`Player`] is mapped to a human-facing name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantLabels {
    /// Label for player A.
    pub player_a: String,
    /// Label for player B.
    pub player_b: String,
}

impl ParticipantLabels {
    /// Creates a label table.
    pub fn new(player_a: impl Into<String>, player_b: impl Into<String>) -> Self {
        Self {
            player_a: player_a.into(),
            player_b: player_b.into(),
        }
    }

    /// Returns the label for `player`.
    pub fn label(&self, player: Player) -> &str {
        match player {
            Player::A => &self.player_a,
            Player::B => &self.player_b,
        }
    }
}

impl Default for ParticipantLabels {
    fn default() -> Self {
        Self::new("Player A", "Player B")
    }
}

/// Snapshot of a game session: the authoritative move log and status.
///
/// Returned by the state endpoint and by both move endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Session ID.
    pub game_id: GameId,
    /// Authoritative move log, oldest first.
    pub moves: Vec<Move>,
    /// Authoritative status.
    pub status: GameStatus,
    /// Who drives each side.
    pub mode: GameMode,
    /// Display labels.
    #[serde(default)]
    pub participant_labels: ParticipantLabels,
    /// Side that moves when the log is empty.
    #[serde(default = "default_first_mover")]
    pub first_mover: Player,
}

fn default_first_mover() -> Player {
    Player::A
}

impl GameSnapshot {
    /// Number of moves in the log.
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// The snapshot truncated to its first `n` moves.
    ///
    /// A truncated snapshot is reported as in progress: the authoritative
    /// status only describes the complete log.
    #[instrument(skip(self), fields(game_id = %self.game_id, total = self.moves.len()))]
    pub fn prefix(&self, n: usize) -> GameSnapshot {
        let n = n.min(self.moves.len());
        let status = if n == self.moves.len() {
            self.status
        } else {
            GameStatus::InProgress
        };
        GameSnapshot {
            game_id: self.game_id.clone(),
            moves: self.moves[..n].to_vec(),
            status,
            mode: self.mode,
            participant_labels: self.participant_labels.clone(),
            first_mover: self.first_mover,
        }
    }
}
