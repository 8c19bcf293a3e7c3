//! Moves as first-class log entries.

use crate::types::{Column, Player};
use serde::{Deserialize, Serialize};

/// A player dropping a token into a column.
///
/// Moves are immutable once appended to a log. On the wire the column is the
/// 1-based column number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// The column the token was dropped into.
    pub column: Column,
}

impl Move {
    /// Creates a new move.
    pub fn new(player: Player, column: Column) -> Self {
        Self { player, column }
    }

    /// Returns the player making this move.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Returns the column of this move.
    pub fn column(&self) -> Column {
        self.column
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -> column {}", self.player, self.column)
    }
}
