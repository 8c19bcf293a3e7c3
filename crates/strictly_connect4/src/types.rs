//! Core domain types for connect-four.

use crate::error::ColumnError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of rows on the board.
pub const ROWS: usize = 6;

/// Number of columns on the board.
pub const COLS: usize = 7;

/// Upper bound on the length of any legal move log.
pub const MAX_MOVES: usize = ROWS * COLS;

/// One of the two sides of a game.
///
/// Colour names and participant labels never reach this type; see
/// [`ParticipantLabels`](crate::ParticipantLabels) for the presentation mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// First side (moves first unless configured otherwise).
    #[serde(rename = "player_a")]
    A,
    /// Second side.
    #[serde(rename = "player_b")]
    B,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Single-character token used in text renderings.
    pub fn token(self) -> char {
        match self {
            Player::A => 'A',
            Player::B => 'B',
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell holding a player's token.
    Occupied(Player),
}

impl Cell {
    /// Returns the owning player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }

    /// Whether the cell is empty.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// A board column.
///
/// Internally a 0-based index. Crossing the wire it is the 1-based column
/// number, so the conversion lives entirely in the serde representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Column(usize);

impl Column {
    /// Creates a column from a 1-based column number (1..=7).
    #[instrument]
    pub fn from_number(number: u8) -> Result<Self, ColumnError> {
        let number = usize::from(number);
        if (1..=COLS).contains(&number) {
            Ok(Self(number - 1))
        } else {
            Err(ColumnError::OutOfRange(number))
        }
    }

    /// Creates a column from a 0-based index (0..=6).
    pub fn from_index(index: usize) -> Option<Self> {
        (index < COLS).then_some(Self(index))
    }

    /// The 0-based board index.
    pub fn index(self) -> usize {
        self.0
    }

    /// The 1-based column number.
    pub fn number(self) -> u8 {
        // COLS fits in a u8
        (self.0 + 1) as u8
    }

    /// All columns, left to right.
    pub fn all() -> impl Iterator<Item = Column> {
        (0..COLS).map(Column)
    }
}

impl TryFrom<u8> for Column {
    type Error = ColumnError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number)
    }
}

impl From<Column> for u8 {
    fn from(column: Column) -> Self {
        column.number()
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Authoritative status of a game, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Game is ongoing.
    #[default]
    InProgress,
    /// Player A connected four.
    PlayerAWon,
    /// Player B connected four.
    PlayerBWon,
    /// Board filled with no winner.
    Draw,
}

impl GameStatus {
    /// Status for a game won by `player`.
    pub fn won_by(player: Player) -> Self {
        match player {
            Player::A => GameStatus::PlayerAWon,
            Player::B => GameStatus::PlayerBWon,
        }
    }

    /// Returns the winner, if the game was won.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameStatus::PlayerAWon => Some(Player::A),
            GameStatus::PlayerBWon => Some(Player::B),
            GameStatus::InProgress | GameStatus::Draw => None,
        }
    }

    /// Whether the game has ended.
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }
}

/// Who drives each side of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Player A is a human, player B is automated.
    #[strum(serialize = "human-vs-auto")]
    HumanVsAuto,
    /// Both sides are automated.
    #[strum(serialize = "auto-vs-auto")]
    AutoVsAuto,
}

impl GameMode {
    /// Whether `player` is driven by a human in this mode.
    pub fn is_human(self, player: Player) -> bool {
        matches!((self, player), (GameMode::HumanVsAuto, Player::A))
    }
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "human-vs-auto" | "human" => Ok(GameMode::HumanVsAuto),
            "auto-vs-auto" | "auto" => Ok(GameMode::AutoVsAuto),
            other => Err(format!("unknown game mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_number_to_index() {
        assert_eq!(Column::from_number(1).unwrap().index(), 0);
        assert_eq!(Column::from_number(7).unwrap().index(), 6);
    }

    #[test]
    fn test_column_out_of_range() {
        assert_eq!(Column::from_number(0), Err(ColumnError::OutOfRange(0)));
        assert_eq!(Column::from_number(8), Err(ColumnError::OutOfRange(8)));
        assert_eq!(Column::from_index(7), None);
    }

    #[test]
    fn test_column_serializes_as_number() {
        let column = Column::from_index(0).unwrap();
        assert_eq!(serde_json::to_string(&column).unwrap(), "1");
        let parsed: Column = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.index(), 6);
        assert!(serde_json::from_str::<Column>("0").is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&GameStatus::PlayerBWon).unwrap(),
            "\"player_b_won\""
        );
        assert_eq!(
            serde_json::to_string(&GameMode::AutoVsAuto).unwrap(),
            "\"auto-vs-auto\""
        );
        assert_eq!(GameMode::HumanVsAuto.to_string(), "human-vs-auto");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("auto-vs-auto".parse::<GameMode>(), Ok(GameMode::AutoVsAuto));
        assert!("chess".parse::<GameMode>().is_err());
    }
}
