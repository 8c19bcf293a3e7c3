//! Database rows and their mapping to game types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use strictly_connect4::{Column, GameMode, GameStatus, Move, ParticipantLabels, Player};
use tracing::{instrument, warn};

use crate::db::{DbError, schema};
use crate::session::GameSession;

/// Game enums stored as text columns.
///
/// The stored strings match the JSON wire names.
pub trait StoredText: Sized {
    /// Text written to the database.
    fn to_db_string(&self) -> &'static str;

    /// Parses the text read back from the database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] for an unknown value.
    fn from_db_string(s: &str) -> Result<Self, DbError>;
}

impl StoredText for Player {
    fn to_db_string(&self) -> &'static str {
        match self {
            Player::A => "player_a",
            Player::B => "player_b",
        }
    }

    fn from_db_string(s: &str) -> Result<Self, DbError> {
        match s {
            "player_a" => Ok(Player::A),
            "player_b" => Ok(Player::B),
            _ => Err(DbError::new(format!("Invalid player: '{}'", s))),
        }
    }
}

impl StoredText for GameMode {
    fn to_db_string(&self) -> &'static str {
        match self {
            GameMode::HumanVsAuto => "human-vs-auto",
            GameMode::AutoVsAuto => "auto-vs-auto",
        }
    }

    fn from_db_string(s: &str) -> Result<Self, DbError> {
        match s {
            "human-vs-auto" => Ok(GameMode::HumanVsAuto),
            "auto-vs-auto" => Ok(GameMode::AutoVsAuto),
            _ => Err(DbError::new(format!("Invalid game mode: '{}'", s))),
        }
    }
}

impl StoredText for GameStatus {
    fn to_db_string(&self) -> &'static str {
        match self {
            GameStatus::InProgress => "in_progress",
            GameStatus::PlayerAWon => "player_a_won",
            GameStatus::PlayerBWon => "player_b_won",
            GameStatus::Draw => "draw",
        }
    }

    fn from_db_string(s: &str) -> Result<Self, DbError> {
        match s {
            "in_progress" => Ok(GameStatus::InProgress),
            "player_a_won" => Ok(GameStatus::PlayerAWon),
            "player_b_won" => Ok(GameStatus::PlayerBWon),
            "draw" => Ok(GameStatus::Draw),
            _ => Err(DbError::new(format!("Invalid status: '{}'", s))),
        }
    }
}

/// Stored game header.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    id: String,
    mode: String,
    first_mover: String,
    player_a_label: String,
    player_b_label: String,
    status: String,
    created_at: NaiveDateTime,
}

impl GameRow {
    /// Rebuilds the session by replaying `moves` onto an empty board.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a stored value cannot be parsed.
    #[instrument(skip(self, moves), fields(game_id = %self.id, moves = moves.len()))]
    pub fn into_session(self, moves: Vec<MoveRow>) -> Result<GameSession, DbError> {
        let log = moves
            .iter()
            .map(MoveRow::to_move)
            .collect::<Result<Vec<_>, _>>()?;
        let stored_status = GameStatus::from_db_string(&self.status)?;

        let session = GameSession::restore(
            self.id,
            GameMode::from_db_string(&self.mode)?,
            ParticipantLabels::new(self.player_a_label, self.player_b_label),
            Player::from_db_string(&self.first_mover)?,
            self.created_at.and_utc(),
            log,
        );

        if session.status() != stored_status {
            warn!(
                stored = ?stored_status,
                replayed = ?session.status(),
                "Stored status disagrees with replayed board"
            );
        }
        Ok(session)
    }
}

/// Insertable game header.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub struct NewGameRow {
    id: String,
    mode: String,
    first_mover: String,
    player_a_label: String,
    player_b_label: String,
    status: String,
    created_at: NaiveDateTime,
}

impl NewGameRow {
    /// Header row for `session`.
    pub fn from_session(session: &GameSession) -> Self {
        Self::new(
            session.id.clone(),
            session.mode.to_db_string().to_string(),
            session.first_mover.to_db_string().to_string(),
            session.labels.player_a.clone(),
            session.labels.player_b.clone(),
            session.status().to_db_string().to_string(),
            session.created_at.naive_utc(),
        )
    }
}

/// One stored move.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::moves)]
pub struct MoveRow {
    id: i32,
    game_id: String,
    move_index: i32,
    player: String,
    column_number: i32,
}

impl MoveRow {
    /// Parses the stored move.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] for an unknown player or a column outside 1-7.
    pub fn to_move(&self) -> Result<Move, DbError> {
        let player = Player::from_db_string(&self.player)?;
        let column = u8::try_from(self.column_number)
            .map_err(|_| DbError::new(format!("Invalid column: {}", self.column_number)))
            .and_then(|n| Column::from_number(n).map_err(|e| DbError::new(e.to_string())))?;
        Ok(Move::new(player, column))
    }
}

/// Insertable move.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::moves)]
pub struct NewMoveRow {
    game_id: String,
    move_index: i32,
    player: String,
    column_number: i32,
}

impl NewMoveRow {
    /// Row for `mv` at position `move_index` of `game_id`'s log.
    pub fn from_move(game_id: &str, move_index: i32, mv: &Move) -> Self {
        Self::new(
            game_id.to_string(),
            move_index,
            mv.player.to_db_string().to_string(),
            i32::from(mv.column.number()),
        )
    }
}
