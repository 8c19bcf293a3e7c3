//! Error types for the client and the server.

use crate::db::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use strictly_connect4::{BoardError, Column, ColumnError, GameId, GameMode, GameStatus, Player};

/// Errors raised while submitting moves or driving autoplay.
///
/// None of these are fatal. Each one aborts the current step and leaves the
/// last known-good view in place.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ClientError {
    /// The target column is closed. Re-prompt.
    #[display("Column {} is full", _0)]
    ColumnFull(Column),

    /// The game has already ended.
    #[display("Game is already over ({:?})", _0)]
    GameOver(GameStatus),

    /// Another submission or autoplay cycle is in flight.
    #[display("Another request is already in flight")]
    Busy,

    /// It is the other side's turn.
    #[display("It's {:?}'s turn", _0)]
    NotYourTurn(Player),

    /// The session is being driven in the wrong mode.
    #[display("Wrong game mode: {}, expected {}", actual, expected)]
    WrongMode {
        /// Mode this driver handles.
        expected: GameMode,
        /// Mode the server reported.
        actual: GameMode,
    },

    /// Transport failure.
    #[display("Network error: {}", _0)]
    Network(String),

    /// Malformed response.
    #[display("Protocol error: {}", _0)]
    Protocol(String),

    /// The server refused the request.
    #[display("Server rejected request ({}): {}", status, message)]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
}

impl std::error::Error for ClientError {}

impl ClientError {
    /// Whether retrying after a full state reload can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Protocol(_) | ClientError::Rejected { .. }
        )
    }
}

impl From<BoardError> for ClientError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::ColumnFull(column) => ClientError::ColumnFull(column),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Protocol(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Errors returned by the game server.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ServerError {
    /// No session with this id.
    #[display("Game not found: {}", _0)]
    NotFound(GameId),

    /// Column number outside 1-7.
    #[display("Invalid column: {} (must be 1-7)", _0)]
    InvalidColumn(usize),

    /// Target column is full.
    #[display("Column {} is full", _0)]
    ColumnFull(Column),

    /// Game has already ended.
    #[display("Game is already over ({:?})", _0)]
    GameOver(GameStatus),

    /// The caller does not own the side to move.
    #[display("Not your turn: waiting for {:?}", _0)]
    NotYourTurn(Player),

    /// The move provider produced no column.
    #[display("Move provider returned no move for {:?}", _0)]
    NoMoveAvailable(Player),

    /// The session store failed.
    #[display("Storage error: {}", _0)]
    Storage(String),
}

impl std::error::Error for ServerError {}

impl ServerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidColumn(_) | ServerError::ColumnFull(_) => StatusCode::BAD_REQUEST,
            ServerError::GameOver(_) | ServerError::NotYourTurn(_) => StatusCode::CONFLICT,
            ServerError::NoMoveAvailable(_) | ServerError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<BoardError> for ServerError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::ColumnFull(column) => ServerError::ColumnFull(column),
        }
    }
}

impl From<ColumnError> for ServerError {
    fn from(err: ColumnError) -> Self {
        match err {
            ColumnError::OutOfRange(number) => ServerError::InvalidColumn(number),
        }
    }
}

impl From<DbError> for ServerError {
    fn from(err: DbError) -> Self {
        ServerError::Storage(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
