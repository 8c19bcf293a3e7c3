//! Server-side game sessions.

use crate::db::GameRepository;
use crate::error::ServerError;
use crate::move_provider::MoveProvider;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strictly_connect4::{
    Board, Column, GameId, GameMode, GameSnapshot, GameStatus, Move, ParticipantLabels, Player,
    derived_status, replay,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Authoritative state of one game.
///
/// The move log only ever grows. Status is recomputed from the board after
/// every append.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Session ID.
    pub id: GameId,
    /// Who drives each side.
    pub mode: GameMode,
    /// Display labels.
    pub labels: ParticipantLabels,
    /// Side that moved first.
    pub first_mover: Player,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    moves: Vec<Move>,
    board: Board,
    status: GameStatus,
}

impl GameSession {
    /// Creates an empty session.
    #[instrument(skip(labels))]
    pub fn new(id: GameId, mode: GameMode, labels: ParticipantLabels, first_mover: Player) -> Self {
        info!(game_id = %id, %mode, "Creating new game session");
        Self {
            id,
            mode,
            labels,
            first_mover,
            created_at: Utc::now(),
            moves: Vec::new(),
            board: Board::new(),
            status: GameStatus::InProgress,
        }
    }

    /// Rebuilds a session from a stored log.
    ///
    /// Status is recomputed from the replayed board.
    #[instrument(skip(labels, moves), fields(moves = moves.len()))]
    pub fn restore(
        id: GameId,
        mode: GameMode,
        labels: ParticipantLabels,
        first_mover: Player,
        created_at: DateTime<Utc>,
        moves: Vec<Move>,
    ) -> Self {
        let replayed = replay(Board::new(), &moves);
        if !replayed.skipped.is_empty() {
            warn!(skipped = ?replayed.skipped, "Stored log targets full columns");
        }
        let status = derived_status(&replayed.board);
        debug!(%created_at, ?status, "Session restored");
        Self {
            id,
            mode,
            labels,
            first_mover,
            created_at,
            moves,
            board: replayed.board,
            status,
        }
    }

    /// Move log, oldest first.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Player to move next.
    pub fn next_player(&self) -> Player {
        self.moves
            .last()
            .map(|mv| mv.player.opponent())
            .unwrap_or(self.first_mover)
    }

    /// Whether the side to move is driven by the server.
    pub fn automated_to_move(&self) -> bool {
        !self.status.is_terminal() && !self.mode.is_human(self.next_player())
    }

    /// Appends a move for the side to move.
    ///
    /// # Errors
    ///
    /// - [`ServerError::GameOver`] if the game has ended
    /// - [`ServerError::NotYourTurn`] if `player` is not to move
    /// - [`ServerError::ColumnFull`] if the column is closed
    #[instrument(skip(self), fields(game_id = %self.id, column = column.number()))]
    pub fn append(&mut self, player: Player, column: Column) -> Result<(), ServerError> {
        if self.status.is_terminal() {
            warn!(status = ?self.status, "Move on finished game");
            return Err(ServerError::GameOver(self.status));
        }
        let expected = self.next_player();
        if player != expected {
            warn!(?expected, "Move out of turn");
            return Err(ServerError::NotYourTurn(expected));
        }

        self.board.place(column, player)?;
        self.moves.push(Move::new(player, column));
        self.status = derived_status(&self.board);

        info!(move_count = self.moves.len(), status = ?self.status, "Move appended");
        Ok(())
    }

    /// Lets `provider` play every automated turn until a human is to move
    /// or the game ends. Returns the number of moves made.
    #[instrument(skip(self, provider), fields(game_id = %self.id, provider = provider.name()))]
    pub fn play_automated(&mut self, provider: &dyn MoveProvider) -> Result<usize, ServerError> {
        let mut made = 0;
        while self.automated_to_move() {
            self.play_automated_once(provider)?;
            made += 1;
        }
        Ok(made)
    }

    /// Lets `provider` make exactly one move for the side to move.
    pub fn play_automated_once(&mut self, provider: &dyn MoveProvider) -> Result<(), ServerError> {
        let player = self.next_player();
        let column = provider
            .choose(&self.board, player)
            .ok_or(ServerError::NoMoveAvailable(player))?;
        debug!(?player, column = column.number(), "Provider chose column");
        self.append(player, column)
    }

    /// Wire snapshot of this session.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_id: self.id.clone(),
            moves: self.moves.clone(),
            status: self.status,
            mode: self.mode,
            participant_labels: self.labels.clone(),
            first_mover: self.first_mover,
        }
    }
}

/// Manages all game sessions.
///
/// Sessions are cached in memory. With a store attached, every session is
/// written through to it and sessions missing from the cache are loaded
/// from it on lookup.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<GameId, GameSession>>>,
    store: Option<GameRepository>,
}

impl SessionManager {
    /// Creates an empty session manager without a store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory session manager");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            store: None,
        }
    }

    /// Creates a session manager backed by `store`.
    #[instrument(skip(store), fields(db_path = %store.db_path()))]
    pub fn with_store(store: GameRepository) -> Self {
        info!("Creating persistent session manager");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            store: Some(store),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<GameId, GameSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup<'a>(
        &self,
        sessions: &'a mut HashMap<GameId, GameSession>,
        id: &str,
    ) -> Result<&'a mut GameSession, ServerError> {
        match sessions.entry(id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let stored = match &self.store {
                    Some(store) => store.load_game(id)?,
                    None => None,
                };
                match stored {
                    Some(session) => {
                        info!(game_id = id, "Session loaded from store");
                        Ok(entry.insert(session))
                    }
                    None => {
                        debug!(game_id = id, "Session not found");
                        Err(ServerError::NotFound(id.to_string()))
                    }
                }
            }
        }
    }

    /// Creates a session and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Storage`] if the session cannot be stored.
    #[instrument(skip(self, labels))]
    pub fn create(
        &self,
        mode: GameMode,
        labels: ParticipantLabels,
        first_mover: Player,
    ) -> Result<GameId, ServerError> {
        let id = Uuid::new_v4().to_string();
        let session = GameSession::new(id.clone(), mode, labels, first_mover);
        if let Some(store) = &self.store {
            store.create_game(&session)?;
        }
        self.lock().insert(id.clone(), session);
        Ok(id)
    }

    /// Snapshot of a session.
    #[instrument(skip(self))]
    pub fn snapshot(&self, id: &str) -> Result<GameSnapshot, ServerError> {
        let mut sessions = self.lock();
        self.lookup(&mut sessions, id).map(|session| session.snapshot())
    }

    /// Runs `f` on a copy of a session while holding the lock.
    ///
    /// The copy replaces the session only if `f` succeeds and its new moves
    /// and status have been stored.
    pub fn update<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut GameSession) -> Result<T, ServerError>,
    ) -> Result<T, ServerError> {
        let mut sessions = self.lock();
        let session = self.lookup(&mut sessions, id)?;

        let mut draft = session.clone();
        let value = f(&mut draft)?;

        let stored = session.moves().len();
        if let Some(store) = &self.store
            && draft.moves().len() > stored
        {
            store.record_moves(id, stored, &draft.moves()[stored..], draft.status())?;
        }
        *session = draft;
        Ok(value)
    }

    /// Number of sessions held in memory.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session is held in memory.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
