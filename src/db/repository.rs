//! Database repository for game sessions and move logs.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use strictly_connect4::{GameStatus, Move};
use tracing::{debug, info, instrument};

use crate::db::models::{NewGameRow, NewMoveRow};
use crate::db::{DbError, GameRow, MoveRow, StoredText, schema};
use crate::session::GameSession;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for games and their moves.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a repository for the database file at `db_path`.
    ///
    /// The file is created on first connection.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn new(db_path: impl AsRef<str>) -> Self {
        info!("Creating GameRepository");
        Self {
            db_path: db_path.as_ref().to_string(),
        }
    }

    /// Opens the database at `db_path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, DbError> {
        let repo = Self::new(db_path);
        repo.run_migrations()?;
        Ok(repo)
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(applied = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Stores a new game header together with any moves it already has.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the id is taken or a database error occurs.
    #[instrument(skip(self, session), fields(game_id = %session.id))]
    pub fn create_game(&self, session: &GameSession) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let header = NewGameRow::from_session(session);

        conn.transaction::<_, DbError, _>(|conn| {
            diesel::insert_into(schema::games::table)
                .values(&header)
                .execute(conn)?;
            insert_moves(conn, &session.id, 0, session.moves())
        })?;

        info!(mode = %session.mode, "Game stored");
        Ok(())
    }

    /// Appends `moves` to the log of `game_id`, starting at log position
    /// `first_index`, and sets the game's status.
    ///
    /// Runs in one transaction: either every move and the status are
    /// written, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the game does not exist, a log position is
    /// already taken, or a database error occurs.
    #[instrument(skip(self, moves), fields(moves = moves.len()))]
    pub fn record_moves(
        &self,
        game_id: &str,
        first_index: usize,
        moves: &[Move],
        status: GameStatus,
    ) -> Result<(), DbError> {
        let mut conn = self.connection()?;

        conn.transaction::<_, DbError, _>(|conn| {
            insert_moves(conn, game_id, first_index, moves)?;
            let updated = diesel::update(schema::games::table.find(game_id))
                .set(schema::games::status.eq(status.to_db_string()))
                .execute(conn)?;
            if updated == 0 {
                return Err(DbError::new(format!("Game not found: {}", game_id)));
            }
            Ok(())
        })?;

        debug!(?status, "Moves recorded");
        Ok(())
    }

    /// Loads a game and replays its log. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or a stored value is invalid.
    #[instrument(skip(self))]
    pub fn load_game(&self, game_id: &str) -> Result<Option<GameSession>, DbError> {
        let mut conn = self.connection()?;

        let Some(header) = schema::games::table
            .find(game_id)
            .select(GameRow::as_select())
            .first(&mut conn)
            .optional()?
        else {
            debug!("Game not stored");
            return Ok(None);
        };

        let moves = schema::moves::table
            .filter(schema::moves::game_id.eq(game_id))
            .order(schema::moves::move_index.asc())
            .select(MoveRow::as_select())
            .load(&mut conn)?;

        let session = header.into_session(moves)?;
        info!(moves = session.moves().len(), status = ?session.status(), "Game loaded");
        Ok(Some(session))
    }

    /// Number of stored moves for `game_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn move_count(&self, game_id: &str) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let count: i64 = schema::moves::table
            .filter(schema::moves::game_id.eq(game_id))
            .count()
            .get_result(&mut conn)?;
        usize::try_from(count).map_err(|e| DbError::new(format!("Invalid move count: {}", e)))
    }
}

fn insert_moves(
    conn: &mut SqliteConnection,
    game_id: &str,
    first_index: usize,
    moves: &[Move],
) -> Result<(), DbError> {
    for (offset, mv) in moves.iter().enumerate() {
        let index = i32::try_from(first_index + offset)
            .map_err(|e| DbError::new(format!("Move index out of range: {}", e)))?;
        diesel::insert_into(schema::moves::table)
            .values(&NewMoveRow::from_move(game_id, index, mv))
            .execute(conn)?;
    }
    Ok(())
}
