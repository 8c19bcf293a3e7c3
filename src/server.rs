//! HTTP server holding the authoritative game sessions.
//!
//! Endpoints:
//! - `GET  /health`                     - Health check
//! - `GET  /games/start?mode=..`        - Create a session, returns `{game_id}`
//! - `GET  /games/{id}/state`           - Current snapshot
//! - `POST /games/{id}/move?column=N`   - Human move, followed by the automated reply
//! - `POST /games/{id}/move`            - One automated move for the side to move

use crate::config::ArenaConfig;
use crate::db::{DbError, GameRepository};
use crate::error::ServerError;
use crate::move_provider::{MoveProvider, SimpleProvider};
use crate::session::SessionManager;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strictly_connect4::{Column, GameId, GameMode, GameSnapshot, ParticipantLabels, Player};
use tracing::{debug, info, instrument, warn};

/// Shared server state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// All sessions.
    pub sessions: SessionManager,
    /// Decision logic for automated sides.
    pub provider: Arc<dyn MoveProvider>,
    /// Side that moves first in new games.
    pub first_mover: Player,
    /// Labels used when a start request omits them.
    pub default_labels: ParticipantLabels,
}

impl AppState {
    /// Creates state with an empty in-memory session manager.
    pub fn new(
        provider: Arc<dyn MoveProvider>,
        first_mover: Player,
        default_labels: ParticipantLabels,
    ) -> Self {
        Self {
            sessions: SessionManager::new(),
            provider,
            first_mover,
            default_labels,
        }
    }

    /// Replaces the session manager.
    pub fn with_sessions(mut self, sessions: SessionManager) -> Self {
        self.sessions = sessions;
        self
    }

    /// State configured from `config`, using [`SimpleProvider`] and the
    /// configured database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(config), fields(db_path = %config.server().db_path()))]
    pub fn from_config(config: &ArenaConfig) -> Result<Self, DbError> {
        let store = GameRepository::open(config.server().db_path())?;
        Ok(Self::new(
            Arc::new(SimpleProvider),
            *config.first_mover(),
            config.labels().clone(),
        )
        .with_sessions(SessionManager::with_store(store)))
    }
}

/// Query of the start endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StartParams {
    /// Who drives each side.
    pub mode: GameMode,
    /// Label for player A.
    pub player_a: Option<String>,
    /// Label for player B.
    pub player_b: Option<String>,
}

/// Response of the start endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    /// Id of the new session.
    pub game_id: GameId,
}

/// Query of the move endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveParams {
    /// 1-based column; absent for an automated move.
    pub column: Option<u8>,
}

/// Builds the router over `state`.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/games/start", get(start_game))
        .route("/games/{id}/state", get(get_state))
        .route("/games/{id}/move", post(make_move))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip(state))]
async fn start_game(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StartParams>,
) -> Result<Json<StartResponse>, ServerError> {
    let labels = ParticipantLabels::new(
        params
            .player_a
            .unwrap_or_else(|| state.default_labels.player_a.clone()),
        params
            .player_b
            .unwrap_or_else(|| state.default_labels.player_b.clone()),
    );
    let game_id = state
        .sessions
        .create(params.mode, labels, state.first_mover)?;

    if params.mode == GameMode::HumanVsAuto {
        let opening = state
            .sessions
            .update(&game_id, |game| game.play_automated(state.provider.as_ref()))?;
        if opening > 0 {
            debug!(game_id = %game_id, "Automated side opened the game");
        }
    }

    info!(game_id = %game_id, mode = %params.mode, "Game started");
    Ok(Json(StartResponse { game_id }))
}

#[instrument(skip(state))]
async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<GameId>,
) -> Result<Json<GameSnapshot>, ServerError> {
    state.sessions.snapshot(&id).map(Json)
}

#[instrument(skip(state))]
async fn make_move(
    State(state): State<Arc<AppState>>,
    Path(id): Path<GameId>,
    Query(params): Query<MoveParams>,
) -> Result<Json<GameSnapshot>, ServerError> {
    let provider = state.provider.as_ref();
    let column = params.column.map(Column::from_number).transpose()?;

    let result = state.sessions.update(&id, |game| {
        if game.status().is_terminal() {
            return Err(ServerError::GameOver(game.status()));
        }
        let to_move = game.next_player();

        match column {
            Some(column) => {
                if !game.mode.is_human(to_move) {
                    return Err(ServerError::NotYourTurn(to_move));
                }
                game.append(to_move, column)?;
                game.play_automated(provider)?;
            }
            None => {
                if !game.automated_to_move() {
                    return Err(ServerError::NotYourTurn(to_move));
                }
                game.play_automated_once(provider)?;
            }
        }
        Ok(game.snapshot())
    });

    match result {
        Ok(snapshot) => {
            debug!(moves = snapshot.moves.len(), status = ?snapshot.status, "Move handled");
            Ok(Json(snapshot))
        }
        Err(e) => {
            warn!(error = %e, "Move rejected");
            Err(e)
        }
    }
}

/// Completes when Ctrl+C is received.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_provider::FirstOpenProvider;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use strictly_connect4::GameStatus;
    use tower::ServiceExt;

    fn test_state(first_mover: Player) -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(FirstOpenProvider),
            first_mover,
            ParticipantLabels::new("Red", "Yellow"),
        ))
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn start(state: &Arc<AppState>, mode: &str) -> GameId {
        let (status, body) = send(
            create_app(Arc::clone(state)),
            "GET",
            &format!("/games/start?mode={}", mode),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_str::<StartResponse>(&body).unwrap().game_id
    }

    #[tokio::test]
    async fn test_games_survive_restart() {
        let db = tempfile::NamedTempFile::new().unwrap();
        let db_path = db.path().to_str().unwrap();
        let persistent = || {
            let store = GameRepository::open(db_path).unwrap();
            Arc::new(
                AppState::new(
                    Arc::new(FirstOpenProvider),
                    Player::A,
                    ParticipantLabels::default(),
                )
                .with_sessions(SessionManager::with_store(store)),
            )
        };

        let before = persistent();
        let id = start(&before, "human-vs-auto").await;
        let (status, _) = send(
            create_app(Arc::clone(&before)),
            "POST",
            &format!("/games/{}/move?column=4", id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let expected = before.sessions.snapshot(&id).unwrap();
        drop(before);

        let after = persistent();
        let (status, body) = send(
            create_app(Arc::clone(&after)),
            "GET",
            &format!("/games/{}/state", id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let snapshot: GameSnapshot = serde_json::from_str(&body).unwrap();
        assert_eq!(snapshot, expected);
        assert_eq!(snapshot.moves.len(), 2);

        let other = start(&after, "human-vs-auto").await;
        assert_ne!(other, id);
    }

    #[tokio::test]
    async fn test_snapshot_carries_first_mover() {
        let state = test_state(Player::B);
        let id = start(&state, "auto-vs-auto").await;
        let (_, body) = send(create_app(state), "GET", &format!("/games/{}/state", id)).await;
        let snapshot: GameSnapshot = serde_json::from_str(&body).unwrap();
        assert!(snapshot.moves.is_empty());
        assert_eq!(snapshot.first_mover, Player::B);
        assert_eq!(strictly_connect4::reconstruct(&snapshot).current_player, Player::B);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = send(create_app(test_state(Player::A)), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn test_new_game_state_is_empty() {
        let state = test_state(Player::A);
        let id = start(&state, "auto-vs-auto").await;

        let (status, body) = send(create_app(state), "GET", &format!("/games/{}/state", id)).await;
        assert_eq!(status, StatusCode::OK);
        let snapshot: GameSnapshot = serde_json::from_str(&body).unwrap();
        assert!(snapshot.moves.is_empty());
        assert_eq!(snapshot.status, GameStatus::InProgress);
        assert_eq!(snapshot.mode, GameMode::AutoVsAuto);
        assert_eq!(snapshot.participant_labels.player_a, "Red");
    }

    #[tokio::test]
    async fn test_unknown_game_is_404() {
        let (status, body) =
            send(create_app(test_state(Player::A)), "GET", "/games/nope/state").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("\"error\""));
    }

    #[tokio::test]
    async fn test_human_move_gets_automated_reply() {
        let state = test_state(Player::A);
        let id = start(&state, "human-vs-auto").await;

        let (status, body) = send(
            create_app(Arc::clone(&state)),
            "POST",
            &format!("/games/{}/move?column=4", id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let snapshot: GameSnapshot = serde_json::from_str(&body).unwrap();
        assert_eq!(snapshot.moves.len(), 2);
        assert_eq!(snapshot.moves[0].player, Player::A);
        assert_eq!(snapshot.moves[0].column.number(), 4);
        assert_eq!(snapshot.moves[1].player, Player::B);
        assert_eq!(snapshot.moves[1].column.number(), 1);
    }

    #[tokio::test]
    async fn test_automated_side_opens_when_first() {
        let state = test_state(Player::B);
        let id = start(&state, "human-vs-auto").await;
        let snapshot = state.sessions.snapshot(&id).unwrap();
        assert_eq!(snapshot.moves.len(), 1);
        assert_eq!(snapshot.moves[0].player, Player::B);
    }

    #[tokio::test]
    async fn test_invalid_column_is_400() {
        let state = test_state(Player::A);
        let id = start(&state, "human-vs-auto").await;
        let (status, body) = send(
            create_app(state),
            "POST",
            &format!("/games/{}/move?column=8", id),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid column"));
    }

    #[tokio::test]
    async fn test_column_move_in_auto_game_is_rejected() {
        let state = test_state(Player::A);
        let id = start(&state, "auto-vs-auto").await;
        let (status, _) = send(
            create_app(Arc::clone(&state)),
            "POST",
            &format!("/games/{}/move?column=1", id),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(state.sessions.snapshot(&id).unwrap().moves.is_empty());
    }

    #[tokio::test]
    async fn test_automated_move_appends_one() {
        let state = test_state(Player::A);
        let id = start(&state, "auto-vs-auto").await;
        for expected in 1..=3 {
            let (status, body) = send(
                create_app(Arc::clone(&state)),
                "POST",
                &format!("/games/{}/move", id),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            let snapshot: GameSnapshot = serde_json::from_str(&body).unwrap();
            assert_eq!(snapshot.moves.len(), expected);
        }
    }

    #[tokio::test]
    async fn test_automated_move_on_human_turn_is_rejected() {
        let state = test_state(Player::A);
        let id = start(&state, "human-vs-auto").await;
        let (status, body) =
            send(create_app(state), "POST", &format!("/games/{}/move", id)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("Not your turn"));
    }

    #[tokio::test]
    async fn test_move_after_game_over_is_rejected() {
        let state = test_state(Player::A);
        let id = start(&state, "auto-vs-auto").await;
        state
            .sessions
            .update(&id, |game| game.play_automated(state.provider.as_ref()))
            .unwrap();
        assert!(state.sessions.snapshot(&id).unwrap().status.is_terminal());

        let (status, body) =
            send(create_app(state), "POST", &format!("/games/{}/move", id)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("already over"));
    }
}
