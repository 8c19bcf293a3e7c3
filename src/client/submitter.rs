//! Human move submission with optimistic display and reconciliation.
//!
//! A submission is split in two steps so the caller can render between them:
//! [`MoveSubmitter::submit`] validates locally and yields a [`PendingMove`]
//! holding the optimistic view, and [`PendingMove::reconcile`] performs the
//! network call and replaces the optimistic view with an authoritative one.

use super::api::GameApi;
use super::busy::{BusyFlag, BusyGuard};
use crate::error::ClientError;
use std::sync::Arc;
use strictly_connect4::{Column, GameId, Player, ReconstructedView, reconstruct};
use tracing::{debug, info, instrument, warn};

/// How a pending move was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The server accepted the move. The view is rebuilt from its response.
    Confirmed(ReconstructedView),
    /// The submission failed and the authoritative state was reloaded.
    Reloaded {
        /// View rebuilt from the reloaded snapshot.
        view: ReconstructedView,
        /// Why the submission failed.
        error: ClientError,
    },
    /// Both the submission and the reload failed. The pre-submission view is restored.
    RolledBack {
        /// The view from before the optimistic drop.
        view: ReconstructedView,
        /// Why the submission failed.
        error: ClientError,
    },
}

impl Reconciliation {
    /// The view to display after settling.
    pub fn view(&self) -> &ReconstructedView {
        match self {
            Reconciliation::Confirmed(view)
            | Reconciliation::Reloaded { view, .. }
            | Reconciliation::RolledBack { view, .. } => view,
        }
    }

    /// The submission error, if any.
    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Reconciliation::Confirmed(_) => None,
            Reconciliation::Reloaded { error, .. } | Reconciliation::RolledBack { error, .. } => {
                Some(error)
            }
        }
    }
}

/// Submits moves for the human side of a game.
#[derive(Debug)]
pub struct MoveSubmitter<A> {
    api: Arc<A>,
    game_id: GameId,
    human: Player,
    busy: BusyFlag,
}

impl<A: GameApi> MoveSubmitter<A> {
    /// Creates a submitter for `human` in `game_id`.
    pub fn new(api: Arc<A>, game_id: impl Into<GameId>, human: Player) -> Self {
        Self {
            api,
            game_id: game_id.into(),
            human,
            busy: BusyFlag::new(),
        }
    }

    /// Game this submitter plays in.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Fetches the authoritative state and rebuilds the view.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub async fn load(&self) -> Result<ReconstructedView, ClientError> {
        let snapshot = self.api.fetch_state(&self.game_id).await?;
        Ok(reconstruct(&snapshot))
    }

    /// Validates a move against `view` and prepares its optimistic display.
    ///
    /// Nothing is sent until [`PendingMove::reconcile`] is awaited. The busy
    /// flag stays set for the lifetime of the returned value.
    ///
    /// # Errors
    ///
    /// - [`ClientError::GameOver`] if the view is terminal
    /// - [`ClientError::Busy`] if another submission is in flight
    /// - [`ClientError::NotYourTurn`] if the automated side is to move
    /// - [`ClientError::ColumnFull`] if the column is closed
    #[instrument(skip(self, view), fields(game_id = %self.game_id, column = column.number()))]
    pub fn submit(
        &self,
        view: &ReconstructedView,
        column: Column,
    ) -> Result<PendingMove<'_, A>, ClientError> {
        if view.is_terminal() {
            debug!(status = ?view.status, "Rejecting move on finished game");
            return Err(ClientError::GameOver(view.status));
        }

        let guard = self.busy.try_acquire().ok_or_else(|| {
            debug!("Rejecting move while another is pending");
            ClientError::Busy
        })?;

        if view.current_player != self.human {
            debug!(current = ?view.current_player, "Rejecting move out of turn");
            return Err(ClientError::NotYourTurn(view.current_player));
        }

        let optimistic = view.with_move(column, self.human)?;
        debug!(move_count = optimistic.move_count, "Optimistic drop applied");

        Ok(PendingMove {
            submitter: self,
            column,
            previous: view.clone(),
            optimistic,
            _guard: guard,
        })
    }

    /// Validates, submits and reconciles in one step.
    pub async fn play(
        &self,
        view: &ReconstructedView,
        column: Column,
    ) -> Result<Reconciliation, ClientError> {
        let pending = self.submit(view, column)?;
        Ok(pending.reconcile().await)
    }
}

/// A validated move waiting to be sent.
#[derive(Debug)]
pub struct PendingMove<'a, A> {
    submitter: &'a MoveSubmitter<A>,
    column: Column,
    previous: ReconstructedView,
    optimistic: ReconstructedView,
    _guard: BusyGuard,
}

impl<A: GameApi> PendingMove<'_, A> {
    /// View with the token already dropped.
    pub fn optimistic_view(&self) -> &ReconstructedView {
        &self.optimistic
    }

    /// Column being submitted.
    pub fn column(&self) -> Column {
        self.column
    }

    /// Sends the move and settles the displayed view.
    ///
    /// Never fails: errors are folded into the returned [`Reconciliation`].
    /// The busy flag is released when this returns.
    #[instrument(skip(self), fields(game_id = %self.submitter.game_id, column = self.column.number()))]
    pub async fn reconcile(self) -> Reconciliation {
        let submitter = self.submitter;

        match submitter.api.submit_move(&submitter.game_id, self.column).await {
            Ok(snapshot) => {
                info!(
                    moves = snapshot.moves.len(),
                    status = ?snapshot.status,
                    "Move confirmed"
                );
                Reconciliation::Confirmed(reconstruct(&snapshot))
            }
            Err(error) => {
                warn!(error = %error, "Move submission failed, reloading state");
                match submitter.api.fetch_state(&submitter.game_id).await {
                    Ok(snapshot) => Reconciliation::Reloaded {
                        view: reconstruct(&snapshot),
                        error,
                    },
                    Err(reload_error) => {
                        warn!(error = %reload_error, "Reload failed, rolling back optimistic move");
                        Reconciliation::RolledBack {
                            view: self.previous,
                            error,
                        }
                    }
                }
            }
        }
    }
}
