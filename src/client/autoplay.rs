//! Paced, single-flight driver for automated-vs-automated games.
//!
//! The orchestrator runs one cycle at a time:
//!
//! 1. **Polling** fetches the snapshot.
//! 2. If the server holds moves that are not displayed yet, **Revealing**
//!    shows exactly one more, then waits the inter-move delay.
//! 3. If everything is displayed and the game is in progress,
//!    **RequestingMove** asks the server for the next automated move and
//!    polls again after a short settle delay.
//! 4. Otherwise the game is **Finished**.
//!
//! Moves the server produced in a burst are therefore still revealed one at a
//! time, and the terminal status is applied together with the last move.

use super::api::GameApi;
use super::busy::BusyFlag;
use crate::error::ClientError;
use derive_new::new;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use strictly_connect4::{GameId, GameMode, GameStatus, Player, ReconstructedView, reconstruct};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Delays and retry budget of the autoplay loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct AutoplayTiming {
    /// Delay between the initial load and the first cycle.
    pub initial_settle: Duration,
    /// Delay after revealing a move.
    pub reveal_delay: Duration,
    /// Delay after requesting a move.
    pub request_settle: Duration,
    /// Consecutive failed cycles tolerated before the loop stops.
    pub max_consecutive_failures: u32,
}

impl Default for AutoplayTiming {
    fn default() -> Self {
        Self {
            initial_settle: Duration::from_millis(500),
            reveal_delay: Duration::from_millis(1000),
            request_settle: Duration::from_millis(250),
            max_consecutive_failures: 3,
        }
    }
}

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AutoplayPhase {
    /// Between cycles.
    Idle,
    /// Fetching the snapshot.
    Polling,
    /// Showing one more move.
    Revealing,
    /// Waiting for the server to make a move.
    RequestingMove,
    /// Game over or loop stopped.
    Finished,
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoplayEvent {
    /// A new view should be displayed.
    ViewChanged(ReconstructedView),
    /// A cycle started.
    Thinking,
    /// A cycle failed. The last good view stays displayed.
    Error(String),
    /// The game ended with this status.
    Finished(GameStatus),
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// One more move was displayed.
    Revealed {
        /// Moves displayed after this cycle.
        displayed: usize,
        /// Moves the server holds that are still hidden.
        remaining: usize,
    },
    /// An automated move was requested.
    Requested {
        /// Failure of the request, if any.
        error: Option<ClientError>,
    },
    /// Nothing left to do.
    Finished(GameStatus),
}

/// Why [`AutoplayOrchestrator::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayExit {
    /// The game ended.
    Finished(GameStatus),
    /// The orchestrator was disposed.
    Disposed,
}

/// Stops a running orchestrator.
#[derive(Debug, Clone)]
pub struct AutoplayHandle {
    alive: Arc<AtomicBool>,
}

impl AutoplayHandle {
    /// Stops the loop. No continuation is scheduled after this.
    pub fn dispose(&self) {
        info!("Autoplay disposed");
        self.alive.store(false, Ordering::Release);
    }

    /// Whether the orchestrator is still live.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct Progress {
    phase: AutoplayPhase,
    displayed: usize,
    view: ReconstructedView,
}

/// Drives an automated-vs-automated game at a watchable pace.
#[derive(Debug)]
pub struct AutoplayOrchestrator<A> {
    api: Arc<A>,
    game_id: GameId,
    timing: AutoplayTiming,
    thinking: BusyFlag,
    alive: Arc<AtomicBool>,
    progress: Mutex<Progress>,
    events: mpsc::UnboundedSender<AutoplayEvent>,
}

impl<A: GameApi> AutoplayOrchestrator<A> {
    /// Creates an orchestrator for `game_id`.
    pub fn new(
        api: Arc<A>,
        game_id: impl Into<GameId>,
        timing: AutoplayTiming,
        events: mpsc::UnboundedSender<AutoplayEvent>,
    ) -> Self {
        Self {
            api,
            game_id: game_id.into(),
            timing,
            thinking: BusyFlag::new(),
            alive: Arc::new(AtomicBool::new(true)),
            progress: Mutex::new(Progress {
                phase: AutoplayPhase::Idle,
                displayed: 0,
                // Replaced by the first load.
                view: ReconstructedView::empty(Player::A),
            }),
            events,
        }
    }

    /// Handle that can stop this orchestrator from elsewhere.
    pub fn handle(&self) -> AutoplayHandle {
        AutoplayHandle {
            alive: Arc::clone(&self.alive),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> AutoplayPhase {
        self.progress().phase
    }

    /// Number of moves currently displayed.
    pub fn displayed(&self) -> usize {
        self.progress().displayed
    }

    /// Currently displayed view.
    pub fn view(&self) -> ReconstructedView {
        self.progress().view.clone()
    }

    /// Whether a cycle is in flight.
    pub fn is_thinking(&self) -> bool {
        self.thinking.is_busy()
    }

    fn progress(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: AutoplayPhase) {
        debug!(%phase, "Autoplay phase");
        self.progress().phase = phase;
    }

    fn emit(&self, event: AutoplayEvent) {
        if self.events.send(event).is_err() {
            debug!("Autoplay event receiver dropped");
        }
    }

    fn show(&self, view: ReconstructedView, displayed: usize) {
        {
            let mut progress = self.progress();
            progress.displayed = displayed;
            progress.view = view.clone();
        }
        self.emit(AutoplayEvent::ViewChanged(view));
    }

    fn finish(&self, status: GameStatus) {
        info!(?status, displayed = self.displayed(), "Autoplay finished");
        self.set_phase(AutoplayPhase::Finished);
        self.emit(AutoplayEvent::Finished(status));
    }

    /// Loads and displays the whole current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WrongMode`] if the game is not automated on both
    /// sides, or the fetch error.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub async fn load(&self) -> Result<ReconstructedView, ClientError> {
        self.set_phase(AutoplayPhase::Polling);
        let snapshot = match self.api.fetch_state(&self.game_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.set_phase(AutoplayPhase::Idle);
                return Err(e);
            }
        };

        if snapshot.mode != GameMode::AutoVsAuto {
            warn!(mode = %snapshot.mode, "Autoplay started on a game that is not automated");
            self.set_phase(AutoplayPhase::Finished);
            return Err(ClientError::WrongMode {
                expected: GameMode::AutoVsAuto,
                actual: snapshot.mode,
            });
        }

        let view = reconstruct(&snapshot);
        info!(moves = view.move_count, status = ?view.status, "Initial state loaded");
        self.show(view.clone(), snapshot.moves.len());
        self.set_phase(AutoplayPhase::Idle);
        Ok(view)
    }

    /// Runs one poll/reveal/request cycle.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Busy`] without touching the network if a cycle
    /// is already in flight, or the fetch error.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub async fn cycle(&self) -> Result<CycleOutcome, ClientError> {
        let _guard = self.thinking.try_acquire().ok_or_else(|| {
            debug!("Cycle already in flight");
            ClientError::Busy
        })?;

        if self.phase() == AutoplayPhase::Finished {
            return Ok(CycleOutcome::Finished(self.progress().view.status));
        }

        self.set_phase(AutoplayPhase::Polling);
        self.emit(AutoplayEvent::Thinking);

        let snapshot = match self.api.fetch_state(&self.game_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Poll failed");
                self.set_phase(AutoplayPhase::Idle);
                return Err(e);
            }
        };

        let displayed = self.displayed();
        let total = snapshot.moves.len();

        if total > displayed {
            self.set_phase(AutoplayPhase::Revealing);
            let next = displayed + 1;
            let view = reconstruct(&snapshot.prefix(next));
            debug!(displayed = next, total, "Revealing move");
            self.show(view, next);

            if next == total && snapshot.status.is_terminal() {
                self.finish(snapshot.status);
                return Ok(CycleOutcome::Finished(snapshot.status));
            }
            self.set_phase(AutoplayPhase::Idle);
            return Ok(CycleOutcome::Revealed {
                displayed: next,
                remaining: total - next,
            });
        }

        if total == displayed && snapshot.status == GameStatus::InProgress {
            self.set_phase(AutoplayPhase::RequestingMove);
            let error = match self.api.request_automated_move(&self.game_id).await {
                Ok(after) => {
                    debug!(moves = after.moves.len(), status = ?after.status, "Automated move requested");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Automated move request failed");
                    self.emit(AutoplayEvent::Error(e.to_string()));
                    Some(e)
                }
            };
            self.set_phase(AutoplayPhase::Idle);
            return Ok(CycleOutcome::Requested { error });
        }

        if total < displayed {
            warn!(total, displayed, "Server log is shorter than the displayed game");
        }
        let view = reconstruct(&snapshot);
        self.show(view, total);
        self.finish(snapshot.status);
        Ok(CycleOutcome::Finished(snapshot.status))
    }

    async fn sleep_if_alive(&self, delay: Duration) -> bool {
        if !self.alive.load(Ordering::Acquire) {
            return false;
        }
        sleep(delay).await;
        self.alive.load(Ordering::Acquire)
    }

    fn record_failure(&self, failures: &mut u32, error: ClientError) -> Result<(), ClientError> {
        *failures += 1;
        warn!(failures = *failures, error = %error, "Autoplay cycle failed");
        if *failures >= self.timing.max_consecutive_failures {
            self.set_phase(AutoplayPhase::Finished);
            return Err(error);
        }
        Ok(())
    }

    /// Loads the game and plays it to the end at the configured pace.
    ///
    /// # Errors
    ///
    /// Returns the load error, or the last error once the consecutive
    /// failure budget is spent.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub async fn run(&self) -> Result<AutoplayExit, ClientError> {
        let view = self.load().await?;
        if view.is_terminal() {
            self.finish(view.status);
            return Ok(AutoplayExit::Finished(view.status));
        }

        if !self.sleep_if_alive(self.timing.initial_settle).await {
            return Ok(AutoplayExit::Disposed);
        }

        let mut failures = 0;
        loop {
            let delay = match self.cycle().await {
                Ok(CycleOutcome::Revealed { .. }) => {
                    failures = 0;
                    self.timing.reveal_delay
                }
                Ok(CycleOutcome::Requested { error: None }) => {
                    failures = 0;
                    self.timing.request_settle
                }
                Ok(CycleOutcome::Requested { error: Some(e) }) => {
                    self.record_failure(&mut failures, e)?;
                    self.timing.reveal_delay
                }
                Ok(CycleOutcome::Finished(status)) => return Ok(AutoplayExit::Finished(status)),
                Err(ClientError::Busy) => self.timing.reveal_delay,
                Err(e) => {
                    self.emit(AutoplayEvent::Error(e.to_string()));
                    self.record_failure(&mut failures, e)?;
                    self.timing.reveal_delay
                }
            };

            if !self.sleep_if_alive(delay).await {
                debug!("Autoplay stopped before next cycle");
                return Ok(AutoplayExit::Disposed);
            }
        }
    }
}
