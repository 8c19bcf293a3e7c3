//! Strictly Arena - connect-four server and move-sync clients
//!
//! The server owns each game's move log. Clients never patch a board in
//! place: they rebuild their view from the log on every update.
//!
//! # Architecture
//!
//! - **Server**: axum HTTP server, sessions cached in memory and stored in SQLite
//! - **Storage**: diesel repository for games and their move logs
//! - **Client**: HTTP client, human move submitter, autoplay orchestrator
//! - **Move provider**: decision logic for automated sides
//! - **Config**: TOML configuration
//!
//! Game rules live in the [`strictly_connect4`] crate.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod db;
mod error;
mod move_provider;
mod server;
mod session;

pub use client::{
    AutoplayEvent, AutoplayExit, AutoplayHandle, AutoplayOrchestrator, AutoplayPhase,
    AutoplayTiming, BusyFlag, BusyGuard, CycleOutcome, GameApi, HttpGameClient, MoveSubmitter,
    PendingMove, Reconciliation, render, status_line,
};
pub use config::{ArenaConfig, AutoplaySection, ClientSection, ConfigError, ServerSection};
pub use db::{DbError, GameRepository, GameRow, MoveRow, StoredText};
pub use error::{ClientError, ServerError};
pub use move_provider::{FirstOpenProvider, MoveProvider, SimpleProvider};
pub use server::{
    AppState, MoveParams, StartParams, StartResponse, create_app, shutdown_signal,
};
pub use session::{GameSession, SessionManager};
