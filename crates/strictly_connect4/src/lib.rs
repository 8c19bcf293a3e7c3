//! Pure connect-four game logic.
//!
//! - **Board**: 6x7 gravity grid with token placement
//! - **Rules**: win and draw detection over a board
//! - **Reconstruct**: rebuilding board, turn and status from a move log
//! - **Snapshot**: the authoritative log and status as exchanged on the wire
//!
//! Columns are 0-based internally and 1-based on the wire; [`Column`] does the
//! conversion in its serde representation.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod error;
mod reconstruct;
pub mod rules;
mod snapshot;
mod types;

pub use action::Move;
pub use board::Board;
pub use error::{BoardError, ColumnError};
pub use reconstruct::{ReconstructedView, Replay, reconstruct, replay};
pub use rules::{Outcome, derived_status, detect_outcome};
pub use snapshot::{GameId, GameSnapshot, ParticipantLabels};
pub use types::{COLS, Cell, Column, GameMode, GameStatus, MAX_MOVES, Player, ROWS};
