//! Client side: talking to the server and keeping a displayable view.

mod api;
mod autoplay;
mod busy;
mod http_client;
mod presentation;
mod submitter;

pub use api::GameApi;
pub use autoplay::{
    AutoplayEvent, AutoplayExit, AutoplayHandle, AutoplayOrchestrator, AutoplayPhase,
    AutoplayTiming, CycleOutcome,
};
pub use busy::{BusyFlag, BusyGuard};
pub use http_client::HttpGameClient;
pub use presentation::{render, status_line};
pub use submitter::{MoveSubmitter, PendingMove, Reconciliation};
