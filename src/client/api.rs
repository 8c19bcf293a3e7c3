//! The request/response seam between clients and the game server.

use crate::error::ClientError;
use async_trait::async_trait;
use strictly_connect4::{Column, GameSnapshot};

/// Operations a client needs from the authoritative game server.
///
/// Every call returns the full snapshot as the server sees it after the call.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Fetches the current snapshot.
    async fn fetch_state(&self, game_id: &str) -> Result<GameSnapshot, ClientError>;

    /// Submits a human move into `column`.
    async fn submit_move(&self, game_id: &str, column: Column)
    -> Result<GameSnapshot, ClientError>;

    /// Asks the server to make the next automated move.
    async fn request_automated_move(&self, game_id: &str) -> Result<GameSnapshot, ClientError>;
}
