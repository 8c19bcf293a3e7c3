//! reqwest-backed [`GameApi`] talking to the arena server.

use super::api::GameApi;
use crate::error::ClientError;
use async_trait::async_trait;
use serde::Deserialize;
use strictly_connect4::{Column, GameId, GameMode, GameSnapshot, ParticipantLabels, Player};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct StartResponse {
    game_id: GameId,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the game server.
#[derive(Debug, Clone)]
pub struct HttpGameClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGameClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL extended by `segments`, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Protocol(format!("Invalid URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Protocol(format!("Base URL cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates a new game and returns its id.
    #[instrument(skip(self, labels), fields(base_url = %self.base_url))]
    pub async fn start_game(
        &self,
        mode: GameMode,
        labels: &ParticipantLabels,
    ) -> Result<GameId, ClientError> {
        let mut url = self.url(&["games", "start"])?;
        url.query_pairs_mut()
            .append_pair("mode", &mode.to_string())
            .append_pair("player_a", labels.label(Player::A))
            .append_pair("player_b", labels.label(Player::B));

        let response = self.client.get(url).send().await?;
        let started: StartResponse = Self::decode(response).await?;
        info!(game_id = %started.game_id, "Game started");
        Ok(started.game_id)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await?;
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        warn!(status = status.as_u16(), error = %message, "Server rejected request");
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl GameApi for HttpGameClient {
    #[instrument(skip(self))]
    async fn fetch_state(&self, game_id: &str) -> Result<GameSnapshot, ClientError> {
        let url = self.url(&["games", game_id, "state"])?;
        let response = self.client.get(url).send().await?;
        let snapshot: GameSnapshot = Self::decode(response).await?;
        debug!(moves = snapshot.moves.len(), status = ?snapshot.status, "Fetched state");
        Ok(snapshot)
    }

    #[instrument(skip(self), fields(column = column.number()))]
    async fn submit_move(
        &self,
        game_id: &str,
        column: Column,
    ) -> Result<GameSnapshot, ClientError> {
        let mut url = self.url(&["games", game_id, "move"])?;
        url.query_pairs_mut()
            .append_pair("column", &column.number().to_string());

        let response = self.client.post(url).send().await?;
        let snapshot: GameSnapshot = Self::decode(response).await?;
        debug!(moves = snapshot.moves.len(), status = ?snapshot.status, "Move accepted");
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    async fn request_automated_move(&self, game_id: &str) -> Result<GameSnapshot, ClientError> {
        let url = self.url(&["games", game_id, "move"])?;
        let response = self.client.post(url).send().await?;
        let snapshot: GameSnapshot = Self::decode(response).await?;
        debug!(moves = snapshot.moves.len(), status = ?snapshot.status, "Automated move made");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = HttpGameClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.url(&["games", "7", "state"]).unwrap().as_str(),
            "http://localhost:3000/games/7/state"
        );
    }

    #[test]
    fn test_game_id_is_one_escaped_segment() {
        let client = HttpGameClient::new("http://localhost:3000");
        let url = client.url(&["games", "a/b?c#d", "state"]).unwrap();
        assert_eq!(url.path(), "/games/a%2Fb%3Fc%23d/state");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = HttpGameClient::new("http://localhost:3000/arena/");
        assert_eq!(
            client.url(&["games", "start"]).unwrap().as_str(),
            "http://localhost:3000/arena/games/start"
        );
    }

    #[test]
    fn test_bad_base_url_is_protocol_error() {
        let client = HttpGameClient::new("not a url");
        assert!(matches!(
            client.url(&["games", "1", "state"]),
            Err(ClientError::Protocol(_))
        ));
    }
}
