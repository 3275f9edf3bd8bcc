//! Spotify Web API client implementation

use std::fmt;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, instrument};

use crate::error::{SpotifyError, SpotifyResult};
use crate::models::{ErrorEnvelope, PlayBody, PlayTarget, PlayerState, TransferBody};

/// Spotify Web API base URL
const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Spotify Web API playback client
///
/// Stateless: every call takes the caller's access token.
#[derive(Clone)]
pub struct SpotifyClient {
    http_client: Client,
    base_url: String,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SpotifyClient {
    /// Create a client against the production Spotify Web API
    pub fn new() -> SpotifyResult<Self> {
        Self::with_base_url(SPOTIFY_API_URL)
    }

    /// Create a client against a custom base URL
    ///
    /// Used by tests and by deployments that front the API with a proxy.
    pub fn with_base_url(base_url: impl Into<String>) -> SpotifyResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent("Cadence/1.0")
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Fetch the current playback state
    ///
    /// Three outcomes:
    /// - `Ok(Some(state))` — a normal snapshot
    /// - `Ok(None)` — Spotify reports no active device/session (204 or 202)
    /// - `Err(_)` — transport failure or an error payload
    #[instrument(skip(self, access_token))]
    pub async fn get_player_state(&self, access_token: &str) -> SpotifyResult<Option<PlayerState>> {
        let response = self
            .authorized(self.http_client.get(self.url("/me/player")), access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        // 204 (and historically 202) mean no active playback session
        if response.status() == StatusCode::NO_CONTENT || response.status() == StatusCode::ACCEPTED
        {
            debug!("No active playback session");
            return Ok(None);
        }

        let status = response.status();
        let text = response.text().await.map_err(SpotifyError::Http)?;

        if text.is_empty() {
            return Ok(None);
        }

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
            return Err(SpotifyError::Api {
                status: envelope.error.status,
                message: envelope.error.message,
            });
        }

        if !status.is_success() {
            return Err(api_error_from_status(status, &text));
        }

        let state: PlayerState = serde_json::from_str(&text)?;
        Ok(Some(state))
    }

    /// Start playback of a specific track or context
    #[instrument(skip(self, access_token))]
    pub async fn play(&self, access_token: &str, target: PlayTarget) -> SpotifyResult<()> {
        let body = PlayBody::from(target);
        let request = self
            .authorized(self.http_client.put(self.url("/me/player/play")), access_token)
            .json(&body);
        self.send_command(request).await
    }

    /// Resume playback of the prior context
    #[instrument(skip(self, access_token))]
    pub async fn resume(&self, access_token: &str) -> SpotifyResult<()> {
        let request = self.authorized(
            self.http_client.put(self.url("/me/player/play")),
            access_token,
        );
        self.send_command(request).await
    }

    /// Pause playback
    #[instrument(skip(self, access_token))]
    pub async fn pause(&self, access_token: &str) -> SpotifyResult<()> {
        let request = self.authorized(
            self.http_client.put(self.url("/me/player/pause")),
            access_token,
        );
        self.send_command(request).await
    }

    /// Seek to an absolute position in the current track
    #[instrument(skip(self, access_token))]
    pub async fn seek(&self, access_token: &str, position_ms: u64) -> SpotifyResult<()> {
        let request = self
            .authorized(self.http_client.put(self.url("/me/player/seek")), access_token)
            .query(&[("position_ms", position_ms.to_string())]);
        self.send_command(request).await
    }

    /// Set the volume of the active device
    #[instrument(skip(self, access_token))]
    pub async fn set_volume(&self, access_token: &str, volume_percent: u8) -> SpotifyResult<()> {
        let request = self
            .authorized(
                self.http_client.put(self.url("/me/player/volume")),
                access_token,
            )
            .query(&[("volume_percent", volume_percent.to_string())]);
        self.send_command(request).await
    }

    /// Skip to the next track
    #[instrument(skip(self, access_token))]
    pub async fn next_track(&self, access_token: &str) -> SpotifyResult<()> {
        let request = self.authorized(
            self.http_client.post(self.url("/me/player/next")),
            access_token,
        );
        self.send_command(request).await
    }

    /// Skip to the previous track
    #[instrument(skip(self, access_token))]
    pub async fn previous_track(&self, access_token: &str) -> SpotifyResult<()> {
        let request = self.authorized(
            self.http_client.post(self.url("/me/player/previous")),
            access_token,
        );
        self.send_command(request).await
    }

    /// Transfer playback to another device
    #[instrument(skip(self, access_token))]
    pub async fn transfer_playback(
        &self,
        access_token: &str,
        device_id: &str,
        play: bool,
    ) -> SpotifyResult<()> {
        let body = TransferBody {
            device_ids: vec![device_id.to_string()],
            play,
        };
        let request = self
            .authorized(self.http_client.put(self.url("/me/player")), access_token)
            .json(&body);
        self.send_command(request).await
    }

    /// Issue a command request and normalize the outcome
    ///
    /// Commands succeed with 204 (sometimes 200/202); any other status is
    /// converted to `SpotifyError::Api` carrying the remote error message.
    async fn send_command(&self, request: RequestBuilder) -> SpotifyResult<()> {
        let response = request.send().await.map_err(map_transport_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(error_from_response(response).await)
    }
}

fn map_transport_error(e: reqwest::Error) -> SpotifyError {
    if e.is_timeout() {
        SpotifyError::Timeout
    } else {
        SpotifyError::Http(e)
    }
}

fn api_error_from_status(status: StatusCode, text: &str) -> SpotifyError {
    let message = if text.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        text.trim().to_string()
    };
    SpotifyError::Api {
        status: status.as_u16(),
        message,
    }
}

async fn error_from_response(response: Response) -> SpotifyError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
        return SpotifyError::Api {
            status: envelope.error.status,
            message: envelope.error.message,
        };
    }

    api_error_from_status(status, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_json_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SpotifyClient {
        SpotifyClient::with_base_url(server.uri()).unwrap()
    }

    fn player_state_json() -> serde_json::Value {
        serde_json::json!({
            "is_playing": true,
            "progress_ms": 12000,
            "timestamp": 1700000000000i64,
            "device": {"id": "dev-1", "name": "Kitchen", "volume_percent": 40},
            "item": {"id": "track-1", "name": "Song", "duration_ms": 180000}
        })
    }

    #[tokio::test]
    async fn test_get_player_state_parses_snapshot() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(player_state_json()))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let state = client.get_player_state("token-1").await.unwrap().unwrap();

        assert!(state.is_playing);
        assert_eq!(state.progress_ms, 12000);
        assert_eq!(state.device.unwrap().id, "dev-1");
        assert_eq!(state.item.unwrap().id, "track-1");
    }

    #[tokio::test]
    async fn test_get_player_state_no_content_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let state = client.get_player_state("token-1").await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_get_player_state_error_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"status": 401, "message": "The access token expired"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get_player_state("token-1").await.unwrap_err();

        assert_matches!(err, SpotifyError::Api { status: 401, .. });
        assert_eq!(err.to_string(), "The access token expired");
    }

    #[tokio::test]
    async fn test_play_sends_track_uri() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/me/player/play"))
            .and(body_json_string(r#"{"uris":["spotify:track:abc"]}"#))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .play("token-1", PlayTarget::track("abc"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_seek_uses_query_param() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/me/player/seek"))
            .and(query_param("position_ms", "45000"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.seek("token-1", 45000).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_volume_uses_query_param() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/me/player/volume"))
            .and(query_param("volume_percent", "75"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.set_volume("token-1", 75).await.unwrap();
    }

    #[tokio::test]
    async fn test_transfer_playback_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/me/player"))
            .and(body_json_string(r#"{"device_ids":["dev-2"],"play":true}"#))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .transfer_playback("token-1", "dev-2", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_command_failure_carries_remote_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/me/player/next"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"status": 404, "message": "Device not found"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.next_track("token-1").await.unwrap_err();

        assert_matches!(err, SpotifyError::Api { status: 404, .. });
        assert_eq!(err.to_string(), "Device not found");
    }

    #[tokio::test]
    async fn test_command_failure_without_payload_uses_status_reason() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/me/player/pause"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.pause("token-1").await.unwrap_err();

        assert_matches!(err, SpotifyError::Api { status: 502, .. });
    }
}
