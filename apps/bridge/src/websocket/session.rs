//! Per-connection session state and command routing
//!
//! A [`Session`] owns everything one WebSocket connection needs: the access
//! token, the diff engine's snapshot state, the adaptive poll interval, and
//! the error-deduplication key shared by the poll and command paths. Exactly
//! one session exists per connection and it is never shared across tasks.

use tokio::sync::mpsc;
use uuid::Uuid;

use cadence_spotify_client::SpotifyClient;

use super::diff::DiffEngine;
use super::messages::{ClientMessage, InitiatePayload, PlaybackSnapshot, ServerMessage};

/// Base poll interval
pub const BASE_POLL_INTERVAL_MS: u64 = 1000;

/// Backoff ceiling for the poll interval
pub const MAX_POLL_INTERVAL_MS: u64 = 5000;

/// How much the interval grows per suppressed duplicate error
pub const BACKOFF_STEP_MS: u64 = 1000;

/// Error reported when a command arrives before the session is initiated
pub const TOKEN_MISSING_MESSAGE: &str = "Access token not found: ensure to `initiate` with an \
     access token before attempting other requests.";

/// Error reported when `initiate` arrives without a token
pub const TOKEN_REQUIRED_MESSAGE: &str =
    "An access token is required in order to start listening for playback events";

/// Error used for the recoverable empty-state condition
pub const NO_ACTIVE_DEVICE_MESSAGE: &str =
    "No active device found: start playback on a Spotify client to receive events";

/// Per-connection session
pub struct Session {
    id: Uuid,
    access_token: Option<String>,
    poll_interval_ms: u64,
    last_error_key: Option<String>,
    diff: DiffEngine,
    client: SpotifyClient,
    events: mpsc::UnboundedSender<ServerMessage>,
}

impl Session {
    /// Create a session for a freshly opened connection
    pub fn new(
        id: Uuid,
        client: SpotifyClient,
        events: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        Self {
            id,
            access_token: None,
            poll_interval_ms: BASE_POLL_INTERVAL_MS,
            last_error_key: None,
            diff: DiffEngine::new(),
            client,
            events,
        }
    }

    /// Connection id, for logging
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the session has been initiated and should be polling
    pub fn is_polling(&self) -> bool {
        self.access_token.is_some()
    }

    /// Current poll interval in milliseconds
    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms
    }

    /// Route one inbound command
    ///
    /// Any command except `initiate` is rejected while no token is stored;
    /// the rejection is local and no remote call is attempted.
    pub async fn handle_command(&mut self, command: ClientMessage) {
        let command = match command {
            ClientMessage::Initiate(payload) => {
                self.handle_initiate(payload);
                return;
            }
            _ if self.access_token.is_none() => {
                tracing::debug!(session_id = %self.id, "Command rejected: no access token");
                self.emit(ServerMessage::ConnectError(TOKEN_MISSING_MESSAGE.into()));
                return;
            }
            ClientMessage::AccessToken(token) => {
                tracing::debug!(session_id = %self.id, "Access token replaced");
                self.access_token = Some(token);
                return;
            }
            other => other,
        };

        // Guarded above; the token is always present from here on
        let token = match self.access_token.clone() {
            Some(token) => token,
            None => return,
        };

        let result = match command {
            ClientMessage::Play(Some(target)) => self.client.play(&token, target).await,
            ClientMessage::Play(None) | ClientMessage::Resume => self.client.resume(&token).await,
            ClientMessage::Pause => self.client.pause(&token).await,
            ClientMessage::Seek(position_ms) => self.client.seek(&token, position_ms).await,
            ClientMessage::SetVolume(percent) => self.client.set_volume(&token, percent).await,
            ClientMessage::NextTrack => self.client.next_track(&token).await,
            ClientMessage::PreviousTrack => self.client.previous_track(&token).await,
            ClientMessage::TransferPlayback(payload) => {
                self.client
                    .transfer_playback(&token, &payload.device_id, payload.play)
                    .await
            }
            // Handled before the token lookup
            ClientMessage::Initiate(_) | ClientMessage::AccessToken(_) => return,
        };

        if let Err(e) = result {
            self.report_error(e.to_string());
        }
    }

    fn handle_initiate(&mut self, payload: InitiatePayload) {
        if let Some(token) = payload.access_token {
            self.access_token = Some(token);
        }

        if self.access_token.is_none() {
            self.emit(ServerMessage::ConnectError(TOKEN_REQUIRED_MESSAGE.into()));
            return;
        }

        tracing::info!(session_id = %self.id, "Session initiated");
    }

    /// Run one poll cycle: fetch, diff, emit, adjust the interval
    pub async fn poll_cycle(&mut self) {
        let token = match &self.access_token {
            Some(token) => token.clone(),
            None => return,
        };

        match self.client.get_player_state(&token).await {
            Ok(Some(state)) => {
                let snapshot = PlaybackSnapshot::from(state);
                if !snapshot.has_device() {
                    // Empty state: recoverable, feeds the backoff path and
                    // leaves the stored snapshot untouched
                    self.report_error(NO_ACTIVE_DEVICE_MESSAGE.to_string());
                    return;
                }

                self.poll_interval_ms = BASE_POLL_INTERVAL_MS;
                self.last_error_key = None;

                for event in self.diff.observe(snapshot) {
                    tracing::trace!(session_id = %self.id, event = ?event, "Playback event");
                    self.emit(event);
                }
            }
            Ok(None) => self.report_error(NO_ACTIVE_DEVICE_MESSAGE.to_string()),
            Err(e) => self.report_error(e.to_string()),
        }
    }

    /// Shared error path for poll failures and command failures
    ///
    /// The first occurrence of a message is surfaced as `connect_error`; an
    /// identical repeat is suppressed and the poll interval grows instead,
    /// capped at [`MAX_POLL_INTERVAL_MS`]. A different message always
    /// surfaces immediately and leaves the interval unchanged.
    pub fn report_error(&mut self, message: String) {
        if self.last_error_key.as_deref() == Some(message.as_str()) {
            let next = (self.poll_interval_ms + BACKOFF_STEP_MS).min(MAX_POLL_INTERVAL_MS);
            tracing::debug!(
                session_id = %self.id,
                poll_interval_ms = next,
                "Recurring error suppressed, backing off"
            );
            self.poll_interval_ms = next;
        } else {
            tracing::warn!(session_id = %self.id, error = %message, "Playback error");
            self.emit(ServerMessage::ConnectError(message.clone()));
            self.last_error_key = Some(message);
        }
    }

    /// Emit an event to the connection
    ///
    /// Sending to a closed connection is a no-op; the writer task drops the
    /// receiver when the socket closes.
    fn emit(&self, event: ServerMessage) {
        if self.events.send(event).is_err() {
            tracing::trace!(session_id = %self.id, "Connection closed, event dropped");
        }
    }
}
