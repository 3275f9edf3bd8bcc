//! WebSocket message types for the playback bridge
//!
//! This module defines the message protocol between connected clients and
//! the bridge. Messages are serialized as JSON objects of the form
//! `{"type": "...", "payload": ...}`; unit variants omit the payload.

use serde::{Deserialize, Serialize};

use cadence_spotify_client::{PlayTarget, PlayerState};

// =============================================================================
// Client -> Server Messages
// =============================================================================

/// Commands sent from a connected client to the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Establish the session's access token and start polling
    Initiate(InitiatePayload),

    /// Replace the stored access token without side effects
    AccessToken(String),

    /// Play a specific track/context, or resume when the payload is null
    Play(Option<PlayTarget>),

    /// Resume playback of the prior context
    Resume,

    /// Pause playback
    Pause,

    /// Seek to an absolute position in milliseconds
    Seek(u64),

    /// Set the active device's volume (0-100)
    SetVolume(u8),

    /// Skip to the next track
    NextTrack,

    /// Skip to the previous track
    PreviousTrack,

    /// Transfer playback to another device
    TransferPlayback(TransferPayload),
}

/// Payload for the `initiate` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatePayload {
    /// Access token; may be omitted when re-initiating an existing session
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Payload for the `transfer_playback` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPayload {
    /// Target device id
    pub device_id: String,

    /// Whether playback should start on the target device
    #[serde(default)]
    pub play: bool,
}

// =============================================================================
// Server -> Client Messages
// =============================================================================

/// Events pushed from the bridge to a connected client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot after the first successful poll of a session
    InitialState(PlaybackSnapshot),

    /// The playing track changed
    TrackChange(TrackInfo),

    /// Playback position jumped (user scrub)
    Seek { position_ms: u64, timestamp_ms: i64 },

    /// Playback started
    PlaybackStarted,

    /// Playback paused
    PlaybackPaused,

    /// Playback moved to a different device
    DeviceChange(DeviceInfo),

    /// The active device's volume changed
    VolumeChange(u8),

    /// The playing track is about to end
    TrackEnd(TrackInfo),

    /// A command or poll failed
    ConnectError(String),
}

// =============================================================================
// Snapshot Types
// =============================================================================

/// One observation of remote playback state
///
/// Immutable once captured; the diff engine replaces the whole snapshot
/// after each cycle rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Whether something is actively playing
    pub is_playing: bool,

    /// Progress into the current track in milliseconds
    pub progress_ms: u64,

    /// Capture time (Unix ms)
    pub timestamp_ms: i64,

    /// The device playback is happening on, when known
    pub device: Option<DeviceInfo>,

    /// The currently playing track, when known
    pub track: Option<TrackInfo>,
}

impl PlaybackSnapshot {
    /// Whether the remote reported an active device for this observation
    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }
}

impl From<PlayerState> for PlaybackSnapshot {
    fn from(state: PlayerState) -> Self {
        let timestamp_ms = if state.timestamp != 0 {
            state.timestamp
        } else {
            chrono::Utc::now().timestamp_millis()
        };

        Self {
            is_playing: state.is_playing,
            progress_ms: state.progress_ms,
            timestamp_ms,
            device: state.device.map(|d| DeviceInfo {
                id: d.id,
                name: d.name,
                volume_percent: d.volume_percent,
            }),
            track: state.item.map(|t| TrackInfo {
                id: t.id,
                name: t.name,
                duration_ms: t.duration_ms,
                uri: t.uri,
            }),
        }
    }
}

/// A playback device as reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Spotify device id
    pub id: String,

    /// Human-readable device name
    pub name: String,

    /// Volume as a percentage (0-100)
    pub volume_percent: u8,
}

/// A track as reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Spotify track id
    pub id: String,

    /// Track title
    pub name: String,

    /// Track length in milliseconds
    pub duration_ms: u64,

    /// Spotify URI (`spotify:track:...`)
    pub uri: Option<String>,
}
