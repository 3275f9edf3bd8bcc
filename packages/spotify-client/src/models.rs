//! Spotify Web API response and request models

use serde::{Deserialize, Serialize};

/// Current playback state from `/me/player`
///
/// `device` and `item` are both optional on the wire: Spotify omits them
/// in transitional states (e.g. right after a session ends).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Whether something is actively playing
    pub is_playing: bool,

    /// Progress into the current track in milliseconds
    #[serde(default)]
    pub progress_ms: u64,

    /// Server-side capture timestamp (Unix ms)
    #[serde(default)]
    pub timestamp: i64,

    /// The device playback is happening on
    pub device: Option<Device>,

    /// The currently playing track
    pub item: Option<Track>,
}

/// A playback device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Spotify device id
    pub id: String,

    /// Human-readable device name
    #[serde(default)]
    pub name: String,

    /// Volume as a percentage (0-100)
    #[serde(default)]
    pub volume_percent: u8,
}

/// A track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Spotify track id
    pub id: String,

    /// Track title
    #[serde(default)]
    pub name: String,

    /// Track length in milliseconds
    pub duration_ms: u64,

    /// Spotify URI (`spotify:track:...`)
    #[serde(default)]
    pub uri: Option<String>,
}

/// What to start playing
///
/// Either a single track by id, or a passthrough of Spotify's own
/// `/me/player/play` body fields (context, uris, offset, position).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayTarget {
    /// Track id; when set, takes precedence over the other fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Context URI (album, artist, playlist)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<String>,

    /// Explicit list of track URIs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,

    /// Offset into the context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<serde_json::Value>,

    /// Start position within the first track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_ms: Option<u64>,
}

impl PlayTarget {
    /// Target a single track by id
    pub fn track(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

// Internal request/response types

/// Body for `/me/player/play`
#[derive(Debug, Serialize)]
pub(crate) struct PlayBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_ms: Option<u64>,
}

impl From<PlayTarget> for PlayBody {
    fn from(target: PlayTarget) -> Self {
        if let Some(id) = target.id {
            return Self {
                uris: Some(vec![format!("spotify:track:{id}")]),
                context_uri: None,
                offset: None,
                position_ms: None,
            };
        }
        Self {
            uris: target.uris,
            context_uri: target.context_uri,
            offset: target.offset,
            position_ms: target.position_ms,
        }
    }
}

/// Body for `/me/player` (transfer playback)
#[derive(Debug, Serialize)]
pub(crate) struct TransferBody {
    pub device_ids: Vec<String>,
    pub play: bool,
}

/// Spotify error envelope: `{"error": {"status": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub status: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_state_parsing() {
        let json = r#"{
            "is_playing": true,
            "progress_ms": 44272,
            "timestamp": 1490252122574,
            "device": {"id": "dev-1", "name": "Kitchen", "volume_percent": 59},
            "item": {"id": "track-1", "name": "Song", "duration_ms": 222200, "uri": "spotify:track:track-1"}
        }"#;

        let state: PlayerState = serde_json::from_str(json).unwrap();
        assert!(state.is_playing);
        assert_eq!(state.progress_ms, 44272);
        assert_eq!(state.device.unwrap().volume_percent, 59);
        assert_eq!(state.item.unwrap().duration_ms, 222200);
    }

    #[test]
    fn test_player_state_missing_device_and_item() {
        let json = r#"{"is_playing": false, "device": null, "item": null}"#;
        let state: PlayerState = serde_json::from_str(json).unwrap();
        assert!(state.device.is_none());
        assert!(state.item.is_none());
        assert_eq!(state.progress_ms, 0);
    }

    #[test]
    fn test_play_body_from_track_id() {
        let body = PlayBody::from(PlayTarget::track("abc123"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["uris"][0], "spotify:track:abc123");
        assert!(json.get("context_uri").is_none());
    }

    #[test]
    fn test_play_body_passes_context_through() {
        let target = PlayTarget {
            context_uri: Some("spotify:album:xyz".into()),
            position_ms: Some(5000),
            ..PlayTarget::default()
        };
        let json = serde_json::to_value(PlayBody::from(target)).unwrap();
        assert_eq!(json["context_uri"], "spotify:album:xyz");
        assert_eq!(json["position_ms"], 5000);
        assert!(json.get("uris").is_none());
    }

    #[test]
    fn test_track_id_wins_over_context() {
        let target = PlayTarget {
            id: Some("abc".into()),
            context_uri: Some("spotify:album:xyz".into()),
            ..PlayTarget::default()
        };
        let json = serde_json::to_value(PlayBody::from(target)).unwrap();
        assert_eq!(json["uris"][0], "spotify:track:abc");
        assert!(json.get("context_uri").is_none());
    }

    #[test]
    fn test_error_envelope_parsing() {
        let json = r#"{"error": {"status": 401, "message": "The access token expired"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error.status, 401);
        assert_eq!(envelope.error.message, "The access token expired");
    }
}
