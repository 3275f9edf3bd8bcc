//! Playback state diff engine
//!
//! Owns the previous/current snapshot pair for one session and classifies
//! the differences between consecutive observations into discrete events.
//! Every poll cycle runs the same fixed sequence of checks; several events
//! may fire from a single cycle.

use super::messages::{PlaybackSnapshot, ServerMessage};

/// Progress jumps beyond this are treated as user scrubs rather than
/// normal poll-interval drift.
pub const SCRUB_THRESHOLD_MS: u64 = 1500;

/// How close to the end of a track the end-of-track event fires,
/// anticipating poll latency instead of waiting for `is_playing` to flip.
pub const TRACK_END_WINDOW_MS: u64 = 2000;

/// Per-session diff state
///
/// Callers filter out snapshots with no active device before handing them
/// to [`DiffEngine::observe`]; an empty state is a recoverable error
/// condition, not an observation.
#[derive(Debug, Default)]
pub struct DiffEngine {
    previous: Option<PlaybackSnapshot>,
    has_sent_initial_state: bool,
    has_notified_track_end: bool,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the session's `initial_state` event has been emitted
    pub fn has_sent_initial_state(&self) -> bool {
        self.has_sent_initial_state
    }

    /// The last stored snapshot, if any
    pub fn previous(&self) -> Option<&PlaybackSnapshot> {
        self.previous.as_ref()
    }

    /// Compare a fetched snapshot against the stored one and produce the
    /// ordered list of events to emit, then store the fetched snapshot.
    ///
    /// The first successful observation emits `initial_state` and nothing
    /// else; there is no prior state to compare against.
    pub fn observe(&mut self, fetched: PlaybackSnapshot) -> Vec<ServerMessage> {
        let previous = match self.previous.take() {
            Some(prev) => prev,
            None => {
                self.has_sent_initial_state = true;
                let events = vec![ServerMessage::InitialState(fetched.clone())];
                self.previous = Some(fetched);
                return events;
            }
        };

        let mut events = Vec::new();

        // Track change resets the end-of-track notification flag
        let track_changed = match (&fetched.track, &previous.track) {
            (Some(new), Some(old)) => new.id != old.id,
            (Some(_), None) => true,
            _ => false,
        };
        if track_changed {
            if let Some(track) = &fetched.track {
                events.push(ServerMessage::TrackChange(track.clone()));
                self.has_notified_track_end = false;
            }
        }

        // Scrub detection in either direction
        if fetched.progress_ms.abs_diff(previous.progress_ms) > SCRUB_THRESHOLD_MS {
            events.push(ServerMessage::Seek {
                position_ms: fetched.progress_ms,
                timestamp_ms: fetched.timestamp_ms,
            });
        }

        // Play-state flip
        if fetched.is_playing != previous.is_playing {
            events.push(if fetched.is_playing {
                ServerMessage::PlaybackStarted
            } else {
                ServerMessage::PlaybackPaused
            });
        }

        // Device change and volume change are mutually exclusive per cycle:
        // volume is only compared when the device is unchanged.
        if let (Some(new), Some(old)) = (&fetched.device, &previous.device) {
            if new.id != old.id {
                events.push(ServerMessage::DeviceChange(new.clone()));
            } else if new.volume_percent != old.volume_percent {
                events.push(ServerMessage::VolumeChange(new.volume_percent));
            }
        }

        // End-of-track fires once per track, shortly before the end
        if !self.has_notified_track_end {
            if let Some(track) = &fetched.track {
                if fetched.progress_ms + TRACK_END_WINDOW_MS > track.duration_ms {
                    events.push(ServerMessage::TrackEnd(track.clone()));
                    self.has_notified_track_end = true;
                }
            }
        }

        self.previous = Some(fetched);
        events
    }
}
