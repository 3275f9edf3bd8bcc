//! Spotify Web API error types

use thiserror::Error;

/// Spotify Web API client errors
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse Spotify response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Spotify returned an error payload or a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Request timed out
    #[error("Request to Spotify timed out")]
    Timeout,
}

impl SpotifyError {
    /// Check if this error is a transient failure worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            SpotifyError::Timeout => true,
            SpotifyError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            SpotifyError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type for Spotify operations
pub type SpotifyResult<T> = Result<T, SpotifyError>;
