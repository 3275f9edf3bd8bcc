//! Spotify Web API playback client for Cadence
//!
//! This crate wraps the subset of the Spotify Web API the bridge needs:
//! - Fetching the current playback state (`/me/player`)
//! - Issuing playback commands (play, pause, seek, volume, skip, transfer)
//!
//! Every call takes the caller's access token; the crate holds no
//! credentials of its own.
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_spotify_client::SpotifyClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SpotifyClient::new()?;
//!
//! // Fetch the current playback state. `None` means Spotify reports
//! // no active device, which is not an error.
//! match client.get_player_state("access-token").await? {
//!     Some(state) => println!("playing: {}", state.is_playing),
//!     None => println!("no active device"),
//! }
//!
//! client.pause("access-token").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::SpotifyClient;
pub use error::{SpotifyError, SpotifyResult};
pub use models::{Device, PlayTarget, PlayerState, Track};
