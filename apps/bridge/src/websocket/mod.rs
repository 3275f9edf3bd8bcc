//! Real-time playback bridge over WebSocket
//!
//! This module contains:
//! - The wire protocol (`messages`)
//! - The per-connection session and command router (`session`)
//! - The playback state diff engine (`diff`)
//! - The adaptive poll scheduler (`poller`)
//! - The axum upgrade handler and socket loops (`handler`)

pub mod diff;
pub mod handler;
pub mod messages;
pub mod poller;
pub mod session;

pub use handler::ws_handler;
