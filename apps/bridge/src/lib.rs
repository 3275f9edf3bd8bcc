//! Cadence bridge library
//!
//! Exposes the websocket modules and router construction for use by the
//! binary and by integration tests.

use axum::{routing::get, Extension, Router};

use cadence_spotify_client::SpotifyClient;

pub mod config;
pub mod websocket;

pub use config::Config;

/// Build the bridge router
pub fn app(client: SpotifyClient) -> Router {
    Router::new()
        .route("/ws", get(websocket::ws_handler))
        .layer(Extension(client))
}
