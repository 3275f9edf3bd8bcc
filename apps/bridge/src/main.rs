use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cadence_bridge::{app, Config};
use cadence_spotify_client::SpotifyClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let client = match &config.spotify_api_url {
        Some(url) => {
            tracing::info!(url = %url, "Using Spotify API base URL override");
            SpotifyClient::with_base_url(url)
        }
        None => SpotifyClient::new(),
    }
    .context("Failed to build Spotify client")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(addr = %addr, "Cadence bridge listening");

    axum::serve(listener, app(client))
        .await
        .context("Server error")?;

    Ok(())
}
