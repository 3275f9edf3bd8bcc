//! Bridge server configuration

use std::env;

use anyhow::{Context, Result};

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (default: 8080)
    pub port: u16,

    /// Spotify Web API base URL override
    ///
    /// Unset in normal operation; integration setups point this at a mock
    /// server or a fronting proxy.
    pub spotify_api_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            spotify_api_url: env::var("SPOTIFY_API_URL").ok().filter(|s| !s.is_empty()),
        })
    }
}
