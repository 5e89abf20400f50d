//! # Spotify Integration Module
//!
//! This module is the only place that talks to Spotify. It covers the two
//! accounts-service grants the service needs and the handful of Web API
//! endpoints behind `/spotify`.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers / CLI commands
//!          ↓
//! management (dashboard assembly, playback outcome mapping)
//!          ↓
//! SpotifyApi trait  ←  SpotifyClient (reqwest)  |  test fakes
//!          ↓
//! Spotify accounts service + Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - Authorization-code exchange and refresh-token grant, both
//!   authenticated with HTTP Basic client credentials.
//! - [`player`] - Currently playing, pause and start playback.
//! - [`tracks`] - The user's top tracks.
//!
//! ## Error Handling
//!
//! Every call returns [`UpstreamError`] on failure. Non-2xx responses are
//! decoded into a status plus Spotify's `reason` code, so callers never
//! depend on the shape of a particular HTTP client's error. Nothing is
//! retried: a failure is reported to the caller in the same request.
//!
//! ## Token Lifetime
//!
//! Access tokens are not cached. Each `/spotify` request exchanges the
//! configured refresh token for a fresh access token.

pub mod auth;
pub mod player;
pub mod tracks;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::{
    config::Config,
    error::UpstreamError,
    types::{CurrentlyPlaying, SpotifyTrack, Token},
};

/// The upstream operations the service depends on.
///
/// Implemented by [`SpotifyClient`] for real traffic and by in-memory fakes
/// in tests.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Exchanges a one-time authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<Token, UpstreamError>;

    /// Exchanges the configured refresh token for a fresh access token.
    async fn refresh_access_token(&self) -> Result<String, UpstreamError>;

    /// `Ok(None)` means Spotify answered `204 No Content`.
    async fn currently_playing(
        &self,
        access_token: &str,
    ) -> Result<Option<CurrentlyPlaying>, UpstreamError>;

    /// Raw top track items; entries may be `null`.
    async fn top_tracks(
        &self,
        access_token: &str,
    ) -> Result<Vec<Option<SpotifyTrack>>, UpstreamError>;

    async fn pause(&self, access_token: &str) -> Result<(), UpstreamError>;

    async fn play(&self, access_token: &str, track_uri: &str) -> Result<(), UpstreamError>;
}

/// [`SpotifyApi`] backed by `reqwest`.
///
/// Holds one connection pool for the lifetime of the process; cloning is
/// cheap.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    config: Arc<Config>,
}

impl SpotifyClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Uses a preconfigured `reqwest` client, e.g. one with timeouts.
    pub fn with_client(http: Client, config: Arc<Config>) -> Self {
        SpotifyClient { http, config }
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn exchange_code(&self, code: &str) -> Result<Token, UpstreamError> {
        auth::exchange_code(&self.http, &self.config, code).await
    }

    async fn refresh_access_token(&self) -> Result<String, UpstreamError> {
        let refresh_token = self
            .config
            .refresh_token
            .as_deref()
            .ok_or(UpstreamError::MissingRefreshToken)?;

        let token = auth::refresh_token(&self.http, &self.config, refresh_token).await?;
        Ok(token.access_token)
    }

    async fn currently_playing(
        &self,
        access_token: &str,
    ) -> Result<Option<CurrentlyPlaying>, UpstreamError> {
        player::get_currently_playing(&self.http, &self.config, access_token).await
    }

    async fn top_tracks(
        &self,
        access_token: &str,
    ) -> Result<Vec<Option<SpotifyTrack>>, UpstreamError> {
        tracks::get_top_tracks(&self.http, &self.config, access_token).await
    }

    async fn pause(&self, access_token: &str) -> Result<(), UpstreamError> {
        player::pause(&self.http, &self.config, access_token).await
    }

    async fn play(&self, access_token: &str, track_uri: &str) -> Result<(), UpstreamError> {
        player::play(&self.http, &self.config, access_token, track_uri).await
    }
}

/// Turns a non-success response into an [`UpstreamError::Status`].
async fn check_status(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::from_body(status, &body))
}
