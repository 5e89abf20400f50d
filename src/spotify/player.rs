use reqwest::{Client, StatusCode};

use crate::{
    config::Config,
    error::UpstreamError,
    types::{CurrentlyPlaying, StartPlaybackRequest},
};

use super::check_status;

/// Retrieves what the user is currently playing.
///
/// Spotify answers `204 No Content` when nothing is playing; that case is
/// returned as `Ok(None)` rather than an error. An empty `200` body is
/// treated the same way.
pub async fn get_currently_playing(
    client: &Client,
    config: &Config,
    token: &str,
) -> Result<Option<CurrentlyPlaying>, UpstreamError> {
    let api_url = format!("{uri}/me/player/currently-playing", uri = config.api_url);

    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str::<CurrentlyPlaying>(&body)
        .map(Some)
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// Pauses playback on the user's active device.
///
/// Fails with reason `NO_ACTIVE_DEVICE` when no device is available and
/// usually with `PLAYER_COMMAND_FAILED` when playback is already paused.
pub async fn pause(client: &Client, config: &Config, token: &str) -> Result<(), UpstreamError> {
    let api_url = format!("{uri}/me/player/pause", uri = config.api_url);

    let response = client.put(&api_url).bearer_auth(token).send().await?;
    check_status(response).await?;

    Ok(())
}

/// Starts playback of exactly one track on the user's active device.
///
/// Requires Spotify Premium; free accounts get reason `PREMIUM_REQUIRED`.
pub async fn play(
    client: &Client,
    config: &Config,
    token: &str,
    track_uri: &str,
) -> Result<(), UpstreamError> {
    let api_url = format!("{uri}/me/player/play", uri = config.api_url);
    let body = StartPlaybackRequest {
        uris: vec![track_uri.to_string()],
    };

    let response = client
        .put(&api_url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;
    check_status(response).await?;

    Ok(())
}
