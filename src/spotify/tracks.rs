use reqwest::{Client, StatusCode};

use crate::{
    config::Config,
    error::UpstreamError,
    types::{SpotifyTrack, TopTracksResponse},
};

use super::check_status;

/// Retrieves the user's top tracks.
///
/// The number of tracks and the time window come from the configuration
/// (`TOP_TRACKS_LIMIT`, `TOP_TRACKS_TIME_RANGE`). Items are returned raw;
/// projection and filtering of unnamed entries happen in the caller. A
/// successful answer without a body yields an empty list.
pub async fn get_top_tracks(
    client: &Client,
    config: &Config,
    token: &str,
) -> Result<Vec<Option<SpotifyTrack>>, UpstreamError> {
    let api_url = format!(
        "{uri}/me/top/tracks?limit={limit}&time_range={range}",
        uri = config.api_url,
        limit = config.top_tracks_limit,
        range = config.top_tracks_time_range.as_str()
    );

    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(Vec::new());
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let json = serde_json::from_str::<TopTracksResponse>(&body)
        .map_err(|e| UpstreamError::Decode(e.to_string()))?;

    Ok(json.items)
}
