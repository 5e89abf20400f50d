use std::sync::Arc;

use crate::{
    config::Config,
    error,
    management::{PlaybackAction, run_playback},
    spotify::{SpotifyApi, SpotifyClient},
    success,
};

use super::spinner;

/// Runs a playback action and reports the mapped outcome.
///
/// Exits with status 1 when the outcome is not a success.
pub async fn playback(config: Config, action: PlaybackAction) {
    let client = SpotifyClient::new(Arc::new(config));

    let pb = spinner("Sending playback command...");
    let access_token = match client.refresh_access_token().await {
        Ok(token) => token,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to get access token from Spotify: {}", e);
        }
    };

    let outcome = run_playback(&client, &access_token, &action).await;
    pb.finish_and_clear();

    if outcome.is_success() {
        success!("{}", outcome.body.message);
        return;
    }

    match outcome.body.details {
        Some(details) => error!(
            "{} ({}) {}",
            outcome.body.message, outcome.status, details
        ),
        None => error!("{} ({})", outcome.body.message, outcome.status),
    }
}
