use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Url;

use crate::{
    config::Config,
    types::{Controls, SpotifyTrack, TrackSummary},
};

/// Projects a Spotify track onto the summary the service exposes.
///
/// Returns `None` for tracks without a name so callers can filter them out.
pub fn format_track(track: &SpotifyTrack) -> Option<TrackSummary> {
    let name = track.name.as_deref().filter(|n| !n.is_empty())?;

    Some(TrackSummary {
        name: name.to_string(),
        artist: track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        album: track.album.as_ref().and_then(|a| a.name.clone()),
        album_art_url: track
            .album
            .as_ref()
            .and_then(|a| a.images.first())
            .map(|i| i.url.clone()),
        spotify_url: track
            .external_urls
            .as_ref()
            .and_then(|u| u.spotify.clone()),
        uri: track.uri.clone(),
    })
}

/// Projects a list that may contain `null` entries, dropping everything
/// without a name.
pub fn format_tracks(tracks: &[Option<SpotifyTrack>]) -> Vec<TrackSummary> {
    tracks
        .iter()
        .filter_map(|t| t.as_ref().and_then(format_track))
        .collect()
}

/// `Basic` authorization header value for the client credentials.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Spotify authorization URL the operator is redirected to.
pub fn authorization_url(config: &Config) -> Result<Url, String> {
    Url::parse_with_params(
        &config.auth_url,
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("scope", config.scope.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ],
    )
    .map_err(|e| format!("Invalid authorization URL '{}': {}", config.auth_url, e))
}

/// Absolute playback control URLs pointing back at the endpoint that was
/// called.
pub fn control_urls(proto: Option<&str>, host: &str, path: &str) -> Controls {
    let proto = proto
        .and_then(|p| p.split(',').next())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("http");
    let base = format!("{}://{}{}", proto, host, path);

    Controls {
        stop_playback_url: format!("{}?action=stop", base),
        play_track_base_url: format!("{}?action=play&track_uri=", base),
    }
}

/// Escapes text for inclusion in an HTML page.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Formats milliseconds as `m:ss`.
pub fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
