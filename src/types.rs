use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Raw token endpoint payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

// Spotify track objects are deserialized leniently: a track without a name is
// dropped later, not rejected here.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
    pub external_urls: Option<ExternalUrls>,
    pub uri: Option<String>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyArtist {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyAlbum {
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub currently_playing_type: Option<String>,
    pub item: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub items: Vec<Option<SpotifyTrack>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartPlaybackRequest {
    pub uris: Vec<String>,
}

/// Display-oriented projection of a Spotify track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub name: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_art_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spotify_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Playback snapshot reported under `now_playing`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NowPlaying {
    Track {
        is_playing: bool,
        track: Option<TrackSummary>,
        #[serde(skip_serializing_if = "Option::is_none")]
        progress_ms: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    Other {
        is_playing: bool,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        message: String,
    },
    Idle {
        is_playing: bool,
        message: String,
    },
    Unavailable {
        error: String,
    },
}

/// Either the projected top tracks or an inline error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TopTracks {
    Tracks(Vec<TrackSummary>),
    Unavailable { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub now_playing: Option<NowPlaying>,
    pub top_tracks: TopTracks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controls {
    pub stop_playback_url: String,
    pub play_track_base_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub overview: Overview,
    pub controls: Controls,
}

/// Body of every playback action response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    pub name: String,
    pub artist: String,
    pub album: String,
}
