use crate::{
    error::UpstreamError,
    spotify::SpotifyApi,
    types::{CurrentlyPlaying, NowPlaying, Overview, SpotifyTrack, TopTracks},
    utils,
};

pub const NOTHING_PLAYING_MESSAGE: &str = "Nothing is currently playing.";
pub const NOW_PLAYING_ERROR: &str = "Could not fetch currently playing status.";
pub const TOP_TRACKS_ERROR: &str = "Could not fetch top tracks.";
pub const OTHER_PLAYING_MESSAGE: &str = "Currently playing something other than a track.";

/// Fetches currently playing and top tracks concurrently.
///
/// Both requests always run to completion. A failure on one side is reported
/// inline in its own field and never affects the other.
pub async fn fetch_overview(api: &dyn SpotifyApi, access_token: &str) -> Overview {
    let (now_playing, top_tracks) = tokio::join!(
        api.currently_playing(access_token),
        api.top_tracks(access_token)
    );

    Overview {
        now_playing: now_playing_status(now_playing),
        top_tracks: top_tracks_list(top_tracks),
    }
}

/// Shapes the currently playing result.
///
/// Returns `None` for a payload that carries no item, whatever its type.
pub fn now_playing_status(
    result: Result<Option<CurrentlyPlaying>, UpstreamError>,
) -> Option<NowPlaying> {
    match result {
        Ok(Some(playing)) => {
            let item = playing.item.as_ref()?;

            match playing.currently_playing_type.as_deref() {
                Some("track") => Some(NowPlaying::Track {
                    is_playing: playing.is_playing,
                    track: utils::format_track(item),
                    progress_ms: playing.progress_ms,
                    duration_ms: item.duration_ms,
                }),
                kind => Some(NowPlaying::Other {
                    is_playing: playing.is_playing,
                    kind: kind.map(str::to_string),
                    message: match kind {
                        Some(kind) => format!("Currently playing {}, not a track.", kind),
                        None => OTHER_PLAYING_MESSAGE.to_string(),
                    },
                }),
            }
        }
        Ok(None) => Some(NowPlaying::Idle {
            is_playing: false,
            message: NOTHING_PLAYING_MESSAGE.to_string(),
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Could not fetch currently playing");
            Some(NowPlaying::Unavailable {
                error: NOW_PLAYING_ERROR.to_string(),
            })
        }
    }
}

pub fn top_tracks_list(result: Result<Vec<Option<SpotifyTrack>>, UpstreamError>) -> TopTracks {
    match result {
        Ok(items) => TopTracks::Tracks(utils::format_tracks(&items)),
        Err(e) => {
            tracing::warn!(error = %e, "Could not fetch top tracks");
            TopTracks::Unavailable {
                error: TOP_TRACKS_ERROR.to_string(),
            }
        }
    }
}
