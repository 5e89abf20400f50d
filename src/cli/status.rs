use std::sync::Arc;

use colored::Colorize;
use tabled::Table;

use crate::{
    config::Config,
    error,
    management::fetch_overview,
    spotify::{SpotifyApi, SpotifyClient},
    types::{NowPlaying, TopTracks, TrackTableRow},
    utils, warning,
};

use super::spinner;

/// Shows what `/spotify` would currently report.
pub async fn status(config: Config, json: bool) {
    let client = SpotifyClient::new(Arc::new(config));

    let pb = spinner("Fetching playback status...");
    let access_token = match client.refresh_access_token().await {
        Ok(token) => token,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to get access token from Spotify: {}", e);
        }
    };

    let overview = fetch_overview(&client, &access_token).await;
    pb.finish_and_clear();

    if json {
        match serde_json::to_string_pretty(&overview) {
            Ok(out) => println!("{}", out),
            Err(e) => error!("Cannot serialize overview: {}", e),
        }
        return;
    }

    print_now_playing(overview.now_playing.as_ref());
    println!();
    print_top_tracks(&overview.top_tracks);
}

fn print_now_playing(now_playing: Option<&NowPlaying>) {
    match now_playing {
        Some(NowPlaying::Track {
            is_playing,
            track: Some(track),
            progress_ms,
            duration_ms,
        }) => {
            let state = if *is_playing { "Playing" } else { "Paused" };
            let position = match (progress_ms, duration_ms) {
                (Some(p), Some(d)) => format!(
                    " [{} / {}]",
                    utils::format_duration(*p),
                    utils::format_duration(*d)
                ),
                _ => String::new(),
            };
            println!(
                "{} {} - {}{}",
                format!("{}:", state).green().bold(),
                track.name.bold(),
                track.artist,
                position
            );
        }
        Some(NowPlaying::Other { message, .. }) | Some(NowPlaying::Idle { message, .. }) => {
            println!("{}", message)
        }
        Some(NowPlaying::Unavailable { error }) => warning!("{}", error),
        Some(NowPlaying::Track { track: None, .. }) | None => {
            println!("Nothing is currently playing.")
        }
    }
}

fn print_top_tracks(top_tracks: &TopTracks) {
    match top_tracks {
        TopTracks::Tracks(tracks) if tracks.is_empty() => println!("No top tracks yet."),
        TopTracks::Tracks(tracks) => {
            let rows: Vec<TrackTableRow> = tracks
                .iter()
                .enumerate()
                .map(|(i, t)| TrackTableRow {
                    rank: i + 1,
                    name: t.name.clone(),
                    artist: t.artist.clone(),
                    album: t.album.clone().unwrap_or_default(),
                })
                .collect();

            println!("{}", Table::new(rows));
        }
        TopTracks::Unavailable { error } => warning!("{}", error),
    }
}
