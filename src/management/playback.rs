use reqwest::StatusCode;

use crate::{error::UpstreamError, spotify::SpotifyApi, types::MessageResponse};

pub const NO_ACTIVE_DEVICE: &str = "NO_ACTIVE_DEVICE";
pub const PLAYER_COMMAND_FAILED: &str = "PLAYER_COMMAND_FAILED";
pub const PREMIUM_REQUIRED: &str = "PREMIUM_REQUIRED";

/// Playback command requested through `?action=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackAction {
    Stop,
    Play(String),
}

impl PlaybackAction {
    /// Resolves the query parameters into an action.
    ///
    /// `stop` wins over everything else. `play` without a track URI is not an
    /// action; the caller falls back to the overview.
    pub fn from_query(action: Option<&str>, track_uri: Option<&str>) -> Option<Self> {
        match action {
            Some("stop") => Some(PlaybackAction::Stop),
            Some("play") => track_uri
                .map(str::trim)
                .filter(|uri| !uri.is_empty())
                .map(|uri| PlaybackAction::Play(uri.to_string())),
            _ => None,
        }
    }
}

/// HTTP status and body to answer a playback action with.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub status: StatusCode,
    pub body: MessageResponse,
}

impl ActionOutcome {
    fn message(status: StatusCode, message: impl Into<String>) -> Self {
        ActionOutcome {
            status,
            body: MessageResponse {
                message: message.into(),
                details: None,
            },
        }
    }

    fn failure(err: &UpstreamError, message: &str) -> Self {
        ActionOutcome {
            status: err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: MessageResponse {
                message: message.to_string(),
                details: Some(err.details()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

pub async fn run(api: &dyn SpotifyApi, access_token: &str, action: &PlaybackAction) -> ActionOutcome {
    match action {
        PlaybackAction::Stop => stop_outcome(api.pause(access_token).await),
        PlaybackAction::Play(uri) => play_outcome(uri, api.play(access_token, uri).await),
    }
}

/// Maps the result of a pause command.
///
/// `PLAYER_COMMAND_FAILED` usually means playback is already paused and is
/// reported as success.
pub fn stop_outcome(result: Result<(), UpstreamError>) -> ActionOutcome {
    let err = match result {
        Ok(()) => return ActionOutcome::message(StatusCode::OK, "Playback stopped successfully."),
        Err(err) => err,
    };

    tracing::warn!(error = %err, reason = ?err.reason(), "Error stopping playback");

    if err.is(StatusCode::NOT_FOUND, NO_ACTIVE_DEVICE) {
        ActionOutcome::message(
            StatusCode::NOT_FOUND,
            "No active Spotify device found to stop.",
        )
    } else if err.is(StatusCode::FORBIDDEN, PLAYER_COMMAND_FAILED) {
        ActionOutcome::message(
            StatusCode::OK,
            "Playback is likely already stopped or command failed.",
        )
    } else {
        ActionOutcome::failure(&err, "Failed to stop playback.")
    }
}

pub fn play_outcome(track_uri: &str, result: Result<(), UpstreamError>) -> ActionOutcome {
    let err = match result {
        Ok(()) => {
            return ActionOutcome::message(
                StatusCode::OK,
                format!("Attempting to play track: {}", track_uri),
            );
        }
        Err(err) => err,
    };

    tracing::warn!(error = %err, reason = ?err.reason(), track_uri, "Error starting playback");

    if err.is(StatusCode::NOT_FOUND, NO_ACTIVE_DEVICE) {
        ActionOutcome::message(
            StatusCode::NOT_FOUND,
            "No active Spotify device found to play on. Start playing on a device first!",
        )
    } else if err.is(StatusCode::FORBIDDEN, PREMIUM_REQUIRED) {
        ActionOutcome::message(
            StatusCode::FORBIDDEN,
            "Spotify Premium is required to control playback remotely.",
        )
    } else {
        ActionOutcome::failure(&err, "Failed to start playback.")
    }
}
