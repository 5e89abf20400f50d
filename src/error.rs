//! Error types shared by the Spotify client and the HTTP handlers.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";

/// Failure of a call to Spotify, independent of the HTTP client used.
///
/// Handlers branch on [`UpstreamError::status`] and [`UpstreamError::reason`]
/// and pass [`UpstreamError::details`] through to the caller.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("Spotify responded with {status}: {message}")]
    Status {
        status: StatusCode,
        reason: Option<String>,
        message: String,
        details: Option<Value>,
    },

    #[error("Request to Spotify failed: {0}")]
    Transport(String),

    #[error("Unexpected response from Spotify: {0}")]
    Decode(String),

    #[error("No refresh token configured. Complete /login and set SPOTIFY_REFRESH_TOKEN")]
    MissingRefreshToken,
}

impl UpstreamError {
    /// Builds a status error from a raw response body.
    ///
    /// Understands both error shapes Spotify uses: the Web API's
    /// `{"error": {"status", "message", "reason"}}` and the accounts service's
    /// `{"error": "..", "error_description": ".."}`.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error")).cloned();

        let (reason, message) = match &error {
            Some(Value::Object(obj)) => (
                obj.get("reason").and_then(Value::as_str).map(str::to_string),
                obj.get("message").and_then(Value::as_str).map(str::to_string),
            ),
            Some(Value::String(code)) => (
                None,
                Some(
                    parsed
                        .as_ref()
                        .and_then(|v| v.get("error_description"))
                        .and_then(Value::as_str)
                        .map(|d| format!("{}: {}", code, d))
                        .unwrap_or_else(|| code.clone()),
                ),
            ),
            _ => (None, None),
        };

        let message = message
            .filter(|m| !m.is_empty())
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });

        UpstreamError::Status {
            status,
            reason,
            message,
            details: error,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// True when Spotify answered with `status` and the given reason code.
    pub fn is(&self, status: StatusCode, reason: &str) -> bool {
        self.status() == Some(status) && self.reason() == Some(reason)
    }

    /// The provider's error object when there is one, the error text
    /// otherwise.
    pub fn details(&self) -> Value {
        match self {
            UpstreamError::Status {
                details: Some(details),
                ..
            } => details.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// Errors that end a `/spotify` request early.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Failed to get access token from Spotify.")]
    TokenRefresh(#[source] UpstreamError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "GET")],
                Json(json!({ "message": "Method Not Allowed" })),
            )
                .into_response(),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": INTERNAL_ERROR_MESSAGE,
                    "error": other.to_string(),
                })),
            )
                .into_response(),
        }
    }
}
