use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    server::{AppState, TokenSlot},
    types::Token,
    utils::escape_html,
};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    Extension(token_slot): Extension<TokenSlot>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<String>) {
    let code = params.code.filter(|c| !c.is_empty());
    let error = params.error.filter(|e| !e.is_empty());

    if let Some(error) = error {
        tracing::warn!(error = %error, "Spotify returned an authorization error");
        return (
            StatusCode::BAD_REQUEST,
            Html(error_page("Callback Error", &error, None)),
        );
    }

    let Some(code) = code else {
        return (
            StatusCode::BAD_REQUEST,
            Html(error_page(
                "Error",
                "No authorization code received from Spotify.",
                None,
            )),
        );
    };

    match state.spotify.exchange_code(&code).await {
        Ok(token) => {
            tracing::info!(
                expires_in = token.expires_in,
                has_refresh_token = token.refresh_token.is_some(),
                "Authorization code exchanged"
            );
            let page = success_page(&token);
            *token_slot.lock().await = Some(token);
            (StatusCode::OK, Html(page))
        }
        Err(e) => {
            tracing::error!(error = %e, "Token exchange failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(error_page(
                    "Error Getting Token",
                    "Failed to exchange authorization code for tokens. Check the service logs.",
                    Some(&e.to_string()),
                )),
            )
        }
    }
}

fn error_page(title: &str, message: &str, detail: Option<&str>) -> String {
    let detail = detail
        .map(|d| format!("<pre>{}</pre>", escape_html(d)))
        .unwrap_or_default();

    format!(
        "<html><body><h1>{}</h1><p>{}</p>{}</body></html>",
        escape_html(title),
        escape_html(message),
        detail
    )
}

fn success_page(token: &Token) -> String {
    let refresh_token = token
        .refresh_token
        .as_deref()
        .unwrap_or("(Spotify did not return a refresh token)");
    let expires_at = token
        .obtained_at
        .checked_add(token.expires_in)
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default();

    format!(
        r#"<html>
<head><title>Spotify Auth Success</title></head>
<body style="font-family: sans-serif; padding: 20px;">
    <h1>Authentication Successful!</h1>
    <p>The application has been granted access.</p>
    <hr>
    <p style="color: #e53e3e; font-weight: bold;">ACTION REQUIRED:</p>
    <p>Copy the refresh token below and set it as <code>SPOTIFY_REFRESH_TOKEN</code> in the service environment, then restart the service.</p>
    <p><strong>Refresh Token:</strong></p>
    <textarea rows="5" style="width: 90%; font-family: monospace;" readonly onclick="this.select();">{refresh_token}</textarea>
    <hr>
    <p><small>Access Token (short-lived, expires {expires_at}): {access_token}</small></p>
    <p><small>Scope: {scope}</small></p>
</body>
</html>"#,
        refresh_token = escape_html(refresh_token),
        expires_at = expires_at,
        access_token = escape_html(&token.access_token),
        scope = escape_html(&token.scope),
    )
}
