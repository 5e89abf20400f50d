use std::collections::HashMap;

use axum::{
    Json,
    extract::{OriginalUri, Query, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::{
    error::ApiError,
    management::{self, PlaybackAction},
    server::AppState,
    types::DashboardResponse,
    utils,
};

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Now playing, top tracks and playback controls.
///
/// Every response carries the CORS headers, including errors.
pub async fn spotify(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut response = match handle(&state, &method, &uri, &headers, &params).await {
        Ok(response) => response,
        Err(e) => {
            if !matches!(e, ApiError::MethodNotAllowed) {
                tracing::error!(error = ?e, "Unhandled error in /spotify");
            }
            e.into_response()
        }
    };

    apply_cors(response.headers_mut(), &state.config.cors_origin);
    response
}

async fn handle(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    params: &HashMap<String, String>,
) -> Result<Response, ApiError> {
    if *method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if *method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }

    let access_token = state
        .spotify
        .refresh_access_token()
        .await
        .map_err(ApiError::TokenRefresh)?;

    let action = PlaybackAction::from_query(
        params.get("action").map(String::as_str),
        params.get("track_uri").map(String::as_str),
    );
    if let Some(action) = action {
        let outcome = management::run_playback(state.spotify.as_ref(), &access_token, &action).await;
        return Ok((outcome.status, Json(outcome.body)).into_response());
    }

    let overview = management::fetch_overview(state.spotify.as_ref(), &access_token).await;

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok());
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| state.config.server_addr.to_string());

    let body = DashboardResponse {
        overview,
        controls: utils::control_urls(proto, &host, uri.path()),
    };
    let json = serde_json::to_string_pretty(&body).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, NO_CACHE),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        json,
    )
        .into_response())
}

// An unusable origin is left out rather than widened; `Config::from_vars`
// rejects such values at startup.
fn apply_cors(headers: &mut HeaderMap, origin: &str) {
    match HeaderValue::from_str(origin) {
        Ok(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(_) => tracing::warn!(origin, "Invalid CORS origin, header omitted"),
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}
