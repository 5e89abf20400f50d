use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{server::AppState, utils};

/// Redirects to Spotify's authorization page with the configured scopes.
pub async fn login(State(state): State<AppState>) -> Response {
    match utils::authorization_url(&state.config) {
        Ok(url) => (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Cannot build authorization URL");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
