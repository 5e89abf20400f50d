use std::{any::Any, net::SocketAddr, panic::AssertUnwindSafe, sync::Arc};

use axum::{
    Extension, Router,
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use futures::FutureExt;
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    api,
    config::Config,
    error::ApiError,
    spotify::{SpotifyApi, SpotifyClient},
    types::Token,
};

/// Receives the token obtained on `/callback` so the `auth` command can pick
/// it up. Nothing else reads it.
pub type TokenSlot = Arc<Mutex<Option<Token>>>;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub spotify: Arc<dyn SpotifyApi>,
}

impl AppState {
    pub fn new(config: Arc<Config>, spotify: Arc<dyn SpotifyApi>) -> Self {
        AppState { config, spotify }
    }

    /// State backed by the real Spotify client.
    pub fn from_config(config: Config) -> Self {
        let config = Arc::new(config);
        let spotify = Arc::new(SpotifyClient::new(Arc::clone(&config)));
        AppState { config, spotify }
    }
}

/// Builds the service router.
///
/// Routes are served both at the root and under `/api`, so the endpoints
/// work behind a proxy that keeps the `/api` prefix. A handler that panics
/// answers with the generic 500 body instead of dropping the connection.
pub fn router(state: AppState, token_slot: TokenSlot) -> Router {
    let routes = Router::new()
        .route("/login", get(api::login))
        .route(
            "/callback",
            get(api::callback).layer(Extension(token_slot)),
        )
        .route("/spotify", any(api::spotify))
        .route("/health", get(api::health));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .with_state(state)
        .layer(middleware::from_fn(catch_panic))
}

async fn catch_panic(request: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(panic = %message, "Handler panicked");
            ApiError::Internal(message).into_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Serves the router on an already bound listener until the process stops.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    token_slot: TokenSlot,
) -> std::io::Result<()> {
    axum::serve(listener, router(state, token_slot)).await
}

pub async fn start_api_server(
    addr: SocketAddr,
    state: AppState,
    token_slot: TokenSlot,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");
    serve(listener, state, token_slot).await
}
