use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    config::Config,
    error, info, logging,
    server::{AppState, TokenSlot, start_api_server},
    success,
    types::Token,
    utils, warning,
};

const MAX_WAIT: Duration = Duration::from_secs(60);

/// Runs the one-time authorization bootstrap.
///
/// 1. Starts the service in the background so `/callback` can receive the
///    authorization code
/// 2. Opens the authorization URL in the default browser
/// 3. Waits for the callback to complete the code exchange
/// 4. Prints the refresh token to store as `SPOTIFY_REFRESH_TOKEN`
///
/// `SPOTIFY_REDIRECT_URI` must point at this service's `/callback` (for
/// example `http://127.0.0.1:3000/callback`) and be registered in the Spotify
/// developer dashboard. The token is printed, never written to disk.
pub async fn auth(config: Config) {
    logging::init_logging();

    let auth_url = match utils::authorization_url(&config) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    let token_slot: TokenSlot = Arc::new(Mutex::new(None));
    let addr = config.server_addr;
    let state = AppState::from_config(config);

    let server_slot = Arc::clone(&token_slot);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(addr, state, server_slot).await {
            error!("Failed to start server on {}: {}", addr, e);
        }
    });

    info!("Waiting for the Spotify callback on http://{}/callback", addr);
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(token_slot).await {
        Some(token) => {
            success!("Authentication successful!");
            match token.refresh_token {
                Some(refresh_token) => {
                    info!("Add the following line to your environment or .env file:");
                    println!("SPOTIFY_REFRESH_TOKEN={}", refresh_token);
                }
                None => warning!("Spotify did not return a refresh token."),
            }
        }
        None => error!("Authentication failed or timed out."),
    }
}

/// Prints the authorization URL.
pub fn login_url(config: &Config) {
    match utils::authorization_url(config) {
        Ok(url) => println!("{}", url),
        Err(e) => error!("{}", e),
    }
}

/// Polls the token slot until the callback fills it or the wait times out.
async fn wait_for_token(token_slot: TokenSlot) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < MAX_WAIT {
        if let Some(token) = token_slot.lock().await.take() {
            return Some(token);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
