use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::Config,
    error, info, logging,
    server::{AppState, start_api_server},
    warning,
};

pub async fn serve(config: Config) {
    logging::init_logging();

    if !config.has_refresh_token() {
        warning!(
            "SPOTIFY_REFRESH_TOKEN is not set. /spotify will fail until you complete /login or run `spotify-showcase auth`."
        );
    }

    let addr = config.server_addr;
    info!("Serving on http://{}", addr);

    let state = AppState::from_config(config);
    if let Err(e) = start_api_server(addr, state, Arc::new(Mutex::new(None))).await {
        error!("Server stopped: {}", e);
    }
}
