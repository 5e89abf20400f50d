//! # API Module
//!
//! HTTP endpoints of the Spotify showcase service.
//!
//! ## Endpoints
//!
//! ### Authentication bootstrap
//!
//! - [`login`] - Redirects the operator to Spotify's authorization page.
//! - [`callback`] - Exchanges the returned authorization code and shows the
//!   refresh token to copy into `SPOTIFY_REFRESH_TOKEN`. This is a one-time,
//!   single-operator page, not an API for programs.
//!
//! ### Data and controls
//!
//! - [`spotify`] - CORS-gated JSON endpoint. Without an action it returns now
//!   playing, top tracks and control URLs; `?action=stop` pauses playback and
//!   `?action=play&track_uri=..` starts a track.
//!
//! ### Monitoring
//!
//! - [`health`] - Status and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use spotify_showcase::{config::Config, server};
//!
//! let state = server::AppState::from_config(Config::from_env()?);
//! let app = server::router(state, Default::default());
//! ```

mod callback;
mod health;
mod login;
mod spotify;

pub use callback::{CallbackParams, callback};
pub use health::health;
pub use login::login;
pub use spotify::spotify;
