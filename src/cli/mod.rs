//! # CLI Module
//!
//! Command implementations for the `spotify-showcase` binary. Each command
//! receives the already validated [`Config`](crate::config::Config) and
//! reports progress with the crate's colored output macros.
//!
//! ## Commands
//!
//! - [`serve`] - Runs the HTTP service.
//! - [`auth`] - One-time bootstrap: runs the service in the background, opens
//!   the authorization page and prints the refresh token once `/callback`
//!   has been hit.
//! - [`login_url`] - Prints the authorization URL for manual use.
//! - [`status`] - Shows now playing and the top tracks in the terminal.
//! - [`playback`] - Stops playback or plays a track, with the same outcome
//!   mapping as `/spotify?action=`.
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotify-showcase auth                     # once, to obtain SPOTIFY_REFRESH_TOKEN
//! spotify-showcase serve                    # run the service
//! spotify-showcase status                   # check what the endpoint will report
//! spotify-showcase play spotify:track:abc   # control playback
//! ```

mod auth;
mod playback;
mod serve;
mod status;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use auth::{auth, login_url};
pub use playback::playback;
pub use serve::serve;
pub use status::status;

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
