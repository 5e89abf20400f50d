//! Spotify Showcase Library
//!
//! A small service that proxies the Spotify Web API for a portfolio site:
//! a one-time OAuth bootstrap (`/login`, `/callback`) and a CORS-gated JSON
//! endpoint (`/spotify`) reporting what is playing, the top tracks, and
//! offering stop/play controls.
//!
//! # Modules
//!
//! - `api` - HTTP handlers
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration loading from the environment and `.env` files
//! - `error` - Upstream and handler error types
//! - `logging` - `tracing` subscriber setup for the service
//! - `management` - Overview assembly and playback outcome mapping
//! - `server` - Router, shared state and the listener loop
//! - `spotify` - Spotify Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Track projection and URL helpers
//!
//! # Example
//!
//! ```
//! use spotify_showcase::{config::{self, Config}, server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     config::load_env(None).await?;
//!     let config = Config::from_env()?;
//!     let addr = config.server_addr;
//!     server::start_api_server(addr, server::AppState::from_config(config), Default::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors in the command-line paths, such as a missing
/// required configuration value. Handlers never call it.
///
/// # Example
///
/// ```
/// error!("Invalid configuration: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
