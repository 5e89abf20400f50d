//! Configuration management for the Spotify showcase service.
//!
//! Configuration is read from environment variables, optionally seeded from a
//! `.env` file, and collected into an explicit [`Config`] value at startup.
//! Handlers never read the environment themselves; they receive the `Config`
//! through the router state, which keeps them testable with injected values.
//!
//! The lookup order for the `.env` file is:
//! 1. The path passed with `--env-file`
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`spotify-showcase/.env`)

use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
};

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_CORS_ORIGIN: &str = "*";
pub const DEFAULT_TOP_TRACKS_LIMIT: u32 = 10;

/// Permissions requested during authorization.
pub const DEFAULT_SCOPES: [&str; 4] = [
    "user-top-read",
    "user-read-currently-playing",
    "user-read-playback-state",
    "user-modify-playback-state",
];

const APP_DIR: &str = "spotify-showcase";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cannot load environment file {path}: {reason}")]
    EnvFile { path: String, reason: String },
}

/// Time window Spotify uses to compute a user's top items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "short_term" => Ok(TimeRange::ShortTerm),
            "medium_term" => Ok(TimeRange::MediumTerm),
            "long_term" => Ok(TimeRange::LongTerm),
            other => Err(format!(
                "expected short_term, medium_term or long_term, got '{}'",
                other
            )),
        }
    }
}

/// Immutable process configuration.
///
/// Holds the Spotify application credentials, the long-lived refresh token
/// (absent until the operator has completed the `/login` bootstrap once) and
/// the endpoints the service talks to.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
    pub server_addr: SocketAddr,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scope: String,
    pub cors_origin: String,
    pub top_tracks_limit: u32,
    pub top_tracks_time_range: TimeRange,
}

impl Config {
    /// Creates a configuration with the given credentials and default
    /// endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Config {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            refresh_token: None,
            server_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            scope: DEFAULT_SCOPES.join(" "),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            top_tracks_limit: DEFAULT_TOP_TRACKS_LIMIT,
            top_tracks_time_range: TimeRange::default(),
        }
    }

    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset. Required variables are the client
    /// id, client secret and redirect URI; everything else has a default.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let mut config = Config::new(
            required("SPOTIFY_CLIENT_ID")?,
            required("SPOTIFY_CLIENT_SECRET")?,
            required("SPOTIFY_REDIRECT_URI")?,
        );

        config.refresh_token = var("SPOTIFY_REFRESH_TOKEN");

        let server_addr = var("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.into());
        config.server_addr =
            SocketAddr::from_str(server_addr.trim()).map_err(|e| ConfigError::Invalid {
                name: "SERVER_ADDRESS",
                value: server_addr.clone(),
                reason: e.to_string(),
            })?;

        if let Some(url) = var("SPOTIFY_API_AUTH_URL") {
            config.auth_url = trim_url(url);
        }
        if let Some(url) = var("SPOTIFY_API_TOKEN_URL") {
            config.token_url = trim_url(url);
        }
        if let Some(url) = var("SPOTIFY_API_URL") {
            config.api_url = trim_url(url);
        }
        if let Some(scope) = var("SPOTIFY_API_AUTH_SCOPE") {
            config.scope = scope.split_whitespace().collect::<Vec<_>>().join(" ");
        }
        if let Some(origin) = var("CORS_ALLOW_ORIGIN") {
            let origin = origin.trim().to_string();
            HeaderValue::from_str(&origin).map_err(|e| ConfigError::Invalid {
                name: "CORS_ALLOW_ORIGIN",
                value: origin.clone(),
                reason: e.to_string(),
            })?;
            config.cors_origin = origin;
        }

        if let Some(limit) = var("TOP_TRACKS_LIMIT") {
            config.top_tracks_limit = match limit.trim().parse::<u32>() {
                Ok(n) if (1..=50).contains(&n) => n,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "TOP_TRACKS_LIMIT",
                        value: limit,
                        reason: "must be between 1 and 50".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "TOP_TRACKS_LIMIT",
                        value: limit.clone(),
                        reason: e.to_string(),
                    });
                }
            };
        }

        if let Some(range) = var("TOP_TRACKS_TIME_RANGE") {
            config.top_tracks_time_range =
                range.parse().map_err(|reason| ConfigError::Invalid {
                    name: "TOP_TRACKS_TIME_RANGE",
                    value: range.clone(),
                    reason,
                })?;
        }

        Ok(config)
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}

fn trim_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Loads environment variables from a `.env` file.
///
/// An explicitly requested file must exist. Otherwise `./.env` is tried first
/// and then `spotify-showcase/.env` in the local data directory, whose parent
/// directory is created so the operator knows where to put it. Finding no file
/// at all is fine: the variables may come from the real environment.
///
/// Variables already present in the environment are never overridden.
pub async fn load_env(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        return dotenv::from_path(path)
            .map(|_| Some(path.to_path_buf()))
            .map_err(|e| ConfigError::EnvFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
    }

    let local = PathBuf::from(".env");
    if local.is_file() {
        return dotenv::from_path(&local)
            .map(|_| Some(local.clone()))
            .map_err(|e| ConfigError::EnvFile {
                path: local.display().to_string(),
                reason: e.to_string(),
            });
    }

    let path = data_env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::EnvFile {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| ConfigError::EnvFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        return Ok(Some(path));
    }

    Ok(None)
}

/// Location of the per-user `.env` file.
pub fn data_env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push(".env");
    path
}
