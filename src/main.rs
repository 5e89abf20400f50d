use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotify_showcase::{
    cli,
    config::{self, Config},
    error,
    management::PlaybackAction,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Load configuration from this .env file
    #[clap(long, global = true)]
    env_file: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP service
    Serve(ServeOptions),

    /// Authorize with Spotify and print the refresh token
    Auth,

    /// Print the Spotify authorization URL
    LoginUrl,

    /// Show now playing and top tracks
    Status(StatusOptions),

    /// Pause playback on the active device
    Stop,

    /// Play a track on the active device
    Play(PlayOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind, overrides SERVER_ADDRESS
    #[clap(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusOptions {
    /// Print the raw JSON overview
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PlayOptions {
    /// Spotify track URI, e.g. spotify:track:4uLU6hMCjMI75M1A2tKUQC
    track_uri: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

async fn load_config(env_file: Option<&Path>) -> Config {
    if let Err(e) = config::load_env(env_file).await {
        error!("Cannot load environment. Err: {}", e);
    }

    match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let env_file = cli.env_file.as_deref();

    match cli.command {
        Command::Serve(opt) => {
            let mut config = load_config(env_file).await;
            if let Some(addr) = opt.addr {
                config.server_addr = addr;
            }
            cli::serve(config).await
        }
        Command::Auth => cli::auth(load_config(env_file).await).await,
        Command::LoginUrl => cli::login_url(&load_config(env_file).await),
        Command::Status(opt) => cli::status(load_config(env_file).await, opt.json).await,
        Command::Stop => cli::playback(load_config(env_file).await, PlaybackAction::Stop).await,
        Command::Play(opt) => {
            let Some(action) = PlaybackAction::from_query(Some("play"), Some(&opt.track_uri))
            else {
                error!("A track URI is required.");
            };
            cli::playback(load_config(env_file).await, action).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
