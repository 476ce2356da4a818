//! CLI entry point for tubelink.

pub mod auth;
pub mod feed;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::YouTubeClient;
use crate::auth::{AuthService, CredentialStoreConfig, DeviceCodeAuthorizer, FileCredentialStore};
use crate::config::OAuthConfig;
use crate::error::TubeError;

/// tubelink CLI
#[derive(Parser, Debug)]
#[command(name = "tubelink", version, about = "Sign in to YouTube from the terminal")]
pub struct Cli {
    /// Path to oauth.toml (defaults to ~/.tubelink/oauth.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the stored credential (defaults to ~/.tubelink)
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// Query the signed-in account's feeds
    Feed(FeedArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with a device code
    Login,
    /// Show authentication status
    Status,
    /// Forget the stored credential
    Logout,
    /// Exchange the stored refresh token for a new access token
    Refresh,
}

/// Arguments for the `feed` subcommand group.
#[derive(Parser, Debug)]
pub struct FeedArgs {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: FeedCommands,
}

/// Feed subcommands.
#[derive(Subcommand, Debug)]
pub enum FeedCommands {
    /// Latest uploads from your subscriptions
    Subscriptions,
    /// Your playlists
    Playlists,
    /// Videos in one playlist
    Playlist(PlaylistArgs),
    /// Uploads from your home activity feed
    Recommendations,
}

/// Arguments for `tubelink feed playlist`.
#[derive(Parser, Debug)]
pub struct PlaylistArgs {
    /// Playlist id (e.g. PLxxxxxxxx)
    pub playlist_id: String,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Services wired from CLI flags, built once per invocation.
///
/// OAuth client configuration is resolved lazily so `status` and `logout`
/// work without it.
pub struct Context {
    config_path: Option<PathBuf>,
    client: reqwest::Client,
    store: Arc<FileCredentialStore>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, TubeError> {
        let store_dir = cli
            .store_dir
            .clone()
            .unwrap_or_else(CredentialStoreConfig::default_dir);
        Ok(Self {
            config_path: cli.config.clone(),
            client: crate::http::build_client()?,
            store: Arc::new(FileCredentialStore::new(CredentialStoreConfig::new(store_dir))),
        })
    }

    pub fn config(&self) -> Result<OAuthConfig, TubeError> {
        match &self.config_path {
            Some(path) => OAuthConfig::load_from_path(path),
            None => OAuthConfig::load(),
        }
    }

    pub fn store(&self) -> &FileCredentialStore {
        &self.store
    }

    pub fn auth_service(&self) -> Result<AuthService, TubeError> {
        Ok(self.auth_service_for(&self.config()?))
    }

    pub fn youtube(&self) -> Result<YouTubeClient, TubeError> {
        let config = self.config()?;
        let auth = self.auth_service_for(&config);
        Ok(YouTubeClient::new(self.client.clone(), &config, auth))
    }

    fn auth_service_for(&self, config: &OAuthConfig) -> AuthService {
        let authorizer = DeviceCodeAuthorizer::new(self.client.clone(), config);
        AuthService::new(Arc::new(authorizer), self.store.clone())
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "warn",
        1 => "tubelink=info",
        2 => "tubelink=debug",
        _ => "tubelink=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .try_init();
}
