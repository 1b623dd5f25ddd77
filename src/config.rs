//! Configuration management for the genre playlist curator.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files, and loading the playlist rules that drive each
//! reload.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::{
    error::ConfigError,
    types::{PlaylistRule, PlaylistsFile},
};

const APP_DIR: &str = "genrefy";

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Everything the auth session and the API client need to talk to Spotify.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub token_cache_path: PathBuf,
}

impl SpotifyConfig {
    /// Collects the Spotify settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] naming the first required variable
    /// that is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: spotify_client_id()?,
            client_secret: spotify_client_secret()?,
            redirect_uri: spotify_redirect_uri()?,
            scopes: spotify_scope()?
                .split([' ', ','])
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
            token_cache_path: token_cache_path(),
        })
    }
}

/// Returns the application's directory inside the platform data directory.
///
/// - Linux: `~/.local/share/genrefy`
/// - macOS: `~/Library/Application Support/genrefy`
/// - Windows: `%LOCALAPPDATA%/genrefy`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the data directory if it doesn't exist. A missing `.env` file is
/// not an error: every variable may also come from the process environment.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the `.env`
/// file exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key))
}

fn optional(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Returns the bind address of the local login server (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the Spotify API client ID (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret (`SPOTIFY_API_AUTH_CLIENT_SECRET`).
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Returns the OAuth redirect URI (`SPOTIFY_API_REDIRECT_URI`).
///
/// This must match the redirect URI registered in the Spotify application
/// settings and point at this process' `/callback` route, e.g.
/// `http://127.0.0.1:8888/callback`.
pub fn spotify_redirect_uri() -> Result<String, ConfigError> {
    required("SPOTIFY_API_REDIRECT_URI")
}

/// Returns the requested scopes (`SPOTIFY_API_AUTH_SCOPE`), space or comma separated.
///
/// Reloading needs `user-library-read playlist-read-private
/// playlist-modify-public playlist-modify-private`.
pub fn spotify_scope() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_SCOPE")
}

pub fn spotify_apiauth_url() -> String {
    optional("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Location of the persisted credential (`TOKEN_CACHE_PATH`).
pub fn token_cache_path() -> PathBuf {
    match env::var("TOKEN_CACHE_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => data_dir().join("cache/token.json"),
    }
}

/// Location of the playlist rules file (`PLAYLISTS_CONFIG`).
pub fn playlists_path() -> PathBuf {
    match env::var("PLAYLISTS_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => data_dir().join("playlists.toml"),
    }
}

/// Reads and validates the playlist rules file.
///
/// The file is TOML with one `[[playlists]]` table per target playlist:
///
/// ```toml
/// [[playlists]]
/// id = "37i9dQZF1DXcBWIGoYBM5M"
/// name = "Rock"
/// genres = ["rock", "classic rock"]
/// ignored_genres = ["pop rock"]
/// artists = ["Queen"]
/// energy_range = { min_energy = 0.6, max_energy = 1.0 }
/// ```
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid TOML, or any rule is invalid.
pub async fn load_playlists(path: &std::path::Path) -> Result<Vec<PlaylistRule>, ConfigError> {
    let content = async_fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse_playlists(&content)
}

pub fn parse_playlists(content: &str) -> Result<Vec<PlaylistRule>, ConfigError> {
    let file: PlaylistsFile = toml::from_str(content)?;
    for rule in &file.playlists {
        validate_rule(rule)?;
    }
    Ok(file.playlists)
}

fn validate_rule(rule: &PlaylistRule) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRule {
        playlist: if rule.name.is_empty() {
            rule.id.clone()
        } else {
            rule.name.clone()
        },
        reason: reason.to_string(),
    };

    if rule.id.trim().is_empty() {
        return Err(invalid("missing playlist id"));
    }
    if rule.name.trim().is_empty() {
        return Err(invalid("missing playlist name"));
    }
    if rule.genres.is_empty() {
        return Err(invalid("at least one genre (or \"*\") is required"));
    }
    if let Some(range) = rule.energy_range {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(range.min_energy) || !in_unit(range.max_energy) {
            return Err(invalid("energy bounds must be within 0.0 and 1.0"));
        }
        if range.min_energy > range.max_energy {
            return Err(invalid("min_energy is greater than max_energy"));
        }
    }
    Ok(())
}
