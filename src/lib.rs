//! Spotify Genre Playlist Curator Library
//!
//! This library rebuilds Spotify playlists from the authenticated user's saved
//! tracks. Every track is decorated with the genres of its primary artist and
//! its audio features, then each configured playlist is filtered, sorted and
//! replaced on the provider side.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local login/callback server
//! - `cli` - Named commands (`reload`, `check`, `genres`, `info`) and their registry
//! - `config` - Environment configuration and playlist rules
//! - `error` - Error taxonomy shared by all layers
//! - `management` - Durable token cache
//! - `scheduler` - Self-rescheduling background tasks
//! - `server` - Local HTTP server for the OAuth authorization flow
//! - `spotify` - Provider client, auth session, fetcher, enricher, reconciler
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use genrefy::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> genrefy::Res<()> {
//!     config::load_env().await?;
//!     // Build a session and dispatch commands...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod scheduler;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for orchestration code that may fail.
///
/// Library components return their own error enums from [`error`]; this alias
/// is used at the edges (startup, server wiring) where any of them may surface.
///
/// # Example
///
/// ```
/// use genrefy::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Populating {} playlist(s)", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Playlist '{}' reconciled with {} tracks", name, count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for degraded but recoverable situations such as a skipped enrichment
/// batch or a refresh attempt that will be retried.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark.
///
/// Unlike [`fatal!`], the process keeps running. Command and playlist failures
/// are reported through this macro so one failure never takes down the daemon.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Reserved for unrecoverable startup states: missing configuration, an
/// unusable token cache in one-shot mode, a server that cannot bind.
///
/// # Example
///
/// ```
/// fatal!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! fatal {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}
