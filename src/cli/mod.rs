//! # CLI Module
//!
//! The operator-facing commands and the registry that dispatches them by name.
//!
//! ## Commands
//!
//! - [`Reload`] - fetch, decorate, and reconcile every configured playlist
//! - [`Check`] - list artists whose genres no playlist rule picks up
//! - [`ExportGenres`] - export `"artist","genres"` CSV for the whole library
//! - [`Info`] - print one artist's genres
//!
//! Every command implements [`Command`]; the [`CommandRegistry`] maps names to
//! implementations. The same registry serves the one-shot CLI subcommands,
//! the interactive stdin loop of `genrefy serve`, and the daily schedule.
//!
//! ## Error Handling Philosophy
//!
//! A failing command is logged and the process carries on. Inside `reload`
//! failures are contained even further: a skipped enrichment batch only
//! loses metadata, a failed playlist only stops that playlist.
//!
//! ## Usage Patterns
//!
//! ```bash
//! genrefy auth                 # authorize once, caches the token
//! genrefy reload               # rebuild every playlist now
//! genrefy check                # which artists fall through the rules?
//! genrefy genres -o out.csv    # artist/genre export
//! genrefy info https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF
//! genrefy serve                # daemon: daily reload + stdin commands
//! ```

mod auth;
mod check;
mod genres;
mod info;
mod reload;

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::{
    config,
    error::CommandError,
    spotify::SpotifyApi,
    types::PlaylistRule,
    warning,
};

pub use auth::auth;
pub use check::{Check, unmapped_artists};
pub use genres::{ExportGenres, write_genres_csv};
pub use info::Info;
pub use reload::{Reload, ReloadSummary, run_pipeline};

/// A named operation the operator can trigger.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn usage(&self) -> &'static str;

    /// Runs the command. `args` excludes the command name.
    async fn execute(&self, args: &[String]) -> Result<(), CommandError>;
}

/// Shared state every command works against.
pub struct AppContext {
    pub api: Arc<dyn SpotifyApi>,
    rules: RwLock<Vec<PlaylistRule>>,
    playlists_path: Option<PathBuf>,
    pipeline: Mutex<()>,
}

impl AppContext {
    /// Context with a fixed rule set.
    pub fn new(api: Arc<dyn SpotifyApi>, rules: Vec<PlaylistRule>) -> Self {
        Self {
            api,
            rules: RwLock::new(rules),
            playlists_path: None,
            pipeline: Mutex::new(()),
        }
    }

    /// Context that re-reads the playlist file before every reload, so rule
    /// edits apply without restarting the daemon.
    pub fn with_playlists_file(
        api: Arc<dyn SpotifyApi>,
        rules: Vec<PlaylistRule>,
        path: PathBuf,
    ) -> Self {
        Self {
            playlists_path: Some(path),
            ..Self::new(api, rules)
        }
    }

    /// Current rules, refreshed from the playlist file when one is attached.
    /// An unreadable file keeps the last good rules.
    pub async fn rules(&self) -> Vec<PlaylistRule> {
        if let Some(path) = &self.playlists_path {
            match config::load_playlists(path).await {
                Ok(rules) => *self.rules.write().await = rules,
                Err(e) => warning!("Keeping previous playlist rules: {}", e),
            }
        }
        self.rules.read().await.clone()
    }

    /// Claims the single pipeline slot, or reports that a run is active.
    pub fn try_claim_pipeline(&self) -> Result<MutexGuard<'_, ()>, CommandError> {
        self.pipeline.try_lock().map_err(|_| CommandError::Busy)
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `reload`, `check`, `genres` and `info`.
    pub fn with_defaults(ctx: Arc<AppContext>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Reload::new(Arc::clone(&ctx))));
        registry.register(Arc::new(Check::new(Arc::clone(&ctx))));
        registry.register(Arc::new(ExportGenres::new(Arc::clone(&ctx))));
        registry.register(Arc::new(Info::new(ctx)));
        registry
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.insert(command.name(), command);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub async fn execute(&self, name: &str, args: &[String]) -> Result<(), CommandError> {
        match self.get(name) {
            Some(command) => command.execute(args).await,
            None => Err(CommandError::Unknown(name.to_string())),
        }
    }

    /// Runs one line of operator input such as `info 0OdUWJ0sBjDrqHygGUXeCF`.
    ///
    /// Failures are logged, never propagated. Returns `false` for blank or
    /// unknown input.
    pub async fn dispatch_line(&self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return false;
        };
        let args: Vec<String> = parts.map(str::to_string).collect();

        match self.execute(name, &args).await {
            Ok(()) => true,
            Err(e @ CommandError::Unknown(_)) => {
                crate::error!("{}. Available: {}", e, self.names().join(", "));
                false
            }
            Err(e) => {
                crate::error!("Failed to execute {}: {}", name, e);
                true
            }
        }
    }
}
