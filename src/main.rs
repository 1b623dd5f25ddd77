use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio::io::{AsyncBufReadExt, BufReader};

use genrefy::{
    cli::{self, AppContext, CommandRegistry},
    config::{self, SpotifyConfig},
    error, fatal, info,
    management::TokenStore,
    scheduler,
    spotify::{AuthSession, SpotifyAccounts, SpotifyClient},
    success,
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
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run as a daemon: authorize if needed, reload daily, read commands from stdin
    Serve,

    /// Authorize with Spotify API
    Auth,

    /// Rebuild every configured playlist now
    Reload,

    /// List artists whose genres no playlist rule covers
    Check,

    /// Export artist genres as CSV
    Genres(GenresOptions),

    /// Show the genres of one artist
    Info(InfoOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct GenresOptions {
    /// Output file
    #[clap(long, short)]
    output: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct InfoOptions {
    /// Artist ID or open.spotify.com artist link
    artist: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        fatal!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let spotify_config = match SpotifyConfig::from_env() {
        Ok(c) => c,
        Err(e) => fatal!("{}", e),
    };
    let store = Arc::new(TokenStore::new(spotify_config.token_cache_path.clone()));
    let session = AuthSession::new(
        &spotify_config,
        Arc::new(SpotifyAccounts::new(&spotify_config)),
        store,
    );

    match cli.command {
        Command::Serve => serve(&spotify_config, session).await,
        Command::Auth => authorize(session).await,
        Command::Reload => one_shot(&spotify_config, session, "reload", Vec::new()).await,
        Command::Check => one_shot(&spotify_config, session, "check", Vec::new()).await,
        Command::Genres(opt) => {
            let args = opt.output.into_iter().collect();
            one_shot(&spotify_config, session, "genres", args).await
        }
        Command::Info(opt) => one_shot(&spotify_config, session, "info", vec![opt.artist]).await,
        Command::Completions(_) => {}
    }
}

async fn authorize(session: AuthSession) {
    if session.restore().await.is_ok() {
        success!("Already authorized, cached token is still valid.");
        session.shutdown();
        return;
    }

    if let Err(e) = cli::auth(session.clone(), &config::server_addr()).await {
        fatal!("Authentication failed: {}", e);
    }
    session.shutdown();
}

async fn build_context(spotify_config: &SpotifyConfig, session: &AuthSession) -> Arc<AppContext> {
    let path = config::playlists_path();
    let rules = match config::load_playlists(&path).await {
        Ok(rules) => rules,
        Err(e) => fatal!("{}", e),
    };
    let api = Arc::new(SpotifyClient::new(
        spotify_config.api_url.clone(),
        session.clone(),
    ));
    Arc::new(AppContext::with_playlists_file(api, rules, path))
}

async fn one_shot(
    spotify_config: &SpotifyConfig,
    session: AuthSession,
    name: &str,
    args: Vec<String>,
) {
    if let Err(e) = session.restore().await {
        fatal!(
            "Failed to load token. Please run genrefy auth\n Error: {}",
            e
        );
    }

    let ctx = build_context(spotify_config, &session).await;
    let registry = CommandRegistry::with_defaults(ctx);
    let result = registry.execute(name, &args).await;
    session.shutdown();

    if let Err(e) = result {
        fatal!("Failed to execute {}: {}", name, e);
    }
}

async fn serve(spotify_config: &SpotifyConfig, session: AuthSession) {
    if let Err(e) = session.restore().await {
        info!("{}, starting authorization", e);
        if let Err(e) = cli::auth(session.clone(), &config::server_addr()).await {
            fatal!("Authentication failed: {}", e);
        }
    }

    let ctx = build_context(spotify_config, &session).await;
    let registry = Arc::new(CommandRegistry::with_defaults(ctx));

    let daily = {
        let registry = Arc::clone(&registry);
        scheduler::daily(move || {
            let registry = Arc::clone(&registry);
            async move {
                info!("Running scheduled reload");
                registry.dispatch_line("reload").await;
            }
        })
    };
    success!(
        "Daily reload scheduled. Commands: {}",
        registry.names().join(", ")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let registry = Arc::clone(&registry);
                    tokio::spawn(async move {
                        registry.dispatch_line(line.trim()).await;
                    });
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Cannot read from stdin: {}", e);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Shutting down");
    daily.cancel();
    session.shutdown();
}
