//! Error taxonomy.
//!
//! Each layer owns one enum. Provider and playlist failures are caught at the
//! smallest useful granularity (one batch, one playlist) by the callers; only
//! configuration errors and a second authorization attempt stop an operation.

use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Cannot read playlist configuration {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse playlist configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid playlist rule '{playlist}': {reason}")]
    InvalidRule { playlist: String, reason: String },
}

/// Why a cached credential could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMiss {
    Absent,
    Unparsable,
    Expired,
}

impl std::fmt::Display for CacheMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            CacheMiss::Absent => "no token cache file",
            CacheMiss::Unparsable => "token cache file is corrupt",
            CacheMiss::Expired => "cached token has expired",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("No usable token: {0}")]
    NotFound(CacheMiss),

    #[error("Token cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token cache serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("A credential is already installed; authorization can only happen once")]
    AlreadyAuthorized,

    #[error("Not authorized yet. Run `genrefy auth` or open /login")]
    NotAuthorized,

    #[error("Authorization code exchange failed: {0}")]
    Exchange(String),

    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("Accounts service request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify answered {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("Rate limited for {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Cannot read playlist '{playlist}': {source}")]
    Snapshot {
        playlist: String,
        #[source]
        source: ProviderError,
    },

    #[error("Cannot clear playlist '{playlist}': {source}")]
    Clear {
        playlist: String,
        #[source]
        source: ProviderError,
    },

    #[error("Cannot add tracks {}-{} to playlist '{playlist}': {source}", range.start, range.end)]
    Add {
        playlist: String,
        range: Range<usize>,
        #[source]
        source: ProviderError,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Illegal arguments, usage: {0}")]
    Usage(&'static str),

    #[error("Unknown command '{0}'")]
    Unknown(String),

    #[error("A reload is already running")]
    Busy,

    #[error("{stage} failed: {source}")]
    Provider {
        stage: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("Cannot write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot write CSV: {0}")]
    Csv(#[from] csv::Error),
}
