//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify Web API, and the pipeline stages built
//! on top of it.
//!
//! ## Architecture
//!
//! ```text
//! Commands (reload, check, genres, info)
//!          ↓
//! Pipeline stages
//!     ├── LibraryFetcher      (saved tracks, offset pagination)
//!     ├── MetadataEnricher    (artist genres + audio features, batched)
//!     └── PlaylistReconciler  (filter, sort, clear, re-add)
//!          ↓
//! SpotifyApi trait ── SpotifyClient (reqwest, retries)
//!          ↓
//! AuthSession (live credential, background refresh) ── TokenStore
//! ```
//!
//! The stages only see the [`SpotifyApi`] trait, so tests drive them with
//! in-memory fakes.
//!
//! ## Rate Limiting
//!
//! - 502 Bad Gateway is retried after 10 seconds.
//! - 429 Too Many Requests is retried after `Retry-After` when that is at most
//!   two minutes; longer waits surface as [`ProviderError::RateLimited`].
//! - Requests are retried at most [`client::MAX_ATTEMPTS`] times.
//!
//! ## API Coverage
//!
//! - `GET /me/tracks` - saved tracks, offset pagination
//! - `GET /artists`, `GET /artists/{id}` - artist genres
//! - `GET /audio-features` - energy and friends
//! - `GET /playlists/{id}` - snapshot id and track count
//! - `DELETE /playlists/{id}/tracks` - remove by position
//! - `POST /playlists/{id}/tracks` - add tracks
//! - `POST /api/token` - code exchange and refresh (accounts service)

pub mod auth;
pub mod client;
pub mod enrich;
pub mod library;
pub mod playlist;

use async_trait::async_trait;

use crate::{
    error::ProviderError,
    types::{Artist, AudioFeatures, PlaylistSnapshot, SavedTracksPage},
};

pub use auth::{AuthSession, CredentialOrigin, OAuthClient, SpotifyAccounts};
pub use client::SpotifyClient;
pub use enrich::MetadataEnricher;
pub use library::LibraryFetcher;
pub use playlist::{PlaylistReconciler, ReconcileOutcome};

/// The Web API calls the curator makes, one method per endpoint.
///
/// Batch lookups return one entry per requested id, `None` where the provider
/// knows nothing about that id.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    async fn saved_tracks(&self, offset: u32, limit: u32) -> Result<SavedTracksPage, ProviderError>;

    async fn artists(&self, ids: &[String]) -> Result<Vec<Option<Artist>>, ProviderError>;

    async fn artist(&self, id: &str) -> Result<Artist, ProviderError>;

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, ProviderError>;

    async fn playlist_snapshot(&self, playlist_id: &str) -> Result<PlaylistSnapshot, ProviderError>;

    /// Removes the entries at `positions`, guarded by `snapshot_id`.
    /// Returns the new snapshot id.
    async fn remove_playlist_positions(
        &self,
        playlist_id: &str,
        positions: &[u32],
        snapshot_id: &str,
    ) -> Result<String, ProviderError>;

    /// Appends `uris` to the playlist. Returns the new snapshot id.
    async fn add_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<String, ProviderError>;
}
