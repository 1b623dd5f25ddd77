use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Genre entry that makes a playlist rule match every track.
pub const WILDCARD_GENRE: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "expires")]
    pub expires_at_ms: i64,
}

impl Credential {
    pub fn from_token_response(
        response: TokenResponse,
        now_ms: i64,
        previous_refresh_token: Option<&str>,
    ) -> Self {
        let refresh_token = response
            .refresh_token
            .or_else(|| previous_refresh_token.map(str::to_string))
            .unwrap_or_default();

        Self {
            access_token: response.access_token,
            refresh_token,
            expires_at_ms: now_ms + (response.expires_in as i64) * 1000,
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at_ms < now_ms
    }

    pub fn remaining_at(&self, now_ms: i64) -> Duration {
        Duration::from_millis((self.expires_at_ms - now_ms).max(0) as u64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub artist_id: String,
    pub artist_name: String,
    pub album_name: String,
}

/// Genre classification of a track's primary artist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Genres {
    /// The artist lookup failed or returned nothing for this artist.
    #[default]
    Unclassified,
    Classified(Vec<String>),
}

impl Genres {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Genres::Unclassified => &[],
            Genres::Classified(genres) => genres,
        }
    }

    /// Unclassified tracks never intersect anything.
    pub fn intersects(&self, other: &[String]) -> bool {
        self.as_slice().iter().any(|g| other.contains(g))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub energy: f64,
    #[serde(default)]
    pub danceability: f64,
    #[serde(default)]
    pub valence: f64,
    #[serde(default)]
    pub tempo: f64,
    #[serde(default)]
    pub acousticness: f64,
    #[serde(default)]
    pub instrumentalness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedTrack {
    pub track: Track,
    pub genres: Genres,
    pub audio_features: Option<AudioFeatures>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyRange {
    pub min_energy: f64,
    pub max_energy: f64,
}

impl EnergyRange {
    pub fn contains(&self, energy: f64) -> bool {
        energy >= self.min_energy && energy <= self.max_energy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRule {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    #[serde(default)]
    pub ignored_genres: Vec<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub energy_range: Option<EnergyRange>,
}

impl PlaylistRule {
    pub fn matches_all_genres(&self) -> bool {
        self.genres.iter().any(|g| g == WILDCARD_GENRE)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistsFile {
    #[serde(default)]
    pub playlists: Vec<PlaylistRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub name: String,
    pub genres: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksPage {
    pub items: Vec<SavedTrackItem>,
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrackItem {
    pub track: Option<FullTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTrack {
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
    pub artists: Vec<SimpleArtist>,
    pub album: SimpleAlbum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleAlbum {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSeveralArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSeveralAudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSnapshot {
    pub snapshot_id: String,
    pub tracks: PlaylistTrackCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistTrackCount {
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksByPositionRequest {
    pub positions: Vec<u32>,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}
