#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use genrefy::{
    error::ProviderError,
    spotify::SpotifyApi,
    types::{
        Artist, AudioFeatures, DecoratedTrack, FullTrack, Genres, PlaylistRule, PlaylistSnapshot,
        PlaylistTrackCount, SavedTrackItem, SavedTracksPage, SimpleAlbum, SimpleArtist, Track,
    },
};

/// Every call the fake received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SavedTracks { offset: u32, limit: u32 },
    Artists(Vec<String>),
    Artist(String),
    AudioFeatures(Vec<String>),
    Snapshot(String),
    Remove {
        playlist: String,
        positions: Vec<u32>,
        snapshot: String,
    },
    Add { playlist: String, uris: Vec<String> },
}

/// In-memory Spotify account: a saved library, artist and audio feature
/// catalogs, and playlists that really change when tracks are added/removed.
#[derive(Default)]
pub struct FakeSpotify {
    pub library: Vec<SavedTrackItem>,
    /// Caps the page size regardless of the requested limit.
    pub max_page: Option<usize>,
    pub artists: HashMap<String, Artist>,
    pub features: HashMap<String, AudioFeatures>,
    /// Zero-based indexes of `artists` calls that fail.
    pub failing_artist_batches: HashSet<usize>,
    /// Zero-based indexes of `audio_features` calls that fail.
    pub failing_feature_batches: HashSet<usize>,
    /// Playlists whose snapshot lookup fails.
    pub failing_playlists: HashSet<String>,
    pub playlists: Mutex<HashMap<String, Vec<String>>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeSpotify {
    pub fn with_library(tracks: &[Track]) -> Self {
        Self {
            library: tracks.iter().map(saved).collect(),
            ..Self::default()
        }
    }

    pub fn add_artist(&mut self, id: &str, name: &str, genres: &[&str]) {
        self.artists.insert(id.to_string(), artist(id, name, genres));
    }

    pub fn add_features(&mut self, track_id: &str, energy: f64) {
        self.features
            .insert(track_id.to_string(), features(track_id, energy));
    }

    pub fn set_playlist(&self, id: &str, uris: &[&str]) {
        self.playlists.lock().unwrap().insert(
            id.to_string(),
            uris.iter().map(|u| u.to_string()).collect(),
        );
    }

    pub fn playlist(&self, id: &str) -> Vec<String> {
        self.playlists
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }

    fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    fn failure(endpoint: &str) -> ProviderError {
        ProviderError::Status {
            status: 500,
            endpoint: endpoint.to_string(),
        }
    }

    fn snapshot_id(uris: &[String]) -> String {
        format!("snapshot-{}", uris.len())
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn saved_tracks(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<SavedTracksPage, ProviderError> {
        self.record(Call::SavedTracks { offset, limit });

        let page = self.max_page.map_or(limit as usize, |max| max.min(limit as usize));
        let start = (offset as usize).min(self.library.len());
        let end = (start + page).min(self.library.len());

        Ok(SavedTracksPage {
            items: self.library[start..end].to_vec(),
            next: (end < self.library.len()).then(|| format!("next?offset={}", end)),
            total: Some(self.library.len() as u64),
        })
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<Option<Artist>>, ProviderError> {
        let batch = self.count(|c| matches!(c, Call::Artists(_)));
        self.record(Call::Artists(ids.to_vec()));
        if self.failing_artist_batches.contains(&batch) {
            return Err(Self::failure("/artists"));
        }
        Ok(ids.iter().map(|id| self.artists.get(id).cloned()).collect())
    }

    async fn artist(&self, id: &str) -> Result<Artist, ProviderError> {
        self.record(Call::Artist(id.to_string()));
        self.artists
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::Status {
                status: 404,
                endpoint: format!("/artists/{}", id),
            })
    }

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, ProviderError> {
        let batch = self.count(|c| matches!(c, Call::AudioFeatures(_)));
        self.record(Call::AudioFeatures(track_ids.to_vec()));
        if self.failing_feature_batches.contains(&batch) {
            return Err(Self::failure("/audio-features"));
        }
        Ok(track_ids
            .iter()
            .map(|id| self.features.get(id).cloned())
            .collect())
    }

    async fn playlist_snapshot(
        &self,
        playlist_id: &str,
    ) -> Result<PlaylistSnapshot, ProviderError> {
        self.record(Call::Snapshot(playlist_id.to_string()));
        if self.failing_playlists.contains(playlist_id) {
            return Err(Self::failure("/playlists"));
        }

        let uris = self.playlist(playlist_id);
        Ok(PlaylistSnapshot {
            snapshot_id: Self::snapshot_id(&uris),
            tracks: PlaylistTrackCount {
                total: uris.len() as u32,
            },
        })
    }

    async fn remove_playlist_positions(
        &self,
        playlist_id: &str,
        positions: &[u32],
        snapshot_id: &str,
    ) -> Result<String, ProviderError> {
        self.record(Call::Remove {
            playlist: playlist_id.to_string(),
            positions: positions.to_vec(),
            snapshot: snapshot_id.to_string(),
        });

        let mut playlists = self.playlists.lock().unwrap();
        let uris = playlists.entry(playlist_id.to_string()).or_default();
        let kept: Vec<String> = uris
            .iter()
            .enumerate()
            .filter(|(i, _)| !positions.contains(&(*i as u32)))
            .map(|(_, uri)| uri.clone())
            .collect();
        *uris = kept;
        Ok(Self::snapshot_id(uris))
    }

    async fn add_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<String, ProviderError> {
        self.record(Call::Add {
            playlist: playlist_id.to_string(),
            uris: uris.to_vec(),
        });

        let mut playlists = self.playlists.lock().unwrap();
        let current = playlists.entry(playlist_id.to_string()).or_default();
        current.extend(uris.iter().cloned());
        Ok(Self::snapshot_id(current))
    }
}

pub fn track(id: &str, artist_id: &str, artist_name: &str, album_name: &str) -> Track {
    Track {
        id: id.to_string(),
        uri: format!("spotify:track:{}", id),
        name: format!("Song {}", id),
        artist_id: artist_id.to_string(),
        artist_name: artist_name.to_string(),
        album_name: album_name.to_string(),
    }
}

pub fn saved(track: &Track) -> SavedTrackItem {
    SavedTrackItem {
        track: Some(FullTrack {
            id: Some(track.id.clone()),
            uri: track.uri.clone(),
            name: track.name.clone(),
            artists: vec![SimpleArtist {
                id: Some(track.artist_id.clone()),
                name: track.artist_name.clone(),
            }],
            album: SimpleAlbum {
                name: track.album_name.clone(),
            },
        }),
    }
}

pub fn artist(id: &str, name: &str, genres: &[&str]) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

pub fn features(track_id: &str, energy: f64) -> AudioFeatures {
    AudioFeatures {
        id: track_id.to_string(),
        energy,
        danceability: 0.5,
        valence: 0.5,
        tempo: 120.0,
        acousticness: 0.1,
        instrumentalness: 0.0,
    }
}

/// A decorated track; `genres: None` means unclassified.
pub fn decorated(
    id: &str,
    artist_name: &str,
    album_name: &str,
    genres: Option<&[&str]>,
    energy: Option<f64>,
) -> DecoratedTrack {
    DecoratedTrack {
        track: track(id, &format!("{}-id", artist_name), artist_name, album_name),
        genres: match genres {
            Some(genres) => Genres::Classified(genres.iter().map(|g| g.to_string()).collect()),
            None => Genres::Unclassified,
        },
        audio_features: energy.map(|e| features(id, e)),
    }
}

pub fn rule(id: &str, name: &str, genres: &[&str]) -> PlaylistRule {
    PlaylistRule {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        ignored_genres: Vec::new(),
        artists: Vec::new(),
        energy_range: None,
    }
}

pub fn ids(tracks: &[&DecoratedTrack]) -> Vec<String> {
    tracks.iter().map(|t| t.track.id.clone()).collect()
}
