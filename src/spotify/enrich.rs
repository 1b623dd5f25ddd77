use std::collections::{HashMap, HashSet};

use crate::{
    info,
    spotify::SpotifyApi,
    success,
    types::{Artist, AudioFeatures, DecoratedTrack, Genres, Track},
    warning,
};

/// Most artist ids `GET /artists` accepts at once.
pub const ARTIST_BATCH_SIZE: usize = 50;
/// Most track ids `GET /audio-features` accepts at once.
pub const AUDIO_FEATURES_BATCH_SIZE: usize = 100;

/// Attaches artist genres and audio features to tracks.
///
/// Lookups are best effort: a failed batch is logged and skipped, and the
/// tracks it covered stay unclassified or without features.
pub struct MetadataEnricher<'a> {
    api: &'a dyn SpotifyApi,
}

impl<'a> MetadataEnricher<'a> {
    pub fn new(api: &'a dyn SpotifyApi) -> Self {
        Self { api }
    }

    /// Decorates `tracks`; `output[i]` always belongs to `tracks[i]`.
    pub async fn decorate(&self, tracks: &[Track]) -> Vec<DecoratedTrack> {
        info!("Loading artist genre information...");
        let genres = self.genre_map(tracks).await;

        info!("Loading audio features...");
        let features = self.audio_feature_map(tracks).await;

        let decorated: Vec<DecoratedTrack> = tracks
            .iter()
            .map(|track| DecoratedTrack {
                track: track.clone(),
                genres: genres.get(&track.artist_id).cloned().unwrap_or_default(),
                audio_features: features.get(&track.id).cloned(),
            })
            .collect();

        success!(
            "Decorated {} tracks ({} artists classified, {} with audio features)",
            decorated.len(),
            genres.len(),
            features.len()
        );
        decorated
    }

    /// Looks up the distinct primary artists of `tracks`.
    ///
    /// Returned in first-seen order; artists the provider has no record of are
    /// left out.
    pub async fn artists_for_tracks(&self, tracks: &[Track]) -> Vec<Artist> {
        let ids = distinct_artist_ids(tracks);
        let mut artists = Vec::with_capacity(ids.len());

        for (index, chunk) in ids.chunks(ARTIST_BATCH_SIZE).enumerate() {
            let start = index * ARTIST_BATCH_SIZE;
            info!(
                "Loading artist chunk {}-{}...",
                start,
                start + chunk.len()
            );

            match self.api.artists(chunk).await {
                Ok(batch) => artists.extend(batch.into_iter().flatten()),
                Err(e) => warning!(
                    "Skipping artist chunk {}-{}: {}",
                    start,
                    start + chunk.len(),
                    e
                ),
            }
        }

        artists
    }

    async fn genre_map(&self, tracks: &[Track]) -> HashMap<String, Genres> {
        self.artists_for_tracks(tracks)
            .await
            .into_iter()
            .map(|artist| (artist.id, Genres::Classified(artist.genres)))
            .collect()
    }

    async fn audio_feature_map(&self, tracks: &[Track]) -> HashMap<String, AudioFeatures> {
        let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
        let mut features = HashMap::with_capacity(ids.len());

        for (index, chunk) in ids.chunks(AUDIO_FEATURES_BATCH_SIZE).enumerate() {
            let start = index * AUDIO_FEATURES_BATCH_SIZE;

            match self.api.audio_features(chunk).await {
                Ok(batch) => {
                    for feature in batch.into_iter().flatten() {
                        features.insert(feature.id.clone(), feature);
                    }
                }
                Err(e) => warning!(
                    "Skipping audio feature chunk {}-{}: {}",
                    start,
                    start + chunk.len(),
                    e
                ),
            }
        }

        features
    }
}

/// Primary artist ids of `tracks`, each once, in first-seen order.
pub fn distinct_artist_ids(tracks: &[Track]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ids = Vec::new();
    for track in tracks {
        if seen.insert(track.artist_id.as_str()) {
            ids.push(track.artist_id.clone());
        }
    }
    ids
}
