use std::collections::HashSet;

use crate::{
    error::ReconcileError,
    info,
    spotify::SpotifyApi,
    success,
    types::{DecoratedTrack, PlaylistRule},
    utils,
};

/// Most URIs `POST /playlists/{id}/tracks` accepts at once.
pub const ADD_TRACKS_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub removed: u32,
    pub added: usize,
}

/// Rebuilds configured playlists from a decorated library.
pub struct PlaylistReconciler<'a> {
    api: &'a dyn SpotifyApi,
}

impl<'a> PlaylistReconciler<'a> {
    pub fn new(api: &'a dyn SpotifyApi) -> Self {
        Self { api }
    }

    /// Replaces the contents of `rule`'s playlist with the tracks it selects.
    ///
    /// The old entries are removed by position in one call guarded by the
    /// playlist's snapshot id, then the selection is appended in batches of
    /// [`ADD_TRACKS_BATCH_SIZE`] keeping its order.
    pub async fn reconcile(
        &self,
        rule: &PlaylistRule,
        tracks: &[DecoratedTrack],
    ) -> Result<ReconcileOutcome, ReconcileError> {
        info!("Populating playlist '{}'", rule.name);

        let selected = select_tracks(rule, tracks);

        let snapshot = self
            .api
            .playlist_snapshot(&rule.id)
            .await
            .map_err(|source| ReconcileError::Snapshot {
                playlist: rule.name.clone(),
                source,
            })?;

        let removed = snapshot.tracks.total;
        if removed > 0 {
            let positions: Vec<u32> = (0..removed).collect();
            self.api
                .remove_playlist_positions(&rule.id, &positions, &snapshot.snapshot_id)
                .await
                .map_err(|source| ReconcileError::Clear {
                    playlist: rule.name.clone(),
                    source,
                })?;
        }

        let uris: Vec<String> = selected.iter().map(|t| t.track.uri.clone()).collect();
        for (index, chunk) in uris.chunks(ADD_TRACKS_BATCH_SIZE).enumerate() {
            let start = index * ADD_TRACKS_BATCH_SIZE;
            let range = start..start + chunk.len();
            info!("Populating chunk {}-{}...", range.start, range.end);

            self.api
                .add_playlist_tracks(&rule.id, chunk)
                .await
                .map_err(|source| ReconcileError::Add {
                    playlist: rule.name.clone(),
                    range,
                    source,
                })?;
        }

        success!(
            "Playlist '{}' now holds {} tracks (removed {})",
            rule.name,
            uris.len(),
            removed
        );

        Ok(ReconcileOutcome {
            removed,
            added: uris.len(),
        })
    }

    /// Reconciles every rule in order. A failing playlist is logged and
    /// skipped; the others still run.
    pub async fn reconcile_all(
        &self,
        rules: &[PlaylistRule],
        tracks: &[DecoratedTrack],
    ) -> Vec<(String, Result<ReconcileOutcome, ReconcileError>)> {
        info!("Populating {} playlist(s)", rules.len());

        let mut results = Vec::with_capacity(rules.len());
        for rule in rules {
            let result = self.reconcile(rule, tracks).await;
            if let Err(e) = &result {
                crate::error!("{}", e);
            }
            results.push((rule.name.clone(), result));
        }
        results
    }
}

/// The tracks `rule` puts into its playlist, in playlist order.
///
/// 1. genre filter (wildcard keeps everything, unclassified never matches)
/// 2. pinned artists are added back regardless of genre
/// 3. ignored genres veto, even for pinned artists
/// 4. energy range, when configured, requires audio features
/// 5. stable sort by artist name, then album name
pub fn select_tracks<'t>(
    rule: &PlaylistRule,
    tracks: &'t [DecoratedTrack],
) -> Vec<&'t DecoratedTrack> {
    let match_all = rule.matches_all_genres();
    let mut seen: HashSet<&str> = HashSet::new();

    let mut selected: Vec<&DecoratedTrack> = tracks
        .iter()
        .filter(|t| {
            match_all
                || t.genres.intersects(&rule.genres)
                || rule.artists.contains(&t.track.artist_name)
        })
        .filter(|t| seen.insert(t.track.id.as_str()))
        .filter(|t| !t.genres.intersects(&rule.ignored_genres))
        .filter(|t| match rule.energy_range {
            None => true,
            Some(range) => t
                .audio_features
                .as_ref()
                .is_some_and(|f| range.contains(f.energy)),
        })
        .collect();

    selected.sort_by(|a, b| {
        utils::locale_cmp(&a.track.artist_name, &b.track.artist_name)
            .then_with(|| utils::locale_cmp(&a.track.album_name, &b.track.album_name))
    });

    selected
}
