use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    error::ProviderError,
    spotify::SpotifyApi,
    types::{SavedTrackItem, Track},
    warning,
};

/// Largest page the saved-tracks endpoint hands out.
pub const SAVED_TRACKS_PAGE_SIZE: u32 = 50;

pub struct LibraryFetcher<'a> {
    api: &'a dyn SpotifyApi,
    page_size: u32,
}

impl<'a> LibraryFetcher<'a> {
    pub fn new(api: &'a dyn SpotifyApi) -> Self {
        Self {
            api,
            page_size: SAVED_TRACKS_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Pulls the whole saved-track library in provider order.
    ///
    /// The offset advances by the number of items the provider actually
    /// returned, until it reports no further page.
    pub async fn fetch_all_saved_tracks(&self) -> Result<Vec<Track>, ProviderError> {
        let pb = ProgressBar::new_spinner();
        pb.set_message("Loading saved tracks...");
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        let mut tracks = Vec::new();
        let mut offset: u32 = 0;

        loop {
            pb.set_message(format!("Loading tracks with offset: {}", offset));

            let page = match self.api.saved_tracks(offset, self.page_size).await {
                Ok(page) => page,
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e);
                }
            };

            let returned = page.items.len() as u32;
            tracks.extend(page.items.into_iter().filter_map(into_track));
            offset += returned;

            if page.next.is_none() || returned == 0 {
                break;
            }
        }

        pb.finish_and_clear();
        Ok(tracks)
    }
}

fn into_track(item: SavedTrackItem) -> Option<Track> {
    let track = item.track?;

    let Some(id) = track.id else {
        warning!("Skipping saved track '{}' without an id", track.name);
        return None;
    };

    let Some(artist) = track.artists.into_iter().next() else {
        warning!("Skipping saved track '{}' without artists", track.name);
        return None;
    };

    let Some(artist_id) = artist.id else {
        warning!(
            "Skipping saved track '{}' whose artist '{}' has no id",
            track.name,
            artist.name
        );
        return None;
    };

    Some(Track {
        id,
        uri: track.uri,
        name: track.name,
        artist_id,
        artist_name: artist.name,
        album_name: track.album.name,
    })
}
