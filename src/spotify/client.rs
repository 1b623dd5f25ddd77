use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

use crate::{
    error::ProviderError,
    spotify::{AuthSession, SpotifyApi},
    types::{
        AddTrackToPlaylistRequest, Artist, AudioFeatures, GetSeveralArtistsResponse,
        GetSeveralAudioFeaturesResponse, PlaylistSnapshot, RemoveTracksByPositionRequest,
        SavedTracksPage, SnapshotResponse,
    },
    warning,
};

pub const MAX_ATTEMPTS: u32 = 5;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// reqwest implementation of [`SpotifyApi`].
///
/// Each attempt reads the current access token from the session, so a refresh
/// that lands mid-pipeline is picked up by the next request.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    session: AuthSession,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>, session: AuthSession) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    async fn send<F>(&self, endpoint: &str, request: F) -> Result<Response, ProviderError>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let url = format!("{}{}", self.api_url, endpoint);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let token = self.session.access_token().await?;
            let response = request(&self.http, &url).bearer_auth(token).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if attempt < MAX_ATTEMPTS {
                if status == StatusCode::BAD_GATEWAY {
                    sleep(BAD_GATEWAY_DELAY).await;
                    continue; // retry
                }

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(1);

                    if retry_after > MAX_RETRY_AFTER_SECS {
                        return Err(ProviderError::RateLimited { retry_after });
                    }

                    warning!(
                        "Rate limited on {}, retrying in {} seconds",
                        endpoint,
                        retry_after
                    );
                    sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }
            }

            return Err(ProviderError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn saved_tracks(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<SavedTracksPage, ProviderError> {
        let endpoint = format!("/me/tracks?offset={}&limit={}", offset, limit);
        let response = self.send(&endpoint, |http, url| http.get(url)).await?;
        Ok(response.json::<SavedTracksPage>().await?)
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<Option<Artist>>, ProviderError> {
        let endpoint = format!("/artists?ids={}", ids.join(","));
        let response = self.send(&endpoint, |http, url| http.get(url)).await?;
        Ok(response.json::<GetSeveralArtistsResponse>().await?.artists)
    }

    async fn artist(&self, id: &str) -> Result<Artist, ProviderError> {
        let endpoint = format!("/artists/{}", id);
        let response = self.send(&endpoint, |http, url| http.get(url)).await?;
        Ok(response.json::<Artist>().await?)
    }

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, ProviderError> {
        let endpoint = format!("/audio-features?ids={}", track_ids.join(","));
        let response = self.send(&endpoint, |http, url| http.get(url)).await?;
        Ok(response
            .json::<GetSeveralAudioFeaturesResponse>()
            .await?
            .audio_features)
    }

    async fn playlist_snapshot(
        &self,
        playlist_id: &str,
    ) -> Result<PlaylistSnapshot, ProviderError> {
        let endpoint = format!("/playlists/{}?fields=snapshot_id,tracks.total", playlist_id);
        let response = self.send(&endpoint, |http, url| http.get(url)).await?;
        Ok(response.json::<PlaylistSnapshot>().await?)
    }

    async fn remove_playlist_positions(
        &self,
        playlist_id: &str,
        positions: &[u32],
        snapshot_id: &str,
    ) -> Result<String, ProviderError> {
        let endpoint = format!("/playlists/{}/tracks", playlist_id);
        let body = RemoveTracksByPositionRequest {
            positions: positions.to_vec(),
            snapshot_id: snapshot_id.to_string(),
        };
        let response = self
            .send(&endpoint, |http, url| http.delete(url).json(&body))
            .await?;
        Ok(response.json::<SnapshotResponse>().await?.snapshot_id)
    }

    async fn add_playlist_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<String, ProviderError> {
        let endpoint = format!("/playlists/{}/tracks", playlist_id);
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };
        let response = self
            .send(&endpoint, |http, url| http.post(url).json(&body))
            .await?;
        Ok(response.json::<SnapshotResponse>().await?.snapshot_id)
    }
}
