use std::collections::HashMap;

use super::TrackSource;
use crate::{catalog::embedded_offline_tracks, error::FetchError, track::Track};

/// Tracks held in memory, keyed by playlist id
#[derive(Debug, Clone, Default)]
pub struct OfflineSource {
    playlists: HashMap<String, Vec<Track>>,
}

impl OfflineSource {
    pub fn new(playlists: HashMap<String, Vec<Track>>) -> Self {
        Self { playlists }
    }

    pub fn embedded() -> Self {
        Self::new(embedded_offline_tracks())
    }
}

impl TrackSource for OfflineSource {
    fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError> {
        let tracks: Vec<Track> = self
            .playlists
            .get(playlist_id)
            .into_iter()
            .flatten()
            .filter(|t| !t.preview_url.is_empty())
            .cloned()
            .collect();

        if tracks.is_empty() {
            return Err(FetchError::NoPreviewAvailable(playlist_id.to_string()));
        }
        Ok(tracks)
    }
}
