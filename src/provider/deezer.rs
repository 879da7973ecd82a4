use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::TrackSource;
use crate::{error::FetchError, track::Track};

const DEEZER_BASE_URL: &str = "https://api.deezer.com";
const USER_AGENT: &str = concat!("riffle/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct PlaylistTracks {
    #[serde(default)]
    data: Vec<DeezerTrack>,
    /// Deezer reports some failures inside a 200 response
    #[serde(default)]
    error: Option<DeezerError>,
}

#[derive(Debug, Deserialize)]
struct DeezerError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    id: u64,
    title: String,
    #[serde(default)]
    preview: String,
    artist: DeezerArtist,
    #[serde(default)]
    album: Option<DeezerAlbum>,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeezerAlbum {
    #[serde(default)]
    title: String,
}

impl From<DeezerTrack> for Track {
    fn from(t: DeezerTrack) -> Self {
        Track {
            id: t.id.to_string(),
            title: t.title,
            artist: t.artist.name,
            preview_url: t.preview,
            album: t.album.map(|a| a.title).unwrap_or_default(),
            genre_name: String::new(),
            guitarist: None,
        }
    }
}

/// Playlists from the public Deezer API
pub struct DeezerSource {
    http_client: reqwest::blocking::Client,
    base_url: String,
}

impl DeezerSource {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEEZER_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn playable_tracks(playlist_id: &str, body: PlaylistTracks) -> Result<Vec<Track>, FetchError> {
    if let Some(error) = body.error {
        return Err(FetchError::UpstreamUnavailable(error.message));
    }

    let tracks: Vec<Track> = body
        .data
        .into_iter()
        .filter(|t| !t.preview.is_empty())
        .map(Track::from)
        .collect();

    if tracks.is_empty() {
        return Err(FetchError::NoPreviewAvailable(playlist_id.to_string()));
    }
    Ok(tracks)
}

impl TrackSource for DeezerSource {
    fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError> {
        let url = format!("{}/playlist/{}/tracks", self.base_url, playlist_id);
        debug!(playlist_id, url = %url, "querying Deezer");

        let response = self.http_client.get(&url).send().map_err(|e| {
            warn!(playlist_id, error = %e, "Deezer request failed");
            FetchError::UpstreamUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(playlist_id, status = status.as_u16(), "Deezer returned an error status");
            return Err(FetchError::UpstreamUnavailable(format!("HTTP {}", status.as_u16())));
        }

        let body: PlaylistTracks = response
            .json()
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        let tracks = playable_tracks(playlist_id, body)?;
        info!(playlist_id, tracks = tracks.len(), "loaded playlist from Deezer");
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const FIXTURE: &str = r#"{
        "data": [
            {
                "id": 3135556,
                "title": "Stairway To Heaven (Remaster)",
                "preview": "https://cdns-preview.example/3135556.mp3",
                "artist": { "id": 848, "name": "Led Zeppelin" },
                "album": { "id": 1, "title": "Led Zeppelin IV" }
            },
            {
                "id": 42,
                "title": "Region Locked",
                "preview": "",
                "artist": { "id": 1, "name": "Somebody" }
            }
        ],
        "total": 2
    }"#;

    #[test]
    fn test_maps_playable_tracks() {
        let body: PlaylistTracks = serde_json::from_str(FIXTURE).unwrap();
        let tracks = playable_tracks("1950507922", body).unwrap();
        assert_eq!(tracks.len(), 1);
        let track = &tracks[0];
        assert_eq!(track.id, "3135556");
        assert_eq!(track.artist, "Led Zeppelin");
        assert_eq!(track.album, "Led Zeppelin IV");
        assert_eq!(track.clean_title(), "Stairway To Heaven");
    }

    #[test]
    fn test_no_previews() {
        let body: PlaylistTracks = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_matches!(
            playable_tracks("1", body),
            Err(FetchError::NoPreviewAvailable(id)) if id == "1"
        );
    }

    #[test]
    fn test_error_inside_ok_response() {
        let body: PlaylistTracks = serde_json::from_str(
            r#"{"error": {"type": "DataException", "message": "no data", "code": 800}}"#,
        )
        .unwrap();
        assert_matches!(
            playable_tracks("1", body),
            Err(FetchError::UpstreamUnavailable(msg)) if msg == "no data"
        );
    }

    #[test]
    fn test_unreachable_host() {
        let source = DeezerSource::with_base_url("http://127.0.0.1:9").unwrap();
        assert_matches!(
            source.playlist_tracks("1"),
            Err(FetchError::UpstreamUnavailable(_))
        );
    }
}
