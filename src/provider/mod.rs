pub mod deezer;
pub mod offline;

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{catalog::Catalog, error::FetchError, track::Track};

pub use deezer::DeezerSource;
pub use offline::OfflineSource;

/// Below this many unplayed tracks the whole playlist is eligible again
pub const MIN_FRESH: usize = 3;

/// Somewhere playlists of playable tracks come from
pub trait TrackSource: Send + Sync {
    /// Every track of the playlist that has a preview
    fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError>;
}

/// Ids of every track served this game
#[derive(Debug, Default, Clone)]
pub struct PlayHistory {
    played: HashSet<String>,
}

impl PlayHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.played.contains(track_id)
    }

    pub fn record(&mut self, track_id: &str) {
        self.played.insert(track_id.to_string());
    }

    /// Only for a game (re)start
    pub fn clear(&mut self) {
        self.played.clear();
    }

    pub fn len(&self) -> usize {
        self.played.len()
    }

    pub fn is_empty(&self) -> bool {
        self.played.is_empty()
    }
}

/// Pick an unplayed track, or any track once fewer than `MIN_FRESH` are left unplayed
pub fn pick_track<R: Rng + ?Sized>(
    playlist_id: &str,
    tracks: &[Track],
    history: &mut PlayHistory,
    rng: &mut R,
) -> Result<Track, FetchError> {
    let fresh: Vec<&Track> = tracks.iter().filter(|t| !history.contains(&t.id)).collect();
    let eligible: Vec<&Track> = if fresh.len() < MIN_FRESH {
        debug!(playlist_id, fresh = fresh.len(), "playlist nearly exhausted, allowing repeats");
        tracks.iter().collect()
    } else {
        fresh
    };

    let track = eligible
        .choose(rng)
        .map(|t| (*t).clone())
        .ok_or_else(|| FetchError::NoPreviewAvailable(playlist_id.to_string()))?;
    history.record(&track.id);
    Ok(track)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// Answer on the calling thread; the reply is ready on the next poll
    Inline,
    /// One worker thread per request
    Background,
}

/// A fetch result tagged with the ticket of the request it answers
#[derive(Debug)]
pub struct FetchReply {
    pub ticket: u64,
    pub category: String,
    pub result: Result<(String, Vec<Track>), FetchError>,
}

/// Resolves categories to playlists and hands replies back through a channel so the
/// game can keep ticking while a fetch is in flight.
pub struct TrackProvider {
    source: Arc<dyn TrackSource>,
    catalog: Catalog,
    mode: FetchMode,
    tx: Sender<FetchReply>,
    rx: Receiver<FetchReply>,
}

impl TrackProvider {
    pub fn new(source: Arc<dyn TrackSource>, catalog: Catalog, mode: FetchMode) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            catalog,
            mode,
            tx,
            rx,
        }
    }

    /// Bundled tracks, answered inline
    pub fn offline() -> Self {
        Self::new(
            Arc::new(OfflineSource::embedded()),
            Catalog::embedded().clone(),
            FetchMode::Inline,
        )
    }

    pub fn deezer() -> Result<Self, FetchError> {
        Ok(Self::new(
            Arc::new(DeezerSource::new()?),
            Catalog::embedded().clone(),
            FetchMode::Background,
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Start fetching the playlist behind `category_id`
    pub fn request(&self, ticket: u64, category_id: &str) {
        let Some(category) = self.catalog.get(category_id) else {
            warn!(category = category_id, "unknown category requested");
            self.reply(FetchReply {
                ticket,
                category: category_id.to_string(),
                result: Err(FetchError::UnknownCategory(category_id.to_string())),
            });
            return;
        };

        debug!(
            ticket,
            category = category_id,
            playlist = %category.playlist_id,
            "requesting playlist"
        );
        let genre_name = category.name.clone();
        let playlist_id = category.playlist_id.clone();
        let category = category.id.clone();

        match self.mode {
            FetchMode::Inline => {
                let result = self
                    .source
                    .playlist_tracks(&playlist_id)
                    .map(|tracks| (genre_name, tracks));
                self.reply(FetchReply {
                    ticket,
                    category,
                    result,
                });
            }
            FetchMode::Background => {
                let source = Arc::clone(&self.source);
                let tx = self.tx.clone();
                std::thread::spawn(move || {
                    let result = source
                        .playlist_tracks(&playlist_id)
                        .map(|tracks| (genre_name, tracks));
                    // receiver gone means the game is over
                    let _ = tx.send(FetchReply {
                        ticket,
                        category,
                        result,
                    });
                });
            }
        }
    }

    fn reply(&self, reply: FetchReply) {
        // both ends live in self, so this cannot fail
        let _ = self.tx.send(reply);
    }

    /// Take the reply for `ticket` if it has arrived, picking a track against `history`.
    /// Replies for any other ticket are stale and dropped.
    pub fn poll<R: Rng + ?Sized>(
        &self,
        ticket: u64,
        history: &mut PlayHistory,
        rng: &mut R,
    ) -> Option<Result<Track, FetchError>> {
        loop {
            let reply = match self.rx.try_recv() {
                Ok(reply) => reply,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            };

            if reply.ticket != ticket {
                debug!(
                    stale = reply.ticket,
                    current = ticket,
                    category = %reply.category,
                    "dropping stale fetch reply"
                );
                continue;
            }

            let track = reply.result.and_then(|(genre_name, tracks)| {
                let playlist_id = self
                    .catalog
                    .get(&reply.category)
                    .map(|c| c.playlist_id.as_str())
                    .unwrap_or(reply.category.as_str());
                pick_track(playlist_id, &tracks, history, rng)
                    .map(|t| t.with_genre_name(genre_name))
            });
            return Some(track);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    pub(crate) fn tracks(prefix: &str, n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track {
                id: format!("{prefix}{i}"),
                title: format!("Song {i}"),
                artist: format!("Band {i}"),
                preview_url: format!("offline://{prefix}{i}"),
                album: String::new(),
                genre_name: String::new(),
                guitarist: None,
            })
            .collect()
    }

    fn provider_with(playlist: &str, n: usize) -> TrackProvider {
        let mut map = HashMap::new();
        map.insert(playlist.to_string(), tracks("t", n));
        TrackProvider::new(
            Arc::new(OfflineSource::new(map)),
            Catalog::embedded().clone(),
            FetchMode::Inline,
        )
    }

    #[test]
    fn test_pick_avoids_played_tracks() {
        let mut rng = StdRng::seed_from_u64(1);
        let all = tracks("t", 6);
        let mut history = PlayHistory::new();
        let mut seen = HashSet::new();
        // 6 tracks, repeats only allowed once fewer than 3 are fresh
        for _ in 0..4 {
            let track = pick_track("p", &all, &mut history, &mut rng).unwrap();
            assert!(seen.insert(track.id));
        }
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_pick_allows_repeats_when_nearly_exhausted() {
        let mut rng = StdRng::seed_from_u64(1);
        let all = tracks("t", 3);
        let mut history = PlayHistory::new();
        history.record("t0");
        for _ in 0..20 {
            pick_track("p", &all, &mut history, &mut rng).unwrap();
        }
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_pick_from_empty_playlist() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut history = PlayHistory::new();
        assert_matches!(
            pick_track("p", &[], &mut history, &mut rng),
            Err(FetchError::NoPreviewAvailable(id)) if id == "p"
        );
    }

    #[test]
    fn test_poll_returns_track_with_genre() {
        let mut rng = StdRng::seed_from_u64(1);
        let provider = provider_with("1283499905", 5);
        let mut history = PlayHistory::new();
        provider.request(1, "rock_80s");
        let track = provider.poll(1, &mut history, &mut rng).unwrap().unwrap();
        assert_eq!(track.genre_name, "80's Rock");
        assert!(history.contains(&track.id));
        assert!(provider.poll(1, &mut history, &mut rng).is_none());
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let mut rng = StdRng::seed_from_u64(1);
        let provider = provider_with("1283499905", 5);
        let mut history = PlayHistory::new();
        provider.request(1, "rock_80s");
        provider.request(2, "rock_80s");

        let track = provider.poll(2, &mut history, &mut rng);
        assert_matches!(track, Some(Ok(_)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_unknown_category() {
        let mut rng = StdRng::seed_from_u64(1);
        let provider = provider_with("1283499905", 5);
        let mut history = PlayHistory::new();
        provider.request(3, "polka_50s");
        assert_matches!(
            provider.poll(3, &mut history, &mut rng),
            Some(Err(FetchError::UnknownCategory(c))) if c == "polka_50s"
        );
    }

    #[test]
    fn test_missing_offline_playlist() {
        let mut rng = StdRng::seed_from_u64(1);
        let provider = provider_with("1283499905", 5);
        let mut history = PlayHistory::new();
        provider.request(4, "metal_60s");
        assert_matches!(
            provider.poll(4, &mut history, &mut rng),
            Some(Err(FetchError::NoPreviewAvailable(_)))
        );
    }

    #[test]
    fn test_background_reply_arrives() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut map = HashMap::new();
        map.insert("1283499905".to_string(), tracks("t", 5));
        let provider = TrackProvider::new(
            Arc::new(OfflineSource::new(map)),
            Catalog::embedded().clone(),
            FetchMode::Background,
        );
        let mut history = PlayHistory::new();
        provider.request(9, "rock_80s");

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let reply = loop {
            if let Some(reply) = provider.poll(9, &mut history, &mut rng) {
                break reply;
            }
            assert!(std::time::Instant::now() < deadline, "no reply from worker");
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert_matches!(reply, Ok(_));
    }
}
