use thiserror::Error;

/// Why a track source could not hand out a playable track
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("unknown category \"{0}\"")]
    UnknownCategory(String),

    #[error("no playable preview in playlist {0}")]
    NoPreviewAvailable(String),

    #[error("music catalog unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// Why a preview could not be played. Never fatal; the round goes on silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("audio output unavailable: {0}")]
    Device(String),

    #[error("could not download preview: {0}")]
    Download(String),

    #[error("could not decode preview: {0}")]
    Decode(String),
}

/// Failures that stop a game from progressing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("could not load a track for category \"{category}\"")]
    TrackFetch {
        category: String,
        #[source]
        source: FetchError,
    },
}

impl GameError {
    /// Message shown to the player. Every fetch failure reads the same and is retryable.
    pub fn user_message(&self) -> &'static str {
        match self {
            GameError::TrackFetch { .. } => "Error loading track, try again.",
        }
    }
}

/// Shown when the game cannot even be set up
pub const INIT_FAILURE_MESSAGE: &str = "Failed to initialize the game. Please refresh.";
