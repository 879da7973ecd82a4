// Library surface for the game core, headless integration tests and alternative front ends.
// The terminal front end lives in main.rs and only talks to the core through `Presenter`.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod error;
pub mod game;
pub mod ledger;
pub mod playback;
pub mod presenter;
pub mod provider;
pub mod question;
pub mod runtime;
pub mod settings;
pub mod timer;
pub mod track;
pub mod util;

pub use error::{FetchError, GameError, PlaybackError};
pub use game::{Game, Phase, RoundOutcome, RoundState};
pub use presenter::{Presenter, Resolution};
pub use settings::{GameMode, LivesConfig, QuestionType, RoundLimit, SessionSettings};
pub use track::Track;
