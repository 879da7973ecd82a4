use crate::{
    error::GameError,
    game::RoundState,
    ledger::{GameStats, Player},
    settings::{RoundLimit, SessionSettings},
    timer::TimerSnapshot,
};

/// How a round was resolved, as shown to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Answered { selected: String, correct: bool },
    TimedOut,
}

/// One-way sink for everything the game wants shown. Nothing returned here feeds back
/// into the game; input goes through `Game::select_answer` and friends.
pub trait Presenter {
    fn setup(&mut self, _settings: &SessionSettings, _players: &[Player]) {}

    fn render_loading(&mut self, _round: u32, _total: RoundLimit) {}

    fn render_round(&mut self, round: &RoundState, total: RoundLimit, stats: &GameStats);

    fn render_timer(&mut self, _timers: &TimerSnapshot) {}

    fn render_resolution(
        &mut self,
        resolution: &Resolution,
        correct_answer: &str,
        stats: &GameStats,
    );

    fn render_final_results(&mut self, stats: &GameStats, players: &[Player]);

    fn render_error(&mut self, error: &GameError);

    /// Start the preview of the round just armed
    fn play_preview(&mut self, _preview_url: &str) {}

    /// Silence the preview: the round resolved, failed or the game ended
    fn stop_preview(&mut self) {}
}

/// Everything a `RecordingPresenter` was asked to show
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Setup { players: usize },
    Loading { round: u32 },
    Round { round: u32, options: Vec<String> },
    Resolution {
        resolution: Resolution,
        correct_answer: String,
        stats: GameStats,
    },
    FinalResults {
        stats: GameStats,
        players: Vec<String>,
    },
    Error(GameError),
    PlayPreview(String),
    StopPreview,
}

/// Collects presenter calls for headless runs and assertions. Timer snapshots are kept
/// separately since there is one per tick.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<PresenterEvent>,
    pub last_timer: Option<TimerSnapshot>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolutions(&self) -> Vec<&Resolution> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Resolution { resolution, .. } => Some(resolution),
                _ => None,
            })
            .collect()
    }

    /// Whether the last playback call started a preview rather than stopping one
    pub fn is_playing(&self) -> bool {
        self.events
            .iter()
            .rev()
            .find_map(|e| match e {
                PresenterEvent::PlayPreview(_) => Some(true),
                PresenterEvent::StopPreview => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn last_round_options(&self) -> Option<&[String]> {
        self.events.iter().rev().find_map(|e| match e {
            PresenterEvent::Round { options, .. } => Some(options.as_slice()),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn setup(&mut self, _settings: &SessionSettings, players: &[Player]) {
        self.events.push(PresenterEvent::Setup {
            players: players.len(),
        });
    }

    fn render_loading(&mut self, round: u32, _total: RoundLimit) {
        self.events.push(PresenterEvent::Loading { round });
    }

    fn render_round(&mut self, round: &RoundState, _total: RoundLimit, _stats: &GameStats) {
        self.events.push(PresenterEvent::Round {
            round: round.round_number,
            options: round.question.options.clone(),
        });
    }

    fn render_timer(&mut self, timers: &TimerSnapshot) {
        self.last_timer = Some(*timers);
    }

    fn render_resolution(
        &mut self,
        resolution: &Resolution,
        correct_answer: &str,
        stats: &GameStats,
    ) {
        self.events.push(PresenterEvent::Resolution {
            resolution: resolution.clone(),
            correct_answer: correct_answer.to_string(),
            stats: stats.clone(),
        });
    }

    fn render_final_results(&mut self, stats: &GameStats, players: &[Player]) {
        self.events.push(PresenterEvent::FinalResults {
            stats: stats.clone(),
            players: players.iter().map(|p| p.name.clone()).collect(),
        });
    }

    fn render_error(&mut self, error: &GameError) {
        self.events.push(PresenterEvent::Error(error.clone()));
    }

    fn play_preview(&mut self, preview_url: &str) {
        self.events.push(PresenterEvent::PlayPreview(preview_url.to_string()));
    }

    fn stop_preview(&mut self) {
        self.events.push(PresenterEvent::StopPreview);
    }
}
