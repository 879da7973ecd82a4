use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    error::GameError,
    ledger::{GameStats, Player, ScoreLedger},
    presenter::{Presenter, Resolution},
    provider::{PlayHistory, TrackProvider},
    question::{Question, QuestionGenerator},
    settings::{CategoryId, RoundLimit, SessionSettings, DEFAULT_CATEGORY},
    timer::{Timeout, TimerCoordinator, TimerSnapshot},
    track::Track,
};

/// How long the result stays up before the next round
pub const ANSWER_DISPLAY_DELAY: Duration = Duration::from_millis(2000);
pub const TIMEOUT_DISPLAY_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Answered { correct: bool },
    TimedOut,
}

impl RoundOutcome {
    fn display_delay(&self) -> Duration {
        match self {
            RoundOutcome::Answered { .. } => ANSWER_DISPLAY_DELAY,
            RoundOutcome::TimedOut => TIMEOUT_DISPLAY_DELAY,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, RoundOutcome::Answered { correct: true })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Not started yet, or abandoned
    Idle,
    /// Waiting for a track
    Loading,
    /// Question shown, timers running
    Armed,
    /// Result shown for `remaining` more
    Resolved {
        outcome: RoundOutcome,
        remaining: Duration,
    },
    GameOver,
    /// A fetch failed; nothing moves until `retry` or `abandon`
    Halted(GameError),
}

/// The round in play. Replaced wholesale every round.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub round_number: u32,
    pub track: Track,
    pub question: Question,
    pub answer_selected: bool,
    pub timed_out: bool,
    /// Time since the round was armed
    pub elapsed: Duration,
}

/// Runs one game, round after round, from first fetch to final results
pub struct Game<P: Presenter> {
    settings: SessionSettings,
    ledger: ScoreLedger,
    timers: TimerCoordinator,
    questions: QuestionGenerator,
    provider: TrackProvider,
    history: PlayHistory,
    presenter: P,
    phase: Phase,
    round: Option<RoundState>,
    ticket: u64,
    pending_category: CategoryId,
    rng: StdRng,
}

impl<P: Presenter> Game<P> {
    pub fn new(settings: SessionSettings, provider: TrackProvider, presenter: P) -> Self {
        Self::with_rng(settings, provider, presenter, StdRng::from_entropy())
    }

    pub fn with_rng(
        settings: SessionSettings,
        provider: TrackProvider,
        presenter: P,
        rng: StdRng,
    ) -> Self {
        let settings = settings.normalized();
        Self {
            ledger: ScoreLedger::new(&settings),
            timers: TimerCoordinator::new(),
            questions: QuestionGenerator::new(settings.question_type),
            provider,
            history: PlayHistory::new(),
            presenter,
            phase: Phase::Idle,
            round: None,
            ticket: 0,
            pending_category: DEFAULT_CATEGORY.to_string(),
            settings,
            rng,
        }
    }

    /// Reset all game state and load the first round
    pub fn start(&mut self) {
        info!(mode = %self.settings.mode, rounds = %self.settings.rounds, "starting game");
        self.timers.cleanup();
        self.ledger.initialize(self.settings.mode, &self.settings);
        self.history.clear();
        self.round = None;
        if self.settings.mode.has_roster() {
            self.ledger.generate_mock_players(&self.settings.avatar, &mut self.rng);
        }
        self.presenter.setup(&self.settings, self.ledger.players());
        self.begin_round();
    }

    pub fn restart(&mut self) {
        self.start();
    }

    /// Drop the game without results. Any fetch still in flight is ignored.
    pub fn abandon(&mut self) {
        info!(round = self.ledger.current_round(), "game abandoned");
        self.timers.cleanup();
        self.presenter.stop_preview();
        self.ticket += 1;
        self.round = None;
        self.phase = Phase::Idle;
    }

    /// Fetch again for the same round after a failed load
    pub fn retry(&mut self) {
        if matches!(self.phase, Phase::Halted(_)) {
            info!(round = self.ledger.current_round(), "retrying track fetch");
            self.request_track();
        }
    }

    /// Load the next round, or end the game when lives or rounds are used up
    fn begin_round(&mut self) {
        if self.ledger.is_game_over() {
            debug!("out of lives");
            self.end_game();
            return;
        }
        if let RoundLimit::Rounds(limit) = self.settings.rounds {
            if self.ledger.current_round() >= limit {
                debug!(limit, "round limit reached");
                self.end_game();
                return;
            }
        }

        let round_number = self.ledger.next_round();
        debug!(round = round_number, "loading round");
        self.round = None;
        self.presenter.render_loading(round_number, self.settings.rounds);
        self.request_track();
    }

    fn pick_category(&mut self) -> CategoryId {
        self.settings
            .categories
            .iter()
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }

    fn request_track(&mut self) {
        self.timers.reset();
        self.ticket += 1;
        self.pending_category = self.pick_category();
        self.phase = Phase::Loading;
        self.provider.request(self.ticket, &self.pending_category);
        self.poll_track();
    }

    /// Pick up the fetch reply for the current ticket, if it has arrived
    pub fn poll_track(&mut self) {
        if self.phase != Phase::Loading {
            return;
        }
        match self.provider.poll(self.ticket, &mut self.history, &mut self.rng) {
            None => {}
            Some(Ok(track)) => self.arm_round(track),
            Some(Err(source)) => self.halt(GameError::TrackFetch {
                category: self.pending_category.clone(),
                source,
            }),
        }
    }

    fn halt(&mut self, error: GameError) {
        warn!(error = %error, "round halted");
        self.timers.cleanup();
        self.presenter.stop_preview();
        self.presenter.render_error(&error);
        self.phase = Phase::Halted(error);
    }

    fn arm_round(&mut self, track: Track) {
        let question = self.questions.generate(&track, &mut self.rng);
        let round = RoundState {
            round_number: self.ledger.current_round(),
            track,
            question,
            answer_selected: false,
            timed_out: false,
            elapsed: Duration::ZERO,
        };
        info!(
            round = round.round_number,
            track = %round.track.id,
            kind = %round.question.kind,
            "round armed"
        );

        // marathon has no answer pressure, only the preview length
        if self.settings.mode.is_timed() {
            self.timers.start_answer_timer(self.settings.answer_time_limit());
        }
        self.timers.start_preview_timeout(self.settings.preview_length());
        self.phase = Phase::Armed;

        self.presenter.render_round(&round, self.settings.rounds, &self.ledger.stats());
        self.presenter.render_timer(&self.timers.snapshot());
        self.presenter.play_preview(&round.track.preview_url);
        self.round = Some(round);
    }

    /// Submit the player's answer. Only the first answer of an armed round counts.
    pub fn select_answer(&mut self, answer: &str) -> Option<RoundOutcome> {
        if self.phase != Phase::Armed {
            return None;
        }
        let round = self.round.as_mut()?;
        if round.answer_selected || round.timed_out {
            return None;
        }

        self.timers.set_answer_selected();
        round.answer_selected = true;
        let correct = round.question.is_correct(answer);
        let elapsed = round.elapsed;
        info!(round = round.round_number, correct, elapsed = ?elapsed, "answer selected");

        self.ledger.add_response_time(elapsed);
        let outcome = RoundOutcome::Answered { correct };
        self.resolve(
            outcome,
            Resolution::Answered {
                selected: answer.to_string(),
                correct,
            },
        );
        Some(outcome)
    }

    /// Resolve the round as timed out. Returns false when the timeout is stale, a
    /// duplicate, or lost the race to an answer.
    pub fn handle_timeout(&mut self, timeout: Timeout) -> bool {
        if self.phase != Phase::Armed || !self.timers.handle_timeout(timeout) {
            return false;
        }
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        round.timed_out = true;
        info!(round = round.round_number, timer = %timeout.kind, "round timed out");

        self.resolve(RoundOutcome::TimedOut, Resolution::TimedOut);
        true
    }

    fn resolve(&mut self, outcome: RoundOutcome, resolution: Resolution) {
        if outcome.is_correct() {
            self.ledger.add_score(1);
            self.ledger.update_player_score(0, 1);
        } else if self.settings.mode.is_solo() {
            self.ledger.reduce_lives();
        }
        if self.settings.mode.has_roster() {
            self.ledger.simulate_opponents(&mut self.rng);
        }

        self.phase = Phase::Resolved {
            outcome,
            remaining: outcome.display_delay(),
        };
        let correct_answer = self
            .round
            .as_ref()
            .map(|r| r.question.correct_answer.as_str())
            .unwrap_or_default();
        self.presenter.stop_preview();
        self.presenter.render_resolution(&resolution, correct_answer, &self.ledger.stats());
    }

    /// Advance time by `dt`: poll a pending fetch, run the timers, or count down the
    /// result display.
    pub fn on_tick(&mut self, dt: Duration) {
        match self.phase {
            Phase::Loading => self.poll_track(),
            Phase::Armed => self.tick_armed(dt),
            Phase::Resolved { .. } => self.tick_resolved(dt),
            Phase::Idle | Phase::GameOver | Phase::Halted(_) => {}
        }
    }

    fn tick_armed(&mut self, dt: Duration) {
        if let Some(round) = self.round.as_mut() {
            round.elapsed += dt;
        }
        let fired = self.timers.on_tick(dt);
        self.presenter.render_timer(&self.timers.snapshot());
        if let Some(timeout) = fired {
            self.handle_timeout(timeout);
        }
    }

    fn tick_resolved(&mut self, dt: Duration) {
        let done = match &mut self.phase {
            Phase::Resolved { remaining, .. } => {
                *remaining = remaining.saturating_sub(dt);
                remaining.is_zero()
            }
            _ => false,
        };
        if done {
            self.advance();
        }
    }

    /// Cut the result display short
    pub fn skip_delay(&mut self) {
        if matches!(self.phase, Phase::Resolved { .. }) {
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.timers.cleanup();
        self.begin_round();
    }

    fn end_game(&mut self) {
        self.timers.cleanup();
        self.presenter.stop_preview();
        self.ticket += 1;
        self.phase = Phase::GameOver;
        let stats = self.ledger.stats();
        let players = self.ledger.sorted_players();
        info!(
            score = stats.score,
            rounds = stats.rounds_played,
            accuracy = stats.accuracy_percent,
            "game over"
        );
        self.presenter.render_final_results(&stats, &players);
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn stats(&self) -> GameStats {
        self.ledger.stats()
    }

    pub fn sorted_players(&self) -> Vec<Player> {
        self.ledger.sorted_players()
    }

    pub fn history(&self) -> &PlayHistory {
        &self.history
    }

    pub fn timer_snapshot(&self) -> TimerSnapshot {
        self.timers.snapshot()
    }

    /// Generation of the currently armed timers
    pub fn timer_generation(&self) -> u64 {
        self.timers.generation()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::Catalog,
        error::FetchError,
        ledger::LivesStatus,
        presenter::{PresenterEvent, RecordingPresenter},
        provider::{FetchMode, OfflineSource, TrackSource},
        settings::{GameMode, LivesConfig},
        timer::{TimerKind, TICK},
    };
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use std::sync::{mpsc, Arc, Mutex};

    fn offline_provider() -> TrackProvider {
        TrackProvider::offline()
    }

    fn game(settings: SessionSettings) -> Game<RecordingPresenter> {
        Game::with_rng(
            settings,
            offline_provider(),
            RecordingPresenter::new(),
            StdRng::seed_from_u64(42),
        )
    }

    fn tick_for(game: &mut Game<RecordingPresenter>, total: Duration) {
        let ticks = total.as_millis() / TICK.as_millis();
        for _ in 0..ticks {
            game.on_tick(TICK);
        }
    }

    fn wrong_answer(game: &Game<RecordingPresenter>) -> String {
        let question = &game.round().unwrap().question;
        question
            .options
            .iter()
            .find(|o| **o != question.correct_answer)
            .cloned()
            .unwrap()
    }

    fn correct_answer(game: &Game<RecordingPresenter>) -> String {
        game.round().unwrap().question.correct_answer.clone()
    }

    #[test]
    fn test_start_arms_first_round() {
        let mut game = game(SessionSettings::for_mode(GameMode::Solo));
        game.start();
        assert_eq!(game.phase(), &Phase::Armed);
        let round = game.round().unwrap();
        assert_eq!(round.round_number, 1);
        assert_eq!(round.question.options.len(), 4);
        assert_eq!(round.track.genre_name, "80's Rock");
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_solo_three_wrong_answers_game_over() {
        let mut game = game(SessionSettings {
            lives: LivesConfig::Count(3),
            ..SessionSettings::for_mode(GameMode::Solo)
        });
        game.start();

        for n in 1..=3 {
            let answer = wrong_answer(&game);
            assert_eq!(
                game.select_answer(&answer),
                Some(RoundOutcome::Answered { correct: false })
            );
            assert_eq!(game.ledger().is_game_over(), n == 3);
            game.skip_delay();
        }

        assert_eq!(game.phase(), &Phase::GameOver);
        assert_eq!(game.stats().rounds_played, 3);
        assert_eq!(
            game.stats().lives,
            LivesStatus::Limited {
                remaining: 0,
                total: 3
            }
        );
    }

    #[test]
    fn test_lives_never_increase() {
        let mut game = game(SessionSettings::for_mode(GameMode::Solo));
        game.start();
        let mut last = u32::MAX;
        for i in 0..10 {
            if game.phase() == &Phase::GameOver {
                break;
            }
            let answer = if i % 2 == 0 {
                correct_answer(&game)
            } else {
                wrong_answer(&game)
            };
            game.select_answer(&answer);
            let LivesStatus::Limited { remaining, .. } = game.stats().lives else {
                panic!("solo tracks lives");
            };
            assert!(remaining <= last);
            last = remaining;
            game.skip_delay();
        }
    }

    #[test]
    fn test_correct_answer_keeps_lives() {
        let mut game = game(SessionSettings::for_mode(GameMode::Solo));
        game.start();
        let answer = correct_answer(&game);
        game.select_answer(&answer);
        assert_eq!(game.stats().score, 1);
        assert_eq!(
            game.stats().lives,
            LivesStatus::Limited {
                remaining: 3,
                total: 3
            }
        );
    }

    #[test]
    fn test_second_answer_ignored() {
        let mut game = game(SessionSettings::for_mode(GameMode::Chaos));
        game.start();
        let answer = correct_answer(&game);
        assert!(game.select_answer(&answer).is_some());
        assert!(game.select_answer(&answer).is_none());
        assert_eq!(game.stats().score, 1);
        assert_eq!(game.presenter().resolutions().len(), 1);
    }

    #[test]
    fn test_versus_answer_before_timers() {
        let mut game = game(SessionSettings {
            time_limit_secs: 10,
            preview_length_secs: 15,
            rounds: RoundLimit::Rounds(1),
            ..SessionSettings::for_mode(GameMode::Versus)
        });
        game.start();

        tick_for(&mut game, Duration::from_secs(5));
        let answer = correct_answer(&game);
        assert_eq!(
            game.select_answer(&answer),
            Some(RoundOutcome::Answered { correct: true })
        );
        tick_for(&mut game, Duration::from_secs(15));

        let resolutions = game.presenter().resolutions();
        assert_eq!(resolutions.len(), 1);
        assert_matches!(resolutions[0], Resolution::Answered { correct: true, .. });
        assert_eq!(game.phase(), &Phase::GameOver);
        assert!((game.stats().average_response_time_secs - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_answer_timer_times_out_round() {
        let mut game = game(SessionSettings {
            time_limit_secs: 10,
            preview_length_secs: 15,
            ..SessionSettings::for_mode(GameMode::Versus)
        });
        game.start();
        tick_for(&mut game, Duration::from_secs(10));

        assert_matches!(
            game.phase(),
            Phase::Resolved {
                outcome: RoundOutcome::TimedOut,
                ..
            }
        );
        assert!(game.timer_snapshot().times_up);
        assert!(game.round().unwrap().timed_out);
        assert_eq!(game.stats().average_response_time_secs, 0.0);
        assert_eq!(game.stats().lives, LivesStatus::NotTracked);
    }

    #[test]
    fn test_solo_only_uses_preview_timer() {
        let mut game = game(SessionSettings {
            time_limit_secs: 5,
            preview_length_secs: 8,
            ..SessionSettings::for_mode(GameMode::Solo)
        });
        game.start();
        assert_eq!(game.timer_snapshot().answer_fraction, None);

        tick_for(&mut game, Duration::from_secs(7));
        assert_eq!(game.phase(), &Phase::Armed);
        tick_for(&mut game, Duration::from_secs(1));
        assert_matches!(
            game.phase(),
            Phase::Resolved {
                outcome: RoundOutcome::TimedOut,
                ..
            }
        );
        assert_eq!(
            game.stats().lives,
            LivesStatus::Limited {
                remaining: 2,
                total: 3
            }
        );
    }

    #[test]
    fn test_double_timeout_is_idempotent() {
        let mut game = game(SessionSettings::for_mode(GameMode::Solo));
        game.start();
        let timeout = Timeout::new(game.timer_generation(), TimerKind::Preview);

        assert!(game.handle_timeout(timeout));
        let after_first = game.stats();
        assert!(!game.handle_timeout(timeout));
        assert_eq!(game.stats(), after_first);
        assert_eq!(game.presenter().resolutions().len(), 1);
    }

    #[test]
    fn test_timeout_after_answer_is_noop() {
        let mut game = game(SessionSettings::for_mode(GameMode::Solo));
        game.start();
        let timeout = Timeout::new(game.timer_generation(), TimerKind::Preview);
        let answer = correct_answer(&game);
        game.select_answer(&answer);
        assert!(!game.handle_timeout(timeout));
        assert_eq!(game.stats().score, 1);
    }

    #[test]
    fn test_stale_timeout_from_previous_round() {
        let mut game = game(SessionSettings::for_mode(GameMode::Coop));
        game.start();
        let stale = Timeout::new(game.timer_generation(), TimerKind::Answer);
        let answer = correct_answer(&game);
        game.select_answer(&answer);
        game.skip_delay();

        assert_eq!(game.round().unwrap().round_number, 2);
        assert!(!game.handle_timeout(stale));
        assert_eq!(game.phase(), &Phase::Armed);
    }

    #[test]
    fn test_round_limit_ends_game() {
        let mut game = game(SessionSettings {
            rounds: RoundLimit::Rounds(3),
            ..SessionSettings::for_mode(GameMode::Team)
        });
        game.start();
        for expected in 1..=3 {
            assert_eq!(game.round().unwrap().round_number, expected);
            let answer = correct_answer(&game);
            game.select_answer(&answer);
            tick_for(&mut game, ANSWER_DISPLAY_DELAY);
        }
        assert_eq!(game.phase(), &Phase::GameOver);
        let stats = game.stats();
        assert_eq!(stats.rounds_played, 3);
        assert_eq!(stats.accuracy_percent, 100);

        assert_matches!(
            game.presenter().events.last(),
            Some(PresenterEvent::FinalResults { players, .. }) if players.len() == 4
        );
        let sorted = game.sorted_players();
        assert!(sorted.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(sorted.iter().find(|p| p.is_user()).unwrap().score, 3);
    }

    #[test]
    fn test_timeout_display_delay_is_shorter() {
        let mut game = game(SessionSettings::for_mode(GameMode::Solo));
        game.start();
        let timeout = Timeout::new(game.timer_generation(), TimerKind::Preview);
        game.handle_timeout(timeout);
        tick_for(&mut game, Duration::from_millis(1100));
        assert_matches!(game.phase(), Phase::Resolved { .. });
        tick_for(&mut game, Duration::from_millis(100));
        assert_eq!(game.round().unwrap().round_number, 2);
    }

    #[test]
    fn test_fetch_failure_halts_and_retry_keeps_round() {
        let mut game = game(SessionSettings {
            categories: ["metal_60s".to_string()].into(),
            ..SessionSettings::for_mode(GameMode::Solo)
        });
        game.start();
        assert_matches!(
            game.phase(),
            Phase::Halted(GameError::TrackFetch {
                source: FetchError::NoPreviewAvailable(_),
                ..
            })
        );
        assert!(game.round().is_none());
        assert!(game.presenter().last_round_options().is_none());

        game.on_tick(Duration::from_secs(60));
        game.retry();
        assert_matches!(game.phase(), Phase::Halted(_));
        assert_eq!(game.ledger().current_round(), 1);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut game = game(SessionSettings::for_mode(GameMode::Solo));
        game.start();
        let answer = correct_answer(&game);
        game.select_answer(&answer);
        game.skip_delay();
        assert_eq!(game.ledger().current_round(), 2);

        game.restart();
        assert_eq!(game.ledger().current_round(), 1);
        assert_eq!(game.stats().score, 0);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_abandon_stops_timers() {
        let mut game = game(SessionSettings::for_mode(GameMode::Chaos));
        game.start();
        game.abandon();
        tick_for(&mut game, Duration::from_secs(30));
        assert_eq!(game.phase(), &Phase::Idle);
        assert!(game.presenter().resolutions().is_empty());
    }

    #[test]
    fn test_preview_plays_while_round_is_armed() {
        let mut game = game(SessionSettings {
            rounds: RoundLimit::Rounds(2),
            ..SessionSettings::for_mode(GameMode::Versus)
        });
        game.start();
        let url = game.round().unwrap().track.preview_url.clone();
        assert_matches!(
            game.presenter().events.last(),
            Some(PresenterEvent::PlayPreview(played)) if *played == url
        );
        assert!(game.presenter().is_playing());

        let answer = correct_answer(&game);
        game.select_answer(&answer);
        assert!(!game.presenter().is_playing());

        game.skip_delay();
        assert!(game.presenter().is_playing());
        let timeout = Timeout::new(game.timer_generation(), TimerKind::Answer);
        game.handle_timeout(timeout);
        assert!(!game.presenter().is_playing());

        game.skip_delay();
        assert_eq!(game.phase(), &Phase::GameOver);
        assert!(!game.presenter().is_playing());
    }

    #[test]
    fn test_abandon_stops_preview() {
        let mut game = game(SessionSettings::for_mode(GameMode::Solo));
        game.start();
        assert!(game.presenter().is_playing());
        game.abandon();
        assert!(!game.presenter().is_playing());
    }

    #[test]
    fn test_zero_lives_ends_before_first_round() {
        let mut game = game(SessionSettings {
            lives: LivesConfig::Count(0),
            ..SessionSettings::for_mode(GameMode::Solo)
        });
        game.start();

        assert_eq!(game.phase(), &Phase::GameOver);
        assert!(game.round().is_none());
        assert!(game.presenter().last_round_options().is_none());
        let stats = game.stats();
        assert_eq!(stats.rounds_played, 0);
        assert_eq!(stats.accuracy_percent, 0);
        assert_eq!(
            stats.lives,
            LivesStatus::Limited {
                remaining: 0,
                total: 0
            }
        );
        assert_matches!(
            game.presenter().events.last(),
            Some(PresenterEvent::FinalResults { .. })
        );
    }

    /// Holds every fetch until the test lets it through
    struct GatedSource {
        gate: Mutex<mpsc::Receiver<()>>,
        inner: OfflineSource,
    }

    impl TrackSource for GatedSource {
        fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError> {
            let gate = self.gate.lock().unwrap();
            gate.recv().unwrap();
            drop(gate);
            self.inner.playlist_tracks(playlist_id)
        }
    }

    #[test]
    fn test_late_reply_after_abandon_is_ignored() {
        let (open, gate) = mpsc::channel();
        let source = GatedSource {
            gate: Mutex::new(gate),
            inner: OfflineSource::new(HashMap::from([(
                "1283499905".to_string(),
                crate::provider::tests::tracks("t", 6),
            )])),
        };
        let provider = TrackProvider::new(
            Arc::new(source),
            Catalog::embedded().clone(),
            FetchMode::Background,
        );
        let mut game = Game::with_rng(
            SessionSettings::for_mode(GameMode::Solo),
            provider,
            RecordingPresenter::new(),
            StdRng::seed_from_u64(1),
        );

        game.start();
        assert_eq!(game.phase(), &Phase::Loading);
        game.abandon();
        game.start();

        open.send(()).unwrap();
        open.send(()).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while game.phase() == &Phase::Loading {
            assert!(std::time::Instant::now() < deadline, "fetch never arrived");
            std::thread::sleep(Duration::from_millis(5));
            game.on_tick(TICK);
        }
        assert_eq!(game.phase(), &Phase::Armed);
        assert_eq!(game.round().unwrap().round_number, 1);
        // the abandoned fetch never reached the history
        assert_eq!(game.history().len(), 1);
    }
}
