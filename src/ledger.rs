use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::{
    settings::{GameMode, LivesConfig, SessionSettings},
    util::{mean, rounded_percent},
};

const ROSTER: [(&str, &str); 4] = [
    ("You", "purple"),
    ("Ahmet", "blue"),
    ("Zeynep", "green"),
    ("Burak", "yellow"),
];

pub const AVATARS: [&str; 4] = ["avatar1", "avatar2", "avatar3", "avatar4"];

/// Chance per round that a simulated opponent scores
const OPPONENT_HIT_RATE: RangeInclusive<f64> = 0.35..=0.75;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    pub score: u32,
    pub avatar: String,
    pub color: String,
    /// `None` for the user
    pub hit_rate: Option<f64>,
}

impl Player {
    pub fn is_user(&self) -> bool {
        self.hit_rate.is_none()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Lives {
    Inert,
    Unbounded,
    Bounded { remaining: u32, total: u32 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LivesStatus {
    /// Lives are not used in this mode
    NotTracked,
    Unlimited,
    Limited { remaining: u32, total: u32 },
}

/// Derived read-only snapshot of the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct GameStats {
    pub score: u32,
    pub rounds_played: u32,
    pub accuracy_percent: u32,
    pub average_response_time_secs: f64,
    pub lives: LivesStatus,
}

/// Score, lives, round counter and roster for one game
#[derive(Debug, Clone)]
pub struct ScoreLedger {
    score: u32,
    round: u32,
    lives: Lives,
    response_times: Vec<f64>,
    players: Vec<Player>,
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self {
            score: 0,
            round: 0,
            lives: Lives::Inert,
            response_times: Vec::new(),
            players: Vec::new(),
        }
    }
}

impl ScoreLedger {
    pub fn new(settings: &SessionSettings) -> Self {
        let mut ledger = Self::default();
        ledger.initialize(settings.mode, settings);
        ledger
    }

    /// Clear everything. Lives only count in solo mode.
    pub fn initialize(&mut self, mode: GameMode, settings: &SessionSettings) {
        self.score = 0;
        self.round = 0;
        self.response_times.clear();
        self.players.clear();
        self.lives = match (mode.is_solo(), settings.lives) {
            (false, _) => Lives::Inert,
            (true, LivesConfig::Unlimited) => Lives::Unbounded,
            (true, LivesConfig::Count(n)) => Lives::Bounded {
                remaining: n,
                total: n,
            },
        };
    }

    pub fn next_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    pub fn current_round(&self) -> u32 {
        self.round
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    pub fn reduce_lives(&mut self) {
        if let Lives::Bounded { remaining, .. } = &mut self.lives {
            *remaining = remaining.saturating_sub(1);
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.lives, Lives::Bounded { remaining: 0, .. })
    }

    pub fn accuracy(&self) -> u32 {
        rounded_percent(self.score, self.round)
    }

    pub fn add_response_time(&mut self, elapsed: Duration) {
        self.response_times.push(elapsed.as_secs_f64());
    }

    pub fn average_response_time(&self) -> f64 {
        mean(&self.response_times).unwrap_or(0.0)
    }

    pub fn lives(&self) -> LivesStatus {
        match self.lives {
            Lives::Inert => LivesStatus::NotTracked,
            Lives::Unbounded => LivesStatus::Unlimited,
            Lives::Bounded { remaining, total } => LivesStatus::Limited { remaining, total },
        }
    }

    pub fn stats(&self) -> GameStats {
        GameStats {
            score: self.score,
            rounds_played: self.round,
            accuracy_percent: self.accuracy(),
            average_response_time_secs: self.average_response_time(),
            lives: self.lives(),
        }
    }

    /// The user plus three simulated opponents, each with a distinct color
    pub fn generate_mock_players<R: Rng + ?Sized>(&mut self, user_avatar: &str, rng: &mut R) {
        self.players = ROSTER
            .iter()
            .enumerate()
            .map(|(idx, (name, color))| {
                let (avatar, hit_rate) = if idx == 0 {
                    (user_avatar.to_string(), None)
                } else {
                    let avatar = AVATARS.choose(rng).copied().unwrap_or(AVATARS[0]);
                    (avatar.to_string(), Some(rng.gen_range(OPPONENT_HIT_RATE)))
                };
                Player {
                    name: name.to_string(),
                    score: 0,
                    avatar,
                    color: color.to_string(),
                    hit_rate,
                }
            })
            .collect();
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Out-of-range indices are ignored
    pub fn update_player_score(&mut self, index: usize, delta: u32) {
        if let Some(player) = self.players.get_mut(index) {
            player.score += delta;
        }
    }

    /// Roll every simulated opponent once for the round just resolved
    pub fn simulate_opponents<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for player in self.players.iter_mut() {
            if let Some(rate) = player.hit_rate {
                if rng.gen_bool(rate) {
                    player.score += 1;
                }
            }
        }
    }

    /// Highest score first; ties keep roster order
    pub fn sorted_players(&self) -> Vec<Player> {
        self.players
            .iter()
            .cloned()
            .sorted_by(|a, b| b.score.cmp(&a.score))
            .collect()
    }
}
