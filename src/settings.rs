use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub type CategoryId = String;

/// Category used when a game starts without any selection
pub const DEFAULT_CATEGORY: &str = "rock_80s";

const DEFAULT_ROUNDS: u32 = 10;
const DEFAULT_PREVIEW_SECS: u32 = 10;
const DEFAULT_TIME_LIMIT_SECS: u32 = 15;
const DEFAULT_LIVES: u32 = 3;
const DEFAULT_AVATAR: &str = "avatar1";

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    /// marathon: lives budget, unlimited rounds, no answer timer
    #[default]
    #[serde(alias = "marathon")]
    #[value(alias = "marathon")]
    Solo,
    Coop,
    Versus,
    Team,
    Chaos,
    Custom,
}

impl GameMode {
    pub fn is_solo(&self) -> bool {
        matches!(self, GameMode::Solo)
    }

    /// Every mode except marathon runs the answer timer next to the preview timer
    pub fn is_timed(&self) -> bool {
        !self.is_solo()
    }

    /// Modes that play against a simulated roster
    pub fn has_roster(&self) -> bool {
        matches!(self, GameMode::Coop | GameMode::Versus | GameMode::Team)
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameMode::Solo => "Marathon Mode",
            GameMode::Coop => "Cooperative Mode",
            GameMode::Versus => "Solo VS Mode",
            GameMode::Team => "Team VS Mode",
            GameMode::Chaos => "Chaos Mode",
            GameMode::Custom => "Custom Mode",
        }
    }
}

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuestionType {
    Song,
    Artist,
    Guitarist,
    #[default]
    Mixed,
}

/// A question type with `mixed` already decided
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum QuestionKind {
    Song,
    Artist,
    Guitarist,
}

impl QuestionType {
    /// Resolve to a concrete kind; `mixed` is a fair coin between song and artist
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> QuestionKind {
        match self {
            QuestionType::Song => QuestionKind::Song,
            QuestionType::Artist => QuestionKind::Artist,
            QuestionType::Guitarist => QuestionKind::Guitarist,
            QuestionType::Mixed => {
                if rng.gen_bool(0.5) {
                    QuestionKind::Song
                } else {
                    QuestionKind::Artist
                }
            }
        }
    }
}

/// Persisted form of "a count or the word unlimited"; older saves store counts as strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum CountOrUnlimited {
    Count(u32),
    Word(String),
}

fn parse_count_or_unlimited(s: &str) -> Result<Option<u32>, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("unlimited") {
        return Ok(None);
    }
    s.parse::<u32>()
        .map(Some)
        .map_err(|_| format!("expected a number or \"unlimited\", got \"{s}\""))
}

impl CountOrUnlimited {
    fn into_count(self) -> Result<Option<u32>, String> {
        match self {
            CountOrUnlimited::Count(n) => Ok(Some(n)),
            CountOrUnlimited::Word(w) => parse_count_or_unlimited(&w),
        }
    }
}

impl From<Option<u32>> for CountOrUnlimited {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(n) => CountOrUnlimited::Count(n),
            None => CountOrUnlimited::Word("unlimited".to_string()),
        }
    }
}

/// How many rounds a game lasts
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CountOrUnlimited", into = "CountOrUnlimited")]
pub enum RoundLimit {
    Rounds(u32),
    Unlimited,
}

impl TryFrom<CountOrUnlimited> for RoundLimit {
    type Error = String;

    fn try_from(value: CountOrUnlimited) -> Result<Self, Self::Error> {
        Ok(value.into_count()?.map_or(RoundLimit::Unlimited, RoundLimit::Rounds))
    }
}

impl From<RoundLimit> for CountOrUnlimited {
    fn from(value: RoundLimit) -> Self {
        match value {
            RoundLimit::Rounds(n) => Some(n).into(),
            RoundLimit::Unlimited => None.into(),
        }
    }
}

impl FromStr for RoundLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_count_or_unlimited(s)?.map_or(RoundLimit::Unlimited, RoundLimit::Rounds))
    }
}

impl fmt::Display for RoundLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundLimit::Rounds(n) => write!(f, "{n}"),
            RoundLimit::Unlimited => write!(f, "∞"),
        }
    }
}

/// Lives budget for marathon games
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CountOrUnlimited", into = "CountOrUnlimited")]
pub enum LivesConfig {
    Count(u32),
    Unlimited,
}

impl TryFrom<CountOrUnlimited> for LivesConfig {
    type Error = String;

    fn try_from(value: CountOrUnlimited) -> Result<Self, Self::Error> {
        Ok(value.into_count()?.map_or(LivesConfig::Unlimited, LivesConfig::Count))
    }
}

impl From<LivesConfig> for CountOrUnlimited {
    fn from(value: LivesConfig) -> Self {
        match value {
            LivesConfig::Count(n) => Some(n).into(),
            LivesConfig::Unlimited => None.into(),
        }
    }
}

impl FromStr for LivesConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_count_or_unlimited(s)?.map_or(LivesConfig::Unlimited, LivesConfig::Count))
    }
}

/// Everything a game needs to know up front; read-only once the game starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    pub mode: GameMode,
    pub categories: BTreeSet<CategoryId>,
    pub question_type: QuestionType,
    pub rounds: RoundLimit,
    #[serde(rename = "previewLength")]
    pub preview_length_secs: u32,
    #[serde(rename = "timeLimit")]
    pub time_limit_secs: u32,
    pub lives: LivesConfig,
    pub avatar: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Solo,
            categories: BTreeSet::new(),
            question_type: QuestionType::Mixed,
            rounds: RoundLimit::Rounds(DEFAULT_ROUNDS),
            preview_length_secs: DEFAULT_PREVIEW_SECS,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            lives: LivesConfig::Count(DEFAULT_LIVES),
            avatar: DEFAULT_AVATAR.to_string(),
        }
    }
}

impl SessionSettings {
    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
        .normalized()
    }

    /// Repair values a game cannot run with. Never fails; bad values fall back to defaults.
    pub fn normalized(mut self) -> Self {
        if self.preview_length_secs == 0 {
            self.preview_length_secs = DEFAULT_PREVIEW_SECS;
        }
        if self.time_limit_secs == 0 {
            self.time_limit_secs = DEFAULT_TIME_LIMIT_SECS;
        }
        if self.rounds == RoundLimit::Rounds(0) {
            self.rounds = RoundLimit::Rounds(DEFAULT_ROUNDS);
        }
        if self.avatar.trim().is_empty() {
            self.avatar = DEFAULT_AVATAR.to_string();
        }
        self.categories.retain(|c| !c.trim().is_empty());

        // marathon runs until the lives are gone
        if self.mode.is_solo() {
            self.rounds = RoundLimit::Unlimited;
        }
        self
    }

    pub fn preview_length(&self) -> Duration {
        Duration::from_secs(u64::from(self.preview_length_secs))
    }

    pub fn answer_time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_limit_secs))
    }
}
