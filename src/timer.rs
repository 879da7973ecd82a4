use std::time::Duration;

/// Host tick granularity
pub const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum TimerKind {
    Answer,
    Preview,
}

/// A timeout raised for one armed round. Only valid while `generation` is current.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Timeout {
    pub generation: u64,
    pub kind: TimerKind,
}

impl Timeout {
    pub fn new(generation: u64, kind: TimerKind) -> Self {
        Self { generation, kind }
    }
}

#[derive(Debug, Copy, Clone)]
struct Countdown {
    total: Duration,
    remaining: Duration,
}

impl Countdown {
    fn new(total: Duration) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    /// Returns true on the tick that reaches zero
    fn advance(&mut self, dt: Duration) -> bool {
        if self.remaining.is_zero() {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        self.remaining.is_zero()
    }

    fn fraction_left(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        self.remaining.as_secs_f64() / self.total.as_secs_f64()
    }
}

/// What the presentation needs to draw the countdowns
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimerSnapshot {
    /// Share of the answer timer left, `None` when it is not armed
    pub answer_fraction: Option<f64>,
    pub preview_remaining: Option<Duration>,
    pub times_up: bool,
}

/// Owns the round's answer and preview countdowns and lets a timeout through at most
/// once per generation.
#[derive(Debug, Default)]
pub struct TimerCoordinator {
    generation: u64,
    answer: Option<Countdown>,
    preview: Option<Countdown>,
    answer_selected: bool,
    timeout_handled: bool,
    times_up: bool,
}

impl TimerCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel everything from the previous round and open a new generation
    pub fn reset(&mut self) -> u64 {
        self.cleanup();
        self.generation += 1;
        self.answer_selected = false;
        self.timeout_handled = false;
        self.times_up = false;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn start_answer_timer(&mut self, limit: Duration) {
        self.answer = Some(Countdown::new(limit));
    }

    pub fn start_preview_timeout(&mut self, length: Duration) {
        self.preview = Some(Countdown::new(length));
    }

    /// Advance both countdowns. The answer timer is checked first, so when both run
    /// out on the same tick it is the one reported.
    pub fn on_tick(&mut self, dt: Duration) -> Option<Timeout> {
        if self.answer_selected || self.timeout_handled {
            return None;
        }

        let answer_expired = self.answer.as_mut().is_some_and(|c| c.advance(dt));
        let preview_expired = self.preview.as_mut().is_some_and(|c| c.advance(dt));

        if answer_expired {
            self.times_up = true;
            Some(Timeout::new(self.generation, TimerKind::Answer))
        } else if preview_expired {
            Some(Timeout::new(self.generation, TimerKind::Preview))
        } else {
            None
        }
    }

    pub fn set_answer_selected(&mut self) {
        self.answer_selected = true;
        self.answer = None;
        self.preview = None;
    }

    pub fn answer_selected(&self) -> bool {
        self.answer_selected
    }

    /// Claim a timeout. True exactly once per generation, and never after an answer.
    pub fn handle_timeout(&mut self, timeout: Timeout) -> bool {
        if timeout.generation != self.generation || self.answer_selected || self.timeout_handled
        {
            return false;
        }
        self.timeout_handled = true;
        self.answer = None;
        self.preview = None;
        true
    }

    pub fn cleanup(&mut self) {
        self.answer = None;
        self.preview = None;
    }

    pub fn is_armed(&self) -> bool {
        self.answer.is_some() || self.preview.is_some()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            answer_fraction: self.answer.as_ref().map(Countdown::fraction_left),
            preview_remaining: self.preview.as_ref().map(|c| c.remaining),
            times_up: self.times_up,
        }
    }
}
