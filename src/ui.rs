use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use riffle::{
    game::{Phase, RoundState},
    ledger::{GameStats, LivesStatus, Player},
    playback::PreviewPlayer,
    presenter::{Presenter, Resolution},
    settings::{GameMode, RoundLimit, SessionSettings},
    timer::TimerSnapshot,
    GameError,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Larger budgets are shown as numbers
const MAX_HEARTS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub text: String,
    pub genre_label: String,
    pub options: Vec<String>,
}

/// Terminal side of the game: keeps whatever the game last asked to show
#[derive(Debug, Default)]
pub struct Screen {
    pub mode: GameMode,
    pub round: u32,
    pub total: Option<RoundLimit>,
    pub stats: Option<GameStats>,
    pub question: Option<QuestionView>,
    pub timer: Option<TimerSnapshot>,
    pub resolution: Option<(Resolution, String)>,
    pub final_players: Vec<Player>,
    pub error: Option<String>,
    /// Highlighted option
    pub cursor: usize,
    /// None plays silent
    player: Option<PreviewPlayer>,
}

impl Screen {
    pub fn with_player(player: Option<PreviewPlayer>) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    pub fn move_cursor(&mut self, down: bool) {
        let count = self.question.as_ref().map_or(0, |q| q.options.len());
        if count == 0 {
            return;
        }
        self.cursor = if down {
            (self.cursor + 1) % count
        } else {
            (self.cursor + count - 1) % count
        };
    }

    pub fn option_at(&self, index: usize) -> Option<&str> {
        self.question
            .as_ref()
            .and_then(|q| q.options.get(index))
            .map(String::as_str)
    }
}

impl Presenter for Screen {
    fn setup(&mut self, settings: &SessionSettings, _players: &[Player]) {
        *self = Screen {
            mode: settings.mode,
            total: Some(settings.rounds),
            player: self.player.take(),
            ..Screen::default()
        };
    }

    fn render_loading(&mut self, round: u32, total: RoundLimit) {
        self.round = round;
        self.total = Some(total);
        self.question = None;
        self.timer = None;
        self.resolution = None;
        self.error = None;
        self.cursor = 0;
    }

    fn render_round(&mut self, round: &RoundState, total: RoundLimit, stats: &GameStats) {
        self.round = round.round_number;
        self.total = Some(total);
        self.stats = Some(stats.clone());
        self.error = None;
        self.question = Some(QuestionView {
            text: round.question.text.clone(),
            genre_label: round.question.genre_label.clone(),
            options: round.question.options.clone(),
        });
    }

    fn render_timer(&mut self, timers: &TimerSnapshot) {
        self.timer = Some(*timers);
    }

    fn render_resolution(
        &mut self,
        resolution: &Resolution,
        correct_answer: &str,
        stats: &GameStats,
    ) {
        self.stats = Some(stats.clone());
        self.resolution = Some((resolution.clone(), correct_answer.to_string()));
    }

    fn render_final_results(&mut self, stats: &GameStats, players: &[Player]) {
        self.stats = Some(stats.clone());
        self.final_players = players.to_vec();
    }

    fn render_error(&mut self, error: &GameError) {
        self.error = Some(error.user_message().to_string());
    }

    fn play_preview(&mut self, preview_url: &str) {
        if let Some(player) = &self.player {
            player.play(preview_url);
        }
    }

    fn stop_preview(&mut self) {
        if let Some(player) = &self.player {
            player.stop();
        }
    }
}

fn lives_label(lives: LivesStatus) -> Option<String> {
    match lives {
        LivesStatus::NotTracked => None,
        LivesStatus::Unlimited => Some("lives ∞".to_string()),
        LivesStatus::Limited { remaining, total } if total <= MAX_HEARTS => Some(format!(
            "lives {}{}",
            "♥".repeat(remaining as usize),
            "♡".repeat(total.saturating_sub(remaining) as usize)
        )),
        LivesStatus::Limited { remaining, total } => Some(format!("lives {remaining}/{total}")),
    }
}

fn centered(text: impl Into<String>, style: Style) -> Paragraph<'static> {
    Paragraph::new(Span::styled(text.into(), style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let screen = self.game.presenter();

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let yellow_bold_style = Style::default().patch(bold_style).fg(Color::Yellow);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let magenta_style = Style::default().fg(Color::Magenta);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // header
                Constraint::Min(6),    // body
                Constraint::Length(1), // legend
            ])
            .split(area);

        // header
        let total = screen
            .total
            .map_or_else(|| "?".to_string(), |t| t.to_string());
        let mut header = vec![
            Span::styled(screen.mode.title(), magenta_style.patch(bold_style)),
            Span::raw(format!("   round {}/{}", screen.round, total)),
        ];
        if let Some(stats) = &screen.stats {
            header.push(Span::raw(format!("   score {}", stats.score)));
            if let Some(lives) = lives_label(stats.lives) {
                header.push(Span::styled(format!("   {lives}"), red_bold_style));
            }
        }
        Paragraph::new(Line::from(header))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let legend = match self.game.phase() {
            Phase::Armed => "(1-4)/(↑↓ enter) answer / (esc)ape",
            Phase::Resolved { .. } => "(enter) next / (esc)ape",
            Phase::GameOver => "(r)estart / (t)weet / (esc)ape",
            Phase::Halted(_) => "(enter) retry / (esc)ape",
            Phase::Loading | Phase::Idle => "(esc)ape",
        };
        centered(legend, italic_style).render(chunks[2], buf);

        let body = chunks[1];
        match self.game.phase() {
            Phase::Idle | Phase::Loading => {
                centered("Loading track...", yellow_bold_style).render(body, buf);
            }
            Phase::Halted(_) => {
                let message = screen
                    .error
                    .clone()
                    .unwrap_or_else(|| riffle::error::INIT_FAILURE_MESSAGE.to_string());
                centered(message, red_bold_style).render(body, buf);
            }
            Phase::Armed | Phase::Resolved { .. } => {
                let Some(question) = &screen.question else {
                    return;
                };
                let timed = screen.timer.and_then(|t| t.answer_fraction).is_some();
                let parts = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1), // genre
                        Constraint::Length(2), // question
                        Constraint::Length(question.options.len() as u16 + 1),
                        Constraint::Length(if timed { 1 } else { 0 }),
                        Constraint::Length(1), // preview countdown
                        Constraint::Min(1),    // result banner
                    ])
                    .split(body);

                centered(format!("♪ {}", question.genre_label), dim_style).render(parts[0], buf);
                centered(question.text.clone(), bold_style).render(parts[1], buf);

                let resolved = screen.resolution.as_ref();
                let widest = question.options.iter().map(|o| o.width()).max().unwrap_or(0);
                let lines: Vec<Line> = question
                    .options
                    .iter()
                    .enumerate()
                    .map(|(idx, option)| {
                        let label = format!("{}. {:<widest$}", idx + 1, option);
                        let style = match resolved {
                            Some((_, correct)) if option == correct => green_bold_style,
                            Some((Resolution::Answered { selected, .. }, _))
                                if option == selected =>
                            {
                                red_bold_style
                            }
                            Some(_) => dim_style,
                            None if idx == screen.cursor => {
                                bold_style.add_modifier(Modifier::REVERSED)
                            }
                            None => Style::default(),
                        };
                        Line::from(Span::styled(label, style))
                    })
                    .collect();
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(parts[2], buf);

                if let Some(snapshot) = screen.timer {
                    if let Some(fraction) = snapshot.answer_fraction {
                        let color = if fraction < 0.25 { Color::Red } else { Color::Cyan };
                        Gauge::default()
                            .gauge_style(Style::default().fg(color))
                            .ratio(fraction.clamp(0.0, 1.0))
                            .label("")
                            .render(parts[3], buf);
                    }
                    if let Some(left) = snapshot.preview_remaining {
                        centered(format!("preview {:.0}s", left.as_secs_f64().ceil()), dim_style)
                            .render(parts[4], buf);
                    }
                }

                if let Some((resolution, correct)) = resolved {
                    let banner = match resolution {
                        Resolution::Answered { correct: true, .. } => {
                            Span::styled("Correct!", green_bold_style)
                        }
                        Resolution::Answered { correct: false, .. } => Span::styled(
                            format!("Wrong! The answer was {correct}"),
                            red_bold_style,
                        ),
                        Resolution::TimedOut => Span::styled(
                            format!("Time's Up! The answer was {correct}"),
                            yellow_bold_style,
                        ),
                    };
                    Paragraph::new(Line::from(banner))
                        .alignment(Alignment::Center)
                        .render(parts[5], buf);
                }
            }
            Phase::GameOver => {
                let Some(stats) = &screen.stats else {
                    return;
                };
                let parts = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(2),
                        Constraint::Length(5),
                        Constraint::Min(0),
                    ])
                    .split(body);

                centered("Game Over", magenta_style.patch(bold_style)).render(parts[0], buf);

                let mut lines = vec![
                    Line::from(format!("score {}", stats.score)),
                    Line::from(format!("rounds {}", stats.rounds_played)),
                    Line::from(format!("accuracy {}%", stats.accuracy_percent)),
                    Line::from(format!(
                        "avg response {:.1}s",
                        stats.average_response_time_secs
                    )),
                ];
                if let Some(lives) = lives_label(stats.lives) {
                    lines.push(Line::from(lives));
                }
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(parts[1], buf);

                if !screen.final_players.is_empty() {
                    let rows = screen.final_players.iter().enumerate().map(|(idx, p)| {
                        let style = if p.is_user() { bold_style } else { Style::default() };
                        Row::new(vec![
                            Cell::from(format!("#{}", idx + 1)),
                            Cell::from(p.name.clone()),
                            Cell::from(p.score.to_string()),
                            Cell::from(p.avatar.clone()),
                        ])
                        .style(style.fg(player_color(&p.color)))
                    });
                    Table::new(
                        rows,
                        [
                            Constraint::Length(4),
                            Constraint::Length(10),
                            Constraint::Length(6),
                            Constraint::Length(10),
                        ],
                    )
                    .header(Row::new(vec!["", "player", "score", "avatar"]).style(dim_style))
                    .block(Block::default().borders(Borders::TOP).title("ranking"))
                    .render(parts[2], buf);
                }
            }
        }
    }
}

fn player_color(tag: &str) -> Color {
    match tag {
        "purple" => Color::Magenta,
        "blue" => Color::Blue,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        _ => Color::Reset,
    }
}
