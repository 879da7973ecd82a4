mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin, Write},
    sync::Mutex,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use webbrowser::Browser;

use riffle::{
    app_dirs::AppDirs,
    catalog::Catalog,
    config::{FileSettingsStore, SettingsStore},
    error::INIT_FAILURE_MESSAGE,
    ledger::GameStats,
    playback::PreviewPlayer,
    provider::TrackProvider,
    runtime::{CrosstermEventSource, FixedTicker, RiffleEvent, Runner},
    settings::{CategoryId, GameMode, LivesConfig, QuestionType, RoundLimit, SessionSettings},
    timer::TICK,
    Game, Phase,
};

use crate::ui::Screen;

const LOG_ENV: &str = "RIFFLE_LOG";
const DEFAULT_LOG_FILTER: &str = "riffle=info";

/// name the song, the band or the guitarist from a short preview
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Terminal music trivia. Listen to a short preview and pick the song, the artist or the guitarist out of four options, alone against a lives budget or against simulated opponents."
)]
pub struct Cli {
    /// game mode (marathon is an alias for solo)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// category to draw tracks from, repeat for several (see --list-categories)
    #[clap(short = 'c', long = "category")]
    categories: Vec<CategoryId>,

    /// what to ask about each track
    #[clap(short = 'q', long, value_enum)]
    question_type: Option<QuestionType>,

    /// number of rounds, or "unlimited" (solo always runs until out of lives)
    #[clap(short = 'r', long)]
    rounds: Option<RoundLimit>,

    /// preview length in seconds
    #[clap(short = 'p', long = "preview")]
    preview_length: Option<u32>,

    /// seconds to answer in timed modes
    #[clap(short = 't', long)]
    time_limit: Option<u32>,

    /// lives in solo mode, or "unlimited"
    #[clap(short = 'l', long)]
    lives: Option<LivesConfig>,

    /// avatar shown for you in the ranking
    #[clap(short = 'a', long)]
    avatar: Option<String>,

    /// play the bundled tracks instead of querying Deezer
    #[clap(long)]
    offline: bool,

    /// don't play the previews
    #[clap(long)]
    mute: bool,

    /// print the available categories and exit
    #[clap(long)]
    list_categories: bool,
}

impl Cli {
    /// Persisted settings for the chosen mode with the command line layered on top
    fn resolve_settings(&self, store: &impl SettingsStore) -> SessionSettings {
        let mode = self.mode.unwrap_or_default();
        let mut settings = store
            .load(mode)
            .unwrap_or_else(|| SessionSettings::for_mode(mode));

        if !self.categories.is_empty() {
            settings.categories = self.categories.iter().cloned().collect();
        }
        if let Some(question_type) = self.question_type {
            settings.question_type = question_type;
        }
        if let Some(rounds) = self.rounds {
            settings.rounds = rounds;
        }
        if let Some(preview_length) = self.preview_length {
            settings.preview_length_secs = preview_length;
        }
        if let Some(time_limit) = self.time_limit {
            settings.time_limit_secs = time_limit;
        }
        if let Some(lives) = self.lives {
            settings.lives = lives;
        }
        settings.avatar = self
            .avatar
            .clone()
            .or_else(|| store.load_avatar())
            .unwrap_or(settings.avatar);

        settings.normalized()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Continue,
    Quit,
    Share(String),
}

pub struct App {
    pub game: Game<Screen>,
}

impl App {
    pub fn new(game: Game<Screen>) -> Self {
        Self { game }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return KeyAction::Quit;
        }

        match self.game.phase() {
            Phase::Armed => match key.code {
                KeyCode::Char(c @ '1'..='4') => {
                    let index = c as usize - '1' as usize;
                    self.answer(index);
                }
                KeyCode::Up => self.game.presenter_mut().move_cursor(false),
                KeyCode::Down => self.game.presenter_mut().move_cursor(true),
                KeyCode::Enter => {
                    let index = self.game.presenter().cursor;
                    self.answer(index);
                }
                _ => {}
            },
            Phase::Resolved { .. } => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.game.skip_delay();
                }
            }
            Phase::Halted(_) => {
                if key.code == KeyCode::Enter {
                    self.game.retry();
                }
            }
            Phase::GameOver => match key.code {
                KeyCode::Char('r') => self.game.restart(),
                KeyCode::Char('t') => {
                    let url = share_url(&self.game.stats(), self.game.settings().mode);
                    return KeyAction::Share(url);
                }
                _ => {}
            },
            Phase::Idle | Phase::Loading => {}
        }
        KeyAction::Continue
    }

    fn answer(&mut self, index: usize) {
        if let Some(option) = self.game.presenter().option_at(index).map(str::to_string) {
            self.game.select_answer(&option);
        }
    }
}

fn share_url(stats: &GameStats, mode: GameMode) -> String {
    format!(
        "https://twitter.com/intent/tweet?text=riffle%20{}%3A%20{}%20points%20in%20{}%20rounds%20%2F%20{}%25%20accuracy",
        mode, stats.score, stats.rounds_played, stats.accuracy_percent
    )
}

fn print_categories<W: Write>(out: &mut W, catalog: &Catalog) -> io::Result<()> {
    for category in catalog.iter() {
        writeln!(out, "{:<20} {:<24} {}", category.id, category.name, category.kind)?;
    }
    Ok(())
}

/// Logs go to a file; the terminal belongs to the TUI
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_categories {
        print_categories(&mut io::stdout().lock(), Catalog::embedded())?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = FileSettingsStore::new();
    let settings = cli.resolve_settings(&store);
    if let Err(e) = store.save(&settings) {
        warn!(error = %e, "could not save settings");
    }
    if let Err(e) = store.save_avatar(&settings.avatar) {
        warn!(error = %e, "could not save avatar");
    }

    let provider = if cli.offline {
        TrackProvider::offline()
    } else {
        match TrackProvider::deezer() {
            Ok(provider) => provider,
            Err(e) => {
                error!(error = %e, "could not set up the track provider");
                eprintln!("{INIT_FAILURE_MESSAGE}");
                return Err(e.into());
            }
        }
    };
    info!(offline = cli.offline, "provider ready");

    // bundled tracks have no audio behind them
    let player = if cli.mute || cli.offline {
        None
    } else {
        match PreviewPlayer::spawn() {
            Ok(player) => Some(player),
            Err(e) => {
                warn!(error = %e, "playing without sound");
                None
            }
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Game::new(settings, provider, Screen::with_player(player)));
    app.game.start();
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(TICK));

    terminal.draw(|f| ui(app, f))?;
    loop {
        match runner.step() {
            RiffleEvent::Tick(dt) => app.game.on_tick(dt),
            RiffleEvent::Resize => {}
            RiffleEvent::Key(key) => match app.on_key(key) {
                KeyAction::Quit => {
                    app.game.abandon();
                    break;
                }
                KeyAction::Share(url) => {
                    if Browser::is_available() {
                        webbrowser::open(&url).unwrap_or_default();
                    }
                }
                KeyAction::Continue => {}
            },
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
