mod ui;

use chrono::{DateTime, Local};
use clap::{error::ErrorKind, ArgGroup, CommandFactory, Parser};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use reptrack::{
    config::{Config, ConfigStore, FileConfigStore},
    recording::ReplaySource,
    runtime::{FrameSource, Runner},
    synth::SyntheticSource,
    timer::{Clock, MonotonicClock},
    ExerciseKind, ExerciseProfile, Gender, LiveStatus, SessionError, SessionSummary, SourceMode,
};
use serde::Serialize;
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    sync::mpsc,
    thread,
    time::Duration,
};
use tracing::{info, Level};

const TICK_RATE_MS: u64 = 100;

/// count exercise reps from pose landmark streams and score the workout
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Counts jumping jacks, pushups, squats and high knees from recorded or synthetic pose landmark streams, tracks pauses when the pose is lost, and scores the session with calories and a stamina tier.",
    group(ArgGroup::new("source").required(true).args(["recording", "demo"]))
)]
pub struct Cli {
    /// exercise to count (defaults to the configured one)
    #[clap(short = 'e', long, value_enum)]
    exercise: Option<ExerciseKind>,

    /// landmark recording to play back (.jsonl or .csv)
    #[clap(short = 'r', long)]
    recording: Option<PathBuf>,

    /// generate a synthetic session instead of reading a recording
    #[clap(long)]
    demo: bool,

    /// length of a demo session in seconds
    #[clap(long)]
    secs: Option<u64>,

    /// seed for the demo generator
    #[clap(long)]
    seed: Option<u64>,

    /// treat the source as a live camera, enabling live time caps
    #[clap(long)]
    live: bool,

    /// your name for the report
    #[clap(long)]
    name: Option<String>,

    /// age in years
    #[clap(long)]
    age: Option<u32>,

    /// body weight in kilograms
    #[clap(long)]
    weight: Option<f64>,

    /// male, female or other
    #[clap(long)]
    gender: Option<Gender>,

    /// height in centimetres
    #[clap(long)]
    height: Option<f64>,

    /// store the exercise and profile given on the command line as defaults
    #[clap(long)]
    save_profile: bool,

    /// config file to use instead of the platform default
    #[clap(long)]
    config: Option<PathBuf>,

    /// print the summary as JSON
    #[clap(long, conflicts_with = "tui")]
    json: bool,

    /// interactive terminal view with live counts and result charts
    #[clap(long)]
    tui: bool,

    /// more log output on stderr (-v info, -vv debug)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    fn exercise(&self, config: &Config) -> ExerciseKind {
        self.exercise.unwrap_or(config.exercise)
    }

    /// Configured profile with command line overrides applied
    fn profile(&self, config: &Config) -> ExerciseProfile {
        let mut profile = config.profile.clone();
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(weight) = self.weight {
            profile.weight_kg = weight;
        }
        if let Some(gender) = self.gender {
            profile.gender = gender;
        }
        if self.height.is_some() {
            profile.height_cm = self.height;
        }
        profile
    }

    fn source_mode(&self) -> SourceMode {
        if self.live {
            SourceMode::Live
        } else {
            SourceMode::File
        }
    }

    fn frame_source(&self, kind: ExerciseKind, config: &Config) -> Box<dyn FrameSource> {
        match &self.recording {
            Some(path) => Box::new(ReplaySource::new(path).with_mode(self.source_mode())),
            None => Box::new(
                SyntheticSource::new(kind, self.seed.unwrap_or(config.seed))
                    .fps(config.demo_fps)
                    .duration(Duration::from_secs(self.secs.unwrap_or(config.demo_secs)))
                    .dropout(config.demo_dropout)
                    .mode(self.source_mode()),
            ),
        }
    }

    fn start_runner(&self, config: &Config) -> Result<Runner<Box<dyn FrameSource>>, SessionError> {
        let kind = self.exercise(config);
        Runner::start(self.frame_source(kind, config), kind, self.profile(config))
    }

    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Live,
    Results,
}

pub struct App {
    pub cli: Cli,
    pub config: Config,
    pub runner: Runner<Box<dyn FrameSource>>,
    /// Wall clock that paces playback of recorded frames
    pub playback: MonotonicClock,
    pub state: AppState,
    pub summary: Option<SessionSummary>,
}

impl App {
    pub fn new(cli: Cli, config: Config) -> Result<Self, SessionError> {
        let runner = cli.start_runner(&config)?;
        Ok(Self {
            cli,
            config,
            runner,
            playback: MonotonicClock::new(),
            state: AppState::Live,
            summary: None,
        })
    }

    /// Throw the current session away and play the source again from the start
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.runner.stop();
        self.runner = self.cli.start_runner(&self.config)?;
        self.playback = MonotonicClock::new();
        self.state = AppState::Live;
        self.summary = None;
        Ok(())
    }

    pub fn on_tick(&mut self) {
        if self.state != AppState::Live {
            return;
        }
        if let Some(summary) = self.runner.advance_to(self.playback.now()) {
            self.finish(summary);
        }
    }

    pub fn stop(&mut self) {
        let summary = self.runner.stop();
        self.finish(summary);
    }

    fn finish(&mut self, summary: SessionSummary) {
        info!(reps = summary.rep_count, "session finished");
        self.summary = Some(summary);
        self.state = AppState::Results;
    }

    pub fn kind(&self) -> ExerciseKind {
        self.runner.tracker().kind()
    }

    pub fn status(&self) -> LiveStatus {
        self.runner.tracker().status(self.runner.now())
    }
}

#[derive(Serialize)]
struct Report<'a> {
    recorded_at: DateTime<Local>,
    #[serde(flatten)]
    summary: &'a SessionSummary,
}

fn write_report<W: Write>(out: &mut W, summary: &SessionSummary, json: bool) -> io::Result<()> {
    let recorded_at = Local::now();
    if json {
        let report = Report {
            recorded_at,
            summary,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)
    } else {
        writeln!(out, "Recorded: {}", recorded_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out, "{summary}")
    }
}

fn init_tracing(cli: &Cli) {
    let builder = tracing_subscriber::fmt().with_max_level(cli.log_level());
    // the terminal belongs to the TUI while it runs
    if cli.tui {
        builder.with_writer(io::sink).init();
    } else {
        builder.with_writer(io::stderr).init();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let store = cli.config_store();
    let mut config = store.load();

    if cli.save_profile {
        config = Config {
            exercise: cli.exercise(&config),
            profile: cli.profile(&config),
            ..config
        };
        config.profile.validate()?;
        store.save(&config)?;
        info!(path = %store.path().display(), "profile saved");
    }

    if !cli.tui {
        let mut runner = cli.start_runner(&config)?;
        let summary = runner.run();
        write_report(&mut io::stdout().lock(), &summary, cli.json)?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(cli, config)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result?;

    if let Some(summary) = &app.summary {
        write_report(&mut io::stdout().lock(), summary, false)?;
    }

    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = get_app_events();
    terminal.draw(|f| ui(app, f))?;

    loop {
        match events.recv()? {
            AppEvent::Tick => {
                if app.state == AppState::Live {
                    app.on_tick();
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }
                match (key.code, &app.state) {
                    (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => break,
                    (KeyCode::Char('s'), AppState::Live) => app.stop(),
                    (KeyCode::Char('r'), _) => app.reset()?,
                    _ => {}
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    app.runner.stop();
    Ok(())
}

#[derive(Clone, Debug)]
enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

fn get_app_events() -> mpsc::Receiver<AppEvent> {
    let (tx, rx) = mpsc::channel();

    let tick_tx = tx.clone();
    thread::spawn(move || loop {
        if tick_tx.send(AppEvent::Tick).is_err() {
            break;
        }
        thread::sleep(Duration::from_millis(TICK_RATE_MS))
    });

    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(Event::Key(key)) => AppEvent::Key(key),
            Ok(Event::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(_) => break,
        };
        if tx.send(evt).is_err() {
            break;
        }
    });

    rx
}

fn ui(app: &App, f: &mut Frame) {
    ui::screen::current_screen(&app.state).render(app, f);
}
