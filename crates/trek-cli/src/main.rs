//! `trek`: terminal UI and command line for the trek trip planner.
//!
//! # Usage
//!
//! ```
//! trek                                  # interactive planner
//! trek --config ~/.config/trek/trek.toml
//! trek user add Anna
//! trek place add Hanoi --region North --lat 21.03 --lon 105.85 --route
//! trek export --out ~/Documents
//! ```
//!
//! Settings come from `trek.toml` (or `--config`), then `TREK_*`
//! environment variables, then flags. Logs go to `log_path` since the
//! terminal belongs to the UI.

mod app;
mod commands;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use trek_planner::{Session, labels::Locale, storage::FileStorage};
use trek_store_sqlite::SqliteStore;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "trek", version, about = "Collaborative trip planner")]
struct Cli {
  /// Path to a TOML config file. Defaults to `trek.toml` if present.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite database holding the shared trip.
  #[arg(long, value_name = "FILE")]
  store: Option<String>,

  /// File remembering the active profile on this device.
  #[arg(long, value_name = "FILE")]
  state: Option<String>,

  /// Log file.
  #[arg(long, value_name = "FILE")]
  log: Option<String>,

  /// Interface language: `en` or `de`.
  #[arg(long)]
  locale: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Write a printable trip summary.
  Export {
    /// Target directory (default: `export_dir`).
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
  },
  /// Manage profiles.
  User {
    #[command(subcommand)]
    action: UserCommand,
  },
  /// Manage places.
  Place {
    #[command(subcommand)]
    action: PlaceCommand,
  },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
  /// List profiles; the active one is starred.
  List,
  /// Create a profile and make it active.
  Add { name: String },
  /// Rename a profile.
  Rename { id: Uuid, name: String },
  /// Make an existing profile active.
  Use { name: String },
  /// Forget the active profile.
  Clear,
}

#[derive(Subcommand, Debug)]
enum PlaceCommand {
  /// Add a place, optionally appending it to the route.
  Add {
    name:   String,
    #[arg(long)]
    region: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lat:    Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lon:    Option<f64>,
    /// Also append the place to the end of the route.
    #[arg(long)]
    route:  bool,
  },
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Settings {
  store_path: PathBuf,
  state_path: PathBuf,
  log_path:   PathBuf,
  export_dir: PathBuf,
  locale:     String,
}

fn load_settings(cli: &Cli) -> Result<Settings> {
  let (file, required) = match &cli.config {
    Some(path) => (path.clone(), true),
    None => (PathBuf::from("trek.toml"), false),
  };

  let settings = config::Config::builder()
    .set_default("store_path", "trek.db")?
    .set_default("state_path", "trek-state.json")?
    .set_default("log_path", "trek.log")?
    .set_default("export_dir", ".")?
    .set_default("locale", "en")?
    .add_source(config::File::from(file).required(required))
    .add_source(config::Environment::with_prefix("TREK"))
    .set_override_option("store_path", cli.store.clone())?
    .set_override_option("state_path", cli.state.clone())?
    .set_override_option("log_path", cli.log.clone())?
    .set_override_option("locale", cli.locale.clone())?
    .build()
    .context("failed to read configuration")?;

  let mut settings: Settings = settings
    .try_deserialize()
    .context("failed to deserialise settings")?;
  for path in [
    &mut settings.store_path,
    &mut settings.state_path,
    &mut settings.log_path,
    &mut settings.export_dir,
  ] {
    *path = expand_tilde(path);
  }
  Ok(settings)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

fn init_tracing(log_path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(log_path)
    .with_context(|| format!("opening log file {}", log_path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let settings = load_settings(&cli)?;
  init_tracing(&settings.log_path)?;

  let locale: Locale = settings.locale.parse().map_err(anyhow::Error::msg)?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let storage = FileStorage::open(&settings.state_path);
  tracing::info!(
    store = %settings.store_path.display(),
    state = %storage.path().display(),
    "starting session",
  );
  let session = Session::start(Arc::new(store), Arc::new(storage), locale).await;

  match cli.command {
    None => run_tui(session, settings.export_dir).await,
    Some(command) => {
      let result = commands::run(&session, command, &settings.export_dir).await;
      session.shutdown().await;
      result
    }
  }
}

// ─── Interactive mode ─────────────────────────────────────────────────────────

async fn run_tui(session: Session<SqliteStore>, export_dir: PathBuf) -> Result<()> {
  let mut app = App::new(session, export_dir);
  app.load_all().await;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  app.into_session().shutdown().await;
  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
