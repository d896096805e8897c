#![deny(unsafe_code)]

//! nans: a small terminal editor with Python-aware completion.

mod app;
mod keymap;
mod panels;

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use nans_config::AppConfig;
use nans_core::{CompletionEngine, ModuleIndex, ModuleRegistry, SelfUpdater, StatusFeed, files};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use app::{App, Effect};

#[derive(Parser)]
#[command(name = "nans", version, about = "Terminal text editor with Python completion")]
struct Cli {
    /// File to edit (defaults to `editor.default_file`)
    file: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, default_value = "nans.toml")]
    config: PathBuf,
}

/// Warnings kept for the status bar.
const STATUS_FEED_CAPACITY: usize = 32;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .await
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let feed = init_tracing(&config)?;

    info!(version = %nans_core::build_info::version_string(), "Starting nans");

    let registry = ModuleRegistry::load_layered(&config.completion.registry_files).await;
    let search_paths = config.completion.search_paths();
    let modules = ModuleIndex::discover(&search_paths, &registry);
    info!(
        objects = registry.len(),
        modules = modules.len(),
        "Completion sources ready"
    );
    let engine = CompletionEngine::new(Arc::new(registry), Arc::new(modules));

    let file_path = cli
        .file
        .unwrap_or_else(|| PathBuf::from(&config.editor.default_file));
    let document = files::load_document(&file_path).await?;
    let updater = SelfUpdater::from_config(&config.update, &std::env::current_dir()?)?;

    let mut app = App::new(
        config.editor.clone(),
        engine,
        document,
        file_path,
        feed.reader(),
    );

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run(&mut terminal, &mut app, updater).await;

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    updater: SelfUpdater,
) -> Result<()> {
    let (update_tx, mut update_rx) = mpsc::channel(8);

    while !app.should_quit {
        terminal.draw(|frame| panels::render(app, frame))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let effect = app.handle_action(keymap::resolve(key), Instant::now());
            match effect {
                Effect::Save | Effect::SaveAndExit => {
                    let result = files::save_text(&app.file_path, app.document.text()).await;
                    if let Err(e) = &result {
                        warn!(error = %e, "Save failed");
                    }
                    app.on_saved(effect, result, Instant::now());
                }
                Effect::SelfUpdate => {
                    updater.clone().spawn(update_tx.clone());
                }
                Effect::None => {}
            }
        }

        while let Ok(update) = update_rx.try_recv() {
            app.set_status(update.message(), Instant::now());
        }
        app.tick(Instant::now());
    }

    info!("Exiting nans");
    Ok(())
}

/// Install the global subscriber: env filter, status feed, optional log file.
///
/// The terminal is owned by the UI, so nothing is written to stdout/stderr.
fn init_tracing(config: &AppConfig) -> Result<StatusFeed> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let feed = StatusFeed::new(STATUS_FEED_CAPACITY);

    let file_layer = match config.logging.file_path() {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(feed.clone())
        .with(file_layer)
        .init();
    Ok(feed)
}
