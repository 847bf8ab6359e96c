// src/main.rs
mod catalog;
mod chat;
mod config;
mod input;
mod models;
mod responder;
mod theme;
mod tracker;
mod ui;
mod utils;
mod viewport;

use std::{
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::catalog::{Painting, builtin_catalog, load_catalog};
use crate::chat::ChatSession;
use crate::config::Settings;
use crate::input::handle_key;
use crate::models::{AppState, NAV_ITEMS};
use crate::responder::{ResponderEngine, StdRandom};
use crate::theme::Theme;
use crate::tracker::{Section, SectionId, SectionTracker};
use crate::ui::{build_page, render};
use crate::utils::split_screen;

#[derive(Parser, Debug)]
#[command(name = "kiwiart", version, about = "Browse the KiwiArt gemstone gallery in your terminal")]
struct Cli {
    /// Start scrolled to this section (home, gallery, about, contact)
    #[arg(long, value_name = "SECTION")]
    section: Option<String>,

    /// JSON catalog to show instead of the built-in collection
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Seed for the assistant's fallback replies
    #[arg(long)]
    seed: Option<u64>,

    /// Print the assistant's reply to MESSAGE and exit
    #[arg(long, value_name = "MESSAGE")]
    ask: Option<String>,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new().context("could not load settings")?;
    init_logging(settings.log_file_path());

    if cli.dump_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let random = match cli.seed.or(settings.random_seed) {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_entropy(),
    };
    let mut responder = ResponderEngine::with_rules(settings.keyword_rules(), random);

    if let Some(message) = cli.ask {
        if message.trim().is_empty() {
            anyhow::bail!("--ask needs a non-empty message");
        }
        println!("{}", responder.respond(&message));
        return Ok(());
    }

    let catalog = match cli.catalog.or_else(|| settings.catalog_path()) {
        Some(path) => load_catalog(&path)?,
        None => builtin_catalog(),
    };
    let start_section = cli.section.map(SectionId::from);

    info!(
        paintings = catalog.len(),
        rules = responder.rules().len(),
        fallbacks = responder.fallbacks().len(),
        "starting kiwiart"
    );
    terminal::enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;

    let result = run(&settings, &catalog, &mut responder, start_section);

    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    info!("kiwiart stopped");
    result
}

fn run(
    settings: &Settings,
    catalog: &[Painting],
    responder: &mut ResponderEngine<StdRandom>,
    mut pending_jump: Option<SectionId>,
) -> Result<()> {
    let rt = Runtime::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut tui = Terminal::new(backend)?;
    let theme = Theme::default();
    let year = Local::now().year();

    let session = Arc::new(Mutex::new(ChatSession::new(&settings.greeting)));
    let mut app = AppState::new(catalog.len());
    let mut tracker = SectionTracker::new(settings.home_section.as_str(), settings.near_top_threshold);
    tracker.start(NAV_ITEMS.iter().map(|item| Section::new(item.section, None)));

    loop {
        // Lay the page out for the current terminal size; regions feed the tracker
        let (cols, rows) = terminal::size()?;
        let areas = split_screen(Rect::new(0, 0, cols, rows));
        let page = build_page(catalog, areas.page.width, areas.page.height, app.selected_card, year, &theme);
        app.sync_layout(page.height(), areas.page.height, page.anchors(), page.card_tops.clone());
        if let Some(section) = pending_jump.take() {
            if !app.jump_to(&section) {
                warn!(section = %section, home = %tracker.home(), "unknown start section, staying home");
            }
        }
        let stale: Vec<SectionId> = tracker
            .sections()
            .iter()
            .filter(|tracked| !page.sections.iter().any(|s| s.id == tracked.id))
            .map(|tracked| tracked.id.clone())
            .collect();
        for id in &stale {
            tracker.unregister(id);
        }
        for section in &page.sections {
            tracker.register(section.clone());
        }
        tracker.poll(f64::from(app.scroll), f64::from(areas.page.height));

        tui.draw(|f| {
            render(f, &app, &page, tracker.active(), catalog, &session, &theme);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                if !handle_key(key_event.code, &mut app, catalog, &session, responder, settings.reply_delay(), &rt)? {
                    break;
                }
            }
        }
    }

    tracker.stop();
    Ok(())
}

/// Sends tracing output to the log file; the terminal belongs to the UI.
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path else {
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
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
