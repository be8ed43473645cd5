//! APTO - a terminal client for the APTO school administration API.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use apto::api::{ApiClient, HttpTransport};
use apto::app::{App, Timing};
use apto::config::Config;
use apto::error::{AppError, Result};
use apto::events::{Event, EventHandler};
use apto::intent::Intent;
use apto::logging;
use apto::ui::Screen;

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Parser)]
#[command(name = "apto", version, about = "Terminal client for the APTO API")]
struct Cli {
    /// Base URL of the API, overriding the config file and APTO_API_URL.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Read settings from this file instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;
    if let Some(url) = &cli.api_url {
        config.settings.api_url = url.trim().to_string();
    }
    config.validate()?;
    Ok(config)
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().map_err(|e| AppError::terminal(e.to_string()))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| AppError::terminal(e.to_string()))?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| AppError::terminal(e.to_string()))
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let events = EventHandler::new();
    let mut screen = Screen::new();

    while !app.should_quit() {
        let mut regions = Vec::new();
        terminal.draw(|frame| regions = screen.render(frame, app))?;
        app.update(Intent::DropdownRegions(regions));

        match events.next()? {
            Event::Key(key) => {
                for intent in screen.on_key(app, key) {
                    app.update(intent);
                }
            }
            Event::PointerDown { x, y } => {
                for intent in screen.on_pointer(app, x, y) {
                    app.update(intent);
                }
            }
            Event::Resize(..) | Event::Tick => {}
        }

        app.tick();
        app.drain();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let log_dir = logging::init().context("failed to initialize logging")?;
    let settings = &config.settings;
    info!(api_url = %settings.api_url, log_dir = %log_dir.display(), "Configuration ready");

    let transport = HttpTransport::new(&settings.api_url, settings.request_timeout())
        .context("failed to create HTTP client")?;
    let mut app = App::new(ApiClient::new(Arc::new(transport)), Timing::from(settings));

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        error!(error = %e, "Application error");
        if e.is_critical() {
            eprintln!("{}", e.user_message());
        }
    }

    logging::shutdown();
    result.map_err(Into::into)
}
