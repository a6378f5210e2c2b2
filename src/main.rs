//! records-console binary entry point.
//!
//! Parses flags, loads the config files, starts logging and the tokio runtime,
//! then runs the TUI in raw mode and restores the terminal on exit.
//!
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use records_console::api::{HttpApi, MemoryApi, ResourceApi};
use records_console::app::connection::{Cli, ConnectionConfig};
use records_console::app::keymap::Keymap;
use records_console::app::{self, AppState, Theme, conf};
use records_console::effects::Effects;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// The terminal is in raw mode while the app runs, so logs go to a file.
fn init_logging(cli: &Cli) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("open log file {}", cli.log_file))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn build_api(cfg: &ConnectionConfig) -> Result<Arc<dyn ResourceApi>> {
    if cfg.offline {
        tracing::info!("offline mode: using built-in demo data");
        return Ok(Arc::new(MemoryApi::seeded()));
    }
    let api = HttpApi::new(&cfg.api_url, cfg.timeout())
        .context("build HTTP client")?
        .with_upload_endpoint(&cfg.upload_endpoint)
        .with_token(cfg.token.clone());
    tracing::info!(base = api.base_url(), "using REST backend");
    Ok(Arc::new(api))
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let conf_path = cli
        .config
        .clone()
        .unwrap_or_else(|| conf::config_file_write_path("connection.conf"));
    let mut cfg = ConnectionConfig::load_or_init(&conf_path);
    cli.apply_to(&mut cfg);
    let theme = Theme::load_or_init(&conf::config_file_write_path("theme.conf"));
    let keymap = Keymap::load_or_init(&conf::config_file_write_path("keybinds.conf"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;
    let api = build_api(&cfg)?;
    let mut effects = Effects::new(api, runtime.handle().clone());
    let mut state = AppState::new(&cfg, cli.resource, theme, keymap);

    let mut terminal = init_terminal().context("init terminal")?;
    let res = app::run(&mut terminal, &mut state, &mut effects);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err:#}");
    }
    Ok(())
}
