//! Tempo EDF - status indicator for the EDF Tempo tariff
//!
//! Shows today's and tomorrow's Tempo color and the current price in a
//! terminal status panel, refreshed on demand and at every local midnight.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};

use tempotray::app::{MenuItem, TempoApp};
use tempotray::autostart::platform_autostart;
use tempotray::cache::TtlCache;
use tempotray::cli::{Cli, RunMode};
use tempotray::config::Config;
use tempotray::data::TempoClient;
use tempotray::error::AppError;
use tempotray::indicator::IconSet;
use tempotray::logging::{self, LogFileError, LogTarget};
use tempotray::notify::{ChannelSink, LogNotifier, UiEvent, NOTIFICATION_TITLE};
use tempotray::refresh::{RefreshTrigger, Refresher};
use tempotray::scheduler::SchedulerHandle;
use tempotray::ui::{render_status_panel, StatusPanel};

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn build_refresher(config: &Config) -> Result<Refresher, AppError> {
    let cache = Arc::new(TtlCache::new());
    let client = TempoClient::new(config, cache)?;
    Ok(Refresher::new(client))
}

/// Single refresh, status printed to stdout
async fn run_once(config: &Config) -> Result<(), AppError> {
    let sink = Arc::new(LogNotifier);
    let app = TempoApp::new(build_refresher(config)?, sink.clone(), sink);

    let state = app.refresh(RefreshTrigger::Startup).await;
    for item in [MenuItem::Today, MenuItem::Tomorrow, MenuItem::Tariff] {
        println!("{}", app.menu_label(item, &state));
    }
    println!("{}", state.tariff_label);
    Ok(())
}

fn run_autostart(enable: bool) -> Result<(), AppError> {
    let autostart = platform_autostart()?;
    if enable {
        autostart.enable()?;
        println!("Application ajoutée au démarrage");
    } else {
        autostart.disable()?;
        println!("Application supprimée du démarrage");
    }
    Ok(())
}

/// Status panel with midnight rollover
async fn run_tray(config: &Config, log_failure: Option<LogFileError>) -> Result<(), AppError> {
    // The indicator is unusable without its icons
    let icons = IconSet::load(&config.assets_dir)?;

    let (sink, mut events) = ChannelSink::new();
    let sink = Arc::new(sink);
    let mut app = TempoApp::new(build_refresher(config)?, sink.clone(), sink);
    match platform_autostart() {
        Ok(autostart) => app = app.with_autostart(autostart),
        Err(e) => info!(error = %e, "autostart unavailable"),
    }
    let app = Arc::new(app);

    app.refresh(RefreshTrigger::Startup).await;

    let scheduler = {
        let app = Arc::clone(&app);
        SchedulerHandle::spawn(move || {
            let app = Arc::clone(&app);
            async move {
                app.refresh(RefreshTrigger::Midnight).await;
            }
        })
    };

    setup_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut panel = StatusPanel::new();
    if let Some(e) = log_failure {
        panel.apply(UiEvent::Notification {
            title: NOTIFICATION_TITLE.to_string(),
            message: e.to_string(),
        });
    }
    info!("status panel ready");

    let result = loop {
        while let Ok(event) = events.try_recv() {
            panel.apply(event);
        }

        let state = app.snapshot();
        let items = app.menu_items();
        let labels: Vec<String> = items
            .iter()
            .map(|&item| app.menu_label(item, &state))
            .collect();

        if let Err(e) = terminal.draw(|f| render_status_panel(f, &panel, &labels, &icons)) {
            break Err(e);
        }

        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(item) = panel.handle_key(key, &items) {
                        dispatch(&app, &mut panel, item);
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        if panel.should_quit {
            break Ok(());
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    info!("Tempo EDF quitting");
    scheduler.shutdown().await;
    result.map_err(AppError::from)
}

fn dispatch(app: &Arc<TempoApp>, panel: &mut StatusPanel, item: MenuItem) {
    match item {
        MenuItem::Today | MenuItem::Tomorrow | MenuItem::Tariff => {
            app.show_info(item);
        }
        MenuItem::Refresh => {
            let app = Arc::clone(app);
            tokio::spawn(async move {
                app.refresh(RefreshTrigger::Manual).await;
            });
        }
        MenuItem::Autostart => {
            // Failures are already notified
            let _ = app.toggle_autostart();
        }
        MenuItem::Quit => panel.should_quit = true,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    let mode = cli.run_mode();

    let (target, fallback) =
        LogTarget::for_mode(mode, config.log_file.as_deref(), cli.log_file.is_some());
    let log_failure = logging::init(cli.log_level, &target, &fallback).err();
    if let Some(e) = &log_failure {
        warn!(path = %e.path.display(), error = %e.source, "log file unavailable");
    }
    info!(?mode, api_url = %config.api_url, "Tempo EDF started");

    let result = match mode {
        RunMode::Tray => run_tray(&config, log_failure).await,
        RunMode::Once => run_once(&config).await,
        RunMode::EnableAutostart => run_autostart(true),
        RunMode::DisableAutostart => run_autostart(false),
    };

    if let Err(e) = &result {
        error!(error = %e, "Tempo EDF stopped");
    }
    result.map_err(Into::into)
}
