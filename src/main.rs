use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use ridepage::app::PageController;
use ridepage::async_tasks::{AsyncTaskRunner, TaskMessage};
use ridepage::cli::Cli;
use ridepage::constants::{FRAME_DURATION_MS, RESIZE_DEBOUNCE_MS};
use ridepage::markup::{PageBindings, parse_page};
use ridepage::persistence::{ConfigStore, load_config_file};
use ridepage::types::Config;
use ridepage::ui::{self, Preview};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.validate().map_err(anyhow::Error::msg)?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = match &cli.log_file {
        Some(log_file) => {
            let guard = init_logging(log_file)?;
            tracing::info!("=== ridepage starting ===");
            tracing::info!("Log file: {}", log_file);
            Some(guard)
        }
        None => None,
    };

    let config = load_config(&cli);
    let bindings = parse_page(&cli.page)?;

    setup_terminal()?;
    tracing::debug!("Terminal setup completed");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Ctrl-C received, shutting down");
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl-C handler")?;

    let result = run_app(&cli, config, bindings, running).await;

    cleanup_terminal()?;
    tracing::debug!("Terminal cleanup completed");

    result
}

fn setup_terminal() -> Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Hide)?;

    // Restore the terminal before the panic message prints
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = cleanup_terminal();
        original_hook(panic_info);
    }));

    Ok(())
}

fn cleanup_terminal() -> Result<()> {
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

fn init_logging(log_file: &str) -> Result<WorkerGuard> {
    use std::fs::OpenOptions;

    // Open/create log file, truncating if it exists
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file))?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ridepage=debug")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// `--config` wins over the per-user config file; any failure means defaults
fn load_config(cli: &Cli) -> Config {
    let loaded = match &cli.config {
        Some(path) => load_config_file(Path::new(path)),
        None => ConfigStore::new().and_then(|store| store.load_config()),
    };

    loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {:#}. Using defaults.", e);
        Config::default()
    })
}

async fn run_app(
    cli: &Cli,
    config: Config,
    bindings: PageBindings,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let (task_tx, mut task_rx) = mpsc::unbounded_channel();
    let task_runner = AsyncTaskRunner::new(task_tx);
    let resize_tx = task_runner.spawn_resize_debouncer(RESIZE_DEBOUNCE_MS);

    let today = chrono::Local::now().date_naive();
    let mut controller = PageController::new(bindings, config, task_runner, today)?;
    controller.start();

    let (width, height) = crossterm::terminal::size()?;
    tracing::debug!("Terminal size: {}x{}", width, height);
    let mut preview = Preview::new(controller, cli.px_per_cell, width, height);

    run_event_loop(&mut terminal, &mut preview, &mut task_rx, running, &resize_tx).await?;

    tracing::info!("ridepage shutting down");
    Ok(())
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    preview: &mut Preview,
    task_rx: &mut mpsc::UnboundedReceiver<TaskMessage>,
    running: Arc<AtomicBool>,
    resize_tx: &mpsc::UnboundedSender<(u16, u16)>,
) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_DURATION_MS);

    while running.load(Ordering::SeqCst) && !preview.should_quit {
        let frame_start = Instant::now();

        // Process all pending task messages (non-blocking)
        while let Ok(msg) = task_rx.try_recv() {
            handle_task_message(preview, msg);
        }

        preview.tick();

        terminal.draw(|f| {
            ui::layout::render(f, preview);
        })?;

        // Poll for input events (non-blocking)
        if event::poll(Duration::from_millis(0))? {
            let ev = event::read()?;
            handle_event(preview, ev, resize_tx);
        }

        // Sleep to maintain frame rate
        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            tokio::time::sleep(frame_duration - elapsed).await;
        }
    }

    Ok(())
}

fn handle_task_message(preview: &mut Preview, msg: TaskMessage) {
    match msg {
        TaskMessage::ResizeComplete { width, height } => {
            tracing::info!("Resize complete: {}x{}", width, height);
            preview.refit();
        }
        msg => preview.controller.handle_task_message(msg),
    }
}

fn handle_event(preview: &mut Preview, ev: Event, resize_tx: &mpsc::UnboundedSender<(u16, u16)>) {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            ui::handle_key_event(preview, key);
        }
        Event::Resize(width, height) => {
            // Viewport and menu react immediately; measuring waits for the debounce
            preview.resize(width, height);
            let _ = resize_tx.send((width, height));
        }
        _ => {}
    }
}
