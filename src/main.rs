use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use acr::action::Action;
use acr::app::App;
use acr::clipboard::SystemClipboard;
use acr::command::CommandExecutor;
use acr::config::{AppConfig, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT_SECS};
use acr::domain::service::HttpReviewService;
use acr::{event, ui, update};

#[derive(Parser)]
#[command(name = "acr")]
#[command(about = "AI Code Reviewer - submit code for review from the terminal")]
struct Cli {
    /// Base URL of the review service
    #[arg(long, env = "ACR_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Stop polling after this many seconds (polls until done if omitted)
    #[arg(long)]
    poll_timeout: Option<u64>,

    /// Give up on a single request after this many seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,

    /// Directory downloaded review archives are saved to
    #[arg(long, default_value = ".")]
    download_dir: PathBuf,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, default_value = "acr.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::new(
        cli.api_base,
        cli.poll_timeout,
        cli.request_timeout,
        cli.download_dir,
        cli.log_file,
    );

    let _guard = setup_logging(&config)?;
    info!(api_base = %config.api_base, "starting acr");

    let service = HttpReviewService::new(&config.api_base, config.retry_policy.request_timeout)
        .with_context(|| format!("Invalid --api-base {}", config.api_base))?;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut executor = CommandExecutor::new(
        Arc::new(service),
        Arc::new(SystemClipboard::new()),
        tx.clone(),
        config.retry_policy,
        config.download_dir.clone(),
    );

    // Setup terminal
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    event::spawn_event_task(tx);

    let mut app = App::new();
    let result = run_app(&mut terminal, &mut app, &mut executor, rx).await;

    // Restore terminal
    restore_terminal()?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    executor: &mut CommandExecutor,
    mut rx: UnboundedReceiver<Action>,
) -> Result<()> {
    executor.execute_all(update::init(app));

    loop {
        app.viewport_height = ui::main_area_height(terminal.size()?.height);
        terminal.draw(|f| ui::render(f, app))?;

        let Some(action) = rx.recv().await else {
            break;
        };
        let commands = update::update(app, action);
        executor.execute_all(commands);

        if app.should_quit {
            break;
        }
    }

    info!("exiting");
    Ok(())
}

fn setup_logging(config: &AppConfig) -> Result<WorkerGuard> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("Failed to create log file {}", config.log_file.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste)?;
    Ok(())
}

/// Leave the alternate screen before the panic message is printed
fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original(info);
    }));
}
