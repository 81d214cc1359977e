mod app;
mod highlight;
mod input;
mod settings;
mod ui;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Terminal chess practice board: play moves, get engine hints.
#[derive(Parser, Debug)]
#[command(name = "trainer-tui", version)]
struct Args {
    /// Engine executable path (overrides and updates the saved setting)
    #[arg(long)]
    engine_path: Option<PathBuf>,

    /// Per-query engine time budget in milliseconds (50-10000)
    #[arg(long)]
    engine_time_ms: Option<u64>,

    /// Start from a sequence of UCI moves, e.g. "e2e4 e7e5 g1f3"
    #[arg(long)]
    moves: Option<String>,

    /// Directory for debug logs
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to a file; the terminal belongs to the TUI.
    std::fs::create_dir_all(&args.log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&args.log_dir, "trainer-tui");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("trainer starting up");

    let mut settings = settings::load_or_default();
    if args.engine_path.is_some() || args.engine_time_ms.is_some() {
        if let Some(path) = args.engine_path {
            settings.engine_path = Some(path.display().to_string());
        }
        if let Some(time_ms) = args.engine_time_ms {
            settings.engine_time_ms = time_ms;
        }
        settings = settings.clamped();
        if let Err(e) = settings::save(&settings) {
            tracing::warn!("failed to save settings: {}", e);
        }
    }

    let mut game = chess::Game::new();
    if let Some(moves) = &args.moves {
        let parsed = moves
            .split_whitespace()
            .map(chess::parse_uci_move)
            .collect::<Result<Vec<_>, _>>()
            .context("invalid move in --moves")?;
        game.load_from_moves(&parsed)
            .context("illegal move in --moves")?;
    }

    let (events_tx, events_rx) = tokio::sync::mpsc::channel(16);
    let app = app::App::new(game, settings, events_tx);
    ui::run(app, events_rx).await?;

    tracing::info!("trainer shutting down");
    Ok(())
}
