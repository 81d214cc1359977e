//! Application state: ties the game, the input machine, the highlight
//! markers, and the engine session together.

use crate::highlight::HighlightState;
use crate::input::{ClickOutcome, InputState};
use crate::settings::{self, Settings};
use chess::{convert_uci_castling_to_cozy, format_uci_move, Game, GameError};
use cozy_chess::{Color, Move, Square};
use engine::{EngineError, EngineSession};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Events delivered back into the input-handling loop from spawned work.
#[derive(Debug)]
pub enum AppEvent {
    /// An engine query finished. `fen` is the position the query was issued
    /// for; any mismatch with the current position (undo and a different
    /// replacement move included) means the result is stale.
    SuggestionReady { fen: String, result: Option<Move> },
}

pub struct App {
    pub game: Game,
    pub input: InputState,
    pub highlights: HighlightState,
    pub settings: Settings,
    pub status: Option<String>,
    pub flipped: bool,
    pub should_quit: bool,
    /// The engine subprocess handle lives behind this mutex; the query task
    /// holds the lock for the duration of one request.
    session: Arc<Mutex<EngineSession>>,
    engine_busy: bool,
    events_tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(game: Game, settings: Settings, events_tx: mpsc::Sender<AppEvent>) -> Self {
        let session = EngineSession::new(settings.engine_config());
        Self {
            game,
            input: InputState::default(),
            highlights: HighlightState::default(),
            settings,
            status: Some("Ready.".to_string()),
            flipped: false,
            should_quit: false,
            session: Arc::new(Mutex::new(session)),
            engine_busy: false,
            events_tx,
        }
    }

    /// Try the engine once at startup so a missing executable is reported
    /// immediately. The tool stays usable without suggestions either way.
    pub async fn startup_probe(&mut self) {
        match self.session.lock().await.ensure_started().await {
            Ok(()) => self.status = Some("Engine ready.".to_string()),
            Err(EngineError::NotFound) => {
                self.status = Some(
                    "Engine not found. Install stockfish or pass --engine-path; hints disabled."
                        .to_string(),
                );
            }
            Err(e) => {
                tracing::warn!("engine probe failed: {}", e);
                self.status = Some("Engine failed to start; hints unavailable.".to_string());
            }
        }
    }

    pub fn handle_click(&mut self, square: Square) {
        match self.input.click(&self.game, square) {
            ClickOutcome::Selected(sq) => {
                self.highlights.selected = Some(sq);
            }
            ClickOutcome::Deselected | ClickOutcome::Ignored => {
                self.highlights.clear_selection();
            }
            ClickOutcome::Play(mv) => self.play_move(mv),
        }
    }

    fn play_move(&mut self, mv: Move) {
        match self.game.commit(mv) {
            Ok(entry) => {
                self.highlights.set_human_move(mv);
                self.status = Some(format!("Moved {}.", entry.san));
                tracing::info!(san = %entry.san, "move played");
                self.request_suggestion();
            }
            Err(_) => {
                // The FSM validated against the same position, so this only
                // fires if state drifted; treat it like a failed click.
                self.highlights.clear_selection();
            }
        }
    }

    /// Kick off one engine query for the current position on a worker task.
    /// At most one query is outstanding; further requests are rejected
    /// until its result has been consumed.
    fn request_suggestion(&mut self) {
        if self.engine_busy {
            tracing::warn!("engine query already in flight; skipping");
            return;
        }
        self.engine_busy = true;

        let session = Arc::clone(&self.session);
        let tx = self.events_tx.clone();
        let start_fen = self.game.start_fen();
        let moves = self.game.moves();
        let position_fen = self.game.to_fen();

        tokio::spawn(async move {
            let result = session.lock().await.best_move(&start_fen, &moves).await;
            let _ = tx
                .send(AppEvent::SuggestionReady {
                    fen: position_fen,
                    result,
                })
                .await;
        });
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SuggestionReady { fen, result } => {
                self.engine_busy = false;
                if fen != self.game.to_fen() {
                    tracing::debug!("discarding stale engine suggestion");
                    return;
                }
                match result {
                    Some(raw) => {
                        let mv = convert_uci_castling_to_cozy(raw, &self.game.legal_moves());
                        self.highlights.set_engine_move(mv);
                        let side = side_label(self.game.side_to_move());
                        let display = self
                            .game
                            .san(mv)
                            .unwrap_or_else(|| format_uci_move(mv));
                        self.status = Some(format!("Engine suggests for {}: {}", side, display));
                    }
                    None => {
                        self.status = Some("Engine unavailable.".to_string());
                    }
                }
            }
        }
    }

    pub fn new_game(&mut self) {
        self.game.reset();
        self.input.reset();
        self.highlights.clear_all();
        self.status = Some("New game.".to_string());
    }

    pub fn undo(&mut self) {
        match self.game.undo() {
            Ok(()) => {
                self.input.reset();
                self.highlights.clear_selection();
                self.highlights.clear_engine_markers();
                self.highlights.last_human_move = self
                    .game
                    .history()
                    .last()
                    .map(|e| (e.mv.from, e.mv.to));
                self.status = Some("Move undone.".to_string());
            }
            Err(GameError::NoHistory) => {
                self.status = Some("Nothing to undo.".to_string());
            }
            Err(e) => {
                tracing::warn!("undo failed: {}", e);
            }
        }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn clear_selection(&mut self) {
        self.input.reset();
        self.highlights.clear_selection();
    }

    /// Adjust the engine time budget. Saves the setting and hands the new
    /// config to the session on a worker task, since a query in flight holds
    /// the session lock and the input loop must not wait on it.
    pub fn adjust_engine_time(&mut self, delta_ms: i64) {
        let current = self.settings.engine_time_ms as i64;
        self.settings.engine_time_ms = current.saturating_add(delta_ms).max(0) as u64;
        self.settings = self.settings.clone().clamped();

        if let Err(e) = settings::save(&self.settings) {
            tracing::warn!("failed to save settings: {}", e);
        }
        let session = Arc::clone(&self.session);
        let config = self.settings.engine_config();
        tokio::spawn(async move {
            session.lock().await.set_config(config).await;
        });
        self.status = Some(format!(
            "Engine time set to {} ms.",
            self.settings.engine_time_ms
        ));
    }

    pub fn engine_busy(&self) -> bool {
        self.engine_busy
    }

    pub async fn shutdown(&mut self) {
        self.session.lock().await.stop().await;
    }
}

fn side_label(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}
