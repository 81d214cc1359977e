//! Engine session: lifecycle of one external UCI engine subprocess and the
//! time-bounded best-move queries issued against it.

use crate::uci::{parse_uci_message, UciError, UciMessage};
use chess::format_uci_move;
use cozy_chess::Move;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Minimum per-query time budget in milliseconds.
pub const MIN_MOVETIME_MS: u64 = 50;
/// Maximum per-query time budget in milliseconds.
pub const MAX_MOVETIME_MS: u64 = 10_000;

/// Grace period on top of the movetime budget before a query is declared
/// dead. The engine needs a moment after its own deadline to print the
/// bestmove line.
const BESTMOVE_GRACE_MS: u64 = 2_000;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const QUIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Candidate executable locations, tried in order when no explicit path is
/// configured.
const ENGINE_CANDIDATES: &[&str] = &[
    "stockfish",
    "/usr/local/bin/stockfish",
    "/usr/bin/stockfish",
    "/opt/homebrew/bin/stockfish",
    "/usr/games/stockfish",
    "~/.local/bin/stockfish",
];

/// Engine configuration: where the executable lives and how long each query
/// may search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSessionConfig {
    /// Explicit executable path. When unset, [`ENGINE_CANDIDATES`] is
    /// searched in order.
    pub path: Option<PathBuf>,
    /// Per-query time budget handed to `go movetime`.
    pub movetime_ms: u64,
}

impl Default for EngineSessionConfig {
    fn default() -> Self {
        Self {
            path: None,
            movetime_ms: 1_000,
        }
    }
}

impl EngineSessionConfig {
    /// Returns the config with the time budget clamped to the supported
    /// range.
    pub fn clamped(mut self) -> Self {
        self.movetime_ms = self.movetime_ms.clamp(MIN_MOVETIME_MS, MAX_MOVETIME_MS);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no engine executable found; set an explicit path")]
    NotFound,
    #[error("failed to spawn engine: {0}")]
    Spawn(String),
    #[error("engine handshake failed: {0}")]
    Handshake(String),
}

/// A running engine subprocess with its piped stdio.
struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    reader: Lines<BufReader<ChildStdout>>,
}

impl EngineProcess {
    async fn send(&mut self, line: &str) -> Result<(), std::io::Error> {
        tracing::trace!("UCI >> {}", line);
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await
    }

    /// Read lines until `pred` matches a parsed message. Lines that do not
    /// parse (engine banners and the like) are skipped.
    async fn wait_for(
        &mut self,
        dur: Duration,
        pred: fn(&UciMessage) -> bool,
    ) -> Result<(), EngineError> {
        let wait = async {
            loop {
                match self.reader.next_line().await {
                    Ok(Some(line)) => {
                        tracing::trace!("UCI << {}", line);
                        if let Ok(msg) = parse_uci_message(&line) {
                            if pred(&msg) {
                                return Ok(());
                            }
                        }
                    }
                    Ok(None) => {
                        return Err(EngineError::Handshake(
                            "engine closed its output".to_string(),
                        ))
                    }
                    Err(e) => return Err(EngineError::Handshake(e.to_string())),
                }
            }
        };
        tokio::time::timeout(dur, wait)
            .await
            .map_err(|_| EngineError::Handshake("timed out waiting for engine".to_string()))?
    }

    /// Read lines until a bestmove arrives. `Ok(None)` means the engine
    /// answered `bestmove (none)` (no legal move in the position).
    async fn read_bestmove(&mut self) -> Result<Option<Move>, UciError> {
        loop {
            let line = match self.reader.next_line().await? {
                Some(line) => line,
                None => {
                    return Err(UciError::Io(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "engine closed its output",
                    )))
                }
            };
            tracing::trace!("UCI << {}", line);

            match parse_uci_message(&line) {
                Ok(UciMessage::BestMove { mv, .. }) => return Ok(Some(mv)),
                Ok(_) => {}
                Err(_) if line.trim_start().starts_with("bestmove") => return Ok(None),
                Err(_) => {}
            }
        }
    }
}

/// Wraps at most one engine subprocess and hands out best-move suggestions.
///
/// Query-time failures never escape: the session logs, drops its handle so
/// the next query relaunches, and reports the suggestion as unavailable.
/// Only [`EngineSession::ensure_started`] raises an actionable error, and
/// only when no executable resolves at all.
pub struct EngineSession {
    config: EngineSessionConfig,
    proc: Option<EngineProcess>,
}

impl EngineSession {
    pub fn new(config: EngineSessionConfig) -> Self {
        Self {
            config: config.clamped(),
            proc: None,
        }
    }

    pub fn config(&self) -> &EngineSessionConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.proc.is_some()
    }

    /// Replace the configuration. Any live subprocess is stopped so the
    /// next query launches fresh under the new settings.
    pub async fn set_config(&mut self, config: EngineSessionConfig) {
        self.stop().await;
        self.config = config.clamped();
    }

    /// Launch the subprocess and run the UCI handshake, if not already
    /// running.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn ensure_started(&mut self) -> Result<(), EngineError> {
        if self.proc.is_some() {
            return Ok(());
        }

        let path = resolve_engine_path(&self.config).ok_or(EngineError::NotFound)?;
        tracing::info!(path = %path.display(), "launching engine");

        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("engine has no stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("engine has no stdout".to_string()))?;

        let mut proc = EngineProcess {
            child,
            stdin,
            reader: BufReader::new(stdout).lines(),
        };

        let handshake = async {
            proc.send("uci")
                .await
                .map_err(|e| EngineError::Handshake(e.to_string()))?;
            proc.wait_for(HANDSHAKE_TIMEOUT, |m| matches!(m, UciMessage::UciOk))
                .await?;
            proc.send("isready")
                .await
                .map_err(|e| EngineError::Handshake(e.to_string()))?;
            proc.wait_for(HANDSHAKE_TIMEOUT, |m| matches!(m, UciMessage::ReadyOk))
                .await
        };

        match handshake.await {
            Ok(()) => {
                tracing::info!("engine ready");
                self.proc = Some(proc);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("engine handshake failed: {}", e);
                let _ = proc.child.kill().await;
                Err(e)
            }
        }
    }

    /// Ask the engine for the best move in the position reached by playing
    /// `moves` from `fen`, searching for the configured time budget.
    ///
    /// Returns `None` ("unavailable") on any failure: the engine could not
    /// be started, died mid-request, overran its budget, or answered with
    /// something unusable. After a dead or overrun subprocess the handle is
    /// dropped so the next call relaunches.
    #[tracing::instrument(level = "debug", skip(self, fen, moves))]
    pub async fn best_move(&mut self, fen: &str, moves: &[Move]) -> Option<Move> {
        if let Err(e) = self.ensure_started().await {
            tracing::warn!("engine unavailable: {}", e);
            return None;
        }
        let budget_ms = self.config.movetime_ms;
        let proc = self.proc.as_mut()?;

        let mut position_cmd = format!("position fen {}", fen);
        if !moves.is_empty() {
            position_cmd.push_str(" moves");
            for mv in moves {
                position_cmd.push(' ');
                position_cmd.push_str(&format_uci_move(*mv));
            }
        }
        let go_cmd = format!("go movetime {}", budget_ms);

        for cmd in [position_cmd.as_str(), go_cmd.as_str()] {
            if let Err(e) = proc.send(cmd).await {
                tracing::warn!("failed to write to engine: {}", e);
                self.teardown().await;
                return None;
            }
        }

        let deadline = Duration::from_millis(budget_ms + BESTMOVE_GRACE_MS);
        match tokio::time::timeout(deadline, proc.read_bestmove()).await {
            Ok(Ok(Some(mv))) => {
                tracing::debug!(mv = %format_uci_move(mv), "engine suggestion");
                Some(mv)
            }
            Ok(Ok(None)) => {
                tracing::info!("engine reports no move for this position");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("engine query failed: {}", e);
                self.teardown().await;
                None
            }
            Err(_) => {
                tracing::warn!(budget_ms, "engine overran its time budget");
                self.teardown().await;
                None
            }
        }
    }

    /// Request graceful termination; kill on timeout. Always clears the
    /// handle. No-op when nothing is running.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn stop(&mut self) {
        let Some(mut proc) = self.proc.take() else {
            return;
        };
        tracing::info!("stopping engine");
        let _ = proc.send("quit").await;
        if tokio::time::timeout(QUIT_TIMEOUT, proc.child.wait())
            .await
            .is_err()
        {
            let _ = proc.child.kill().await;
        }
    }

    async fn teardown(&mut self) {
        if let Some(mut proc) = self.proc.take() {
            let _ = proc.child.kill().await;
        }
    }
}

/// Resolve the engine executable: explicit configuration wins, otherwise
/// the first candidate that exists (bare names are searched in $PATH).
fn resolve_engine_path(config: &EngineSessionConfig) -> Option<PathBuf> {
    if let Some(path) = &config.path {
        return locate(path);
    }
    ENGINE_CANDIDATES
        .iter()
        .find_map(|c| locate(&expand_home(c)))
}

fn locate(path: &Path) -> Option<PathBuf> {
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    // Bare name: search $PATH.
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(path))
        .find(|full| full.is_file())
}

fn expand_home(candidate: &str) -> PathBuf {
    match candidate.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(candidate),
        },
        None => PathBuf::from(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_clamps_time_budget() {
        let low = EngineSessionConfig {
            path: None,
            movetime_ms: 1,
        };
        assert_eq!(low.clamped().movetime_ms, MIN_MOVETIME_MS);

        let high = EngineSessionConfig {
            path: None,
            movetime_ms: 60_000,
        };
        assert_eq!(high.clamped().movetime_ms, MAX_MOVETIME_MS);

        let fine = EngineSessionConfig {
            path: None,
            movetime_ms: 1_000,
        };
        assert_eq!(fine.clamped().movetime_ms, 1_000);
    }

    #[test]
    fn explicit_path_is_not_widened_to_candidates() {
        let config = EngineSessionConfig {
            path: Some(PathBuf::from("/nonexistent/engine/binary")),
            movetime_ms: 1_000,
        };
        assert_eq!(resolve_engine_path(&config), None);
    }

    #[test]
    fn expand_home_only_touches_tilde_prefix() {
        assert_eq!(
            expand_home("/usr/bin/stockfish"),
            PathBuf::from("/usr/bin/stockfish")
        );
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_home("~/.local/bin/stockfish"),
                PathBuf::from(home).join(".local/bin/stockfish")
            );
        }
    }
}
