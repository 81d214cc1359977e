//! Line-level parsing of messages coming back from a UCI engine.

use chess::MoveParseError;
use cozy_chess::Move;

/// Incoming message from a UCI engine.
///
/// Only the messages this tool acts on are represented; `info` lines are
/// recognized so callers can skip them without logging parse noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciMessage {
    Id { name: String, value: String },
    UciOk,
    ReadyOk,
    BestMove { mv: Move, ponder: Option<Move> },
    Info,
}

#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed UCI message: {0}")]
    MalformedMessage(String),
    #[error("unknown UCI message: {0}")]
    UnknownMessage(String),
    #[error(transparent)]
    InvalidMove(#[from] MoveParseError),
}

/// Parse one line of engine output.
pub fn parse_uci_message(line: &str) -> Result<UciMessage, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&"uciok") => Ok(UciMessage::UciOk),
        Some(&"readyok") => Ok(UciMessage::ReadyOk),
        Some(&"info") => Ok(UciMessage::Info),

        Some(&"id") => {
            if tokens.len() < 3 {
                return Err(UciError::MalformedMessage(line.to_string()));
            }
            Ok(UciMessage::Id {
                name: tokens[1].to_string(),
                value: tokens[2..].join(" "),
            })
        }

        Some(&"bestmove") => {
            if tokens.len() < 2 {
                return Err(UciError::MalformedMessage(line.to_string()));
            }
            // "bestmove (none)" means the engine has no move (mate/stalemate).
            let mv = chess::parse_uci_move(tokens[1])?;
            let ponder = if tokens.len() >= 4 && tokens[2] == "ponder" {
                Some(chess::parse_uci_move(tokens[3])?)
            } else {
                None
            };
            Ok(UciMessage::BestMove { mv, ponder })
        }

        _ => Err(UciError::UnknownMessage(line.to_string())),
    }
}
