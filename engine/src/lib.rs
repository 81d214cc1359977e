pub mod session;
pub mod uci;

pub use session::{
    EngineError, EngineSession, EngineSessionConfig, MAX_MOVETIME_MS, MIN_MOVETIME_MS,
};
pub use uci::{parse_uci_message, UciError, UciMessage};
