pub mod game;
pub mod uci;

pub use game::{Game, GameError, HistoryEntry};
pub use uci::{
    convert_uci_castling_to_cozy, format_piece, format_square, format_uci_move, parse_square,
    parse_uci_move, MoveParseError,
};
