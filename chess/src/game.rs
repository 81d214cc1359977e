use cozy_chess::{Board, Color, GameStatus, Move, Piece};

use crate::uci::file_char;

/// Game state: the current position plus the move history that produced it.
///
/// All mutation goes through [`Game::commit`], which gates on the legal move
/// set, so the position is only ever reachable via legal play.
#[derive(Debug, Clone)]
pub struct Game {
    position: Board,
    start: Board,
    history: Vec<HistoryEntry>,
}

/// One committed move, with the notation and resulting position recorded
/// at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub san: String,
    pub fen: String,
}

impl Game {
    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self {
            position: Board::default(),
            start: Board::default(),
            history: Vec::new(),
        }
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let position: Board = fen.parse().map_err(|_| GameError::InvalidFen)?;
        Ok(Self {
            start: position.clone(),
            position,
            history: Vec::new(),
        })
    }

    /// Reset to the game's starting position, discarding all history.
    pub fn reset(&mut self) {
        self.position = self.start.clone();
        self.history.clear();
    }

    /// Commit a move. The move must be in the current legal move set;
    /// otherwise the position is left untouched.
    pub fn commit(&mut self, mv: Move) -> Result<HistoryEntry, GameError> {
        if !self.is_legal(mv) {
            return Err(GameError::IllegalMove);
        }

        let piece = self.position.piece_on(mv.from).ok_or(GameError::IllegalMove)?;
        let captured = self.position.piece_on(mv.to).filter(|_| {
            // A castling move in cozy-chess notation lands the king on its
            // own rook; that rook is not a capture.
            self.position.color_on(mv.to) != self.position.color_on(mv.from)
        });
        let san = generate_san(&self.position, mv, piece);

        let mut next = self.position.clone();
        next.play_unchecked(mv);
        self.position = next;

        let entry = HistoryEntry {
            mv,
            piece,
            captured,
            san,
            fen: self.to_fen(),
        };
        self.history.push(entry.clone());

        Ok(entry)
    }

    /// Undo the most recent move by replaying history from the start.
    pub fn undo(&mut self) -> Result<(), GameError> {
        if self.history.is_empty() {
            return Err(GameError::NoHistory);
        }

        self.history.pop();
        let mut board = self.start.clone();
        for entry in &self.history {
            board.play_unchecked(entry.mv);
        }
        self.position = board;
        Ok(())
    }

    /// Reset and replay an externally parsed move sequence. Stops at the
    /// first illegal move and reports its index.
    pub fn load_from_moves(&mut self, moves: &[Move]) -> Result<(), GameError> {
        self.reset();
        for (index, &mv) in moves.iter().enumerate() {
            if self.commit(mv).is_err() {
                self.reset();
                return Err(GameError::InvalidSequence { index });
            }
        }
        Ok(())
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.position.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.legal_moves().contains(&mv)
    }

    pub fn position(&self) -> &Board {
        &self.position
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Moves played so far, in order, for feeding a UCI `position` command.
    pub fn moves(&self) -> Vec<Move> {
        self.history.iter().map(|e| e.mv).collect()
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn status(&self) -> GameStatus {
        self.position.status()
    }

    pub fn to_fen(&self) -> String {
        self.position.to_string()
    }

    pub fn start_fen(&self) -> String {
        self.start.to_string()
    }

    /// SAN for a move in the current position, or `None` if it is not legal.
    pub fn san(&self, mv: Move) -> Option<String> {
        if !self.is_legal(mv) {
            return None;
        }
        let piece = self.position.piece_on(mv.from)?;
        Some(generate_san(&self.position, mv, piece))
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate simplified SAN notation for a move (no check/mate suffixes,
/// no disambiguation beyond pawn-capture files).
fn generate_san(board: &Board, mv: Move, piece: Piece) -> String {
    // Castling: cozy-chess encodes it as king-takes-own-rook.
    if piece == Piece::King
        && board.piece_on(mv.to) == Some(Piece::Rook)
        && board.color_on(mv.to) == board.color_on(mv.from)
    {
        return if mv.to.file() > mv.from.file() {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let takes_occupied =
        board.piece_on(mv.to).is_some() && board.color_on(mv.to) != board.color_on(mv.from);
    // En passant: a pawn moving diagonally onto an empty square.
    let takes_en_passant = piece == Piece::Pawn
        && mv.from.file() != mv.to.file()
        && board.piece_on(mv.to).is_none();
    let is_capture = takes_occupied || takes_en_passant;

    let mut san = String::new();
    match piece {
        Piece::King => san.push('K'),
        Piece::Queen => san.push('Q'),
        Piece::Rook => san.push('R'),
        Piece::Bishop => san.push('B'),
        Piece::Knight => san.push('N'),
        Piece::Pawn => {
            if is_capture {
                san.push(file_char(mv.from.file()));
            }
        }
    }

    if is_capture {
        san.push('x');
    }

    san.push_str(&crate::uci::format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(crate::uci::format_piece(promo).to_ascii_uppercase());
    }

    san
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("illegal move")]
    IllegalMove,
    #[error("nothing to undo")]
    NoHistory,
    #[error("illegal move at index {index} in move sequence")]
    InvalidSequence { index: usize },
    #[error("invalid FEN")]
    InvalidFen,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::parse_uci_move;
    use proptest::prelude::*;

    fn mv(s: &str) -> Move {
        parse_uci_move(s).unwrap()
    }

    #[test]
    fn commit_legal_move_flips_side_to_move() {
        let mut game = Game::new();
        assert_eq!(game.side_to_move(), Color::White);

        let entry = game.commit(mv("e2e4")).unwrap();
        assert_eq!(entry.san, "e4");
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn commit_illegal_move_is_a_no_op() {
        let mut game = Game::new();
        let before = game.to_fen();

        assert_eq!(game.commit(mv("e2e5")), Err(GameError::IllegalMove));
        assert_eq!(game.to_fen(), before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn undo_restores_prior_position() {
        let mut game = Game::new();
        let start = game.to_fen();

        game.commit(mv("e2e4")).unwrap();
        game.commit(mv("e7e5")).unwrap();
        game.undo().unwrap();
        assert_eq!(game.side_to_move(), Color::Black);
        game.undo().unwrap();

        assert_eq!(game.to_fen(), start);
        assert_eq!(game.undo(), Err(GameError::NoHistory));
    }

    #[test]
    fn load_from_moves_replays_in_order() {
        let mut game = Game::new();
        game.load_from_moves(&[mv("e2e4"), mv("e7e5"), mv("g1f3")])
            .unwrap();

        assert_eq!(game.history().len(), 3);
        assert_eq!(game.side_to_move(), Color::Black);
    }

    #[test]
    fn load_from_moves_reports_first_illegal_index() {
        let mut game = Game::new();
        let err = game
            .load_from_moves(&[mv("e2e4"), mv("e2e4"), mv("g1f3")])
            .unwrap_err();

        assert_eq!(err, GameError::InvalidSequence { index: 1 });
        // A failed load leaves the game at the starting position.
        assert!(game.history().is_empty());
        assert_eq!(game.to_fen(), Game::new().to_fen());
    }

    #[test]
    fn san_records_captures_and_promotions() {
        let mut game = Game::new();
        for m in ["e2e4", "d7d5"] {
            game.commit(mv(m)).unwrap();
        }
        let entry = game.commit(mv("e4d5")).unwrap();
        assert_eq!(entry.san, "exd5");

        let mut promo = Game::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let entry = promo.commit(mv("a7a8q")).unwrap();
        assert_eq!(entry.san, "a8=Q");
        assert_eq!(
            promo.position().piece_on(mv("a7a8q").to),
            Some(Piece::Queen)
        );
    }

    #[test]
    fn san_en_passant_capture() {
        let mut game = Game::from_fen("k7/8/8/3pP3/8/8/8/K7 w - d6 0 1").unwrap();
        let entry = game.commit(mv("e5d6")).unwrap();
        assert_eq!(entry.san, "exd6");
        // The captured pawn is gone from d5.
        assert_eq!(game.position().piece_on(mv("d5d6").from), None);
    }

    #[test]
    fn san_castling() {
        let game =
            Game::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        // cozy-chess castling notation: king takes own rook.
        assert_eq!(game.san(mv("e1h1")).as_deref(), Some("O-O"));
        assert_eq!(game.san(mv("e1a1")).as_deref(), Some("O-O-O"));
    }

    proptest! {
        /// Any walk through the legal move set commits cleanly, flips the
        /// side to move each ply, and undoes back to the exact prior FEN.
        #[test]
        fn random_legal_walk(choices in proptest::collection::vec(0usize..4096, 1..60)) {
            let mut game = Game::new();
            for c in choices {
                let legal = game.legal_moves();
                if legal.is_empty() {
                    break;
                }
                let mv = legal[c % legal.len()];
                let before = game.to_fen();
                let side = game.side_to_move();

                game.commit(mv).unwrap();
                prop_assert_ne!(game.side_to_move(), side);

                let mut copy = game.clone();
                copy.undo().unwrap();
                prop_assert_eq!(copy.to_fen(), before);
            }
        }

        /// Moves outside the legal set never mutate the position.
        #[test]
        fn illegal_moves_rejected(from in 0usize..64, to in 0usize..64) {
            let mut game = Game::new();
            let mv = Move {
                from: cozy_chess::Square::index(from),
                to: cozy_chess::Square::index(to),
                promotion: None,
            };
            let before = game.to_fen();
            if !game.legal_moves().contains(&mv) {
                prop_assert_eq!(game.commit(mv), Err(GameError::IllegalMove));
                prop_assert_eq!(game.to_fen(), before);
            }
        }
    }
}
