//! UCI (Universal Chess Interface) move and square notation helpers.

use cozy_chess::{File, Move, Piece, Rank, Square};

pub fn file_char(file: File) -> char {
    match file {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    }
}

pub fn rank_char(rank: Rank) -> char {
    match rank {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    }
}

/// Format a square as "e4".
pub fn format_square(square: Square) -> String {
    let mut s = String::with_capacity(2);
    s.push(file_char(square.file()));
    s.push(rank_char(square.rank()));
    s
}

/// Parse "e4" into a square.
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = match chars.next()? {
        c @ 'a'..='h' => File::index(c as usize - 'a' as usize),
        _ => return None,
    };
    let rank = match chars.next()? {
        c @ '1'..='8' => Rank::index(c as usize - '1' as usize),
        _ => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(Square::new(file, rank))
}

/// Lowercase piece letter as used in UCI promotion suffixes.
pub fn format_piece(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q").
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("invalid move: {0}")]
    InvalidMove(String),
    #[error("invalid square: {0}")]
    InvalidSquare(String),
    #[error("invalid promotion: {0}")]
    InvalidPromotion(String),
}

/// Parse UCI move format (e2e4, e7e8q).
pub fn parse_uci_move(s: &str) -> Result<Move, MoveParseError> {
    if s.len() != 4 && s.len() != 5 {
        return Err(MoveParseError::InvalidMove(s.to_string()));
    }

    let from =
        parse_square(&s[0..2]).ok_or_else(|| MoveParseError::InvalidSquare(s[0..2].to_string()))?;
    let to =
        parse_square(&s[2..4]).ok_or_else(|| MoveParseError::InvalidSquare(s[2..4].to_string()))?;

    let promotion = if s.len() == 5 {
        Some(match &s[4..5] {
            "q" => Piece::Queen,
            "r" => Piece::Rook,
            "b" => Piece::Bishop,
            "n" => Piece::Knight,
            _ => return Err(MoveParseError::InvalidPromotion(s.to_string())),
        })
    } else {
        None
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Convert UCI castling notation to cozy_chess notation.
///
/// UCI uses standard notation (king moves two squares): e1g1, e1c1, e8g8,
/// e8c8. cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8.
/// Returns the converted move when it is present in `legal_moves`, the
/// original move otherwise.
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_back_rank = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let from_e_file = matches!(mv.from.file(), File::E);
    let to_g_or_c = matches!(mv.to.file(), File::G | File::C);

    if is_back_rank && from_e_file && to_g_or_c && mv.promotion.is_none() {
        let rook_file = match mv.to.file() {
            File::G => File::H,
            _ => File::A,
        };
        let converted = Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        };
        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}
