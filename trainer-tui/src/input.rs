//! Move-input state machine: click-to-select, click-to-move.

use chess::Game;
use cozy_chess::{Color, Move, Piece, Rank, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Idle,
    Selected(Square),
}

/// What a click did, for the app to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A side-to-move piece was selected (or re-selected) as move origin.
    Selected(Square),
    /// A complete candidate move, validated against the current legal set
    /// with the auto-queen policy applied. The caller commits it.
    Play(Move),
    /// The pending selection was dropped.
    Deselected,
    /// Click on nothing actionable.
    Ignored,
}

impl InputState {
    /// Advance the machine for a click on `square` against the current
    /// position.
    ///
    /// An invalid destination deselects silently rather than reporting why
    /// the move failed.
    pub fn click(&mut self, game: &Game, square: Square) -> ClickOutcome {
        match *self {
            InputState::Idle => {
                if is_own_piece(game, square) {
                    *self = InputState::Selected(square);
                    ClickOutcome::Selected(square)
                } else {
                    ClickOutcome::Ignored
                }
            }
            InputState::Selected(origin) => {
                let candidate = complete_promotion(
                    game,
                    Move {
                        from: origin,
                        to: square,
                        promotion: None,
                    },
                );
                if game.is_legal(candidate) {
                    *self = InputState::Idle;
                    ClickOutcome::Play(candidate)
                } else if is_own_piece(game, square) {
                    *self = InputState::Selected(square);
                    ClickOutcome::Selected(square)
                } else {
                    *self = InputState::Idle;
                    ClickOutcome::Deselected
                }
            }
        }
    }

    pub fn reset(&mut self) {
        *self = InputState::Idle;
    }
}

fn is_own_piece(game: &Game, square: Square) -> bool {
    game.position().color_on(square) == Some(game.side_to_move())
}

/// Auto-queen policy: a pawn move onto the farthest rank with no explicit
/// promotion is completed as a queen promotion. Applied before the legality
/// check, since the bare pawn push onto the last rank is not itself in the
/// legal set (promotions are enumerated explicitly).
fn complete_promotion(game: &Game, mv: Move) -> Move {
    if mv.promotion.is_some() {
        return mv;
    }
    let moving_pawn = game.position().piece_on(mv.from) == Some(Piece::Pawn)
        && game.position().color_on(mv.from) == Some(game.side_to_move());
    let last_rank = match game.side_to_move() {
        Color::White => Rank::Eighth,
        Color::Black => Rank::First,
    };
    if moving_pawn && mv.to.rank() == last_rank {
        Move {
            promotion: Some(Piece::Queen),
            ..mv
        }
    } else {
        mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::parse_square;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    #[test]
    fn idle_ignores_empty_and_opponent_squares() {
        let game = Game::new();
        let mut input = InputState::default();

        assert_eq!(input.click(&game, sq("e4")), ClickOutcome::Ignored);
        assert_eq!(input, InputState::Idle);
        // Black piece while white is to move.
        assert_eq!(input.click(&game, sq("e7")), ClickOutcome::Ignored);
        assert_eq!(input, InputState::Idle);
    }

    #[test]
    fn own_piece_selects_then_legal_destination_plays() {
        let game = Game::new();
        let mut input = InputState::default();

        assert_eq!(input.click(&game, sq("e2")), ClickOutcome::Selected(sq("e2")));
        assert_eq!(input, InputState::Selected(sq("e2")));

        let outcome = input.click(&game, sq("e4"));
        assert_eq!(
            outcome,
            ClickOutcome::Play(Move {
                from: sq("e2"),
                to: sq("e4"),
                promotion: None,
            })
        );
        assert_eq!(input, InputState::Idle);
    }

    #[test]
    fn clicking_another_own_piece_reselects() {
        let game = Game::new();
        let mut input = InputState::default();

        input.click(&game, sq("e2"));
        assert_eq!(input.click(&game, sq("g1")), ClickOutcome::Selected(sq("g1")));
        assert_eq!(input, InputState::Selected(sq("g1")));
    }

    #[test]
    fn unreachable_destination_deselects_silently() {
        let game = Game::new();
        let mut input = InputState::default();

        input.click(&game, sq("e2"));
        assert_eq!(input.click(&game, sq("e5")), ClickOutcome::Deselected);
        assert_eq!(input, InputState::Idle);
    }

    #[test]
    fn pawn_push_to_last_rank_auto_queens() {
        let game = Game::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mut input = InputState::default();

        input.click(&game, sq("a7"));
        let outcome = input.click(&game, sq("a8"));
        assert_eq!(
            outcome,
            ClickOutcome::Play(Move {
                from: sq("a7"),
                to: sq("a8"),
                promotion: Some(Piece::Queen),
            })
        );
    }

    #[test]
    fn pawn_capture_onto_last_rank_auto_queens() {
        let game = Game::from_fen("1n5k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mut input = InputState::default();

        input.click(&game, sq("a7"));
        let outcome = input.click(&game, sq("b8"));
        assert_eq!(
            outcome,
            ClickOutcome::Play(Move {
                from: sq("a7"),
                to: sq("b8"),
                promotion: Some(Piece::Queen),
            })
        );
    }

    #[test]
    fn black_pawn_auto_queens_on_first_rank() {
        let game = Game::from_fen("k7/8/8/8/8/8/6pK/8 b - - 0 1").unwrap();
        let mut input = InputState::default();

        input.click(&game, sq("g2"));
        let outcome = input.click(&game, sq("g1"));
        assert_eq!(
            outcome,
            ClickOutcome::Play(Move {
                from: sq("g2"),
                to: sq("g1"),
                promotion: Some(Piece::Queen),
            })
        );
    }

    #[test]
    fn non_promotion_moves_are_not_rewritten() {
        let game = Game::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mut input = InputState::default();

        // King move: no promotion completion.
        input.click(&game, sq("a1"));
        let outcome = input.click(&game, sq("b1"));
        assert_eq!(
            outcome,
            ClickOutcome::Play(Move {
                from: sq("a1"),
                to: sq("b1"),
                promotion: None,
            })
        );
    }
}
