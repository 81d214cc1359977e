//! Visual markers derived from game and engine state.
//!
//! Pure state: producers overwrite individual markers (last writer wins)
//! and rendering only reads. Never persisted.

use cozy_chess::{Move, Square};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightState {
    /// Square currently selected as a move origin.
    pub selected: Option<Square>,
    /// Hint square, set to the engine suggestion's destination.
    pub hint: Option<Square>,
    /// Last move the human committed.
    pub last_human_move: Option<(Square, Square)>,
    /// Last move the engine suggested (displayed, never played).
    pub last_engine_move: Option<(Square, Square)>,
}

impl HighlightState {
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_human_move(&mut self, mv: Move) {
        self.last_human_move = Some((mv.from, mv.to));
        self.selected = None;
        self.hint = None;
    }

    pub fn set_engine_move(&mut self, mv: Move) {
        self.last_engine_move = Some((mv.from, mv.to));
        self.hint = Some(mv.to);
    }

    pub fn clear_engine_markers(&mut self) {
        self.last_engine_move = None;
        self.hint = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::parse_uci_move;

    #[test]
    fn human_move_clears_selection_and_hint() {
        let mut hl = HighlightState::default();
        let mv = parse_uci_move("e2e4").unwrap();
        hl.selected = Some(mv.from);
        hl.hint = Some(mv.to);

        hl.set_human_move(mv);
        assert_eq!(hl.last_human_move, Some((mv.from, mv.to)));
        assert_eq!(hl.selected, None);
        assert_eq!(hl.hint, None);
    }

    #[test]
    fn engine_move_sets_hint_to_destination() {
        let mut hl = HighlightState::default();
        let mv = parse_uci_move("e7e5").unwrap();

        hl.set_engine_move(mv);
        assert_eq!(hl.last_engine_move, Some((mv.from, mv.to)));
        assert_eq!(hl.hint, Some(mv.to));

        hl.clear_engine_markers();
        assert_eq!(hl, HighlightState::default());
    }
}
