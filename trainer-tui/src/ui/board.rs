//! Board rendering and the matching mouse hit-testing geometry.

use crate::highlight::HighlightState;
use cozy_chess::{Board, Color as ChessColor, File, Piece, Rank, Square};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

const LARGE_SQUARE: (u16, u16) = (11, 5);
const SMALL_SQUARE: (u16, u16) = (7, 3);
/// Columns reserved for rank labels left of the board.
const LABEL_GUTTER_X: u16 = 3;
/// Rows reserved for file labels below the board.
const LABEL_GUTTER_Y: u16 = 1;

/// Placement of the 8x8 grid in absolute terminal coordinates. Built once
/// per frame; `square_at` is the exact inverse of the render transform so
/// clicks land on the square they were drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardGeometry {
    origin_x: u16,
    origin_y: u16,
    square_width: u16,
    square_height: u16,
}

impl BoardGeometry {
    fn for_area(inner: Rect) -> Self {
        let fits = |(w, h): (u16, u16)| {
            inner.width >= w * 8 + LABEL_GUTTER_X && inner.height >= h * 8 + LABEL_GUTTER_Y
        };
        let (square_width, square_height) = if fits(LARGE_SQUARE) {
            LARGE_SQUARE
        } else {
            SMALL_SQUARE
        };

        let total_w = square_width * 8 + LABEL_GUTTER_X;
        let total_h = square_height * 8 + LABEL_GUTTER_Y;
        let offset_x = inner.width.saturating_sub(total_w) / 2;
        let offset_y = inner.height.saturating_sub(total_h) / 2;

        Self {
            origin_x: inner.x + offset_x + LABEL_GUTTER_X,
            origin_y: inner.y + offset_y,
            square_width,
            square_height,
        }
    }

    /// Top-left cell of the grid position (column, row), both 0..8 from the
    /// board's top-left as drawn.
    fn cell_origin(&self, col: u16, row: u16) -> (u16, u16) {
        (
            self.origin_x + col * self.square_width,
            self.origin_y + row * self.square_height,
        )
    }

    fn square_for_grid(col: u16, row: u16, flipped: bool) -> Square {
        let file_idx = if flipped { 7 - col } else { col };
        let rank_idx = if flipped { row } else { 7 - row };
        Square::new(
            File::index(file_idx as usize),
            Rank::index(rank_idx as usize),
        )
    }

    /// Map an absolute terminal coordinate back to a square.
    pub fn square_at(&self, x: u16, y: u16, flipped: bool) -> Option<Square> {
        if x < self.origin_x || y < self.origin_y {
            return None;
        }
        let col = (x - self.origin_x) / self.square_width;
        let row = (y - self.origin_y) / self.square_height;
        if col >= 8 || row >= 8 {
            return None;
        }
        Some(Self::square_for_grid(col, row, flipped))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SquareHighlight {
    Selected,
    Hint,
    EngineMove,
    HumanMove,
    None,
}

impl SquareHighlight {
    fn for_square(square: Square, highlights: &HighlightState) -> Self {
        let in_move = |mv: Option<(Square, Square)>| {
            mv.map(|(from, to)| from == square || to == square)
                .unwrap_or(false)
        };
        if highlights.selected == Some(square) {
            Self::Selected
        } else if highlights.hint == Some(square) {
            Self::Hint
        } else if in_move(highlights.last_engine_move) {
            Self::EngineMove
        } else if in_move(highlights.last_human_move) {
            Self::HumanMove
        } else {
            Self::None
        }
    }

    fn bg_color(self, is_light_square: bool) -> Color {
        let (light, dark) = match self {
            Self::Selected => (Color::LightYellow, Color::Yellow),
            Self::Hint => (Color::LightGreen, Color::Green),
            Self::EngineMove => (Color::LightRed, Color::Red),
            Self::HumanMove => (Color::LightBlue, Color::Blue),
            Self::None => (Color::Rgb(240, 217, 181), Color::Rgb(181, 136, 99)),
        };
        if is_light_square {
            light
        } else {
            dark
        }
    }
}

fn piece_glyph(piece: Piece, color: ChessColor) -> &'static str {
    match (color, piece) {
        (ChessColor::White, Piece::King) => "♔",
        (ChessColor::White, Piece::Queen) => "♕",
        (ChessColor::White, Piece::Rook) => "♖",
        (ChessColor::White, Piece::Bishop) => "♗",
        (ChessColor::White, Piece::Knight) => "♘",
        (ChessColor::White, Piece::Pawn) => "♙",
        (ChessColor::Black, Piece::King) => "♚",
        (ChessColor::Black, Piece::Queen) => "♛",
        (ChessColor::Black, Piece::Rook) => "♜",
        (ChessColor::Black, Piece::Bishop) => "♝",
        (ChessColor::Black, Piece::Knight) => "♞",
        (ChessColor::Black, Piece::Pawn) => "♟",
    }
}

pub struct BoardWidget<'a> {
    pub board: &'a Board,
    pub highlights: &'a HighlightState,
    pub flipped: bool,
}

impl BoardWidget<'_> {
    /// Geometry for the board drawn into `area`, for mouse hit-testing.
    pub fn geometry(area: Rect) -> BoardGeometry {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        BoardGeometry::for_area(inner)
    }
}

impl Widget for BoardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Board ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        block.render(area, buf);

        let geo = BoardGeometry::for_area(inner);

        // Rank labels to the left of each row.
        for row in 0..8u16 {
            let square = BoardGeometry::square_for_grid(0, row, self.flipped);
            let y = geo.origin_y + row * geo.square_height + geo.square_height / 2;
            if y < inner.bottom() {
                buf.set_string(
                    geo.origin_x.saturating_sub(2),
                    y,
                    chess::uci::rank_char(square.rank()).to_string(),
                    Style::default().fg(Color::Yellow),
                );
            }
        }

        // File labels below the board.
        let label_y = geo.origin_y + 8 * geo.square_height;
        for col in 0..8u16 {
            let square = BoardGeometry::square_for_grid(col, 0, self.flipped);
            let x = geo.origin_x + col * geo.square_width + geo.square_width / 2;
            if x < inner.right() && label_y < inner.bottom() {
                buf.set_string(
                    x,
                    label_y,
                    chess::uci::file_char(square.file()).to_string(),
                    Style::default().fg(Color::Yellow),
                );
            }
        }

        for row in 0..8u16 {
            for col in 0..8u16 {
                let square = BoardGeometry::square_for_grid(col, row, self.flipped);
                let (x, y) = geo.cell_origin(col, row);

                let is_light_square = (col + row) % 2 == 0;
                let highlight = SquareHighlight::for_square(square, self.highlights);
                let bg = highlight.bg_color(is_light_square);

                let style = Style::default().bg(bg);
                for dy in 0..geo.square_height {
                    for dx in 0..geo.square_width {
                        let (px, py) = (x + dx, y + dy);
                        if px < inner.right() && py < inner.bottom() {
                            buf[(px, py)].set_style(style);
                        }
                    }
                }

                if let (Some(piece), Some(color)) =
                    (self.board.piece_on(square), self.board.color_on(square))
                {
                    let cx = x + geo.square_width / 2;
                    let cy = y + geo.square_height / 2;
                    if cx < inner.right() && cy < inner.bottom() {
                        let fg = match color {
                            ChessColor::White => Color::White,
                            ChessColor::Black => Color::Black,
                        };
                        buf.set_string(
                            cx,
                            cy,
                            piece_glyph(piece, color),
                            Style::default().fg(fg).bg(bg),
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::parse_square;

    fn geometry() -> BoardGeometry {
        BoardGeometry::for_area(Rect::new(1, 1, 80, 30))
    }

    #[test]
    fn hit_testing_inverts_rendering() {
        for flipped in [false, true] {
            let geo = geometry();
            for col in 0..8u16 {
                for row in 0..8u16 {
                    let expected = BoardGeometry::square_for_grid(col, row, flipped);
                    let (x, y) = geo.cell_origin(col, row);
                    // Every cell of the square maps back to it.
                    for (dx, dy) in [
                        (0, 0),
                        (geo.square_width - 1, 0),
                        (0, geo.square_height - 1),
                        (geo.square_width - 1, geo.square_height - 1),
                    ] {
                        assert_eq!(
                            geo.square_at(x + dx, y + dy, flipped),
                            Some(expected),
                            "col={col} row={row} flipped={flipped}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn grid_orientation() {
        // Unflipped: top-left is a8, bottom-right is h1.
        assert_eq!(
            BoardGeometry::square_for_grid(0, 0, false),
            parse_square("a8").unwrap()
        );
        assert_eq!(
            BoardGeometry::square_for_grid(7, 7, false),
            parse_square("h1").unwrap()
        );
        // Flipped: top-left is h1, bottom-right is a8.
        assert_eq!(
            BoardGeometry::square_for_grid(0, 0, true),
            parse_square("h1").unwrap()
        );
        assert_eq!(
            BoardGeometry::square_for_grid(7, 7, true),
            parse_square("a8").unwrap()
        );
    }

    #[test]
    fn clicks_outside_the_grid_miss() {
        let geo = geometry();
        assert_eq!(geo.square_at(0, 0, false), None);
        let (x, y) = geo.cell_origin(7, 7);
        assert_eq!(
            geo.square_at(x + geo.square_width, y + geo.square_height, false),
            None
        );
    }
}
