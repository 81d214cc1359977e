//! Side panel and status line.

use crate::app::App;
use cozy_chess::Color as ChessColor;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct SidePanel<'a> {
    pub app: &'a App,
}

impl Widget for SidePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.app;

        let turn = match app.game.side_to_move() {
            ChessColor::White => "White",
            ChessColor::Black => "Black",
        };
        let engine_line = if app.engine_busy() {
            Line::from(Span::styled(
                "Engine: thinking…",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from(format!(
                "Engine time: {} ms",
                app.settings.engine_time_ms
            ))
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!("Turn: {}", turn),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            engine_line,
            Line::from(""),
            Line::from("click  select / move"),
            Line::from("n      new game"),
            Line::from("u      undo"),
            Line::from("f      flip board"),
            Line::from("+/-    engine time"),
            Line::from("q      quit"),
            Line::from(""),
        ];
        lines.extend(history_lines(app));

        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Trainer ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

/// Move history as numbered SAN pairs: "1. e4 e5".
fn history_lines(app: &App) -> Vec<Line<'static>> {
    app.game
        .history()
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let mut text = format!("{}. {}", i + 1, pair[0].san);
            if let Some(reply) = pair.get(1) {
                text.push(' ');
                text.push_str(&reply.san);
            }
            Line::from(text)
        })
        .collect()
}

pub struct StatusLine<'a> {
    pub app: &'a App,
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = self.app.status.as_deref().unwrap_or("");
        Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .render(area, buf);
    }
}
