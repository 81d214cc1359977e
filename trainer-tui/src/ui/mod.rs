//! Terminal setup and the async render/input loop.

pub mod board;
pub mod panels;

use crate::app::{App, AppEvent};
use board::{BoardGeometry, BoardWidget};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use panels::{SidePanel, StatusLine};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io;
use tokio::sync::mpsc;

pub async fn run(mut app: App, mut events_rx: mpsc::Receiver<AppEvent>) -> anyhow::Result<()> {
    app.startup_probe().await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &mut events_rx).await;

    app.shutdown().await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events_rx: &mut mpsc::Receiver<AppEvent>,
) -> anyhow::Result<()> {
    let mut input_events = EventStream::new();
    let mut board_geometry: Option<BoardGeometry> = None;

    loop {
        terminal.draw(|frame| {
            board_geometry = Some(draw(frame, app));
        })?;

        tokio::select! {
            maybe_event = input_events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        handle_key(app, key);
                    }
                    Some(Ok(Event::Mouse(mouse))) => {
                        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                            if let Some(square) = board_geometry
                                .and_then(|g| g.square_at(mouse.column, mouse.row, app.flipped))
                            {
                                app.handle_click(square);
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                }
            }
            Some(event) = events_rx.recv() => {
                app.handle_event(event);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('n') => app.new_game(),
        KeyCode::Char('u') => app.undo(),
        KeyCode::Char('f') => app.flip(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_engine_time(250),
        KeyCode::Char('-') => app.adjust_engine_time(-250),
        KeyCode::Esc => app.clear_selection(),
        _ => {}
    }
}

/// Render one frame; returns the board geometry used, so mouse events can
/// be hit-tested against exactly what is on screen.
fn draw(frame: &mut Frame, app: &App) -> BoardGeometry {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(frame.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(32)])
        .split(rows[0]);

    let board_area: Rect = columns[0];
    frame.render_widget(
        BoardWidget {
            board: app.game.position(),
            highlights: &app.highlights,
            flipped: app.flipped,
        },
        board_area,
    );
    frame.render_widget(SidePanel { app }, columns[1]);
    frame.render_widget(StatusLine { app }, rows[1]);

    BoardWidget::geometry(board_area)
}
