//! TUI module - Terminal editor for automata

use crate::automaton::Automaton;
use crate::config::EditorConfig;
use crate::{Error, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use std::time::Duration;

pub mod app;
pub mod ui;

use app::{App, EditMode, ViewMode};

/// Run the TUI editor until the user quits
pub fn run(automaton: Automaton, editor: EditorConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode().map_err(Error::tui)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(Error::tui)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(Error::tui)?;

    // Create app and run
    let app = App::new(automaton, editor);
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode().map_err(Error::tui)?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .map_err(Error::tui)?;
    terminal.show_cursor().map_err(Error::tui)?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, &mut app)).map_err(Error::tui)?;

        if event::poll(Duration::from_millis(100)).map_err(Error::tui)? {
            match event::read().map_err(Error::tui)? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut app, key.code)
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    if app.edit_mode == EditMode::Symbols {
        // Every printable key is a candidate symbol here
        match code {
            KeyCode::Char(c) => app.type_symbol(c),
            KeyCode::Backspace => app.erase_symbol(),
            KeyCode::Enter | KeyCode::Esc => app.end_edit(),
            _ => {}
        }
    } else {
        handle_command_key(app, code);
    }
}

/// Left click on the canvas selects the state under it, or moves the cursor
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || app.view_mode != ViewMode::Editor {
        return;
    }
    if let Some(point) = app.canvas_point(mouse.column, mouse.row) {
        app.click(point);
    }
}

fn handle_command_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('h') | KeyCode::Char('?') => app.set_view_mode(ViewMode::Help),
        KeyCode::Char('g') => app.set_view_mode(ViewMode::Editor),
        KeyCode::Char('t') => app.set_view_mode(ViewMode::TransitionTable),
        KeyCode::Char('p') => app.set_view_mode(ViewMode::Analysis),
        KeyCode::Tab => app.select_next(),
        KeyCode::BackTab => app.select_previous(),
        KeyCode::Up if app.view_mode == ViewMode::TransitionTable => app.select_previous(),
        KeyCode::Down if app.view_mode == ViewMode::TransitionTable => app.select_next(),
        _ if app.view_mode != ViewMode::Editor => {
            if code == KeyCode::Esc {
                app.pop_view_mode();
            }
        }
        KeyCode::Char('n') => {
            app.add_state_at_cursor();
        }
        KeyCode::Char('a') => app.toggle_accepting(),
        KeyCode::Char('s') => app.make_start(),
        KeyCode::Char('c') => app.begin_connect(),
        KeyCode::Char('o') => app.select_next_transition(),
        KeyCode::Char('e') => app.begin_symbols(),
        KeyCode::Char('l') => app.cycle_loop_direction(),
        KeyCode::Char('x') | KeyCode::Delete => app.delete_selection(),
        KeyCode::Enter => match app.edit_mode {
            EditMode::Connecting { .. } => app.finish_connect(),
            _ => app.begin_symbols(),
        },
        KeyCode::Left => app.nudge(-1.0, 0.0),
        KeyCode::Right => app.nudge(1.0, 0.0),
        KeyCode::Up => app.nudge(0.0, -1.0),
        KeyCode::Down => app.nudge(0.0, 1.0),
        KeyCode::Esc => match app.edit_mode {
            EditMode::Connecting { .. } => app.end_edit(),
            _ => app.deselect(),
        },
        _ => {}
    }
}
