//! TUI UI rendering

use super::app::{App, EditMode, ViewMode};
use crate::automaton::{Automaton, AutomatonState, StateId};
use crate::render::{CanvasSurface, Surface};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap, canvas::Canvas},
};
use std::cell::RefCell;

/// Draw the UI based on current app state
pub fn draw(f: &mut Frame, app: &mut App) {
    match app.view_mode {
        ViewMode::Editor => draw_editor(f, app),
        ViewMode::TransitionTable => draw_transition_table(f, app),
        ViewMode::Analysis => draw_analysis(f, app),
        ViewMode::Help => draw_help(f),
    }
}

/// Header / body / footer split shared by every view
fn frame_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(area)
}

fn header(title: &str) -> Paragraph<'_> {
    Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL))
}

fn footer(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL))
}

fn draw_editor(f: &mut Frame, app: &mut App) {
    let chunks = frame_layout(f.area());

    let mode = match app.edit_mode {
        EditMode::Normal => "Edit".to_string(),
        EditMode::Connecting { from } => format!("Connect from {}", app.automaton.label_of(from)),
        EditMode::Symbols => "Symbols".to_string(),
    };
    let title = format!("DFA State Editor - {}", mode);
    f.render_widget(header(&title), chunks[0]);

    let (width, height) = (app.editor.canvas_width, app.editor.canvas_height);
    let selected = app.selected_state;
    let highlighted = app.highlighted_transition();
    let cursor = (selected.is_none()).then_some(app.cursor);

    let block = Block::default().borders(Borders::ALL).title("Automaton");
    app.canvas_area = block.inner(chunks[1]);

    // The paint closure is `Fn`, but redrawing recolours arrows
    let automaton = RefCell::new(&mut app.automaton);
    let canvas = Canvas::default()
        .block(block)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            let mut surface = CanvasSurface::new(ctx, height);
            automaton.borrow_mut().render(&mut surface, selected, highlighted);
            if let Some(cursor) = cursor {
                surface.text(cursor, "+", Color::Cyan);
            }
        });
    f.render_widget(canvas, chunks[1]);

    let footer_text = match (&app.status, app.edit_mode) {
        (Some(status), _) => status.clone(),
        (None, EditMode::Symbols) => {
            "[char] Add symbol | [Backspace] Remove symbol | [Enter/Esc] Done".to_string()
        }
        (None, EditMode::Connecting { .. }) => {
            "[Tab] Pick target | [Enter] Connect | [Esc] Cancel".to_string()
        }
        (None, EditMode::Normal) => format!(
            "States: {} | Arrows: {} | [n] New | [c] Connect | [o] Arrow | [e] Symbols | [x] Delete | [h/?] Help | [q] Quit",
            app.automaton.len(),
            app.automaton.transition_count()
        ),
    };
    f.render_widget(footer(footer_text), chunks[2]);
}

fn describe_state(automaton: &Automaton, state: &AutomatonState) -> String {
    let mut flags = Vec::new();
    if state.is_starting() {
        flags.push("start");
    }
    if state.is_accepting() {
        flags.push("accept");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    let table = state
        .symbol_table()
        .iter()
        .map(|(&symbol, &to)| format!("{}→{}", symbol, automaton.label_of(to)))
        .collect::<Vec<_>>()
        .join(" ");
    let ids = |ids: &[StateId]| {
        ids.iter()
            .map(|&id| automaton.label_of(id))
            .collect::<Vec<_>>()
            .join(",")
    };

    format!(
        "{}{} | {} | in: {} | out: {}",
        state.label(),
        flags,
        if table.is_empty() { "-" } else { table.as_str() },
        ids(state.incoming().as_slice()),
        ids(state.outgoing().as_slice()),
    )
}

fn draw_transition_table(f: &mut Frame, app: &mut App) {
    let chunks = frame_layout(f.area());
    f.render_widget(header("Transition Table"), chunks[0]);

    let items: Vec<ListItem> = app
        .automaton
        .states()
        .map(|state| {
            let style = if Some(state.id()) == app.selected_state {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
                    .bg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(describe_state(&app.automaton, state)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("States"))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, chunks[1], &mut app.state_list_state);

    f.render_widget(
        footer("[↑/↓] Navigate | [g/Esc] Back to Editor | [h/?] Help | [q] Quit".to_string()),
        chunks[2],
    );
}

fn draw_analysis(f: &mut Frame, app: &App) {
    let chunks = frame_layout(f.area());
    f.render_widget(header("Structure Analysis"), chunks[0]);

    let report = &app.analysis_report;
    let ids = |ids: &[StateId]| {
        if ids.is_empty() {
            "none".to_string()
        } else {
            ids.iter()
                .map(|&id| app.automaton.label_of(id))
                .collect::<Vec<_>>()
                .join(", ")
        }
    };
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Start: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(
                report
                    .start
                    .map(|s| app.automaton.label_of(s))
                    .unwrap_or_else(|| "none (press 's' on a state)".to_string()),
            ),
        ]),
        Line::from(format!("Complete: {}", yes_no(report.is_complete()))),
        Line::from(format!("Cycles: {}", yes_no(report.has_cycles))),
        Line::from(format!("Unreachable: {}", ids(&report.unreachable))),
        Line::from(format!("Dead: {}", ids(&report.dead))),
    ];
    for missing in &report.missing {
        lines.push(Line::from(Span::styled(
            format!(
                "{} has no arrow for {{{}}}",
                app.automaton.label_of(missing.state),
                missing.symbols
            ),
            Style::default().fg(Color::Red),
        )));
    }

    let drift = app.automaton.adjacency_drift();
    if !drift.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Adjacency cache drift:",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        for d in drift {
            lines.push(Line::from(format!(
                "{} {:?} {}: cached {}, arrows {}",
                app.automaton.label_of(d.state),
                d.side,
                app.automaton.label_of(d.peer),
                d.cached,
                d.derived
            )));
        }
    }

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Report"))
        .wrap(Wrap { trim: false });
    f.render_widget(body, chunks[1]);

    f.render_widget(
        footer("[g/Esc] Back to Editor | [t] Table | [h/?] Help | [q] Quit".to_string()),
        chunks[2],
    );
}

fn draw_help(f: &mut Frame) {
    let chunks = frame_layout(f.area());
    f.render_widget(header("Help"), chunks[0]);

    let bindings = [
        ("Tab / Shift+Tab", "Select next / previous state"),
        ("Arrow keys", "Move the selected state (or the cursor)"),
        ("n", "New state at the cursor"),
        ("a", "Toggle accepting"),
        ("s", "Make the selected state the start state"),
        ("c, Tab, Enter", "Draw an arrow to another state"),
        ("o", "Cycle through the selected state's arrows"),
        ("e / Enter", "Type symbols for the highlighted arrow"),
        ("Backspace", "Remove the last symbol (while typing symbols)"),
        ("l", "Move a self-loop to the next side"),
        ("x / Delete", "Delete the highlighted arrow, else the state"),
        ("Esc", "Cancel / deselect / back"),
        ("t", "Transition table"),
        ("p", "Structure analysis"),
        ("q", "Quit"),
    ];
    let lines: Vec<Line> = bindings
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<18}", key),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect();

    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Keys"));
    f.render_widget(body, chunks[1]);

    f.render_widget(
        footer("[Esc] Back | [q] Quit".to_string()),
        chunks[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::demo_automaton;
    use crate::config::EditorConfig;
    use crate::render::Theme;
    use ratatui::{Terminal, backend::TestBackend};

    fn demo_app() -> App {
        App::new(demo_automaton(Theme::default()).unwrap(), EditorConfig::default())
    }

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_describe_state() {
        let app = demo_app();
        let line = describe_state(&app.automaton, app.automaton.state(0).unwrap());
        assert_eq!(line, "q0 [start, accept] | 0→q0 1→q1 | in: q0,q1 | out: q0,q1");
    }

    #[test]
    fn test_draw_every_view() {
        let mut app = demo_app();
        assert!(rendered(&mut app).contains("DFA State Editor - Edit"));

        app.set_view_mode(ViewMode::TransitionTable);
        assert!(rendered(&mut app).contains("Transition Table"));

        app.set_view_mode(ViewMode::Analysis);
        assert!(rendered(&mut app).contains("Complete: yes"));

        app.set_view_mode(ViewMode::Help);
        assert!(rendered(&mut app).contains("Toggle accepting"));
    }

    #[test]
    fn test_draw_records_canvas_area() {
        let mut app = demo_app();
        rendered(&mut app);
        // Inside the border of the body chunk, between header and footer
        assert_eq!(app.canvas_area, Rect::new(1, 4, 118, 32));
    }

    #[test]
    fn test_table_shows_renamed_labels() {
        let mut app = demo_app();
        app.automaton.rename_state(1, "one").unwrap();
        let line = describe_state(&app.automaton, app.automaton.state(0).unwrap());
        assert!(line.contains("1→one"));
        assert!(line.contains("in: q0,one"));
    }

    #[test]
    fn test_editor_view_shows_status() {
        let mut app = demo_app();
        app.select_next_transition();
        app.type_symbol('1');
        assert!(rendered(&mut app).contains("already leads to state 1"));
    }
}
