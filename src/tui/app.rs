//! TUI application state

use crate::automaton::analyzer::{AnalysisReport, analyze};
use crate::automaton::{Automaton, AutomatonState, Point, StateId, SymbolRemoval};
use crate::config::EditorConfig;
use crate::Result;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

/// TUI application state
pub struct App {
    pub automaton: Automaton,
    pub analysis_report: AnalysisReport,
    pub editor: EditorConfig,
    pub selected_state: Option<StateId>,
    /// Index into the selected state's transitions
    pub selected_transition: Option<usize>,
    pub cursor: Point,
    pub edit_mode: EditMode,
    pub view_mode: ViewMode,
    pub state_list_state: ListState,
    pub status: Option<String>,
    pub should_quit: bool,
    /// Inner area of the canvas on the last draw, for mapping mouse clicks
    pub canvas_area: Rect,
    view_stack: Vec<ViewMode>,
}

/// What keys currently do on the editor canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Normal,
    /// Picking the destination of a new arrow
    Connecting { from: StateId },
    /// Typed characters become symbols of the selected arrow
    Symbols,
}

/// View modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Editor,
    TransitionTable,
    Analysis,
    Help,
}

impl App {
    pub fn new(automaton: Automaton, editor: EditorConfig) -> Self {
        let analysis_report = analyze(&automaton);
        let selected_state = automaton.ids().first().copied();
        let cursor = Point::new(editor.canvas_width / 2.0, editor.canvas_height / 2.0);

        let mut state_list_state = ListState::default();
        if selected_state.is_some() {
            state_list_state.select(Some(0));
        }

        Self {
            automaton,
            analysis_report,
            editor,
            selected_state,
            selected_transition: None,
            cursor,
            edit_mode: EditMode::Normal,
            view_mode: ViewMode::Editor,
            state_list_state,
            status: None,
            should_quit: false,
            canvas_area: Rect::default(),
            view_stack: Vec::new(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_stack.push(self.view_mode);
            self.view_mode = mode;
        }
    }

    pub fn pop_view_mode(&mut self) {
        if let Some(prev_mode) = self.view_stack.pop() {
            self.view_mode = prev_mode;
        } else if self.view_mode != ViewMode::Editor {
            self.view_mode = ViewMode::Editor;
        }
    }

    pub fn get_selected_state(&self) -> Option<&AutomatonState> {
        self.selected_state.and_then(|id| self.automaton.state(id))
    }

    /// Highlighted arrow, as (owning state, index)
    pub fn highlighted_transition(&self) -> Option<(StateId, usize)> {
        self.selected_state.zip(self.selected_transition)
    }

    fn select_state(&mut self, id: Option<StateId>) {
        self.selected_state = id;
        self.selected_transition = None;
        let position = id.and_then(|id| self.automaton.ids().iter().position(|&s| s == id));
        self.state_list_state.select(position);
    }

    pub fn select_next(&mut self) {
        let ids = self.automaton.ids();
        if ids.is_empty() {
            return;
        }
        let next = match self.selected_state.and_then(|id| ids.iter().position(|&s| s == id)) {
            Some(pos) => ids[(pos + 1) % ids.len()],
            None => ids[0],
        };
        self.select_state(Some(next));
    }

    pub fn select_previous(&mut self) {
        let ids = self.automaton.ids();
        if ids.is_empty() {
            return;
        }
        let previous = match self.selected_state.and_then(|id| ids.iter().position(|&s| s == id)) {
            Some(0) | None => ids[ids.len() - 1],
            Some(pos) => ids[pos - 1],
        };
        self.select_state(Some(previous));
    }

    /// Cycle through the selected state's arrows, then back to none
    pub fn select_next_transition(&mut self) {
        let Some(count) = self.get_selected_state().map(|s| s.transitions().len()) else {
            return;
        };
        self.selected_transition = match self.selected_transition {
            _ if count == 0 => None,
            None => Some(0),
            Some(i) if i + 1 < count => Some(i + 1),
            Some(_) => None,
        };
    }

    /// Record the outcome of an edit: refresh analysis, or show the error
    fn apply(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                self.status = None;
                self.analysis_report = analyze(&self.automaton);
            }
            Err(e) => {
                tracing::warn!("Edit rejected: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn add_state_at_cursor(&mut self) -> StateId {
        let id = self.automaton.add_state(self.cursor);
        self.select_state(Some(id));
        self.apply(Ok(()));
        id
    }

    /// Arrow keys: move the selected state, or the cursor when none is selected
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        let step = self.editor.move_step;
        let clamp = |p: Point, width: f64, height: f64| {
            Point::new(p.x.clamp(0.0, width), p.y.clamp(0.0, height))
        };
        let (width, height) = (self.editor.canvas_width, self.editor.canvas_height);

        match self.get_selected_state().map(|s| (s.id(), s.position())) {
            Some((id, position)) => {
                let target = clamp(position + Point::new(dx * step, dy * step), width, height);
                let result = self.automaton.move_state(id, target);
                self.apply(result);
            }
            None => {
                self.cursor = clamp(self.cursor + Point::new(dx * step, dy * step), width, height);
            }
        }
    }

    /// Model coordinates of a terminal cell, if it lies on the canvas
    pub fn canvas_point(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.canvas_area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return None;
        }
        // Cell centres; canvas rows grow downwards like model y
        let (cols, rows) = (f64::from(area.width), f64::from(area.height));
        let x = (f64::from(column - area.x) + 0.5) * self.editor.canvas_width / cols;
        let y = (f64::from(row - area.y) + 0.5) * self.editor.canvas_height / rows;
        Some(Point::new(x, y))
    }

    /// Select the state under `point`, or park the cursor there. While
    /// connecting, a clicked state becomes the arrow's target.
    pub fn click(&mut self, point: Point) {
        match self.automaton.state_at(point) {
            Some(id) => {
                self.select_state(Some(id));
                if matches!(self.edit_mode, EditMode::Connecting { .. }) {
                    self.finish_connect();
                }
            }
            None => {
                self.cursor = point;
                self.deselect();
            }
        }
    }

    pub fn deselect(&mut self) {
        self.select_state(None);
        self.edit_mode = EditMode::Normal;
    }

    pub fn toggle_accepting(&mut self) {
        if let Some(id) = self.selected_state {
            let result = self.automaton.state_mut(id).map(|s| s.toggle_accepting());
            self.apply(result);
        }
    }

    pub fn make_start(&mut self) {
        if let Some(id) = self.selected_state {
            let result = self.automaton.set_start(id);
            self.apply(result);
        }
    }

    pub fn begin_connect(&mut self) {
        if let Some(from) = self.selected_state {
            self.edit_mode = EditMode::Connecting { from };
            self.status = Some(format!(
                "New arrow from {}: pick a target and press Enter",
                self.automaton.label_of(from)
            ));
        }
    }

    /// Draw the arrow to the selected state and start typing its symbols
    pub fn finish_connect(&mut self) {
        let (EditMode::Connecting { from }, Some(to)) = (self.edit_mode, self.selected_state)
        else {
            return;
        };

        match self.automaton.connect(from, to) {
            Ok(index) => {
                self.select_state(Some(from));
                self.selected_transition = Some(index);
                self.edit_mode = EditMode::Symbols;
                self.apply(Ok(()));
            }
            Err(e) => {
                self.edit_mode = EditMode::Normal;
                self.apply(Err(e));
            }
        }
    }

    pub fn begin_symbols(&mut self) {
        if self.highlighted_transition().is_some() {
            self.edit_mode = EditMode::Symbols;
        }
    }

    pub fn end_edit(&mut self) {
        self.edit_mode = EditMode::Normal;
    }

    pub fn type_symbol(&mut self, symbol: char) {
        if let Some((from, index)) = self.highlighted_transition() {
            let result = self.automaton.assign_symbol(from, index, symbol);
            self.apply(result);
        }
    }

    pub fn erase_symbol(&mut self) {
        if let Some((from, index)) = self.highlighted_transition() {
            let result = self
                .automaton
                .remove_single_symbol(from, index)
                .and_then(|removal| match removal {
                    SymbolRemoval::Deleted(_) => Ok(()),
                    SymbolRemoval::Invalid => Err(crate::custom_error!("No symbol to remove")),
                });
            self.apply(result);
        }
    }

    pub fn cycle_loop_direction(&mut self) {
        if let Some((from, index)) = self.highlighted_transition() {
            let result = self.automaton.state_mut(from).and_then(|state| {
                let direction = state
                    .transition(index)
                    .map(|t| t.loop_direction().next())
                    .unwrap_or_default();
                state.set_loop_direction(index, direction)
            });
            self.apply(result);
        }
    }

    /// Delete the highlighted arrow, or the selected state if none is
    pub fn delete_selection(&mut self) {
        if let Some((from, index)) = self.highlighted_transition() {
            let result = self.automaton.remove_transition(from, index).map(|_| ());
            self.selected_transition = None;
            self.edit_mode = EditMode::Normal;
            self.apply(result);
        } else if let Some(id) = self.selected_state {
            let result = self.automaton.remove_state(id).map(|_| ());
            self.select_state(None);
            self.select_next();
            self.apply(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::demo_automaton;
    use crate::render::{CellMetrics, Theme};
    use std::sync::Arc;

    fn empty_app() -> App {
        let automaton = Automaton::new(Theme::default(), Arc::new(CellMetrics::default()));
        App::new(automaton, EditorConfig::default())
    }

    fn demo_app() -> App {
        App::new(demo_automaton(Theme::default()).unwrap(), EditorConfig::default())
    }

    #[test]
    fn test_app_creation() {
        let app = demo_app();
        assert_eq!(app.selected_state, Some(0));
        assert_eq!(app.view_mode, ViewMode::Editor);
        assert_eq!(app.edit_mode, EditMode::Normal);
        assert!(!app.should_quit);
        assert!(app.analysis_report.is_complete());
    }

    #[test]
    fn test_app_navigation() {
        let mut app = demo_app();
        app.select_next();
        assert_eq!(app.selected_state, Some(1));
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_state, Some(0)); // Wrapped

        app.select_previous();
        assert_eq!(app.selected_state, Some(2)); // Wrapped backward
        assert_eq!(app.state_list_state.selected(), Some(2));
    }

    #[test]
    fn test_app_navigation_empty() {
        let mut app = empty_app();
        app.select_next(); // Should not panic
        app.select_previous();
        assert!(app.get_selected_state().is_none());
    }

    #[test]
    fn test_transition_cycling() {
        let mut app = demo_app();
        // q0 has a self loop and an arrow to q1
        app.select_next_transition();
        assert_eq!(app.selected_transition, Some(0));
        app.select_next_transition();
        assert_eq!(app.selected_transition, Some(1));
        app.select_next_transition();
        assert_eq!(app.selected_transition, None);
    }

    #[test]
    fn test_connect_and_type_symbols() {
        let mut app = empty_app();
        let a = app.add_state_at_cursor();
        app.deselect();
        app.nudge(10.0, 0.0);
        let b = app.add_state_at_cursor();

        app.select_state(Some(a));
        app.begin_connect();
        app.select_state(Some(b));
        app.finish_connect();

        assert_eq!(app.edit_mode, EditMode::Symbols);
        assert_eq!(app.highlighted_transition(), Some((a, 0)));

        app.type_symbol('x');
        app.type_symbol('y');
        let state = app.automaton.state(a).unwrap();
        assert_eq!(state.destination('x'), Some(b));
        assert_eq!(state.destination('y'), Some(b));

        app.erase_symbol();
        assert_eq!(app.automaton.state(a).unwrap().destination('y'), None);
        app.erase_symbol();
        app.erase_symbol();
        assert_eq!(app.status.as_deref(), Some("No symbol to remove"));
        assert_eq!(app.automaton.state(a).unwrap().transitions().len(), 1);
    }

    #[test]
    fn test_conflict_shows_status() {
        let mut app = demo_app();
        // q0: index 0 loops on '0', index 1 goes to q1 on '1'
        app.select_next_transition();
        app.type_symbol('1');
        assert_eq!(
            app.status.as_deref(),
            Some("Symbol '1' already leads to state 1")
        );
        assert_eq!(app.automaton.state(0).unwrap().destination('1'), Some(1));
    }

    #[test]
    fn test_duplicate_connect_reports_error() {
        let mut app = demo_app();
        app.begin_connect();
        app.select_next();
        app.finish_connect();
        assert_eq!(app.edit_mode, EditMode::Normal);
        assert!(app.status.is_some());
        assert_eq!(app.automaton.transition_count(), 6);
    }

    #[test]
    fn test_click_completes_connection() {
        let mut app = empty_app();
        let a = app.add_state_at_cursor();
        let b = app.automaton.add_state(Point::new(100.0, 100.0));

        app.select_state(Some(a));
        app.begin_connect();
        app.click(Point::new(110.0, 95.0));

        assert_eq!(app.edit_mode, EditMode::Symbols);
        assert!(app.automaton.state(a).unwrap().has_transition_between(a, b));
        assert!(app.automaton.adjacency_drift().is_empty());
    }

    #[test]
    fn test_canvas_point_outside_area() {
        let mut app = empty_app();
        app.canvas_area = Rect::new(10, 5, 40, 30);
        assert_eq!(app.canvas_point(9, 10), None);
        assert_eq!(app.canvas_point(50, 10), None);
        assert_eq!(app.canvas_point(10, 5), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_status_uses_current_label() {
        let mut app = demo_app();
        app.automaton.rename_state(0, "even").unwrap();
        app.begin_connect();
        assert_eq!(
            app.status.as_deref(),
            Some("New arrow from even: pick a target and press Enter")
        );
    }

    #[test]
    fn test_nudge_moves_selected_state() {
        let mut app = demo_app();
        let before = app.get_selected_state().unwrap().position();
        app.nudge(1.0, 0.0);
        let after = app.get_selected_state().unwrap().position();
        assert_eq!(after, before + Point::new(app.editor.move_step, 0.0));
    }

    #[test]
    fn test_nudge_clamps_cursor() {
        let mut app = empty_app();
        for _ in 0..100 {
            app.nudge(-1.0, -1.0);
        }
        assert_eq!(app.cursor, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_flags_and_start() {
        let mut app = demo_app();
        app.select_next();
        app.make_start();
        assert_eq!(app.automaton.start(), Some(1));
        app.toggle_accepting();
        assert!(app.automaton.state(1).unwrap().is_accepting());
    }

    #[test]
    fn test_delete_transition_then_state() {
        let mut app = demo_app();
        app.select_next_transition();
        app.delete_selection();
        assert_eq!(app.automaton.transition_count(), 5);
        assert!(app.automaton.adjacency_drift().is_empty());

        app.delete_selection();
        assert_eq!(app.automaton.len(), 2);
        assert!(app.automaton.state(0).is_none());
        assert_eq!(app.selected_state, Some(1));
        assert!(app.automaton.adjacency_drift().is_empty());
    }

    #[test]
    fn test_loop_direction_cycles_on_self_loop() {
        let mut app = demo_app();
        app.select_next_transition();
        app.cycle_loop_direction();
        let state = app.automaton.state(0).unwrap();
        assert_eq!(
            state.transitions()[0].loop_direction(),
            crate::automaton::LoopDirection::Right
        );
    }

    #[test]
    fn test_app_view_modes() {
        let mut app = demo_app();
        app.set_view_mode(ViewMode::TransitionTable);
        app.set_view_mode(ViewMode::Help);
        assert_eq!(app.view_mode, ViewMode::Help);
        app.pop_view_mode();
        assert_eq!(app.view_mode, ViewMode::TransitionTable);
        app.pop_view_mode();
        assert_eq!(app.view_mode, ViewMode::Editor);
        app.pop_view_mode();
        assert_eq!(app.view_mode, ViewMode::Editor);
    }

    #[test]
    fn test_app_quit() {
        let mut app = empty_app();
        app.quit();
        assert!(app.should_quit);
    }
}
