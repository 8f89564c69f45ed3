//! Transition representation
//!
//! A [`Transition`] is one arrow from a state to a destination. Every symbol
//! routed to the same destination shares the arrow, so a transition carries a
//! set of symbols rather than a single one. A transition with no symbols is
//! legal: the editor draws the arrow before a symbol has been chosen.

use super::StateId;
use super::geometry::{Dimensions, Endpoints, LoopDirection, Point, TransitionGeometry};
use crate::render::{LabelMetrics, Surface, Theme};
use ratatui::style::Color;
use std::sync::Arc;

pub type TransitionId = u32;

/// An arrow between two states
#[derive(Debug, Clone)]
pub struct Transition {
    id: TransitionId,
    from: StateId,
    to: StateId,
    /// Insertion order, no duplicates
    symbols: Vec<char>,
    color: Color,
    loop_direction: LoopDirection,
    endpoints: Endpoints,
    geometry: TransitionGeometry,
    dimensions: Dimensions,
    metrics: Arc<dyn LabelMetrics>,
}

impl Transition {
    pub fn new(
        id: TransitionId,
        from: StateId,
        to: StateId,
        endpoints: Endpoints,
        theme: &Theme,
        metrics: Arc<dyn LabelMetrics>,
    ) -> Self {
        let dimensions = theme.dimensions;
        let loop_direction = match endpoints {
            Endpoints::SelfLoop { direction, .. } => direction,
            Endpoints::Edge { .. } => LoopDirection::default(),
        };
        let geometry =
            TransitionGeometry::compute(&endpoints, metrics.measure(""), &dimensions);

        Self {
            id,
            from,
            to,
            symbols: Vec::new(),
            color: theme.palette.transition,
            loop_direction,
            endpoints,
            geometry,
            dimensions,
            metrics,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn from(&self) -> StateId {
        self.from
    }

    pub fn to(&self) -> StateId {
        self.to
    }

    pub fn set_to(&mut self, to: StateId) {
        self.to = to;
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn carries(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    /// A transition is assigned once it carries at least one symbol
    pub fn is_assigned(&self) -> bool {
        !self.symbols.is_empty()
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    /// Add a symbol; returns false if the transition already carries it
    pub fn add_symbol(&mut self, symbol: char) -> bool {
        if self.carries(symbol) {
            return false;
        }
        self.symbols.push(symbol);
        self.relayout();
        true
    }

    /// Drop the most recently added symbol, like a backspace on the label
    pub fn remove_single_symbol(&mut self) -> Option<char> {
        let removed = self.symbols.pop();
        if removed.is_some() {
            self.relayout();
        }
        removed
    }

    /// Symbols joined for display, e.g. `a,b`
    pub fn label(&self) -> String {
        let mut label = String::with_capacity(self.symbols.len() * 2);
        for (i, symbol) in self.symbols.iter().enumerate() {
            if i > 0 {
                label.push(',');
            }
            label.push(*symbol);
        }
        label
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn loop_direction(&self) -> LoopDirection {
        self.loop_direction
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn geometry(&self) -> &TransitionGeometry {
        &self.geometry
    }

    /// Re-attach as a regular edge between two state circles
    pub fn relayout_regular(&mut self, from: Point, to: Point, from_radius: f64, to_radius: f64) {
        self.endpoints = Endpoints::Edge {
            from,
            to,
            from_radius,
            to_radius,
        };
        self.relayout();
    }

    /// Re-attach as a loop on the state centred at `center`
    pub fn relayout_self_loop(&mut self, center: Point, state_radius: f64) {
        self.endpoints = Endpoints::SelfLoop {
            center,
            state_radius,
            direction: self.loop_direction,
        };
        self.relayout();
    }

    /// Move a self-loop to another side of its state. Regular edges only
    /// remember the direction for when they become a loop.
    pub fn set_loop_direction(&mut self, direction: LoopDirection) {
        self.loop_direction = direction;
        if let Endpoints::SelfLoop { center, state_radius, .. } = self.endpoints {
            self.relayout_self_loop(center, state_radius);
        }
    }

    fn relayout(&mut self) {
        let label_size = self.metrics.measure(&self.label());
        self.geometry = TransitionGeometry::compute(&self.endpoints, label_size, &self.dimensions);
    }

    /// Draw the arrow in its current colour
    pub fn render(&self, surface: &mut dyn Surface) {
        match &self.geometry {
            TransitionGeometry::Edge { shaft, .. } => surface.line(*shaft, self.color),
            TransitionGeometry::SelfLoop { center, radius, .. } => {
                surface.ring(*center, *radius, self.color)
            }
        }
        for tip in self.geometry.tips() {
            surface.line(*tip, self.color);
        }
        if self.is_assigned() {
            surface.text(self.geometry.label_anchor(), &self.label(), self.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CellMetrics;
    use crate::render::testing::RecordingSurface;

    fn edge(from: StateId, to: StateId) -> Transition {
        Transition::new(
            1,
            from,
            to,
            Endpoints::Edge {
                from: Point::new(0.0, 0.0),
                to: Point::new(200.0, 0.0),
                from_radius: 40.0,
                to_radius: 40.0,
            },
            &Theme::default(),
            Arc::new(CellMetrics::default()),
        )
    }

    #[test]
    fn test_new_transition_is_unassigned() {
        let t = edge(1, 2);
        assert!(!t.is_assigned());
        assert!(t.symbols().is_empty());
        assert_eq!(t.from(), 1);
        assert_eq!(t.to(), 2);
        assert!(!t.is_self_loop());
    }

    #[test]
    fn test_new_transition_uses_theme_colour() {
        let mut theme = Theme::default();
        theme.palette.transition = Color::Cyan;
        let t = Transition::new(
            2,
            1,
            1,
            Endpoints::SelfLoop {
                center: Point::new(0.0, 0.0),
                state_radius: 40.0,
                direction: LoopDirection::Up,
            },
            &theme,
            Arc::new(CellMetrics::default()),
        );
        assert_eq!(t.color(), Color::Cyan);

        let mut surface = RecordingSurface::default();
        t.render(&mut surface);
        assert_eq!(surface.lines_with(Color::Cyan), 2);
    }

    #[test]
    fn test_add_symbol_rejects_duplicates() {
        let mut t = edge(1, 2);
        assert!(t.add_symbol('a'));
        assert!(t.add_symbol('b'));
        assert!(!t.add_symbol('a'));
        assert_eq!(t.symbols(), &['a', 'b']);
        assert_eq!(t.label(), "a,b");
    }

    #[test]
    fn test_remove_single_symbol_is_last_in_first_out() {
        let mut t = edge(1, 2);
        t.add_symbol('x');
        t.add_symbol('y');

        assert_eq!(t.remove_single_symbol(), Some('y'));
        assert_eq!(t.remove_single_symbol(), Some('x'));
        assert_eq!(t.remove_single_symbol(), None);
        assert!(!t.is_assigned());
    }

    #[test]
    fn test_label_moves_with_width() {
        let mut t = edge(1, 2);
        let before = t.geometry().label_anchor();
        t.add_symbol('a');
        t.add_symbol('b');
        let after = t.geometry().label_anchor();
        // wider label, same centre: the anchor shifts left
        assert!(after.x < before.x);
    }

    #[test]
    fn test_loop_direction_relayouts_self_loop() {
        let mut t = Transition::new(
            7,
            3,
            3,
            Endpoints::SelfLoop {
                center: Point::new(100.0, 100.0),
                state_radius: 40.0,
                direction: LoopDirection::Up,
            },
            &Theme::default(),
            Arc::new(CellMetrics::default()),
        );
        assert!(t.is_self_loop());

        t.set_loop_direction(LoopDirection::Down);
        let TransitionGeometry::SelfLoop { center, .. } = t.geometry() else {
            panic!("expected a self loop");
        };
        assert_eq!(*center, Point::new(100.0, 140.0));
    }

    #[test]
    fn test_render_draws_label_only_when_assigned() {
        let mut t = edge(1, 2);
        let mut surface = RecordingSurface::default();
        t.render(&mut surface);
        assert!(surface.texts().is_empty());
        assert_eq!(surface.lines_with(t.color()), 3);

        t.add_symbol('0');
        t.set_color(Color::Yellow);
        let mut surface = RecordingSurface::default();
        t.render(&mut surface);
        assert_eq!(surface.texts(), vec!["0"]);
        assert_eq!(surface.lines_with(Color::Yellow), 3);
    }
}
