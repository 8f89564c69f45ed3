//! State representation
//!
//! [`AutomatonState`] is one node of the automaton plus everything that
//! leaves it: the symbol table, the arrows that draw it and the adjacency
//! caches. Every mutation below keeps the symbol table deterministic (one
//! destination per symbol) and keeps each table entry backed by an arrow to
//! that destination.

use super::StateId;
use super::adjacency::Adjacency;
use super::geometry::{Endpoints, LoopDirection, Point, StateGeometry};
use super::transition::{Transition, TransitionId};
use crate::render::{LabelMetrics, Surface, Theme};
use crate::{Error, Result};
use ratatui::style::Color;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Position, radius and id of one end of a new transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateAnchor {
    pub id: StateId,
    pub position: Point,
    pub radius: f64,
}

impl StateAnchor {
    pub fn new(id: StateId, position: Point, radius: f64) -> Self {
        Self { id, position, radius }
    }
}

/// Outcome of dropping a single symbol from a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRemoval {
    /// This symbol was removed from the arrow and from the symbol table
    Deleted(char),
    /// Stale index, or the arrow carried no symbol
    Invalid,
}

impl SymbolRemoval {
    pub fn is_success(&self) -> bool {
        matches!(self, SymbolRemoval::Deleted(_))
    }

    /// Numeric status for UI layers: 0 for deleted, -1 for invalid input
    pub fn status_code(&self) -> i32 {
        match self {
            SymbolRemoval::Deleted(_) => 0,
            SymbolRemoval::Invalid => -1,
        }
    }
}

/// A state of the automaton together with its outgoing transitions
#[derive(Debug, Clone)]
pub struct AutomatonState {
    id: StateId,
    label: String,
    position: Point,
    accepting: bool,
    starting: bool,
    transitions_by_symbol: BTreeMap<char, StateId>,
    transitions: Vec<Transition>,
    incoming: Adjacency,
    outgoing: Adjacency,
    fill: Color,
    theme: Theme,
    metrics: Arc<dyn LabelMetrics>,
    geometry: StateGeometry,
}

impl AutomatonState {
    pub fn new(
        id: StateId,
        label: impl Into<String>,
        position: Point,
        theme: Theme,
        metrics: Arc<dyn LabelMetrics>,
    ) -> Self {
        let mut state = Self {
            id,
            label: label.into(),
            position,
            accepting: false,
            starting: false,
            transitions_by_symbol: BTreeMap::new(),
            transitions: Vec::new(),
            incoming: Adjacency::new(),
            outgoing: Adjacency::new(),
            fill: theme.palette.state_fill,
            theme,
            metrics,
            geometry: StateGeometry::default(),
        };
        state.recompute_geometry();
        state
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.recompute_geometry();
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.theme.dimensions.state_radius
    }

    /// Anchor describing this state as one end of a transition
    pub fn anchor(&self) -> StateAnchor {
        StateAnchor::new(self.id, self.position, self.radius())
    }

    pub fn geometry(&self) -> &StateGeometry {
        &self.geometry
    }

    pub fn metrics(&self) -> &Arc<dyn LabelMetrics> {
        &self.metrics
    }

    // Transition table

    /// Append a new, unassigned arrow from `from` to `to`.
    ///
    /// Neither the symbol table nor the adjacency caches are touched; assign a
    /// symbol and record adjacency separately.
    pub fn add_transition(
        &mut self,
        from: StateAnchor,
        to: StateAnchor,
        transition_id: TransitionId,
        metrics: Arc<dyn LabelMetrics>,
    ) -> &Transition {
        let endpoints = if from.id == to.id {
            Endpoints::SelfLoop {
                center: from.position,
                state_radius: from.radius,
                direction: LoopDirection::default(),
            }
        } else {
            Endpoints::Edge {
                from: from.position,
                to: to.position,
                from_radius: from.radius,
                to_radius: to.radius,
            }
        };

        let transition = Transition::new(
            transition_id,
            from.id,
            to.id,
            endpoints,
            &self.theme,
            metrics,
        );
        tracing::debug!(
            "State {}: added transition {} ({} -> {})",
            self.id,
            transition_id,
            from.id,
            to.id
        );
        self.transitions.push(transition);
        &self.transitions[self.transitions.len() - 1]
    }

    /// Route `symbol` through the transition at `index`.
    ///
    /// A symbol already routed by another transition of this state is
    /// rejected with [`Error::SymbolConflict`] and nothing changes.
    pub fn assign_symbol(&mut self, index: usize, symbol: char) -> Result<()> {
        let transition = self.transition_at(index)?;
        if transition.carries(symbol) {
            return Err(Error::DuplicateSymbol(symbol));
        }
        if let Some(&existing) = self.transitions_by_symbol.get(&symbol) {
            tracing::warn!(
                "State {}: symbol '{}' already leads to state {}, refusing to route it to {}",
                self.id,
                symbol,
                existing,
                transition.to()
            );
            return Err(Error::SymbolConflict { symbol, existing });
        }

        let to = transition.to();
        self.transitions[index].add_symbol(symbol);
        self.transitions_by_symbol.insert(symbol, to);
        tracing::debug!("State {}: '{}' -> {}", self.id, symbol, to);
        Ok(())
    }

    /// Remove the transition at `index` along with the symbols it routed
    pub fn remove_transition(&mut self, index: usize) -> Result<Transition> {
        self.transition_at(index)?;
        let removed = self.transitions.remove(index);
        self.forget_symbols(&removed);
        tracing::debug!(
            "State {}: removed transition {} to {}",
            self.id,
            removed.id(),
            removed.to()
        );
        Ok(removed)
    }

    /// Remove the first transition leading to `destination`
    pub fn remove_transition_to(&mut self, destination: StateId) -> Option<Transition> {
        let index = self.transition_index_to(destination)?;
        self.remove_transition(index).ok()
    }

    /// Drop one symbol from the transition at `index`. The transition itself
    /// stays, even once it has no symbols left.
    pub fn remove_single_symbol(&mut self, index: usize) -> SymbolRemoval {
        let Some(transition) = self.transitions.get_mut(index) else {
            tracing::debug!("State {}: no transition at index {}", self.id, index);
            return SymbolRemoval::Invalid;
        };

        match transition.remove_single_symbol() {
            Some(symbol) => {
                self.transitions_by_symbol.remove(&symbol);
                tracing::debug!("State {}: removed symbol '{}'", self.id, symbol);
                SymbolRemoval::Deleted(symbol)
            }
            None => SymbolRemoval::Invalid,
        }
    }

    /// Where `symbol` leads from this state
    pub fn destination(&self, symbol: char) -> Option<StateId> {
        self.transitions_by_symbol.get(&symbol).copied()
    }

    pub fn has_transition_between(&self, from: StateId, to: StateId) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from() == from && t.to() == to)
    }

    pub fn has_symbol(&self, symbol: char) -> bool {
        self.transitions_by_symbol.contains_key(&symbol)
    }

    pub fn symbol_table(&self) -> &BTreeMap<char, StateId> {
        &self.transitions_by_symbol
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, index: usize) -> Option<&Transition> {
        self.transitions.get(index)
    }

    /// First transition leading to `destination`, with its index
    pub fn transition_to(&self, destination: StateId) -> Option<(usize, &Transition)> {
        self.transitions
            .iter()
            .enumerate()
            .find(|(_, t)| t.to() == destination)
    }

    pub fn transition_index_to(&self, destination: StateId) -> Option<usize> {
        self.transition_to(destination).map(|(index, _)| index)
    }

    /// Point the transition at `index` at another state, carrying its symbols,
    /// and re-attach it there (as a self-loop when `to` is this state).
    /// Returns the previous destination. Adjacency caches are left alone.
    pub fn retarget_transition(&mut self, index: usize, to: StateAnchor) -> Result<StateId> {
        let current = self.transition_at(index)?.to();
        if current == to.id {
            return Ok(current);
        }
        if self.has_transition_between(self.id, to.id) {
            return Err(Error::DuplicateTransition {
                from: self.id,
                to: to.id,
            });
        }

        let (center, radius) = (self.position, self.radius());
        let transition = &mut self.transitions[index];
        transition.set_to(to.id);
        if to.id == self.id {
            transition.relayout_self_loop(center, radius);
        } else {
            transition.relayout_regular(center, to.position, radius, to.radius);
        }
        for symbol in transition.symbols() {
            self.transitions_by_symbol.insert(*symbol, to.id);
        }
        tracing::debug!(
            "State {}: transition {} now leads to {} instead of {}",
            self.id,
            transition.id(),
            to.id,
            current
        );
        Ok(current)
    }

    pub fn set_transition_color(&mut self, index: usize, color: Color) -> Result<()> {
        self.transition_at_mut(index)?.set_color(color);
        Ok(())
    }

    pub fn set_loop_direction(&mut self, index: usize, direction: LoopDirection) -> Result<()> {
        self.transition_at_mut(index)?.set_loop_direction(direction);
        Ok(())
    }

    /// Re-attach the transition at `index` between this state and `to`
    pub fn relayout_transition(&mut self, index: usize, to: Point) -> Result<()> {
        let from = self.position;
        let radius = self.radius();
        self.transition_at_mut(index)?.relayout_regular(from, to, radius, radius);
        Ok(())
    }

    /// Re-attach the self-loop at `index` to this state's current position
    pub fn relayout_self_loop(&mut self, index: usize) -> Result<()> {
        let center = self.position;
        let radius = self.radius();
        self.transition_at_mut(index)?.relayout_self_loop(center, radius);
        Ok(())
    }

    fn transition_at(&self, index: usize) -> Result<&Transition> {
        self.transitions.get(index).ok_or(Error::InvalidTransitionIndex {
            index,
            len: self.transitions.len(),
        })
    }

    fn transition_at_mut(&mut self, index: usize) -> Result<&mut Transition> {
        let len = self.transitions.len();
        self.transitions
            .get_mut(index)
            .ok_or(Error::InvalidTransitionIndex { index, len })
    }

    /// Erase the table entries a removed transition was responsible for.
    /// An entry pointing elsewhere belongs to another arrow and is kept.
    fn forget_symbols(&mut self, removed: &Transition) {
        for symbol in removed.symbols() {
            match self.transitions_by_symbol.get(symbol) {
                Some(&to) if to == removed.to() => {
                    self.transitions_by_symbol.remove(symbol);
                }
                Some(&to) => tracing::warn!(
                    "State {}: symbol '{}' maps to {} but was carried by the arrow to {}",
                    self.id,
                    symbol,
                    to,
                    removed.to()
                ),
                None => tracing::warn!(
                    "State {}: symbol '{}' was carried but missing from the table",
                    self.id,
                    symbol
                ),
            }
        }
    }

    // Adjacency caches

    pub fn add_incoming(&mut self, from: StateId) {
        self.incoming.push(from);
    }

    pub fn add_outgoing(&mut self, to: StateId) {
        self.outgoing.push(to);
    }

    /// Remove the first cached incoming entry for `from`; false if absent
    pub fn remove_incoming(&mut self, from: StateId) -> bool {
        self.incoming.remove_first(from)
    }

    /// Remove the first cached outgoing entry for `to`; false if absent
    pub fn remove_outgoing(&mut self, to: StateId) -> bool {
        self.outgoing.remove_first(to)
    }

    pub fn incoming(&self) -> &Adjacency {
        &self.incoming
    }

    pub fn outgoing(&self) -> &Adjacency {
        &self.outgoing
    }

    pub(crate) fn incoming_mut(&mut self) -> &mut Adjacency {
        &mut self.incoming
    }

    pub(crate) fn outgoing_mut(&mut self) -> &mut Adjacency {
        &mut self.outgoing
    }

    // Geometry and flags

    /// Move the state. Arrows owned by other states are not updated here.
    pub fn move_to(&mut self, position: Point) {
        self.position = position;
        self.recompute_geometry();
    }

    /// Derive every visual anchor from the current position and label
    pub fn recompute_geometry(&mut self) {
        let label_size = self.metrics.measure(&self.label);
        self.geometry = StateGeometry::compute(self.position, label_size, &self.theme.dimensions);
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn toggle_accepting(&mut self) {
        self.accepting = !self.accepting;
    }

    pub fn set_accepting(&mut self, accepting: bool) {
        self.accepting = accepting;
    }

    pub fn is_starting(&self) -> bool {
        self.starting
    }

    pub fn set_starting(&mut self, starting: bool) {
        self.starting = starting;
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn set_fill(&mut self, color: Color) {
        self.fill = color;
    }

    pub fn set_default_fill(&mut self) {
        self.fill = self.theme.palette.state_fill;
    }

    pub fn set_accepted_fill(&mut self) {
        self.fill = self.theme.palette.accepted_fill;
    }

    pub fn set_declined_fill(&mut self) {
        self.fill = self.theme.palette.declined_fill;
    }

    // Rendering

    /// Draw the node: body and label always, rings and start arrow by flag
    pub fn render(&self, surface: &mut dyn Surface, selected: bool) {
        let palette = &self.theme.palette;
        let g = &self.geometry;

        surface.disc(g.center, g.body_radius, self.fill);
        surface.text(g.label_anchor, &self.label, palette.label);

        if selected {
            surface.ring(g.center, g.selection_radius, palette.selection_ring);
        }
        if self.accepting {
            surface.ring(g.center, g.accepting_radius, palette.accepting_ring);
        }
        if self.starting {
            for tip in g.start_arrow.tips {
                surface.line(tip, palette.start_arrow);
            }
            surface.line(g.start_arrow.shaft, palette.start_arrow);
        }
    }

    /// Redraw every outgoing arrow, `highlighted` in the highlight colour
    pub fn render_transitions(&mut self, surface: &mut dyn Surface, highlighted: Option<usize>) {
        let palette = self.theme.palette;
        for (index, transition) in self.transitions.iter_mut().enumerate() {
            if highlighted == Some(index) {
                transition.set_color(palette.transition_highlight);
            } else {
                transition.set_color(palette.transition);
            }
            transition.render(surface);
        }
    }
}
