use super::StateId;
use super::geometry::Point;
use super::state::{AutomatonState, SymbolRemoval};
use super::transition::{Transition, TransitionId};
use crate::render::{LabelMetrics, Surface, Theme};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// The whole automaton: every state, keyed by id.
///
/// Individual states leave cross-state bookkeeping to their owner. This type
/// is that owner: each edit here updates both ends of an arrow, so the
/// adjacency caches stay paired with the transition objects.
#[derive(Debug, Clone)]
pub struct Automaton {
    states: BTreeMap<StateId, AutomatonState>,
    next_state_id: StateId,
    next_transition_id: TransitionId,
    theme: Theme,
    metrics: Arc<dyn LabelMetrics>,
}

/// Which cache of a state disagrees with the transition objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriftSide {
    Incoming,
    Outgoing,
}

/// A peer whose cached count differs from the count derived from arrows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacencyDrift {
    pub state: StateId,
    pub peer: StateId,
    pub side: DriftSide,
    pub cached: usize,
    pub derived: usize,
}

/// One arrow in a summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRow {
    pub from: StateId,
    pub to: StateId,
    pub symbols: String,
}

/// Counts and transition table of an automaton
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomatonSummary {
    pub states: usize,
    pub transitions: usize,
    pub alphabet: String,
    pub start: Option<StateId>,
    pub accepting: Vec<StateId>,
    pub rows: Vec<TransitionRow>,
}

impl Automaton {
    pub fn new(theme: Theme, metrics: Arc<dyn LabelMetrics>) -> Self {
        Self {
            states: BTreeMap::new(),
            next_state_id: 0,
            next_transition_id: 0,
            theme,
            metrics,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Add a state labelled `q<id>`
    pub fn add_state(&mut self, position: Point) -> StateId {
        let id = self.next_state_id;
        self.add_labeled_state(format!("q{}", id), position)
    }

    pub fn add_labeled_state(&mut self, label: impl Into<String>, position: Point) -> StateId {
        let id = self.next_state_id;
        self.next_state_id += 1;
        let state = AutomatonState::new(id, label, position, self.theme, self.metrics.clone());
        tracing::debug!("Added state {} ({}) at {:?}", id, state.label(), position);
        self.states.insert(id, state);
        id
    }

    /// Remove a state and every arrow leading into it
    pub fn remove_state(&mut self, id: StateId) -> Result<AutomatonState> {
        let removed = self.states.remove(&id).ok_or(Error::StateNotFound(id))?;

        for state in self.states.values_mut() {
            while state.remove_transition_to(id).is_some() {}
            state.incoming_mut().remove_all(id);
            state.outgoing_mut().remove_all(id);
        }
        tracing::debug!("Removed state {}", id);
        Ok(removed)
    }

    pub fn rename_state(&mut self, id: StateId, label: impl Into<String>) -> Result<()> {
        self.state_mut(id)?.set_label(label);
        Ok(())
    }

    /// Draw a new, unassigned arrow and record it in both adjacency caches.
    /// Returns the arrow's index within `from`.
    pub fn connect(&mut self, from: StateId, to: StateId) -> Result<usize> {
        let to_anchor = self.state(to).ok_or(Error::StateNotFound(to))?.anchor();
        let transition_id = self.next_transition_id;
        let metrics = self.metrics.clone();

        let source = self.state_mut(from)?;
        if source.has_transition_between(from, to) {
            return Err(Error::DuplicateTransition { from, to });
        }
        let from_anchor = source.anchor();
        source.add_transition(from_anchor, to_anchor, transition_id, metrics);
        source.add_outgoing(to);
        let index = source.transitions().len() - 1;

        self.state_mut(to)?.add_incoming(from);
        self.next_transition_id += 1;
        Ok(index)
    }

    /// Remove the arrow from `from` to `to` and its adjacency entries
    pub fn disconnect(&mut self, from: StateId, to: StateId) -> Result<Transition> {
        let removed = self
            .state_mut(from)?
            .remove_transition_to(to)
            .ok_or(Error::TransitionNotFound { from, to })?;
        self.unlink(from, to);
        Ok(removed)
    }

    /// Remove the arrow at `index` of `from` and its adjacency entries
    pub fn remove_transition(&mut self, from: StateId, index: usize) -> Result<Transition> {
        let removed = self.state_mut(from)?.remove_transition(index)?;
        self.unlink(from, removed.to());
        Ok(removed)
    }

    /// Point the arrow at `index` of `from` at `to`, moving its adjacency
    /// entries from the old pair to the new one
    pub fn retarget(&mut self, from: StateId, index: usize, to: StateId) -> Result<()> {
        let to_anchor = self.state(to).ok_or(Error::StateNotFound(to))?.anchor();
        let previous = self.state_mut(from)?.retarget_transition(index, to_anchor)?;
        if previous != to {
            self.unlink(from, previous);
            self.state_mut(from)?.add_outgoing(to);
            self.state_mut(to)?.add_incoming(from);
        }
        Ok(())
    }

    fn unlink(&mut self, from: StateId, to: StateId) {
        let found_outgoing = self
            .states
            .get_mut(&from)
            .is_some_and(|s| s.remove_outgoing(to));
        let found_incoming = self
            .states
            .get_mut(&to)
            .is_some_and(|s| s.remove_incoming(from));
        if !(found_outgoing && found_incoming) {
            tracing::warn!("Adjacency for {} -> {} was already missing", from, to);
        }
    }

    pub fn assign_symbol(&mut self, from: StateId, index: usize, symbol: char) -> Result<()> {
        self.state_mut(from)?.assign_symbol(index, symbol)
    }

    pub fn remove_single_symbol(&mut self, from: StateId, index: usize) -> Result<SymbolRemoval> {
        Ok(self.state_mut(from)?.remove_single_symbol(index))
    }

    /// Move a state and re-attach every arrow touching it, on both ends
    pub fn move_state(&mut self, id: StateId, position: Point) -> Result<()> {
        let targets: Vec<(usize, Option<Point>)> = {
            let state = self.state(id).ok_or(Error::StateNotFound(id))?;
            state
                .transitions()
                .iter()
                .enumerate()
                .map(|(index, t)| {
                    let target = if t.is_self_loop() {
                        None
                    } else {
                        self.states.get(&t.to()).map(|s| s.position())
                    };
                    (index, target)
                })
                .collect()
        };

        let state = self.state_mut(id)?;
        state.move_to(position);
        for (index, target) in targets {
            match target {
                Some(to) => state.relayout_transition(index, to)?,
                None => state.relayout_self_loop(index)?,
            }
        }

        for (&peer, state) in self.states.iter_mut() {
            if peer == id {
                continue;
            }
            if let Some(index) = state.transition_index_to(id) {
                state.relayout_transition(index, position)?;
            }
        }
        Ok(())
    }

    /// Make `id` the only starting state
    pub fn set_start(&mut self, id: StateId) -> Result<()> {
        if !self.states.contains_key(&id) {
            return Err(Error::StateNotFound(id));
        }
        for (&sid, state) in self.states.iter_mut() {
            state.set_starting(sid == id);
        }
        Ok(())
    }

    pub fn clear_start(&mut self) {
        for state in self.states.values_mut() {
            state.set_starting(false);
        }
    }

    pub fn start(&self) -> Option<StateId> {
        self.states
            .values()
            .find(|s| s.is_starting())
            .map(|s| s.id())
    }

    pub fn state(&self, id: StateId) -> Option<&AutomatonState> {
        self.states.get(&id)
    }

    /// Current label of `id`, or `#<id>` for a state that no longer exists
    pub fn label_of(&self, id: StateId) -> String {
        self.states
            .get(&id)
            .map(|s| s.label().to_owned())
            .unwrap_or_else(|| format!("#{}", id))
    }

    pub fn state_mut(&mut self, id: StateId) -> Result<&mut AutomatonState> {
        self.states.get_mut(&id).ok_or(Error::StateNotFound(id))
    }

    pub fn states(&self) -> impl Iterator<Item = &AutomatonState> {
        self.states.values()
    }

    pub fn ids(&self) -> Vec<StateId> {
        self.states.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Topmost state whose body contains `point`
    pub fn state_at(&self, point: Point) -> Option<StateId> {
        self.states
            .values()
            .rev()
            .find(|s| (s.position() - point).length() <= s.radius())
            .map(|s| s.id())
    }

    /// Destinations of `id`, read from its arrows rather than its cache
    pub fn derived_outgoing(&self, id: StateId) -> Vec<StateId> {
        self.states
            .get(&id)
            .map(|s| s.transitions().iter().map(|t| t.to()).collect())
            .unwrap_or_default()
    }

    /// Sources of arrows into `id`, read from every state's arrows
    pub fn derived_incoming(&self, id: StateId) -> Vec<StateId> {
        self.states
            .values()
            .flat_map(|s| s.transitions().iter())
            .filter(|t| t.to() == id)
            .map(|t| t.from())
            .collect()
    }

    /// Every place where a cached adjacency list disagrees with the arrows
    pub fn adjacency_drift(&self) -> Vec<AdjacencyDrift> {
        let mut drift = Vec::new();
        for state in self.states.values() {
            let id = state.id();
            let sides = [
                (DriftSide::Outgoing, state.outgoing(), self.derived_outgoing(id)),
                (DriftSide::Incoming, state.incoming(), self.derived_incoming(id)),
            ];
            for (side, cache, from_arrows) in sides {
                let peers: BTreeSet<StateId> =
                    cache.iter().chain(from_arrows.iter().copied()).collect();
                for peer in peers {
                    let cached = cache.count(peer);
                    let derived = from_arrows.iter().filter(|&&p| p == peer).count();
                    if cached != derived {
                        drift.push(AdjacencyDrift {
                            state: id,
                            peer,
                            side,
                            cached,
                            derived,
                        });
                    }
                }
            }
        }
        drift
    }

    /// Every symbol used by any state
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.states
            .values()
            .flat_map(|s| s.symbol_table().keys().copied())
            .collect()
    }

    pub fn transition_count(&self) -> usize {
        self.states.values().map(|s| s.transitions().len()).sum()
    }

    pub fn summary(&self) -> AutomatonSummary {
        let rows = self
            .states
            .values()
            .flat_map(|s| s.transitions().iter())
            .map(|t| TransitionRow {
                from: t.from(),
                to: t.to(),
                symbols: t.label(),
            })
            .collect();

        AutomatonSummary {
            states: self.states.len(),
            transitions: self.transition_count(),
            alphabet: self.alphabet().into_iter().collect(),
            start: self.start(),
            accepting: self
                .states
                .values()
                .filter(|s| s.is_accepting())
                .map(|s| s.id())
                .collect(),
            rows,
        }
    }

    /// Full redraw: arrows first, then the state bodies on top
    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        selected: Option<StateId>,
        highlighted: Option<(StateId, usize)>,
    ) {
        for (&id, state) in self.states.iter_mut() {
            let highlight = highlighted.and_then(|(sid, index)| (sid == id).then_some(index));
            state.render_transitions(surface, highlight);
        }
        for (&id, state) in &self.states {
            state.render(surface, selected == Some(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::geometry::Endpoints;
    use crate::render::CellMetrics;
    use crate::render::testing::RecordingSurface;

    fn automaton() -> Automaton {
        Automaton::new(Theme::default(), Arc::new(CellMetrics::default()))
    }

    fn pair() -> (Automaton, StateId, StateId) {
        let mut a = automaton();
        let s0 = a.add_state(Point::new(100.0, 100.0));
        let s1 = a.add_state(Point::new(300.0, 100.0));
        (a, s0, s1)
    }

    #[test]
    fn test_ids_are_unique_and_labels_default() {
        let (a, s0, s1) = pair();
        assert_ne!(s0, s1);
        assert_eq!(a.state(s0).unwrap().label(), "q0");
        assert_eq!(a.state(s1).unwrap().label(), "q1");
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_label_of_follows_rename() {
        let (mut a, s0, _) = pair();
        assert_eq!(a.label_of(s0), "q0");
        a.rename_state(s0, "even").unwrap();
        assert_eq!(a.label_of(s0), "even");
        assert_eq!(a.label_of(99), "#99");
    }

    #[test]
    fn test_connect_pairs_adjacency() {
        let (mut a, s0, s1) = pair();
        let index = a.connect(s0, s1).unwrap();
        assert_eq!(index, 0);

        assert_eq!(a.state(s0).unwrap().outgoing().count(s1), 1);
        assert_eq!(a.state(s1).unwrap().incoming().count(s0), 1);
        assert!(a.adjacency_drift().is_empty());

        a.disconnect(s0, s1).unwrap();
        assert!(!a.state(s0).unwrap().outgoing().contains(s1));
        assert!(!a.state(s1).unwrap().incoming().contains(s0));
        assert!(a.adjacency_drift().is_empty());
    }

    #[test]
    fn test_manual_adjacency_symmetry() {
        let (mut a, s0, s1) = pair();
        a.state_mut(s0).unwrap().add_outgoing(s1);
        a.state_mut(s1).unwrap().add_incoming(s0);

        assert_eq!(a.state(s0).unwrap().outgoing().as_slice(), &[s1]);
        assert_eq!(a.state(s1).unwrap().incoming().as_slice(), &[s0]);

        assert!(a.state_mut(s0).unwrap().remove_outgoing(s1));
        assert!(a.state_mut(s1).unwrap().remove_incoming(s0));
        assert!(a.state(s0).unwrap().outgoing().is_empty());
        assert!(a.state(s1).unwrap().incoming().is_empty());
    }

    #[test]
    fn test_duplicate_connect_rejected() {
        let (mut a, s0, s1) = pair();
        a.connect(s0, s1).unwrap();
        assert!(matches!(
            a.connect(s0, s1),
            Err(Error::DuplicateTransition { .. })
        ));
        assert_eq!(a.transition_count(), 1);
    }

    #[test]
    fn test_connect_unknown_state() {
        let (mut a, s0, _) = pair();
        assert!(matches!(a.connect(s0, 42), Err(Error::StateNotFound(42))));
        assert!(matches!(a.connect(42, s0), Err(Error::StateNotFound(42))));
        assert!(a.adjacency_drift().is_empty());
    }

    #[test]
    fn test_self_loop_connect() {
        let (mut a, s0, _) = pair();
        a.connect(s0, s0).unwrap();
        let state = a.state(s0).unwrap();
        assert!(state.transitions()[0].is_self_loop());
        assert_eq!(state.outgoing().as_slice(), &[s0]);
        assert_eq!(state.incoming().as_slice(), &[s0]);
        assert!(a.adjacency_drift().is_empty());
    }

    #[test]
    fn test_remove_state_drops_incoming_arrows() {
        let (mut a, s0, s1) = pair();
        let s2 = a.add_state(Point::new(200.0, 300.0));
        a.connect(s0, s1).unwrap();
        a.connect(s2, s1).unwrap();
        a.connect(s1, s2).unwrap();
        a.assign_symbol(s0, 0, 'a').unwrap();
        a.assign_symbol(s2, 0, 'b').unwrap();

        let removed = a.remove_state(s1).unwrap();
        assert_eq!(removed.id(), s1);

        assert_eq!(a.state(s0).unwrap().destination('a'), None);
        assert_eq!(a.state(s2).unwrap().destination('b'), None);
        assert_eq!(a.transition_count(), 0);
        assert!(a.adjacency_drift().is_empty());
        assert!(matches!(a.remove_state(s1), Err(Error::StateNotFound(_))));
    }

    #[test]
    fn test_remove_transition_by_index_unlinks() {
        let (mut a, s0, s1) = pair();
        a.connect(s0, s1).unwrap();
        let removed = a.remove_transition(s0, 0).unwrap();
        assert_eq!(removed.to(), s1);
        assert!(a.adjacency_drift().is_empty());
        assert!(a.remove_transition(s0, 0).unwrap_err().is_not_found());
    }

    #[test]
    fn test_retarget_moves_adjacency_and_layout() {
        let (mut a, s0, s1) = pair();
        let s2 = a.add_state(Point::new(100.0, 400.0));
        a.connect(s0, s1).unwrap();
        a.assign_symbol(s0, 0, 'a').unwrap();

        a.retarget(s0, 0, s2).unwrap();
        assert!(a.adjacency_drift().is_empty());
        assert_eq!(a.state(s0).unwrap().destination('a'), Some(s2));
        assert!(!a.state(s1).unwrap().incoming().contains(s0));
        assert_eq!(
            a.state(s0).unwrap().transitions()[0].endpoints(),
            &Endpoints::Edge {
                from: Point::new(100.0, 100.0),
                to: Point::new(100.0, 400.0),
                from_radius: 40.0,
                to_radius: 40.0,
            }
        );

        a.retarget(s0, 0, s0).unwrap();
        assert!(a.adjacency_drift().is_empty());
        let t = &a.state(s0).unwrap().transitions()[0];
        assert!(t.is_self_loop());
        assert!(matches!(t.endpoints(), Endpoints::SelfLoop { .. }));
        assert_eq!(a.state(s0).unwrap().incoming().count(s0), 1);
    }

    #[test]
    fn test_retarget_unknown_target_changes_nothing() {
        let (mut a, s0, s1) = pair();
        a.connect(s0, s1).unwrap();
        assert!(matches!(a.retarget(s0, 0, 42), Err(Error::StateNotFound(42))));
        assert_eq!(a.state(s0).unwrap().transitions()[0].to(), s1);
        assert!(a.adjacency_drift().is_empty());
    }

    #[test]
    fn test_drift_detected_for_unpaired_cache() {
        let (mut a, s0, s1) = pair();
        a.state_mut(s0).unwrap().add_outgoing(s1);

        let drift = a.adjacency_drift();
        assert_eq!(
            drift,
            vec![AdjacencyDrift {
                state: s0,
                peer: s1,
                side: DriftSide::Outgoing,
                cached: 1,
                derived: 0,
            }]
        );
    }

    #[test]
    fn test_derived_adjacency() {
        let (mut a, s0, s1) = pair();
        let s2 = a.add_state(Point::new(0.0, 0.0));
        a.connect(s0, s1).unwrap();
        a.connect(s2, s1).unwrap();

        assert_eq!(a.derived_outgoing(s0), vec![s1]);
        assert_eq!(a.derived_incoming(s1), vec![s0, s2]);
        assert!(a.derived_incoming(s0).is_empty());
    }

    #[test]
    fn test_set_start_is_exclusive() {
        let (mut a, s0, s1) = pair();
        a.set_start(s0).unwrap();
        a.set_start(s1).unwrap();
        assert_eq!(a.start(), Some(s1));
        assert!(!a.state(s0).unwrap().is_starting());
        assert!(a.set_start(99).is_err());

        a.clear_start();
        assert_eq!(a.start(), None);
    }

    #[test]
    fn test_move_state_relayouts_both_ends() {
        let (mut a, s0, s1) = pair();
        a.connect(s0, s1).unwrap();
        a.connect(s1, s0).unwrap();
        a.connect(s1, s1).unwrap();

        a.move_state(s1, Point::new(300.0, 400.0)).unwrap();

        let expected_out = crate::automaton::geometry::Endpoints::Edge {
            from: Point::new(100.0, 100.0),
            to: Point::new(300.0, 400.0),
            from_radius: 40.0,
            to_radius: 40.0,
        };
        assert_eq!(a.state(s0).unwrap().transitions()[0].endpoints(), &expected_out);

        let moved = a.state(s1).unwrap();
        assert_eq!(moved.position(), Point::new(300.0, 400.0));
        assert!(matches!(
            moved.transitions()[0].endpoints(),
            Endpoints::Edge { from, .. } if *from == Point::new(300.0, 400.0)
        ));
        assert!(matches!(
            moved.transitions()[1].endpoints(),
            Endpoints::SelfLoop { center, .. } if *center == Point::new(300.0, 400.0)
        ));
    }

    #[test]
    fn test_state_at_hit_test() {
        let (a, s0, _) = pair();
        assert_eq!(a.state_at(Point::new(110.0, 90.0)), Some(s0));
        assert_eq!(a.state_at(Point::new(200.0, 100.0)), None);
    }

    #[test]
    fn test_summary() {
        let (mut a, s0, s1) = pair();
        a.connect(s0, s1).unwrap();
        a.assign_symbol(s0, 0, 'b').unwrap();
        a.assign_symbol(s0, 0, 'a').unwrap();
        a.set_start(s0).unwrap();
        a.state_mut(s1).unwrap().set_accepting(true);

        let summary = a.summary();
        assert_eq!(summary.states, 2);
        assert_eq!(summary.transitions, 1);
        assert_eq!(summary.alphabet, "ab");
        assert_eq!(summary.start, Some(s0));
        assert_eq!(summary.accepting, vec![s1]);
        assert_eq!(
            summary.rows,
            vec![TransitionRow {
                from: s0,
                to: s1,
                symbols: "b,a".to_string()
            }]
        );
    }

    #[test]
    fn test_render_draws_every_state() {
        let (mut a, s0, s1) = pair();
        a.connect(s0, s1).unwrap();
        let mut surface = RecordingSurface::default();
        a.render(&mut surface, Some(s1), Some((s0, 0)));

        assert_eq!(surface.texts(), vec!["q0", "q1"]);
        assert_eq!(surface.rings(), vec![a.theme().dimensions.selection_radius]);
        assert_eq!(surface.lines_with(a.theme().palette.transition_highlight), 3);
    }
}
