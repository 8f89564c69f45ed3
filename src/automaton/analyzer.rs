//! Automaton structure analyzer
//!
//! Builds a petgraph view of the arrows and reports structural problems an
//! editor user usually wants to see: states the start cannot reach, states
//! that can never reach an accepting state, and missing symbols.

use super::{Automaton, StateId};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{Bfs, Reversed};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Directed graph of state ids, one edge per arrow, weighted by its symbols
pub struct ArrowGraph {
    pub graph: StableGraph<StateId, String>,
    pub index: HashMap<StateId, NodeIndex>,
}

impl ArrowGraph {
    pub fn build(automaton: &Automaton) -> Self {
        let mut graph = StableGraph::new();
        let mut index = HashMap::new();

        for state in automaton.states() {
            index.insert(state.id(), graph.add_node(state.id()));
        }
        for state in automaton.states() {
            for transition in state.transitions() {
                if let (Some(&from), Some(&to)) =
                    (index.get(&transition.from()), index.get(&transition.to()))
                {
                    graph.add_edge(from, to, transition.label());
                }
            }
        }

        Self { graph, index }
    }

    /// Every state reachable from `start`, including itself
    pub fn reachable_from(&self, start: StateId) -> BTreeSet<StateId> {
        let mut reachable = BTreeSet::new();
        if let Some(&node) = self.index.get(&start) {
            let mut bfs = Bfs::new(&self.graph, node);
            while let Some(next) = bfs.next(&self.graph) {
                reachable.insert(self.graph[next]);
            }
        }
        reachable
    }

    /// Every state from which one of `targets` can be reached
    pub fn co_reachable(&self, targets: &[StateId]) -> BTreeSet<StateId> {
        let reversed = Reversed(&self.graph);
        let mut found = BTreeSet::new();
        for target in targets {
            if let Some(&node) = self.index.get(target) {
                let mut bfs = Bfs::new(reversed, node);
                while let Some(next) = bfs.next(reversed) {
                    found.insert(self.graph[next]);
                }
            }
        }
        found
    }

    pub fn out_degree(&self, id: StateId) -> usize {
        self.index
            .get(&id)
            .map(|&node| self.graph.edges_directed(node, Direction::Outgoing).count())
            .unwrap_or(0)
    }
}

/// A state lacking an arrow for some symbol of the alphabet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingSymbols {
    pub state: StateId,
    pub symbols: String,
}

/// Structural report of an automaton
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub start: Option<StateId>,
    pub unreachable: Vec<StateId>,
    pub dead: Vec<StateId>,
    pub missing: Vec<MissingSymbols>,
    pub has_cycles: bool,
}

impl AnalysisReport {
    /// Every state has an arrow for every symbol of the alphabet
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Analyze reachability, dead states and completeness
pub fn analyze(automaton: &Automaton) -> AnalysisReport {
    let arrows = ArrowGraph::build(automaton);
    let start = automaton.start();

    // Without a start state nothing is reachable
    let reachable = start
        .map(|s| arrows.reachable_from(s))
        .unwrap_or_default();
    let unreachable = automaton
        .ids()
        .into_iter()
        .filter(|id| !reachable.contains(id))
        .collect();

    let accepting: Vec<StateId> = automaton
        .states()
        .filter(|s| s.is_accepting())
        .map(|s| s.id())
        .collect();
    let alive = arrows.co_reachable(&accepting);
    let dead = automaton
        .ids()
        .into_iter()
        .filter(|id| !alive.contains(id))
        .collect();

    let alphabet = automaton.alphabet();
    let missing = automaton
        .states()
        .filter_map(|state| {
            let symbols: String = alphabet
                .iter()
                .filter(|&&symbol| !state.has_symbol(symbol))
                .collect();
            (!symbols.is_empty()).then(|| MissingSymbols {
                state: state.id(),
                symbols,
            })
        })
        .collect();

    AnalysisReport {
        start,
        unreachable,
        dead,
        missing,
        has_cycles: petgraph::algo::is_cyclic_directed(&arrows.graph),
    }
}
