//! Automaton module - Editable DFA graph model

pub mod adjacency;
pub mod analyzer;
pub mod geometry;
pub mod graph;
pub mod state;
pub mod transition;

pub type StateId = u32;

// Re-export key types
pub use adjacency::Adjacency;
pub use geometry::{Dimensions, LoopDirection, Point};
pub use graph::{AdjacencyDrift, Automaton, AutomatonSummary, DriftSide, TransitionRow};
pub use state::{AutomatonState, StateAnchor, SymbolRemoval};
pub use transition::{Transition, TransitionId};
