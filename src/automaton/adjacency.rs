//! Adjacency cache
//!
//! An ordered multiset of peer state ids. It is a denormalized cache kept next
//! to the transition table: nothing here deduplicates or purges entries, so
//! every push must be paired with a removal by whoever owns both states.

use super::StateId;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Adjacency(Vec<StateId>);

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a peer id. Duplicates are kept.
    pub fn push(&mut self, id: StateId) {
        self.0.push(id);
    }

    /// Remove the first occurrence of `id`; returns whether one was found
    pub fn remove_first(&mut self, id: StateId) -> bool {
        match self.0.iter().position(|&peer| peer == id) {
            Some(pos) => {
                self.0.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove every occurrence of `id`, returning how many were dropped
    pub fn remove_all(&mut self, id: StateId) -> usize {
        let before = self.0.len();
        self.0.retain(|&peer| peer != id);
        before - self.0.len()
    }

    pub fn count(&self, id: StateId) -> usize {
        self.0.iter().filter(|&&peer| peer == id).count()
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.0.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[StateId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
