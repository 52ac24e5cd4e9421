//! In-memory fact store backed by DashMap.
//!
//! Keeps every occurrence of a triple (one per context) in insertion order.
//! All data is lost on process exit.

use dashmap::DashMap;

use crate::graph::{StatusFlags, SystemGraph, Triple};
use crate::symbol::EntityId;

use super::{FactStore, StatementRecord, StoreResult};

/// Concurrent in-memory statement store using a sharded hashmap.
#[derive(Debug, Default)]
pub struct MemFactStore {
    data: DashMap<Triple, Vec<StatementRecord>>,
}

impl MemFactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Assert an explicit statement in `context`.
    ///
    /// Explicit statements are also visible in the canonical explicit graph,
    /// so a statement asserted in a named graph gets two occurrences.
    pub fn assert(&self, triple: Triple, context: EntityId) {
        self.insert(triple, context, StatusFlags::EXPLICIT);
        if context != SystemGraph::EXPLICIT {
            self.insert(triple, SystemGraph::EXPLICIT, StatusFlags::EXPLICIT);
        }
    }

    /// Record an inferred statement in the implicit graph.
    pub fn infer(&self, triple: Triple) {
        self.insert(triple, SystemGraph::IMPLICIT, StatusFlags::INFERRED);
    }

    /// Insert or replace the occurrence of `triple` in `context`.
    pub fn insert(&self, triple: Triple, context: EntityId, status: StatusFlags) {
        let mut entry = self.data.entry(triple).or_default();
        match entry.iter().position(|r| r.context == context) {
            Some(idx) => entry[idx].status = status,
            None => entry.push(StatementRecord::new(context, status)),
        }
    }

    /// Remove every occurrence of `triple`, returning how many were removed.
    pub fn remove(&self, triple: Triple) -> usize {
        self.data.remove(&triple).map_or(0, |(_, v)| v.len())
    }

    /// Whether any occurrence of `triple` is stored.
    pub fn contains(&self, triple: Triple) -> bool {
        self.data.contains_key(&triple)
    }

    /// Number of distinct triples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl FactStore for MemFactStore {
    fn lookup(&self, triple: Triple, exclude: StatusFlags) -> StoreResult<Vec<StatementRecord>> {
        Ok(self
            .data
            .get(&triple)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| !r.status.intersects(exclude))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}
