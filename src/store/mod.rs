//! Fact store adapter: point lookups of stored statements.
//!
//! The plugin never scans the store. It asks two questions, both point
//! lookups on a concrete triple:
//!
//! - is the target fact asserted explicitly, and in which context?
//! - which context does a premise actually live in?
//!
//! [`FactStore`] is the boundary to the host's statement indexes;
//! [`MemFactStore`] is a concurrent in-memory implementation.

pub mod mem;

pub use mem::MemFactStore;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::graph::{StatusFlags, SystemGraph, Triple};
use crate::symbol::EntityId;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One stored occurrence of a triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementRecord {
    pub context: EntityId,
    pub status: StatusFlags,
}

impl StatementRecord {
    pub fn new(context: EntityId, status: StatusFlags) -> Self {
        Self { context, status }
    }

    /// Whether this occurrence is the canonical explicit-graph copy.
    pub fn in_explicit_graph(&self) -> bool {
        self.context == SystemGraph::EXPLICIT
    }
}

/// Point-lookup access to stored statements.
///
/// Implementations are shared between requests and must be internally
/// synchronized.
pub trait FactStore: Send + Sync {
    /// All stored occurrences of `triple` whose status shares no bit with
    /// `exclude`, in the store's native order.
    fn lookup(&self, triple: Triple, exclude: StatusFlags) -> StoreResult<Vec<StatementRecord>>;
}

impl<T: FactStore + ?Sized> FactStore for std::sync::Arc<T> {
    fn lookup(&self, triple: Triple, exclude: StatusFlags) -> StoreResult<Vec<StatementRecord>> {
        (**self).lookup(triple, exclude)
    }
}
