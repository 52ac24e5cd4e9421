//! Entity identifiers and their allocation scopes.
//!
//! Every IRI, literal, and blank node the query engine touches is interned
//! to an [`EntityId`]. Data entities are interned by the host; this module
//! only covers the two scopes the plugin allocates in itself:
//!
//! - **System scope** ([`EntityRegistry`]): the plugin's own predicate IRIs,
//!   registered once at initialization.
//! - **Request scope** ([`RequestScope`]): fresh explanation handles and the
//!   rule-name literals bound by the `rule` accessor. These ids live only as
//!   long as the request and must never be compared across requests.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ProofResult, SymbolError};

/// Interned entity identifier.
///
/// Uses `NonZeroU64` so that `Option<EntityId>` is the same size as `EntityId`.
/// Pattern positions use `None` for "unbound", matching the host's `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    /// Create an `EntityId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(n) => Some(EntityId(n)),
            None => None,
        }
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Raw value of an optional id, `0` when unbound.
    pub fn raw(id: Option<EntityId>) -> u64 {
        id.map_or(0, EntityId::get)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic entity id allocator.
///
/// Produces strictly increasing ids; never hands out the same id twice.
#[derive(Debug)]
pub struct EntityAllocator {
    next: AtomicU64,
}

impl EntityAllocator {
    /// Create a new allocator that starts from id 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Create an allocator that starts from a given id.
    pub fn starting_from(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start.max(1)),
        }
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> ProofResult<EntityId> {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        if raw == u64::MAX {
            // Pin the counter so later calls keep failing instead of wrapping to 0.
            self.next.store(u64::MAX, Ordering::Relaxed);
            return Err(SymbolError::AllocatorExhausted.into());
        }
        EntityId::new(raw).ok_or_else(|| SymbolError::AllocatorExhausted.into())
    }

    /// Return the next id that *would* be allocated, without consuming it.
    pub fn peek_next(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Request scope
// ---------------------------------------------------------------------------

/// Request-scoped entity allocation.
///
/// Hands out opaque handles for explanation cursors and interns rule-name
/// literals. All ids come from one monotonic allocator so a handle and a
/// literal never share an id within the request.
#[derive(Debug)]
pub struct RequestScope {
    allocator: EntityAllocator,
    literal_ids: HashMap<String, EntityId>,
    literals: HashMap<EntityId, String>,
}

impl RequestScope {
    /// Create a scope whose first allocated id is `base`.
    pub fn new(base: u64) -> Self {
        Self {
            allocator: EntityAllocator::starting_from(base),
            literal_ids: HashMap::new(),
            literals: HashMap::new(),
        }
    }

    /// Allocate a fresh blank handle.
    pub fn fresh_handle(&self) -> ProofResult<EntityId> {
        self.allocator.next_id()
    }

    /// Intern a literal, returning the same id for repeated values.
    pub fn intern_literal(&mut self, value: &str) -> ProofResult<EntityId> {
        if let Some(&id) = self.literal_ids.get(value) {
            return Ok(id);
        }
        let id = self.allocator.next_id()?;
        self.literal_ids.insert(value.to_string(), id);
        self.literals.insert(id, value.to_string());
        Ok(id)
    }

    /// Resolve a literal interned in this scope.
    pub fn literal(&self, id: EntityId) -> Option<&str> {
        self.literals.get(&id).map(String::as_str)
    }

    /// Id of an already interned literal.
    pub fn literal_id(&self, value: &str) -> Option<EntityId> {
        self.literal_ids.get(value).copied()
    }

    /// Number of ids allocated so far.
    pub fn allocated(&self, base: u64) -> u64 {
        self.allocator.peek_next().saturating_sub(base.max(1))
    }
}

// ---------------------------------------------------------------------------
// System scope
// ---------------------------------------------------------------------------

/// Bidirectional IRI ↔ id registry for system-scope entities.
///
/// Shared across requests; both maps are `DashMap`s so concurrent plugin
/// initializations on different connections do not need an outer lock.
#[derive(Debug)]
pub struct EntityRegistry {
    allocator: EntityAllocator,
    iri_to_id: DashMap<String, EntityId>,
    id_to_iri: DashMap<EntityId, String>,
}

impl EntityRegistry {
    /// Create an empty registry allocating from id 1.
    pub fn new() -> Self {
        Self::starting_from(1)
    }

    /// Create an empty registry whose first id is `start`.
    pub fn starting_from(start: u64) -> Self {
        Self {
            allocator: EntityAllocator::starting_from(start),
            iri_to_id: DashMap::new(),
            id_to_iri: DashMap::new(),
        }
    }

    /// Intern an IRI, returning the existing id if it was already present.
    pub fn put_iri(&self, iri: &str) -> ProofResult<EntityId> {
        if let Some(id) = self.iri_to_id.get(iri) {
            return Ok(*id.value());
        }
        match self.iri_to_id.entry(iri.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(existing) => Ok(*existing.get()),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let id = self.allocator.next_id()?;
                slot.insert(id);
                self.id_to_iri.insert(id, iri.to_string());
                Ok(id)
            }
        }
    }

    /// Register an IRI under a caller-chosen id. Errors if the IRI is taken.
    pub fn register(&self, iri: &str, id: EntityId) -> ProofResult<()> {
        match self.iri_to_id.entry(iri.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                if *existing.get() == id {
                    return Ok(());
                }
                Err(SymbolError::DuplicateIri {
                    iri: iri.to_string(),
                    existing_id: existing.get().get(),
                }
                .into())
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(id);
                self.id_to_iri.insert(id, iri.to_string());
                Ok(())
            }
        }
    }

    /// Look up the id of an IRI.
    pub fn lookup(&self, iri: &str) -> Option<EntityId> {
        self.iri_to_id.get(iri).map(|r| *r.value())
    }

    /// Look up the IRI of an id.
    pub fn iri(&self, id: EntityId) -> Option<String> {
        self.id_to_iri.get(&id).map(|r| r.value().clone())
    }

    /// Number of registered IRIs.
    pub fn len(&self) -> usize {
        self.iri_to_id.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.iri_to_id.is_empty()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_niche_optimization() {
        assert_eq!(
            std::mem::size_of::<Option<EntityId>>(),
            std::mem::size_of::<EntityId>()
        );
    }

    #[test]
    fn entity_id_zero_is_none() {
        assert!(EntityId::new(0).is_none());
        assert_eq!(EntityId::new(42).unwrap().get(), 42);
        assert_eq!(EntityId::raw(None), 0);
        assert_eq!(EntityId::raw(EntityId::new(7)), 7);
    }

    #[test]
    fn allocator_produces_sequential_ids() {
        let alloc = EntityAllocator::new();
        assert_eq!(alloc.next_id().unwrap().get(), 1);
        assert_eq!(alloc.next_id().unwrap().get(), 2);
        assert_eq!(alloc.peek_next(), 3);
    }

    #[test]
    fn allocator_exhaustion() {
        let alloc = EntityAllocator::starting_from(u64::MAX - 1);
        assert_eq!(alloc.next_id().unwrap().get(), u64::MAX - 1);
        assert!(alloc.next_id().is_err());
        assert!(alloc.next_id().is_err());
    }

    #[test]
    fn request_scope_handles_are_distinct() {
        let scope = RequestScope::new(1000);
        let a = scope.fresh_handle().unwrap();
        let b = scope.fresh_handle().unwrap();
        assert_eq!(a.get(), 1000);
        assert_ne!(a, b);
        assert_eq!(scope.allocated(1000), 2);
    }

    #[test]
    fn request_scope_interns_literals_once() {
        let mut scope = RequestScope::new(500);
        let a = scope.intern_literal("rdfs9").unwrap();
        let b = scope.intern_literal("rdfs9").unwrap();
        let c = scope.intern_literal("rdfs11").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(scope.literal(a), Some("rdfs9"));
        assert_eq!(scope.literal(c), Some("rdfs11"));

        // Handles never collide with literals.
        let h = scope.fresh_handle().unwrap();
        assert!(scope.literal(h).is_none());
    }

    #[test]
    fn registry_put_is_idempotent() {
        let reg = EntityRegistry::new();
        let a = reg.put_iri("http://example.org/a").unwrap();
        let again = reg.put_iri("http://example.org/a").unwrap();
        assert_eq!(a, again);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.iri(a).as_deref(), Some("http://example.org/a"));
        assert_eq!(reg.lookup("http://example.org/a"), Some(a));
    }

    #[test]
    fn registry_rejects_conflicting_ids() {
        let reg = EntityRegistry::new();
        let a = reg.put_iri("http://example.org/a").unwrap();
        let other = EntityId::new(a.get() + 100).unwrap();
        assert!(reg.register("http://example.org/a", other).is_err());
        assert!(reg.register("http://example.org/a", a).is_ok());
    }
}
