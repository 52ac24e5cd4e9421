//! Statement data model: triples, quads, and statement status bits.
//!
//! A [`Triple`] names a fact; a [`Quad`] places it in a context (named
//! graph). Every stored statement also carries [`StatusFlags`] describing
//! how the engine treats it (deleted, inferred, hidden from browsing, ...).

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::symbol::EntityId;

/// A fact (subject, predicate, object) without context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: EntityId,
    pub predicate: EntityId,
    pub object: EntityId,
}

impl Triple {
    pub fn new(subject: EntityId, predicate: EntityId, object: EntityId) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Place this triple in a context.
    pub fn in_context(self, context: EntityId) -> Quad {
        Quad {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            context,
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

/// A fact placed in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    pub subject: EntityId,
    pub predicate: EntityId,
    pub object: EntityId,
    pub context: EntityId,
}

impl Quad {
    pub fn new(subject: EntityId, predicate: EntityId, object: EntityId, context: EntityId) -> Self {
        Self {
            subject,
            predicate,
            object,
            context,
        }
    }

    /// Drop the context.
    pub fn triple(&self) -> Triple {
        Triple::new(self.subject, self.predicate, self.object)
    }
}

/// Reserved context ids for the engine's system graphs.
///
/// Hosts intern their data entities above these ids.
pub struct SystemGraph;

impl SystemGraph {
    /// Canonical marker graph holding every explicit statement.
    pub const EXPLICIT: EntityId = match EntityId::new(1) {
        Some(id) => id,
        None => unreachable!(),
    };

    /// Graph holding inferred statements.
    pub const IMPLICIT: EntityId = match EntityId::new(2) {
        Some(id) => id,
        None => unreachable!(),
    };

    /// First id available to host data.
    pub const FIRST_DATA_ID: u64 = 16;
}

/// Statement status bit-field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StatusFlags(u8);

impl StatusFlags {
    /// Asserted statement with no special handling.
    pub const EXPLICIT: Self = Self(0);
    /// Marked for removal in the current transaction.
    pub const DELETED: Self = Self(1 << 0);
    /// Hidden from plain statement browsing.
    pub const SKIP_ON_BROWSE: Self = Self(1 << 1);
    /// Produced by forward chaining.
    pub const INFERRED: Self = Self(1 << 2);
    /// Explicit statement materialized through owl:sameAs expansion.
    pub const SKIP_ON_REINFER: Self = Self(1 << 3);

    /// Classes excluded when looking for the context a statement lives in.
    pub const CONTEXT_MASK: Self =
        Self(Self::DELETED.0 | Self::SKIP_ON_BROWSE.0 | Self::INFERRED.0);

    /// Bits that describe where a statement came from rather than how the
    /// engine is currently iterating it. Only these take part in comparing
    /// justifications.
    pub const PROVENANCE: Self = Self::INFERRED;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// All bits of `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for StatusFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "explicit");
        }
        let names = [
            (Self::DELETED, "deleted"),
            (Self::SKIP_ON_BROWSE, "skip-on-browse"),
            (Self::INFERRED, "inferred"),
            (Self::SKIP_ON_REINFER, "skip-on-reinfer"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}
