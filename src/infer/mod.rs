//! Derivation reporter: the rule engine's "what supports this fact" surface.
//!
//! Given a target triple, a reporter produces one [`RuleFiring`] per rule
//! that could derive it. Each firing carries every binding set (premise
//! group) the rule matched. The sequence is lazy so an engine can stop
//! producing as soon as the consumer fails; an `Err` item aborts the scan.
//!
//! The plugin consumes the whole sequence into owned data before any
//! query-time reads, so nothing here aliases the engine's iteration state.

pub mod support;

pub use support::SupportTable;

use serde::{Deserialize, Serialize};

use crate::error::DerivationError;
use crate::graph::{Quad, StatusFlags, SystemGraph, Triple};

/// Result type for reporter operations.
pub type InferResult<T> = std::result::Result<T, DerivationError>;

/// One premise tuple as reported by the engine.
///
/// `context` and `status` are provisional: the collector overwrites them
/// with the statement's real location before reading them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Premise {
    pub quad: Quad,
    pub status: StatusFlags,
}

impl Premise {
    pub fn new(quad: Quad, status: StatusFlags) -> Self {
        Self { quad, status }
    }

    /// A premise as engines usually report it: explicit graph, no status bits.
    pub fn reported(triple: Triple) -> Self {
        Self::new(triple.in_context(SystemGraph::EXPLICIT), StatusFlags::EXPLICIT)
    }

    pub fn triple(&self) -> Triple {
        self.quad.triple()
    }
}

/// All premise groups one rule reports for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFiring {
    pub rule: String,
    pub groups: Vec<Vec<Premise>>,
}

impl RuleFiring {
    pub fn new(rule: impl Into<String>, groups: Vec<Vec<Premise>>) -> Self {
        Self {
            rule: rule.into(),
            groups,
        }
    }
}

/// Lazy sequence of rule firings for one target.
pub type Firings<'a> = Box<dyn Iterator<Item = InferResult<RuleFiring>> + 'a>;

/// Access to the inference engine's support search.
///
/// Implementations are shared between requests and must be internally
/// synchronized.
pub trait DerivationReporter: Send + Sync {
    /// Whether the engine currently materializes inferences at all.
    fn inference_enabled(&self) -> bool {
        true
    }

    /// Report every rule firing that could derive `target`.
    fn derivations<'a>(&'a self, target: Triple) -> Firings<'a>;
}

impl<T: DerivationReporter + ?Sized> DerivationReporter for std::sync::Arc<T> {
    fn inference_enabled(&self) -> bool {
        (**self).inference_enabled()
    }

    fn derivations<'a>(&'a self, target: Triple) -> Firings<'a> {
        (**self).derivations(target)
    }
}
