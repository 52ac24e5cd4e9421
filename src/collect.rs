//! Justification collection: turning support reports into solutions.
//!
//! For a derived target the collector drains the reporter's firings, one
//! premise group at a time:
//!
//! 1. groups that use the target itself as a premise are dropped whole;
//! 2. every surviving premise is moved to the context it is actually
//!    asserted in, when the store knows one besides the explicit graph;
//! 3. the group becomes a [`Solution`] unless an equal one was already
//!    collected.
//!
//! An explicit target short-circuits all of this: it is its own
//! justification. Any store or reporter failure fails the whole
//! collection; partial results are never returned.

use std::collections::HashSet;

use crate::error::ProofResult;
use crate::graph::{StatusFlags, Triple};
use crate::infer::{DerivationReporter, Premise};
use crate::solution::Solution;
use crate::store::FactStore;
use crate::symbol::EntityId;

/// An explicit target's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplicitFact {
    /// Context of the first stored occurrence.
    pub context: EntityId,
    /// The explicit statement was materialized through owl:sameAs.
    pub derived_from_same_as: bool,
}

/// The fact being explained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub triple: Triple,
    pub explicit: Option<ExplicitFact>,
}

impl Target {
    /// A target with no explicit occurrence.
    pub fn derived(triple: Triple) -> Self {
        Self {
            triple,
            explicit: None,
        }
    }

    /// A target asserted in `context`.
    pub fn explicit(triple: Triple, context: EntityId) -> Self {
        Self {
            triple,
            explicit: Some(ExplicitFact {
                context,
                derived_from_same_as: false,
            }),
        }
    }

    /// Look the triple up and classify it as explicit or derived.
    ///
    /// Deleted, hidden, and inferred occurrences do not count; the first
    /// remaining occurrence decides the context.
    pub fn classify(store: &dyn FactStore, triple: Triple) -> ProofResult<Self> {
        let records = store.lookup(triple, StatusFlags::CONTEXT_MASK)?;
        let explicit = records.first().map(|r| ExplicitFact {
            context: r.context,
            derived_from_same_as: r.status.contains(StatusFlags::SKIP_ON_REINFER),
        });
        Ok(Self { triple, explicit })
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit.is_some()
    }

    pub fn context(&self) -> Option<EntityId> {
        self.explicit.map(|e| e.context)
    }

    pub fn is_derived_from_same_as(&self) -> bool {
        self.explicit.is_some_and(|e| e.derived_from_same_as)
    }
}

/// Collects justifications against one store and one reporter.
pub struct JustificationCollector<'a> {
    store: &'a dyn FactStore,
    reporter: &'a dyn DerivationReporter,
}

impl<'a> JustificationCollector<'a> {
    pub fn new(store: &'a dyn FactStore, reporter: &'a dyn DerivationReporter) -> Self {
        Self { store, reporter }
    }

    /// Classify `triple` and collect its solutions.
    pub fn explain(&self, triple: Triple) -> ProofResult<(Target, Vec<Solution>)> {
        let target = Target::classify(self.store, triple)?;
        let solutions = self.collect(&target)?;
        Ok((target, solutions))
    }

    /// Collect the deduplicated solutions of `target`, in discovery order.
    pub fn collect(&self, target: &Target) -> ProofResult<Vec<Solution>> {
        if let Some(explicit) = target.explicit {
            return Ok(vec![Solution::explicit(
                target.triple.in_context(explicit.context),
            )]);
        }

        let mut solutions: Vec<Solution> = Vec::new();
        let mut seen = HashSet::new();

        for firing in self.reporter.derivations(target.triple) {
            let firing = firing.inspect_err(|e| {
                tracing::warn!(fact = %target.triple, error = %e, "support search failed");
            })?;
            tracing::debug!(
                rule = %firing.rule,
                groups = firing.groups.len(),
                fact = %target.triple,
                "report rule"
            );

            for mut premises in firing.groups {
                // Every premise is looked up, even in groups dropped below.
                for premise in &mut premises {
                    self.annotate(premise)?;
                }
                if premises.iter().any(|p| p.triple() == target.triple) {
                    tracing::debug!(rule = %firing.rule, "not added - self referential");
                    continue;
                }

                let solution = Solution::new(firing.rule.clone(), premises);
                if seen.insert(solution.key()) {
                    tracing::debug!(rule = %firing.rule, premises = solution.len(), "added");
                    solutions.push(solution);
                } else {
                    tracing::debug!(rule = %firing.rule, "already added");
                }
            }
        }

        tracing::debug!(
            fact = %target.triple,
            solutions = solutions.len(),
            "collected justifications"
        );
        Ok(solutions)
    }

    /// Move a premise to the first context it is asserted in, other than
    /// the explicit graph marker.
    fn annotate(&self, premise: &mut Premise) -> ProofResult<()> {
        let records = self
            .store
            .lookup(premise.triple(), StatusFlags::CONTEXT_MASK)
            .inspect_err(|e| {
                tracing::warn!(premise = %premise.triple(), error = %e, "context lookup failed");
            })?;
        if let Some(record) = records.iter().find(|r| !r.in_explicit_graph()) {
            premise.quad.context = record.context;
            premise.status = record.status;
        }
        Ok(())
    }
}

/// Collect the solutions of `target`. See [`JustificationCollector::collect`].
pub fn collect(
    target: &Target,
    reporter: &dyn DerivationReporter,
    store: &dyn FactStore,
) -> ProofResult<Vec<Solution>> {
    JustificationCollector::new(store, reporter).collect(target)
}
