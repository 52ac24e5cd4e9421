//! Recorded support sets: an in-memory derivation reporter.
//!
//! Every derived triple may carry several support sets (alternative
//! justifications), each naming the rule that fired and the premises it
//! matched. [`SupportTable`] records them as a forward-chaining engine
//! materializes its closure and replays them on demand; it never chains
//! by itself.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::graph::Triple;

use super::{DerivationReporter, Firings, Premise, RuleFiring};

/// One recorded justification of a derived triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportSet {
    /// Name of the rule that fired.
    pub rule: String,
    /// Premises the rule matched, in antecedent order.
    pub premises: Vec<Premise>,
}

impl SupportSet {
    pub fn new(rule: impl Into<String>, premises: Vec<Premise>) -> Self {
        Self {
            rule: rule.into(),
            premises,
        }
    }
}

/// Concurrent table of support sets keyed by derived triple.
#[derive(Debug)]
pub struct SupportTable {
    /// Derived triple → support sets in recording order.
    supports: DashMap<Triple, Vec<SupportSet>>,
    enabled: AtomicBool,
}

impl SupportTable {
    pub fn new() -> Self {
        Self {
            supports: DashMap::new(),
            enabled: AtomicBool::new(true),
        }
    }

    /// Record a support set for `derived`.
    pub fn add_support(&self, derived: Triple, support: SupportSet) {
        self.supports.entry(derived).or_default().push(support);
    }

    /// Record a support set built from plain premise triples.
    pub fn add_rule_firing(&self, derived: Triple, rule: &str, premises: &[Triple]) {
        let premises = premises.iter().copied().map(Premise::reported).collect();
        self.add_support(derived, SupportSet::new(rule, premises));
    }

    /// All support sets recorded for `derived`, in recording order.
    pub fn supports_for(&self, derived: Triple) -> Vec<SupportSet> {
        self.supports
            .get(&derived)
            .map(|v| v.value().clone())
            .unwrap_or_default()
    }

    /// Turn inference on or off for every connection using this table.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Number of derived triples with at least one support set.
    pub fn len(&self) -> usize {
        self.supports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supports.is_empty()
    }
}

impl Default for SupportTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DerivationReporter for SupportTable {
    fn inference_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Replays support sets grouped by rule, rules in first-recorded order.
    fn derivations<'a>(&'a self, target: Triple) -> Firings<'a> {
        let mut firings: Vec<RuleFiring> = Vec::new();
        for support in self.supports_for(target) {
            match firings.iter().position(|f| f.rule == support.rule) {
                Some(idx) => firings[idx].groups.push(support.premises),
                None => firings.push(RuleFiring::new(support.rule, vec![support.premises])),
            }
        }
        Box::new(firings.into_iter().map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::EntityId;

    fn t(s: u64, p: u64, o: u64) -> Triple {
        Triple::new(
            EntityId::new(s).unwrap(),
            EntityId::new(p).unwrap(),
            EntityId::new(o).unwrap(),
        )
    }

    #[test]
    fn add_and_query_supports() {
        let table = SupportTable::new();
        let derived = t(20, 30, 22);
        table.add_rule_firing(derived, "rdfs9", &[t(20, 31, 21), t(21, 32, 22)]);

        let supports = table.supports_for(derived);
        assert_eq!(supports.len(), 1);
        assert_eq!(supports[0].rule, "rdfs9");
        assert_eq!(supports[0].premises.len(), 2);
        assert_eq!(supports[0].premises[1].triple(), t(21, 32, 22));
        assert_eq!(table.len(), 1);
    }


    #[test]
    fn derivations_group_by_rule_in_recording_order() {
        let table = SupportTable::new();
        let derived = t(20, 30, 22);
        table.add_rule_firing(derived, "r2", &[t(1, 2, 3)]);
        table.add_rule_firing(derived, "r1", &[t(4, 5, 6)]);
        table.add_rule_firing(derived, "r2", &[t(7, 8, 9)]);

        let firings: Vec<RuleFiring> = table
            .derivations(derived)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(firings.len(), 2);
        assert_eq!(firings[0].rule, "r2");
        assert_eq!(firings[0].groups.len(), 2);
        assert_eq!(firings[1].rule, "r1");
        assert_eq!(firings[1].groups.len(), 1);
    }

    #[test]
    fn unknown_target_reports_nothing() {
        let table = SupportTable::new();
        assert_eq!(table.derivations(t(1, 2, 3)).count(), 0);
    }

    #[test]
    fn toggle_inference() {
        let table = SupportTable::new();
        assert!(table.inference_enabled());
        table.set_enabled(false);
        assert!(!table.inference_enabled());
    }
}
