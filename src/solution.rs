//! Solutions: one rule firing and the premises that justify a fact.
//!
//! Two solutions are the same justification when they name the same rule
//! and use the same *set* of premises. Premise order and repetition do not
//! matter, and of the status bits only [`StatusFlags::PROVENANCE`] is
//! compared: the remaining bits reflect engine bookkeeping that can differ
//! between two reports of the same firing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::{Quad, StatusFlags};
use crate::infer::Premise;

/// Rule name given to the synthetic solution of an explicit fact.
pub const RULE_EXPLICIT: &str = "explicit";

/// One alternative derivation of a target fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub rule: String,
    pub premises: Vec<Premise>,
}

/// Order-independent identity of a [`Solution`], usable as a hash key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolutionKey {
    rule: String,
    premises: BTreeSet<(Quad, StatusFlags)>,
}

impl Solution {
    pub fn new(rule: impl Into<String>, premises: Vec<Premise>) -> Self {
        Self {
            rule: rule.into(),
            premises,
        }
    }

    /// The self-justification of an explicit fact located at `quad`.
    pub fn explicit(quad: Quad) -> Self {
        Self::new(RULE_EXPLICIT, vec![Premise::new(quad, StatusFlags::EXPLICIT)])
    }

    pub fn is_explicit(&self) -> bool {
        self.rule == RULE_EXPLICIT
    }

    pub fn len(&self) -> usize {
        self.premises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.premises.is_empty()
    }

    pub fn premise(&self, index: usize) -> Option<&Premise> {
        self.premises.get(index)
    }

    /// The identity this solution is deduplicated by.
    pub fn key(&self) -> SolutionKey {
        SolutionKey {
            rule: self.rule.clone(),
            premises: self
                .premises
                .iter()
                .map(|p| (p.quad, p.status.intersection(StatusFlags::PROVENANCE)))
                .collect(),
        }
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule && self.key() == other.key()
    }
}

impl Eq for Solution {}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "rule:{}", self.rule)?;
        for p in &self.premises {
            writeln!(
                f,
                "{},{},{},{}",
                p.quad.subject, p.quad.predicate, p.quad.object, p.quad.context
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SystemGraph;
    use crate::symbol::EntityId;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    fn premise(s: u64, p: u64, o: u64, c: u64, status: StatusFlags) -> Premise {
        Premise::new(Quad::new(id(s), id(p), id(o), id(c)), status)
    }

    #[test]
    fn equality_ignores_order() {
        let a = premise(20, 21, 22, 1, StatusFlags::EXPLICIT);
        let b = premise(22, 23, 24, 2, StatusFlags::INFERRED);
        assert_eq!(Solution::new("r", vec![a, b]), Solution::new("r", vec![b, a]));
    }

    #[test]
    fn equality_ignores_multiplicity() {
        let a = premise(20, 21, 22, 1, StatusFlags::EXPLICIT);
        let b = premise(22, 23, 24, 2, StatusFlags::INFERRED);
        assert_eq!(
            Solution::new("r", vec![a, a, b]),
            Solution::new("r", vec![b, a])
        );
    }

    #[test]
    fn different_rule_is_different_solution() {
        let a = premise(20, 21, 22, 1, StatusFlags::EXPLICIT);
        assert_ne!(Solution::new("r1", vec![a]), Solution::new("r2", vec![a]));
    }

    #[test]
    fn context_takes_part_in_equality() {
        let a = premise(20, 21, 22, 1, StatusFlags::EXPLICIT);
        let b = premise(20, 21, 22, 50, StatusFlags::EXPLICIT);
        assert_ne!(Solution::new("r", vec![a]), Solution::new("r", vec![b]));
    }

    #[test]
    fn only_provenance_status_bits_compare() {
        let inferred = premise(20, 21, 22, 2, StatusFlags::INFERRED);
        let noisy = premise(
            20,
            21,
            22,
            2,
            StatusFlags::INFERRED | StatusFlags::SKIP_ON_BROWSE,
        );
        let explicit = premise(20, 21, 22, 2, StatusFlags::EXPLICIT);
        assert_eq!(
            Solution::new("r", vec![inferred]),
            Solution::new("r", vec![noisy])
        );
        assert_ne!(
            Solution::new("r", vec![inferred]),
            Solution::new("r", vec![explicit])
        );
    }

    #[test]
    fn key_agrees_with_equality() {
        let a = premise(20, 21, 22, 1, StatusFlags::EXPLICIT);
        let b = premise(22, 23, 24, 2, StatusFlags::INFERRED);
        let x = Solution::new("r", vec![a, b]);
        let y = Solution::new("r", vec![b, a, b]);
        assert_eq!(x.key(), y.key());
    }

    #[test]
    fn explicit_solution_shape() {
        let quad = Quad::new(id(20), id(21), id(22), id(50));
        let s = Solution::explicit(quad);
        assert!(s.is_explicit());
        assert_eq!(s.len(), 1);
        assert_eq!(s.premise(0).map(|p| p.quad), Some(quad));
    }

    #[test]
    fn display_lists_premises() {
        let s = Solution::new(
            "rdfs9",
            vec![
                premise(20, 21, 22, SystemGraph::EXPLICIT.get(), StatusFlags::EXPLICIT),
                premise(22, 23, 24, 2, StatusFlags::INFERRED),
            ],
        );
        assert_eq!(s.to_string(), "rule:rdfs9\n20,21,22,1\n22,23,24,2\n");
    }
}
