//! Explanation cursor: a forward-only walk over collected solutions.
//!
//! The cursor visits every premise of every solution, premises first,
//! then the next solution. It never re-runs collection and never moves
//! backwards; once exhausted it stays exhausted.

use crate::infer::Premise;
use crate::solution::Solution;
use crate::symbol::EntityId;

/// One field of a premise quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PremiseField {
    Subject,
    Predicate,
    Object,
    Context,
}

impl PremiseField {
    pub const ALL: [PremiseField; 4] = [
        PremiseField::Subject,
        PremiseField::Predicate,
        PremiseField::Object,
        PremiseField::Context,
    ];

    /// Read this field from a premise.
    pub fn of(self, premise: &Premise) -> EntityId {
        match self {
            PremiseField::Subject => premise.quad.subject,
            PremiseField::Predicate => premise.quad.predicate,
            PremiseField::Object => premise.quad.object,
            PremiseField::Context => premise.quad.context,
        }
    }
}

/// Where the cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Not advanced yet.
    Fresh,
    /// On premise `premise` of solution `solution`.
    Positioned { solution: usize, premise: usize },
    /// Past the last premise. Terminal.
    Exhausted,
}

/// Resumable cursor over one target's solutions.
#[derive(Debug, Clone)]
pub struct ExplanationCursor {
    solutions: Vec<Solution>,
    state: CursorState,
}

impl ExplanationCursor {
    pub fn new(solutions: Vec<Solution>) -> Self {
        Self {
            solutions,
            state: CursorState::Fresh,
        }
    }

    /// Move to the next premise. Returns `false` once exhausted.
    ///
    /// Solutions without premises are skipped.
    pub fn advance(&mut self) -> bool {
        let (mut solution, mut premise) = match self.state {
            CursorState::Fresh => (0, 0),
            CursorState::Positioned { solution, premise } => (solution, premise + 1),
            CursorState::Exhausted => return false,
        };

        while let Some(current) = self.solutions.get(solution) {
            if premise < current.len() {
                self.state = CursorState::Positioned { solution, premise };
                return true;
            }
            solution += 1;
            premise = 0;
        }

        tracing::trace!(solutions = self.solutions.len(), "explanation cursor exhausted");
        self.state = CursorState::Exhausted;
        false
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// The solution at the current position.
    pub fn current_solution(&self) -> Option<&Solution> {
        match self.state {
            CursorState::Positioned { solution, .. } => self.solutions.get(solution),
            _ => None,
        }
    }

    /// Rule name of the current solution.
    pub fn current_rule(&self) -> Option<&str> {
        self.current_solution().map(|s| s.rule.as_str())
    }

    /// The premise at the current position.
    pub fn current_premise(&self) -> Option<&Premise> {
        match self.state {
            CursorState::Positioned { solution, premise } => {
                self.solutions.get(solution)?.premise(premise)
            }
            _ => None,
        }
    }

    /// One field of the current premise.
    pub fn current_premise_field(&self, field: PremiseField) -> Option<EntityId> {
        self.current_premise().map(|p| field.of(p))
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// Total number of positions this cursor will visit.
    pub fn premise_count(&self) -> usize {
        self.solutions.iter().map(Solution::len).sum()
    }
}
