//! Feasible solution container.

use std::cmp::Ordering;

use crate::sense::Sense;

/// A feasible solution together with its objective value.
///
/// The producer of a `Candidate` (an oracle or a repair heuristic) is
/// responsible for its feasibility; the engine only ever stores candidates
/// it was handed and never builds one itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate<A> {
    /// Problem-specific representation of the solution.
    pub assignment: A,
    /// Objective value of `assignment`.
    pub objective_value: f64,
}

impl<A> Candidate<A> {
    /// Creates a candidate from an assignment and its objective value.
    pub fn new(assignment: A, objective_value: f64) -> Self {
        Self {
            assignment,
            objective_value,
        }
    }

    /// Returns the objective value.
    #[inline]
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// Returns true if this candidate strictly beats `other` under `sense`.
    pub fn is_better_than(&self, other: &Candidate<A>, sense: Sense) -> bool {
        sense.is_better(self.objective_value, other.objective_value)
    }

    /// Orders two candidates under `sense`; `Greater` means `self` is better.
    pub fn compare(&self, other: &Candidate<A>, sense: Sense) -> Ordering {
        sense.compare(self.objective_value, other.objective_value)
    }

    /// Transforms the assignment while keeping the objective value.
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Candidate<B> {
        Candidate {
            assignment: f(self.assignment),
            objective_value: self.objective_value,
        }
    }
}
