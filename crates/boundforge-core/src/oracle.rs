//! Relaxation oracle contract.
//!
//! The oracle is a single mutable model shared by the whole search. Nodes
//! are bounded through a scoped apply/solve/remove cycle so the model never
//! has to be rebuilt per node.

use std::fmt::Debug;

use crate::candidate::Candidate;
use crate::error::BackendError;
use crate::fixing::Fixings;

/// Result of solving the relaxation under the currently applied fixings.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R, A> {
    /// The relaxation has an optimum.
    Bounded {
        /// Bound on the best objective reachable under the fixings.
        bound: f64,
        /// The relaxation solution, handed to branching and repair hooks.
        relaxed: R,
        /// Present when the relaxation optimum is feasible for the original
        /// problem, in which case the node needs no further branching.
        candidate: Option<Candidate<A>>,
    },

    /// No solution satisfies the fixings; the node can be pruned.
    Infeasible,
}

impl<R, A> Outcome<R, A> {
    /// Creates a bounded outcome without a feasible candidate.
    pub fn bounded(bound: f64, relaxed: R) -> Self {
        Outcome::Bounded {
            bound,
            relaxed,
            candidate: None,
        }
    }

    /// Creates a bounded outcome whose relaxation optimum is feasible.
    pub fn integral(bound: f64, relaxed: R, candidate: Candidate<A>) -> Self {
        Outcome::Bounded {
            bound,
            relaxed,
            candidate: Some(candidate),
        }
    }

    /// Returns the bound, if any.
    pub fn bound(&self) -> Option<f64> {
        match self {
            Outcome::Bounded { bound, .. } => Some(*bound),
            Outcome::Infeasible => None,
        }
    }

    /// Returns true for [`Outcome::Infeasible`].
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Outcome::Infeasible)
    }
}

/// A bounding model that can be solved under temporary fixings.
///
/// # Contract
///
/// `apply_fixings` followed by `solve` and `remove_fixings` must leave the
/// model's observable state exactly as it was before `apply_fixings`. If
/// `apply_fixings` fails it must leave the model unchanged. Callers should
/// go through [`FixingScope`] or [`RelaxationOracle::bound`], which
/// guarantee that every apply is paired with a remove.
pub trait RelaxationOracle {
    /// Decision variable identifier.
    type Var: Ord + Clone + Debug;
    /// Value a variable can be fixed to.
    type Value: Clone + PartialEq + Debug;
    /// Relaxation solution passed to the hooks.
    type Relaxed;
    /// Assignment type of feasible candidates.
    type Assignment: Clone;

    /// Applies `fixings` on top of the base model.
    fn apply_fixings(
        &mut self,
        fixings: &Fixings<Self::Var, Self::Value>,
    ) -> Result<(), BackendError>;

    /// Solves the relaxation under the currently applied fixings.
    fn solve(&mut self) -> Result<Outcome<Self::Relaxed, Self::Assignment>, BackendError>;

    /// Restores the model to its state before the last `apply_fixings`.
    fn remove_fixings(&mut self);

    /// Runs one full apply/solve/remove cycle.
    fn bound(
        &mut self,
        fixings: &Fixings<Self::Var, Self::Value>,
    ) -> Result<Outcome<Self::Relaxed, Self::Assignment>, BackendError>
    where
        Self: Sized,
    {
        let mut scope = FixingScope::apply(self, fixings)?;
        scope.solve()
    }
}

/// Holds fixings applied on an oracle and removes them when dropped.
///
/// # Example
///
/// ```ignore
/// let outcome = {
///     let mut scope = FixingScope::apply(&mut oracle, node.fixings())?;
///     scope.solve()?
/// }; // fixings removed here, even if solve failed
/// ```
pub struct FixingScope<'a, O: RelaxationOracle + ?Sized> {
    oracle: &'a mut O,
}

impl<'a, O: RelaxationOracle + ?Sized> FixingScope<'a, O> {
    /// Applies `fixings` and returns the guard owning them.
    pub fn apply(
        oracle: &'a mut O,
        fixings: &Fixings<O::Var, O::Value>,
    ) -> Result<Self, BackendError> {
        oracle.apply_fixings(fixings)?;
        Ok(Self { oracle })
    }

    /// Solves the relaxation under the held fixings.
    pub fn solve(&mut self) -> Result<Outcome<O::Relaxed, O::Assignment>, BackendError> {
        self.oracle.solve()
    }
}

impl<O: RelaxationOracle + ?Sized> Drop for FixingScope<'_, O> {
    fn drop(&mut self) {
        self.oracle.remove_fixings();
    }
}
