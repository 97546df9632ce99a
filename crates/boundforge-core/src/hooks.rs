//! Problem-specific hooks injected into the engine.
//!
//! The branching rule decides how a node is split; the repair heuristic
//! tries to turn a relaxation solution into a feasible candidate. Both are
//! strategy values, implemented either on a named type or by a closure.

use smallvec::SmallVec;

use crate::candidate::Candidate;
use crate::fixing::Fixings;
use crate::node::SearchNode;
use crate::oracle::RelaxationOracle;

/// Fixings added by each child of a branched node.
///
/// Binary branching is the common case and stays on the stack.
pub type Branches<V, X> = SmallVec<[Fixings<V, X>; 2]>;

/// Splits a node into children.
///
/// # Partition property
///
/// The returned additions must be mutually exclusive and jointly exhaustive
/// over the branching variable's domain relative to `node`: every solution
/// feasible under the node's fixings is feasible under exactly one child.
/// Each addition must fix at least one variable not already fixed by `node`.
///
/// Returning no branches declares the node resolved: there is nothing left
/// to branch on.
pub trait BranchingRule<I, O: RelaxationOracle> {
    /// Produces the fixing additions for each child of `node`.
    fn branch(
        &self,
        instance: &I,
        node: &SearchNode<O::Var, O::Value>,
        relaxed: &O::Relaxed,
    ) -> Branches<O::Var, O::Value>;
}

impl<I, O, F> BranchingRule<I, O> for F
where
    O: RelaxationOracle,
    F: Fn(&I, &SearchNode<O::Var, O::Value>, &O::Relaxed) -> Branches<O::Var, O::Value>,
{
    fn branch(
        &self,
        instance: &I,
        node: &SearchNode<O::Var, O::Value>,
        relaxed: &O::Relaxed,
    ) -> Branches<O::Var, O::Value> {
        self(instance, node, relaxed)
    }
}

/// Derives a feasible candidate from a node's relaxation without branching.
///
/// Returning `None` simply means no improvement was found; it never stops
/// the search.
pub trait RepairHeuristic<I, O: RelaxationOracle> {
    /// Attempts to repair the relaxation solution of `node`.
    fn repair(
        &self,
        instance: &I,
        node: &SearchNode<O::Var, O::Value>,
        relaxed: &O::Relaxed,
    ) -> Option<Candidate<O::Assignment>>;
}

// `()` is the no-op repair heuristic.
impl<I, O: RelaxationOracle> RepairHeuristic<I, O> for () {
    fn repair(
        &self,
        _instance: &I,
        _node: &SearchNode<O::Var, O::Value>,
        _relaxed: &O::Relaxed,
    ) -> Option<Candidate<O::Assignment>> {
        None
    }
}

impl<I, O, F> RepairHeuristic<I, O> for F
where
    O: RelaxationOracle,
    F: Fn(&I, &SearchNode<O::Var, O::Value>, &O::Relaxed) -> Option<Candidate<O::Assignment>>,
{
    fn repair(
        &self,
        instance: &I,
        node: &SearchNode<O::Var, O::Value>,
        relaxed: &O::Relaxed,
    ) -> Option<Candidate<O::Assignment>> {
        self(instance, node, relaxed)
    }
}
