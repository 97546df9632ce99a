//! Node processing shared by the sequential and parallel engines.
//!
//! One call bounds a node, prunes it, accepts or repairs candidates and
//! branches. Nothing here touches the node queue; the caller pushes the
//! returned children and prunes its queue when the incumbent improved.

use boundforge_core::{
    BranchingRule, Candidate, NodeId, Outcome, RelaxationOracle, RepairHeuristic, SearchNode,
    Sense,
};
use smallvec::SmallVec;
use tracing::{debug, info, trace, warn};

use crate::incumbent::IncumbentStore;
use crate::stats::SearchStats;

/// Children produced by one processed node.
pub(crate) type Children<V, X> = SmallVec<[SearchNode<V, X>; 2]>;

/// What became of a processed node.
pub(crate) struct Evaluation<V, X> {
    /// The incumbent improved while processing the node.
    pub improved: bool,
    /// Children to queue; empty when the node was pruned or resolved.
    pub children: Children<V, X>,
    /// Bound of a subtree that was dropped without being searched.
    pub lost: Option<f64>,
}

impl<V, X> Evaluation<V, X> {
    fn settled(improved: bool) -> Self {
        Self {
            improved,
            children: SmallVec::new(),
            lost: None,
        }
    }

    fn dropped(bound: f64) -> Self {
        Self {
            lost: Some(bound),
            ..Self::settled(false)
        }
    }
}

/// The problem-specific collaborators a node is processed with.
pub(crate) struct NodeProcessor<'a, I, B, H> {
    pub instance: &'a I,
    pub brancher: &'a B,
    pub repair: &'a H,
    pub sense: Sense,
}

impl<I, B, H> NodeProcessor<'_, I, B, H> {
    /// Runs the bound / prune / accept / repair / branch step on `node`.
    ///
    /// Backend failures are logged and counted, and the node is dropped.
    pub fn process<O, S>(
        &self,
        oracle: &mut O,
        mut node: SearchNode<O::Var, O::Value>,
        incumbent: &mut S,
        stats: &mut SearchStats,
        next_id: &mut impl FnMut() -> NodeId,
    ) -> Evaluation<O::Var, O::Value>
    where
        O: RelaxationOracle,
        B: BranchingRule<I, O>,
        H: RepairHeuristic<I, O>,
        S: IncumbentStore<O::Assignment>,
    {
        stats.record_explored(node.depth());

        let outcome = match oracle.bound(node.fixings()) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    event = "backend_failure",
                    node = %node.id(),
                    depth = node.depth(),
                    error = %err,
                    "Relaxation failed, dropping node"
                );
                stats.record_backend_failure();
                return Evaluation::dropped(self.estimate(&node));
            }
        };

        let (bound, relaxed, candidate) = match outcome {
            Outcome::Infeasible => {
                trace!(event = "node_infeasible", node = %node.id());
                stats.record_infeasible();
                return Evaluation::settled(false);
            }
            Outcome::Bounded {
                bound,
                relaxed,
                candidate,
            } => (bound, relaxed, candidate),
        };

        if bound.is_nan() {
            warn!(
                event = "backend_failure",
                node = %node.id(),
                depth = node.depth(),
                "Relaxation returned a NaN bound, dropping node"
            );
            stats.record_backend_failure();
            return Evaluation::dropped(self.estimate(&node));
        }
        node.set_bound(bound);

        if self.cannot_improve(bound, incumbent.objective()) {
            trace!(event = "node_pruned", node = %node.id(), bound);
            stats.record_pruned(1);
            return Evaluation::settled(false);
        }

        if let Some(candidate) = candidate {
            let improved = self.offer(incumbent, candidate, &node, stats);
            trace!(event = "node_integral", node = %node.id(), bound, improved);
            return Evaluation::settled(improved);
        }

        let mut improved = false;
        if let Some(candidate) = self.repair.repair(self.instance, &node, &relaxed) {
            improved = self.offer(incumbent, candidate, &node, stats);
            if improved && self.cannot_improve(bound, incumbent.objective()) {
                trace!(event = "node_pruned", node = %node.id(), bound);
                stats.record_pruned(1);
                return Evaluation::settled(true);
            }
        }

        let branches = self.brancher.branch(self.instance, &node, &relaxed);
        if branches.is_empty() {
            trace!(event = "node_resolved", node = %node.id(), bound);
            return Evaluation::settled(improved);
        }

        let mut children = SmallVec::new();
        let mut lost = None;
        for additions in &branches {
            match node.child(next_id(), additions) {
                Ok(child) => children.push(child),
                Err(err) => {
                    warn!(
                        event = "branch_rejected",
                        node = %node.id(),
                        error = %err,
                        "Branching rule produced an invalid branch"
                    );
                    stats.record_branch_rejected();
                    lost = Some(bound);
                }
            }
        }
        debug!(
            event = "node_branched",
            node = %node.id(),
            depth = node.depth(),
            bound,
            children = children.len()
        );

        Evaluation {
            improved,
            children,
            lost,
        }
    }

    /// Most favorable value a node's subtree may still hold.
    fn estimate<V: Ord, X>(&self, node: &SearchNode<V, X>) -> f64 {
        node.estimate().unwrap_or(self.sense.unbounded())
    }

    /// True when a subtree bounded by `bound` cannot beat the incumbent.
    fn cannot_improve(&self, bound: f64, incumbent: Option<f64>) -> bool {
        incumbent.is_some_and(|inc| !self.sense.is_better(bound, inc))
    }

    fn offer<A, V: Ord, X, S: IncumbentStore<A>>(
        &self,
        incumbent: &mut S,
        candidate: Candidate<A>,
        node: &SearchNode<V, X>,
        stats: &mut SearchStats,
    ) -> bool {
        let objective = candidate.objective_value;
        if !incumbent.offer(candidate) {
            return false;
        }
        stats.record_incumbent_update();
        info!(
            event = "new_incumbent",
            objective,
            node = %node.id(),
            depth = node.depth()
        );
        true
    }
}
