//! Node selection policies.
//!
//! A policy turns what is known about a pending node into a priority. The
//! queue pops the highest priority first and falls back to insertion order
//! (first in, first out) among equal priorities.

use std::fmt::Debug;

pub use boundforge_config::NodeSelection;

/// What a selection policy may look at when ranking a pending node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeInfo {
    /// Depth of the node in the tree.
    pub depth: usize,
    /// Best known bound on the node's subtree, oriented so that larger is
    /// more favorable. `+inf` when nothing is known yet.
    pub bound: f64,
    /// Insertion sequence number; increases with every push.
    pub sequence: u64,
}

/// Ranks pending nodes; higher priority is explored first.
///
/// # Example
///
/// ```
/// use boundforge_solver::selection::{NodeInfo, SelectionPolicy};
///
/// /// Deepest node first, best bound among equally deep nodes.
/// #[derive(Debug)]
/// struct DeepestBest;
///
/// impl SelectionPolicy for DeepestBest {
///     fn priority(&self, node: &NodeInfo) -> f64 {
///         node.depth as f64 * 1e6 + node.bound.clamp(-1e5, 1e5)
///     }
/// }
///
/// let shallow = NodeInfo { depth: 1, bound: 50.0, sequence: 0 };
/// let deep = NodeInfo { depth: 2, bound: 10.0, sequence: 1 };
/// assert!(DeepestBest.priority(&deep) > DeepestBest.priority(&shallow));
/// ```
pub trait SelectionPolicy: Send + Debug {
    /// Returns the priority of a node about to be queued.
    fn priority(&self, node: &NodeInfo) -> f64;

    /// Short name used in log output.
    fn name(&self) -> &'static str {
        "Custom"
    }
}

impl SelectionPolicy for NodeSelection {
    fn priority(&self, node: &NodeInfo) -> f64 {
        match self {
            NodeSelection::BestBound => node.bound,
            // Most recent push first
            NodeSelection::DepthFirst => node.sequence as f64,
            NodeSelection::BreadthFirst => -(node.depth as f64),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            NodeSelection::BestBound => "BestBound",
            NodeSelection::DepthFirst => "DepthFirst",
            NodeSelection::BreadthFirst => "BreadthFirst",
        }
    }
}

impl<P: SelectionPolicy + Sync> SelectionPolicy for &P {
    fn priority(&self, node: &NodeInfo) -> f64 {
        (**self).priority(node)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
