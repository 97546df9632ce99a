//! Explored-node count termination.

use super::Termination;
use crate::scope::SearchScope;
use crate::status::TerminationReason;

/// Terminates once a number of nodes has been explored.
///
/// A limit of zero stops before the root is bounded.
///
/// # Example
///
/// ```
/// use boundforge_solver::termination::NodeCountTermination;
///
/// // Terminate after 1000 nodes
/// let term = NodeCountTermination::new(1000);
/// ```
#[derive(Debug, Clone)]
pub struct NodeCountTermination {
    limit: u64,
}

impl NodeCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Termination for NodeCountTermination {
    fn check(&self, scope: &SearchScope) -> Option<TerminationReason> {
        (scope.nodes_explored() >= self.limit).then_some(TerminationReason::NodeLimit)
    }
}
