//! Search tree node representation.
//!
//! Each node is a set of fixings applied on top of the root relaxation.

use std::fmt::{self, Debug};

use crate::error::BranchError;
use crate::fixing::Fixings;

/// Serial identifier of a node, assigned in creation order.
///
/// Used for tracing and parent references only; the engine never looks a
/// node up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl NodeId {
    /// The id of the root node.
    pub const ROOT: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the branch-and-bound tree.
///
/// Contains:
/// - The fixings that define the subproblem
/// - The bound inherited from the parent (used for ordering before solving)
/// - The node's own bound, cached after its first solve
/// - Id, parent id and depth for diagnostics
#[derive(Clone)]
pub struct SearchNode<V, X> {
    id: NodeId,
    parent: Option<NodeId>,
    depth: usize,
    fixings: Fixings<V, X>,
    parent_bound: Option<f64>,
    bound: Option<f64>,
}

impl<V: Ord, X> SearchNode<V, X> {
    /// Creates the root node: no fixings, no bound.
    pub fn root() -> Self {
        Self {
            id: NodeId::ROOT,
            parent: None,
            depth: 0,
            fixings: Fixings::new(),
            parent_bound: None,
            bound: None,
        }
    }

    /// Returns the node id.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the parent id (None for the root).
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the depth in the tree (0 for the root).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the fixings defining this node.
    #[inline]
    pub fn fixings(&self) -> &Fixings<V, X> {
        &self.fixings
    }

    /// Returns true if this is the root node.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the node's own bound, if it has been solved.
    #[inline]
    pub fn bound(&self) -> Option<f64> {
        self.bound
    }

    /// Returns the bound this node inherited from its parent.
    #[inline]
    pub fn parent_bound(&self) -> Option<f64> {
        self.parent_bound
    }

    /// Best known bound: the node's own if solved, else the parent's.
    pub fn estimate(&self) -> Option<f64> {
        self.bound.or(self.parent_bound)
    }

    /// Caches the bound computed by the oracle.
    ///
    /// Only the first call has an effect; a node's bound never changes once
    /// computed.
    pub fn set_bound(&mut self, bound: f64) {
        if self.bound.is_none() {
            self.bound = Some(bound);
        }
    }
}

impl<V: Ord + Clone + Debug, X: Clone> SearchNode<V, X> {
    /// Creates a child with `additions` fixed on top of this node's fixings.
    ///
    /// The child inherits this node's bound as its parent bound.
    pub fn child(&self, id: NodeId, additions: &Fixings<V, X>) -> Result<Self, BranchError> {
        Ok(Self {
            id,
            parent: Some(self.id),
            depth: self.depth + 1,
            fixings: self.fixings.extended(additions)?,
            parent_bound: self.estimate(),
            bound: None,
        })
    }
}

impl<V: PartialEq, X: PartialEq> PartialEq for SearchNode<V, X> {
    fn eq(&self, other: &Self) -> bool {
        self.fixings == other.fixings
    }
}

impl<V: Debug, X: Debug> Debug for SearchNode<V, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchNode")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("fixings", &self.fixings)
            .field("bound", &self.bound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node() {
        let root: SearchNode<usize, u8> = SearchNode::root();

        assert_eq!(root.id(), NodeId::ROOT);
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert!(root.fixings().is_empty());
        assert!(root.bound().is_none());
        assert!(root.estimate().is_none());
    }

    #[test]
    fn test_child_node() {
        let mut root: SearchNode<usize, u8> = SearchNode::root();
        root.set_bound(9.5);

        let child = root.child(NodeId(1), &Fixings::single(2, 1)).unwrap();

        assert_eq!(child.id(), NodeId(1));
        assert_eq!(child.parent(), Some(NodeId::ROOT));
        assert_eq!(child.depth(), 1);
        assert_eq!(child.parent_bound(), Some(9.5));
        assert!(child.bound().is_none());
        assert_eq!(child.estimate(), Some(9.5));
        assert!(child.fixings().is_strict_superset_of(root.fixings()));
    }

    #[test]
    fn test_child_rejects_refixing() {
        let root: SearchNode<usize, u8> = SearchNode::root();
        let child = root.child(NodeId(1), &Fixings::single(0, 1)).unwrap();

        assert_eq!(
            child.child(NodeId(2), &Fixings::single(0, 0)),
            Err(BranchError::AlreadyFixed("0".into()))
        );
        assert_eq!(
            child.child(NodeId(2), &Fixings::new()),
            Err(BranchError::Empty)
        );
    }

    #[test]
    fn test_bound_is_cached_once() {
        let mut node: SearchNode<usize, u8> = SearchNode::root();
        node.set_bound(4.0);
        node.set_bound(2.0);
        assert_eq!(node.bound(), Some(4.0));
    }

    #[test]
    fn test_equality_by_fixings() {
        let root: SearchNode<usize, u8> = SearchNode::root();
        let a = root.child(NodeId(1), &Fixings::single(0, 1)).unwrap();
        let b = root.child(NodeId(7), &Fixings::single(0, 1)).unwrap();
        let c = root.child(NodeId(2), &Fixings::single(0, 0)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
