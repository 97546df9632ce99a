//! Node priority queue for B&B tree exploration.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use boundforge_core::{SearchNode, Sense};

use crate::arena::{NodeArena, NodeHandle};
use crate::selection::{NodeInfo, SelectionPolicy};

/// Entry in the node queue with priority.
#[derive(Debug)]
struct QueuedNode {
    priority: f64, // Higher = selected first
    sequence: u64, // Lower = selected first among equal priorities
    bound: f64,    // Oriented estimate, +inf when unknown
    handle: NodeHandle,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue of pending search nodes.
///
/// Nodes live in a [`NodeArena`]; the heap only orders handles. Every bound
/// is kept in oriented form (larger is more favorable) so the queue works the
/// same way for both optimization directions.
#[derive(Debug)]
pub struct NodeQueue<V, X, P> {
    sense: Sense,
    policy: P,
    arena: NodeArena<SearchNode<V, X>>,
    heap: BinaryHeap<QueuedNode>,
    next_sequence: u64,
    nodes_added: u64,
    nodes_popped: u64,
    /// Most favorable oriented bound in the queue.
    best_bound: f64,
}

impl<V: Ord, X, P: SelectionPolicy> NodeQueue<V, X, P> {
    /// Creates an empty queue ordered by `policy`.
    pub fn new(sense: Sense, policy: P) -> Self {
        Self {
            sense,
            policy,
            arena: NodeArena::new(),
            heap: BinaryHeap::new(),
            next_sequence: 0,
            nodes_added: 0,
            nodes_popped: 0,
            best_bound: f64::NEG_INFINITY,
        }
    }

    /// Adds a node to the queue.
    pub fn push(&mut self, node: SearchNode<V, X>) {
        let bound = node
            .estimate()
            .map_or(f64::INFINITY, |b| self.sense.orient(b));
        let sequence = self.next_sequence;
        let priority = self.policy.priority(&NodeInfo {
            depth: node.depth(),
            bound,
            sequence,
        });

        if bound > self.best_bound || self.heap.is_empty() {
            self.best_bound = bound;
        }

        let handle = self.arena.insert(node);
        self.heap.push(QueuedNode {
            priority,
            sequence,
            bound,
            handle,
        });
        self.next_sequence += 1;
        self.nodes_added += 1;
    }

    /// Removes and returns the next node to explore.
    pub fn pop(&mut self) -> Option<SearchNode<V, X>> {
        let queued = self.heap.pop()?;
        self.nodes_popped += 1;

        if queued.bound >= self.best_bound {
            self.recompute_best_bound();
        }

        self.arena.remove(queued.handle)
    }

    /// Returns the next node without removing it.
    pub fn peek(&self) -> Option<&SearchNode<V, X>> {
        self.heap.peek().and_then(|q| self.arena.get(q.handle))
    }

    /// Most favorable bound among pending nodes, in the instance's direction.
    ///
    /// Nodes that were never bounded count as unbounded. Returns `None` when
    /// the queue is empty.
    pub fn best_bound(&self) -> Option<f64> {
        if self.heap.is_empty() {
            None
        } else {
            Some(self.sense.orient(self.best_bound))
        }
    }

    /// Drops every node whose bound can no longer beat `incumbent`.
    ///
    /// Nodes without a known bound are kept. Returns the number of pruned
    /// nodes.
    pub fn prune_by_bound(&mut self, incumbent: f64) -> usize {
        let threshold = self.sense.orient(incumbent);
        let before = self.heap.len();

        let (kept, pruned): (Vec<QueuedNode>, Vec<QueuedNode>) =
            self.heap.drain().partition(|q| q.bound > threshold);

        for q in pruned {
            self.arena.remove(q.handle);
        }
        self.heap = kept.into_iter().collect();
        self.recompute_best_bound();

        before - self.heap.len()
    }

    /// Returns true if no node is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of pending nodes.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Total number of nodes ever pushed.
    pub fn total_added(&self) -> u64 {
        self.nodes_added
    }

    /// Total number of nodes ever popped.
    pub fn total_popped(&self) -> u64 {
        self.nodes_popped
    }

    /// Returns the selection policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Replaces the selection policy, keeping no pending nodes.
    pub(crate) fn into_policy<Q: SelectionPolicy>(self, policy: Q) -> NodeQueue<V, X, Q> {
        NodeQueue::new(self.sense, policy)
    }

    /// Drops every pending node.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.arena.clear();
        self.best_bound = f64::NEG_INFINITY;
    }

    fn recompute_best_bound(&mut self) {
        self.best_bound = self
            .heap
            .iter()
            .map(|q| q.bound)
            .fold(f64::NEG_INFINITY, f64::max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::NodeSelection;
    use boundforge_core::{Fixings, NodeId};

    type Node = SearchNode<usize, bool>;

    /// A child of a root with bound `bound`, fixing `var`.
    fn node_with_bound(id: u64, var: usize, bound: f64) -> Node {
        let mut root: Node = SearchNode::root();
        root.set_bound(bound);
        root.child(NodeId(id), &Fixings::single(var, true)).unwrap()
    }

    /// A chain of `depth` fixings below an unbounded root.
    fn node_at_depth(id: u64, depth: usize) -> Node {
        let mut node: Node = SearchNode::root();
        for var in 0..depth {
            node = node.child(NodeId(id), &Fixings::single(var, false)).unwrap();
        }
        node
    }

    #[test]
    fn test_best_bound_selection() {
        let mut queue = NodeQueue::new(Sense::Maximize, NodeSelection::BestBound);

        queue.push(node_with_bound(1, 0, 10.0));
        queue.push(node_with_bound(2, 1, 15.0));
        queue.push(node_with_bound(3, 2, 5.0));

        assert_eq!(queue.best_bound(), Some(15.0));
        assert_eq!(queue.pop().unwrap().id(), NodeId(2));
        assert_eq!(queue.best_bound(), Some(10.0));
        assert_eq!(queue.pop().unwrap().id(), NodeId(1));
        assert_eq!(queue.pop().unwrap().id(), NodeId(3));
        assert!(queue.is_empty());
        assert_eq!(queue.best_bound(), None);
    }

    #[test]
    fn test_best_bound_selection_minimize() {
        let mut queue = NodeQueue::new(Sense::Minimize, NodeSelection::BestBound);

        queue.push(node_with_bound(1, 0, 10.0));
        queue.push(node_with_bound(2, 1, 15.0));
        queue.push(node_with_bound(3, 2, 5.0));

        assert_eq!(queue.best_bound(), Some(5.0));
        assert_eq!(queue.pop().unwrap().id(), NodeId(3));
        assert_eq!(queue.pop().unwrap().id(), NodeId(1));
    }

    #[test]
    fn test_unbounded_root_counts_as_best() {
        let mut queue = NodeQueue::new(Sense::Minimize, NodeSelection::BestBound);
        queue.push(node_with_bound(1, 0, 3.0));
        queue.push(SearchNode::root());

        assert_eq!(queue.best_bound(), Some(f64::NEG_INFINITY));
        assert!(queue.pop().unwrap().is_root());
    }

    #[test]
    fn test_depth_first_is_lifo() {
        let mut queue = NodeQueue::new(Sense::Maximize, NodeSelection::DepthFirst);

        queue.push(node_at_depth(1, 1));
        queue.push(node_at_depth(2, 3));
        queue.push(node_at_depth(3, 2));

        assert_eq!(queue.pop().unwrap().id(), NodeId(3));
        assert_eq!(queue.pop().unwrap().id(), NodeId(2));
        assert_eq!(queue.pop().unwrap().id(), NodeId(1));
    }

    #[test]
    fn test_breadth_first_ties_are_fifo() {
        let mut queue = NodeQueue::new(Sense::Maximize, NodeSelection::BreadthFirst);

        queue.push(node_at_depth(1, 2));
        queue.push(node_at_depth(2, 1));
        queue.push(node_at_depth(3, 2));
        queue.push(node_at_depth(4, 1));

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop()).map(|n| n.id().0).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_equal_bounds_are_fifo() {
        let mut queue = NodeQueue::new(Sense::Maximize, NodeSelection::BestBound);
        for id in 1..=3 {
            queue.push(node_with_bound(id, id as usize, 8.0));
        }

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop()).map(|n| n.id().0).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_pruning() {
        let mut queue = NodeQueue::new(Sense::Maximize, NodeSelection::DepthFirst);

        for i in 0..5 {
            queue.push(node_with_bound(i, i as usize, i as f64 * 10.0)); // 0, 10, 20, 30, 40
        }
        queue.push(SearchNode::root());
        assert_eq!(queue.len(), 6);

        // Bounds equal to the incumbent cannot beat it either
        let pruned = queue.prune_by_bound(20.0);
        assert_eq!(pruned, 3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.best_bound(), Some(f64::INFINITY));

        let mut ids: Vec<u64> = std::iter::from_fn(|| queue.pop()).map(|n| n.id().0).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 3, 4]);
    }

    #[test]
    fn test_pruning_minimize() {
        let mut queue = NodeQueue::new(Sense::Minimize, NodeSelection::BestBound);
        for i in 0..4 {
            queue.push(node_with_bound(i, i as usize, i as f64)); // 0, 1, 2, 3
        }

        assert_eq!(queue.prune_by_bound(1.5), 2);
        assert_eq!(queue.best_bound(), Some(0.0));
    }

    #[test]
    fn test_counters() {
        let mut queue = NodeQueue::new(Sense::Maximize, NodeSelection::DepthFirst);
        queue.push(node_at_depth(1, 1));
        queue.push(node_at_depth(2, 1));
        queue.pop();

        assert_eq!(queue.total_added(), 2);
        assert_eq!(queue.total_popped(), 1);
        assert_eq!(queue.peek().map(|n| n.id()), Some(NodeId(1)));

        queue.clear();
        assert!(queue.is_empty());
    }
}
