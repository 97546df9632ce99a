//! Brute-force reference optima.
//!
//! Enumerates every assignment consistent with the fixings. Only meant for
//! the small instances used in tests (up to about 20 variables).

use boundforge_core::Fixings;

use crate::covering::CoveringInstance;
use crate::knapsack::KnapsackInstance;

/// Every 0-1 assignment over `n` variables that agrees with `fixings`.
pub fn assignments(n: usize, fixings: &Fixings<usize, bool>) -> impl Iterator<Item = Vec<bool>> + '_ {
    (0u64..1 << n)
        .map(move |mask| (0..n).map(|i| mask & (1 << i) != 0).collect::<Vec<bool>>())
        .filter(move |x| fixings.iter().all(|(&i, &v)| x.get(i) == Some(&v)))
}

/// Best knapsack profit under `fixings`, or `None` if nothing fits.
pub fn knapsack_optimum(instance: &KnapsackInstance, fixings: &Fixings<usize, bool>) -> Option<f64> {
    assignments(instance.len(), fixings)
        .filter(|x| instance.fits(x))
        .map(|x| instance.profit_of(&x))
        .reduce(f64::max)
}

/// Cheapest cover under `fixings`, or `None` if no cover exists.
pub fn covering_optimum(instance: &CoveringInstance, fixings: &Fixings<usize, bool>) -> Option<f64> {
    assignments(instance.set_count(), fixings)
        .filter(|x| instance.covers(x))
        .map(|x| instance.cost_of(&x))
        .reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use boundforge_core::{BranchingRule, NodeId, Outcome, RelaxationOracle, SearchNode};

    use super::*;
    use crate::covering::{CoveringBrancher, CoveringOracle};
    use crate::knapsack::{KnapsackBrancher, KnapsackOracle};

    /// Walks the tree below `node` and checks that every feasible assignment
    /// under a node's fixings lies under exactly one of its children.
    /// Returns the number of nodes that branched.
    fn assert_partitions<I, O, B>(
        instance: &I,
        oracle: &mut O,
        brancher: &B,
        n: usize,
        feasible: &dyn Fn(&[bool]) -> bool,
        node: &SearchNode<usize, bool>,
        depth: usize,
    ) -> usize
    where
        O: RelaxationOracle<Var = usize, Value = bool>,
        B: BranchingRule<I, O>,
    {
        let Outcome::Bounded { relaxed, .. } = oracle.bound(node.fixings()).unwrap() else {
            return 0;
        };
        let branches = brancher.branch(instance, node, &relaxed);
        if branches.is_empty() || depth == 0 {
            return 0;
        }

        let children: Vec<_> = branches
            .iter()
            .enumerate()
            .map(|(k, additions)| node.child(NodeId(k as u64 + 1), additions).unwrap())
            .collect();
        for x in assignments(n, node.fixings()).filter(|x| feasible(x)) {
            let owners = children
                .iter()
                .filter(|child| child.fixings().iter().all(|(&i, &v)| x[i] == v))
                .count();
            assert_eq!(owners, 1, "{x:?} under {:?}", node.fixings());
        }

        1 + children
            .iter()
            .map(|child| assert_partitions(instance, oracle, brancher, n, feasible, child, depth - 1))
            .sum::<usize>()
    }

    #[test]
    fn test_knapsack_brancher_partitions_feasible_assignments() {
        let mut branched = 0;
        for seed in 0..8 {
            let instance = KnapsackInstance::random(9, seed);
            let mut oracle = KnapsackOracle::new(&instance);
            let fits = |x: &[bool]| instance.fits(x);
            let root = SearchNode::root();
            branched += assert_partitions(
                &instance,
                &mut oracle,
                &KnapsackBrancher,
                instance.len(),
                &fits,
                &root,
                5,
            );
        }
        assert!(branched > 0);
    }

    #[test]
    fn test_covering_brancher_partitions_feasible_assignments() {
        let mut branched = 0;
        for seed in 0..8 {
            let instance = CoveringInstance::random(9, 6, seed);
            let mut oracle = CoveringOracle::new(&instance);
            let covers = |x: &[bool]| instance.covers(x);
            let root = SearchNode::root();
            branched += assert_partitions(
                &instance,
                &mut oracle,
                &CoveringBrancher,
                instance.set_count(),
                &covers,
                &root,
                5,
            );
        }
        assert!(branched > 0);
    }

    #[test]
    fn test_assignments_respect_fixings() {
        assert_eq!(assignments(3, &Fixings::new()).count(), 8);

        let fixings: Fixings<usize, bool> = [(0, true), (2, false)].into_iter().collect();
        let all: Vec<_> = assignments(3, &fixings).collect();
        assert_eq!(all, vec![vec![true, false, false], vec![true, true, false]]);
    }

    #[test]
    fn test_small_knapsack_optimum() {
        let instance =
            KnapsackInstance::new(vec![3.0, 4.0, 5.0, 6.0], vec![2.0, 3.0, 4.0, 5.0], 5.0);
        assert_eq!(knapsack_optimum(&instance, &Fixings::new()), Some(7.0));
        assert_eq!(knapsack_optimum(&instance, &Fixings::single(3, true)), Some(6.0));

        let overweight: Fixings<usize, bool> = [(2, true), (3, true)].into_iter().collect();
        assert_eq!(knapsack_optimum(&instance, &overweight), None);
    }

    #[test]
    fn test_small_covering_optimum() {
        let instance = CoveringInstance::new(
            vec![5.0, 2.0, 2.0, 1.0],
            vec![vec![0, 1, 2, 3], vec![0, 1], vec![2, 3], vec![1]],
            4,
        );
        assert_eq!(covering_optimum(&instance, &Fixings::new()), Some(4.0));
        assert_eq!(covering_optimum(&instance, &Fixings::single(1, false)), Some(5.0));
    }
}
