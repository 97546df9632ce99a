//! Weighted set cover test fixtures.
//!
//! A minimization problem: choose sets so that every element is covered, at
//! least total cost. Variables are set indices fixed to chosen (`true`) or
//! excluded (`false`).
//!
//! The bound is the cost of the chosen sets plus, over the elements not yet
//! covered, the largest cheapest-cover cost: whatever completes the cover
//! must pay at least that much for that one element.

use boundforge_core::{
    BackendError, BoundForgeError, BranchingRule, Branches, Candidate, Fixings, Instance,
    Outcome, RelaxationOracle, RepairHeuristic, Result, SearchNode, Sense,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A set cover instance over elements `0..elements`.
#[derive(Clone, Debug)]
pub struct CoveringInstance {
    costs: Vec<f64>,
    sets: Vec<Vec<usize>>,
    elements: usize,
}

impl CoveringInstance {
    pub fn new(costs: Vec<f64>, sets: Vec<Vec<usize>>, elements: usize) -> Self {
        Self {
            costs,
            sets,
            elements,
        }
    }

    /// Random instance reproducible from `seed`.
    ///
    /// Each set covers each element with probability 0.3, costs are integers
    /// in `[1, 10)`, and every element is covered by at least one set.
    pub fn random(set_count: usize, elements: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let set_count = set_count.max(1);

        let mut sets: Vec<Vec<usize>> = (0..set_count)
            .map(|_| (0..elements).filter(|_| rng.random_bool(0.3)).collect())
            .collect();
        for element in 0..elements {
            if !sets.iter().any(|set| set.contains(&element)) {
                let set = rng.random_range(0..set_count);
                sets[set].push(element);
                sets[set].sort_unstable();
            }
        }
        let costs = (0..set_count)
            .map(|_| f64::from(rng.random_range(1u32..10)))
            .collect();

        Self::new(costs, sets, elements)
    }

    /// Number of sets.
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Number of elements to cover.
    pub fn elements(&self) -> usize {
        self.elements
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn sets(&self) -> &[Vec<usize>] {
        &self.sets
    }

    /// Total cost of the chosen sets.
    pub fn cost_of(&self, chosen: &[bool]) -> f64 {
        chosen
            .iter()
            .zip(&self.costs)
            .filter(|(&take, _)| take)
            .map(|(_, c)| c)
            .sum()
    }

    /// Returns true if the chosen sets cover every element.
    pub fn covers(&self, chosen: &[bool]) -> bool {
        let covered = self.covered_by(chosen.iter().enumerate().filter(|(_, &t)| t).map(|(s, _)| s));
        covered.iter().all(|&c| c)
    }

    fn covered_by(&self, sets: impl Iterator<Item = usize>) -> Vec<bool> {
        let mut covered = vec![false; self.elements];
        for set in sets {
            for &element in &self.sets[set] {
                covered[element] = true;
            }
        }
        covered
    }
}

impl Instance for CoveringInstance {
    fn sense(&self) -> Sense {
        Sense::Minimize
    }

    fn validate(&self) -> Result<()> {
        if self.costs.len() != self.sets.len() {
            return Err(BoundForgeError::InvalidInstance(format!(
                "{} costs but {} sets",
                self.costs.len(),
                self.sets.len()
            )));
        }
        if let Some(s) = self.costs.iter().position(|&c| !(c > 0.0 && c.is_finite())) {
            return Err(BoundForgeError::InvalidInstance(format!(
                "set {s} has non-positive cost {}",
                self.costs[s]
            )));
        }
        for (s, set) in self.sets.iter().enumerate() {
            if let Some(&element) = set.iter().find(|&&e| e >= self.elements) {
                return Err(BoundForgeError::InvalidInstance(format!(
                    "set {s} covers unknown element {element}"
                )));
            }
        }
        Ok(())
    }
}

/// Relaxation state handed to the covering hooks.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverState {
    /// Sets fixed in.
    pub chosen: Vec<bool>,
    /// Sets fixed out.
    pub excluded: Vec<bool>,
    /// Elements covered by the chosen sets.
    pub covered: Vec<bool>,
}

impl CoverState {
    /// Returns true if set `s` is not fixed either way.
    pub fn is_free(&self, s: usize) -> bool {
        !self.chosen[s] && !self.excluded[s]
    }
}

/// Relaxation oracle for [`CoveringInstance`].
#[derive(Clone, Debug)]
pub struct CoveringOracle<'a> {
    instance: &'a CoveringInstance,
    applied: Vec<Fixings<usize, bool>>,
}

impl<'a> CoveringOracle<'a> {
    pub fn new(instance: &'a CoveringInstance) -> Self {
        Self {
            instance,
            applied: Vec::new(),
        }
    }

    /// Number of fixing sets currently applied.
    pub fn depth(&self) -> usize {
        self.applied.len()
    }

    fn state(&self) -> CoverState {
        let n = self.instance.set_count();
        let mut chosen = vec![false; n];
        let mut excluded = vec![false; n];
        if let Some(fixings) = self.applied.last() {
            for (&s, &take) in fixings {
                if take {
                    chosen[s] = true;
                } else {
                    excluded[s] = true;
                }
            }
        }
        let covered = self
            .instance
            .covered_by(chosen.iter().enumerate().filter(|(_, &t)| t).map(|(s, _)| s));
        CoverState {
            chosen,
            excluded,
            covered,
        }
    }
}

impl RelaxationOracle for CoveringOracle<'_> {
    type Var = usize;
    type Value = bool;
    type Relaxed = CoverState;
    type Assignment = Vec<bool>;

    fn apply_fixings(&mut self, fixings: &Fixings<usize, bool>) -> std::result::Result<(), BackendError> {
        if let Some(&s) = fixings.vars().find(|&&s| s >= self.instance.set_count()) {
            return Err(BackendError::Other(format!("set {s} out of range")));
        }
        self.applied.push(fixings.clone());
        Ok(())
    }

    fn solve(&mut self) -> std::result::Result<Outcome<CoverState, Vec<bool>>, BackendError> {
        let instance = self.instance;
        let state = self.state();
        let fixed_cost = instance.cost_of(&state.chosen);

        let mut hardest: f64 = 0.0;
        for element in (0..instance.elements).filter(|&e| !state.covered[e]) {
            let cheapest = (0..instance.set_count())
                .filter(|&s| state.is_free(s) && instance.sets[s].contains(&element))
                .map(|s| instance.costs[s])
                .reduce(f64::min);
            match cheapest {
                Some(cost) => hardest = hardest.max(cost),
                None => return Ok(Outcome::Infeasible),
            }
        }

        if state.covered.iter().all(|&c| c) {
            let candidate = Candidate::new(state.chosen.clone(), fixed_cost);
            Ok(Outcome::integral(fixed_cost, state, candidate))
        } else {
            Ok(Outcome::bounded(fixed_cost + hardest, state))
        }
    }

    fn remove_fixings(&mut self) {
        self.applied.pop();
    }
}

/// Branches on the cheapest free set covering the hardest-to-cover element.
///
/// The hardest element is the uncovered one with the fewest free sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoveringBrancher;

impl BranchingRule<CoveringInstance, CoveringOracle<'_>> for CoveringBrancher {
    fn branch(
        &self,
        instance: &CoveringInstance,
        _node: &SearchNode<usize, bool>,
        state: &CoverState,
    ) -> Branches<usize, bool> {
        let free_covering = |element: usize| {
            (0..instance.set_count())
                .filter(move |&s| state.is_free(s) && instance.sets[s].contains(&element))
        };

        let mut branches = Branches::new();
        let hardest = (0..instance.elements)
            .filter(|&e| !state.covered[e])
            .min_by_key(|&e| free_covering(e).count());
        let Some(element) = hardest else {
            return branches;
        };
        let set = free_covering(element)
            .min_by(|&a, &b| instance.costs[a].total_cmp(&instance.costs[b]));
        if let Some(set) = set {
            branches.push(Fixings::single(set, true));
            branches.push(Fixings::single(set, false));
        }
        branches
    }
}

/// Completes the chosen sets greedily by cost per newly covered element.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyCoverRepair;

impl RepairHeuristic<CoveringInstance, CoveringOracle<'_>> for GreedyCoverRepair {
    fn repair(
        &self,
        instance: &CoveringInstance,
        _node: &SearchNode<usize, bool>,
        state: &CoverState,
    ) -> Option<Candidate<Vec<bool>>> {
        let mut chosen = state.chosen.clone();
        let mut covered = state.covered.clone();

        while covered.iter().any(|&c| !c) {
            let best = (0..instance.set_count())
                .filter(|&s| !chosen[s] && !state.excluded[s])
                .filter_map(|s| {
                    let gain = instance.sets[s].iter().filter(|&&e| !covered[e]).count();
                    (gain > 0).then(|| (s, instance.costs[s] / gain as f64))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let (set, _) = best?;
            chosen[set] = true;
            for &element in &instance.sets[set] {
                covered[element] = true;
            }
        }

        let cost = instance.cost_of(&chosen);
        Some(Candidate::new(chosen, cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute;

    /// Elements 0..4; the two singleton-ish sets beat the big one.
    fn small() -> CoveringInstance {
        CoveringInstance::new(
            vec![5.0, 2.0, 2.0, 1.0],
            vec![vec![0, 1, 2, 3], vec![0, 1], vec![2, 3], vec![1]],
            4,
        )
    }

    #[test]
    fn test_root_bound() {
        let instance = small();
        let mut oracle = CoveringOracle::new(&instance);
        let outcome = oracle.bound(&Fixings::new()).unwrap();

        // Element 0 and element 2 each need at least 2.0
        assert_eq!(outcome.bound(), Some(2.0));
        assert_eq!(oracle.depth(), 0);
    }

    #[test]
    fn test_complete_cover_is_integral() {
        let instance = small();
        let mut oracle = CoveringOracle::new(&instance);
        let fixings: Fixings<usize, bool> = [(1, true), (2, true)].into_iter().collect();

        match oracle.bound(&fixings).unwrap() {
            Outcome::Bounded {
                bound,
                candidate: Some(candidate),
                ..
            } => {
                assert_eq!(bound, 4.0);
                assert_eq!(candidate.assignment, vec![false, true, true, false]);
            }
            other => panic!("expected a complete cover, got {other:?}"),
        }
    }

    #[test]
    fn test_uncoverable_element_is_infeasible() {
        let instance = small();
        let mut oracle = CoveringOracle::new(&instance);
        let fixings: Fixings<usize, bool> = [(0, false), (2, false)].into_iter().collect();

        assert!(oracle.bound(&fixings).unwrap().is_infeasible());
    }

    #[test]
    fn test_brancher_picks_tightest_element() {
        let instance = small();
        let mut oracle = CoveringOracle::new(&instance);
        let Outcome::Bounded { relaxed, .. } = oracle.bound(&Fixings::new()).unwrap() else {
            panic!("root should be bounded");
        };
        let branches = CoveringBrancher.branch(&instance, &SearchNode::root(), &relaxed);

        // Element 0 is covered by sets 0 and 1 only; set 1 is cheaper
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].get(&1), Some(&true));
        assert_eq!(branches[1].get(&1), Some(&false));
    }

    #[test]
    fn test_greedy_repair_covers() {
        let instance = CoveringInstance::random(8, 10, 4);
        let mut oracle = CoveringOracle::new(&instance);
        let Outcome::Bounded { relaxed, .. } = oracle.bound(&Fixings::new()).unwrap() else {
            panic!("random instances are coverable");
        };
        let candidate = GreedyCoverRepair
            .repair(&instance, &SearchNode::root(), &relaxed)
            .unwrap();

        assert!(instance.covers(&candidate.assignment));
        assert_eq!(candidate.objective_value, instance.cost_of(&candidate.assignment));
    }

    #[test]
    fn test_bound_never_overstates_optimum() {
        for seed in 0..10 {
            let instance = CoveringInstance::random(7, 8, seed);
            assert!(instance.validate().is_ok());
            let mut oracle = CoveringOracle::new(&instance);
            let cases: [Fixings<usize, bool>; 3] = [
                Fixings::new(),
                Fixings::single(0, false),
                [(1, true), (2, false)].into_iter().collect(),
            ];

            for fixings in &cases {
                let outcome = oracle.bound(fixings).unwrap();
                match brute::covering_optimum(&instance, fixings) {
                    Some(optimum) => {
                        let bound = outcome.bound().unwrap();
                        assert!(bound <= optimum + 1e-9, "seed {seed}: {bound} > {optimum}");
                    }
                    None => assert!(outcome.is_infeasible(), "seed {seed}"),
                }
            }
        }
    }

    #[test]
    fn test_validation() {
        let unknown = CoveringInstance::new(vec![1.0], vec![vec![3]], 2);
        assert!(matches!(
            unknown.validate(),
            Err(BoundForgeError::InvalidInstance(_))
        ));

        let free = CoveringInstance::new(vec![0.0], vec![vec![0]], 1);
        assert!(free.validate().is_err());
    }
}
