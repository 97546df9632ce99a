//! 0-1 knapsack test fixtures.
//!
//! Provides a complete knapsack implementation for exercising the engine on a
//! maximization problem. The relaxation is the greedy fractional knapsack:
//! items are taken whole in decreasing profit/weight order until one does
//! not fit, and that item is taken fractionally.
//!
//! # Example
//!
//! ```
//! use boundforge_core::{Fixings, Outcome, RelaxationOracle};
//! use boundforge_test::knapsack::{KnapsackInstance, KnapsackOracle};
//!
//! let instance = KnapsackInstance::new(vec![3.0, 4.0, 5.0, 6.0], vec![2.0, 3.0, 4.0, 5.0], 6.0);
//! let mut oracle = KnapsackOracle::new(&instance);
//!
//! let outcome = oracle.bound(&Fixings::new()).unwrap();
//! assert_eq!(outcome.bound(), Some(8.25));
//! ```

use boundforge_core::{
    BackendError, BoundForgeError, BranchingRule, Branches, Candidate, Fixings, Instance,
    Outcome, RelaxationOracle, RepairHeuristic, Result, SearchNode, Sense,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A knapsack instance: maximize total profit within a weight capacity.
#[derive(Clone, Debug)]
pub struct KnapsackInstance {
    profits: Vec<f64>,
    weights: Vec<f64>,
    capacity: f64,
    /// Item indices by decreasing profit/weight ratio.
    by_ratio: Vec<usize>,
}

impl KnapsackInstance {
    /// Creates an instance. Call [`Instance::validate`] to check the data.
    pub fn new(profits: Vec<f64>, weights: Vec<f64>, capacity: f64) -> Self {
        let n = profits.len().min(weights.len());
        let mut by_ratio: Vec<usize> = (0..n).collect();
        by_ratio.sort_by(|&a, &b| {
            let ra = profits[a] / weights[a];
            let rb = profits[b] / weights[b];
            rb.total_cmp(&ra)
        });

        Self {
            profits,
            weights,
            capacity,
            by_ratio,
        }
    }

    /// Random instance with `n` items, reproducible from `seed`.
    ///
    /// Profits and weights are integers in `[1, n)`; the capacity lies
    /// between the lightest item and the total weight.
    pub fn random(n: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let upper = n.max(2) as u32;

        let profits: Vec<u32> = (0..n).map(|_| rng.random_range(1..upper)).collect();
        let weights: Vec<u32> = (0..n).map(|_| rng.random_range(1..upper)).collect();
        let lightest = weights.iter().copied().min().unwrap_or(0);
        let total: u32 = weights.iter().sum();
        let capacity = if lightest < total {
            rng.random_range(lightest..total)
        } else {
            lightest
        };

        Self::new(
            profits.into_iter().map(f64::from).collect(),
            weights.into_iter().map(f64::from).collect(),
            f64::from(capacity),
        )
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true if there are no items.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn profits(&self) -> &[f64] {
        &self.profits
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Total profit of the chosen items.
    pub fn profit_of(&self, chosen: &[bool]) -> f64 {
        chosen
            .iter()
            .zip(&self.profits)
            .filter(|(&take, _)| take)
            .map(|(_, p)| p)
            .sum()
    }

    /// Total weight of the chosen items.
    pub fn weight_of(&self, chosen: &[bool]) -> f64 {
        chosen
            .iter()
            .zip(&self.weights)
            .filter(|(&take, _)| take)
            .map(|(_, w)| w)
            .sum()
    }

    /// Returns true if the chosen items fit.
    pub fn fits(&self, chosen: &[bool]) -> bool {
        self.weight_of(chosen) <= self.capacity
    }
}

impl Instance for KnapsackInstance {
    fn sense(&self) -> Sense {
        Sense::Maximize
    }

    fn validate(&self) -> Result<()> {
        if self.profits.len() != self.weights.len() {
            return Err(BoundForgeError::InvalidInstance(format!(
                "{} profits but {} weights",
                self.profits.len(),
                self.weights.len()
            )));
        }
        if let Some(i) = self.weights.iter().position(|&w| !(w > 0.0 && w.is_finite())) {
            return Err(BoundForgeError::InvalidInstance(format!(
                "item {i} has non-positive weight {}",
                self.weights[i]
            )));
        }
        if let Some(i) = self.profits.iter().position(|&p| !(p > 0.0 && p.is_finite())) {
            return Err(BoundForgeError::InvalidInstance(format!(
                "item {i} has non-positive profit {}",
                self.profits[i]
            )));
        }
        if !(self.capacity >= 0.0 && self.capacity.is_finite()) {
            return Err(BoundForgeError::InvalidInstance(format!(
                "capacity {} is not a non-negative number",
                self.capacity
            )));
        }
        Ok(())
    }
}

/// Greedy fractional knapsack relaxation.
///
/// `Relaxed` is the fractional take of every item, so at most one entry lies
/// strictly between 0 and 1.
#[derive(Clone, Debug)]
pub struct KnapsackOracle<'a> {
    instance: &'a KnapsackInstance,
    applied: Vec<Fixings<usize, bool>>,
}

impl<'a> KnapsackOracle<'a> {
    pub fn new(instance: &'a KnapsackInstance) -> Self {
        Self {
            instance,
            applied: Vec::new(),
        }
    }

    /// Number of fixing sets currently applied.
    pub fn depth(&self) -> usize {
        self.applied.len()
    }
}

impl RelaxationOracle for KnapsackOracle<'_> {
    type Var = usize;
    type Value = bool;
    type Relaxed = Vec<f64>;
    type Assignment = Vec<bool>;

    fn apply_fixings(&mut self, fixings: &Fixings<usize, bool>) -> std::result::Result<(), BackendError> {
        if let Some(&item) = fixings.vars().find(|&&item| item >= self.instance.len()) {
            return Err(BackendError::Other(format!(
                "item {item} out of range for {} items",
                self.instance.len()
            )));
        }
        self.applied.push(fixings.clone());
        Ok(())
    }

    fn solve(&mut self) -> std::result::Result<Outcome<Vec<f64>, Vec<bool>>, BackendError> {
        let instance = self.instance;
        let empty = Fixings::new();
        let fixings = self.applied.last().unwrap_or(&empty);

        let mut x = vec![0.0; instance.len()];
        let mut weight = 0.0;
        let mut profit = 0.0;
        for (&item, &take) in fixings {
            if take {
                x[item] = 1.0;
                weight += instance.weights[item];
                profit += instance.profits[item];
            }
        }
        if weight > instance.capacity {
            return Ok(Outcome::Infeasible);
        }

        for &item in &instance.by_ratio {
            if fixings.contains(&item) {
                continue;
            }
            // Remaining items would only lower the profit
            if instance.profits[item] <= 0.0 {
                break;
            }
            if weight + instance.weights[item] > instance.capacity {
                let fraction = (instance.capacity - weight) / instance.weights[item];
                profit += instance.profits[item] * fraction;
                x[item] = fraction;
                break;
            }
            weight += instance.weights[item];
            profit += instance.profits[item];
            x[item] = 1.0;
        }

        if x.iter().all(|&v| v == 0.0 || v == 1.0) {
            let chosen = x.iter().map(|&v| v == 1.0).collect();
            Ok(Outcome::integral(profit, x, Candidate::new(chosen, profit)))
        } else {
            Ok(Outcome::bounded(profit, x))
        }
    }

    fn remove_fixings(&mut self) {
        self.applied.pop();
    }
}

/// Branches on the fractional item: the item left out first, then taken.
#[derive(Clone, Copy, Debug, Default)]
pub struct KnapsackBrancher;

impl<I, O> BranchingRule<I, O> for KnapsackBrancher
where
    O: RelaxationOracle<Var = usize, Value = bool, Relaxed = Vec<f64>>,
{
    fn branch(
        &self,
        _instance: &I,
        node: &SearchNode<usize, bool>,
        relaxed: &Vec<f64>,
    ) -> Branches<usize, bool> {
        let mut branches = Branches::new();
        let fractional = relaxed
            .iter()
            .enumerate()
            .find(|&(item, &v)| v > 0.0 && v < 1.0 && !node.fixings().contains(&item));
        if let Some((item, _)) = fractional {
            branches.push(Fixings::single(item, false));
            branches.push(Fixings::single(item, true));
        }
        branches
    }
}

/// Rounds the fractional item down, which always fits.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundDownRepair;

impl<O> RepairHeuristic<KnapsackInstance, O> for RoundDownRepair
where
    O: RelaxationOracle<Var = usize, Value = bool, Relaxed = Vec<f64>, Assignment = Vec<bool>>,
{
    fn repair(
        &self,
        instance: &KnapsackInstance,
        _node: &SearchNode<usize, bool>,
        relaxed: &Vec<f64>,
    ) -> Option<Candidate<Vec<bool>>> {
        let chosen: Vec<bool> = relaxed.iter().map(|&v| v.floor() >= 1.0).collect();
        let profit = instance.profit_of(&chosen);
        Some(Candidate::new(chosen, profit))
    }
}
