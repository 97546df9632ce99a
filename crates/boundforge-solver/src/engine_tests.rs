//! Tests for the sequential engine.

use std::time::Duration;

use boundforge_config::{EngineConfig, NodeSelection};
use boundforge_core::{BackendError, BoundForgeError, Branches, Candidate, Fixings, Outcome};
use boundforge_test::knapsack::{
    KnapsackBrancher, KnapsackInstance, KnapsackOracle, RoundDownRepair,
};

use super::*;
use crate::selection::NodeInfo;
use crate::termination::NodeCountTermination;

fn small() -> KnapsackInstance {
    KnapsackInstance::new(vec![3.0, 4.0, 5.0, 6.0], vec![2.0, 3.0, 4.0, 5.0], 5.0)
}

fn fractional() -> KnapsackInstance {
    KnapsackInstance::new(vec![3.0, 4.0, 5.0, 6.0], vec![2.0, 3.0, 4.0, 5.0], 6.0)
}

fn engine(
    instance: &KnapsackInstance,
    config: EngineConfig,
) -> Engine<'_, KnapsackInstance, KnapsackOracle<'_>, KnapsackBrancher> {
    Engine::new(instance, KnapsackOracle::new(instance), KnapsackBrancher, config).unwrap()
}

#[test]
fn test_small_knapsack_is_optimal() {
    let instance = small();
    let mut engine = engine(&instance, EngineConfig::default());

    assert_eq!(engine.status(), SolverStatus::Initialized);
    assert_eq!(engine.solve(), SolverStatus::Optimal);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::Exhausted));

    let solution = engine.solution().unwrap();
    assert_eq!(solution.objective_value, 7.0);
    assert_eq!(solution.assignment, vec![true, true, false, false]);
    assert_eq!(engine.best_bound(), Some(7.0));
}

#[test]
fn test_every_policy_finds_the_optimum() {
    let instance = fractional();
    for policy in [
        NodeSelection::BestBound,
        NodeSelection::DepthFirst,
        NodeSelection::BreadthFirst,
    ] {
        let config = EngineConfig::new().with_selection_policy(policy);
        let mut engine = engine(&instance, config).with_repair(RoundDownRepair);

        assert_eq!(engine.solve(), SolverStatus::Optimal, "{policy}");
        assert_eq!(engine.solution().unwrap().objective_value, 8.0, "{policy}");
        assert_eq!(engine.pending_nodes(), 0);
        assert!(engine.stats().is_complete());
    }
}

#[test]
fn test_incumbent_history_is_monotonic() {
    let instance = KnapsackInstance::random(14, 7);
    let mut engine = engine(&instance, EngineConfig::default()).with_repair(RoundDownRepair);
    engine.solve();

    let history = engine.incumbent_history();
    assert!(!history.is_empty());
    assert!(history.windows(2).all(|w| w[1] > w[0]));
    assert_eq!(history.last().copied(), engine.solution().map(|c| c.objective_value));
    assert_eq!(engine.stats().incumbent_updates, history.len() as u64);
}

#[test]
fn test_zero_node_limit_stops_before_root() {
    let instance = small();
    let mut engine = engine(&instance, EngineConfig::new().with_max_nodes(0));

    assert_eq!(engine.solve(), SolverStatus::LimitReached);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::NodeLimit));
    assert!(engine.solution().is_none());
    assert_eq!(engine.stats().nodes_explored, 0);
    assert_eq!(engine.pending_nodes(), 1);
    assert_eq!(engine.best_bound(), Some(f64::INFINITY));
}

#[test]
fn test_node_limit_keeps_best_incumbent() {
    // Depth-first: the root branches on item 2, the x2 = 1 child is integral
    // at 8 and the x2 = 0 child stays pending with the root bound.
    let instance = fractional();
    let mut engine = engine(&instance, EngineConfig::new().with_max_nodes(2));

    assert_eq!(engine.solve(), SolverStatus::LimitReached);
    assert_eq!(engine.stats().nodes_explored, 2);
    assert_eq!(engine.solution().unwrap().objective_value, 8.0);
    assert_eq!(engine.pending_nodes(), 1);
    assert_eq!(engine.best_bound(), Some(8.25));
}

#[test]
fn test_cancel_before_solve() {
    let instance = small();
    let mut engine = engine(&instance, EngineConfig::default());
    engine.terminate_early();

    assert_eq!(engine.solve(), SolverStatus::LimitReached);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::Cancelled));
    assert_eq!(engine.stats().nodes_explored, 0);
}

#[test]
fn test_zero_time_limit() {
    let instance = small();
    let config = EngineConfig::new().with_time_limit(Duration::ZERO);
    let mut engine = engine(&instance, config);

    assert_eq!(engine.solve(), SolverStatus::LimitReached);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::TimeLimit));
}

#[test]
fn test_user_termination() {
    let instance = fractional();
    let mut engine =
        engine(&instance, EngineConfig::default()).with_termination(NodeCountTermination::new(3));

    assert_eq!(engine.solve(), SolverStatus::LimitReached);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::Custom));
    assert_eq!(engine.stats().nodes_explored, 3);
}

#[test]
fn test_gap_tolerance_closes_early() {
    let instance = KnapsackInstance::random(18, 5);
    let config = EngineConfig::new()
        .with_selection_policy(NodeSelection::BestBound)
        .with_optimality_tolerance(0.5);
    let mut engine = engine(&instance, config).with_repair(RoundDownRepair);

    assert_eq!(engine.solve(), SolverStatus::Optimal);
    let objective = engine.solution().unwrap().objective_value;
    let bound = engine.best_bound().unwrap();
    assert!(bound >= objective);
    assert!(relative_gap(objective, bound) <= 0.5);
}

#[test]
fn test_solve_twice_keeps_first_result() {
    let instance = small();
    let mut engine = engine(&instance, EngineConfig::default());
    engine.solve();
    let explored = engine.stats().nodes_explored;

    assert_eq!(engine.solve(), SolverStatus::Optimal);
    assert_eq!(engine.stats().nodes_explored, explored);
}

#[test]
fn test_invalid_config_is_rejected() {
    let instance = small();
    let config = EngineConfig::new().with_log_frequency(0);
    let result = Engine::new(&instance, KnapsackOracle::new(&instance), KnapsackBrancher, config);

    assert!(matches!(result, Err(BoundForgeError::Config(_))));
}

#[test]
fn test_invalid_instance_is_rejected() {
    let instance = KnapsackInstance::new(vec![1.0, 2.0], vec![1.0], 3.0);
    let result = Engine::new(
        &instance,
        KnapsackOracle::new(&instance),
        KnapsackBrancher,
        EngineConfig::default(),
    );

    assert!(matches!(result, Err(BoundForgeError::InvalidInstance(_))));
}

#[test]
fn test_incumbent_sender_streams_improvements() {
    let instance = KnapsackInstance::random(12, 1);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut engine = engine(&instance, EngineConfig::default())
        .with_repair(RoundDownRepair)
        .with_incumbent_sender(tx);
    engine.solve();

    let mut streamed = Vec::new();
    while let Ok(candidate) = rx.try_recv() {
        streamed.push(candidate.objective_value);
    }
    assert_eq!(streamed, engine.incumbent_history());
}

#[test]
fn test_custom_selection_policy() {
    /// Explores the shallowest node first, newest first among equals.
    #[derive(Debug)]
    struct Shallow;

    impl SelectionPolicy for Shallow {
        fn priority(&self, info: &NodeInfo) -> f64 {
            -(info.depth as f64) * 1e9 + info.sequence as f64
        }
    }

    let instance = fractional();
    let mut engine = engine(&instance, EngineConfig::default()).with_selection_policy(Shallow);

    assert_eq!(engine.solve(), SolverStatus::Optimal);
    assert_eq!(engine.solution().unwrap().objective_value, 8.0);
}

/// Oracle over three binary variables where every relaxation is infeasible.
#[derive(Debug, Default)]
struct NeverFeasible;

impl RelaxationOracle for NeverFeasible {
    type Var = usize;
    type Value = bool;
    type Relaxed = ();
    type Assignment = ();

    fn apply_fixings(&mut self, _: &Fixings<usize, bool>) -> std::result::Result<(), BackendError> {
        Ok(())
    }

    fn solve(&mut self) -> std::result::Result<Outcome<(), ()>, BackendError> {
        Ok(Outcome::Infeasible)
    }

    fn remove_fixings(&mut self) {}
}

#[derive(Debug)]
struct Minimize;

impl Instance for Minimize {
    fn sense(&self) -> Sense {
        Sense::Minimize
    }
}

fn no_branches(_: &Minimize, _: &SearchNode<usize, bool>, _: &()) -> Branches<usize, bool> {
    Branches::new()
}

#[test]
fn test_infeasible_instance() {
    let mut engine =
        Engine::new(&Minimize, NeverFeasible, no_branches, EngineConfig::default()).unwrap();

    assert_eq!(engine.solve(), SolverStatus::Infeasible);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::Exhausted));
    assert!(engine.solution().is_none());
    assert_eq!(engine.best_bound(), None);
    assert_eq!(engine.stats().nodes_infeasible, 1);
}

/// Fails on every node that fixes variable 0 to true.
#[derive(Debug, Default, Clone)]
struct Flaky {
    fixings: Vec<Fixings<usize, bool>>,
}

impl RelaxationOracle for Flaky {
    type Var = usize;
    type Value = bool;
    type Relaxed = ();
    type Assignment = usize;

    fn apply_fixings(&mut self, fixings: &Fixings<usize, bool>) -> std::result::Result<(), BackendError> {
        self.fixings.push(fixings.clone());
        Ok(())
    }

    fn solve(&mut self) -> std::result::Result<Outcome<(), usize>, BackendError> {
        let Some(fixings) = self.fixings.last() else {
            return Err(BackendError::Other("no fixings applied".into()));
        };
        match fixings.get(&0) {
            None => Ok(Outcome::bounded(0.0, ())),
            Some(true) => Err(BackendError::Numerical("singular basis".into())),
            Some(false) => Ok(Outcome::integral(2.0, (), Candidate::new(0, 2.0))),
        }
    }

    fn remove_fixings(&mut self) {
        self.fixings.pop();
    }
}

fn branch_on_zero(_: &Minimize, node: &SearchNode<usize, bool>, _: &()) -> Branches<usize, bool> {
    if node.fixings().contains(&0) {
        return Branches::new();
    }
    let mut branches = Branches::new();
    branches.push(Fixings::single(0, false));
    branches.push(Fixings::single(0, true));
    branches
}

#[test]
fn test_backend_failure_is_absorbed() {
    let mut engine =
        Engine::new(&Minimize, Flaky::default(), branch_on_zero, EngineConfig::default()).unwrap();

    assert_eq!(engine.solve(), SolverStatus::Feasible);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::Exhausted));
    assert_eq!(engine.solution().unwrap().objective_value, 2.0);
    assert_eq!(engine.stats().backend_failures, 1);
    assert!(engine.oracle().fixings.is_empty());
    // The failed child could still hold anything down to the root bound
    assert_eq!(engine.best_bound(), Some(0.0));
}

#[test]
fn test_parallel_keeps_bound_of_failed_subtree() {
    let engine =
        Engine::new(&Minimize, Flaky::default(), branch_on_zero, EngineConfig::default()).unwrap();
    let mut parallel = engine.into_parallel().with_threads(2);

    assert_eq!(parallel.solve(), SolverStatus::Feasible);
    assert_eq!(parallel.solution().unwrap().objective_value, 2.0);
    assert_eq!(parallel.best_bound(), Some(0.0));
}

/// Three-way split on variable 0: value 0 is integral at 2, value 1 fails,
/// value 2 bounds just under 2 and splits on variable 1 into infeasible
/// leaves.
#[derive(Debug, Default)]
struct ThreeWay {
    fixings: Vec<Fixings<usize, u8>>,
}

impl RelaxationOracle for ThreeWay {
    type Var = usize;
    type Value = u8;
    type Relaxed = ();
    type Assignment = u8;

    fn apply_fixings(&mut self, fixings: &Fixings<usize, u8>) -> std::result::Result<(), BackendError> {
        self.fixings.push(fixings.clone());
        Ok(())
    }

    fn solve(&mut self) -> std::result::Result<Outcome<(), u8>, BackendError> {
        let Some(fixings) = self.fixings.last() else {
            return Err(BackendError::Other("no fixings applied".into()));
        };
        match (fixings.get(&0), fixings.get(&1)) {
            (None, _) => Ok(Outcome::bounded(0.0, ())),
            (Some(0), _) => Ok(Outcome::integral(2.0, (), Candidate::new(0, 2.0))),
            (Some(1), _) => Err(BackendError::Numerical("singular basis".into())),
            (Some(_), None) => Ok(Outcome::bounded(1.999_999_9, ())),
            (Some(_), Some(_)) => Ok(Outcome::Infeasible),
        }
    }

    fn remove_fixings(&mut self) {
        self.fixings.pop();
    }
}

fn three_way(_: &Minimize, node: &SearchNode<usize, u8>, _: &()) -> Branches<usize, u8> {
    let mut branches = Branches::new();
    match node.fixings().get(&0) {
        None => {
            for value in [1, 0, 2] {
                branches.push(Fixings::single(0, value));
            }
        }
        Some(2) if !node.fixings().contains(&1) => {
            branches.push(Fixings::single(1, 0));
            branches.push(Fixings::single(1, 1));
        }
        Some(_) => {}
    }
    branches
}

#[test]
fn test_failed_subtree_keeps_gap_open() {
    let config = EngineConfig::new().with_selection_policy(NodeSelection::BreadthFirst);
    let mut engine = Engine::new(&Minimize, ThreeWay::default(), three_way, config).unwrap();

    // Queued bounds of 1.9999999 alone would close the gap against 2
    assert_eq!(engine.solve(), SolverStatus::Feasible);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::Exhausted));
    assert_eq!(engine.solution().unwrap().objective_value, 2.0);
    assert_eq!(engine.best_bound(), Some(0.0));
    assert_eq!(engine.stats().backend_failures, 1);
    assert_eq!(engine.stats().nodes_infeasible, 2);
}

#[test]
fn test_gap_closed_after_failure_is_not_optimal() {
    let config = EngineConfig::new()
        .with_selection_policy(NodeSelection::BreadthFirst)
        .with_absolute_tolerance(5.0);
    let mut engine = Engine::new(&Minimize, ThreeWay::default(), three_way, config).unwrap();

    assert_eq!(engine.solve(), SolverStatus::Feasible);
    assert_eq!(engine.termination_reason(), Some(TerminationReason::GapClosed));
    assert_eq!(engine.best_bound(), Some(0.0));
    assert!(!engine.stats().is_complete());
}
