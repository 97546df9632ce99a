//! Sequential branch-and-bound engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use boundforge_config::EngineConfig;
use boundforge_core::{
    BranchingRule, Candidate, Instance, NodeId, RelaxationOracle, RepairHeuristic, Result,
    SearchNode, Sense,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::incumbent::Incumbent;
use crate::process::NodeProcessor;
use crate::queue::NodeQueue;
use crate::scope::{relative_gap, SearchScope};
use crate::selection::{NodeSelection, SelectionPolicy};
use crate::stats::SearchStats;
use crate::status::{SolverStatus, TerminationReason};
use crate::termination::{
    ExternalTermination, GapTermination, NoTermination, NodeCountTermination, OrTermination,
    Termination, TimeTermination,
};

/// Limits every engine checks, in priority order.
pub(crate) type BuiltinTermination = OrTermination<(
    ExternalTermination,
    Option<NodeCountTermination>,
    Option<TimeTermination>,
    GapTermination,
)>;

pub(crate) fn builtin_termination(
    config: &EngineConfig,
    cancel: &Arc<AtomicBool>,
) -> BuiltinTermination {
    OrTermination((
        ExternalTermination::new(cancel.clone()),
        config.max_nodes().map(NodeCountTermination::new),
        config.time_limit().map(TimeTermination::new),
        GapTermination::new(config.optimality_tolerance, config.absolute_tolerance),
    ))
}

pub(crate) fn log_progress(
    stats: &SearchStats,
    open: usize,
    best_bound: Option<f64>,
    incumbent: Option<f64>,
) {
    let gap = match (incumbent, best_bound) {
        (Some(inc), Some(bound)) => relative_gap(inc, bound),
        (Some(_), None) => 0.0,
        _ => f64::INFINITY,
    };
    info!(
        event = "progress",
        nodes = stats.nodes_explored,
        open = open as u64,
        best_bound,
        incumbent,
        gap_pct = gap * 100.0,
        pruned = stats.nodes_pruned,
        elapsed_ms = stats.elapsed().as_millis() as u64,
        nodes_per_sec = stats.nodes_per_second() as u64,
    );
}

/// Sequential branch-and-bound engine.
///
/// Owns the relaxation oracle, the node queue and the incumbent for one
/// search over one instance.
///
/// # Type Parameters
/// * `I` - The problem instance
/// * `O` - The relaxation oracle
/// * `B` - The branching rule
/// * `H` - The repair heuristic (`()` for none)
/// * `P` - The node selection policy
/// * `T` - An extra user termination
///
/// # Example
///
/// ```
/// use boundforge_config::EngineConfig;
/// use boundforge_solver::{Engine, SolverStatus};
/// use boundforge_test::knapsack::{KnapsackBrancher, KnapsackInstance, KnapsackOracle, RoundDownRepair};
///
/// let instance = KnapsackInstance::new(vec![3.0, 4.0, 5.0, 6.0], vec![2.0, 3.0, 4.0, 5.0], 5.0);
/// let mut engine = Engine::new(
///     &instance,
///     KnapsackOracle::new(&instance),
///     KnapsackBrancher,
///     EngineConfig::default(),
/// )
/// .unwrap()
/// .with_repair(RoundDownRepair);
///
/// assert_eq!(engine.solve(), SolverStatus::Optimal);
/// assert_eq!(engine.solution().unwrap().objective_value, 7.0);
/// ```
pub struct Engine<'a, I, O, B, H = (), P = NodeSelection, T = NoTermination>
where
    O: RelaxationOracle,
{
    pub(crate) instance: &'a I,
    pub(crate) oracle: O,
    pub(crate) brancher: B,
    pub(crate) repair: H,
    pub(crate) config: EngineConfig,
    pub(crate) sense: Sense,
    pub(crate) queue: NodeQueue<O::Var, O::Value, P>,
    pub(crate) termination: T,
    pub(crate) incumbent: Incumbent<O::Assignment>,
    pub(crate) status: SolverStatus,
    pub(crate) reason: Option<TerminationReason>,
    pub(crate) best_bound: Option<f64>,
    /// Most favorable bound of any subtree dropped unsearched.
    pub(crate) lost_bound: Option<f64>,
    pub(crate) stats: SearchStats,
    pub(crate) terminate_early_flag: Arc<AtomicBool>,
}

impl<'a, I, O, B> Engine<'a, I, O, B>
where
    I: Instance,
    O: RelaxationOracle,
    B: BranchingRule<I, O>,
{
    /// Creates an engine after validating `config` and `instance`.
    ///
    /// # Errors
    ///
    /// Returns [`BoundForgeError::Config`](boundforge_core::BoundForgeError::Config)
    /// for an invalid configuration and whatever `instance.validate()`
    /// reports for a malformed instance.
    pub fn new(instance: &'a I, oracle: O, brancher: B, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        instance.validate()?;

        let sense = instance.sense();
        Ok(Self {
            instance,
            oracle,
            brancher,
            repair: (),
            sense,
            queue: NodeQueue::new(sense, config.selection_policy),
            config,
            termination: NoTermination,
            incumbent: Incumbent::new(sense),
            status: SolverStatus::Initialized,
            reason: None,
            best_bound: None,
            lost_bound: None,
            stats: SearchStats::default(),
            terminate_early_flag: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl<'a, I, O, B, H, P, T> Engine<'a, I, O, B, H, P, T>
where
    O: RelaxationOracle,
    P: SelectionPolicy,
{
    /// Sets the repair heuristic.
    pub fn with_repair<H2>(self, repair: H2) -> Engine<'a, I, O, B, H2, P, T> {
        Engine {
            instance: self.instance,
            oracle: self.oracle,
            brancher: self.brancher,
            repair,
            config: self.config,
            sense: self.sense,
            queue: self.queue,
            termination: self.termination,
            incumbent: self.incumbent,
            status: self.status,
            reason: self.reason,
            best_bound: self.best_bound,
            lost_bound: self.lost_bound,
            stats: self.stats,
            terminate_early_flag: self.terminate_early_flag,
        }
    }

    /// Replaces the configured node selection with a custom policy.
    pub fn with_selection_policy<P2: SelectionPolicy>(
        self,
        policy: P2,
    ) -> Engine<'a, I, O, B, H, P2, T> {
        Engine {
            instance: self.instance,
            oracle: self.oracle,
            brancher: self.brancher,
            repair: self.repair,
            config: self.config,
            sense: self.sense,
            queue: self.queue.into_policy(policy),
            termination: self.termination,
            incumbent: self.incumbent,
            status: self.status,
            reason: self.reason,
            best_bound: self.best_bound,
            lost_bound: self.lost_bound,
            stats: self.stats,
            terminate_early_flag: self.terminate_early_flag,
        }
    }

    /// Adds a user termination, checked after the built-in limits.
    ///
    /// When it fires the search stops with [`SolverStatus::LimitReached`]
    /// and [`TerminationReason::Custom`].
    pub fn with_termination<T2: Termination>(self, termination: T2) -> Engine<'a, I, O, B, H, P, T2> {
        Engine {
            instance: self.instance,
            oracle: self.oracle,
            brancher: self.brancher,
            repair: self.repair,
            config: self.config,
            sense: self.sense,
            queue: self.queue,
            termination,
            incumbent: self.incumbent,
            status: self.status,
            reason: self.reason,
            best_bound: self.best_bound,
            lost_bound: self.lost_bound,
            stats: self.stats,
            terminate_early_flag: self.terminate_early_flag,
        }
    }

    /// Streams every improving candidate through `sender`.
    pub fn with_incumbent_sender(mut self, sender: UnboundedSender<Candidate<O::Assignment>>) -> Self {
        self.incumbent.set_sender(sender);
        self
    }

    /// Requests early termination; takes effect at the next iteration.
    ///
    /// Requesting before `solve()` makes it stop before the root is bounded.
    pub fn terminate_early(&self) {
        self.terminate_early_flag.store(true, Ordering::SeqCst);
    }

    /// Returns the cancellation flag, for setting from another thread.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.terminate_early_flag.clone()
    }

    /// Best candidate found, if any.
    pub fn solution(&self) -> Option<&Candidate<O::Assignment>> {
        self.incumbent.best()
    }

    /// Consumes the engine, returning the best candidate found.
    pub fn into_solution(mut self) -> Option<Candidate<O::Assignment>> {
        self.incumbent.take()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SolverStatus {
        self.status
    }

    /// Why the last `solve()` stopped.
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.reason
    }

    /// Best bound on the optimum known when the search stopped.
    ///
    /// Covers pending nodes and any subtree dropped after a relaxation
    /// failure. Equals the incumbent value once optimality is proven; `None`
    /// before solving and for infeasible instances.
    pub fn best_bound(&self) -> Option<f64> {
        self.best_bound
    }

    /// Search statistics.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Objective values of every accepted incumbent, in order.
    pub fn incumbent_history(&self) -> &[f64] {
        self.incumbent.history()
    }

    /// Nodes still pending (non-zero only after a limit stopped the search).
    pub fn pending_nodes(&self) -> usize {
        self.queue.len()
    }

    /// The relaxation oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The problem instance.
    pub fn instance(&self) -> &'a I {
        self.instance
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Optimization direction of the instance.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Marks the start of a search. Returns false if the engine already ran.
    pub(crate) fn begin(&mut self, threads: usize) -> bool {
        if self.status != SolverStatus::Initialized {
            warn!(
                event = "solve_repeated",
                status = %self.status,
                "Engine has already solved; keeping the previous result"
            );
            return false;
        }

        self.status = SolverStatus::Running;
        self.stats.start();
        self.queue.push(SearchNode::root());

        info!(
            event = "solve_start",
            sense = %self.sense,
            selection = self.queue.policy().name(),
            threads = threads as u64,
            max_nodes = self.config.max_nodes(),
            time_limit_ms = self.config.time_limit().map(|d: Duration| d.as_millis() as u64),
        );
        true
    }

    fn merge_bounds(&self, a: Option<f64>, b: Option<f64>) -> Option<f64> {
        match (a, b) {
            (Some(a), Some(b)) => Some(self.sense.best_of(a, b)),
            (a, b) => a.or(b),
        }
    }

    /// Best bound over queued nodes and dropped subtrees.
    pub(crate) fn open_bound(&self) -> Option<f64> {
        self.merge_bounds(self.queue.best_bound(), self.lost_bound)
    }

    /// Records the terminal status for `reason`.
    pub(crate) fn finish(&mut self, reason: TerminationReason) -> SolverStatus {
        self.stats.stop();
        self.reason = Some(reason);
        self.status = SolverStatus::from_reason(
            reason,
            self.incumbent.has_incumbent(),
            self.stats.is_complete(),
        );
        self.best_bound = self.merge_bounds(self.open_bound(), self.incumbent.objective());

        info!(
            event = "solve_end",
            status = %self.status,
            reason = %reason,
            nodes = self.stats.nodes_explored,
            pruned = self.stats.nodes_pruned,
            infeasible = self.stats.nodes_infeasible,
            backend_failures = self.stats.backend_failures,
            incumbent_updates = self.stats.incumbent_updates,
            objective = self.incumbent.objective(),
            best_bound = self.best_bound,
            open = self.queue.len() as u64,
            elapsed_ms = self.stats.elapsed().as_millis() as u64,
        );
        self.status
    }
}

impl<'a, I, O, B, H, P, T> Engine<'a, I, O, B, H, P, T>
where
    I: Instance,
    O: RelaxationOracle,
    B: BranchingRule<I, O>,
    H: RepairHeuristic<I, O>,
    P: SelectionPolicy,
    T: Termination,
{
    /// Runs the search to a terminal status.
    ///
    /// An engine solves once; later calls return the status of the first
    /// run.
    pub fn solve(&mut self) -> SolverStatus {
        if !self.begin(1) {
            return self.status;
        }

        let limits = builtin_termination(&self.config, &self.terminate_early_flag);
        let mut scope = SearchScope::new(self.sense);
        scope.start_time = self.stats.start_time();

        let processor = NodeProcessor {
            instance: self.instance,
            brancher: &self.brancher,
            repair: &self.repair,
            sense: self.sense,
        };
        let log_frequency = self.config.log_frequency;
        let mut next_id = 1;

        let reason = loop {
            if self.queue.is_empty() {
                break TerminationReason::Exhausted;
            }

            scope.nodes_explored = self.stats.nodes_explored;
            scope.pending_nodes = self.queue.len();
            scope.best_bound = self.open_bound();
            scope.incumbent = self.incumbent.objective();
            if let Some(reason) = limits.check(&scope) {
                break reason;
            }
            if self.termination.is_terminated(&scope) {
                break TerminationReason::Custom;
            }

            let Some(node) = self.queue.pop() else {
                break TerminationReason::Exhausted;
            };
            let evaluation = processor.process(
                &mut self.oracle,
                node,
                &mut self.incumbent,
                &mut self.stats,
                &mut || {
                    let id = NodeId(next_id);
                    next_id += 1;
                    id
                },
            );

            if evaluation.improved {
                if let Some(incumbent) = self.incumbent.objective() {
                    let pruned = self.queue.prune_by_bound(incumbent);
                    self.stats.record_pruned(pruned as u64);
                }
            }
            if let Some(lost) = evaluation.lost {
                self.lost_bound = self.merge_bounds(self.lost_bound, Some(lost));
            }
            for child in evaluation.children {
                self.queue.push(child);
            }

            if self.stats.nodes_explored % log_frequency == 0 {
                log_progress(
                    &self.stats,
                    self.queue.len(),
                    self.open_bound(),
                    self.incumbent.objective(),
                );
            }
        };

        self.finish(reason)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
