//! Multi-threaded branch-and-bound.
//!
//! Workers share one node queue behind a mutex and one incumbent. Each
//! worker evaluates nodes on its own clone of the relaxation oracle, so
//! fixings applied by one worker are never visible to another.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use boundforge_core::{
    BranchingRule, Candidate, Instance, NodeId, RelaxationOracle, RepairHeuristic, Sense,
};
use tracing::debug;

use crate::engine::{builtin_termination, log_progress, Engine};
use crate::incumbent::{Incumbent, SharedIncumbent};
use crate::process::NodeProcessor;
use crate::queue::NodeQueue;
use crate::scope::SearchScope;
use crate::selection::{NodeSelection, SelectionPolicy};
use crate::stats::SearchStats;
use crate::status::{SolverStatus, TerminationReason};
use crate::termination::{NoTermination, Termination};

/// State guarded by the frontier lock.
struct Frontier<'q, V, X, P> {
    queue: &'q mut NodeQueue<V, X, P>,
    stats: &'q mut SearchStats,
    /// Oriented bound of the node each worker is evaluating.
    in_flight: Vec<Option<f64>>,
    /// Oriented bound of the best subtree dropped unsearched.
    lost: Option<f64>,
    reason: Option<TerminationReason>,
}

impl<V: Ord, X, P: SelectionPolicy> Frontier<'_, V, X, P> {
    fn is_exhausted(&self) -> bool {
        self.queue.is_empty() && self.in_flight.iter().all(Option::is_none)
    }

    /// Best bound over queued, in-flight and dropped nodes.
    fn best_bound(&self, sense: Sense) -> Option<f64> {
        let queued = self.queue.best_bound().map(|b| sense.orient(b));
        self.in_flight
            .iter()
            .flatten()
            .copied()
            .chain(queued)
            .chain(self.lost)
            .reduce(f64::max)
            .map(|b| sense.orient(b))
    }

    fn scope(&self, sense: Sense, start_time: Option<Instant>, incumbent: Option<f64>) -> SearchScope {
        let mut scope = SearchScope::new(sense);
        scope.start_time = start_time;
        scope.nodes_explored = self.stats.nodes_explored;
        scope.pending_nodes = self.queue.len();
        scope.best_bound = self.best_bound(sense);
        scope.incumbent = incumbent;
        scope
    }

    fn stop(&mut self, reason: TerminationReason, idle: &Condvar) {
        if self.reason.is_none() {
            self.reason = Some(reason);
        }
        idle.notify_all();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Branch-and-bound engine that evaluates nodes on several threads.
///
/// Built from a configured [`Engine`]; the worker count defaults to the
/// engine's `thread_count` setting. Node order across workers is not
/// deterministic, but the proven optimum is the same as the sequential
/// engine's.
///
/// # Example
///
/// ```
/// use boundforge_config::{EngineConfig, ThreadCount};
/// use boundforge_solver::{Engine, ParallelEngine, SolverStatus};
/// use boundforge_test::knapsack::{KnapsackBrancher, KnapsackInstance, KnapsackOracle};
///
/// let instance = KnapsackInstance::random(16, 42);
/// let config = EngineConfig::new().with_thread_count(ThreadCount::Count(4));
/// let engine = Engine::new(&instance, KnapsackOracle::new(&instance), KnapsackBrancher, config).unwrap();
///
/// let mut parallel = ParallelEngine::new(engine);
/// assert_eq!(parallel.solve(), SolverStatus::Optimal);
/// ```
pub struct ParallelEngine<'a, I, O, B, H = (), P = NodeSelection, T = NoTermination>
where
    O: RelaxationOracle,
{
    engine: Engine<'a, I, O, B, H, P, T>,
    threads: usize,
}

impl<'a, I, O, B, H, P, T> ParallelEngine<'a, I, O, B, H, P, T>
where
    O: RelaxationOracle,
    P: SelectionPolicy,
{
    /// Wraps `engine`, using its configured thread count.
    pub fn new(engine: Engine<'a, I, O, B, H, P, T>) -> Self {
        let threads = engine.config.thread_count.resolve();
        Self { engine, threads }
    }

    /// Overrides the worker count (at least one).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Number of worker threads `solve()` starts.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// The wrapped engine, for inspecting results.
    pub fn engine(&self) -> &Engine<'a, I, O, B, H, P, T> {
        &self.engine
    }

    /// Unwraps the engine.
    pub fn into_engine(self) -> Engine<'a, I, O, B, H, P, T> {
        self.engine
    }

    /// Requests early termination of all workers.
    pub fn terminate_early(&self) {
        self.engine.terminate_early();
    }

    /// Returns the cancellation flag shared by all workers.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.engine.cancel_flag()
    }

    /// Best candidate found, if any.
    pub fn solution(&self) -> Option<&Candidate<O::Assignment>> {
        self.engine.solution()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SolverStatus {
        self.engine.status()
    }

    /// Why the last `solve()` stopped.
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.engine.termination_reason()
    }

    /// Best bound on the optimum known when the search stopped.
    pub fn best_bound(&self) -> Option<f64> {
        self.engine.best_bound()
    }

    /// Search statistics, summed over all workers.
    pub fn stats(&self) -> &SearchStats {
        self.engine.stats()
    }
}

impl<'a, I, O, B, H, P, T> ParallelEngine<'a, I, O, B, H, P, T>
where
    I: Instance + Sync,
    O: RelaxationOracle + Clone + Send,
    O::Var: Send,
    O::Value: Send,
    O::Assignment: Send,
    B: BranchingRule<I, O> + Sync,
    H: RepairHeuristic<I, O> + Sync,
    P: SelectionPolicy,
    T: Termination + Sync,
{
    /// Runs the search on the worker threads until a terminal status.
    ///
    /// If a worker panics the others are stopped and the panic is resumed
    /// on the calling thread.
    pub fn solve(&mut self) -> SolverStatus {
        let threads = self.threads;
        let engine = &mut self.engine;
        if !engine.begin(threads) {
            return engine.status;
        }

        let sense = engine.sense;
        let start_time = engine.stats.start_time();
        let log_frequency = engine.config.log_frequency;
        let limits = builtin_termination(&engine.config, &engine.terminate_early_flag);
        let incumbent = SharedIncumbent::new(std::mem::replace(
            &mut engine.incumbent,
            Incumbent::new(sense),
        ));
        let next_id = AtomicU64::new(1);

        let processor = NodeProcessor {
            instance: engine.instance,
            brancher: &engine.brancher,
            repair: &engine.repair,
            sense,
        };
        let prototype = &engine.oracle;
        let termination = &engine.termination;
        let frontier = Mutex::new(Frontier {
            queue: &mut engine.queue,
            stats: &mut engine.stats,
            in_flight: vec![None; threads],
            lost: None,
            reason: None,
        });
        let idle = Condvar::new();

        std::thread::scope(|s| {
            for worker in 0..threads {
                let mut oracle = prototype.clone();
                let (processor, frontier, idle) = (&processor, &frontier, &idle);
                let (incumbent, limits, next_id) = (&incumbent, &limits, &next_id);

                s.spawn(move || loop {
                    let node = {
                        let mut guard = lock(frontier);
                        loop {
                            if guard.reason.is_some() {
                                return;
                            }
                            if guard.is_exhausted() {
                                guard.stop(TerminationReason::Exhausted, idle);
                                return;
                            }
                            if !guard.queue.is_empty() {
                                let scope = guard.scope(sense, start_time, incumbent.objective());
                                let reason = limits.check(&scope).or_else(|| {
                                    termination
                                        .is_terminated(&scope)
                                        .then_some(TerminationReason::Custom)
                                });
                                if let Some(reason) = reason {
                                    guard.stop(reason, idle);
                                    return;
                                }
                                if let Some(node) = guard.queue.pop() {
                                    guard.in_flight[worker] = Some(
                                        node.estimate()
                                            .map_or(f64::INFINITY, |b| sense.orient(b)),
                                    );
                                    // Counted now so the node limit holds across workers
                                    guard.stats.record_explored(node.depth());
                                    break node;
                                }
                            }
                            guard = idle.wait(guard).unwrap_or_else(PoisonError::into_inner);
                        }
                    };

                    let mut delta = SearchStats::default();
                    let mut store = incumbent;
                    let evaluated = panic::catch_unwind(AssertUnwindSafe(|| {
                        processor.process(&mut oracle, node, &mut store, &mut delta, &mut || {
                            NodeId(next_id.fetch_add(1, Ordering::Relaxed))
                        })
                    }));
                    let evaluation = match evaluated {
                        Ok(evaluation) => evaluation,
                        Err(payload) => {
                            lock(frontier).stop(TerminationReason::Cancelled, idle);
                            panic::resume_unwind(payload);
                        }
                    };

                    let mut guard = lock(frontier);
                    guard.in_flight[worker] = None;
                    // Explored and max_depth were recorded when the node was taken
                    delta.nodes_explored = 0;
                    delta.max_depth = 0;
                    guard.stats.merge(&delta);

                    if let Some(lost) = evaluation.lost.map(|b| sense.orient(b)) {
                        guard.lost = Some(guard.lost.map_or(lost, |l| l.max(lost)));
                    }
                    let best = incumbent.objective();
                    if evaluation.improved {
                        if let Some(value) = best {
                            let pruned = guard.queue.prune_by_bound(value);
                            guard.stats.record_pruned(pruned as u64);
                        }
                    }
                    for child in evaluation.children {
                        // Another worker may have improved the incumbent meanwhile
                        let dominated = match (best, child.estimate()) {
                            (Some(value), Some(bound)) => !sense.is_better(bound, value),
                            _ => false,
                        };
                        if dominated {
                            guard.stats.record_pruned(1);
                        } else {
                            guard.queue.push(child);
                        }
                    }

                    if guard.stats.nodes_explored % log_frequency == 0 {
                        log_progress(&*guard.stats, guard.queue.len(), guard.best_bound(sense), best);
                    }
                    idle.notify_all();
                });
            }
        });

        let (reason, lost) = {
            let frontier = frontier.into_inner().unwrap_or_else(PoisonError::into_inner);
            (frontier.reason, frontier.lost)
        };
        let reason = reason.unwrap_or(TerminationReason::Cancelled);
        engine.lost_bound = lost.map(|b| sense.orient(b));
        engine.incumbent = incumbent.into_inner();
        debug!(event = "workers_joined", threads, next_node_id = next_id.into_inner());

        engine.finish(reason)
    }
}

impl<'a, I, O, B, H, P, T> Engine<'a, I, O, B, H, P, T>
where
    O: RelaxationOracle,
    P: SelectionPolicy,
{
    /// Converts into a [`ParallelEngine`] using the configured thread count.
    pub fn into_parallel(self) -> ParallelEngine<'a, I, O, B, H, P, T> {
        ParallelEngine::new(self)
    }
}
