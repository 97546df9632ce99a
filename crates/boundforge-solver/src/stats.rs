//! Search statistics.
//!
//! Plain counters owned by the engine and updated once per node.

use std::time::{Duration, Instant};

/// Counters collected during a search.
///
/// # Example
///
/// ```
/// use boundforge_solver::stats::SearchStats;
///
/// let mut stats = SearchStats::default();
/// stats.start();
/// stats.record_explored(0);
/// stats.record_explored(1);
/// stats.record_pruned(1);
/// stats.record_infeasible();
///
/// assert_eq!(stats.nodes_explored, 2);
/// assert_eq!(stats.max_depth, 1);
/// assert_eq!(stats.nodes_pruned, 1);
/// assert_eq!(stats.nodes_infeasible, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    /// Nodes taken off the queue and bounded.
    pub nodes_explored: u64,
    /// Nodes discarded because their bound could not beat the incumbent.
    pub nodes_pruned: u64,
    /// Nodes whose relaxation was infeasible.
    pub nodes_infeasible: u64,
    /// Nodes dropped after the oracle failed.
    pub backend_failures: u64,
    /// Branches the engine refused to turn into children.
    pub branches_rejected: u64,
    /// Times the incumbent improved.
    pub incumbent_updates: u64,
    /// Deepest node explored.
    pub max_depth: usize,
}

impl SearchStats {
    /// Marks the start of solving.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.end_time = None;
    }

    /// Marks the end of solving; `elapsed()` is frozen from here on.
    pub fn stop(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Returns the elapsed time since solving started.
    pub fn elapsed(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub(crate) fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    /// Records a node taken off the queue.
    pub fn record_explored(&mut self, depth: usize) {
        self.nodes_explored += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Records `count` pruned nodes.
    pub fn record_pruned(&mut self, count: u64) {
        self.nodes_pruned += count;
    }

    /// Records an infeasible relaxation.
    pub fn record_infeasible(&mut self) {
        self.nodes_infeasible += 1;
    }

    /// Records a node dropped after an oracle failure.
    pub fn record_backend_failure(&mut self) {
        self.backend_failures += 1;
    }

    /// Records a rejected branch.
    pub fn record_branch_rejected(&mut self) {
        self.branches_rejected += 1;
    }

    /// Records an incumbent improvement.
    pub fn record_incumbent_update(&mut self) {
        self.incumbent_updates += 1;
    }

    /// Adds the counters of `other`; timing is left untouched.
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes_explored += other.nodes_explored;
        self.nodes_pruned += other.nodes_pruned;
        self.nodes_infeasible += other.nodes_infeasible;
        self.backend_failures += other.backend_failures;
        self.branches_rejected += other.branches_rejected;
        self.incumbent_updates += other.incumbent_updates;
        self.max_depth = self.max_depth.max(other.max_depth);
    }

    /// True when no part of the tree was lost to a failure, so an exhausted
    /// search proves its incumbent optimal.
    pub fn is_complete(&self) -> bool {
        self.backend_failures == 0 && self.branches_rejected == 0
    }

    /// Returns the explored nodes per second rate.
    pub fn nodes_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.nodes_explored as f64 / secs
        } else {
            0.0
        }
    }
}
