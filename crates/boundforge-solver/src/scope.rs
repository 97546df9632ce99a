//! Snapshot of the search state handed to termination conditions.

use std::time::{Duration, Instant};

use boundforge_core::Sense;

/// Relative gap between an incumbent and a bound.
///
/// `|incumbent - bound| / max(|incumbent|, 1e-10)`, infinite when either
/// value is infinite.
pub fn relative_gap(incumbent: f64, bound: f64) -> f64 {
    if incumbent.is_infinite() || bound.is_infinite() {
        return f64::INFINITY;
    }
    let denom = incumbent.abs().max(1e-10);
    (incumbent - bound).abs() / denom
}

/// Read-only view of a running search.
///
/// The engine refreshes one scope per iteration before asking its
/// terminations whether to stop.
#[derive(Debug, Clone)]
pub struct SearchScope {
    pub(crate) sense: Sense,
    pub(crate) start_time: Option<Instant>,
    pub(crate) nodes_explored: u64,
    pub(crate) pending_nodes: usize,
    pub(crate) best_bound: Option<f64>,
    pub(crate) incumbent: Option<f64>,
}

impl SearchScope {
    /// Creates a scope for a search that has not started yet.
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            start_time: None,
            nodes_explored: 0,
            pending_nodes: 0,
            best_bound: None,
            incumbent: None,
        }
    }

    /// Marks the start of solving.
    pub fn start_solving(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Optimization direction of the instance.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Time since solving started, if it has.
    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|t| t.elapsed())
    }

    /// Nodes taken off the queue so far.
    pub fn nodes_explored(&self) -> u64 {
        self.nodes_explored
    }

    /// Nodes waiting in the queue.
    pub fn pending_nodes(&self) -> usize {
        self.pending_nodes
    }

    /// Most favorable bound of any node not yet resolved.
    pub fn best_bound(&self) -> Option<f64> {
        self.best_bound
    }

    /// Objective value of the incumbent.
    pub fn incumbent_value(&self) -> Option<f64> {
        self.incumbent
    }

    /// Relative gap between the incumbent and the best open bound.
    pub fn gap(&self) -> Option<f64> {
        Some(relative_gap(self.incumbent?, self.best_bound?))
    }
}
