//! Engine lifecycle status.

use std::fmt;

/// Where an engine is in its lifecycle.
///
/// `Initialized -> Running -> {Optimal, Feasible, Infeasible, LimitReached}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    /// Built but not yet solved.
    Initialized,
    /// `solve()` is in progress.
    Running,
    /// The incumbent is proven optimal (within the configured gap).
    Optimal,
    /// The tree was exhausted with an incumbent, but some nodes were dropped
    /// after backend failures, so optimality is not proven.
    Feasible,
    /// The tree was exhausted without finding a feasible solution.
    Infeasible,
    /// A limit, a cancellation or a user termination stopped the search.
    LimitReached,
}

impl SolverStatus {
    /// Returns true once `solve()` has finished.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SolverStatus::Initialized | SolverStatus::Running)
    }

    /// Returns true for statuses that always carry an incumbent.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    pub(crate) fn from_reason(
        reason: TerminationReason,
        has_incumbent: bool,
        proven: bool,
    ) -> Self {
        match reason {
            TerminationReason::Exhausted => match (has_incumbent, proven) {
                (false, _) => SolverStatus::Infeasible,
                (true, true) => SolverStatus::Optimal,
                (true, false) => SolverStatus::Feasible,
            },
            TerminationReason::GapClosed if proven => SolverStatus::Optimal,
            TerminationReason::GapClosed => SolverStatus::Feasible,
            TerminationReason::Cancelled
            | TerminationReason::NodeLimit
            | TerminationReason::TimeLimit
            | TerminationReason::Custom => SolverStatus::LimitReached,
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverStatus::Initialized => write!(f, "Initialized"),
            SolverStatus::Running => write!(f, "Running"),
            SolverStatus::Optimal => write!(f, "Optimal"),
            SolverStatus::Feasible => write!(f, "Feasible"),
            SolverStatus::Infeasible => write!(f, "Infeasible"),
            SolverStatus::LimitReached => write!(f, "LimitReached"),
        }
    }
}

/// Why the main loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// No pending node was left.
    Exhausted,
    /// The gap between the best pending bound and the incumbent closed.
    GapClosed,
    /// The explored-node cap was hit.
    NodeLimit,
    /// The wall-clock limit was hit.
    TimeLimit,
    /// Cancellation was requested from outside.
    Cancelled,
    /// A user-supplied termination fired.
    Custom,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Exhausted => write!(f, "Exhausted"),
            TerminationReason::GapClosed => write!(f, "GapClosed"),
            TerminationReason::NodeLimit => write!(f, "NodeLimit"),
            TerminationReason::TimeLimit => write!(f, "TimeLimit"),
            TerminationReason::Cancelled => write!(f, "Cancelled"),
            TerminationReason::Custom => write!(f, "Custom"),
        }
    }
}
