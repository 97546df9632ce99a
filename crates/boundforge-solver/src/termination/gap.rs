//! Optimality gap termination.

use super::Termination;
use crate::scope::{relative_gap, SearchScope};
use crate::status::TerminationReason;

/// Terminates once the best open bound is within tolerance of the incumbent.
///
/// Fires when either the absolute gap `|bound - incumbent|` is at most
/// `absolute` or the relative gap is at most `relative`. Never fires without
/// an incumbent or without open nodes.
#[derive(Debug, Clone)]
pub struct GapTermination {
    relative: f64,
    absolute: f64,
}

impl GapTermination {
    pub fn new(relative: f64, absolute: f64) -> Self {
        Self { relative, absolute }
    }
}

impl Termination for GapTermination {
    fn check(&self, scope: &SearchScope) -> Option<TerminationReason> {
        let incumbent = scope.incumbent_value()?;
        let bound = scope.best_bound()?;
        let closed = (bound - incumbent).abs() <= self.absolute
            || relative_gap(incumbent, bound) <= self.relative;
        closed.then_some(TerminationReason::GapClosed)
    }
}
