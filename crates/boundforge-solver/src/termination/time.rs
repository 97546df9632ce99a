//! Wall-clock limit.

use std::time::Duration;

use super::Termination;
use crate::scope::SearchScope;
use crate::status::TerminationReason;

/// Stops the search once it has run for `limit`.
///
/// The clock starts when `solve()` pushes the root. A zero limit stops
/// before the root is bounded.
///
/// ```
/// use std::time::Duration;
/// use boundforge_solver::termination::TimeTermination;
///
/// let budget = TimeTermination::millis(1500);
/// assert_eq!(budget.limit(), Duration::from_millis(1500));
/// assert_eq!(budget.remaining(Duration::from_secs(1)), Duration::from_millis(500));
/// assert_eq!(budget.remaining(Duration::from_secs(2)), Duration::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// The configured budget.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Budget left after `elapsed`, saturating at zero.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.limit.saturating_sub(elapsed)
    }
}

impl Termination for TimeTermination {
    fn check(&self, scope: &SearchScope) -> Option<TerminationReason> {
        let elapsed = scope.elapsed()?;
        self.remaining(elapsed)
            .is_zero()
            .then_some(TerminationReason::TimeLimit)
    }
}
