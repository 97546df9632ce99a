//! Termination conditions for the search loop.
//!
//! A termination inspects a [`SearchScope`] once per iteration and reports
//! why the search should stop, if it should.

mod composite;
mod external;
mod gap;
mod node_count;
mod time;

use std::fmt::Debug;

use crate::scope::SearchScope;
use crate::status::TerminationReason;

pub use composite::{AndTermination, OrTermination};
pub use external::ExternalTermination;
pub use gap::GapTermination;
pub use node_count::NodeCountTermination;
pub use time::TimeTermination;

/// Trait for determining when to stop searching.
pub trait Termination: Send + Debug {
    /// Returns the reason to stop, or `None` to keep going.
    fn check(&self, scope: &SearchScope) -> Option<TerminationReason>;

    /// Returns true if searching should terminate.
    fn is_terminated(&self, scope: &SearchScope) -> bool {
        self.check(scope).is_some()
    }
}

/// Never terminates; the default user termination of an engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTermination;

impl Termination for NoTermination {
    fn check(&self, _scope: &SearchScope) -> Option<TerminationReason> {
        None
    }
}

// An unset limit never fires.
impl<T: Termination> Termination for Option<T> {
    fn check(&self, scope: &SearchScope) -> Option<TerminationReason> {
        self.as_ref().and_then(|t| t.check(scope))
    }
}
