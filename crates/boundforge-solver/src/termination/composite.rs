//! Tuples of terminations combined with OR / AND.
//!
//! Implemented for tuples of up to six members by macro, so a composite is
//! as cheap to check as its members.

use super::Termination;
use crate::scope::SearchScope;
use crate::status::TerminationReason;

/// Stops as soon as any member stops.
///
/// Members are checked left to right and the first reason wins, so tuple
/// order decides which reason is reported when several fire together.
///
/// ```
/// use boundforge_solver::termination::{NodeCountTermination, OrTermination, TimeTermination};
///
/// // Half a minute or ten thousand nodes, whichever comes first
/// let budget = OrTermination((
///     TimeTermination::seconds(30),
///     NodeCountTermination::new(10_000),
/// ));
/// ```
#[derive(Debug)]
pub struct OrTermination<T>(pub T);

impl<T> OrTermination<T> {
    pub fn new(members: T) -> Self {
        Self(members)
    }
}

macro_rules! impl_or_termination {
    ($($idx:tt: $T:ident),+) => {
        impl<$($T: Termination),+> Termination for OrTermination<($($T,)+)> {
            fn check(&self, scope: &SearchScope) -> Option<TerminationReason> {
                None $(.or_else(|| (self.0).$idx.check(scope)))+
            }
        }
    };
}

impl_or_termination!(0: T0);
impl_or_termination!(0: T0, 1: T1);
impl_or_termination!(0: T0, 1: T1, 2: T2);
impl_or_termination!(0: T0, 1: T1, 2: T2, 3: T3);
impl_or_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
impl_or_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5);

/// Stops only once every member stops.
///
/// Reports the reason of the last member.
///
/// ```
/// use boundforge_solver::termination::{AndTermination, NodeCountTermination, TimeTermination};
///
/// // At least 100 nodes and at least 5 seconds
/// let floor = AndTermination((
///     NodeCountTermination::new(100),
///     TimeTermination::seconds(5),
/// ));
/// ```
#[derive(Debug)]
pub struct AndTermination<T>(pub T);

impl<T> AndTermination<T> {
    pub fn new(members: T) -> Self {
        Self(members)
    }
}

macro_rules! impl_and_termination {
    ($($idx:tt: $T:ident),+) => {
        impl<$($T: Termination),+> Termination for AndTermination<($($T,)+)> {
            fn check(&self, scope: &SearchScope) -> Option<TerminationReason> {
                let reasons = [$((self.0).$idx.check(scope)?),+];
                reasons.last().copied()
            }
        }
    };
}

impl_and_termination!(0: T0);
impl_and_termination!(0: T0, 1: T1);
impl_and_termination!(0: T0, 1: T1, 2: T2);
impl_and_termination!(0: T0, 1: T1, 2: T2, 3: T3);
impl_and_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
impl_and_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5);
