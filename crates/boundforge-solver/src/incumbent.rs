//! Incumbent tracking.
//!
//! The incumbent is the best feasible candidate found so far. It only ever
//! improves: an offer is accepted when there is no incumbent yet or when it
//! is strictly better under the instance's sense.

use std::sync::{Mutex, MutexGuard, PoisonError};

use boundforge_core::{Candidate, Sense};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Best known feasible candidate plus its improvement history.
///
/// # Example
///
/// ```
/// use boundforge_core::{Candidate, Sense};
/// use boundforge_solver::Incumbent;
///
/// let mut incumbent = Incumbent::new(Sense::Minimize);
/// assert!(incumbent.offer(Candidate::new("a", 9.0)));
/// assert!(!incumbent.offer(Candidate::new("b", 9.0)));
/// assert!(incumbent.offer(Candidate::new("c", 4.0)));
///
/// assert_eq!(incumbent.objective(), Some(4.0));
/// assert_eq!(incumbent.history(), &[9.0, 4.0]);
/// ```
#[derive(Debug)]
pub struct Incumbent<A> {
    sense: Sense,
    best: Option<Candidate<A>>,
    history: Vec<f64>,
    update_count: u64,
    sender: Option<UnboundedSender<Candidate<A>>>,
}

impl<A> Incumbent<A> {
    /// Creates an empty incumbent for an instance with the given sense.
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            best: None,
            history: Vec::new(),
            update_count: 0,
            sender: None,
        }
    }

    /// Streams every accepted candidate through `sender`.
    pub fn with_sender(mut self, sender: UnboundedSender<Candidate<A>>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub(crate) fn set_sender(&mut self, sender: UnboundedSender<Candidate<A>>) {
        self.sender = Some(sender);
    }

    /// Returns true if `value` would replace the current incumbent.
    pub fn would_improve(&self, value: f64) -> bool {
        match &self.best {
            None => true,
            Some(best) => self.sense.is_better(value, best.objective_value),
        }
    }

    /// The current incumbent.
    pub fn best(&self) -> Option<&Candidate<A>> {
        self.best.as_ref()
    }

    /// Objective value of the current incumbent.
    pub fn objective(&self) -> Option<f64> {
        self.best.as_ref().map(|c| c.objective_value)
    }

    /// Returns true once a candidate has been accepted.
    pub fn has_incumbent(&self) -> bool {
        self.best.is_some()
    }

    /// Objective values of every accepted candidate, in acceptance order.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Number of accepted candidates.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Sense the incumbent is compared under.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Removes and returns the incumbent.
    pub fn take(&mut self) -> Option<Candidate<A>> {
        self.best.take()
    }
}

impl<A: Clone> Incumbent<A> {
    /// Offers a candidate, returning true if it became the new incumbent.
    ///
    /// Candidates with a non-finite objective are rejected.
    pub fn offer(&mut self, candidate: Candidate<A>) -> bool {
        let value = candidate.objective_value;
        if !value.is_finite() {
            warn!(
                event = "candidate_rejected",
                objective = value,
                "Ignoring candidate with non-finite objective"
            );
            return false;
        }
        if !self.would_improve(value) {
            return false;
        }

        if let Some(sender) = &self.sender {
            // A dropped receiver only means nobody is listening any more
            let _ = sender.send(candidate.clone());
        }
        self.best = Some(candidate);
        self.history.push(value);
        self.update_count += 1;
        true
    }
}

/// Incumbent shared between worker threads.
///
/// `offer` compares and replaces under a single lock, so concurrent offers
/// can never lose an improvement.
#[derive(Debug)]
pub struct SharedIncumbent<A> {
    inner: Mutex<Incumbent<A>>,
}

impl<A> SharedIncumbent<A> {
    /// Wraps an incumbent for sharing.
    pub fn new(incumbent: Incumbent<A>) -> Self {
        Self {
            inner: Mutex::new(incumbent),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Incumbent<A>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Objective value of the current incumbent.
    pub fn objective(&self) -> Option<f64> {
        self.lock().objective()
    }

    /// Unwraps the shared incumbent.
    pub fn into_inner(self) -> Incumbent<A> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: Clone> SharedIncumbent<A> {
    /// Offers a candidate, returning true if it became the new incumbent.
    pub fn offer(&self, candidate: Candidate<A>) -> bool {
        self.lock().offer(candidate)
    }
}

/// Where the node-processing step reads and offers incumbents.
pub trait IncumbentStore<A> {
    /// Objective value of the current incumbent.
    fn objective(&self) -> Option<f64>;

    /// Offers a candidate, returning true if it was accepted.
    fn offer(&mut self, candidate: Candidate<A>) -> bool;
}

impl<A: Clone> IncumbentStore<A> for Incumbent<A> {
    fn objective(&self) -> Option<f64> {
        Incumbent::objective(self)
    }

    fn offer(&mut self, candidate: Candidate<A>) -> bool {
        Incumbent::offer(self, candidate)
    }
}

impl<A: Clone> IncumbentStore<A> for &SharedIncumbent<A> {
    fn objective(&self) -> Option<f64> {
        SharedIncumbent::objective(self)
    }

    fn offer(&mut self, candidate: Candidate<A>) -> bool {
        SharedIncumbent::offer(self, candidate)
    }
}
