//! Variable fixings.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt::Debug;

use crate::error::BranchError;

/// A set of decision-variable fixings, keyed by variable identifier.
///
/// Keys are unique and iteration order is the key order, so two nodes with
/// the same fixings always present them to the oracle in the same sequence.
///
/// # Example
///
/// ```
/// use boundforge_core::Fixings;
///
/// let parent: Fixings<usize, u8> = Fixings::single(2, 1);
/// let child = parent.extended(&Fixings::single(0, 0)).unwrap();
///
/// assert_eq!(child.len(), 2);
/// assert!(child.is_strict_superset_of(&parent));
/// assert!(parent.extended(&Fixings::single(2, 0)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixings<V, X> {
    entries: BTreeMap<V, X>,
}

impl<V: Ord, X> Fixings<V, X> {
    /// Creates an empty set of fixings.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Creates fixings holding a single `var = value` entry.
    pub fn single(var: V, value: X) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(var, value);
        Self { entries }
    }

    /// Fixes `var` to `value`, returning the previous value if any.
    pub fn insert(&mut self, var: V, value: X) -> Option<X> {
        self.entries.insert(var, value)
    }

    /// Returns the value `var` is fixed to.
    pub fn get(&self, var: &V) -> Option<&X> {
        self.entries.get(var)
    }

    /// Returns true if `var` is fixed.
    pub fn contains(&self, var: &V) -> bool {
        self.entries.contains_key(var)
    }

    /// Returns the number of fixed variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is fixed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(var, value)` pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, V, X> {
        self.entries.iter()
    }

    /// Iterates over the fixed variables.
    pub fn vars(&self) -> btree_map::Keys<'_, V, X> {
        self.entries.keys()
    }
}

impl<V: Ord + Clone + Debug, X: Clone> Fixings<V, X> {
    /// Returns these fixings plus `additions`.
    ///
    /// Fails if `additions` is empty or touches a variable that is already
    /// fixed here; either would break the strict-superset relation between a
    /// node and its children.
    pub fn extended(&self, additions: &Fixings<V, X>) -> Result<Self, BranchError> {
        if additions.is_empty() {
            return Err(BranchError::Empty);
        }
        let mut entries = self.entries.clone();
        for (var, value) in additions.iter() {
            if entries.insert(var.clone(), value.clone()).is_some() {
                return Err(BranchError::AlreadyFixed(format!("{var:?}")));
            }
        }
        Ok(Self { entries })
    }
}

impl<V: Ord, X: PartialEq> Fixings<V, X> {
    /// Returns true if every fixing in `other` also appears here.
    pub fn is_superset_of(&self, other: &Fixings<V, X>) -> bool {
        other
            .iter()
            .all(|(var, value)| self.get(var) == Some(value))
    }

    /// Returns true if this is a superset of `other` with at least one extra fixing.
    pub fn is_strict_superset_of(&self, other: &Fixings<V, X>) -> bool {
        self.len() > other.len() && self.is_superset_of(other)
    }
}

impl<V: Ord, X> Default for Fixings<V, X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Ord, X> FromIterator<(V, X)> for Fixings<V, X> {
    fn from_iter<T: IntoIterator<Item = (V, X)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, V, X> IntoIterator for &'a Fixings<V, X> {
    type Item = (&'a V, &'a X);
    type IntoIter = btree_map::Iter<'a, V, X>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
