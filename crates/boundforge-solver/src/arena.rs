//! Slot arena for pending search nodes.
//!
//! The node queue orders small `NodeHandle`s while the nodes themselves stay
//! put in a slot vector. Freed slots are recycled through a free list, so a
//! long search does not keep growing the backing storage.

/// Index of a node stored in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

impl NodeHandle {
    /// Returns the slot index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Slot storage with a free list.
///
/// # Example
///
/// ```
/// use boundforge_solver::arena::NodeArena;
///
/// let mut arena = NodeArena::new();
/// let a = arena.insert("a");
/// let b = arena.insert("b");
/// assert_eq!(arena.remove(a), Some("a"));
///
/// // The freed slot is reused.
/// let c = arena.insert("c");
/// assert_eq!(c, a);
/// assert_eq!(arena.get(b), Some(&"b"));
/// assert_eq!(arena.len(), 2);
/// ```
#[derive(Debug)]
pub struct NodeArena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> NodeArena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` and returns its handle.
    pub fn insert(&mut self, value: T) -> NodeHandle {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                NodeHandle(index)
            }
            None => {
                self.slots.push(Some(value));
                NodeHandle(self.slots.len() - 1)
            }
        }
    }

    /// Removes and returns the value behind `handle`.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let value = self.slots.get_mut(handle.0)?.take()?;
        self.free.push(handle.0);
        self.len -= 1;
        Some(value)
    }

    /// Returns the value behind `handle`.
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.slots.get(handle.0)?.as_ref()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots, occupied or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drops every stored value.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
