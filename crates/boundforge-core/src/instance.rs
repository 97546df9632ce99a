//! Problem instance contract.

use crate::error::Result;
use crate::sense::Sense;

/// Immutable problem data.
///
/// The engine treats an instance as opaque: it reads the optimization
/// direction, validates it once before the search starts, and passes it by
/// shared reference to the branching and repair hooks.
pub trait Instance {
    /// The optimization direction, fixed for the whole instance.
    fn sense(&self) -> Sense;

    /// Checks the instance for malformed data.
    ///
    /// Called once by the engine before the first iteration. Errors are
    /// fatal and abort the solve.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl<I: Instance + ?Sized> Instance for &I {
    fn sense(&self) -> Sense {
        (**self).sense()
    }

    fn validate(&self) -> Result<()> {
        (**self).validate()
    }
}
