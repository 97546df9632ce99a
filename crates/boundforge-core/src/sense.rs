//! Optimization direction.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::BoundForgeError;

/// Whether an instance is maximized or minimized.
///
/// Every objective comparison in the engine routes through this type, so the
/// search itself never needs to know which direction it is optimizing.
///
/// # Example
///
/// ```
/// use boundforge_core::Sense;
///
/// let sense: Sense = "max".parse().unwrap();
/// assert!(sense.is_better(7.0, 5.0));
/// assert!(Sense::Minimize.is_better(5.0, 7.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Sense {
    /// Larger objective values are better.
    Maximize,
    /// Smaller objective values are better.
    Minimize,
}

impl Sense {
    /// Compares two objective values; `Greater` means `a` is more favorable.
    ///
    /// Uses `f64::total_cmp`, so the ordering is total even for NaN.
    #[inline]
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Sense::Maximize => a.total_cmp(&b),
            Sense::Minimize => b.total_cmp(&a),
        }
    }

    /// Returns true if `a` is strictly better than `b`.
    #[inline]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    /// Maps a value onto a scale where larger always means more favorable.
    #[inline]
    pub fn orient(self, value: f64) -> f64 {
        match self {
            Sense::Maximize => value,
            Sense::Minimize => -value,
        }
    }

    /// The most favorable value possible, used for nodes without a bound yet.
    #[inline]
    pub fn unbounded(self) -> f64 {
        match self {
            Sense::Maximize => f64::INFINITY,
            Sense::Minimize => f64::NEG_INFINITY,
        }
    }

    /// Returns the more favorable of two values.
    #[inline]
    pub fn best_of(self, a: f64, b: f64) -> f64 {
        if self.is_better(b, a) {
            b
        } else {
            a
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => write!(f, "max"),
            Sense::Minimize => write!(f, "min"),
        }
    }
}

impl FromStr for Sense {
    type Err = BoundForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" | "maximise" => Ok(Sense::Maximize),
            "min" | "minimize" | "minimise" => Ok(Sense::Minimize),
            other => Err(BoundForgeError::Config(format!(
                "Problem sense is not valid: {other}"
            ))),
        }
    }
}
