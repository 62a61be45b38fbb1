//! Local edit costs.
//!
//! A cost function prices a single edit operation from two optional node
//! attributes: `(Some(a), None)` deletes a node, `(None, Some(b))` inserts
//! one and `(Some(a), Some(b))` relabels `a` into `b`. The engine never asks
//! for `(None, None)`.

use core::{fmt, str::FromStr};

use crate::error::UnknownVariant;

/// Prices one edit operation between two optional attributes.
///
/// Any closure `Fn(Option<T>, Option<T>) -> f64` is a cost function. Results
/// must be finite and non-negative; the edit-distance engine rejects
/// anything else with [`crate::TreeDistanceError::InvalidCost`].
///
/// # Examples
/// ```
/// use arbor_core::CostFunction;
///
/// let unit = |a: Option<f64>, b: Option<f64>| match (a, b) {
///     (Some(a), Some(b)) if a == b => 0.0,
///     _ => 1.0,
/// };
/// assert_eq!(unit.cost(Some(3.0), None), 1.0);
/// assert_eq!(unit.cost(Some(3.0), Some(3.0)), 0.0);
/// ```
pub trait CostFunction<T> {
    /// Returns the cost of turning `left` into `right`.
    fn cost(&self, left: Option<T>, right: Option<T>) -> f64;
}

impl<T, F> CostFunction<T> for F
where
    F: Fn(Option<T>, Option<T>) -> f64,
{
    fn cost(&self, left: Option<T>, right: Option<T>) -> f64 {
        self(left, right)
    }
}

/// Built-in cost functions over `f64` attributes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LocalCost {
    /// Relabel costs `|a - b|`; inserting or deleting costs the value itself.
    #[default]
    Absolute,
    /// Relabel costs `|a - b| / (|a| + |b|)`, zero when both are zero;
    /// inserting or deleting costs `1`.
    Normalized,
}

impl LocalCost {
    /// Every built-in cost function in declaration order.
    pub const ALL: [Self; 2] = [Self::Absolute, Self::Normalized];

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Absolute => "Absolute local cost",
            Self::Normalized => "Normalized local cost",
        }
    }

    const fn short_name(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Normalized => "normalized",
        }
    }
}

impl CostFunction<f64> for LocalCost {
    fn cost(&self, left: Option<f64>, right: Option<f64>) -> f64 {
        match (self, left, right) {
            (_, None, None) => 0.0,
            (Self::Absolute, Some(a), Some(b)) => (a - b).abs(),
            (Self::Absolute, Some(value), None) | (Self::Absolute, None, Some(value)) => value,
            (Self::Normalized, Some(a), Some(b)) => {
                let denominator = a.abs() + b.abs();
                if denominator == 0.0 {
                    0.0
                } else {
                    (a - b).abs() / denominator
                }
            }
            (Self::Normalized, Some(_), None) | (Self::Normalized, None, Some(_)) => 1.0,
        }
    }
}

impl fmt::Display for LocalCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocalCost {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|cost| {
                cost.name().eq_ignore_ascii_case(trimmed)
                    || cost.short_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| {
                UnknownVariant::new(
                    "local cost",
                    s,
                    &Self::ALL.map(Self::short_name),
                )
            })
    }
}
