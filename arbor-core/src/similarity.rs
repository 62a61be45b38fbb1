//! Similarity measures derived from the raw edit distance.

use core::{fmt, str::FromStr};

use crate::{
    cost::CostFunction,
    error::UnknownVariant,
    tree::Tree,
    zhang::{TreeDistanceError, TreeEditDistance},
};

/// How the raw edit distance `d(T1, T2)` is turned into a comparison value.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SimilarityMeasure {
    /// `d(T1, T2)` unchanged.
    AbsoluteDifference,
    /// `d(T1, T2) / (|T1| + |T2|)`, where `|T|` counts nodes.
    AverageDifference,
    /// `d(T1, T2) / (d(T1, ∅) + d(∅, T2))`.
    #[default]
    NormalizedDifference,
}

impl SimilarityMeasure {
    /// Every measure in declaration order.
    pub const ALL: [Self; 3] = [
        Self::AbsoluteDifference,
        Self::AverageDifference,
        Self::NormalizedDifference,
    ];

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AbsoluteDifference => "Zhang Tree Distance",
            Self::AverageDifference => "Per Cell Average Zhang Tree Distance",
            Self::NormalizedDifference => "Normalized Zhang Tree Distance",
        }
    }

    const fn short_name(self) -> &'static str {
        match self {
            Self::AbsoluteDifference => "absolute",
            Self::AverageDifference => "average",
            Self::NormalizedDifference => "normalized",
        }
    }

    /// Compares two optional trees. Both ratio measures return `0` when
    /// their denominator is zero.
    ///
    /// # Errors
    /// Propagates [`TreeDistanceError`] from the edit-distance engine.
    ///
    /// # Examples
    /// ```
    /// use arbor_core::{LocalCost, SimilarityMeasure, SimpleTree};
    ///
    /// let left = SimpleTree::new(10.0);
    /// let right = SimpleTree::new(30.0);
    /// let cost = LocalCost::Absolute;
    ///
    /// assert_eq!(SimilarityMeasure::AbsoluteDifference.compute(Some(&left), Some(&right), &cost)?, 20.0);
    /// assert_eq!(SimilarityMeasure::AverageDifference.compute(Some(&left), Some(&right), &cost)?, 10.0);
    /// assert_eq!(SimilarityMeasure::NormalizedDifference.compute(Some(&left), Some(&right), &cost)?, 0.5);
    /// # Ok::<(), arbor_core::TreeDistanceError>(())
    /// ```
    pub fn compute<N, C>(
        self,
        left: Option<&N>,
        right: Option<&N>,
        cost: &C,
    ) -> Result<f64, TreeDistanceError>
    where
        N: Tree,
        C: CostFunction<N::Attribute> + ?Sized,
    {
        TreeEditDistance::compute(left, right, cost).map(|solved| self.apply(&solved))
    }

    /// Derives the measure from an already solved edit distance.
    ///
    /// # Examples
    /// ```
    /// use arbor_core::{LocalCost, SimilarityMeasure, SimpleTree, TreeEditDistance};
    ///
    /// let left = SimpleTree::new(10.0);
    /// let right = SimpleTree::new(30.0);
    /// let solved = TreeEditDistance::compute(Some(&left), Some(&right), &LocalCost::Absolute)?;
    ///
    /// assert_eq!(SimilarityMeasure::NormalizedDifference.apply(&solved), 0.5);
    /// # Ok::<(), arbor_core::TreeDistanceError>(())
    /// ```
    #[must_use]
    pub fn apply<N: Tree>(self, solved: &TreeEditDistance<'_, N>) -> f64 {
        let distance = solved.distance();
        let denominator = match self {
            Self::AbsoluteDifference => return distance,
            Self::AverageDifference => (solved.left_size() + solved.right_size()) as f64,
            Self::NormalizedDifference => solved.deletion_cost() + solved.insertion_cost(),
        };
        if denominator == 0.0 {
            0.0
        } else {
            distance / denominator
        }
    }
}

impl fmt::Display for SimilarityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityMeasure {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|measure| {
                measure.name().eq_ignore_ascii_case(trimmed)
                    || measure.short_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| {
                UnknownVariant::new("similarity measure", s, &Self::ALL.map(Self::short_name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalCost, SimpleTree};
    use rstest::rstest;

    fn swapped_pair() -> (SimpleTree<f64>, SimpleTree<f64>) {
        (
            SimpleTree::with_children(20.0, [SimpleTree::new(10.0), SimpleTree::new(30.0)]),
            SimpleTree::with_children(30.0, [SimpleTree::new(10.0), SimpleTree::new(20.0)]),
        )
    }

    #[rstest]
    #[case(SimilarityMeasure::AbsoluteDifference, 20.0)]
    #[case(SimilarityMeasure::AverageDifference, 20.0 / 6.0)]
    #[case(SimilarityMeasure::NormalizedDifference, 20.0 / 120.0)]
    fn measures_scale_the_raw_distance(#[case] measure: SimilarityMeasure, #[case] want: f64) {
        let (left, right) = swapped_pair();
        let value = measure
            .compute(Some(&left), Some(&right), &LocalCost::Absolute)
            .expect("valid costs");
        assert!((value - want).abs() < 1e-12, "{measure}: {value} != {want}");
    }

    #[rstest]
    #[case(SimilarityMeasure::AbsoluteDifference, 20.0)]
    #[case(SimilarityMeasure::AverageDifference, 20.0 / 6.0)]
    #[case(SimilarityMeasure::NormalizedDifference, 20.0 / 120.0)]
    fn apply_reuses_a_solved_distance(#[case] measure: SimilarityMeasure, #[case] want: f64) {
        let (left, right) = swapped_pair();
        let solved = TreeEditDistance::compute(Some(&left), Some(&right), &LocalCost::Absolute)
            .expect("valid costs");
        let direct = measure
            .compute(Some(&left), Some(&right), &LocalCost::Absolute)
            .expect("valid costs");
        assert!((measure.apply(&solved) - want).abs() < 1e-12);
        assert_eq!(measure.apply(&solved), direct);
    }

    #[rstest]
    #[case(SimilarityMeasure::AbsoluteDifference)]
    #[case(SimilarityMeasure::AverageDifference)]
    #[case(SimilarityMeasure::NormalizedDifference)]
    fn empty_trees_compare_as_zero(#[case] measure: SimilarityMeasure) {
        let value = measure
            .compute::<SimpleTree<f64>, _>(None, None, &LocalCost::Absolute)
            .expect("valid costs");
        assert_eq!(value, 0.0);
    }

    #[test]
    fn normalized_guard_handles_zero_cost_trees() {
        let left = SimpleTree::new(0.0);
        let right = SimpleTree::new(0.0);
        let value = SimilarityMeasure::NormalizedDifference
            .compute(Some(&left), Some(&right), &LocalCost::Absolute)
            .expect("valid costs");
        assert_eq!(value, 0.0);
    }

    #[rstest]
    #[case("Zhang Tree Distance", SimilarityMeasure::AbsoluteDifference)]
    #[case("per cell average zhang tree distance", SimilarityMeasure::AverageDifference)]
    #[case("normalized", SimilarityMeasure::NormalizedDifference)]
    fn parses_display_and_short_names(#[case] input: &str, #[case] want: SimilarityMeasure) {
        assert_eq!(input.parse::<SimilarityMeasure>(), Ok(want));
        assert_eq!(want.to_string().parse::<SimilarityMeasure>(), Ok(want));
    }

    #[test]
    fn unknown_measure_is_rejected() {
        let err = "jaccard"
            .parse::<SimilarityMeasure>()
            .expect_err("unknown measures must fail");
        assert_eq!(err.provided(), "jaccard");
        assert_eq!(err.kind(), "similarity measure");
    }
}
