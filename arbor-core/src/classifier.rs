//! Tree classification orchestration.
//!
//! Provides the [`Classifier`] entry point tying the distance matrix builder
//! to the clustering engine.

use tracing::{info, instrument, warn};

use crate::{
    Result,
    builder::{Criterion, ExecutionStrategy},
    cost::{CostFunction, LocalCost},
    error::ArborError,
    hierarchy::{
        Classification, ClassificationError, Linkage, classify_by_class_count,
        classify_by_threshold,
    },
    matrix::{DistanceMatrix, build_distance_matrix},
    similarity::SimilarityMeasure,
    tree::Tree,
};

/// Entry point for classifying a collection of trees.
///
/// # Examples
/// ```
/// use arbor_core::{ClassifierBuilder, Linkage, SimilarityMeasure, SimpleTree};
///
/// let trees = vec![
///     SimpleTree::with_children(10.0, [SimpleTree::new(1.0), SimpleTree::new(2.0)]),
///     SimpleTree::with_children(10.0, [SimpleTree::new(2.0), SimpleTree::new(1.0)]),
///     SimpleTree::new(90.0),
/// ];
/// let classifier = ClassifierBuilder::new()
///     .with_measure(SimilarityMeasure::AbsoluteDifference)
///     .with_linkage(Linkage::Single)
///     .with_class_count(2)
///     .build()?;
/// let classification = classifier.run(&trees)?;
/// assert_eq!(classification.class_indices(), &[vec![0, 1], vec![2]]);
/// # Ok::<(), arbor_core::ArborError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    measure: SimilarityMeasure,
    linkage: Linkage,
    local_cost: LocalCost,
    criterion: Criterion,
    execution_strategy: ExecutionStrategy,
}

impl Classifier {
    pub(crate) fn new(
        measure: SimilarityMeasure,
        linkage: Linkage,
        local_cost: LocalCost,
        criterion: Criterion,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            measure,
            linkage,
            local_cost,
            criterion,
            execution_strategy,
        }
    }

    /// Returns the similarity measure filling the distance matrix.
    #[must_use]
    pub fn measure(&self) -> SimilarityMeasure {
        self.measure
    }

    /// Returns the cluster linkage.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Returns the built-in cost used by [`Classifier::run`].
    #[must_use]
    pub fn local_cost(&self) -> LocalCost {
        self.local_cost
    }

    /// Returns the cut criterion.
    #[must_use]
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Returns the execution strategy that will be used for distances.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Builds the distance matrix of `trees` under the configured local cost.
    ///
    /// # Errors
    /// See [`build_distance_matrix`].
    pub fn distance_matrix<N>(&self, trees: &[N]) -> Result<DistanceMatrix>
    where
        N: Tree<Attribute = f64> + Sync,
    {
        self.distance_matrix_with_cost(trees, &self.local_cost)
    }

    /// Builds the distance matrix of `trees` under a caller-supplied cost.
    ///
    /// # Errors
    /// See [`build_distance_matrix`].
    pub fn distance_matrix_with_cost<N, C>(&self, trees: &[N], cost: &C) -> Result<DistanceMatrix>
    where
        N: Tree + Sync,
        C: CostFunction<N::Attribute> + Sync + ?Sized,
    {
        build_distance_matrix(trees, self.measure, cost, self.execution_strategy)
    }

    /// Cuts `objects` into classes from a precomputed matrix.
    ///
    /// # Errors
    /// Returns [`ArborError::Classification`] when the objects and matrix
    /// disagree, the input is empty, or the class count exceeds the number of
    /// objects.
    pub fn classify_matrix<T>(
        &self,
        objects: Vec<T>,
        matrix: &DistanceMatrix,
    ) -> Result<Classification<T>> {
        let classification = match self.criterion {
            Criterion::ClassCount(count) => {
                classify_by_class_count(objects, matrix, self.linkage, count)?
            }
            Criterion::Threshold(threshold) => {
                classify_by_threshold(objects, matrix, self.linkage, threshold)?
            }
        };
        Ok(classification)
    }

    /// Cuts `objects` into classes from raw matrix rows, as read from an
    /// external source.
    ///
    /// # Errors
    /// Returns [`ArborError::Matrix`] when `rows` do not form a valid
    /// distance matrix and otherwise behaves like
    /// [`Classifier::classify_matrix`].
    pub fn classify_rows<T>(
        &self,
        objects: Vec<T>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Classification<T>> {
        self.check_class_count(objects.len())?;
        let matrix = DistanceMatrix::from_rows(rows)?;
        self.classify_matrix(objects, &matrix)
    }

    /// Rejects class counts the collection cannot satisfy before any
    /// distance is computed.
    fn check_class_count(&self, objects: usize) -> Result<()> {
        match self.criterion {
            Criterion::ClassCount(requested) if objects > 0 && requested > objects => {
                Err(ClassificationError::InvalidClassCount { requested, objects }.into())
            }
            _ => Ok(()),
        }
    }

    /// Classifies `trees` under the configured local cost.
    ///
    /// # Errors
    /// Returns [`ArborError::EmptyInput`] when `trees` is empty and
    /// [`ArborError::Classification`] when the class count exceeds the number
    /// of trees, both before any distance is computed. Otherwise propagates
    /// the errors of [`Classifier::distance_matrix`] and
    /// [`Classifier::classify_matrix`].
    pub fn run<'t, N>(&self, trees: &'t [N]) -> Result<Classification<&'t N>>
    where
        N: Tree<Attribute = f64> + Sync,
    {
        self.run_with_cost(trees, &self.local_cost)
    }

    /// Classifies `trees` under a caller-supplied cost.
    ///
    /// # Errors
    /// See [`Classifier::run`].
    #[instrument(
        name = "core.run",
        err,
        skip(self, trees, cost),
        fields(
            trees = trees.len(),
            measure = %self.measure,
            linkage = %self.linkage,
            criterion = %self.criterion,
            strategy = ?self.execution_strategy
        ),
    )]
    pub fn run_with_cost<'t, N, C>(
        &self,
        trees: &'t [N],
        cost: &C,
    ) -> Result<Classification<&'t N>>
    where
        N: Tree + Sync,
        C: CostFunction<N::Attribute> + Sync + ?Sized,
    {
        if trees.is_empty() {
            warn!("no trees supplied, returning error");
            return Err(ArborError::EmptyInput);
        }
        self.check_class_count(trees.len())?;

        let matrix = self.distance_matrix_with_cost(trees, cost)?;
        let classification = self.classify_matrix(trees.iter().collect(), &matrix)?;
        info!(
            classes = classification.class_count(),
            cutoff = classification.cutoff(),
            "classification completed"
        );
        Ok(classification)
    }
}
