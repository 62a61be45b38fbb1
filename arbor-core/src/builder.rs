//! Builder utilities for configuring [`Classifier`] runs.
//!
//! Exposes the execution strategy and cut criterion selection surface and the
//! builder validation applied before constructing [`Classifier`] instances.

use core::fmt;

use crate::{
    Result, classifier::Classifier, cost::LocalCost, error::ArborError, hierarchy::Linkage,
    similarity::SimilarityMeasure,
};

/// Indicates how pairwise distances are scheduled.
///
/// `Auto` resolves deterministically: it runs on the rayon pool when the
/// `parallel` feature is compiled in and serially otherwise, so a build
/// never fails for asking `Auto`.
///
/// # Examples
/// ```
/// use arbor_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Allow the library to select an appropriate backend automatically.
    #[default]
    Auto,
    /// Compare pairs one after another on the calling thread.
    Serial,
    /// Compare pairs on the rayon thread pool.
    Parallel,
}

/// How the dendrogram is cut into classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion {
    /// Produce this many classes.
    ClassCount(usize),
    /// Open every merge at or above this distance.
    Threshold(f64),
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassCount(count) => write!(f, "{count} classes"),
            Self::Threshold(threshold) => write!(f, "threshold {threshold}"),
        }
    }
}

/// Configures and constructs [`Classifier`] instances.
///
/// # Examples
/// ```
/// use arbor_core::{ClassifierBuilder, Criterion, ExecutionStrategy, Linkage};
///
/// let classifier = ClassifierBuilder::new()
///     .with_linkage(Linkage::Complete)
///     .with_criterion(Criterion::Threshold(0.4))
///     .with_execution_strategy(ExecutionStrategy::Serial)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(classifier.linkage(), Linkage::Complete);
/// assert_eq!(classifier.execution_strategy(), ExecutionStrategy::Serial);
/// ```
#[derive(Debug, Clone)]
pub struct ClassifierBuilder {
    measure: SimilarityMeasure,
    linkage: Linkage,
    local_cost: LocalCost,
    criterion: Criterion,
    execution_strategy: ExecutionStrategy,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self {
            measure: SimilarityMeasure::NormalizedDifference,
            linkage: Linkage::Average,
            local_cost: LocalCost::Absolute,
            criterion: Criterion::ClassCount(3),
            execution_strategy: ExecutionStrategy::Auto,
        }
    }
}

impl ClassifierBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use arbor_core::{ClassifierBuilder, Criterion, ExecutionStrategy, Linkage, LocalCost, SimilarityMeasure};
    ///
    /// let builder = ClassifierBuilder::new();
    /// assert_eq!(builder.measure(), SimilarityMeasure::NormalizedDifference);
    /// assert_eq!(builder.linkage(), Linkage::Average);
    /// assert_eq!(builder.local_cost(), LocalCost::Absolute);
    /// assert_eq!(builder.criterion(), Criterion::ClassCount(3));
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the similarity measure filling the distance matrix.
    #[must_use]
    pub fn with_measure(mut self, measure: SimilarityMeasure) -> Self {
        self.measure = measure;
        self
    }

    /// Returns the configured similarity measure.
    #[must_use]
    pub fn measure(&self) -> SimilarityMeasure {
        self.measure
    }

    /// Selects the cluster linkage.
    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Returns the configured linkage.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Selects the built-in cost used by [`Classifier::run`].
    #[must_use]
    pub fn with_local_cost(mut self, local_cost: LocalCost) -> Self {
        self.local_cost = local_cost;
        self
    }

    /// Returns the configured local cost.
    #[must_use]
    pub fn local_cost(&self) -> LocalCost {
        self.local_cost
    }

    /// Requests `count` classes.
    ///
    /// # Examples
    /// ```
    /// use arbor_core::{ClassifierBuilder, Criterion};
    ///
    /// let builder = ClassifierBuilder::new().with_class_count(5);
    /// assert_eq!(builder.criterion(), Criterion::ClassCount(5));
    /// ```
    #[must_use]
    pub fn with_class_count(self, count: usize) -> Self {
        self.with_criterion(Criterion::ClassCount(count))
    }

    /// Cuts the dendrogram at `threshold`.
    #[must_use]
    pub fn with_threshold(self, threshold: f64) -> Self {
        self.with_criterion(Criterion::Threshold(threshold))
    }

    /// Sets the cut criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Returns the configured cut criterion.
    #[must_use]
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Sets the execution strategy used for the distance matrix.
    ///
    /// # Examples
    /// ```
    /// use arbor_core::{ClassifierBuilder, ExecutionStrategy};
    ///
    /// let builder = ClassifierBuilder::new().with_execution_strategy(ExecutionStrategy::Serial);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Serial);
    /// ```
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration and constructs a [`Classifier`] instance.
    ///
    /// # Errors
    /// Returns [`ArborError::InvalidClassCount`] for a class count of zero and
    /// [`ArborError::InvalidThreshold`] for a negative or non-finite
    /// threshold.
    ///
    /// # Examples
    /// ```
    /// use arbor_core::{ArborError, ClassifierBuilder};
    ///
    /// let err = ClassifierBuilder::new().with_class_count(0).build().unwrap_err();
    /// assert_eq!(err, ArborError::InvalidClassCount { got: 0 });
    /// ```
    pub fn build(self) -> Result<Classifier> {
        match self.criterion {
            Criterion::ClassCount(0) => return Err(ArborError::InvalidClassCount { got: 0 }),
            Criterion::Threshold(threshold) if !threshold.is_finite() || threshold < 0.0 => {
                return Err(ArborError::InvalidThreshold { got: threshold });
            }
            Criterion::ClassCount(_) | Criterion::Threshold(_) => {}
        }

        Ok(Classifier::new(
            self.measure,
            self.linkage,
            self.local_cost,
            self.criterion,
            self.execution_strategy,
        ))
    }
}
