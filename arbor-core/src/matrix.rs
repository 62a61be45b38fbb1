//! Pairwise distance matrices over tree collections.
//!
//! [`build_distance_matrix`] evaluates a [`SimilarityMeasure`] for every
//! unordered pair of input trees and mirrors the results into a symmetric
//! [`DistanceMatrix`]. Pairs are independent, so the work fans out over the
//! rayon pool when the `parallel` feature is enabled.

#[cfg(feature = "metrics")]
use std::time::Duration;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    builder::ExecutionStrategy,
    cost::CostFunction,
    error::{ArborError, Result, define_error_codes},
    similarity::SimilarityMeasure,
    tree::Tree,
    zhang::TreeDistanceError,
};

/// Square, symmetric matrix of non-negative distances stored row-major.
///
/// # Examples
/// ```
/// use arbor_core::DistanceMatrix;
///
/// let matrix = DistanceMatrix::from_rows(vec![vec![0.0, 2.5], vec![2.5, 0.0]])?;
/// assert_eq!(matrix.len(), 2);
/// assert_eq!(matrix.get(0, 1), Some(2.5));
/// assert_eq!(matrix.row(1), Some(&[2.5, 0.0][..]));
/// # Ok::<(), arbor_core::MatrixError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// An `size`×`size` matrix of zeros.
    #[must_use]
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Builds a matrix from explicit rows.
    ///
    /// # Errors
    /// Returns [`MatrixError`] when the rows are ragged, a value is negative or
    /// not finite, the diagonal is non-zero, or the matrix is not exactly
    /// symmetric.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> core::result::Result<Self, MatrixError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (row, entries) in rows.into_iter().enumerate() {
            if entries.len() != size {
                return Err(MatrixError::NotSquare {
                    row,
                    expected: size,
                    got: entries.len(),
                });
            }
            for (column, &value) in entries.iter().enumerate() {
                if !value.is_finite() {
                    return Err(MatrixError::NonFinite { row, column, value });
                }
                if value < 0.0 {
                    return Err(MatrixError::Negative { row, column, value });
                }
            }
            values.extend(entries);
        }

        let matrix = Self { size, values };
        matrix.check_shape()?;
        Ok(matrix)
    }

    fn check_shape(&self) -> core::result::Result<(), MatrixError> {
        for row in 0..self.size {
            let value = self.values[row * self.size + row];
            if value != 0.0 {
                return Err(MatrixError::NonZeroDiagonal { index: row, value });
            }
            for column in (row + 1)..self.size {
                if self.values[row * self.size + column] != self.values[column * self.size + row] {
                    return Err(MatrixError::Asymmetric { row, column });
                }
            }
        }
        Ok(())
    }

    /// Number of objects, i.e. the row count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns whether the matrix covers no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance between objects `i` and `j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.size || j >= self.size {
            return None;
        }
        self.values.get(i * self.size + j).copied()
    }

    /// Row `i` of the matrix.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.size {
            return None;
        }
        self.values.get(i * self.size..(i + 1) * self.size)
    }

    /// Iterates over the rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.size.max(1))
    }

    /// Row-major backing storage.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Errors raised when a distance matrix is malformed.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum MatrixError {
    /// A row did not have one entry per object.
    #[error("row {row} has {got} entries but the matrix has {expected} rows")]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Number of rows, which every row length must match.
        expected: usize,
        /// Actual length of the row.
        got: usize,
    },
    /// An entry was NaN or infinite.
    #[error("entry ({row}, {column}) is not finite: {value}")]
    NonFinite {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
        /// Rejected value.
        value: f64,
    },
    /// An entry was negative.
    #[error("entry ({row}, {column}) is negative: {value}")]
    Negative {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
        /// Rejected value.
        value: f64,
    },
    /// An object was at non-zero distance from itself.
    #[error("diagonal entry {index} must be 0 (got {value})")]
    NonZeroDiagonal {
        /// Index of the diagonal entry.
        index: usize,
        /// Rejected value.
        value: f64,
    },
    /// `d(i, j)` and `d(j, i)` differ.
    #[error("entries ({row}, {column}) and ({column}, {row}) differ")]
    Asymmetric {
        /// Row of the upper-triangle entry.
        row: usize,
        /// Column of the upper-triangle entry.
        column: usize,
    },
}

define_error_codes! {
    /// Machine-readable error codes for [`MatrixError`].
    enum MatrixErrorCode for MatrixError {
        /// A row did not have one entry per object.
        NotSquare => NotSquare { .. } => "MATRIX_NOT_SQUARE",
        /// An entry was NaN or infinite.
        NonFinite => NonFinite { .. } => "MATRIX_NON_FINITE",
        /// An entry was negative.
        Negative => Negative { .. } => "MATRIX_NEGATIVE",
        /// An object was at non-zero distance from itself.
        NonZeroDiagonal => NonZeroDiagonal { .. } => "MATRIX_NON_ZERO_DIAGONAL",
        /// `d(i, j)` and `d(j, i)` differ.
        Asymmetric => Asymmetric { .. } => "MATRIX_ASYMMETRIC",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    Serial,
    #[cfg(feature = "parallel")]
    Parallel,
}

fn resolve_backend(strategy: ExecutionStrategy) -> Result<Backend> {
    match strategy {
        ExecutionStrategy::Serial => Ok(Backend::Serial),
        #[cfg(feature = "parallel")]
        ExecutionStrategy::Auto | ExecutionStrategy::Parallel => Ok(Backend::Parallel),
        #[cfg(not(feature = "parallel"))]
        ExecutionStrategy::Auto => Ok(Backend::Serial),
        #[cfg(not(feature = "parallel"))]
        ExecutionStrategy::Parallel => Err(ArborError::BackendUnavailable {
            requested: ExecutionStrategy::Parallel,
        }),
    }
}

/// Computes `measure` for every pair of `trees`.
///
/// Entry `(i, j)` holds the measure between `trees[i]` and `trees[j]`; the
/// diagonal is zero and only the upper triangle is evaluated. When several
/// pairs fail, the error of the first failing pair in row-major order is
/// returned whichever backend ran.
///
/// # Errors
/// Returns [`ArborError::BackendUnavailable`] when `strategy` asks for
/// parallel execution in a build without the `parallel` feature and
/// [`ArborError::PairDistance`] when a pair cannot be compared.
///
/// # Examples
/// ```
/// use arbor_core::{ExecutionStrategy, LocalCost, SimilarityMeasure, SimpleTree, build_distance_matrix};
///
/// let trees = vec![SimpleTree::new(1.0), SimpleTree::new(4.0), SimpleTree::new(6.0)];
/// let matrix = build_distance_matrix(
///     &trees,
///     SimilarityMeasure::AbsoluteDifference,
///     &LocalCost::Absolute,
///     ExecutionStrategy::Serial,
/// )?;
/// assert_eq!(matrix.row(0), Some(&[0.0, 3.0, 5.0][..]));
/// assert_eq!(matrix.get(2, 1), Some(2.0));
/// # Ok::<(), arbor_core::ArborError>(())
/// ```
#[instrument(
    name = "core.distance_matrix",
    err,
    skip(trees, cost),
    fields(trees = trees.len(), measure = %measure, strategy = ?strategy),
)]
pub fn build_distance_matrix<N, C>(
    trees: &[N],
    measure: SimilarityMeasure,
    cost: &C,
    strategy: ExecutionStrategy,
) -> Result<DistanceMatrix>
where
    N: Tree + Sync,
    C: CostFunction<N::Attribute> + Sync + ?Sized,
{
    let backend = resolve_backend(strategy)?;
    let size = trees.len();
    let pairs: Vec<(usize, usize)> = (0..size)
        .flat_map(|i| ((i + 1)..size).map(move |j| (i, j)))
        .collect();

    let started = Instant::now();
    let compare = |&(i, j): &(usize, usize)| -> core::result::Result<f64, ArborError> {
        measure
            .compute(trees.get(i), trees.get(j), cost)
            .map_err(|error: TreeDistanceError| ArborError::PairDistance {
                left: i,
                right: j,
                error,
            })
    };
    let outcomes: Vec<core::result::Result<f64, ArborError>> = match backend {
        Backend::Serial => pairs.iter().map(compare).collect(),
        #[cfg(feature = "parallel")]
        Backend::Parallel => pairs.par_iter().map(compare).collect(),
    };
    let distances = outcomes.into_iter().collect::<Result<Vec<f64>>>()?;

    let mut matrix = DistanceMatrix::zeros(size);
    for (&(i, j), distance) in pairs.iter().zip(distances) {
        matrix.values[i * size + j] = distance;
        matrix.values[j * size + i] = distance;
    }

    record_pairs(pairs.len());
    record_duration(started);
    debug!(pairs = pairs.len(), backend = ?backend, "distance matrix complete");
    Ok(matrix)
}

#[cfg(feature = "metrics")]
fn record_pairs(pairs: usize) {
    metrics::counter!("arbor_distance_pairs_total").increment(pairs as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_pairs(_pairs: usize) {}

#[cfg(feature = "metrics")]
fn record_duration(started: Instant) {
    let elapsed: Duration = started.elapsed();
    metrics::histogram!("arbor_distance_matrix_seconds").record(elapsed.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
fn record_duration(_started: Instant) {}
