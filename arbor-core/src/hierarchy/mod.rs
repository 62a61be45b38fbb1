//! Agglomerative hierarchical clustering and dendrogram cuts.
//!
//! [`agglomerate`] merges the two closest clusters until one remains, using
//! the Lance–Williams update for the chosen [`Linkage`]. The resulting
//! [`Dendrogram`] is then cut either at a distance threshold
//! ([`classify_by_threshold`]) or at the threshold that yields a requested
//! number of classes ([`classify_by_class_count`]).
//!
//! Everything here is stateless: callers pass the matrix and linkage
//! explicitly and receive fresh values back.

mod classification;
mod dendrogram;

use core::{fmt, str::FromStr};

use thiserror::Error;
use tracing::instrument;

use crate::{
    error::{UnknownVariant, define_error_codes},
    matrix::DistanceMatrix,
};

pub use self::{
    classification::{Classification, classify_by_class_count, classify_by_threshold},
    dendrogram::{ClusterNode, Dendrogram, NodeId},
};

/// Rule deriving the distance between two clusters from object distances.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Linkage {
    /// Closest pair of members.
    Single,
    /// Farthest pair of members.
    Complete,
    /// Mean over every member pair (UPGMA).
    #[default]
    Average,
}

impl Linkage {
    /// Every linkage in declaration order.
    pub const ALL: [Self; 3] = [Self::Single, Self::Complete, Self::Average];

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Single => "Single linkage",
            Self::Complete => "Complete linkage",
            Self::Average => "Average linkage",
        }
    }

    const fn short_name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Average => "average",
        }
    }

    /// Distance from the union of clusters `i` and `j` to cluster `k`.
    fn update(self, d_ik: f64, d_jk: f64, size_i: usize, size_j: usize) -> f64 {
        match self {
            Self::Single => d_ik.min(d_jk),
            Self::Complete => d_ik.max(d_jk),
            Self::Average => {
                let (ni, nj) = (size_i as f64, size_j as f64);
                (ni * d_ik + nj * d_jk) / (ni + nj)
            }
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Linkage {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|linkage| {
                linkage.name().eq_ignore_ascii_case(trimmed)
                    || linkage.short_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownVariant::new("linkage", s, &Self::ALL.map(Self::short_name)))
    }
}

/// Errors raised while clustering or classifying.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ClassificationError {
    /// There was nothing to cluster.
    #[error("classification requires at least one object")]
    NoObjects,
    /// The object list and the distance matrix disagree on size.
    #[error("{objects} objects do not match a {matrix}x{matrix} distance matrix")]
    SizeMismatch {
        /// Number of objects supplied.
        objects: usize,
        /// Dimension of the matrix.
        matrix: usize,
    },
    /// The class count was outside `1..=objects`.
    #[error("class count must lie in 1..={objects} (got {requested})")]
    InvalidClassCount {
        /// Rejected class count.
        requested: usize,
        /// Number of objects supplied.
        objects: usize,
    },
    /// The threshold was negative or not finite.
    #[error("threshold must be a finite value >= 0 (got {threshold})")]
    InvalidThreshold {
        /// Rejected threshold.
        threshold: f64,
    },
}

define_error_codes! {
    /// Machine-readable error codes for [`ClassificationError`].
    enum ClassificationErrorCode for ClassificationError {
        /// There was nothing to cluster.
        NoObjects => NoObjects => "CLASSIFICATION_NO_OBJECTS",
        /// The object list and the distance matrix disagree on size.
        SizeMismatch => SizeMismatch { .. } => "CLASSIFICATION_SIZE_MISMATCH",
        /// The class count was outside `1..=objects`.
        InvalidClassCount => InvalidClassCount { .. } => "CLASSIFICATION_INVALID_CLASS_COUNT",
        /// The threshold was negative or not finite.
        InvalidThreshold => InvalidThreshold { .. } => "CLASSIFICATION_INVALID_THRESHOLD",
    }
}

/// Builds the full merge tree over the objects of `matrix`.
///
/// Each round merges the closest pair of active clusters; ties go to the pair
/// with the lowest indices. The merged cluster keeps the lower slot, so leaf
/// ids follow object indices and merge ids follow merge order.
///
/// # Errors
/// Returns [`ClassificationError::NoObjects`] for an empty matrix.
///
/// # Examples
/// ```
/// use arbor_core::{ClusterNode, DistanceMatrix, Linkage, agglomerate};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 1.0, 4.0],
///     vec![1.0, 0.0, 6.0],
///     vec![4.0, 6.0, 0.0],
/// ])?;
/// let dendrogram = agglomerate(&matrix, Linkage::Average)?;
///
/// assert_eq!(dendrogram.len(), 5);
/// assert_eq!(dendrogram.merge_distance(dendrogram.root()), Some(5.0));
/// assert!(matches!(dendrogram.node(3), Some(ClusterNode::Merge { left: 0, right: 1, .. })));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(name = "core.agglomerate", err, skip(matrix), fields(objects = matrix.len(), linkage = %linkage))]
pub fn agglomerate(matrix: &DistanceMatrix, linkage: Linkage) -> Result<Dendrogram, ClassificationError> {
    let objects = matrix.len();
    if objects == 0 {
        return Err(ClassificationError::NoObjects);
    }

    let mut distances = matrix.as_slice().to_vec();
    let mut sizes = vec![1_usize; objects];
    let mut slots: Vec<NodeId> = (0..objects).collect();
    let mut active: Vec<usize> = (0..objects).collect();
    let mut dendrogram = Dendrogram::with_leaves(objects);

    while active.len() > 1 {
        let (a, b) = closest_pair(&distances, objects, &active);
        let (i, j) = (active[a], active[b]);
        let d_ij = distances[i * objects + j];
        let node = dendrogram.push_merge(slots[i], slots[j], d_ij);

        for &k in &active {
            if k == i || k == j {
                continue;
            }
            let updated = linkage.update(
                distances[i * objects + k],
                distances[j * objects + k],
                sizes[i],
                sizes[j],
            );
            distances[i * objects + k] = updated;
            distances[k * objects + i] = updated;
        }
        sizes[i] += sizes[j];
        slots[i] = node;
        active.remove(b);
    }

    Ok(dendrogram)
}

/// Positions within `active` of the closest pair, lowest first on ties.
fn closest_pair(distances: &[f64], objects: usize, active: &[usize]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut best_distance = f64::INFINITY;
    for (a, &i) in active.iter().enumerate() {
        for (offset, &j) in active[a + 1..].iter().enumerate() {
            let distance = distances[i * objects + j];
            if distance < best_distance {
                best_distance = distance;
                best = (a, a + 1 + offset);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests;
