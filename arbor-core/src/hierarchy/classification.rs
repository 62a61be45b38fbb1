//! Partitions read off a dendrogram.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use super::{ClassificationError, Dendrogram, Linkage, NodeId, agglomerate};
use crate::matrix::DistanceMatrix;

/// A partition of the input objects into disjoint, non-empty classes.
///
/// Classes are ordered by their smallest member index and members are listed
/// by index, so the same input always produces the same layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification<T> {
    objects: Vec<T>,
    labels: Vec<String>,
    classes: Vec<Vec<usize>>,
    dendrogram: Option<Dendrogram>,
    cutoff: f64,
}

impl<T> Classification<T> {
    fn new(
        objects: Vec<T>,
        mut classes: Vec<Vec<usize>>,
        dendrogram: Option<Dendrogram>,
        cutoff: f64,
    ) -> Self {
        for class in &mut classes {
            class.sort_unstable();
        }
        classes.sort_by_key(|class| class.first().copied());
        let labels = (0..objects.len()).map(|index| index.to_string()).collect();
        let classification = Self {
            objects,
            labels,
            classes,
            dendrogram,
            cutoff,
        };
        for (index, class) in classification.classes.iter().enumerate() {
            let members: Vec<&str> = class
                .iter()
                .map(|&object| classification.labels[object].as_str())
                .collect();
            info!(class = index, size = class.len(), members = %members.join(", "), "class");
        }
        classification
    }

    /// Member objects of every class.
    #[must_use]
    pub fn classes(&self) -> Vec<Vec<&T>> {
        self.classes
            .iter()
            .map(|class| class.iter().map(|&index| &self.objects[index]).collect())
            .collect()
    }

    /// Member indices of every class.
    #[must_use]
    pub fn class_indices(&self) -> &[Vec<usize>] {
        &self.classes
    }

    /// Number of classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Class containing the object at `index`.
    #[must_use]
    pub fn class_of(&self, index: usize) -> Option<usize> {
        self.classes.iter().position(|class| class.binary_search(&index).is_ok())
    }

    /// The merge tree the classes were cut from. Absent when the class count
    /// made clustering unnecessary.
    #[must_use]
    pub fn dendrogram(&self) -> Option<&Dendrogram> {
        self.dendrogram.as_ref()
    }

    /// Distance threshold the dendrogram was cut at.
    #[must_use]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Pairs every synthetic label with its object.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &T)> {
        self.labels.iter().map(String::as_str).zip(&self.objects)
    }

    /// Object carrying `label`.
    #[must_use]
    pub fn object(&self, label: &str) -> Option<&T> {
        self.labels
            .iter()
            .position(|candidate| candidate == label)
            .map(|index| &self.objects[index])
    }

    /// The classified objects in input order.
    #[must_use]
    pub fn objects(&self) -> &[T] {
        &self.objects
    }
}

fn check_sizes<T>(objects: &[T], matrix: &DistanceMatrix) -> Result<(), ClassificationError> {
    if objects.is_empty() {
        return Err(ClassificationError::NoObjects);
    }
    if objects.len() != matrix.len() {
        return Err(ClassificationError::SizeMismatch {
            objects: objects.len(),
            matrix: matrix.len(),
        });
    }
    Ok(())
}

/// Clusters `objects` and cuts the dendrogram at `threshold`.
///
/// Every merge at distance `>= threshold` is cut open; the subtrees hanging
/// below the cut become the classes. A threshold above the root merge yields
/// one class, a threshold of `0` yields singletons.
///
/// # Errors
/// Returns [`ClassificationError`] for empty input, a matrix of the wrong
/// size, or a negative or non-finite threshold.
///
/// # Examples
/// ```
/// use arbor_core::{DistanceMatrix, Linkage, classify_by_threshold};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 1.0, 9.0],
///     vec![1.0, 0.0, 9.0],
///     vec![9.0, 9.0, 0.0],
/// ])?;
/// let classification = classify_by_threshold(vec!["a", "b", "c"], &matrix, Linkage::Single, 5.0)?;
/// assert_eq!(classification.class_indices(), &[vec![0, 1], vec![2]]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.classify_threshold",
    err,
    skip(objects, matrix),
    fields(objects = objects.len(), linkage = %linkage, threshold = threshold),
)]
pub fn classify_by_threshold<T>(
    objects: Vec<T>,
    matrix: &DistanceMatrix,
    linkage: Linkage,
    threshold: f64,
) -> Result<Classification<T>, ClassificationError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ClassificationError::InvalidThreshold { threshold });
    }
    check_sizes(&objects, matrix)?;
    let dendrogram = agglomerate(matrix, linkage)?;
    let classes = cut(&dendrogram, threshold);
    Ok(Classification::new(objects, classes, Some(dendrogram), threshold))
}

/// Clusters `objects` into `class_count` classes.
///
/// `1` and `objects.len()` are answered directly without clustering. Other
/// counts cut the dendrogram halfway between the `(k-1)`-th and `k`-th
/// largest merge distances; equal merge distances at that boundary can
/// produce more than `class_count` classes.
///
/// # Errors
/// Returns [`ClassificationError`] for empty input, a matrix of the wrong
/// size, or a class count outside `1..=objects.len()`.
///
/// # Examples
/// ```
/// use arbor_core::{DistanceMatrix, Linkage, classify_by_class_count};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 1.0, 9.0],
///     vec![1.0, 0.0, 9.0],
///     vec![9.0, 9.0, 0.0],
/// ])?;
/// let classification = classify_by_class_count(vec!["a", "b", "c"], &matrix, Linkage::Average, 2)?;
/// assert_eq!(classification.class_count(), 2);
/// assert_eq!(classification.cutoff(), 5.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.classify_count",
    err,
    skip(objects, matrix),
    fields(objects = objects.len(), linkage = %linkage, class_count = class_count),
)]
pub fn classify_by_class_count<T>(
    objects: Vec<T>,
    matrix: &DistanceMatrix,
    linkage: Linkage,
    class_count: usize,
) -> Result<Classification<T>, ClassificationError> {
    check_sizes(&objects, matrix)?;
    let total = objects.len();
    if class_count == 0 || class_count > total {
        return Err(ClassificationError::InvalidClassCount {
            requested: class_count,
            objects: total,
        });
    }
    if class_count == 1 {
        return Ok(Classification::new(objects, vec![(0..total).collect()], None, 0.0));
    }
    if class_count == total {
        let singletons = (0..total).map(|index| vec![index]).collect();
        return Ok(Classification::new(objects, singletons, None, 0.0));
    }

    let dendrogram = agglomerate(matrix, linkage)?;
    let sorted = dendrogram.sorted_by_distance();
    let distance_at = |rank: usize| {
        sorted
            .get(rank)
            .and_then(|&id| dendrogram.node(id))
            .map(super::ClusterNode::distance)
    };
    let upper = distance_at(class_count - 2).unwrap_or(0.0);
    let cutoff = distance_at(class_count - 1).map_or(upper, |lower| (upper + lower) / 2.0);
    debug!(cutoff, "derived threshold from class count");

    let classes = cut(&dendrogram, cutoff);
    Ok(Classification::new(objects, classes, Some(dendrogram), cutoff))
}

/// Expands every merge at distance `>= threshold` from the root down and
/// returns the object sets of the subtrees left whole.
fn cut(dendrogram: &Dendrogram, threshold: f64) -> Vec<Vec<usize>> {
    let opened: HashSet<NodeId> = dendrogram
        .sorted_by_distance()
        .into_iter()
        .take_while(|&id| {
            dendrogram
                .merge_distance(id)
                .is_some_and(|distance| distance >= threshold)
        })
        .collect();

    let mut classes = Vec::new();
    let mut stack = vec![dendrogram.root()];
    while let Some(node) = stack.pop() {
        match dendrogram.children(node) {
            Some((left, right)) if opened.contains(&node) => {
                stack.push(right);
                stack.push(left);
            }
            _ => classes.push(dendrogram.leaves(node)),
        }
    }
    classes
}
