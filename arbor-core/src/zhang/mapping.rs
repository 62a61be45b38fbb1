//! Node correspondences produced by the edit-distance engine.

use std::collections::HashSet;

use crate::{cost::CostFunction, tree::Tree};

#[derive(Debug)]
struct MappedPair<'t, N> {
    left_index: usize,
    left: &'t N,
    right_index: usize,
    right: &'t N,
}

impl<N> Clone for MappedPair<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for MappedPair<'_, N> {}

/// Partial one-to-one correspondence between the nodes of two trees.
///
/// Mapped pairs are relabelled; unmapped left nodes are deleted and unmapped
/// right nodes inserted. Pairs are ordered by the pre-order position of
/// their left node. Lookups use node identity, not attribute equality.
///
/// # Examples
/// ```
/// use arbor_core::{LocalCost, SimpleTree, node_mapping};
///
/// let left = SimpleTree::new(10.0);
/// let right = SimpleTree::new(20.0);
/// let mapping = node_mapping(Some(&left), Some(&right), &LocalCost::Absolute)?;
///
/// assert_eq!(mapping.len(), 1);
/// assert!(std::ptr::eq(mapping.get(&left).expect("mapped root"), &right));
/// assert_eq!(mapping.total_cost(Some(&left), Some(&right), &LocalCost::Absolute), 10.0);
/// # Ok::<(), arbor_core::TreeDistanceError>(())
/// ```
#[derive(Debug)]
pub struct NodeMapping<'t, N> {
    pairs: Vec<MappedPair<'t, N>>,
}

impl<N> Clone for NodeMapping<'_, N> {
    fn clone(&self) -> Self {
        Self {
            pairs: self.pairs.clone(),
        }
    }
}

impl<'t, N> NodeMapping<'t, N> {
    pub(super) fn from_pairs(raw: Vec<(usize, &'t N, usize, &'t N)>) -> Self {
        let mut pairs: Vec<_> = raw
            .into_iter()
            .map(|(left_index, left, right_index, right)| MappedPair {
                left_index,
                left,
                right_index,
                right,
            })
            .collect();
        pairs.sort_by_key(|pair| pair.left_index);
        Self { pairs }
    }

    /// Number of mapped pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns whether no node is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the right node that `left` maps to.
    #[must_use]
    pub fn get(&self, left: &N) -> Option<&'t N> {
        self.pairs
            .iter()
            .find(|pair| core::ptr::eq(pair.left, left))
            .map(|pair| pair.right)
    }

    /// Returns whether `left` is mapped.
    #[must_use]
    pub fn contains_left(&self, left: &N) -> bool {
        self.pairs.iter().any(|pair| core::ptr::eq(pair.left, left))
    }

    /// Returns whether `right` is the image of some node.
    #[must_use]
    pub fn contains_right(&self, right: &N) -> bool {
        self.pairs.iter().any(|pair| core::ptr::eq(pair.right, right))
    }

    /// Iterates over `(left, right)` pairs in left pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (&'t N, &'t N)> + '_ {
        self.pairs.iter().map(|pair| (pair.left, pair.right))
    }

    /// Swaps both sides, ordering the result by right pre-order.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut pairs: Vec<_> = self
            .pairs
            .iter()
            .map(|pair| MappedPair {
                left_index: pair.right_index,
                left: pair.right,
                right_index: pair.left_index,
                right: pair.left,
            })
            .collect();
        pairs.sort_by_key(|pair| pair.left_index);
        Self { pairs }
    }
}

impl<N: Tree> NodeMapping<'_, N> {
    /// Re-derives the cost of the edit script this mapping describes:
    /// relabelling every pair, deleting unmapped left nodes and inserting
    /// unmapped right nodes.
    #[must_use]
    pub fn total_cost<C>(&self, left: Option<&N>, right: Option<&N>, cost: &C) -> f64
    where
        C: CostFunction<N::Attribute> + ?Sized,
    {
        let mapped_left: HashSet<*const N> = self
            .pairs
            .iter()
            .map(|pair| core::ptr::from_ref(pair.left))
            .collect();
        let mapped_right: HashSet<*const N> = self
            .pairs
            .iter()
            .map(|pair| core::ptr::from_ref(pair.right))
            .collect();

        let relabel: f64 = self
            .pairs
            .iter()
            .map(|pair| cost.cost(Some(pair.left.attribute()), Some(pair.right.attribute())))
            .sum();
        let delete: f64 = left
            .map(Tree::subtrees)
            .unwrap_or_default()
            .into_iter()
            .filter(|node| !mapped_left.contains(&core::ptr::from_ref(*node)))
            .map(|node| cost.cost(Some(node.attribute()), None))
            .sum();
        let insert: f64 = right
            .map(Tree::subtrees)
            .unwrap_or_default()
            .into_iter()
            .filter(|node| !mapped_right.contains(&core::ptr::from_ref(*node)))
            .map(|node| cost.cost(None, Some(node.attribute())))
            .sum();
        relabel + delete + insert
    }
}
