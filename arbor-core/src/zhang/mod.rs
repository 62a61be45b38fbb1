//! Constrained unordered tree edit distance.
//!
//! Implements Zhang's distance between rooted unordered trees: the cheapest
//! sequence of relabel, delete and insert operations turning one tree into
//! the other, where disjoint subtrees must stay disjoint. For every pair of
//! subtrees `(T1[i], T2[j])` the engine tabulates two quantities:
//!
//! - `d(T1[i], T2[j])`, the distance between the subtrees, and
//! - `d(F1[i], F2[j])`, the distance between their child forests.
//!
//! Both tables are filled bottom-up over pre-order arena indices. Children
//! always have larger indices than their parent, so walking both index ranges
//! in descending order visits every dependency first and no recursion on the
//! tree depth is needed. Forest distances between two non-empty child sets
//! are minimum-cost assignments solved with [`crate::flow`].
//!
//! Ties between equally cheap alternatives are broken in a fixed order: keep
//! both roots, then insert the right root (lowest child first), then delete
//! the left root (lowest child first). A later alternative only wins when it
//! is strictly cheaper, so results are stable for a given child order.
//! Swapping the arguments swaps insert and delete in that order, so when
//! several mappings share the minimum cost the swapped call may return a
//! different one; its cost always equals the distance.

mod indexed;
mod mapping;
mod matching;

use core::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{
    cost::CostFunction,
    error::define_error_codes,
    flow::FlowError,
    tree::Tree,
};

use self::{
    indexed::IndexedTree,
    matching::{Prices, match_children},
};

pub use self::mapping::NodeMapping;

/// Edit operation priced by a cost function.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EditOperation {
    /// Turning one attribute into another.
    Relabel,
    /// Removing a node of the left tree.
    Delete,
    /// Adding a node of the right tree.
    Insert,
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relabel => f.write_str("relabel"),
            Self::Delete => f.write_str("delete"),
            Self::Insert => f.write_str("insert"),
        }
    }
}

/// Errors raised while computing a tree edit distance.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum TreeDistanceError {
    /// The cost function returned a negative or non-finite value.
    #[error("{operation} cost must be finite and non-negative (got {cost})")]
    InvalidCost {
        /// Operation being priced.
        operation: EditOperation,
        /// Rejected value.
        cost: f64,
    },
    /// A child assignment could not be solved.
    #[error(transparent)]
    Flow(#[from] FlowError),
}

define_error_codes! {
    /// Machine-readable error codes for [`TreeDistanceError`].
    enum TreeDistanceErrorCode for TreeDistanceError {
        /// The cost function returned a negative or non-finite value.
        InvalidCost => InvalidCost { .. } => "TREE_DISTANCE_INVALID_COST",
        /// A child assignment could not be solved.
        FlowFailure => Flow(..) => "TREE_DISTANCE_FLOW_FAILURE",
    }
}

fn checked(operation: EditOperation, cost: f64) -> Result<f64, TreeDistanceError> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(cost)
    } else {
        Err(TreeDistanceError::InvalidCost { operation, cost })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TreeChoice {
    KeepRoots,
    InsertRight { child: usize },
    DeleteLeft { child: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ForestChoice {
    /// One of the forests is empty; nothing maps.
    Empty,
    /// Index into the stored child matchings.
    Match { matching: usize },
    InsertRight { child: usize },
    DeleteLeft { child: usize },
}

/// Per-subtree totals for removing or adding whole subtrees.
#[derive(Debug, Default)]
struct WholeCosts {
    /// `d(T[i], ∅)` or `d(∅, T[i])`.
    tree: Vec<f64>,
    /// `d(F[i], ∅)` or `d(∅, F[i])`.
    forest: Vec<f64>,
}

impl WholeCosts {
    fn new<N: Tree>(
        tree: &IndexedTree<'_, N>,
        mut single: impl FnMut(N::Attribute) -> Result<f64, TreeDistanceError>,
    ) -> Result<Self, TreeDistanceError> {
        let mut totals = Self {
            tree: vec![0.0; tree.len()],
            forest: vec![0.0; tree.len()],
        };
        for index in (0..tree.len()).rev() {
            let forest: f64 = tree
                .children(index)
                .iter()
                .map(|&child| totals.tree[child])
                .sum();
            totals.forest[index] = forest;
            totals.tree[index] = single(tree.attribute(index))? + forest;
        }
        Ok(totals)
    }

    fn root(&self) -> f64 {
        self.tree.first().copied().unwrap_or(0.0)
    }
}

/// Square-ish table indexed by `(left, right)` arena pairs.
#[derive(Debug)]
struct Table<T> {
    columns: usize,
    cells: Vec<T>,
}

impl<T: Copy> Table<T> {
    fn new(rows: usize, columns: usize, fill: T) -> Self {
        Self {
            columns,
            cells: vec![fill; rows * columns],
        }
    }

    fn get(&self, row: usize, column: usize) -> T {
        self.cells[row * self.columns + column]
    }

    fn set(&mut self, row: usize, column: usize, value: T) {
        self.cells[row * self.columns + column] = value;
    }
}

/// Keeps the first minimum seen; later candidates must be strictly cheaper.
struct Best<C> {
    cost: f64,
    choice: C,
}

impl<C> Best<C> {
    fn offer(&mut self, cost: f64, choice: C) {
        if cost < self.cost {
            self.cost = cost;
            self.choice = choice;
        }
    }
}

/// The solved edit distance between two optional trees.
///
/// Holds the full subtree-pair tables so the optimal mapping can be read back
/// without recomputation.
///
/// # Examples
/// ```
/// use arbor_core::{LocalCost, SimpleTree, TreeEditDistance};
///
/// let left = SimpleTree::with_children(20.0, [SimpleTree::new(10.0), SimpleTree::new(30.0)]);
/// let right = SimpleTree::with_children(30.0, [SimpleTree::new(10.0), SimpleTree::new(20.0)]);
///
/// let solved = TreeEditDistance::compute(Some(&left), Some(&right), &LocalCost::Absolute)?;
/// assert_eq!(solved.distance(), 20.0);
/// assert_eq!(solved.deletion_cost(), 60.0);
/// assert_eq!(solved.mapping().len(), 3);
/// # Ok::<(), arbor_core::TreeDistanceError>(())
/// ```
#[derive(Debug)]
pub struct TreeEditDistance<'t, N: Tree> {
    left: IndexedTree<'t, N>,
    right: IndexedTree<'t, N>,
    deletion: WholeCosts,
    insertion: WholeCosts,
    tree: Table<f64>,
    tree_choice: Table<TreeChoice>,
    forest_choice: Table<ForestChoice>,
    matchings: Vec<Box<[(usize, usize)]>>,
}

impl<'t, N: Tree> TreeEditDistance<'t, N> {
    /// Solves the edit distance between `left` and `right`. `None` stands for
    /// the empty tree.
    ///
    /// # Errors
    /// Returns [`TreeDistanceError::InvalidCost`] when `cost` prices any
    /// reachable operation with a negative or non-finite value and
    /// [`TreeDistanceError::Flow`] if a child assignment fails.
    pub fn compute<C>(
        left: Option<&'t N>,
        right: Option<&'t N>,
        cost: &C,
    ) -> Result<Self, TreeDistanceError>
    where
        C: CostFunction<N::Attribute> + ?Sized,
    {
        let left = IndexedTree::new(left);
        let right = IndexedTree::new(right);
        let deletion = WholeCosts::new(&left, |value| {
            checked(EditOperation::Delete, cost.cost(Some(value), None))
        })?;
        let insertion = WholeCosts::new(&right, |value| {
            checked(EditOperation::Insert, cost.cost(None, Some(value)))
        })?;

        let (rows, columns) = (left.len(), right.len());
        let mut solved = Self {
            left,
            right,
            deletion,
            insertion,
            tree: Table::new(rows, columns, 0.0),
            tree_choice: Table::new(rows, columns, TreeChoice::KeepRoots),
            forest_choice: Table::new(rows, columns, ForestChoice::Empty),
            matchings: Vec::new(),
        };
        let mut forest = Table::new(rows, columns, 0.0);
        for i in (0..rows).rev() {
            for j in (0..columns).rev() {
                solved.fill_forest(&mut forest, i, j)?;
                let relabel = checked(
                    EditOperation::Relabel,
                    cost.cost(
                        Some(solved.left.attribute(i)),
                        Some(solved.right.attribute(j)),
                    ),
                )?;
                solved.fill_tree(&forest, i, j, relabel);
            }
        }

        debug!(
            left_nodes = rows,
            right_nodes = columns,
            distance = solved.distance(),
            "computed tree edit distance"
        );
        Ok(solved)
    }

    fn fill_forest(
        &mut self,
        forest: &mut Table<f64>,
        i: usize,
        j: usize,
    ) -> Result<(), TreeDistanceError> {
        let left_children = self.left.children(i);
        let right_children = self.right.children(j);
        if left_children.is_empty() || right_children.is_empty() {
            let value = if left_children.is_empty() {
                self.insertion.forest[j]
            } else {
                self.deletion.forest[i]
            };
            forest.set(i, j, value);
            self.forest_choice.set(i, j, ForestChoice::Empty);
            return Ok(());
        }

        let pair = |s: usize, t: usize| self.tree.get(s, t);
        let delete = |s: usize| self.deletion.tree[s];
        let insert = |t: usize| self.insertion.tree[t];
        let matching = match_children(
            left_children,
            right_children,
            &Prices {
                pair: &pair,
                delete: &delete,
                insert: &insert,
            },
        )?;

        let mut best = Best {
            cost: matching.cost,
            choice: ForestChoice::Match {
                matching: self.matchings.len(),
            },
        };
        for &child in right_children {
            best.offer(
                self.insertion.forest[j] + forest.get(i, child) - self.insertion.forest[child],
                ForestChoice::InsertRight { child },
            );
        }
        for &child in left_children {
            best.offer(
                self.deletion.forest[i] + forest.get(child, j) - self.deletion.forest[child],
                ForestChoice::DeleteLeft { child },
            );
        }
        if matches!(best.choice, ForestChoice::Match { .. }) {
            self.matchings.push(matching.pairs);
        }
        forest.set(i, j, best.cost.max(0.0));
        self.forest_choice.set(i, j, best.choice);
        Ok(())
    }

    fn fill_tree(&mut self, forest: &Table<f64>, i: usize, j: usize, relabel: f64) {
        let mut best = Best {
            cost: forest.get(i, j) + relabel,
            choice: TreeChoice::KeepRoots,
        };
        for &child in self.right.children(j) {
            best.offer(
                self.insertion.tree[j] + self.tree.get(i, child) - self.insertion.tree[child],
                TreeChoice::InsertRight { child },
            );
        }
        for &child in self.left.children(i) {
            best.offer(
                self.deletion.tree[i] + self.tree.get(child, j) - self.deletion.tree[child],
                TreeChoice::DeleteLeft { child },
            );
        }
        self.tree.set(i, j, best.cost.max(0.0));
        self.tree_choice.set(i, j, best.choice);
    }

    /// Edit distance between the two trees.
    #[must_use]
    pub fn distance(&self) -> f64 {
        match (self.left.len(), self.right.len()) {
            (0, _) => self.insertion_cost(),
            (_, 0) => self.deletion_cost(),
            _ => self.tree.get(0, 0),
        }
    }

    /// Cost of deleting the whole left tree, `d(T1, ∅)`.
    #[must_use]
    pub fn deletion_cost(&self) -> f64 {
        self.deletion.root()
    }

    /// Cost of inserting the whole right tree, `d(∅, T2)`.
    #[must_use]
    pub fn insertion_cost(&self) -> f64 {
        self.insertion.root()
    }

    /// Node count of the left tree.
    #[must_use]
    pub fn left_size(&self) -> usize {
        self.left.len()
    }

    /// Node count of the right tree.
    #[must_use]
    pub fn right_size(&self) -> usize {
        self.right.len()
    }

    /// Reads back one optimal node mapping.
    #[must_use]
    pub fn mapping(&self) -> NodeMapping<'t, N> {
        let mut pairs = Vec::new();
        if self.left.len() == 0 || self.right.len() == 0 {
            return NodeMapping::from_pairs(pairs);
        }

        let mut pending = vec![Step::Tree(0, 0)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Tree(i, j) => match self.tree_choice.get(i, j) {
                    TreeChoice::KeepRoots => {
                        pairs.push((i, self.left.node(i), j, self.right.node(j)));
                        pending.push(Step::Forest(i, j));
                    }
                    TreeChoice::InsertRight { child } => pending.push(Step::Tree(i, child)),
                    TreeChoice::DeleteLeft { child } => pending.push(Step::Tree(child, j)),
                },
                Step::Forest(i, j) => match self.forest_choice.get(i, j) {
                    ForestChoice::Empty => {}
                    ForestChoice::Match { matching } => pending.extend(
                        self.matchings[matching]
                            .iter()
                            .map(|&(s, t)| Step::Tree(s, t)),
                    ),
                    ForestChoice::InsertRight { child } => pending.push(Step::Forest(i, child)),
                    ForestChoice::DeleteLeft { child } => pending.push(Step::Forest(child, j)),
                },
            }
        }
        NodeMapping::from_pairs(pairs)
    }
}

#[derive(Clone, Copy)]
enum Step {
    Tree(usize, usize),
    Forest(usize, usize),
}

/// Edit distance between two optional trees.
///
/// # Errors
/// Propagates [`TreeDistanceError`] from [`TreeEditDistance::compute`].
pub fn distance<N, C>(left: Option<&N>, right: Option<&N>, cost: &C) -> Result<f64, TreeDistanceError>
where
    N: Tree,
    C: CostFunction<N::Attribute> + ?Sized,
{
    TreeEditDistance::compute(left, right, cost).map(|solved| solved.distance())
}

/// One optimal node mapping between two optional trees.
///
/// # Errors
/// Propagates [`TreeDistanceError`] from [`TreeEditDistance::compute`].
pub fn node_mapping<'t, N, C>(
    left: Option<&'t N>,
    right: Option<&'t N>,
    cost: &C,
) -> Result<NodeMapping<'t, N>, TreeDistanceError>
where
    N: Tree,
    C: CostFunction<N::Attribute> + ?Sized,
{
    TreeEditDistance::compute(left, right, cost).map(|solved| solved.mapping())
}
