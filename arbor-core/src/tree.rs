//! Rooted, unordered, node-weighted trees.
//!
//! The edit-distance engine only needs three capabilities from a tree: the
//! attribute of a node, the node's children and whether it is a leaf. Any
//! type exposing them through [`Tree`] can be compared and classified; the
//! crate ships [`SimpleTree`] as the in-memory implementation.
//!
//! Children carry no order semantically. Their iteration order is still used
//! to make tie-breaking deterministic, so the same input always yields the
//! same node mapping.

/// Read-only view over a rooted tree whose nodes carry a scalar attribute.
///
/// Implementations must be acyclic and of finite depth. Node identity is the
/// address of the node value, so two attribute-equal subtrees at different
/// positions remain distinct.
///
/// # Examples
/// ```
/// use arbor_core::{SimpleTree, Tree};
///
/// let tree = SimpleTree::with_children(20.0, [SimpleTree::new(10.0), SimpleTree::new(30.0)]);
/// assert_eq!(tree.attribute(), 20.0);
/// assert_eq!(tree.children().len(), 2);
/// assert_eq!(tree.size(), 3);
/// assert!(!tree.is_leaf());
/// ```
pub trait Tree: Sized {
    /// Scalar payload carried by every node, e.g. a lifespan or a weight.
    type Attribute: Copy;

    /// Returns the attribute of this node.
    fn attribute(&self) -> Self::Attribute;

    /// Returns the direct children of this node.
    fn children(&self) -> &[Self];

    /// Returns whether this node has no children.
    #[must_use]
    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Counts every node of the tree rooted here, the root included.
    #[must_use]
    fn size(&self) -> usize {
        let mut count = 0_usize;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count = count.saturating_add(1);
            stack.extend(node.children());
        }
        count
    }

    /// Lists every subtree of the tree rooted here in pre-order, starting
    /// with the root itself.
    #[must_use]
    fn subtrees(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().iter().rev());
        }
        out
    }
}

/// Returns the node count of an optional tree, `0` for the empty tree.
pub(crate) fn optional_size<N: Tree>(tree: Option<&N>) -> usize {
    tree.map_or(0, Tree::size)
}

/// Owned in-memory tree.
///
/// # Examples
/// ```
/// use arbor_core::{SimpleTree, Tree};
///
/// let mut root = SimpleTree::new(1.0);
/// let branch = root.add_child(SimpleTree::new(1.0));
/// branch.add_child(SimpleTree::new(100.0));
/// root.add_child(SimpleTree::new(1.0));
///
/// let attributes: Vec<f64> = root.subtrees().iter().map(|node| node.attribute()).collect();
/// assert_eq!(attributes, [1.0, 1.0, 100.0, 1.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleTree<T> {
    attribute: T,
    children: Vec<SimpleTree<T>>,
}

impl<T> SimpleTree<T> {
    /// Creates a leaf carrying `attribute`.
    #[must_use]
    pub fn new(attribute: T) -> Self {
        Self {
            attribute,
            children: Vec::new(),
        }
    }

    /// Creates a node carrying `attribute` with the given children.
    #[must_use]
    pub fn with_children(attribute: T, children: impl IntoIterator<Item = Self>) -> Self {
        Self {
            attribute,
            children: children.into_iter().collect(),
        }
    }

    /// Appends `child` and returns a handle to it so callers can keep
    /// growing that branch.
    pub fn add_child(&mut self, child: Self) -> &mut Self {
        let index = self.children.len();
        self.children.push(child);
        &mut self.children[index]
    }
}

impl<T: Copy> Tree for SimpleTree<T> {
    type Attribute = T;

    fn attribute(&self) -> T {
        self.attribute
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}
