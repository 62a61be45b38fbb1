//! Pre-order arena over a borrowed tree.

use crate::tree::Tree;

/// Flattened view of a tree. Index `0` is the root and every child has a
/// larger index than its parent.
#[derive(Debug)]
pub(super) struct IndexedTree<'t, N: Tree> {
    nodes: Vec<&'t N>,
    children: Vec<Vec<usize>>,
}

impl<'t, N: Tree> IndexedTree<'t, N> {
    pub(super) fn new(root: Option<&'t N>) -> Self {
        let mut nodes = Vec::new();
        let mut children: Vec<Vec<usize>> = Vec::new();
        let mut stack: Vec<(&'t N, Option<usize>)> = root.map(|node| (node, None)).into_iter().collect();
        while let Some((node, parent)) = stack.pop() {
            let index = nodes.len();
            nodes.push(node);
            children.push(Vec::with_capacity(node.children().len()));
            if let Some(parent) = parent {
                children[parent].push(index);
            }
            stack.extend(node.children().iter().rev().map(|child| (child, Some(index))));
        }
        Self { nodes, children }
    }

    pub(super) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(super) fn node(&self, index: usize) -> &'t N {
        self.nodes[index]
    }

    pub(super) fn attribute(&self, index: usize) -> N::Attribute {
        self.nodes[index].attribute()
    }

    pub(super) fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimpleTree;

    #[test]
    fn children_follow_their_parent() {
        let tree = SimpleTree::with_children(
            0,
            [
                SimpleTree::with_children(1, [SimpleTree::new(2)]),
                SimpleTree::new(3),
            ],
        );
        let indexed = IndexedTree::new(Some(&tree));

        assert_eq!(indexed.len(), 4);
        assert_eq!(indexed.children(0), &[1, 3]);
        assert_eq!(indexed.children(1), &[2]);
        assert!(indexed.children(3).is_empty());
        let attributes: Vec<i32> = (0..indexed.len()).map(|i| indexed.attribute(i)).collect();
        assert_eq!(attributes, [0, 1, 2, 3]);
        assert!(std::ptr::eq(indexed.node(0), &tree));
    }

    #[test]
    fn empty_tree_has_no_nodes() {
        let indexed = IndexedTree::<SimpleTree<i32>>::new(None);
        assert_eq!(indexed.len(), 0);
    }
}
