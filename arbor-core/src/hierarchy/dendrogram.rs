//! Arena-backed binary merge tree.

/// Identifier of a dendrogram node. Leaves occupy `0..objects` in object
/// order; merges follow in the order they happened.
pub type NodeId = usize;

/// A node of the merge tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ClusterNode {
    /// A single input object.
    Leaf {
        /// Position of the object in the input list.
        object: usize,
        /// Synthetic label derived from the object position.
        label: String,
    },
    /// The union of two clusters.
    Merge {
        /// First merged cluster.
        left: NodeId,
        /// Second merged cluster.
        right: NodeId,
        /// Linkage distance at which the clusters were merged.
        distance: f64,
        /// Number of objects below this node.
        size: usize,
    },
}

impl ClusterNode {
    /// Merge distance, `0` for leaves.
    #[must_use]
    pub fn distance(&self) -> f64 {
        match self {
            Self::Leaf { .. } => 0.0,
            Self::Merge { distance, .. } => *distance,
        }
    }

    /// Number of objects below this node.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Merge { size, .. } => *size,
        }
    }
}

/// Binary merge tree produced by [`crate::agglomerate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Dendrogram {
    nodes: Vec<ClusterNode>,
}

impl Dendrogram {
    pub(super) fn with_leaves(objects: usize) -> Self {
        let nodes = (0..objects)
            .map(|object| ClusterNode::Leaf {
                object,
                label: object.to_string(),
            })
            .collect();
        Self { nodes }
    }

    pub(super) fn push_merge(&mut self, left: NodeId, right: NodeId, distance: f64) -> NodeId {
        let size = self.size_of(left) + self.size_of(right);
        self.nodes.push(ClusterNode::Merge {
            left,
            right,
            distance,
            size,
        });
        self.nodes.len() - 1
    }

    fn size_of(&self, node: NodeId) -> usize {
        self.nodes.get(node).map_or(0, ClusterNode::size)
    }

    /// Total number of nodes, leaves included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the dendrogram has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node spanning every object.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.nodes.len().saturating_sub(1)
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ClusterNode> {
        self.nodes.get(id)
    }

    /// Merge distance of `id`; `None` for leaves and unknown ids.
    #[must_use]
    pub fn merge_distance(&self, id: NodeId) -> Option<f64> {
        match self.nodes.get(id)? {
            ClusterNode::Leaf { .. } => None,
            ClusterNode::Merge { distance, .. } => Some(*distance),
        }
    }

    /// Children of a merge node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match self.nodes.get(id)? {
            ClusterNode::Leaf { .. } => None,
            ClusterNode::Merge { left, right, .. } => Some((*left, *right)),
        }
    }

    /// Object indices below `id`, left branch first.
    #[must_use]
    pub fn leaves(&self, id: NodeId) -> Vec<usize> {
        let mut objects = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.nodes.get(current) {
                Some(ClusterNode::Leaf { object, .. }) => objects.push(*object),
                Some(ClusterNode::Merge { left, right, .. }) => {
                    stack.push(*right);
                    stack.push(*left);
                }
                None => {}
            }
        }
        objects
    }

    /// Every node id ordered by descending merge distance; leaves count as
    /// distance `0` and ties put the higher id first.
    #[must_use]
    pub fn sorted_by_distance(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = (0..self.nodes.len()).collect();
        ids.sort_by(|&a, &b| {
            self.nodes[b]
                .distance()
                .total_cmp(&self.nodes[a].distance())
                .then(b.cmp(&a))
        });
        ids
    }
}
