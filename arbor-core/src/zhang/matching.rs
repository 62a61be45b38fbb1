//! Optimal assignment between two child sets.
//!
//! Children of the left node may pair with children of the right node, be
//! deleted, or leave a right child to be inserted. The problem is posed as a
//! flow network:
//!
//! ```text
//! source -> left child  (1, 0)        left child  -> right child (1, d(s, t))
//! source -> empty left  (|right|, 0)  left child  -> empty right (1, delete s)
//! empty left -> right child (1, insert t)
//! empty left -> empty right (unbounded, 0)
//! right child -> sink   (1, 0)        empty right -> sink        (|left|, 0)
//! ```
//!
//! Its maximum flow is `|left| + |right|`; a minimum-cost one selects the
//! pairs whose `left child -> right child` edges carry flow.

use crate::flow::{Capacity, EdgeId, FlowError, FlowNetwork, max_flow_min_cost};

const SOURCE: usize = 0;
const SINK: usize = 1;
const EMPTY_LEFT: usize = 2;
const EMPTY_RIGHT: usize = 3;

/// Cheapest assignment between two child lists.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct ChildMatching {
    pub(super) cost: f64,
    /// Paired children as `(left, right)` arena indices, in left order.
    pub(super) pairs: Box<[(usize, usize)]>,
}

/// Per-child prices for one assignment problem.
pub(super) struct Prices<'a> {
    pub(super) pair: &'a dyn Fn(usize, usize) -> f64,
    pub(super) delete: &'a dyn Fn(usize) -> f64,
    pub(super) insert: &'a dyn Fn(usize) -> f64,
}

pub(super) fn match_children(
    left: &[usize],
    right: &[usize],
    prices: &Prices<'_>,
) -> Result<ChildMatching, FlowError> {
    let left_node = |s: usize| 4 + s;
    let right_node = |t: usize| 4 + left.len() + t;
    let mut network = FlowNetwork::new(4 + left.len() + right.len());
    let mut pair_edges: Vec<(EdgeId, usize, usize)> = Vec::with_capacity(left.len() * right.len());

    for (s, &left_child) in left.iter().enumerate() {
        network.add_edge(SOURCE, left_node(s), Capacity::Finite(1), 0.0)?;
        for (t, &right_child) in right.iter().enumerate() {
            let edge = network.add_edge(
                left_node(s),
                right_node(t),
                Capacity::Finite(1),
                (prices.pair)(left_child, right_child),
            )?;
            pair_edges.push((edge, left_child, right_child));
        }
        network.add_edge(
            left_node(s),
            EMPTY_RIGHT,
            Capacity::Finite(1),
            (prices.delete)(left_child),
        )?;
    }
    network.add_edge(SOURCE, EMPTY_LEFT, Capacity::Finite(right.len() as u64), 0.0)?;
    for (t, &right_child) in right.iter().enumerate() {
        network.add_edge(
            EMPTY_LEFT,
            right_node(t),
            Capacity::Finite(1),
            (prices.insert)(right_child),
        )?;
    }
    network.add_edge(EMPTY_LEFT, EMPTY_RIGHT, Capacity::Unbounded, 0.0)?;
    for t in 0..right.len() {
        network.add_edge(right_node(t), SINK, Capacity::Finite(1), 0.0)?;
    }
    network.add_edge(EMPTY_RIGHT, SINK, Capacity::Finite(left.len() as u64), 0.0)?;

    let flow = max_flow_min_cost(&network, SOURCE, SINK)?;
    let pairs = pair_edges
        .into_iter()
        .filter(|&(edge, _, _)| flow.flow(edge) > 0)
        .map(|(_, left_child, right_child)| (left_child, right_child))
        .collect();
    Ok(ChildMatching {
        cost: flow.cost(),
        pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_cheapest_children() {
        // Left children 10, 30 against right children 10, 20.
        let left_values = [10.0_f64, 30.0];
        let right_values = [10.0_f64, 20.0];
        let pair = |s: usize, t: usize| (left_values[s - 1] - right_values[t - 1]).abs();
        let delete = |s: usize| left_values[s - 1];
        let insert = |t: usize| right_values[t - 1];
        let matching = match_children(
            &[1, 2],
            &[1, 2],
            &Prices {
                pair: &pair,
                delete: &delete,
                insert: &insert,
            },
        )
        .expect("assignment is feasible");

        assert_eq!(matching.cost, 10.0);
        assert_eq!(&*matching.pairs, &[(1, 1), (2, 2)]);
    }

    #[test]
    fn unmatched_children_are_deleted_or_inserted() {
        let pair = |_: usize, _: usize| 50.0;
        let delete = |_: usize| 1.0;
        let insert = |_: usize| 2.0;
        let matching = match_children(
            &[7, 8, 9],
            &[4],
            &Prices {
                pair: &pair,
                delete: &delete,
                insert: &insert,
            },
        )
        .expect("assignment is feasible");

        assert_eq!(matching.cost, 5.0);
        assert!(matching.pairs.is_empty());
    }
}
