//! Residual network shared by both solver stages.
//!
//! Edge `e` of the input network becomes arc `2e` (forward) and arc `2e + 1`
//! (backward). Adjacency lists keep insertion order.

use super::{Capacity, FlowNetwork};

#[derive(Clone, Copy, Debug)]
pub(super) struct Arc {
    pub(super) to: usize,
    pub(super) residual: u64,
    pub(super) cost: f64,
}

#[derive(Debug)]
pub(super) struct ResidualGraph {
    arcs: Vec<Arc>,
    capacities: Vec<u64>,
    adjacency: Vec<Vec<usize>>,
}

impl ResidualGraph {
    pub(super) fn new(network: &FlowNetwork, stand_in: u64) -> Self {
        let mut arcs = Vec::with_capacity(network.edges.len() * 2);
        let mut capacities = Vec::with_capacity(network.edges.len());
        let mut adjacency = vec![Vec::new(); network.node_count];
        for edge in &network.edges {
            let capacity = match edge.capacity {
                Capacity::Finite(value) => value,
                Capacity::Unbounded => stand_in,
            };
            adjacency[edge.from].push(arcs.len());
            arcs.push(Arc {
                to: edge.to,
                residual: capacity,
                cost: edge.cost,
            });
            adjacency[edge.to].push(arcs.len());
            arcs.push(Arc {
                to: edge.from,
                residual: 0,
                cost: -edge.cost,
            });
            capacities.push(capacity);
        }
        Self {
            arcs,
            capacities,
            adjacency,
        }
    }

    pub(super) fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub(super) fn outgoing(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    pub(super) fn arc(&self, arc: usize) -> Arc {
        self.arcs[arc]
    }

    /// Moves `units` along `arc`, crediting its partner.
    pub(super) fn push(&mut self, arc: usize, units: u64) {
        self.arcs[arc].residual -= units;
        self.arcs[arc ^ 1].residual += units;
    }

    /// Restores every arc to its zero-flow state.
    pub(super) fn reset(&mut self) {
        for (edge, &capacity) in self.capacities.iter().enumerate() {
            self.arcs[2 * edge].residual = capacity;
            self.arcs[2 * edge + 1].residual = 0;
        }
    }

    pub(super) fn edge_flows(&self) -> Vec<u64> {
        (0..self.capacities.len())
            .map(|edge| self.arcs[2 * edge + 1].residual)
            .collect()
    }
}
