//! Minimum-cost maximum flow over small directed networks.
//!
//! The tree edit-distance engine poses every child-assignment subproblem as a
//! flow network with one source, one sink and two layers of nodes in between.
//! [`max_flow_min_cost`] solves such a network in two stages:
//!
//! 1. a preflow-push (push-relabel) pass finds the maximum flow value while
//!    ignoring edge costs;
//! 2. successive shortest augmenting paths (Bellman–Ford over the residual
//!    network) route exactly that amount from source to sink at minimum total
//!    cost.
//!
//! Edges are scanned in insertion order throughout, so among several optimal
//! flows the solver always returns the one that prefers earlier edges. Callers
//! rely on this to obtain stable node mappings.

mod min_cost;
mod push_relabel;
mod residual;

use thiserror::Error;
use tracing::trace;

use crate::error::define_error_codes;

use self::residual::ResidualGraph;

/// Capacity of a network edge.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Capacity {
    /// The edge carries at most this many units.
    Finite(u64),
    /// The edge never saturates. A source-to-sink path made only of unbounded
    /// edges makes the maximum flow infinite, which the solver reports as
    /// [`FlowError::UnboundedFlow`].
    Unbounded,
}

impl From<u64> for Capacity {
    fn from(value: u64) -> Self {
        Self::Finite(value)
    }
}

/// Identifier of an edge, in insertion order.
pub type EdgeId = usize;

/// A directed edge of a [`FlowNetwork`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowEdge {
    from: usize,
    to: usize,
    capacity: Capacity,
    cost: f64,
}

impl FlowEdge {
    /// Tail node of the edge.
    #[must_use]
    pub fn from(&self) -> usize {
        self.from
    }

    /// Head node of the edge.
    #[must_use]
    pub fn to(&self) -> usize {
        self.to
    }

    /// Capacity of the edge.
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Cost of routing one unit along the edge.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

/// Directed network with per-edge capacities and unit costs.
///
/// # Examples
/// ```
/// use arbor_core::flow::{Capacity, FlowNetwork, max_flow_min_cost};
///
/// let mut network = FlowNetwork::new(4);
/// let cheap = network.add_edge(0, 1, Capacity::Finite(1), 1.0)?;
/// network.add_edge(0, 2, Capacity::Finite(1), 5.0)?;
/// network.add_edge(1, 3, Capacity::Finite(2), 0.0)?;
/// network.add_edge(2, 3, Capacity::Finite(2), 0.0)?;
///
/// let flow = max_flow_min_cost(&network, 0, 3)?;
/// assert_eq!(flow.value(), 2);
/// assert_eq!(flow.cost(), 6.0);
/// assert_eq!(flow.flow(cheap), 1);
/// # Ok::<(), arbor_core::flow::FlowError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowNetwork {
    node_count: usize,
    edges: Vec<FlowEdge>,
}

impl FlowNetwork {
    /// Creates a network with `node_count` nodes and no edges.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
        }
    }

    /// Appends a node and returns its identifier.
    pub fn add_node(&mut self) -> usize {
        let node = self.node_count;
        self.node_count += 1;
        node
    }

    /// Appends an edge and returns its identifier.
    ///
    /// # Errors
    /// Returns [`FlowError::InvalidNode`] when either endpoint does not exist
    /// and [`FlowError::InvalidCost`] when `cost` is negative or not finite.
    pub fn add_edge(
        &mut self,
        from: usize,
        to: usize,
        capacity: Capacity,
        cost: f64,
    ) -> Result<EdgeId, FlowError> {
        self.check_node(from)?;
        self.check_node(to)?;
        if !cost.is_finite() || cost < 0.0 {
            return Err(FlowError::InvalidCost { from, to, cost });
        }
        self.edges.push(FlowEdge {
            from,
            to,
            capacity,
            cost,
        });
        Ok(self.edges.len() - 1)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    fn check_node(&self, node: usize) -> Result<(), FlowError> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(FlowError::InvalidNode {
                node,
                node_count: self.node_count,
            })
        }
    }

    /// Capacity standing in for [`Capacity::Unbounded`]: one more than every
    /// finite capacity combined, so no finite cut can reach it.
    fn unbounded_stand_in(&self) -> u64 {
        self.edges
            .iter()
            .filter_map(|edge| match edge.capacity {
                Capacity::Finite(value) => Some(value),
                Capacity::Unbounded => None,
            })
            .fold(1_u64, u64::saturating_add)
    }
}

/// A maximum flow of minimum total cost.
#[derive(Clone, Debug, PartialEq)]
pub struct MinCostFlow {
    flows: Vec<u64>,
    value: u64,
    cost: f64,
}

impl MinCostFlow {
    /// Units routed along `edge`; `0` for unknown edges.
    #[must_use]
    pub fn flow(&self, edge: EdgeId) -> u64 {
        self.flows.get(edge).copied().unwrap_or(0)
    }

    /// Per-edge flow in edge insertion order.
    #[must_use]
    pub fn flows(&self) -> &[u64] {
        &self.flows
    }

    /// Total units leaving the source.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Sum of `flow * cost` over every edge.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

/// Errors raised by [`max_flow_min_cost`] and [`FlowNetwork::add_edge`].
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum FlowError {
    /// An edge or terminal referred to a node outside the network.
    #[error("node {node} is out of range for a network of {node_count} nodes")]
    InvalidNode {
        /// Offending node identifier.
        node: usize,
        /// Number of nodes in the network.
        node_count: usize,
    },
    /// Source and sink were the same node.
    #[error("source and sink must differ (both are node {node})")]
    SourceIsSink {
        /// The node used as both terminals.
        node: usize,
    },
    /// An edge cost was negative or not finite.
    #[error("edge {from} -> {to} has invalid cost {cost}")]
    InvalidCost {
        /// Tail of the offending edge.
        from: usize,
        /// Head of the offending edge.
        to: usize,
        /// Rejected cost.
        cost: f64,
    },
    /// A path of unbounded edges joins source and sink.
    #[error("the maximum flow is unbounded")]
    UnboundedFlow,
    /// The cost stage could not route the maximum flow value.
    #[error("only {achieved} of {required} flow units could be routed")]
    Infeasible {
        /// Flow value found by the maximum-flow stage.
        required: u64,
        /// Flow value routed by the cost stage.
        achieved: u64,
    },
}

define_error_codes! {
    /// Machine-readable error codes for [`FlowError`].
    enum FlowErrorCode for FlowError {
        /// An edge or terminal referred to a node outside the network.
        InvalidNode => InvalidNode { .. } => "FLOW_INVALID_NODE",
        /// Source and sink were the same node.
        SourceIsSink => SourceIsSink { .. } => "FLOW_SOURCE_IS_SINK",
        /// An edge cost was negative or not finite.
        InvalidCost => InvalidCost { .. } => "FLOW_INVALID_COST",
        /// A path of unbounded edges joins source and sink.
        UnboundedFlow => UnboundedFlow => "FLOW_UNBOUNDED",
        /// The cost stage could not route the maximum flow value.
        Infeasible => Infeasible { .. } => "FLOW_INFEASIBLE",
    }
}

/// Computes a maximum `source`→`sink` flow of minimum total cost.
///
/// # Errors
/// Returns [`FlowError::InvalidNode`] or [`FlowError::SourceIsSink`] for bad
/// terminals, [`FlowError::UnboundedFlow`] when the flow value is infinite
/// and [`FlowError::Infeasible`] if the cost stage cannot route the value the
/// maximum-flow stage found.
pub fn max_flow_min_cost(
    network: &FlowNetwork,
    source: usize,
    sink: usize,
) -> Result<MinCostFlow, FlowError> {
    network.check_node(source)?;
    network.check_node(sink)?;
    if source == sink {
        return Err(FlowError::SourceIsSink { node: source });
    }

    let stand_in = network.unbounded_stand_in();
    let mut graph = ResidualGraph::new(network, stand_in);
    let required = push_relabel::max_flow_value(&mut graph, source, sink);
    if required >= stand_in {
        return Err(FlowError::UnboundedFlow);
    }

    graph.reset();
    let achieved = min_cost::route(&mut graph, source, sink, required);
    if achieved < required {
        return Err(FlowError::Infeasible { required, achieved });
    }

    let flows = graph.edge_flows();
    let cost = network
        .edges
        .iter()
        .zip(&flows)
        .map(|(edge, &units)| edge.cost * units as f64)
        .sum();
    trace!(
        nodes = network.node_count,
        edges = network.edges.len(),
        value = required,
        cost,
        "solved min-cost flow"
    );
    Ok(MinCostFlow {
        flows,
        value: required,
        cost,
    })
}
