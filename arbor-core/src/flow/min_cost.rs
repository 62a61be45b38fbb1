//! Successive shortest augmenting paths.

use super::residual::ResidualGraph;

/// Relaxations must improve a label by more than this to count, which keeps
/// rounding noise from reordering equal-cost paths.
const EPSILON: f64 = 1e-9;

/// Routes up to `demand` units from `source` to `sink` along cheapest
/// residual paths and returns the amount actually routed.
///
/// Costs are non-negative on entry and augmenting along shortest paths never
/// creates a negative cycle, so Bellman–Ford converges in `nodes - 1` rounds.
pub(super) fn route(graph: &mut ResidualGraph, source: usize, sink: usize, demand: u64) -> u64 {
    let mut routed = 0_u64;
    while routed < demand {
        let Some(parents) = shortest_path_tree(graph, source) else {
            break;
        };
        let Some(path) = path_to(graph, &parents, source, sink) else {
            break;
        };
        let bottleneck = path
            .iter()
            .map(|&arc| graph.arc(arc).residual)
            .min()
            .unwrap_or(0)
            .min(demand - routed);
        if bottleneck == 0 {
            break;
        }
        for &arc in &path {
            graph.push(arc, bottleneck);
        }
        routed += bottleneck;
    }
    routed
}

/// Returns the arc used to reach every node on a cheapest path from
/// `source`, or `None` when nothing but the source is reachable.
fn shortest_path_tree(graph: &ResidualGraph, source: usize) -> Option<Vec<Option<usize>>> {
    let nodes = graph.node_count();
    let mut distance = vec![f64::INFINITY; nodes];
    let mut parent = vec![None; nodes];
    distance[source] = 0.0;

    for _ in 1..nodes.max(2) {
        let mut changed = false;
        for node in 0..nodes {
            if !distance[node].is_finite() {
                continue;
            }
            for &arc_id in graph.outgoing(node) {
                let arc = graph.arc(arc_id);
                if arc.residual == 0 {
                    continue;
                }
                let candidate = distance[node] + arc.cost;
                if candidate < distance[arc.to] - EPSILON {
                    distance[arc.to] = candidate;
                    parent[arc.to] = Some(arc_id);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    parent.iter().any(Option::is_some).then_some(parent)
}

/// Walks parent arcs back from `sink`, returning the path in source-to-sink
/// order.
fn path_to(
    graph: &ResidualGraph,
    parents: &[Option<usize>],
    source: usize,
    sink: usize,
) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut node = sink;
    while node != source {
        if path.len() >= parents.len() {
            return None;
        }
        let arc = parents[node]?;
        path.push(arc);
        // The tail of an arc is the head of its partner.
        node = graph.arc(arc ^ 1).to;
    }
    path.reverse();
    Some(path)
}
