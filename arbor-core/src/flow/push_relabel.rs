//! FIFO preflow-push maximum flow.

use std::collections::VecDeque;

use super::residual::ResidualGraph;

/// Returns the maximum flow value from `source` to `sink`, leaving the
/// preflow in `graph`.
pub(super) fn max_flow_value(graph: &mut ResidualGraph, source: usize, sink: usize) -> u64 {
    let nodes = graph.node_count();
    let mut height = vec![0_usize; nodes];
    let mut excess = vec![0_u64; nodes];
    let mut cursor = vec![0_usize; nodes];
    let mut active = VecDeque::new();

    height[source] = nodes;
    for index in 0..graph.outgoing(source).len() {
        let arc_id = graph.outgoing(source)[index];
        let arc = graph.arc(arc_id);
        if arc.residual == 0 {
            continue;
        }
        graph.push(arc_id, arc.residual);
        if arc.to != source && arc.to != sink && excess[arc.to] == 0 {
            active.push_back(arc.to);
        }
        excess[arc.to] = excess[arc.to].saturating_add(arc.residual);
    }

    while let Some(node) = active.pop_front() {
        discharge(
            graph,
            node,
            Terminals { source, sink },
            &mut State {
                height: &mut height,
                excess: &mut excess,
                cursor: &mut cursor,
                active: &mut active,
            },
        );
    }

    excess[sink]
}

#[derive(Clone, Copy)]
struct Terminals {
    source: usize,
    sink: usize,
}

struct State<'a> {
    height: &'a mut [usize],
    excess: &'a mut [u64],
    cursor: &'a mut [usize],
    active: &'a mut VecDeque<usize>,
}

fn discharge(graph: &mut ResidualGraph, node: usize, terminals: Terminals, state: &mut State<'_>) {
    while state.excess[node] > 0 {
        let Some(&arc_id) = graph.outgoing(node).get(state.cursor[node]) else {
            if !relabel(graph, node, state) {
                break;
            }
            state.cursor[node] = 0;
            continue;
        };
        let arc = graph.arc(arc_id);
        if arc.residual > 0 && state.height[node] == state.height[arc.to] + 1 {
            let units = state.excess[node].min(arc.residual);
            graph.push(arc_id, units);
            state.excess[node] -= units;
            let target = arc.to;
            if target != terminals.source && target != terminals.sink && state.excess[target] == 0
            {
                state.active.push_back(target);
            }
            state.excess[target] = state.excess[target].saturating_add(units);
        } else {
            state.cursor[node] += 1;
        }
    }
}

/// Lifts `node` just above its lowest residual neighbour. Returns `false`
/// when `node` has no residual arc at all.
fn relabel(graph: &ResidualGraph, node: usize, state: &mut State<'_>) -> bool {
    let lowest = graph
        .outgoing(node)
        .iter()
        .map(|&arc_id| graph.arc(arc_id))
        .filter(|arc| arc.residual > 0)
        .map(|arc| state.height[arc.to])
        .min();
    match lowest {
        Some(lowest) => {
            state.height[node] = lowest + 1;
            true
        }
        None => false,
    }
}
