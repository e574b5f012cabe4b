//! Dependency ordering of target tables.

use super::error::OrderingError;
use crate::metadata::Table;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Orders the target tables so every table follows the tables it depends on.
///
/// Dependencies are declared by the tables themselves (`Table::dependencies`)
/// and must point at a lower load rank: links depend on hubs, satellites on
/// hubs or links, effectivity satellites on links. The sort is Kahn's
/// algorithm with a `(rank, caller index)` priority queue, so all hubs come
/// before all links before all satellites, and within one rank the caller's
/// order is kept.
pub fn load_order(targets: &[Table]) -> Result<Vec<&Table>, OrderingError> {
    let count = targets.len();
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(count, count);
    let mut by_name: HashMap<&str, NodeIndex> = HashMap::with_capacity(count);

    for (i, table) in targets.iter().enumerate() {
        let node = graph.add_node(i);
        if by_name.insert(table.name(), node).is_some() {
            return Err(OrderingError::DuplicateTarget { table: table.name().to_string() });
        }
    }

    // 1. Declare edges dependency -> dependent
    for (i, table) in targets.iter().enumerate() {
        for dependency in table.dependencies() {
            let &dep_node = by_name.get(dependency).ok_or_else(|| OrderingError::MissingDependency {
                table: table.name().to_string(),
                dependency: dependency.to_string(),
            })?;
            let dep_kind = targets[graph[dep_node]].kind();
            let valid = match table {
                Table::EffectivitySatellite(_) => dep_kind.is_link_like(),
                _ => dep_kind.rank() < table.kind().rank(),
            };
            if !valid {
                return Err(OrderingError::InvalidDependency {
                    table: table.name().to_string(),
                    dependency: dependency.to_string(),
                    kind: dep_kind,
                });
            }
            graph.add_edge(dep_node, NodeIndex::new(i), ());
        }
    }

    // 2. Kahn's algorithm, lowest (rank, index) first
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready = BinaryHeap::with_capacity(count);
    for (i, &degree) in in_degree.iter().enumerate() {
        if degree == 0 {
            ready.push(Reverse((targets[i].kind().rank(), i)));
        }
    }

    let mut order = Vec::with_capacity(count);
    while let Some(Reverse((_, i))) = ready.pop() {
        order.push(&targets[i]);
        for child in graph.neighbors_directed(NodeIndex::new(i), Direction::Outgoing) {
            let c = child.index();
            in_degree[c] -= 1;
            if in_degree[c] == 0 {
                ready.push(Reverse((targets[c].kind().rank(), c)));
            }
        }
    }

    if order.len() != count {
        let tables = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d > 0)
            .map(|(i, _)| targets[i].name().to_string())
            .collect();
        return Err(OrderingError::Cycle { tables });
    }

    Ok(order)
}
