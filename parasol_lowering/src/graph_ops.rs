use std::collections::HashSet;

use petgraph::{
    Direction, prelude::StableGraph, stable_graph::NodeIndex, visit::IntoNodeIdentifiers,
};

/// Visit every node of `graph` such that a node's predecessors are visited before it.
///
/// # Remarks
/// Nodes on a cycle are never ready and are silently skipped; callers that care should compare
/// the number of visited nodes against [`StableGraph::node_count`].
///
/// The traversal stops at the first error `callback` returns.
pub fn forward_traverse<N, E, F, Err>(graph: &StableGraph<N, E>, mut callback: F) -> Result<(), Err>
where
    F: FnMut(NodeIndex) -> Result<(), Err>,
{
    let mut ready: HashSet<NodeIndex> = HashSet::new();
    let mut visited: HashSet<NodeIndex> = HashSet::new();

    let mut ready_nodes: Vec<NodeIndex> = graph
        .node_identifiers()
        .filter(|&x| {
            graph
                .neighbors_directed(x, Direction::Incoming)
                .next()
                .is_none()
        })
        .collect();

    ready.extend(ready_nodes.iter());

    // Pop sources in index order.
    ready_nodes.reverse();

    while let Some(n) = ready_nodes.pop() {
        visited.insert(n);

        callback(n)?;

        for i in graph.neighbors_directed(n, Direction::Outgoing) {
            let node_ready = graph
                .neighbors_directed(i, Direction::Incoming)
                .all(|m| visited.contains(&m));

            if !ready.contains(&i) && node_ready {
                ready.insert(i);
                ready_nodes.push(i);
            }
        }
    }

    Ok(())
}
