// src/dag/graph.rs

//! Dependency-graph checks over job ids.
//!
//! The scheduler itself never needs the graph: readiness is evaluated from
//! each job's own dependency list. These helpers are used for the optional
//! cycle check in `add_task`, for config validation and for dry-run output.

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, WavedagError};
use crate::types::JobId;

/// Build a graph with an edge `dep -> job` for every dependency.
fn build_graph<'a, I>(nodes: I) -> DiGraphMap<JobId, ()>
where
    I: IntoIterator<Item = (JobId, &'a [JobId])>,
{
    let mut graph: DiGraphMap<JobId, ()> = DiGraphMap::new();
    for (id, deps) in nodes {
        graph.add_node(id);
        for &dep in deps {
            graph.add_edge(dep, id, ());
        }
    }
    graph
}

/// Topological order of the given jobs, dependencies first.
///
/// Dependency ids that are not themselves listed still appear in the order.
pub fn topological_order<'a, I>(nodes: I) -> Result<Vec<JobId>>
where
    I: IntoIterator<Item = (JobId, &'a [JobId])>,
{
    let graph = build_graph(nodes);
    toposort(&graph, None).map_err(|cycle| {
        WavedagError::DagCycle(format!(
            "cycle detected in job graph involving job {}",
            cycle.node_id()
        ))
    })
}

/// Fail with [`WavedagError::DagCycle`] if the jobs contain a cycle.
pub fn check_acyclic<'a, I>(nodes: I) -> Result<()>
where
    I: IntoIterator<Item = (JobId, &'a [JobId])>,
{
    topological_order(nodes).map(|_| ())
}
