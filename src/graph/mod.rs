//! Table-level dependency graph analysis.
//!
//! Relationships are projected onto a graph whose nodes are table names.
//! Three analyses run over it:
//!
//! - [`topological_sort`]: referenced tables before the tables referencing them
//! - [`find_circular_dependencies`]: cycles among declared foreign keys
//! - [`detect_junction_tables`]: tables that model many-to-many associations

mod cycles;
mod junction;
mod topo;

pub use cycles::find_circular_dependencies;
pub use junction::{detect_junction_tables, JunctionPolicy};
pub use topo::{topological_order, topological_sort};

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

/// Directed graph over table names.
///
/// Node indices follow the order tables were added, and parallel edges
/// between the same pair of tables collapse into one.
#[derive(Debug, Default)]
pub struct TableGraph {
    graph: DiGraph<String, ()>,
    node_index: HashMap<String, NodeIndex>,
}

impl TableGraph {
    pub fn new<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut graph = Self::default();
        for name in tables {
            if !graph.node_index.contains_key(name) {
                let idx = graph.graph.add_node(name.to_string());
                graph.node_index.insert(name.to_string(), idx);
            }
        }
        graph
    }

    /// Add `from → to`. Returns false when either table is unknown.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        match (self.node_index.get(from), self.node_index.get(to)) {
            (Some(&a), Some(&b)) => {
                self.graph.update_edge(a, b, ());
                true
            }
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn index(&self, name: &str) -> Option<NodeIndex> {
        self.node_index.get(name).copied()
    }

    pub fn name(&self, idx: NodeIndex) -> &str {
        self.graph
            .node_weight(idx)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Node indices in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Direct successors in the order their edges were added.
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // petgraph walks the adjacency list newest-first
        let mut out: Vec<_> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        out.reverse();
        out
    }

    /// Number of distinct direct predecessors.
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .count()
    }
}
