use petgraph::graph::NodeIndex;

use crate::model::{Relationship, Table};

use super::TableGraph;

/// A node on the walk and its not-yet-visited successors.
type Frame = (NodeIndex, std::vec::IntoIter<NodeIndex>);

struct CycleSearch<'g> {
    graph: &'g TableGraph,
    visited: Vec<bool>,
    on_stack: Vec<bool>,
    path: Vec<NodeIndex>,
    cycles: Vec<Vec<String>>,
}

impl CycleSearch<'_> {
    /// Depth-first walk from `root` with an explicit stack of successor lists.
    fn visit(&mut self, root: NodeIndex) {
        let mut stack: Vec<Frame> = Vec::new();
        self.enter(root, &mut stack);

        while let Some((node, successors)) = stack.last_mut() {
            match successors.next() {
                Some(next) if !self.visited[next.index()] => self.enter(next, &mut stack),
                Some(next) => {
                    if self.on_stack[next.index()] {
                        self.record(next);
                    }
                }
                None => {
                    let node = *node;
                    stack.pop();
                    self.path.pop();
                    self.on_stack[node.index()] = false;
                }
            }
        }
    }

    fn enter(&mut self, node: NodeIndex, stack: &mut Vec<Frame>) {
        self.visited[node.index()] = true;
        self.on_stack[node.index()] = true;
        self.path.push(node);
        stack.push((node, self.graph.successors(node).into_iter()));
    }

    /// The path from `reentry` to the current node closes a cycle.
    fn record(&mut self, reentry: NodeIndex) {
        if let Some(start) = self.path.iter().position(|&n| n == reentry) {
            let cycle = self.path[start..]
                .iter()
                .map(|&n| self.graph.name(n).to_string())
                .collect();
            self.cycles.push(cycle);
        }
    }
}

/// Cycles among declared (non-inferred) foreign keys.
///
/// Each cycle lists table names from the first table reached on the cycle
/// through the last one before it closes. A table referencing itself is a
/// one-table cycle. The same cycle can be reported from different entry
/// points; results are not deduplicated.
pub fn find_circular_dependencies(
    tables: &[Table],
    relationships: &[Relationship],
) -> Vec<Vec<String>> {
    let mut graph = TableGraph::new(tables.iter().map(|t| t.name.as_str()));
    for rel in relationships.iter().filter(|r| !r.is_inferred) {
        graph.add_edge(&rel.source_table, &rel.target_table);
    }

    let mut search = CycleSearch {
        graph: &graph,
        visited: vec![false; graph.node_count()],
        on_stack: vec![false; graph.node_count()],
        path: Vec::new(),
        cycles: Vec::new(),
    };
    for node in graph.nodes() {
        if !search.visited[node.index()] {
            search.visit(node);
        }
    }
    search.cycles
}
