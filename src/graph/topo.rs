use std::collections::VecDeque;

use crate::model::{Relationship, Table};

use super::TableGraph;

/// Table names ordered so that referenced tables come first.
///
/// Edges run from a relationship's target to its source. Self references
/// and relationships naming unknown tables are ignored. Kahn's algorithm
/// drains a FIFO queue seeded in input order; tables left over because
/// they sit on a cycle are appended in input order.
pub fn topological_order<'a, I>(tables: I, relationships: &[Relationship]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut graph = TableGraph::new(tables);
    for rel in relationships.iter().filter(|r| !r.is_self_reference()) {
        graph.add_edge(&rel.target_table, &rel.source_table);
    }

    let mut in_degree: Vec<usize> = graph.nodes().map(|n| graph.in_degree(n)).collect();
    let mut queue: VecDeque<_> = graph.nodes().filter(|n| in_degree[n.index()] == 0).collect();
    let mut placed = vec![false; graph.node_count()];
    let mut order = Vec::with_capacity(graph.node_count());

    while let Some(node) = queue.pop_front() {
        placed[node.index()] = true;
        order.push(graph.name(node).to_string());

        for dependent in graph.successors(node) {
            let degree = &mut in_degree[dependent.index()];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    order.extend(
        graph
            .nodes()
            .filter(|n| !placed[n.index()])
            .map(|n| graph.name(n).to_string()),
    );
    order
}

/// Reorder tables topologically. See [`topological_order`].
pub fn topological_sort(tables: Vec<Table>, relationships: &[Relationship]) -> Vec<Table> {
    let order = topological_order(tables.iter().map(|t| t.name.as_str()), relationships);

    let mut slots: Vec<Option<Table>> = tables.into_iter().map(Some).collect();
    let mut sorted = Vec::with_capacity(slots.len());
    for name in &order {
        if let Some(table) = slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|t| &t.name == name))
            .and_then(Option::take)
        {
            sorted.push(table);
        }
    }
    // Duplicate names map to a single node; keep the extra copies.
    sorted.extend(slots.into_iter().flatten());
    sorted
}
