//! Visible subgraph derived from collapse flags
//!
//! Collapsing a node hides every descendant without removing it. Nothing here
//! is cached: the view is recomputed from the flags on every call.

use std::collections::HashSet;

use super::adjacency::Adjacency;
use super::model::{GraphEdge, GraphNode};

/// Nodes and edges not hidden by a collapsed ancestor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisibleGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl VisibleGraph {
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }
}

/// Ids hidden because some ancestor is collapsed
pub fn hidden_ids<'a>(nodes: &'a [GraphNode], edges: &'a [GraphEdge]) -> HashSet<&'a str> {
    let adjacency = Adjacency::new(edges);
    let mut hidden = HashSet::new();

    for node in nodes.iter().filter(|node| node.is_collapsed()) {
        // Already covered by an outer collapse
        if hidden.contains(node.id.as_str()) {
            continue;
        }
        hidden.extend(adjacency.descendants(&node.id));
    }

    hidden
}

pub fn visible_subgraph(nodes: &[GraphNode], edges: &[GraphEdge]) -> VisibleGraph {
    let hidden = hidden_ids(nodes, edges);
    if hidden.is_empty() {
        return VisibleGraph {
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
        };
    }

    let nodes: Vec<GraphNode> = nodes
        .iter()
        .filter(|node| !hidden.contains(node.id.as_str()))
        .cloned()
        .collect();
    let visible: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    let edges = edges
        .iter()
        .filter(|edge| {
            visible.contains(edge.source.as_str()) && visible.contains(edge.target.as_str())
        })
        .cloned()
        .collect();

    VisibleGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::BlockData;
    use crate::tree::NodeType;

    fn graph(collapsed: &[&str]) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        // r -> a -> a1 -> a1x, r -> b
        let ids = ["r", "a", "a1", "a1x", "b"];
        let nodes = ids
            .iter()
            .map(|id| {
                let mut data = BlockData::new(*id, NodeType::Paragraph);
                data.is_collapsed = collapsed.contains(id);
                GraphNode::text_block(*id, data)
            })
            .collect();
        let edges = vec![
            GraphEdge::between("r", "a"),
            GraphEdge::between("a", "a1"),
            GraphEdge::between("a1", "a1x"),
            GraphEdge::between("r", "b"),
        ];
        (nodes, edges)
    }

    fn visible_ids(view: &VisibleGraph) -> Vec<&str> {
        view.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_nothing_collapsed() {
        let (nodes, edges) = graph(&[]);
        let view = visible_subgraph(&nodes, &edges);
        assert_eq!(view.nodes, nodes);
        assert_eq!(view.edges, edges);
    }

    #[test]
    fn test_collapse_hides_all_descendants() {
        let (nodes, edges) = graph(&["a"]);
        let view = visible_subgraph(&nodes, &edges);
        assert_eq!(visible_ids(&view), vec!["r", "a", "b"]);
        assert_eq!(
            view.edges,
            vec![GraphEdge::between("r", "a"), GraphEdge::between("r", "b")]
        );
    }

    #[test]
    fn test_nested_collapse_composes() {
        let (nodes, edges) = graph(&["a", "a1"]);
        assert_eq!(visible_ids(&visible_subgraph(&nodes, &edges)), vec!["r", "a", "b"]);

        // Expanding the outer node reveals a1, a1x stays behind its own collapse
        let (nodes, edges) = graph(&["a1"]);
        assert_eq!(
            visible_ids(&visible_subgraph(&nodes, &edges)),
            vec!["r", "a", "a1", "b"]
        );
    }

    #[test]
    fn test_collapsed_leaf_hides_nothing() {
        let (nodes, edges) = graph(&["b"]);
        assert_eq!(visible_subgraph(&nodes, &edges).nodes.len(), 5);
    }

    #[test]
    fn test_hidden_ids() {
        let (nodes, edges) = graph(&["r"]);
        let hidden = hidden_ids(&nodes, &edges);
        assert_eq!(hidden.len(), 4);
        assert!(!hidden.contains("r"));
    }
}
