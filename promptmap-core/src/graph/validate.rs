//! Single-rooted out-tree check for node/edge sets loaded from outside

use std::collections::HashSet;

use super::adjacency::Adjacency;
use super::model::{GraphEdge, GraphNode};
use crate::error::GraphError;

/// Check that the graph is one rooted out-tree and return the root id
pub fn validate(nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<String, GraphError> {
    if nodes.is_empty() {
        return Err(GraphError::Empty);
    }

    let mut ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(GraphError::DuplicateNode(node.id.clone()));
        }
    }

    for edge in edges {
        for endpoint in [&edge.source, &edge.target] {
            if !ids.contains(endpoint.as_str()) {
                return Err(GraphError::DanglingEdge {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
    }

    let adjacency = Adjacency::new(edges);
    if let Some(node) = nodes.iter().find(|node| adjacency.parent_count(&node.id) > 1) {
        return Err(GraphError::MultipleParents(node.id.clone()));
    }

    let root = match adjacency.roots(nodes).as_slice() {
        [] => return Err(GraphError::NoRoot),
        [root] => root.id.clone(),
        roots => {
            return Err(GraphError::MultipleRoots(
                roots.iter().map(|node| node.id.clone()).collect(),
            ))
        }
    };

    // With one parent per node, anything the root cannot reach sits on a cycle
    let reachable: HashSet<&str> = adjacency.descendants(&root).into_iter().collect();
    let unreachable: Vec<String> = nodes
        .iter()
        .filter(|node| node.id != root && !reachable.contains(node.id.as_str()))
        .map(|node| node.id.clone())
        .collect();
    if !unreachable.is_empty() {
        return Err(GraphError::Unreachable { root, unreachable });
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::BlockData;
    use crate::tree::NodeType;

    fn nodes(ids: &[&str]) -> Vec<GraphNode> {
        ids.iter()
            .map(|id| GraphNode::text_block(*id, BlockData::new(*id, NodeType::Paragraph)))
            .collect()
    }

    #[test]
    fn test_valid_tree() {
        let nodes = nodes(&["r", "a", "b"]);
        let edges = vec![GraphEdge::between("r", "a"), GraphEdge::between("a", "b")];
        assert_eq!(validate(&nodes, &edges), Ok("r".to_string()));
    }

    #[test]
    fn test_single_node() {
        assert_eq!(validate(&nodes(&["only"]), &[]), Ok("only".to_string()));
    }

    #[test]
    fn test_empty() {
        assert_eq!(validate(&[], &[]), Err(GraphError::Empty));
    }

    #[test]
    fn test_multiple_roots() {
        let result = validate(&nodes(&["r", "a"]), &[]);
        assert_eq!(
            result,
            Err(GraphError::MultipleRoots(vec!["r".to_string(), "a".to_string()]))
        );
    }

    #[test]
    fn test_multiple_parents() {
        let nodes = nodes(&["r", "a", "b"]);
        let edges = vec![
            GraphEdge::between("r", "a"),
            GraphEdge::between("r", "b"),
            GraphEdge::between("a", "b"),
        ];
        assert_eq!(
            validate(&nodes, &edges),
            Err(GraphError::MultipleParents("b".to_string()))
        );
    }

    #[test]
    fn test_detached_cycle() {
        let nodes = nodes(&["r", "a", "b"]);
        let edges = vec![GraphEdge::between("a", "b"), GraphEdge::between("b", "a")];
        assert!(matches!(
            validate(&nodes, &edges),
            Err(GraphError::Unreachable { ref root, .. }) if root == "r"
        ));
    }

    #[test]
    fn test_no_root() {
        let nodes = nodes(&["a", "b"]);
        let edges = vec![GraphEdge::between("a", "b"), GraphEdge::between("b", "a")];
        assert_eq!(validate(&nodes, &edges), Err(GraphError::NoRoot));
    }

    #[test]
    fn test_dangling_edge() {
        let nodes = nodes(&["r"]);
        let edges = vec![GraphEdge::between("r", "ghost")];
        assert_eq!(
            validate(&nodes, &edges),
            Err(GraphError::DanglingEdge {
                edge: "edge-r-ghost".to_string(),
                node: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_ids() {
        assert_eq!(
            validate(&nodes(&["r", "r"]), &[]),
            Err(GraphError::DuplicateNode("r".to_string()))
        );
    }
}
