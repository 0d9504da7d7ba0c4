//! Conversions between the tree and the node/edge graph

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::adjacency::Adjacency;
use super::model::{BlockData, GraphEdge, GraphNode, NodePayload};
use crate::markdown::{serialize, SerializeOptions};
use crate::tree::TreeNode;

/// Markdown emitted when a graph has nothing to export
pub const EMPTY_DOCUMENT: &str = "# Empty\n";

/// Project a tree into text-block nodes and parent to child edges, pre-order
pub fn tree_to_graph(tree: &TreeNode) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let mut nodes = Vec::with_capacity(tree.node_count());
    let mut edges = Vec::with_capacity(tree.node_count().saturating_sub(1));

    fn visit(
        tree_node: &TreeNode,
        parent: Option<&str>,
        nodes: &mut Vec<GraphNode>,
        edges: &mut Vec<GraphEdge>,
    ) {
        nodes.push(GraphNode::text_block(
            tree_node.id.clone(),
            BlockData {
                content: tree_node.content.clone(),
                node_type: tree_node.node_type,
                is_collapsed: false,
                metadata: tree_node.metadata.clone(),
            },
        ));

        if let Some(parent) = parent {
            edges.push(GraphEdge::between(parent, tree_node.id.as_str()));
        }

        for child in &tree_node.children {
            visit(child, Some(&tree_node.id), nodes, edges);
        }
    }

    visit(tree, None, &mut nodes, &mut edges);
    debug!("projected tree into {} nodes, {} edges", nodes.len(), edges.len());
    (nodes, edges)
}

/// Rebuild the tree from a graph.
///
/// Returns `None` for an empty graph or one without a unique root. Nodes that
/// are not text blocks are left out together with everything below them.
pub fn graph_to_tree(nodes: &[GraphNode], edges: &[GraphEdge]) -> Option<TreeNode> {
    if nodes.is_empty() {
        return None;
    }

    let adjacency = Adjacency::new(edges);
    let Some(root) = adjacency.unique_root(nodes) else {
        warn!("graph has no unique root, nothing to export");
        return None;
    };

    let by_id: HashMap<&str, &GraphNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let mut visited = HashSet::new();
    build(&root.id, &by_id, &adjacency, &mut visited)
}

fn build<'a>(
    id: &'a str,
    by_id: &HashMap<&str, &'a GraphNode>,
    adjacency: &Adjacency<'a>,
    visited: &mut HashSet<&'a str>,
) -> Option<TreeNode> {
    if !visited.insert(id) {
        return None;
    }

    let node = by_id.get(id)?;
    let NodePayload::TextBlock(data) = &node.payload else {
        return None;
    };

    let children = adjacency
        .children(id)
        .iter()
        .filter_map(|&child| build(child, by_id, adjacency, visited))
        .collect();

    Some(TreeNode {
        id: node.id.clone(),
        content: data.content.clone(),
        node_type: data.node_type,
        children,
        metadata: data.metadata.clone(),
    })
}

/// Export a graph as Markdown, or the placeholder document when there is no
/// exportable root
pub fn graph_to_markdown(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    options: &SerializeOptions,
) -> String {
    match graph_to_tree(nodes, edges) {
        Some(tree) => serialize(&tree, options),
        None => EMPTY_DOCUMENT.to_string(),
    }
}
