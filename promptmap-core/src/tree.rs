//! Labeled tree used as the interchange format between Markdown and the graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque per-node metadata carried through every conversion untouched
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Markdown rendering type of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    #[serde(rename = "heading-1")]
    Heading1,
    #[serde(rename = "heading-2")]
    Heading2,
    #[serde(rename = "heading-3")]
    Heading3,
    #[serde(rename = "heading-4")]
    Heading4,
    ListItem,
    Paragraph,
}

impl NodeType {
    /// Map a Markdown heading depth to a heading type, clamping below H4
    pub fn from_heading_depth(depth: u8) -> Self {
        match depth {
            0 | 1 => NodeType::Heading1,
            2 => NodeType::Heading2,
            3 => NodeType::Heading3,
            _ => NodeType::Heading4,
        }
    }

    /// Type a node renders as when only its depth in the tree is known
    pub fn inferred_from_depth(depth: usize) -> Self {
        match depth {
            0 => NodeType::Heading1,
            1 => NodeType::Heading2,
            2 => NodeType::Heading3,
            3 => NodeType::Heading4,
            _ => NodeType::ListItem,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            NodeType::Heading1 => "heading-1",
            NodeType::Heading2 => "heading-2",
            NodeType::Heading3 => "heading-3",
            NodeType::Heading4 => "heading-4",
            NodeType::ListItem => "list-item",
            NodeType::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the rooted tree. Each node owns its children exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub content: String,
    pub node_type: NodeType,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TreeNode {
    /// Create a leaf node without metadata
    pub fn new(id: impl Into<String>, content: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            node_type,
            children: Vec::new(),
            metadata: None,
        }
    }

    /// Replace the children, builder style
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    /// Total number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Structural equality: content, type and child order at every node.
    /// Ids and metadata are ignored.
    pub fn same_shape(&self, other: &TreeNode) -> bool {
        self.content == other.content
            && self.node_type == other.node_type
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
    }

    /// Pre-order iterator over this subtree
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

/// Pre-order traversal in document order
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Find a node by id (pre-order search)
pub fn find_node<'a>(tree: &'a TreeNode, id: &str) -> Option<&'a TreeNode> {
    tree.iter().find(|node| node.id == id)
}

/// Number of edges between the root and the node with the given id
pub fn node_depth(tree: &TreeNode, id: &str) -> Option<usize> {
    fn walk(node: &TreeNode, id: &str, depth: usize) -> Option<usize> {
        if node.id == id {
            return Some(depth);
        }
        node.children
            .iter()
            .find_map(|child| walk(child, id, depth + 1))
    }

    walk(tree, id, 0)
}
