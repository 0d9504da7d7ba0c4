//! Node and edge types of the editing graph

use serde::{Deserialize, Serialize};

use crate::tree::{Metadata, NodeType};

/// Canvas position. Assigned by layout, (0, 0) until then.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Payload of a Markdown-convertible block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    pub content: String,
    pub node_type: NodeType,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl BlockData {
    pub fn new(content: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            content: content.into(),
            node_type,
            is_collapsed: false,
            metadata: None,
        }
    }

    /// Empty paragraph, what the editor creates on "new child"
    pub fn empty() -> Self {
        Self::new(String::new(), NodeType::Paragraph)
    }
}

/// Kind of stored entity a reference node points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Prompt,
    Block,
}

/// Pointer to another stored document or block. Never exported to Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    pub ref_type: ReferenceKind,
    pub ref_id: String,
    pub ref_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum NodePayload {
    TextBlock(BlockData),
    Reference(ReferenceData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    #[serde(flatten)]
    pub payload: NodePayload,
}

impl GraphNode {
    pub fn text_block(id: impl Into<String>, data: BlockData) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            payload: NodePayload::TextBlock(data),
        }
    }

    pub fn reference(id: impl Into<String>, data: ReferenceData) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            payload: NodePayload::Reference(data),
        }
    }

    pub fn as_block(&self) -> Option<&BlockData> {
        match &self.payload {
            NodePayload::TextBlock(data) => Some(data),
            NodePayload::Reference(_) => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut BlockData> {
        match &mut self.payload {
            NodePayload::TextBlock(data) => Some(data),
            NodePayload::Reference(_) => None,
        }
    }

    pub fn is_text_block(&self) -> bool {
        self.as_block().is_some()
    }

    pub fn is_collapsed(&self) -> bool {
        self.as_block().is_some_and(|data| data.is_collapsed)
    }
}

/// Directed parent to child edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    /// Edge with the conventional `edge-<source>-<target>` id
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("edge-{}-{}", source, target),
            source,
            target,
        }
    }
}

/// Partial update of a text block; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPatch {
    pub content: Option<String>,
    pub node_type: Option<NodeType>,
    pub is_collapsed: Option<bool>,
    /// `Some(None)` clears the metadata
    pub metadata: Option<Option<Metadata>>,
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn node_type(node_type: NodeType) -> Self {
        Self {
            node_type: Some(node_type),
            ..Default::default()
        }
    }

    fn apply(self, data: &mut BlockData) {
        if let Some(content) = self.content {
            data.content = content;
        }
        if let Some(node_type) = self.node_type {
            data.node_type = node_type;
        }
        if let Some(is_collapsed) = self.is_collapsed {
            data.is_collapsed = is_collapsed;
        }
        if let Some(metadata) = self.metadata {
            data.metadata = metadata;
        }
    }
}

/// Partial update of a reference node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencePatch {
    pub ref_type: Option<ReferenceKind>,
    pub ref_id: Option<String>,
    pub ref_title: Option<String>,
}

impl ReferencePatch {
    fn apply(self, data: &mut ReferenceData) {
        if let Some(ref_type) = self.ref_type {
            data.ref_type = ref_type;
        }
        if let Some(ref_id) = self.ref_id {
            data.ref_id = ref_id;
        }
        if let Some(ref_title) = self.ref_title {
            data.ref_title = ref_title;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodePatch {
    Block(BlockPatch),
    Reference(ReferencePatch),
}

impl NodePatch {
    /// Merge into the node's payload. Returns false, leaving the node
    /// untouched, when the patch is for the other payload kind.
    pub fn apply_to(self, node: &mut GraphNode) -> bool {
        match (self, &mut node.payload) {
            (NodePatch::Block(patch), NodePayload::TextBlock(data)) => {
                patch.apply(data);
                true
            }
            (NodePatch::Reference(patch), NodePayload::Reference(data)) => {
                patch.apply(data);
                true
            }
            _ => false,
        }
    }
}

impl From<BlockPatch> for NodePatch {
    fn from(patch: BlockPatch) -> Self {
        NodePatch::Block(patch)
    }
}

impl From<ReferencePatch> for NodePatch {
    fn from(patch: ReferencePatch) -> Self {
        NodePatch::Reference(patch)
    }
}

/// Everything persisted for one document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub selected_node_id: Option<String>,
}
