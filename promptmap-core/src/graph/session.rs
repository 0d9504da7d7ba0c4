//! Editing session: the mutable graph behind the editor
//!
//! Every edit either applies completely or leaves the session untouched, so a
//! single call can never break the single-rooted tree shape.

use log::debug;
use std::collections::HashSet;

use super::adjacency::Adjacency;
use super::model::{
    BlockData, BlockPatch, GraphDocument, GraphEdge, GraphNode, NodePatch, ReferenceData,
};
use super::projection::{graph_to_markdown, graph_to_tree, tree_to_graph};
use super::validate::validate;
use super::visibility::{visible_subgraph, VisibleGraph};
use crate::error::GraphError;
use crate::layout::{layout, LayoutConfig};
use crate::markdown::{parse_markdown, IdGenerator, SerializeOptions, ROOT_ID};
use crate::tree::{NodeType, TreeNode};

#[derive(Debug, Clone)]
pub struct EditorSession {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    selected: Option<String>,
    ids: IdGenerator,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// Session holding a single empty root block
    pub fn new() -> Self {
        Self::from_parts(
            vec![GraphNode::text_block(ROOT_ID, BlockData::new("", NodeType::Heading1))],
            Vec::new(),
        )
    }

    /// Starter prompt outline shown for a fresh document
    pub fn seeded() -> Self {
        let block = |id: &str, content: &str, node_type| {
            GraphNode::text_block(id, BlockData::new(content, node_type))
        };
        let nodes = vec![
            block(ROOT_ID, "My Prompt", NodeType::Heading1),
            block("node-1", "Context", NodeType::Heading2),
            block("node-2", "Instructions", NodeType::Heading2),
            block("node-3", "Output Format", NodeType::Heading2),
            block("node-1-1", "You are an expert assistant", NodeType::Paragraph),
            block("node-2-1", "Step 1: Analyze the input", NodeType::ListItem),
            block("node-2-2", "Step 2: Generate response", NodeType::ListItem),
        ];
        let edges = vec![
            GraphEdge::between(ROOT_ID, "node-1"),
            GraphEdge::between(ROOT_ID, "node-2"),
            GraphEdge::between(ROOT_ID, "node-3"),
            GraphEdge::between("node-1", "node-1-1"),
            GraphEdge::between("node-2", "node-2-1"),
            GraphEdge::between("node-2", "node-2-2"),
        ];
        let mut session = Self::from_parts(nodes, edges);
        session.selected = Some(ROOT_ID.to_string());
        session
    }

    fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self {
            nodes,
            edges,
            selected: None,
            ids: IdGenerator::with_prefix("node"),
        }
    }

    /// Session over the projection of a tree
    pub fn from_tree(tree: &TreeNode) -> Self {
        let (nodes, edges) = tree_to_graph(tree);
        Self::from_parts(nodes, edges)
    }

    /// Session over a parsed Markdown document
    pub fn import_markdown(text: &str) -> Self {
        Self::from_tree(&parse_markdown(text))
    }

    /// Restore a persisted document, rejecting graphs that are not one
    /// rooted tree
    pub fn from_document(document: GraphDocument) -> Result<Self, GraphError> {
        validate(&document.nodes, &document.edges)?;
        let mut session = Self::from_parts(document.nodes, document.edges);
        session.selected = document
            .selected_node_id
            .filter(|id| session.node(id).is_some());
        Ok(session)
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            selected_node_id: self.selected.clone(),
        }
    }

    /// Replace the whole graph with an imported tree
    pub fn replace_with_tree(&mut self, tree: &TreeNode) {
        let (nodes, edges) = tree_to_graph(tree);
        self.nodes = nodes;
        self.edges = edges;
        self.selected = None;
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn root_id(&self) -> Option<&str> {
        Adjacency::new(&self.edges)
            .unique_root(&self.nodes)
            .map(|node| node.id.as_str())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a node, or clear the selection with `None`. Unknown ids are
    /// ignored.
    pub fn select(&mut self, id: Option<&str>) {
        match id {
            Some(id) if self.node(id).is_some() => self.selected = Some(id.to_string()),
            Some(_) => {}
            None => self.selected = None,
        }
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if self.node(&id).is_none() {
                return id;
            }
        }
    }

    fn attach(&mut self, parent_id: &str, node: GraphNode) -> String {
        let id = node.id.clone();
        self.edges.push(GraphEdge::between(parent_id, id.as_str()));
        self.nodes.push(node);
        self.selected = Some(id.clone());
        id
    }

    /// Add a text block under `parent_id` and select it
    pub fn add_child(&mut self, parent_id: &str, data: BlockData) -> Option<String> {
        self.node(parent_id)?;
        let id = self.fresh_id();
        Some(self.attach(parent_id, GraphNode::text_block(id, data)))
    }

    /// Add a reference node under `parent_id` and select it
    pub fn add_reference(&mut self, parent_id: &str, data: ReferenceData) -> Option<String> {
        self.node(parent_id)?;
        let id = self.fresh_id();
        Some(self.attach(parent_id, GraphNode::reference(id, data)))
    }

    /// Add a text block next to `id`, under the same parent. The root has no
    /// siblings.
    pub fn add_sibling(&mut self, id: &str, data: BlockData) -> Option<String> {
        let parent = self.parent_of(id)?.to_string();
        self.add_child(&parent, data)
    }

    /// Shallow-merge a patch into one node. Unknown ids and patches for the
    /// other payload kind are ignored.
    pub fn update_node(&mut self, id: &str, patch: impl Into<NodePatch>) {
        let patch: NodePatch = patch.into();
        if let Some(node) = self.node_mut(id) {
            patch.apply_to(node);
        }
    }

    pub fn set_node_type(&mut self, id: &str, node_type: NodeType) {
        self.update_node(id, BlockPatch::node_type(node_type));
    }

    pub fn toggle_collapse(&mut self, id: &str) {
        if let Some(data) = self.node_mut(id).and_then(GraphNode::as_block_mut) {
            data.is_collapsed = !data.is_collapsed;
        }
    }

    fn is_root(&self, id: &str) -> bool {
        id == ROOT_ID || self.root_id() == Some(id)
    }

    /// Remove a node with its whole subtree and clear the selection. The
    /// root cannot be deleted.
    pub fn delete_node(&mut self, id: &str) {
        if self.is_root(id) || self.node(id).is_none() {
            return;
        }

        let mut doomed: HashSet<String> = Adjacency::new(&self.edges)
            .descendants(id)
            .into_iter()
            .map(str::to_string)
            .collect();
        doomed.insert(id.to_string());

        self.nodes.retain(|node| !doomed.contains(&node.id));
        self.edges
            .retain(|edge| !doomed.contains(&edge.source) && !doomed.contains(&edge.target));
        self.selected = None;
        debug!("deleted {} nodes under {}", doomed.len(), id);
    }

    /// Delete a text block whose content is empty, then select its parent
    pub fn delete_if_empty(&mut self, id: &str) -> bool {
        let is_empty = self
            .node(id)
            .and_then(GraphNode::as_block)
            .is_some_and(|data| data.content.is_empty());
        if !is_empty || self.is_root(id) {
            return false;
        }

        let parent = self.parent_of(id).map(str::to_string);
        self.delete_node(id);
        if let Some(parent) = parent {
            self.selected = Some(parent);
        }
        true
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|edge| edge.target == id)
            .map(|edge| edge.source.as_str())
    }

    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| edge.source == id)
            .map(|edge| edge.target.as_str())
            .collect()
    }

    pub fn child_count(&self, id: &str) -> usize {
        self.edges.iter().filter(|edge| edge.source == id).count()
    }

    /// Siblings including `id` itself, in edge order. Empty for the root.
    fn siblings_of(&self, id: &str) -> Vec<&str> {
        self.parent_of(id)
            .map(|parent| self.children_of(parent))
            .unwrap_or_default()
    }

    fn move_selection(&mut self, pick: impl FnOnce(&Self, &str) -> Option<String>) {
        let Some(current) = self.selected.clone() else {
            return;
        };
        if let Some(next) = pick(self, &current) {
            self.selected = Some(next);
        }
    }

    pub fn select_parent(&mut self) {
        self.move_selection(|session, id| session.parent_of(id).map(str::to_string));
    }

    pub fn select_first_child(&mut self) {
        self.move_selection(|session, id| {
            session.children_of(id).first().map(|child| child.to_string())
        });
    }

    pub fn select_previous_sibling(&mut self) {
        self.move_selection(|session, id| {
            let siblings = session.siblings_of(id);
            let index = siblings.iter().position(|sibling| *sibling == id)?;
            index
                .checked_sub(1)
                .map(|previous| siblings[previous].to_string())
        });
    }

    pub fn select_next_sibling(&mut self) {
        self.move_selection(|session, id| {
            let siblings = session.siblings_of(id);
            let index = siblings.iter().position(|sibling| *sibling == id)?;
            siblings.get(index + 1).map(|next| next.to_string())
        });
    }

    /// Current view with collapsed subtrees hidden
    pub fn visible(&self) -> VisibleGraph {
        visible_subgraph(&self.nodes, &self.edges)
    }

    /// Lay out the visible nodes and store their new positions. Hidden nodes
    /// keep whatever position they had.
    pub fn apply_layout(&mut self, config: &LayoutConfig) {
        let view = self.visible();
        for placed in layout(&view.nodes, &view.edges, config) {
            if let Some(node) = self.node_mut(&placed.node.id) {
                node.position = placed.node.position;
            }
        }
    }

    /// Tree projection of the current graph; `None` when there is nothing to
    /// export
    pub fn to_tree(&self) -> Option<TreeNode> {
        graph_to_tree(&self.nodes, &self.edges)
    }

    pub fn export_markdown(&self, options: &SerializeOptions) -> String {
        graph_to_markdown(&self.nodes, &self.edges, options)
    }
}
