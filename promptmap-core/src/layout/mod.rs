//! Left-to-right auto-layout of the graph
//!
//! The root sits on the left, each tree level one column further right, and
//! siblings are spread vertically by a tidy tree pass. Layout never fails:
//! graphs it cannot arrange come back with their positions untouched.

mod geometry;
mod tidy;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::graph::{Adjacency, GraphEdge, GraphNode, Position};
use tidy::TidyTree;

pub use geometry::{bezier_control_points, edge_midpoint, point_in_node, viewport_bounds, Bounds};
pub use tidy::{COUSIN_SEPARATION, SIBLING_SEPARATION};

/// Smallest vertical extent of a laid out tree
const MIN_BREADTH: f64 = 300.0;
/// Smallest horizontal extent of a laid out tree
const MIN_DEPTH: f64 = 400.0;

/// Node box size and spacing, in canvas units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    pub node_width: f64,
    pub node_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: 50.0,
            vertical_gap: 20.0,
            node_width: 250.0,
            node_height: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Where edges attach to a laid out node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handles {
    pub source: Side,
    pub target: Side,
}

impl Default for Handles {
    fn default() -> Self {
        Self {
            source: Side::Right,
            target: Side::Left,
        }
    }
}

/// A node after layout. `handles` is `None` for nodes layout did not place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub node: GraphNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handles: Option<Handles>,
}

impl PositionedNode {
    fn unplaced(node: &GraphNode) -> Self {
        Self {
            node: node.clone(),
            handles: None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.handles.is_some()
    }
}

/// Position every node reachable from the unique root, in input order.
///
/// With no nodes the result is empty. Without a unique root, or for nodes the
/// root does not reach, input positions are kept and no handles are set.
pub fn layout(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    config: &LayoutConfig,
) -> Vec<PositionedNode> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let adjacency = Adjacency::new(edges);
    let Some(root) = adjacency
        .unique_root(nodes)
        .and_then(|root| nodes.iter().position(|node| node.id == root.id))
    else {
        warn!("layout skipped: graph of {} nodes has no unique root", nodes.len());
        return nodes.iter().map(PositionedNode::unplaced).collect();
    };

    let tree = TidyTree::build(nodes, &adjacency, root);
    let breadth = (tree.leaf_count() as f64 * (config.node_height + config.vertical_gap))
        .max(MIN_BREADTH);
    let depth = (tree.height() as f64 * (config.node_width + config.horizontal_gap))
        .max(MIN_DEPTH);
    let column = depth / tree.height().max(1) as f64;

    let mut positioned: Vec<PositionedNode> =
        nodes.iter().map(PositionedNode::unplaced).collect();
    let placements = tree.solve();
    debug!(
        "laid out {} of {} nodes in {}x{}",
        placements.len(),
        nodes.len(),
        depth,
        breadth
    );

    for placement in placements {
        let entry = &mut positioned[placement.source];
        entry.node.position = Position::new(
            placement.depth as f64 * column,
            placement.breadth * breadth,
        );
        entry.handles = Some(Handles::default());
    }

    positioned
}
