//! Node/edge graph the editor works on, and its projections to and from trees

pub mod adjacency;
pub mod model;
pub mod projection;
pub mod session;
pub mod validate;
pub mod visibility;

pub use adjacency::Adjacency;
pub use model::{
    BlockData, BlockPatch, GraphDocument, GraphEdge, GraphNode, NodePatch, NodePayload, Position,
    ReferenceData, ReferenceKind, ReferencePatch,
};
pub use projection::{graph_to_markdown, graph_to_tree, tree_to_graph, EMPTY_DOCUMENT};
pub use session::EditorSession;
pub use validate::validate;
pub use visibility::{hidden_ids, visible_subgraph, VisibleGraph};
