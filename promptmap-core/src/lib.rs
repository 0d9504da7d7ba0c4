//! Promptmap Core - prompt outlines as trees, graphs, and Markdown
//!
//! This crate contains the core logic for promptmap, independent of any
//! front end:
//! - Tree model of a prompt outline
//! - Markdown parsing into trees and serialization back
//! - Node/edge graph projection and the editing session over it
//! - Collapse-aware visibility and auto-layout
//! - Configuration management

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod markdown;
pub mod tree;

// Re-export commonly used types
pub use config::Config;
pub use error::{GraphError, MarkdownSyntaxError};
pub use graph::{EditorSession, GraphDocument, GraphEdge, GraphNode};
pub use layout::{layout, LayoutConfig, PositionedNode};
pub use markdown::{parse_markdown, serialize, SerializeOptions};
pub use tree::{NodeType, TreeNode};
