//! Error types surfaced by the library

use thiserror::Error;

/// Raw input the Markdown tokenizer could not accept
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Markdown syntax error at line {line}, column {column}: {message}")]
pub struct MarkdownSyntaxError {
    pub message: String,
    /// 1-based line of the offending input
    pub line: usize,
    /// 1-based byte column within that line
    pub column: usize,
}

/// Ways a node/edge set can fail to be a single rooted out-tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph has no nodes")]
    Empty,

    #[error("no root: every node has an incoming edge")]
    NoRoot,

    #[error("multiple roots: {0:?}")]
    MultipleRoots(Vec<String>),

    #[error("node {0} has more than one parent")]
    MultipleParents(String),

    #[error("edge {edge} references unknown node {node}")]
    DanglingEdge { edge: String, node: String },

    #[error("duplicate node id {0}")]
    DuplicateNode(String),

    #[error("nodes unreachable from root {root}: {unreachable:?}")]
    Unreachable { root: String, unreachable: Vec<String> },
}
