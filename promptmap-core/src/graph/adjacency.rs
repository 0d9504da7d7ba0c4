//! Parent/child lookup tables built once per graph operation

use std::collections::{HashMap, HashSet};

use super::model::{GraphEdge, GraphNode};

/// Edge list indexed by source and by target
#[derive(Debug, Default)]
pub struct Adjacency<'a> {
    children: HashMap<&'a str, Vec<&'a str>>,
    parents: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Adjacency<'a> {
    pub fn new(edges: &'a [GraphEdge]) -> Self {
        let mut adjacency = Self::default();
        for edge in edges {
            adjacency
                .children
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
            adjacency
                .parents
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
        }
        adjacency
    }

    /// Children in edge order
    pub fn children(&self, id: &str) -> &[&'a str] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, id: &str) -> Option<&'a str> {
        self.parents.get(id).and_then(|parents| parents.first().copied())
    }

    pub fn parent_count(&self, id: &str) -> usize {
        self.parents.get(id).map_or(0, Vec::len)
    }

    /// Nodes without an incoming edge, in node order
    pub fn roots<'n>(&self, nodes: &'n [GraphNode]) -> Vec<&'n GraphNode> {
        nodes
            .iter()
            .filter(|node| self.parent_count(&node.id) == 0)
            .collect()
    }

    /// The single node without an incoming edge, if there is exactly one
    pub fn unique_root<'n>(&self, nodes: &'n [GraphNode]) -> Option<&'n GraphNode> {
        match self.roots(nodes).as_slice() {
            [root] => Some(*root),
            _ => None,
        }
    }

    /// All transitive descendants of `id`, pre-order, excluding `id` itself.
    /// Each node is reported once even if edges loop back.
    pub fn descendants(&self, id: &str) -> Vec<&'a str> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);
        let mut out = Vec::new();
        let mut stack: Vec<&'a str> = self.children(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }

        out
    }
}
