//! Reingold-Tilford tidy tree in the linear-time Walker/Buchheim form
//!
//! Nodes live in an index arena. Index 0 is a sentinel parent of the real
//! root so the root can be walked like any other node. Coordinates come out
//! in abstract units: `breadth` spaces siblings, `depth` is the tree level.

use std::collections::{HashMap, HashSet};

use crate::graph::{Adjacency, GraphNode};

const SENTINEL: usize = 0;
const ROOT: usize = 1;

/// Separation between adjacent nodes sharing a parent
pub const SIBLING_SEPARATION: f64 = 1.0;
/// Separation between adjacent nodes under different parents
pub const COUSIN_SEPARATION: f64 = 1.2;

#[derive(Debug, Clone)]
struct Walker {
    /// Index into the input node slice
    source: usize,
    parent: usize,
    children: Vec<usize>,
    /// Position among its siblings
    number: usize,
    depth: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: Option<usize>,
    breadth: f64,
}

impl Walker {
    fn new(index: usize, source: usize, parent: usize, number: usize, depth: usize) -> Self {
        Self {
            source,
            parent,
            children: Vec::new(),
            number,
            depth,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: index,
            default_ancestor: None,
            breadth: 0.0,
        }
    }
}

/// Placement of one input node. `breadth` is a fraction of the available
/// breadth, `depth` the tree level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Index into the input node slice
    pub source: usize,
    pub breadth: f64,
    pub depth: usize,
}

#[derive(Debug)]
pub struct TidyTree {
    walkers: Vec<Walker>,
}

impl TidyTree {
    /// Ordered rose tree hanging from `root`, children in edge order. Nodes
    /// missing from `nodes` and edges looping back are left out.
    pub fn build(nodes: &[GraphNode], adjacency: &Adjacency<'_>, root: usize) -> Self {
        let by_id: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect();

        let mut walkers = vec![Walker::new(SENTINEL, usize::MAX, SENTINEL, 0, 0)];
        let mut seen = HashSet::new();
        let mut stack = vec![(root, SENTINEL, 0usize)];

        while let Some((source, parent, depth)) = stack.pop() {
            if !seen.insert(source) {
                continue;
            }
            let index = walkers.len();
            let number = walkers[parent].children.len();
            walkers.push(Walker::new(index, source, parent, number, depth));
            walkers[parent].children.push(index);

            for child in adjacency.children(&nodes[source].id).iter().rev() {
                if let Some(&child) = by_id.get(child) {
                    stack.push((child, index, depth + 1));
                }
            }
        }

        Self { walkers }
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.walkers.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn leaf_count(&self) -> usize {
        self.walkers[ROOT..]
            .iter()
            .filter(|walker| walker.children.is_empty())
            .count()
    }

    /// Depth of the deepest node; 0 for a lone root
    pub fn height(&self) -> usize {
        self.walkers[ROOT..]
            .iter()
            .map(|walker| walker.depth)
            .max()
            .unwrap_or(0)
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.walkers[a].parent == self.walkers[b].parent {
            SIBLING_SEPARATION
        } else {
            COUSIN_SEPARATION
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        let walker = &self.walkers[v];
        walker.children.first().copied().or(walker.thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        let walker = &self.walkers[v];
        walker.children.last().copied().or(walker.thread)
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let walker = &self.walkers[v];
        walker
            .number
            .checked_sub(1)
            .map(|previous| self.walkers[walker.parent].children[previous])
    }

    fn move_subtree(&mut self, from: usize, to: usize, shift: f64) {
        let subtrees = (self.walkers[to].number - self.walkers[from].number) as f64;
        let change = shift / subtrees;
        let to = &mut self.walkers[to];
        to.change -= change;
        to.shift += shift;
        to.prelim += shift;
        to.modifier += shift;
        self.walkers[from].change += change;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for position in (0..self.walkers[v].children.len()).rev() {
            let child = self.walkers[v].children[position];
            let child = &mut self.walkers[child];
            child.prelim += shift;
            child.modifier += shift;
            change += child.change;
            shift += child.shift + change;
        }
    }

    fn next_ancestor(&self, inner_left: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.walkers[inner_left].ancestor;
        if self.walkers[candidate].parent == self.walkers[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    /// Push the subtree of `v` right until it clears every subtree to its
    /// left, spreading the shift over the siblings in between
    fn apportion(&mut self, v: usize, left: Option<usize>, mut ancestor: usize) -> usize {
        let Some(left) = left else {
            return ancestor;
        };

        let first_sibling = self.walkers[self.walkers[v].parent].children[0];
        let (mut inner_right, mut outer_right) = (v, v);
        let (mut inner_left, mut outer_left) = (left, first_sibling);
        let mut sum_inner_right = self.walkers[inner_right].modifier;
        let mut sum_outer_right = self.walkers[outer_right].modifier;
        let mut sum_inner_left = self.walkers[inner_left].modifier;
        let mut sum_outer_left = self.walkers[outer_left].modifier;

        let (mut next_inner_left, mut next_inner_right);
        loop {
            next_inner_left = self.next_right(inner_left);
            next_inner_right = self.next_left(inner_right);
            let (Some(il), Some(ir)) = (next_inner_left, next_inner_right) else {
                break;
            };
            let (Some(ol), Some(or)) = (self.next_left(outer_left), self.next_right(outer_right))
            else {
                break;
            };
            inner_left = il;
            inner_right = ir;
            outer_left = ol;
            outer_right = or;
            self.walkers[outer_right].ancestor = v;

            let shift = self.walkers[inner_left].prelim + sum_inner_left
                - self.walkers[inner_right].prelim
                - sum_inner_right
                + self.separation(inner_left, inner_right);
            if shift > 0.0 {
                let from = self.next_ancestor(inner_left, v, ancestor);
                self.move_subtree(from, v, shift);
                sum_inner_right += shift;
                sum_outer_right += shift;
            }

            sum_inner_left += self.walkers[inner_left].modifier;
            sum_inner_right += self.walkers[inner_right].modifier;
            sum_outer_left += self.walkers[outer_left].modifier;
            sum_outer_right += self.walkers[outer_right].modifier;
        }

        if next_inner_left.is_some() && self.next_right(outer_right).is_none() {
            let walker = &mut self.walkers[outer_right];
            walker.thread = next_inner_left;
            walker.modifier += sum_inner_left - sum_outer_right;
        }
        if next_inner_right.is_some() && self.next_left(outer_left).is_none() {
            let walker = &mut self.walkers[outer_left];
            walker.thread = next_inner_right;
            walker.modifier += sum_inner_right - sum_outer_left;
            ancestor = v;
        }

        ancestor
    }

    fn first_walk(&mut self, v: usize) {
        let left = self.left_sibling(v);

        let children = &self.walkers[v].children;
        let outermost = children.first().copied().zip(children.last().copied());

        if let Some((first, last)) = outermost {
            self.execute_shifts(v);
            let midpoint = (self.walkers[first].prelim + self.walkers[last].prelim) / 2.0;
            match left {
                Some(left) => {
                    let prelim = self.walkers[left].prelim + self.separation(v, left);
                    self.walkers[v].prelim = prelim;
                    self.walkers[v].modifier = prelim - midpoint;
                }
                None => self.walkers[v].prelim = midpoint,
            }
        } else if let Some(left) = left {
            self.walkers[v].prelim = self.walkers[left].prelim + self.separation(v, left);
        }

        let parent = self.walkers[v].parent;
        let default = self.walkers[parent]
            .default_ancestor
            .unwrap_or(self.walkers[parent].children[0]);
        self.walkers[parent].default_ancestor = Some(self.apportion(v, left, default));
    }

    /// Post-order with children visited left to right
    fn post_order(&self) -> Vec<usize> {
        let mut stack = vec![ROOT];
        let mut visit = Vec::with_capacity(self.len());
        while let Some(v) = stack.pop() {
            visit.push(v);
            stack.extend(self.walkers[v].children.iter().copied());
        }
        visit.reverse();
        visit
    }

    /// Run both walks and normalize so the tree spans `[0, 1]` in breadth,
    /// with half a separation of margin on each side
    pub fn solve(mut self) -> Vec<Placement> {
        if self.is_empty() {
            return Vec::new();
        }

        for v in self.post_order() {
            self.first_walk(v);
        }

        // Arena order is pre-order, so parents settle before their children
        self.walkers[SENTINEL].modifier = -self.walkers[ROOT].prelim;
        for v in ROOT..self.walkers.len() {
            let parent_modifier = self.walkers[self.walkers[v].parent].modifier;
            let walker = &mut self.walkers[v];
            walker.breadth = walker.prelim + parent_modifier;
            walker.modifier += parent_modifier;
        }

        let (mut left, mut right) = (ROOT, ROOT);
        for v in ROOT..self.walkers.len() {
            if self.walkers[v].breadth < self.walkers[left].breadth {
                left = v;
            }
            if self.walkers[v].breadth > self.walkers[right].breadth {
                right = v;
            }
        }

        let margin = if left == right {
            1.0
        } else {
            self.separation(left, right) / 2.0
        };
        let offset = margin - self.walkers[left].breadth;
        let span = self.walkers[right].breadth + margin + offset;

        self.walkers[ROOT..]
            .iter()
            .map(|walker| Placement {
                source: walker.source,
                breadth: (walker.breadth + offset) / span,
                depth: walker.depth,
            })
            .collect()
    }
}
