//! Markdown to tree conversion
//!
//! Headings open sections, paragraphs and lists attach to the innermost open
//! section, and nested lists keep their hierarchy.

use log::debug;

use crate::error::MarkdownSyntaxError;
use crate::markdown::ast::{self, Block, List, ListItem};
use crate::tree::{NodeType, TreeNode};

/// Id of the synthetic root every parse produces
pub const ROOT_ID: &str = "root";

/// Sequential id source of the form `<prefix>-<n>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    /// Generator for parser ids (`md-node-1`, `md-node-2`, ...)
    pub fn new() -> Self {
        Self::with_prefix("md-node")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Continue numbering from `next` instead of 1
    pub fn seeded(mut self, next: u64) -> Self {
        self.next = next;
        self
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    /// Number the next call to `next_id` will use
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = 1;
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the synthetic root in the builder arena
const ROOT: usize = 0;

/// Innermost open node for every heading depth.
///
/// Slot 0 is the root, slot `d` the node most recently opened by a heading of
/// depth `d`. Slots left empty by a skipped heading level fall back to the
/// root.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenAncestors {
    slots: Vec<Option<usize>>,
}

impl OpenAncestors {
    fn new() -> Self {
        Self {
            slots: vec![Some(ROOT)],
        }
    }

    /// Parent for a heading of the given depth (1-based)
    fn parent_for_heading(&self, depth: usize) -> usize {
        let target = depth.clamp(1, self.slots.len());
        self.slots[target - 1].unwrap_or(ROOT)
    }

    /// Node that receives paragraphs and lists
    fn deepest(&self) -> usize {
        self.slots.last().copied().flatten().unwrap_or(ROOT)
    }

    /// State after a heading of `depth` opens `node`: deeper slots are closed
    fn opened(mut self, depth: usize, node: usize) -> Self {
        self.slots.resize(depth, None);
        self.slots.push(Some(node));
        self
    }
}

#[derive(Debug)]
struct Draft {
    id: String,
    content: String,
    node_type: NodeType,
    children: Vec<usize>,
}

/// Arena of nodes under construction. Index 0 is the root.
struct TreeBuilder<'g> {
    nodes: Vec<Draft>,
    ids: &'g mut IdGenerator,
}

impl<'g> TreeBuilder<'g> {
    fn new(ids: &'g mut IdGenerator) -> Self {
        Self {
            nodes: vec![Draft {
                id: ROOT_ID.to_string(),
                content: String::new(),
                node_type: NodeType::Heading1,
                children: Vec::new(),
            }],
            ids,
        }
    }

    fn push(&mut self, parent: usize, content: String, node_type: NodeType) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Draft {
            id: self.ids.next_id(),
            content,
            node_type,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        index
    }

    fn push_list(&mut self, parent: usize, list: &List) {
        for item in &list.items {
            self.push_list_item(parent, item);
        }
    }

    fn push_list_item(&mut self, parent: usize, item: &ListItem) {
        let content = item.leading_paragraph().map(ast::flatten).unwrap_or_default();
        let index = self.push(parent, content, NodeType::ListItem);
        for nested in item.nested_lists() {
            self.push_list(index, nested);
        }
    }

    /// Give a title-less root the first child's content and type. The first
    /// child's own children take its place ahead of the remaining siblings.
    fn promote_first_child(&mut self) {
        if !self.nodes[ROOT].content.is_empty() || self.nodes[ROOT].children.is_empty() {
            return;
        }

        let first = self.nodes[ROOT].children.remove(0);
        let content = std::mem::take(&mut self.nodes[first].content);
        let grandchildren = std::mem::take(&mut self.nodes[first].children);
        let node_type = self.nodes[first].node_type;

        let root = &mut self.nodes[ROOT];
        root.content = content;
        root.node_type = node_type;
        root.children.splice(0..0, grandchildren);
    }

    fn into_tree(mut self) -> TreeNode {
        self.promote_first_child();
        let mut slots: Vec<Option<Draft>> = self.nodes.into_iter().map(Some).collect();
        assemble(&mut slots, ROOT)
    }
}

fn assemble(slots: &mut [Option<Draft>], index: usize) -> TreeNode {
    let Some(draft) = slots[index].take() else {
        // Each index is referenced by exactly one parent
        return TreeNode::new(String::new(), String::new(), NodeType::Paragraph);
    };
    let children = draft
        .children
        .iter()
        .map(|&child| assemble(slots, child))
        .collect();

    TreeNode {
        id: draft.id,
        content: draft.content,
        node_type: draft.node_type,
        children,
        metadata: None,
    }
}

/// Build a tree from already tokenized blocks. Never fails: blocks the walk
/// does not understand are skipped.
pub fn tree_from_blocks(blocks: &[Block], ids: &mut IdGenerator) -> TreeNode {
    let mut builder = TreeBuilder::new(ids);
    let mut ancestors = OpenAncestors::new();
    let mut seen_heading = false;

    for block in blocks {
        match block {
            Block::Heading { depth, inlines } => {
                let depth = usize::from(*depth).max(1);
                let content = ast::flatten(inlines);
                let node_type = NodeType::from_heading_depth(depth as u8);

                if !seen_heading && depth == 1 {
                    // The document title becomes the root itself
                    let root = &mut builder.nodes[ROOT];
                    root.content = content;
                    root.node_type = node_type;
                    ancestors = ancestors.opened(1, ROOT);
                } else {
                    let parent = ancestors.parent_for_heading(depth);
                    let node = builder.push(parent, content, node_type);
                    ancestors = ancestors.opened(depth, node);
                }
                seen_heading = true;
            }
            Block::Paragraph(inlines) => {
                let content = ast::flatten(inlines);
                if !content.trim().is_empty() {
                    builder.push(ancestors.deepest(), content, NodeType::Paragraph);
                }
            }
            Block::List(list) => builder.push_list(ancestors.deepest(), list),
            Block::Unsupported => {}
        }
    }

    let tree = builder.into_tree();
    debug!(
        "built tree of {} nodes from {} blocks",
        tree.node_count(),
        blocks.len()
    );
    tree
}

/// Markdown parser owning the id sequence for the trees it produces
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser {
    ids: IdGenerator,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser numbering its nodes from a caller-supplied generator
    pub fn with_ids(ids: IdGenerator) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Restart numbering so the next parse is deterministic
    pub fn reset_ids(&mut self) {
        self.ids.reset();
    }

    /// Parse Markdown text. Ids continue from previous parses with this parser.
    pub fn parse(&mut self, text: &str) -> TreeNode {
        let blocks = ast::parse_blocks(text);
        tree_from_blocks(&blocks, &mut self.ids)
    }

    /// Parse raw bytes, rejecting input the tokenizer cannot read
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<TreeNode, MarkdownSyntaxError> {
        let blocks = ast::parse_blocks_bytes(bytes)?;
        Ok(tree_from_blocks(&blocks, &mut self.ids))
    }
}

/// Parse with a fresh id sequence (`md-node-1` onwards)
pub fn parse_markdown(text: &str) -> TreeNode {
    MarkdownParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(node: &TreeNode) -> String {
        let mut out = String::new();
        fn walk(node: &TreeNode, depth: usize, out: &mut String) {
            out.push_str(&format!("{}{}: {}\n", "  ".repeat(depth), node.node_type, node.content));
            for child in &node.children {
                walk(child, depth + 1, out);
            }
        }
        walk(node, 0, &mut out);
        out
    }

    #[test]
    fn test_open_ancestors_transitions() {
        let stack = OpenAncestors::new();
        assert_eq!(stack.deepest(), ROOT);
        assert_eq!(stack.parent_for_heading(1), ROOT);

        let stack = stack.opened(1, 5);
        assert_eq!(stack.slots, vec![Some(ROOT), Some(5)]);
        assert_eq!(stack.parent_for_heading(2), 5);

        // Skipping a level leaves a hole that resolves to the root
        let stack = stack.opened(3, 7);
        assert_eq!(stack.slots, vec![Some(ROOT), Some(5), None, Some(7)]);
        assert_eq!(stack.parent_for_heading(3), ROOT);
        assert_eq!(stack.parent_for_heading(4), 7);
        assert_eq!(stack.parent_for_heading(6), 7);
        assert_eq!(stack.deepest(), 7);

        // A shallower heading closes everything deeper
        let stack = stack.opened(2, 9);
        assert_eq!(stack.slots, vec![Some(ROOT), Some(5), Some(9)]);
        assert_eq!(stack.deepest(), 9);
    }

    #[test]
    fn test_id_generator() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), "md-node-1");
        assert_eq!(ids.next_id(), "md-node-2");
        ids.reset();
        assert_eq!(ids.next_id(), "md-node-1");

        let mut seeded = IdGenerator::with_prefix("node").seeded(10);
        assert_eq!(seeded.next_id(), "node-10");
        assert_eq!(seeded.peek(), 11);
    }

    #[test]
    fn test_concrete_scenario() {
        let tree = parse_markdown("# Title\n## Section A\nSome text.\n- item 1\n- item 2\n");
        assert_eq!(
            shape(&tree),
            "heading-1: Title\n\
             \x20 heading-2: Section A\n\
             \x20   paragraph: Some text.\n\
             \x20   list-item: item 1\n\
             \x20   list-item: item 2\n"
        );
        assert_eq!(tree.id, ROOT_ID);
    }

    #[test]
    fn test_ids_are_deterministic_per_parse() {
        let md = "# T\n## A\ntext\n";
        let first = parse_markdown(md);
        let second = parse_markdown(md);
        assert_eq!(first, second);
        assert_eq!(first.children[0].id, "md-node-1");
        assert_eq!(first.children[0].children[0].id, "md-node-2");
    }

    #[test]
    fn test_parser_ids_continue_until_reset() {
        let mut parser = MarkdownParser::new();
        let first = parser.parse("# T\n## A\n");
        let second = parser.parse("# T\n## A\n");
        assert_eq!(first.children[0].id, "md-node-1");
        assert_eq!(second.children[0].id, "md-node-2");

        parser.reset_ids();
        let third = parser.parse("# T\n## A\n");
        assert_eq!(third.children[0].id, "md-node-1");
    }

    #[test]
    fn test_nested_lists() {
        let tree = parse_markdown("# T\n- a\n  - a1\n    - a1x\n  - a2\n- b\n");
        assert_eq!(
            shape(&tree),
            "heading-1: T\n\
             \x20 list-item: a\n\
             \x20   list-item: a1\n\
             \x20     list-item: a1x\n\
             \x20   list-item: a2\n\
             \x20 list-item: b\n"
        );
    }

    #[test]
    fn test_heading_sections_close_on_shallower_heading() {
        let tree = parse_markdown("# T\n## A\n### A1\ntext\n## B\nmore\n");
        assert_eq!(
            shape(&tree),
            "heading-1: T\n\
             \x20 heading-2: A\n\
             \x20   heading-3: A1\n\
             \x20     paragraph: text\n\
             \x20 heading-2: B\n\
             \x20   paragraph: more\n"
        );
    }

    #[test]
    fn test_deep_headings_clamp_to_h4() {
        let tree = parse_markdown("# T\n## A\n### B\n#### C\n##### D\n###### E\n");
        let d = &tree.children[0].children[0].children[0].children[0];
        assert_eq!(d.content, "D");
        assert_eq!(d.node_type, NodeType::Heading4);
        assert_eq!(d.children[0].content, "E");
        assert_eq!(d.children[0].node_type, NodeType::Heading4);
    }

    #[test]
    fn test_second_h1_is_child_of_root() {
        let tree = parse_markdown("# First\ntext\n# Second\nmore\n");
        assert_eq!(
            shape(&tree),
            "heading-1: First\n\
             \x20 paragraph: text\n\
             \x20 heading-1: Second\n\
             \x20   paragraph: more\n"
        );
    }

    #[test]
    fn test_title_after_leading_paragraph_still_absorbed() {
        let tree = parse_markdown("intro\n\n# Title\n");
        assert_eq!(tree.content, "Title");
        assert_eq!(tree.node_type, NodeType::Heading1);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].content, "intro");
    }

    #[test]
    fn test_promotion_without_title() {
        let tree = parse_markdown("## Section\ntext\n\n## Other\n");
        assert_eq!(
            shape(&tree),
            "heading-2: Section\n\
             \x20 paragraph: text\n\
             \x20 heading-2: Other\n"
        );
        assert_eq!(tree.id, ROOT_ID);
    }

    #[test]
    fn test_promotion_of_plain_list() {
        let tree = parse_markdown("- a\n  - x\n- b\n");
        assert_eq!(
            shape(&tree),
            "list-item: a\n\
             \x20 list-item: x\n\
             \x20 list-item: b\n"
        );
    }

    #[test]
    fn test_empty_input() {
        let tree = parse_markdown("");
        assert_eq!(tree.content, "");
        assert!(tree.children.is_empty());
        assert_eq!(tree.node_type, NodeType::Heading1);
    }

    #[test]
    fn test_blank_paragraphs_skipped() {
        let tree = parse_markdown("# T\n\n![only an image](x.png)\n");
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_unsupported_blocks_ignored() {
        let tree = parse_markdown("# T\n> quoted\n\n```\ncode\n```\n\n| a |\n|---|\n| 1 |\n\ntext\n");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].content, "text");
    }

    #[test]
    fn test_list_item_uses_leading_paragraph() {
        let tree = parse_markdown("# T\n- first\n\n  second\n");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].content, "first");
    }

    #[test]
    fn test_inline_formatting_in_headings_and_items() {
        let tree = parse_markdown("# **Bold** title\n- see [docs](https://x.y) and `cfg`\n");
        assert_eq!(tree.content, "**Bold** title");
        assert_eq!(tree.children[0].content, "see docs and `cfg`");
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let mut parser = MarkdownParser::new();
        assert!(parser.parse_bytes(b"# ok\n\xc3\x28").is_err());
        let tree = parser.parse_bytes(b"# ok\n").unwrap();
        assert_eq!(tree.content, "ok");
    }
}
