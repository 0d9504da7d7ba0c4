//! Tree to Markdown conversion

use serde::{Deserialize, Serialize};

use crate::tree::{NodeType, TreeNode};

/// Options for Markdown serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Render each node by its own type. When false the type is inferred from
    /// tree depth: H1 to H4 for depths 0-3, list items below that.
    pub use_explicit_types: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            use_explicit_types: true,
        }
    }
}

impl SerializeOptions {
    pub fn inferred() -> Self {
        Self {
            use_explicit_types: false,
        }
    }
}

fn prefix(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Heading1 => "# ",
        NodeType::Heading2 => "## ",
        NodeType::Heading3 => "### ",
        NodeType::Heading4 => "#### ",
        NodeType::ListItem => "- ",
        NodeType::Paragraph => "",
    }
}

struct Serializer {
    options: SerializeOptions,
    lines: Vec<String>,
    /// Type and list run of the last block written, if it carried text
    last: Option<(NodeType, usize)>,
}

impl Serializer {
    fn effective_type(&self, node: &TreeNode, depth: usize) -> NodeType {
        if self.options.use_explicit_types {
            node.node_type
        } else {
            NodeType::inferred_from_depth(depth)
        }
    }

    /// `list_run` counts the list items directly above this node without a
    /// heading or paragraph in between; it drives list indentation.
    fn node(&mut self, node: &TreeNode, depth: usize, list_run: usize) {
        let node_type = self.effective_type(node, depth);

        let child_run = match node_type {
            NodeType::ListItem => {
                // A bare `- ` right below paragraph text is a setext underline
                let below_text = match self.last {
                    Some((NodeType::Paragraph, _)) => true,
                    Some((NodeType::ListItem, run)) => run < list_run,
                    _ => false,
                };
                if below_text && node.content.trim().is_empty() {
                    self.lines.push(String::new());
                }
                self.lines.push(format!(
                    "{}{}{}",
                    "  ".repeat(list_run),
                    prefix(node_type),
                    node.content
                ));
                list_run + 1
            }
            NodeType::Paragraph => {
                self.lines.push(String::new());
                self.lines.push(node.content.clone());
                0
            }
            _ => {
                self.lines.push(String::new());
                self.lines.push(format!("{}{}", prefix(node_type), node.content));
                0
            }
        };
        self.last = (!node.content.trim().is_empty()).then_some((node_type, list_run));

        for child in &node.children {
            self.node(child, depth + 1, child_run);
        }
    }

    fn finish(self) -> String {
        let joined = self.lines.join("\n");
        let mut out = String::with_capacity(joined.len() + 1);
        let mut newlines = 0usize;

        for ch in joined.trim_start_matches('\n').chars() {
            if ch == '\n' {
                newlines += 1;
                if newlines > 2 {
                    continue;
                }
            } else {
                newlines = 0;
            }
            out.push(ch);
        }

        let trimmed_len = out.trim_end_matches('\n').len();
        out.truncate(trimmed_len);
        out.push('\n');
        out
    }
}

/// Serialize a tree to Markdown
pub fn serialize(tree: &TreeNode, options: &SerializeOptions) -> String {
    let mut serializer = Serializer {
        options: *options,
        lines: Vec::new(),
        last: None,
    };
    serializer.node(tree, 0, 0);
    serializer.finish()
}

/// Serialize with types inferred from tree depth
pub fn serialize_inferred(tree: &TreeNode) -> String {
    serialize(tree, &SerializeOptions::inferred())
}
