//! Promptmap - edit prompt outlines as Markdown or as a node graph

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use promptmap_core::graph::{Adjacency, GraphNode, NodePayload};
use promptmap_core::layout::viewport_bounds;
use promptmap_core::markdown::MarkdownParser;
use promptmap_core::{
    layout, serialize, Config, EditorSession, GraphEdge, SerializeOptions, TreeNode,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Convert prompt outlines between Markdown and graph documents
#[derive(Parser, Debug)]
#[command(name = "promptmap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse Markdown into a laid out graph document (JSON)
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
    /// Export a graph document as Markdown
    Export {
        #[arg(value_name = "GRAPH")]
        file: PathBuf,
        /// Derive headings from tree depth instead of stored types
        #[arg(long)]
        inferred: bool,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
        /// Also copy the Markdown to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Parse Markdown and print it back in canonical form
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Derive headings from tree depth instead of parsed types
        #[arg(long)]
        inferred: bool,
    },
    /// Print the visible part of a graph document as an indented tree
    Outline {
        #[arg(value_name = "GRAPH")]
        file: PathBuf,
    },
    /// Print computed positions for the visible nodes of a graph document
    Layout {
        #[arg(value_name = "GRAPH")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    match args.command {
        Command::Import { file, output } => {
            let tree = read_markdown(&file)?;
            let mut session = EditorSession::from_tree(&tree);
            session.apply_layout(&config.layout);
            let json = serde_json::to_string_pretty(&session.to_document())
                .context("Failed to encode graph document")?;
            write_output(output.as_deref(), &format!("{}\n", json))?;
        }
        Command::Export {
            file,
            inferred,
            output,
            copy,
        } => {
            let session = read_document(&file)?;
            let options = if inferred {
                SerializeOptions::inferred()
            } else {
                config.export.serialize_options()
            };
            let markdown = match session.to_tree() {
                Some(tree) => serialize(&tree, &options),
                None => config.export.empty_placeholder.clone(),
            };
            write_output(output.as_deref(), &markdown)?;
            if copy {
                copy_to_clipboard(&markdown)?;
            }
        }
        Command::Normalize { file, inferred } => {
            let tree = read_markdown(&file)?;
            let options = if inferred {
                SerializeOptions::inferred()
            } else {
                config.export.serialize_options()
            };
            write_output(None, &serialize(&tree, &options))?;
        }
        Command::Outline { file } => {
            let session = read_document(&file)?;
            let visible = session.visible();
            write_output(None, &render_outline(&visible.nodes, &visible.edges))?;
        }
        Command::Layout { file } => {
            let session = read_document(&file)?;
            let visible = session.visible();
            let placed = layout(&visible.nodes, &visible.edges, &config.layout);

            let mut out = String::new();
            for entry in &placed {
                let marker = if entry.is_placed() { "" } else { " (unplaced)" };
                out.push_str(&format!(
                    "{}\t{:.1}\t{:.1}{}\n",
                    entry.node.id, entry.node.position.x, entry.node.position.y, marker
                ));
            }
            if let Some(bounds) =
                viewport_bounds(placed.iter().map(|entry| entry.node.position), &config.layout)
            {
                out.push_str(&format!(
                    "bounds\t{:.1}x{:.1}\n",
                    bounds.width(),
                    bounds.height()
                ));
            }
            write_output(None, &out)?;
        }
    }

    Ok(())
}

/// Read and parse a Markdown file, rejecting blank input
fn read_markdown(path: &Path) -> Result<TreeNode> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read Markdown file: {}", path.display()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        bail!("Please enter some Markdown content");
    }

    MarkdownParser::new()
        .parse_bytes(&bytes)
        .with_context(|| format!("Failed to parse Markdown file: {}", path.display()))
}

fn read_document(path: &Path) -> Result<EditorSession> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph document: {}", path.display()))?;
    let document = serde_json::from_str(&content)
        .with_context(|| format!("Failed to decode graph document: {}", path.display()))?;
    EditorSession::from_document(document)
        .with_context(|| format!("Invalid graph document: {}", path.display()))
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")
        }
    }
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard is not available")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to copy to clipboard")?;
    log::info!("copied {} bytes to clipboard", text.len());
    Ok(())
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_text: &str) -> Result<()> {
    bail!("promptmap was built without clipboard support")
}

/// Indented listing of a graph from its root, collapsed blocks marked `[+]`
fn render_outline(nodes: &[GraphNode], edges: &[GraphEdge]) -> String {
    let adjacency = Adjacency::new(edges);
    let Some(root) = adjacency.unique_root(nodes) else {
        return String::from("(no root)\n");
    };

    let mut out = String::new();
    let mut stack = vec![(root.id.as_str(), 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = nodes.iter().find(|node| node.id == id) else {
            continue;
        };
        let label = match &node.payload {
            NodePayload::TextBlock(data) => {
                let fold = if data.is_collapsed { " [+]" } else { "" };
                format!("{} {}{}", data.node_type, data.content, fold)
            }
            NodePayload::Reference(data) => {
                format!("-> {} {}", data.ref_title, data.ref_id)
            }
        };
        out.push_str(&format!("{}{}\n", "  ".repeat(depth), label));

        for child in adjacency.children(id).iter().rev() {
            stack.push((*child, depth + 1));
        }
    }
    out
}
