//! Block-level syntax tree folded out of the pulldown-cmark event stream
//!
//! Only the constructs the tree builder understands get their own variant;
//! everything else collapses to `Unsupported` so the walk can skip it.

use pulldown_cmark::{Event, Options, Parser, Tag};

use crate::error::MarkdownSyntaxError;

/// A top-level or list-item-level block
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { depth: u8, inlines: Vec<Inline> },
    Paragraph(Vec<Inline>),
    List(List),
    /// Code blocks, quotes, tables, rules, HTML, ...
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

impl ListItem {
    /// Inline content of the first paragraph in the item, if any
    pub fn leading_paragraph(&self) -> Option<&[Inline]> {
        self.blocks.iter().find_map(|block| match block {
            Block::Paragraph(inlines) => Some(inlines.as_slice()),
            _ => None,
        })
    }

    /// Lists nested directly inside this item, in document order
    pub fn nested_lists(&self) -> impl Iterator<Item = &List> {
        self.blocks.iter().filter_map(|block| match block {
            Block::List(list) => Some(list),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Code(String),
    /// Link text only; the destination is dropped
    Link(Vec<Inline>),
    Unsupported,
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Tokenize Markdown text into top-level blocks
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut events = Parser::new_ext(text, options());
    let mut blocks = Vec::new();

    while let Some(event) = events.next() {
        if let Some(block) = block_from(event, &mut events) {
            blocks.push(block);
        }
    }

    blocks
}

/// Tokenize raw bytes. Input that is not valid UTF-8 is rejected with the
/// position of the first bad byte.
pub fn parse_blocks_bytes(bytes: &[u8]) -> Result<Vec<Block>, MarkdownSyntaxError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(parse_blocks(text)),
        Err(err) => {
            let valid = &bytes[..err.valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            let line_start = valid
                .iter()
                .rposition(|&b| b == b'\n')
                .map(|pos| pos + 1)
                .unwrap_or(0);
            Err(MarkdownSyntaxError {
                message: "invalid UTF-8 sequence".to_string(),
                line,
                column: valid.len() - line_start + 1,
            })
        }
    }
}

fn block_from<'a, I>(event: Event<'a>, events: &mut I) -> Option<Block>
where
    I: Iterator<Item = Event<'a>>,
{
    match event {
        Event::Start(Tag::Heading { level, .. }) => Some(Block::Heading {
            depth: level as u8,
            inlines: inline_children(events),
        }),
        Event::Start(Tag::Paragraph) => Some(Block::Paragraph(inline_children(events))),
        Event::Start(Tag::List(_)) => Some(Block::List(list(events))),
        Event::Start(_) => {
            skip_container(events);
            Some(Block::Unsupported)
        }
        Event::Rule | Event::Html(_) => Some(Block::Unsupported),
        _ => None,
    }
}

fn list<'a, I>(events: &mut I) -> List
where
    I: Iterator<Item = Event<'a>>,
{
    let mut items = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::Item) => items.push(list_item(events)),
            Event::End(_) => break,
            Event::Start(_) => skip_container(events),
            _ => {}
        }
    }

    List { items }
}

/// Tight items carry their inline content directly; it is wrapped into an
/// implicit paragraph so tight and loose lists produce the same shape.
fn list_item<'a, I>(events: &mut I) -> ListItem
where
    I: Iterator<Item = Event<'a>>,
{
    let mut item = ListItem::default();
    let mut pending: Vec<Inline> = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::End(_) => break,
            Event::TaskListMarker(_) => {}
            Event::Start(tag) if !is_inline(&tag) => {
                if !pending.is_empty() {
                    item.blocks.push(Block::Paragraph(std::mem::take(&mut pending)));
                }
                if let Some(block) = block_from(Event::Start(tag), events) {
                    item.blocks.push(block);
                }
            }
            event => {
                if let Some(inline) = inline_from(event, events) {
                    pending.push(inline);
                }
            }
        }
    }

    if !pending.is_empty() {
        item.blocks.push(Block::Paragraph(pending));
    }

    item
}

fn is_inline(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

/// Collect inline children up to the end of the enclosing container
fn inline_children<'a, I>(events: &mut I) -> Vec<Inline>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut inlines = Vec::new();

    while let Some(event) = events.next() {
        if let Event::End(_) = event {
            break;
        }
        if let Some(inline) = inline_from(event, events) {
            inlines.push(inline);
        }
    }

    inlines
}

fn inline_from<'a, I>(event: Event<'a>, events: &mut I) -> Option<Inline>
where
    I: Iterator<Item = Event<'a>>,
{
    let inline = match event {
        Event::Text(text) => Inline::Text(text.into_string()),
        Event::Code(code) => Inline::Code(code.into_string()),
        Event::SoftBreak => Inline::Text("\n".to_string()),
        Event::Start(Tag::Emphasis) => Inline::Emphasis(inline_children(events)),
        Event::Start(Tag::Strong) => Inline::Strong(inline_children(events)),
        Event::Start(Tag::Link { .. }) => Inline::Link(inline_children(events)),
        Event::Start(_) => {
            skip_container(events);
            Inline::Unsupported
        }
        Event::End(_) => return None,
        _ => Inline::Unsupported,
    };
    Some(inline)
}

/// Consume events until the container whose start was just read is closed
fn skip_container<'a, I>(events: &mut I)
where
    I: Iterator<Item = Event<'a>>,
{
    let mut depth = 1usize;
    for event in events.by_ref() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
}

/// Flatten inline content into display text.
///
/// Strong and emphasis keep their `**`/`*` markers, code keeps backticks,
/// links keep only their text. Everything else contributes nothing.
pub fn flatten(inlines: &[Inline]) -> String {
    let mut out = String::new();
    flatten_into(inlines, &mut out);
    out
}

fn flatten_into(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Code(code) => {
                out.push('`');
                out.push_str(code);
                out.push('`');
            }
            Inline::Strong(children) => {
                out.push_str("**");
                flatten_into(children, out);
                out.push_str("**");
            }
            Inline::Emphasis(children) => {
                out.push('*');
                flatten_into(children, out);
                out.push('*');
            }
            Inline::Link(children) => flatten_into(children, out),
            Inline::Unsupported => {}
        }
    }
}
