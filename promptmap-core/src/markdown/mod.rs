//! Markdown interchange: parsing into trees and serializing them back

pub mod ast;
pub mod parser;
pub mod serializer;

pub use parser::{parse_markdown, tree_from_blocks, IdGenerator, MarkdownParser, ROOT_ID};
pub use serializer::{serialize, serialize_inferred, SerializeOptions};
