//! Markdown side of the conversion: tree, parser and serializer

pub mod ast;
pub mod directives;
pub mod parser;
pub mod serializer;

pub use ast::{
    plain_text, tab_link, Alignment, Block, Column, Inline, List, ListItem, MarkdownDocument,
    NoteKind, Table, TableRow, TripleColon,
};
pub use directives::Directive;
pub use parser::parse_markdown;
pub use serializer::serialize_markdown;
