//! Markdown serialization
//!
//! Builds a comrak AST from a [`MarkdownDocument`] and formats it with
//! comrak's CommonMark writer. Extension syntax (directives, note markers,
//! task markers, includes) is emitted as raw HTML nodes so the writer passes
//! it through without escaping.

use super::ast::{Alignment, Block, Inline, List, MarkdownDocument, NoteKind, Table, TripleColon};
use super::directives::Directive;
use crate::error::ConvertError;
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeLink, NodeList, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena, ComrakOptions};
use std::cell::RefCell;

/// Serialize a [`MarkdownDocument`] to Markdown text.
pub fn serialize_markdown(doc: &MarkdownDocument) -> Result<String, ConvertError> {
    let arena = Arena::new();
    let root = new_node(&arena, NodeValue::Document);
    for block in &doc.blocks {
        append_block(&arena, root, block);
    }

    let mut output = Vec::new();
    format_commonmark(root, &default_comrak_options(), &mut output)
        .map_err(|e| ConvertError::Serialization(format!("Comrak serialization failed: {e}")))?;
    let markdown = String::from_utf8(output)
        .map_err(|e| ConvertError::Serialization(format!("UTF-8 conversion failed: {e}")))?;

    // Comrak separates adjacent lists with an HTML comment
    let cleaned = markdown.replace("<!-- end list -->\n\n", "");

    Ok(match &doc.front_matter {
        Some(yaml) => format!("---\n{yaml}\n---\n\n{cleaned}"),
        None => cleaned,
    })
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.render.unsafe_ = true;
    options
}

fn new_node<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn append_raw<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, line: String) {
    let mut literal = line;
    if !literal.ends_with('\n') {
        literal.push('\n');
    }
    parent.append(new_node(
        arena,
        NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal,
        }),
    ));
}

fn append_block<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, block: &Block) {
    match block {
        Block::Heading { level, content } => {
            let node = new_node(
                arena,
                NodeValue::Heading(NodeHeading {
                    level: (*level).clamp(1, 6),
                    setext: false,
                }),
            );
            parent.append(node);
            append_inlines(arena, node, content);
        }
        Block::Paragraph { content } => {
            let node = new_node(arena, NodeValue::Paragraph);
            parent.append(node);
            append_inlines(arena, node, content);
        }
        Block::List(list) => append_list(arena, parent, list),
        Block::CodeBlock {
            info,
            literal,
            fenced,
        } => {
            let mut literal = literal.clone();
            if !literal.ends_with('\n') {
                literal.push('\n');
            }
            parent.append(new_node(
                arena,
                NodeValue::CodeBlock(NodeCodeBlock {
                    fenced: *fenced || !info.is_empty(),
                    fence_char: b'`',
                    fence_length: 3,
                    fence_offset: 0,
                    info: info.clone(),
                    literal,
                }),
            ));
        }
        Block::Table(table) => append_table(arena, parent, table),
        Block::BlockQuote { children } => {
            let node = new_node(arena, NodeValue::BlockQuote);
            parent.append(node);
            for child in children {
                append_block(arena, node, child);
            }
        }
        Block::QuoteSectionNote { kind, children } => {
            append_note(arena, parent, kind, children)
        }
        Block::TripleColon(directive) => append_directive(arena, parent, directive),
        Block::Row { columns } => {
            append_raw(arena, parent, Directive::new("row", vec![]).to_line());
            for column in columns {
                let attributes = if column.span > 1 {
                    vec![("span".to_string(), column.span.to_string())]
                } else {
                    vec![]
                };
                append_raw(arena, parent, Directive::new("column", attributes).to_line());
                for child in &column.children {
                    append_block(arena, parent, child);
                }
                append_raw(arena, parent, Directive::end_line("column"));
            }
            append_raw(arena, parent, Directive::end_line("row"));
        }
        Block::MonikerRange { range, children } => {
            let mut open = Directive::new("moniker", vec![("range".to_string(), range.clone())]);
            open.closed = false;
            append_raw(arena, parent, open.to_line());
            for child in children {
                append_block(arena, parent, child);
            }
            append_raw(arena, parent, ":::moniker-end".to_string());
        }
        Block::Inclusion { title, path } => {
            append_raw(arena, parent, format!("[!INCLUDE [{title}]({path})]"));
        }
        Block::ThematicBreak => parent.append(new_node(arena, NodeValue::ThematicBreak)),
        Block::HtmlBlock { literal } => append_raw(arena, parent, literal.clone()),
        Block::Other { .. } => {}
    }
}

fn append_list<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, list: &List) {
    let attrs = NodeList {
        list_type: if list.ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start: list.start.max(if list.ordered { 0 } else { 1 }) as usize,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight: list.tight,
    };
    let list_node = new_node(arena, NodeValue::List(attrs));
    parent.append(list_node);
    for item in &list.items {
        let item_node = new_node(arena, NodeValue::Item(attrs));
        list_node.append(item_node);
        for child in &item.children {
            append_block(arena, item_node, child);
        }
    }
}

fn append_table<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, table: &Table) {
    let columns = table.column_count();
    if columns == 0 {
        return;
    }
    let mut alignments: Vec<TableAlignment> = table
        .alignments
        .iter()
        .map(|a| match a {
            Alignment::Left => TableAlignment::Left,
            Alignment::Center => TableAlignment::Center,
            Alignment::Right => TableAlignment::Right,
            Alignment::None => TableAlignment::None,
        })
        .collect();
    alignments.resize(columns, TableAlignment::None);

    let table_node = new_node(
        arena,
        NodeValue::Table(NodeTable {
            alignments,
            num_columns: columns,
            num_rows: table.rows.len(),
            num_nonempty_cells: 0,
        }),
    );
    parent.append(table_node);

    for (index, row) in table.rows.iter().enumerate() {
        let row_node = new_node(arena, NodeValue::TableRow(index == 0 || row.header));
        table_node.append(row_node);
        for col in 0..columns {
            let cell_node = new_node(arena, NodeValue::TableCell);
            row_node.append(cell_node);
            if let Some(cell) = row.cells.get(col) {
                append_inlines(arena, cell_node, cell);
            }
        }
    }
}

fn append_note<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    kind: &NoteKind,
    children: &[Block],
) {
    let quote = new_node(arena, NodeValue::BlockQuote);
    parent.append(quote);
    let marker = new_node(arena, NodeValue::Paragraph);
    quote.append(marker);
    marker.append(new_node(arena, NodeValue::HtmlInline(kind.marker())));

    let mut rest = children;
    if let Some((Block::Paragraph { content }, tail)) = children.split_first() {
        marker.append(new_node(arena, NodeValue::SoftBreak));
        append_inlines(arena, marker, content);
        rest = tail;
    }
    for child in rest {
        append_block(arena, quote, child);
    }
}

fn append_directive<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    directive: &TripleColon,
) {
    let mut open = Directive::new(&directive.name, directive.attributes.clone());
    // zone and moniker openers conventionally omit the closing colons
    open.closed = !(directive.container && directive.name != "image");
    append_raw(arena, parent, open.to_line());
    if directive.container {
        for child in &directive.children {
            append_block(arena, parent, child);
        }
        let mut end = Directive::new(&format!("{}-end", directive.name), vec![]);
        end.closed = directive.name == "image" || directive.name == "column";
        append_raw(arena, parent, end.to_line());
    }
}

fn append_inlines<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, inlines: &[Inline]) {
    for inline in inlines {
        append_inline(arena, parent, inline);
    }
}

fn append_inline<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, inline: &Inline) {
    match inline {
        Inline::Text(text) => parent.append(new_node(arena, NodeValue::Text(text.clone()))),
        Inline::Emphasis {
            count, children, ..
        } => {
            let (outer, inner) = match count {
                0 => {
                    append_inlines(arena, parent, children);
                    return;
                }
                1 => (NodeValue::Emph, None),
                2 => (NodeValue::Strong, None),
                _ => (NodeValue::Strong, Some(NodeValue::Emph)),
            };
            let outer = new_node(arena, outer);
            parent.append(outer);
            let target = match inner {
                Some(value) => {
                    let node = new_node(arena, value);
                    outer.append(node);
                    node
                }
                None => outer,
            };
            append_inlines(arena, target, children);
        }
        Inline::Strikethrough { children } => {
            let node = new_node(arena, NodeValue::Strikethrough);
            parent.append(node);
            append_inlines(arena, node, children);
        }
        Inline::LineBreak { hard: true } => parent.append(new_node(arena, NodeValue::LineBreak)),
        Inline::LineBreak { hard: false } => parent.append(new_node(arena, NodeValue::SoftBreak)),
        Inline::Link {
            url,
            title,
            children,
        } => {
            let node = new_node(
                arena,
                NodeValue::Link(NodeLink {
                    url: url.clone(),
                    title: title.clone(),
                }),
            );
            parent.append(node);
            append_inlines(arena, node, children);
        }
        Inline::AutoLink { url } => {
            let node = new_node(
                arena,
                NodeValue::Link(NodeLink {
                    url: url.clone(),
                    title: String::new(),
                }),
            );
            parent.append(node);
            node.append(new_node(arena, NodeValue::Text(url.clone())));
        }
        Inline::Image { url, title, alt } => {
            let node = new_node(
                arena,
                NodeValue::Image(NodeLink {
                    url: url.clone(),
                    title: title.clone(),
                }),
            );
            parent.append(node);
            if !alt.is_empty() {
                node.append(new_node(arena, NodeValue::Text(alt.clone())));
            }
        }
        Inline::Code(code) => parent.append(new_node(
            arena,
            NodeValue::Code(NodeCode {
                num_backticks: 1,
                literal: code.clone(),
            }),
        )),
        Inline::Html(html) => parent.append(new_node(arena, NodeValue::HtmlInline(html.clone()))),
        Inline::TaskMarker { checked } => {
            let marker = if *checked { "[x] " } else { "[ ] " };
            parent.append(new_node(arena, NodeValue::HtmlInline(marker.to_string())));
        }
        Inline::Other { .. } => {}
    }
}
