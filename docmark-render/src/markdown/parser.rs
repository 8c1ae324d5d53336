//! Markdown parsing
//!
//! CommonMark and GFM tables go through comrak. Directive lines, row/column
//! grids and includes are recognised by a line scan first, since comrak would
//! otherwise fold them into ordinary paragraphs. The scan only looks at
//! unindented lines outside fenced code. Text between recognised lines is
//! handed to comrak as a separate segment, prefixed with every link
//! reference definition in the document so references resolve across
//! directive lines.

use super::ast::{
    plain_text, Alignment, Block, Column, Inline, List, ListItem, MarkdownDocument, NoteKind,
    Table, TableRow, TripleColon,
};
use super::directives::Directive;
use crate::error::ConvertError;
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};

/// Parse Markdown source into a [`MarkdownDocument`].
pub fn parse_markdown(source: &str) -> Result<MarkdownDocument, ConvertError> {
    let normalized = source.replace("\r\n", "\n");
    let (front_matter, body) = split_front_matter(&normalized);
    let lines: Vec<&str> = body.lines().collect();
    let definitions = reference_definitions(&lines);
    Ok(MarkdownDocument {
        front_matter,
        blocks: parse_lines(&lines, &definitions),
    })
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options
}

fn split_front_matter(source: &str) -> (Option<String>, &str) {
    let Some(rest) = source.strip_prefix("---\n") else {
        return (None, source);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = rest[..offset].trim_end_matches('\n').to_string();
            return (Some(yaml), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, source)
}

/// Single-line link reference definitions outside fenced code.
fn reference_definitions(lines: &[&str]) -> String {
    let mut found = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    for line in lines {
        if let Some(open) = fence {
            if closes_fence(line, open) {
                fence = None;
            }
            continue;
        }
        if let Some(open) = opens_fence(line) {
            fence = Some(open);
            continue;
        }
        if is_reference_definition(line) {
            found.push(line.trim());
        }
    }
    found.join("\n")
}

fn is_reference_definition(line: &str) -> bool {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return false;
    }
    let Some(rest) = line[indent..].strip_prefix('[') else {
        return false;
    };
    let Some((label, destination)) = rest.split_once("]:") else {
        return false;
    };
    !label.trim().is_empty()
        && !label.contains(|c| c == '[' || c == ']')
        && !destination.trim().is_empty()
}

fn parse_lines(lines: &[&str], definitions: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(open) = fence {
            if closes_fence(line, open) {
                fence = None;
            }
            pending.push(line);
            i += 1;
            continue;
        }
        if let Some(open) = opens_fence(line) {
            fence = Some(open);
            pending.push(line);
            i += 1;
            continue;
        }

        if line.starts_with(":::") {
            if let Some(directive) = Directive::parse(line) {
                flush(&mut pending, &mut blocks, definitions);
                if directive.opens_container() {
                    if let Some(end) = find_container_end(lines, i, &directive.name) {
                        let children = parse_lines(&lines[i + 1..end], definitions);
                        blocks.push(container_block(directive, children));
                        i = end + 1;
                        continue;
                    }
                }
                blocks.push(Block::TripleColon(TripleColon::leaf(
                    &directive.name,
                    directive.attributes,
                )));
                i += 1;
                continue;
            }
        }

        if let Some((title, path)) = parse_include(line) {
            flush(&mut pending, &mut blocks, definitions);
            blocks.push(Block::Inclusion { title, path });
            i += 1;
            continue;
        }

        pending.push(line);
        i += 1;
    }

    flush(&mut pending, &mut blocks, definitions);
    blocks
}

fn opens_fence(line: &str) -> Option<(char, usize)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let trimmed = &line[indent..];
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let count = trimmed.chars().take_while(|c| *c == marker).count();
    (count >= 3).then_some((marker, count))
}

fn closes_fence(line: &str, (marker, length): (char, usize)) -> bool {
    let trimmed = line.trim_start();
    let count = trimmed.chars().take_while(|c| *c == marker).count();
    count >= length && trimmed[count * marker.len_utf8()..].trim().is_empty()
}

fn find_container_end(lines: &[&str], start: usize, name: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut fence: Option<(char, usize)> = None;
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        if let Some(open) = fence {
            if closes_fence(line, open) {
                fence = None;
            }
            continue;
        }
        if let Some(open) = opens_fence(line) {
            fence = Some(open);
            continue;
        }
        if !line.starts_with(":::") {
            continue;
        }
        let Some(directive) = Directive::parse(line) else {
            continue;
        };
        if directive.name == name && directive.opens_container() {
            depth += 1;
        } else if directive.closes() == Some(name) {
            if depth == 0 {
                return Some(start + 1 + offset);
            }
            depth -= 1;
        }
    }
    None
}

fn container_block(directive: Directive, children: Vec<Block>) -> Block {
    match directive.name.as_str() {
        "row" => Block::Row {
            columns: children.into_iter().map(into_column).collect(),
        },
        "moniker" => Block::MonikerRange {
            range: directive.attribute("range").unwrap_or_default().to_string(),
            children,
        },
        _ => Block::TripleColon(TripleColon {
            name: directive.name,
            attributes: directive.attributes,
            children,
            container: true,
        }),
    }
}

fn into_column(block: Block) -> Column {
    match block {
        Block::TripleColon(tc) if tc.name == "column" => Column {
            span: tc
                .attribute("span")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            children: tc.children,
        },
        other => Column {
            span: 1,
            children: vec![other],
        },
    }
}

fn parse_include(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    let head = trimmed.get(..9)?;
    if !head.eq_ignore_ascii_case("[!INCLUDE") {
        return None;
    }
    let rest = trimmed[9..].trim_start().strip_suffix(']')?.trim_end();
    let rest = rest.strip_prefix('[')?;
    let (title, rest) = rest.split_once("](")?;
    let path = rest.strip_suffix(')')?;
    Some((title.to_string(), path.trim().to_string()))
}

fn flush(pending: &mut Vec<&str>, blocks: &mut Vec<Block>, definitions: &str) {
    if pending.iter().any(|l| !l.trim().is_empty()) {
        let text = pending.join("\n");
        if definitions.is_empty() {
            blocks.extend(parse_segment(&text));
        } else {
            blocks.extend(parse_segment(&format!("{definitions}\n\n{text}")));
        }
    }
    pending.clear();
}

fn parse_segment(text: &str) -> Vec<Block> {
    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, text, &options);
    root.children().map(convert_block).collect()
}

fn convert_children<'a>(node: &'a AstNode<'a>) -> Vec<Block> {
    node.children().map(convert_block).collect()
}

fn convert_block<'a>(node: &'a AstNode<'a>) -> Block {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Heading(heading) => Block::Heading {
            level: heading.level,
            content: convert_inlines(node),
        },
        NodeValue::Paragraph => recognize_paragraph(convert_inlines(node)),
        NodeValue::List(list) => Block::List(List {
            ordered: matches!(list.list_type, ListType::Ordered),
            start: list.start as u32,
            tight: list.tight,
            items: node.children().map(convert_item).collect(),
        }),
        NodeValue::CodeBlock(code) => Block::CodeBlock {
            info: code.info.trim().to_string(),
            literal: code.literal,
            fenced: code.fenced,
        },
        NodeValue::HtmlBlock(html) => Block::HtmlBlock {
            literal: html.literal,
        },
        NodeValue::ThematicBreak => Block::ThematicBreak,
        NodeValue::BlockQuote => recognize_quote(convert_children(node)),
        NodeValue::Table(table) => Block::Table(convert_table(node, &table.alignments)),
        other => Block::Other {
            kind: kind_of(&other),
        },
    }
}

fn convert_item<'a>(node: &'a AstNode<'a>) -> ListItem {
    let mut children = convert_children(node);
    if let Some(Block::Paragraph { content }) = children.first_mut() {
        if let Some(checked) = strip_task_marker(content) {
            content.insert(0, Inline::TaskMarker { checked });
        }
    }
    ListItem { children }
}

fn strip_task_marker(content: &mut Vec<Inline>) -> Option<bool> {
    let Some(Inline::Text(text)) = content.first_mut() else {
        return None;
    };
    let checked = match text.get(..3) {
        Some("[ ]") => false,
        Some("[x]") | Some("[X]") => true,
        _ => return None,
    };
    let rest = &text[3..];
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    let rest = rest.strip_prefix(' ').unwrap_or(rest).to_string();
    if rest.is_empty() {
        content.remove(0);
    } else {
        *text = rest;
    }
    Some(checked)
}

fn convert_table<'a>(node: &'a AstNode<'a>, alignments: &[TableAlignment]) -> Table {
    let rows = node
        .children()
        .map(|row| {
            let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
            TableRow {
                header,
                cells: row.children().map(convert_inlines).collect(),
            }
        })
        .collect();
    Table {
        alignments: alignments
            .iter()
            .map(|a| match a {
                TableAlignment::Left => Alignment::Left,
                TableAlignment::Center => Alignment::Center,
                TableAlignment::Right => Alignment::Right,
                TableAlignment::None => Alignment::None,
            })
            .collect(),
        rows,
    }
}

fn recognize_paragraph(content: Vec<Inline>) -> Block {
    if let [Inline::Text(text)] = content.as_slice() {
        if text.trim_start().starts_with(":::") && !text.contains('\n') {
            if let Some(directive) = Directive::parse(text) {
                return Block::TripleColon(TripleColon::leaf(
                    &directive.name,
                    directive.attributes,
                ));
            }
        }
    }
    if let [Inline::Text(open), Inline::Link { url, children, .. }, Inline::Text(close)] =
        content.as_slice()
    {
        if open.trim().eq_ignore_ascii_case("[!INCLUDE") && close.trim() == "]" {
            return Block::Inclusion {
                title: plain_text(children),
                path: url.clone(),
            };
        }
    }
    Block::Paragraph { content }
}

fn recognize_quote(mut children: Vec<Block>) -> Block {
    let Some(Block::Paragraph { content }) = children.first() else {
        return Block::BlockQuote { children };
    };
    let marker_end = content
        .iter()
        .position(|i| matches!(i, Inline::LineBreak { .. }))
        .unwrap_or(content.len());
    let Some(kind) = NoteKind::from_marker(&plain_text(&content[..marker_end])) else {
        return Block::BlockQuote { children };
    };
    let rest: Vec<Inline> = content.iter().skip(marker_end + 1).cloned().collect();
    if rest.is_empty() {
        children.remove(0);
    } else {
        children[0] = Block::Paragraph { content: rest };
    }
    Block::QuoteSectionNote { kind, children }
}

fn convert_inlines<'a>(node: &'a AstNode<'a>) -> Vec<Inline> {
    let mut inlines: Vec<Inline> = Vec::new();
    for child in node.children() {
        let inline = convert_inline(child);
        if let (Some(Inline::Text(prev)), Inline::Text(next)) = (inlines.last_mut(), &inline) {
            prev.push_str(next);
            continue;
        }
        inlines.push(inline);
    }
    inlines
}

fn convert_inline<'a>(node: &'a AstNode<'a>) -> Inline {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Text(text) => Inline::Text(text),
        NodeValue::SoftBreak => Inline::LineBreak { hard: false },
        NodeValue::LineBreak => Inline::LineBreak { hard: true },
        NodeValue::Code(code) => Inline::Code(code.literal),
        NodeValue::HtmlInline(html) => Inline::Html(html),
        NodeValue::Emph => Inline::Emphasis {
            delimiter: '*',
            count: 1,
            children: convert_inlines(node),
        },
        NodeValue::Strong => Inline::Emphasis {
            delimiter: '*',
            count: 2,
            children: convert_inlines(node),
        },
        NodeValue::Strikethrough => Inline::Strikethrough {
            children: convert_inlines(node),
        },
        NodeValue::Link(link) => {
            let children = convert_inlines(node);
            let text = plain_text(&children);
            if !link.url.is_empty()
                && (text == link.url || format!("mailto:{text}") == link.url)
            {
                Inline::AutoLink { url: link.url }
            } else {
                Inline::Link {
                    url: link.url,
                    title: link.title,
                    children,
                }
            }
        }
        NodeValue::Image(link) => Inline::Image {
            alt: plain_text(&convert_inlines(node)),
            url: link.url,
            title: link.title,
        },
        other => Inline::Other {
            kind: kind_of(&other),
        },
    }
}

fn kind_of(value: &NodeValue) -> String {
    let debug = format!("{value:?}");
    debug
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(md: &str) -> Vec<Block> {
        parse_markdown(md).unwrap().blocks
    }

    #[test]
    fn parses_heading_and_paragraph() {
        let blocks = parse("# Title\n\nSome *text*.\n");
        assert!(matches!(&blocks[0], Block::Heading { level: 1, .. }));
        let Block::Paragraph { content } = &blocks[1] else {
            panic!("expected paragraph, got {:?}", blocks[1]);
        };
        assert_eq!(plain_text(content), "Some text.");
    }

    #[test]
    fn fenced_code_keeps_info_string() {
        let blocks = parse("```python\nprint(1)\n:::row:::\n```\n");
        assert_eq!(blocks.len(), 1);
        let Block::CodeBlock { info, literal, fenced } = &blocks[0] else {
            panic!("expected code block");
        };
        assert_eq!(info, "python");
        assert!(literal.contains(":::row:::"));
        assert!(*fenced);
    }

    #[test]
    fn admonition_quote_becomes_note() {
        let blocks = parse("> [!WARNING]\n> Mind the gap.\n");
        let Block::QuoteSectionNote { kind, children } = &blocks[0] else {
            panic!("expected note, got {:?}", blocks[0]);
        };
        assert_eq!(*kind, NoteKind::Warning);
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn video_quote_keeps_url() {
        let blocks = parse("> [!VIDEO https://example.com/embed/1]\n");
        assert_eq!(
            blocks[0],
            Block::QuoteSectionNote {
                kind: NoteKind::Video("https://example.com/embed/1".to_string()),
                children: vec![],
            }
        );
    }

    #[test]
    fn row_and_columns_nest() {
        let md = ":::row:::\n:::column span=\"2\":::\nLeft\n:::column-end:::\n:::column:::\nRight\n:::column-end:::\n:::row-end:::\n";
        let blocks = parse(md);
        let Block::Row { columns } = &blocks[0] else {
            panic!("expected row, got {:?}", blocks[0]);
        };
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].span, 2);
        assert_eq!(columns[1].children, vec![Block::text_paragraph("Right")]);
    }

    #[test]
    fn zone_is_a_container() {
        let md = ":::zone pivot=\"python\"\n\nText\n\n:::zone-end\n";
        let Block::TripleColon(tc) = &parse(md)[0] else {
            panic!("expected directive");
        };
        assert!(tc.container);
        assert_eq!(tc.attribute("pivot"), Some("python"));
        assert_eq!(tc.children.len(), 1);
    }

    #[test]
    fn unclosed_container_degrades_to_leaf() {
        let blocks = parse(":::row:::\nText\n");
        assert!(matches!(&blocks[0], Block::TripleColon(tc) if !tc.container));
        assert!(matches!(&blocks[1], Block::Paragraph { .. }));
    }

    #[test]
    fn include_lines_are_recognised() {
        let blocks = parse("[!INCLUDE [intro](includes/intro.md)]\n");
        assert_eq!(
            blocks[0],
            Block::Inclusion {
                title: "intro".to_string(),
                path: "includes/intro.md".to_string(),
            }
        );
    }

    #[test]
    fn task_markers_are_detected() {
        let blocks = parse("- [x] done\n- [ ] open\n- plain\n");
        let Block::List(list) = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(list.items[0].task(), Some(true));
        assert_eq!(list.items[1].task(), Some(false));
        assert_eq!(list.items[2].task(), None);
    }

    #[test]
    fn nested_directive_inside_list_item() {
        let md = "1. Step\n\n   :::image type=\"content\" source=\"a.png\" alt-text=\"A\":::\n";
        let Block::List(list) = &parse(md)[0] else {
            panic!("expected list");
        };
        assert!(matches!(&list.items[0].children[1], Block::TripleColon(tc) if tc.name == "image"));
    }

    #[test]
    fn front_matter_is_split_off() {
        let doc = parse_markdown("---\ntitle: Intro\n---\n# Heading\n").unwrap();
        assert_eq!(doc.front_matter.as_deref(), Some("title: Intro"));
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn table_alignment_and_header() {
        let blocks = parse("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        let Block::Table(table) = &blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.alignments, vec![Alignment::Left, Alignment::Right]);
        assert!(table.rows[0].header);
        assert!(!table.rows[1].header);
    }

    #[test]
    fn reference_links_resolve_across_directives() {
        let md = "[a][r]\n\n:::zone pivot=\"x\"\n\n[b][r]\n\n:::zone-end\n\n[r]: https://x.test\n";
        let blocks = parse(md);
        assert_eq!(blocks.len(), 2);
        let Block::Paragraph { content } = &blocks[0] else {
            panic!("expected paragraph, got {:?}", blocks[0]);
        };
        assert!(matches!(
            content.as_slice(),
            [Inline::Link { url, children, .. }] if url == "https://x.test" && plain_text(children) == "a"
        ));
        let Block::TripleColon(zone) = &blocks[1] else {
            panic!("expected zone, got {:?}", blocks[1]);
        };
        assert!(matches!(
            &zone.children[0],
            Block::Paragraph { content } if matches!(content.as_slice(), [Inline::Link { .. }])
        ));
    }

    #[test]
    fn definitions_inside_fences_are_not_shared() {
        let md = "```\n[r]: https://x.test\n```\n\n:::zone pivot=\"x\"\n\n[b][r]\n\n:::zone-end\n";
        let blocks = parse(md);
        let Block::TripleColon(zone) = &blocks[1] else {
            panic!("expected zone, got {:?}", blocks[1]);
        };
        assert!(matches!(
            &zone.children[0],
            Block::Paragraph { content } if plain_text(content) == "[b][r]"
        ));
    }
}
