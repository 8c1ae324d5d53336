//! List membership and nesting
//!
//! A list is identified by its numbering definition. Items sharing the
//! identity of the open list are appended to it at their level; paragraphs
//! without numbering that follow a list continue its last item.

use super::context::{Cursor, Open, RenderContext};
use super::inlines::extract_task_marker;
use super::paragraphs::paragraph_blocks;
use super::tables::render_table;
use super::LetteredListPolicy;
use crate::error::RenderError;
use crate::markdown::{Block, Inline, List, ListItem, NoteKind};
use crate::richtext::{ListFormat, ListInfo, Paragraph};

/// How a paragraph relates to the list being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Item(ListInfo),
    /// Extra content for the last item at `depth`.
    Continuation { depth: u8 },
    None,
}

pub fn membership(ctx: &mut RenderContext<'_>, cursor: Cursor, paragraph: &Paragraph) -> Membership {
    let list_open = matches!(cursor.open, Open::List { .. });
    if let Some(reference) = paragraph.numbering {
        match ctx.doc.numbering.list_info(reference) {
            Some(info) if info.format == ListFormat::Removed => return Membership::None,
            Some(info) if info.format == ListFormat::None => {
                return if list_open {
                    Membership::Continuation { depth: info.level }
                } else {
                    Membership::None
                };
            }
            Some(info) => return Membership::Item(info),
            None => {
                ctx.log.warn(format!(
                    "paragraph {} references unknown numbering {}; rendered as a bullet",
                    paragraph.id.0, reference.num_id.0
                ));
                return Membership::Item(ListInfo {
                    format: ListFormat::Bullet,
                    level: reference.level,
                    start: 1,
                    identity: reference.num_id,
                });
            }
        }
    }
    if list_open && (paragraph.style_id() == "ListParagraph" || paragraph.indent_level > 0) {
        return Membership::Continuation {
            depth: paragraph.indent_level.saturating_sub(1),
        };
    }
    Membership::None
}

pub fn render_item(
    ctx: &mut RenderContext<'_>,
    out: &mut Vec<Block>,
    cursor: Cursor,
    paragraph: &Paragraph,
    info: ListInfo,
) -> Result<Cursor, RenderError> {
    let ordered = match info.format {
        ListFormat::Numbered => true,
        ListFormat::Lettered => ctx.options.lettered_lists == LetteredListPolicy::Ordered,
        _ => false,
    };

    let mut children = paragraph_blocks(ctx, paragraph, None);
    match children.first_mut() {
        Some(Block::Paragraph { content }) => {
            *content = extract_task_marker(std::mem::take(content));
        }
        Some(_) => {}
        None => children.push(Block::paragraph(Vec::new())),
    }
    for table in &paragraph.anchored_tables {
        children.push(render_table(ctx, table)?);
    }
    let item = ListItem::new(children);

    if let Open::List { index, identity } = cursor.open {
        if identity == info.identity || info.level > 0 {
            let Some(Block::List(root)) = out.get_mut(index) else {
                return Err(RenderError::Other(format!("open list {index} is missing")));
            };
            let target = list_at_level(root, info.level, ordered, info.start).ok_or_else(|| {
                RenderError::Numbering(format!("cannot nest item at level {}", info.level))
            })?;
            target.items.push(item);
            return Ok(cursor);
        }
    }

    if info.format == ListFormat::Lettered && !ordered {
        ctx.log.info(format!(
            "lettered list {} written as a bullet list",
            info.identity.0
        ));
    }
    let mut list = new_list(ordered, info.start);
    list.items.push(item);
    out.push(Block::List(list));
    Ok(Cursor::with(Open::List {
        index: out.len() - 1,
        identity: info.identity,
    }))
}

/// Append a paragraph's content to the last item at `depth` of the open list.
pub fn render_continuation(
    ctx: &mut RenderContext<'_>,
    out: &mut [Block],
    cursor: Cursor,
    paragraph: &Paragraph,
    depth: u8,
) -> Result<Cursor, RenderError> {
    let mut blocks = paragraph_blocks(ctx, paragraph, None);
    if blocks.is_empty() && paragraph.anchored_tables.is_empty() {
        // Blank paragraphs keep their place in the item.
        blocks.push(Block::paragraph(Vec::new()));
    }
    for table in &paragraph.anchored_tables {
        blocks.push(render_table(ctx, table)?);
    }
    let item = last_item(out, cursor, depth)?;
    item.children.extend(blocks);
    Ok(cursor)
}

/// Add a code line inside the open list, merging with a code block that
/// already ends the target item.
pub fn append_code(
    out: &mut [Block],
    cursor: Cursor,
    depth: u8,
    line: &str,
) -> Result<(), RenderError> {
    let item = last_item(out, cursor, depth)?;
    match item.children.last_mut() {
        Some(Block::CodeBlock { literal, .. }) => {
            literal.push_str(line);
            literal.push('\n');
        }
        _ => item.children.push(Block::CodeBlock {
            info: String::new(),
            literal: format!("{line}\n"),
            fenced: true,
        }),
    }
    Ok(())
}

/// Add a quote paragraph inside the open list, extending a quote that
/// already ends the target item. A note always opens a new quote.
pub fn append_quote(
    out: &mut [Block],
    cursor: Cursor,
    depth: u8,
    note: Option<NoteKind>,
    inlines: Vec<Inline>,
) -> Result<(), RenderError> {
    let item = last_item(out, cursor, depth)?;
    let paragraph = (!inlines.is_empty()).then(|| Block::paragraph(inlines));
    if let Some(kind) = note {
        item.children.push(Block::QuoteSectionNote {
            kind,
            children: paragraph.into_iter().collect(),
        });
        return Ok(());
    }
    match item.children.last_mut() {
        Some(Block::BlockQuote { children } | Block::QuoteSectionNote { children, .. }) => {
            children.extend(paragraph);
        }
        _ => item.children.push(Block::BlockQuote {
            children: paragraph.into_iter().collect(),
        }),
    }
    Ok(())
}

/// Set the info string of a code block ending the open list. Returns false
/// when the list does not end in code.
pub fn set_code_info(out: &mut [Block], cursor: Cursor, info: &str) -> bool {
    let Ok(item) = last_item(out, cursor, u8::MAX) else {
        return false;
    };
    match item.children.last_mut() {
        Some(Block::CodeBlock { info: slot, .. }) => {
            *slot = info.to_string();
            true
        }
        _ => false,
    }
}

fn last_item(out: &mut [Block], cursor: Cursor, depth: u8) -> Result<&mut ListItem, RenderError> {
    let Open::List { index, .. } = cursor.open else {
        return Err(RenderError::Other("no list is open".to_string()));
    };
    let Some(Block::List(root)) = out.get_mut(index) else {
        return Err(RenderError::Other(format!("open list {index} is missing")));
    };
    let depth = depth.min(available_depth(root));
    let list = nested_list(root, depth)
        .ok_or_else(|| RenderError::Numbering(format!("no list at depth {depth}")))?;
    // Multi-block items only survive a round trip in a loose list.
    list.tight = false;
    list.items
        .last_mut()
        .ok_or_else(|| RenderError::Other("open list has no items".to_string()))
}

fn new_list(ordered: bool, start: u32) -> List {
    if ordered {
        List::ordered(start, Vec::new())
    } else {
        List::bullet(Vec::new())
    }
}

/// How many lists are nested along the last-item spine.
fn available_depth(list: &List) -> u8 {
    match list.items.last().and_then(|item| item.children.last()) {
        Some(Block::List(inner)) => available_depth(inner).saturating_add(1),
        _ => 0,
    }
}

fn nested_list(list: &mut List, depth: u8) -> Option<&mut List> {
    if depth == 0 {
        return Some(list);
    }
    match list.items.last_mut()?.children.last_mut()? {
        Block::List(inner) => nested_list(inner, depth - 1),
        _ => None,
    }
}

/// The list at `level` below `list`, creating empty items and lists on the way.
fn list_at_level(list: &mut List, level: u8, ordered: bool, start: u32) -> Option<&mut List> {
    if level == 0 {
        return Some(list);
    }
    if list.items.is_empty() {
        list.items.push(ListItem::default());
    }
    let item = list.items.last_mut()?;
    if !matches!(item.children.last(), Some(Block::List(_))) {
        item.children.push(Block::List(new_list(ordered, start)));
    }
    match item.children.last_mut()? {
        Block::List(inner) => list_at_level(inner, level - 1, ordered, start),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> ListItem {
        ListItem::new(vec![Block::text_paragraph(text)])
    }

    #[test]
    fn list_at_level_creates_nested_lists() {
        let mut root = List::bullet(vec![item("a")]);
        let nested = list_at_level(&mut root, 2, true, 1).unwrap();
        nested.items.push(item("deep"));
        assert_eq!(available_depth(&root), 2);
    }

    #[test]
    fn nested_list_stops_at_spine_end() {
        let mut root = List::bullet(vec![item("a")]);
        assert!(nested_list(&mut root, 1).is_none());
        assert!(nested_list(&mut root, 0).is_some());
    }

    #[test]
    fn continuation_marks_list_loose() {
        let mut out = vec![Block::List(List::bullet(vec![item("a")]))];
        let cursor = Cursor::with(Open::List {
            index: 0,
            identity: crate::richtext::NumId(1),
        });
        last_item(&mut out, cursor, 3).unwrap().children.push(Block::text_paragraph("more"));
        let Block::List(list) = &out[0] else {
            panic!("expected list");
        };
        assert!(!list.tight);
        assert_eq!(list.items[0].children.len(), 2);
    }
}
