//! Markdown lists to numbered paragraphs

use super::blocks::unexpected;
use super::context::{BuildContext, Cursor, ListTrail};
use super::{BlockRenderer, Renderers};
use crate::error::RenderError;
use crate::markdown::{Block, List, ListItem};
use crate::richtext::numbering::MAX_LEVELS;
use crate::richtext::{self, LevelDefinition, NumId, NumberFormat, NumberingRef};

pub struct ListRenderer;
claims!(ListRenderer, "list", Block::List(_));

impl BlockRenderer for ListRenderer {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::List(list) = node else {
            return Err(unexpected("list", node));
        };
        if cursor.item.is_some() {
            // A list opening an item: the outer item keeps an empty paragraph.
            let item = ctx.start_paragraph(&mut cursor, "Normal");
            out.push(richtext::Block::Paragraph(item));
        }

        let level = cursor.indent.min(MAX_LEVELS as u8 - 1);
        let identity = match cursor.previous_list {
            Some(trail) if continues(trail, list) => trail.identity,
            _ => allocate(ctx, list, level),
        };

        for item in &list.items {
            let numbering = NumberingRef {
                num_id: identity,
                level,
            };
            render_item(renderers, ctx, out, numbering, cursor.style, item);
        }

        Ok(Cursor {
            item: None,
            previous_list: Some(ListTrail {
                ordered: list.ordered,
                next_number: list.start.saturating_add(list.items.len() as u32),
                identity,
            }),
            ..cursor
        })
    }
}

/// Whether `list` picks up where the list just before it stopped.
fn continues(trail: ListTrail, list: &List) -> bool {
    trail.ordered == list.ordered && (!list.ordered || trail.next_number == list.start)
}

fn allocate(ctx: &mut BuildContext<'_>, list: &List, level: u8) -> NumId {
    if !list.ordered {
        return ctx.doc.numbering.add_bullet(None);
    }
    let id = ctx.doc.numbering.add_ordered(list.start);
    if level > 0 {
        ctx.doc.numbering.set_level(
            id,
            level,
            LevelDefinition::ordered(NumberFormat::Decimal, list.start),
        );
    }
    id
}

/// The first paragraph of an item carries the numbering; the rest of its
/// blocks follow one level deeper without it.
fn render_item(
    renderers: &Renderers,
    ctx: &mut BuildContext<'_>,
    out: &mut Vec<richtext::Block>,
    numbering: NumberingRef,
    style: Option<&'static str>,
    item: &ListItem,
) {
    let first = out.len();
    let mut cursor = Cursor {
        item: Some(numbering),
        indent: numbering.level + 1,
        style,
        previous_list: None,
    };

    for child in &item.children {
        if let Block::Table(_) = child {
            let mut rendered = Vec::new();
            renderers.render_blocks(ctx, &mut rendered, Cursor::nested(), std::slice::from_ref(child));
            let Some(anchor) = anchor_paragraph(ctx, out, first, &mut cursor) else {
                continue;
            };
            for block in rendered {
                match block {
                    richtext::Block::Table(table) => anchor.anchored_tables.push(table),
                    other => log::debug!("{} inside a list item table; dropped", other.kind_name()),
                }
            }
            cursor = cursor.after_block();
            continue;
        }
        cursor = renderers.render_blocks(ctx, out, cursor, std::slice::from_ref(child));
    }

    if cursor.item.is_some() {
        // An empty item still needs its numbered paragraph.
        let paragraph = ctx.start_paragraph(&mut cursor, "Normal");
        out.push(richtext::Block::Paragraph(paragraph));
    }
}

/// The item's last paragraph, opening an empty numbered one if the item has none yet.
fn anchor_paragraph<'o>(
    ctx: &mut BuildContext<'_>,
    out: &'o mut Vec<richtext::Block>,
    first: usize,
    cursor: &mut Cursor,
) -> Option<&'o mut richtext::Paragraph> {
    let has_paragraph = out[first..]
        .iter()
        .any(|b| matches!(b, richtext::Block::Paragraph(_)));
    if !has_paragraph {
        let paragraph = ctx.start_paragraph(cursor, "Normal");
        out.push(richtext::Block::Paragraph(paragraph));
    }
    out[first..].iter_mut().rev().find_map(|b| match b {
        richtext::Block::Paragraph(p) => Some(p),
        _ => None,
    })
}
