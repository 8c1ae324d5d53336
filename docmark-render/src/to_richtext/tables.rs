//! Markdown tables and row/column grids to rich tables

use super::blocks::unexpected;
use super::context::{BuildContext, Cursor};
use super::inlines::render_into;
use super::{BlockRenderer, Renderers};
use crate::error::RenderError;
use crate::markdown::{Alignment, Block, Inline};
use crate::richtext::{self, ColumnAlignment, Table, TableDesign, TableLook};

pub struct TableRenderer;
claims!(TableRenderer, "table", Block::Table(_));

impl BlockRenderer for TableRenderer {
    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::Table(source) = node else {
            return Err(unexpected("table", node));
        };
        let columns = source.column_count();
        let mut table = Table::new(source.rows.len(), columns);

        for (r, row) in source.rows.iter().enumerate() {
            for (c, inlines) in row.cells.iter().enumerate() {
                let blocks = cell_paragraphs(ctx, inlines);
                table.cell_mut(r, c)?.blocks = blocks;
            }
        }

        let header_has_content = source
            .rows
            .first()
            .is_some_and(|row| row.cells.iter().any(|cell| !cell.is_empty()));
        if header_has_content {
            table.look = TableLook {
                header_row: true,
                ..TableLook::default()
            };
        } else {
            table.design = TableDesign::Plain;
        }
        table.columns = (0..columns)
            .map(|i| match source.alignments.get(i).copied().unwrap_or_default() {
                Alignment::None => ColumnAlignment::None,
                Alignment::Left => ColumnAlignment::Left,
                Alignment::Center => ColumnAlignment::Center,
                Alignment::Right => ColumnAlignment::Right,
            })
            .collect();

        out.push(richtext::Block::Table(table));
        Ok(cursor.after_block())
    }
}

/// One paragraph per `<br>`-separated piece of a cell.
fn cell_paragraphs(ctx: &mut BuildContext<'_>, inlines: &[Inline]) -> Vec<richtext::Block> {
    inlines
        .split(is_break_tag)
        .map(|piece| {
            let mut cursor = Cursor::nested();
            let mut paragraph = ctx.start_paragraph(&mut cursor, "Normal");
            render_into(ctx, &mut paragraph, piece);
            richtext::Block::Paragraph(paragraph)
        })
        .collect()
}

fn is_break_tag(inline: &Inline) -> bool {
    match inline {
        Inline::Html(raw) => {
            let tag = raw.trim().to_ascii_lowercase();
            matches!(tag.as_str(), "<br>" | "<br/>" | "<br />")
        }
        _ => false,
    }
}

/// A borderless one-row table with a cell per column.
pub struct RowRenderer;
claims!(RowRenderer, "row", Block::Row { .. });

impl BlockRenderer for RowRenderer {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::Row { columns } = node else {
            return Err(unexpected("row", node));
        };
        let mut table = Table::new(1, columns.len());
        table.design = TableDesign::Plain;

        for (c, column) in columns.iter().enumerate() {
            let mut blocks = Vec::new();
            renderers.render_blocks(ctx, &mut blocks, Cursor::nested(), &column.children);
            let cell = table.cell_mut(0, c)?;
            cell.blocks = blocks;
            cell.span = column.span.max(1);
        }

        out.push(richtext::Block::Table(table));
        Ok(cursor.after_block())
    }
}
