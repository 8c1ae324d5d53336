//! Rich tables to Markdown tables

use super::context::RenderContext;
use super::images::{render_drawing, ImageOutput};
use super::inlines::{render_segments, trim_inlines, Segment};
use crate::error::RenderError;
use crate::markdown::{self, Alignment, Inline};
use crate::richtext::{self, ColumnAlignment, Formatting, Paragraph};

pub fn render_table(
    ctx: &mut RenderContext<'_>,
    table: &richtext::Table,
) -> Result<markdown::Block, RenderError> {
    if table.rows.is_empty() {
        return Err(RenderError::Other("table has no rows".to_string()));
    }
    let last_row = table.rows.len() - 1;
    let columns = table.column_count();
    let look = table.look;

    let mut rows = Vec::with_capacity(table.rows.len());
    for (r, row) in table.rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(columns);
        let mut col = 0usize;
        for cell in &row.cells {
            let emphasised = r > 0
                && ((look.first_column && col == 0)
                    || (look.last_row && r == last_row)
                    || (look.last_column && col + 1 == columns));
            let forced = emphasised.then(Formatting::bold);
            cells.push(render_cell(ctx, &cell.blocks, forced.as_ref()));
            for _ in 1..cell.span.max(1) {
                cells.push(Vec::new());
            }
            col += cell.span.max(1) as usize;
        }
        rows.push(markdown::TableRow {
            header: r == 0,
            cells,
        });
    }

    let alignments = (0..columns)
        .map(|i| match table.columns.get(i).copied().unwrap_or_default() {
            ColumnAlignment::None => Alignment::None,
            ColumnAlignment::Left => Alignment::Left,
            ColumnAlignment::Center => Alignment::Center,
            ColumnAlignment::Right => Alignment::Right,
        })
        .collect();

    Ok(markdown::Block::Table(markdown::Table { alignments, rows }))
}

/// Flatten a cell's blocks into one inline sequence joined by `<br>`.
fn render_cell(
    ctx: &mut RenderContext<'_>,
    blocks: &[richtext::Block],
    forced: Option<&Formatting>,
) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    for block in blocks {
        let inlines = match block {
            richtext::Block::Paragraph(paragraph) => cell_paragraph(ctx, paragraph, forced),
            other => {
                ctx.log.warn(format!(
                    "{} inside a table cell cannot be represented in Markdown; skipped",
                    other.kind_name()
                ));
                continue;
            }
        };
        if inlines.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(Inline::Html("<br>".to_string()));
        }
        out.extend(inlines);
    }
    out
}

fn cell_paragraph(
    ctx: &mut RenderContext<'_>,
    paragraph: &Paragraph,
    forced: Option<&Formatting>,
) -> Vec<Inline> {
    let mut inlines = Vec::new();
    for segment in render_segments(ctx, paragraph, forced) {
        match segment {
            Segment::Inline(inline) => inlines.push(inline),
            Segment::Drawing(drawing) => match render_drawing(ctx, paragraph, drawing, None) {
                ImageOutput::Inline(image) => inlines.push(image),
                ImageOutput::Block(markdown::Block::TripleColon(directive)) => {
                    inlines.push(Inline::Image {
                        url: directive.attribute("source").unwrap_or_default().to_string(),
                        title: String::new(),
                        alt: directive.attribute("alt-text").unwrap_or_default().to_string(),
                    })
                }
                ImageOutput::Block(other) => ctx.log.warn(format!(
                    "{} inside a table cell cannot be represented in Markdown; skipped",
                    other.kind_name()
                )),
            },
        }
    }
    trim_inlines(inlines)
}
