//! Headings, paragraphs, code, quotes and breaks

use super::context::{BuildContext, Cursor};
use super::images::video_drawing;
use super::inlines::render_into;
use super::{BlockRenderer, Renderers};
use crate::error::RenderError;
use crate::markdown::{tab_link, Block, NoteKind};
use crate::metadata::tokens;
use crate::richtext::{self, Run};

/// Author recorded on comments this converter writes.
pub const COMMENT_AUTHOR: &str = "docmark";

pub(super) fn unexpected(renderer: &str, node: &Block) -> RenderError {
    RenderError::Other(format!("{renderer} renderer given a {} node", node.kind_name()))
}

/// A `Directive` paragraph holding `text` verbatim, one line break per newline.
pub(super) fn push_directive(
    ctx: &mut BuildContext<'_>,
    out: &mut Vec<richtext::Block>,
    cursor: &mut Cursor,
    text: &str,
) {
    let mut paragraph = ctx.start_paragraph(cursor, "Directive");
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            paragraph.push_run(Run::line_break());
        }
        paragraph.push_text(line);
    }
    out.push(richtext::Block::Paragraph(paragraph));
}

pub struct HeadingRenderer;
claims!(HeadingRenderer, "heading", Block::Heading { .. });

impl BlockRenderer for HeadingRenderer {
    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::Heading { level, content } = node else {
            return Err(unexpected("heading", node));
        };

        if let Some((id, title)) = tab_link(content) {
            let mut paragraph = ctx.start_paragraph(&mut cursor, "TabGroup");
            paragraph.push_text(&title);
            let id_token = tokens::encode(&[("tab", id.as_str()), ("level", &level.to_string())]);
            let paragraph_id = paragraph.id;
            out.push(richtext::Block::Paragraph(paragraph));
            ctx.doc.add_comment(paragraph_id, COMMENT_AUTHOR, &id_token);
            return Ok(cursor.after_block());
        }

        let style = format!("Heading{}", (*level).clamp(1, 5));
        if *level > 5 {
            ctx.log.debug(format!("heading level {level} written as Heading5"));
        }
        let mut paragraph = ctx.start_paragraph(&mut cursor, &style);
        render_into(ctx, &mut paragraph, content);
        let paragraph_id = paragraph.id;
        out.push(richtext::Block::Paragraph(paragraph));

        if *level == 1 {
            let ordinal = ctx.next_unit_ordinal();
            if let Some(metadata) = ctx.units.get(&ordinal) {
                let text = metadata.to_comment_text();
                ctx.doc.add_comment(paragraph_id, COMMENT_AUTHOR, &text);
            }
        }
        Ok(cursor.after_block())
    }
}

pub struct ParagraphRenderer;
claims!(ParagraphRenderer, "paragraph", Block::Paragraph { .. });

impl BlockRenderer for ParagraphRenderer {
    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::Paragraph { content } = node else {
            return Err(unexpected("paragraph", node));
        };
        let mut paragraph = ctx.start_paragraph(&mut cursor, "Normal");
        render_into(ctx, &mut paragraph, content);
        out.push(richtext::Block::Paragraph(paragraph));
        Ok(cursor.after_block())
    }
}

/// One `Code` paragraph per line, then a `CodeFooter` with the language.
pub struct CodeRenderer;
claims!(CodeRenderer, "code", Block::CodeBlock { .. });

impl BlockRenderer for CodeRenderer {
    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::CodeBlock { info, literal, .. } = node else {
            return Err(unexpected("code", node));
        };
        open_item(ctx, out, &mut cursor);
        let body = literal.strip_suffix('\n').unwrap_or(literal);
        for line in body.split('\n') {
            let mut paragraph = ctx.start_paragraph(&mut cursor, "Code");
            let line = line.strip_suffix('\r').unwrap_or(line);
            if !line.is_empty() {
                paragraph.push_text(line);
            }
            out.push(richtext::Block::Paragraph(paragraph));
        }
        let language = info.split_whitespace().next().unwrap_or_default();
        if !language.is_empty() {
            let mut footer = ctx.start_paragraph(&mut cursor, "CodeFooter");
            footer.push_text(language);
            out.push(richtext::Block::Paragraph(footer));
        }
        Ok(cursor.after_block())
    }
}

/// Emit the numbered paragraph of a list item whose first child is not a
/// paragraph.
fn open_item(ctx: &mut BuildContext<'_>, out: &mut Vec<richtext::Block>, cursor: &mut Cursor) {
    if cursor.item.is_some() {
        let item = ctx.start_paragraph(cursor, "Normal");
        out.push(richtext::Block::Paragraph(item));
    }
}

pub struct QuoteRenderer;
claims!(QuoteRenderer, "block-quote", Block::BlockQuote { .. });

impl BlockRenderer for QuoteRenderer {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::BlockQuote { children } = node else {
            return Err(unexpected("block-quote", node));
        };
        open_item(ctx, out, &mut cursor);
        let inner = Cursor {
            style: Some("Quote"),
            ..cursor
        };
        let after = renderers.render_blocks(ctx, out, inner, children);
        Ok(Cursor {
            style: cursor.style,
            ..after
        }
        .after_block())
    }
}

/// Admonitions become `IntenseQuote` paragraphs led by the label; videos a
/// placeholder image linked to the video.
pub struct NoteRenderer;
claims!(NoteRenderer, "quote-section-note", Block::QuoteSectionNote { .. });

impl BlockRenderer for NoteRenderer {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::QuoteSectionNote { kind, children } = node else {
            return Err(unexpected("quote-section-note", node));
        };

        if let NoteKind::Video(url) = kind {
            let drawing = video_drawing(ctx, url)?;
            let mut paragraph = ctx.start_paragraph(&mut cursor, "Normal");
            paragraph.push_run(Run::with_drawing(drawing));
            out.push(richtext::Block::Paragraph(paragraph));
            let inner = Cursor {
                style: Some("Quote"),
                ..cursor
            };
            let after = renderers.render_blocks(ctx, out, inner, children);
            return Ok(Cursor {
                style: cursor.style,
                ..after
            }
            .after_block());
        }

        open_item(ctx, out, &mut cursor);
        let mut lead = ctx.start_paragraph(&mut cursor, "IntenseQuote");
        let rest = match children.split_first() {
            Some((Block::Paragraph { content }, rest)) => {
                lead.push_text(&format!("{}: ", kind.label()));
                render_into(ctx, &mut lead, content);
                rest
            }
            _ => {
                lead.push_text(&format!("{}:", kind.label()));
                children.as_slice()
            }
        };
        out.push(richtext::Block::Paragraph(lead));

        let inner = Cursor {
            style: Some("IntenseQuote"),
            ..cursor
        };
        let after = renderers.render_blocks(ctx, out, inner, rest);
        Ok(Cursor {
            style: cursor.style,
            ..after
        }
        .after_block())
    }
}

/// A page break.
pub struct ThematicBreakRenderer;
claims!(ThematicBreakRenderer, "thematic-break", Block::ThematicBreak);

impl BlockRenderer for ThematicBreakRenderer {
    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        _node: &Block,
    ) -> Result<Cursor, RenderError> {
        let mut paragraph = ctx.start_paragraph(&mut cursor, "Normal");
        paragraph.push_run(Run::page_break());
        out.push(richtext::Block::Paragraph(paragraph));
        Ok(cursor.after_block())
    }
}

/// Raw HTML kept verbatim so it renders back unchanged.
pub struct HtmlBlockRenderer;
claims!(HtmlBlockRenderer, "html-block", Block::HtmlBlock { .. });

impl BlockRenderer for HtmlBlockRenderer {
    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::HtmlBlock { literal } = node else {
            return Err(unexpected("html-block", node));
        };
        push_directive(ctx, out, &mut cursor, literal.trim_end());
        Ok(cursor.after_block())
    }
}
