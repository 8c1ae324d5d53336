//! Paragraph renderers, selected by style name

use super::context::{Cursor, Open, RenderContext};
use super::images::{render_drawing, ImageOutput};
use super::inlines::{render_inlines, render_segments, strip_admonition, trim_inlines, Segment};
use super::lists::{self, Membership};
use super::tables::render_table;
use super::ParagraphRenderer;
use crate::error::RenderError;
use crate::markdown::{Block, Inline};
use crate::metadata::{tokens, UnitMetadata};
use crate::richtext::{self, BreakKind, Formatting, Paragraph, RunContent};

pub struct HeadingRenderer {
    pub level: u8,
}

impl ParagraphRenderer for HeadingRenderer {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<Block>,
        cursor: Cursor,
        paragraph: &Paragraph,
        _next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        // Page breaks often inherit a heading style with nothing in them.
        if paragraph.is_blank() {
            ctx.log.debug(format!("empty heading paragraph {} skipped", paragraph.id.0));
            return Ok(cursor);
        }

        let plain = unstyled(paragraph);
        let mut content = Vec::new();
        let mut trailing = Vec::new();
        for segment in render_segments(ctx, &plain, None) {
            match segment {
                Segment::Inline(inline) => content.push(inline),
                Segment::Drawing(drawing) => match render_drawing(ctx, &plain, drawing, None) {
                    ImageOutput::Inline(image) => content.push(image),
                    ImageOutput::Block(block) => trailing.push(block),
                },
            }
        }

        if self.level == 1 {
            let ordinal = ctx.next_unit_ordinal();
            let metadata = ctx
                .doc
                .comments_for(paragraph.id)
                .find_map(|c| UnitMetadata::from_comment_text(&c.text));
            if let Some(metadata) = metadata {
                ctx.units.insert(ordinal, metadata);
            }
        }

        out.push(Block::Heading {
            level: self.level,
            content: trim_inlines(content),
        });
        out.extend(trailing);
        Ok(Cursor::closed())
    }
}

/// Tab headings carry their tab id and heading level in a comment.
pub struct TabGroupRenderer;

impl ParagraphRenderer for TabGroupRenderer {
    fn name(&self) -> &'static str {
        "tab-group"
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<Block>,
        _cursor: Cursor,
        paragraph: &Paragraph,
        _next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        let title = paragraph.text().trim().to_string();
        let mut id = None;
        let mut level = 4u8;
        for comment in ctx.doc.comments_for(paragraph.id) {
            for (key, value) in tokens::decode(&comment.text) {
                match key.as_str() {
                    "tab" => id = Some(value),
                    "level" => level = value.parse().unwrap_or(level),
                    _ => {}
                }
            }
        }
        let id = id.unwrap_or_else(|| {
            ctx.log.debug(format!("tab heading '{title}' has no tab comment; id derived from text"));
            slug(&title)
        });
        out.push(Block::Heading {
            level: level.clamp(1, 6),
            content: vec![Inline::Link {
                url: format!("#tab/{id}"),
                title: String::new(),
                children: vec![Inline::Text(title)],
            }],
        });
        Ok(Cursor::closed())
    }
}

/// Directive lines kept verbatim from a previous conversion.
pub struct DirectiveRenderer;

impl ParagraphRenderer for DirectiveRenderer {
    fn name(&self) -> &'static str {
        "directive"
    }

    fn render(
        &self,
        _ctx: &mut RenderContext<'_>,
        out: &mut Vec<Block>,
        _cursor: Cursor,
        paragraph: &Paragraph,
        _next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        out.push(Block::HtmlBlock {
            literal: format!("{}\n", paragraph.text().trim_end()),
        });
        Ok(Cursor::closed())
    }
}

pub struct CodeRenderer;

impl ParagraphRenderer for CodeRenderer {
    fn name(&self) -> &'static str {
        "code"
    }

    fn render(
        &self,
        _ctx: &mut RenderContext<'_>,
        out: &mut Vec<Block>,
        cursor: Cursor,
        paragraph: &Paragraph,
        _next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        let line = paragraph.text();
        match cursor.open {
            Open::Code { index } => {
                if let Some(Block::CodeBlock { literal, .. }) = out.get_mut(index) {
                    literal.push_str(&line);
                    literal.push('\n');
                    return Ok(cursor);
                }
            }
            Open::List { .. } if paragraph.indent_level > 0 => {
                lists::append_code(out, cursor, paragraph.indent_level - 1, &line)?;
                return Ok(cursor);
            }
            _ => {}
        }
        out.push(Block::CodeBlock {
            info: String::new(),
            literal: format!("{line}\n"),
            fenced: true,
        });
        Ok(Cursor::with(Open::Code {
            index: out.len() - 1,
        }))
    }
}

/// Supplies the language of the code block before it; otherwise suppressed.
pub struct CodeFooterRenderer;

impl ParagraphRenderer for CodeFooterRenderer {
    fn name(&self) -> &'static str {
        "code-footer"
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<Block>,
        cursor: Cursor,
        paragraph: &Paragraph,
        _next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        let language = paragraph.text().trim().to_string();
        match cursor.open {
            Open::Code { index } => {
                if let Some(Block::CodeBlock { info, .. }) = out.get_mut(index) {
                    *info = language;
                }
                Ok(Cursor::closed())
            }
            Open::List { .. } if lists::set_code_info(out, cursor, &language) => Ok(cursor),
            _ => {
                ctx.log.debug(format!(
                    "code footer '{language}' without a code block; suppressed"
                ));
                Ok(cursor)
            }
        }
    }
}

pub struct QuoteRenderer;

impl ParagraphRenderer for QuoteRenderer {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<Block>,
        cursor: Cursor,
        paragraph: &Paragraph,
        _next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        let plain = unstyled(paragraph);
        let inlines = trim_inlines(render_inlines(ctx, &plain, None));
        if inlines.is_empty() {
            return Ok(cursor);
        }

        let in_item = paragraph.indent_level > 0 && paragraph.numbering.is_none();
        if in_item && matches!(cursor.open, Open::List { .. }) {
            let depth = paragraph.indent_level - 1;
            match strip_admonition(&inlines) {
                Some((kind, rest)) => {
                    let rest = trim_inlines(rest);
                    lists::append_quote(out, cursor, depth, Some(kind), rest)?;
                }
                None => lists::append_quote(out, cursor, depth, None, inlines)?,
            }
            return Ok(cursor);
        }

        if let Some((kind, rest)) = strip_admonition(&inlines) {
            let rest = trim_inlines(rest);
            let children = if rest.is_empty() {
                Vec::new()
            } else {
                vec![Block::paragraph(rest)]
            };
            out.push(Block::QuoteSectionNote { kind, children });
            return Ok(Cursor::with(Open::Quote {
                index: out.len() - 1,
            }));
        }

        if let Open::Quote { index } = cursor.open {
            if let Some(
                Block::BlockQuote { children } | Block::QuoteSectionNote { children, .. },
            ) = out.get_mut(index)
            {
                children.push(Block::paragraph(inlines));
                return Ok(cursor);
            }
        }
        out.push(Block::BlockQuote {
            children: vec![Block::paragraph(inlines)],
        });
        Ok(Cursor::with(Open::Quote {
            index: out.len() - 1,
        }))
    }
}

pub struct ListParagraphRenderer;

impl ParagraphRenderer for ListParagraphRenderer {
    fn name(&self) -> &'static str {
        "list"
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<Block>,
        cursor: Cursor,
        paragraph: &Paragraph,
        next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        render_list_or_plain(ctx, out, cursor, paragraph, next)
    }
}

/// Any style without a dedicated renderer. List membership wins over plain text.
pub struct DefaultRenderer;

impl ParagraphRenderer for DefaultRenderer {
    fn name(&self) -> &'static str {
        "default"
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<Block>,
        cursor: Cursor,
        paragraph: &Paragraph,
        next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        render_list_or_plain(ctx, out, cursor, paragraph, next)
    }
}

fn render_list_or_plain(
    ctx: &mut RenderContext<'_>,
    out: &mut Vec<Block>,
    cursor: Cursor,
    paragraph: &Paragraph,
    next: Option<&richtext::Block>,
) -> Result<Cursor, RenderError> {
    match lists::membership(ctx, cursor, paragraph) {
        Membership::Item(info) => lists::render_item(ctx, out, cursor, paragraph, info),
        Membership::Continuation { depth } => {
            lists::render_continuation(ctx, out, cursor, paragraph, depth)
        }
        Membership::None => render_plain(ctx, out, paragraph, next),
    }
}

fn render_plain(
    ctx: &mut RenderContext<'_>,
    out: &mut Vec<Block>,
    paragraph: &Paragraph,
    next: Option<&richtext::Block>,
) -> Result<Cursor, RenderError> {
    if paragraph.is_blank() {
        if has_page_break(paragraph) {
            out.push(Block::ThematicBreak);
        } else {
            out.push(Block::paragraph(Vec::new()));
        }
        return Ok(Cursor::closed());
    }

    let caption = match next {
        Some(richtext::Block::Paragraph(candidate))
            if paragraph.has_drawing() && candidate.style_id() == "Caption" =>
        {
            ctx.consume(candidate.id);
            Some(candidate.text().trim().to_string())
        }
        _ => None,
    };

    out.extend(paragraph_blocks(ctx, paragraph, caption));
    for table in &paragraph.anchored_tables {
        out.push(render_table(ctx, table)?);
    }
    Ok(Cursor::closed())
}

/// A paragraph's inline content plus any images that need a block of their own.
///
/// Text on either side of a block image becomes its own paragraph.
pub fn paragraph_blocks(
    ctx: &mut RenderContext<'_>,
    paragraph: &Paragraph,
    caption: Option<String>,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut content: Vec<Inline> = Vec::new();
    let mut caption = caption;
    for segment in render_segments(ctx, paragraph, None) {
        match segment {
            Segment::Inline(inline) => content.push(inline),
            Segment::Drawing(drawing) => {
                match render_drawing(ctx, paragraph, drawing, caption.take()) {
                    ImageOutput::Inline(image) => content.push(image),
                    ImageOutput::Block(block) => {
                        flush(&mut blocks, &mut content);
                        blocks.push(block);
                    }
                }
            }
        }
    }
    flush(&mut blocks, &mut content);
    blocks
}

fn flush(blocks: &mut Vec<Block>, content: &mut Vec<Inline>) {
    let inlines = trim_inlines(std::mem::take(content));
    if !inlines.is_empty() {
        blocks.push(Block::paragraph(inlines));
    }
}

/// The paragraph without its style, so structural styles (bold headings,
/// italic quotes) do not leak into inline emphasis.
fn unstyled(paragraph: &Paragraph) -> Paragraph {
    Paragraph {
        style: None,
        formatting: Formatting::default(),
        ..paragraph.clone()
    }
}

fn has_page_break(paragraph: &Paragraph) -> bool {
    paragraph
        .runs()
        .flat_map(|run| run.content.iter())
        .any(|c| matches!(c, RunContent::Break(BreakKind::Page)))
}

fn slug(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::super::{convert, ToMarkdownOptions};
    use super::*;
    use crate::markdown::NoteKind;
    use crate::richtext::{NumberingRef, RichDocument, Run};

    fn add(doc: &mut RichDocument, style: &str, text: &str) -> richtext::ParagraphId {
        let mut p = doc.new_paragraph(style);
        p.push_text(text);
        doc.add_paragraph(p)
    }

    fn render(doc: &RichDocument) -> Vec<Block> {
        convert(doc, &ToMarkdownOptions::default()).document.blocks
    }

    #[test]
    fn whitespace_heading_is_suppressed() {
        let mut doc = RichDocument::new();
        add(&mut doc, "Heading1", "   ");
        assert!(render(&doc).is_empty());
    }

    #[test]
    fn heading_style_bold_does_not_become_emphasis() {
        let mut doc = RichDocument::new();
        add(&mut doc, "Heading2", "Setup");
        assert_eq!(
            render(&doc),
            vec![Block::Heading {
                level: 2,
                content: vec![Inline::text("Setup")],
            }]
        );
    }

    #[test]
    fn heading_one_comment_becomes_unit_metadata() {
        let mut doc = RichDocument::new();
        let id = add(&mut doc, "Heading1", "Lab");
        doc.add_comment(id, "docmark", "title:Lab sandbox:true labId:42");
        let output = convert(&doc, &ToMarkdownOptions::default());
        let unit = &output.units[&0];
        assert!(unit.sandbox);
        assert_eq!(unit.lab_id.as_deref(), Some("42"));
    }

    #[test]
    fn code_lines_merge_and_take_footer_language() {
        let mut doc = RichDocument::new();
        add(&mut doc, "Code", "a = 1");
        add(&mut doc, "Code", "b = 2");
        add(&mut doc, "Code", "print(a + b)");
        add(&mut doc, "CodeFooter", "python");
        assert_eq!(
            render(&doc),
            vec![Block::CodeBlock {
                info: "python".to_string(),
                literal: "a = 1\nb = 2\nprint(a + b)\n".to_string(),
                fenced: true,
            }]
        );
    }

    #[test]
    fn lone_code_footer_is_suppressed() {
        let mut doc = RichDocument::new();
        add(&mut doc, "CodeFooter", "python");
        assert!(render(&doc).is_empty());
    }

    #[test]
    fn note_keyword_becomes_admonition() {
        let mut doc = RichDocument::new();
        add(&mut doc, "Quote", "Note: remember this");
        assert_eq!(
            render(&doc),
            vec![Block::QuoteSectionNote {
                kind: NoteKind::Note,
                children: vec![Block::text_paragraph("remember this")],
            }]
        );
    }

    #[test]
    fn plain_quotes_merge() {
        let mut doc = RichDocument::new();
        add(&mut doc, "Quote", "first");
        add(&mut doc, "Quote", "second");
        let blocks = render(&doc);
        assert_eq!(blocks.len(), 1);
        let Block::BlockQuote { children } = &blocks[0] else {
            panic!("expected quote");
        };
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn numbered_items_share_one_list() {
        let mut doc = RichDocument::new();
        let num = doc.numbering.add_ordered(1);
        for text in ["one", "two"] {
            let mut p = doc.new_paragraph("ListParagraph");
            p.numbering = Some(NumberingRef { num_id: num, level: 0 });
            p.push_text(text);
            doc.add_paragraph(p);
        }
        let blocks = render(&doc);
        assert_eq!(blocks.len(), 1);
        let Block::List(list) = &blocks[0] else {
            panic!("expected list");
        };
        assert!(list.ordered);
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn unnumbered_indented_paragraph_continues_item() {
        let mut doc = RichDocument::new();
        let num = doc.numbering.add_bullet(None);
        let mut p = doc.new_paragraph("ListParagraph");
        p.numbering = Some(NumberingRef { num_id: num, level: 0 });
        p.push_text("item");
        doc.add_paragraph(p);
        let mut cont = doc.new_paragraph("Normal");
        cont.indent_level = 1;
        cont.push_text("more detail");
        doc.add_paragraph(cont);

        let blocks = render(&doc);
        let Block::List(list) = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(blocks.len(), 1);
        assert_eq!(list.items[0].children.len(), 2);
    }

    #[test]
    fn blank_paragraph_inside_item_is_kept() {
        let mut doc = RichDocument::new();
        let num = doc.numbering.add_bullet(None);
        let mut p = doc.new_paragraph("ListParagraph");
        p.numbering = Some(NumberingRef { num_id: num, level: 0 });
        p.push_text("item");
        doc.add_paragraph(p);
        add(&mut doc, "ListParagraph", "");
        let mut more = doc.new_paragraph("Normal");
        more.indent_level = 1;
        more.push_text("more");
        doc.add_paragraph(more);

        let blocks = render(&doc);
        assert_eq!(blocks.len(), 1);
        let Block::List(list) = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(
            list.items[0].children,
            vec![
                Block::text_paragraph("item"),
                Block::paragraph(Vec::new()),
                Block::text_paragraph("more"),
            ]
        );
    }

    #[test]
    fn indented_quote_stays_in_item() {
        let mut doc = RichDocument::new();
        let num = doc.numbering.add_bullet(None);
        let mut p = doc.new_paragraph("ListParagraph");
        p.numbering = Some(NumberingRef { num_id: num, level: 0 });
        p.push_text("item");
        doc.add_paragraph(p);
        for text in ["quoted", "Tip: indent it"] {
            let mut quote = doc.new_paragraph("Quote");
            quote.indent_level = 1;
            quote.push_text(text);
            doc.add_paragraph(quote);
        }

        let blocks = render(&doc);
        assert_eq!(blocks.len(), 1);
        let Block::List(list) = &blocks[0] else {
            panic!("expected list");
        };
        assert!(!list.tight);
        assert_eq!(
            list.items[0].children,
            vec![
                Block::text_paragraph("item"),
                Block::BlockQuote {
                    children: vec![Block::text_paragraph("quoted")],
                },
                Block::QuoteSectionNote {
                    kind: NoteKind::Tip,
                    children: vec![Block::text_paragraph("indent it")],
                },
            ]
        );
    }

    #[test]
    fn unindented_quote_after_list_stays_outside() {
        let mut doc = RichDocument::new();
        let num = doc.numbering.add_bullet(None);
        let mut p = doc.new_paragraph("ListParagraph");
        p.numbering = Some(NumberingRef { num_id: num, level: 0 });
        p.push_text("item");
        doc.add_paragraph(p);
        add(&mut doc, "Quote", "quoted");

        let blocks = render(&doc);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[1], Block::BlockQuote { .. }));
    }

    #[test]
    fn page_break_paragraph_is_thematic_break() {
        let mut doc = RichDocument::new();
        let mut p = doc.new_paragraph("Normal");
        p.push_run(Run::page_break());
        doc.add_paragraph(p);
        assert_eq!(render(&doc), vec![Block::ThematicBreak]);
    }

    #[test]
    fn blank_paragraph_is_kept() {
        let mut doc = RichDocument::new();
        add(&mut doc, "Normal", "  ");
        assert_eq!(render(&doc), vec![Block::paragraph(Vec::new())]);
    }

    #[test]
    fn tab_group_comment_restores_link() {
        let mut doc = RichDocument::new();
        let id = add(&mut doc, "TabGroup", "Linux");
        doc.add_comment(id, "docmark", "tab:linux level:3");
        let Block::Heading { level, content } = &render(&doc)[0] else {
            panic!("expected heading");
        };
        assert_eq!(*level, 3);
        assert!(matches!(&content[0], Inline::Link { url, .. } if url == "#tab/linux"));
    }

    #[test]
    fn slug_joins_words() {
        assert_eq!(slug("Windows 11 (x64)"), "windows-11-x64");
    }
}
