use crate::common::{text_paragraph, to_md};
use docmark_render::diagnostics::Severity;
use docmark_render::markdown::{Block, NoteKind};
use docmark_render::richtext::{self, Paragraph, RichDocument};
use docmark_render::to_markdown::{self, Cursor, ParagraphRenderer, RenderContext, Renderers};
use docmark_render::{serialize_markdown, RenderError, ToMarkdownOptions};

fn add(doc: &mut RichDocument, style: &str, text: &str) {
    let paragraph = text_paragraph(doc, style, text);
    doc.add_paragraph(paragraph);
}

#[test]
fn unknown_blocks_are_skipped_and_siblings_kept() {
    let mut doc = RichDocument::new();
    add(&mut doc, "Heading1", "Title");
    doc.blocks.push(richtext::Block::Other {
        kind: "section-break".to_string(),
    });
    add(&mut doc, "Normal", "Body text.");

    let output = to_md(&doc);
    assert!(output.log.contains(Severity::Warning, "section-break"));
    let text = serialize_markdown(&output.document).unwrap();
    assert!(text.contains("# Title"));
    assert!(text.contains("Body text."));
}

#[test]
fn consecutive_code_paragraphs_merge_with_footer_language() {
    let mut doc = RichDocument::new();
    add(&mut doc, "Code", "fn main() {");
    add(&mut doc, "Code", "}");
    add(&mut doc, "CodeFooter", "rust");

    let output = to_md(&doc);
    assert_eq!(
        output.document.blocks,
        vec![Block::CodeBlock {
            info: "rust".to_string(),
            literal: "fn main() {\n}\n".to_string(),
            fenced: true,
        }]
    );
}

#[test]
fn labelled_quote_becomes_a_note() {
    let mut doc = RichDocument::new();
    add(&mut doc, "IntenseQuote", "Warning: Hot surface.");
    add(&mut doc, "IntenseQuote", "Let it cool.");

    let output = to_md(&doc);
    match &output.document.blocks[..] {
        [Block::QuoteSectionNote { kind, children }] => {
            assert_eq!(*kind, NoteKind::Warning);
            assert_eq!(children.len(), 2);
        }
        other => panic!("expected one note, got {other:?}"),
    }
}

struct Caption;

impl ParagraphRenderer for Caption {
    fn name(&self) -> &'static str {
        "caption"
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
            literal: format!("<figcaption>{}</figcaption>", paragraph.text()),
        });
        Ok(Cursor::closed())
    }
}

struct Broken;

impl ParagraphRenderer for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn render(
        &self,
        _ctx: &mut RenderContext<'_>,
        _out: &mut Vec<Block>,
        _cursor: Cursor,
        _paragraph: &Paragraph,
        _next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        Err(RenderError::Other("boom".to_string()))
    }
}

#[test]
fn registered_style_renderers_take_over_their_style() {
    let mut renderers = Renderers::standard();
    renderers.register_style("Caption", Box::new(Caption));
    renderers.register_style("Fragile", Box::new(Broken));

    let mut doc = RichDocument::new();
    add(&mut doc, "Caption", "Figure 1");
    add(&mut doc, "Fragile", "lost");
    add(&mut doc, "Normal", "kept");

    let output = to_markdown::convert_with(&renderers, &doc, &ToMarkdownOptions::default());
    assert_eq!(
        output.document.blocks,
        vec![
            Block::HtmlBlock {
                literal: "<figcaption>Figure 1</figcaption>".to_string()
            },
            Block::text_paragraph("kept"),
        ]
    );
    assert!(output.log.contains(Severity::Error, "boom"));
    assert!(renderers
        .describe()
        .contains(&"style: Caption".to_string()));
}

#[test]
fn unrecognised_style_falls_back_to_plain_paragraph() {
    let mut doc = RichDocument::new();
    add(&mut doc, "BodyTextFancy", "Ordinary words.");
    let output = to_md(&doc);
    assert_eq!(
        output.document.blocks,
        vec![Block::text_paragraph("Ordinary words.")]
    );
    assert!(!output.log.contains(Severity::Warning, ""));
}
