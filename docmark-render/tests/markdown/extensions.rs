use crate::common::{paragraphs, to_rich};
use docmark_render::diagnostics::Severity;
use docmark_render::markdown::{parse_markdown, Block, MarkdownDocument, TripleColon};
use docmark_render::resolve::{FileSystemResolver, NoopResolver, OfflineFetcher};
use docmark_render::richtext;
use docmark_render::to_richtext::{self, BuildContext, Cursor, ExtensionProcessor, Renderers};
use docmark_render::{RenderError, ToRichTextOptions};

#[test]
fn unresolvable_image_is_logged_and_conversion_continues() {
    let output = to_rich("Before.\n\n![diagram](nowhere/diagram.png)\n\nAfter.\n");
    assert!(output.log.contains(Severity::Warning, "nowhere/diagram.png"));
    let texts: Vec<String> = paragraphs(&output.document)
        .iter()
        .map(|p| p.text())
        .collect();
    assert_eq!(texts.first().map(String::as_str), Some("Before."));
    assert_eq!(texts.last().map(String::as_str), Some("After."));
    assert!(output.document.media.is_empty());
}

#[test]
fn include_is_expanded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("includes")).unwrap();
    std::fs::write(dir.path().join("includes/note.md"), "Shared **text**.\n").unwrap();

    let md = parse_markdown("[!INCLUDE [note](includes/note.md)]\n").unwrap();
    let resolver = FileSystemResolver::new(dir.path());
    let output = to_richtext::convert(&md, &ToRichTextOptions::default(), &resolver);
    let ps = paragraphs(&output.document);
    assert_eq!(ps.len(), 1);
    assert_eq!(ps[0].text(), "Shared text.");
}

#[test]
fn video_note_uses_configured_placeholder_size() {
    let md = parse_markdown("> [!VIDEO https://videos.test/intro]\n").unwrap();
    let options = ToRichTextOptions {
        video_width: 320,
        video_height: 180,
        ..Default::default()
    };
    let output = to_richtext::convert(&md, &options, &NoopResolver);
    let drawing = paragraphs(&output.document)
        .iter()
        .flat_map(|p| p.runs())
        .find_map(|r| r.drawing())
        .cloned()
        .unwrap();
    assert_eq!((drawing.width, drawing.height), (320, 180));
    assert_eq!(drawing.video_url.as_deref(), Some("https://videos.test/intro"));
}

struct Callout;

impl ExtensionProcessor for Callout {
    fn name(&self) -> &'static str {
        "callout"
    }

    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        directive: &TripleColon,
        _node: &Block,
    ) -> Result<Cursor, RenderError> {
        let text = directive
            .attribute("text")
            .ok_or_else(|| RenderError::Other("callout without text".to_string()))?;
        let mut paragraph = ctx.start_paragraph(&mut cursor, "IntenseQuote");
        paragraph.push_text(text);
        out.push(richtext::Block::Paragraph(paragraph));
        Ok(cursor)
    }
}

fn callout(attributes: Vec<(String, String)>) -> Block {
    Block::TripleColon(TripleColon {
        name: "callout".to_string(),
        attributes,
        children: Vec::new(),
        container: false,
    })
}

#[test]
fn registered_directive_processor_wins_over_passthrough() {
    let mut renderers = Renderers::standard();
    renderers.register_directive("callout", Box::new(Callout));
    let md = MarkdownDocument {
        front_matter: None,
        blocks: vec![
            callout(vec![("text".to_string(), "Heads up".to_string())]),
            callout(Vec::new()),
            Block::text_paragraph("after"),
        ],
    };
    let output = to_richtext::convert_with(
        &renderers,
        &md,
        &ToRichTextOptions::default(),
        &NoopResolver,
        &OfflineFetcher,
    );
    let ps = paragraphs(&output.document);
    assert_eq!(ps.len(), 2);
    assert_eq!(ps[0].style_id(), "IntenseQuote");
    assert_eq!(ps[0].text(), "Heads up");
    assert_eq!(ps[1].text(), "after");
    assert!(output.log.contains(Severity::Error, "callout without text"));
}
