//! Shared helpers for the integration tests

use docmark_render::markdown::parse_markdown;
use docmark_render::resolve::NoopResolver;
use docmark_render::richtext::{self, Paragraph, RichDocument};
use docmark_render::{
    serialize_markdown, to_markdown, to_richtext, MarkdownOutput, RichTextOutput,
    ToMarkdownOptions, ToRichTextOptions,
};
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture to exist")
}

pub fn to_rich(md: &str) -> RichTextOutput {
    let doc = parse_markdown(md).expect("markdown to parse");
    to_richtext::convert(&doc, &ToRichTextOptions::default(), &NoopResolver)
}

pub fn to_md(doc: &RichDocument) -> MarkdownOutput {
    to_markdown::convert(doc, &ToMarkdownOptions::default())
}

/// Markdown -> rich -> Markdown text.
pub fn round_trip(md: &str) -> String {
    let rich = to_rich(md);
    let back = to_md(&rich.document);
    serialize_markdown(&back.document).expect("markdown to serialize")
}

pub fn paragraphs(doc: &RichDocument) -> Vec<&Paragraph> {
    doc.blocks
        .iter()
        .filter_map(richtext::Block::as_paragraph)
        .collect()
}

/// A paragraph with one text run.
pub fn text_paragraph(doc: &mut RichDocument, style: &str, text: &str) -> Paragraph {
    let mut paragraph = doc.new_paragraph(style);
    paragraph.push_text(text);
    paragraph
}

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
