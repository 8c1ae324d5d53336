use crate::common::{fixture, round_trip, to_md};
use docmark_render::markdown::{parse_markdown, plain_text, Block, Inline, List};
use docmark_render::resolve::NoopResolver;
use docmark_render::{to_richtext, MarkdownDocument, ToRichTextOptions};
use image::{Rgb, RgbImage};
use insta::assert_snapshot;
use proptest::prelude::*;

/// The shape of a document, ignoring wording and directive layout.
fn outline(doc: &MarkdownDocument) -> Vec<String> {
    let mut out = Vec::new();
    outline_blocks(&doc.blocks, 0, &mut out);
    out
}

fn outline_blocks(blocks: &[Block], depth: usize, out: &mut Vec<String>) {
    for block in blocks {
        match block {
            Block::Heading { level, content } => {
                out.push(format!("h{level} {}", plain_text(content).trim()));
            }
            Block::Paragraph { content } => outline_inlines(content, out),
            Block::List(list) => outline_list(list, depth, out),
            Block::CodeBlock { info, .. } => out.push(format!("code {info}")),
            Block::Table(table) => {
                out.push(format!("table {}x{}", table.rows.len(), table.column_count()));
            }
            Block::QuoteSectionNote { kind, children } => {
                out.push(format!("note {kind:?}"));
                outline_blocks(children, depth, out);
            }
            Block::BlockQuote { children } => outline_blocks(children, depth, out),
            Block::TripleColon(directive) => outline_blocks(&directive.children, depth, out),
            _ => {}
        }
    }
}

fn outline_list(list: &List, depth: usize, out: &mut Vec<String>) {
    out.push(format!("list depth={depth} ordered={} start={}", list.ordered, list.start));
    for item in &list.items {
        let text = match item.children.first() {
            Some(Block::Paragraph { content }) => plain_text(content).trim().to_string(),
            _ => String::new(),
        };
        out.push(format!("item depth={depth} task={:?} {text}", item.task()));
        outline_blocks(&item.children, depth + 1, out);
    }
}

fn outline_inlines(inlines: &[Inline], out: &mut Vec<String>) {
    for inline in inlines {
        if let Inline::Image { alt, .. } = inline {
            out.push(format!("image {alt}"));
        }
    }
}

#[test]
fn simple_document_is_stable() {
    assert_snapshot!(round_trip("# Title\n\nSome **bold** text.\n"), @r"
    # Title

    Some **bold** text.
    ");
}

#[test]
fn kitchensink_keeps_its_structure() {
    let md = round_trip(&fixture("kitchensink.md"));
    for expected in [
        "title: Kitchen sink",
        "# Getting started",
        "## Lists",
        "**bold**",
        "*italic*",
        "`code`",
        "[link](https://example.com)",
        "- first",
        "nested",
        "[x] done task",
        "1. one",
        "2. two",
        "```rust",
        "fn main() {}",
        "> [!NOTE]",
        "> Remember this.",
        "Between the quotes.",
        "> Plain quote.",
        "| Name | Value |",
        ":::zone pivot=\"linux\"",
        "Linux only.",
        ":::zone-end",
        "Final words.",
    ] {
        assert!(md.contains(expected), "missing {expected:?} in:\n{md}");
    }
    assert!(md.starts_with("---\n"));
}

#[test]
fn kitchensink_outline_survives_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("media")).unwrap();
    RgbImage::from_pixel(8, 4, Rgb([200, 40, 40]))
        .save(dir.path().join("media/chart.png"))
        .unwrap();

    let original = parse_markdown(&fixture("kitchensink.md")).unwrap();
    let options = ToRichTextOptions {
        base_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let rich = to_richtext::convert(&original, &options, &NoopResolver);
    let back = to_md(&rich.document);

    let expected = outline(&original);
    for entry in [
        "h1 Getting started",
        "list depth=1 ordered=false start=1",
        "item depth=1 task=None nested",
        "item depth=0 task=Some(true) done task",
        "list depth=0 ordered=true start=1",
        "code rust",
        "note Note",
        "table 2x2",
        "image Chart",
    ] {
        assert!(expected.iter().any(|e| e == entry), "missing {entry:?} in {expected:#?}");
    }
    assert_eq!(outline(&back.document), expected);
    assert_eq!(back.document.front_matter, original.front_matter);

    assert_eq!(back.media.len(), 1);
    assert!(back.media[0].file_name.ends_with(".png"));
    assert!(back.media[0].data.starts_with(b"\x89PNG"));
}

#[test]
fn quote_inside_list_item_stays_in_the_item() {
    let back = parse_markdown(&round_trip("- item\n\n  > quoted\n")).unwrap();
    assert_eq!(back.blocks.len(), 1, "{:#?}", back.blocks);
    let Block::List(list) = &back.blocks[0] else {
        panic!("expected list, got {:?}", back.blocks[0]);
    };
    assert_eq!(list.items.len(), 1);
    assert!(matches!(
        &list.items[0].children[..],
        [Block::Paragraph { .. }, Block::BlockQuote { children }] if plain_text_of(children) == "quoted"
    ));
}

fn plain_text_of(blocks: &[Block]) -> String {
    match blocks {
        [Block::Paragraph { content }] => plain_text(content),
        _ => String::new(),
    }
}

proptest! {
    #[test]
    fn plain_paragraphs_survive(words in prop::collection::vec("[a-z]{1,8}( [a-z]{1,8}){0,6}", 1..5)) {
        let md = words.join("\n\n");
        let back = round_trip(&format!("{md}\n"));
        prop_assert_eq!(back.trim_end(), md.as_str());
    }
}
