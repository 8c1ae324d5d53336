use crate::common::{fixture, init_logging, paragraphs, to_rich};
use docmark_render::richtext::{self, ListFormat};
use docmark_render::to_markdown::FRONT_MATTER_PROPERTY;
use docmark_render::Severity;

#[test]
fn kitchensink_converts_without_errors() {
    init_logging();
    let output = to_rich(&fixture("kitchensink.md"));
    assert!(!output.log.contains(Severity::Error, ""));
    assert_eq!(
        output.document.property(FRONT_MATTER_PROPERTY),
        Some("title: Kitchen sink")
    );
    assert!(output
        .document
        .blocks
        .iter()
        .any(|b| matches!(b, richtext::Block::Table(_))));
}

#[test]
fn paragraph_styles_follow_block_kinds() {
    let output = to_rich(&fixture("kitchensink.md"));
    let styles: Vec<&str> = paragraphs(&output.document)
        .iter()
        .map(|p| p.style_id())
        .collect();
    for expected in [
        "Heading1",
        "Heading2",
        "ListParagraph",
        "Code",
        "CodeFooter",
        "IntenseQuote",
        "Quote",
        "Directive",
    ] {
        assert!(styles.contains(&expected), "missing {expected} in {styles:?}");
    }
}

#[test]
fn bullet_and_ordered_lists_get_separate_definitions() {
    let output = to_rich("- a\n- b\n\n1. one\n2. two\n");
    let doc = &output.document;
    let infos: Vec<_> = paragraphs(doc)
        .into_iter()
        .filter_map(|p| doc.list_info(p))
        .collect();
    assert_eq!(infos.len(), 4);
    assert_eq!(infos[0].format, ListFormat::Bullet);
    assert_eq!(infos[2].format, ListFormat::Numbered);
    assert_ne!(infos[0].identity, infos[2].identity);
}

#[test]
fn code_in_list_item_stays_indented() {
    let output = to_rich("- step\n\n  ```sh\n  make\n  ```\n");
    let ps = paragraphs(&output.document);
    let code = ps.iter().find(|p| p.style_id() == "Code").unwrap();
    assert_eq!(code.indent_level, 1);
    assert!(code.numbering.is_none());
}

#[test]
fn inline_formatting_becomes_run_formatting() {
    let output = to_rich("Plain **bold** and ~~gone~~ and `x`.\n");
    let paragraph = paragraphs(&output.document)[0];
    let runs: Vec<_> = paragraph.runs().collect();
    assert!(runs
        .iter()
        .any(|r| r.formatting.bold == Some(true) && r.text_content() == "bold"));
    assert!(runs
        .iter()
        .any(|r| r.formatting.strike == Some(true) && r.text_content() == "gone"));
    assert!(runs
        .iter()
        .any(|r| r.style.as_deref() == Some("InlineCode") && r.text_content() == "x"));
}
