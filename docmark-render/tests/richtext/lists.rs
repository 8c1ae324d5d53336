use crate::common::{text_paragraph, to_md};
use docmark_render::diagnostics::Severity;
use docmark_render::markdown::{plain_text, Block};
use docmark_render::richtext::{
    LevelDefinition, NumId, NumberFormat, NumberingRef, RichDocument,
};
use docmark_render::to_markdown::{self, LetteredListPolicy};
use docmark_render::ToMarkdownOptions;

fn item(doc: &mut RichDocument, num_id: NumId, level: u8, text: &str) {
    let mut paragraph = text_paragraph(doc, "ListParagraph", text);
    paragraph.numbering = Some(NumberingRef { num_id, level });
    doc.add_paragraph(paragraph);
}

fn lettered_doc() -> RichDocument {
    let mut doc = RichDocument::new();
    let id = doc
        .numbering
        .add_definition(vec![LevelDefinition::ordered(NumberFormat::LowerLetter, 1)]);
    item(&mut doc, id, 0, "alpha");
    item(&mut doc, id, 0, "beta");
    doc
}

fn first_list(blocks: &[Block]) -> &docmark_render::markdown::List {
    blocks
        .iter()
        .find_map(|b| match b {
            Block::List(list) => Some(list),
            _ => None,
        })
        .expect("a list")
}

#[test]
fn nested_items_follow_their_level() {
    let mut doc = RichDocument::new();
    let id = doc.numbering.add_bullet(None);
    item(&mut doc, id, 0, "parent");
    item(&mut doc, id, 1, "child");
    item(&mut doc, id, 0, "sibling");

    let output = to_md(&doc);
    assert_eq!(output.document.blocks.len(), 1);
    let list = first_list(&output.document.blocks);
    assert_eq!(list.items.len(), 2);
    let nested = match &list.items[0].children[1] {
        Block::List(nested) => nested,
        other => panic!("expected a nested list, got {other:?}"),
    };
    assert_eq!(nested.items.len(), 1);
}

#[test]
fn continuation_paragraph_joins_the_last_item() {
    let mut doc = RichDocument::new();
    let id = doc.numbering.add_ordered(1);
    item(&mut doc, id, 0, "step one");
    let mut more = text_paragraph(&mut doc, "ListParagraph", "details");
    more.indent_level = 1;
    doc.add_paragraph(more);
    item(&mut doc, id, 0, "step two");

    let output = to_md(&doc);
    let list = first_list(&output.document.blocks);
    assert!(list.ordered);
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.items[0].children.len(), 2);
}

#[test]
fn unknown_numbering_renders_as_bullet() {
    let mut doc = RichDocument::new();
    item(&mut doc, NumId(42), 0, "orphan");

    let output = to_md(&doc);
    let list = first_list(&output.document.blocks);
    assert!(!list.ordered);
    assert!(output.log.contains(Severity::Warning, "unknown numbering 42"));
}

#[test]
fn lettered_lists_default_to_bullets() {
    let output = to_md(&lettered_doc());
    let list = first_list(&output.document.blocks);
    assert!(!list.ordered);
    assert_eq!(list.items.len(), 2);
    assert!(output.log.contains(Severity::Info, "lettered list"));
}

#[test]
fn lettered_lists_can_be_kept_ordered() {
    let options = ToMarkdownOptions {
        lettered_lists: LetteredListPolicy::Ordered,
        ..Default::default()
    };
    let output = to_markdown::convert(&lettered_doc(), &options);
    let list = first_list(&output.document.blocks);
    assert!(list.ordered);
    match &list.items[1].children[0] {
        Block::Paragraph { content } => assert_eq!(plain_text(content), "beta"),
        other => panic!("expected a paragraph, got {other:?}"),
    }
}

#[test]
fn separate_definitions_make_separate_lists() {
    let mut doc = RichDocument::new();
    let first = doc.numbering.add_bullet(None);
    let second = doc.numbering.add_bullet(None);
    item(&mut doc, first, 0, "a");
    item(&mut doc, second, 0, "b");

    let output = to_md(&doc);
    let lists = output
        .document
        .blocks
        .iter()
        .filter(|b| matches!(b, Block::List(_)))
        .count();
    assert_eq!(lists, 2);
}
