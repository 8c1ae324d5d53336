use crate::common::{fixture, to_md};
use docmark_render::markdown::parse_markdown;
use docmark_render::metadata::{ModuleMetadata, UnitMetadata};
use docmark_render::resolve::NoopResolver;
use docmark_render::units::{split_units, UnitMetadataMap};
use docmark_render::{serialize_markdown, to_richtext, ToRichTextOptions};

fn exercise_metadata() -> UnitMetadataMap {
    let mut map = UnitMetadataMap::new();
    map.insert(
        1,
        UnitMetadata {
            sandbox: true,
            lab_id: Some("lab-42".to_string()),
            ..UnitMetadata::titled("Exercise")
        },
    );
    map
}

#[test]
fn module_splits_into_intro_and_headed_units() {
    let md = parse_markdown(&fixture("module.md")).unwrap();
    let units = split_units(&md, &exercise_metadata());
    let titles: Vec<String> = units.iter().map(|u| u.title()).collect();
    assert_eq!(titles, vec!["", "Introduction", "Exercise", "Knowledge check"]);
    assert!(units[2].metadata.sandbox);
    assert!(!units[1].metadata.sandbox);
}

#[test]
fn unit_and_module_metadata_survive_the_round_trip() {
    let md = parse_markdown(&fixture("module.md")).unwrap();
    let units = split_units(&md, &exercise_metadata());
    let module = ModuleMetadata {
        title: Some("Getting to know docmark".to_string()),
        uid: Some("learn.docmark.intro".to_string()),
        ..Default::default()
    };

    let rich = to_richtext::convert_units(
        &units,
        &module,
        &ToRichTextOptions::default(),
        &NoopResolver,
    );
    assert!(!rich.document.comments.is_empty());

    let back = to_md(&rich.document);
    assert_eq!(back.module.title.as_deref(), Some("Getting to know docmark"));
    assert_eq!(back.module.uid.as_deref(), Some("learn.docmark.intro"));
    let exercise = &back.units[&1];
    assert!(exercise.sandbox);
    assert_eq!(exercise.lab_id.as_deref(), Some("lab-42"));
    assert_eq!(exercise.title, "Exercise");

    let text = serialize_markdown(&back.document).unwrap();
    assert!(text.starts_with("Welcome to the module."));
    assert!(text.contains("# Knowledge check"));
    assert!(text.contains("1. Open the sandbox."));
}

#[test]
fn tab_heading_does_not_shift_unit_metadata() {
    let md = parse_markdown("# Intro\n\nx\n\n# [Linux](#tab/linux)\n\nls\n\n# Lab\n\ny\n").unwrap();
    let mut metadata = UnitMetadataMap::new();
    metadata.insert(
        1,
        UnitMetadata {
            sandbox: true,
            ..UnitMetadata::titled("Lab")
        },
    );
    let units = split_units(&md, &metadata);
    assert_eq!(units.len(), 2);

    let rich = to_richtext::convert_units(
        &units,
        &ModuleMetadata::default(),
        &ToRichTextOptions::default(),
        &NoopResolver,
    );
    let back = to_md(&rich.document);
    let lab = &back.units[&1];
    assert_eq!(lab.title, "Lab");
    assert!(lab.sandbox);
    assert!(back.units.get(&2).is_none());

    let text = serialize_markdown(&back.document).unwrap();
    assert!(text.contains("# [Linux](#tab/linux)"), "{text}");
}
