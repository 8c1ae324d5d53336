//! Splitting a document into units at level-one headings, and back

use crate::markdown::{plain_text, tab_link, Block, Inline, MarkdownDocument};
use crate::metadata::{Quiz, UnitMetadata};
use std::collections::BTreeMap;

/// Unit metadata keyed by the zero-based ordinal of the level-one heading.
pub type UnitMetadataMap = BTreeMap<usize, UnitMetadata>;

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Heading content, `None` for an introduction before the first heading.
    pub heading: Option<Vec<Inline>>,
    pub metadata: UnitMetadata,
    pub blocks: Vec<Block>,
}

impl Unit {
    pub fn title(&self) -> String {
        self.heading.as_deref().map(plain_text).unwrap_or_default()
    }
}

/// Segment `doc` at each level-one heading.
///
/// Content before the first heading becomes an untitled unit when non-empty.
/// A heading that is only a tab link stays in the current unit and takes no
/// ordinal.
/// Units flagged as quizzes get their questions read from the body.
pub fn split_units(doc: &MarkdownDocument, metadata: &UnitMetadataMap) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut current = Unit {
        heading: None,
        metadata: UnitMetadata::default(),
        blocks: Vec::new(),
    };
    let mut ordinal = 0usize;

    for block in &doc.blocks {
        if let Block::Heading { level: 1, content } = block {
            if tab_link(content).is_some() {
                current.blocks.push(block.clone());
                continue;
            }
            if current.heading.is_some() || !current.blocks.is_empty() {
                units.push(finish(current));
            }
            let title = plain_text(content);
            let mut unit_metadata = metadata
                .get(&ordinal)
                .cloned()
                .unwrap_or_else(|| UnitMetadata::titled(&title));
            if unit_metadata.title.is_empty() {
                unit_metadata.title = title;
            }
            current = Unit {
                heading: Some(content.clone()),
                metadata: unit_metadata,
                blocks: Vec::new(),
            };
            ordinal += 1;
        } else {
            current.blocks.push(block.clone());
        }
    }
    if current.heading.is_some() || !current.blocks.is_empty() {
        units.push(finish(current));
    }
    units
}

fn finish(mut unit: Unit) -> Unit {
    if unit.metadata.quiz.is_some() {
        unit.metadata.quiz = Some(Quiz::from_blocks(&unit.blocks));
    }
    unit
}

/// Recombine units into one document plus the metadata for each heading.
///
/// A unit with a quiz but no body gets its questions written out as blocks.
pub fn join_units(units: &[Unit]) -> (MarkdownDocument, UnitMetadataMap) {
    let mut blocks = Vec::new();
    let mut metadata = UnitMetadataMap::new();
    let mut ordinal = 0usize;
    for unit in units {
        if let Some(heading) = &unit.heading {
            blocks.push(Block::Heading {
                level: 1,
                content: heading.clone(),
            });
            metadata.insert(ordinal, unit.metadata.clone());
            ordinal += 1;
        }
        match &unit.metadata.quiz {
            Some(quiz) if unit.blocks.is_empty() => blocks.extend(quiz.to_blocks()),
            _ => blocks.extend(unit.blocks.iter().cloned()),
        }
    }
    (
        MarkdownDocument {
            front_matter: None,
            blocks,
        },
        metadata,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse_markdown;

    #[test]
    fn splits_at_level_one_headings() {
        let doc = parse_markdown("Intro text\n\n# One\n\nBody\n\n## Sub\n\n# Two\n").unwrap();
        let units = split_units(&doc, &UnitMetadataMap::new());
        assert_eq!(units.len(), 3);
        assert!(units[0].heading.is_none());
        assert_eq!(units[1].title(), "One");
        assert_eq!(units[1].blocks.len(), 2);
        assert_eq!(units[2].metadata.title, "Two");
    }

    #[test]
    fn no_intro_unit_when_document_starts_with_heading() {
        let doc = parse_markdown("# Only\n").unwrap();
        let units = split_units(&doc, &UnitMetadataMap::new());
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn quiz_units_read_their_questions() {
        let doc = parse_markdown("# Check\n\n1. Pick one\n\n   - [x] Yes\n   - [ ] No\n").unwrap();
        let mut metadata = UnitMetadataMap::new();
        metadata.insert(
            0,
            UnitMetadata {
                title: "Check".to_string(),
                quiz: Some(Quiz::default()),
                ..Default::default()
            },
        );
        let units = split_units(&doc, &metadata);
        let quiz = units[0].metadata.quiz.as_ref().unwrap();
        assert_eq!(quiz.questions[0].choices.len(), 2);
        assert!(quiz.questions[0].choices[0].correct);
    }

    #[test]
    fn tab_heading_stays_in_its_unit() {
        let doc = parse_markdown("# One\n\n# [Linux](#tab/linux)\n\nls\n\n# Two\n").unwrap();
        let mut metadata = UnitMetadataMap::new();
        metadata.insert(1, UnitMetadata {
            title: "Two".to_string(),
            sandbox: true,
            ..Default::default()
        });
        let units = split_units(&doc, &metadata);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].blocks.len(), 2);
        assert!(units[1].metadata.sandbox);

        let (joined, joined_metadata) = join_units(&units);
        assert_eq!(joined.blocks, doc.blocks);
        assert_eq!(joined_metadata.len(), 2);
    }

    #[test]
    fn join_inverts_split() {
        let doc = parse_markdown("Lead\n\n# A\n\nx\n\n# B\n\ny\n").unwrap();
        let mut metadata = UnitMetadataMap::new();
        metadata.insert(1, UnitMetadata {
            title: "B".to_string(),
            sandbox: true,
            ..Default::default()
        });
        let units = split_units(&doc, &metadata);
        let (joined, joined_metadata) = join_units(&units);
        assert_eq!(joined.blocks, doc.blocks);
        assert!(joined_metadata[&1].sandbox);
        assert!(!joined_metadata[&0].sandbox);
    }
}
