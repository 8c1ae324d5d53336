//! Conversion state shared by the rich-text to Markdown renderers

use super::{ExtractedMedia, ToMarkdownOptions};
use crate::classify::FormattingClassifier;
use crate::diagnostics::ConversionLog;
use crate::richtext::{NumId, ParagraphId, RichDocument};
use crate::units::UnitMetadataMap;
use std::collections::HashSet;

/// What the last emitted block can still absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Open {
    #[default]
    Nothing,
    /// A code block at this index accepts more lines.
    Code { index: usize },
    /// A quote at this index accepts more paragraphs.
    Quote { index: usize },
    /// A list at this index accepts items sharing `identity`.
    List { index: usize, identity: NumId },
}

/// Insertion state threaded through the renderers. Each renderer receives
/// the cursor left by the previous sibling and returns the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub open: Open,
}

impl Cursor {
    pub fn closed() -> Self {
        Cursor::default()
    }

    pub fn with(open: Open) -> Self {
        Cursor { open }
    }
}

pub struct RenderContext<'d> {
    pub doc: &'d RichDocument,
    pub options: &'d ToMarkdownOptions,
    pub classifier: FormattingClassifier,
    pub log: ConversionLog,
    pub media: Vec<ExtractedMedia>,
    pub units: UnitMetadataMap,
    used_media_names: HashSet<String>,
    consumed: HashSet<ParagraphId>,
    headings_seen: usize,
}

impl<'d> RenderContext<'d> {
    pub fn new(doc: &'d RichDocument, options: &'d ToMarkdownOptions) -> Self {
        RenderContext {
            doc,
            options,
            classifier: FormattingClassifier::new(options.monospace_fonts.clone()),
            log: ConversionLog::new(),
            media: Vec::new(),
            units: UnitMetadataMap::new(),
            used_media_names: HashSet::new(),
            consumed: HashSet::new(),
            headings_seen: 0,
        }
    }

    /// Mark a sibling paragraph as already rendered (captions, for instance).
    pub fn consume(&mut self, id: ParagraphId) {
        self.consumed.insert(id);
    }

    pub fn is_consumed(&self, id: ParagraphId) -> bool {
        self.consumed.contains(&id)
    }

    /// Ordinal for the next level-one heading.
    pub fn next_unit_ordinal(&mut self) -> usize {
        let ordinal = self.headings_seen;
        self.headings_seen += 1;
        ordinal
    }

    /// Reserve a media file name, suffixing `-1`, `-2`, ... on collisions.
    pub fn reserve_media_name(&mut self, wanted: &str) -> String {
        if self.used_media_names.insert(wanted.to_string()) {
            return wanted.to_string();
        }
        let (stem, ext) = match wanted.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (wanted, String::new()),
        };
        let mut n = 1;
        loop {
            let candidate = format!("{stem}-{n}{ext}");
            if self.used_media_names.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
