//! Conversion state for the Markdown to rich-text renderers

use super::ToRichTextOptions;
use crate::diagnostics::ConversionLog;
use crate::resolve::{ContentResolver, MediaFetcher};
use crate::richtext::{MediaId, NumId, NumberingRef, Paragraph, RichDocument};
use crate::units::UnitMetadataMap;

/// A list that just ended, so an immediately following list of the same
/// kind can keep its numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTrail {
    pub ordered: bool,
    /// Number the next item would carry if the list went on.
    pub next_number: u32,
    pub identity: NumId,
}

/// Insertion state threaded from sibling to sibling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Numbering for the next paragraph. Set for the first block of a list
    /// item and taken by whichever renderer opens that paragraph.
    pub item: Option<NumberingRef>,
    /// List depth of paragraphs created here.
    pub indent: u8,
    /// Style replacing `Normal` for new paragraphs, e.g. inside quotes.
    pub style: Option<&'static str>,
    pub previous_list: Option<ListTrail>,
}

impl Cursor {
    /// The state after a block that is not a list.
    pub fn after_block(self) -> Self {
        Cursor {
            previous_list: None,
            ..self
        }
    }

    /// A fresh scope for a container such as a table cell.
    pub fn nested() -> Self {
        Cursor::default()
    }
}

pub struct BuildContext<'r> {
    pub doc: RichDocument,
    pub options: &'r ToRichTextOptions,
    pub resolver: &'r dyn ContentResolver,
    pub fetcher: &'r dyn MediaFetcher,
    pub log: ConversionLog,
    /// Metadata to attach to level-one headings, by ordinal.
    pub units: UnitMetadataMap,
    pub include_depth: usize,
    headings_seen: usize,
    video_placeholder: Option<MediaId>,
}

impl<'r> BuildContext<'r> {
    pub fn new(
        options: &'r ToRichTextOptions,
        resolver: &'r dyn ContentResolver,
        fetcher: &'r dyn MediaFetcher,
    ) -> Self {
        BuildContext {
            doc: RichDocument::with_code_font(&options.code_font),
            options,
            resolver,
            fetcher,
            log: ConversionLog::new(),
            units: UnitMetadataMap::new(),
            include_depth: 0,
            headings_seen: 0,
            video_placeholder: None,
        }
    }

    /// Open a paragraph at the cursor, taking any pending list numbering.
    ///
    /// `Normal` is replaced by the cursor's style, and by `ListParagraph`
    /// inside list items.
    pub fn start_paragraph(&mut self, cursor: &mut Cursor, style: &str) -> Paragraph {
        let mut style = style;
        if style == "Normal" {
            if let Some(scoped) = cursor.style {
                style = scoped;
            } else if cursor.item.is_some() || cursor.indent > 0 {
                style = "ListParagraph";
            }
        }
        let mut paragraph = self.doc.new_paragraph(style);
        paragraph.numbering = cursor.item.take();
        paragraph.indent_level = cursor.indent;
        paragraph
    }

    pub fn next_unit_ordinal(&mut self) -> usize {
        let ordinal = self.headings_seen;
        self.headings_seen += 1;
        ordinal
    }

    pub fn video_placeholder(&self) -> Option<MediaId> {
        self.video_placeholder
    }

    pub fn set_video_placeholder(&mut self, id: MediaId) {
        self.video_placeholder = Some(id);
    }
}
