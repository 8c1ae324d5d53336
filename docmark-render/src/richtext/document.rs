//! In-memory rich-text document: paragraphs, runs, tables, comments and media

use super::numbering::{ListInfo, NumberingRef, NumberingRegistry};
use super::styles::{Formatting, StyleTable};
use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CODE_FONT: &str = "Consolas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParagraphId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Content this model does not understand (content controls, section breaks, ...)
    Other { kind: String },
}

impl Block {
    pub fn kind_name(&self) -> &str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Table(_) => "table",
            Block::Other { kind } => kind,
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: ParagraphId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Formatting::is_empty")]
    pub formatting: Formatting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering: Option<NumberingRef>,
    /// Indentation in list levels, used by paragraphs continuing a list item.
    #[serde(default)]
    pub indent_level: u8,
    #[serde(default)]
    pub content: Vec<Inline>,
    /// Tables anchored to this paragraph (tables inside list items).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchored_tables: Vec<Table>,
}

impl Paragraph {
    pub fn style_id(&self) -> &str {
        self.style.as_deref().unwrap_or("Normal")
    }

    pub fn push_run(&mut self, run: Run) {
        self.content.push(Inline::Run(run));
    }

    pub fn push_text(&mut self, text: &str) {
        self.push_run(Run::text(text));
    }

    /// Every run, including those inside hyperlinks, in document order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().flat_map(|inline| match inline {
            Inline::Run(run) => std::slice::from_ref(run).iter(),
            Inline::Hyperlink(link) => link.runs.iter(),
        })
    }

    /// Concatenated run text. Breaks become newlines.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for run in self.runs() {
            run.append_text(&mut text);
        }
        text
    }

    pub fn has_drawing(&self) -> bool {
        self.runs().any(|r| r.drawing().is_some())
    }

    pub fn is_blank(&self) -> bool {
        !self.has_drawing() && self.text().trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inline {
    Run(Run),
    Hyperlink(Hyperlink),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperlink {
    pub url: String,
    #[serde(default)]
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Formatting::is_empty")]
    pub formatting: Formatting,
    #[serde(default)]
    pub content: Vec<RunContent>,
}

impl Run {
    pub fn text(text: &str) -> Self {
        Run {
            content: vec![RunContent::Text(text.to_string())],
            ..Default::default()
        }
    }

    pub fn line_break() -> Self {
        Run {
            content: vec![RunContent::Break(BreakKind::Line)],
            ..Default::default()
        }
    }

    pub fn page_break() -> Self {
        Run {
            content: vec![RunContent::Break(BreakKind::Page)],
            ..Default::default()
        }
    }

    pub fn drawing(&self) -> Option<&Drawing> {
        self.content.iter().find_map(|c| match c {
            RunContent::Drawing(d) => Some(d),
            _ => None,
        })
    }

    pub fn with_drawing(drawing: Drawing) -> Self {
        Run {
            content: vec![RunContent::Drawing(drawing)],
            ..Default::default()
        }
    }

    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.style = Some(style.to_string());
        self
    }

    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.append_text(&mut text);
        text
    }

    fn append_text(&self, out: &mut String) {
        for piece in &self.content {
            match piece {
                RunContent::Text(t) => out.push_str(t),
                RunContent::Break(BreakKind::Line) => out.push('\n'),
                _ => {}
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum RunContent {
    Text(String),
    Break(BreakKind),
    Drawing(Drawing),
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Line,
    Page,
}

/// Extended image metadata that a plain Markdown image cannot express.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttributes {
    #[serde(default)]
    pub decorative: bool,
    #[serde(default)]
    pub border: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightbox: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc_scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
}

impl ImageAttributes {
    pub fn is_plain(&self) -> bool {
        *self == ImageAttributes::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    /// Explicit name property; preferred file name on extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaId>,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub attributes: ImageAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDesign {
    #[default]
    Grid,
    Plain,
}

/// Which edges of a table carry emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableLook {
    pub header_row: bool,
    pub first_column: bool,
    pub last_row: bool,
    pub last_column: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default = "one")]
    pub span: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub design: TableDesign,
    #[serde(default)]
    pub look: TableLook,
    #[serde(default)]
    pub columns: Vec<ColumnAlignment>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(rows: usize, cols: usize) -> Self {
        Table {
            design: TableDesign::Grid,
            look: TableLook::default(),
            columns: vec![ColumnAlignment::None; cols],
            rows: (0..rows)
                .map(|_| TableRow {
                    cells: (0..cols)
                        .map(|_| TableCell {
                            blocks: Vec::new(),
                            span: 1,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.span.max(1) as usize).sum::<usize>())
            .max()
            .unwrap_or(0)
            .max(self.columns.len())
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut TableCell, RenderError> {
        self.rows
            .get_mut(row)
            .and_then(|r| r.cells.get_mut(col))
            .ok_or(RenderError::CellOutOfRange { row, col })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u32,
    pub paragraph: ParagraphId,
    pub author: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPart {
    pub id: MediaId,
    pub file_name: String,
    pub data: Vec<u8>,
}

/// A styled document: blocks plus the shared tables they reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichDocument {
    #[serde(default)]
    pub blocks: Vec<Block>,
    pub styles: StyleTable,
    #[serde(default)]
    pub numbering: NumberingRegistry,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub media: Vec<MediaPart>,
    #[serde(default)]
    next_paragraph: u32,
}

impl Default for RichDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RichDocument {
    pub fn new() -> Self {
        Self::with_code_font(DEFAULT_CODE_FONT)
    }

    pub fn with_code_font(code_font: &str) -> Self {
        RichDocument {
            blocks: Vec::new(),
            styles: StyleTable::built_in(code_font),
            numbering: NumberingRegistry::default(),
            comments: Vec::new(),
            properties: BTreeMap::new(),
            media: Vec::new(),
            next_paragraph: 1,
        }
    }

    /// Allocate a detached paragraph with a fresh id.
    pub fn new_paragraph(&mut self, style: &str) -> Paragraph {
        let id = ParagraphId(self.next_paragraph.max(1));
        self.next_paragraph = id.0 + 1;
        Paragraph {
            id,
            style: Some(style.to_string()),
            formatting: Formatting::default(),
            numbering: None,
            indent_level: 0,
            content: Vec::new(),
            anchored_tables: Vec::new(),
        }
    }

    /// Append a paragraph to the body and return its id.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) -> ParagraphId {
        let id = paragraph.id;
        self.blocks.push(Block::Paragraph(paragraph));
        id
    }

    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Find a paragraph anywhere in the body, including table cells.
    pub fn paragraph(&self, id: ParagraphId) -> Option<&Paragraph> {
        fn search(blocks: &[Block], id: ParagraphId) -> Option<&Paragraph> {
            for block in blocks {
                match block {
                    Block::Paragraph(p) if p.id == id => return Some(p),
                    Block::Paragraph(p) => {
                        for table in &p.anchored_tables {
                            if let Some(found) = search_table(table, id) {
                                return Some(found);
                            }
                        }
                    }
                    Block::Table(t) => {
                        if let Some(found) = search_table(t, id) {
                            return Some(found);
                        }
                    }
                    Block::Other { .. } => {}
                }
            }
            None
        }
        fn search_table(table: &Table, id: ParagraphId) -> Option<&Paragraph> {
            table
                .rows
                .iter()
                .flat_map(|r| r.cells.iter())
                .find_map(|c| search(&c.blocks, id))
        }
        search(&self.blocks, id)
    }

    pub fn add_comment(&mut self, paragraph: ParagraphId, author: &str, text: &str) -> u32 {
        let id = self.comments.len() as u32 + 1;
        self.comments.push(Comment {
            id,
            paragraph,
            author: author.to_string(),
            text: text.to_string(),
        });
        id
    }

    pub fn comments_for(&self, paragraph: ParagraphId) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(move |c| c.paragraph == paragraph)
    }

    pub fn set_property(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_string(), value.to_string());
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn add_media(&mut self, file_name: &str, data: Vec<u8>) -> MediaId {
        let id = MediaId(self.media.len() as u32 + 1);
        self.media.push(MediaPart {
            id,
            file_name: file_name.to_string(),
            data,
        });
        id
    }

    pub fn media(&self, id: MediaId) -> Option<&MediaPart> {
        self.media.iter().find(|m| m.id == id)
    }

    pub fn list_info(&self, paragraph: &Paragraph) -> Option<ListInfo> {
        self.numbering.list_info(paragraph.numbering?)
    }
}
