//! Markdown tree
//!
//! A closed set of block and inline node kinds covering CommonMark, the GFM
//! pieces this system uses (tables, strikethrough, task markers) and the
//! documentation extensions: quote notes, triple-colon directives, row/column
//! grids, moniker ranges and includes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownDocument {
    /// Raw YAML between the `---` delimiters, without them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_matter: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    Paragraph {
        content: Vec<Inline>,
    },
    List(List),
    CodeBlock {
        info: String,
        literal: String,
        fenced: bool,
    },
    Table(Table),
    BlockQuote {
        children: Vec<Block>,
    },
    QuoteSectionNote {
        kind: NoteKind,
        children: Vec<Block>,
    },
    TripleColon(TripleColon),
    Row {
        columns: Vec<Column>,
    },
    MonikerRange {
        range: String,
        children: Vec<Block>,
    },
    Inclusion {
        title: String,
        path: String,
    },
    ThematicBreak,
    HtmlBlock {
        literal: String,
    },
    /// A node kind the renderers have no rule for.
    Other {
        kind: String,
    },
}

impl Block {
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph { content }
    }

    pub fn text_paragraph(text: &str) -> Self {
        Block::Paragraph {
            content: vec![Inline::Text(text.to_string())],
        }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::List(_) => "list",
            Block::CodeBlock { .. } => "code-block",
            Block::Table(_) => "table",
            Block::BlockQuote { .. } => "block-quote",
            Block::QuoteSectionNote { .. } => "quote-section-note",
            Block::TripleColon(_) => "triple-colon",
            Block::Row { .. } => "row",
            Block::MonikerRange { .. } => "moniker-range",
            Block::Inclusion { .. } => "inclusion",
            Block::ThematicBreak => "thematic-break",
            Block::HtmlBlock { .. } => "html-block",
            Block::Other { kind } => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub start: u32,
    pub tight: bool,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn bullet(items: Vec<ListItem>) -> Self {
        List {
            ordered: false,
            start: 1,
            tight: true,
            items,
        }
    }

    pub fn ordered(start: u32, items: Vec<ListItem>) -> Self {
        List {
            ordered: true,
            start,
            tight: true,
            items,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub children: Vec<Block>,
}

impl ListItem {
    pub fn new(children: Vec<Block>) -> Self {
        ListItem { children }
    }

    /// The task marker state if the item's first paragraph starts with one.
    pub fn task(&self) -> Option<bool> {
        match self.children.first() {
            Some(Block::Paragraph { content }) => match content.first() {
                Some(Inline::TaskMarker { checked }) => Some(*checked),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.len())
            .max()
            .unwrap_or(0)
            .max(self.alignments.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub header: bool,
    pub cells: Vec<Vec<Inline>>,
}

/// The callout kind carried by a `> [!KIND]` quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum NoteKind {
    Note,
    Tip,
    Important,
    Caution,
    Warning,
    Error,
    Video(String),
}

impl NoteKind {
    pub const ADMONITIONS: [NoteKind; 6] = [
        NoteKind::Note,
        NoteKind::Tip,
        NoteKind::Important,
        NoteKind::Caution,
        NoteKind::Warning,
        NoteKind::Error,
    ];

    /// Upper-case marker keyword (`NOTE`, `VIDEO`, ...).
    pub fn keyword(&self) -> &'static str {
        match self {
            NoteKind::Note => "NOTE",
            NoteKind::Tip => "TIP",
            NoteKind::Important => "IMPORTANT",
            NoteKind::Caution => "CAUTION",
            NoteKind::Warning => "WARNING",
            NoteKind::Error => "ERROR",
            NoteKind::Video(_) => "VIDEO",
        }
    }

    /// Title-case label used as leading text in rich documents (`Note`).
    pub fn label(&self) -> &'static str {
        match self {
            NoteKind::Note => "Note",
            NoteKind::Tip => "Tip",
            NoteKind::Important => "Important",
            NoteKind::Caution => "Caution",
            NoteKind::Warning => "Warning",
            NoteKind::Error => "Error",
            NoteKind::Video(_) => "Video",
        }
    }

    /// Case-insensitive lookup of an admonition keyword. Video is not an admonition.
    pub fn from_keyword(word: &str) -> Option<NoteKind> {
        NoteKind::ADMONITIONS
            .iter()
            .find(|k| k.keyword().eq_ignore_ascii_case(word))
            .cloned()
    }

    /// The marker line, e.g. `[!NOTE]` or `[!VIDEO https://...]`.
    pub fn marker(&self) -> String {
        match self {
            NoteKind::Video(url) => format!("[!VIDEO {url}]"),
            other => format!("[!{}]", other.keyword()),
        }
    }

    /// Parse a marker line produced by [`NoteKind::marker`].
    pub fn from_marker(text: &str) -> Option<NoteKind> {
        let inner = text.trim().strip_prefix("[!")?.strip_suffix(']')?;
        match inner.split_once(char::is_whitespace) {
            Some((word, url)) if word.eq_ignore_ascii_case("VIDEO") => {
                Some(NoteKind::Video(url.trim().to_string()))
            }
            Some(_) => None,
            None => NoteKind::from_keyword(inner),
        }
    }
}

/// A `:::name attr="value":::` directive, either a single line or a
/// container closed by `:::name-end:::`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleColon {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    #[serde(default)]
    pub children: Vec<Block>,
    pub container: bool,
}

impl TripleColon {
    pub fn leaf(name: &str, attributes: Vec<(String, String)>) -> Self {
        TripleColon {
            name: name.to_string(),
            attributes,
            children: Vec::new(),
            container: false,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub span: u32,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Inline {
    Text(String),
    /// `*`/`_` emphasis. A count of 1 is italic, 2 is strong, 3 is both.
    Emphasis {
        delimiter: char,
        count: u8,
        children: Vec<Inline>,
    },
    Strikethrough {
        children: Vec<Inline>,
    },
    LineBreak {
        hard: bool,
    },
    Link {
        url: String,
        title: String,
        children: Vec<Inline>,
    },
    AutoLink {
        url: String,
    },
    Image {
        url: String,
        title: String,
        alt: String,
    },
    Code(String),
    Html(String),
    TaskMarker {
        checked: bool,
    },
    Other {
        kind: String,
    },
}

impl Inline {
    pub fn text(text: &str) -> Self {
        Inline::Text(text.to_string())
    }

    pub fn strong(children: Vec<Inline>) -> Self {
        Inline::Emphasis {
            delimiter: '*',
            count: 2,
            children,
        }
    }

    pub fn emphasis(children: Vec<Inline>) -> Self {
        Inline::Emphasis {
            delimiter: '*',
            count: 1,
            children,
        }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Inline::Text(_) => "text",
            Inline::Emphasis { .. } => "emphasis",
            Inline::Strikethrough { .. } => "strikethrough",
            Inline::LineBreak { .. } => "line-break",
            Inline::Link { .. } => "link",
            Inline::AutoLink { .. } => "autolink",
            Inline::Image { .. } => "image",
            Inline::Code(_) => "code",
            Inline::Html(_) => "html",
            Inline::TaskMarker { .. } => "task-marker",
            Inline::Other { kind } => kind,
        }
    }
}

/// The tab id and title of a heading that is only `[Title](#tab/id)`.
///
/// Such headings mark tab groups, never units.
pub fn tab_link(content: &[Inline]) -> Option<(String, String)> {
    let mut meaningful = content
        .iter()
        .filter(|i| !matches!(i, Inline::Text(t) if t.trim().is_empty()));
    let Some(Inline::Link { url, children, .. }) = meaningful.next() else {
        return None;
    };
    if meaningful.next().is_some() {
        return None;
    }
    let id = url.strip_prefix("#tab/")?;
    Some((id.to_string(), plain_text(children)))
}

/// Plain text of an inline sequence. Soft breaks become spaces.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    collect_text(inlines, &mut out);
    out
}

fn collect_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Emphasis { children, .. }
            | Inline::Strikethrough { children }
            | Inline::Link { children, .. } => collect_text(children, out),
            Inline::LineBreak { hard: false } => out.push(' '),
            Inline::LineBreak { hard: true } => out.push('\n'),
            Inline::AutoLink { url } => out.push_str(url),
            Inline::Image { alt, .. } => out.push_str(alt),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_markers_round_trip() {
        for kind in NoteKind::ADMONITIONS {
            assert_eq!(NoteKind::from_marker(&kind.marker()), Some(kind.clone()));
        }
        let video = NoteKind::Video("https://example.com/v".to_string());
        assert_eq!(NoteKind::from_marker(&video.marker()), Some(video));
    }

    #[test]
    fn unknown_marker_is_rejected() {
        assert_eq!(NoteKind::from_marker("[!BANANA]"), None);
        assert_eq!(NoteKind::from_marker("[!NOTE extra]"), None);
        assert_eq!(NoteKind::from_keyword("warning"), Some(NoteKind::Warning));
    }

    #[test]
    fn plain_text_flattens_nesting() {
        let inlines = vec![
            Inline::text("a "),
            Inline::strong(vec![Inline::text("b")]),
            Inline::LineBreak { hard: false },
            Inline::Code("c".to_string()),
        ];
        assert_eq!(plain_text(&inlines), "a b c");
    }
}
