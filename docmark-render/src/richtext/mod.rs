//! Rich-text document model
//!
//! The renderer reads and builds documents through this model only. Loading
//! and saving a binary container format is left to callers; the model itself
//! round-trips through serde.

pub mod document;
pub mod numbering;
pub mod styles;

pub use document::{
    Block, BreakKind, ColumnAlignment, Comment, Drawing, Hyperlink, ImageAttributes, Inline,
    MediaId, MediaPart, Paragraph, ParagraphId, RichDocument, Run, RunContent, Table, TableCell,
    TableDesign, TableLook, TableRow, DEFAULT_CODE_FONT,
};
pub use numbering::{
    LevelDefinition, ListFormat, ListInfo, NumId, NumberFormat, NumberingRef, NumberingRegistry,
    REMOVED_NUMBERING,
};
pub use styles::{Formatting, Style, StyleKind, StyleTable};
