//! Rich text to Markdown
//!
//! Top-level blocks are dispatched through a [`NodeRegistry`]: paragraphs go
//! to a second, style-keyed registry, tables to the table renderer. Every
//! renderer receives the [`Cursor`] left by its previous sibling and returns
//! the next one, which is how code lines, quotes and list items merge into
//! the block before them.
//!
//! A renderer error is contained to its node. The failure is logged, the
//! cursor is reset and traversal carries on with the next sibling.

mod context;
mod images;
mod inlines;
mod lists;
mod paragraphs;
mod tables;

pub use context::{Cursor, Open, RenderContext};
pub use inlines::{TASK_CHECKED, TASK_UNCHECKED};

use crate::classify::MonospaceFonts;
use crate::diagnostics::ConversionLog;
use crate::error::{ConvertError, RenderError};
use crate::markdown::{self, serialize_markdown, MarkdownDocument};
use crate::metadata::ModuleMetadata;
use crate::registry::{Claims, NodeRegistry, StyleRegistry};
use crate::richtext::{self, Paragraph, RichDocument};
use crate::units::UnitMetadataMap;
use paragraphs::{
    CodeFooterRenderer, CodeRenderer, DefaultRenderer, DirectiveRenderer, HeadingRenderer,
    ListParagraphRenderer, QuoteRenderer, TabGroupRenderer,
};
use std::path::PathBuf;

/// Property holding the original front matter of a converted Markdown file.
pub const FRONT_MATTER_PROPERTY: &str = "markdown.front_matter";

/// What to do with lettered (`a.`, `b.`) lists, which Markdown cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetteredListPolicy {
    #[default]
    Bullet,
    Ordered,
}

/// How small-caps runs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmallCapsPolicy {
    /// Wrap in `<kbd>` tags.
    #[default]
    Kbd,
    Plain,
}

#[derive(Debug, Clone)]
pub struct ToMarkdownOptions {
    /// Folder for extracted media. Relative folders are relative to the
    /// Markdown file.
    pub media_folder: String,
    /// Directory of the Markdown file, used to relativise an absolute
    /// `media_folder`.
    pub output_dir: Option<PathBuf>,
    pub monospace_fonts: MonospaceFonts,
    pub lettered_lists: LetteredListPolicy,
    pub small_caps: SmallCapsPolicy,
}

impl Default for ToMarkdownOptions {
    fn default() -> Self {
        ToMarkdownOptions {
            media_folder: "media".to_string(),
            output_dir: None,
            monospace_fonts: MonospaceFonts::default(),
            lettered_lists: LetteredListPolicy::default(),
            small_caps: SmallCapsPolicy::default(),
        }
    }
}

/// A binary to write next to the Markdown output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMedia {
    /// Target path, relative to the Markdown file unless the media folder is absolute.
    pub path: PathBuf,
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct MarkdownOutput {
    pub document: MarkdownDocument,
    pub media: Vec<ExtractedMedia>,
    pub units: UnitMetadataMap,
    pub module: ModuleMetadata,
    pub log: ConversionLog,
}

/// Renders one top-level rich block.
pub trait BlockRenderer: Claims<richtext::Block> {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<markdown::Block>,
        cursor: Cursor,
        node: &richtext::Block,
        next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError>;
}

/// Renders a paragraph selected by style name.
pub trait ParagraphRenderer {
    fn name(&self) -> &'static str;

    fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<markdown::Block>,
        cursor: Cursor,
        paragraph: &Paragraph,
        next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError>;
}

/// The renderer set for one conversion.
pub struct Renderers {
    blocks: NodeRegistry<Box<dyn BlockRenderer>>,
    paragraphs: StyleRegistry<Box<dyn ParagraphRenderer>>,
}

impl Renderers {
    pub fn standard() -> Self {
        let mut blocks: NodeRegistry<Box<dyn BlockRenderer>> = NodeRegistry::new();
        blocks.register(Box::new(ParagraphBlock));
        blocks.register(Box::new(TableBlock));

        let mut paragraphs: StyleRegistry<Box<dyn ParagraphRenderer>> =
            StyleRegistry::new(Box::new(DefaultRenderer));
        for level in 1..=5u8 {
            paragraphs.register_exact(&format!("Heading{level}"), Box::new(HeadingRenderer { level }));
        }
        paragraphs.register_exact("ListParagraph", Box::new(ListParagraphRenderer));
        paragraphs.register_exact("CodeFooter", Box::new(CodeFooterRenderer));
        paragraphs.register_exact("TabGroup", Box::new(TabGroupRenderer));
        paragraphs.register_exact("Directive", Box::new(DirectiveRenderer));
        paragraphs
            .register_pattern("(?i)code$", Box::new(CodeRenderer))
            .expect("built-in code style pattern compiles");
        paragraphs
            .register_pattern("(?i)quote$", Box::new(QuoteRenderer))
            .expect("built-in quote style pattern compiles");

        Renderers { blocks, paragraphs }
    }

    /// Add a node renderer after the built-in ones. It sees only nodes
    /// nothing earlier claims.
    pub fn register_block(&mut self, renderer: Box<dyn BlockRenderer>) {
        self.blocks.register(renderer);
    }

    /// Route paragraphs of exactly `style` to `renderer`.
    pub fn register_style(&mut self, style: &str, renderer: Box<dyn ParagraphRenderer>) {
        self.paragraphs.register_exact(style, renderer);
    }

    /// Node renderers in lookup order, then the paragraph style table.
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .blocks
            .names::<richtext::Block>()
            .into_iter()
            .map(|n| format!("node: {n}"))
            .collect();
        lines.extend(self.paragraphs.describe().into_iter().map(|s| format!("style: {s}")));
        lines
    }

    /// Render a block sequence, containing failures to the node that caused them.
    pub fn render_blocks(
        &self,
        ctx: &mut RenderContext<'_>,
        blocks: &[richtext::Block],
    ) -> Vec<markdown::Block> {
        let mut out = Vec::new();
        let mut cursor = Cursor::closed();
        for (index, node) in blocks.iter().enumerate() {
            let Some(renderer) = self.blocks.find(node) else {
                ctx.log.warn(format!(
                    "no renderer for node type '{}'; skipped",
                    node.kind_name()
                ));
                cursor = Cursor::closed();
                continue;
            };
            match renderer.render(self, ctx, &mut out, cursor, node, blocks.get(index + 1)) {
                Ok(next) => cursor = next,
                Err(err) => {
                    ctx.log.error(format!(
                        "{} renderer failed on {}: {err}",
                        Claims::<richtext::Block>::name(&**renderer),
                        node.kind_name()
                    ));
                    cursor = Cursor::closed();
                }
            }
        }
        out
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Renderers::standard()
    }
}

struct ParagraphBlock;

impl Claims<richtext::Block> for ParagraphBlock {
    fn can_render(&self, node: &richtext::Block) -> bool {
        matches!(node, richtext::Block::Paragraph(_))
    }

    fn name(&self) -> &'static str {
        "paragraph"
    }
}

impl BlockRenderer for ParagraphBlock {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<markdown::Block>,
        cursor: Cursor,
        node: &richtext::Block,
        next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        let richtext::Block::Paragraph(paragraph) = node else {
            return Err(RenderError::Other(format!("expected a paragraph, got {}", node.kind_name())));
        };
        if ctx.is_consumed(paragraph.id) {
            return Ok(cursor);
        }
        let found = renderers.paragraphs.find(paragraph.style_id());
        let renderer: &dyn ParagraphRenderer = match found {
            crate::registry::StyleMatch::Wildcard(_)
                if !paragraph.is_blank()
                    && paragraph.numbering.is_none()
                    && ctx.classifier.classify_paragraph(ctx.doc, paragraph).monospace =>
            {
                &CodeRenderer
            }
            found => &**found.renderer(),
        };
        log::trace!(
            "paragraph {} style '{}' -> {}",
            paragraph.id.0,
            paragraph.style_id(),
            renderer.name()
        );
        renderer.render(ctx, out, cursor, paragraph, next)
    }
}

struct TableBlock;

impl Claims<richtext::Block> for TableBlock {
    fn can_render(&self, node: &richtext::Block) -> bool {
        matches!(node, richtext::Block::Table(_))
    }

    fn name(&self) -> &'static str {
        "table"
    }
}

impl BlockRenderer for TableBlock {
    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut RenderContext<'_>,
        out: &mut Vec<markdown::Block>,
        _cursor: Cursor,
        node: &richtext::Block,
        _next: Option<&richtext::Block>,
    ) -> Result<Cursor, RenderError> {
        let richtext::Block::Table(table) = node else {
            return Err(RenderError::Other(format!("expected a table, got {}", node.kind_name())));
        };
        out.push(tables::render_table(ctx, table)?);
        Ok(Cursor::closed())
    }
}

/// Convert a rich document to a Markdown tree.
pub fn convert(doc: &RichDocument, options: &ToMarkdownOptions) -> MarkdownOutput {
    convert_with(&Renderers::standard(), doc, options)
}

/// Convert with a caller-supplied renderer set.
pub fn convert_with(
    renderers: &Renderers,
    doc: &RichDocument,
    options: &ToMarkdownOptions,
) -> MarkdownOutput {
    let mut ctx = RenderContext::new(doc, options);
    let blocks = renderers.render_blocks(&mut ctx, &doc.blocks);
    let document = MarkdownDocument {
        front_matter: doc.property(FRONT_MATTER_PROPERTY).map(str::to_string),
        blocks,
    };
    log::debug!(
        "converted {} rich blocks into {} markdown blocks ({} media)",
        doc.blocks.len(),
        document.blocks.len(),
        ctx.media.len()
    );
    MarkdownOutput {
        document,
        media: ctx.media,
        units: ctx.units,
        module: ModuleMetadata::from_properties(&doc.properties),
        log: ctx.log,
    }
}

/// Convert and serialize in one step, discarding media and metadata.
pub fn convert_to_string(
    doc: &RichDocument,
    options: &ToMarkdownOptions,
) -> Result<String, ConvertError> {
    serialize_markdown(&convert(doc, options).document)
}
