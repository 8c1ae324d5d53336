//! Markdown to rich text
//!
//! Blocks are dispatched through a first-match [`NodeRegistry`].
//! Triple-colon directives get a second lookup by directive name, falling
//! back to verbatim passthrough for names nobody handles. Renderers take the
//! [`Cursor`] left by the previous sibling and return the next one.

macro_rules! claims {
    ($renderer:ty, $name:literal, $pattern:pat) => {
        impl $crate::registry::Claims<$crate::markdown::Block> for $renderer {
            fn can_render(&self, node: &$crate::markdown::Block) -> bool {
                matches!(node, $pattern)
            }

            fn name(&self) -> &'static str {
                $name
            }
        }
    };
}

mod blocks;
mod context;
mod extensions;
mod images;
mod inlines;
mod lists;
mod tables;

pub use blocks::COMMENT_AUTHOR;
pub use context::{BuildContext, Cursor, ListTrail};
pub use images::fit_width;
pub use inlines::{TASK_CHECKED, TASK_UNCHECKED};

use crate::diagnostics::ConversionLog;
use crate::error::RenderError;
use crate::markdown::{self, MarkdownDocument, TripleColon};
use crate::metadata::ModuleMetadata;
use crate::registry::{Claims, NodeRegistry, StyleRegistry};
use crate::resolve::{default_fetcher, ContentResolver, MediaFetcher};
use crate::richtext::{self, RichDocument, DEFAULT_CODE_FONT};
use crate::to_markdown::FRONT_MATTER_PROPERTY;
use crate::units::{join_units, Unit, UnitMetadataMap};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ToRichTextOptions {
    /// Images wider than this many pixels are scaled down.
    pub max_image_width: u32,
    pub video_width: u32,
    pub video_height: u32,
    pub code_font: String,
    /// Fetch images referenced by absolute URL.
    pub allow_network: bool,
    /// Directory relative image paths are read from.
    pub base_dir: Option<PathBuf>,
}

impl Default for ToRichTextOptions {
    fn default() -> Self {
        ToRichTextOptions {
            max_image_width: 600,
            video_width: 640,
            video_height: 360,
            code_font: DEFAULT_CODE_FONT.to_string(),
            allow_network: false,
            base_dir: None,
        }
    }
}

#[derive(Debug)]
pub struct RichTextOutput {
    pub document: RichDocument,
    pub log: ConversionLog,
}

/// Renders one Markdown block.
pub trait BlockRenderer: Claims<markdown::Block> {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        cursor: Cursor,
        node: &markdown::Block,
    ) -> Result<Cursor, RenderError>;
}

/// Renders a triple-colon directive selected by name.
pub trait ExtensionProcessor {
    fn name(&self) -> &'static str;

    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        cursor: Cursor,
        directive: &TripleColon,
        node: &markdown::Block,
    ) -> Result<Cursor, RenderError>;
}

pub struct Renderers {
    blocks: NodeRegistry<Box<dyn BlockRenderer>>,
    extensions: StyleRegistry<Box<dyn ExtensionProcessor>>,
}

impl Renderers {
    pub fn standard() -> Self {
        let mut nodes: NodeRegistry<Box<dyn BlockRenderer>> = NodeRegistry::new();
        nodes.register(Box::new(blocks::HeadingRenderer));
        nodes.register(Box::new(blocks::ParagraphRenderer));
        nodes.register(Box::new(lists::ListRenderer));
        nodes.register(Box::new(blocks::CodeRenderer));
        nodes.register(Box::new(tables::TableRenderer));
        nodes.register(Box::new(blocks::QuoteRenderer));
        nodes.register(Box::new(blocks::NoteRenderer));
        nodes.register(Box::new(tables::RowRenderer));
        nodes.register(Box::new(extensions::TripleColonRenderer));
        nodes.register(Box::new(extensions::MonikerRenderer));
        nodes.register(Box::new(extensions::InclusionRenderer));
        nodes.register(Box::new(blocks::ThematicBreakRenderer));
        nodes.register(Box::new(blocks::HtmlBlockRenderer));

        let mut directives: StyleRegistry<Box<dyn ExtensionProcessor>> =
            StyleRegistry::new(Box::new(extensions::Passthrough));
        directives.register_exact("image", Box::new(extensions::ImageProcessor));
        directives.register_exact("zone", Box::new(extensions::Passthrough));
        directives.register_exact("moniker", Box::new(extensions::Passthrough));

        Renderers {
            blocks: nodes,
            extensions: directives,
        }
    }

    /// Add a node renderer after the built-in ones. It sees only nodes
    /// nothing earlier claims.
    pub fn register_block(&mut self, renderer: Box<dyn BlockRenderer>) {
        self.blocks.register(renderer);
    }

    /// Handle `:::name` directives with `processor`.
    pub fn register_directive(&mut self, name: &str, processor: Box<dyn ExtensionProcessor>) {
        self.extensions.register_exact(name, processor);
    }

    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .blocks
            .names::<markdown::Block>()
            .into_iter()
            .map(|n| format!("node: {n}"))
            .collect();
        lines.extend(
            self.extensions
                .describe()
                .into_iter()
                .map(|s| format!("directive: {s}")),
        );
        lines
    }

    /// Render `blocks` into `out`, containing failures to the node that caused them.
    pub fn render_blocks(
        &self,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        blocks: &[markdown::Block],
    ) -> Cursor {
        for node in blocks {
            let Some(renderer) = self.blocks.find(node) else {
                ctx.log.warn(format!(
                    "no renderer for node type '{}'; skipped",
                    node.kind_name()
                ));
                cursor = cursor.after_block();
                continue;
            };
            cursor = match renderer.render(self, ctx, out, cursor, node) {
                Ok(next) => next,
                Err(err) => {
                    ctx.log.error(format!(
                        "{} renderer failed: {err}",
                        Claims::<markdown::Block>::name(&**renderer)
                    ));
                    cursor.after_block()
                }
            };
        }
        cursor
    }

    pub(crate) fn extension(&self, name: &str) -> &dyn ExtensionProcessor {
        &**self.extensions.find(name).renderer()
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Renderers::standard()
    }
}

/// Convert a Markdown tree to a rich document. Absolute image URLs are
/// fetched only when the options allow network access.
pub fn convert(
    md: &MarkdownDocument,
    options: &ToRichTextOptions,
    resolver: &dyn ContentResolver,
) -> RichTextOutput {
    let fetcher = default_fetcher(options.allow_network);
    convert_with(
        &Renderers::standard(),
        md,
        options,
        resolver,
        fetcher.as_ref(),
    )
}

/// Convert with a caller-supplied renderer set and media fetcher.
pub fn convert_with(
    renderers: &Renderers,
    md: &MarkdownDocument,
    options: &ToRichTextOptions,
    resolver: &dyn ContentResolver,
    fetcher: &dyn MediaFetcher,
) -> RichTextOutput {
    build(renderers, md, UnitMetadataMap::new(), options, resolver, fetcher)
}

/// Join units into one rich document, attaching each unit's metadata to its
/// level-one heading as a comment and the module metadata as properties.
pub fn convert_units(
    units: &[Unit],
    module: &ModuleMetadata,
    options: &ToRichTextOptions,
    resolver: &dyn ContentResolver,
) -> RichTextOutput {
    let (md, metadata) = join_units(units);
    let fetcher = default_fetcher(options.allow_network);
    let mut output = build(
        &Renderers::standard(),
        &md,
        metadata,
        options,
        resolver,
        fetcher.as_ref(),
    );
    for (key, value) in module.to_properties() {
        output.document.set_property(&key, &value);
    }
    output
}

fn build(
    renderers: &Renderers,
    md: &MarkdownDocument,
    units: UnitMetadataMap,
    options: &ToRichTextOptions,
    resolver: &dyn ContentResolver,
    fetcher: &dyn MediaFetcher,
) -> RichTextOutput {
    let mut ctx = BuildContext::new(options, resolver, fetcher);
    ctx.units = units;

    let mut out = Vec::new();
    renderers.render_blocks(&mut ctx, &mut out, Cursor::default(), &md.blocks);

    let mut document = ctx.doc;
    document.blocks = out;
    if let Some(front_matter) = &md.front_matter {
        document.set_property(FRONT_MATTER_PROPERTY, front_matter);
    }
    log::debug!(
        "converted {} markdown blocks into {} rich blocks",
        md.blocks.len(),
        document.blocks.len()
    );
    RichTextOutput {
        document,
        log: ctx.log,
    }
}
