//! Triple-colon directives, moniker ranges and includes
//!
//! Names without a dedicated processor pass through as `Directive`
//! paragraphs so a later conversion back to Markdown restores them verbatim.

use super::blocks::{push_directive, unexpected};
use super::context::{BuildContext, Cursor};
use super::images::load_image;
use super::{BlockRenderer, ExtensionProcessor, Renderers};
use crate::error::RenderError;
use crate::markdown::{parse_markdown, plain_text, Block, Directive, TripleColon};
use crate::resolve::ContentOwner;
use crate::richtext::{self, Run};

/// Includes nested deeper than this are left as references.
pub const MAX_INCLUDE_DEPTH: usize = 8;

pub struct TripleColonRenderer;
claims!(TripleColonRenderer, "triple-colon", Block::TripleColon(_));

impl BlockRenderer for TripleColonRenderer {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::TripleColon(directive) = node else {
            return Err(unexpected("triple-colon", node));
        };
        let processor = renderers.extension(&directive.name);
        log::trace!("directive '{}' handled by {}", directive.name, processor.name());
        processor.render(renderers, ctx, out, cursor, directive, node)
    }
}

/// `:::image:::` to an inline drawing carrying the extended attributes.
pub struct ImageProcessor;

impl ExtensionProcessor for ImageProcessor {
    fn name(&self) -> &'static str {
        "image"
    }

    fn render(
        &self,
        _renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        directive: &TripleColon,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let source = directive.attribute("source").unwrap_or_default();
        let alt = directive.attribute("alt-text").unwrap_or_default();
        let mut drawing = load_image(ctx, ContentOwner::Block(node), source, alt);

        let attributes = &mut drawing.attributes;
        attributes.decorative = directive.attribute("type") == Some("icon");
        attributes.border = directive.attribute("border") == Some("true");
        attributes.lightbox = directive.attribute("lightbox").map(str::to_string);
        attributes.loc_scope = directive.attribute("loc-scope").map(str::to_string);
        let long_description = directive
            .children
            .iter()
            .filter_map(|child| match child {
                Block::Paragraph { content } => Some(plain_text(content)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        if !long_description.trim().is_empty() {
            attributes.long_description = Some(long_description);
        }

        let mut paragraph = ctx.start_paragraph(&mut cursor, "Normal");
        paragraph.push_run(Run::with_drawing(drawing));
        out.push(richtext::Block::Paragraph(paragraph));
        Ok(cursor.after_block())
    }
}

/// Keeps the directive lines as `Directive` paragraphs around its children.
pub struct Passthrough;

impl ExtensionProcessor for Passthrough {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        directive: &TripleColon,
        _node: &Block,
    ) -> Result<Cursor, RenderError> {
        if !matches!(directive.name.as_str(), "zone" | "moniker" | "column" | "row") {
            ctx.log
                .debug(format!("directive '{}' kept verbatim", directive.name));
        }
        let mut open = Directive::new(&directive.name, directive.attributes.clone());
        open.closed = !directive.container;
        push_directive(ctx, out, &mut cursor, &open.to_line());

        if !directive.container {
            return Ok(cursor.after_block());
        }
        let after = renderers.render_blocks(ctx, out, cursor, &directive.children);
        let mut cursor = after.after_block();
        let mut end = Directive::new(&format!("{}-end", directive.name), Vec::new());
        end.closed = directive.name == "column";
        push_directive(ctx, out, &mut cursor, &end.to_line());
        Ok(cursor)
    }
}

pub struct MonikerRenderer;
claims!(MonikerRenderer, "moniker-range", Block::MonikerRange { .. });

impl BlockRenderer for MonikerRenderer {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::MonikerRange { range, children } = node else {
            return Err(unexpected("moniker-range", node));
        };
        let mut open = Directive::new("moniker", vec![("range".to_string(), range.clone())]);
        open.closed = false;
        push_directive(ctx, out, &mut cursor, &open.to_line());
        let mut cursor = renderers.render_blocks(ctx, out, cursor, children).after_block();
        push_directive(ctx, out, &mut cursor, ":::moniker-end");
        Ok(cursor)
    }
}

/// `[!INCLUDE]` expands to the referenced file when the resolver can supply
/// it, and stays a reference otherwise.
pub struct InclusionRenderer;
claims!(InclusionRenderer, "inclusion", Block::Inclusion { .. });

impl BlockRenderer for InclusionRenderer {
    fn render(
        &self,
        renderers: &Renderers,
        ctx: &mut BuildContext<'_>,
        out: &mut Vec<richtext::Block>,
        mut cursor: Cursor,
        node: &Block,
    ) -> Result<Cursor, RenderError> {
        let Block::Inclusion { title, path } = node else {
            return Err(unexpected("inclusion", node));
        };
        let reference = format!("[!INCLUDE [{title}]({path})]");

        if ctx.include_depth >= MAX_INCLUDE_DEPTH {
            ctx.log.warn(format!(
                "include '{path}' nested more than {MAX_INCLUDE_DEPTH} deep; kept as a reference"
            ));
            push_directive(ctx, out, &mut cursor, &reference);
            return Ok(cursor.after_block());
        }
        let Some(bytes) = ctx.resolver.fetch_external_content(ContentOwner::Block(node), path)
        else {
            ctx.log
                .info(format!("include '{path}' not resolved; kept as a reference"));
            push_directive(ctx, out, &mut cursor, &reference);
            return Ok(cursor.after_block());
        };

        let included = parse_markdown(&String::from_utf8_lossy(&bytes))
            .map_err(|e| RenderError::Other(format!("include '{path}': {e}")))?;
        ctx.include_depth += 1;
        let after = renderers.render_blocks(ctx, out, cursor, &included.blocks);
        ctx.include_depth -= 1;
        Ok(after.after_block())
    }
}
