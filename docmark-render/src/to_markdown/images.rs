//! Drawings to Markdown images
//!
//! Picks a file name for the embedded binary, records it for extraction and
//! emits the reference in the richest form the drawing needs: a plain image,
//! an `:::image` directive for extended attributes, or a video quote.

use super::context::RenderContext;
use super::{ExtractedMedia, ToMarkdownOptions};
use crate::markdown::{Block, Inline, NoteKind, TripleColon};
use crate::metadata::tokens;
use crate::richtext::{Drawing, Paragraph};
use std::path::{Path, PathBuf};

pub enum ImageOutput {
    Inline(Inline),
    Block(Block),
}

pub fn render_drawing(
    ctx: &mut RenderContext<'_>,
    paragraph: &Paragraph,
    drawing: &Drawing,
    caption: Option<String>,
) -> ImageOutput {
    if let Some(url) = &drawing.video_url {
        return ImageOutput::Block(Block::QuoteSectionNote {
            kind: NoteKind::Video(url.clone()),
            children: Vec::new(),
        });
    }

    let wanted = target_file_name(ctx, paragraph, drawing);
    let name = ctx.reserve_media_name(&wanted);
    let (path, link) = media_link(ctx.options, &name);

    let doc = ctx.doc;
    match drawing.media.and_then(|id| doc.media(id)) {
        Some(part) => ctx.media.push(ExtractedMedia {
            path,
            file_name: name.clone(),
            data: part.data.clone(),
        }),
        None => ctx.log.warn(format!(
            "image '{name}' has no embedded data; emitting a reference without a file"
        )),
    }

    let alt = caption
        .or_else(|| drawing.description.clone())
        .unwrap_or_default();

    if drawing.attributes.is_plain() {
        return ImageOutput::Inline(Inline::Image {
            url: link,
            title: String::new(),
            alt,
        });
    }

    let attrs = &drawing.attributes;
    let kind = if attrs.decorative {
        "icon"
    } else if attrs.long_description.is_some() {
        "complex"
    } else {
        "content"
    };
    let mut attributes = vec![
        ("type".to_string(), kind.to_string()),
        ("source".to_string(), link),
    ];
    if !attrs.decorative || !alt.is_empty() {
        attributes.push(("alt-text".to_string(), alt));
    }
    if attrs.border {
        attributes.push(("border".to_string(), "true".to_string()));
    }
    if let Some(lightbox) = &attrs.lightbox {
        attributes.push(("lightbox".to_string(), lightbox.clone()));
    }
    if let Some(scope) = &attrs.loc_scope {
        attributes.push(("loc-scope".to_string(), scope.clone()));
    }
    let children: Vec<Block> = attrs
        .long_description
        .iter()
        .map(|text| Block::text_paragraph(text))
        .collect();
    ImageOutput::Block(Block::TripleColon(TripleColon {
        name: "image".to_string(),
        attributes,
        container: !children.is_empty(),
        children,
    }))
}

/// Explicit name, then an `image:<name>` comment, then the media part's own name.
fn target_file_name(ctx: &RenderContext<'_>, paragraph: &Paragraph, drawing: &Drawing) -> String {
    let from_comment = || {
        ctx.doc.comments_for(paragraph.id).find_map(|c| {
            tokens::decode(&c.text)
                .into_iter()
                .find(|(k, _)| k == "image")
                .map(|(_, v)| v)
        })
    };
    let from_media = || {
        drawing
            .media
            .and_then(|id| ctx.doc.media(id))
            .map(|m| m.file_name.clone())
    };
    let raw = drawing
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(from_comment)
        .or_else(from_media)
        .unwrap_or_else(|| "image.png".to_string());
    Path::new(&raw)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(raw)
}

/// Where the binary is written and how the Markdown file refers to it.
fn media_link(options: &ToMarkdownOptions, name: &str) -> (PathBuf, String) {
    let target = Path::new(&options.media_folder).join(name);
    let relative = match &options.output_dir {
        Some(dir) if target.is_absolute() => {
            pathdiff::diff_paths(&target, dir).unwrap_or_else(|| target.clone())
        }
        _ => target.clone(),
    };
    let link = relative
        .iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    (target, link)
}
