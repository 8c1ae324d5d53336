//! Image and video references to drawings
//!
//! Image bytes are looked up next to the Markdown file first, then through
//! the content resolver, then over the network for absolute URLs. A failed
//! lookup is logged and yields a drawing without media.

use super::context::BuildContext;
use crate::error::RenderError;
use crate::resolve::{is_absolute_url, ContentOwner};
use crate::richtext::{Drawing, ImageAttributes, MediaId};
use image::{ImageFormat, ImageReader, Rgb, RgbImage};
use std::io::Cursor;

/// Build a drawing for `url`, embedding its bytes when they can be found.
pub fn load_image(
    ctx: &mut BuildContext<'_>,
    owner: ContentOwner<'_>,
    url: &str,
    alt: &str,
) -> Drawing {
    let name = file_name(url);
    let mut drawing = Drawing {
        name: Some(name.clone()),
        description: (!alt.is_empty()).then(|| alt.to_string()),
        ..Default::default()
    };

    let Some(bytes) = read_bytes(ctx, owner, url) else {
        return drawing;
    };
    match dimensions(&bytes) {
        Ok((width, height)) => {
            let (width, height) = fit_width(width, height, ctx.options.max_image_width);
            drawing.width = width;
            drawing.height = height;
        }
        Err(e) => ctx.log.warn(format!("image '{url}' has unreadable dimensions: {e}")),
    }
    drawing.media = Some(ctx.doc.add_media(&name, bytes));
    drawing
}

/// A drawing showing a placeholder frame that links to `url`.
pub fn video_drawing(ctx: &mut BuildContext<'_>, url: &str) -> Result<Drawing, RenderError> {
    let (width, height) = (ctx.options.video_width, ctx.options.video_height);
    let media = match ctx.video_placeholder() {
        Some(id) => id,
        None => {
            let id = placeholder(ctx, width, height)?;
            ctx.set_video_placeholder(id);
            id
        }
    };
    Ok(Drawing {
        name: Some("video-placeholder.png".to_string()),
        description: Some(format!("Video: {url}")),
        media: Some(media),
        width,
        height,
        hyperlink: Some(url.to_string()),
        video_url: Some(url.to_string()),
        attributes: ImageAttributes::default(),
    })
}

fn placeholder(ctx: &mut BuildContext<'_>, width: u32, height: u32) -> Result<MediaId, RenderError> {
    let frame = RgbImage::from_pixel(width.max(1), height.max(1), Rgb([32, 32, 32]));
    let mut bytes = Vec::new();
    frame.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(ctx.doc.add_media("video-placeholder.png", bytes))
}

fn read_bytes(ctx: &mut BuildContext<'_>, owner: ContentOwner<'_>, url: &str) -> Option<Vec<u8>> {
    if url.is_empty() {
        ctx.log.warn("image without a source; no media embedded");
        return None;
    }
    if is_absolute_url(url) {
        return match ctx.fetcher.fetch(url) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                ctx.log.warn(format!("image '{url}' could not be fetched: {e}"));
                None
            }
        };
    }

    if let Some(base) = &ctx.options.base_dir {
        let candidate = base.join(url);
        match std::fs::read(&candidate) {
            Ok(bytes) => return Some(bytes),
            Err(e) => log::debug!("{} not readable: {e}", candidate.display()),
        }
    }
    if let Some(bytes) = ctx.resolver.fetch_external_content(owner, url) {
        return Some(bytes);
    }
    ctx.log.warn(format!("image '{url}' not found; no media embedded"));
    None
}

fn dimensions(bytes: &[u8]) -> Result<(u32, u32), RenderError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Scale down to `max_width`, keeping the aspect ratio.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if max_width == 0 || width <= max_width {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(max_width) / u64::from(width)) as u32;
    (max_width, scaled.max(1))
}

/// Last path segment of a URL or path, without query or fragment.
fn file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("image.png")
        .to_string()
}
