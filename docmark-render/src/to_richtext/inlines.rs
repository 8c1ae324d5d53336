//! Markdown inlines to runs
//!
//! Formatting nests the way the Markdown tree does. Raw HTML tags are
//! handled by a small state machine: an opening tag switches formatting on
//! for every following sibling until its closing tag, and `<a href>` collects
//! the runs between it and `</a>` into a hyperlink.

use super::context::BuildContext;
use super::images::load_image;
use crate::markdown::Inline;
use crate::resolve::{is_absolute_url, ContentOwner};
use crate::richtext::{self, Formatting, Hyperlink, Paragraph, Run, RunContent};

pub const TASK_UNCHECKED: &str = "☐ ";
pub const TASK_CHECKED: &str = "☒ ";

/// Render `inlines` onto the end of `paragraph`.
pub fn render_into(ctx: &mut BuildContext<'_>, paragraph: &mut Paragraph, inlines: &[Inline]) {
    let mut writer = RunWriter::default();
    writer.write_all(ctx, inlines, &Formatting::default(), None);
    writer.finish(ctx);
    paragraph.content.extend(merge_runs(writer.out));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlTag {
    Bold,
    Italic,
    Superscript,
    Subscript,
    Kbd,
    Strike,
}

impl HtmlTag {
    fn from_name(name: &str) -> Option<HtmlTag> {
        Some(match name {
            "b" | "strong" => HtmlTag::Bold,
            "i" | "em" => HtmlTag::Italic,
            "sup" => HtmlTag::Superscript,
            "sub" => HtmlTag::Subscript,
            "kbd" => HtmlTag::Kbd,
            "s" | "del" => HtmlTag::Strike,
            _ => return None,
        })
    }

    fn apply(self, formatting: &mut Formatting) {
        match self {
            HtmlTag::Bold => formatting.bold = Some(true),
            HtmlTag::Italic => formatting.italic = Some(true),
            HtmlTag::Superscript => formatting.superscript = Some(true),
            HtmlTag::Subscript => formatting.subscript = Some(true),
            HtmlTag::Kbd => formatting.small_caps = Some(true),
            HtmlTag::Strike => formatting.strike = Some(true),
        }
    }
}

/// One parsed HTML fragment.
#[derive(Debug, PartialEq, Eq)]
enum HtmlToken {
    Open { name: String, href: Option<String> },
    Close(String),
    LineBreak,
    Comment,
    Unknown,
}

fn tokenize_html(raw: &str) -> HtmlToken {
    let raw = raw.trim();
    if raw.starts_with("<!--") {
        return HtmlToken::Comment;
    }
    let Some(inner) = raw.strip_prefix('<').and_then(|r| r.strip_suffix('>')) else {
        return HtmlToken::Unknown;
    };
    let inner = inner.trim().trim_end_matches('/').trim_end();
    if let Some(name) = inner.strip_prefix('/') {
        return HtmlToken::Close(name.trim().to_ascii_lowercase());
    }
    let name_len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    let name = inner[..name_len].to_ascii_lowercase();
    if name.is_empty() {
        return HtmlToken::Unknown;
    }
    if name == "br" {
        return HtmlToken::LineBreak;
    }
    let href = attribute(&inner[name_len..], "href");
    HtmlToken::Open { name, href }
}

fn attribute(attrs: &str, key: &str) -> Option<String> {
    let start = attrs.find(&format!("{key}="))? + key.len() + 1;
    let rest = &attrs[start..];
    match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &rest[1..];
            Some(body[..body.find(quote)?].to_string())
        }
        _ => Some(
            rest.split(char::is_whitespace)
                .next()
                .unwrap_or_default()
                .to_string(),
        ),
    }
}

#[derive(Default)]
struct RunWriter {
    out: Vec<richtext::Inline>,
    /// Tags opened by raw HTML, innermost last.
    open_tags: Vec<HtmlTag>,
    /// A hyperlink opened by `<a href>`, collecting runs.
    html_link: Option<Hyperlink>,
}

impl RunWriter {
    fn write_all(
        &mut self,
        ctx: &mut BuildContext<'_>,
        inlines: &[Inline],
        base: &Formatting,
        char_style: Option<&str>,
    ) {
        for inline in inlines {
            self.write(ctx, inline, base, char_style);
        }
    }

    fn effective(&self, base: &Formatting) -> Formatting {
        let mut formatting = base.clone();
        for tag in &self.open_tags {
            tag.apply(&mut formatting);
        }
        formatting
    }

    fn push_run(&mut self, run: Run) {
        match &mut self.html_link {
            Some(link) => link.runs.push(run),
            None => self.out.push(richtext::Inline::Run(run)),
        }
    }

    fn push_text(&mut self, text: &str, base: &Formatting, char_style: Option<&str>) {
        let mut run = Run::text(text).with_formatting(self.effective(base));
        if let Some(style) = char_style {
            run = run.with_style(style);
        }
        self.push_run(run);
    }

    fn write(
        &mut self,
        ctx: &mut BuildContext<'_>,
        inline: &Inline,
        base: &Formatting,
        char_style: Option<&str>,
    ) {
        match inline {
            Inline::Text(text) => self.push_text(text, base, char_style),
            Inline::Emphasis {
                count, children, ..
            } => {
                let mut formatting = base.clone();
                match *count {
                    1 => formatting.italic = Some(true),
                    2 => formatting.bold = Some(true),
                    _ => {
                        formatting.bold = Some(true);
                        formatting.italic = Some(true);
                    }
                }
                match flatten(children) {
                    Some(text) => self.push_text(&text, &formatting, char_style),
                    None => self.write_all(ctx, children, &formatting, char_style),
                }
            }
            Inline::Strikethrough { children } => {
                let mut formatting = base.clone();
                formatting.strike = Some(true);
                self.write_all(ctx, children, &formatting, char_style);
            }
            Inline::LineBreak { hard: true } => {
                self.push_run(Run::line_break().with_formatting(self.effective(base)))
            }
            Inline::LineBreak { hard: false } => self.push_text(" ", base, char_style),
            Inline::Code(code) => self.push_text(code, base, Some("InlineCode")),
            Inline::Link {
                url, children, ..
            } => {
                let url = resolve_link(ctx, url);
                let mut inner = RunWriter {
                    open_tags: self.open_tags.clone(),
                    ..Default::default()
                };
                inner.write_all(ctx, children, base, Some("Hyperlink"));
                let runs = inner.into_runs();
                self.push_link(Hyperlink { url, runs });
            }
            Inline::AutoLink { url } => {
                let run = Run::text(url)
                    .with_formatting(self.effective(base))
                    .with_style("Hyperlink");
                self.push_link(Hyperlink {
                    url: url.clone(),
                    runs: vec![run],
                });
            }
            Inline::Image { url, title, alt } => {
                let mut drawing = load_image(ctx, ContentOwner::Inline(inline), url, alt);
                if !title.is_empty() && drawing.description.is_none() {
                    drawing.description = Some(title.clone());
                }
                self.push_run(Run::with_drawing(drawing));
            }
            Inline::Html(raw) => self.write_html(ctx, raw, base, char_style),
            Inline::TaskMarker { checked } => {
                let glyph = if *checked { TASK_CHECKED } else { TASK_UNCHECKED };
                self.push_text(glyph, base, char_style);
            }
            Inline::Other { kind } => {
                ctx.log.warn(format!("no renderer for inline node type '{kind}'; skipped"));
            }
        }
    }

    fn write_html(
        &mut self,
        ctx: &mut BuildContext<'_>,
        raw: &str,
        base: &Formatting,
        char_style: Option<&str>,
    ) {
        match tokenize_html(raw) {
            HtmlToken::LineBreak => {
                self.push_run(Run::line_break().with_formatting(self.effective(base)))
            }
            HtmlToken::Comment => {
                ctx.log.debug(format!("html comment '{}' dropped", raw.trim()));
            }
            HtmlToken::Open { name, href } if name == "a" => {
                if self.html_link.is_some() {
                    ctx.log.warn("nested <a> tag; previous link closed");
                    self.close_html_link();
                }
                let url = resolve_link(ctx, href.as_deref().unwrap_or_default());
                self.html_link = Some(Hyperlink {
                    url,
                    runs: Vec::new(),
                });
            }
            HtmlToken::Close(name) if name == "a" => {
                if self.html_link.is_none() {
                    ctx.log.warn("closing </a> without an opening tag; ignored");
                }
                self.close_html_link();
            }
            HtmlToken::Open { name, .. } => match HtmlTag::from_name(&name) {
                Some(tag) => self.open_tags.push(tag),
                None => self.literal_html(ctx, raw, base, char_style),
            },
            HtmlToken::Close(name) => match HtmlTag::from_name(&name) {
                Some(tag) => match self.open_tags.iter().rposition(|t| *t == tag) {
                    Some(index) => {
                        self.open_tags.remove(index);
                    }
                    None => ctx.log.warn(format!("closing </{name}> without an opening tag; ignored")),
                },
                None => self.literal_html(ctx, raw, base, char_style),
            },
            HtmlToken::Unknown => self.literal_html(ctx, raw, base, char_style),
        }
    }

    fn literal_html(
        &mut self,
        ctx: &mut BuildContext<'_>,
        raw: &str,
        base: &Formatting,
        char_style: Option<&str>,
    ) {
        ctx.log.warn(format!("unsupported html '{}' kept as text", raw.trim()));
        self.push_text(raw, base, char_style);
    }

    fn close_html_link(&mut self) {
        if let Some(mut link) = self.html_link.take() {
            for run in &mut link.runs {
                if run.style.is_none() {
                    run.style = Some("Hyperlink".to_string());
                }
            }
            self.out.push(richtext::Inline::Hyperlink(link));
        }
    }

    fn push_link(&mut self, link: Hyperlink) {
        match &mut self.html_link {
            // A Markdown link inside <a>...</a> contributes its runs only.
            Some(outer) => outer.runs.extend(link.runs),
            None => self.out.push(richtext::Inline::Hyperlink(link)),
        }
    }

    fn finish(&mut self, ctx: &mut BuildContext<'_>) {
        if self.html_link.is_some() {
            ctx.log.warn("unclosed <a> tag closed at end of paragraph");
            self.close_html_link();
        }
        if !self.open_tags.is_empty() {
            ctx.log.debug(format!("{} html tag(s) left open", self.open_tags.len()));
            self.open_tags.clear();
        }
    }

    /// Runs for a hyperlink body; nested hyperlinks are flattened.
    fn into_runs(mut self) -> Vec<Run> {
        if let Some(link) = self.html_link.take() {
            self.out.push(richtext::Inline::Hyperlink(link));
        }
        self.out
            .into_iter()
            .flat_map(|inline| match inline {
                richtext::Inline::Run(run) => vec![run],
                richtext::Inline::Hyperlink(link) => link.runs,
            })
            .collect()
    }
}

/// Text of an emphasis span holding only text and soft breaks.
fn flatten(children: &[Inline]) -> Option<String> {
    let mut text = String::new();
    for child in children {
        match child {
            Inline::Text(t) => text.push_str(t),
            Inline::LineBreak { hard: false } => text.push(' '),
            _ => return None,
        }
    }
    Some(text)
}

/// Links to other Markdown files become absolute content URLs when the
/// resolver knows where they are published.
fn resolve_link(ctx: &mut BuildContext<'_>, url: &str) -> String {
    let path = url.split(['#', '?']).next().unwrap_or_default();
    if is_absolute_url(url) || !path.to_ascii_lowercase().ends_with(".md") {
        return url.to_string();
    }
    match ctx.resolver.resolve_relative_to_absolute(url) {
        Some(absolute) => absolute,
        None => {
            ctx.log.debug(format!("cross-reference '{url}' left relative"));
            url.to_string()
        }
    }
}

/// Merge adjacent plain-text runs that share style and formatting.
pub fn merge_runs(inlines: Vec<richtext::Inline>) -> Vec<richtext::Inline> {
    let mut out: Vec<richtext::Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        if let (Some(richtext::Inline::Run(prev)), richtext::Inline::Run(next)) =
            (out.last_mut(), &inline)
        {
            if let (Some(prev_text), Some(next_text)) = (only_text(prev), only_text(next)) {
                if prev.style == next.style && prev.formatting == next.formatting {
                    let merged = format!("{prev_text}{next_text}");
                    prev.content = vec![RunContent::Text(merged)];
                    continue;
                }
            }
        }
        out.push(inline);
    }
    out
}

fn only_text(run: &Run) -> Option<&str> {
    match run.content.as_slice() {
        [RunContent::Text(text)] => Some(text),
        _ => None,
    }
}
