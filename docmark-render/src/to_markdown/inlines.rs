//! Runs to Markdown inlines

use super::context::RenderContext;
use super::SmallCapsPolicy;
use crate::classify::FormatDescriptor;
use crate::markdown::{Inline, NoteKind};
use crate::richtext::{self, BreakKind, Drawing, Formatting, Paragraph, Run, RunContent};

/// Rendered paragraph content: inline Markdown, or a drawing left for the
/// caller to place.
#[derive(Debug)]
pub enum Segment<'p> {
    Inline(Inline),
    Drawing(&'p Drawing),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Marks {
    bold: bool,
    italic: bool,
    strike: bool,
    code: bool,
    subscript: bool,
    superscript: bool,
    kbd: bool,
}

impl Marks {
    fn from_descriptor(d: &FormatDescriptor, small_caps: SmallCapsPolicy) -> Self {
        Marks {
            bold: d.bold,
            italic: d.italic,
            strike: d.strike,
            code: d.monospace,
            subscript: d.subscript,
            superscript: d.superscript,
            kbd: d.small_caps && small_caps == SmallCapsPolicy::Kbd,
        }
    }
}

struct SpanBuffer {
    spans: Vec<(Marks, String)>,
}

impl SpanBuffer {
    fn push(&mut self, marks: Marks, text: &str) {
        match self.spans.last_mut() {
            Some((last, buffered)) if *last == marks => buffered.push_str(text),
            _ => self.spans.push((marks, text.to_string())),
        }
    }

    fn drain_into(&mut self, out: &mut Vec<Inline>) {
        for (marks, text) in self.spans.drain(..) {
            out.extend(emphasize(marks, &text));
        }
    }
}

/// Render a paragraph's runs, merging adjacent runs with equal formatting.
///
/// `forced` is applied on top of every run's own formatting.
pub fn render_segments<'p>(
    ctx: &RenderContext<'_>,
    paragraph: &'p Paragraph,
    forced: Option<&Formatting>,
) -> Vec<Segment<'p>> {
    let mut segments = Vec::new();
    let mut pending: Vec<Inline> = Vec::new();
    let mut buffer = SpanBuffer { spans: Vec::new() };

    for inline in &paragraph.content {
        match inline {
            richtext::Inline::Run(run) => {
                for piece in &run.content {
                    match piece {
                        RunContent::Text(text) => {
                            buffer.push(marks_for(ctx, paragraph, run, forced), text)
                        }
                        RunContent::Break(BreakKind::Line) => {
                            buffer.drain_into(&mut pending);
                            pending.push(Inline::LineBreak { hard: true });
                        }
                        RunContent::Break(BreakKind::Page) => {}
                        RunContent::Drawing(drawing) => {
                            buffer.drain_into(&mut pending);
                            segments.extend(merge_text(std::mem::take(&mut pending)).into_iter().map(Segment::Inline));
                            segments.push(Segment::Drawing(drawing));
                        }
                        RunContent::Other(_) => {}
                    }
                }
            }
            richtext::Inline::Hyperlink(link) => {
                buffer.drain_into(&mut pending);
                let mut link_buffer = SpanBuffer { spans: Vec::new() };
                for run in &link.runs {
                    link_buffer.push(marks_for(ctx, paragraph, run, forced), &run.text_content());
                }
                let mut children = Vec::new();
                link_buffer.drain_into(&mut children);
                pending.push(Inline::Link {
                    url: link.url.clone(),
                    title: String::new(),
                    children: merge_text(children),
                });
            }
        }
    }
    buffer.drain_into(&mut pending);
    segments.extend(merge_text(pending).into_iter().map(Segment::Inline));
    segments
}

/// Inline-only rendering; drawings are dropped.
pub fn render_inlines(
    ctx: &RenderContext<'_>,
    paragraph: &Paragraph,
    forced: Option<&Formatting>,
) -> Vec<Inline> {
    render_segments(ctx, paragraph, forced)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Inline(inline) => Some(inline),
            Segment::Drawing(_) => None,
        })
        .collect()
}

fn marks_for(
    ctx: &RenderContext<'_>,
    paragraph: &Paragraph,
    run: &Run,
    forced: Option<&Formatting>,
) -> Marks {
    let descriptor = match forced {
        Some(forced) => {
            let mut run = run.clone();
            let mut formatting = run.formatting.clone();
            formatting.overlay(forced);
            run.formatting = formatting;
            ctx.classifier.classify_run(ctx.doc, paragraph, &run)
        }
        None => ctx.classifier.classify_run(ctx.doc, paragraph, run),
    };
    Marks::from_descriptor(&descriptor, ctx.options.small_caps)
}

/// Wrap `text` in the markup for `marks`, keeping surrounding whitespace
/// outside the markup. Whitespace-only text never gets emphasis.
fn emphasize(marks: Marks, text: &str) -> Vec<Inline> {
    if text.is_empty() {
        return Vec::new();
    }
    let core = text.trim();
    if core.is_empty() || marks == Marks::default() {
        return vec![Inline::Text(text.to_string())];
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];

    let mut inner = if marks.code {
        vec![Inline::Code(core.to_string())]
    } else {
        vec![Inline::Text(core.to_string())]
    };
    let wrap_html = |tag: &str, inner: Vec<Inline>| {
        let mut wrapped = vec![Inline::Html(format!("<{tag}>"))];
        wrapped.extend(inner);
        wrapped.push(Inline::Html(format!("</{tag}>")));
        wrapped
    };
    if marks.subscript {
        inner = wrap_html("sub", inner);
    }
    if marks.superscript {
        inner = wrap_html("sup", inner);
    }
    if marks.kbd {
        inner = wrap_html("kbd", inner);
    }
    if marks.strike {
        inner = vec![Inline::Strikethrough { children: inner }];
    }
    let count = match (marks.bold, marks.italic) {
        (true, true) => 3,
        (true, false) => 2,
        (false, true) => 1,
        (false, false) => 0,
    };
    if count > 0 {
        inner = vec![Inline::Emphasis {
            delimiter: '*',
            count,
            children: inner,
        }];
    }

    let mut out = Vec::new();
    if !lead.is_empty() {
        out.push(Inline::Text(lead.to_string()));
    }
    out.extend(inner);
    if !trail.is_empty() {
        out.push(Inline::Text(trail.to_string()));
    }
    out
}

/// Join adjacent text nodes.
pub fn merge_text(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        if let (Some(Inline::Text(prev)), Inline::Text(next)) = (out.last_mut(), &inline) {
            prev.push_str(next);
            continue;
        }
        out.push(inline);
    }
    out
}

/// Trim whitespace at both ends of an inline sequence, dropping text nodes
/// that become empty.
pub fn trim_inlines(mut inlines: Vec<Inline>) -> Vec<Inline> {
    while let Some(Inline::Text(first)) = inlines.first_mut() {
        let trimmed = first.trim_start().to_string();
        if trimmed.is_empty() {
            inlines.remove(0);
        } else {
            *first = trimmed;
            break;
        }
    }
    loop {
        match inlines.last_mut() {
            Some(Inline::LineBreak { .. }) => {
                inlines.pop();
            }
            Some(Inline::Text(last)) => {
                let trimmed = last.trim_end().to_string();
                if !trimmed.is_empty() {
                    *last = trimmed;
                    break;
                }
                inlines.pop();
            }
            _ => break,
        }
    }
    inlines
}

/// Detect a leading admonition keyword (`Note:`, `**Tip**`, `warning ...`).
///
/// Returns the kind and the content with the keyword and its separator
/// removed. Leading blank text is skipped before the scan.
pub fn strip_admonition(inlines: &[Inline]) -> Option<(NoteKind, Vec<Inline>)> {
    let mut rest: Vec<Inline> = inlines
        .iter()
        .skip_while(|i| matches!(i, Inline::Text(t) if t.trim().is_empty()))
        .cloned()
        .collect();

    let kind = match rest.first()? {
        Inline::Text(text) => {
            let text = text.trim_start();
            let end = text
                .find(|c: char| c == ':' || c.is_whitespace())
                .unwrap_or(text.len());
            let kind = NoteKind::from_keyword(&text[..end])?;
            let remainder = text[end..].trim_start_matches(':').trim_start().to_string();
            if remainder.is_empty() {
                rest.remove(0);
            } else {
                rest[0] = Inline::Text(remainder);
            }
            kind
        }
        Inline::Emphasis { children, .. } => {
            let label = crate::markdown::plain_text(children);
            let label = label.trim().trim_end_matches(':').trim_end();
            let kind = NoteKind::from_keyword(label)?;
            rest.remove(0);
            kind
        }
        _ => return None,
    };

    if let Some(Inline::Text(next)) = rest.first_mut() {
        let trimmed = next.trim_start().trim_start_matches(':').trim_start().to_string();
        if trimmed.is_empty() {
            rest.remove(0);
        } else {
            *next = trimmed;
        }
    }
    Some((kind, rest))
}

pub const TASK_UNCHECKED: &str = "☐";
pub const TASK_CHECKED: &str = "☒";

/// Replace a leading ballot-box glyph with a task marker.
pub fn extract_task_marker(mut inlines: Vec<Inline>) -> Vec<Inline> {
    let Some(Inline::Text(first)) = inlines.first() else {
        return inlines;
    };
    let checked = if first.starts_with(TASK_CHECKED) {
        true
    } else if first.starts_with(TASK_UNCHECKED) {
        false
    } else {
        return inlines;
    };
    let glyph_len = if checked {
        TASK_CHECKED.len()
    } else {
        TASK_UNCHECKED.len()
    };
    let rest = first[glyph_len..].trim_start().to_string();
    if rest.is_empty() {
        inlines.remove(0);
    } else {
        inlines[0] = Inline::Text(rest);
    }
    inlines.insert(0, Inline::TaskMarker { checked });
    inlines
}
