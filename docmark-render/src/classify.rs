//! Formatting classification
//!
//! Collapses the layered formatting of a paragraph or run (paragraph style,
//! character style, explicit overrides) into a flat [`FormatDescriptor`].
//! Code is recognised by font family, using a configurable list of monospace
//! font names.

use crate::richtext::{Formatting, Paragraph, RichDocument, Run};
use std::collections::BTreeSet;

pub const DEFAULT_MONOSPACE_FONTS: &[&str] = &[
    "Consolas",
    "Courier New",
    "Cascadia Code",
    "Cascadia Mono",
    "Lucida Console",
    "Menlo",
    "Monaco",
    "Source Code Pro",
    "Fira Code",
];

/// Font families treated as code. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonospaceFonts {
    names: BTreeSet<String>,
}

impl MonospaceFonts {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        MonospaceFonts {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, font: &str) -> bool {
        self.names.contains(&font.trim().to_lowercase())
    }
}

impl Default for MonospaceFonts {
    fn default() -> Self {
        MonospaceFonts::new(DEFAULT_MONOSPACE_FONTS)
    }
}

/// Semantic formatting of a node after all layers are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub monospace: bool,
    pub subscript: bool,
    pub superscript: bool,
    pub small_caps: bool,
    pub style_name: String,
}

impl FormatDescriptor {
    /// True when the descriptor carries any emphasis that Markdown would mark up.
    pub fn is_plain(&self) -> bool {
        !(self.bold
            || self.italic
            || self.strike
            || self.monospace
            || self.subscript
            || self.superscript
            || self.small_caps)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormattingClassifier {
    fonts: MonospaceFonts,
}

impl FormattingClassifier {
    pub fn new(fonts: MonospaceFonts) -> Self {
        FormattingClassifier { fonts }
    }

    pub fn fonts(&self) -> &MonospaceFonts {
        &self.fonts
    }

    pub fn classify_paragraph(&self, doc: &RichDocument, paragraph: &Paragraph) -> FormatDescriptor {
        let formatting = paragraph_formatting(doc, paragraph);
        self.describe(&formatting, paragraph.style_id())
    }

    pub fn classify_run(
        &self,
        doc: &RichDocument,
        paragraph: &Paragraph,
        run: &Run,
    ) -> FormatDescriptor {
        let mut formatting = paragraph_formatting(doc, paragraph);
        if let Some(style) = &run.style {
            formatting.overlay(&doc.styles.resolve(style));
        }
        formatting.overlay(&run.formatting);
        self.describe(&formatting, paragraph.style_id())
    }

    fn describe(&self, formatting: &Formatting, style_name: &str) -> FormatDescriptor {
        FormatDescriptor {
            bold: formatting.bold.unwrap_or(false),
            italic: formatting.italic.unwrap_or(false),
            strike: formatting.strike.unwrap_or(false),
            monospace: formatting
                .font
                .as_deref()
                .is_some_and(|f| self.fonts.contains(f)),
            subscript: formatting.subscript.unwrap_or(false),
            superscript: formatting.superscript.unwrap_or(false),
            small_caps: formatting.small_caps.unwrap_or(false),
            style_name: style_name.to_string(),
        }
    }
}

fn paragraph_formatting(doc: &RichDocument, paragraph: &Paragraph) -> Formatting {
    let mut formatting = doc.styles.resolve(paragraph.style_id());
    formatting.overlay(&paragraph.formatting);
    formatting
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::{Style, StyleKind};
    use proptest::prelude::*;

    fn classifier() -> FormattingClassifier {
        FormattingClassifier::default()
    }

    #[test]
    fn explicit_run_formatting_wins_over_styles() {
        let mut doc = RichDocument::new();
        let para = doc.new_paragraph("Heading1");
        let run = Run::text("x").with_formatting(Formatting {
            bold: Some(false),
            ..Default::default()
        });
        let descriptor = classifier().classify_run(&doc, &para, &run);
        assert!(!descriptor.bold);
        assert_eq!(descriptor.style_name, "Heading1");
    }

    #[test]
    fn character_style_overlays_paragraph_style() {
        let mut doc = RichDocument::new();
        let para = doc.new_paragraph("Normal");
        let run = Run::text("x").with_style("Emphasis");
        let descriptor = classifier().classify_run(&doc, &para, &run);
        assert!(descriptor.italic);
        assert!(!descriptor.bold);
    }

    #[test]
    fn monospace_comes_from_font_list() {
        let mut doc = RichDocument::new();
        let para = doc.new_paragraph("Normal");
        let run = Run::text("x").with_formatting(Formatting::font("courier new"));
        assert!(classifier().classify_run(&doc, &para, &run).monospace);

        let custom = FormattingClassifier::new(MonospaceFonts::new(["Iosevka"]));
        assert!(!custom.classify_run(&doc, &para, &run).monospace);
        let run = Run::text("x").with_formatting(Formatting::font("Iosevka"));
        assert!(custom.classify_run(&doc, &para, &run).monospace);
    }

    #[test]
    fn code_style_paragraph_is_monospace() {
        let mut doc = RichDocument::new();
        let para = doc.new_paragraph("Code");
        assert!(classifier().classify_paragraph(&doc, &para).monospace);
    }

    #[test]
    fn small_caps_is_reported() {
        let mut doc = RichDocument::new();
        doc.styles.add(Style::character(
            "Key",
            Formatting {
                small_caps: Some(true),
                ..Default::default()
            },
        ));
        let para = doc.new_paragraph("Normal");
        let run = Run::text("Ctrl").with_style("Key");
        let d = classifier().classify_run(&doc, &para, &run);
        assert!(d.small_caps);
        assert!(doc.styles.get("Key").is_some_and(|s| s.kind == StyleKind::Character));
    }

    fn flag() -> impl Strategy<Value = Option<bool>> {
        prop_oneof![Just(None), Just(Some(true)), Just(Some(false))]
    }

    proptest! {
        #[test]
        fn classification_is_idempotent(
            bold in flag(),
            italic in flag(),
            sub in flag(),
            caps in flag(),
            font in prop_oneof![Just(None), Just(Some("Consolas".to_string())), Just(Some("Arial".to_string()))],
            style in prop_oneof![Just("Normal"), Just("Heading2"), Just("Code"), Just("Quote")],
        ) {
            let mut doc = RichDocument::new();
            let para = doc.new_paragraph(style);
            let run = Run::text("t").with_formatting(Formatting {
                bold,
                italic,
                subscript: sub,
                small_caps: caps,
                font,
                ..Default::default()
            });
            let c = classifier();
            let first = c.classify_run(&doc, &para, &run);
            let second = c.classify_run(&doc, &para, &run);
            prop_assert_eq!(first, second);
        }
    }
}
