//! Style table: named paragraph and character styles with inheritance

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Explicit formatting flags. `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_caps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscript: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superscript: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

impl Formatting {
    pub fn bold() -> Self {
        Formatting {
            bold: Some(true),
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        Formatting {
            italic: Some(true),
            ..Default::default()
        }
    }

    pub fn font(name: impl Into<String>) -> Self {
        Formatting {
            font: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Formatting::default()
    }

    /// Apply every flag `other` sets explicitly on top of `self`.
    pub fn overlay(&mut self, other: &Formatting) {
        fn take(slot: &mut Option<bool>, value: Option<bool>) {
            if value.is_some() {
                *slot = value;
            }
        }
        take(&mut self.bold, other.bold);
        take(&mut self.italic, other.italic);
        take(&mut self.strike, other.strike);
        take(&mut self.small_caps, other.small_caps);
        take(&mut self.subscript, other.subscript);
        take(&mut self.superscript, other.superscript);
        if other.font.is_some() {
            self.font = other.font.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    Paragraph,
    Character,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: String,
    pub kind: StyleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
    #[serde(default)]
    pub formatting: Formatting,
}

impl Style {
    pub fn paragraph(id: &str) -> Self {
        Style {
            id: id.to_string(),
            kind: StyleKind::Paragraph,
            based_on: Some("Normal".to_string()),
            formatting: Formatting::default(),
        }
    }

    pub fn character(id: &str, formatting: Formatting) -> Self {
        Style {
            id: id.to_string(),
            kind: StyleKind::Character,
            based_on: None,
            formatting,
        }
    }

    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }
}

/// Styles keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleTable {
    styles: BTreeMap<String, Style>,
}

impl StyleTable {
    /// The styles every generated document relies on.
    pub fn built_in(code_font: &str) -> Self {
        let mut table = StyleTable::default();
        table.add(Style {
            id: "Normal".to_string(),
            kind: StyleKind::Paragraph,
            based_on: None,
            formatting: Formatting::default(),
        });
        table.add(Style::paragraph("Title").with_formatting(Formatting::bold()));
        for level in 1..=5 {
            table.add(
                Style::paragraph(&format!("Heading{level}")).with_formatting(Formatting::bold()),
            );
        }
        table.add(Style::paragraph("ListParagraph"));
        table.add(Style::paragraph("Code").with_formatting(Formatting::font(code_font)));
        table.add(Style::paragraph("CodeFooter"));
        table.add(Style::paragraph("Quote").with_formatting(Formatting::italic()));
        table.add(Style::paragraph("IntenseQuote").with_formatting(Formatting {
            bold: Some(true),
            italic: Some(true),
            ..Default::default()
        }));
        table.add(Style::paragraph("Caption").with_formatting(Formatting::italic()));
        table.add(Style::paragraph("Directive"));
        table.add(Style::paragraph("TabGroup"));
        table.add(Style::character("Hyperlink", Formatting::default()));
        table.add(Style::character("InlineCode", Formatting::font(code_font)));
        table.add(Style::character("Strong", Formatting::bold()));
        table.add(Style::character("Emphasis", Formatting::italic()));
        table
    }

    /// Insert or replace a style.
    pub fn add(&mut self, style: Style) {
        self.styles.insert(style.id.clone(), style);
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    /// Effective formatting of a style, following its `based_on` chain.
    ///
    /// Ancestors are applied first. Unknown ids and cycles stop the walk.
    pub fn resolve(&self, id: &str) -> Formatting {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if chain.iter().any(|s: &&Style| s.id == current) {
                break;
            }
            let Some(style) = self.styles.get(current) else {
                break;
            };
            chain.push(style);
            next = style.based_on.as_deref();
        }
        let mut formatting = Formatting::default();
        for style in chain.iter().rev() {
            formatting.overlay(&style.formatting);
        }
        formatting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_walks_based_on_chain() {
        let mut table = StyleTable::built_in("Consolas");
        table.add(Style {
            id: "Sub".to_string(),
            kind: StyleKind::Paragraph,
            based_on: Some("Heading1".to_string()),
            formatting: Formatting::italic(),
        });
        let resolved = table.resolve("Sub");
        assert_eq!(resolved.bold, Some(true));
        assert_eq!(resolved.italic, Some(true));
    }

    #[test]
    fn resolve_survives_cycles() {
        let mut table = StyleTable::default();
        table.add(Style {
            id: "A".to_string(),
            kind: StyleKind::Paragraph,
            based_on: Some("B".to_string()),
            formatting: Formatting::bold(),
        });
        table.add(Style {
            id: "B".to_string(),
            kind: StyleKind::Paragraph,
            based_on: Some("A".to_string()),
            formatting: Formatting::italic(),
        });
        let resolved = table.resolve("A");
        assert_eq!(resolved.bold, Some(true));
    }

    #[test]
    fn overlay_keeps_unset_flags() {
        let mut base = Formatting::bold();
        base.overlay(&Formatting::italic());
        assert_eq!(base.bold, Some(true));
        assert_eq!(base.italic, Some(true));
        base.overlay(&Formatting {
            bold: Some(false),
            ..Default::default()
        });
        assert_eq!(base.bold, Some(false));
    }
}
