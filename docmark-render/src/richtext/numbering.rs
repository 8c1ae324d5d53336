//! Numbering definitions shared by list paragraphs

use serde::{Deserialize, Serialize};

/// Identity of a numbering definition. Paragraphs sharing one belong to the same list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NumId(pub u32);

/// `NumId(0)` on a paragraph explicitly removes inherited numbering.
pub const REMOVED_NUMBERING: NumId = NumId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberFormat {
    None,
    Bullet,
    Decimal,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub format: NumberFormat,
    pub start: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
}

impl LevelDefinition {
    pub fn bullet(glyph: &str) -> Self {
        LevelDefinition {
            format: NumberFormat::Bullet,
            start: 1,
            glyph: Some(glyph.to_string()),
        }
    }

    pub fn ordered(format: NumberFormat, start: u32) -> Self {
        LevelDefinition {
            format,
            start,
            glyph: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingDefinition {
    pub id: NumId,
    pub levels: Vec<LevelDefinition>,
}

/// Reference from a paragraph to a numbering definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    pub num_id: NumId,
    pub level: u8,
}

/// How a paragraph's list membership presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    None,
    Bullet,
    Numbered,
    Lettered,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListInfo {
    pub format: ListFormat,
    pub level: u8,
    pub start: u32,
    pub identity: NumId,
}

pub const MAX_LEVELS: usize = 9;
const BULLET_GLYPHS: [&str; 3] = ["•", "◦", "▪"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberingRegistry {
    definitions: Vec<NumberingDefinition>,
}

impl NumberingRegistry {
    /// Register a definition and return its identity. Ids start at 1.
    pub fn add_definition(&mut self, levels: Vec<LevelDefinition>) -> NumId {
        let id = NumId(self.definitions.len() as u32 + 1);
        self.definitions.push(NumberingDefinition { id, levels });
        id
    }

    /// A definition with a bullet on every level, cycling through the default glyphs.
    pub fn add_bullet(&mut self, glyph: Option<&str>) -> NumId {
        let levels = (0..MAX_LEVELS)
            .map(|level| {
                LevelDefinition::bullet(glyph.unwrap_or(BULLET_GLYPHS[level % BULLET_GLYPHS.len()]))
            })
            .collect();
        self.add_definition(levels)
    }

    /// A decimal definition whose first level starts at `start`.
    pub fn add_ordered(&mut self, start: u32) -> NumId {
        let levels = (0..MAX_LEVELS)
            .map(|level| {
                LevelDefinition::ordered(NumberFormat::Decimal, if level == 0 { start } else { 1 })
            })
            .collect();
        self.add_definition(levels)
    }

    pub fn get(&self, id: NumId) -> Option<&NumberingDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: NumId) -> Option<&mut NumberingDefinition> {
        self.definitions.iter_mut().find(|d| d.id == id)
    }

    pub fn definitions(&self) -> &[NumberingDefinition] {
        &self.definitions
    }

    pub fn level(&self, id: NumId, level: u8) -> Option<&LevelDefinition> {
        self.get(id)?.levels.get(level as usize)
    }

    /// Overwrite one level of an existing definition, growing it if needed.
    pub fn set_level(&mut self, id: NumId, level: u8, definition: LevelDefinition) -> bool {
        let Some(existing) = self.get_mut(id) else {
            return false;
        };
        let index = level as usize;
        while existing.levels.len() <= index {
            existing.levels.push(LevelDefinition::bullet(BULLET_GLYPHS[0]));
        }
        existing.levels[index] = definition;
        true
    }

    /// Classify a paragraph's numbering reference.
    ///
    /// Returns `None` when the reference points at a definition or level that
    /// does not exist.
    pub fn list_info(&self, reference: NumberingRef) -> Option<ListInfo> {
        if reference.num_id == REMOVED_NUMBERING {
            return Some(ListInfo {
                format: ListFormat::Removed,
                level: reference.level,
                start: 1,
                identity: reference.num_id,
            });
        }
        let level = self.level(reference.num_id, reference.level)?;
        let format = match level.format {
            NumberFormat::None => ListFormat::None,
            NumberFormat::Bullet => ListFormat::Bullet,
            NumberFormat::Decimal | NumberFormat::LowerRoman | NumberFormat::UpperRoman => {
                ListFormat::Numbered
            }
            NumberFormat::LowerLetter | NumberFormat::UpperLetter => ListFormat::Lettered,
        };
        Some(ListInfo {
            format,
            level: reference.level,
            start: level.start,
            identity: reference.num_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_are_distinct_and_nonzero() {
        let mut registry = NumberingRegistry::default();
        let a = registry.add_bullet(None);
        let b = registry.add_ordered(3);
        assert_ne!(a, b);
        assert_ne!(a, REMOVED_NUMBERING);
        assert_eq!(registry.level(b, 0).map(|l| l.start), Some(3));
    }

    #[test]
    fn list_info_classifies_formats() {
        let mut registry = NumberingRegistry::default();
        let id = registry.add_definition(vec![
            LevelDefinition::ordered(NumberFormat::LowerLetter, 1),
            LevelDefinition::ordered(NumberFormat::None, 1),
        ]);
        let lettered = registry.list_info(NumberingRef { num_id: id, level: 0 });
        assert_eq!(lettered.map(|i| i.format), Some(ListFormat::Lettered));
        let none = registry.list_info(NumberingRef { num_id: id, level: 1 });
        assert_eq!(none.map(|i| i.format), Some(ListFormat::None));
        assert!(registry.list_info(NumberingRef { num_id: id, level: 5 }).is_none());
        let removed = registry.list_info(NumberingRef {
            num_id: REMOVED_NUMBERING,
            level: 0,
        });
        assert_eq!(removed.map(|i| i.format), Some(ListFormat::Removed));
    }
}
