//! Per-unit metadata carried on level-one headings

use super::tokens;
use crate::markdown::{plain_text, Block, Inline, List, ListItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMetadata {
    pub title: String,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactivity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
}

impl UnitMetadata {
    pub fn titled(title: &str) -> Self {
        UnitMetadata {
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// True when nothing beyond the title is set.
    pub fn is_plain(&self) -> bool {
        !self.sandbox
            && self.lab_id.is_none()
            && self.interactivity.is_none()
            && self.notebook.is_none()
            && self.quiz.is_none()
    }

    /// Comment text attached to the unit heading.
    pub fn to_comment_text(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = vec![("title", self.title.as_str())];
        if self.sandbox {
            pairs.push(("sandbox", "true"));
        }
        if let Some(lab) = &self.lab_id {
            pairs.push(("labId", lab.as_str()));
        }
        if let Some(kind) = &self.interactivity {
            pairs.push(("interactivity", kind.as_str()));
        }
        if let Some(notebook) = &self.notebook {
            pairs.push(("notebook", notebook.as_str()));
        }
        if self.quiz.is_some() {
            pairs.push(("quiz", "true"));
        }
        tokens::encode(&pairs)
    }

    /// Parse comment text. Returns `None` when no known key is present.
    ///
    /// A `quiz:true` token yields an empty [`Quiz`]; its questions live in
    /// the unit body and are filled in when units are split.
    pub fn from_comment_text(text: &str) -> Option<UnitMetadata> {
        let mut metadata = UnitMetadata::default();
        let mut recognised = false;
        for (key, value) in tokens::decode(text) {
            recognised = true;
            match key.as_str() {
                "title" => metadata.title = value,
                "sandbox" => metadata.sandbox = value == "true",
                "labId" => metadata.lab_id = Some(value),
                "interactivity" => metadata.interactivity = Some(value),
                "notebook" => metadata.notebook = Some(value),
                "quiz" if value == "true" => metadata.quiz = Some(Quiz::default()),
                other => {
                    log::debug!("ignoring unit metadata key '{other}'");
                }
            }
        }
        recognised.then_some(metadata)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub content: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub content: String,
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Quiz {
    /// Read questions from the first list in `blocks`.
    ///
    /// Each item's first paragraph is the question; a nested task list holds
    /// the choices, checked for correct ones, with an optional explanation
    /// paragraph under each choice.
    pub fn from_blocks(blocks: &[Block]) -> Quiz {
        let Some(list) = blocks.iter().find_map(|b| match b {
            Block::List(list) => Some(list),
            _ => None,
        }) else {
            return Quiz::default();
        };
        let questions = list
            .items
            .iter()
            .map(|item| {
                let content = item
                    .children
                    .iter()
                    .find_map(paragraph_text)
                    .unwrap_or_default();
                let choices = item
                    .children
                    .iter()
                    .find_map(|b| match b {
                        Block::List(choices) => Some(choices),
                        _ => None,
                    })
                    .map(|choices| choices.items.iter().map(choice_from_item).collect())
                    .unwrap_or_default();
                Question { content, choices }
            })
            .collect();
        Quiz { questions }
    }

    pub fn to_blocks(&self) -> Vec<Block> {
        let items = self
            .questions
            .iter()
            .map(|question| {
                let choices = question
                    .choices
                    .iter()
                    .map(|choice| {
                        let mut children = vec![Block::paragraph(vec![
                            Inline::TaskMarker {
                                checked: choice.correct,
                            },
                            Inline::text(&choice.content),
                        ])];
                        if let Some(explanation) = &choice.explanation {
                            children.push(Block::text_paragraph(explanation));
                        }
                        ListItem::new(children)
                    })
                    .collect();
                ListItem::new(vec![
                    Block::text_paragraph(&question.content),
                    Block::List(List {
                        tight: false,
                        ..List::bullet(choices)
                    }),
                ])
            })
            .collect();
        vec![Block::List(List {
            tight: false,
            ..List::ordered(1, items)
        })]
    }
}

fn paragraph_text(block: &Block) -> Option<String> {
    match block {
        Block::Paragraph { content } => Some(plain_text(content).trim().to_string()),
        _ => None,
    }
}

fn choice_from_item(item: &ListItem) -> Choice {
    let correct = item.task().unwrap_or(false);
    let mut paragraphs = item.children.iter().filter_map(paragraph_text);
    Choice {
        content: paragraphs.next().unwrap_or_default(),
        correct,
        explanation: paragraphs.next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{parse_markdown, serialize_markdown, MarkdownDocument};

    #[test]
    fn comment_text_round_trips() {
        let metadata = UnitMetadata {
            title: "Exercise - deploy".to_string(),
            sandbox: true,
            lab_id: Some("42".to_string()),
            interactivity: Some("bash".to_string()),
            notebook: Some("https://example.com/n.ipynb".to_string()),
            quiz: None,
        };
        let text = metadata.to_comment_text();
        assert_eq!(UnitMetadata::from_comment_text(&text), Some(metadata));
    }

    #[test]
    fn comment_text_format_is_stable() {
        let metadata = UnitMetadata {
            title: "Knowledge check".to_string(),
            quiz: Some(Quiz::default()),
            ..Default::default()
        };
        insta::assert_snapshot!(metadata.to_comment_text(), @r#"title:"Knowledge check" quiz:true"#);
    }

    #[test]
    fn free_text_comment_is_not_metadata() {
        assert_eq!(UnitMetadata::from_comment_text("please review"), None);
    }

    #[test]
    fn quiz_survives_markdown() {
        let quiz = Quiz {
            questions: vec![Question {
                content: "Which is a color?".to_string(),
                choices: vec![
                    Choice {
                        content: "Blue".to_string(),
                        correct: true,
                        explanation: Some("Blue is a color.".to_string()),
                    },
                    Choice {
                        content: "Seven".to_string(),
                        correct: false,
                        explanation: None,
                    },
                ],
            }],
        };
        let md = serialize_markdown(&MarkdownDocument {
            front_matter: None,
            blocks: quiz.to_blocks(),
        })
        .unwrap();
        let parsed = parse_markdown(&md).unwrap();
        assert_eq!(Quiz::from_blocks(&parsed.blocks), quiz);
    }
}
