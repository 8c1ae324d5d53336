//! Shared configuration loader for the docmark toolchain.
//!
//! `defaults/docmark.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DocmarkConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use docmark_render::classify::MonospaceFonts;
use docmark_render::to_markdown::{LetteredListPolicy, SmallCapsPolicy};
use docmark_render::{ToMarkdownOptions, ToRichTextOptions};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/docmark.default.toml");

/// Top-level configuration consumed by docmark applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocmarkConfig {
    pub classifier: ClassifierConfig,
    pub markdown: MarkdownConfig,
    pub richtext: RichTextConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub monospace_fonts: Vec<String>,
}

impl From<&ClassifierConfig> for MonospaceFonts {
    fn from(config: &ClassifierConfig) -> Self {
        MonospaceFonts::new(&config.monospace_fonts)
    }
}

/// Knobs for rich text to Markdown.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub media_folder: String,
    pub lettered_lists: LetteredLists,
    pub small_caps: SmallCaps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetteredLists {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmallCaps {
    Kbd,
    Plain,
}

impl From<&MarkdownConfig> for ToMarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        ToMarkdownOptions {
            media_folder: config.media_folder.clone(),
            lettered_lists: match config.lettered_lists {
                LetteredLists::Bullet => LetteredListPolicy::Bullet,
                LetteredLists::Ordered => LetteredListPolicy::Ordered,
            },
            small_caps: match config.small_caps {
                SmallCaps::Kbd => SmallCapsPolicy::Kbd,
                SmallCaps::Plain => SmallCapsPolicy::Plain,
            },
            ..ToMarkdownOptions::default()
        }
    }
}

/// Knobs for Markdown to rich text.
#[derive(Debug, Clone, Deserialize)]
pub struct RichTextConfig {
    pub max_image_width: u32,
    pub video_width: u32,
    pub video_height: u32,
    pub code_font: String,
    pub allow_network: bool,
}

impl From<&RichTextConfig> for ToRichTextOptions {
    fn from(config: &RichTextConfig) -> Self {
        ToRichTextOptions {
            max_image_width: config.max_image_width,
            video_width: config.video_width,
            video_height: config.video_height,
            code_font: config.code_font.clone(),
            allow_network: config.allow_network,
            base_dir: None,
        }
    }
}

impl DocmarkConfig {
    /// Markdown options with the configured monospace fonts applied.
    pub fn markdown_options(&self) -> ToMarkdownOptions {
        ToMarkdownOptions {
            monospace_fonts: (&self.classifier).into(),
            ..ToMarkdownOptions::from(&self.markdown)
        }
    }

    pub fn richtext_options(&self) -> ToRichTextOptions {
        (&self.richtext).into()
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DocmarkConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DocmarkConfig, ConfigError> {
    Loader::new().build()
}
