//! Bidirectional rendering between styled rich-text documents and extended Markdown
//!
//!     Both directions walk a source tree and dispatch every node to a renderer picked from a
//!     registry. The rich-text side is a paragraph list where structure is implied by style
//!     names and numbering references; the Markdown side is a nested tree. Going from rich text
//!     to Markdown rebuilds that nesting with a small cursor threaded from sibling to sibling.
//!     Going back flattens it again.
//!
//!     This is a pure lib. It never prints, reads environment variables or decides where files
//!     go; the CLI does that. Loading and saving the binary word-processor container is outside
//!     this crate: callers hand in a [`richtext::RichDocument`] (serde serializable) and get one
//!     back.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── diagnostics.rs          # Per-conversion log of warnings
//!     ├── registry.rs             # Style and node-kind renderer registries
//!     ├── classify.rs             # Paragraph/run formatting classification
//!     ├── richtext                # Rich-text document model
//!     ├── markdown                # Markdown tree, comrak parser and serializer
//!     ├── metadata                # Unit and module metadata carried in comments
//!     ├── units.rs                # Splitting Markdown into units and back
//!     ├── resolve.rs              # Link and include resolution, media fetching
//!     ├── to_markdown             # Rich text -> Markdown renderers
//!     └── to_richtext             # Markdown -> rich text renderers
//!
//! Testing
//!     tests
//!     └── <area>
//!         ├── <testname>.rs
//!         └── fixtures
//!
//!     Rust does not discover tests in subdirectories by default, so tests/lib.rs mods them in.
//!
//! Failure handling
//!
//!     A node no renderer claims, or a renderer that fails, is logged in the conversion's
//!     [`diagnostics::ConversionLog`] and skipped. Conversion itself only fails when the input
//!     cannot be parsed or the output cannot be written.

pub mod classify;
pub mod diagnostics;
pub mod error;
pub mod markdown;
pub mod metadata;
pub mod registry;
pub mod resolve;
pub mod richtext;
pub mod to_markdown;
pub mod to_richtext;
pub mod units;

pub use diagnostics::{ConversionLog, Severity};
pub use error::{ConvertError, RenderError};
pub use markdown::{parse_markdown, serialize_markdown, MarkdownDocument};
pub use richtext::RichDocument;
pub use to_markdown::{MarkdownOutput, ToMarkdownOptions};
pub use to_richtext::{RichTextOutput, ToRichTextOptions};
