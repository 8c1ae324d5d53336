//! Structured metadata carried alongside documents
//!
//! Unit metadata travels as comment text on level-one headings using the
//! grammar in [`tokens`]. Module metadata lives in custom document properties.

pub mod module;
pub mod tokens;
pub mod unit;

pub use module::ModuleMetadata;
pub use unit::{Choice, Question, Quiz, UnitMetadata};
