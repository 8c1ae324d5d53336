//! Error types for conversion operations

use thiserror::Error;

/// Failures that abort a whole conversion.
///
/// These only occur outside the node traversal: the input could not be
/// parsed or the output could not be produced.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Markdown input could not be turned into a tree
    #[error("Parse error: {0}")]
    Parse(String),
    /// The output tree could not be written
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An option value was rejected before conversion started
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Failure while rendering a single node.
///
/// The traversal loop catches these, logs them and moves on to the next
/// sibling.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("malformed numbering: {0}")]
    Numbering(String),
    #[error("table cell ({row}, {col}) out of range")]
    CellOutOfRange { row: usize, col: usize },
    #[error("media unavailable: {0}")]
    Media(String),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}
