//! Markdown -> rich text

mod extensions;
mod structure;
