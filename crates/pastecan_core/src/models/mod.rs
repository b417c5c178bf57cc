//! Data models shared across pastecan crates.

/// Paste rows and request/response shapes.
pub mod paste;

pub use paste::{ContentUpdate, CreatedPaste, NewPaste, Paste};
