//! Markdown block lexer.
//!
//! Turns raw UTF-8 text into the flat, typed block sequence the Blueprint
//! parser consumes. Two phases:
//!
//! 1. **Line classification** ([`classify`]): every source line is scanned
//!    once for its byte span, indentation and structural signatures (header,
//!    rule, fence, list marker, quote, HTML opener).
//! 2. **Block construction** ([`builder`]): a recursive builder walks the
//!    classified lines, tracking the 4-space nesting convention of the
//!    dialect, and emits blocks with balanced begin/end markers.
//!
//! List items come in two shapes. A *tight* item (no blank line inside)
//! carries its text on the closing `ListItemEnd` block, with any nested list
//! emitted before it. A *loose* item carries its text as `Paragraph`/`Code`
//! children and closes with an empty `ListItemEnd`. The section parsers'
//! name-block helper is written against exactly these shapes.

pub mod builder;
pub mod classify;

use crate::blocks::Block;

/// Lexes a source buffer into a balanced block sequence.
pub fn lex(source: &str) -> Vec<Block> {
    builder::BlockBuilder::new(source).build()
}
