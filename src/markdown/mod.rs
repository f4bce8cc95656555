//! Markdown token trees and the shared early-exit text walk.
//!
//! | Piece | Role |
//! |---|---|
//! | [`MarkdownNode`] | typed token tree (headings, text, code, everything else) |
//! | [`parse`] | `pulldown-cmark` events → token tree |
//! | [`TextChunks`] | depth-first walk yielding prose chunks, stoppable from the callback |
//!
//! The description extractor is the main consumer, but anything that needs
//! "the first N characters of body text" should go through [`TextChunks`]
//! rather than re-implementing the heading bookkeeping.

mod node;
mod parser;
pub mod walk;

pub use node::{MarkdownNode, NodeKind};
pub use parser::parse;
pub use walk::TextChunks;
