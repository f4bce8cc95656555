//! Early-exit traversal over prose chunks.
//!
//! [`TextChunks::walk`] visits the token tree depth-first, pre-order, and hands
//! the content of every `Text` and `Code` node to a callback. Text between a
//! `HeadingOpen` and its `HeadingClose` is skipped unless `include_headings`
//! is set.
//!
//! The callback decides when to stop: returning `ControlFlow::Break(())`
//! unwinds every enclosing frame immediately, however deep the current node
//! is, and `walk` returns `Break` to its caller. Consumers that only want a
//! prefix of the document (a meta description, a search snippet) never pay
//! for scanning the rest.

use super::node::{MarkdownNode, NodeKind};
use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextChunks {
    pub include_headings: bool,
}

impl TextChunks {
    pub fn new(include_headings: bool) -> Self {
        Self { include_headings }
    }

    /// Walk `nodes`, calling `visit` with each collected chunk.
    ///
    /// Returns `Break` if the callback stopped the walk, `Continue` if the
    /// document ran out first.
    pub fn walk<F>(&self, nodes: &[MarkdownNode], mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let mut heading_depth = 0usize;
        self.walk_nodes(nodes, &mut heading_depth, &mut visit)
    }

    fn walk_nodes<F>(
        &self,
        nodes: &[MarkdownNode],
        heading_depth: &mut usize,
        visit: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        for node in nodes {
            match node.kind {
                NodeKind::HeadingOpen => *heading_depth += 1,
                NodeKind::HeadingClose => *heading_depth = heading_depth.saturating_sub(1),
                NodeKind::Text | NodeKind::Code => {
                    if (self.include_headings || *heading_depth == 0)
                        && let Some(content) = &node.content
                    {
                        visit(content)?;
                    }
                }
                NodeKind::Other => {}
            }
            self.walk_nodes(&node.children, heading_depth, visit)?;
        }
        ControlFlow::Continue(())
    }
}
