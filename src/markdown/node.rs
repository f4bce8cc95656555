//! Token tree produced from a markdown document.
//!
//! Heading text is bracketed rather than nested: a heading appears as a
//! `HeadingOpen` node, a container holding its inline content, then a
//! `HeadingClose` node, all siblings. Walkers track heading depth by counting
//! opens and closes.

/// Token type. Everything the walk does not care about is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    HeadingOpen,
    HeadingClose,
    Text,
    Code,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownNode {
    pub kind: NodeKind,
    pub content: Option<String>,
    pub children: Vec<MarkdownNode>,
}

impl MarkdownNode {
    pub fn text(content: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Text, Some(content.into()))
    }

    pub fn code(content: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Code, Some(content.into()))
    }

    pub fn heading_open() -> Self {
        Self::leaf(NodeKind::HeadingOpen, None)
    }

    pub fn heading_close() -> Self {
        Self::leaf(NodeKind::HeadingClose, None)
    }

    /// A container (paragraph, list, inline run, ...) with children.
    pub fn other(children: Vec<MarkdownNode>) -> Self {
        Self {
            kind: NodeKind::Other,
            content: None,
            children,
        }
    }

    /// `HeadingOpen`, inline container, `HeadingClose`.
    pub fn heading(inline: Vec<MarkdownNode>) -> [MarkdownNode; 3] {
        [
            Self::heading_open(),
            Self::other(inline),
            Self::heading_close(),
        ]
    }

    fn leaf(kind: NodeKind, content: Option<String>) -> Self {
        Self {
            kind,
            content,
            children: Vec::new(),
        }
    }
}
