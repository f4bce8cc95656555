//! `pulldown-cmark` adapter.
//!
//! Maps the parser's flat event stream onto [`MarkdownNode`] trees:
//!
//! | Event | Node |
//! |---|---|
//! | heading start/end | `HeadingOpen`, `Other(inline…)`, `HeadingClose` |
//! | text, soft/hard break | `Text` (adjacent runs merged) |
//! | inline HTML, HTML block | `Text` (left for the description cleaner to strip) |
//! | inline code, indented code block text | `Code` |
//! | fenced code block text | `Other` (kept, but not prose) |
//! | image alt text | `Other` inside the image node |
//! | any other container | `Other(children…)` |

use super::node::{MarkdownNode, NodeKind};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};

/// Parse markdown into a token tree.
pub fn parse(markdown: &str) -> Vec<MarkdownNode> {
    let mut builder = TreeBuilder::default();
    for event in Parser::new(markdown) {
        builder.push(event);
    }
    builder.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Heading,
    FencedCode,
    IndentedCode,
    Image,
    Container,
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<MarkdownNode>,
    stack: Vec<(Frame, Vec<MarkdownNode>)>,
}

impl TreeBuilder {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                self.current().push(MarkdownNode::heading_open());
                self.stack.push((Frame::Heading, Vec::new()));
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                self.stack.push((Frame::FencedCode, Vec::new()));
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)) => {
                self.stack.push((Frame::IndentedCode, Vec::new()));
            }
            Event::Start(Tag::Image { .. }) => self.stack.push((Frame::Image, Vec::new())),
            Event::Start(_) => self.stack.push((Frame::Container, Vec::new())),
            Event::End(_) => self.close(),
            Event::Text(text) => match self.frame() {
                Some(Frame::IndentedCode) => {
                    self.current().push(MarkdownNode::code(text.to_string()));
                }
                Some(Frame::FencedCode | Frame::Image) => self.push_opaque(text.to_string()),
                _ => self.push_text(&text),
            },
            Event::Code(code) if self.frame() == Some(Frame::Image) => {
                self.push_opaque(code.to_string());
            }
            Event::Code(code) => self.current().push(MarkdownNode::code(code.to_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            Event::SoftBreak | Event::HardBreak => self.push_text("\n"),
            _ => self.current().push(MarkdownNode::other(Vec::new())),
        }
    }

    fn close(&mut self) {
        let Some((frame, children)) = self.stack.pop() else {
            return;
        };
        self.current().push(MarkdownNode::other(children));
        if frame == Frame::Heading {
            self.current().push(MarkdownNode::heading_close());
        }
    }

    /// Append text, merging with a directly preceding text node so that a
    /// sentence the parser split into several events stays one chunk.
    fn push_text(&mut self, text: &str) {
        let current = self.current();
        if let Some(MarkdownNode {
            kind: NodeKind::Text,
            content: Some(previous),
            ..
        }) = current.last_mut()
        {
            previous.push_str(text);
        } else {
            current.push(MarkdownNode::text(text));
        }
    }

    /// Keep text that is not prose, such as fenced code or image alt text.
    fn push_opaque(&mut self, content: String) {
        self.current().push(MarkdownNode {
            kind: NodeKind::Other,
            content: Some(content),
            children: Vec::new(),
        });
    }

    fn frame(&self) -> Option<Frame> {
        self.stack.last().map(|(frame, _)| *frame)
    }

    fn current(&mut self) -> &mut Vec<MarkdownNode> {
        match self.stack.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn finish(mut self) -> Vec<MarkdownNode> {
        while !self.stack.is_empty() {
            self.close();
        }
        self.root
    }
}
