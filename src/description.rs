//! Meta descriptions for pages.
//!
//! Every page gets a short plain-text summary for its `<meta name="description">`
//! tag. An author-supplied description (front matter `description:`) always
//! wins, even when it is too long; the overrun is reported through the
//! [`DiagnosticSink`] and the build carries on.
//!
//! Without one, the summary is derived from the body:
//!
//! 1. Walk the document's prose chunks ([`TextChunks`]), skipping heading text
//!    unless [`DescriptionOptions::include_headings`] is set.
//! 2. Clean each chunk: drop HTML comments, HTML tags, and double quotes (not
//!    legal inside the attribute), collapse whitespace, trim.
//! 3. Append with a single space separator. Stop the walk as soon as the
//!    accumulated text reaches [`MAX_DESCRIPTION`] characters.
//! 4. If the result overshoots, cut it at the last space at or before the limit.
//!    No ellipsis is added and no word is ever split.
//!
//! Short documents simply produce short descriptions.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::markdown::{self, MarkdownNode, TextChunks};
use crate::types::PageMetadata;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::sync::LazyLock;

/// Maximum length of a meta description, in characters.
pub const MAX_DESCRIPTION: usize = 160;

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[a-z/][^>]*>").expect("valid tag pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptionOptions {
    /// Collect text inside headings too.
    pub include_headings: bool,
}

/// Resolve a page's description from its metadata and parsed body.
pub fn extract(
    meta: &PageMetadata,
    document: &[MarkdownNode],
    options: DescriptionOptions,
    sink: &mut impl DiagnosticSink,
) -> String {
    if let Some(explicit) = explicit_description(meta) {
        let length = explicit.chars().count();
        if length > MAX_DESCRIPTION {
            sink.report(Diagnostic::DescriptionTooLong {
                source: meta.source_label().to_string(),
                length,
                max: MAX_DESCRIPTION,
            });
        }
        return explicit.to_string();
    }
    derive(document, options)
}

/// [`extract`] on raw markdown.
pub fn describe_markdown(
    meta: &PageMetadata,
    markdown: &str,
    options: DescriptionOptions,
    sink: &mut impl DiagnosticSink,
) -> String {
    if explicit_description(meta).is_some() {
        return extract(meta, &[], options, sink);
    }
    extract(meta, &markdown::parse(markdown), options, sink)
}

pub(crate) fn explicit_description(meta: &PageMetadata) -> Option<&str> {
    meta.description.as_deref().filter(|d| !d.is_empty())
}

/// Derive a description from body text alone.
pub fn derive(document: &[MarkdownNode], options: DescriptionOptions) -> String {
    let mut description = String::new();
    let mut length = 0usize;

    let _ = TextChunks::new(options.include_headings).walk(document, |chunk| {
        let cleaned = clean_chunk(chunk);
        if !cleaned.is_empty() {
            if !description.is_empty() {
                description.push(' ');
                length += 1;
            }
            length += cleaned.chars().count();
            description.push_str(&cleaned);
        }
        if length < MAX_DESCRIPTION {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    });

    truncate_at_word(&description, MAX_DESCRIPTION).to_string()
}

/// Strip markup and normalize whitespace in one chunk of text.
pub fn clean_chunk(chunk: &str) -> String {
    let text = HTML_COMMENT.replace_all(chunk, "");
    let text = HTML_TAG.replace_all(&text, "");
    let text = text.replace('"', "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Cut `text` to at most `max` characters at the last space at or before
/// `max`. Text already within the limit is returned whole; overlong text with
/// no space in range yields an empty string.
pub fn truncate_at_word(text: &str, max: usize) -> &str {
    if text.chars().count() <= max {
        return text;
    }
    let cut = text
        .char_indices()
        .take(max + 1)
        .filter(|&(_, c)| c == ' ')
        .last()
        .map(|(byte, _)| byte)
        .unwrap_or(0);
    &text[..cut]
}
