//! Page-level types shared by the scan, describe, and output stages.
//!
//! These are serialized into `descriptions.json` and must stay stable for the
//! renderers that read it.

use serde::{Deserialize, Serialize};

/// What we know about a page before its description is resolved.
///
/// `id`, `title`, and `description` come from the document's front matter;
/// `path` and `source` are filled in by the scanner. Unknown front matter
/// keys (sidebar labels, tags, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author-supplied description. Wins over the derived one when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Permalink-style path of the page, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Source file, relative to the content root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PageMetadata {
    /// Label used in diagnostics: the first non-empty of path, source, id.
    pub fn source_label(&self) -> &str {
        [&self.path, &self.source, &self.id]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|s| !s.is_empty())
            .unwrap_or("<unknown>")
    }
}

/// A markdown document discovered under the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub meta: PageMetadata,
    /// Markdown body with the front matter removed.
    pub body: String,
}

/// The resolved description of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescription {
    pub id: String,
    pub source: String,
    pub description: String,
    /// True when the text was derived from the body rather than supplied.
    pub derived: bool,
}
