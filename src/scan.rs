//! Content discovery.
//!
//! Walks the content directory and turns every markdown file into a [`Page`]:
//!
//! ```text
//! docs/
//! ├── intro.md                 # id "intro"
//! ├── guides/
//! │   ├── install.md           # id "guides/install"
//! │   └── deploy.md
//! ├── blog/
//! │   └── 2018-12-14-hello.md
//! └── .drafts/                 # hidden: skipped with everything below it
//! ```
//!
//! ## Front Matter
//!
//! A document may start with a YAML block between `---` lines:
//!
//! ```markdown
//! ---
//! id: getting-started
//! title: Getting Started
//! description: Install the tool and build your first site.
//! sidebar_label: Start        # unknown keys are ignored
//! ---
//!
//! # Getting Started
//! ...
//! ```
//!
//! Resolution rules:
//! - **id**: front matter `id`, else the relative path without extension
//! - **title**: front matter `title`, else the first `# ` line, else none
//! - **source**: always the path relative to the content root, `/`-separated
//!
//! Entries are visited in file-name order so output is stable across
//! platforms.

use crate::types::{Page, PageMetadata};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Content directory not found: {0}")]
    MissingRoot(PathBuf),
}

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

pub fn scan(root: &Path) -> Result<Vec<Page>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let mut pages = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            pages.push(read_page(entry.path(), root)?);
        }
    }

    Ok(pages)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    MARKDOWN_EXTENSIONS.contains(&ext.as_str())
}

/// Read one markdown file into a page.
pub fn read_page(path: &Path, root: &Path) -> Result<Page, ScanError> {
    let content = fs::read_to_string(path)?;
    let (front_matter, body) = split_front_matter(&content);

    let mut meta = match front_matter {
        Some(yaml) if !yaml.trim().is_empty() => {
            serde_yaml::from_str::<PageMetadata>(yaml).map_err(|source| {
                ScanError::FrontMatter {
                    path: path.to_path_buf(),
                    source,
                }
            })?
        }
        _ => PageMetadata::default(),
    };

    let rel = relative_source(path, root);
    if meta.id.as_deref().is_none_or(str::is_empty) {
        meta.id = Some(strip_markdown_extension(&rel).to_string());
    }
    if meta.title.is_none() {
        meta.title = first_heading(body);
    }
    meta.source = Some(rel);

    Ok(Page {
        meta,
        body: body.to_string(),
    })
}

/// Split a leading `---` YAML block from the body.
///
/// Returns `(None, content)` when the document has no front matter or the
/// block is never closed.
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, content)
}

fn relative_source(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn strip_markdown_extension(rel: &str) -> &str {
    MARKDOWN_EXTENSIONS
        .iter()
        .find_map(|ext| {
            rel.strip_suffix(ext)
                .and_then(|stem| stem.strip_suffix('.'))
        })
        .unwrap_or(rel)
}

fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .filter(|title| !title.is_empty())
}
