//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Routes are shown by
//! path and component, pages by id, with files and chunk names as secondary
//! context on indented lines. The output reads as an inventory of the site
//! while still letting users trace entries back to their sources.
//!
//! # Output Format
//!
//! ## Compile
//!
//! ```text
//! Routes
//! 001 /docs → @theme/DocPage
//!     docsMetadata: docs-b5f.json [docs-metadata-docs-b5f-4c1]
//!     002 /docs/hello → @theme/DocItem [exact]
//!         content: docs/hello.md [content-docs-hello-9e0]
//!         sidebar: null
//!
//! Compiled 2 routes
//! ```
//!
//! ## Describe
//!
//! ```text
//! Pages
//! 001 intro
//!     Source: intro.md
//!     Derived: Welcome to the docs. This guide walks through...
//! 002 guides/install
//!     Source: guides/install.md
//!     Front matter: Install the tool and build your first site.
//!
//! Described 2 pages (1 derived, 1 from front matter)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::pipeline::BuildOutput;
use crate::routes::{ResolvedModule, RouteManifest};
use crate::types::PageDescription;

/// Descriptions longer than this are cut in listings.
const DISPLAY_WIDTH: usize = 72;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// One line per module reference.
///
/// ```text
/// content: docs/hello.md [content-docs-hello-9e0]
/// sidebar: null
/// items: 2 items
/// ```
fn module_line(role: &str, module: &ResolvedModule) -> String {
    match module {
        ResolvedModule::Plain { path, chunk } => format!("{role}: {path} [{chunk}]"),
        ResolvedModule::Null => format!("{role}: null"),
        ResolvedModule::Import { path, chunk, .. } => {
            format!("{role}: lazy {path} [{chunk}]")
        }
        ResolvedModule::List { items } => format!("{role}: {}", plural(items.len(), "item")),
    }
}

// ============================================================================
// Compile
// ============================================================================

pub fn format_compile_output(manifest: &RouteManifest) -> Vec<String> {
    let mut lines = vec!["Routes".to_string()];
    let mut index = 0;
    manifest.walk(|entry, depth| {
        index += 1;
        let exact = if entry.exact { " [exact]" } else { "" };
        lines.push(format!(
            "{}{} {} → {}{}",
            indent(depth),
            format_index(index),
            entry.path,
            entry.component,
            exact
        ));
        for (role, module) in &entry.modules {
            lines.push(format!("{}{}", indent(depth + 1), module_line(role, module)));
        }
    });
    lines.push(String::new());
    lines.push(format!("Compiled {}", plural(manifest.len(), "route")));
    lines
}

pub fn print_compile_output(manifest: &RouteManifest) {
    for line in format_compile_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Describe
// ============================================================================

pub fn format_describe_output(descriptions: &[PageDescription]) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, page) in descriptions.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), page.id));
        lines.push(format!("{}Source: {}", indent(1), page.source));
        let label = if page.derived { "Derived" } else { "Front matter" };
        if page.description.is_empty() {
            lines.push(format!("{}{}: (empty)", indent(1), label));
        } else {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                label,
                truncate_desc(&page.description, DISPLAY_WIDTH)
            ));
        }
    }
    let derived = descriptions.iter().filter(|d| d.derived).count();
    lines.push(String::new());
    lines.push(format!(
        "Described {} ({} derived, {} from front matter)",
        plural(descriptions.len(), "page"),
        derived,
        descriptions.len() - derived
    ));
    lines
}

pub fn print_describe_output(descriptions: &[PageDescription]) {
    for line in format_describe_output(descriptions) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(output: &BuildOutput) -> Vec<String> {
    vec![
        format!(
            "{} → {}",
            plural(output.manifest.len(), "route"),
            output.manifest_path.display()
        ),
        format!(
            "{} → {}",
            plural(output.descriptions.len(), "page"),
            output.descriptions_path.display()
        ),
        plural(output.diagnostics.len(), "warning"),
    ]
}

pub fn print_build_output(output: &BuildOutput) {
    for line in format_build_output(output) {
        println!("{}", line);
    }
}
