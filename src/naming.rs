//! Bundler chunk names for module references.
//!
//! Every eager or lazy module reference in the route manifest carries a chunk
//! name the bundler uses to code-split that module into its own file. Names are
//! derived purely from the module role and the reference path, so the same
//! reference always lands in the same chunk across builds:
//!
//! ```text
//! role "content",  path "docs/hello.md"        → content-docs-hello-<hash>
//! role "metadata", path "docs-hello-da2.json"  → metadata-docs-hello-da2-<hash>
//! role "items",    path "/"                    → items-index-<hash>
//! ```
//!
//! `<hash>` is the first three hex digits of the SHA-256 of the reference path.
//! It keeps two references that kebab-case to the same text (`a_b.md`, `a-b.md`)
//! from colliding.

use sha2::{Digest, Sha256};

const SHORT_HASH_LEN: usize = 3;

/// Chunk name for a module reference under a given role.
pub fn chunk_name(reference_path: &str, role: &str) -> String {
    let mut stem = kebab_case(strip_extension(reference_path));
    if stem.is_empty() {
        stem = "index".to_string();
    }
    let role = kebab_case(role);
    let hash = short_hash(reference_path);
    if role.is_empty() {
        format!("{stem}-{hash}")
    } else {
        format!("{role}-{stem}-{hash}")
    }
}

/// Lowercase ASCII alphanumerics; every other run of characters becomes one dash.
///
/// - `"Docs/Hello World.md"` → `"docs-hello-world-md"`
/// - `"--a__b--"` → `"a-b"`
pub fn kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Drop a trailing `.ext` from the last path segment, if any.
fn strip_extension(path: &str) -> &str {
    let segment_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[segment_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..segment_start + dot],
    }
}

fn short_hash(input: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(input.as_bytes()));
    digest[..SHORT_HASH_LEN].to_string()
}
