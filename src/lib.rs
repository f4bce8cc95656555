//! # Docpress
//!
//! Build-time helpers for a documentation site generator: a route manifest
//! compiler and a markdown meta-description extractor, driven from a single
//! project config.
//!
//! # Architecture: Two Independent Stages
//!
//! The build runs two transforms that share nothing but the config, each
//! producing a JSON artifact that renderers and the bundler consume:
//!
//! ```text
//! 1. Compile   routes.json  →  manifest.json      (declarations → validated route tree)
//! 2. Describe  docs/**.md   →  descriptions.json  (markdown → ≤160 char meta descriptions)
//! ```
//!
//! Both are pure functions at their core. [`routes::compile`] maps a slice of
//! declarations to a manifest or a [`routes::ValidationError`];
//! [`description::extract`] maps page metadata plus a parsed token tree to a
//! string, reporting warnings into an injected [`diagnostics::DiagnosticSink`].
//! The filesystem is touched only by [`scan`], [`config`], and [`pipeline`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`routes`] | Stage 1: route declarations, validation, and manifest compilation |
//! | [`naming`] | Stable bundler chunk names for module references |
//! | [`markdown`] | Token tree, `pulldown-cmark` adapter, and the early-exit text walker |
//! | [`description`] | Stage 2: meta description resolution, cleaning, and truncation |
//! | [`diagnostics`] | Warning values and the sinks that receive them |
//! | [`scan`] | Walks the content directory, parses front matter into pages |
//! | [`pipeline`] | Runs both stages and writes the artifacts |
//! | [`config`] | `docpress.toml` loading, validation, and merging |
//! | [`types`] | Page types shared between scan, describe, and output |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fail-Fast Route Validation
//!
//! The first declaration missing a `path` or `component` aborts compilation.
//! The error carries the offending node as JSON plus its index path from the
//! root, so a CLI can point at `routes[0].routes[2]` while the message text
//! stays exactly what log scrapers already look for.
//!
//! ## Diagnostics Are Values
//!
//! The extractor never logs on its own. It reports into whatever sink the
//! caller hands it: the CLI forwards to [`log`], the parallel build collects
//! into a `Vec` per page and merges them in page order, and tests assert on
//! the collected values directly.
//!
//! ## One Walker, Early Exit
//!
//! Every consumer of markdown text goes through [`markdown::TextChunks`]. Its
//! callback returns [`std::ops::ControlFlow`], and a `Break` unwinds the whole
//! traversal at once, so a description stops reading the document as soon as
//! it has 160 characters.

pub mod config;
pub mod description;
pub mod diagnostics;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod routes;
pub mod scan;
pub mod types;
