//! Build pipeline.
//!
//! Ties the stages together:
//!
//! ```text
//! routes.json ──load──▶ Vec<RouteDeclaration> ──compile──▶ RouteManifest ──▶ manifest.json
//! docs/**.md  ──scan──▶ Vec<Page> ──describe (parallel)──▶ Vec<PageDescription> ──▶ descriptions.json
//! ```
//!
//! Route compilation is fail-fast: the first invalid declaration aborts the
//! build before anything is written. Descriptions never fail; an overlong
//! author-supplied description is reported as a [`Diagnostic`] and kept.
//!
//! ## Parallel Processing
//!
//! Pages are described in parallel using [rayon](https://docs.rs/rayon). Each
//! worker reports into its own buffer, and the buffers are concatenated in
//! page order, so diagnostics come out in the same order on every run.

use crate::config::{self, BuildConfig, ConfigError};
use crate::description::{self, DescriptionOptions};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::routes::{self, RouteManifest, RoutesError};
use crate::scan::{self, ScanError};
use crate::types::{Page, PageDescription};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const DESCRIPTIONS_FILE: &str = "descriptions.json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Routes(#[from] RoutesError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Everything a build produced, for reporting.
#[derive(Debug)]
pub struct BuildOutput {
    pub manifest: RouteManifest,
    pub descriptions: Vec<PageDescription>,
    pub diagnostics: Vec<Diagnostic>,
    pub manifest_path: PathBuf,
    pub descriptions_path: PathBuf,
}

/// Describe every page, in parallel.
///
/// Returns one description per page in input order, plus every diagnostic
/// raised along the way, also in page order.
pub fn describe_pages(
    pages: &[Page],
    options: DescriptionOptions,
) -> (Vec<PageDescription>, Vec<Diagnostic>) {
    let results: Vec<(PageDescription, Vec<Diagnostic>)> = pages
        .par_iter()
        .map(|page| {
            let mut sink = Vec::new();
            let description = describe_page(page, options, &mut sink);
            (description, sink)
        })
        .collect();

    let mut descriptions = Vec::with_capacity(results.len());
    let mut diagnostics = Vec::new();
    for (description, page_diagnostics) in results {
        descriptions.push(description);
        diagnostics.extend(page_diagnostics);
    }
    (descriptions, diagnostics)
}

/// Describe one page, reporting into `sink`.
pub fn describe_page(
    page: &Page,
    options: DescriptionOptions,
    sink: &mut impl DiagnosticSink,
) -> PageDescription {
    let derived = description::explicit_description(&page.meta).is_none();
    let text = description::describe_markdown(&page.meta, &page.body, options, sink);
    PageDescription {
        id: page.meta.id.clone().unwrap_or_default(),
        source: page.meta.source_label().to_string(),
        description: text,
        derived,
    }
}

/// Load and compile the route file.
pub fn compile_routes(routes_file: &Path) -> Result<RouteManifest, RoutesError> {
    let manifest = routes::compile_file(routes_file)?;
    log::debug!(
        "compiled {} routes from {}",
        manifest.len(),
        routes_file.display()
    );
    Ok(manifest)
}

/// Scan the content directory and describe every page found.
pub fn describe_content(
    content_dir: &Path,
    options: DescriptionOptions,
) -> Result<(Vec<PageDescription>, Vec<Diagnostic>), ScanError> {
    let pages = scan::scan(content_dir)?;
    log::debug!("found {} pages in {}", pages.len(), content_dir.display());
    Ok(describe_pages(&pages, options))
}

/// Run the full pipeline and write its artifacts.
///
/// Paths in `config` are used as given; resolve them against the project root
/// first (see [`BuildConfig::rooted`]).
pub fn build(config: &BuildConfig) -> Result<BuildOutput, BuildError> {
    config.validate()?;

    let manifest = compile_routes(&config.routes_file)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config::worker_threads(&config.processing))
        .build()?;
    let (descriptions, diagnostics) =
        pool.install(|| describe_content(&config.content_dir, config.description))?;

    let manifest_path = config.output_dir.join(MANIFEST_FILE);
    write_json(&manifest_path, &manifest)?;
    let descriptions_path = config.output_dir.join(DESCRIPTIONS_FILE);
    write_json(&descriptions_path, &descriptions)?;

    Ok(BuildOutput {
        manifest,
        descriptions,
        diagnostics,
        manifest_path,
        descriptions_path,
    })
}

/// Write `value` as pretty JSON to `path`, creating missing parent
/// directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), BuildError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
