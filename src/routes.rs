//! Route manifest compilation.
//!
//! Stage 1 of the docpress build. Takes the declarative route tree a site
//! configuration hands us and produces the fully resolved [`RouteManifest`]
//! that renderers and the bundler consume.
//!
//! ## Route Declarations
//!
//! ```json
//! [
//!   {
//!     "path": "/docs",
//!     "component": "@theme/DocPage",
//!     "modules": { "docsMetadata": "docs-b5f.json" },
//!     "routes": [
//!       {
//!         "path": "/docs/hello",
//!         "component": "@theme/DocItem",
//!         "exact": true,
//!         "modules": { "content": "docs/hello.md", "metadata": "docs-hello-da2.json" }
//!       }
//!     ]
//!   }
//! ]
//! ```
//!
//! The same tree can be written in TOML as a top-level `[[routes]]` array.
//!
//! ## Module References
//!
//! Each entry under `modules` is one of four shapes, modelled by [`ModuleReference`]:
//!
//! | Wire shape | Variant | Meaning |
//! |------------|---------|---------|
//! | `"docs/a.md"` | `Plain` | eager content reference |
//! | `null` | `Null` | explicitly no content |
//! | `{"__import": true, "path": ..., "query": {...}}` | `Import` | loaded lazily; `query` is opaque to us |
//! | `[{"content": ..., "metadata": ...}, ...]` | `List` | listing pages, one entry per item |
//!
//! ## Validation
//!
//! Every declaration needs a non-empty `path` and `component`. Validation is
//! fail-fast: the first offending node in depth-first pre-order aborts the whole
//! compilation and no partial manifest is returned. The error message embeds
//! the offending node as compact JSON and is kept byte-compatible with existing
//! tooling that greps build logs for it.
//!
//! Nothing else is enforced here. Duplicate paths are kept as-is; uniqueness
//! is the router's business.

use crate::naming::chunk_name;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type QueryMap = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum RoutesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported route file (expected .json or .toml): {0}")]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A declaration is missing its `path` or `component`.
///
/// `node` is the compact JSON of the offending declaration, children included.
/// `breadcrumb` holds the sibling index at each level from the root sequence
/// down to the node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid routeConfig (Path and component is required) \n{node}")]
pub struct ValidationError {
    pub node: String,
    pub breadcrumb: Vec<usize>,
}

impl ValidationError {
    fn new(declaration: &RouteDeclaration, breadcrumb: &[usize]) -> Self {
        Self {
            node: declaration.to_json(),
            breadcrumb: breadcrumb.to_vec(),
        }
    }

    /// Human-readable location, e.g. `routes[0].routes[2]`.
    pub fn location(&self) -> String {
        self.breadcrumb
            .iter()
            .map(|i| format!("routes[{i}]"))
            .collect::<Vec<_>>()
            .join(".")
    }
}

// ============================================================================
// Input
// ============================================================================

/// One node of the authored route tree.
///
/// A deserialized declaration remembers the node as written (key order,
/// explicit `null`s) so error payloads can reproduce it byte for byte.
/// Declarations built in code serialize from their fields, skipping absent
/// ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteDeclaration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<IndexMap<String, ModuleReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteDeclaration>>,
    #[serde(skip)]
    authored: Option<Value>,
}

impl RouteDeclaration {
    /// Compact JSON of the node: the authored text when it was loaded, the
    /// typed fields otherwise.
    pub fn to_json(&self) -> String {
        let json = match &self.authored {
            Some(authored) => serde_json::to_string(authored),
            None => serde_json::to_string(self),
        };
        json.unwrap_or_else(|_| format!("{self:?}"))
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFields {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    component: Option<String>,
    #[serde(default)]
    exact: Option<bool>,
    #[serde(default)]
    modules: Option<IndexMap<String, ModuleReference>>,
    #[serde(default)]
    routes: Option<Vec<RouteDeclaration>>,
}

impl<'de> Deserialize<'de> for RouteDeclaration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let authored = Value::deserialize(deserializer)?;
        let fields = DeclarationFields::deserialize(&authored).map_err(de::Error::custom)?;
        Ok(RouteDeclaration {
            path: fields.path,
            component: fields.component,
            exact: fields.exact,
            modules: fields.modules,
            routes: fields.routes,
            authored: Some(authored),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModuleReference {
    Plain(String),
    #[default]
    Null,
    Import {
        path: String,
        query: Option<QueryMap>,
    },
    List(Vec<ListItem>),
}

/// One item of a listing module (e.g. a blog feed entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListItem {
    pub content: ModuleReference,
    #[serde(default)]
    pub metadata: ModuleReference,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportMarker {
    #[serde(rename = "__import", default)]
    import: bool,
    path: String,
    #[serde(default)]
    query: Option<QueryMap>,
}

impl Serialize for ModuleReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ModuleReference::Plain(path) => serializer.serialize_str(path),
            ModuleReference::Null => serializer.serialize_unit(),
            ModuleReference::Import { path, query } => {
                let mut map = serializer.serialize_map(Some(2 + usize::from(query.is_some())))?;
                map.serialize_entry("__import", &true)?;
                map.serialize_entry("path", path)?;
                if let Some(query) = query {
                    map.serialize_entry("query", query)?;
                }
                map.end()
            }
            ModuleReference::List(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ModuleReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ModuleReferenceVisitor)
    }
}

struct ModuleReferenceVisitor;

impl<'de> Visitor<'de> for ModuleReferenceVisitor {
    type Value = ModuleReference;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a module path, null, an `__import` object, or a list of items")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ModuleReference::Plain(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(ModuleReference::Plain(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ModuleReference::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ModuleReference::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        ModuleReference::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        let items = Vec::<ListItem>::deserialize(de::value::SeqAccessDeserializer::new(seq))?;
        Ok(ModuleReference::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        let marker = ImportMarker::deserialize(de::value::MapAccessDeserializer::new(map))?;
        if !marker.import {
            return Err(de::Error::custom(
                "module object must be an import marker (`__import: true`)",
            ));
        }
        Ok(ModuleReference::Import {
            path: marker.path,
            query: marker.query,
        })
    }
}

// ============================================================================
// Output
// ============================================================================

/// The compiled route tree plus every route path in pre-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteManifest {
    pub routes: Vec<RouteManifestEntry>,
    /// All paths, parents before children, duplicates kept. Used to decide
    /// which pages to prerender.
    pub paths: Vec<String>,
}

impl RouteManifest {
    /// Total number of entries at every depth.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Visit every entry depth-first, pre-order, with its depth.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a RouteManifestEntry, usize)) {
        for entry in &self.routes {
            entry.walk_at(0, &mut visit);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteManifestEntry {
    pub path: String,
    pub component: String,
    pub exact: bool,
    #[serde(default)]
    pub modules: IndexMap<String, ResolvedModule>,
    #[serde(default)]
    pub routes: Vec<RouteManifestEntry>,
}

impl RouteManifestEntry {
    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a RouteManifestEntry, usize)) {
        visit(self, depth);
        for child in &self.routes {
            child.walk_at(depth + 1, visit);
        }
    }
}

/// A validated module reference with its bundler chunk name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedModule {
    Plain {
        path: String,
        chunk: String,
    },
    Null,
    Import {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<QueryMap>,
        chunk: String,
    },
    List {
        items: Vec<ResolvedItem>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub content: ResolvedModule,
    pub metadata: ResolvedModule,
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile a route tree into a manifest.
///
/// Fails on the first declaration (depth-first, pre-order) lacking a non-empty
/// `path` or `component`.
pub fn compile(declarations: &[RouteDeclaration]) -> Result<RouteManifest, ValidationError> {
    let mut paths = Vec::new();
    let mut breadcrumb = Vec::new();
    let routes = compile_siblings(declarations, &mut breadcrumb, &mut paths)?;
    Ok(RouteManifest { routes, paths })
}

fn compile_siblings(
    declarations: &[RouteDeclaration],
    breadcrumb: &mut Vec<usize>,
    paths: &mut Vec<String>,
) -> Result<Vec<RouteManifestEntry>, ValidationError> {
    let mut entries = Vec::with_capacity(declarations.len());
    for (index, declaration) in declarations.iter().enumerate() {
        breadcrumb.push(index);
        entries.push(compile_node(declaration, breadcrumb, paths)?);
        breadcrumb.pop();
    }
    Ok(entries)
}

fn compile_node(
    declaration: &RouteDeclaration,
    breadcrumb: &mut Vec<usize>,
    paths: &mut Vec<String>,
) -> Result<RouteManifestEntry, ValidationError> {
    let (Some(path), Some(component)) = (
        non_empty(declaration.path.as_deref()),
        non_empty(declaration.component.as_deref()),
    ) else {
        return Err(ValidationError::new(declaration, breadcrumb));
    };
    paths.push(path.to_string());

    let modules = declaration
        .modules
        .iter()
        .flatten()
        .map(|(role, reference)| (role.clone(), resolve_module(reference, role)))
        .collect();

    let routes = match &declaration.routes {
        Some(children) => compile_siblings(children, breadcrumb, paths)?,
        None => Vec::new(),
    };

    Ok(RouteManifestEntry {
        path: path.to_string(),
        component: component.to_string(),
        exact: declaration.exact.unwrap_or(false),
        modules,
        routes,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Normalize one reference. Every variant maps to its resolved twin; list
/// items get roles `<role>-<index>-content` and
/// `<role>-<index>-metadata` so each lands in its own chunk.
fn resolve_module(reference: &ModuleReference, role: &str) -> ResolvedModule {
    match reference {
        ModuleReference::Plain(path) => ResolvedModule::Plain {
            path: path.clone(),
            chunk: chunk_name(path, role),
        },
        ModuleReference::Null => ResolvedModule::Null,
        ModuleReference::Import { path, query } => ResolvedModule::Import {
            path: path.clone(),
            query: query.clone(),
            chunk: chunk_name(path, role),
        },
        ModuleReference::List(items) => ResolvedModule::List {
            items: items
                .iter()
                .enumerate()
                .map(|(index, item)| ResolvedItem {
                    content: resolve_module(&item.content, &format!("{role}-{index}-content")),
                    metadata: resolve_module(&item.metadata, &format!("{role}-{index}-metadata")),
                })
                .collect(),
        },
    }
}

// ============================================================================
// Loading
// ============================================================================

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlRouteFile {
    #[serde(default)]
    routes: Vec<RouteDeclaration>,
}

/// Read route declarations from a `.json` (top-level array) or `.toml`
/// (`[[routes]]` tables) file.
pub fn load_routes(path: &Path) -> Result<Vec<RouteDeclaration>, RoutesError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "json" => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        "toml" => {
            let content = fs::read_to_string(path)?;
            let file: TomlRouteFile = toml::from_str(&content)?;
            Ok(file.routes)
        }
        _ => Err(RoutesError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load and compile in one step.
pub fn compile_file(path: &Path) -> Result<RouteManifest, RoutesError> {
    let declarations = load_routes(path)?;
    Ok(compile(&declarations)?)
}
