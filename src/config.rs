//! Project configuration module.
//!
//! Handles loading, validating, and merging `docpress.toml`. Stock defaults
//! are the base layer, the project file overrides only the keys it names, and
//! command-line path overrides sit on top of both.
//!
//! ## Config File Location
//!
//! Place `docpress.toml` in the project root, next to the route file:
//!
//! ```text
//! my-site/
//! ├── docpress.toml            # Project config (overrides stock defaults)
//! ├── routes.json              # Route declarations
//! └── docs/                    # Markdown content
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! routes_file = "routes.json"  # Route declarations (.json or .toml)
//! content_dir = "docs"         # Markdown content root
//! output_dir = "build"         # Where manifest.json and descriptions.json go
//!
//! [description]
//! include_headings = false     # Use heading text when deriving descriptions
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Paths are relative to the project root. Unknown keys are rejected to catch
//! typos early.

use crate::description::DescriptionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project config file looked up in the project root.
pub const CONFIG_FILE: &str = "docpress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `docpress.toml`.
///
/// All fields have defaults. A project file need only specify the values it
/// wants to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Route declaration file, `.json` or `.toml`.
    pub routes_file: PathBuf,
    /// Root directory scanned for markdown pages.
    pub content_dir: PathBuf,
    /// Directory the build writes its JSON artifacts into.
    pub output_dir: PathBuf,
    /// Description extraction settings.
    pub description: DescriptionOptions,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            routes_file: PathBuf::from("routes.json"),
            content_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("build"),
            description: DescriptionOptions::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, path) in [
            ("routes_file", &self.routes_file),
            ("content_dir", &self.content_dir),
            ("output_dir", &self.output_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        let ext = self
            .routes_file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !matches!(ext, "json" | "toml") {
            return Err(ConfigError::Validation(
                "routes_file must end in .json or .toml".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the configured paths against a project root.
    ///
    /// Absolute paths are kept as they are.
    pub fn rooted(mut self, root: &Path) -> Self {
        self.routes_file = root.join(&self.routes_file);
        self.content_dir = root.join(&self.content_dir);
        self.output_dir = root.join(&self.output_dir);
        self
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel description workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Number of description workers for a build: all cores unless
/// `max_processes` asks for fewer.
pub fn worker_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match config.max_processes {
        Some(limit) => limit.min(cores),
        None => cores,
    }
}

/// Path overrides given on the command line.
///
/// Serialized as a TOML table holding only the keys that were set, so it can
/// be merged as the last config layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl PathOverrides {
    /// Resolve relative override paths against `base` (usually the working
    /// directory), so that rooting the merged config leaves them alone.
    pub fn anchored(self, base: &Path) -> Self {
        let anchor = |path: Option<PathBuf>| path.map(|p| base.join(p));
        Self {
            routes_file: anchor(self.routes_file),
            content_dir: anchor(self.content_dir),
            output_dir: anchor(self.output_dir),
        }
    }

    /// The overrides as a config layer.
    pub fn to_layer(&self) -> Result<toml::Value, ConfigError> {
        Ok(toml::Value::try_from(self)?)
    }
}

// =============================================================================
// Config layers
// =============================================================================
//
// A build config is three TOML layers merged in order:
//
//   stock defaults  →  project file  →  command-line path overrides
//
// Each layer names only the keys it changes. The merged table is
// deserialized once, so unknown keys are rejected wherever they appear.

/// The stock defaults as a TOML table, the bottom layer of every config.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BuildConfig::default())?)
}

/// Merge `overlay` onto `base`, key by key through nested tables.
///
/// A table in both layers merges recursively; any other overlay value
/// replaces what the base had. Base keys the overlay does not name survive.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                let merged = match table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a layer. A missing file is no layer at all.
pub fn read_layer(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    read_required_layer(path).map(Some)
}

fn read_required_layer(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge `layers` in order on top of the stock defaults, then deserialize
/// and validate the result.
pub fn resolve_layers(
    layers: impl IntoIterator<Item = toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = layers.into_iter().fold(stock_defaults_value()?, merge_toml);
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `docpress.toml` in the given project root.
///
/// A missing file yields the defaults. Paths are returned as written; see
/// [`BuildConfig::rooted`].
pub fn load_config(root: &Path) -> Result<BuildConfig, ConfigError> {
    resolve_layers(read_layer(&root.join(CONFIG_FILE))?)
}

/// Load config from an explicitly named file, which must exist.
pub fn load_config_file(path: &Path) -> Result<BuildConfig, ConfigError> {
    resolve_layers([read_required_layer(path)?])
}

/// Load the full three-layer config for a build and root its paths.
///
/// With `config_file` set, that file must exist and its directory is the
/// project root; otherwise `docpress.toml` under `root` is used when present.
/// Override paths that are still relative end up relative to the project
/// root; anchor them first (see [`PathOverrides::anchored`]) to keep them
/// relative to somewhere else.
pub fn load_layered(
    root: &Path,
    config_file: Option<&Path>,
    overrides: &PathOverrides,
) -> Result<BuildConfig, ConfigError> {
    let (root, file_layer) = match config_file {
        Some(path) => {
            log::debug!("loading configuration from {}", path.display());
            let dir = path.parent().unwrap_or(root);
            (dir, Some(read_required_layer(path)?))
        }
        None => (root, read_layer(&root.join(CONFIG_FILE))?),
    };
    let layers = file_layer.into_iter().chain([overrides.to_layer()?]);
    Ok(resolve_layers(layers)?.rooted(root))
}

/// Returns a fully-commented stock `docpress.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Docpress Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Paths are relative to the directory holding this file.
# Unknown keys will cause an error.

# Route declarations: a JSON array, or a TOML file with [[routes]] tables.
routes_file = "routes.json"

# Markdown content scanned for page descriptions.
content_dir = "docs"

# Receives manifest.json and descriptions.json.
output_dir = "build"

# ---------------------------------------------------------------------------
# Meta descriptions
# ---------------------------------------------------------------------------
[description]
# Derive descriptions from heading text as well as body text.
include_headings = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel description workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_paths() {
        let config = BuildConfig::default();
        assert_eq!(config.routes_file, PathBuf::from("routes.json"));
        assert_eq!(config.content_dir, PathBuf::from("docs"));
        assert_eq!(config.output_dir, PathBuf::from("build"));
        assert!(!config.description.include_headings);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
content_dir = "site/content"

[description]
include_headings = true
"#;
        let config: BuildConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("site/content"));
        assert!(config.description.include_headings);
        // Defaults preserved
        assert_eq!(config.routes_file, PathBuf::from("routes.json"));
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn rooted_joins_relative_paths() {
        let config = BuildConfig::default().rooted(Path::new("/srv/site"));
        assert_eq!(config.routes_file, PathBuf::from("/srv/site/routes.json"));
        assert_eq!(config.content_dir, PathBuf::from("/srv/site/docs"));
        assert_eq!(config.output_dir, PathBuf::from("/srv/site/build"));
    }

    #[test]
    fn rooted_keeps_absolute_paths() {
        let config = BuildConfig {
            output_dir: PathBuf::from("/tmp/out"),
            ..BuildConfig::default()
        }
        .rooted(Path::new("/srv/site"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
routes_file = "routes.toml"
output_dir = "public"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.routes_file, PathBuf::from("routes.toml"));
        assert_eq!(config.output_dir, PathBuf::from("public"));
        // Unspecified values should be defaults
        assert_eq!(config.content_dir, PathBuf::from("docs"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_file_requires_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_file_reads_named_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "content_dir = \"pages\"\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("pages"));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"output_dir = "build""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"output_dir = "public""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("output_dir").unwrap().as_str(), Some("public"));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[processing]
max_processes = 4

[description]
include_headings = false
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[description]
include_headings = true
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let description = merged.get("description").unwrap();
        assert_eq!(description.get("include_headings").unwrap().as_bool(), Some(true));
        // processing preserved from base
        let processing = merged.get("processing").unwrap();
        assert_eq!(processing.get("max_processes").unwrap().as_integer(), Some(4));
    }

    #[test]
    fn merge_toml_replaces_table_with_scalar() {
        let base: toml::Value = toml::from_str("[processing]\nmax_processes = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("processing = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("processing").unwrap().as_integer(), Some(3));
    }

    // =========================================================================
    // Layering tests
    // =========================================================================

    #[test]
    fn path_overrides_layer_names_only_set_keys() {
        let overrides = PathOverrides {
            output_dir: Some(PathBuf::from("public")),
            ..PathOverrides::default()
        };
        let layer = overrides.to_layer().unwrap();
        let table = layer.as_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["output_dir"].as_str(), Some("public"));
        assert!(PathOverrides::default().to_layer().unwrap().as_table().unwrap().is_empty());
    }

    #[test]
    fn path_overrides_anchor_relative_paths_only() {
        let overrides = PathOverrides {
            routes_file: Some(PathBuf::from("alt/routes.toml")),
            output_dir: Some(PathBuf::from("/tmp/out")),
            ..PathOverrides::default()
        }
        .anchored(Path::new("/work"));
        assert_eq!(overrides.routes_file, Some(PathBuf::from("/work/alt/routes.toml")));
        assert_eq!(overrides.content_dir, None);
        assert_eq!(overrides.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn command_line_layer_wins_over_project_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "content_dir = \"pages\"\noutput_dir = \"public\"\n\n[description]\ninclude_headings = true\n",
        )
        .unwrap();
        let overrides = PathOverrides {
            output_dir: Some(PathBuf::from("/tmp/elsewhere")),
            ..PathOverrides::default()
        };

        let config = load_layered(tmp.path(), None, &overrides).unwrap();
        // stock default
        assert_eq!(config.routes_file, tmp.path().join("routes.json"));
        // project file
        assert_eq!(config.content_dir, tmp.path().join("pages"));
        assert!(config.description.include_headings);
        // command line
        assert_eq!(config.output_dir, PathBuf::from("/tmp/elsewhere"));
    }

    #[test]
    fn named_config_file_roots_paths_at_its_directory() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join("site");
        fs::create_dir_all(&site).unwrap();
        let path = site.join("custom.toml");
        fs::write(&path, "routes_file = \"routes.toml\"\n").unwrap();
        let overrides = PathOverrides {
            content_dir: Some(tmp.path().join("shared-docs")),
            ..PathOverrides::default()
        };

        let config = load_layered(tmp.path(), Some(&path), &overrides).unwrap();
        assert_eq!(config.routes_file, site.join("routes.toml"));
        assert_eq!(config.content_dir, tmp.path().join("shared-docs"));
        assert_eq!(config.output_dir, site.join("build"));
    }

    #[test]
    fn command_line_layer_is_validated() {
        let tmp = TempDir::new().unwrap();
        let overrides = PathOverrides {
            routes_file: Some(PathBuf::from("routes.yaml")),
            ..PathOverrides::default()
        };
        let result = load_layered(tmp.path(), None, &overrides);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn named_config_file_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.toml");
        let result = load_layered(tmp.path(), Some(&missing), &PathOverrides::default());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[description]
include_heading = true
"#;
        let result: Result<BuildConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[theme]
color = "red"
"#;
        let result: Result<BuildConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "content_root = \"docs\"\n").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(BuildConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_empty_path_rejected() {
        let config = BuildConfig {
            content_dir: PathBuf::new(),
            ..BuildConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("content_dir"));
    }

    #[test]
    fn validate_routes_extension() {
        let config = BuildConfig {
            routes_file: PathBuf::from("routes.yaml"),
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_processes_rejected() {
        let config = BuildConfig {
            processing: ProcessingConfig {
                max_processes: Some(0),
            },
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn resolve_layers_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str(r#"output_dir = """#).unwrap();
        let result = resolve_layers([overlay]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let file: toml::Value = toml::from_str(r#"output_dir = "public""#).unwrap();
        let cli: toml::Value = toml::from_str(r#"output_dir = "dist""#).unwrap();
        let config = resolve_layers([file, cli]).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn read_layer_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(read_layer(&tmp.path().join(CONFIG_FILE)).unwrap().is_none());
    }

    // =========================================================================
    // Worker count tests
    // =========================================================================

    #[test]
    fn worker_threads_never_exceed_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(worker_threads(&ProcessingConfig::default()), cores);
        for requested in [1, cores, cores * 4] {
            let processing = ProcessingConfig {
                max_processes: Some(requested),
            };
            assert_eq!(worker_threads(&processing), requested.min(cores));
        }
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: BuildConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[description]"));
        assert!(content.contains("[processing]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("routes_file").is_some());
        assert!(val.get("description").is_some());
        assert!(val.get("processing").is_some());
    }
}
