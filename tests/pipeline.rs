//! End-to-end tests over the `fixtures/site` project.
//!
//! Each test copies the fixture into a temp directory so it can mutate files
//! without affecting other tests.

use docpress::config;
use docpress::description::{DescriptionOptions, MAX_DESCRIPTION, describe_markdown};
use docpress::diagnostics::Diagnostic;
use docpress::pipeline::{self, BuildError};
use docpress::routes::{self, ResolvedModule, RouteDeclaration, RoutesError};
use docpress::types::PageMetadata;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn build_fixture(root: &Path) -> pipeline::BuildOutput {
    let config = config::load_config(root).unwrap().rooted(root);
    pipeline::build(&config).unwrap()
}

// =========================================================================
// Full build
// =========================================================================

#[test]
fn build_compiles_routes_in_declaration_order() {
    let tmp = setup_fixtures();
    let output = build_fixture(tmp.path());

    assert_eq!(
        output.manifest.paths,
        vec!["/docs", "/docs/intro", "/docs/guides/install", "/blog"]
    );

    let manifest = read_json(&tmp.path().join("build/manifest.json"));
    let docs = &manifest["routes"][0];
    assert_eq!(docs["component"], "@theme/DocPage");
    assert_eq!(docs["exact"], false);
    assert_eq!(docs["routes"][0]["modules"]["sidebar"], json!({"kind": "null"}));
    assert_eq!(docs["routes"][1]["exact"], true);
}

#[test]
fn build_keeps_import_query_verbatim() {
    let tmp = setup_fixtures();
    build_fixture(tmp.path());

    let manifest = read_json(&tmp.path().join("build/manifest.json"));
    let metadata = &manifest["routes"][0]["routes"][1]["modules"]["metadata"];
    assert_eq!(metadata["kind"], "import");
    assert_eq!(metadata["path"], "docs-guides-install.json");
    let keys: Vec<&String> = metadata["query"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["lang", "chunk"]);
}

#[test]
fn build_resolves_list_items_in_order() {
    let tmp = setup_fixtures();
    let output = build_fixture(tmp.path());

    let blog = &output.manifest.routes[1];
    let ResolvedModule::List { items } = &blog.modules["items"] else {
        panic!("items should resolve to a list");
    };
    assert_eq!(items.len(), 2);
    assert!(matches!(
        &items[0].content,
        ResolvedModule::Plain { path, .. } if path == "blog/2018-12-14-hello.md"
    ));
    assert_eq!(items[0].metadata, ResolvedModule::Null);
    assert!(matches!(
        &items[1].metadata,
        ResolvedModule::Plain { path, .. } if path == "blog-again.json"
    ));
}

#[test]
fn build_describes_visible_pages() {
    let tmp = setup_fixtures();
    let output = build_fixture(tmp.path());

    let ids: Vec<&str> = output.descriptions.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["install", "guides/long", "intro"]);

    let install = &output.descriptions[0];
    assert_eq!(install.description, "Install the tool and build your first site.");
    assert!(!install.derived);

    let intro = &output.descriptions[2];
    assert!(intro.derived);
    assert_eq!(
        intro.description,
        "Welcome to the docs. This site explains how routes are compiled into a manifest \
         and how every page gets a short meta description for search engines. Read the"
    );
    assert!(intro.description.chars().count() <= MAX_DESCRIPTION);

    let written = read_json(&tmp.path().join("build/descriptions.json"));
    assert_eq!(written.as_array().unwrap().len(), 3);
    assert_eq!(written[2]["source"], "intro.md");
}

#[test]
fn build_warns_about_long_explicit_description() {
    let tmp = setup_fixtures();
    let output = build_fixture(tmp.path());

    assert_eq!(output.diagnostics.len(), 1);
    let Diagnostic::DescriptionTooLong { source, length, max } = &output.diagnostics[0];
    assert_eq!(source, "guides/long.md");
    assert_eq!(*length, 177);
    assert_eq!(*max, MAX_DESCRIPTION);

    // Kept verbatim despite the warning.
    assert_eq!(output.descriptions[1].description.chars().count(), 177);
}

#[test]
fn build_honors_heading_option() {
    let tmp = setup_fixtures();
    fs::write(
        tmp.path().join("docpress.toml"),
        "[description]\ninclude_headings = true\n",
    )
    .unwrap();
    let output = build_fixture(tmp.path());
    assert!(output.descriptions[2].description.starts_with("Introduction Welcome"));
}

#[test]
fn build_reports_invalid_route_with_location() {
    let tmp = setup_fixtures();
    fs::write(
        tmp.path().join("routes.json"),
        r#"[{"path": "/a", "component": "A", "routes": [{"path": "/a/b"}]}]"#,
    )
    .unwrap();
    let config = config::load_config(tmp.path()).unwrap().rooted(tmp.path());

    let err = pipeline::build(&config).unwrap_err();
    let BuildError::Routes(RoutesError::Validation(validation)) = &err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(
        validation.to_string(),
        "Invalid routeConfig (Path and component is required) \n{\"path\":\"/a/b\"}"
    );
    assert_eq!(validation.breadcrumb, vec![0, 0]);
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn build_reads_toml_routes() {
    let tmp = setup_fixtures();
    fs::write(
        tmp.path().join("routes.toml"),
        r#"
[[routes]]
path = "/"
component = "Home"

[routes.modules]
content = "index.md"
"#,
    )
    .unwrap();
    fs::write(tmp.path().join("docpress.toml"), "routes_file = \"routes.toml\"\n").unwrap();

    let output = build_fixture(tmp.path());
    assert_eq!(output.manifest.paths, vec!["/"]);
}

// =========================================================================
// Documented scenarios
// =========================================================================

#[test]
fn leaf_declaration_compiles_to_identical_entry() {
    let decls: Vec<RouteDeclaration> = serde_json::from_value(json!([
        {"path": "/docs/a", "component": "Doc", "modules": {"content": "a.md"}}
    ]))
    .unwrap();
    let manifest = routes::compile(&decls).unwrap();

    let entry = &manifest.routes[0];
    assert_eq!(entry.path, "/docs/a");
    assert_eq!(entry.component, "Doc");
    assert!(entry.routes.is_empty());
    assert!(matches!(
        &entry.modules["content"],
        ResolvedModule::Plain { path, .. } if path == "a.md"
    ));
}

#[test]
fn missing_path_reports_node_json() {
    let decls: Vec<RouteDeclaration> =
        serde_json::from_value(json!([{"component": "Doc"}])).unwrap();
    let err = routes::compile(&decls).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid routeConfig (Path and component is required) \n{\"component\":\"Doc\"}"
    );
}

#[test]
fn heading_text_is_excluded_by_default() {
    let mut sink = Vec::new();
    let description = describe_markdown(
        &PageMetadata::default(),
        "# Title\nHello world. This is body text.",
        DescriptionOptions::default(),
        &mut sink,
    );
    assert_eq!(description, "Hello world. This is body text.");
    assert!(sink.is_empty());
}

#[test]
fn long_paragraph_is_cut_at_a_word_boundary() {
    let words: Vec<String> = (0..61).map(|i| format!("w{i:03}")).collect();
    let body = words.join(" ");
    assert!(body.len() >= 300);

    let mut sink = Vec::new();
    let description = describe_markdown(
        &PageMetadata::default(),
        &body,
        DescriptionOptions::default(),
        &mut sink,
    );
    assert!(description.chars().count() <= MAX_DESCRIPTION);
    assert!(body.starts_with(&description));
    assert_eq!(body.as_bytes()[description.len()], b' ');
}
