use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ord_assist_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ord-assist");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // A CAP project with one annotated and one bare service.
    let project = root.join("bookshop");
    fs::create_dir_all(project.join("srv")).unwrap();
    fs::write(
        project.join("package.json"),
        r#"{ "name": "bookshop", "dependencies": { "@sap/cds": "^8", "@cap-js/ord": "^1" } }"#,
    )
    .unwrap();
    fs::write(
        project.join("srv/cat-service.cds"),
        "service CatalogService {\n    entity Books { key ID : Integer; }\n}\n\nservice AdminService {}\n\nannotate CatalogService with @ORD.Extensions: {\n    title: 'Catalog'\n};\n",
    )
    .unwrap();

    let config_content = r#"[server]
bind = "127.0.0.1:7341"

[spec]
url = "http://127.0.0.1:9/unreachable.md"
timeout_secs = 2

[logging]
level = "warn"
"#;

    let config_path = config_dir.join("ord-assist.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ord_assist(config_path: &Path, args: &[&str]) -> (String, String, Option<i32>) {
    let binary = ord_assist_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ord-assist binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

fn write_example(root: &Path, name: &str, config_path: &Path) -> PathBuf {
    let (stdout, stderr, code) = run_ord_assist(config_path, &["examples", "complete"]);
    assert_eq!(code, Some(0), "examples failed: {}", stderr);
    let path = root.join(name);
    fs::write(&path, stdout).unwrap();
    path
}

#[test]
fn test_explain_is_case_insensitive() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, code) = run_ord_assist(&config_path, &["explain", "consumptionbundle"]);
    assert_eq!(code, Some(0), "explain failed: {}", stderr);
    assert!(stdout.contains("# ORD Concept: ConsumptionBundle"));
    assert!(stdout.contains("## Key Properties"));
    assert!(stdout.contains("```json"));
}

#[test]
fn test_explain_unknown_concept_lists_valid() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, code) = run_ord_assist(&config_path, &["explain", "Widget"]);
    assert_ne!(code, Some(0));
    assert!(stderr.contains("Unknown concept 'Widget'"), "stderr: {}", stderr);
    assert!(stderr.contains("Product"));
}

#[test]
fn test_validate_complete_example_strict() {
    let (tmp, config_path) = setup_test_env();
    let doc = write_example(tmp.path(), "ord.json", &config_path);

    let (stdout, stderr, code) = run_ord_assist(
        &config_path,
        &["validate", doc.to_str().unwrap(), "--strict", "--json"],
    );
    assert_eq!(code, Some(0), "validate failed: {} {}", stdout, stderr);

    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["valid"], true);
    assert_eq!(result["validationLevel"], "strict");
    assert_eq!(result["errors"].as_array().unwrap().len(), 0);
    assert_eq!(result["suggestions"].as_array().unwrap().len(), 0);
}

#[test]
fn test_validate_invalid_document_exits_one() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("broken.json");
    fs::write(
        &doc,
        r#"{ "openResourceDiscoveryVersion": "1.9.0", "products": [{ "ordId": "not-an-id" }] }"#,
    )
    .unwrap();

    let (stdout, _, code) = run_ord_assist(&config_path, &["validate", doc.to_str().unwrap()]);
    assert_eq!(code, Some(1));
    assert!(stdout.contains("INVALID"));
    assert!(stdout.contains("missing required field: title"));
}

#[test]
fn test_validate_missing_version() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("empty.json");
    fs::write(&doc, "{}").unwrap();

    let (stdout, _, code) = run_ord_assist(&config_path, &["validate", doc.to_str().unwrap()]);
    assert_eq!(code, Some(1));
    assert!(stdout.contains("openResourceDiscoveryVersion"));
}

#[test]
fn test_validate_unparseable_file_errors() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("bad.json");
    fs::write(&doc, "{ nope").unwrap();

    let (_, stderr, code) = run_ord_assist(&config_path, &["validate", doc.to_str().unwrap()]);
    assert_ne!(code, Some(0));
    assert!(stderr.contains("Failed to parse JSON"));
}

#[test]
fn test_examples_cap_annotations() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, code) = run_ord_assist(&config_path, &["examples", "cap-annotations"]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("annotate CatalogService with @ORD.Extensions"));
}

#[test]
fn test_examples_unknown_kind() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, code) = run_ord_assist(&config_path, &["examples", "widget"]);
    assert_ne!(code, Some(0));
    assert!(stderr.contains("must be one of"));
}

#[test]
fn test_capabilities_lists_all_tools() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, code) = run_ord_assist(&config_path, &["capabilities"]);
    assert_eq!(code, Some(0), "capabilities failed: {}", stderr);

    let caps: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let tools: Vec<&str> = caps["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tools.len(), 7);
    assert!(tools.contains(&"validate_metadata"));
    assert!(caps["concepts"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("APIResource")));
}

#[test]
fn test_generate_annotations() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, code) = run_ord_assist(
        &config_path,
        &[
            "generate",
            "--service",
            "CatalogService",
            "--namespace",
            "sap.bookshop",
            "--entity",
            "Books",
        ],
    );
    assert_eq!(code, Some(0), "generate failed: {}", stderr);
    assert!(stdout.contains("annotate CatalogService with @ORD.Extensions: {"));
    assert!(stdout.contains("annotate CatalogService.Books with @ODM.entityName: 'Books';"));
}

#[test]
fn test_generate_rejects_bad_namespace() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, code) = run_ord_assist(
        &config_path,
        &["generate", "--service", "CatalogService", "--namespace", "Not Valid"],
    );
    assert_ne!(code, Some(0));
    assert!(stderr.contains("namespace"));
}

#[test]
fn test_analyze_project() {
    let (tmp, config_path) = setup_test_env();
    let project = tmp.path().join("bookshop");

    let (stdout, stderr, code) =
        run_ord_assist(&config_path, &["analyze", project.to_str().unwrap(), "--json"]);
    assert_eq!(code, Some(0), "analyze failed: {}", stderr);

    let analysis: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(analysis["projectName"], "bookshop");
    assert_eq!(analysis["hasOrdPlugin"], true);
    assert_eq!(
        analysis["services"],
        serde_json::json!(["CatalogService", "AdminService"])
    );
    assert_eq!(analysis["annotatedServices"], serde_json::json!(["CatalogService"]));
}

#[test]
fn test_analyze_missing_directory() {
    let (tmp, config_path) = setup_test_env();
    let missing = tmp.path().join("nowhere");

    let (_, stderr, code) = run_ord_assist(&config_path, &["analyze", missing.to_str().unwrap()]);
    assert_ne!(code, Some(0));
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("absent.toml");

    let (stdout, _, code) = run_ord_assist(&config_path, &["explain", "Product"]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("# ORD Concept: Product"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("bad.toml");
    fs::write(&config_path, "[server]\ntransport = \"carrier-pigeon\"\n").unwrap();

    let (_, stderr, code) = run_ord_assist(&config_path, &["capabilities"]);
    assert_ne!(code, Some(0));
    assert!(stderr.contains("Unknown server transport"));
}

#[test]
fn test_completions() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, code) = run_ord_assist(&config_path, &["completions", "bash"]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("ord-assist"));
}
