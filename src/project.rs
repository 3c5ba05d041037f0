//! CAP project scanner.
//!
//! Walks a project directory the same way for every analysis:
//!
//! 1. Skip `.git`, `node_modules`, `gen`, `target` and configured excludes.
//! 2. Read `package.json` for the project name and CAP / ORD plugin deps.
//! 3. Regex-scan every `.cds` file for `service` and `entity` definitions
//!    and `@ORD.Extensions` annotations.
//! 4. Validate every file matching `[scan].metadata_globs` as an ORD document.
//!
//! A project without an ORD document is not an error; it produces a
//! suggestion.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::ToolError;
use crate::validator::{validate_metadata, ValidationLevel, ValidationResult};

static SERVICE_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:@[^\n]*\s+)?service\s+([A-Za-z_][\w.]*)")
        .expect("service pattern compiles")
});

static ENTITY_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\bentity\s+([A-Za-z_][\w.]*)").expect("entity pattern compiles")
});

static ORD_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@ORD\.Extensions|@\(\s*ORD\.Extensions").expect("annotation pattern compiles")
});

static ANNOTATE_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"annotate\s+([A-Za-z_][\w.]*)\s+with\s+@(?:\(\s*)?ORD\.Extensions")
        .expect("annotate pattern compiles")
});

const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git/**",
    "**/node_modules/**",
    "**/gen/**",
    "**/target/**",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdsFile {
    pub path: String,
    pub services: Vec<String>,
    pub entities: Vec<String>,
    pub ord_annotations: usize,
    /// Services targeted by an `@ORD.Extensions` annotation in this file.
    pub annotated_services: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFile {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub root: String,
    pub project_name: Option<String>,
    pub is_cap_project: bool,
    pub has_ord_plugin: bool,
    pub cds_files: Vec<CdsFile>,
    pub services: Vec<String>,
    pub annotated_services: Vec<String>,
    pub metadata_files: Vec<MetadataFile>,
    pub files_scanned: usize,
    pub truncated: bool,
    pub suggestions: Vec<String>,
}

/// Analyze the project rooted at `root`.
pub fn analyze_project(root: &Path, config: &ScanConfig) -> Result<ProjectAnalysis> {
    if !root.exists() {
        let message = format!("project path does not exist: {}", root.display());
        return Err(ToolError::invalid(message).into());
    }
    if !root.is_dir() {
        let message = format!("project path is not a directory: {}", root.display());
        return Err(ToolError::invalid(message).into());
    }

    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    excludes.extend(config.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;
    let excluded_dirs = build_globset(&directory_patterns(&excludes))?;
    let metadata_set = build_globset(&config.metadata_globs)?;

    let mut cds_paths: Vec<(PathBuf, String)> = Vec::new();
    let mut metadata_paths: Vec<(PathBuf, String)> = Vec::new();
    let mut files_scanned = 0;
    let mut truncated = false;

    // Excluded directories are pruned, not walked.
    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !excluded_dirs.is_match(relative_path(root, e.path()))
        });
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let rel_str = relative_path(root, path);

        if exclude_set.is_match(&rel_str) {
            continue;
        }

        if files_scanned >= config.max_files {
            truncated = true;
            break;
        }
        files_scanned += 1;

        if rel_str.ends_with(".cds") {
            cds_paths.push((path.to_path_buf(), rel_str.clone()));
        }
        if metadata_set.is_match(&rel_str) {
            metadata_paths.push((path.to_path_buf(), rel_str));
        }
    }

    // Sort for deterministic ordering
    cds_paths.sort_by(|a, b| a.1.cmp(&b.1));
    metadata_paths.sort_by(|a, b| a.1.cmp(&b.1));

    let package = read_package_json(root);
    let project_name = package
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(String::from);
    let has_cds_dep = package.as_ref().map(|p| has_dependency(p, "@sap/cds")).unwrap_or(false);
    let has_ord_plugin = package
        .as_ref()
        .map(|p| has_dependency(p, "@cap-js/ord"))
        .unwrap_or(false);

    let mut cds_files = Vec::new();
    for (path, rel) in &cds_paths {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %rel, error = %e, "skipping unreadable cds file");
                continue;
            }
        };
        cds_files.push(scan_cds(rel, &source));
    }

    let mut services: Vec<String> = Vec::new();
    let mut annotated: HashSet<String> = HashSet::new();
    for file in &cds_files {
        for service in &file.services {
            if !services.contains(service) {
                services.push(service.clone());
            }
        }
        annotated.extend(file.annotated_services.iter().cloned());
    }
    let annotated_services: Vec<String> = services
        .iter()
        .filter(|s| annotated.contains(*s))
        .cloned()
        .collect();

    let metadata_files: Vec<MetadataFile> = metadata_paths
        .iter()
        .map(|(path, rel)| validate_metadata_file(path, rel))
        .collect();

    let is_cap_project = has_cds_dep || !cds_files.is_empty();

    let mut suggestions = Vec::new();
    if metadata_files.is_empty() {
        suggestions.push(
            "No ORD metadata document found; there is no metadata to validate. \
             Generate one with the @cap-js/ord plugin or add an ord.json."
                .to_string(),
        );
    }
    if is_cap_project && !has_ord_plugin {
        suggestions.push(
            "Add the @cap-js/ord plugin to package.json to publish ORD metadata for this CAP project"
                .to_string(),
        );
    }
    for service in &services {
        if !annotated.contains(service) {
            suggestions.push(format!(
                "Service {} has no @ORD.Extensions annotation; use generate_annotations to create one",
                service
            ));
        }
    }

    tracing::info!(
        root = %root.display(),
        files = files_scanned,
        cds = cds_files.len(),
        services = services.len(),
        metadata = metadata_files.len(),
        "project scan complete"
    );

    Ok(ProjectAnalysis {
        root: root.display().to_string(),
        project_name,
        is_cap_project,
        has_ord_plugin,
        cds_files,
        services,
        annotated_services,
        metadata_files,
        files_scanned,
        truncated,
        suggestions,
    })
}

/// Extract services, entities and ORD annotations from one `.cds` source.
pub fn scan_cds(rel_path: &str, source: &str) -> CdsFile {
    let stripped = strip_comments(source);

    let mut annotated = unique_captures(&ANNOTATE_TARGET, &stripped);
    // `@ORD.Extensions` written directly in front of `service X`
    for cap in SERVICE_DEF.captures_iter(&stripped) {
        if ORD_ANNOTATION.is_match(&cap[0]) && !annotated.iter().any(|a| a == &cap[1]) {
            annotated.push(cap[1].to_string());
        }
    }

    CdsFile {
        path: rel_path.to_string(),
        services: unique_captures(&SERVICE_DEF, &stripped),
        entities: unique_captures(&ENTITY_DEF, &stripped),
        ord_annotations: ORD_ANNOTATION.find_iter(&stripped).count(),
        annotated_services: annotated,
    }
}

fn unique_captures(re: &Regex, text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cap in re.captures_iter(text) {
        let name = cap[1].to_string();
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Drop `//` line comments and `/* */` block comments.
fn strip_comments(source: &str) -> String {
    static BLOCK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern compiles"));
    static LINE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)//[^\n]*$").expect("line comment pattern compiles"));
    let without_blocks = BLOCK.replace_all(source, "");
    LINE.replace_all(&without_blocks, "").into_owned()
}

fn validate_metadata_file(path: &Path, rel: &str) -> MetadataFile {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(document) => MetadataFile {
            path: rel.to_string(),
            validation: Some(validate_metadata(&document, ValidationLevel::Standard)),
            parse_error: None,
        },
        Err(e) => {
            tracing::warn!(path = %rel, error = %e, "could not read ORD document");
            MetadataFile {
                path: rel.to_string(),
                validation: None,
                parse_error: Some(e),
            }
        }
    }
}

fn read_package_json(root: &Path) -> Option<Value> {
    let text = std::fs::read_to_string(root.join("package.json")).ok()?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "package.json is not valid JSON");
            None
        }
    }
}

fn has_dependency(package: &Value, name: &str) -> bool {
    ["dependencies", "devDependencies", "peerDependencies"]
        .iter()
        .any(|section| package.get(section).and_then(|d| d.get(name)).is_some())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Directory forms of `dir/**` patterns, so `**/node_modules/**` also
/// matches the `node_modules` directory itself.
fn directory_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .filter_map(|p| p.strip_suffix("/**"))
        .map(String::from)
        .collect()
}

/// `path` relative to `root`, with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CATALOG_CDS: &str = r#"using { sap.capire.bookshop as my } from '../db/schema';

// service Commented { }
service CatalogService @(path: '/catalog') {
    entity Books as projection on my.Books;
    entity Authors as projection on my.Authors;
}

service AdminService {
    entity Orders as projection on my.Orders;
}

annotate CatalogService with @ORD.Extensions: {
    title: 'Catalog'
};
"#;

    fn setup_project(with_ord: bool) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("srv")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("srv/catalog-service.cds"), CATALOG_CDS).unwrap();
        fs::write(
            root.join("node_modules/pkg/ignored.cds"),
            "service IgnoredService {}",
        )
        .unwrap();
        fs::write(
            root.join("package.json"),
            r#"{ "name": "bookshop", "dependencies": { "@sap/cds": "^8" } }"#,
        )
        .unwrap();
        if with_ord {
            fs::write(
                root.join("ord.json"),
                r#"{ "openResourceDiscoveryVersion": "1.9.0", "products": [{ "ordId": "bad" }] }"#,
            )
            .unwrap();
        }
        tmp
    }

    #[test]
    fn test_scan_cds_extracts_definitions() {
        let file = scan_cds("srv/catalog-service.cds", CATALOG_CDS);
        assert_eq!(file.services, vec!["CatalogService", "AdminService"]);
        assert_eq!(file.entities, vec!["Books", "Authors", "Orders"]);
        assert_eq!(file.ord_annotations, 1);
        assert_eq!(file.annotated_services, vec!["CatalogService"]);
    }

    #[test]
    fn test_inline_service_annotation() {
        let file = scan_cds(
            "srv/a.cds",
            "@ORD.Extensions: { title: 'Orders' }\nservice OrderService {}\n",
        );
        assert_eq!(file.services, vec!["OrderService"]);
        assert_eq!(file.annotated_services, vec!["OrderService"]);
    }

    #[test]
    fn test_analyze_without_metadata() {
        let tmp = setup_project(false);
        let analysis = analyze_project(tmp.path(), &ScanConfig::default()).unwrap();
        assert_eq!(analysis.project_name.as_deref(), Some("bookshop"));
        assert!(analysis.is_cap_project);
        assert!(!analysis.has_ord_plugin);
        assert_eq!(analysis.cds_files.len(), 1);
        assert_eq!(analysis.annotated_services, vec!["CatalogService"]);
        assert!(analysis.metadata_files.is_empty());
        assert!(analysis
            .suggestions
            .iter()
            .any(|s| s.contains("no metadata to validate")));
        assert!(analysis
            .suggestions
            .iter()
            .any(|s| s.contains("Service AdminService")));
        assert!(!analysis.services.contains(&"IgnoredService".to_string()));
    }

    #[test]
    fn test_analyze_validates_ord_document() {
        let tmp = setup_project(true);
        let analysis = analyze_project(tmp.path(), &ScanConfig::default()).unwrap();
        assert_eq!(analysis.metadata_files.len(), 1);
        let validation = analysis.metadata_files[0].validation.as_ref().unwrap();
        assert!(!validation.valid);
        assert!(!analysis
            .suggestions
            .iter()
            .any(|s| s.contains("no metadata to validate")));
    }

    #[test]
    fn test_invalid_json_metadata_reports_parse_error() {
        let tmp = setup_project(false);
        fs::write(tmp.path().join("ord.json"), "{ not json").unwrap();
        let analysis = analyze_project(tmp.path(), &ScanConfig::default()).unwrap();
        assert!(analysis.metadata_files[0].parse_error.is_some());
    }

    #[test]
    fn test_missing_path_is_invalid_argument() {
        let err = analyze_project(Path::new("/no/such/project"), &ScanConfig::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_max_files_truncates() {
        let tmp = setup_project(true);
        let config = ScanConfig {
            max_files: 1,
            ..ScanConfig::default()
        };
        let analysis = analyze_project(tmp.path(), &config).unwrap();
        assert!(analysis.truncated);
        assert_eq!(analysis.files_scanned, 1);
    }

    #[test]
    fn test_directory_patterns() {
        let patterns = vec!["**/node_modules/**".to_string(), "**/*.bak".to_string()];
        assert_eq!(directory_patterns(&patterns), vec!["**/node_modules"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_excluded_directories_are_not_walked() {
        let tmp = setup_project(false);
        // Following this link loops; only a walk into node_modules reaches it.
        std::os::unix::fs::symlink(
            tmp.path().join("node_modules"),
            tmp.path().join("node_modules/pkg/loop"),
        )
        .unwrap();
        let config = ScanConfig {
            follow_symlinks: true,
            ..ScanConfig::default()
        };
        let analysis = analyze_project(tmp.path(), &config).unwrap();
        assert_eq!(analysis.files_scanned, 2);
        assert_eq!(analysis.services, vec!["CatalogService", "AdminService"]);
    }
}
