//! CDS annotation generator.
//!
//! Turns a short service description into an `@ORD.Extensions` annotation
//! block for a CAP service, one `@ODM.entityName` annotation per entity, and
//! the `apiResources` record the ORD plugin would publish for it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Write;

use crate::error::ToolError;
use crate::validator::schema::{API_PROTOCOLS, MAX_TEXT_LEN, RELEASE_STATUSES, VISIBILITIES};

static CDS_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("CDS identifier pattern compiles")
});

static ORD_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:\.[a-z0-9]+)*$").expect("namespace pattern compiles")
});

static VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\d+\.\d+$").expect("version pattern compiles"));

/// Input for [`generate_annotations`]; mirrors the tool parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescription {
    pub service_name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default = "default_release_status")]
    pub release_status: String,
    #[serde(default = "default_api_protocol")]
    pub api_protocol: String,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub industry: Vec<String>,
    #[serde(default)]
    pub line_of_business: Vec<String>,
}

fn default_namespace() -> String {
    "customer".to_string()
}
fn default_version() -> String {
    "1.0.0".to_string()
}
fn default_visibility() -> String {
    "public".to_string()
}
fn default_release_status() -> String {
    "active".to_string()
}
fn default_api_protocol() -> String {
    "odata-v4".to_string()
}

impl ServiceDescription {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            namespace: default_namespace(),
            title: None,
            short_description: None,
            description: None,
            version: default_version(),
            visibility: default_visibility(),
            release_status: default_release_status(),
            api_protocol: default_api_protocol(),
            entities: Vec::new(),
            industry: Vec::new(),
            line_of_business: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAnnotations {
    /// CDS source to paste into (or next to) the service definition.
    pub cds: String,
    /// The `apiResources` entry matching the annotations.
    pub api_resource: Value,
    pub notes: Vec<String>,
}

/// Build annotations for `desc`.
pub fn generate_annotations(desc: &ServiceDescription) -> Result<GeneratedAnnotations, ToolError> {
    let service = desc.service_name.trim();
    if service.is_empty() {
        return Err(ToolError::invalid("serviceName must not be empty"));
    }
    if !CDS_IDENTIFIER.is_match(service) {
        return Err(ToolError::invalid(format!(
            "serviceName '{}' is not a valid CDS identifier",
            service
        )));
    }
    if !ORD_NAMESPACE.is_match(&desc.namespace) {
        return Err(ToolError::invalid(format!(
            "namespace '{}' must be lowercase alphanumeric segments separated by dots",
            desc.namespace
        )));
    }
    let major = VERSION
        .captures(&desc.version)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ToolError::invalid(format!(
                "version '{}' must be a semantic version like 1.0.0",
                desc.version
            ))
        })?;
    check_choice("visibility", &desc.visibility, VISIBILITIES)?;
    check_choice("releaseStatus", &desc.release_status, RELEASE_STATUSES)?;
    check_choice("apiProtocol", &desc.api_protocol, API_PROTOCOLS)?;
    for entity in &desc.entities {
        if !CDS_IDENTIFIER.is_match(entity) {
            return Err(ToolError::invalid(format!(
                "entity '{}' is not a valid CDS identifier",
                entity
            )));
        }
    }

    // `my.pkg.CatalogService` -> `CatalogService`
    let local_name = service.rsplit('.').next().unwrap_or(service);
    let title = desc
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| humanize(local_name));
    check_length("title", &title)?;
    let short_description = match desc
        .short_description
        .clone()
        .filter(|t| !t.trim().is_empty())
    {
        Some(text) => {
            check_length("shortDescription", &text)?;
            text
        }
        None => derived_summary(&title),
    };

    let mut notes = Vec::new();
    if desc.short_description.is_none() {
        notes.push(
            "shortDescription was derived from the title; replace it with a real summary"
                .to_string(),
        );
    }
    if desc.description.is_none() {
        notes.push("Add a description to improve the strict validation score".to_string());
    }
    if desc.entities.is_empty() {
        notes.push("No entities given; no @ODM.entityName annotations were generated".to_string());
    }

    let cds = render_cds(service, desc, &title, &short_description);

    let ord_id = format!("{}:apiResource:{}:v{}", desc.namespace, local_name, major);
    let entry_url = format!("/{}/{}", entry_prefix(&desc.api_protocol), kebab(local_name));
    let mut api_resource = json!({
        "ordId": ord_id,
        "title": title,
        "shortDescription": short_description,
        "version": desc.version,
        "visibility": desc.visibility,
        "releaseStatus": desc.release_status,
        "apiProtocol": desc.api_protocol,
        "entryPoints": [
            { "type": desc.api_protocol, "url": entry_url }
        ],
    });
    if let Some(text) = &desc.description {
        api_resource["description"] = json!(text);
    }
    if let Some((kind, media_type, suffix)) = definition_for(&desc.api_protocol) {
        api_resource["resourceDefinitions"] = json!([{
            "type": kind,
            "mediaType": media_type,
            "url": format!("/ord/v1/{}/{}.{}", ord_id, local_name, suffix),
        }]);
    }
    if !desc.industry.is_empty() {
        api_resource["industry"] = json!(desc.industry);
    }
    if !desc.line_of_business.is_empty() {
        api_resource["lineOfBusiness"] = json!(desc.line_of_business);
    }

    tracing::debug!(service = %service, ord_id = %ord_id, "generated annotations");

    Ok(GeneratedAnnotations {
        cds,
        api_resource,
        notes,
    })
}

fn render_cds(
    service: &str,
    desc: &ServiceDescription,
    title: &str,
    short_description: &str,
) -> String {
    let mut fields: Vec<(&str, String)> = vec![
        ("title", cds_string(title)),
        ("shortDescription", cds_string(short_description)),
    ];
    if let Some(text) = &desc.description {
        fields.push(("description", cds_string(text)));
    }
    fields.push(("version", cds_string(&desc.version)));
    fields.push(("visibility", cds_string(&desc.visibility)));
    fields.push(("releaseStatus", cds_string(&desc.release_status)));
    if !desc.industry.is_empty() {
        fields.push(("industry", cds_list(&desc.industry)));
    }
    if !desc.line_of_business.is_empty() {
        fields.push(("lineOfBusiness", cds_list(&desc.line_of_business)));
    }

    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "annotate {} with @ORD.Extensions: {{", service);
    for (key, value) in &fields {
        let _ = writeln!(out, "    {:<width$} : {},", key, value, width = width);
    }
    let _ = writeln!(out, "}};");

    for entity in &desc.entities {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "annotate {}.{} with @ODM.entityName: {};",
            service,
            entity,
            cds_string(entity)
        );
    }
    out
}

fn check_choice(field: &str, value: &str, allowed: &[&str]) -> Result<(), ToolError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ToolError::invalid(format!(
            "{} '{}' must be one of: {}",
            field,
            value,
            allowed.join(", ")
        )))
    }
}

fn check_length(field: &str, text: &str) -> Result<(), ToolError> {
    let len = text.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(ToolError::invalid(format!(
            "{} is too long ({} characters, maximum {})",
            field, len, MAX_TEXT_LEN
        )));
    }
    Ok(())
}

/// `API of the <title>`, or the bare title when that would exceed the limit.
fn derived_summary(title: &str) -> String {
    let summary = format!("API of the {}", title);
    if summary.chars().count() > MAX_TEXT_LEN {
        title.to_string()
    } else {
        summary
    }
}

/// CDS single-quoted literal; `'` is escaped by doubling.
fn cds_string(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn cds_list(items: &[String]) -> String {
    let inner: Vec<String> = items.iter().map(|i| cds_string(i)).collect();
    format!("[{}]", inner.join(", "))
}

fn entry_prefix(protocol: &str) -> &'static str {
    match protocol {
        "odata-v4" => "odata/v4",
        "odata-v2" => "odata/v2",
        "graphql" => "graphql",
        _ => "rest",
    }
}

fn definition_for(protocol: &str) -> Option<(&'static str, &'static str, &'static str)> {
    match protocol {
        "odata-v4" | "odata-v2" => Some(("edmx", "application/xml", "edmx")),
        "rest" => Some(("openapi-v3", "application/json", "oas3.json")),
        "graphql" => Some(("graphql-sdl", "text/plain", "graphql")),
        _ => None,
    }
}

/// `CatalogService` -> `Catalog Service`
fn humanize(name: &str) -> String {
    let mut out = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' {
            out.push(' ');
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.push(ch);
    }
    out
}

/// `CatalogService` -> `catalog`
fn kebab(name: &str) -> String {
    let base = name.strip_suffix("Service").filter(|b| !b.is_empty()).unwrap_or(name);
    humanize(base).to_lowercase().replace(' ', "-")
}
