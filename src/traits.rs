//! Tool trait, execution context, built-in tools and the registry.
//!
//! Every operation the server exposes is a [`Tool`]. Both transports (MCP
//! and the plain JSON API in [`crate::server`]) look tools up in one
//! [`ToolRegistry`] and call [`Tool::execute`] with a shared [`ToolContext`].
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                ToolRegistry                  │
//! │ list_capabilities  fetch_specification       │
//! │ explain_concept    generate_annotations      │
//! │ validate_metadata  analyze_project           │
//! │ get_examples       + custom (Rust)           │
//! └──────────────┬───────────────────────────────┘
//!                ▼
//!       MCP (stdio / streamable HTTP), POST /tools/{name}
//! ```
//!
//! # Usage
//!
//! ```rust
//! use ord_assist::traits::ToolRegistry;
//!
//! let mut tools = ToolRegistry::with_builtins();
//! // tools.register(Box::new(MyTool));
//! assert!(tools.find("explain_concept").is_some());
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::annotations::{generate_annotations, ServiceDescription};
use crate::concepts::{concept_names, explain_value};
use crate::config::Config;
use crate::error::ToolError;
use crate::project::analyze_project;
use crate::samples::{get_example, EXAMPLE_KINDS};
use crate::spec_fetch::{extract_section, SpecFetcher};
use crate::validator::schema::collection_names;
use crate::validator::{json_type_name, validate_metadata, ValidationLevel};

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// An operation agents can discover and call.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use serde_json::{json, Value};
/// use ord_assist::traits::{Tool, ToolContext};
///
/// pub struct ConceptCount;
///
/// #[async_trait]
/// impl Tool for ConceptCount {
///     fn name(&self) -> &str { "concept_count" }
///     fn description(&self) -> &str { "Number of ORD concepts in the catalog" }
///
///     fn parameters_schema(&self) -> Value {
///         json!({ "type": "object", "properties": {} })
///     }
///
///     async fn execute(&self, _params: Value, _ctx: &ToolContext) -> Result<Value> {
///         Ok(json!({ "count": ord_assist::concepts::concept_names().len() }))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Lowercase identifier with underscores, e.g. `"explain_concept"`.
    fn name(&self) -> &str;

    /// One-line description for agent discovery.
    fn description(&self) -> &str;

    /// Whether this tool ships with the server. Defaults to `false`.
    fn is_builtin(&self) -> bool {
        false
    }

    /// JSON Schema (`type: "object"`) of the parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute with parameters already checked by [`validate_params`].
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Shared state handed to every tool call.
#[derive(Clone)]
pub struct ToolContext {
    config: Arc<Config>,
    spec: Arc<SpecFetcher>,
    served: Option<Arc<[(String, String)]>>,
}

impl ToolContext {
    pub fn new(config: Arc<Config>, spec: Arc<SpecFetcher>) -> Self {
        Self {
            config,
            spec,
            served: None,
        }
    }

    /// Record the name and description of every tool in `registry`, so
    /// `list_capabilities` reports what a server actually serves.
    pub fn with_served_tools(mut self, registry: &ToolRegistry) -> Self {
        let served: Vec<(String, String)> = registry
            .tools()
            .iter()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect();
        self.served = Some(served.into());
        self
    }

    /// Tools recorded by [`with_served_tools`](Self::with_served_tools).
    pub fn served_tools(&self) -> Option<&[(String, String)]> {
        self.served.as_deref()
    }

    /// Build a context with a fresh spec fetcher for `config`.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let spec = Arc::new(SpecFetcher::new(&config.spec)?);
        Ok(Self::new(config, spec))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn spec(&self) -> &SpecFetcher {
        &self.spec
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Parameter checking
// ═══════════════════════════════════════════════════════════════════════

/// Check `params` against a tool's JSON schema.
///
/// Enforces `required`, primitive `type` and `enum`, and injects `default`
/// values for absent properties. Failures are [`ToolError::InvalidArgument`].
pub fn validate_params(schema: &Value, params: &Value) -> Result<Value, ToolError> {
    let params_obj = match params {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(ToolError::invalid(format!(
                "parameters must be a JSON object, got {}",
                json_type_name(other)
            )))
        }
    };

    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .cloned()
        .unwrap_or_default();

    let required: Vec<String> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let mut result = params_obj.clone();

    for req_field in &required {
        if !params_obj.contains_key(req_field) {
            return Err(ToolError::invalid(format!(
                "missing required parameter: {}",
                req_field
            )));
        }
    }

    for (prop_name, prop_schema) in &properties {
        if let Some(value) = params_obj.get(prop_name) {
            if let Some(expected_type) = prop_schema.get("type").and_then(|t| t.as_str()) {
                let type_ok = match expected_type {
                    "string" => value.is_string(),
                    "integer" => value.is_i64() || value.is_u64(),
                    "number" => value.is_number(),
                    "boolean" => value.is_boolean(),
                    "array" => value.is_array(),
                    "object" => value.is_object(),
                    _ => true,
                };
                if !type_ok {
                    return Err(ToolError::invalid(format!(
                        "parameter '{}' must be of type '{}', got {}",
                        prop_name,
                        expected_type,
                        json_type_name(value)
                    )));
                }
            }

            if let Some(enum_values) = prop_schema.get("enum").and_then(|e| e.as_array()) {
                if !enum_values.contains(value) {
                    let allowed: Vec<String> = enum_values.iter().map(|v| v.to_string()).collect();
                    return Err(ToolError::invalid(format!(
                        "parameter '{}' must be one of [{}], got {}",
                        prop_name,
                        allowed.join(", "),
                        value
                    )));
                }
            }
        } else if let Some(default) = prop_schema.get("default") {
            result.insert(prop_name.clone(), default.clone());
        }
    }

    Ok(Value::Object(result))
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Tool Implementations
// ═══════════════════════════════════════════════════════════════════════

/// Lists tools, concepts, example types and validated collections.
pub struct ListCapabilitiesTool;

#[async_trait]
impl Tool for ListCapabilitiesTool {
    fn name(&self) -> &str {
        "list_capabilities"
    }

    fn description(&self) -> &str {
        "List the tools, ORD concepts, example types and validated collections this server supports"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
        // Without a served registry (CLI, library use) only built-ins exist.
        let tools: Vec<Value> = match ctx.served_tools() {
            Some(served) => served
                .iter()
                .map(|(name, description)| json!({ "name": name, "description": description }))
                .collect(),
            None => ToolRegistry::with_builtins()
                .tools()
                .iter()
                .map(|t| json!({ "name": t.name(), "description": t.description() }))
                .collect(),
        };

        Ok(json!({
            "server": "ord-assist",
            "version": env!("CARGO_PKG_VERSION"),
            "tools": tools,
            "concepts": concept_names(),
            "exampleTypes": EXAMPLE_KINDS,
            "validatedCollections": collection_names(),
            "specificationUrl": ctx.spec().url(),
        }))
    }
}

/// Fetches the ORD specification text, optionally a single section.
pub struct FetchSpecificationTool;

#[async_trait]
impl Tool for FetchSpecificationTool {
    fn name(&self) -> &str {
        "fetch_specification"
    }

    fn description(&self) -> &str {
        "Fetch the Open Resource Discovery specification document, or one section of it"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "section": {
                    "type": "string",
                    "description": "Heading text to extract (case-insensitive), e.g. 'Consumption Bundle'"
                }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let text = ctx.spec().text().await?;
        let section = params
            .get("section")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty());

        match section {
            Some(query) => {
                let extracted = extract_section(text, query)?;
                Ok(json!({ "url": ctx.spec().url(), "section": query, "text": extracted }))
            }
            None => Ok(json!({ "url": ctx.spec().url(), "text": text })),
        }
    }
}

/// Explains one ORD concept from the built-in catalog.
pub struct ExplainConceptTool;

#[async_trait]
impl Tool for ExplainConceptTool {
    fn name(&self) -> &str {
        "explain_concept"
    }

    fn description(&self) -> &str {
        "Explain an ORD concept (Product, APIResource, ConsumptionBundle, ...) with key properties and an example"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "concept": {
                    "type": "string",
                    "description": format!("Concept name, one of: {}", concept_names().join(", "))
                }
            },
            "required": ["concept"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<Value> {
        let text = explain_value(params.get("concept"))?;
        Ok(json!({ "text": text }))
    }
}

/// Generates CDS `@ORD.Extensions` annotations for a CAP service.
pub struct GenerateAnnotationsTool;

#[async_trait]
impl Tool for GenerateAnnotationsTool {
    fn name(&self) -> &str {
        "generate_annotations"
    }

    fn description(&self) -> &str {
        "Generate CAP CDS @ORD.Extensions annotations and the matching ORD API resource for a service"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "serviceName": { "type": "string", "description": "CDS service name, e.g. CatalogService" },
                "namespace": { "type": "string", "description": "ORD namespace, e.g. sap.bookshop", "default": "customer" },
                "title": { "type": "string" },
                "shortDescription": { "type": "string" },
                "description": { "type": "string" },
                "version": { "type": "string", "default": "1.0.0" },
                "visibility": { "type": "string", "enum": ["public", "internal", "private"], "default": "public" },
                "releaseStatus": { "type": "string", "enum": ["active", "beta", "deprecated"], "default": "active" },
                "apiProtocol": { "type": "string", "default": "odata-v4" },
                "entities": { "type": "array", "items": { "type": "string" } },
                "industry": { "type": "array", "items": { "type": "string" } },
                "lineOfBusiness": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["serviceName"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<Value> {
        let desc: ServiceDescription = serde_json::from_value(params)
            .map_err(|e| ToolError::invalid(format!("invalid service description: {}", e)))?;
        let generated = generate_annotations(&desc)?;
        Ok(serde_json::to_value(&generated)?)
    }
}

/// Validates an ORD metadata document.
pub struct ValidateMetadataTool;

#[async_trait]
impl Tool for ValidateMetadataTool {
    fn name(&self) -> &str {
        "validate_metadata"
    }

    fn description(&self) -> &str {
        "Validate an ORD metadata document: required fields, formats, and cross references"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "metadata": {
                    "type": ["object", "string"],
                    "description": "ORD document as a JSON object or a JSON string"
                },
                "strict": {
                    "type": "boolean",
                    "description": "Also report best-practice suggestions"
                }
            },
            "required": ["metadata"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let document = metadata_param(params.get("metadata"))?;
        let strict = params
            .get("strict")
            .and_then(Value::as_bool)
            .unwrap_or(ctx.config().validation.strict);

        let result = validate_metadata(&document, ValidationLevel::from_strict(strict));
        tracing::info!(
            valid = result.valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            suggestions = result.suggestions.len(),
            "metadata validated"
        );
        Ok(serde_json::to_value(&result)?)
    }
}

/// Accept an object, or a string holding a JSON object.
fn metadata_param(value: Option<&Value>) -> Result<Value, ToolError> {
    let document = match value {
        Some(Value::String(text)) => serde_json::from_str::<Value>(text)
            .map_err(|e| ToolError::invalid(format!("metadata is not valid JSON: {}", e)))?,
        Some(other) => other.clone(),
        None => return Err(ToolError::invalid("metadata is required")),
    };
    if !document.is_object() {
        return Err(ToolError::invalid(format!(
            "metadata must be a JSON object, got {}",
            json_type_name(&document)
        )));
    }
    Ok(document)
}

/// Scans a CAP project directory.
pub struct AnalyzeProjectTool;

#[async_trait]
impl Tool for AnalyzeProjectTool {
    fn name(&self) -> &str {
        "analyze_project"
    }

    fn description(&self) -> &str {
        "Analyze a CAP project directory: services, entities, ORD annotations, and any ORD documents"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Project root directory" }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let path = params["path"].as_str().unwrap_or("");
        if path.trim().is_empty() {
            return Err(ToolError::invalid("path must not be empty").into());
        }

        let root = PathBuf::from(path);
        let scan = ctx.config().scan.clone();
        let analysis = tokio::task::spawn_blocking(move || analyze_project(&root, &scan)).await??;
        Ok(serde_json::to_value(&analysis)?)
    }
}

/// Returns example records and documents.
pub struct GetExamplesTool;

#[async_trait]
impl Tool for GetExamplesTool {
    fn name(&self) -> &str {
        "get_examples"
    }

    fn description(&self) -> &str {
        "Get example ORD records, a complete ORD document, or a CAP annotation sample"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": EXAMPLE_KINDS,
                    "description": "Kind of example to return"
                }
            },
            "required": ["type"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<Value> {
        let kind = params["type"].as_str().unwrap_or("");
        let example = get_example(kind)?;
        Ok(serde_json::to_value(&example)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Registry for tools (built-in and custom Rust).
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry pre-loaded with the seven built-in tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ListCapabilitiesTool));
        registry.register(Box::new(FetchSpecificationTool));
        registry.register(Box::new(ExplainConceptTool));
        registry.register(Box::new(GenerateAnnotationsTool));
        registry.register(Box::new(ValidateMetadataTool));
        registry.register(Box::new(AnalyzeProjectTool));
        registry.register(Box::new(GetExamplesTool));
        registry
    }

    /// Register a tool. A later tool with the same name shadows nothing;
    /// [`find`](Self::find) returns the first match.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn into_tools(self) -> Vec<Box<dyn Tool>> {
        self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
